//! Console reporter with colored output

use crate::reporter::html::format_duration;
use crate::{ReportData, TestStatus};
use colored::{ColoredString, Colorize};
use std::path::Path;

/// Reporter for terminal output after a report is written
pub struct ConsoleReporter {
    /// Whether to use colors
    use_colors: bool,
    /// Only print where the report went
    quiet: bool,
}

impl ConsoleReporter {
    /// Create a new console reporter
    pub fn new() -> Self {
        Self {
            use_colors: true,
            quiet: false,
        }
    }

    /// Disable colors
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    /// Print only the output paths
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Print the summary to stdout
    pub fn report(&self, data: &ReportData, html_path: &Path, json_path: Option<&Path>) {
        print!("{}", self.render(data, html_path, json_path));
    }

    /// Build the summary text
    pub fn render(&self, data: &ReportData, html_path: &Path, json_path: Option<&Path>) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "\n📊 {} {}\n",
            self.paint("Test report written:", |s| s.bold()),
            html_path.display()
        ));
        if let Some(json) = json_path {
            out.push_str(&format!("📄 JSON data saved: {}\n", json.display()));
        }
        if self.quiet {
            return out;
        }

        let summary = &data.summary;
        out.push('\n');

        let mut tests = Vec::new();
        if summary.failed_tests > 0 {
            tests.push(self.paint(&format!("{} failed", summary.failed_tests), |s| s.red().bold()));
        }
        if summary.passed_tests > 0 {
            tests.push(self.paint(&format!("{} passed", summary.passed_tests), |s| s.green()));
        }
        if summary.skipped_tests() > 0 {
            tests.push(self.paint(&format!("{} skipped", summary.skipped_tests()), |s| s.yellow()));
        }
        if summary.flaky_tests > 0 {
            tests.push(self.paint(&format!("{} flaky", summary.flaky_tests), |s| s.magenta()));
        }
        tests.push(format!("{} total", summary.total_tests));
        out.push_str(&format!("   Tests:  {}\n", tests.join(", ")));

        let mut suites = Vec::new();
        if summary.failed_suites > 0 {
            suites.push(self.paint(&format!("{} failed", summary.failed_suites), |s| s.red().bold()));
        }
        if summary.passed_suites > 0 {
            suites.push(self.paint(&format!("{} passed", summary.passed_suites), |s| s.green()));
        }
        suites.push(format!("{} total", summary.total_suites));
        out.push_str(&format!("   Suites: {}\n", suites.join(", ")));
        out.push_str(&format!("   Time:   {}\n", format_duration(summary.duration)));

        if summary.was_interrupted {
            out.push_str(&format!(
                "   {}\n",
                self.paint("Run was interrupted; not all tests executed", |s| s.yellow())
            ));
        }

        let failed: Vec<String> = data
            .test_suites
            .iter()
            .flat_map(|suite| {
                suite
                    .tests
                    .iter()
                    .filter(|t| t.status == TestStatus::Failed)
                    .map(move |t| {
                        let mut path = vec![suite.name.as_str()];
                        path.extend(t.ancestor_titles.iter().map(String::as_str));
                        path.push(&t.title);
                        path.join(" › ")
                    })
            })
            .collect();

        if !failed.is_empty() {
            out.push('\n');
            out.push_str(&format!("   {}\n", self.paint("Failed tests:", |s| s.bold())));
            for name in failed {
                out.push_str(&format!("   {} {}\n", self.paint("✗", |s| s.red()), name));
            }
        }
        out.push('\n');
        out
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.use_colors {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SuiteRecord, TestRecord};

    fn data() -> ReportData {
        let mut data = ReportData::from_suites(vec![
            SuiteRecord::from_tests(
                "src/auth.test.js",
                vec![
                    TestRecord::new("logs in", TestStatus::Passed).within(&["Auth"]),
                    TestRecord::new("rejects bad password", TestStatus::Failed).within(&["Auth", "login"]),
                ],
            ),
            SuiteRecord::from_tests(
                "src/util.test.js",
                vec![
                    TestRecord::new("formats", TestStatus::Passed).with_invocations(2),
                    TestRecord::new("later", TestStatus::Todo),
                ],
            ),
        ]);
        data.summary.duration = 1500;
        data
    }

    #[test]
    fn test_summary_lines() {
        let text = ConsoleReporter::new()
            .without_colors()
            .render(&data(), Path::new("out/report.html"), Some(Path::new("out/report.json")));
        assert!(text.contains("Test report written: out/report.html"));
        assert!(text.contains("JSON data saved: out/report.json"));
        assert!(text.contains("Tests:  1 failed, 2 passed, 1 skipped, 1 flaky, 4 total"));
        assert!(text.contains("Suites: 1 failed, 1 passed, 2 total"));
        assert!(text.contains("Time:   1.5s"));
        assert!(text.contains("✗ src/auth.test.js › Auth › login › rejects bad password"));
    }

    #[test]
    fn test_quiet_prints_only_paths() {
        let text = ConsoleReporter::new()
            .without_colors()
            .quiet()
            .render(&data(), Path::new("report.html"), None);
        assert!(text.contains("report.html"));
        assert!(!text.contains("Tests:"));
        assert!(!text.contains("Failed tests"));
    }

    #[test]
    fn test_interrupted_note() {
        let mut data = data();
        data.summary.was_interrupted = true;
        let text = ConsoleReporter::new()
            .without_colors()
            .render(&data, Path::new("report.html"), None);
        assert!(text.contains("Run was interrupted"));
    }
}
