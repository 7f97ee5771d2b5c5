//! Verdict: self-contained HTML reports for JavaScript test runs
//!
//! The library turns a processed test run ([`ReportData`]) into a single HTML
//! document. The rendering core is pure: the same data and [`RenderConfig`]
//! always produce the same markup, and the only host access (environment
//! metadata) goes through an injected [`environment::EnvironmentSource`].

pub mod collector;
pub mod config;
pub mod diagnostic;
pub mod environment;
pub mod reporter;
pub mod sort;
pub mod tree;

pub use config::RenderConfig;

use serde::{Deserialize, Deserializer, Serialize};

/// Outcome of a single test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Pending,
    Skipped,
    Todo,
    Disabled,
    /// Any status string the runner emits that we do not know about
    #[serde(other)]
    Unknown,
}

impl TestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Pending => "pending",
            TestStatus::Skipped => "skipped",
            TestStatus::Todo => "todo",
            TestStatus::Disabled => "disabled",
            TestStatus::Unknown => "unknown",
        }
    }

    /// Collapse a test status onto the three-level ranking shared by
    /// group aggregation, sorting and suite aggregation.
    pub fn outcome(self) -> SuiteStatus {
        match self {
            TestStatus::Failed => SuiteStatus::Failed,
            TestStatus::Passed => SuiteStatus::Passed,
            _ => SuiteStatus::Pending,
        }
    }

    /// Pending, skipped, todo and disabled tests are all shown under the
    /// "skipped" filter.
    pub fn is_skipped_like(self) -> bool {
        matches!(
            self,
            TestStatus::Pending | TestStatus::Skipped | TestStatus::Todo | TestStatus::Disabled
        )
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate status of a suite or a group of tests.
///
/// Discriminants are the status ranking: failed (0) < pending (1) < passed (2).
/// Unknown status strings deserialize as pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteStatus {
    Failed = 0,
    Passed = 2,
    #[serde(other)]
    Pending = 1,
}

impl SuiteStatus {
    pub fn rank(self) -> u8 {
        match self {
            SuiteStatus::Failed => 0,
            SuiteStatus::Pending => 1,
            SuiteStatus::Passed => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SuiteStatus::Failed => "failed",
            SuiteStatus::Pending => "pending",
            SuiteStatus::Passed => "passed",
        }
    }

    /// Aggregate child outcomes: any failure fails the whole, a whole made
    /// only of pending outcomes is pending, anything else passed.
    ///
    /// An empty input is pending (nothing ran).
    pub fn aggregate<I>(outcomes: I) -> SuiteStatus
    where
        I: IntoIterator<Item = SuiteStatus>,
    {
        let mut all_pending = true;
        for outcome in outcomes {
            match outcome {
                SuiteStatus::Failed => return SuiteStatus::Failed,
                SuiteStatus::Passed => all_pending = false,
                SuiteStatus::Pending => {}
            }
        }
        if all_pending {
            SuiteStatus::Pending
        } else {
            SuiteStatus::Passed
        }
    }
}

impl std::fmt::Display for SuiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    pub title: String,
    #[serde(default)]
    pub full_name: String,
    /// Enclosing group names, outermost first
    #[serde(default, deserialize_with = "null_as_default")]
    pub ancestor_titles: Vec<String>,
    pub status: TestStatus,
    /// Duration in milliseconds
    #[serde(default, deserialize_with = "lenient_millis")]
    pub duration: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub failure_messages: Vec<String>,
    #[serde(default = "one")]
    pub invocations: u32,
    #[serde(default)]
    pub is_flaky: bool,
}

impl TestRecord {
    pub fn new(title: impl Into<String>, status: TestStatus) -> Self {
        let title = title.into();
        Self {
            full_name: title.clone(),
            title,
            ancestor_titles: Vec::new(),
            status,
            duration: 0,
            failure_messages: Vec::new(),
            invocations: 1,
            is_flaky: false,
        }
    }

    /// Place the test under the given group path (outermost first)
    pub fn within<S: AsRef<str>>(mut self, ancestors: &[S]) -> Self {
        self.ancestor_titles = ancestors.iter().map(|a| a.as_ref().to_string()).collect();
        let mut parts: Vec<&str> = self.ancestor_titles.iter().map(String::as_str).collect();
        parts.push(&self.title);
        self.full_name = parts.join(" ");
        self
    }

    pub fn with_duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure_messages.push(message.into());
        self
    }

    /// Record the number of attempts; a passing test that needed more than
    /// one attempt is flaky.
    pub fn with_invocations(mut self, invocations: u32) -> Self {
        self.invocations = invocations.max(1);
        self.is_flaky = self.status == TestStatus::Passed && self.invocations > 1;
        self
    }
}

/// Aggregate result for one test file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteRecord {
    pub name: String,
    #[serde(default)]
    pub path: String,
    pub status: SuiteStatus,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub duration: u64,
    #[serde(default)]
    pub tests: Vec<TestRecord>,
    /// Raw suite-level failure text (e.g. a module that failed to load)
    #[serde(default)]
    pub failure_message: Option<String>,
}

impl SuiteRecord {
    /// Build a suite whose status is derived from its tests
    pub fn from_tests(name: impl Into<String>, tests: Vec<TestRecord>) -> Self {
        let name = name.into();
        let status = SuiteStatus::aggregate(tests.iter().map(|t| t.status.outcome()));
        Self {
            path: name.clone(),
            name,
            status,
            duration: 0,
            tests,
            failure_message: None,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.tests.iter().any(|t| t.status == TestStatus::Failed)
    }
}

/// Run-level counters and timing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
    pub total_suites: usize,
    pub passed_suites: usize,
    pub failed_suites: usize,
    pub pending_suites: usize,
    pub total_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,
    pub pending_tests: usize,
    pub todo_tests: usize,
    pub flaky_tests: usize,
    /// Wall-clock duration of the run in milliseconds
    #[serde(deserialize_with = "lenient_millis")]
    pub duration: u64,
    pub success: bool,
    /// ISO-8601 timestamps
    pub start_time: String,
    pub end_time: String,
    pub was_interrupted: bool,
}

impl Summary {
    /// Count suites and tests; timing fields are left empty.
    pub fn from_suites(suites: &[SuiteRecord]) -> Self {
        let mut summary = Summary {
            total_suites: suites.len(),
            ..Summary::default()
        };
        for suite in suites {
            match suite.status {
                SuiteStatus::Passed => summary.passed_suites += 1,
                SuiteStatus::Failed => summary.failed_suites += 1,
                SuiteStatus::Pending => summary.pending_suites += 1,
            }
            for test in &suite.tests {
                summary.total_tests += 1;
                match test.status {
                    TestStatus::Passed => summary.passed_tests += 1,
                    TestStatus::Failed => summary.failed_tests += 1,
                    TestStatus::Todo => summary.todo_tests += 1,
                    TestStatus::Pending | TestStatus::Skipped | TestStatus::Disabled => {
                        summary.pending_tests += 1
                    }
                    TestStatus::Unknown => {}
                }
                if test.is_flaky {
                    summary.flaky_tests += 1;
                }
            }
        }
        summary.success = summary.failed_tests == 0 && summary.failed_suites == 0;
        summary
    }

    /// Tests shown under the "skipped" counter
    pub fn skipped_tests(&self) -> usize {
        self.pending_tests + self.todo_tests
    }
}

/// Everything the report is rendered from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub summary: Summary,
    #[serde(default)]
    pub test_suites: Vec<SuiteRecord>,
}

impl ReportData {
    /// Build report data whose summary is counted from the suites
    pub fn from_suites(test_suites: Vec<SuiteRecord>) -> Self {
        Self {
            summary: Summary::from_suites(&test_suites),
            test_suites,
        }
    }
}

fn one() -> u32 {
    1
}

/// Accept `null`, integers and fractional milliseconds
pub(crate) fn lenient_millis<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.round() as u64)
        .unwrap_or(0))
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ranking_order() {
        assert!(SuiteStatus::Failed.rank() < SuiteStatus::Pending.rank());
        assert!(SuiteStatus::Pending.rank() < SuiteStatus::Passed.rank());
        assert_eq!(TestStatus::Todo.outcome(), SuiteStatus::Pending);
        assert_eq!(TestStatus::Unknown.outcome(), SuiteStatus::Pending);
        assert!(SuiteStatus::Failed < SuiteStatus::Pending);
        assert!(SuiteStatus::Pending < SuiteStatus::Passed);
    }

    #[test]
    fn test_unknown_suite_status_is_pending() {
        let status: SuiteStatus = serde_json::from_str("\"focused\"").unwrap();
        assert_eq!(status, SuiteStatus::Pending);
        let status: SuiteStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(status, SuiteStatus::Failed);
    }

    #[test]
    fn test_aggregate() {
        use SuiteStatus::*;
        assert_eq!(SuiteStatus::aggregate([Passed, Failed, Pending]), Failed);
        assert_eq!(SuiteStatus::aggregate([Pending, Pending]), Pending);
        assert_eq!(SuiteStatus::aggregate([Pending, Passed]), Passed);
        assert_eq!(SuiteStatus::aggregate(std::iter::empty::<SuiteStatus>()), Pending);
    }

    #[test]
    fn test_unknown_status_deserializes() {
        let t: TestRecord =
            serde_json::from_str(r#"{"title":"x","status":"focused"}"#).unwrap();
        assert_eq!(t.status, TestStatus::Unknown);
        assert_eq!(t.duration, 0);
        assert_eq!(t.invocations, 1);
        assert!(t.ancestor_titles.is_empty());
    }

    #[test]
    fn test_null_fields_default() {
        let t: TestRecord = serde_json::from_str(
            r#"{"title":"x","status":"passed","duration":null,"ancestorTitles":null,"failureMessages":null}"#,
        )
        .unwrap();
        assert_eq!(t.duration, 0);
        assert!(t.failure_messages.is_empty());
    }

    #[test]
    fn test_flaky_only_when_passed() {
        let flaky = TestRecord::new("a", TestStatus::Passed).with_invocations(3);
        assert!(flaky.is_flaky);
        let failed = TestRecord::new("b", TestStatus::Failed).with_invocations(3);
        assert!(!failed.is_flaky);
    }

    #[test]
    fn test_summary_from_suites() {
        let suite = SuiteRecord::from_tests(
            "a.test.js",
            vec![
                TestRecord::new("p", TestStatus::Passed),
                TestRecord::new("f", TestStatus::Failed),
                TestRecord::new("s", TestStatus::Pending),
                TestRecord::new("t", TestStatus::Todo),
            ],
        );
        assert_eq!(suite.status, SuiteStatus::Failed);
        let summary = Summary::from_suites(&[suite]);
        assert_eq!(summary.total_tests, 4);
        assert_eq!(summary.skipped_tests(), 2);
        assert_eq!(summary.failed_suites, 1);
        assert!(!summary.success);
    }

    #[test]
    fn test_report_data_roundtrip_is_camel_case() {
        let data = ReportData::from_suites(vec![SuiteRecord::from_tests(
            "a.test.js",
            vec![TestRecord::new("p", TestStatus::Passed).within(&["Outer"])],
        )]);
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"testSuites\""));
        assert!(json.contains("\"ancestorTitles\":[\"Outer\"]"));
        assert!(json.contains("\"fullName\":\"Outer p\""));
    }
}
