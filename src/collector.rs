//! Reading test results into [`ReportData`]
//!
//! Two input shapes are accepted:
//! - the aggregated result Jest prints with `--json` (also what custom
//!   reporters receive in `onRunComplete`)
//! - a report data file previously written by the JSON reporter

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::{ReportData, SuiteRecord, SuiteStatus, Summary, TestRecord, TestStatus};

/// Failure to turn a results file into report data
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("failed to read results file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("results file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} has neither `testResults` nor `testSuites`; is it a Jest --json result?")]
    UnknownFormat { path: PathBuf },
}

/// Aggregated result as printed by `jest --json`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JestResults {
    pub num_total_test_suites: usize,
    pub num_passed_test_suites: usize,
    pub num_failed_test_suites: usize,
    pub num_pending_test_suites: usize,
    pub num_total_tests: usize,
    pub num_passed_tests: usize,
    pub num_failed_tests: usize,
    pub num_pending_tests: usize,
    pub num_todo_tests: usize,
    pub success: bool,
    pub was_interrupted: bool,
    /// Epoch milliseconds
    pub start_time: Option<f64>,
    pub test_results: Vec<JestSuite>,
}

/// One test file in a Jest result
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JestSuite {
    #[serde(alias = "name")]
    pub test_file_path: String,
    /// `--json` output calls these assertion results
    #[serde(alias = "assertionResults")]
    pub test_results: Vec<TestRecord>,
    #[serde(alias = "message")]
    pub failure_message: Option<String>,
    pub perf_stats: Option<PerfStats>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct PerfStats {
    pub start: f64,
    pub end: f64,
}

impl JestSuite {
    /// (start, end) in epoch milliseconds, from perf stats or the flat fields
    fn window(&self) -> Option<(f64, f64)> {
        match (self.perf_stats, self.start_time, self.end_time) {
            (Some(stats), _, _) if stats.end > 0.0 => Some((stats.start, stats.end)),
            (_, Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

/// Converts raw results into report data
#[derive(Debug, Clone)]
pub struct Collector {
    root: PathBuf,
    now: DateTime<Utc>,
}

impl Collector {
    /// Suite names are shown relative to `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            now: Utc::now(),
        }
    }

    /// Use a fixed clock for the run's end time
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Read and convert a results file
    pub fn collect_file(&self, path: &Path) -> Result<ReportData, CollectError> {
        let content = fs::read_to_string(path).map_err(|source| CollectError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.collect_str(&content, path)
    }

    /// Convert results text; `origin` only labels errors
    pub fn collect_str(&self, content: &str, origin: &Path) -> Result<ReportData, CollectError> {
        let parse_error = |source| CollectError::Parse {
            path: origin.to_path_buf(),
            source,
        };
        let value: serde_json::Value = serde_json::from_str(content).map_err(parse_error)?;

        if value.get("testSuites").is_some() {
            log::debug!("{} is processed report data", origin.display());
            return serde_json::from_value(value).map_err(parse_error);
        }
        if value.get("testResults").is_some() {
            log::debug!("{} is a Jest aggregated result", origin.display());
            let results: JestResults = serde_json::from_value(value).map_err(parse_error)?;
            return Ok(self.convert_jest(results));
        }

        Err(CollectError::UnknownFormat {
            path: origin.to_path_buf(),
        })
    }

    /// Convert an aggregated Jest result
    pub fn convert_jest(&self, results: JestResults) -> ReportData {
        let end_ms = results
            .test_results
            .iter()
            .filter_map(|s| s.window().map(|(_, end)| end))
            .fold(None, |acc: Option<f64>, end| Some(acc.map_or(end, |a| a.max(end))));

        let test_suites: Vec<SuiteRecord> = results
            .test_results
            .into_iter()
            .map(|suite| self.convert_suite(suite))
            .collect();

        let flaky_tests = test_suites
            .iter()
            .flat_map(|s| &s.tests)
            .filter(|t| t.is_flaky)
            .count();

        let end = end_ms
            .and_then(|ms| DateTime::<Utc>::from_timestamp_millis(ms as i64))
            .unwrap_or(self.now);
        let start = results
            .start_time
            .and_then(|ms| DateTime::<Utc>::from_timestamp_millis(ms as i64))
            .unwrap_or(end);

        let summary = Summary {
            total_suites: results.num_total_test_suites,
            passed_suites: results.num_passed_test_suites,
            failed_suites: results.num_failed_test_suites,
            pending_suites: results.num_pending_test_suites,
            total_tests: results.num_total_tests,
            passed_tests: results.num_passed_tests,
            failed_tests: results.num_failed_tests,
            pending_tests: results.num_pending_tests,
            todo_tests: results.num_todo_tests,
            flaky_tests,
            duration: (end - start).num_milliseconds().max(0) as u64,
            success: results.success,
            start_time: iso(start),
            end_time: iso(end),
            was_interrupted: results.was_interrupted,
        };

        ReportData {
            summary,
            test_suites,
        }
    }

    fn convert_suite(&self, suite: JestSuite) -> SuiteRecord {
        let name = relative_name(&self.root, &suite.test_file_path);
        let duration = suite
            .window()
            .map(|(start, end)| (end - start).max(0.0).round() as u64)
            .unwrap_or(0);
        let failure_message = suite.failure_message.filter(|m| !m.trim().is_empty());

        let tests: Vec<TestRecord> = suite
            .test_results
            .into_iter()
            .map(|mut test| {
                test.invocations = test.invocations.max(1);
                test.is_flaky = test.status == TestStatus::Passed && test.invocations > 1;
                if test.full_name.is_empty() {
                    test.full_name = test.title.clone();
                }
                if test.status == TestStatus::Failed {
                    if let Some(section) = failure_message
                        .as_deref()
                        .and_then(|m| failure_section(m, &test.title))
                    {
                        test.failure_messages = vec![section];
                    }
                }
                test
            })
            .collect();

        let status = if tests.is_empty() && failure_message.is_some() {
            // The file failed before any test ran
            SuiteStatus::Failed
        } else {
            SuiteStatus::aggregate(tests.iter().map(|t| t.status.outcome()))
        };

        SuiteRecord {
            name,
            path: suite.test_file_path,
            status,
            duration,
            tests,
            failure_message,
        }
    }
}

/// The `●` section of a combined suite message that mentions `title`,
/// up to the next bullet
fn failure_section(message: &str, title: &str) -> Option<String> {
    if title.is_empty() {
        return None;
    }
    message
        .split('●')
        .skip(1)
        .find(|section| section.contains(title))
        .map(|section| format!("●{}", section).trim().to_string())
}

fn relative_name(root: &Path, file: &str) -> String {
    Path::new(file)
        .strip_prefix(root)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| file.to_string())
}

fn iso(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
