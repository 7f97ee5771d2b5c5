//! Suite and test ordering
//!
//! Sorting never touches the input: [`sorted`] returns a borrowed view in
//! the requested order. [`sort_report`] reorders owned data in place for
//! callers that write the data back out.

use std::cmp::Ordering;

use crate::config::SortMode;
use crate::{ReportData, SuiteRecord, TestRecord};

/// A suite together with its tests in display order
#[derive(Debug, Clone)]
pub struct SortedSuite<'a> {
    pub suite: &'a SuiteRecord,
    pub tests: Vec<&'a TestRecord>,
}

fn compare_suites(mode: SortMode, a: &SuiteRecord, b: &SuiteRecord) -> Ordering {
    match mode {
        SortMode::Default => Ordering::Equal,
        SortMode::Status => a.status.rank().cmp(&b.status.rank()),
        SortMode::Duration => b.duration.cmp(&a.duration),
        SortMode::Name => a.name.cmp(&b.name),
    }
}

fn compare_tests(mode: SortMode, a: &TestRecord, b: &TestRecord) -> Ordering {
    match mode {
        SortMode::Default => Ordering::Equal,
        SortMode::Status => a.status.outcome().rank().cmp(&b.status.outcome().rank()),
        SortMode::Duration => b.duration.cmp(&a.duration),
        SortMode::Name => a.title.cmp(&b.title),
    }
}

/// Suites and their tests in `mode` order. Ties keep input order.
pub fn sorted(data: &ReportData, mode: SortMode) -> Vec<SortedSuite<'_>> {
    let mut suites: Vec<SortedSuite<'_>> = data
        .test_suites
        .iter()
        .map(|suite| {
            let mut tests: Vec<&TestRecord> = suite.tests.iter().collect();
            if mode != SortMode::Default {
                tests.sort_by(|a, b| compare_tests(mode, a, b));
            }
            SortedSuite { suite, tests }
        })
        .collect();

    if mode != SortMode::Default {
        suites.sort_by(|a, b| compare_suites(mode, a.suite, b.suite));
    }
    suites
}

/// Reorder owned report data in place
pub fn sort_report(data: &mut ReportData, mode: SortMode) {
    if mode == SortMode::Default {
        return;
    }
    for suite in &mut data.test_suites {
        suite.tests.sort_by(|a, b| compare_tests(mode, a, b));
    }
    data.test_suites.sort_by(|a, b| compare_suites(mode, a, b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestStatus;

    fn suite(name: &str, duration: u64, tests: Vec<TestRecord>) -> SuiteRecord {
        let mut suite = SuiteRecord::from_tests(name, tests);
        suite.duration = duration;
        suite
    }

    fn data() -> ReportData {
        ReportData::from_suites(vec![
            suite(
                "zebra.test.js",
                10,
                vec![
                    TestRecord::new("b", TestStatus::Passed).with_duration(5),
                    TestRecord::new("a", TestStatus::Failed).with_duration(1),
                ],
            ),
            suite(
                "alpha.test.js",
                30,
                vec![
                    TestRecord::new("y", TestStatus::Todo).with_duration(2),
                    TestRecord::new("x", TestStatus::Passed).with_duration(9),
                ],
            ),
            suite(
                "middle.test.js",
                20,
                vec![TestRecord::new("m", TestStatus::Passed)],
            ),
        ])
    }

    fn names(view: &[SortedSuite<'_>]) -> Vec<String> {
        view.iter().map(|s| s.suite.name.clone()).collect()
    }

    #[test]
    fn test_default_keeps_runner_order() {
        let data = data();
        let view = sorted(&data, SortMode::Default);
        assert_eq!(names(&view), vec!["zebra.test.js", "alpha.test.js", "middle.test.js"]);
        assert_eq!(view[0].tests[0].title, "b");
    }

    #[test]
    fn test_sort_by_name() {
        let data = data();
        let view = sorted(&data, SortMode::Name);
        assert_eq!(names(&view), vec!["alpha.test.js", "middle.test.js", "zebra.test.js"]);
        let zebra: Vec<_> = view[2].tests.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(zebra, vec!["a", "b"]);
    }

    #[test]
    fn test_sort_by_status() {
        let data = data();
        let view = sorted(&data, SortMode::Status);
        // zebra failed, alpha passed (todo + passed), middle passed
        assert_eq!(names(&view), vec!["zebra.test.js", "alpha.test.js", "middle.test.js"]);
        assert_eq!(view[0].tests[0].title, "a");
        // todo ranks before passed
        assert_eq!(view[1].tests[0].title, "y");
    }

    #[test]
    fn test_sort_by_duration_descending() {
        let data = data();
        let view = sorted(&data, SortMode::Duration);
        assert_eq!(names(&view), vec!["alpha.test.js", "middle.test.js", "zebra.test.js"]);
        assert_eq!(view[0].tests[0].title, "x");
    }

    #[test]
    fn test_ties_are_stable() {
        let data = ReportData::from_suites(vec![
            suite("one", 5, vec![]),
            suite("two", 5, vec![]),
            suite("three", 5, vec![]),
        ]);
        let view = sorted(&data, SortMode::Duration);
        assert_eq!(names(&view), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_sorted_view_leaves_input_untouched() {
        let data = data();
        let before = data.clone();
        let _ = sorted(&data, SortMode::Name);
        assert_eq!(data, before);
    }

    #[test]
    fn test_sort_report_in_place() {
        let mut data = data();
        sort_report(&mut data, SortMode::Name);
        assert_eq!(data.test_suites[0].name, "alpha.test.js");
        assert_eq!(data.test_suites[0].tests[0].title, "x");

        let mut untouched = self::data();
        sort_report(&mut untouched, SortMode::Default);
        assert_eq!(untouched, self::data());
    }
}
