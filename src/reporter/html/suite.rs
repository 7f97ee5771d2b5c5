//! Suite cards and the describe/test tree inside them

use super::failure::{error_container, suite_error};
use super::format::{count_label, escape_html, file_name, format_duration};
use super::RenderContext;
use crate::config::{CollapsePolicy, PathDisplay};
use crate::sort::SortedSuite;
use crate::tree::{build_tree, Group, TreeNode};
use crate::{SuiteStatus, TestRecord, TestStatus};

/// Initial collapse state shared by suites and groups. A failing
/// descendant keeps the node open unless everything is collapsed.
fn should_collapse(
    policy: &CollapsePolicy,
    status: SuiteStatus,
    has_failure: bool,
    index: Option<usize>,
) -> bool {
    if policy.collapse_all {
        return true;
    }
    if has_failure {
        return false;
    }
    if policy.collapse_passed && status == SuiteStatus::Passed {
        return true;
    }
    match index {
        Some(index) => policy.expand_level >= 0 && index >= policy.expand_level as usize,
        None => false,
    }
}

/// One suite card; `index` is its position in display order
pub(super) fn render_suite(ctx: &RenderContext<'_>, entry: &SortedSuite<'_>, index: usize) -> String {
    let config = ctx.config;
    let suite = entry.suite;
    let has_failed = entry.tests.iter().any(|t| t.status == TestStatus::Failed);
    let collapsed = should_collapse(&config.collapse, suite.status, has_failed, Some(index));

    let display_name = match config.path_display {
        PathDisplay::Full => suite.name.as_str(),
        PathDisplay::Filename => file_name(&suite.name),
    };
    let duration = if config.show_duration {
        format!(
            "\n        <span class=\"test-duration\" data-testid=\"suite-duration\" style=\"margin-left: auto\">{}</span>",
            format_duration(suite.duration)
        )
    } else {
        String::new()
    };

    let mut html = format!(
        r##"
    <div class="suite{collapsed_class}" data-status="{status}" data-has-failed="{has_failed}" data-name="{name}" data-testid="test-suite" data-collapsed="{collapsed}">
      <div class="suite-header" data-testid="suite-header">
        <i class="bi bi-chevron-down suite-chevron"></i>
        <span class="suite-name" data-testid="suite-name">{display}</span>{duration}
      </div>
      <div class="suite-body" data-testid="suite-body">"##,
        collapsed_class = if collapsed { " collapsed" } else { "" },
        status = suite.status,
        has_failed = has_failed,
        name = escape_html(&suite.name),
        collapsed = collapsed,
        display = escape_html(display_name),
        duration = duration,
    );

    let tests_have_messages = entry.tests.iter().any(|t| !t.failure_messages.is_empty());
    if let Some(message) = suite.failure_message.as_deref() {
        if !tests_have_messages && !message.trim().is_empty() {
            html.push_str(&suite_error(message));
        }
    }

    let tree = build_tree(entry.tests.iter().copied());
    render_nodes(ctx, &tree, 0, &mut html);

    html.push_str("\n      </div>\n    </div>\n");
    html
}

fn render_nodes(ctx: &RenderContext<'_>, nodes: &[TreeNode<'_>], depth: usize, out: &mut String) {
    for node in nodes {
        match node {
            TreeNode::Group(group) => render_group(ctx, group, depth, out),
            TreeNode::Leaf(test) => render_test(ctx, test, out),
        }
    }
}

fn render_group(ctx: &RenderContext<'_>, group: &Group<'_>, depth: usize, out: &mut String) {
    if !group.has_visible(&ctx.config.visibility) {
        return;
    }
    let collapsed = should_collapse(&ctx.config.collapse, group.status, group.has_failure(), None);

    out.push_str(&format!(
        r##"
        <div class="describe-group{collapsed_class}" data-status="{status}" data-depth="{depth}" data-testid="describe-group" data-collapsed="{collapsed}">
          <div class="describe-header" data-testid="describe-header">
            <i class="bi bi-chevron-down describe-chevron"></i>
            <span class="describe-name" data-testid="describe-name">{name}</span>
            <span class="describe-count" data-testid="describe-count">{count}</span>
          </div>
          <div class="describe-body" data-testid="describe-body">"##,
        collapsed_class = if collapsed { " collapsed" } else { "" },
        status = group.status,
        depth = depth,
        collapsed = collapsed,
        name = escape_html(group.name),
        count = count_label(group.leaf_count(), "test"),
    ));
    render_nodes(ctx, &group.children, depth + 1, out);
    out.push_str("\n          </div>\n        </div>");
}

fn status_icon(test: &TestRecord) -> (&'static str, &'static str) {
    if test.is_flaky {
        return ("bi-arrow-repeat", "flaky");
    }
    let icon = match test.status {
        TestStatus::Passed => "bi-check-lg",
        TestStatus::Failed => "bi-x-lg",
        TestStatus::Unknown => "bi-circle",
        _ => "bi-skip-forward-fill",
    };
    (icon, test.status.as_str())
}

fn render_test(ctx: &RenderContext<'_>, test: &TestRecord, out: &mut String) {
    if !ctx.config.visibility.allows(test.status) {
        return;
    }
    let (icon, icon_class) = status_icon(test);

    let flaky_badge = if test.is_flaky {
        format!(
            "<span class=\"flaky-badge\" data-testid=\"flaky-badge\"><i class=\"bi bi-arrow-repeat\"></i>{} attempts</span>",
            test.invocations
        )
    } else {
        String::new()
    };
    let errors = if test.failure_messages.is_empty() {
        String::new()
    } else {
        error_container(ctx, &test.failure_messages)
    };
    let duration = if ctx.config.show_duration {
        format!(
            "\n          <span class=\"test-duration\" data-testid=\"test-duration\">{}</span>",
            format_duration(test.duration)
        )
    } else {
        String::new()
    };

    out.push_str(&format!(
        r##"
        <div class="test-item" data-status="{status}" data-flaky="{flaky}" data-testid="test-item">
          <i class="bi {icon} test-status-icon {icon_class}"></i>
          <div class="test-content">
            <span class="test-title" data-testid="test-title">{title}</span>{badge}{errors}
          </div>{duration}
        </div>"##,
        status = test.status,
        flaky = test.is_flaky,
        icon = icon,
        icon_class = icon_class,
        title = escape_html(&test.title),
        badge = flaky_badge,
        errors = errors,
        duration = duration,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::{sorted, SortedSuite};
    use crate::{RenderConfig, ReportData, SuiteRecord};

    fn render_one(config: &RenderConfig, suite: SuiteRecord, index: usize) -> String {
        let data = ReportData::from_suites(vec![suite]);
        let view: Vec<SortedSuite<'_>> = sorted(&data, config.sort);
        let ctx = RenderContext::new(config);
        render_suite(&ctx, &view[0], index)
    }

    fn passing_suite() -> SuiteRecord {
        SuiteRecord::from_tests(
            "src/math/add.test.js",
            vec![
                TestRecord::new("adds", TestStatus::Passed).within(&["math", "add"]),
                TestRecord::new("adds negatives", TestStatus::Passed).within(&["math", "add"]),
            ],
        )
    }

    fn failing_suite() -> SuiteRecord {
        SuiteRecord::from_tests(
            "src/auth.test.js",
            vec![
                TestRecord::new("logs in", TestStatus::Passed).within(&["auth"]),
                TestRecord::new("rejects", TestStatus::Failed)
                    .within(&["auth", "errors"])
                    .with_failure("Expected: 1\nReceived: 2"),
            ],
        )
    }

    #[test]
    fn test_collapse_rules() {
        let policy = CollapsePolicy {
            collapse_all: false,
            collapse_passed: true,
            expand_level: -1,
        };
        assert!(should_collapse(&policy, SuiteStatus::Passed, false, Some(0)));
        assert!(!should_collapse(&policy, SuiteStatus::Failed, true, Some(0)));
        assert!(!should_collapse(&policy, SuiteStatus::Pending, false, Some(0)));

        let levels = CollapsePolicy {
            collapse_all: false,
            collapse_passed: false,
            expand_level: 1,
        };
        assert!(!should_collapse(&levels, SuiteStatus::Passed, false, Some(0)));
        assert!(should_collapse(&levels, SuiteStatus::Passed, false, Some(1)));
        assert!(!should_collapse(&levels, SuiteStatus::Failed, true, Some(3)));
        assert!(!should_collapse(&levels, SuiteStatus::Passed, false, None));

        let all = CollapsePolicy {
            collapse_all: true,
            ..levels
        };
        assert!(should_collapse(&all, SuiteStatus::Failed, true, Some(0)));
    }

    #[test]
    fn test_suite_shows_file_name_and_groups() {
        let html = render_one(&RenderConfig::default(), passing_suite(), 0);
        assert!(html.contains("data-name=\"src/math/add.test.js\""));
        assert!(html.contains("<span class=\"suite-name\" data-testid=\"suite-name\">add.test.js</span>"));
        assert_eq!(html.matches("data-testid=\"describe-group\"").count(), 2);
        assert!(html.contains("data-depth=\"1\""));
        assert!(html.contains("<span class=\"describe-count\" data-testid=\"describe-count\">2 tests</span>"));
        assert!(html.contains("data-collapsed=\"false\""));
    }

    #[test]
    fn test_full_path_display() {
        let config = RenderConfig {
            path_display: PathDisplay::Full,
            ..RenderConfig::default()
        };
        let html = render_one(&config, passing_suite(), 0);
        assert!(html.contains("data-testid=\"suite-name\">src/math/add.test.js</span>"));
    }

    #[test]
    fn test_hidden_passed_tests_drop_empty_groups() {
        let mut config = RenderConfig::default();
        config.visibility.show_passed = false;
        let html = render_one(&config, failing_suite(), 0);
        assert!(!html.contains("logs in"));
        assert!(html.contains("rejects"));
        assert_eq!(html.matches("data-testid=\"describe-group\"").count(), 2);

        let html = render_one(&config, passing_suite(), 0);
        assert!(!html.contains("describe-group"));
        assert!(!html.contains("adds"));
    }

    #[test]
    fn test_failing_suite_stays_open() {
        let mut config = RenderConfig::default();
        config.collapse.collapse_passed = true;
        config.collapse.expand_level = 0;
        let html = render_one(&config, failing_suite(), 2);
        assert!(html.contains("class=\"suite\" data-status=\"failed\" data-has-failed=\"true\""));
        assert!(!html.contains("data-collapsed=\"true\""));

        config.collapse.collapse_all = true;
        let html = render_one(&config, failing_suite(), 0);
        assert!(html.contains("class=\"suite collapsed\""));
    }

    #[test]
    fn test_suite_error_only_without_test_messages() {
        let mut suite = SuiteRecord::from_tests("broken.test.js", vec![]);
        suite.failure_message = Some("Cannot find module 'x'".into());
        let html = render_one(&RenderConfig::default(), suite, 0);
        assert!(html.contains("data-testid=\"suite-error-block\">Cannot find module &#39;x&#39;</pre>"));

        let mut suite = failing_suite();
        suite.failure_message = Some("suite level text".into());
        let html = render_one(&RenderConfig::default(), suite, 0);
        assert!(!html.contains("suite level text"));
        assert!(html.contains("error-container"));
    }

    #[test]
    fn test_leaf_icons_and_badges() {
        let suite = SuiteRecord::from_tests(
            "icons.test.js",
            vec![
                TestRecord::new("retried", TestStatus::Passed).with_invocations(3),
                TestRecord::new("later", TestStatus::Todo),
                TestRecord::new("odd", TestStatus::Unknown),
            ],
        );
        let html = render_one(&RenderConfig::default(), suite, 0);
        assert!(html.contains("bi bi-arrow-repeat test-status-icon flaky"));
        assert!(html.contains("<i class=\"bi bi-arrow-repeat\"></i>3 attempts</span>"));
        assert!(html.contains("bi bi-skip-forward-fill test-status-icon todo"));
        assert!(html.contains("bi bi-circle test-status-icon unknown"));
        assert!(html.contains("data-flaky=\"true\""));
    }

    #[test]
    fn test_titles_are_escaped() {
        let suite = SuiteRecord::from_tests(
            "x.test.js",
            vec![TestRecord::new("<b>bold</b> & \"quoted\"", TestStatus::Passed).within(&["<group>"])],
        );
        let html = render_one(&RenderConfig::default(), suite, 0);
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt; &amp; &quot;quoted&quot;"));
        assert!(html.contains("data-testid=\"describe-name\">&lt;group&gt;</span>"));
        assert!(!html.contains("<b>bold"));
    }

    #[test]
    fn test_duration_toggle() {
        let config = RenderConfig {
            show_duration: false,
            ..RenderConfig::default()
        };
        let html = render_one(&config, passing_suite(), 0);
        assert!(!html.contains("test-duration"));
        assert!(render_one(&RenderConfig::default(), passing_suite(), 0).contains("suite-duration"));
    }
}
