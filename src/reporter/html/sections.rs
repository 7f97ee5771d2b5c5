//! Page furniture around the suites: header, filters, progress, panels,
//! theme controls

use regex::Regex;
use std::sync::OnceLock;

use super::format::{escape_embedded, escape_html};
use crate::config::{AdditionalInfo, CustomColors, FontFamilies, RenderConfig, ThemePreset};
use crate::environment::EnvironmentInfo;
use crate::Summary;

const DEFAULT_ADDITIONAL_INFO_TITLE: &str = "Additional Information";

fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^https?://\S+$").expect("valid URL pattern"))
}

/// Title block; `meta_info` is already-escaped markup
pub(super) fn report_header(config: &RenderConfig, meta_info: &str) -> String {
    let title = escape_html(&config.page_title);
    let branding = if config.subtitle.is_some() || config.logo.is_some() {
        let logo = config
            .logo
            .as_deref()
            .map(|logo| {
                format!(
                    "<img src=\"{}\" alt=\"Logo\" class=\"header-logo\" data-testid=\"header-logo\" style=\"height: {}px\">",
                    escape_html(logo),
                    config.logo_height
                )
            })
            .unwrap_or_default();
        let subtitle = config
            .subtitle
            .as_deref()
            .map(|s| {
                format!(
                    "<p class=\"report-subtitle\" data-testid=\"report-subtitle\">{}</p>",
                    escape_html(s)
                )
            })
            .unwrap_or_default();
        format!(
            r##"
      <div class="report-branding">
        <div class="report-title-row" data-testid="report-title-row">
          {}
          <h1 class="report-title" data-testid="report-title">{}</h1>
        </div>
        {}
      </div>"##,
            logo, title, subtitle
        )
    } else {
        format!(
            "\n      <h1 class=\"report-title\" data-testid=\"report-title\">{}</h1>",
            title
        )
    };

    format!(
        r##"
    <div class="report-header" data-testid="report-header">{}
      <div class="meta-info" data-testid="meta-info">{}</div>
    </div>
"##,
        branding, meta_info
    )
}

pub(super) fn interrupted_banner() -> &'static str {
    r##"
    <div class="interrupted-banner" data-testid="interrupted-banner">
      <i class="bi bi-exclamation-triangle-fill"></i>
      <span>Test run stopped early. Not all tests were executed.</span>
    </div>
"##
}

/// Search box and status filter chips
pub(super) fn filter_bar(summary: &Summary) -> String {
    let chips = [
        ("all", "all", "All", None, summary.total_tests),
        ("passed", "passed", "Passed", Some("bi-check-lg passed"), summary.passed_tests),
        ("failed", "failed", "Failed", Some("bi-x-lg failed"), summary.failed_tests),
        ("flaky", "flaky", "Flaky", Some("bi-arrow-repeat flaky"), summary.flaky_tests),
        ("pending", "skipped", "Skipped", Some("bi-skip-forward-fill skipped"), summary.skipped_tests()),
    ];

    let mut html = String::from(
        r##"
    <div class="header">
      <div class="search-box">
        <i class="bi bi-search"></i>
        <input type="text" id="search-input" data-testid="search-input" placeholder="Filter tests">
      </div>
      <div class="subnav-container">
        <nav class="subnav">
"##,
    );
    for (filter, testid, label, icon, count) in chips {
        let icon = icon
            .map(|i| format!("<i class=\"bi {} subnav-icon\"></i>", i))
            .unwrap_or_default();
        html.push_str(&format!(
            r##"          <a class="subnav-item{active}" data-filter="{filter}" data-testid="filter-chip-{testid}" href="#" role="button">
            {icon}<span class="subnav-item-label">{label}</span>
            <span class="counter">{count}</span>
          </a>
"##,
            active = if filter == "all" { " active" } else { "" },
            filter = filter,
            testid = testid,
            icon = icon,
            label = label,
            count = count,
        ));
    }
    html.push_str("        </nav>\n      </div>\n    </div>\n");
    html
}

/// Stacked passed/failed/skipped bar
pub(super) fn progress_bar(summary: &Summary) -> String {
    let total = summary.total_tests.max(1) as f64;
    let skipped = summary.skipped_tests();
    let pct = |n: usize| n as f64 / total * 100.0;

    format!(
        r##"
    <div class="progress-bar-container" data-testid="progress-bar">
      <div class="progress-bar-header" data-testid="progress-bar-header">
        <div class="progress-bar-stats" data-testid="progress-bar-stats">
          <span class="stat"><span class="dot passed"></span> {passed} passed</span>
          <span class="stat"><span class="dot failed"></span> {failed} failed</span>
          <span class="stat"><span class="dot skipped"></span> {skipped} skipped</span>
        </div>
        <span data-testid="progress-bar-passed-percentage">{rounded}% passed</span>
      </div>
      <div class="progress-bar" data-testid="progress-bar-track">
        <div class="segment passed" style="width: {passed_pct:.2}%"></div>
        <div class="segment failed" style="width: {failed_pct:.2}%"></div>
        <div class="segment skipped" style="width: {skipped_pct:.2}%"></div>
      </div>
    </div>
"##,
        passed = summary.passed_tests,
        failed = summary.failed_tests,
        skipped = skipped,
        rounded = pct(summary.passed_tests).round() as u64,
        passed_pct = pct(summary.passed_tests),
        failed_pct = pct(summary.failed_tests),
        skipped_pct = pct(skipped),
    )
}

fn info_panel(id: &str, testid: &str, title: &str, rows: &[(String, String)]) -> String {
    let mut html = format!(
        r##"
    <div class="environment-info" id="{id}" data-testid="{testid}">
      <div class="env-header clickable" data-testid="{testid}-header">
        <i class="bi bi-chevron-down"></i>
        <span>{title}</span>
      </div>
      <div class="env-grid" data-testid="{testid}-grid">
"##,
        id = id,
        testid = testid,
        title = escape_html(title)
    );
    for (label, value) in rows {
        html.push_str(&format!(
            r##"        <div class="env-item">
          <span class="env-label">{}</span>
          <span class="env-value">{}</span>
        </div>
"##,
            label, value
        ));
    }
    html.push_str("      </div>\n    </div>\n");
    html
}

pub(super) fn environment_panel(env: &EnvironmentInfo) -> String {
    let rows: Vec<(String, String)> = env
        .rows()
        .into_iter()
        .map(|(label, value)| (label.to_string(), escape_html(&value)))
        .collect();
    info_panel("env-info", "environment-info", "Environment", &rows)
}

/// Key/value panel; values that are plain http(s) URLs become links
pub(super) fn additional_info_panel(info: &AdditionalInfo) -> String {
    if info.entries.is_empty() {
        return String::new();
    }
    let rows: Vec<(String, String)> = info
        .entries
        .iter()
        .map(|(label, value)| {
            let value = if url_pattern().is_match(value) {
                format!(
                    "<a href=\"{0}\" target=\"_blank\" rel=\"noopener noreferrer\">{0}</a>",
                    escape_html(value)
                )
            } else {
                escape_html(value)
            };
            (escape_html(label), value)
        })
        .collect();
    let title = info
        .title
        .as_deref()
        .unwrap_or(DEFAULT_ADDITIONAL_INFO_TITLE);
    info_panel("additional-info", "additional-info", title, &rows)
}

pub(super) fn empty_state() -> &'static str {
    r##"
    <div class="empty-state" data-testid="empty-state">
      <i class="bi bi-inbox"></i>
      <p>No test results found</p>
    </div>
"##
}

pub(super) fn theme_toggle(current: ThemePreset) -> String {
    let mut html = String::from(
        r##"
  <button class="theme-toggle" id="theme-toggle" data-testid="theme-toggle" title="Change theme">
    <i class="bi bi-palette"></i>
  </button>
  <div class="theme-menu" id="theme-menu" data-testid="theme-menu">
"##,
    );
    for theme in ThemePreset::ALL {
        html.push_str(&format!(
            r##"    <div class="theme-option{active}" data-theme="{id}" data-testid="theme-option-{id}">
      <span class="color-preview" style="background: {preview}"></span>
      {label}
    </div>
"##,
            active = if theme == current { " active" } else { "" },
            id = theme.id(),
            preview = theme.preview_color(),
            label = theme.label(),
        ));
    }
    html.push_str("  </div>\n");
    html
}

pub(super) fn jump_to_top(with_theme_toggle: bool) -> String {
    format!(
        r##"
  <button class="jump-to-top{}" id="jump-to-top" data-testid="jump-to-top" title="Jump to top" aria-label="Jump to top">
    <i class="bi bi-chevron-up"></i>
  </button>
"##,
        if with_theme_toggle { " with-theme-toggle" } else { "" }
    )
}

/// `:root` block overriding theme variables; empty when nothing is set
pub(super) fn custom_colors_css(colors: &CustomColors) -> String {
    let rules: Vec<String> = colors
        .variables()
        .into_iter()
        .map(|(var, value)| format!("  {}: {};", var, value))
        .collect();
    if rules.is_empty() {
        return String::new();
    }
    escape_embedded(&format!(":root {{\n{}\n}}", rules.join("\n")), "style")
}

/// `<link>` tags loading the web fonts
pub(super) fn font_links(fonts: &FontFamilies) -> String {
    format!(
        r##"
  <link rel="preconnect" href="https://fonts.googleapis.com">
  <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
  <link href="{}" rel="stylesheet">"##,
        escape_html(&fonts.stylesheet_url())
    )
}

pub(super) fn font_override_css(fonts: &FontFamilies) -> String {
    let clean = |family: &str| family.replace(['\'', '<', '>', ';'], "");
    format!(
        ":root {{ --font-sans: '{}'; --font-mono: '{}'; }}",
        clean(&fonts.sans),
        clean(&fonts.mono)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_plain_and_branded() {
        let mut config = RenderConfig::default();
        let plain = report_header(&config, "meta");
        assert!(plain.contains("<h1 class=\"report-title\" data-testid=\"report-title\">Test Report</h1>"));
        assert!(!plain.contains("report-branding"));

        config.subtitle = Some("Nightly <main>".into());
        config.logo = Some("https://example.com/logo.png".into());
        config.logo_height = 48;
        let branded = report_header(&config, "meta");
        assert!(branded.contains("report-branding"));
        assert!(branded.contains("Nightly &lt;main&gt;"));
        assert!(branded.contains("style=\"height: 48px\""));
    }

    #[test]
    fn test_filter_bar_counts() {
        let summary = Summary {
            total_tests: 12,
            passed_tests: 7,
            failed_tests: 3,
            pending_tests: 1,
            todo_tests: 1,
            flaky_tests: 0,
            ..Summary::default()
        };
        let html = filter_bar(&summary);
        assert!(html.contains("data-filter=\"pending\" data-testid=\"filter-chip-skipped\""));
        let skipped = html.split("filter-chip-skipped").nth(1).unwrap();
        assert!(skipped.contains("<span class=\"counter\">2</span>"));
        assert_eq!(html.matches("subnav-item active").count(), 1);
    }

    #[test]
    fn test_progress_bar_percentages() {
        let summary = Summary {
            total_tests: 4,
            passed_tests: 3,
            failed_tests: 1,
            ..Summary::default()
        };
        let html = progress_bar(&summary);
        assert!(html.contains("75% passed"));
        assert!(html.contains("width: 75.00%"));
        assert!(html.contains("width: 25.00%"));
        assert!(progress_bar(&Summary::default()).contains("0% passed"));
    }

    #[test]
    fn test_additional_info_links_urls() {
        let info = AdditionalInfo {
            title: None,
            entries: vec![
                ("Build".into(), "https://ci.example.com/1?a=b&c=d".into()),
                ("Branch".into(), "main".into()),
            ],
        };
        let html = additional_info_panel(&info);
        assert!(html.contains("Additional Information"));
        assert!(html.contains("<a href=\"https://ci.example.com/1?a=b&amp;c=d\""));
        assert!(html.contains("<span class=\"env-value\">main</span>"));
        assert_eq!(additional_info_panel(&AdditionalInfo::default()), "");
    }

    #[test]
    fn test_theme_menu_marks_current() {
        let html = theme_toggle(ThemePreset::Nord);
        assert_eq!(html.matches("class=\"theme-option").count(), 6);
        assert!(html.contains("theme-option active\" data-theme=\"nord\""));
        assert!(html.contains("background: #2e3440"));
    }

    #[test]
    fn test_custom_colors_css() {
        let colors = CustomColors {
            color_passed: Some("#00ff00".into()),
            bg_primary: Some("  ".into()),
            ..CustomColors::default()
        };
        assert_eq!(custom_colors_css(&colors), ":root {\n  --color-passed: #00ff00;\n}");
        assert_eq!(custom_colors_css(&CustomColors::default()), "");
    }

    #[test]
    fn test_font_override_strips_quotes() {
        let fonts = FontFamilies {
            sans: "Inter'; }".into(),
            mono: "Fira Code".into(),
        };
        assert_eq!(
            font_override_css(&fonts),
            ":root { --font-sans: 'Inter }'; --font-mono: 'Fira Code'; }"
        );
    }
}
