//! HTML reporter: one self-contained page with inline styles and script

mod failure;
mod format;
mod minify;
mod script;
mod sections;
mod suite;

use chrono::{DateTime, Utc};
use std::cell::Cell;

use crate::config::RenderConfig;
use crate::environment::{EnvironmentSource, HostEnvironment};
use crate::sort;
use crate::ReportData;

pub use format::{escape_html, file_name, format_date, format_duration};
pub use minify::minify_html;
pub use script::{client_script, THEME_STORAGE_KEY};

use format::escape_embedded;

const STYLESHEET: &str = include_str!("report.css");
const ICONS_STYLESHEET: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap-icons@1.11.1/font/bootstrap-icons.css";

/// Per-render state handed to the section builders
pub(crate) struct RenderContext<'a> {
    pub config: &'a RenderConfig,
    next_error: Cell<usize>,
}

impl<'a> RenderContext<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self {
            config,
            next_error: Cell::new(0),
        }
    }

    /// Element id for the next error container. Ids count up from zero in
    /// document order, so the same input always yields the same page.
    pub fn next_error_id(&self) -> String {
        let id = self.next_error.get();
        self.next_error.set(id + 1);
        format!("error-{}", id)
    }
}

/// Reporter for the HTML page
pub struct HtmlReporter<'a> {
    config: &'a RenderConfig,
    environment: &'a dyn EnvironmentSource,
    now: DateTime<Utc>,
}

impl<'a> HtmlReporter<'a> {
    /// Create a reporter reading host metadata from the running process
    pub fn new(config: &'a RenderConfig) -> Self {
        Self {
            config,
            environment: &HostEnvironment,
            now: Utc::now(),
        }
    }

    /// Read environment metadata from `source` instead of the host
    pub fn with_environment(mut self, source: &'a dyn EnvironmentSource) -> Self {
        self.environment = source;
        self
    }

    /// Reference time for relative dates
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Render the full document
    pub fn report(&self, data: &ReportData) -> String {
        let config = self.config;
        let ctx = RenderContext::new(config);
        let summary = &data.summary;

        let environment = if config.include_environment {
            Some(self.environment.environment())
        } else {
            None
        };
        let suites = sort::sorted(data, config.sort);
        log::debug!(
            "rendering {} suites ({} tests), sort {:?}",
            suites.len(),
            summary.total_tests,
            config.sort
        );

        let mut html = String::new();
        html.push_str(&format!(
            r##"<!DOCTYPE html>
<html lang="en" class="{}">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{}</title>"##,
            config.theme.css_class(),
            escape_html(&config.page_title)
        ));
        if let Some(fonts) = &config.fonts {
            html.push_str(&sections::font_links(fonts));
        }
        html.push_str(&format!(
            "\n  <link href=\"{}\" rel=\"stylesheet\">\n  <style>\n",
            ICONS_STYLESHEET
        ));
        html.push_str(STYLESHEET);
        if let Some(fonts) = &config.fonts {
            html.push('\n');
            html.push_str(&sections::font_override_css(fonts));
        }
        if let Some(colors) = &config.custom_colors {
            let css = sections::custom_colors_css(colors);
            if !css.is_empty() {
                html.push('\n');
                html.push_str(&css);
            }
        }
        if let Some(css) = &config.custom_css {
            html.push('\n');
            html.push_str(&escape_embedded(css, "style"));
        }
        html.push_str("\n  </style>\n</head>\n<body>\n  <div class=\"container\">");

        let meta_info = format!(
            "{}&nbsp;&nbsp;&nbsp;Total time: {}",
            escape_html(&format_date(&summary.end_time, config.date_format, self.now)),
            format_duration(summary.duration)
        );
        html.push_str(&sections::report_header(config, &meta_info));
        if summary.was_interrupted {
            html.push_str(sections::interrupted_banner());
        }
        html.push_str(&sections::filter_bar(summary));
        if config.show_progress_bar {
            html.push_str(&sections::progress_bar(summary));
        }
        if let Some(environment) = &environment {
            html.push_str(&sections::environment_panel(environment));
        }
        if let Some(info) = &config.additional_info {
            html.push_str(&sections::additional_info_panel(info));
        }

        html.push_str("\n    <div id=\"test-suites\" data-testid=\"test-suites\">");
        for (index, entry) in suites.iter().enumerate() {
            html.push_str(&suite::render_suite(&ctx, entry, index));
        }
        html.push_str("    </div>\n");
        if suites.is_empty() {
            html.push_str(sections::empty_state());
        }
        html.push_str("  </div>\n");

        if config.enable_theme_toggle {
            html.push_str(&sections::theme_toggle(config.theme));
        }
        html.push_str(&sections::jump_to_top(config.enable_theme_toggle));

        html.push_str("\n  <script>\n");
        html.push_str(&client_script(config.enable_theme_toggle, config.theme));
        if let Some(js) = &config.custom_js {
            html.push('\n');
            html.push_str(&escape_embedded(js, "script"));
        }
        html.push_str("\n  </script>\n</body>\n</html>\n");

        if config.minify {
            minify_html(&html)
        } else {
            html
        }
    }
}

/// Render `data` with `config`, reading host metadata through `environment`
pub fn render(data: &ReportData, config: &RenderConfig, environment: &dyn EnvironmentSource) -> String {
    HtmlReporter::new(config)
        .with_environment(environment)
        .report(data)
}
