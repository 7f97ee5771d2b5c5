//! Config schema and deserialization

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::TestStatus;

pub const DEFAULT_PAGE_TITLE: &str = "Test Report";
pub const DEFAULT_OUTPUT_PATH: &str = "verdict-report.html";
pub const DEFAULT_SANS_FONT: &str = "Google Sans";
pub const DEFAULT_MONO_FONT: &str = "Google Sans Code";

/// Built-in color themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreset {
    Light,
    Github,
    Monokai,
    Dracula,
    Nord,
    #[default]
    #[serde(other)]
    Dark,
}

impl ThemePreset {
    pub const ALL: [ThemePreset; 6] = [
        ThemePreset::Dark,
        ThemePreset::Light,
        ThemePreset::Github,
        ThemePreset::Monokai,
        ThemePreset::Dracula,
        ThemePreset::Nord,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ThemePreset::Dark => "dark",
            ThemePreset::Light => "light",
            ThemePreset::Github => "github",
            ThemePreset::Monokai => "monokai",
            ThemePreset::Dracula => "dracula",
            ThemePreset::Nord => "nord",
        }
    }

    /// Human-facing label in the theme menu
    pub fn label(self) -> &'static str {
        match self {
            ThemePreset::Dark => "Dark",
            ThemePreset::Light => "Light",
            ThemePreset::Github => "Github",
            ThemePreset::Monokai => "Monokai",
            ThemePreset::Dracula => "Dracula",
            ThemePreset::Nord => "Nord",
        }
    }

    /// Background swatch shown next to the label
    pub fn preview_color(self) -> &'static str {
        match self {
            ThemePreset::Dark => "#1e1e1e",
            ThemePreset::Light => "#ffffff",
            ThemePreset::Github => "#0d1117",
            ThemePreset::Monokai => "#272822",
            ThemePreset::Dracula => "#282a36",
            ThemePreset::Nord => "#2e3440",
        }
    }

    pub fn css_class(self) -> String {
        format!("theme-{}", self.id())
    }

    /// Lenient parse used for CLI input; unknown names fall back to dark
    pub fn parse(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_default()
    }
}

/// How suite names are displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathDisplay {
    Full,
    /// Last path segment only
    #[default]
    #[serde(other)]
    Filename,
}

/// Reordering applied to suites and to the tests within each suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    Status,
    Duration,
    Name,
    /// Keep runner order; unknown modes land here too
    #[default]
    #[serde(other)]
    Default,
}

impl SortMode {
    /// Lenient parse used for CLI input; unknown modes keep runner order
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "status" => SortMode::Status,
            "duration" => SortMode::Duration,
            "name" => SortMode::Name,
            _ => SortMode::Default,
        }
    }
}

/// How the run's end time is shown in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    Iso,
    Relative,
    #[default]
    #[serde(other)]
    Locale,
}

/// CSS variable overrides layered over the active theme
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomColors {
    pub bg_primary: Option<String>,
    pub bg_secondary: Option<String>,
    pub bg_hover: Option<String>,
    pub text_primary: Option<String>,
    pub text_secondary: Option<String>,
    pub border_color: Option<String>,
    pub color_passed: Option<String>,
    pub color_failed: Option<String>,
    pub color_skipped: Option<String>,
    pub color_accent: Option<String>,
}

impl CustomColors {
    /// (css variable, value) pairs for every color that is set
    pub fn variables(&self) -> Vec<(&'static str, &str)> {
        [
            ("--bg-primary", &self.bg_primary),
            ("--bg-secondary", &self.bg_secondary),
            ("--bg-hover", &self.bg_hover),
            ("--text-primary", &self.text_primary),
            ("--text-secondary", &self.text_secondary),
            ("--border-color", &self.border_color),
            ("--color-passed", &self.color_passed),
            ("--color-failed", &self.color_failed),
            ("--color-skipped", &self.color_skipped),
            ("--color-accent", &self.color_accent),
        ]
        .into_iter()
        .filter_map(|(var, value)| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (var, v))
        })
        .collect()
    }
}

/// Font families as written in the config file: `false` disables web fonts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontsSetting {
    Enabled(bool),
    Families {
        #[serde(default)]
        sans: Option<String>,
        #[serde(default)]
        mono: Option<String>,
    },
}

/// Resolved web font families
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFamilies {
    pub sans: String,
    pub mono: String,
}

impl Default for FontFamilies {
    fn default() -> Self {
        Self {
            sans: DEFAULT_SANS_FONT.to_string(),
            mono: DEFAULT_MONO_FONT.to_string(),
        }
    }
}

impl FontFamilies {
    /// Google Fonts stylesheet URL for both families
    pub fn stylesheet_url(&self) -> String {
        format!(
            "https://fonts.googleapis.com/css2?family={}:wght@400;500&family={}:wght@400;500;600&display=swap",
            self.mono.replace(' ', "+"),
            self.sans.replace(' ', "+")
        )
    }
}

/// Free-form key/value panel shown under the header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdditionalInfo {
    pub title: Option<String>,
    /// Entries in the order they were written
    pub entries: Vec<(String, String)>,
}

impl AdditionalInfo {
    /// Convert a JSON object. `title` becomes the panel title; null and
    /// empty values are dropped; numbers and booleans are stringified.
    pub fn from_json(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut info = AdditionalInfo::default();
        for (key, value) in map {
            let text = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if key == "title" {
                info.title = Some(text).filter(|t| !t.is_empty());
            } else if !text.is_empty() {
                info.entries.push((key.clone(), text));
            }
        }
        info
    }
}

/// Which statuses are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub show_passed: bool,
    pub show_failed: bool,
    /// Governs pending, skipped, todo and disabled tests
    pub show_pending: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            show_passed: true,
            show_failed: true,
            show_pending: true,
        }
    }
}

impl Visibility {
    pub fn allows(&self, status: TestStatus) -> bool {
        match status {
            TestStatus::Passed => self.show_passed,
            TestStatus::Failed => self.show_failed,
            TestStatus::Unknown => true,
            _ => self.show_pending,
        }
    }
}

/// Initial collapse state of suites and groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollapsePolicy {
    /// Collapse everything, failures included
    pub collapse_all: bool,
    /// Collapse suites and groups without failures
    pub collapse_passed: bool,
    /// Suites at or past this index start collapsed; negative disables
    pub expand_level: i32,
}

impl Default for CollapsePolicy {
    fn default() -> Self {
        Self {
            collapse_all: false,
            collapse_passed: false,
            expand_level: -1,
        }
    }
}

/// Everything the HTML renderer needs, fully resolved
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub page_title: String,
    pub subtitle: Option<String>,
    /// URL or data URI, used as given
    pub logo: Option<String>,
    pub logo_height: u32,
    pub visibility: Visibility,
    pub show_duration: bool,
    pub path_display: PathDisplay,
    pub show_progress_bar: bool,
    pub collapse: CollapsePolicy,
    pub sort: SortMode,
    pub theme: ThemePreset,
    pub custom_colors: Option<CustomColors>,
    pub enable_theme_toggle: bool,
    pub include_environment: bool,
    pub additional_info: Option<AdditionalInfo>,
    pub minify: bool,
    pub date_format: DateFormat,
    pub fonts: Option<FontFamilies>,
    /// Stylesheet and script text appended after the built-in ones
    pub custom_css: Option<String>,
    pub custom_js: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_title: DEFAULT_PAGE_TITLE.to_string(),
            subtitle: None,
            logo: None,
            logo_height: 32,
            visibility: Visibility::default(),
            show_duration: true,
            path_display: PathDisplay::Filename,
            show_progress_bar: true,
            collapse: CollapsePolicy::default(),
            sort: SortMode::Default,
            theme: ThemePreset::Dark,
            custom_colors: None,
            enable_theme_toggle: false,
            include_environment: false,
            additional_info: None,
            minify: true,
            date_format: DateFormat::Locale,
            fonts: Some(FontFamilies::default()),
            custom_css: None,
            custom_js: None,
        }
    }
}

/// Where and how the CLI writes its artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub output_path: PathBuf,
    /// Also write the report data as JSON next to the HTML file
    pub output_json: bool,
    pub open_on_failure: bool,
    pub custom_css_path: Option<PathBuf>,
    pub custom_js_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            output_json: false,
            open_on_failure: false,
            custom_css_path: None,
            custom_js_path: None,
        }
    }
}

/// Root config structure for .verdictrc.json. Every field is optional so
/// that `extends` chains and CLI flags can layer over each other.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Extend another config file (path relative to this config, or package name)
    #[serde(default)]
    pub extends: Option<String>,

    pub output_path: Option<PathBuf>,
    pub output_json: Option<bool>,
    pub open_on_failure: Option<bool>,

    pub page_title: Option<String>,
    pub subtitle: Option<String>,
    pub logo: Option<String>,
    pub logo_height: Option<u32>,

    pub show_passed: Option<bool>,
    pub show_failed: Option<bool>,
    pub show_pending: Option<bool>,
    pub show_duration: Option<bool>,
    pub show_file_path: Option<PathDisplay>,
    pub show_progress_bar: Option<bool>,

    pub sort: Option<SortMode>,
    pub collapse_passed: Option<bool>,
    pub collapse_all: Option<bool>,
    pub expand_level: Option<i32>,

    pub date_format: Option<DateFormat>,
    pub theme: Option<ThemePreset>,
    pub custom_colors: Option<CustomColors>,
    pub enable_theme_toggle: Option<bool>,
    pub include_environment: Option<bool>,
    pub additional_info: Option<serde_json::Map<String, serde_json::Value>>,
    pub minify: Option<bool>,
    pub fonts: Option<FontsSetting>,

    pub custom_css_path: Option<PathBuf>,
    pub custom_js_path: Option<PathBuf>,
}

/// Values given on the command line; `Some` wins over the config file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output_path: Option<PathBuf>,
    pub output_json: bool,
    pub open_on_failure: bool,
    pub page_title: Option<String>,
    pub theme: Option<ThemePreset>,
    pub sort: Option<SortMode>,
    pub collapse_all: bool,
    pub collapse_passed: bool,
    pub expand_level: Option<i32>,
    pub no_minify: bool,
}

macro_rules! inherit {
    ($self:ident, $base:ident, $($field:ident),+ $(,)?) => {
        $(
            if $self.$field.is_none() {
                $self.$field = $base.$field;
            }
        )+
    };
}

impl Config {
    /// Merge CLI overrides into config. CLI values take precedence.
    pub fn merge_with_cli(mut self, cli: &CliOverrides) -> Self {
        if cli.output_path.is_some() {
            self.output_path = cli.output_path.clone();
        }
        if cli.output_json {
            self.output_json = Some(true);
        }
        if cli.open_on_failure {
            self.open_on_failure = Some(true);
        }
        if cli.page_title.is_some() {
            self.page_title = cli.page_title.clone();
        }
        if cli.theme.is_some() {
            self.theme = cli.theme;
        }
        if cli.sort.is_some() {
            self.sort = cli.sort;
        }
        if cli.collapse_all {
            self.collapse_all = Some(true);
        }
        if cli.collapse_passed {
            self.collapse_passed = Some(true);
        }
        if cli.expand_level.is_some() {
            self.expand_level = cli.expand_level;
        }
        if cli.no_minify {
            self.minify = Some(false);
        }
        self
    }

    /// Merge another config into this one (for extends)
    pub fn merge_from(&mut self, base: Config) {
        // Base values only fill what this config leaves unset
        inherit!(
            self,
            base,
            extends,
            output_path,
            output_json,
            open_on_failure,
            page_title,
            subtitle,
            logo,
            logo_height,
            show_passed,
            show_failed,
            show_pending,
            show_duration,
            show_file_path,
            show_progress_bar,
            sort,
            collapse_passed,
            collapse_all,
            expand_level,
            date_format,
            theme,
            enable_theme_toggle,
            include_environment,
            minify,
            fonts,
            custom_css_path,
            custom_js_path,
        );

        // Color overrides merge per variable
        if let Some(base_colors) = base.custom_colors {
            match self.custom_colors.as_mut() {
                None => self.custom_colors = Some(base_colors),
                Some(colors) => {
                    inherit!(
                        colors,
                        base_colors,
                        bg_primary,
                        bg_secondary,
                        bg_hover,
                        text_primary,
                        text_secondary,
                        border_color,
                        color_passed,
                        color_failed,
                        color_skipped,
                        color_accent,
                    );
                }
            }
        }

        // Additional info merges per key, this config's entries last
        if let Some(mut base_info) = base.additional_info {
            match self.additional_info.as_mut() {
                None => self.additional_info = Some(base_info),
                Some(info) => {
                    for (key, value) in std::mem::take(info) {
                        base_info.insert(key, value);
                    }
                    *info = base_info;
                }
            }
        }
    }

    /// Resolve rendering options, applying defaults for anything unset
    pub fn render_config(&self) -> RenderConfig {
        let defaults = RenderConfig::default();
        let fonts = match &self.fonts {
            None | Some(FontsSetting::Enabled(true)) => defaults.fonts.clone(),
            Some(FontsSetting::Enabled(false)) => None,
            Some(FontsSetting::Families { sans, mono }) => Some(FontFamilies {
                sans: non_empty(sans).unwrap_or(DEFAULT_SANS_FONT).to_string(),
                mono: non_empty(mono).unwrap_or(DEFAULT_MONO_FONT).to_string(),
            }),
        };

        RenderConfig {
            page_title: self.page_title.clone().unwrap_or(defaults.page_title),
            subtitle: self.subtitle.clone().filter(|s| !s.is_empty()),
            logo: self.logo.clone().filter(|s| !s.is_empty()),
            logo_height: self.logo_height.unwrap_or(defaults.logo_height),
            visibility: Visibility {
                show_passed: self.show_passed.unwrap_or(true),
                show_failed: self.show_failed.unwrap_or(true),
                show_pending: self.show_pending.unwrap_or(true),
            },
            show_duration: self.show_duration.unwrap_or(defaults.show_duration),
            path_display: self.show_file_path.unwrap_or_default(),
            show_progress_bar: self.show_progress_bar.unwrap_or(defaults.show_progress_bar),
            collapse: CollapsePolicy {
                collapse_all: self.collapse_all.unwrap_or(false),
                collapse_passed: self.collapse_passed.unwrap_or(false),
                expand_level: self.expand_level.unwrap_or(-1),
            },
            sort: self.sort.unwrap_or_default(),
            theme: self.theme.unwrap_or_default(),
            custom_colors: self.custom_colors.clone(),
            enable_theme_toggle: self.enable_theme_toggle.unwrap_or(false),
            include_environment: self.include_environment.unwrap_or(false),
            additional_info: self.additional_info.as_ref().map(AdditionalInfo::from_json),
            minify: self.minify.unwrap_or(defaults.minify),
            date_format: self.date_format.unwrap_or_default(),
            fonts,
            custom_css: None,
            custom_js: None,
        }
    }

    /// Resolve output options, applying defaults for anything unset
    pub fn output_config(&self) -> OutputConfig {
        let defaults = OutputConfig::default();
        OutputConfig {
            output_path: self.output_path.clone().unwrap_or(defaults.output_path),
            output_json: self.output_json.unwrap_or(false),
            open_on_failure: self.open_on_failure.unwrap_or(false),
            custom_css_path: self.custom_css_path.clone(),
            custom_js_path: self.custom_js_path.clone(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
