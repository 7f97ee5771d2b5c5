//! JSON reporter: the report data as a machine-readable sibling artifact

use crate::ReportData;
use std::path::{Path, PathBuf};

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Serialize the report data
    pub fn report(&self, data: &ReportData) -> String {
        if self.pretty {
            serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string(data).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the JSON sibling of an HTML report goes: `.html` becomes `.json`,
/// any other name gets `.json` appended.
pub fn sibling_path(html_path: &Path) -> PathBuf {
    match html_path.extension().and_then(|e| e.to_str()) {
        Some("html") => html_path.with_extension("json"),
        _ => {
            let mut name = html_path.as_os_str().to_owned();
            name.push(".json");
            PathBuf::from(name)
        }
    }
}
