//! Configuration loading for Verdict

mod schema;

pub use schema::{
    AdditionalInfo, CliOverrides, CollapsePolicy, Config, CustomColors, DateFormat, FontFamilies,
    FontsSetting, OutputConfig, PathDisplay, RenderConfig, SortMode, ThemePreset, Visibility,
    DEFAULT_OUTPUT_PATH, DEFAULT_PAGE_TITLE,
};

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".verdictrc.json";

/// Find and load config file with extends resolution. Searches current directory then parents.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        };
        if path.exists() {
            Some(path)
        } else {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    } else {
        find_config_in_parents(work_dir)
    };

    match path {
        Some(path) => {
            log::debug!("loading config from {}", path.display());
            load_config_with_extends(&path, &mut HashSet::new())
        }
        None => Ok(Config::default()),
    }
}

/// Load a config file and resolve extends chain
fn load_config_with_extends(config_path: &Path, visited: &mut HashSet<PathBuf>) -> Result<Config> {
    // Prevent circular extends
    let canonical = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());
    if !visited.insert(canonical) {
        anyhow::bail!(
            "Circular extends detected in config: {}",
            config_path.display()
        );
    }

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config: {}", config_path.display()))?;

    if let Some(extends) = config.extends.take() {
        let base_config = resolve_extends(config_path, &extends, visited)?;
        config.merge_from(base_config);
    }

    // Relative asset paths are relative to the file that names them
    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    config.custom_css_path = config.custom_css_path.map(|p| anchor(config_dir, p));
    config.custom_js_path = config.custom_js_path.map(|p| anchor(config_dir, p));

    Ok(config)
}

fn anchor(dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        dir.join(path)
    }
}

/// Resolve an extends reference to a config
fn resolve_extends(
    config_path: &Path,
    extends: &str,
    visited: &mut HashSet<PathBuf>,
) -> Result<Config> {
    let config_dir = config_path.parent().unwrap_or(Path::new("."));

    let extends_path = if extends.starts_with("./") || extends.starts_with("../") {
        config_dir.join(extends)
    } else if extends.starts_with('/') {
        PathBuf::from(extends)
    } else {
        // Shared presets published as packages, e.g. "@company/verdict-config"
        find_node_modules_config(config_dir, extends).unwrap_or_else(|| config_dir.join(extends))
    };

    let extends_path = if extends_path.extension().is_none() {
        extends_path.with_extension("json")
    } else {
        extends_path
    };

    if !extends_path.exists() {
        anyhow::bail!(
            "Extended config not found: {} (referenced from {})",
            extends_path.display(),
            config_path.display()
        );
    }

    load_config_with_extends(&extends_path, visited)
}

/// Try to find a config in node_modules
fn find_node_modules_config(start_dir: &Path, package: &str) -> Option<PathBuf> {
    let mut dir = start_dir;
    loop {
        let package_dir = dir.join("node_modules").join(package);
        for filename in [CONFIG_FILENAME, "verdict.config.json", "index.json"] {
            let candidate = package_dir.join(filename);
            if candidate.exists() {
                return Some(candidate);
            }
        }

        let direct = dir.join("node_modules").join(format!("{}.json", package));
        if direct.exists() {
            return Some(direct);
        }

        dir = dir.parent()?;
    }
}

/// Search for .verdictrc.json in directory and its parents
fn find_config_in_parents(mut dir: &Path) -> Option<PathBuf> {
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Read a custom stylesheet or script. A missing file is reported and
/// skipped rather than failing the whole report.
pub fn read_custom_asset(path: Option<&Path>, kind: &str) -> Option<String> {
    let path = path?;
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            log::warn!("Custom {} file not readable: {}: {}", kind, path.display(), e);
            None
        }
    }
}

/// Contents written by `verdict init`
pub fn default_config_json(page_title: Option<&str>, theme: ThemePreset) -> String {
    let value = serde_json::json!({
        "outputPath": DEFAULT_OUTPUT_PATH,
        "pageTitle": page_title.unwrap_or(DEFAULT_PAGE_TITLE),
        "theme": theme.id(),
        "enableThemeToggle": true,
        "showPassed": true,
        "showFailed": true,
        "showPending": true,
        "showDuration": true,
        "showFilePath": "filename",
        "sort": "default",
        "collapsePassed": false,
        "dateFormat": "locale",
        "minify": true
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}
