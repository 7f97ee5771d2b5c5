//! Host metadata shown in the report's environment panel
//!
//! The renderer never touches the host directly; it asks an
//! [`EnvironmentSource`] at most once per render.

use std::fs;
use std::path::Path;

/// Values shown in the environment panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentInfo {
    pub reporter_version: String,
    pub platform: String,
    pub cwd: String,
    pub cpu_cores: usize,
    /// Rounded to whole gigabytes, when the host exposes it
    pub total_memory: Option<String>,
}

impl EnvironmentInfo {
    /// (label, value) rows in display order
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("Verdict", self.reporter_version.clone()),
            ("Platform", self.platform.clone()),
            ("Working Directory", self.cwd.clone()),
            ("CPU Cores", self.cpu_cores.to_string()),
        ];
        if let Some(memory) = &self.total_memory {
            rows.push(("Memory", memory.clone()));
        }
        rows
    }
}

/// Provider of host metadata
pub trait EnvironmentSource {
    fn environment(&self) -> EnvironmentInfo;
}

/// Reads metadata from the running process and OS
#[derive(Debug, Clone, Copy, Default)]
pub struct HostEnvironment;

impl EnvironmentSource for HostEnvironment {
    fn environment(&self) -> EnvironmentInfo {
        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let cpu_cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        EnvironmentInfo {
            reporter_version: env!("CARGO_PKG_VERSION").to_string(),
            platform: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
            cwd,
            cpu_cores,
            total_memory: total_memory_gb(Path::new("/proc/meminfo")),
        }
    }
}

/// A fixed set of values, for tests and for callers that collect metadata
/// elsewhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticEnvironment(pub EnvironmentInfo);

impl EnvironmentSource for StaticEnvironment {
    fn environment(&self) -> EnvironmentInfo {
        self.0.clone()
    }
}

/// Parse `MemTotal:` (kB) out of a meminfo-style file
fn total_memory_gb(meminfo: &Path) -> Option<String> {
    let content = fs::read_to_string(meminfo).ok()?;
    parse_mem_total(&content)
}

fn parse_mem_total(content: &str) -> Option<String> {
    let line = content.lines().find(|l| l.starts_with("MemTotal:"))?;
    let kb: f64 = line
        .trim_start_matches("MemTotal:")
        .split_whitespace()
        .next()?
        .parse()
        .ok()?;
    let gb = (kb / 1024.0 / 1024.0).round() as u64;
    Some(format!("{}GB", gb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mem_total() {
        let meminfo = "MemTotal:       16303428 kB\nMemFree:         1234 kB\n";
        assert_eq!(parse_mem_total(meminfo).as_deref(), Some("16GB"));
        assert_eq!(parse_mem_total("MemFree: 1 kB"), None);
        assert_eq!(parse_mem_total("MemTotal: lots"), None);
    }

    #[test]
    fn test_host_environment_is_populated() {
        let env = HostEnvironment.environment();
        assert_eq!(env.reporter_version, env!("CARGO_PKG_VERSION"));
        assert!(env.cpu_cores >= 1);
        assert!(env.platform.contains(std::env::consts::OS));
    }

    #[test]
    fn test_rows_skip_missing_memory() {
        let info = EnvironmentInfo {
            reporter_version: "1.0.0".into(),
            platform: "linux x86_64".into(),
            cwd: "/work".into(),
            cpu_cores: 8,
            total_memory: None,
        };
        let rows = info.rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3], ("CPU Cores", "8".to_string()));
    }
}
