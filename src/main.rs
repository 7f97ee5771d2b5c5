//! Verdict: HTML test report generator CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};
use verdict::collector::Collector;
use verdict::config::{
    default_config_json, load_config, read_custom_asset, CliOverrides, SortMode, ThemePreset,
    CONFIG_FILENAME,
};
use verdict::reporter::json::sibling_path;
use verdict::reporter::{ConsoleReporter, HtmlReporter, JsonReporter};
use verdict::sort::sort_report;

/// Results file read when none is given
const DEFAULT_RESULTS_PATH: &str = "jest-results.json";

/// Verdict: turn a test run into a self-contained HTML report
#[derive(Parser, Debug)]
#[command(name = "verdict")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Jest `--json` output or saved report data (default: jest-results.json)
    results: Option<PathBuf>,

    /// Where to write the HTML report
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Also write the report data as JSON next to the HTML file
    #[arg(long)]
    json: bool,

    /// Open the report in a browser when the run failed
    #[arg(long)]
    open_on_failure: bool,

    /// Path to config file (default: search .verdictrc.json in current dir and parents)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Page title
    #[arg(long)]
    title: Option<String>,

    /// Color theme: dark, light, github, monokai, dracula, nord
    #[arg(long)]
    theme: Option<String>,

    /// Order suites and tests: default, status, duration, name
    #[arg(long, value_name = "MODE")]
    sort: Option<String>,

    /// Start with every suite and group collapsed
    #[arg(long)]
    collapse_all: bool,

    /// Start with passing suites and groups collapsed
    #[arg(long)]
    collapse_passed: bool,

    /// Expand only the first N suites
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    expand_level: Option<i32>,

    /// Keep the HTML readable instead of minifying it
    #[arg(long)]
    no_minify: bool,

    /// Quiet mode (only print where the report went)
    #[arg(long, short)]
    quiet: bool,

    /// Directory suite paths are shown relative to (default: current)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Exit with 1 when the test run failed
    #[arg(long)]
    fail_on_failure: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create .verdictrc.json with sensible defaults
    Init {
        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();

    if let Some(Commands::Init { dir, force }) = args.command {
        return run_init(dir.as_deref(), force);
    }

    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    let overrides = CliOverrides {
        output_path: args.output.clone(),
        output_json: args.json,
        open_on_failure: args.open_on_failure,
        page_title: args.title.clone(),
        theme: args.theme.as_deref().map(ThemePreset::parse),
        sort: args.sort.as_deref().map(SortMode::parse),
        collapse_all: args.collapse_all,
        collapse_passed: args.collapse_passed,
        expand_level: args.expand_level,
        no_minify: args.no_minify,
    };
    let config = load_config(&cwd, args.config.as_deref())?.merge_with_cli(&overrides);
    let output = config.output_config();
    let mut render = config.render_config();
    render.custom_css = read_custom_asset(output.custom_css_path.as_deref(), "CSS");
    render.custom_js = read_custom_asset(output.custom_js_path.as_deref(), "JS");

    let results_path = args
        .results
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_PATH));
    let root = args.root.clone().unwrap_or_else(|| cwd.clone());
    let mut data = Collector::new(root)
        .collect_file(&results_path)
        .context("Failed to collect test results")?;

    if data.test_suites.is_empty() && !args.quiet {
        eprintln!("{}: No test suites in {}", "Warning".yellow(), results_path.display());
    }

    // Sorted once here so the JSON sibling matches the page order
    sort_report(&mut data, render.sort);

    let html = HtmlReporter::new(&render).report(&data);
    write_file(&output.output_path, &html)?;

    let json_path = if output.output_json {
        let path = sibling_path(&output.output_path);
        write_file(&path, &JsonReporter::new().pretty().report(&data))?;
        Some(path)
    } else {
        None
    };

    let mut console = ConsoleReporter::new();
    if args.quiet {
        console = console.quiet();
    }
    console.report(&data, &output.output_path, json_path.as_deref());

    let failed = data.summary.failed_tests > 0 || data.summary.failed_suites > 0;
    if failed && output.open_on_failure {
        open_in_browser(&output.output_path);
    }

    if failed && args.fail_on_failure {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write: {}", path.display()))
}

/// Hand the report to the platform's opener; failures only warn
fn open_in_browser(path: &Path) {
    let target = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };
    command.arg(&target);

    log::debug!("opening {} in browser", target.display());
    if let Err(e) = command.spawn() {
        eprintln!(
            "{}: Could not open {} in a browser: {}",
            "Warning".yellow(),
            target.display(),
            e
        );
    }
}

fn run_init(dir: Option<&Path>, force: bool) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let dir = dir.unwrap_or(&cwd);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        eprintln!(
            "{}: {} already exists; use --force to overwrite or --dir to write elsewhere",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let json = default_config_json(None, ThemePreset::default());
    write_file(&config_path, &format!("{}\n", json))?;
    eprintln!("{}: Created {}", "Info".blue(), config_path.display());
    Ok(ExitCode::SUCCESS)
}
