//! Failure message parsing
//!
//! Turns a raw assertion failure (as printed by Jest and friends) into
//! structured sections: the headline message, expected/received values, a
//! unified diff and stack frames. Parsing never fails; anything that is not
//! recognized is either kept in the message or stored as an opaque frame.

use regex::Regex;
use std::sync::OnceLock;

/// Frames shown before the "Show N more frames" control
pub const VISIBLE_STACK_FRAMES: usize = 3;

/// Bullet that prefixes each failing test's section in runner output
const BULLET: char = '●';

/// One line of a stack trace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackFrame {
    /// The trimmed source line
    pub raw: String,
    pub file_path: Option<String>,
    pub line_number: Option<u32>,
    pub column_number: Option<u32>,
    pub function_name: Option<String>,
    pub is_node_module: bool,
}

impl StackFrame {
    fn opaque(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            ..Self::default()
        }
    }
}

/// Structured view of one failure message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedError {
    pub main_message: String,
    pub expected: Option<String>,
    pub received: Option<String>,
    /// Unified `-`/`+` block, lines kept verbatim
    pub diff: Option<String>,
    pub stack_frames: Vec<StackFrame>,
}

impl ParsedError {
    /// Frames rendered up front
    pub fn visible_frames(&self) -> &[StackFrame] {
        let end = self.stack_frames.len().min(VISIBLE_STACK_FRAMES);
        &self.stack_frames[..end]
    }

    /// Frames rendered behind the reveal control
    pub fn hidden_frames(&self) -> &[StackFrame] {
        let start = self.stack_frames.len().min(VISIBLE_STACK_FRAMES);
        &self.stack_frames[start..]
    }

    /// Label of the reveal control, if any frames are hidden
    pub fn reveal_label(&self) -> Option<String> {
        match self.hidden_frames().len() {
            0 => None,
            n => Some(more_frames_label(n)),
        }
    }
}

/// "Show 1 more frame" / "Show N more frames"
pub fn more_frames_label(count: usize) -> String {
    format!(
        "Show {} more frame{}",
        count,
        if count == 1 { "" } else { "s" }
    )
}

fn ansi_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").expect("valid ANSI pattern"))
}

struct FramePatterns {
    any: Regex,
    full: Regex,
    location: Regex,
    function: Regex,
}

fn frame_patterns() -> &'static FramePatterns {
    static RE: OnceLock<FramePatterns> = OnceLock::new();
    RE.get_or_init(|| FramePatterns {
        any: Regex::new(r"^\s*at\s+.+").expect("valid frame pattern"),
        full: Regex::new(r"^at\s+(.+?)\s+\((.+?):(\d+):(\d+)\)$").expect("valid frame pattern"),
        location: Regex::new(r"^at\s+(.+?):(\d+):(\d+)$").expect("valid frame pattern"),
        function: Regex::new(r"^at\s+(.+)$").expect("valid frame pattern"),
    })
}

/// Remove terminal color/style escape sequences
pub fn strip_ansi(text: &str) -> String {
    ansi_pattern().replace_all(text, "").into_owned()
}

/// Parse a raw failure message. See the module docs for the sections.
pub fn parse(raw: &str) -> ParsedError {
    let text = strip_ansi(raw);

    let mut parsed = ParsedError::default();
    let mut message_lines: Vec<&str> = Vec::new();
    let mut diff_lines: Vec<&str> = Vec::new();
    let mut in_diff = false;
    let mut in_stack = false;

    for line in text.lines() {
        let trimmed = line.trim();

        if let Some(value) = trimmed.strip_prefix("Expected:") {
            if parsed.expected.is_none() {
                parsed.expected = Some(value.trim().to_string());
            }
            continue;
        }
        if let Some(value) = trimmed.strip_prefix("Received:") {
            if parsed.received.is_none() {
                parsed.received = Some(value.trim().to_string());
            }
            continue;
        }

        let opens_diff = trimmed == "Difference:" || trimmed.starts_with("- Expected");
        if opens_diff || trimmed.starts_with("- ") || trimmed.starts_with("+ ") {
            in_diff |= opens_diff;
            if in_diff {
                diff_lines.push(line);
                continue;
            }
        }

        if frame_patterns().any.is_match(line) {
            in_stack = true;
            parsed.stack_frames.push(parse_stack_frame(line));
            continue;
        }

        if !in_stack && !in_diff && !trimmed.is_empty() && !trimmed.starts_with(BULLET) {
            message_lines.push(line);
        }
    }

    parsed.main_message = message_lines.join("\n").trim().to_string();
    if !diff_lines.is_empty() {
        parsed.diff = Some(diff_lines.join("\n"));
    }
    parsed
}

/// Parse a single `at ...` line, most specific shape first
pub fn parse_stack_frame(line: &str) -> StackFrame {
    let trimmed = line.trim();
    let patterns = frame_patterns();

    if let Some(caps) = patterns.full.captures(trimmed) {
        let file = caps[2].to_string();
        return StackFrame {
            raw: trimmed.to_string(),
            function_name: Some(caps[1].to_string()),
            line_number: caps[3].parse().ok(),
            column_number: caps[4].parse().ok(),
            is_node_module: file.contains("node_modules"),
            file_path: Some(file),
        };
    }

    if let Some(caps) = patterns.location.captures(trimmed) {
        let file = caps[1].to_string();
        return StackFrame {
            raw: trimmed.to_string(),
            function_name: None,
            line_number: caps[2].parse().ok(),
            column_number: caps[3].parse().ok(),
            is_node_module: file.contains("node_modules"),
            file_path: Some(file),
        };
    }

    if let Some(caps) = patterns.function.captures(trimmed) {
        return StackFrame {
            function_name: Some(caps[1].to_string()),
            ..StackFrame::opaque(trimmed)
        };
    }

    StackFrame::opaque(trimmed)
}
