//! Failure details: one error block per raw message, plus a copy button

use super::format::{escape_attr_multiline, escape_html};
use super::RenderContext;
use crate::diagnostic::{self, ParsedError, StackFrame};

/// Error container for a failing test's messages
pub(super) fn error_container(ctx: &RenderContext<'_>, messages: &[String]) -> String {
    let error_id = ctx.next_error_id();
    let copy_text = messages
        .iter()
        .map(|m| diagnostic::strip_ansi(m))
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut html = String::new();
    html.push_str("\n          <div class=\"error-container\" data-testid=\"error-container\">\n");
    html.push_str(&format!(
        r##"            <div class="error-actions" data-testid="error-actions">
              <button class="copy-error-btn" data-testid="copy-error-btn" data-error="{}" title="Copy error to clipboard">
                <i class="bi bi-clipboard"></i>
                <span>Copy</span>
              </button>
            </div>
"##,
        escape_attr_multiline(&copy_text)
    ));
    for (idx, message) in messages.iter().enumerate() {
        let parsed = diagnostic::parse(message);
        html.push_str(&error_block(&parsed, &format!("{}-{}", error_id, idx)));
    }
    html.push_str("          </div>\n");
    html
}

/// A single parsed failure
pub(super) fn error_block(parsed: &ParsedError, block_id: &str) -> String {
    let mut html = String::from(
        "            <div class=\"error-block-enhanced\" data-testid=\"error-block-enhanced\">\n",
    );

    if !parsed.main_message.is_empty() {
        html.push_str(&format!(
            "              <pre class=\"error-message\" data-testid=\"error-message\">{}</pre>\n",
            escape_html(&parsed.main_message)
        ));
    }

    if parsed.expected.is_some() || parsed.received.is_some() {
        html.push_str("              <div class=\"error-diff-container\" data-testid=\"error-diff-container\">\n");
        for (label, key, value) in [
            ("Expected", "expected", &parsed.expected),
            ("Received", "received", &parsed.received),
        ] {
            if let Some(value) = value {
                html.push_str(&format!(
                    r##"                <div class="error-diff-row {key}" data-testid="error-diff-row-{key}">
                  <span class="error-diff-label" data-testid="error-diff-label-{key}">{label}</span>
                  <pre class="error-diff-value" data-testid="error-diff-value-{key}">{value}</pre>
                </div>
"##,
                    key = key,
                    label = label,
                    value = escape_html(value)
                ));
            }
        }
        html.push_str("              </div>\n");
    }

    if let Some(diff) = &parsed.diff {
        html.push_str(&format!(
            r##"              <div class="error-diff-full" data-testid="error-diff-full">
                <div class="error-diff-title" data-testid="error-diff-title">Difference</div>
                <pre class="error-diff-content" data-testid="error-diff-content">{}</pre>
              </div>
"##,
            diff_html(diff)
        ));
    }

    if !parsed.stack_frames.is_empty() {
        html.push_str("              <div class=\"error-stack\" data-testid=\"error-stack\">\n");
        html.push_str("                <div class=\"error-stack-title\" data-testid=\"error-stack-title\">Stack Trace</div>\n");
        html.push_str("                <pre class=\"error-stack-frames\" data-testid=\"error-stack-frames\">");
        for frame in parsed.visible_frames() {
            html.push_str(&stack_frame(frame));
        }
        let hidden = parsed.hidden_frames();
        if !hidden.is_empty() {
            html.push_str(&format!(
                "<span class=\"error-stack-hidden\" data-testid=\"error-stack-hidden\" id=\"{}-hidden\" style=\"display: none;\">",
                block_id
            ));
            for frame in hidden {
                html.push_str(&stack_frame(frame));
            }
            html.push_str("</span>");
        }
        html.push_str("</pre>\n");

        if let Some(label) = parsed.reveal_label() {
            html.push_str(&format!(
                r##"                <button class="error-stack-toggle" data-testid="error-stack-toggle" data-target="{}-hidden">
                  <i class="bi bi-chevron-down"></i>
                  <span>{}</span>
                </button>
"##,
                block_id, label
            ));
        }
        html.push_str("              </div>\n");
    }

    html.push_str("            </div>\n");
    html
}

/// One frame; frames with a location link into the editor
fn stack_frame(frame: &StackFrame) -> String {
    let classes = if frame.is_node_module {
        "error-stack-frame is-node-module"
    } else {
        "error-stack-frame"
    };
    let open = format!(
        "<span class=\"{}\" data-testid=\"error-stack-frame\" data-is-node-module=\"{}\">",
        classes, frame.is_node_module
    );

    match (&frame.file_path, frame.line_number) {
        (Some(path), Some(line)) => {
            let position = match frame.column_number {
                Some(column) => format!(":{}:{}", line, column),
                None => format!(":{}", line),
            };
            let display = path.rsplit(['/', '\\']).next().unwrap_or(path);
            let function = frame
                .function_name
                .as_deref()
                .map(|f| format!(" <span class=\"stack-function\" data-testid=\"stack-function\">{}</span>", escape_html(f)))
                .unwrap_or_default();
            format!(
                "{open}<span class=\"stack-at\" data-testid=\"stack-at\">at</span>{function} <a href=\"vscode://file/{href}{position}\" class=\"stack-location\" data-testid=\"stack-location\" title=\"Open in VS Code: {href}\"><span class=\"stack-file\" data-testid=\"stack-file\">{file}</span><span class=\"stack-line\" data-testid=\"stack-line\">{position}</span></a></span>",
                open = open,
                function = function,
                href = escape_html(path),
                position = position,
                file = escape_html(display),
            )
        }
        _ => format!(
            "{}<span class=\"stack-raw\" data-testid=\"stack-raw\">{}</span></span>",
            open,
            escape_html(&frame.raw)
        ),
    }
}

/// Wrap removed and added lines; headers like `---`/`+++` stay plain
pub(super) fn diff_html(diff: &str) -> String {
    diff.lines()
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.starts_with('-') && !trimmed.starts_with("---") {
                format!(
                    "<span class=\"diff-removed\" data-testid=\"diff-removed\">{}</span>",
                    escape_html(line)
                )
            } else if trimmed.starts_with('+') && !trimmed.starts_with("+++") {
                format!(
                    "<span class=\"diff-added\" data-testid=\"diff-added\">{}</span>",
                    escape_html(line)
                )
            } else {
                escape_html(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Suite-level failure text (e.g. the file failed to load)
pub(super) fn suite_error(message: &str) -> String {
    format!(
        r##"
        <div class="test-item suite-error" data-status="failed" data-flaky="false" data-testid="suite-error">
          <i class="bi bi-exclamation-octagon test-status-icon failed"></i>
          <div class="test-content">
            <pre class="error-block" data-testid="suite-error-block">{}</pre>
          </div>
        </div>
"##,
        escape_html(&diagnostic::strip_ansi(message))
    )
}
