//! Whitespace minification that leaves preformatted text alone

use regex::Regex;
use std::sync::OnceLock;

struct Patterns {
    protected: Regex,
    comment: Regex,
    whitespace: Regex,
    between_tags: Regex,
}

fn patterns() -> &'static Patterns {
    static RE: OnceLock<Patterns> = OnceLock::new();
    RE.get_or_init(|| Patterns {
        protected: Regex::new(r"(?is)<pre\b.*?</pre>|<script\b.*?</script>")
            .expect("valid protected-block pattern"),
        comment: Regex::new(r"(?s)<!--.*?-->").expect("valid comment pattern"),
        whitespace: Regex::new(r"\s+").expect("valid whitespace pattern"),
        between_tags: Regex::new(r">\s+<").expect("valid inter-tag pattern"),
    })
}

/// Minify an HTML document.
///
/// `<pre>` and `<script>` blocks are copied through byte for byte. Everything
/// between them loses comments, has whitespace runs collapsed to one space
/// and whitespace between tags removed.
pub fn minify_html(html: &str) -> String {
    let p = patterns();
    let mut out = String::with_capacity(html.len());
    let mut last = 0;

    for block in p.protected.find_iter(html) {
        let mut gap = squeeze(&html[last..block.start()]);
        // Blocks start and end with a tag, so space touching them is inter-tag
        if last > 0 && gap.starts_with(" <") {
            gap.remove(0);
        }
        if gap.ends_with("> ") || gap == " " {
            gap.pop();
        }
        out.push_str(&gap);
        out.push_str(block.as_str());
        last = block.end();
    }

    let tail = squeeze(&html[last..]);
    let tail = if last > 0 && tail.starts_with(" <") { tail.trim_start() } else { &tail };
    out.push_str(tail);

    let trimmed = out.trim();
    if trimmed.len() == out.len() {
        out
    } else {
        trimmed.to_string()
    }
}

fn squeeze(segment: &str) -> String {
    let p = patterns();
    let without_comments = p.comment.replace_all(segment, "");
    let collapsed = p.whitespace.replace_all(&without_comments, " ");
    p.between_tags.replace_all(&collapsed, "><").into_owned()
}
