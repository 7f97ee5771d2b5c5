//! Text helpers shared by the HTML sections

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::config::DateFormat;

/// Escape `& < > " '` for element text and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape for an attribute whose value must keep its line breaks through
/// minification
pub fn escape_attr_multiline(text: &str) -> String {
    escape_html(text)
        .replace("\r\n", "&#10;")
        .replace('\n', "&#10;")
        .replace('\t', "&#9;")
}

/// Keep embedded stylesheet or script text from closing its element early
pub fn escape_embedded(text: &str, tag: &str) -> String {
    text.replace(&format!("</{}", tag), &format!("<\\/{}", tag))
}

/// `850ms`, `1.3s`, `2m 5.0s`
pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        return format!("{}ms", ms);
    }
    if ms < 60_000 {
        let tenths = (ms + 50) / 100;
        return format!("{}.{}s", tenths / 10, tenths % 10);
    }
    let minutes = ms / 60_000;
    let tenths = (ms % 60_000 + 50) / 100;
    format!("{}m {}.{}s", minutes, tenths / 10, tenths % 10)
}

/// Format the run's end time. Times are shown in UTC so the same data
/// always renders the same way; `now` only feeds the relative format.
pub fn format_date(iso: &str, format: DateFormat, now: DateTime<Utc>) -> String {
    if format == DateFormat::Iso {
        return iso.to_string();
    }
    let Ok(parsed) = DateTime::parse_from_rfc3339(iso) else {
        return iso.to_string();
    };
    let date = parsed.with_timezone(&Utc);

    match format {
        DateFormat::Relative => relative_time(date, now),
        _ => {
            let (pm, hour) = date.hour12();
            format!(
                "{}, {}:{:02}:{:02} {}",
                short_date(date),
                hour,
                date.minute(),
                date.second(),
                if pm { "PM" } else { "AM" }
            )
        }
    }
}

fn short_date(date: DateTime<Utc>) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

fn relative_time(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - date).num_seconds();
    let mins = secs.div_euclid(60);
    let hours = mins.div_euclid(60);

    if secs < 60 {
        "just now".to_string()
    } else if mins < 60 {
        format!("{} minute{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if hours < 24 {
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else {
        short_date(date)
    }
}

/// Last `/`-separated segment, or the whole path if that is empty
pub fn file_name(path: &str) -> &str {
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => path,
    }
}

/// "1 test" / "N tests"
pub fn count_label(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, if count == 1 { "" } else { "s" })
}
