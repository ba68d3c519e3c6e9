//! ID, time and truncation formatters for CLI output.

use chrono::Utc;

use crate::domain::models::parse_timestamp;

/// First 8 chars of an id for list display.
pub fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(end, _)| &id[..end])
}

/// Render a server timestamp as "5m ago", falling back to the raw text.
pub fn relative_time_str(raw: &str) -> String {
    let Some(at) = parse_timestamp(raw) else {
        return raw.to_string();
    };
    let seconds = (Utc::now() - at).num_seconds();
    match seconds {
        s if s < 0 => "just now".to_string(),
        s if s < 60 => format!("{s}s ago"),
        s if s < 3600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3600),
        s => format!("{}d ago", s / 86_400),
    }
}

/// Format an optional timestamp or "-".
pub fn relative_time_opt(raw: Option<&str>) -> String {
    raw.map_or_else(|| "-".to_string(), relative_time_str)
}

/// Truncate a string with a unicode ellipsis, counting characters.
pub fn truncate_ellipsis(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}\u{2026}")
    }
}

/// "1 agent", "3 agents".
pub fn count_label(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_truncate_ellipsis_is_char_safe() {
        assert_eq!(truncate_ellipsis("hello", 10), "hello");
        assert_eq!(truncate_ellipsis("héllo wörld", 6), "héllo\u{2026}");
    }

    #[test]
    fn test_relative_time_falls_back_to_raw() {
        assert_eq!(relative_time_str("not a date"), "not a date");
        assert_eq!(relative_time_opt(None), "-");
    }

    #[test]
    fn test_count_label() {
        assert_eq!(count_label(1, "agent", "agents"), "1 agent");
        assert_eq!(count_label(0, "agent", "agents"), "0 agents");
    }
}
