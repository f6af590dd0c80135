//! String helpers shared by the artifact builders.

/// Lower-cases `value` and collapses every run of characters outside
/// `[a-z0-9]` into a single underscore, trimming underscores at both ends.
///
/// Returns `"workflow"` when nothing survives.
#[must_use]
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_separator = false;

    for ch in value.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(ch);
        } else {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        "workflow".to_string()
    } else {
        slug
    }
}

/// Shortens `value` to at most `max_chars` characters, replacing the last
/// kept character with an ellipsis when anything was cut.
#[must_use]
pub fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut shortened: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    shortened.push('…');
    shortened
}

/// Makes text safe to place inside a quoted flowchart label or comment.
///
/// Double quotes become single quotes, square brackets become parentheses,
/// and line breaks become a literal `\n` escape.
#[must_use]
pub fn escape_label(value: &str) -> String {
    value
        .replace("\r\n", "\n")
        .replace('"', "'")
        .replace('[', "(")
        .replace(']', ")")
        .replace('\n', "\\n")
}

/// Renders `value` as a double-quoted string literal with JSON escaping.
///
/// Both generated code targets accept JSON string syntax verbatim.
#[must_use]
pub fn quoted(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Order Sync -- Daily!"), "order_sync_daily");
        assert_eq!(slugify("  __Leading and trailing__  "), "leading_and_trailing");
    }

    #[test]
    fn slugify_falls_back_when_empty() {
        assert_eq!(slugify(""), "workflow");
        assert_eq!(slugify("!!! ???"), "workflow");
    }

    #[test]
    fn slugify_drops_non_ascii_letters() {
        assert_eq!(slugify("Café Übersicht 2"), "caf_bersicht_2");
    }

    #[test]
    fn truncate_leaves_short_values() {
        assert_eq!(truncate("Fetch", 5), "Fetch");
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("ééééé", 3), "éé…");
    }

    #[test]
    fn escape_label_neutralizes_syntax() {
        assert_eq!(
            escape_label("He said \"hi\" [ok]\r\nbye"),
            "He said 'hi' (ok)\\nbye"
        );
    }

    #[test]
    fn quoted_escapes_json_specials() {
        assert_eq!(quoted("a \"b\"\n"), "\"a \\\"b\\\"\\n\"");
    }
}
