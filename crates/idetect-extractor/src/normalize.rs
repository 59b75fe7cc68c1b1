//! Article text normalization
//!
//! Fixes artifacts of scraped and OCR'd source text before parsing.

use once_cell::sync::Lazy;
use regex::Regex;

static MARKER_AFTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-zA-Z0-9])(IMPACT|RESPONSE)").expect("valid regex"));
static MARKER_BEFORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(IMPACT|RESPONSE)([a-zA-Z0-9])").expect("valid regex"));
static LETTER_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-zA-Z])(\d)").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

const MAX_PASSES: usize = 8;

/// Normalize article text.
///
/// Rules run in order and repeat until the text stops changing, so the
/// result is a fixed point: `cleanup(cleanup(x)) == cleanup(x)`.
pub fn cleanup(text: &str) -> String {
    let mut current = text.to_string();
    for _ in 0..MAX_PASSES {
        let next = cleanup_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn cleanup_pass(text: &str) -> String {
    // Section markers glued to neighbouring words
    let text = MARKER_AFTER.replace_all(text, "$1. $2");
    let text = MARKER_BEFORE.replace_all(&text, "$1. $2");

    let text = LETTER_DIGIT.replace_all(&text, "$1. $2");
    let text = join_split_numbers(&text);

    // Line breaks, tabs and runs of blanks become one space
    let text = WHITESPACE.replace_all(&text, " ");

    let text = text.replace("peole", "people");

    text.chars().filter(|c| is_printable(*c)).collect()
}

/// Drop a single whitespace character sitting between two digits
fn join_split_numbers(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        let between_digits = c.is_whitespace()
            && out.chars().last().is_some_and(|p| p.is_ascii_digit())
            && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
        if !between_digits {
            out.push(c);
        }
    }
    out
}

/// ASCII digits, letters, punctuation and the space
fn is_printable(c: char) -> bool {
    c.is_ascii_graphic() || c == ' '
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_section_markers() {
        assert_eq!(cleanup("flooding continuesIMPACT"), "flooding continues. IMPACT");
        assert_eq!(cleanup("IMPACTThe river"), "IMPACT. The river");
        assert_eq!(cleanup("2017RESPONSE teams"), "2017. RESPONSE teams");
    }

    #[test]
    fn test_letter_digit_boundary() {
        assert_eq!(cleanup("in Sindh12 people"), "in Sindh. 12 people");
    }

    #[test]
    fn test_split_numbers_join() {
        assert_eq!(cleanup("about 1 200 houses"), "about 1200 houses");
        assert_eq!(cleanup("1 2 3"), "123");
    }

    #[test]
    fn test_whitespace_and_typos() {
        assert_eq!(cleanup("200\r\npeole  were   evacuated"), "200 people were evacuated");
        assert_eq!(cleanup("500\t\tpeople  \t fled"), "500 people fled");
        assert_eq!(cleanup("homes\x0bdestroyed\x0c\tin Assam"), "homes destroyed in Assam");
    }

    #[test]
    fn test_non_printable_dropped() {
        assert_eq!(cleanup("caf\u{e9} \u{2013} open"), "caf open");
        assert_eq!(cleanup(""), "");
    }

    proptest! {
        #[test]
        fn prop_cleanup_is_idempotent(text in "\\PC{0,80}") {
            let once = cleanup(&text);
            prop_assert_eq!(cleanup(&once), once);
        }

        #[test]
        fn prop_cleanup_is_idempotent_on_artifacts(text in "[a-zA-Z0-9 \\t\\r\\n.IMPACTRESPONSEpeol\u{e9}]{0,60}") {
            let once = cleanup(&text);
            prop_assert_eq!(cleanup(&once), once);
        }

        #[test]
        fn prop_cleanup_leaves_single_spaces(text in "[a-z0-9 \\t\\r\\n\\x0b\\x0c]{0,60}") {
            let cleaned = cleanup(&text);
            prop_assert!(!cleaned.contains("  "));
            prop_assert!(cleaned.chars().all(|c| c == ' ' || c.is_ascii_graphic()));
        }
    }
}
