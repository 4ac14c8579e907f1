use lazy_static::lazy_static;
use regex::Regex;

/// Parses never return more than this many options.
pub const MAX_OPTIONS: usize = 6;

lazy_static! {
    // A numbered item ("3. label") or a bullet ("- label" / "* label"),
    // with at least one space between marker and label.
    static ref OPTION_LINE: Regex = Regex::new(r"^\s*(?:\d+\.|[-*])\s+(.*)$").unwrap();
}

/// Extract enumerated choice labels from a block of assistant text, in
/// first-seen order, deduplicated, capped at [`MAX_OPTIONS`]. Lines that do
/// not look like list items are ignored.
pub fn extract_options(text: &str) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    for line in text.lines() {
        let Some(caps) = OPTION_LINE.captures(line) else {
            continue;
        };
        let label = caps[1].trim();
        if label.is_empty() {
            continue;
        }
        if options.iter().any(|existing| existing == label) {
            continue;
        }
        options.push(label.to_string());
        if options.len() == MAX_OPTIONS {
            break;
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_and_bulleted_lines_in_order() {
        let text = "Here are some ideas:\n1. Alpha\n2. Beta\n- Gamma\nplain text";
        assert_eq!(extract_options(text), vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn test_caps_at_six() {
        let text = "1. A\n2. B\n3. C\n4. D\n5. E\n6. F\n7. G\n8. H";
        assert_eq!(extract_options(text), vec!["A", "B", "C", "D", "E", "F"]);
    }

    #[test]
    fn test_deduplicates_keeping_first() {
        let text = "1. X\n2. Y\n3. X";
        assert_eq!(extract_options(text), vec!["X", "Y"]);
    }

    #[test]
    fn test_ignores_markers_without_content() {
        // "1." with no label, a bare dash, and a marker followed by spaces
        let text = "1.\n-\n*   \n- valid";
        assert_eq!(extract_options(text), vec!["valid"]);
    }

    #[test]
    fn test_leading_whitespace_and_crlf() {
        let text = "  1. Indented\r\n\t- Tabbed\r\n";
        assert_eq!(extract_options(text), vec!["Indented", "Tabbed"]);
    }

    #[test]
    fn test_requires_space_after_marker() {
        // "1.Alpha" and "-beta" lack the separating whitespace
        let text = "1.Alpha\n-beta\n* gamma";
        assert_eq!(extract_options(text), vec!["gamma"]);
    }

    #[test]
    fn test_no_options_in_plain_prose() {
        assert!(extract_options("Nothing enumerable here.").is_empty());
        assert!(extract_options("").is_empty());
    }
}
