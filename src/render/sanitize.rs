//! Text sanitization for workbook output.
//!
//! Paragraph templates may carry raw markup from the rich-text editor that
//! produced them. Spreadsheet cells are plain text, so the audit row in a
//! paragraph sheet neutralizes tags: `<br>` variants become newlines and
//! every other tag is dropped. Entities common in editor output are
//! unescaped. The raster export never calls this; it keeps literals
//! verbatim apart from newline handling.

use regex::Regex;
use std::sync::OnceLock;

fn br_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid br pattern"))
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"</?[a-zA-Z][^<>]*>").expect("valid tag pattern"))
}

/// Convert `<br>`-style markers to newlines and strip remaining tags.
pub fn markup_to_plain(text: &str) -> String {
    let with_breaks = br_pattern().replace_all(text, "\n");
    let stripped = tag_pattern().replace_all(&with_breaks, "");
    unescape_entities(&stripped)
}

fn unescape_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_br_variants_become_newlines() {
        assert_eq!(markup_to_plain("a<br>b"), "a\nb");
        assert_eq!(markup_to_plain("a<br/>b"), "a\nb");
        assert_eq!(markup_to_plain("a<BR />b"), "a\nb");
    }

    #[test]
    fn test_tags_stripped_brackets_kept() {
        assert_eq!(markup_to_plain("<b>bold</b> [Name]"), "bold [Name]");
        assert_eq!(markup_to_plain("<span class=\"x\">y</span>"), "y");
    }

    #[test]
    fn test_entities_unescaped() {
        assert_eq!(markup_to_plain("a&nbsp;&amp;&nbsp;b"), "a & b");
        assert_eq!(markup_to_plain("5 &lt; 6"), "5 < 6");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(markup_to_plain("2 < 3 is true"), "2 < 3 is true");
        assert_eq!(markup_to_plain("[Name] stays"), "[Name] stays");
    }
}
