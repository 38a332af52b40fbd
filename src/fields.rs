//! Field marker extraction and slot key derivation.
//!
//! A paragraph template mixes literal text with bracket-delimited field
//! markers (`[Field Name]`). Extraction scans left to right for an opening
//! bracket, one or more non-bracket characters, and a closing bracket.
//! Anything else, including unmatched brackets and empty `[]` pairs, is
//! literal text. There is no escape syntax.

use crate::model::TableData;
use regex::Regex;
use std::sync::OnceLock;

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[([^\[\]]+)\]").expect("valid marker pattern"))
}

/// One fillable slot found in a paragraph template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    /// Field label as written between the brackets
    pub name: String,

    /// Stable slot key addressing this occurrence
    pub slot_key: String,

    /// Literal text between the previous marker (or template start) and
    /// this one, preserved verbatim
    pub literal_before: String,
}

/// A template decomposed into literal and field spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Verbatim literal text
    Literal(String),
    /// A fillable slot
    Field {
        /// Field label as written between the brackets
        name: String,
        /// Slot key for this occurrence
        slot_key: String,
    },
}

/// Replace whitespace runs in a field name with single underscores.
pub fn normalize_field_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Slot key for a table cell: `t-{blockId}-{row}-{col}`.
pub fn table_slot_key(block_id: &str, row: u32, col: u32) -> String {
    format!("t-{}-{}-{}", block_id, row, col)
}

/// Split a paragraph template into ordered literal and field segments.
///
/// Adjacent markers produce abutting field segments with no literal in
/// between; a template without markers yields a single literal segment
/// (or nothing for an empty template). Repeated field names get distinct
/// slot keys via an occurrence counter, so every marker stays
/// independently addressable.
pub fn segments(block_id: &str, template: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut occurrences: std::collections::HashMap<String, u32> = std::collections::HashMap::new();
    let mut cursor = 0;

    for caps in marker_pattern().captures_iter(template) {
        let whole = caps.get(0).expect("match exists");
        let name = caps.get(1).expect("capture exists").as_str();

        if whole.start() > cursor {
            out.push(Segment::Literal(template[cursor..whole.start()].to_string()));
        }

        let normalized = normalize_field_name(name);
        let index = occurrences.entry(normalized.clone()).or_insert(0);
        out.push(Segment::Field {
            name: name.to_string(),
            slot_key: format!("p-{}-{}-{}", block_id, normalized, index),
        });
        *index += 1;

        cursor = whole.end();
    }

    if cursor < template.len() {
        out.push(Segment::Literal(template[cursor..].to_string()));
    }
    out
}

/// Extract the ordered fillable slots of a paragraph template.
pub fn extract_fields(block_id: &str, template: &str) -> Vec<FieldRef> {
    let mut out = Vec::new();
    let mut literal = String::new();
    for segment in segments(block_id, template) {
        match segment {
            Segment::Literal(text) => literal.push_str(&text),
            Segment::Field { name, slot_key } => {
                out.push(FieldRef {
                    name,
                    slot_key,
                    literal_before: std::mem::take(&mut literal),
                });
            }
        }
    }
    out
}

/// Extract the fillable slots of a table block, row-major.
///
/// Table extraction is implicit: every non-merged, non-header cell is one
/// slot. Header cells and merged-away cells are never fillable.
pub fn table_slots(block_id: &str, table: &TableData) -> Vec<(u32, u32, String)> {
    let mut out = Vec::new();
    for row in 0..table.rows {
        for col in 0..table.cols {
            if table.is_fillable(row, col) {
                out.push((row, col, table_slot_key(block_id, row, col)));
            }
        }
    }
    out
}
