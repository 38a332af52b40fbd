//! Document-level types.

use super::ContentBlock;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A form document: ordered content blocks plus descriptive metadata.
///
/// The metadata fields (`reference`, `edition`, `issue_date`, `page_count`)
/// only feed the raster export's header block; they carry no meaning for
/// the export logic itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document id
    pub id: String,

    /// Document display name; also the archive filename stem
    pub name: String,

    /// Reference code printed in the header
    #[serde(default)]
    pub reference: Option<String>,

    /// Edition label printed in the header
    #[serde(default)]
    pub edition: Option<String>,

    /// Issue date printed in the header
    #[serde(default)]
    pub issue_date: Option<String>,

    /// Declared page count printed in the header
    #[serde(default)]
    pub page_count: Option<u32>,

    /// Ordered content blocks
    #[serde(default)]
    pub content_blocks: Vec<ContentBlock>,
}

impl Document {
    /// Create a new empty document.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            reference: None,
            edition: None,
            issue_date: None,
            page_count: None,
            content_blocks: Vec::new(),
        }
    }

    /// Append a content block.
    pub fn add_block(&mut self, block: ContentBlock) {
        self.content_blocks.push(block);
    }

    /// Get the number of content blocks.
    pub fn block_count(&self) -> usize {
        self.content_blocks.len()
    }

    /// Check if the document has any content blocks.
    pub fn is_empty(&self) -> bool {
        self.content_blocks.is_empty()
    }

    /// Decode a document from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode the document as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableData;

    #[test]
    fn test_document_new() {
        let doc = Document::new("f1", "Inspection Form");
        assert!(doc.is_empty());
        assert_eq!(doc.block_count(), 0);
    }

    #[test]
    fn test_json_round_trip() {
        let mut doc = Document::new("f1", "Inspection Form");
        doc.reference = Some("REF-42".to_string());
        doc.add_block(ContentBlock::paragraph("p1", "Date: [Date]"));
        doc.add_block(ContentBlock::table("t1", TableData::new(2, 2)));

        let json = doc.to_json().unwrap();
        let back = Document::from_json(&json).unwrap();
        assert_eq!(back.id, "f1");
        assert_eq!(back.reference.as_deref(), Some("REF-42"));
        assert_eq!(back.block_count(), 2);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{ "id": "f2", "name": "Minimal" }"#;
        let doc = Document::from_json(json).unwrap();
        assert!(doc.reference.is_none());
        assert!(doc.page_count.is_none());
        assert!(doc.content_blocks.is_empty());
    }
}
