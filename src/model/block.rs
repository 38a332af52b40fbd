//! Content block types.

use super::TableData;
use serde::{Deserialize, Serialize};

/// One unit of document content.
///
/// The union is closed on purpose: both exporters run a single exhaustive
/// match over it, so a new block kind cannot be silently ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// Free text with embedded bracket-delimited field markers.
    Paragraph {
        /// Block id, unique within the document
        id: String,
        /// Template text; `[Field Name]` spans mark fillable slots
        template: String,
    },

    /// A spreadsheet-like grid of cells.
    Table {
        /// Block id, unique within the document
        id: String,
        /// The table grid
        data: TableData,
    },
}

impl ContentBlock {
    /// Create a paragraph block.
    pub fn paragraph(id: impl Into<String>, template: impl Into<String>) -> Self {
        Self::Paragraph {
            id: id.into(),
            template: template.into(),
        }
    }

    /// Create a table block.
    pub fn table(id: impl Into<String>, data: TableData) -> Self {
        Self::Table {
            id: id.into(),
            data,
        }
    }

    /// Get the block id.
    pub fn id(&self) -> &str {
        match self {
            Self::Paragraph { id, .. } => id,
            Self::Table { id, .. } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_serialization() {
        let block = ContentBlock::paragraph("b1", "Name: [Name]");
        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains("\"type\":\"paragraph\""));
        assert!(json.contains("\"template\":\"Name: [Name]\""));

        let back: ContentBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), "b1");
    }

    #[test]
    fn test_table_variant_round_trip() {
        let block = ContentBlock::table("t1", TableData::new(2, 3));
        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains("\"type\":\"table\""));

        let back: ContentBlock = serde_json::from_str(&json).unwrap();
        match back {
            ContentBlock::Table { data, .. } => {
                assert_eq!(data.rows, 2);
                assert_eq!(data.cols, 3);
            }
            ContentBlock::Paragraph { .. } => panic!("expected table variant"),
        }
    }
}
