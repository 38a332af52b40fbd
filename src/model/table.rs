//! Table types.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A spreadsheet-like table grid with merged-cell regions.
///
/// Cell storage is sparse: the `data` map is keyed by `"row-col"` strings
/// and an absent key stands for a default (empty, unmerged) cell. Consumers
/// go through [`TableData::cell`] and never touch the key encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableData {
    /// Number of rows (>= 1)
    pub rows: u32,

    /// Number of columns (>= 1)
    pub cols: u32,

    /// Column header labels (length <= cols)
    #[serde(default)]
    pub headers: Vec<String>,

    /// Sparse cell storage keyed by "row-col"
    #[serde(default)]
    pub data: HashMap<String, CellData>,
}

impl TableData {
    /// Create a new empty table of the given dimensions.
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            headers: Vec::new(),
            data: HashMap::new(),
        }
    }

    /// Create a table with column header labels.
    pub fn with_headers(rows: u32, cols: u32, headers: Vec<String>) -> Self {
        Self {
            headers,
            ..Self::new(rows, cols)
        }
    }

    fn key(row: u32, col: u32) -> String {
        format!("{}-{}", row, col)
    }

    /// Get the cell at (row, col), substituting the default for absent keys.
    pub fn cell(&self, row: u32, col: u32) -> CellData {
        self.data
            .get(&Self::key(row, col))
            .cloned()
            .unwrap_or_default()
    }

    /// Replace the cell at (row, col).
    pub fn set_cell(&mut self, row: u32, col: u32, cell: CellData) {
        self.data.insert(Self::key(row, col), cell);
    }

    /// Set only the static content of the cell at (row, col).
    pub fn set_content(&mut self, row: u32, col: u32, content: impl Into<String>) {
        let mut cell = self.cell(row, col);
        cell.content = content.into();
        self.set_cell(row, col, cell);
    }

    /// Mark the cell at (row, col) as a header cell.
    pub fn set_header(&mut self, row: u32, col: u32, is_header: bool) {
        let mut cell = self.cell(row, col);
        cell.is_header = is_header;
        self.set_cell(row, col, cell);
    }

    /// Check whether (row, col) is inside the grid.
    pub fn in_bounds(&self, row: u32, col: u32) -> bool {
        row < self.rows && col < self.cols
    }

    /// A cell is fillable when it is neither a header cell nor merged away.
    pub fn is_fillable(&self, row: u32, col: u32) -> bool {
        let cell = self.cell(row, col);
        !cell.merged && !cell.is_header
    }

    /// Check whether any cell spans more than 1x1.
    pub fn has_merged_cells(&self) -> bool {
        self.data.values().any(|c| c.is_anchor())
    }

    /// Merge the rectangular region (r1, c1)..=(r2, c2) into one anchor cell.
    ///
    /// Every member cell must currently be unmerged with a 1x1 span, and the
    /// region must be larger than a single cell. On success the top-left cell
    /// becomes the anchor and keeps its own content; all other member cells
    /// are cleared and flagged `merged`. On failure the table is unchanged.
    pub fn merge(&mut self, r1: u32, c1: u32, r2: u32, c2: u32) -> Result<()> {
        if r1 > r2 || c1 > c2 {
            return Err(Error::InvalidMerge(format!(
                "region ({},{})..({},{}) is not top-left anchored",
                r1, c1, r2, c2
            )));
        }
        if !self.in_bounds(r2, c2) {
            return Err(Error::InvalidMerge(format!(
                "region extends to ({},{}) outside a {}x{} table",
                r2, c2, self.rows, self.cols
            )));
        }
        if r1 == r2 && c1 == c2 {
            return Err(Error::InvalidMerge(
                "region must cover more than one cell".to_string(),
            ));
        }
        for row in r1..=r2 {
            for col in c1..=c2 {
                let cell = self.cell(row, col);
                if cell.merged || cell.is_anchor() {
                    return Err(Error::InvalidMerge(format!(
                        "cell ({},{}) is already part of a merged region",
                        row, col
                    )));
                }
            }
        }

        for row in r1..=r2 {
            for col in c1..=c2 {
                if row == r1 && col == c1 {
                    continue;
                }
                self.set_cell(row, col, CellData::merged_away());
            }
        }
        let mut anchor = self.cell(r1, c1);
        anchor.rowspan = r2 - r1 + 1;
        anchor.colspan = c2 - c1 + 1;
        anchor.merged = false;
        self.set_cell(r1, c1, anchor);
        Ok(())
    }

    /// Split the merge anchor at (row, col) back into independent cells.
    ///
    /// Rejected when the cell is not an anchor (merged-away cells and plain
    /// 1x1 cells alike). All member cells, the anchor included, come back as
    /// unmerged empty cells: content does not survive a merge/split round
    /// trip.
    pub fn split(&mut self, row: u32, col: u32) -> Result<()> {
        let cell = self.cell(row, col);
        if !cell.is_anchor() {
            return Err(Error::InvalidSplit(format!(
                "cell ({},{}) is not a merge anchor",
                row, col
            )));
        }
        for r in row..row + cell.rowspan {
            for c in col..col + cell.colspan {
                // The header flag is structural and survives the split.
                let restored = CellData {
                    is_header: self.cell(r, c).is_header,
                    ..CellData::default()
                };
                self.set_cell(r, c, restored);
            }
        }
        Ok(())
    }
}

/// A single table cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    /// Static cell content
    #[serde(default)]
    pub content: String,

    /// Number of columns this cell spans
    #[serde(default = "default_span")]
    pub colspan: u32,

    /// Number of rows this cell spans
    #[serde(default = "default_span")]
    pub rowspan: u32,

    /// True for a cell absorbed into a merged region (never the anchor)
    #[serde(default)]
    pub merged: bool,

    /// True for header cells; header cells are never fillable
    #[serde(default)]
    pub is_header: bool,
}

fn default_span() -> u32 {
    1
}

impl Default for CellData {
    fn default() -> Self {
        Self {
            content: String::new(),
            colspan: 1,
            rowspan: 1,
            merged: false,
            is_header: false,
        }
    }
}

impl CellData {
    /// Create a cell with static text content.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Create a header cell.
    pub fn header(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_header: true,
            ..Self::default()
        }
    }

    /// A cell absorbed into a merged region: empty, span 1, flagged merged.
    pub fn merged_away() -> Self {
        Self {
            merged: true,
            ..Self::default()
        }
    }

    /// Check whether this cell anchors a merged region.
    pub fn is_anchor(&self) -> bool {
        !self.merged && (self.rowspan > 1 || self.colspan > 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cell_for_absent_key() {
        let table = TableData::new(3, 3);
        let cell = table.cell(1, 1);
        assert_eq!(cell, CellData::default());
        assert!(table.is_fillable(1, 1));
    }

    #[test]
    fn test_merge_sets_anchor_and_members() {
        let mut table = TableData::new(4, 4);
        table.set_content(1, 1, "anchor");
        table.set_content(1, 2, "gone");
        table.merge(1, 1, 2, 2).unwrap();

        let anchor = table.cell(1, 1);
        assert_eq!(anchor.rowspan, 2);
        assert_eq!(anchor.colspan, 2);
        assert_eq!(anchor.content, "anchor");
        assert!(anchor.is_anchor());

        for (r, c) in [(1, 2), (2, 1), (2, 2)] {
            let member = table.cell(r, c);
            assert!(member.merged);
            assert!(member.content.is_empty());
            assert!(!table.is_fillable(r, c));
        }
    }

    #[test]
    fn test_merge_rejects_overlap() {
        let mut table = TableData::new(4, 4);
        table.merge(0, 0, 1, 1).unwrap();

        let err = table.merge(1, 1, 2, 2).unwrap_err();
        assert!(matches!(err, Error::InvalidMerge(_)));
        // State unchanged by the rejected merge.
        assert!(table.cell(2, 2).content.is_empty());
        assert!(!table.cell(2, 2).merged);
        assert_eq!(table.cell(0, 0).rowspan, 2);
    }

    #[test]
    fn test_merge_rejects_out_of_bounds_and_single_cell() {
        let mut table = TableData::new(2, 2);
        assert!(table.merge(0, 0, 2, 1).is_err());
        assert!(table.merge(1, 1, 1, 1).is_err());
        assert!(table.merge(1, 1, 0, 0).is_err());
    }

    #[test]
    fn test_merge_then_split_clears_content() {
        let mut table = TableData::new(3, 3);
        table.set_content(0, 0, "a");
        table.set_content(0, 1, "b");
        table.set_content(1, 0, "c");
        table.set_content(1, 1, "d");

        table.merge(0, 0, 1, 1).unwrap();
        table.split(0, 0).unwrap();

        for (r, c) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            let cell = table.cell(r, c);
            assert!(!cell.merged, "({},{}) should be unmerged", r, c);
            assert_eq!(cell.rowspan, 1);
            assert_eq!(cell.colspan, 1);
            assert!(cell.content.is_empty(), "({},{}) content cleared", r, c);
            assert!(table.is_fillable(r, c));
        }
    }

    #[test]
    fn test_split_rejects_non_anchor() {
        let mut table = TableData::new(3, 3);
        table.merge(0, 0, 0, 1).unwrap();

        // Plain cell and merged-away member both rejected.
        assert!(matches!(table.split(2, 2), Err(Error::InvalidSplit(_))));
        assert!(matches!(table.split(0, 1), Err(Error::InvalidSplit(_))));
        // Table untouched by the rejections.
        assert!(table.cell(0, 0).is_anchor());
    }

    #[test]
    fn test_header_cells_not_fillable() {
        let mut table = TableData::new(2, 2);
        table.set_cell(0, 0, CellData::header("Name"));
        assert!(!table.is_fillable(0, 0));
        assert!(table.is_fillable(1, 0));
    }

    #[test]
    fn test_sparse_deserialization_defaults() {
        let json = r#"{
            "rows": 2,
            "cols": 2,
            "data": { "0-0": { "content": "x" } }
        }"#;
        let table: TableData = serde_json::from_str(json).unwrap();
        assert!(table.headers.is_empty());
        let cell = table.cell(0, 0);
        assert_eq!(cell.content, "x");
        assert_eq!(cell.colspan, 1);
        assert_eq!(cell.rowspan, 1);
        assert!(!cell.merged);
        assert!(!cell.is_header);
    }
}
