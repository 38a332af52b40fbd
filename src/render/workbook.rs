//! Multi-sheet workbook export.
//!
//! Sheets are built as [`SheetModel`] values first (plain rows, merge
//! regions, widths) and only then written with `rust_xlsxwriter`, so the
//! sheet geometry is testable without reading XLSX bytes back.

use crate::error::Result;
use crate::fields::{extract_fields, table_slot_key};
use crate::fill::FillState;
use crate::model::{ContentBlock, Document, TableData};
use crate::render::options::ExportOptions;
use crate::render::sanitize::markup_to_plain;
use rust_xlsxwriter::{Format, Workbook};

/// A merged region in zero-based inclusive sheet coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRegion {
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

/// One sheet of the workbook before encoding. `None` cells are null:
/// nothing is written for them.
#[derive(Debug, Clone)]
pub struct SheetModel {
    /// Sheet tab name
    pub name: String,

    /// Cell grid; `None` marks a null cell
    pub rows: Vec<Vec<Option<String>>>,

    /// Merge regions (anchor content lives at the region's first cell)
    pub merges: Vec<MergeRegion>,

    /// Cells rendered with the header format
    pub header_cells: Vec<(u32, u32)>,

    /// Per-column widths in characters
    pub column_widths: Vec<f64>,
}

impl SheetModel {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            merges: Vec::new(),
            header_cells: Vec::new(),
            column_widths: Vec::new(),
        }
    }

    /// Look up a cell, treating missing positions as null.
    pub fn cell(&self, row: u32, col: u32) -> Option<&str> {
        self.rows
            .get(row as usize)?
            .get(col as usize)?
            .as_deref()
    }

    fn compute_column_widths(&mut self, options: &ExportOptions) {
        let cols = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![options.min_column_width; cols];
        for row in &self.rows {
            for (col, cell) in row.iter().enumerate() {
                let Some(text) = cell else { continue };
                // Width follows the longest first line, not the full text.
                let first_line = text.lines().next().unwrap_or("");
                let len = first_line.chars().count() as f64;
                if len > widths[col] {
                    widths[col] = len;
                }
            }
        }
        for width in &mut widths {
            *width = width.clamp(options.min_column_width, options.max_column_width);
        }
        self.column_widths = widths;
    }
}

/// Build the sheet models for a whole document: one sheet per block in
/// document order, or a single placeholder sheet for an empty document.
pub fn build_sheets(doc: &Document, fill: &FillState, options: &ExportOptions) -> Vec<SheetModel> {
    if doc.content_blocks.is_empty() {
        let mut sheet = SheetModel::new("Export");
        sheet
            .rows
            .push(vec![Some("No data to export".to_string())]);
        sheet.compute_column_widths(options);
        return vec![sheet];
    }

    let mut sheets = Vec::new();
    let mut paragraph_ordinal = 0u32;
    let mut table_ordinal = 0u32;

    for block in &doc.content_blocks {
        let sheet = match block {
            ContentBlock::Paragraph { id, template } => {
                paragraph_ordinal += 1;
                paragraph_sheet(
                    format!("{} {}", options.paragraph_sheet_prefix, paragraph_ordinal),
                    id,
                    template,
                    fill,
                    options,
                )
            }
            ContentBlock::Table { id, data } => {
                table_ordinal += 1;
                table_sheet(
                    format!("{} {}", options.table_sheet_prefix, table_ordinal),
                    id,
                    data,
                    fill,
                    options,
                )
            }
        };
        sheets.push(sheet);
    }
    sheets
}

fn paragraph_sheet(
    name: String,
    block_id: &str,
    template: &str,
    fill: &FillState,
    options: &ExportOptions,
) -> SheetModel {
    let mut sheet = SheetModel::new(name);

    sheet.rows.push(vec![
        Some("Field".to_string()),
        Some("Answer".to_string()),
    ]);
    sheet.header_cells.push((0, 0));
    sheet.header_cells.push((0, 1));

    for field in extract_fields(block_id, template) {
        sheet.rows.push(vec![
            Some(field.name),
            Some(fill.get(&field.slot_key).to_string()),
        ]);
    }

    // Separator, then the reconstituted template for audit: brackets kept,
    // markup neutralized, <br> markers turned into newlines.
    sheet.rows.push(vec![None, None]);
    sheet.rows.push(vec![Some(markup_to_plain(template))]);

    sheet.compute_column_widths(options);
    sheet
}

fn table_sheet(
    name: String,
    block_id: &str,
    table: &TableData,
    fill: &FillState,
    options: &ExportOptions,
) -> SheetModel {
    let mut sheet = SheetModel::new(name);
    fill_table_grid(&mut sheet, block_id, table, Some(fill), 0);
    sheet.compute_column_widths(options);
    sheet
}

/// Stand-alone single-table export: one sheet with a synthetic header row
/// built from the table's column labels. The grid and every merge region
/// shift down by one row to make room — unlike the per-block table sheets
/// of a full document export, which carry no synthetic header row.
pub fn table_to_sheet(name: impl Into<String>, table: &TableData, options: &ExportOptions) -> SheetModel {
    let mut sheet = SheetModel::new(name);

    let mut header = Vec::with_capacity(table.cols as usize);
    for col in 0..table.cols {
        header.push(Some(
            table.headers.get(col as usize).cloned().unwrap_or_default(),
        ));
        sheet.header_cells.push((0, col));
    }
    sheet.rows.push(header);

    fill_table_grid(&mut sheet, "", table, None, 1);
    sheet.compute_column_widths(options);
    sheet
}

/// Append the table grid to the sheet starting at `row_offset`.
///
/// Merged-away cells contribute null cells. Anchor content is the static
/// content for header cells; for data cells it is the static content and
/// the filled value separated by a blank line when both are present, else
/// whichever is present.
fn fill_table_grid(
    sheet: &mut SheetModel,
    block_id: &str,
    table: &TableData,
    fill: Option<&FillState>,
    row_offset: u32,
) {
    for row in 0..table.rows {
        let mut out_row = Vec::with_capacity(table.cols as usize);
        for col in 0..table.cols {
            let cell = table.cell(row, col);
            if cell.merged {
                out_row.push(None);
                continue;
            }
            if cell.is_header {
                sheet.header_cells.push((row + row_offset, col));
                out_row.push(Some(cell.content.clone()));
            } else {
                let value = fill
                    .map(|f| f.get(&table_slot_key(block_id, row, col)).to_string())
                    .unwrap_or_default();
                let combined = match (cell.content.is_empty(), value.is_empty()) {
                    (false, false) => format!("{}\n\n{}", cell.content, value),
                    (false, true) => cell.content.clone(),
                    (true, _) => value,
                };
                out_row.push(Some(combined));
            }
            if cell.is_anchor() {
                sheet.merges.push(MergeRegion {
                    first_row: row + row_offset,
                    first_col: col,
                    last_row: row + cell.rowspan - 1 + row_offset,
                    last_col: col + cell.colspan - 1,
                });
            }
        }
        sheet.rows.push(out_row);
    }
}

/// Encode sheet models as an XLSX byte stream.
pub fn write_workbook(sheets: &[SheetModel]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let merge_format = Format::new();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for (row_index, row) in sheet.rows.iter().enumerate() {
            for (col_index, cell) in row.iter().enumerate() {
                let Some(text) = cell else { continue };
                let row = row_index as u32;
                let col = col_index as u16;
                if sheet.merges.iter().any(|m| m.first_row == row && m.first_col == col as u32) {
                    // Written by merge_range below.
                    continue;
                }
                if sheet.header_cells.contains(&(row, col as u32)) {
                    worksheet.write_string_with_format(row, col, text, &header_format)?;
                } else {
                    worksheet.write_string(row, col, text)?;
                }
            }
        }

        for merge in &sheet.merges {
            let content = sheet
                .cell(merge.first_row, merge.first_col)
                .unwrap_or_default();
            let format = if sheet
                .header_cells
                .contains(&(merge.first_row, merge.first_col))
            {
                &header_format
            } else {
                &merge_format
            };
            worksheet.merge_range(
                merge.first_row,
                merge.first_col as u16,
                merge.last_row,
                merge.last_col as u16,
                content,
                format,
            )?;
        }

        for (col, width) in sheet.column_widths.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Render a document's workbook export to XLSX bytes.
pub fn to_workbook(doc: &Document, fill: &FillState, options: &ExportOptions) -> Result<Vec<u8>> {
    let sheets = build_sheets(doc, fill, options);
    log::debug!("workbook export: {} sheet(s)", sheets.len());
    write_workbook(&sheets)
}

/// Render a stand-alone single-table XLSX export.
pub fn table_to_workbook(
    name: impl Into<String>,
    table: &TableData,
    options: &ExportOptions,
) -> Result<Vec<u8>> {
    write_workbook(&[table_to_sheet(name, table, options)])
}
