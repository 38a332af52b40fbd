//! Off-screen layout composition for the raster export.
//!
//! The composer walks the document once and flattens it into a list of
//! draw operations in logical page coordinates: the header metadata block,
//! then every content block in order. Paragraph slots become styled runs
//! (filled value or placeholder), tables become bordered grids honoring
//! their merge geometry. Text measurement goes through [`TextMeasurer`] so
//! composition stays independent of any font technology.

use crate::error::{Error, Result};
use crate::fields::{segments, Segment};
use crate::fill::FillState;
use crate::model::{ContentBlock, Document, TableData};
use crate::render::options::ExportOptions;

/// Measures text in logical points. Implemented by the concrete rasterizer
/// and by test stubs.
pub trait TextMeasurer {
    /// Advance width of `text` at the given font size.
    fn text_width(&self, text: &str, size: f32) -> f32;

    /// Line height at the given font size.
    fn line_height(&self, size: f32) -> f32;
}

/// Visual role of a text run; the rasterizer maps roles to colors/weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    /// Literal template text and static cell content
    Body,
    /// Document name and metadata labels
    Heading,
    /// A user-entered value
    Filled,
    /// The placeholder run for an empty slot
    Placeholder,
    /// Header cell label
    HeaderCell,
}

/// A single drawing operation in logical page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Draw `text` with its baseline-left corner at (x, y).
    Text {
        x: f32,
        y: f32,
        size: f32,
        role: TextRole,
        text: String,
    },
    /// Stroke a rectangle outline.
    RectOutline { x: f32, y: f32, w: f32, h: f32 },
    /// Fill a rectangle (header cell shading).
    RectFill { x: f32, y: f32, w: f32, h: f32 },
    /// Stroke a horizontal rule.
    Rule { x1: f32, x2: f32, y: f32 },
}

/// The composed off-screen representation of a filled document.
#[derive(Debug, Clone)]
pub struct Canvas {
    /// Logical width in points (the page width)
    pub width: f32,

    /// Total composed height in points
    pub height: f32,

    /// Draw operations in paint order
    pub ops: Vec<DrawOp>,
}

impl Canvas {
    /// Collect the text of every run with the given role, in paint order.
    pub fn text_with_role(&self, role: TextRole) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text {
                    text, role: r, ..
                } if *r == role => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Full text content in paint order, runs joined by single spaces.
    pub fn plain_text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

const CELL_PADDING: f32 = 4.0;
const BLOCK_GAP: f32 = 12.0;

/// Compose the filled document into a canvas of draw operations.
pub fn compose(
    doc: &Document,
    fill: &FillState,
    options: &ExportOptions,
    measurer: &dyn TextMeasurer,
) -> Result<Canvas> {
    let composer = Composer {
        options,
        measurer,
        ops: Vec::new(),
        cursor: options.margin,
    };
    composer.run(doc, fill)
}

struct Composer<'a> {
    options: &'a ExportOptions,
    measurer: &'a dyn TextMeasurer,
    ops: Vec<DrawOp>,
    cursor: f32,
}

impl<'a> Composer<'a> {
    fn run(mut self, doc: &Document, fill: &FillState) -> Result<Canvas> {
        self.compose_header(doc);

        for block in &doc.content_blocks {
            match block {
                ContentBlock::Paragraph { id, template } => {
                    self.compose_paragraph(id, template, fill);
                }
                ContentBlock::Table { id, data } => {
                    self.compose_table(id, data, fill)?;
                }
            }
            self.cursor += BLOCK_GAP;
        }

        let height = self.cursor + self.options.margin;
        Ok(Canvas {
            width: self.options.page_width,
            height,
            ops: self.ops,
        })
    }

    fn left(&self) -> f32 {
        self.options.margin
    }

    fn compose_header(&mut self, doc: &Document) {
        let title_size = self.options.font_size * 1.5;
        let meta_size = self.options.font_size * 0.85;

        self.cursor += self.measurer.line_height(title_size);
        self.ops.push(DrawOp::Text {
            x: self.left(),
            y: self.cursor,
            size: title_size,
            role: TextRole::Heading,
            text: doc.name.clone(),
        });

        let mut meta = Vec::new();
        if let Some(ref reference) = doc.reference {
            meta.push(format!("Reference: {}", reference));
        }
        if let Some(ref edition) = doc.edition {
            meta.push(format!("Edition: {}", edition));
        }
        if let Some(ref issue_date) = doc.issue_date {
            meta.push(format!("Issued: {}", issue_date));
        }
        if let Some(page_count) = doc.page_count {
            meta.push(format!("Pages: {}", page_count));
        }
        for line in meta {
            self.cursor += self.measurer.line_height(meta_size);
            self.ops.push(DrawOp::Text {
                x: self.left(),
                y: self.cursor,
                size: meta_size,
                role: TextRole::Heading,
                text: line,
            });
        }

        self.cursor += self.measurer.line_height(meta_size) * 0.5;
        self.ops.push(DrawOp::Rule {
            x1: self.left(),
            x2: self.options.page_width - self.options.margin,
            y: self.cursor,
        });
        self.cursor += BLOCK_GAP;
    }

    fn compose_paragraph(&mut self, id: &str, template: &str, fill: &FillState) {
        let runs = paragraph_runs(id, template, fill, &self.options.placeholder);
        let size = self.options.font_size;
        let lines = wrap_runs(
            &runs,
            self.options.content_width(),
            size,
            self.measurer,
        );
        self.emit_lines(&lines, self.left(), size);
    }

    fn emit_lines(&mut self, lines: &[Vec<Run>], left: f32, size: f32) {
        for line in lines {
            self.cursor += self.measurer.line_height(size);
            let mut x = left;
            for run in line {
                self.ops.push(DrawOp::Text {
                    x,
                    y: self.cursor,
                    size,
                    role: run.role,
                    text: run.text.clone(),
                });
                x += self.measurer.text_width(&run.text, size);
            }
        }
    }

    fn compose_table(&mut self, id: &str, table: &TableData, fill: &FillState) -> Result<()> {
        if table.rows == 0 || table.cols == 0 {
            return Err(Error::Layout(format!(
                "table {} has a zero dimension ({}x{})",
                id, table.rows, table.cols
            )));
        }

        let size = self.options.font_size * 0.9;
        let col_width = self.options.content_width() / table.cols as f32;
        let inner_width = col_width - 2.0 * CELL_PADDING;

        // Wrapped content of every anchor cell, keyed by (row, col).
        let mut cell_lines: Vec<Vec<Vec<Vec<Run>>>> =
            vec![vec![Vec::new(); table.cols as usize]; table.rows as usize];
        for row in 0..table.rows {
            for col in 0..table.cols {
                let cell = table.cell(row, col);
                if cell.merged {
                    continue;
                }
                let runs = cell_runs(id, table, row, col, fill);
                let width = inner_width + (cell.colspan - 1) as f32 * col_width;
                cell_lines[row as usize][col as usize] =
                    wrap_runs(&runs, width, size, self.measurer);
            }
        }

        // Row heights: each spanning cell distributes its need evenly.
        let line_height = self.measurer.line_height(size);
        let min_row_height = line_height + 2.0 * CELL_PADDING;
        let mut row_heights = vec![min_row_height; table.rows as usize];
        for row in 0..table.rows {
            for col in 0..table.cols {
                let cell = table.cell(row, col);
                if cell.merged {
                    continue;
                }
                let lines = &cell_lines[row as usize][col as usize];
                let need =
                    lines.len() as f32 * line_height + 2.0 * CELL_PADDING;
                let per_row = need / cell.rowspan as f32;
                for r in row..(row + cell.rowspan).min(table.rows) {
                    if row_heights[r as usize] < per_row {
                        row_heights[r as usize] = per_row;
                    }
                }
            }
        }

        let top = self.cursor;
        let mut row_tops = Vec::with_capacity(table.rows as usize);
        let mut y = top;
        for h in &row_heights {
            row_tops.push(y);
            y += h;
        }
        let table_bottom = y;

        for row in 0..table.rows {
            for col in 0..table.cols {
                let cell = table.cell(row, col);
                if cell.merged {
                    continue;
                }
                let x = self.left() + col as f32 * col_width;
                let w = cell.colspan.min(table.cols - col) as f32 * col_width;
                let cell_top = row_tops[row as usize];
                let end_row = (row + cell.rowspan).min(table.rows) as usize;
                let h = row_heights[row as usize..end_row].iter().sum::<f32>();

                if cell.is_header {
                    self.ops.push(DrawOp::RectFill { x, y: cell_top, w, h });
                }
                self.ops.push(DrawOp::RectOutline { x, y: cell_top, w, h });

                let mut baseline = cell_top + CELL_PADDING;
                for line in &cell_lines[row as usize][col as usize] {
                    baseline += line_height;
                    let mut run_x = x + CELL_PADDING;
                    for run in line {
                        self.ops.push(DrawOp::Text {
                            x: run_x,
                            y: baseline,
                            size,
                            role: run.role,
                            text: run.text.clone(),
                        });
                        run_x += self.measurer.text_width(&run.text, size);
                    }
                }
            }
        }

        self.cursor = table_bottom;
        Ok(())
    }
}

/// A styled run of text, pre-wrapping.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Run {
    pub text: String,
    pub role: TextRole,
}

/// Build the styled runs of a filled paragraph.
///
/// Literal text is kept verbatim; embedded newlines survive as newline
/// characters inside literal runs and become explicit line breaks during
/// wrapping. Empty slots render the placeholder run.
pub(crate) fn paragraph_runs(
    block_id: &str,
    template: &str,
    fill: &FillState,
    placeholder: &str,
) -> Vec<Run> {
    let mut runs = Vec::new();
    for segment in segments(block_id, template) {
        match segment {
            Segment::Literal(text) => runs.push(Run {
                text,
                role: TextRole::Body,
            }),
            Segment::Field { slot_key, .. } => {
                let value = fill.get(&slot_key);
                if value.is_empty() {
                    runs.push(Run {
                        text: placeholder.to_string(),
                        role: TextRole::Placeholder,
                    });
                } else {
                    runs.push(Run {
                        text: value.to_string(),
                        role: TextRole::Filled,
                    });
                }
            }
        }
    }
    runs
}

/// Build the runs of a table cell: static content, then the filled value
/// stacked beneath it for fillable cells.
fn cell_runs(
    block_id: &str,
    table: &TableData,
    row: u32,
    col: u32,
    fill: &FillState,
) -> Vec<Run> {
    let cell = table.cell(row, col);
    let mut runs = Vec::new();

    if cell.is_header {
        let label = if cell.content.is_empty() && row == 0 {
            table.headers.get(col as usize).cloned().unwrap_or_default()
        } else {
            cell.content.clone()
        };
        if !label.is_empty() {
            runs.push(Run {
                text: label,
                role: TextRole::HeaderCell,
            });
        }
        return runs;
    }

    if !cell.content.is_empty() {
        runs.push(Run {
            text: cell.content.clone(),
            role: TextRole::Body,
        });
    }
    let value = fill.get(&crate::fields::table_slot_key(block_id, row, col));
    if !value.is_empty() {
        if !runs.is_empty() {
            runs.push(Run {
                text: "\n".to_string(),
                role: TextRole::Body,
            });
        }
        runs.push(Run {
            text: value.to_string(),
            role: TextRole::Filled,
        });
    }
    runs
}

/// Greedy word wrap over styled runs.
///
/// Newline characters force a break; everything else wraps at whitespace
/// when the line would overflow `width`. Runs never merge, so role
/// boundaries (and therefore styling) survive wrapping.
pub(crate) fn wrap_runs(
    runs: &[Run],
    width: f32,
    size: f32,
    measurer: &dyn TextMeasurer,
) -> Vec<Vec<Run>> {
    let mut lines: Vec<Vec<Run>> = Vec::new();
    let mut line: Vec<Run> = Vec::new();
    let mut line_width = 0.0;

    let push_piece = |piece: Run,
                          lines: &mut Vec<Vec<Run>>,
                          line: &mut Vec<Run>,
                          line_width: &mut f32| {
        let piece_width = measurer.text_width(&piece.text, size);
        if *line_width + piece_width > width && !line.is_empty() {
            lines.push(std::mem::take(line));
            *line_width = 0.0;
            // Leading whitespace is dropped at a wrap point.
            if piece.text.trim().is_empty() {
                return;
            }
        }
        *line_width += piece_width;
        line.push(piece);
    };

    for run in runs {
        let mut first = true;
        for part in run.text.split('\n') {
            if !first {
                lines.push(std::mem::take(&mut line));
                line_width = 0.0;
            }
            first = false;

            for word in split_keeping_spaces(part) {
                push_piece(
                    Run {
                        text: word.to_string(),
                        role: run.role,
                    },
                    &mut lines,
                    &mut line,
                    &mut line_width,
                );
            }
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Split text into alternating word and whitespace pieces.
fn split_keeping_spaces(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut prev_is_space: Option<bool> = None;
    for (i, c) in text.char_indices() {
        let is_space = c == ' ' || c == '\t';
        if let Some(prev) = prev_is_space {
            if prev != is_space {
                pieces.push(&text[start..i]);
                start = i;
            }
        }
        prev_is_space = Some(is_space);
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}


#[cfg(test)]
mod tests {
    use super::test_support::StubMeasurer;
    use super::*;
    use crate::model::CellData;

    fn doc_with(blocks: Vec<ContentBlock>) -> Document {
        let mut doc = Document::new("f1", "Test Form");
        for b in blocks {
            doc.add_block(b);
        }
        doc
    }

    #[test]
    fn test_paragraph_runs_fill_and_placeholder() {
        let mut fill = FillState::new();
        fill.set("p-b1-Name-0", "Alice");
        let runs = paragraph_runs("b1", "Name: [Name], again [Name]", &fill, "__________");

        assert_eq!(runs.len(), 4);
        assert_eq!(runs[0], Run { text: "Name: ".into(), role: TextRole::Body });
        assert_eq!(runs[1], Run { text: "Alice".into(), role: TextRole::Filled });
        assert_eq!(runs[2], Run { text: ", again ".into(), role: TextRole::Body });
        assert_eq!(
            runs[3],
            Run { text: "__________".into(), role: TextRole::Placeholder }
        );
    }

    #[test]
    fn test_literal_newline_forces_break() {
        let runs = vec![Run {
            text: "first\nsecond".to_string(),
            role: TextRole::Body,
        }];
        let lines = wrap_runs(&runs, 1000.0, 12.0, &StubMeasurer);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0][0].text, "first");
        assert_eq!(lines[1][0].text, "second");
    }

    #[test]
    fn test_wrap_respects_width() {
        let runs = vec![Run {
            text: "aaaa bbbb cccc".to_string(),
            role: TextRole::Body,
        }];
        // Width fits one 4-char word plus a space at size 12 (24 + 6 pt).
        let lines = wrap_runs(&runs, 31.0, 12.0, &StubMeasurer);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0][0].text, "aaaa");
        assert_eq!(lines[2][0].text, "cccc");
    }

    #[test]
    fn test_wrap_keeps_role_boundaries() {
        let runs = vec![
            Run { text: "label ".into(), role: TextRole::Body },
            Run { text: "value".into(), role: TextRole::Filled },
        ];
        let lines = wrap_runs(&runs, 1000.0, 12.0, &StubMeasurer);
        assert_eq!(lines.len(), 1);
        let roles: Vec<_> = lines[0].iter().map(|r| r.role).collect();
        assert!(roles.contains(&TextRole::Body));
        assert!(roles.contains(&TextRole::Filled));
    }

    #[test]
    fn test_compose_empty_document_has_header() {
        let doc = doc_with(vec![]);
        let canvas = compose(&doc, &FillState::new(), &ExportOptions::default(), &StubMeasurer)
            .unwrap();
        assert!(canvas.height > 0.0);
        assert!(canvas.plain_text().contains("Test Form"));
        assert!(canvas.ops.iter().any(|op| matches!(op, DrawOp::Rule { .. })));
    }

    #[test]
    fn test_compose_paragraph_literal_fidelity() {
        let mut fill = FillState::new();
        fill.set("p-p1-Name-0", "Alice");
        let doc = doc_with(vec![ContentBlock::paragraph(
            "p1",
            "Name: [Name], again [Name]",
        )]);
        let options = ExportOptions::default();
        let canvas = compose(&doc, &fill, &options, &StubMeasurer).unwrap();

        let filled = canvas.text_with_role(TextRole::Filled);
        assert_eq!(filled, vec!["Alice"]);
        let placeholders = canvas.text_with_role(TextRole::Placeholder);
        assert_eq!(placeholders, vec!["__________"]);
        let text = canvas.plain_text();
        assert!(text.contains("Name:"));
        assert!(text.contains("again"));
    }

    #[test]
    fn test_compose_table_geometry() {
        let mut table = TableData::new(2, 2);
        table.set_cell(0, 0, CellData::header("H"));
        table.set_content(1, 0, "static");
        let mut fill = FillState::new();
        fill.set("t-t1-1-0", "answer");

        let doc = doc_with(vec![ContentBlock::table("t1", table)]);
        let canvas = compose(&doc, &fill, &ExportOptions::default(), &StubMeasurer).unwrap();

        // One shaded header cell, four outlined cells.
        let fills = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::RectFill { .. }))
            .count();
        let outlines = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::RectOutline { .. }))
            .count();
        assert_eq!(fills, 1);
        assert_eq!(outlines, 4);

        assert_eq!(canvas.text_with_role(TextRole::HeaderCell), vec!["H"]);
        assert_eq!(canvas.text_with_role(TextRole::Filled), vec!["answer"]);
        assert!(canvas.plain_text().contains("static"));
    }

    #[test]
    fn test_compose_merged_cell_single_outline() {
        let mut table = TableData::new(2, 2);
        table.merge(0, 0, 1, 1).unwrap();
        let doc = doc_with(vec![ContentBlock::table("t1", table)]);
        let canvas =
            compose(&doc, &FillState::new(), &ExportOptions::default(), &StubMeasurer).unwrap();

        // The whole table is one merged region: a single outline.
        let outlines = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::RectOutline { .. }))
            .count();
        assert_eq!(outlines, 1);
    }

    #[test]
    fn test_compose_rejects_zero_dimension_table() {
        let doc = doc_with(vec![ContentBlock::table("t1", TableData::new(0, 2))]);
        let err =
            compose(&doc, &FillState::new(), &ExportOptions::default(), &StubMeasurer).unwrap_err();
        assert!(matches!(err, Error::Layout(_)));
    }
}
