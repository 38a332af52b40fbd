//! # formfill
//!
//! Fillable-form document generator for Rust.
//!
//! This library takes a semi-structured form document (ordered paragraph
//! and table blocks, with merged-cell regions and inline bracket-delimited
//! fill-in fields), collects user-entered values against it, and
//! deterministically renders the result into a paginated raster PDF and a
//! multi-sheet XLSX workbook, bundled into a single ZIP archive.
//!
//! ## Quick Start
//!
//! ```no_run
//! use formfill::{ContentBlock, Document, Exporter, FillState, FontRasterizer};
//!
//! fn main() -> formfill::Result<()> {
//!     let mut doc = Document::new("f1", "Site Inspection");
//!     doc.add_block(ContentBlock::paragraph("p1", "Inspector: [Name], date [Date]"));
//!
//!     let mut fill = FillState::new();
//!     fill.set("p-p1-Name-0", "Alice");
//!
//!     let exporter = Exporter::new(FontRasterizer::from_system_fonts()?);
//!     let bundle = exporter.export(&doc, &fill)?;
//!     std::fs::write(&bundle.file_name, &bundle.archive)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Field extraction**: stable, collision-free slot keys for every
//!   bracket marker, repeated labels included
//! - **Merge-aware tables**: rectangular merge/split with invariant checks
//! - **Two deterministic encodings**: paginated raster PDF and a workbook
//!   preserving merge geometry
//! - **Swappable rasterization**: the drawing technology hides behind a
//!   capability trait
//! - **Parallel export**: both artifacts render concurrently with Rayon

pub mod analytics;
pub mod archive;
pub mod error;
pub mod export;
pub mod fields;
pub mod fill;
pub mod model;
pub mod render;
pub mod store;

// Re-export commonly used types
pub use analytics::{AnalyticsEvent, AnalyticsSink, LogSink, NullSink};
pub use error::{Error, Result};
pub use export::{export, ExportBundle};
pub use fields::{extract_fields, normalize_field_name, table_slot_key, FieldRef, Segment};
pub use fill::FillState;
pub use model::{CellData, ContentBlock, Document, TableData};
pub use render::{
    render_document_to_image_pages, table_to_workbook, to_raster_pdf, to_workbook,
    CanvasRasterizer, ExportOptions, FontRasterizer, TextMeasurer,
};
pub use store::{DocumentStore, MemoryStore};

use std::sync::Arc;

/// Builder wiring options, a rasterizer, and an analytics sink.
///
/// # Example
///
/// ```no_run
/// use formfill::{Document, Exporter, ExportOptions, FillState, FontRasterizer};
///
/// let exporter = Exporter::new(FontRasterizer::from_system_fonts()?)
///     .with_options(ExportOptions::new().with_oversample(3))
///     .with_placeholder("........");
/// let _bundle = exporter.export(&Document::new("f1", "Form"), &FillState::new())?;
/// # Ok::<(), formfill::Error>(())
/// ```
pub struct Exporter<R> {
    rasterizer: R,
    options: ExportOptions,
    sink: Arc<dyn AnalyticsSink>,
}

impl<R> Exporter<R>
where
    R: CanvasRasterizer + TextMeasurer + Sync,
{
    /// Create an exporter around a rasterizer with default options.
    pub fn new(rasterizer: R) -> Self {
        Self {
            rasterizer,
            options: ExportOptions::default(),
            sink: Arc::new(LogSink),
        }
    }

    /// Replace the export options wholesale.
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the empty-slot placeholder string.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.options = self.options.with_placeholder(placeholder);
        self
    }

    /// Set the raster oversampling factor.
    pub fn with_oversample(mut self, factor: u32) -> Self {
        self.options = self.options.with_oversample(factor);
        self
    }

    /// Replace the analytics sink.
    pub fn with_analytics(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Run the full export of a filled document.
    pub fn export(&self, doc: &Document, fill: &FillState) -> Result<ExportBundle> {
        export::export(doc, fill, &self.rasterizer, &self.options, self.sink.as_ref())
    }

    /// Render only the workbook artifact.
    pub fn export_workbook(&self, doc: &Document, fill: &FillState) -> Result<Vec<u8>> {
        to_workbook(doc, fill, &self.options)
    }

    /// Render only the raster PDF artifact.
    pub fn export_pdf(&self, doc: &Document, fill: &FillState) -> Result<Vec<u8>> {
        to_raster_pdf(doc, fill, &self.rasterizer, &self.options)
    }
}
