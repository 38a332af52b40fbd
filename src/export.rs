//! Export orchestration: both renders, the bundle, and the analytics event.

use crate::analytics::{AnalyticsEvent, AnalyticsSink};
use crate::archive::{bundle, timestamp_stem};
use crate::error::Result;
use crate::fill::FillState;
use crate::model::Document;
use crate::render::{to_raster_pdf, to_workbook, CanvasRasterizer, ExportOptions, TextMeasurer};
use chrono::Local;

/// All artifacts of a successful export.
#[derive(Debug, Clone)]
pub struct ExportBundle {
    /// Download filename, `{name}_{timestamp}.zip`
    pub file_name: String,

    /// The shared filename stem of both archive members
    pub stem: String,

    /// Raster PDF bytes
    pub pdf: Vec<u8>,

    /// XLSX workbook bytes
    pub workbook: Vec<u8>,

    /// The ZIP archive holding both
    pub archive: Vec<u8>,
}

/// Run the full export of a filled document.
///
/// A single fill snapshot is taken up front; the two renders are pure
/// functions of `(document, snapshot)` and run concurrently. Any render
/// failure aborts the whole export with no partial archive. On success one
/// best-effort `form_filled` event is recorded.
pub fn export<R>(
    doc: &Document,
    fill: &FillState,
    rasterizer: &R,
    options: &ExportOptions,
    sink: &dyn AnalyticsSink,
) -> Result<ExportBundle>
where
    R: CanvasRasterizer + TextMeasurer + Sync,
{
    let snapshot = fill.clone();
    log::info!(
        "exporting document {} ({} block(s), {} filled slot(s))",
        doc.id,
        doc.block_count(),
        snapshot.len()
    );

    let (pdf, workbook) = rayon::join(
        || to_raster_pdf(doc, &snapshot, rasterizer, options),
        || to_workbook(doc, &snapshot, options),
    );
    let (pdf, workbook) = (pdf?, workbook?);

    let stem = timestamp_stem(&doc.name, Local::now());
    let archive = bundle(&stem, &pdf, &workbook)?;

    sink.record(&AnalyticsEvent::form_filled(&doc.id));

    Ok(ExportBundle {
        file_name: format!("{}.zip", stem),
        stem,
        pdf,
        workbook,
        archive,
    })
}
