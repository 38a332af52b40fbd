//! Rendering module: the two export encodings of a filled document.

pub mod layout;
mod options;
mod pdf;
mod raster;
mod sanitize;
pub mod workbook;

pub use layout::{compose, Canvas, DrawOp, TextMeasurer, TextRole};
pub use options::ExportOptions;
pub use pdf::pages_to_pdf;
pub use raster::{paginate, CanvasRasterizer, FontRasterizer};
pub use sanitize::markup_to_plain;
pub use workbook::{
    build_sheets, table_to_workbook, to_workbook, write_workbook, MergeRegion, SheetModel,
};

use crate::error::Result;
use crate::fill::FillState;
use crate::model::Document;

/// Render the filled document into page images, one per output page.
///
/// This is the raster capability seam: compose the off-screen
/// representation, rasterize it at the configured oversampling factor,
/// then slice it into page-height bands.
pub fn render_document_to_image_pages<R>(
    doc: &Document,
    fill: &FillState,
    rasterizer: &R,
    options: &ExportOptions,
) -> Result<Vec<image::RgbImage>>
where
    R: CanvasRasterizer + TextMeasurer,
{
    let canvas = compose(doc, fill, options, rasterizer)?;
    let raster = rasterizer.rasterize(&canvas, options.oversample)?;
    let page_height_px = (options.page_height * options.oversample as f32).ceil() as u32;
    Ok(paginate(&raster, page_height_px))
}

/// Render the filled document straight to PDF bytes.
pub fn to_raster_pdf<R>(
    doc: &Document,
    fill: &FillState,
    rasterizer: &R,
    options: &ExportOptions,
) -> Result<Vec<u8>>
where
    R: CanvasRasterizer + TextMeasurer,
{
    let pages = render_document_to_image_pages(doc, fill, rasterizer, options)?;
    log::debug!("raster export: {} page(s)", pages.len());
    pages_to_pdf(&pages, options.page_width, options.page_height)
}
