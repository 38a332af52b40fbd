//! PDF packaging of rasterized page images.
//!
//! Each page band becomes one PDF page whose content stream draws a single
//! FlateDecode DeviceRGB image XObject scaled to the media box. Page order
//! follows band order, first page first.

use crate::error::{Error, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbImage;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};
use std::io::Write;

/// Assemble page images into a PDF byte stream.
///
/// `page_width` and `page_height` are the logical media box in points; the
/// oversampled pixels are scaled back down to it.
pub fn pages_to_pdf(pages: &[RgbImage], page_width: f32, page_height: f32) -> Result<Vec<u8>> {
    if pages.is_empty() {
        return Err(Error::Raster("no page images to package".to_string()));
    }

    let mut pdf = Pdf::new();
    let mut next = 1;
    let mut alloc = || {
        let r = Ref::new(next);
        next += 1;
        r
    };

    let catalog_id = alloc();
    let page_tree_id = alloc();
    let page_ids: Vec<Ref> = pages.iter().map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = pages.iter().map(|_| alloc()).collect();
    let image_ids: Vec<Ref> = pages.iter().map(|_| alloc()).collect();

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    for (index, image) in pages.iter().enumerate() {
        let image_name = format!("Im{}", index);

        let mut page = pdf.page(page_ids[index]);
        page.media_box(Rect::new(0.0, 0.0, page_width, page_height));
        page.parent(page_tree_id);
        page.contents(content_ids[index]);
        page.resources()
            .x_objects()
            .pair(Name(image_name.as_bytes()), image_ids[index]);
        page.finish();

        let mut content = Content::new();
        content.save_state();
        // Unit image space scaled to cover the full media box.
        content.transform([page_width, 0.0, 0.0, page_height, 0.0, 0.0]);
        content.x_object(Name(image_name.as_bytes()));
        content.restore_state();
        pdf.stream(content_ids[index], &content.finish());

        let compressed = deflate(image.as_raw())?;
        let mut xobject = pdf.image_xobject(image_ids[index], &compressed);
        xobject.filter(Filter::FlateDecode);
        xobject.width(image.width() as i32);
        xobject.height(image.height() as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
        xobject.finish();
    }

    Ok(pdf.finish())
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| Error::Raster(format!("page image compression failed: {}", e)))
}
