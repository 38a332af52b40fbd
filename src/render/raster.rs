//! Canvas rasterization and page-band slicing.
//!
//! Rasterization hides behind the [`CanvasRasterizer`] capability trait so
//! the drawing technology stays swappable; the built-in implementation
//! draws glyph outlines with `ab_glyph` onto an `image` RGB buffer. The
//! tall raster is then sliced into fixed-height page bands. Slicing is a
//! pure function of total raster height and page height: content that
//! straddles a band boundary is cut, by design, rather than special-cased.

use crate::error::{Error, Result};
use crate::render::layout::{Canvas, DrawOp, TextMeasurer, TextRole};
use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use std::path::Path;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([20, 20, 20]);
const HEADER_SHADE: Rgb<u8> = Rgb([225, 228, 232]);
const FILLED_BLUE: Rgb<u8> = Rgb([26, 86, 170]);
const PLACEHOLDER_GRAY: Rgb<u8> = Rgb([120, 120, 120]);

/// Rasterizes a composed canvas into a single tall RGB image at
/// `scale` device pixels per logical point.
pub trait CanvasRasterizer {
    /// Produce the oversampled raster of the whole canvas.
    fn rasterize(&self, canvas: &Canvas, scale: u32) -> Result<RgbImage>;
}

/// Built-in rasterizer drawing ab_glyph outlines onto an image buffer.
pub struct FontRasterizer {
    font: FontVec,
}

impl FontRasterizer {
    /// Create a rasterizer from raw TrueType/OpenType font bytes.
    pub fn from_font_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| Error::Raster(format!("invalid font data: {}", e)))?;
        Ok(Self { font })
    }

    /// Create a rasterizer from a font file on disk.
    pub fn from_font_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_font_bytes(std::fs::read(path)?)
    }

    /// Locate a usable sans-serif font in the usual system directories.
    pub fn from_system_fonts() -> Result<Self> {
        const CANDIDATES: &[&str] = &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
            "/Library/Fonts/Arial.ttf",
            "C:\\Windows\\Fonts\\arial.ttf",
        ];
        for candidate in CANDIDATES {
            if Path::new(candidate).is_file() {
                log::debug!("using system font {}", candidate);
                return Self::from_font_file(candidate);
            }
        }
        Err(Error::Raster(
            "no usable system font found; supply one with from_font_bytes".to_string(),
        ))
    }

    fn color_for(role: TextRole) -> Rgb<u8> {
        match role {
            TextRole::Body | TextRole::Heading | TextRole::HeaderCell => BLACK,
            TextRole::Filled => FILLED_BLUE,
            TextRole::Placeholder => PLACEHOLDER_GRAY,
        }
    }

    fn draw_text(
        &self,
        img: &mut RgbImage,
        x: f32,
        baseline: f32,
        size: f32,
        role: TextRole,
        text: &str,
    ) {
        let color = Self::color_for(role);
        let scaled = self.font.as_scaled(PxScale::from(size));
        let mut caret = x;
        let mut prev = None;

        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev_id) = prev {
                caret += scaled.kern(prev_id, id);
            }
            let glyph = id.with_scale_and_position(scaled.scale(), point(caret, baseline));
            if let Some(outlined) = scaled.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let px = bounds.min.x + gx as f32;
                    let py = bounds.min.y + gy as f32;
                    if px < 0.0 || py < 0.0 {
                        return;
                    }
                    let (px, py) = (px as u32, py as u32);
                    if px < img.width() && py < img.height() && coverage > 0.05 {
                        let under = img.get_pixel(px, py).0;
                        let blended = Rgb([
                            blend(under[0], color.0[0], coverage),
                            blend(under[1], color.0[1], coverage),
                            blend(under[2], color.0[2], coverage),
                        ]);
                        img.put_pixel(px, py, blended);
                    }
                });
            }
            caret += scaled.h_advance(id);
            prev = Some(id);
        }

        // Filled values get an underline so they stand out from literals.
        if role == TextRole::Filled {
            let width = caret - x;
            let y = baseline + size * 0.15;
            draw_h_line(img, x, y, width, 1.0_f32.max(size / 14.0), color);
        }
    }
}

fn blend(under: u8, over: u8, coverage: f32) -> u8 {
    (under as f32 * (1.0 - coverage) + over as f32 * coverage) as u8
}

fn draw_h_line(img: &mut RgbImage, x: f32, y: f32, width: f32, thickness: f32, color: Rgb<u8>) {
    fill_rect(img, x, y, width, thickness, color);
}

fn fill_rect(img: &mut RgbImage, x: f32, y: f32, w: f32, h: f32, color: Rgb<u8>) {
    let x0 = x.max(0.0) as u32;
    let y0 = y.max(0.0) as u32;
    let x1 = ((x + w).ceil() as u32).min(img.width());
    let y1 = ((y + h).ceil() as u32).min(img.height());
    for py in y0..y1 {
        for px in x0..x1 {
            img.put_pixel(px, py, color);
        }
    }
}

fn stroke_rect(img: &mut RgbImage, x: f32, y: f32, w: f32, h: f32, t: f32, color: Rgb<u8>) {
    fill_rect(img, x, y, w, t, color);
    fill_rect(img, x, y + h - t, w, t, color);
    fill_rect(img, x, y, t, h, color);
    fill_rect(img, x + w - t, y, t, h, color);
}

impl TextMeasurer for FontRasterizer {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(size));
        let mut width = 0.0;
        let mut prev = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev_id) = prev {
                width += scaled.kern(prev_id, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    fn line_height(&self, size: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(size));
        scaled.ascent() - scaled.descent() + scaled.line_gap()
    }
}

impl CanvasRasterizer for FontRasterizer {
    fn rasterize(&self, canvas: &Canvas, scale: u32) -> Result<RgbImage> {
        if canvas.width <= 0.0 || canvas.height <= 0.0 {
            return Err(Error::Raster("canvas has a zero dimension".to_string()));
        }
        let scale_f = scale as f32;
        let width = (canvas.width * scale_f).ceil() as u32;
        let height = (canvas.height * scale_f).ceil() as u32;
        let mut img = RgbImage::from_pixel(width, height, WHITE);
        let border = 1.0_f32.max(scale_f * 0.5);

        for op in &canvas.ops {
            match op {
                DrawOp::RectFill { x, y, w, h } => {
                    fill_rect(
                        &mut img,
                        x * scale_f,
                        y * scale_f,
                        w * scale_f,
                        h * scale_f,
                        HEADER_SHADE,
                    );
                }
                DrawOp::RectOutline { x, y, w, h } => {
                    stroke_rect(
                        &mut img,
                        x * scale_f,
                        y * scale_f,
                        w * scale_f,
                        h * scale_f,
                        border,
                        BLACK,
                    );
                }
                DrawOp::Rule { x1, x2, y } => {
                    draw_h_line(&mut img, x1 * scale_f, y * scale_f, (x2 - x1) * scale_f, border, BLACK);
                }
                DrawOp::Text { x, y, size, role, text } => {
                    self.draw_text(
                        &mut img,
                        x * scale_f,
                        y * scale_f,
                        size * scale_f,
                        *role,
                        text,
                    );
                }
            }
        }
        Ok(img)
    }
}

/// Slice a tall raster into page-height bands, first page first.
///
/// The final band is padded with background to a full page so every page
/// shares the same pixel dimensions. Slicing never inspects content: a
/// block that straddles a band boundary is split across the two pages.
/// That trade-off is accepted and documented, not a defect.
pub fn paginate(raster: &RgbImage, page_height_px: u32) -> Vec<RgbImage> {
    if page_height_px == 0 || raster.height() == 0 {
        return Vec::new();
    }
    let mut pages = Vec::new();
    let mut top = 0;
    while top < raster.height() {
        let band = page_height_px.min(raster.height() - top);
        let slice = image::imageops::crop_imm(raster, 0, top, raster.width(), band).to_image();
        if band < page_height_px {
            let mut padded = RgbImage::from_pixel(raster.width(), page_height_px, WHITE);
            image::imageops::replace(&mut padded, &slice, 0, 0);
            pages.push(padded);
        } else {
            pages.push(slice);
        }
        top += band;
    }
    pages
}
