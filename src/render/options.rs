//! Export options and configuration.

/// Options shared by the raster and workbook exporters.
///
/// The numeric defaults (2x oversampling, A4 page, 8..60 character column
/// width clamp, ten-underscore placeholder) are stable configuration
/// constants, not externally imposed requirements.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Placeholder rendered for an empty slot in the raster export
    pub placeholder: String,

    /// Raster oversampling factor (>= 2 keeps small text legible)
    pub oversample: u32,

    /// Logical page width in points
    pub page_width: f32,

    /// Logical page height in points
    pub page_height: f32,

    /// Page margin in points
    pub margin: f32,

    /// Base body font size in points
    pub font_size: f32,

    /// Minimum workbook column width in characters
    pub min_column_width: f64,

    /// Maximum workbook column width in characters
    pub max_column_width: f64,

    /// Sheet name prefix for paragraph blocks
    pub paragraph_sheet_prefix: String,

    /// Sheet name prefix for table blocks
    pub table_sheet_prefix: String,
}

impl ExportOptions {
    /// Create new export options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the empty-slot placeholder string.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Set the raster oversampling factor (clamped to at least 1).
    pub fn with_oversample(mut self, factor: u32) -> Self {
        self.oversample = factor.max(1);
        self
    }

    /// Set the logical page size in points.
    pub fn with_page_size(mut self, width: f32, height: f32) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Set the page margin in points.
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Set the base body font size in points.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Set the workbook column width clamp.
    pub fn with_column_width_clamp(mut self, min: f64, max: f64) -> Self {
        self.min_column_width = min;
        self.max_column_width = max;
        self
    }

    /// Usable content width in points after margins.
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            placeholder: "_".repeat(10),
            oversample: 2,
            // A4 portrait in points
            page_width: 595.0,
            page_height: 842.0,
            margin: 36.0,
            font_size: 12.0,
            min_column_width: 8.0,
            max_column_width: 60.0,
            paragraph_sheet_prefix: "Paragraph".to_string(),
            table_sheet_prefix: "Table".to_string(),
        }
    }
}
