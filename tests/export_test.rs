//! Integration tests for the full export pipeline.

use std::io::{Cursor, Read};

use formfill::render::{compose, Canvas, TextRole};
use formfill::{
    AnalyticsEvent, AnalyticsSink, CanvasRasterizer, ContentBlock, Document, Exporter,
    ExportOptions, FillState, Result, TableData, TextMeasurer,
};
use image::{Rgb, RgbImage};
use std::sync::{Arc, Mutex};

/// Rasterizer for tests: fixed-advance measurement, blank raster output.
struct MockEngine;

impl TextMeasurer for MockEngine {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * 0.5
    }

    fn line_height(&self, size: f32) -> f32 {
        size * 1.25
    }
}

impl CanvasRasterizer for MockEngine {
    fn rasterize(&self, canvas: &Canvas, scale: u32) -> Result<RgbImage> {
        Ok(RgbImage::from_pixel(
            (canvas.width * scale as f32).ceil() as u32,
            (canvas.height * scale as f32).ceil() as u32,
            Rgb([255, 255, 255]),
        ))
    }
}

#[derive(Default)]
struct RecordingSink(Mutex<Vec<AnalyticsEvent>>);

impl AnalyticsSink for RecordingSink {
    fn record(&self, event: &AnalyticsEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

fn sample_document() -> Document {
    let mut doc = Document::new("form-7", "Lifting Plan");
    doc.reference = Some("LP-07".to_string());
    doc.add_block(ContentBlock::paragraph(
        "p1",
        "Operator: [Name], certified on [Date]",
    ));

    let mut table = TableData::new(3, 2);
    table.set_cell(0, 0, formfill::CellData::header("Check"));
    table.set_cell(0, 1, formfill::CellData::header("Result"));
    table.set_content(1, 0, "Brakes");
    table.set_content(2, 0, "Hoist");
    doc.add_block(ContentBlock::table("t1", table));
    doc
}

#[test]
fn test_archive_contains_two_nonempty_members_with_shared_stem() {
    let doc = sample_document();
    let mut fill = FillState::new();
    fill.set("p-p1-Name-0", "Alice");

    let bundle = Exporter::new(MockEngine).export(&doc, &fill).unwrap();

    let mut zip = zip::ZipArchive::new(Cursor::new(bundle.archive.clone())).unwrap();
    assert_eq!(zip.len(), 2);

    let mut stems = Vec::new();
    for i in 0..zip.len() {
        let mut member = zip.by_index(i).unwrap();
        let name = member.name().to_string();
        let mut content = Vec::new();
        member.read_to_end(&mut content).unwrap();
        assert!(!content.is_empty(), "member {} is empty", name);
        let stem = name
            .rsplit_once('.')
            .map(|(s, _)| s.to_string())
            .unwrap();
        stems.push(stem);
    }
    assert_eq!(stems[0], stems[1]);
    assert_eq!(format!("{}.zip", stems[0]), bundle.file_name);
    assert!(stems[0].starts_with("Lifting Plan_"));
}

#[test]
fn test_empty_document_exports_placeholder_sheet_and_nonempty_pdf() {
    let doc = Document::new("f0", "Empty Form");
    let bundle = Exporter::new(MockEngine)
        .export(&doc, &FillState::new())
        .unwrap();

    assert!(bundle.pdf.starts_with(b"%PDF-"));
    assert!(!bundle.pdf.is_empty());

    // The workbook has exactly one placeholder sheet.
    let sheets = formfill::render::build_sheets(
        &doc,
        &FillState::new(),
        &ExportOptions::default(),
    );
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].cell(0, 0), Some("No data to export"));
}

#[test]
fn test_literal_fidelity_in_raster_and_workbook() {
    let mut doc = Document::new("f1", "Fidelity");
    doc.add_block(ContentBlock::paragraph("p1", "Name: [Name], again [Name]"));
    let mut fill = FillState::new();
    fill.set("p-p1-Name-0", "Alice");
    let options = ExportOptions::default();

    // Raster side: rebuild the composed text with roles applied.
    let canvas = compose(&doc, &fill, &options, &MockEngine).unwrap();
    assert_eq!(canvas.text_with_role(TextRole::Filled), vec!["Alice"]);
    assert_eq!(
        canvas.text_with_role(TextRole::Placeholder),
        vec!["__________"]
    );

    // Workbook side: two distinct rows for the repeated field.
    let sheets = formfill::render::build_sheets(&doc, &fill, &options);
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].cell(1, 0), Some("Name"));
    assert_eq!(sheets[0].cell(1, 1), Some("Alice"));
    assert_eq!(sheets[0].cell(2, 0), Some("Name"));
    assert_eq!(sheets[0].cell(2, 1), Some(""));
}

#[test]
fn test_export_emits_one_analytics_event() {
    let sink = Arc::new(RecordingSink::default());
    let exporter = Exporter::new(MockEngine).with_analytics(sink.clone());

    exporter
        .export(&sample_document(), &FillState::new())
        .unwrap();

    let events = sink.0.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0], AnalyticsEvent::form_filled("form-7"));
}

#[test]
fn test_failed_export_emits_no_event_and_no_archive() {
    let mut doc = Document::new("bad", "Bad Form");
    doc.add_block(ContentBlock::table("t1", TableData::new(0, 3)));
    let sink = Arc::new(RecordingSink::default());
    let exporter = Exporter::new(MockEngine).with_analytics(sink.clone());

    let result = exporter.export(&doc, &FillState::new());
    assert!(result.is_err());
    assert!(sink.0.lock().unwrap().is_empty());
}

#[test]
fn test_export_writes_archive_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = Exporter::new(MockEngine)
        .export(&sample_document(), &FillState::new())
        .unwrap();

    let path = dir.path().join(&bundle.file_name);
    std::fs::write(&path, &bundle.archive).unwrap();
    let read_back = std::fs::read(&path).unwrap();
    assert_eq!(read_back, bundle.archive);
}

#[test]
fn test_multipage_document_paginates() {
    let mut doc = Document::new("long", "Long Form");
    for i in 0..120 {
        doc.add_block(ContentBlock::paragraph(
            format!("p{}", i),
            "Line of repeated content for page filling [X]",
        ));
    }
    let options = ExportOptions::default();
    let pages = formfill::render_document_to_image_pages(
        &doc,
        &FillState::new(),
        &MockEngine,
        &options,
    )
    .unwrap();

    assert!(pages.len() > 1, "expected more than one page");
    let expected_height = (options.page_height * options.oversample as f32).ceil() as u32;
    assert!(pages.iter().all(|p| p.height() == expected_height));
}
