//! Download archive packaging.

use crate::error::Result;
use chrono::{DateTime, Local};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Build the archive filename stem: `{name}_{DD-MM-YYYY_HHhMM}`.
pub fn timestamp_stem(name: &str, now: DateTime<Local>) -> String {
    format!("{}_{}", name, now.format("%d-%m-%Y_%Hh%M"))
}

/// Bundle the two export artifacts into one compressed ZIP archive.
///
/// The archive holds exactly `{stem}.pdf` and `{stem}.xlsx`. Upstream
/// export failures never reach this function; it fails only when the
/// compression itself does.
pub fn bundle(stem: &str, pdf: &[u8], workbook: &[u8]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file(format!("{}.pdf", stem), options)?;
    writer.write_all(pdf)?;
    writer.start_file(format!("{}.xlsx", stem), options)?;
    writer.write_all(workbook)?;

    Ok(writer.finish()?.into_inner())
}
