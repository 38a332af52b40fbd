//! formfill CLI - fill and export form documents

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

use formfill::{
    Document, Exporter, ExportOptions, FillState, FontRasterizer, Result,
};

#[derive(Parser)]
#[command(name = "formfill")]
#[command(version)]
#[command(about = "Export filled form documents to PDF, XLSX and ZIP", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the full archive (PDF + XLSX in a ZIP)
    Export {
        /// Document JSON file
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        /// Answers JSON file: an object of slot key to value
        #[arg(short, long, value_name = "FILE")]
        answers: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        /// Font file for rasterization (system fonts when omitted)
        #[arg(long, value_name = "FILE")]
        font: Option<PathBuf>,

        /// Raster oversampling factor
        #[arg(long, default_value = "2")]
        oversample: u32,
    },

    /// Export only the XLSX workbook
    Workbook {
        /// Document JSON file
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        /// Answers JSON file
        #[arg(short, long, value_name = "FILE")]
        answers: Option<PathBuf>,

        /// Output file (defaults to the document name)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List the fillable slots of a document
    Slots {
        /// Document JSON file
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Export {
            document,
            answers,
            output,
            font,
            oversample,
        } => {
            let doc = load_document(&document)?;
            let fill = load_answers(answers.as_deref())?;
            let rasterizer = match font {
                Some(path) => FontRasterizer::from_font_file(path)?,
                None => FontRasterizer::from_system_fonts()?,
            };
            let exporter = Exporter::new(rasterizer)
                .with_options(ExportOptions::new().with_oversample(oversample));

            let bundle = exporter.export(&doc, &fill)?;
            let target = output.join(&bundle.file_name);
            fs::write(&target, &bundle.archive)?;
            println!(
                "{} {} ({} bytes)",
                "wrote".green().bold(),
                target.display(),
                bundle.archive.len()
            );
            Ok(())
        }

        Commands::Workbook {
            document,
            answers,
            output,
        } => {
            let doc = load_document(&document)?;
            let fill = load_answers(answers.as_deref())?;
            let bytes = formfill::to_workbook(&doc, &fill, &ExportOptions::default())?;
            let target =
                output.unwrap_or_else(|| PathBuf::from(format!("{}.xlsx", doc.name)));
            fs::write(&target, &bytes)?;
            println!("{} {}", "wrote".green().bold(), target.display());
            Ok(())
        }

        Commands::Slots { document } => {
            let doc = load_document(&document)?;
            for block in &doc.content_blocks {
                match block {
                    formfill::ContentBlock::Paragraph { id, template } => {
                        for field in formfill::extract_fields(id, template) {
                            println!("{}  {}", field.slot_key.cyan(), field.name);
                        }
                    }
                    formfill::ContentBlock::Table { id, data } => {
                        for (row, col, key) in formfill::fields::table_slots(id, data) {
                            println!("{}  cell ({}, {})", key.cyan(), row, col);
                        }
                    }
                }
            }
            Ok(())
        }
    }
}

fn load_document(path: &std::path::Path) -> Result<Document> {
    let doc = Document::from_json(&fs::read_to_string(path)?)?;
    log::debug!("loaded document '{}' with {} blocks", doc.name, doc.block_count());
    Ok(doc)
}

fn load_answers(path: Option<&std::path::Path>) -> Result<FillState> {
    let Some(path) = path else {
        return Ok(FillState::new());
    };
    let values: HashMap<String, String> = serde_json::from_str(&fs::read_to_string(path)?)?;
    Ok(values.into_iter().collect())
}
