//! Label splitter CLI
//!
//! Extracts the two shipping labels from a label sheet PDF and prints them
//! on a Brother QL printer, or saves them as PNG files.

use anyhow::Context;
use clap::Parser;
use label_split::file_ops::{deliver_labels, DeliveryOptions};
use label_split::{
    BrotherQlCommand, LabelError, LabelExtractor, PdfiumRasterizer, PrinterConfig, Rotation,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Extract and print shipping labels from a PDF on a Brother QL printer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input PDF file (only the first page is processed)
    pdf_file: PathBuf,

    /// Only extract images, don't print
    #[arg(long)]
    no_print: bool,

    /// Directory to save output images (defaults to the PDF's directory;
    /// when printing, images are saved only if this is given)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Printer model
    #[arg(short, long, env = "BROTHER_QL_MODEL", default_value = "QL-600")]
    model: String,

    /// Printer identifier
    #[arg(short, long, env = "BROTHER_QL_PRINTER", default_value = "usb://0x04f9:0x20c0")]
    printer: String,

    /// Label size
    #[arg(short, long, env = "BROTHER_QL_LABEL", default_value = "62")]
    label: String,

    /// Rotation applied before printing, in degrees (0, 90 or -90; positive is counter-clockwise)
    #[arg(long, default_value = "-90", allow_negative_numbers = true)]
    rotate: Rotation,

    /// Rotation applied before saving, in degrees (0, 90 or -90)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    save_rotate: Rotation,

    /// Don't cut after each label
    #[arg(long)]
    no_cut: bool,

    /// Directory containing the PDFium shared library
    #[arg(long, env = "PDFIUM_LIB_DIR")]
    pdfium_dir: Option<PathBuf>,

    /// brother_ql executable
    #[arg(long, env = "BROTHER_QL_BIN", default_value = "brother_ql")]
    brother_ql: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    // Report a missing input before complaining about a missing PDFium.
    if !args.pdf_file.is_file() {
        return Err(LabelError::NotFound(args.pdf_file.clone()).into());
    }

    let rasterizer = PdfiumRasterizer::bind(args.pdfium_dir.as_deref())?;
    let extractor = LabelExtractor::new(rasterizer);
    let labels = extractor.extract(&args.pdf_file)?;

    let printer = BrotherQlCommand::new(PrinterConfig {
        model: args.model.clone(),
        printer: args.printer.clone(),
        label: args.label.clone(),
        cut: !args.no_cut,
    })
    .with_program(&args.brother_ql);

    let options = DeliveryOptions {
        print: !args.no_print,
        print_rotation: args.rotate,
        output_dir: args.output_dir.as_deref(),
        save_rotation: args.save_rotate,
    };
    let delivery = deliver_labels(&labels, &args.pdf_file, &printer, &options)
        .with_context(|| format!("delivering labels from {}", args.pdf_file.display()))?;

    for part in &delivery.printed {
        println!("Printed: {}", part);
    }
    if let Some(saved) = &delivery.saved {
        println!("Saved: {}", saved.top.display());
        println!("Saved: {}", saved.bottom.display());
    }

    Ok(())
}
