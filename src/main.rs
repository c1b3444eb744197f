//! sheetforge – command-line JSON → HTML (→ PDF) sheet generator.
//!
//! Usage:
//!   sheetforge <input.json> [-o out.html] [--pdf] [--compress] [--dpi N]
//!              [--embed-images] [--fragments out.json] [--style style.json]
//!              [--title "Title"] [--timestamp]
//!
//! If `-o` is omitted the HTML is written next to the input file with the
//! same stem (e.g. `kazrek.json` → `kazrek.html`); `--pdf` writes the PDF
//! beside the HTML.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};

use sheet_forge::export::{compress_pdf, html_to_pdf, ExportConfig};
use sheet_forge::html::{HtmlOptions, StyleConfig};
use sheet_forge::pipeline::{generate_file, write_output, PipelineConfig};
use sheet_forge::registry::RendererRegistry;
use sheet_forge::samples;

#[derive(Parser, Debug)]
#[command(version, about = "Character sheet and item card generator", long_about = None)]
struct Args {
    /// Input JSON document (character sheet, or item with "type": "item")
    #[arg(required_unless_present = "sample")]
    input: Option<PathBuf>,

    /// Output HTML path (default: input stem with .html)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also print the HTML to PDF with a headless browser
    #[arg(long)]
    pdf: bool,

    /// Rasterize and recombine the PDF to shrink it (implies --pdf)
    #[arg(long)]
    compress: bool,

    /// Rasterization resolution for --compress
    #[arg(long)]
    dpi: Option<u32>,

    /// Inline local images as data URIs
    #[arg(long)]
    embed_images: bool,

    /// Dump the fragment tree as JSON to this path
    #[arg(long)]
    fragments: Option<PathBuf>,

    /// JSON file overriding colours, fonts and page size
    #[arg(long)]
    style: Option<PathBuf>,

    /// Document title (default: derived from the input)
    #[arg(short, long)]
    title: Option<String>,

    /// Record the generation time in the HTML head
    #[arg(long)]
    timestamp: bool,

    /// Print a sample input document to stdout and exit
    #[arg(long, value_enum)]
    sample: Option<SampleKind>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SampleKind {
    Character,
    Item,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("sheet_forge=info")).init();

    let args = Args::parse();

    if let Some(kind) = args.sample {
        let json = match kind {
            SampleKind::Character => samples::character_sample(),
            SampleKind::Item => samples::item_sample(),
        };
        println!("{json}");
        return;
    }

    let input = match &args.input {
        Some(p) => p.clone(),
        None => fail("no input file specified"),
    };

    // Default output: same directory + same stem as input, but with .html
    let output = args.output.clone().unwrap_or_else(|| input.with_extension("html"));

    let style = match &args.style {
        Some(path) => StyleConfig::load(path).unwrap_or_else(|e| fail(e)),
        None => StyleConfig::default(),
    };

    let config = PipelineConfig {
        title: args.title.clone(),
        style,
        html: HtmlOptions {
            base_path: None,
            embed_images: args.embed_images,
        },
        stamp_generation_time: args.timestamp,
        ..PipelineConfig::default()
    };

    let registry = RendererRegistry::with_builtins();
    let generated = generate_file(&input, &registry, &config).unwrap_or_else(|e| fail(e));

    if let Err(e) = write_output(&output, generated.html.as_bytes()) {
        fail(e);
    }
    let pages = generated.document.pages.len();
    eprintln!(
        "Wrote '{}' ({} bytes, {} page{})",
        output.display(),
        generated.html.len(),
        pages,
        if pages == 1 { "" } else { "s" }
    );

    let degraded = generated.diagnostic_count();
    if degraded > 0 {
        eprintln!(
            "{degraded} region{} degraded to placeholders (RUST_LOG=sheet_forge=debug lists them)",
            if degraded == 1 { "" } else { "s" }
        );
    }

    if let Some(path) = &args.fragments {
        if let Err(e) = write_output(path, generated.document.to_json().as_bytes()) {
            fail(e);
        }
        eprintln!("Wrote fragment tree to '{}'", path.display());
    }

    if args.pdf || args.compress {
        let mut export = ExportConfig::from_env();
        if let Some(dpi) = args.dpi {
            export.dpi = dpi;
        }
        let pdf = output.with_extension("pdf");
        export_pdf(&output, &pdf, args.compress, &export);
    }
}

fn export_pdf(html: &Path, pdf: &Path, compress: bool, config: &ExportConfig) {
    if !compress {
        html_to_pdf(html, pdf, config).unwrap_or_else(|e| fail(e));
    } else {
        let scratch = tempfile::tempdir().unwrap_or_else(|e| fail(e));
        let raw = scratch.path().join("raw.pdf");
        html_to_pdf(html, &raw, config).unwrap_or_else(|e| fail(e));
        compress_pdf(&raw, pdf, config).unwrap_or_else(|e| fail(e));
    }
    match std::fs::metadata(pdf) {
        Ok(meta) => eprintln!("Wrote '{}' ({} bytes)", pdf.display(), meta.len()),
        Err(e) => fail(format!("reading '{}': {e}", pdf.display())),
    }
}

fn fail(err: impl Display) -> ! {
    eprintln!("Error: {err}");
    process::exit(1);
}
