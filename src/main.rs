//! epubsift - EPUB content extraction with noise filtering

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use epubsift::pipeline::{self, EventSink, PipelineEvent, PipelineOptions, Severity};
use epubsift::report::{ExtractionReport, output_file_name};
use epubsift::{PageTree, RuleSet, read_epub, segment};

#[derive(Parser)]
#[command(name = "epubsift")]
#[command(version, about = "Extract reading-order content from EPUBs, minus the noise", long_about = None)]
#[command(after_help = "EXAMPLES:
    epubsift book.epub                     Extract to extracted_html/
    epubsift book.epub -o out --paragraphs Extract plus paragraph JSON
    epubsift book.epub --no-skip-noise     Keep noise pages too
    epubsift -i book.epub                  Show book metadata")]
struct Cli {
    /// Input EPUB file
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output directory
    #[arg(short, long, default_value = "extracted_html")]
    output_dir: PathBuf,

    /// Rule set JSON file (defaults used when omitted)
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Minimum visible text length for the blank-page test
    #[arg(long, value_name = "N")]
    min_text_length: Option<usize>,

    /// Strip HTML comments from sanitized output
    #[arg(long)]
    no_preserve_comments: bool,

    /// Keep noise pages instead of skipping them
    #[arg(long)]
    no_skip_noise: bool,

    /// Drop blank cover pages like any other blank page
    #[arg(long)]
    no_keep_cover: bool,

    /// Also emit per-page paragraph JSON with character offsets
    #[arg(long)]
    paragraphs: bool,

    /// Show book metadata without extracting
    #[arg(short, long)]
    info: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,

    /// Show per-page skip/extract detail
    #[arg(short, long)]
    verbose: bool,
}

/// Prints pipeline events to the terminal, honoring --quiet/--verbose.
struct ConsoleSink {
    quiet: bool,
    verbose: bool,
}

impl EventSink for ConsoleSink {
    fn emit(&mut self, event: PipelineEvent) {
        match event.severity {
            Severity::Error | Severity::Warn => eprintln!("{}", event.message),
            Severity::Info if !self.quiet => println!("{}", event.message),
            Severity::Debug if self.verbose && !self.quiet => println!("{}", event.message),
            _ => {}
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::init();

    let result = if cli.info {
        show_info(&cli.input)
    } else {
        extract(&cli)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn show_info(path: &str) -> Result<(), String> {
    let ebook = read_epub(path).map_err(|e| e.to_string())?;

    let meta = &ebook.metadata;
    println!("File: {path}");
    println!("Title: {}", meta.title);
    if !meta.authors.is_empty() {
        println!("Authors: {}", meta.authors.join(", "));
    }
    if !meta.language.is_empty() {
        println!("Language: {}", meta.language);
    }
    if let Some(ref publisher) = meta.publisher {
        println!("Publisher: {publisher}");
    }
    println!("Documents: {}", ebook.documents.len());
    println!("TOC entries: {}", ebook.toc.len());
    Ok(())
}

fn extract(cli: &Cli) -> Result<(), String> {
    let mut rules = match &cli.rules {
        Some(path) => RuleSet::load(path).map_err(|e| e.to_string())?,
        None => RuleSet::default().validated().map_err(|e| e.to_string())?,
    };
    if let Some(min) = cli.min_text_length {
        rules.min_text_length = min;
    }

    let options = PipelineOptions {
        skip_noise_pages: !cli.no_skip_noise,
        keep_cover: !cli.no_keep_cover,
        preserve_comments: !cli.no_preserve_comments,
    };

    let ebook = read_epub(&cli.input).map_err(|e| e.to_string())?;
    if !cli.quiet {
        println!("Loaded {} ({} documents)", cli.input, ebook.documents.len());
    }

    let mut sink = ConsoleSink {
        quiet: cli.quiet,
        verbose: cli.verbose,
    };
    let manifest = pipeline::run(&ebook.documents, &rules, &options, &mut sink);

    // Lay out the output tree: <output_dir>/<book>/{raw_html,cleaned_html}
    let base_dir = cli.output_dir.join(safe_name(&cli.input));
    let raw_dir = base_dir.join("raw_html");
    let cleaned_dir = base_dir.join("cleaned_html");
    fs::create_dir_all(&raw_dir).map_err(|e| e.to_string())?;
    fs::create_dir_all(&cleaned_dir).map_err(|e| e.to_string())?;

    for page in &manifest.kept {
        let name = output_file_name(page.order_index, &page.file_name);
        fs::write(raw_dir.join(&name), &page.raw_markup).map_err(|e| e.to_string())?;
        fs::write(cleaned_dir.join(&name), &page.sanitized_markup).map_err(|e| e.to_string())?;
    }

    if cli.paragraphs {
        write_paragraphs(&base_dir, &manifest).map_err(|e| e.to_string())?;
    }

    let report = ExtractionReport::new(
        ebook.metadata,
        ebook.toc,
        &ebook.documents,
        &manifest,
        &cli.input,
        &raw_dir,
        &cleaned_dir,
    );
    let report_path = base_dir.join("extraction_report.json");
    report.write(&report_path).map_err(|e| e.to_string())?;

    if !cli.quiet {
        println!(
            "Extracted {} pages ({} skipped, {} failed) to {}",
            manifest.kept.len(),
            manifest.skipped.len(),
            manifest.failed.len(),
            base_dir.display()
        );
        println!("Report: {}", report_path.display());
    }

    Ok(())
}

#[derive(serde::Serialize)]
struct ParagraphFile<'a> {
    file_name: &'a str,
    paragraph_count: usize,
    paragraphs: Vec<epubsift::Paragraph>,
}

fn write_paragraphs(base_dir: &Path, manifest: &pipeline::RunManifest) -> epubsift::Result<()> {
    let paragraphs_dir = base_dir.join("paragraphs");
    fs::create_dir_all(&paragraphs_dir)?;

    for page in &manifest.kept {
        let tree = PageTree::parse(&page.sanitized_markup);
        let paragraphs = segment(&tree.plain_text());
        let record = ParagraphFile {
            file_name: &page.file_name,
            paragraph_count: paragraphs.len(),
            paragraphs,
        };

        let name = output_file_name(page.order_index, &page.file_name);
        let json_name = format!("{}.json", name.trim_end_matches(".html"));
        let json = serde_json::to_string_pretty(&record).expect("paragraph serialization");
        fs::write(paragraphs_dir.join(json_name), json)?;
    }

    Ok(())
}

/// Directory-safe version of the input file stem.
fn safe_name(input: &str) -> String {
    let stem = Path::new(input)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "book".to_string());
    stem.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .to_string()
}
