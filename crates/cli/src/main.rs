//! CLI tool for converting slide decks between PPTX, Keynote, HTML and JSON.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use deck_core::{ConvertConfig, Deck, DeckFormat, Error, HtmlRenderer, HtmlSlideParser, TitleClassifier};
use deck_keynote::KeynoteExtractor;
use deck_pptx::{PptxParser, PptxWriter, Restyler, TextReplacer};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Convert right-to-left slide decks between formats.
#[derive(Parser, Debug)]
#[command(name = "deck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file overriding conversion settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render .pptx, .key or .json decks as interactive HTML presentations
    Html {
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output directory (default: same as input file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print output to stdout instead of writing to file
        #[arg(short, long)]
        print: bool,
    },

    /// Write .html or .json decks as PowerPoint files
    Pptx {
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output directory (default: same as input file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract slide text from any supported input as a JSON deck record
    Extract {
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output directory (default: same as input file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print output to stdout instead of writing to file
        #[arg(short, long)]
        print: bool,
    },

    /// Replace text in the slides of a .pptx file
    Replace {
        input: PathBuf,

        /// Replacement as OLD=NEW; may be repeated and applies in order
        #[arg(short = 'r', long = "replace", required = true, value_parser = parse_replacement)]
        replacements: Vec<(String, String)>,

        /// Only touch this 1-based slide number; may be repeated
        #[arg(long = "slide")]
        slides: Vec<usize>,

        /// Output file (default: rewrite the input in place)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply right-to-left title and body styling to .pptx files
    Restyle {
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output directory (default: rewrite each input in place)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let config = match &cli.config {
        Some(path) => ConvertConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ConvertConfig::default(),
    };

    match &cli.command {
        Command::Html { input, output, print } => {
            for input_path in input {
                run_one(input_path, cli.verbose, || {
                    let html = render_html(input_path, &config)?;
                    if *print {
                        print!("{}", html);
                        return Ok(None);
                    }
                    let output_path = get_output_path(input_path, output.as_ref(), "html")?;
                    write_output(&output_path, &html)?;
                    Ok(Some(output_path))
                });
            }
        }
        Command::Pptx { input, output } => {
            for input_path in input {
                run_one(input_path, cli.verbose, || {
                    let output_path = get_output_path(input_path, output.as_ref(), "pptx")?;
                    write_pptx(input_path, &output_path, &config)?;
                    Ok(Some(output_path))
                });
            }
        }
        Command::Extract { input, output, print } => {
            for input_path in input {
                run_one(input_path, cli.verbose, || {
                    if detect_format(input_path)? == DeckFormat::Json {
                        bail!("already a deck record");
                    }
                    let deck = load_deck(input_path, &config)?;
                    let json = format!("{}\n", deck.to_json()?);
                    if *print {
                        print!("{}", json);
                        return Ok(None);
                    }
                    let output_path = get_output_path(input_path, output.as_ref(), "json")?;
                    write_output(&output_path, &json)?;
                    Ok(Some(output_path))
                });
            }
        }
        Command::Replace {
            input,
            replacements,
            slides,
            output,
        } => {
            let mut replacer = TextReplacer::new(replacements.clone())?;
            if !slides.is_empty() {
                replacer = replacer.only_slides(slides.iter().copied());
            }
            let output_path = output.clone().unwrap_or_else(|| input.clone());

            run_one(input, cli.verbose, || {
                let report = replacer
                    .replace_file(input, &output_path)
                    .with_context(|| format!("Failed to rewrite {}", input.display()))?;
                eprintln!("{} replacements", report.total);
                if cli.verbose {
                    for (slide, count) in &report.per_slide {
                        eprintln!("  slide {}: {}", slide, count);
                    }
                }
                Ok(Some(output_path.clone()))
            });
        }
        Command::Restyle { input, output } => {
            let restyler = Restyler::new(&config.writer, &config.theme, TitleClassifier::new(&config.classifier));
            for input_path in input {
                run_one(input_path, cli.verbose, || {
                    if detect_format(input_path)? != DeckFormat::Pptx {
                        bail!("not a PowerPoint file");
                    }
                    let output_path = match output {
                        Some(_) => get_output_path(input_path, output.as_ref(), "pptx")?,
                        None => input_path.clone(),
                    };
                    let report = restyler
                        .restyle_file(input_path, &output_path)
                        .with_context(|| format!("Failed to restyle {}", input_path.display()))?;
                    if cli.verbose {
                        eprintln!(
                            "  {} slides, {} titles, {} body shapes",
                            report.slides, report.titles, report.body_shapes
                        );
                    }
                    Ok(Some(output_path))
                });
            }
        }
    }

    Ok(())
}

/// Process one input, reporting failure without stopping the run.
fn run_one<F>(input_path: &Path, verbose: bool, process: F)
where
    F: FnOnce() -> Result<Option<PathBuf>>,
{
    if verbose {
        eprintln!("Processing: {}", input_path.display());
    }

    match process() {
        Ok(Some(output_path)) => {
            if verbose {
                eprintln!("Written to: {}", output_path.display());
            }
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error processing {}: {:#}", input_path.display(), e);
        }
    }
}

/// Parse an `OLD=NEW` replacement argument.
fn parse_replacement(arg: &str) -> std::result::Result<(String, String), String> {
    match arg.split_once('=') {
        Some((find, _)) if find.is_empty() => Err("text to replace must not be empty".to_string()),
        Some((find, replace)) => Ok((find.to_string(), replace.to_string())),
        None => Err(format!("expected OLD=NEW, got '{}'", arg)),
    }
}

/// Detect the format of an input from its extension, then its first bytes.
fn detect_format(input_path: &Path) -> Result<DeckFormat> {
    let ext = input_path.extension().and_then(|e| e.to_str());
    if let Some(format) = ext.and_then(DeckFormat::from_extension) {
        return Ok(format);
    }

    // A package directory without a .key extension cannot be sniffed
    if input_path.is_dir() {
        return Err(Error::UnsupportedFormat(input_path.display().to_string()).into());
    }

    let mut file = File::open(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;
    let mut magic = [0u8; 8];
    let n = file
        .read(&mut magic)
        .with_context(|| "Failed to read file header")?;

    let format = DeckFormat::from_magic(&magic[..n])
        .ok_or_else(|| Error::UnsupportedFormat(input_path.display().to_string()))?;
    Ok(format)
}

/// Read a deck from any supported input.
fn load_deck(input_path: &Path, config: &ConvertConfig) -> Result<Deck> {
    let format = detect_format(input_path)?;
    let filename = input_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    let deck = match format {
        DeckFormat::Pptx => {
            log::debug!("Parsing as PPTX");
            let parser = PptxParser::new(TitleClassifier::new(&config.classifier));
            parser.parse_path(input_path)?
        }
        DeckFormat::Keynote => {
            log::debug!("Extracting from Keynote");
            KeynoteExtractor::new(&config.keynote, &config.classifier, &config.render.labels)
                .extract(input_path)?
        }
        DeckFormat::Html => {
            log::debug!("Parsing as HTML presentation");
            let html = std::fs::read_to_string(input_path)
                .with_context(|| format!("Failed to read {}", input_path.display()))?;
            let mut deck = Deck::new(filename, DeckFormat::Html);
            deck.slides = HtmlSlideParser::new().parse_slides(&html)?;
            deck
        }
        DeckFormat::Json => {
            log::debug!("Reading deck record");
            let json = std::fs::read_to_string(input_path)
                .with_context(|| format!("Failed to read {}", input_path.display()))?;
            Deck::from_json(&json)?
        }
    };

    log::debug!("{}: {} slides", filename, deck.slides.len());
    Ok(deck)
}

fn render_html(input_path: &Path, config: &ConvertConfig) -> Result<String> {
    if detect_format(input_path)? == DeckFormat::Html {
        bail!("already an HTML presentation");
    }
    let deck = load_deck(input_path, config)?;
    if deck.is_empty() {
        log::warn!("{}: no slides found, writing placeholder", deck.source);
    }
    Ok(HtmlRenderer::new(&config.render, &config.theme).render(&deck.slides))
}

fn write_pptx(input_path: &Path, output_path: &Path, config: &ConvertConfig) -> Result<()> {
    if detect_format(input_path)? == DeckFormat::Pptx {
        bail!("already a PowerPoint file");
    }
    let deck = load_deck(input_path, config)?;
    if deck.is_empty() {
        log::warn!("{}: no slides found, writing placeholder", deck.source);
    }

    PptxWriter::new(&config.writer, &config.theme)
        .with_labels(&config.render.labels)
        .with_document_title(config.render.document_title.clone())
        .write_to_path(&deck.slides, output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    Ok(())
}

/// Determine the output path for a processed file.
fn get_output_path(input_path: &Path, output_dir: Option<&PathBuf>, extension: &str) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}.{}", stem, extension);

    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => {
            if let Some(parent) = input_path.parent() {
                parent.join(output_filename)
            } else {
                PathBuf::from(output_filename)
            }
        }
    };

    Ok(output_path)
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
