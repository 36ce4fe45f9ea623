//! CLI tool for generating PowerPoint slide decks from a topic.

mod images;
mod llm;
mod pipeline;

use anyhow::{bail, Context, Result};
use clap::Parser;
use deck_core::{parse_slides, NoImages, Session, SlideCount, TextGenerator, Theme};
use deck_pptx::{DeckReader, ShapeKind, SlideSummary};
use images::{PexelsImages, DEFAULT_IMAGE_TIMEOUT};
use llm::{ChatClient, GeneratorConfig, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use pipeline::{DeckBuilder, DeckOutcome, DeckRequest, GenerationSettings, Pipeline};
use std::fs::{self, File};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

/// Generate a slide deck (.pptx) about a topic.
#[derive(Parser, Debug)]
#[command(name = "deckgen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// What the presentation is about
    #[arg(required_unless_present = "from_file")]
    topic: Option<String>,

    /// Number of slides to ask for (5-100)
    #[arg(short = 'n', long, default_value_t = deck_core::prompt::DEFAULT_SLIDES)]
    slides: usize,

    /// Color style: Professional, Creative, Educational, Minimal, Bold or Modern
    #[arg(short, long, default_value = "Professional")]
    style: String,

    /// Author name shown on the title slide
    #[arg(short, long)]
    author: Option<String>,

    /// Add a stock photo to each content slide
    #[arg(short, long)]
    images: bool,

    /// Output directory (default: current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render a saved model completion instead of calling the model
    #[arg(short, long)]
    from_file: Option<PathBuf>,

    /// Print the parsed slides as JSON instead of writing a deck
    #[arg(short, long)]
    print_slides: bool,

    /// Read the written deck back and print its structure
    #[arg(long)]
    verify: bool,

    /// API key for the completion service
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model name
    #[arg(long, env = "DECKGEN_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Sampling temperature
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Maximum completion tokens
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// API key for the Pexels photo search (required with --images)
    #[arg(long, env = "PEXELS_API_KEY", hide_env_values = true)]
    pexels_key: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let request = DeckRequest {
        topic: args.topic.clone().unwrap_or_default(),
        slide_count: SlideCount::clamp(args.slides),
        theme: Theme::from_name(&args.style),
        author: args.author.clone(),
        include_images: args.images,
    };

    let outcome = match &args.from_file {
        Some(path) => render_saved_completion(path, &args, &request)?,
        None => generate(&args, &request)?,
    };

    let Some(outcome) = outcome else {
        return Ok(());
    };

    if args.verbose {
        for (idx, slide) in outcome.slides.iter().enumerate() {
            eprintln!("  {:>3}. {} ({} bullets)", idx + 1, slide.title, slide.bullets.len());
        }
    }

    let output_path = get_output_path(args.output.as_deref(), &outcome.artifact.file_name)?;
    write_output(&output_path, &outcome.artifact.bytes)?;
    println!(
        "Wrote {} slides to {}",
        outcome.artifact.slide_count,
        output_path.display()
    );

    if args.verify {
        print_summary(&outcome.artifact.bytes)?;
    }

    Ok(())
}

/// Call the model and render its answer.
fn generate(args: &Args, request: &DeckRequest) -> Result<Option<DeckOutcome>> {
    let api_key = args
        .api_key
        .clone()
        .context("No API key: pass --api-key or set GROQ_API_KEY")?;
    let generator = ChatClient::new(GeneratorConfig::new(api_key).with_model(&args.model))?;

    if args.print_slides {
        let prompt = deck_core::build_prompt(&request.topic, request.slide_count, request.theme);
        let completion = generator.generate(&prompt, args.max_tokens, args.temperature)?;
        print_slides(&completion)?;
        return Ok(None);
    }

    let settings = GenerationSettings {
        max_tokens: args.max_tokens,
        temperature: args.temperature,
    };

    if args.verbose {
        eprintln!(
            "Generating {} slides about \"{}\" ({} style)",
            request.slide_count.get(),
            request.topic.trim(),
            request.theme
        );
    }

    let (session, result) = if request.include_images {
        let images = photo_source(args)?;
        Pipeline::new(&generator, &images)
            .with_settings(settings)
            .run(Session::new(), request)
    } else {
        Pipeline::new(&generator, &NoImages)
            .with_settings(settings)
            .run(Session::new(), request)
    };

    if let Some(reply) = session.last() {
        log::info!("{}", reply.content);
    }

    match result {
        Ok(outcome) => Ok(Some(outcome)),
        Err(e) if e.is_recoverable() => bail!("{}. Try again or rephrase the topic.", e),
        Err(e) => Err(e.into()),
    }
}

/// Parse and render a completion saved to disk.
fn render_saved_completion(
    path: &Path,
    args: &Args,
    request: &DeckRequest,
) -> Result<Option<DeckOutcome>> {
    let completion = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if args.print_slides {
        print_slides(&completion)?;
        return Ok(None);
    }

    let slides = parse_slides(&completion);
    if args.verbose {
        eprintln!("  Found {} slides in {}", slides.len(), path.display());
    }

    let outcome = if request.include_images {
        let images = photo_source(args)?;
        DeckBuilder::new(&images).build(slides, request)
    } else {
        DeckBuilder::new(&NoImages).build(slides, request)
    };
    Ok(Some(outcome.with_context(|| {
        format!("Failed to render slides from {}", path.display())
    })?))
}

fn photo_source(args: &Args) -> Result<PexelsImages> {
    let key = args
        .pexels_key
        .clone()
        .context("--images needs a Pexels key: pass --pexels-key or set PEXELS_API_KEY")?;
    PexelsImages::new(key, DEFAULT_IMAGE_TIMEOUT).context("Failed to create photo client")
}

fn print_slides(completion: &str) -> Result<()> {
    let slides = parse_slides(completion);
    if slides.is_empty() {
        bail!("{}", deck_core::Error::NoSlides);
    }
    println!("{}", serde_json::to_string_pretty(&slides)?);
    Ok(())
}

fn print_summary(bytes: &[u8]) -> Result<()> {
    let deck = DeckReader::new()
        .read(Cursor::new(bytes))
        .context("Failed to read back the written deck")?;
    for slide in &deck.slides {
        println!("{}", describe_slide(slide));
    }
    Ok(())
}

/// One summary line: title, body lines (author line or bullets) and pictures.
fn describe_slide(slide: &SlideSummary) -> String {
    let mut text_boxes = slide
        .shapes
        .iter()
        .filter(|s| s.kind == ShapeKind::Shape && !s.paragraphs.is_empty());
    let title = text_boxes
        .next()
        .and_then(|s| s.paragraphs.first())
        .map(String::as_str)
        .unwrap_or("");
    let body_lines: usize = text_boxes.map(|s| s.paragraphs.len()).sum();
    let pictures = slide
        .shapes
        .iter()
        .filter(|s| s.kind == ShapeKind::Picture)
        .count();

    let body = match (slide.number, body_lines) {
        (1, 0) => "no author line".to_string(),
        (1, _) => "with author line".to_string(),
        (_, n) => format!("{} bullets", n),
    };
    format!("  {:>3}. {} ({}, {} pictures)", slide.number, title, body, pictures)
}

/// Determine where to write the deck.
fn get_output_path(output_dir: Option<&Path>, file_name: &str) -> Result<PathBuf> {
    let output_path = match output_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(file_name)
        }
        None => PathBuf::from(file_name),
    };

    Ok(output_path)
}

/// Write the deck to a file.
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
