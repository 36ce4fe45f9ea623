//! Topic-to-deck pipeline: prompt, generate, parse, fetch images, render.

use deck_core::{
    build_prompt, DeckArtifact, Error, ImageSource, RenderOptions, Result, Session, SlideCount,
    SlideParser, SlideRecord, TextGenerator, Theme,
};
use deck_pptx::DeckRenderer;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::collections::HashMap;

/// Everything a single generation needs from the user.
#[derive(Debug, Clone)]
pub struct DeckRequest {
    pub topic: String,
    pub slide_count: SlideCount,
    pub theme: Theme,
    pub author: Option<String>,
    pub include_images: bool,
}

/// Sampling settings passed through to the generator.
#[derive(Debug, Clone, Copy)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_tokens: crate::llm::DEFAULT_MAX_TOKENS,
            temperature: crate::llm::DEFAULT_TEMPERATURE,
        }
    }
}

/// A finished generation.
#[derive(Debug)]
pub struct DeckOutcome {
    pub slides: Vec<SlideRecord>,
    pub artifact: DeckArtifact,
}

/// Upper bound on concurrent stock-photo lookups.
pub const MAX_PARALLEL_FETCHES: usize = 4;

/// Fetches pictures for parsed slides and renders the deck.
pub struct DeckBuilder<'a, I: ImageSource> {
    images: &'a I,
    renderer: DeckRenderer,
}

impl<'a, I: ImageSource> DeckBuilder<'a, I> {
    pub fn new(images: &'a I) -> Self {
        Self {
            images,
            renderer: DeckRenderer::new(),
        }
    }

    /// Render already-parsed slides (also used for saved completions).
    pub fn build(&self, slides: Vec<SlideRecord>, request: &DeckRequest) -> Result<DeckOutcome> {
        if slides.is_empty() {
            return Err(Error::NoSlides);
        }
        if slides.len() != request.slide_count.get() {
            log::info!(
                "Asked for {} slides, model delivered {}",
                request.slide_count.get(),
                slides.len()
            );
        }

        let mut options = RenderOptions::new(request.theme).with_include_images(request.include_images);
        if let Some(author) = &request.author {
            options = options.with_author(author.as_str());
        }
        if request.include_images {
            options = options.with_images(self.fetch_images(&slides, &request.topic));
        }

        let artifact = self.renderer.render(&slides, &options)?;
        Ok(DeckOutcome { slides, artifact })
    }

    /// Fetch one image per content slide on a small worker pool.
    /// Failed lookups are simply absent.
    fn fetch_images(&self, slides: &[SlideRecord], topic: &str) -> HashMap<usize, Vec<u8>> {
        let queries: Vec<(usize, String)> = slides
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, slide)| (index, image_query(slide, topic)))
            .collect();

        let images = self.images;
        let lookup = |(index, query): &(usize, String)| {
            images.fetch_image(query).map(|bytes| (*index, bytes))
        };

        let found: HashMap<usize, Vec<u8>> = match ThreadPoolBuilder::new()
            .num_threads(MAX_PARALLEL_FETCHES)
            .build()
        {
            Ok(pool) => pool.install(|| queries.par_iter().filter_map(lookup).collect()),
            Err(e) => {
                log::warn!("Image worker pool unavailable ({}), fetching sequentially", e);
                queries.iter().filter_map(lookup).collect()
            }
        };

        log::debug!("Fetched {} of {} images", found.len(), queries.len());
        found
    }
}

/// Runs one request at a time against the given collaborators.
pub struct Pipeline<'a, G: TextGenerator, I: ImageSource> {
    generator: &'a G,
    parser: SlideParser,
    builder: DeckBuilder<'a, I>,
    settings: GenerationSettings,
}

impl<'a, G: TextGenerator, I: ImageSource> Pipeline<'a, G, I> {
    pub fn new(generator: &'a G, images: &'a I) -> Self {
        Self {
            generator,
            parser: SlideParser::new(),
            builder: DeckBuilder::new(images),
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Run `request`, returning the session with the exchange appended.
    pub fn run(&self, session: Session, request: &DeckRequest) -> (Session, Result<DeckOutcome>) {
        let session = session.with_user(request.topic.trim());
        let result = self.generate_deck(request);
        let reply = match &result {
            Ok(outcome) => format!(
                "Generated {} slides: {}",
                outcome.artifact.slide_count, outcome.artifact.file_name
            ),
            Err(e) if e.is_recoverable() => {
                format!("{}. Try again or rephrase the topic.", e)
            }
            Err(e) => e.to_string(),
        };
        (session.with_assistant(reply), result)
    }

    fn generate_deck(&self, request: &DeckRequest) -> Result<DeckOutcome> {
        let prompt = build_prompt(&request.topic, request.slide_count, request.theme);
        let completion =
            self.generator
                .generate(&prompt, self.settings.max_tokens, self.settings.temperature)?;
        let slides = self.parser.parse(&completion);
        self.builder.build(slides, request)
    }
}

/// Search query for a slide's picture: its title, or the topic when untitled.
fn image_query(slide: &SlideRecord, topic: &str) -> String {
    let title = slide.title.trim();
    if title.is_empty() {
        topic.trim().to_string()
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::{NoImages, Role};
    use deck_pptx::{DeckReader, ShapeKind};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn png() -> Vec<u8> {
        let pixels = image::RgbImage::from_pixel(2, 2, image::Rgb([10, 120, 200]));
        let mut buffer = Cursor::new(Vec::new());
        pixels.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    struct FixedText(&'static str);

    impl TextGenerator for FixedText {
        fn generate(&self, _prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingGenerator;

    impl TextGenerator for FailingGenerator {
        fn generate(&self, _prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String> {
            Err(Error::GenerationError("connection reset".to_string()))
        }
    }

    /// Returns a PNG for every query except the ones listed, recording queries.
    struct PickyImages {
        missing: Vec<&'static str>,
        queries: Mutex<Vec<String>>,
    }

    impl ImageSource for PickyImages {
        fn fetch_image(&self, query: &str) -> Option<Vec<u8>> {
            if let Ok(mut queries) = self.queries.lock() {
                queries.push(query.to_string());
            }
            if self.missing.iter().any(|m| *m == query) {
                None
            } else {
                Some(png())
            }
        }
    }

    const COMPLETION: &str = "\
SLIDE 1:
TITLE: Volcanoes
CONTENT:
- No bullets

SLIDE 2:
TITLE: How they form
CONTENT:
- Plates move
- Magma rises

SLIDE 3:
TITLE: Famous eruptions
CONTENT:
- Vesuvius

SLIDE 4:
CONTENT:
- Untitled slide
";

    fn request(include_images: bool) -> DeckRequest {
        DeckRequest {
            topic: "volcanoes".to_string(),
            slide_count: SlideCount::clamp(5),
            theme: Theme::Bold,
            author: Some("Ada".to_string()),
            include_images,
        }
    }

    #[test]
    fn test_run_produces_deck_and_updates_session() {
        let generator = FixedText(COMPLETION);
        let pipeline = Pipeline::new(&generator, &NoImages);

        let (session, result) = pipeline.run(Session::new(), &request(false));
        let outcome = result.unwrap();

        assert_eq!(outcome.slides.len(), 4);
        assert_eq!(outcome.artifact.slide_count, 4);
        assert_eq!(outcome.artifact.file_name, "Volcanoes.pptx");

        assert_eq!(session.len(), 2);
        assert_eq!(session.turns()[0].content, "volcanoes");
        assert_eq!(session.turns()[1].role, Role::Assistant);
        assert!(session.turns()[1].content.contains("Generated 4 slides"));
    }

    #[test]
    fn test_no_markers_is_recoverable_failure() {
        let generator = FixedText("Sorry, I can't help with that.");
        let pipeline = Pipeline::new(&generator, &NoImages);

        let (session, result) = pipeline.run(Session::new(), &request(false));
        let err = result.unwrap_err();
        assert!(matches!(err, Error::NoSlides));
        assert!(err.is_recoverable());
        assert!(session.last().unwrap().content.contains("Try again"));
    }

    #[test]
    fn test_generator_error_surfaces() {
        let pipeline = Pipeline::new(&FailingGenerator, &NoImages);
        let (_, result) = pipeline.run(Session::new(), &request(false));
        assert!(matches!(result, Err(Error::GenerationError(_))));
    }

    #[test]
    fn test_failed_image_leaves_text_layout() {
        let generator = FixedText(COMPLETION);
        let images = PickyImages {
            missing: vec!["Famous eruptions"],
            queries: Mutex::new(Vec::new()),
        };
        let pipeline = Pipeline::new(&generator, &images);

        let (_, result) = pipeline.run(Session::new(), &request(true));
        let outcome = result.unwrap();
        let deck = DeckReader::new()
            .read(Cursor::new(outcome.artifact.bytes.as_slice()))
            .unwrap();

        let has_picture =
            |n: usize| deck.slides[n].shapes.iter().any(|s| s.kind == ShapeKind::Picture);
        assert!(!has_picture(0));
        assert!(has_picture(1));
        assert!(!has_picture(2));
        assert!(has_picture(3));

        let mut queries = images.queries.lock().unwrap().clone();
        queries.sort();
        assert_eq!(queries, vec!["Famous eruptions", "How they form", "volcanoes"]);
    }

    #[test]
    fn test_images_not_fetched_when_disabled() {
        let generator = FixedText(COMPLETION);
        let images = PickyImages {
            missing: Vec::new(),
            queries: Mutex::new(Vec::new()),
        };
        let pipeline = Pipeline::new(&generator, &images);

        let (_, result) = pipeline.run(Session::new(), &request(false));
        assert!(result.is_ok());
        assert!(images.queries.lock().unwrap().is_empty());
    }

    /// Tracks how many lookups run at the same time.
    #[derive(Default)]
    struct SlowImages {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl ImageSource for SlowImages {
        fn fetch_image(&self, _query: &str) -> Option<Vec<u8>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            Some(png())
        }
    }

    #[test]
    fn test_image_lookups_are_bounded() {
        let slides: Vec<SlideRecord> = (0..40)
            .map(|n| SlideRecord::new(format!("Slide {}", n)).with_bullet("point"))
            .collect();
        let images = SlowImages::default();

        let outcome = DeckBuilder::new(&images).build(slides, &request(true)).unwrap();

        assert_eq!(images.calls.load(Ordering::SeqCst), 39);
        let peak = images.peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= MAX_PARALLEL_FETCHES, "peak was {}", peak);
        assert_eq!(outcome.artifact.slide_count, 40);
    }

    #[test]
    fn test_builder_rejects_empty_slides() {
        let result = DeckBuilder::new(&NoImages).build(Vec::new(), &request(false));
        assert!(matches!(result, Err(Error::NoSlides)));
    }

    #[test]
    fn test_image_query_falls_back_to_topic() {
        assert_eq!(image_query(&SlideRecord::new("  Lava "), "volcanoes"), "Lava");
        assert_eq!(image_query(&SlideRecord::new(""), " volcanoes "), "volcanoes");
    }
}
