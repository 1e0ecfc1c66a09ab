use anyhow::{Result, Context};
use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::generation::{MarkupGenerator, ImageGenerator};
use crate::markup::{MarkupDocument, PageTemplate};
use crate::prompts::PromptTemplate;

// @module: Application controller for the article-to-page pipeline

// @const: Raw fragment output filename
const FRAGMENT_FILENAME: &str = "article.html";

// @const: Merged page output filename
const PAGE_FILENAME: &str = "index.html";

/// Main application controller for article page generation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.article_file.is_empty() && !self.config.output_dir.is_empty()
    }

    /// Run the whole pipeline: article text in, finished page out.
    ///
    /// The flow is a straight-line sequence of awaited steps; nothing runs
    /// concurrently and every external call is issued exactly once.
    pub async fn run(&self, force_overwrite: bool) -> Result<()> {
        // Start timing the process
        let start_time = std::time::Instant::now();

        let article_path = PathBuf::from(&self.config.article_file);
        if !article_path.exists() {
            return Err(anyhow::anyhow!("Article file does not exist: {:?}", article_path));
        }

        let output_dir = PathBuf::from(&self.config.output_dir);
        FileManager::ensure_dir(&output_dir)?;

        // Skip if the page already exists and no force flag
        let page_path = output_dir.join(PAGE_FILENAME);
        if page_path.exists() && !force_overwrite {
            warn!("Skipping run, page already exists (use -f to force overwrite): {}", page_path.display());
            return Ok(());
        }

        // Step 1: read the article
        let article = FileManager::read_to_string(&article_path)
            .context("Failed to read article file")?;
        debug!("Read article ({} chars) from {}", article.chars().count(), article_path.display());

        // Step 2: build the prompt
        let prompt_template = self.load_prompt_template()?;
        let prompt = prompt_template.render(&article);

        // Step 3: generate the markup document; failure here aborts the run
        info!("🚀 webwright: {} - {}",
            self.config.generation.provider.display_name(),
            self.config.generation.get_model());
        info!("Generating markup, please wait…");

        let generator = MarkupGenerator::new(self.config.generation.clone())?;
        let mut document = generator.generate(&prompt).await
            .context("Markup generation failed")?;

        // Persist the raw fragment before any image work so a later failure
        // still leaves the generated markup on disk
        let fragment_path = output_dir.join(FRAGMENT_FILENAME);
        FileManager::write_to_file(&fragment_path, document.html())?;
        debug!("Wrote raw fragment to {}", fragment_path.display());

        // Step 4: fill in the image placeholders
        if self.config.images.enabled {
            self.generate_images(&mut document, &output_dir).await?;
        } else {
            info!("Image generation disabled, leaving placeholders as-is");
        }

        // Step 5: merge into the page template and write the final page
        let template = self.load_page_template()?;
        let page = template.render(document.html(), &self.config.container_id)
            .context("Failed to merge fragment into page template")?;
        FileManager::write_to_file(&page_path, &page)?;

        info!("Success: {}", page_path.display());
        info!("Page generated in {}.", Self::format_duration(start_time.elapsed()));

        Ok(())
    }

    /// Generate images for every placeholder and splice their paths in.
    ///
    /// Per-image failures degrade the page (the placeholder keeps its empty
    /// src) and are reported at the end; only a count mismatch between
    /// descriptions and tags is a hard error.
    async fn generate_images(&self, document: &mut MarkupDocument, output_dir: &Path) -> Result<()> {
        let descriptions = document.image_descriptions();
        if descriptions.is_empty() {
            info!("No image placeholders found in the markup");
            return Ok(());
        }

        info!("🎨 Generating {} image(s) with {}", descriptions.len(), self.config.images.model);

        let progress_bar = ProgressBar::new(descriptions.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} images ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Generating images");

        let image_generator = ImageGenerator::new(
            self.config.images.clone(),
            self.config.image_api_key(),
        );

        // Sequential by design: one generation request then one download per
        // description, each awaited before the next starts
        let pb = progress_bar.clone();
        let generated = image_generator
            .generate_all(&descriptions, output_dir, move |completed, _total| {
                pb.set_position(completed as u64);
            })
            .await?;
        progress_bar.finish_and_clear();

        for (index, slot) in generated.paths.iter().enumerate() {
            if slot.is_none() {
                error!("Image {} of {} failed, its placeholder keeps an empty src",
                    index + 1, descriptions.len());
            }
        }

        let sources = generated.as_sources();

        // The explicit mismatch error from apply_image_sources cannot fire
        // here because sources came from this document's own placeholders,
        // but surface it faithfully if the document was mutated in between
        document.apply_image_sources(&sources)
            .context("Image source rewriting failed")?;

        let failed = sources.iter().filter(|s| s.is_none()).count();
        if failed > 0 {
            warn!("Page degraded: {} of {} image(s) missing", failed, sources.len());
        } else {
            info!("All {} image(s) generated and spliced", sources.len());
        }

        Ok(())
    }

    /// Load the prompt template from the configured file, or the built-in one
    fn load_prompt_template(&self) -> Result<PromptTemplate> {
        match &self.config.prompt_template_file {
            Some(path) => {
                let template = FileManager::read_to_string(path)
                    .context("Failed to read prompt template file")?;
                Ok(PromptTemplate::new(&template))
            }
            None => Ok(PromptTemplate::default()),
        }
    }

    /// Load the page template from the configured file, or the built-in one
    fn load_page_template(&self) -> Result<PageTemplate> {
        match &self.config.page_template_file {
            Some(path) => {
                let template = FileManager::read_to_string(path)
                    .context("Failed to read page template file")?;
                Ok(PageTemplate::new(template))
            }
            None => Ok(PageTemplate::default()),
        }
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::Config;
    use tempfile::tempdir;

    fn offline_config(dir: &Path) -> Config {
        let mut config = Config::default();
        config.article_file = dir.join("article.txt").to_string_lossy().to_string();
        config.output_dir = dir.join("output").to_string_lossy().to_string();
        config.images.enabled = false;
        config
    }

    #[test]
    fn test_withConfig_isInitialized() {
        let controller = Controller::new_for_test().unwrap();
        assert!(controller.is_initialized());
    }

    #[tokio::test]
    async fn test_run_withMissingArticle_returnsError() {
        let dir = tempdir().unwrap();
        let config = offline_config(dir.path());
        let controller = Controller::with_config(config).unwrap();

        let result = controller.run(false).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_withExistingPageAndNoForce_skips() {
        let dir = tempdir().unwrap();
        let config = offline_config(dir.path());
        std::fs::write(dir.path().join("article.txt"), "text").unwrap();
        std::fs::create_dir_all(dir.path().join("output")).unwrap();
        std::fs::write(dir.path().join("output").join(PAGE_FILENAME), "<html></html>").unwrap();

        let controller = Controller::with_config(config).unwrap();
        // Short-circuits before any provider call, so no network is touched
        let result = controller.run(false).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_loadPromptTemplate_withFile_usesFileContents() {
        let dir = tempdir().unwrap();
        let template_path = dir.path().join("prompt.txt");
        std::fs::write(&template_path, "Custom: {article}").unwrap();

        let mut config = offline_config(dir.path());
        config.prompt_template_file = Some(template_path.to_string_lossy().to_string());

        let controller = Controller::with_config(config).unwrap();
        let template = controller.load_prompt_template().unwrap();
        assert_eq!(template.render("X"), "Custom: X");
    }

    #[test]
    fn test_loadPageTemplate_withMissingFile_returnsError() {
        let dir = tempdir().unwrap();
        let mut config = offline_config(dir.path());
        config.page_template_file = Some(dir.path().join("nope.html").to_string_lossy().to_string());

        let controller = Controller::with_config(config).unwrap();
        assert!(controller.load_page_template().is_err());
    }

    #[test]
    fn test_formatDuration_formatsSubMinute() {
        let formatted = Controller::format_duration(std::time::Duration::from_millis(1500));
        assert_eq!(formatted, "1.500s");
    }
}
