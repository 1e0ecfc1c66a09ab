/*!
 * Image generation and download service.
 *
 * For each placeholder description the service issues one image-generation
 * request, downloads the returned URL, and writes the bytes under a
 * deterministic slug filename. Failures degrade the page instead of
 * aborting the run.
 */

use std::path::{Path, PathBuf};
use anyhow::Result;
use log::{warn, debug};

use crate::app_config::ImageConfig;
use crate::file_utils::FileManager;
use crate::providers::openai::{OpenAI, ImageGenerationRequest};

/// Outcome of the image generation pass.
///
/// `paths` is aligned one-to-one with the input descriptions; a `None` slot
/// marks a description whose image could not be generated or downloaded.
pub struct GeneratedImages {
    /// Per-description image path, relative to the page output directory
    pub paths: Vec<Option<PathBuf>>,
}

impl GeneratedImages {
    /// Number of successfully stored images
    pub fn success_count(&self) -> usize {
        self.paths.iter().filter(|p| p.is_some()).count()
    }

    /// Number of descriptions without an image
    pub fn failure_count(&self) -> usize {
        self.paths.iter().filter(|p| p.is_none()).count()
    }

    /// Relative source strings for `MarkupDocument::apply_image_sources`
    pub fn as_sources(&self) -> Vec<Option<String>> {
        self.paths
            .iter()
            .map(|p| p.as_ref().map(|path| path.to_string_lossy().replace('\\', "/")))
            .collect()
    }
}

/// Service that turns placeholder descriptions into stored image files
pub struct ImageGenerator {
    /// Image API client
    client: OpenAI,

    /// Configuration for the image service
    pub config: ImageConfig,
}

impl ImageGenerator {
    /// Create a new image generator with the given configuration and API key
    pub fn new(config: ImageConfig, api_key: impl Into<String>) -> Self {
        Self {
            client: OpenAI::new(api_key, config.endpoint.clone()),
            config,
        }
    }

    /// Generate and store one image per description, sequentially.
    ///
    /// `output_dir` is the page output directory; images land in its
    /// configured subdirectory and the returned paths are relative to
    /// `output_dir` so they can be spliced into the page as-is. The
    /// callback receives (completed, total) after every description.
    pub async fn generate_all<F>(
        &self,
        descriptions: &[String],
        output_dir: &Path,
        mut on_progress: F,
    ) -> Result<GeneratedImages>
    where
        F: FnMut(usize, usize),
    {
        let image_dir = output_dir.join(&self.config.subdir);
        if !descriptions.is_empty() {
            FileManager::ensure_dir(&image_dir)?;
        }

        let mut paths = Vec::with_capacity(descriptions.len());
        for (index, description) in descriptions.iter().enumerate() {
            let filename = FileManager::image_filename(description, index);
            match self.generate_one(description, &image_dir.join(&filename)).await {
                Ok(()) => {
                    // Store the path relative to the output dir for the page
                    paths.push(Some(PathBuf::from(&self.config.subdir).join(&filename)));
                }
                Err(e) => {
                    warn!("Image {} (\"{}\") failed: {}", index + 1, description, e);
                    paths.push(None);
                }
            }
            on_progress(index + 1, descriptions.len());
        }

        Ok(GeneratedImages { paths })
    }

    /// Generate a single image: one API call, one download, one file write
    async fn generate_one(&self, description: &str, path: &Path) -> Result<()> {
        let request = ImageGenerationRequest::new(
            &self.config.model,
            description,
            &self.config.size,
        );

        let data = self.client.generate_image(request).await?;
        let url = data
            .url
            .ok_or_else(|| anyhow::anyhow!("image response carried no URL"))?;
        debug!("Image generated, downloading {}", url);

        let bytes = self.client.download(&url).await?;

        FileManager::write_bytes(path, &bytes)?;
        debug!("Stored {} ({} bytes)", path.display(), bytes.len());

        Ok(())
    }
}
