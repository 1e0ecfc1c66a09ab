/*!
 * Generation services for article pages.
 *
 * This module contains the two external-service fronts of the pipeline:
 *
 * - `core`: markup generation from the article prompt
 * - `images`: per-placeholder image generation and download
 */

// Re-export main types for easier usage
pub use self::core::MarkupGenerator;
pub use self::images::{ImageGenerator, GeneratedImages};

// Submodules
pub mod core;
pub mod images;
