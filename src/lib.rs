/*!
 * # webwright - AI article-to-web-page generator
 *
 * A Rust library for turning plain-text articles into finished HTML pages
 * using AI.
 *
 * ## Features
 *
 * - Convert an article text file into an HTML fragment via AI providers:
 *   - Ollama (local LLM)
 *   - OpenAI API
 *   - Anthropic API
 * - Generate an illustration for every image placeholder the model leaves
 *   in the markup, download it, and splice the local path into the page
 * - Merge the fragment into a page template
 * - Configurable prompts, templates and output locations
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `markup`: Markup document handling and transformation
 * - `prompts`: Prompt templates for markup generation
 * - `generation`: AI-powered generation services:
 *   - `generation::core`: Markup generation from the article prompt
 *   - `generation::images`: Image generation and download
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `providers`: Client implementations for the external APIs:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::openai`: OpenAI API client (text and images)
 *   - `providers::anthropic`: Anthropic API client
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod markup;
pub mod prompts;
pub mod generation;
pub mod app_controller;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use markup::{MarkupDocument, PageTemplate};
pub use prompts::PromptTemplate;
pub use generation::{MarkupGenerator, ImageGenerator};
pub use errors::{AppError, ProviderError, MarkupError, GenerationError};
