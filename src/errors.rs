/*!
 * Error types for the webwright application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error downloading generated content from a returned URL
    #[error("Download failed ({status_code}) for {url}")]
    DownloadFailed {
        /// HTTP status code of the failed download
        status_code: u16,
        /// URL that was being downloaded
        url: String
    },

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors that can occur while transforming the markup document
#[derive(Error, Debug)]
pub enum MarkupError {
    /// The number of image sources does not match the number of image tags.
    ///
    /// Positional pairing of descriptions to files is only defined when the
    /// counts agree; anything else must be reported, never spliced silently.
    #[error("image count mismatch: document has {expected} <img> tag(s), got {actual} source(s)")]
    PlaceholderMismatch {
        /// Number of `<img>` tags in the document
        expected: usize,
        /// Number of sources supplied for rewriting
        actual: usize,
    },

    /// The page template has no element with the requested container id
    #[error("template has no container element with id \"{0}\"")]
    MissingContainer(String),
}

/// Errors that can occur during page generation
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error while transforming the markup document
    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),

    /// The model returned an empty markup document
    #[error("provider returned an empty markup document")]
    EmptyMarkup,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from markup processing
    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),

    /// Error from page generation
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
