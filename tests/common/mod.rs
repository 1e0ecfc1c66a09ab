/*!
 * Common test utilities for the webwright test suite
 */

use std::path::PathBuf;
use std::fs;
use anyhow::Result;
use tempfile::TempDir;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample article text file for testing
pub fn create_test_article(dir: &PathBuf, filename: &str) -> Result<PathBuf> {
    let content = r#"Coastal Walks of the North Shore

The north shore path begins at the old harbour and climbs past the
lighthouse before dropping into a string of shingle coves.

Most walkers turn back at the second cove, but the best views wait
beyond the headland, where the cliffs open onto the full sweep of
the bay.
"#;
    create_test_file(dir, filename, content)
}

/// A markup fragment with two image placeholders, as a model would return it
pub fn sample_fragment() -> &'static str {
    concat!(
        "<h1>Coastal Walks of the North Shore</h1>\n",
        "<p>The north shore path begins at the old harbour.</p>\n",
        "<img src=\"\" alt=\"a stone lighthouse above shingle coves\">\n",
        "<p>The best views wait beyond the headland.</p>\n",
        "<img src=\"\" alt=\"cliffs opening onto a wide bay\">\n"
    )
}
