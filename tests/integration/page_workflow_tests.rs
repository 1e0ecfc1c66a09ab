/*!
 * Integration tests for the markup-to-page workflow
 */

use anyhow::Result;

use webwright::file_utils::FileManager;
use webwright::markup::{MarkupDocument, PageTemplate};
use webwright::prompts::PromptTemplate;
use crate::common;

/// Test the full offline workflow: fenced model output in, finished page
/// with rewritten image sources out, everything on disk
#[test]
fn test_page_workflow_withFencedOutput_shouldProduceFinishedPage() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("output");

    // Model output arrives wrapped in a code fence
    let raw = format!("```html\n{}\n```", common::sample_fragment());
    let mut document = MarkupDocument::from_generated(&raw);
    assert!(!document.html().contains("```"), "Fence should be stripped");

    // Derive a slug path for each placeholder, in document order
    let descriptions = document.image_descriptions();
    assert_eq!(descriptions.len(), 2, "Should find both placeholders");

    let sources: Vec<Option<String>> = descriptions
        .iter()
        .enumerate()
        .map(|(index, description)| {
            Some(format!("images/{}", FileManager::image_filename(description, index)))
        })
        .collect();
    document.apply_image_sources(&sources)?;

    // The rewritten fragment carries both paths in order
    let html = document.html();
    let first = html.find("a-stone-lighthouse").expect("first image path");
    let second = html.find("cliffs-opening-onto").expect("second image path");
    assert!(first < second, "Sources should stay in document order");

    // Merge into the built-in page template and write both outputs
    let page = PageTemplate::default().render(document.html(), "content")?;
    FileManager::write_to_file(output_dir.join("article.html"), document.html())?;
    FileManager::write_to_file(output_dir.join("index.html"), &page)?;

    let written = FileManager::read_to_string(output_dir.join("index.html"))?;
    assert!(written.contains("<main id=\"content\">"));
    assert_eq!(written.matches("<h1>Coastal Walks").count(), 1,
        "Fragment should appear in the page exactly once");

    Ok(())
}

/// Test that a failed image leaves its placeholder untouched while the
/// others are still rewritten
#[test]
fn test_page_workflow_withFailedImage_shouldDegradeGracefully() -> Result<()> {
    let mut document = MarkupDocument::new(common::sample_fragment());

    let sources = vec![
        None,
        Some("images/cliffs-opening-onto-a-wide-bay-2.png".to_string()),
    ];
    document.apply_image_sources(&sources)?;

    let html = document.html();
    assert!(html.contains("src=\"\""), "Failed placeholder keeps its empty src");
    assert!(html.contains("images/cliffs-opening-onto-a-wide-bay-2.png"));

    Ok(())
}

/// Test that a source-count mismatch is reported instead of spliced
#[test]
fn test_page_workflow_withMismatchedSources_shouldError() {
    let mut document = MarkupDocument::new(common::sample_fragment());

    let result = document.apply_image_sources(&[Some("images/only-one-1.png".to_string())]);
    assert!(result.is_err(), "One source for two placeholders must be rejected");
    assert_eq!(document.html(), common::sample_fragment(),
        "Document should be unchanged after a rejected rewrite");
}

/// Test that the prompt fed to the provider carries the article verbatim
#[test]
fn test_prompt_withArticleFile_shouldEmbedArticleText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let article_path = common::create_test_article(&temp_dir.path().to_path_buf(), "article.txt")?;

    let article = FileManager::read_to_string(&article_path)?;
    let prompt = PromptTemplate::default().render(&article);

    assert!(prompt.contains("Coastal Walks of the North Shore"));
    assert!(prompt.contains("the full sweep of"));
    assert!(!prompt.contains("{article}"), "Placeholder should be substituted");

    Ok(())
}
