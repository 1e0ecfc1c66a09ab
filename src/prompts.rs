/*!
 * Prompt templates for article markup generation.
 *
 * The default template asks the model for a clean HTML fragment with
 * descriptive image placeholders that the pipeline can later fill in.
 */

/// Prompt template for turning an article into an HTML fragment.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default prompt for article markup generation.
    pub const ARTICLE_MARKUP: &'static str = r#"You are an expert web editor converting plain-text articles into clean HTML.

## Your Role
- Convert the article below into a semantic HTML fragment (no <html>, <head> or <body> tags)
- Use <h1> for the title, <h2> for section headings and <p> for paragraphs
- Where an illustration would help the reader, insert an <img> tag with an empty src attribute and a vivid, self-contained description of the desired picture in the alt attribute
- Use at most three <img> tags

## Output Requirements
- Return ONLY the HTML fragment
- Do not wrap the output in Markdown code fences
- Do not add commentary before or after the markup

## Article
{article}"#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default article markup template.
    pub fn article_markup() -> Self {
        Self::new(Self::ARTICLE_MARKUP)
    }

    /// Render the template with the article body substituted in.
    pub fn render(&self, article: &str) -> String {
        self.template.replace("{article}", article)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::article_markup()
    }
}
