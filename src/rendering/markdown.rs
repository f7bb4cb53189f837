use std::sync::OnceLock;

use pulldown_cmark::{html, Options, Parser};

fn sanitizer() -> &'static ammonia::Builder<'static> {
    static SANITIZER: OnceLock<ammonia::Builder<'static>> = OnceLock::new();
    SANITIZER.get_or_init(|| {
        let mut builder = ammonia::Builder::default();
        // task list checkboxes
        builder
            .add_tags(["input"])
            .add_tag_attributes("input", ["type", "checked", "disabled"])
            .link_rel(Some("noopener noreferrer"));
        builder
    })
}

/// Render editor-authored rich text (Markdown) to sanitized HTML.
///
/// Supports tables, footnotes, strikethrough, task lists and smart punctuation. Raw HTML
/// in the source is passed through the sanitizer, so scripts and event handlers never
/// reach the page.
pub fn render_rich_text(raw: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION;

    let parser = Parser::new_ext(raw, options);
    let mut unsafe_html = String::new();
    html::push_html(&mut unsafe_html, parser);

    sanitizer().clean(&unsafe_html).to_string()
}
