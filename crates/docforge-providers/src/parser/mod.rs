//! Markdown/HTML Snippet Parser (C3) — pure, deterministic extraction of
//! code blocks from a document body. No trait indirection: the spec has a
//! single parsing strategy per content type, so these are free functions.

mod html;
mod markdown;

pub use html::parse_html;
pub use markdown::parse_markdown;

use docforge_domain::entities::ContentType;
use docforge_domain::value_objects::ParsedSnippet;

/// Dispatch to the matching extraction strategy for `content_type`.
#[must_use]
pub fn parse(content: &str, content_type: ContentType, min_length: usize) -> Vec<ParsedSnippet> {
    match content_type {
        ContentType::Markdown => parse_markdown(content, min_length),
        ContentType::Html => parse_html(content, min_length),
    }
}
