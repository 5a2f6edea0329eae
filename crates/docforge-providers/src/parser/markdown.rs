//! Deterministic extraction of fenced code blocks from markdown (C3).

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

use docforge_domain::value_objects::ParsedSnippet;

const CONTEXT_CHARS: usize = 300;

fn truncate_tail(text: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        text.trim().to_string()
    } else {
        chars[chars.len() - max_chars..].iter().collect::<String>().trim().to_string()
    }
}

fn truncate_head(text: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        text.trim().to_string()
    } else {
        chars[..max_chars].iter().collect::<String>().trim().to_string()
    }
}

/// Byte offset of every `\n` in `text`, in ascending order.
fn newline_offsets(text: &str) -> Vec<usize> {
    text.match_indices('\n').map(|(i, _)| i).collect()
}

/// 1-based line number containing `byte_offset`, given `text`'s newline table.
fn line_at(newline_offsets: &[usize], byte_offset: usize) -> i32 {
    let line = newline_offsets.partition_point(|&o| o < byte_offset) + 1;
    i32::try_from(line).unwrap_or(i32::MAX)
}

/// Extract fenced code blocks from `markdown` in document order, skipping
/// any block whose trimmed content is shorter than `min_length` (§4.3 edge
/// case: "blocks shorter than the configured minimum are dropped").
#[must_use]
pub fn parse_markdown(markdown: &str, min_length: usize) -> Vec<ParsedSnippet> {
    let mut snippets: Vec<ParsedSnippet> = Vec::new();
    let newlines = newline_offsets(markdown);

    let mut current_heading: Option<String> = None;
    let mut section_buf = String::new();
    let mut prose_buf = String::new();

    let mut in_heading = false;
    let mut heading_buf = String::new();

    let mut in_code_block = false;
    let mut code_buf = String::new();
    let mut code_lang: Option<String> = None;
    let mut code_range_start: Option<usize> = None;

    let mut pending_after: Option<usize> = None;
    let mut order_index = 0usize;

    for (event, range) in Parser::new(markdown).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                finish_section(&mut snippets, &current_heading, &section_buf);
                in_heading = true;
                heading_buf.clear();
            }
            Event::End(TagEnd::Heading(_)) => {
                in_heading = false;
                current_heading = Some(heading_buf.trim().to_string());
                section_buf.clear();
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code_block = true;
                code_buf.clear();
                code_range_start = Some(range.start);
                code_lang = match kind {
                    CodeBlockKind::Fenced(info) if !info.trim().is_empty() => {
                        Some(info.trim().to_string())
                    }
                    _ => None,
                };
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                let trimmed = code_buf.trim();
                if trimmed.chars().count() >= min_length {
                    let (line_start, line_end) = match code_range_start {
                        Some(start) => (
                            Some(line_at(&newlines, start)),
                            Some(line_at(&newlines, range.end.saturating_sub(1))),
                        ),
                        None => (None, None),
                    };
                    snippets.push(ParsedSnippet {
                        order_index,
                        code: trimmed.to_string(),
                        language: code_lang.take(),
                        line_start,
                        line_end,
                        context_before: non_empty(truncate_tail(&prose_buf, CONTEXT_CHARS)),
                        context_after: None,
                        section_title: current_heading.clone(),
                        section_content: None,
                    });
                    order_index += 1;
                    pending_after = Some(snippets.len() - 1);
                }
                code_range_start = None;
                prose_buf.clear();
            }
            Event::Text(text) | Event::Code(text) => {
                if in_heading {
                    heading_buf.push_str(&text);
                } else if in_code_block {
                    code_buf.push_str(&text);
                } else {
                    section_buf.push_str(&text);
                    if let Some(idx) = pending_after.take() {
                        snippets[idx].context_after = non_empty(truncate_head(&text, CONTEXT_CHARS));
                    }
                    prose_buf.push_str(&text);
                    prose_buf.push(' ');
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if !in_code_block && !in_heading {
                    section_buf.push('\n');
                    prose_buf.push('\n');
                }
            }
            _ => {}
        }
    }
    finish_section(&mut snippets, &current_heading, &section_buf);

    snippets
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Backfill `section_content` on every snippet under `heading` with the text
/// accumulated since that heading, once the section closes (next heading or
/// end of document).
fn finish_section(snippets: &mut [ParsedSnippet], heading: &Option<String>, section_buf: &str) {
    if section_buf.trim().is_empty() {
        return;
    }
    let content = section_buf.trim().to_string();
    for snippet in snippets.iter_mut().rev() {
        if &snippet.section_title == heading && snippet.section_content.is_none() {
            snippet.section_content = Some(content.clone());
        } else if snippet.section_title != *heading {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_block_with_language() {
        let md = "# Title\n\nSome intro text.\n\n```rust\nfn main() {}\n```\n\nAfter text.\n";
        let snippets = parse_markdown(md, 1);
        assert_eq!(snippets.len(), 1);
        let s = &snippets[0];
        assert_eq!(s.code, "fn main() {}");
        assert_eq!(s.language.as_deref(), Some("rust"));
        assert_eq!(s.section_title.as_deref(), Some("Title"));
        assert!(s.context_before.as_deref().unwrap().contains("intro"));
        assert!(s.context_after.as_deref().unwrap().contains("After"));
        assert_eq!(s.line_start, Some(5));
        assert_eq!(s.line_end, Some(7));
    }

    #[test]
    fn line_ranges_advance_across_multiple_blocks() {
        let md = "```python\na = 1\n```\n\n```python\nb = 2\n```\n";
        let snippets = parse_markdown(md, 1);
        assert_eq!(snippets[0].line_start, Some(1));
        assert_eq!(snippets[0].line_end, Some(3));
        assert_eq!(snippets[1].line_start, Some(5));
        assert_eq!(snippets[1].line_end, Some(7));
    }

    #[test]
    fn drops_blocks_shorter_than_minimum() {
        let md = "```\nx\n```\n";
        let snippets = parse_markdown(md, 15);
        assert!(snippets.is_empty());
    }

    #[test]
    fn preserves_document_order_across_multiple_blocks() {
        let md = "```python\na = 1\n```\n\n```python\nb = 2\n```\n";
        let snippets = parse_markdown(md, 1);
        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].order_index, 0);
        assert_eq!(snippets[1].order_index, 1);
        assert_eq!(snippets[0].code, "a = 1");
        assert_eq!(snippets[1].code, "b = 2");
    }

    #[test]
    fn untagged_fence_has_no_language() {
        let md = "```\nplain block of text here\n```\n";
        let snippets = parse_markdown(md, 1);
        assert_eq!(snippets[0].language, None);
    }
}
