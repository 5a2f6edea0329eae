//! Deterministic extraction of `<pre><code>` blocks from raw HTML (C3).

use scraper::{ElementRef, Html, Selector};

use docforge_domain::value_objects::ParsedSnippet;

const CONTEXT_CHARS: usize = 300;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid css")
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

fn truncate_tail(text: &str, max_chars: usize) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= max_chars {
        Some(trimmed.to_string())
    } else {
        Some(chars[chars.len() - max_chars..].iter().collect())
    }
}

fn truncate_head(text: &str, max_chars: usize) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= max_chars {
        Some(trimmed.to_string())
    } else {
        Some(chars[..max_chars].iter().collect())
    }
}

/// Nearest text-bearing sibling before `element` within the same parent,
/// skipping other `<pre>` blocks so two adjacent snippets don't borrow each
/// other's context.
fn preceding_text(element: ElementRef<'_>) -> Option<String> {
    element
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sib| sib.value().name() != "pre")
        .map(element_text)
        .filter(|s| !s.is_empty())
}

fn following_text(element: ElementRef<'_>) -> Option<String> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sib| sib.value().name() != "pre")
        .map(element_text)
        .filter(|s| !s.is_empty())
}

/// Nearest preceding heading anywhere earlier in the document, found by
/// comparing `ego_tree` node ids, which `scraper`/`html5ever` assign in
/// parse (i.e. document) order.
fn nearest_preceding_heading(document: &Html, code_element: ElementRef<'_>) -> Option<String> {
    let heading_selector = selector("h1, h2, h3, h4, h5, h6");
    document
        .select(&heading_selector)
        .filter(|h| h.id() < code_element.id())
        .next_back()
        .map(element_text)
}

/// Extract `<pre><code>` blocks from `html` in document order.
#[must_use]
pub fn parse_html(html: &str, min_length: usize) -> Vec<ParsedSnippet> {
    let document = Html::parse_document(html);
    let code_selector = selector("pre code, pre");

    let mut seen_parents = std::collections::HashSet::new();
    let mut snippets = Vec::new();
    let mut order_index = 0usize;

    for code_element in document.select(&code_selector) {
        // `pre code` and the bare `pre` both match; keep only one per <pre>.
        let pre = if code_element.value().name() == "pre" {
            code_element
        } else {
            match code_element
                .parent()
                .and_then(ElementRef::wrap)
                .filter(|p| p.value().name() == "pre")
            {
                Some(p) => p,
                None => continue,
            }
        };
        if !seen_parents.insert(pre.id()) {
            continue;
        }

        let code = element_text(code_element);
        if code.chars().count() < min_length {
            continue;
        }

        let language = code_element
            .value()
            .attr("class")
            .and_then(|classes| {
                classes
                    .split_whitespace()
                    .find_map(|c| c.strip_prefix("language-").or_else(|| c.strip_prefix("lang-")))
            })
            .map(str::to_string);

        let section_title = nearest_preceding_heading(&document, pre);
        let context_before = preceding_text(pre).and_then(|t| truncate_tail(&t, CONTEXT_CHARS));
        let context_after = following_text(pre).and_then(|t| truncate_head(&t, CONTEXT_CHARS));

        snippets.push(ParsedSnippet {
            order_index,
            code,
            language,
            line_start: None,
            line_end: None,
            context_before,
            context_after,
            section_title,
            section_content: None,
        });
        order_index += 1;
    }

    snippets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_pre_code_with_language_class() {
        let html = r#"<html><body><h2>Usage</h2><p>Install it.</p>
            <pre><code class="language-python">print("hi")</code></pre>
            <p>Done.</p></body></html>"#;
        let snippets = parse_html(html, 1);
        assert_eq!(snippets.len(), 1);
        let s = &snippets[0];
        assert_eq!(s.code, "print(\"hi\")");
        assert_eq!(s.language.as_deref(), Some("python"));
        assert_eq!(s.section_title.as_deref(), Some("Usage"));
        assert!(s.context_before.as_deref().unwrap().contains("Install"));
        assert!(s.context_after.as_deref().unwrap().contains("Done"));
    }

    #[test]
    fn drops_short_blocks() {
        let html = "<pre><code>x</code></pre>";
        assert!(parse_html(html, 15).is_empty());
    }

    #[test]
    fn two_adjacent_blocks_do_not_share_context() {
        let html = "<pre><code>first block here</code></pre><pre><code>second block here</code></pre>";
        let snippets = parse_html(html, 1);
        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].context_after, None);
        assert_eq!(snippets[1].context_before, None);
    }
}
