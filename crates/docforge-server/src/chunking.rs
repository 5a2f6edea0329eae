//! Token/chunk pagination shared by `get_snippet` and `get_page_markdown`
//! (§4.9 "token/chunk policy"): a 4-chars-per-token approximation with a
//! fixed character overlap between adjacent chunks.

use docforge_domain::constants::{CHARS_PER_TOKEN, CHUNK_OVERLAP_CHARS};

pub struct Chunk {
    pub text: String,
    pub index: usize,
    pub total: usize,
}

/// Split `text` into `max_tokens`-sized chunks (approximated via
/// `CHARS_PER_TOKEN`), with `CHUNK_OVERLAP_CHARS` of overlap between
/// adjacent chunks, and return the one at `chunk_index`. `max_tokens =
/// None` returns the whole body as a single chunk.
#[must_use]
pub fn chunk_at(text: &str, max_tokens: Option<usize>, chunk_index: usize) -> Chunk {
    let Some(max_tokens) = max_tokens else {
        return Chunk {
            text: text.to_owned(),
            index: 0,
            total: 1,
        };
    };

    let max_chars = (max_tokens * CHARS_PER_TOKEN).max(1);
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return Chunk {
            text: text.to_owned(),
            index: 0,
            total: 1,
        };
    }

    let stride = max_chars.saturating_sub(CHUNK_OVERLAP_CHARS).max(1);
    let mut starts = Vec::new();
    let mut start = 0usize;
    loop {
        starts.push(start);
        if start + max_chars >= chars.len() {
            break;
        }
        start += stride;
    }

    let total = starts.len();
    let index = chunk_index.min(total - 1);
    let start = starts[index];
    let end = (start + max_chars).min(chars.len());

    Chunk {
        text: chars[start..end].iter().collect(),
        index,
        total,
    }
}

/// Plain-text excerpts around each case-insensitive match of `query`
/// within `text`, each padded with a fixed window of surrounding
/// characters (§4.9 "optional highlighted excerpts").
#[must_use]
pub fn highlight_excerpts(text: &str, query: &str, window: usize) -> Vec<String> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let lower_text = text.to_lowercase();
    let lower_query = query.to_lowercase();
    let chars: Vec<char> = text.chars().collect();
    let lower_chars: Vec<char> = lower_text.chars().collect();
    let query_chars: Vec<char> = lower_query.chars().collect();

    let mut excerpts = Vec::new();
    let mut search_from = 0usize;
    while search_from + query_chars.len() <= lower_chars.len() {
        let Some(relative) = lower_chars[search_from..].windows(query_chars.len().max(1)).position(|w| w == query_chars.as_slice()) else {
            break;
        };
        let match_start = search_from + relative;
        let start = match_start.saturating_sub(window);
        let end = (match_start + query_chars.len() + window).min(chars.len());
        excerpts.push(chars[start..end].iter().collect());
        search_from = match_start + query_chars.len();
    }
    excerpts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_max_tokens_returns_the_whole_body_as_one_chunk() {
        let chunk = chunk_at("hello world", None, 0);
        assert_eq!(chunk.total, 1);
        assert_eq!(chunk.text, "hello world");
    }

    #[test]
    fn short_text_is_a_single_chunk_even_with_a_limit() {
        let chunk = chunk_at("short", Some(100), 0);
        assert_eq!(chunk.total, 1);
    }

    #[test]
    fn long_text_splits_into_overlapping_chunks() {
        let text = "a".repeat(1000);
        let first = chunk_at(&text, Some(50), 0);
        assert!(first.total > 1);
        assert_eq!(first.index, 0);

        let last = chunk_at(&text, Some(50), first.total - 1);
        assert_eq!(last.index, first.total - 1);
    }

    #[test]
    fn chunk_index_is_clamped_to_the_last_chunk() {
        let text = "a".repeat(1000);
        let chunk = chunk_at(&text, Some(50), 9_999);
        assert_eq!(chunk.index, chunk.total - 1);
    }

    #[test]
    fn highlight_excerpts_finds_every_occurrence() {
        let text = "the quick fox jumps over the lazy fox";
        let excerpts = highlight_excerpts(text, "fox", 5);
        assert_eq!(excerpts.len(), 2);
    }

    #[test]
    fn empty_query_yields_no_highlights() {
        assert!(highlight_excerpts("anything", "", 10).is_empty());
    }
}
