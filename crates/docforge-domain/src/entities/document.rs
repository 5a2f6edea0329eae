//! Document entity — one page or file within a source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::job::JobKind;
use crate::value_objects::{DocumentId, JobId};

/// The original content shape a document was extracted from, which decides
/// which C3 extraction path (markdown fences vs. `<pre><code>`) applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Already-cleaned markdown (renderer output, uploaded `.md` files).
    Markdown,
    /// Raw HTML (uploaded `.html` files).
    Html,
}

/// One page or file within a Source. Owns its `CodeSnippet`s.
///
/// A document's `url` is globally unique and it belongs to exactly one job —
/// crawl xor upload, never both (invariant 2).
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Document {
    /// Opaque unique identifier.
    pub id: DocumentId,
    /// Globally unique URL (real for crawled pages, synthetic for uploads).
    pub url: String,
    /// Owning job id.
    pub job_id: JobId,
    /// Owning job's kind — mirrors the check-constraint in the relational
    /// schema that enforces crawl-xor-upload ownership.
    pub job_kind: JobKind,
    /// Page/file title, if known.
    pub title: Option<String>,
    /// Original content shape.
    pub content_type: ContentType,
    /// Hex digest over normalized content (see fingerprint module).
    pub content_hash: String,
    /// The (possibly large) markdown body used for full-text search and
    /// `get_page_markdown`.
    pub markdown_content: String,
    /// BFS depth from the crawl's start URLs; always 0 for uploads (open
    /// question ii in the design notes).
    pub crawl_depth: i32,
    /// URL of the page that linked to this one, if discovered via crawl.
    pub parent_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Construct a new document row ready for insertion. `updated_at` starts
    /// equal to `created_at`; the Store trigger maintains it afterwards.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        url: String,
        job_id: JobId,
        job_kind: JobKind,
        title: Option<String>,
        content_type: ContentType,
        content_hash: String,
        markdown_content: String,
        crawl_depth: i32,
        parent_url: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::new(),
            url,
            job_id,
            job_kind,
            title,
            content_type,
            content_hash,
            markdown_content,
            crawl_depth,
            parent_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether re-fetched content is unchanged from what's stored, per the
    /// recrawl fast path (§4.5 step 2d).
    #[must_use]
    pub fn is_unchanged(&self, new_hash: &str) -> bool {
        self.content_hash == new_hash
    }
}
