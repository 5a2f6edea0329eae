//! Domain-level constants.

/// Code snippets are truncated to this many characters before being fed to
/// the Store's tsvector trigger, bounding index cost (§4.1).
pub const SEARCH_VECTOR_CODE_TRUNCATE_CHARS: usize = 5_000;

/// Default minimum fenced-block length (trimmed) to keep as a snippet (§4.3).
pub const DEFAULT_MIN_SNIPPET_LENGTH: usize = 15;

/// Default fallback threshold: below this many primary hits, the markdown
/// fallback stage also runs (§4.8, §9 open question i).
pub const DEFAULT_FALLBACK_THRESHOLD: usize = 5;

/// Default cap on how many fallback documents are expanded into snippets
/// per search (§4.8 step 2).
pub const DEFAULT_FALLBACK_DOCUMENT_CAP: usize = 10;

/// Approximate characters per token used for chunk-size accounting (§9).
pub const CHARS_PER_TOKEN: usize = 4;

/// Character overlap between adjacent chunks when paginating markdown/
/// snippet bodies (§4.9).
pub const CHUNK_OVERLAP_CHARS: usize = 200;

/// Default per-job worker concurrency when the caller doesn't specify one.
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Default crawl cancellation / stall poll interval.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Default job-stall heartbeat threshold.
pub const DEFAULT_STALL_THRESHOLD_SECS: i64 = 60;
