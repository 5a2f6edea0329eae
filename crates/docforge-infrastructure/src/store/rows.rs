//! Row types and domain conversions shared by every `PostgresStore` query.
//! Enums are stored as `TEXT` columns (checked by the migration's `CHECK`
//! constraints) rather than native Postgres enums, so adding a variant
//! never requires an `ALTER TYPE` migration.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use docforge_domain::entities::{
    CodeSnippet, ContentType, Document, FailedPage, Job, JobCounters, JobKind, JobPhase, JobStatus, RelationshipType,
    SnippetRelationship, SnippetType,
};
use docforge_domain::error::{Error, Result};
use docforge_domain::value_objects::{DocumentId, JobId, RelationshipId, SnippetId};

#[derive(FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub kind: String,
    pub name: String,
    pub version: Option<String>,
    pub status: String,
    pub phase: Option<String>,
    pub pages_processed: i64,
    pub files_processed: i64,
    pub snippets_extracted: i64,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub retry_count: i32,
    pub max_retries: i32,
    pub error_message: Option<String>,
    pub cancelled: bool,
    pub config: serde_json::Value,
}

pub fn job_kind_to_str(kind: JobKind) -> &'static str {
    kind.as_str()
}

pub fn job_kind_from_str(s: &str) -> Result<JobKind> {
    match s {
        "crawl" => Ok(JobKind::Crawl),
        "upload" => Ok(JobKind::Upload),
        other => Err(Error::internal(format!("unknown job kind {other:?} in storage"))),
    }
}

pub fn job_from_row(row: JobRow) -> Result<Job> {
    Ok(Job {
        id: JobId(row.id),
        kind: job_kind_from_str(&row.kind)?,
        name: row.name,
        version: row.version,
        status: match row.status.as_str() {
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            other => return Err(Error::internal(format!("unknown job status {other:?} in storage"))),
        },
        phase: match row.phase.as_deref() {
            Some("crawling") => Some(JobPhase::Crawling),
            Some("finalizing") => Some(JobPhase::Finalizing),
            Some(other) => return Err(Error::internal(format!("unknown job phase {other:?} in storage"))),
            None => None,
        },
        counters: JobCounters {
            pages_processed: row.pages_processed.max(0) as u64,
            files_processed: row.files_processed.max(0) as u64,
            snippets_extracted: row.snippets_extracted.max(0) as u64,
        },
        created_at: row.created_at,
        started_at: row.started_at,
        completed_at: row.completed_at,
        last_heartbeat: row.last_heartbeat,
        retry_count: row.retry_count.max(0) as u32,
        max_retries: row.max_retries.max(0) as u32,
        error_message: row.error_message,
        cancelled: row.cancelled,
        config: row.config,
    })
}

#[derive(FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub url: String,
    pub job_id: Uuid,
    pub job_kind: String,
    pub title: Option<String>,
    pub content_type: String,
    pub content_hash: String,
    pub markdown_content: String,
    pub crawl_depth: i32,
    pub parent_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn content_type_to_str(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Markdown => "markdown",
        ContentType::Html => "html",
    }
}

pub fn document_from_row(row: DocumentRow) -> Result<Document> {
    Ok(Document {
        id: DocumentId(row.id),
        url: row.url,
        job_id: JobId(row.job_id),
        job_kind: job_kind_from_str(&row.job_kind)?,
        title: row.title,
        content_type: match row.content_type.as_str() {
            "markdown" => ContentType::Markdown,
            "html" => ContentType::Html,
            other => return Err(Error::internal(format!("unknown content type {other:?} in storage"))),
        },
        content_hash: row.content_hash,
        markdown_content: row.markdown_content,
        crawl_depth: row.crawl_depth,
        parent_url: row.parent_url,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[derive(FromRow)]
pub struct SnippetRow {
    pub id: Uuid,
    pub document_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub code_content: String,
    pub code_hash: String,
    pub line_start: Option<i32>,
    pub line_end: Option<i32>,
    pub context_before: Option<String>,
    pub context_after: Option<String>,
    pub section_title: Option<String>,
    pub section_content: Option<String>,
    pub functions: serde_json::Value,
    pub imports: serde_json::Value,
    pub keywords: serde_json::Value,
    pub snippet_type: String,
    pub source_url: String,
    pub meta: serde_json::Value,
    pub enriched: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn snippet_type_to_str(snippet_type: SnippetType) -> &'static str {
    match snippet_type {
        SnippetType::Function => "function",
        SnippetType::Class => "class",
        SnippetType::Example => "example",
        SnippetType::Config => "config",
        SnippetType::Code => "code",
    }
}

fn json_string_array(value: serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items.into_iter().filter_map(|v| v.as_str().map(str::to_owned)).collect(),
        _ => Vec::new(),
    }
}

pub fn snippet_from_row(row: SnippetRow) -> Result<CodeSnippet> {
    Ok(CodeSnippet {
        id: SnippetId(row.id),
        document_id: DocumentId(row.document_id),
        title: row.title,
        description: row.description,
        language: row.language,
        code_content: row.code_content,
        code_hash: row.code_hash,
        line_start: row.line_start,
        line_end: row.line_end,
        context_before: row.context_before,
        context_after: row.context_after,
        section_title: row.section_title,
        section_content: row.section_content,
        functions: json_string_array(row.functions),
        imports: json_string_array(row.imports),
        keywords: json_string_array(row.keywords),
        snippet_type: match row.snippet_type.as_str() {
            "function" => SnippetType::Function,
            "class" => SnippetType::Class,
            "example" => SnippetType::Example,
            "config" => SnippetType::Config,
            "code" => SnippetType::Code,
            other => return Err(Error::internal(format!("unknown snippet type {other:?} in storage"))),
        },
        source_url: row.source_url,
        meta: row.meta,
        enriched: row.enriched,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[derive(FromRow)]
pub struct FailedPageRow {
    pub job_id: Uuid,
    pub url: String,
    pub error: String,
    pub occurred_at: DateTime<Utc>,
}

pub fn failed_page_from_row(row: FailedPageRow) -> FailedPage {
    FailedPage {
        job_id: JobId(row.job_id),
        url: row.url,
        error: row.error,
        occurred_at: row.occurred_at,
    }
}

#[derive(FromRow)]
pub struct RelationshipRow {
    pub id: Uuid,
    pub source_id: Uuid,
    pub target_id: Uuid,
    pub relationship_type: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub fn relationship_type_to_str(relationship_type: RelationshipType) -> &'static str {
    relationship_type.forward_name()
}

pub fn relationship_from_row(row: RelationshipRow) -> Result<SnippetRelationship> {
    Ok(SnippetRelationship {
        id: RelationshipId(row.id),
        source_id: SnippetId(row.source_id),
        target_id: SnippetId(row.target_id),
        relationship_type: match row.relationship_type.as_str() {
            "imports" => RelationshipType::Imports,
            "extends" => RelationshipType::Extends,
            "implements" => RelationshipType::Implements,
            "uses" => RelationshipType::Uses,
            "example_of" => RelationshipType::ExampleOf,
            "configuration_for" => RelationshipType::ConfigurationFor,
            "related" => RelationshipType::Related,
            other => return Err(Error::internal(format!("unknown relationship type {other:?} in storage"))),
        },
        description: row.description,
        created_at: row.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_kind_round_trips_through_storage_strings() {
        assert_eq!(job_kind_from_str(job_kind_to_str(JobKind::Crawl)).unwrap(), JobKind::Crawl);
        assert_eq!(job_kind_from_str(job_kind_to_str(JobKind::Upload)).unwrap(), JobKind::Upload);
    }

    #[test]
    fn unknown_storage_string_is_an_internal_error() {
        assert!(job_kind_from_str("bogus").is_err());
    }
}
