//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the documentation indexer.
///
/// Variants line up with the error kinds described in the design: each one
/// carries enough context for the API layer to pick an HTTP status without
/// re-deriving it from a string.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad user input — maps to 4xx at the API boundary.
    #[error("Validation error: {message}")]
    Validation {
        /// Description of what was invalid
        message: String,
    },

    /// Missing source/document/snippet/job — maps to 404.
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Unique violation on `(name, version)` — maps to 409.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflict
        message: String,
        /// Id of the existing resource the caller collided with, if known
        existing_id: Option<String>,
    },

    /// Renderer, LLM, Git, or provider fault, surfaced after retry budget is
    /// exhausted — maps to 502.
    #[error("Upstream error ({provider}): {message}")]
    Upstream {
        /// Name of the upstream collaborator (renderer, llm, git, ...)
        provider: String,
        /// Description of the failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Pool timeout or lock contention, retried with backoff; surfaced as
    /// 503 if persistent.
    #[error("Transient error: {message}")]
    Transient {
        /// Description of the transient condition
        message: String,
    },

    /// Schema/version mismatch, disk full, etc — job is marked completed
    /// with an error, surfaced as 500.
    #[error("Fatal error: {message}")]
    Fatal {
        /// Description of the fatal condition
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Missing configuration field
    #[error("Missing configuration: {0}")]
    ConfigMissing(String),

    /// Database-related error
    #[error("Database error: {message}")]
    Database {
        /// Description of the database error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Network-related error
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal system error — a bug, or an invariant violation.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },

    /// I/O operation error
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// JSON parsing or serialization error
    #[error("JSON error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict<S: Into<String>>(message: S, existing_id: Option<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            existing_id,
        }
    }

    /// Create an upstream error
    pub fn upstream<P: Into<String>, S: Into<String>>(provider: P, message: S) -> Self {
        Self::Upstream {
            provider: provider.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create an upstream error with a source
    pub fn upstream_with_source<
        P: Into<String>,
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        provider: P,
        message: S,
        source: E,
    ) -> Self {
        Self::Upstream {
            provider: provider.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a transient error
    pub fn transient<S: Into<String>>(message: S) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    /// Create a fatal error
    pub fn fatal<S: Into<String>>(message: S) -> Self {
        Self::Fatal {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a database error
    pub fn database<S: Into<String>>(message: S) -> Self {
        Self::Database {
            message: message.into(),
            source: None,
        }
    }

    /// Create a database error with a source
    pub fn database_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Database {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The error kind name, for logging/metrics without matching on the full enum.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Upstream { .. } => "upstream",
            Self::Transient { .. } => "transient",
            Self::Fatal { .. } => "fatal",
            Self::Configuration { .. } | Self::ConfigMissing(_) => "configuration",
            Self::Database { .. } => "database",
            Self::Network { .. } => "network",
            Self::Internal { .. } => "internal",
            Self::Io { .. } => "io",
            Self::Json { .. } => "json",
        }
    }
}
