//! `tracing`-backed `OperationLogger` adapter. Domain and application code
//! depend only on the port; this is the only place that links `tracing`
//! directly below the binary's `main`.

use docforge_domain::ports::OperationLogger;

/// Formats `fields` as `tracing`'s structured key-value pairs via a single
/// pre-joined string, since the port's `&[(&str, &str)]` shape isn't known
/// at compile time and `tracing`'s field macros require literal field names.
fn format_fields(fields: &[(&str, &str)]) -> String {
    fields.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Default)]
pub struct TracingLogger;

impl TracingLogger {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl OperationLogger for TracingLogger {
    fn operation_started(&self, operation: &str, fields: &[(&str, &str)]) {
        tracing::info!(operation, fields = %format_fields(fields), "operation started");
    }

    fn operation_completed(&self, operation: &str, fields: &[(&str, &str)]) {
        tracing::info!(operation, fields = %format_fields(fields), "operation completed");
    }

    fn operation_failed(&self, operation: &str, error: &str, fields: &[(&str, &str)]) {
        tracing::error!(operation, error, fields = %format_fields(fields), "operation failed");
    }

    fn warn(&self, message: &str, fields: &[(&str, &str)]) {
        tracing::warn!(fields = %format_fields(fields), "{message}");
    }
}

/// Initializes the global `tracing` subscriber. Called once from the
/// `docforge` binary's `main`, never from library code.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_fields_joins_pairs_with_spaces() {
        assert_eq!(format_fields(&[("job_id", "1"), ("url", "https://ex.test")]), "job_id=1 url=https://ex.test");
        assert_eq!(format_fields(&[]), "");
    }
}
