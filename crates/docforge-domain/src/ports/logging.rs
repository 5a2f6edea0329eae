//! Operation Logger port — keeps the domain and application crates free of
//! a direct dependency on the logging crate the infrastructure layer uses.

/// Structured operation logging, implemented in infrastructure by a
/// `tracing`-backed adapter. Domain and application code call this trait
/// instead of logging macros directly, so the logging backend can change
/// without touching business logic.
pub trait OperationLogger: Send + Sync {
    /// Log the start of a named operation with structured fields.
    fn operation_started(&self, operation: &str, fields: &[(&str, &str)]);

    /// Log the successful completion of a named operation.
    fn operation_completed(&self, operation: &str, fields: &[(&str, &str)]);

    /// Log a recoverable failure of a named operation.
    fn operation_failed(&self, operation: &str, error: &str, fields: &[(&str, &str)]);

    /// Log a free-form warning not tied to one operation's lifecycle.
    fn warn(&self, message: &str, fields: &[(&str, &str)]);
}
