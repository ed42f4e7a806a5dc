//! Tracing utilities for query and batch observability.
//!
//! Enable the `tracing` feature to emit spans and events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event with the SQL text and parameter count.
///
/// ```ignore
/// relq_trace_query!(&compiled.sql, compiled.params.len());
/// ```
#[macro_export]
macro_rules! relq_trace_query {
    ($sql:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %$sql, params = $param_count, "relq.query");
    };
}

/// Emit a debug-level tracing event for one fetched batch.
///
/// ```ignore
/// relq_trace_batch!("Post", 3, rows.len());
/// ```
#[macro_export]
macro_rules! relq_trace_batch {
    ($entity:expr, $index:expr, $rows:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(entity = %$entity, batch = $index, rows = $rows, "relq.batch");
    };
}

/// Emit a warn-level tracing event with a static message and the entity name.
///
/// ```ignore
/// relq_warn!("Post", "custom order ignored by each_batch");
/// ```
#[macro_export]
macro_rules! relq_warn {
    ($entity:expr, $message:literal) => {
        #[cfg(feature = "tracing")]
        tracing::warn!(entity = %$entity, $message);
    };
}
