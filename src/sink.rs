mod debug;
mod error;
mod opensearch;
mod record;

pub use debug::DebugSink;
pub use error::{Error, Result};
pub use opensearch::{OpenSearchSink, index_name};
pub use record::LogRecord;

/// Destination for completed log records.
///
/// Implementations are shared across all stream workers and must be safe to
/// invoke concurrently. Failures never propagate into a worker's critical
/// path; the call site logs the error and drops the record.
pub trait LogSink {
    fn accept(&self, record: &LogRecord) -> impl std::future::Future<Output = Result<()>> + Send;
}
