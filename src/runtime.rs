mod client;
mod error;

pub use client::{LogStream, PodmanClient};
pub use error::{Error, Result};

use bytes::Bytes;
use futures::Stream;

use crate::container::{ContainerID, ContainerRef};

/// Point-in-time container listing plus per-container log following.
///
/// Listing is a cheap one-shot call; each log stream rides its own
/// independent connection, so a slow or stuck stream never blocks discovery
/// of other containers.
pub trait ContainerRuntime {
    type LogStream: Stream<Item = std::io::Result<Bytes>> + Send + Unpin + 'static;

    /// Lists the currently running containers.
    ///
    /// Callers treat any error as "no containers this cycle": it is logged
    /// and retried on the next poll interval, never escalated.
    fn list_containers(&self) -> impl Future<Output = Result<Vec<ContainerRef>>> + Send;

    /// Opens a live byte stream following one container's log output from the
    /// beginning of its buffered history, stdout and stderr combined.
    ///
    /// An error here means the stream never existed; the worker treats it as
    /// an immediate stream end.
    fn open_log_stream(
        &self,
        id: &ContainerID,
    ) -> impl Future<Output = Result<Self::LogStream>> + Send;
}
