mod frame;

pub use frame::LineFramer;

use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::container::ContainerRef;
use crate::runtime::ContainerRuntime;
use crate::sink::{LogRecord, LogSink};

/// Follows one container's log stream until it ends.
///
/// The worker has no retry state: if the stream fails to open, errors
/// mid-read, or reaches EOF, the function returns and the supervisor reaps
/// it. A container that is still running gets a fresh worker on the next
/// discovery cycle.
///
/// Empty lines are discarded. Every other line becomes exactly one record,
/// stamped with processing time and the worker's captured identity. Sink
/// failures are logged and drop that single record; they never terminate the
/// stream. The shutdown token is observed at each read boundary.
pub async fn follow<R, S>(
    runtime: R,
    container: ContainerRef,
    sink: Arc<S>,
    node: Arc<str>,
    shutdown: CancellationToken,
) where
    R: ContainerRuntime + Send + Sync,
    S: LogSink + Send + Sync,
{
    log::info!(
        "starting log stream for {} ({})",
        container.name,
        container.id.short()
    );

    let mut stream = match runtime.open_log_stream(&container.id).await {
        Ok(stream) => stream,
        Err(err) => {
            log::error!(
                "failed to open log stream for {} ({}): {}",
                container.name,
                container.id.short(),
                err
            );
            return;
        }
    };

    let mut framer = LineFramer::default();
    loop {
        let chunk = tokio::select! {
            () = shutdown.cancelled() => break,
            chunk = stream.next() => chunk,
        };

        match chunk {
            Some(Ok(bytes)) => {
                framer.extend(&bytes);
                while let Some(line) = framer.next_line() {
                    if line.is_empty() {
                        continue;
                    }
                    forward(&container, sink.as_ref(), &node, line).await;
                }
            }
            Some(Err(err)) => {
                log::error!(
                    "error streaming logs for {} ({}): {}",
                    container.name,
                    container.id.short(),
                    err
                );
                break;
            }
            None => {
                if let Some(line) = framer.take_remainder() {
                    forward(&container, sink.as_ref(), &node, line).await;
                }
                break;
            }
        }
    }

    log::info!(
        "log stream ended for {} ({})",
        container.name,
        container.id.short()
    );
}

async fn forward<S: LogSink>(container: &ContainerRef, sink: &S, node: &str, message: String) {
    let record = LogRecord::now(message, container, node);
    if let Err(err) = sink.accept(&record).await {
        log::error!(
            "failed to forward log line from {} ({}): {}",
            container.name,
            container.id.short(),
            err
        );
    }
}
