use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::container::ContainerID;
use crate::error::ResultOkLogExt;
use crate::runtime::ContainerRuntime;
use crate::sink::LogSink;
use crate::worker;

/// Bookkeeping for one spawned stream worker.
struct WorkerHandle {
    name: String,
    task: JoinHandle<()>,
}

/// The discovery control loop.
///
/// Polls the runtime on a fixed interval, starts a stream worker for every
/// newly seen container id, and reaps workers whose task has ended. The
/// worker set is touched only from this loop, so no locking is involved;
/// the sink is the one collaborator the workers share.
pub struct Supervisor<R, S> {
    runtime: R,
    sink: Arc<S>,
    node: Arc<str>,
    interval: Duration,
    shutdown: CancellationToken,
    workers: HashMap<ContainerID, WorkerHandle>,
}

impl<R, S> Supervisor<R, S>
where
    R: ContainerRuntime + Clone + Send + Sync + 'static,
    S: LogSink + Send + Sync + 'static,
{
    pub fn new(
        runtime: R,
        sink: S,
        node: impl Into<Arc<str>>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            runtime,
            sink: Arc::new(sink),
            node: node.into(),
            interval,
            shutdown,
            workers: HashMap::new(),
        }
    }

    /// Number of containers currently holding a live worker entry.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// One discovery cycle: list containers, start workers for new ids,
    /// sweep ended ones.
    ///
    /// A listing failure is logged and treated as an empty container list;
    /// the cycle still completes and the next interval retries.
    pub async fn poll_once(&mut self) {
        let containers = self
            .runtime
            .list_containers()
            .await
            .ok_log_msg("error listing containers via runtime API")
            .unwrap_or_default();
        log::debug!("discovered {} running containers", containers.len());

        for container in containers {
            if self.workers.contains_key(&container.id) {
                continue;
            }
            log::info!(
                "starting log collector for container {} ({})",
                container.name,
                container.id.short()
            );
            let id = container.id.clone();
            let name = container.name.clone();
            let task = tokio::spawn(worker::follow(
                self.runtime.clone(),
                container,
                Arc::clone(&self.sink),
                Arc::clone(&self.node),
                self.shutdown.child_token(),
            ));
            self.workers.insert(id, WorkerHandle { name, task });
        }

        self.sweep();
    }

    /// Removes bookkeeping for workers whose task has finished. This is the
    /// only place ids leave the set; an id whose container is still running
    /// is re-detected and restarted on the following cycle.
    fn sweep(&mut self) {
        self.workers.retain(|id, handle| {
            if handle.task.is_finished() {
                log::info!(
                    "cleaning up ended log stream for {} ({})",
                    handle.name,
                    id.short()
                );
                false
            } else {
                true
            }
        });
    }

    /// Runs discovery cycles until the shutdown token fires.
    pub async fn run(mut self) {
        let shutdown = self.shutdown.clone();
        let mut interval = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = interval.tick() => self.poll_once().await,
            }
        }
        log::info!("discovery loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;
    use std::sync::Mutex;

    use bytes::Bytes;
    use futures::StreamExt;
    use futures::stream::{self, BoxStream};

    use crate::container::ContainerRef;
    use crate::runtime::{self, Error as RuntimeError};
    use crate::sink::{LogRecord, Result as SinkResult};

    /// Scripted poll results; an exhausted script simulates listing failure.
    #[derive(Clone)]
    struct MockRuntime {
        polls: Arc<Mutex<VecDeque<Option<Vec<ContainerRef>>>>>,
        /// When set, opened streams end immediately instead of staying open.
        close_streams: bool,
    }

    impl MockRuntime {
        fn scripted(polls: Vec<Option<Vec<ContainerRef>>>) -> Self {
            Self {
                polls: Arc::new(Mutex::new(polls.into())),
                close_streams: false,
            }
        }
    }

    impl ContainerRuntime for MockRuntime {
        type LogStream = BoxStream<'static, io::Result<Bytes>>;

        async fn list_containers(&self) -> runtime::Result<Vec<ContainerRef>> {
            match self.polls.lock().unwrap().pop_front() {
                Some(Some(containers)) => Ok(containers),
                Some(None) | None => Err(RuntimeError::SocketConnect {
                    path: "/nonexistent/podman.sock".into(),
                    source: io::Error::other("simulated transport failure"),
                }),
            }
        }

        async fn open_log_stream(&self, _id: &ContainerID) -> runtime::Result<Self::LogStream> {
            if self.close_streams {
                Ok(stream::empty().boxed())
            } else {
                Ok(stream::pending().boxed())
            }
        }
    }

    struct NullSink;

    impl LogSink for NullSink {
        async fn accept(&self, _record: &LogRecord) -> SinkResult<()> {
            Ok(())
        }
    }

    fn container(id: &str, name: &str) -> ContainerRef {
        ContainerRef::new(ContainerID::new(id).unwrap(), &[name.to_owned()])
    }

    fn supervisor(runtime: MockRuntime) -> Supervisor<MockRuntime, NullSink> {
        Supervisor::new(
            runtime,
            NullSink,
            "node-1",
            Duration::from_millis(10),
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn test_unchanged_id_never_gets_a_second_worker() {
        let runtime = MockRuntime::scripted(vec![
            Some(vec![container("abc123", "/web")]),
            Some(vec![container("abc123", "/web")]),
        ]);
        let mut sup = supervisor(runtime);

        sup.poll_once().await;
        assert_eq!(sup.worker_count(), 1);
        sup.poll_once().await;
        assert_eq!(sup.worker_count(), 1);
    }

    #[tokio::test]
    async fn test_each_new_container_gets_exactly_one_worker() {
        let runtime = MockRuntime::scripted(vec![
            Some(vec![container("abc123", "/web")]),
            Some(vec![container("abc123", "/web"), container("def456", "/db")]),
        ]);
        let mut sup = supervisor(runtime);

        sup.poll_once().await;
        assert_eq!(sup.worker_count(), 1);
        sup.poll_once().await;
        assert_eq!(sup.worker_count(), 2);
    }

    #[tokio::test]
    async fn test_list_failure_is_an_empty_cycle() {
        let runtime = MockRuntime::scripted(vec![
            Some(vec![container("abc123", "/web")]),
            None,
        ]);
        let mut sup = supervisor(runtime);

        sup.poll_once().await;
        assert_eq!(sup.worker_count(), 1);
        // Listing fails; the cycle completes and existing workers are kept.
        sup.poll_once().await;
        assert_eq!(sup.worker_count(), 1);
    }

    #[tokio::test]
    async fn test_ended_worker_is_swept_then_restarted_next_cycle() {
        let mut runtime = MockRuntime::scripted(vec![
            Some(vec![container("abc123", "/web")]),
            Some(vec![container("abc123", "/web")]),
            Some(vec![container("abc123", "/web")]),
        ]);
        runtime.close_streams = true;
        let mut sup = supervisor(runtime);

        sup.poll_once().await;
        assert_eq!(sup.worker_count(), 1);

        // Let the worker run to completion on its closed stream.
        let id = ContainerID::new("abc123").unwrap();
        (&mut sup.workers.get_mut(&id).unwrap().task).await.unwrap();

        // The id is still listed, so it is not restarted in the same cycle
        // its ended worker is swept.
        sup.poll_once().await;
        assert_eq!(sup.worker_count(), 0);

        // The following cycle observes the id without a worker and starts a
        // fresh one.
        sup.poll_once().await;
        assert_eq!(sup.worker_count(), 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let runtime = MockRuntime::scripted(vec![Some(Vec::new())]);
        let shutdown = CancellationToken::new();
        let sup = Supervisor::new(
            runtime,
            NullSink,
            "node-1",
            Duration::from_millis(5),
            shutdown.clone(),
        );

        let handle = tokio::spawn(sup.run());
        tokio::task::yield_now().await;
        shutdown.cancel();
        handle.await.unwrap();
    }
}
