use tokio_util::sync::CancellationToken;

use config::{Config, SinkMode};
use runtime::PodmanClient;
use sink::{DebugSink, LogSink, OpenSearchSink};
use supervisor::Supervisor;

/// OpenSearch satellite: a single-host log-collection agent for Podman.
///
/// The agent discovers running containers over the Podman socket, follows
/// each container's log stream with one worker, and forwards structured
/// records to either an OpenSearch backend or stdout.
pub mod config;
pub mod container;
pub mod error;
pub mod runtime;
pub mod sink;
pub mod supervisor;
pub mod worker;

/// Runs the satellite until an interrupt is received.
///
/// Constructs the runtime client and the configured sink once, hands both to
/// the discovery supervisor, and loops. The sink choice is made here, at
/// startup, by dispatching into a supervisor monomorphized for the variant.
///
/// # Errors
///
/// Returns an error only if the OpenSearch client cannot be constructed.
/// Everything past startup is recovered locally and logged.
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("starting OpenSearch satellite");
    log::info!("mode: {:?}", config.sink_mode);
    log::info!("podman socket: {}", config.socket_path.display());

    let client = PodmanClient::new(config.socket_path.clone());
    let shutdown = CancellationToken::new();

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("interrupt received, shutting down");
                shutdown.cancel();
            }
        });
    }

    match config.sink_mode {
        SinkMode::OpenSearch => {
            let sink =
                OpenSearchSink::new(config.opensearch_url.clone(), config.index_prefix.clone())?;
            log::info!("OpenSearch mode enabled, URL={}", config.opensearch_url);
            supervise(client, sink, &config, shutdown).await;
        }
        SinkMode::Local => supervise(client, DebugSink, &config, shutdown).await,
    }

    Ok(())
}

async fn supervise<S>(client: PodmanClient, sink: S, config: &Config, shutdown: CancellationToken)
where
    S: LogSink + Send + Sync + 'static,
{
    Supervisor::new(
        client,
        sink,
        config.node_name.as_str(),
        config.discovery_interval,
        shutdown,
    )
    .run()
    .await
}
