use env_logger::Env;

/// Entry point for the OpenSearch satellite log-collection agent.
///
/// Reads the configuration from the environment (socket path, backend URL,
/// index prefix, node identity, poll interval, sink mode), then runs the
/// discovery loop until the process is interrupted.
///
/// # Errors
///
/// Returns an error if the configuration is malformed or the sink client
/// cannot be constructed; anything after startup is logged, never fatal.
///
/// # Examples
///
/// ```bash
/// PODMAN_SOCKET_PATH=/run/podman/podman.sock AGENT_MODE=local cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::new().filter_or("LOG_LEVEL", "info")).init();
    let config = opensearch_satellite::config::Config::from_env()?;
    opensearch_satellite::run(config).await
}
