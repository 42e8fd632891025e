use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_SOCKET_PATH: &str = "/run/podman/podman.sock";
const DEFAULT_OPENSEARCH_URL: &str = "http://opensearch:9200";
const DEFAULT_INDEX_PREFIX: &str = "podman-logs";
const DEFAULT_NODE_NAME: &str = "podman-node";
const DEFAULT_DISCOVERY_INTERVAL_SECONDS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid `{var}` value `{value}`: expected a whole number of seconds")]
    InvalidInterval { var: &'static str, value: String },
    #[error("invalid `{var}` value `{value}`: expected `opensearch` or `local`")]
    InvalidSinkMode { var: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Which sink variant the agent forwards records to. Chosen once at startup,
/// never switched at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkMode {
    /// Index records into the configured OpenSearch backend.
    OpenSearch,
    /// Print truncated JSON lines to stdout for local inspection.
    Local,
}

impl FromStr for SinkMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "opensearch" => Ok(SinkMode::OpenSearch),
            "local" => Ok(SinkMode::Local),
            _ => Err(Error::InvalidSinkMode {
                var: "AGENT_MODE",
                value: s.to_owned(),
            }),
        }
    }
}

/// Static agent configuration, read once from the environment at startup.
///
/// | variable | default |
/// |---|---|
/// | `PODMAN_SOCKET_PATH` | `/run/podman/podman.sock` |
/// | `OPENSEARCH_URL` | `http://opensearch:9200` |
/// | `OPENSEARCH_INDEX_PREFIX` | `podman-logs` |
/// | `NODE_NAME` | `podman-node` |
/// | `DISCOVERY_INTERVAL_SECONDS` | `10` |
/// | `AGENT_MODE` | `opensearch` |
///
/// `LOG_LEVEL` is consumed directly by the logger setup in `main` and is not
/// part of this struct.
#[derive(Debug, Clone)]
pub struct Config {
    pub socket_path: PathBuf,
    pub opensearch_url: String,
    pub index_prefix: String,
    pub node_name: String,
    pub discovery_interval: Duration,
    pub sink_mode: SinkMode,
}

impl Config {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `DISCOVERY_INTERVAL_SECONDS` is not an integer or
    /// `AGENT_MODE` names an unknown sink. Startup misconfiguration is the only
    /// fatal condition in the agent.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let socket_path = lookup("PODMAN_SOCKET_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOCKET_PATH));
        let opensearch_url =
            lookup("OPENSEARCH_URL").unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_owned());
        let index_prefix =
            lookup("OPENSEARCH_INDEX_PREFIX").unwrap_or_else(|| DEFAULT_INDEX_PREFIX.to_owned());
        let node_name = lookup("NODE_NAME").unwrap_or_else(|| DEFAULT_NODE_NAME.to_owned());

        let discovery_interval = match lookup("DISCOVERY_INTERVAL_SECONDS") {
            Some(value) => {
                let seconds = value.parse::<u64>().map_err(|_| Error::InvalidInterval {
                    var: "DISCOVERY_INTERVAL_SECONDS",
                    value,
                })?;
                Duration::from_secs(seconds)
            }
            None => Duration::from_secs(DEFAULT_DISCOVERY_INTERVAL_SECONDS),
        };

        let sink_mode = match lookup("AGENT_MODE") {
            Some(value) => value.parse()?,
            None => SinkMode::OpenSearch,
        };

        Ok(Self {
            socket_path,
            opensearch_url,
            index_prefix,
            node_name,
            discovery_interval,
            sink_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.socket_path, PathBuf::from(DEFAULT_SOCKET_PATH));
        assert_eq!(config.opensearch_url, DEFAULT_OPENSEARCH_URL);
        assert_eq!(config.index_prefix, DEFAULT_INDEX_PREFIX);
        assert_eq!(config.node_name, DEFAULT_NODE_NAME);
        assert_eq!(config.discovery_interval, Duration::from_secs(10));
        assert_eq!(config.sink_mode, SinkMode::OpenSearch);
    }

    #[test]
    fn test_explicit_values() {
        let config = Config::from_lookup(lookup(&[
            ("PODMAN_SOCKET_PATH", "/tmp/podman.sock"),
            ("OPENSEARCH_URL", "https://search.example:9200"),
            ("OPENSEARCH_INDEX_PREFIX", "edge-logs"),
            ("NODE_NAME", "edge-01"),
            ("DISCOVERY_INTERVAL_SECONDS", "3"),
            ("AGENT_MODE", "local"),
        ]))
        .unwrap();
        assert_eq!(config.socket_path, PathBuf::from("/tmp/podman.sock"));
        assert_eq!(config.opensearch_url, "https://search.example:9200");
        assert_eq!(config.index_prefix, "edge-logs");
        assert_eq!(config.node_name, "edge-01");
        assert_eq!(config.discovery_interval, Duration::from_secs(3));
        assert_eq!(config.sink_mode, SinkMode::Local);
    }

    #[test]
    fn test_invalid_interval() {
        let err = Config::from_lookup(lookup(&[("DISCOVERY_INTERVAL_SECONDS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInterval { .. }));
    }

    #[test]
    fn test_invalid_sink_mode() {
        let err = Config::from_lookup(lookup(&[("AGENT_MODE", "kafka")])).unwrap_err();
        assert!(matches!(err, Error::InvalidSinkMode { .. }));
    }

    #[test]
    fn test_sink_mode_is_case_insensitive() {
        assert_eq!("OpenSearch".parse::<SinkMode>().unwrap(), SinkMode::OpenSearch);
        assert_eq!("LOCAL".parse::<SinkMode>().unwrap(), SinkMode::Local);
    }
}
