use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to connect to socket `{path}`: {source}")]
    SocketConnect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("handshake with container runtime failed: {0}")]
    Handshake(#[source] hyper::Error),
    #[error("request to `{path}` failed: {source}")]
    Request {
        path: String,
        #[source]
        source: hyper::Error,
    },
    #[error("container runtime returned status {status} for `{path}`")]
    Status {
        status: hyper::StatusCode,
        path: String,
    },
    #[error("failed to read container list response: {0}")]
    Body(#[source] hyper::Error),
    #[error("failed to decode container list: {0}")]
    Decode(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
