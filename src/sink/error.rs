#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to initialize OpenSearch client: {0}")]
    ClientInit(#[source] reqwest::Error),
    #[error("failed to deliver record to OpenSearch: {0}")]
    Delivery(#[source] reqwest::Error),
    #[error("OpenSearch rejected record with status {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("failed to serialize record: {0}")]
    Serialize(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
