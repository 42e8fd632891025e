use chrono::{NaiveDate, Utc};

use super::{Error, LogRecord, LogSink, Result};

/// Writes each record as an individual document into a day-bucketed index of
/// the configured OpenSearch backend.
///
/// There is no local buffering or retry: a record that cannot be delivered is
/// reported to the caller and lost. This bounds the agent's memory under a
/// backend outage.
#[derive(Debug, Clone)]
pub struct OpenSearchSink {
    client: reqwest::Client,
    base_url: String,
    index_prefix: String,
}

impl OpenSearchSink {
    /// Creates a sink writing to the backend at `base_url` under indices named
    /// from `index_prefix`.
    ///
    /// TLS certificate verification is disabled; the deployments this agent
    /// ships against run OpenSearch with self-signed certificates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClientInit`] if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, index_prefix: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(Error::ClientInit)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            index_prefix: index_prefix.into(),
        })
    }
}

impl LogSink for OpenSearchSink {
    async fn accept(&self, record: &LogRecord) -> Result<()> {
        let index = index_name(&self.index_prefix, Utc::now().date_naive());
        let url = format!("{}/{}/_doc", self.base_url, index);

        let response = self
            .client
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(Error::Delivery)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Rejected { status, body });
        }

        Ok(())
    }
}

/// Day-bucketed index name: `<prefix>-<YYYY.MM.DD>`.
///
/// Records written on different UTC calendar days land in different indices;
/// this naming rule is the only thing that represents the bucketing.
pub fn index_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}", prefix, date.format("%Y.%m.%d"))
}
