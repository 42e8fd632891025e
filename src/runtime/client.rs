use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use http_body_util::{BodyExt, Empty};
use hyper::body::{Body, Incoming};
use hyper::client::conn::http1;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use tokio::net::UnixStream;

use super::{ContainerRuntime, Error, Result};
use crate::container::{ContainerID, ContainerRef};

/// Libpod API version prefix baked into every request path.
const API_PREFIX: &str = "/v4.0.0/libpod";

/// Thin HTTP/1 client for the Podman libpod API over a Unix-domain socket.
///
/// Every call opens its own connection; the list call and each log stream
/// never share one.
#[derive(Debug, Clone)]
pub struct PodmanClient {
    socket_path: PathBuf,
}

/// The subset of the runtime's container object the agent consumes.
#[derive(Debug, Deserialize)]
struct ContainerSummary {
    #[serde(rename = "Id", alias = "ID")]
    id: Option<String>,
    #[serde(rename = "Names", default)]
    names: Vec<String>,
}

impl PodmanClient {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    /// Issues one GET over a fresh connection and returns the raw response.
    ///
    /// The spawned task drives all I/O for the connection; it finishes when
    /// the response body is dropped or the runtime closes the stream.
    async fn get(&self, path: &str) -> Result<Response<Incoming>> {
        let stream =
            UnixStream::connect(&self.socket_path)
                .await
                .map_err(|source| Error::SocketConnect {
                    path: self.socket_path.clone(),
                    source,
                })?;

        let (mut sender, connection) = http1::handshake(TokioIo::new(stream))
            .await
            .map_err(Error::Handshake)?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                log::debug!("runtime connection closed: {err}");
            }
        });

        let request = Request::get(path)
            .header(hyper::header::HOST, "d")
            .body(Empty::<Bytes>::new())
            .expect("request URI and headers are valid");

        sender
            .send_request(request)
            .await
            .map_err(|source| Error::Request {
                path: path.to_owned(),
                source,
            })
    }
}

impl ContainerRuntime for PodmanClient {
    type LogStream = LogStream;

    async fn list_containers(&self) -> Result<Vec<ContainerRef>> {
        let path = format!("{API_PREFIX}/containers/json");
        let response = self.get(&path).await?;
        if !response.status().is_success() {
            return Err(Error::Status {
                status: response.status(),
                path,
            });
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(Error::Body)?
            .to_bytes();
        let summaries: Vec<ContainerSummary> =
            serde_json::from_slice(&body).map_err(Error::Decode)?;

        let mut out = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let Some(raw_id) = summary.id else {
                continue;
            };
            match ContainerID::new(&raw_id) {
                Ok(id) => out.push(ContainerRef::new(id, &summary.names)),
                Err(err) => log::warn!("skipping container with unusable id: {err}"),
            }
        }

        Ok(out)
    }

    async fn open_log_stream(&self, id: &ContainerID) -> Result<LogStream> {
        let path = format!(
            "{API_PREFIX}/containers/{id}/logs?stdout=1&stderr=1&follow=1&since=0&timestamps=1"
        );
        let response = self.get(&path).await?;
        if !response.status().is_success() {
            return Err(Error::Status {
                status: response.status(),
                path,
            });
        }

        Ok(LogStream {
            body: response.into_body(),
        })
    }
}

/// Byte-chunk view of a followed log response body.
///
/// Yields data frames until the runtime closes the connection; trailer
/// frames are skipped. Read failures surface as `io::Error` so the worker
/// can treat them as abnormal stream end.
#[derive(Debug)]
pub struct LogStream {
    body: Incoming,
}

impl Stream for LogStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.body).poll_frame(cx) {
                Poll::Ready(Some(Ok(frame))) => match frame.into_data() {
                    Ok(data) => return Poll::Ready(Some(Ok(data))),
                    Err(_) => continue,
                },
                Poll::Ready(Some(Err(err))) => {
                    return Poll::Ready(Some(Err(io::Error::other(err))));
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
