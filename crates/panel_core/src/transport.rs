use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

use shared::{
    domain::{CsrfToken, DoorId},
    protocol,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("invalid server url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request never produced an HTTP response (connection refused, DNS
    /// failure, timeout, torn connection).
    #[error("buzzer request failed: {reason}")]
    Network { reason: String },

    /// The server answered, but with something other than 200. The panel
    /// treats every such status the same way.
    #[error("buzzer request returned status {status}")]
    Status { status: u16 },
}

/// Single-request seam between the controller and the intercom server.
///
/// Implementations issue exactly one request per call and must resolve
/// exactly once; the controller never retries, queues, or cancels. `Ok`
/// carries the verbatim body of a strictly-200 response.
#[async_trait]
pub trait BuzzerTransport: Send + Sync {
    async fn buzz(&self, door: &DoorId, csrf: &CsrfToken) -> Result<String, TransportError>;
}

pub struct HttpTransport {
    http: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, TransportError> {
        let raw = base_url.as_ref();
        let parsed = Url::parse(raw).map_err(|err| TransportError::InvalidUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(TransportError::InvalidUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            http: Client::new(),
            base_url: parsed,
        })
    }

    fn buzzer_url(&self, door: &DoorId) -> Result<Url, TransportError> {
        let mut url =
            self.base_url
                .join(protocol::BUZZER_PATH)
                .map_err(|err| TransportError::InvalidUrl {
                    url: self.base_url.to_string(),
                    reason: err.to_string(),
                })?;
        url.query_pairs_mut()
            .append_pair(protocol::DOOR_QUERY_PARAM, door.as_str());
        Ok(url)
    }
}

#[async_trait]
impl BuzzerTransport for HttpTransport {
    async fn buzz(&self, door: &DoorId, csrf: &CsrfToken) -> Result<String, TransportError> {
        let url = self.buzzer_url(door)?;

        // Empty body on purpose; the door rides in the query string and the
        // token in the header.
        let response = self
            .http
            .put(url)
            .header(protocol::CSRF_HEADER, csrf.as_str())
            .send()
            .await
            .map_err(|err| TransportError::Network {
                reason: err.to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|err| TransportError::Network {
            reason: err.to_string(),
        })
    }
}
