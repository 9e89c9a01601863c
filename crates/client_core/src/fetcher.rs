use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::{
    domain::RequestConfig,
    error::{EndpointError, ServiceError},
    protocol::{PictureOfTheDay, RawResponse},
};
use thiserror::Error;
use tracing::{debug, error, info};

/// Failures below the application protocol. None of these reach the view.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] EndpointError),
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("response body is not json: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("response body does not match the expected shape: {0}")]
    MalformedPayload(#[source] serde_json::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(value: reqwest::Error) -> Self {
        // reqwest includes the full url in its message, and the url carries the key.
        Self::Request(value.without_url())
    }
}

/// Classification of one completed or failed request attempt.
#[derive(Debug)]
pub enum Outcome {
    Ok(PictureOfTheDay),
    ApiFailure(ServiceError),
    TransportFailure(TransportError),
}

impl Outcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ok(_) => "ok",
            Self::ApiFailure(_) => "api_failure",
            Self::TransportFailure(_) => "transport_failure",
        }
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, config: &RequestConfig) -> Outcome;
}

/// Fetcher backed by a reqwest client. No timeout and no retries: a hung
/// connection hangs the fetch.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    async fn fetch_raw(&self, config: &RequestConfig) -> Result<RawResponse, TransportError> {
        let url = config.request_url()?;
        debug!(endpoint = config.endpoint(), "issuing picture request");

        // Status is not consulted: the service pairs non-2xx statuses with a
        // failure-shaped body, and the body shape decides the outcome.
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, bytes = body.len(), "picture response received");

        let value: Value = serde_json::from_slice(&body).map_err(TransportError::Decode)?;
        RawResponse::from_value(value).map_err(TransportError::MalformedPayload)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, config: &RequestConfig) -> Outcome {
        match self.fetch_raw(config).await {
            Ok(RawResponse::Success(picture)) => {
                info!(title = %picture.title, "picture fetched");
                Outcome::Ok(picture)
            }
            Ok(RawResponse::Failure(err)) => {
                info!(code = %err.code, message = %err.message, "picture service reported failure");
                Outcome::ApiFailure(err)
            }
            Err(err) => {
                error!(error = %err, "picture request failed");
                Outcome::TransportFailure(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/fetcher_tests.rs"]
mod tests;
