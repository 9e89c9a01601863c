use std::fmt;

use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

use crate::error::EndpointError;

pub const DEFAULT_ENDPOINT: &str = "https://api.nasa.gov/planetary/apod";
pub const DEFAULT_API_KEY: &str = "DEMO_KEY";
pub const API_KEY_PLACEHOLDER: &str = "{api_key}";
pub const API_KEY_QUERY_PARAM: &str = "api_key";

/// Endpoint template plus the access key substituted into it at request time.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestConfig {
    endpoint: String,
    api_key: String,
}

impl RequestConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Builds the request url. A `{api_key}` placeholder in the template is
    /// replaced in place, valid in both path and query; without one the key
    /// is appended as `api_key=`.
    pub fn request_url(&self) -> Result<Url, EndpointError> {
        if self.endpoint.contains(API_KEY_PLACEHOLDER) {
            let raw = self
                .endpoint
                .replace(API_KEY_PLACEHOLDER, &percent_encode_key(&self.api_key));
            return Url::parse(&raw).map_err(|source| EndpointError::Parse {
                template: self.endpoint.clone(),
                source,
            });
        }

        let mut url = Url::parse(&self.endpoint).map_err(|source| EndpointError::Parse {
            template: self.endpoint.clone(),
            source,
        })?;
        if url.cannot_be_a_base() {
            return Err(EndpointError::CannotBeABase(self.endpoint.clone()));
        }
        url.query_pairs_mut()
            .append_pair(API_KEY_QUERY_PARAM, &self.api_key);
        Ok(url)
    }
}

/// Percent-encodes a key so it reads the same in a path segment and a query.
fn percent_encode_key(key: &str) -> String {
    // form encoding escapes a literal '+' as %2B, so every remaining '+' is a space.
    form_urlencoded::byte_serialize(key.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_API_KEY)
    }
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// What the picture view should currently display.
///
/// Starts at `Loading` and moves at most once, to `Error` or `Loaded`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    Loading,
    Error {
        message: String,
    },
    Loaded {
        media_url: String,
        title: String,
        explanation: String,
    },
}

impl ViewState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Loading)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Error { .. } => "error",
            Self::Loaded { .. } => "loaded",
        }
    }
}
