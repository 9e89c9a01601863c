use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;
use thiserror::Error;

/// Error code reported by the picture service. Observed as both strings
/// (`"OVER_RATE_LIMIT"`) and numbers (`400`); any JSON number is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Text(String),
    Number(Number),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(code) => f.write_str(code),
            Self::Number(code) => write!(f, "{code}"),
        }
    }
}

/// Failure descriptor embedded in a failure-shaped response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    pub code: ErrorCode,
    pub message: String,
}

impl ServiceError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("endpoint template '{template}' is not an absolute url: {source}")]
    Parse {
        template: String,
        source: url::ParseError,
    },
    #[error("endpoint '{0}' cannot carry query parameters")]
    CannotBeABase(String),
}
