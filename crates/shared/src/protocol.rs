use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ServiceError;

/// Success-shaped response body. Fields beyond these three are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PictureOfTheDay {
    pub url: String,
    pub title: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEnvelope {
    pub error: ServiceError,
}

/// A decoded response body, classified by its shape rather than by status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawResponse {
    Success(PictureOfTheDay),
    Failure(ServiceError),
}

impl RawResponse {
    /// Classifies a decoded body: any object carrying an `error` member is
    /// the failure shape, everything else must match the success shape.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let is_failure = value
            .as_object()
            .is_some_and(|object| object.contains_key("error"));

        if is_failure {
            let envelope: FailureEnvelope = serde_json::from_value(value)?;
            Ok(Self::Failure(envelope.error))
        } else {
            let picture: PictureOfTheDay = serde_json::from_value(value)?;
            Ok(Self::Success(picture))
        }
    }
}
