use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// Body shape shared by every JSON endpoint:
/// `{status, message, data, errors}`
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: EnvelopeStatus,
    pub message: String,
    pub data: Option<T>,
    pub errors: Option<Value>,
}

impl<T> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }

    pub fn error(message: impl Into<String>, errors: Value) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            message: message.into(),
            data: None,
            errors: Some(errors),
        }
    }
}
