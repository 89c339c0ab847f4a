use super::ApiError;
use log::warn;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

/// The `{ success, message, data, errors }` wrapper the league backend puts around every reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(super) struct ResponseEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Value>,
}

/// Acknowledgment of an accepted request
#[derive(Debug, Clone, PartialEq)]
pub struct Ack {
    pub message: Option<String>,
    pub data: Option<Value>,
}

/// Decides the outcome of a call from the status and raw body.
///
/// `success: false` is a rejection whatever the HTTP status says. A body that
/// is not an envelope is also a rejection, since the backend did answer.
pub(super) fn interpret(status: StatusCode, body: &str) -> Result<ResponseEnvelope, ApiError> {
    let envelope: ResponseEnvelope = match serde_json::from_str(body) {
        Ok(e) => e,
        Err(e) => {
            warn!("Unparseable response from league server ({status}): {e}");
            let body = body.trim();
            let message = if body.is_empty() {
                format!("Server responded with {status}")
            } else {
                format!("Server responded with {status}: {body}")
            };
            return Err(ApiError::RemoteRejected(message));
        }
    };

    if envelope.success {
        Ok(envelope)
    } else {
        Err(ApiError::RemoteRejected(rejection_message(status, &envelope)))
    }
}

fn rejection_message(status: StatusCode, envelope: &ResponseEnvelope) -> String {
    if let Some(ref message) = envelope.message {
        return message.clone();
    }
    match envelope.errors {
        Some(Value::String(ref s)) => s.clone(),
        Some(Value::Array(ref items)) if !items.is_empty() => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        Some(Value::Object(ref fields)) if !fields.is_empty() => fields
            .iter()
            .map(|(field, reason)| match reason {
                Value::String(s) => format!("{field}: {s}"),
                other => format!("{field}: {other}"),
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ => format!("Request rejected with status {status}"),
    }
}

impl From<ResponseEnvelope> for Ack {
    fn from(envelope: ResponseEnvelope) -> Self {
        Self {
            message: envelope.message,
            data: envelope.data,
        }
    }
}
