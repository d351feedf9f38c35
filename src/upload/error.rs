use serde_json::Value;
use thiserror::Error;

/// Every way a step of the workflow can fail.
///
/// Stored verbatim in the job once it reaches `Failed`, so the variants carry
/// rendered causes rather than source errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("{}", server_message(*status, message.as_deref()))]
    Server { status: u16, message: Option<String> },

    #[error("unexpected response: {0}")]
    Protocol(String),

    #[error("could not publish enhanced image: {0}")]
    Publish(String),

    #[error("could not save enhanced image: {0}")]
    Io(String),
}

impl WorkflowError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Builds a `Server` error from a non-success response body, picking up
    /// the `message` field when the body is JSON.
    pub fn from_response(status: u16, body: &str) -> Self {
        Self::Server {
            status,
            message: extract_message(body),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for WorkflowError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

fn server_message(status: u16, message: Option<&str>) -> String {
    match message {
        Some(message) => message.to_string(),
        None => format!("the server returned {}", status),
    }
}

// Nest-style backends send `message` as either a string or a list of strings.
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("message")? {
        Value::String(message) if !message.trim().is_empty() => Some(message.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        _ => None,
    }
}
