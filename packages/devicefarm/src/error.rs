use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceFarmError {
    /// The vendor rejected or failed a request.
    #[error("{operation} failed: {message}")]
    Request {
        operation: &'static str,
        message: String,
    },

    /// The vendor has no such resource.
    #[error("{operation} failed: {message}")]
    NotFound {
        operation: &'static str,
        message: String,
    },

    /// The vendor answered but left out a field the caller relies on.
    #[error("{operation} response is missing `{field}`")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl DeviceFarmError {
    pub fn request(operation: &'static str, message: impl Into<String>) -> Self {
        DeviceFarmError::Request {
            operation,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DeviceFarmError::NotFound { .. })
    }

    /// The vendor's own text, without the operation prefix.
    pub fn vendor_message(&self) -> String {
        match self {
            DeviceFarmError::Request { message, .. } | DeviceFarmError::NotFound { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeviceFarmError>;
