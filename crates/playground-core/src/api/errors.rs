use crate::errors::PlaygroundError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid endpoint URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Request to '{path}' failed: {message}")]
    Request { path: String, message: String },

    #[error("Request to '{path}' timed out")]
    Timeout { path: String },

    #[error("HTTP {status} from '{path}': {body}")]
    Http {
        path: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from '{path}': {message}")]
    Decode { path: String, message: String },

    #[error("Playground backend error: {message}")]
    Server { message: String },

    #[error("Not authenticated")]
    Unauthorized,
}

impl PlaygroundError for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidUrl { .. } => "API_INVALID_URL",
            ApiError::Request { .. } => "API_REQUEST_FAILED",
            ApiError::Timeout { .. } => "API_TIMEOUT",
            ApiError::Http { .. } => "API_HTTP_ERROR",
            ApiError::Decode { .. } => "API_DECODE_FAILED",
            ApiError::Server { .. } => "API_SERVER_ERROR",
            ApiError::Unauthorized => "API_UNAUTHORIZED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::InvalidUrl { .. })
    }
}
