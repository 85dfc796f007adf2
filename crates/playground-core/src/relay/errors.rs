use crate::errors::PlaygroundError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("No accessible frame instance")]
    FrameNotMounted,

    #[error("Instance is not available (announced: {announced}, online: {online})")]
    NotAvailable { announced: bool, online: bool },

    #[error("Instance went offline before answering")]
    InstanceOffline,

    #[error("Instance failed to process '{uuid}': {message}")]
    Remote { uuid: String, message: String },

    #[error("Relay closed")]
    Closed,
}

impl PlaygroundError for RelayError {
    fn error_code(&self) -> &'static str {
        match self {
            RelayError::FrameNotMounted => "RELAY_FRAME_NOT_MOUNTED",
            RelayError::NotAvailable { .. } => "RELAY_NOT_AVAILABLE",
            RelayError::InstanceOffline => "RELAY_INSTANCE_OFFLINE",
            RelayError::Remote { .. } => "RELAY_REMOTE_ERROR",
            RelayError::Closed => "RELAY_CLOSED",
        }
    }
}
