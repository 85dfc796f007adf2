use std::fmt;

/// User-triggered operations whose failures are surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateUser,
    UpdateUser,
    DeleteUser,
    CreateSession,
    StopSession,
    ConnectSession,
    LoadTemplates,
}

impl Operation {
    /// Message shown when the operation fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::CreateUser => "Failed to create user",
            Operation::UpdateUser => "Failed to update user",
            Operation::DeleteUser => "Failed to delete user",
            Operation::CreateSession => "Failed to create a new session",
            Operation::StopSession => "Failed to stop the session",
            Operation::ConnectSession => "Failed to connect to the session",
            Operation::LoadTemplates => "Failed to load templates",
        }
    }
}

/// Failed operation, with the underlying cause for logs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationError {
    pub operation: Operation,
    pub message: String,
    pub cause: Option<String>,
}

impl OperationError {
    pub fn failed(operation: Operation, cause: impl fmt::Display) -> Self {
        Self {
            operation,
            message: operation.failure_message().to_string(),
            cause: Some(cause.to_string()),
        }
    }

    /// Refused before reaching the backend.
    pub fn refused(operation: Operation, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
            cause: None,
        }
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The dismissable notification of a panel. A new error replaces the old one.
#[derive(Clone, Debug, Default)]
pub struct Notification {
    current: Option<OperationError>,
}

impl Notification {
    pub fn set(&mut self, error: OperationError) {
        self.current = Some(error);
    }

    pub fn current(&self) -> Option<&OperationError> {
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}
