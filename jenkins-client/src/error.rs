//! Error types for the Jenkins client

use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Classification of a client failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required argument was missing or malformed; nothing was sent
    Validation,
    /// The server answered 404 for the addressed resource
    NotFound,
    /// The server answered with a status the operation does not accept
    Protocol,
    /// No response was received
    Transport,
    /// The response did not have the shape the operation requires
    DataShape,
    /// No usable CSRF crumb could be obtained
    Crumb,
}

/// Errors that can occur when using the Jenkins client
///
/// Every error surfaced by an operation names that operation, so the rendered message
/// reads `"job.get: test not found"`.
#[derive(Debug, Error)]
#[error("{operation}: {message}")]
pub struct ClientError {
    kind: ErrorKind,
    operation: String,
    message: String,
    status: Option<u16>,
    #[source]
    source: Option<TransportError>,
}

impl ClientError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            operation: String::new(),
            message: message.into(),
            status: None,
            source: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol, message)
    }

    pub fn data_shape(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataShape, message)
    }

    pub fn crumb(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Crumb, message)
    }

    /// Wraps a transport failure where no response was received
    pub fn transport(err: TransportError) -> Self {
        let mut error = Self::new(ErrorKind::Transport, err.to_string());
        error.source = Some(err);
        error
    }

    /// Records the HTTP status of the response that caused this error
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Names the operation this error is surfaced from
    pub fn in_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Fully qualified operation name, e.g. `job.get`
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Message without the operation prefix
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Check if this error came from a client error response (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self.status, Some(status) if (400..500).contains(&status))
    }

    /// Check if this error came from a server error response (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self.status, Some(status) if status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_operation() {
        let err = ClientError::not_found("test not found").in_operation("job.get");
        assert_eq!(err.to_string(), "job.get: test not found");
        assert_eq!(err.message(), "test not found");
        assert_eq!(err.operation(), "job.get");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_status_classification() {
        let err = ClientError::protocol("Bad Request").with_status(400);
        assert!(err.is_client_error());
        assert!(!err.is_server_error());

        let err = ClientError::protocol("Internal Server Error").with_status(500);
        assert!(err.is_server_error());
        assert!(!err.is_client_error());

        let err = ClientError::validation("name required");
        assert!(!err.is_client_error());
        assert!(!err.is_server_error());
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_transport_error_keeps_source() {
        use std::error::Error as _;

        let err = ClientError::transport(TransportError::Other("connection reset".to_string()))
            .in_operation("job.build");
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.to_string(), "job.build: connection reset");
        assert!(err.source().is_some());
    }
}
