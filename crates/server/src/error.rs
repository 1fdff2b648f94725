//! Errors raised while turning tool parameters into worker events.
//!
//! Failures inside the worker use `volta_core::Error`, which converts to
//! `McpError` on its own.

use rmcp::model::{ErrorCode, ErrorData as McpError};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Tool parameters do not describe a valid event.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A notification click arrived before any notification was shown.
    #[error("NO_NOTIFICATION: no notification is currently displayed")]
    NoNotification,

    /// The worker answered with an outcome of another event kind.
    #[error("UNEXPECTED_OUTCOME: {0}")]
    UnexpectedOutcome(String),
}

impl From<HostError> for McpError {
    fn from(err: HostError) -> Self {
        let (code, message) = match &err {
            HostError::InvalidInput(msg) => (-32602, msg.clone()),
            HostError::NoNotification => (-32010, "no notification is currently displayed".to_string()),
            HostError::UnexpectedOutcome(msg) => (-32603, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_codes() {
        let err: McpError = HostError::InvalidInput("method".into()).into();
        assert_eq!(err.code, ErrorCode(-32602));
        assert_eq!(err.message, "method");

        let err: McpError = HostError::NoNotification.into();
        assert_eq!(err.code, ErrorCode(-32010));
    }
}
