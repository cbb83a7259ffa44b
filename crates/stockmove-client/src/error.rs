//! Errors raised by stock lookup transports.
//!
//! `StockClient` degrades all of these to an empty snapshot; they exist so
//! transports and logs can tell failures apart.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockLookupError {
    /// The endpoint could not be reached or the request timed out.
    #[error("stock endpoint unavailable: {message}")]
    TransportUnavailable { message: String },

    /// The endpoint answered with a non-success HTTP status.
    #[error("stock endpoint returned status {status}")]
    HttpStatus { status: u16 },

    /// The body was not the expected JSON document.
    #[error("invalid stock response: {message}")]
    InvalidResponse { message: String },

    /// The endpoint answered `ok: false`.
    #[error("stock lookup rejected: {message}")]
    Rejected { message: String },
}

impl StockLookupError {
    /// Whether retrying the same lookup later could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TransportUnavailable { .. } => true,
            Self::HttpStatus { status } => *status >= 500 || *status == 429,
            Self::InvalidResponse { .. } | Self::Rejected { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_server_errors_are_retryable() {
        assert!(StockLookupError::TransportUnavailable {
            message: "refused".into()
        }
        .is_retryable());
        assert!(StockLookupError::HttpStatus { status: 503 }.is_retryable());
        assert!(StockLookupError::HttpStatus { status: 429 }.is_retryable());
        assert!(!StockLookupError::HttpStatus { status: 404 }.is_retryable());
        assert!(!StockLookupError::Rejected {
            message: "producto inexistente".into()
        }
        .is_retryable());
    }

    #[test]
    fn display_includes_detail() {
        let err = StockLookupError::InvalidResponse {
            message: "expected value".into(),
        };
        assert_eq!(err.to_string(), "invalid stock response: expected value");
    }
}
