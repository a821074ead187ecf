//! Invocation error taxonomy.
//!
//! Configuration errors surface before any network call is attempted. An
//! endpoint that cannot be resolved is rewrapped with a remediation message
//! while keeping the original failure as its source. Every other service
//! failure propagates to the caller unchanged; nothing is retried or
//! suppressed at this layer.

use std::error::Error as StdError;

pub type InvokeResult<T> = Result<T, InvokeError>;

/// Boxed service error, kept as the cause when rewrapping.
pub type ServiceError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    /// A parameter marked required was not supplied (or was bound to null).
    #[error("required parameter '{name}' was not supplied")]
    MissingParameter { name: String },

    /// A supplied name matched no declared parameter or alias.
    #[error("unknown parameter '{name}' for operation {operation}")]
    UnknownParameter { name: String, operation: String },

    /// A supplied value did not match the declared parameter kind.
    #[error("parameter '{name}' expects a {expected} value")]
    InvalidParameter { name: String, expected: &'static str },

    /// A select expression named neither a response field nor a parameter.
    #[error("invalid select expression '{expression}': {reason}")]
    InvalidSelect { expression: String, reason: String },

    /// The service endpoint could not be resolved or connected to.
    #[error("{message}")]
    EndpointUnreachable {
        message: String,
        #[source]
        source: ServiceError,
    },

    /// Any other failure reported by the service call.
    #[error(transparent)]
    Service(ServiceError),

    /// The selected output could not be serialized.
    #[error("failed to serialize command output: {0}")]
    Output(#[from] serde_json::Error),
}

impl InvokeError {
    /// Wrap a service failure for unchanged propagation.
    pub fn service(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Service(Box::new(err))
    }

    /// Rewrap a name-resolution failure with a remediation message.
    pub fn endpoint_unreachable(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::EndpointUnreachable {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// True for errors raised before a request is ever constructed.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter { .. }
                | Self::UnknownParameter { .. }
                | Self::InvalidParameter { .. }
                | Self::InvalidSelect { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Underlying(&'static str);

    impl fmt::Display for Underlying {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl StdError for Underlying {}

    #[test]
    fn missing_parameter_is_configuration() {
        let err = InvokeError::MissingParameter {
            name: "Site".into(),
        };
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "required parameter 'Site' was not supplied");
    }

    #[test]
    fn endpoint_unreachable_keeps_cause() {
        let err = InvokeError::endpoint_unreachable(
            "unable to reach endpoint",
            Underlying("dns lookup failed"),
        );
        assert!(!err.is_configuration());
        assert_eq!(err.to_string(), "unable to reach endpoint");
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("dns lookup failed"));
    }

    #[test]
    fn service_error_passes_through_unchanged() {
        let err = InvokeError::service(Underlying("AccessDenied"));
        assert_eq!(err.to_string(), "AccessDenied");
    }
}
