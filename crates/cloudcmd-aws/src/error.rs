//! AWS service error model.
//!
//! Every service reports failures in one of two envelope shapes (XML for the
//! Query/REST-XML protocols, JSON for the rest); this module normalizes both
//! into a single [`AwsError`] carrying the service code, HTTP status and
//! request id, plus the retryable classification the client's retry loop
//! consults. Transport failures that never reached the service are folded
//! into the same type under dedicated codes.

use std::fmt;

use serde::{Deserialize, Serialize};

use cloudcmd_core::InvokeError;

/// Error code used when the endpoint could not be resolved or connected to.
pub const ENDPOINT_UNREACHABLE: &str = "EndpointUnreachable";

/// Convenience result type for AWS calls.
pub type AwsResult<T> = Result<T, AwsError>;

/// Failure reported by (or on the way to) an AWS service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsError {
    /// Service error code (e.g. "AccessDeniedException").
    pub code: String,
    pub message: String,
    /// HTTP status, 0 when the request never got a response.
    pub status: u16,
    /// Request id from the response headers, when one was returned.
    pub request_id: Option<String>,
    /// Signing name of the service involved.
    pub service: String,
    /// Remote operation, filled in by the operation layer.
    pub operation: Option<String>,
    pub retryable: bool,
}

impl fmt::Display for AwsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operation {
            Some(operation) => write!(
                f,
                "{} {} failed [{}]: {} (HTTP {})",
                self.service, operation, self.code, self.message, self.status
            )?,
            None => write!(
                f,
                "{} error [{}]: {} (HTTP {})",
                self.service, self.code, self.message, self.status
            )?,
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " [request id: {request_id}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for AwsError {}

impl AwsError {
    pub fn new(service: &str, code: &str, message: &str, status: u16) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            status,
            request_id: None,
            service: service.to_string(),
            operation: None,
            retryable: is_retryable(code, status),
        }
    }

    /// Classify a transport-level failure that never produced a response.
    /// Connect and DNS failures become [`ENDPOINT_UNREACHABLE`] (surfaced
    /// immediately, never retried here); timeouts stay retryable.
    pub fn from_http(service: &str, err: &reqwest::Error) -> Self {
        if err.is_connect() {
            let mut out = Self::new(service, ENDPOINT_UNREACHABLE, &err.to_string(), 0);
            out.retryable = false;
            return out;
        }
        let code = if err.is_timeout() {
            "RequestTimeout"
        } else {
            "HttpError"
        };
        Self {
            code: code.to_string(),
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            request_id: None,
            service: service.to_string(),
            operation: None,
            retryable: err.is_timeout(),
        }
    }

    pub fn credential_error(message: &str) -> Self {
        Self {
            code: "CredentialError".to_string(),
            message: message.to_string(),
            status: 401,
            request_id: None,
            service: "sts".to_string(),
            operation: None,
            retryable: false,
        }
    }

    /// A response body that could not be decoded into the expected shape.
    pub fn parse_error(service: &str, status: u16, detail: &str) -> Self {
        Self::new(
            service,
            "ParseError",
            &format!("failed to decode service response: {detail}"),
            status,
        )
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    /// Lift into the invocation taxonomy. Endpoint-unreachable failures are
    /// rewrapped with a remediation message and keep `self` as the cause;
    /// everything else propagates unchanged.
    pub fn into_invoke(self, endpoint: &str) -> InvokeError {
        if self.code == ENDPOINT_UNREACHABLE {
            let message = format!(
                "unable to reach the {} service endpoint at {}; verify the region is \
                 correct, that you have network connectivity, and that any endpoint \
                 override points at a live endpoint ({})",
                self.service, endpoint, self.message
            );
            InvokeError::endpoint_unreachable(message, self)
        } else {
            InvokeError::service(self)
        }
    }

    /// Parse an XML error envelope:
    ///
    /// ```xml
    /// <ErrorResponse>
    ///   <Error><Code>AccessDenied</Code><Message>...</Message></Error>
    ///   <RequestId>abc-123</RequestId>
    /// </ErrorResponse>
    /// ```
    pub fn parse_xml_error(service: &str, status: u16, body: &str) -> Self {
        let code = extract_xml_tag(body, "Code").unwrap_or_else(|| "UnknownError".to_string());
        let message = extract_xml_tag(body, "Message")
            .unwrap_or_else(|| format!("HTTP {status} from {service}"));
        let mut err = Self::new(service, &code, &message, status);
        err.request_id =
            extract_xml_tag(body, "RequestId").or_else(|| extract_xml_tag(body, "RequestID"));
        err
    }

    /// Parse a JSON error envelope. The code may arrive as `__type`
    /// (possibly namespaced, e.g. `com.amazonaws.x#ThrottlingException`),
    /// `code` or `Code`.
    pub fn parse_json_error(service: &str, status: u16, body: &str) -> Self {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
            let preview = &body[..body.len().min(200)];
            return Self::parse_error(service, status, preview);
        };
        let code = value
            .get("__type")
            .or_else(|| value.get("code"))
            .or_else(|| value.get("Code"))
            .and_then(|v| v.as_str())
            .map(|s| s.rsplit('#').next().unwrap_or(s).to_string())
            .unwrap_or_else(|| "UnknownError".to_string());
        let message = value
            .get("message")
            .or_else(|| value.get("Message"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
            .to_string();
        Self::new(service, &code, &message, status)
    }
}

/// Retry classification per the SDK retry policy: throttling and transient
/// server-side conditions retry, everything else surfaces.
fn is_retryable(code: &str, status: u16) -> bool {
    if matches!(status, 429 | 502 | 503 | 504) {
        return true;
    }
    matches!(
        code,
        "Throttling"
            | "ThrottlingException"
            | "TooManyRequestsException"
            | "RequestLimitExceeded"
            | "LimitExceededException"
            | "SlowDown"
            | "InternalError"
            | "InternalFailure"
            | "ServiceUnavailable"
            | "RequestTimeout"
            | "RequestTimeoutException"
    )
}

/// Lightweight tag extractor; error envelopes are flat enough that a full
/// XML parse buys nothing.
fn extract_xml_tag(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open)? + open.len();
    let end = xml[start..].find(&close)?;
    Some(xml[start..start + end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_includes_code_and_status() {
        let err = AwsError::new("osis", "ValidationException", "bad pipeline name", 400)
            .with_operation("CreatePipeline")
            .with_request_id("req-1".into());
        let s = err.to_string();
        assert!(s.contains("osis CreatePipeline failed"));
        assert!(s.contains("ValidationException"));
        assert!(s.contains("HTTP 400"));
        assert!(s.contains("req-1"));
    }

    #[test]
    fn parse_xml_error_envelope() {
        let xml = "<ErrorResponse><Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error><RequestId>xyz-789</RequestId></ErrorResponse>";
        let err = AwsError::parse_xml_error("cloudfront", 403, xml);
        assert_eq!(err.code, "AccessDenied");
        assert_eq!(err.message, "Access Denied");
        assert_eq!(err.request_id.as_deref(), Some("xyz-789"));
        assert!(!err.retryable);
    }

    #[test]
    fn parse_json_error_strips_namespace() {
        let body = r#"{"__type":"com.amazonaws.codegurusecurity#ThrottlingException","message":"Rate exceeded"}"#;
        let err = AwsError::parse_json_error("codeguru-security", 429, body);
        assert_eq!(err.code, "ThrottlingException");
        assert!(err.retryable);
    }

    #[test]
    fn unparsable_body_becomes_parse_error() {
        let err = AwsError::parse_json_error("osis", 500, "<html>gateway error</html>");
        assert_eq!(err.code, "ParseError");
        assert!(err.message.contains("gateway error"));
    }

    #[test]
    fn throttling_retries_access_denied_does_not() {
        assert!(AwsError::new("chime", "ThrottlingException", "slow down", 400).retryable);
        assert!(AwsError::new("chime", "AnyCode", "bad gateway", 502).retryable);
        assert!(!AwsError::new("chime", "AccessDeniedException", "no", 403).retryable);
    }

    #[test]
    fn endpoint_unreachable_rewraps_with_cause() {
        let mut err = AwsError::new(
            "iotroborunner",
            ENDPOINT_UNREACHABLE,
            "dns error: failed to lookup address",
            0,
        );
        err.retryable = false;
        let invoke = err.into_invoke("https://iotroborunner.us-east-1.amazonaws.com");
        let message = invoke.to_string();
        assert!(message.contains("unable to reach the iotroborunner service endpoint"));
        assert!(message.contains("https://iotroborunner.us-east-1.amazonaws.com"));
        let cause = invoke.source().map(|s| s.to_string());
        assert!(cause.is_some_and(|c| c.contains("dns error")));
    }

    #[test]
    fn other_service_errors_pass_through_unchanged() {
        let err = AwsError::new("cognito-idp", "UserPoolNotFound", "no such pool", 404);
        let display = err.to_string();
        let invoke = err.into_invoke("https://cognito-idp.us-east-1.amazonaws.com");
        assert_eq!(invoke.to_string(), display);
        assert!(!invoke.is_configuration());
    }

    #[test]
    fn serde_roundtrip() {
        let err = AwsError::new("appsync", "ApiLimitExceeded", "too many apis", 400)
            .with_operation("CreateGraphqlApi");
        let json = serde_json::to_string(&err).unwrap();
        let back: AwsError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, "ApiLimitExceeded");
        assert_eq!(back.operation.as_deref(), Some("CreateGraphqlApi"));
    }
}
