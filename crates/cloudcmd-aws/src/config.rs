//! Region, credential and retry configuration.
//!
//! Follows the resolution order of the official SDK config layer: explicit
//! values win, then the standard environment variables. Credentials are
//! handed to the client explicitly; nothing is cached in process-global
//! state between invocations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AwsError, AwsResult};

// ── Regions ─────────────────────────────────────────────────────────────

/// Standard AWS regions.
pub const AWS_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "af-south-1",
    "ap-east-1",
    "ap-south-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ca-central-1",
    "eu-central-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-south-1",
    "eu-north-1",
    "il-central-1",
    "me-south-1",
    "me-central-1",
    "sa-east-1",
    // GovCloud
    "us-gov-east-1",
    "us-gov-west-1",
    // China
    "cn-north-1",
    "cn-northwest-1",
];

/// AWS region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AwsRegion {
    /// Region code (e.g. "eu-west-1").
    pub name: String,
}

impl AwsRegion {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Service endpoint for this region, keyed by signing name. Global
    /// services and services with non-standard hostnames are special-cased;
    /// everything else follows `https://{service}.{region}.amazonaws.com`.
    pub fn endpoint(&self, service: &str) -> String {
        match service {
            "cloudfront" => "https://cloudfront.amazonaws.com".to_string(),
            // ChimeSDKMessaging data plane
            "chime" => format!("https://messaging-chime.{}.amazonaws.com", self.name),
            _ if self.name.starts_with("cn-") => {
                format!("https://{}.{}.amazonaws.com.cn", service, self.name)
            }
            _ => format!("https://{}.{}.amazonaws.com", service, self.name),
        }
    }

    pub fn is_valid(&self) -> bool {
        AWS_REGIONS.contains(&self.name.as_str())
    }

    /// Partition (aws, aws-cn, aws-us-gov).
    pub fn partition(&self) -> &str {
        if self.name.starts_with("cn-") {
            "aws-cn"
        } else if self.name.starts_with("us-gov-") {
            "aws-us-gov"
        } else {
            "aws"
        }
    }
}

impl Default for AwsRegion {
    fn default() -> Self {
        Self {
            name: "us-east-1".to_string(),
        }
    }
}

// ── Credentials ─────────────────────────────────────────────────────────

/// Signing credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Present for temporary credentials issued by STS.
    pub session_token: Option<String>,
    pub expiration: Option<DateTime<Utc>>,
}

impl AwsCredentials {
    pub fn new(access_key_id: &str, secret_access_key: &str) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
            session_token: None,
            expiration: None,
        }
    }

    pub fn with_session_token(mut self, token: &str) -> Self {
        self.session_token = Some(token.to_string());
        self
    }

    /// Resolve from `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` /
    /// `AWS_SESSION_TOKEN`.
    pub fn from_env() -> Option<Self> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID").ok()?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY").ok()?;
        let mut credentials = Self::new(&access_key_id, &secret_access_key);
        credentials.session_token = std::env::var("AWS_SESSION_TOKEN").ok();
        Some(credentials)
    }

    pub fn is_expired(&self) -> bool {
        self.expiration.is_some_and(|at| at <= Utc::now())
    }
}

// ── Retry configuration ─────────────────────────────────────────────────

/// Settings for the client's jittered exponential backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 20_000,
        }
    }
}

// ── Connection configuration ────────────────────────────────────────────

/// Everything needed to build a client for one invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    /// Endpoint override for local stacks (LocalStack and friends).
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl ConnectionConfig {
    /// Region from explicit value or `AWS_REGION`/`AWS_DEFAULT_REGION`.
    pub fn resolve_region(&self) -> AwsRegion {
        self.region
            .clone()
            .or_else(|| std::env::var("AWS_REGION").ok())
            .or_else(|| std::env::var("AWS_DEFAULT_REGION").ok())
            .map(|name| AwsRegion::new(&name))
            .unwrap_or_default()
    }

    /// Credentials from explicit values, then the environment.
    pub fn resolve_credentials(&self) -> AwsResult<AwsCredentials> {
        if let (Some(access_key_id), Some(secret_access_key)) =
            (&self.access_key_id, &self.secret_access_key)
        {
            let mut credentials = AwsCredentials::new(access_key_id, secret_access_key);
            credentials.session_token = self.session_token.clone();
            return Ok(credentials);
        }
        AwsCredentials::from_env().ok_or_else(|| {
            AwsError::credential_error(
                "no credentials supplied; pass --access-key-id/--secret-access-key or set \
                 AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY",
            )
        })
    }

    pub fn validate(&self) -> AwsResult<()> {
        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(AwsError::credential_error(
                "access key id and secret access key must be supplied together",
            ));
        }
        if let Some(url) = &self.endpoint_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AwsError::new(
                    "config",
                    "InvalidEndpoint",
                    &format!("endpoint override '{url}' is not an http(s) URL"),
                    0,
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn regional_endpoint_pattern() {
        let region = AwsRegion::new("eu-west-2");
        assert_eq!(
            region.endpoint("osis"),
            "https://osis.eu-west-2.amazonaws.com"
        );
        assert_eq!(
            region.endpoint("chime"),
            "https://messaging-chime.eu-west-2.amazonaws.com"
        );
    }

    #[test]
    fn cloudfront_is_global() {
        let region = AwsRegion::new("ap-south-1");
        assert_eq!(region.endpoint("cloudfront"), "https://cloudfront.amazonaws.com");
    }

    #[test]
    fn china_partition_suffix() {
        let region = AwsRegion::new("cn-north-1");
        assert_eq!(
            region.endpoint("cognito-idp"),
            "https://cognito-idp.cn-north-1.amazonaws.com.cn"
        );
        assert_eq!(region.partition(), "aws-cn");
    }

    #[test]
    fn expired_credentials() {
        let mut credentials = AwsCredentials::new("AKIA...", "secret");
        assert!(!credentials.is_expired());
        credentials.expiration = Some(Utc::now() - Duration::minutes(1));
        assert!(credentials.is_expired());
    }

    #[test]
    fn explicit_credentials_win() {
        let config = ConnectionConfig {
            access_key_id: Some("AKIAEXPLICIT".into()),
            secret_access_key: Some("secret".into()),
            session_token: Some("token".into()),
            ..Default::default()
        };
        let credentials = config.resolve_credentials().unwrap();
        assert_eq!(credentials.access_key_id, "AKIAEXPLICIT");
        assert_eq!(credentials.session_token.as_deref(), Some("token"));
    }

    #[test]
    fn mismatched_key_pair_rejected() {
        let config = ConnectionConfig {
            access_key_id: Some("AKIA".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_endpoint_override_rejected() {
        let config = ConnectionConfig {
            endpoint_url: Some("localhost:4566".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
