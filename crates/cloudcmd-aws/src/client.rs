//! Signed HTTP client shared by every service module.
//!
//! Owns the concerns the operation layer never touches: SigV4 signing,
//! transport, the retry loop, and error-envelope parsing. Three request
//! styles cover the protocols of the services in this crate: target-header
//! JSON, REST-JSON and REST-XML.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{AwsCredentials, AwsRegion, RetryConfig};
use crate::error::{AwsError, AwsResult};
use crate::signing::SigV4Signer;

/// Raw response from one service call.
#[derive(Debug, Clone)]
pub struct AwsResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub request_id: Option<String>,
}

impl AwsResponse {
    /// Decode the JSON body into a typed response.
    pub fn json<T: DeserializeOwned>(&self, service: &str) -> AwsResult<T> {
        if self.body.trim().is_empty() {
            // Void responses deserialize from an empty object.
            return serde_json::from_value(Value::Object(Default::default()))
                .map_err(|e| AwsError::parse_error(service, self.status, &e.to_string()));
        }
        serde_json::from_str(&self.body)
            .map_err(|e| AwsError::parse_error(service, self.status, &e.to_string()))
    }
}

/// SigV4-signing HTTP client bound to one set of credentials and a region.
#[derive(Debug, Clone)]
pub struct AwsClient {
    http: Client,
    credentials: AwsCredentials,
    region: AwsRegion,
    retry: RetryConfig,
    endpoint_override: Option<String>,
    user_agent: String,
}

impl AwsClient {
    pub fn new(
        credentials: AwsCredentials,
        region: AwsRegion,
        retry: RetryConfig,
        endpoint_override: Option<String>,
    ) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            credentials,
            region,
            retry,
            endpoint_override,
            user_agent: "cloudcmd/0.1 aws-client/0.1".to_string(),
        }
    }

    /// Base endpoint for a service, honoring any override.
    pub fn endpoint(&self, service: &str) -> String {
        match &self.endpoint_override {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => self.region.endpoint(service),
        }
    }

    pub fn region_name(&self) -> &str {
        &self.region.name
    }

    /// Target-header JSON request (`x-amz-json-1.1`), used by Cognito IdP.
    pub async fn json_request(
        &self,
        service: &str,
        target: &str,
        body: &Value,
    ) -> AwsResult<AwsResponse> {
        let endpoint = self.endpoint(service);
        let mut headers = base_headers(&endpoint);
        headers.insert(
            "content-type".to_string(),
            "application/x-amz-json-1.1".to_string(),
        );
        headers.insert("x-amz-target".to_string(), target.to_string());
        let payload = body.to_string();
        self.execute_with_retry(service, "POST", &endpoint, headers, &payload)
            .await
    }

    /// REST-JSON request; `path_and_query` must be percent-encoded already.
    pub async fn rest_json_request(
        &self,
        service: &str,
        method: &str,
        path_and_query: &str,
        body: Option<&Value>,
        extra_headers: BTreeMap<String, String>,
    ) -> AwsResult<AwsResponse> {
        let endpoint = self.endpoint(service);
        let url = join_url(&endpoint, path_and_query);
        let mut headers = base_headers(&endpoint);
        headers.extend(extra_headers);
        let payload = match body {
            Some(value) => {
                headers.insert("content-type".to_string(), "application/json".to_string());
                value.to_string()
            }
            None => String::new(),
        };
        self.execute_with_retry(service, method, &url, headers, &payload)
            .await
    }

    /// REST-XML request, used by CloudFront.
    pub async fn rest_xml_request(
        &self,
        service: &str,
        method: &str,
        path: &str,
        extra_headers: BTreeMap<String, String>,
        body: &str,
    ) -> AwsResult<AwsResponse> {
        let endpoint = self.endpoint(service);
        let url = join_url(&endpoint, path);
        let mut headers = base_headers(&endpoint);
        headers.extend(extra_headers);
        if !body.is_empty() {
            headers.insert("content-type".to_string(), "application/xml".to_string());
        }
        self.execute_with_retry(service, method, &url, headers, body)
            .await
    }

    /// Sign, send, and retry per the retryable classification.
    async fn execute_with_retry(
        &self,
        service: &str,
        method: &str,
        url: &str,
        headers: BTreeMap<String, String>,
        body: &str,
    ) -> AwsResult<AwsResponse> {
        let max_attempts = self.retry.max_attempts.max(1);

        let mut attempt = 0;
        loop {
            let result = self.execute_signed(service, method, url, &headers, body).await;
            let error = match result {
                Ok(response) if (200..300).contains(&response.status) => return Ok(response),
                Ok(response) => {
                    let mut error = if response.body.trim_start().starts_with('<') {
                        AwsError::parse_xml_error(service, response.status, &response.body)
                    } else {
                        AwsError::parse_json_error(service, response.status, &response.body)
                    };
                    if error.request_id.is_none() {
                        error.request_id = response.request_id.clone();
                    }
                    error
                }
                Err(error) => error,
            };

            attempt += 1;
            if !error.retryable || attempt >= max_attempts {
                return Err(error);
            }
            let delay = self.backoff_ms(attempt - 1);
            log::warn!(
                "{} {} attempt {}/{} failed with {}; retrying in {}ms",
                service,
                method,
                attempt,
                max_attempts,
                error.code,
                delay
            );
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    async fn execute_signed(
        &self,
        service: &str,
        method: &str,
        url: &str,
        headers: &BTreeMap<String, String>,
        body: &str,
    ) -> AwsResult<AwsResponse> {
        log::debug!("invoking {service} {method} {url}");

        let signer = SigV4Signer::new(&self.credentials, &self.region.name, service);
        let signed_headers = signer.sign(method, url, headers, body, Utc::now());

        let http_method: reqwest::Method = method
            .parse()
            .map_err(|_| AwsError::new(service, "InvalidMethod", method, 0))?;
        let mut request = self
            .http
            .request(http_method, url)
            .header("user-agent", &self.user_agent);
        for (name, value) in &signed_headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !body.is_empty() {
            request = request.body(body.to_string());
        }

        let response = request
            .send()
            .await
            .map_err(|e| AwsError::from_http(service, &e))?;

        let status = response.status().as_u16();
        let mut response_headers = BTreeMap::new();
        for (name, value) in response.headers() {
            if let Ok(text) = value.to_str() {
                response_headers.insert(name.as_str().to_string(), text.to_string());
            }
        }
        let request_id = response_headers
            .get("x-amzn-requestid")
            .or_else(|| response_headers.get("x-amz-request-id"))
            .cloned();
        let body = response
            .text()
            .await
            .map_err(|e| AwsError::from_http(service, &e))?;

        Ok(AwsResponse {
            status,
            headers: response_headers,
            body,
            request_id,
        })
    }

    /// Exponential backoff capped at the configured ceiling, with full
    /// jitter to spread retry storms.
    fn backoff_ms(&self, attempt: u32) -> u64 {
        let exponential = self
            .retry
            .initial_backoff_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        let capped = exponential.min(self.retry.max_backoff_ms).max(1);
        rand::thread_rng().gen_range(capped / 2..=capped)
    }
}

/// Headers present on every request. Names are inserted lowercase so the
/// canonical header ordering matches the map's sort order.
fn base_headers(endpoint: &str) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert("host".to_string(), extract_host(endpoint));
    headers
}

fn extract_host(endpoint: &str) -> String {
    url::Url::parse(endpoint)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| endpoint.to_string())
}

fn join_url(endpoint: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{endpoint}{path}")
    } else {
        format!("{endpoint}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(retry: RetryConfig, endpoint_override: Option<String>) -> AwsClient {
        AwsClient::new(
            AwsCredentials::new("AKIDEXAMPLE", "secret"),
            AwsRegion::new("us-east-1"),
            retry,
            endpoint_override,
        )
    }

    #[test]
    fn endpoint_override_wins() {
        let client = client(RetryConfig::default(), Some("http://localhost:4566/".into()));
        assert_eq!(client.endpoint("osis"), "http://localhost:4566");
        let client = client_without_override();
        assert_eq!(client.endpoint("osis"), "https://osis.us-east-1.amazonaws.com");
    }

    fn client_without_override() -> AwsClient {
        client(RetryConfig::default(), None)
    }

    #[test]
    fn backoff_grows_and_respects_ceiling() {
        let client = client(
            RetryConfig {
                max_attempts: 5,
                initial_backoff_ms: 100,
                max_backoff_ms: 400,
            },
            None,
        );
        for attempt in 0..6 {
            let delay = client.backoff_ms(attempt);
            assert!(delay >= 1);
            assert!(delay <= 400);
        }
    }

    #[test]
    fn host_extraction() {
        assert_eq!(
            extract_host("https://osis.eu-west-1.amazonaws.com"),
            "osis.eu-west-1.amazonaws.com"
        );
        assert_eq!(extract_host("http://localhost:4566"), "localhost");
    }

    #[test]
    fn join_handles_both_path_shapes() {
        assert_eq!(join_url("https://x", "/a/b"), "https://x/a/b");
        assert_eq!(join_url("https://x", "a/b"), "https://x/a/b");
    }

    #[test]
    fn empty_body_decodes_as_void() {
        let response = AwsResponse {
            status: 204,
            headers: BTreeMap::new(),
            body: String::new(),
            request_id: None,
        };
        #[derive(serde::Deserialize)]
        struct Void {}
        assert!(response.json::<Void>("cloudfront").is_ok());
    }
}
