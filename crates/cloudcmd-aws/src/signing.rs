//! AWS Signature Version 4.
//!
//! Canonical request → string to sign → derived signing key → signature,
//! per <https://docs.aws.amazon.com/general/latest/gr/sigv4_signing.html>.
//! Paths handed to [`SigV4Signer::sign`] must already be percent-encoded;
//! the canonical form uses them as sent, so callers encode path segments
//! with [`uri_encode`] when interpolating values.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};

use crate::config::AwsCredentials;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// SHA-256 of an empty payload.
pub const EMPTY_PAYLOAD_HASH: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

// RFC 3986 unreserved characters stay literal; everything else is encoded,
// including '/' — path joining happens before encoding.
const SIGV4_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode one path segment or query component per the SigV4 rules.
pub fn uri_encode(input: &str) -> String {
    utf8_percent_encode(input, SIGV4_ENCODE_SET).to_string()
}

/// Signs requests for one (credentials, region, service) triple.
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credentials: AwsCredentials,
    region: String,
    service: String,
}

impl SigV4Signer {
    pub fn new(credentials: &AwsCredentials, region: &str, service: &str) -> Self {
        Self {
            credentials: credentials.clone(),
            region: region.to_string(),
            service: service.to_string(),
        }
    }

    /// Produce the full header set for a request: the caller's headers plus
    /// `x-amz-date`, `x-amz-content-sha256`, the session token when one is
    /// present, and `authorization`.
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        headers: &BTreeMap<String, String>,
        body: &str,
        timestamp: DateTime<Utc>,
    ) -> BTreeMap<String, String> {
        let date_stamp = timestamp.format("%Y%m%d").to_string();
        let amz_date = timestamp.format("%Y%m%dT%H%M%SZ").to_string();

        let payload_hash = sha256_hex(body.as_bytes());

        let mut signed = headers.clone();
        signed.insert("x-amz-date".to_string(), amz_date.clone());
        signed.insert("x-amz-content-sha256".to_string(), payload_hash.clone());
        if let Some(token) = &self.credentials.session_token {
            signed.insert("x-amz-security-token".to_string(), token.clone());
        }

        let (canonical_uri, canonical_query) = split_url(url);
        let canonical_headers: String = signed
            .iter()
            .map(|(name, value)| format!("{}:{}\n", name.to_lowercase(), value.trim()))
            .collect();
        let signed_header_names = signed
            .keys()
            .map(|name| name.to_lowercase())
            .collect::<Vec<_>>()
            .join(";");

        let canonical_request = format!(
            "{method}\n{canonical_uri}\n{canonical_query}\n{canonical_headers}\n{signed_header_names}\n{payload_hash}"
        );

        let scope = format!(
            "{}/{}/{}/aws4_request",
            date_stamp, self.region, self.service
        );
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            sha256_hex(canonical_request.as_bytes())
        );

        let signature = hex::encode(hmac_sha256(
            &self.signing_key(&date_stamp),
            string_to_sign.as_bytes(),
        ));

        signed.insert(
            "authorization".to_string(),
            format!(
                "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_header_names}, Signature={signature}",
                self.credentials.access_key_id
            ),
        );
        signed
    }

    /// kSigning = HMAC(HMAC(HMAC(HMAC("AWS4"+secret, date), region), service), "aws4_request")
    fn signing_key(&self, date_stamp: &str) -> Vec<u8> {
        let k_secret = format!("AWS4{}", self.credentials.secret_access_key);
        let k_date = hmac_sha256(k_secret.as_bytes(), date_stamp.as_bytes());
        let k_region = hmac_sha256(&k_date, self.region.as_bytes());
        let k_service = hmac_sha256(&k_region, self.service.as_bytes());
        hmac_sha256(&k_service, b"aws4_request")
    }
}

pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Split a URL into (canonical path, canonical query). The path is used as
/// sent (already encoded); query parameters are decoded, sorted and
/// re-encoded per the canonical rules.
fn split_url(url: &str) -> (String, String) {
    let Ok(parsed) = url::Url::parse(url) else {
        return ("/".to_string(), String::new());
    };
    let path = if parsed.path().is_empty() {
        "/".to_string()
    } else {
        parsed.path().to_string()
    };
    let mut pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    let query = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", uri_encode(k), uri_encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    (path, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn signer() -> SigV4Signer {
        let credentials =
            AwsCredentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY");
        SigV4Signer::new(&credentials, "us-east-1", "osis")
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap()
    }

    fn host_headers() -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("host".to_string(), "osis.us-east-1.amazonaws.com".to_string());
        headers
    }

    #[test]
    fn empty_payload_hash_matches_constant() {
        assert_eq!(sha256_hex(b""), EMPTY_PAYLOAD_HASH);
    }

    #[test]
    fn uri_encode_rules() {
        assert_eq!(uri_encode("abcABC123-_.~"), "abcABC123-_.~");
        assert_eq!(uri_encode("hello world"), "hello%20world");
        assert_eq!(uri_encode("arn:aws:chime:us-east-1:123:channel/x"),
            "arn%3Aaws%3Achime%3Aus-east-1%3A123%3Achannel%2Fx");
    }

    #[test]
    fn signed_headers_include_date_hash_and_authorization() {
        let headers = signer().sign(
            "POST",
            "https://osis.us-east-1.amazonaws.com/2022-01-01/osis/createPipeline",
            &host_headers(),
            "{}",
            timestamp(),
        );
        assert_eq!(headers.get("x-amz-date").map(String::as_str), Some("20150830T123600Z"));
        assert!(headers.contains_key("x-amz-content-sha256"));
        let authorization = headers.get("authorization").unwrap();
        assert!(authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/osis/aws4_request"));
        assert!(authorization.contains("SignedHeaders=host;x-amz-content-sha256;x-amz-date"));
        assert!(authorization.contains("Signature="));
    }

    #[test]
    fn session_token_is_signed_when_present() {
        let credentials = AwsCredentials::new("ASIAEXAMPLE", "secret").with_session_token("tok");
        let signer = SigV4Signer::new(&credentials, "us-east-1", "osis");
        let headers = signer.sign(
            "POST",
            "https://osis.us-east-1.amazonaws.com/",
            &host_headers(),
            "",
            timestamp(),
        );
        assert_eq!(headers.get("x-amz-security-token").map(String::as_str), Some("tok"));
        let authorization = headers.get("authorization").unwrap();
        assert!(authorization.contains("x-amz-security-token"));
    }

    #[test]
    fn signature_is_deterministic_and_key_sensitive() {
        let a = signer().sign("GET", "https://osis.us-east-1.amazonaws.com/", &host_headers(), "", timestamp());
        let b = signer().sign("GET", "https://osis.us-east-1.amazonaws.com/", &host_headers(), "", timestamp());
        assert_eq!(a.get("authorization"), b.get("authorization"));

        let other = AwsCredentials::new("AKIDEXAMPLE", "another-secret");
        let c = SigV4Signer::new(&other, "us-east-1", "osis").sign(
            "GET",
            "https://osis.us-east-1.amazonaws.com/",
            &host_headers(),
            "",
            timestamp(),
        );
        assert_ne!(a.get("authorization"), c.get("authorization"));
    }

    #[test]
    fn canonical_query_is_sorted() {
        let (path, query) = split_url("https://geo.us-east-1.amazonaws.com/scans?nextToken=abc&maxResults=5");
        assert_eq!(path, "/scans");
        assert_eq!(query, "maxResults=5&nextToken=abc");
    }
}
