//! # cloudcmd-aws – SigV4 service client and typed command operations
//!
//! The service collaborator behind every `cloudcmd` command: credential and
//! region configuration, AWS Signature V4 signing, a retrying HTTP client,
//! and one module per service with typed request/response structures and
//! [`ServiceOperation`](cloudcmd_core::ServiceOperation) implementations.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  per-service modules                             │
//! │  messaging · location · osis · cognito           │
//! │  codeguru · appsync · cloudfront · roborunner    │
//! │  └── typed requests/responses + operations       │
//! ├──────────────────────────────────────────────────┤
//! │  AwsClient  (client.rs)                          │
//! │  ├── json_request      (x-amz-target style)      │
//! │  ├── rest_json_request (Chime, OSIS, AppSync, …) │
//! │  └── rest_xml_request  (CloudFront)              │
//! ├──────────────────────────────────────────────────┤
//! │  SigV4Signer  (signing.rs)                       │
//! │  └── hmac-sha256 / canonical request / signing   │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Connection setup, credential resolution, request signing, retries and
//! (de)serialization all live here; the adapter layer above issues exactly
//! one logical call per invocation and never reimplements any of it.

pub mod client;
pub mod config;
pub mod error;
pub mod signing;

// Service operations
pub mod appsync;
pub mod cloudfront;
pub mod codeguru;
pub mod cognito;
pub mod location;
pub mod messaging;
pub mod osis;
pub mod roborunner;

pub use client::{AwsClient, AwsResponse};
pub use config::{AwsCredentials, AwsRegion, ConnectionConfig, RetryConfig};
pub use error::{AwsError, AwsResult};
