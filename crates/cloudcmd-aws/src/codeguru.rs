//! CodeGuru Security scan listings.
//!
//! REST-JSON protocol; the list call is a GET with its inputs in the query
//! string. Pagination tokens pass through unchanged — callers chain
//! `nextToken` themselves.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cloudcmd_core::{
    BoundContext, ConfirmImpact, InvokeResult, OperationDescriptor, ParamKind, ParamSpec,
    ServiceOperation,
};

use crate::client::AwsClient;
use crate::error::AwsResult;
use crate::signing::uri_encode;

const SERVICE: &str = "codeguru-security";

// ── Types ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListScansRequest {
    pub max_results: Option<i32>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    #[serde(rename = "scanName", skip_serializing_if = "Option::is_none")]
    pub scan_name: Option<String>,
    #[serde(rename = "runId", skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(rename = "scanState", skip_serializing_if = "Option::is_none")]
    pub scan_state: Option<String>,
    #[serde(rename = "scanNameArn", skip_serializing_if = "Option::is_none")]
    pub scan_name_arn: Option<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<f64>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListScansResponse {
    #[serde(rename = "summaries", default)]
    pub summaries: Vec<ScanSummary>,
    #[serde(rename = "nextToken", skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

// ── Client ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CodeGuruClient {
    client: AwsClient,
}

impl CodeGuruClient {
    pub fn new(client: AwsClient) -> Self {
        Self { client }
    }

    pub fn endpoint(&self) -> String {
        self.client.endpoint(SERVICE)
    }

    pub async fn list_scans(&self, request: &ListScansRequest) -> AwsResult<ListScansResponse> {
        let mut query = Vec::new();
        if let Some(max) = request.max_results {
            query.push(format!("maxResults={max}"));
        }
        if let Some(token) = &request.next_token {
            query.push(format!("nextToken={}", uri_encode(token)));
        }
        let path = if query.is_empty() {
            "/scans".to_string()
        } else {
            format!("/scans?{}", query.join("&"))
        };
        let response = self
            .client
            .rest_json_request(SERVICE, "GET", &path, None, BTreeMap::new())
            .await?;
        response.json(SERVICE)
    }
}

// ── Operation ───────────────────────────────────────────────────────────

pub static LIST_SCANS: OperationDescriptor = OperationDescriptor {
    service: SERVICE,
    operation: "ListScans",
    parameters: &[
        ParamSpec::new("MaxResult", ParamKind::Integer).aliased(&["MaxResults"]),
        ParamSpec::new("NextToken", ParamKind::String),
    ],
    response_fields: &["summaries", "nextToken"],
    default_select: Some("summaries"),
    confirm_impact: ConfirmImpact::None,
};

pub struct ListScans;

#[async_trait]
impl ServiceOperation for ListScans {
    type Client = CodeGuruClient;
    type Request = ListScansRequest;
    type Response = ListScansResponse;

    fn descriptor(&self) -> &'static OperationDescriptor {
        &LIST_SCANS
    }

    fn build_request(&self, ctx: &BoundContext) -> InvokeResult<ListScansRequest> {
        Ok(ListScansRequest {
            max_results: ctx.integer("MaxResult")?,
            next_token: ctx.string("NextToken")?,
        })
    }

    async fn call(
        &self,
        client: &CodeGuruClient,
        request: ListScansRequest,
    ) -> InvokeResult<ListScansResponse> {
        client
            .list_scans(&request)
            .await
            .map_err(|e| e.with_operation("ListScans").into_invoke(&client.endpoint()))
    }
}
