//! CloudFront streaming distribution teardown.
//!
//! REST-XML protocol against the global endpoint. Deletion is guarded by an
//! `If-Match` precondition carrying the ETag from the latest GET of the
//! distribution's configuration.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use cloudcmd_core::{
    BoundContext, ConfirmImpact, InvokeResult, OperationDescriptor, ParamKind, ParamSpec,
    ServiceOperation,
};

use crate::client::AwsClient;
use crate::error::AwsResult;
use crate::signing::uri_encode;

const SERVICE: &str = "cloudfront";
const API_VERSION: &str = "2020-05-31";

// ── Types ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct DeleteStreamingDistributionRequest {
    pub id: String,
    /// ETag precondition; the service rejects the delete when it is stale.
    pub if_match: Option<String>,
}

/// Void response; serializes to null so the default selection emits nothing.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DeleteStreamingDistributionResponse;

// ── Client ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CloudFrontClient {
    client: AwsClient,
}

impl CloudFrontClient {
    pub fn new(client: AwsClient) -> Self {
        Self { client }
    }

    pub fn endpoint(&self) -> String {
        self.client.endpoint(SERVICE)
    }

    pub async fn delete_streaming_distribution(
        &self,
        request: &DeleteStreamingDistributionRequest,
    ) -> AwsResult<()> {
        let path = format!(
            "/{API_VERSION}/streaming-distribution/{}",
            uri_encode(&request.id)
        );
        let mut headers = BTreeMap::new();
        if let Some(etag) = &request.if_match {
            headers.insert("if-match".to_string(), etag.clone());
        }
        self.client
            .rest_xml_request(SERVICE, "DELETE", &path, headers, "")
            .await?;
        Ok(())
    }
}

// ── Operation ───────────────────────────────────────────────────────────

pub static DELETE_STREAMING_DISTRIBUTION: OperationDescriptor = OperationDescriptor {
    service: SERVICE,
    operation: "DeleteStreamingDistribution",
    parameters: &[
        ParamSpec::new("Id", ParamKind::String).required().positional(0),
        ParamSpec::new("IfMatch", ParamKind::String),
    ],
    response_fields: &[],
    default_select: None,
    confirm_impact: ConfirmImpact::High,
};

pub struct DeleteStreamingDistribution;

#[async_trait]
impl ServiceOperation for DeleteStreamingDistribution {
    type Client = CloudFrontClient;
    type Request = DeleteStreamingDistributionRequest;
    type Response = DeleteStreamingDistributionResponse;

    fn descriptor(&self) -> &'static OperationDescriptor {
        &DELETE_STREAMING_DISTRIBUTION
    }

    fn build_request(
        &self,
        ctx: &BoundContext,
    ) -> InvokeResult<DeleteStreamingDistributionRequest> {
        Ok(DeleteStreamingDistributionRequest {
            id: ctx.require_string("Id")?,
            if_match: ctx.string("IfMatch")?,
        })
    }

    async fn call(
        &self,
        client: &CloudFrontClient,
        request: DeleteStreamingDistributionRequest,
    ) -> InvokeResult<DeleteStreamingDistributionResponse> {
        client
            .delete_streaming_distribution(&request)
            .await
            .map_err(|e| {
                e.with_operation("DeleteStreamingDistribution")
                    .into_invoke(&client.endpoint())
            })?;
        Ok(DeleteStreamingDistributionResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcmd_core::ContextBuilder;
    use serde_json::json;

    #[test]
    fn id_is_required_if_match_is_not() {
        let mut builder = ContextBuilder::new();
        builder.bind("Id", json!("EDFDVBD6EXAMPLE"));
        let ctx = builder.freeze();
        assert!(DELETE_STREAMING_DISTRIBUTION.validate_required(&ctx).is_ok());
        let request = DeleteStreamingDistribution.build_request(&ctx).unwrap();
        assert_eq!(request.id, "EDFDVBD6EXAMPLE");
        assert!(request.if_match.is_none());

        let empty = ContextBuilder::new().freeze();
        assert!(DELETE_STREAMING_DISTRIBUTION.validate_required(&empty).is_err());
    }

    #[test]
    fn delete_is_high_impact() {
        assert_eq!(
            DELETE_STREAMING_DISTRIBUTION.confirm_impact,
            ConfirmImpact::High
        );
    }

    #[test]
    fn void_response_serializes_to_null() {
        let value = serde_json::to_value(DeleteStreamingDistributionResponse).unwrap();
        assert!(value.is_null());
    }
}
