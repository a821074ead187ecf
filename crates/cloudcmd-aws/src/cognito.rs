//! Cognito user pool lookups.
//!
//! JSON 1.1 protocol with an `x-amz-target` header
//! (`AWSCognitoIdentityProviderService.*`).

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cloudcmd_core::{
    BoundContext, ConfirmImpact, InvokeResult, OperationDescriptor, ParamKind, ParamSpec,
    ServiceOperation,
};

use crate::client::AwsClient;
use crate::error::AwsResult;

const SERVICE: &str = "cognito-idp";
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

// ── Types ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct DescribeUserPoolRequest {
    #[serde(rename = "UserPoolId")]
    pub user_pool_id: String,
}

/// User pool description; the service returns many more fields than this
/// tool interprets, so the remainder rides along untyped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPoolType {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Arn", skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "CreationDate", skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<f64>,
    #[serde(rename = "LastModifiedDate", skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<f64>,
    #[serde(flatten)]
    pub additional: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribeUserPoolResponse {
    #[serde(rename = "UserPool", skip_serializing_if = "Option::is_none")]
    pub user_pool: Option<UserPoolType>,
}

// ── Client ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CognitoClient {
    client: AwsClient,
}

impl CognitoClient {
    pub fn new(client: AwsClient) -> Self {
        Self { client }
    }

    pub fn endpoint(&self) -> String {
        self.client.endpoint(SERVICE)
    }

    pub async fn describe_user_pool(
        &self,
        request: &DescribeUserPoolRequest,
    ) -> AwsResult<DescribeUserPoolResponse> {
        let body = serde_json::to_value(request)
            .map_err(|e| crate::error::AwsError::parse_error(SERVICE, 0, &e.to_string()))?;
        let response = self
            .client
            .json_request(SERVICE, &format!("{TARGET_PREFIX}.DescribeUserPool"), &body)
            .await?;
        response.json(SERVICE)
    }
}

// ── Operation ───────────────────────────────────────────────────────────

pub static DESCRIBE_USER_POOL: OperationDescriptor = OperationDescriptor {
    service: SERVICE,
    operation: "DescribeUserPool",
    parameters: &[ParamSpec::new("UserPoolId", ParamKind::String).required().positional(0)],
    response_fields: &["UserPool"],
    default_select: Some("UserPool"),
    confirm_impact: ConfirmImpact::None,
};

pub struct DescribeUserPool;

#[async_trait]
impl ServiceOperation for DescribeUserPool {
    type Client = CognitoClient;
    type Request = DescribeUserPoolRequest;
    type Response = DescribeUserPoolResponse;

    fn descriptor(&self) -> &'static OperationDescriptor {
        &DESCRIBE_USER_POOL
    }

    fn build_request(&self, ctx: &BoundContext) -> InvokeResult<DescribeUserPoolRequest> {
        Ok(DescribeUserPoolRequest {
            user_pool_id: ctx.require_string("UserPoolId")?,
        })
    }

    async fn call(
        &self,
        client: &CognitoClient,
        request: DescribeUserPoolRequest,
    ) -> InvokeResult<DescribeUserPoolResponse> {
        client
            .describe_user_pool(&request)
            .await
            .map_err(|e| e.with_operation("DescribeUserPool").into_invoke(&client.endpoint()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcmd_core::ContextBuilder;
    use serde_json::json;

    #[test]
    fn request_carries_only_the_pool_id() {
        let mut builder = ContextBuilder::new();
        builder.bind("UserPoolId", json!("eu-west-1_AbCdEfGhI"));
        let request = DescribeUserPool.build_request(&builder.freeze()).unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"UserPoolId": "eu-west-1_AbCdEfGhI"})
        );
    }

    #[test]
    fn response_parses_epoch_dates_and_extras() {
        let wire = json!({
            "UserPool": {
                "Id": "eu-west-1_AbCdEfGhI",
                "Name": "customers",
                "CreationDate": 1.690000001E9,
                "MfaConfiguration": "OFF"
            }
        });
        let response: DescribeUserPoolResponse = serde_json::from_value(wire).unwrap();
        let pool = response.user_pool.unwrap();
        assert_eq!(pool.name.as_deref(), Some("customers"));
        assert!(pool.creation_date.is_some());
        assert!(pool.additional.contains_key("MfaConfiguration"));
    }

    #[test]
    fn describe_is_not_confirm_gated() {
        assert_eq!(DESCRIBE_USER_POOL.confirm_impact, ConfirmImpact::None);
    }
}
