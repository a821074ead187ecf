//! AppSync GraphQL API management.
//!
//! REST-JSON protocol (camelCase wire names). The create request carries
//! four optional auth/logging groups, each sent only when at least one of
//! its members was supplied.
//!
//! Reference: <https://docs.aws.amazon.com/appsync/latest/APIReference/API_CreateGraphqlApi.html>

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

const SERVICE: &str = "appsync";

// ── Types ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// `NONE`, `ERROR` or `ALL`.
    #[serde(rename = "fieldLogLevel", skip_serializing_if = "Option::is_none")]
    pub field_log_level: Option<String>,
    #[serde(rename = "cloudWatchLogsRoleArn", skip_serializing_if = "Option::is_none")]
    pub cloud_watch_logs_role_arn: Option<String>,
    #[serde(rename = "excludeVerboseContent", skip_serializing_if = "Option::is_none")]
    pub exclude_verbose_content: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPoolConfig {
    #[serde(rename = "userPoolId", skip_serializing_if = "Option::is_none")]
    pub user_pool_id: Option<String>,
    #[serde(rename = "awsRegion", skip_serializing_if = "Option::is_none")]
    pub aws_region: Option<String>,
    /// `ALLOW` or `DENY`.
    #[serde(rename = "defaultAction", skip_serializing_if = "Option::is_none")]
    pub default_action: Option<String>,
    #[serde(rename = "appIdClientRegex", skip_serializing_if = "Option::is_none")]
    pub app_id_client_regex: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenIdConnectConfig {
    #[serde(rename = "issuer", skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(rename = "clientId", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(rename = "iatTTL", skip_serializing_if = "Option::is_none")]
    pub iat_ttl: Option<i64>,
    #[serde(rename = "authTTL", skip_serializing_if = "Option::is_none")]
    pub auth_ttl: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LambdaAuthorizerConfig {
    #[serde(rename = "authorizerUri", skip_serializing_if = "Option::is_none")]
    pub authorizer_uri: Option<String>,
    #[serde(
        rename = "authorizerResultTtlInSeconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub authorizer_result_ttl_in_seconds: Option<i32>,
    #[serde(
        rename = "identityValidationExpression",
        skip_serializing_if = "Option::is_none"
    )]
    pub identity_validation_expression: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateGraphqlApiRequest {
    #[serde(rename = "name")]
    pub name: String,
    /// `API_KEY`, `AWS_IAM`, `AMAZON_COGNITO_USER_POOLS`, `OPENID_CONNECT`
    /// or `AWS_LAMBDA`.
    #[serde(rename = "authenticationType")]
    pub authentication_type: String,
    #[serde(rename = "logConfig", skip_serializing_if = "Option::is_none")]
    pub log_config: Option<LogConfig>,
    #[serde(rename = "userPoolConfig", skip_serializing_if = "Option::is_none")]
    pub user_pool_config: Option<UserPoolConfig>,
    #[serde(rename = "openIDConnectConfig", skip_serializing_if = "Option::is_none")]
    pub open_id_connect_config: Option<OpenIdConnectConfig>,
    #[serde(rename = "lambdaAuthorizerConfig", skip_serializing_if = "Option::is_none")]
    pub lambda_authorizer_config: Option<LambdaAuthorizerConfig>,
    #[serde(rename = "tags", skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(rename = "xrayEnabled", skip_serializing_if = "Option::is_none")]
    pub xray_enabled: Option<bool>,
    /// `GLOBAL` or `PRIVATE`.
    #[serde(rename = "visibility", skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    /// `GRAPHQL` or `MERGED`.
    #[serde(rename = "apiType", skip_serializing_if = "Option::is_none")]
    pub api_type: Option<String>,
    #[serde(rename = "mergedApiExecutionRoleArn", skip_serializing_if = "Option::is_none")]
    pub merged_api_execution_role_arn: Option<String>,
    #[serde(rename = "ownerContact", skip_serializing_if = "Option::is_none")]
    pub owner_contact: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlApi {
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "apiId", skip_serializing_if = "Option::is_none")]
    pub api_id: Option<String>,
    #[serde(rename = "arn", skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(rename = "authenticationType", skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<String>,
    #[serde(rename = "uris", skip_serializing_if = "Option::is_none")]
    pub uris: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub additional: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGraphqlApiResponse {
    #[serde(rename = "graphqlApi", skip_serializing_if = "Option::is_none")]
    pub graphql_api: Option<GraphqlApi>,
}

// ── Client ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AppSyncClient {
    client: AwsClient,
}

impl AppSyncClient {
    pub fn new(client: AwsClient) -> Self {
        Self { client }
    }

    pub fn endpoint(&self) -> String {
        self.client.endpoint(SERVICE)
    }

    pub async fn create_graphql_api(
        &self,
        request: &CreateGraphqlApiRequest,
    ) -> AwsResult<CreateGraphqlApiResponse> {
        let body = serde_json::to_value(request)
            .map_err(|e| crate::error::AwsError::parse_error(SERVICE, 0, &e.to_string()))?;
        let response = self
            .client
            .rest_json_request(SERVICE, "POST", "/v1/apis", Some(&body), BTreeMap::new())
            .await?;
        response.json(SERVICE)
    }
}

// ── Operation ───────────────────────────────────────────────────────────

pub static CREATE_GRAPHQL_API: OperationDescriptor = OperationDescriptor {
    service: SERVICE,
    operation: "CreateGraphqlApi",
    parameters: &[
        ParamSpec::new("Name", ParamKind::String).required().positional(0),
        ParamSpec::new("AuthenticationType", ParamKind::String).required(),
        ParamSpec::new("Tag", ParamKind::StringMap).aliased(&["Tags"]),
        ParamSpec::new("XrayEnabled", ParamKind::Boolean),
        ParamSpec::new("Visibility", ParamKind::String),
        ParamSpec::new("ApiType", ParamKind::String),
        ParamSpec::new("MergedApiExecutionRoleArn", ParamKind::String),
        ParamSpec::new("OwnerContact", ParamKind::String),
        ParamSpec::new("LogConfig_FieldLogLevel", ParamKind::String).grouped("logConfig"),
        ParamSpec::new("LogConfig_CloudWatchLogsRoleArn", ParamKind::String)
            .grouped("logConfig"),
        ParamSpec::new("LogConfig_ExcludeVerboseContent", ParamKind::Boolean)
            .grouped("logConfig"),
        ParamSpec::new("UserPoolConfig_UserPoolId", ParamKind::String)
            .grouped("userPoolConfig"),
        ParamSpec::new("UserPoolConfig_AwsRegion", ParamKind::String)
            .grouped("userPoolConfig"),
        ParamSpec::new("UserPoolConfig_DefaultAction", ParamKind::String)
            .grouped("userPoolConfig"),
        ParamSpec::new("UserPoolConfig_AppIdClientRegex", ParamKind::String)
            .grouped("userPoolConfig"),
        ParamSpec::new("OpenIDConnectConfig_Issuer", ParamKind::String)
            .grouped("openIDConnectConfig"),
        ParamSpec::new("OpenIDConnectConfig_ClientId", ParamKind::String)
            .grouped("openIDConnectConfig"),
        ParamSpec::new("OpenIDConnectConfig_IatTTL", ParamKind::Long)
            .grouped("openIDConnectConfig"),
        ParamSpec::new("OpenIDConnectConfig_AuthTTL", ParamKind::Long)
            .grouped("openIDConnectConfig"),
        ParamSpec::new("LambdaAuthorizerConfig_AuthorizerUri", ParamKind::String)
            .grouped("lambdaAuthorizerConfig"),
        ParamSpec::new(
            "LambdaAuthorizerConfig_AuthorizerResultTtlInSecond",
            ParamKind::Integer,
        )
        .aliased(&["LambdaAuthorizerConfig_AuthorizerResultTtlInSeconds"])
        .grouped("lambdaAuthorizerConfig"),
        ParamSpec::new(
            "LambdaAuthorizerConfig_IdentityValidationExpression",
            ParamKind::String,
        )
        .grouped("lambdaAuthorizerConfig"),
    ],
    response_fields: &["graphqlApi"],
    default_select: Some("graphqlApi"),
    confirm_impact: ConfirmImpact::Medium,
};

pub struct CreateGraphqlApi;

#[async_trait]
impl ServiceOperation for CreateGraphqlApi {
    type Client = AppSyncClient;
    type Request = CreateGraphqlApiRequest;
    type Response = CreateGraphqlApiResponse;

    fn descriptor(&self) -> &'static OperationDescriptor {
        &CREATE_GRAPHQL_API
    }

    fn build_request(&self, ctx: &BoundContext) -> InvokeResult<CreateGraphqlApiRequest> {
        let log_config = {
            let field_log_level = ctx.string("LogConfig_FieldLogLevel")?;
            let cloud_watch_logs_role_arn = ctx.string("LogConfig_CloudWatchLogsRoleArn")?;
            let exclude_verbose_content = ctx.boolean("LogConfig_ExcludeVerboseContent")?;
            if field_log_level.is_none()
                && cloud_watch_logs_role_arn.is_none()
                && exclude_verbose_content.is_none()
            {
                None
            } else {
                Some(LogConfig {
                    field_log_level,
                    cloud_watch_logs_role_arn,
                    exclude_verbose_content,
                })
            }
        };

        let user_pool_config = {
            let user_pool_id = ctx.string("UserPoolConfig_UserPoolId")?;
            let aws_region = ctx.string("UserPoolConfig_AwsRegion")?;
            let default_action = ctx.string("UserPoolConfig_DefaultAction")?;
            let app_id_client_regex = ctx.string("UserPoolConfig_AppIdClientRegex")?;
            if user_pool_id.is_none()
                && aws_region.is_none()
                && default_action.is_none()
                && app_id_client_regex.is_none()
            {
                None
            } else {
                Some(UserPoolConfig {
                    user_pool_id,
                    aws_region,
                    default_action,
                    app_id_client_regex,
                })
            }
        };

        let open_id_connect_config = {
            let issuer = ctx.string("OpenIDConnectConfig_Issuer")?;
            let client_id = ctx.string("OpenIDConnectConfig_ClientId")?;
            let iat_ttl = ctx.long("OpenIDConnectConfig_IatTTL")?;
            let auth_ttl = ctx.long("OpenIDConnectConfig_AuthTTL")?;
            if issuer.is_none() && client_id.is_none() && iat_ttl.is_none() && auth_ttl.is_none() {
                None
            } else {
                Some(OpenIdConnectConfig {
                    issuer,
                    client_id,
                    iat_ttl,
                    auth_ttl,
                })
            }
        };

        let lambda_authorizer_config = {
            let authorizer_uri = ctx.string("LambdaAuthorizerConfig_AuthorizerUri")?;
            let authorizer_result_ttl_in_seconds =
                ctx.integer("LambdaAuthorizerConfig_AuthorizerResultTtlInSecond")?;
            let identity_validation_expression =
                ctx.string("LambdaAuthorizerConfig_IdentityValidationExpression")?;
            if authorizer_uri.is_none()
                && authorizer_result_ttl_in_seconds.is_none()
                && identity_validation_expression.is_none()
            {
                None
            } else {
                Some(LambdaAuthorizerConfig {
                    authorizer_uri,
                    authorizer_result_ttl_in_seconds,
                    identity_validation_expression,
                })
            }
        };

        Ok(CreateGraphqlApiRequest {
            name: ctx.require_string("Name")?,
            authentication_type: ctx.require_string("AuthenticationType")?,
            log_config,
            user_pool_config,
            open_id_connect_config,
            lambda_authorizer_config,
            tags: ctx.string_map("Tag")?,
            xray_enabled: ctx.boolean("XrayEnabled")?,
            visibility: ctx.string("Visibility")?,
            api_type: ctx.string("ApiType")?,
            merged_api_execution_role_arn: ctx.string("MergedApiExecutionRoleArn")?,
            owner_contact: ctx.string("OwnerContact")?,
        })
    }

    async fn call(
        &self,
        client: &AppSyncClient,
        request: CreateGraphqlApiRequest,
    ) -> InvokeResult<CreateGraphqlApiResponse> {
        client
            .create_graphql_api(&request)
            .await
            .map_err(|e| e.with_operation("CreateGraphqlApi").into_invoke(&client.endpoint()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcmd_core::ContextBuilder;
    use serde_json::json;

    fn required_context() -> ContextBuilder {
        let mut builder = ContextBuilder::new();
        builder
            .bind("Name", json!("orders-api"))
            .bind("AuthenticationType", json!("API_KEY"));
        builder
    }

    #[test]
    fn minimal_request_has_no_auth_groups() {
        let request = CreateGraphqlApi.build_request(&required_context().freeze()).unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({"name": "orders-api", "authenticationType": "API_KEY"})
        );
    }

    #[test]
    fn each_group_appears_only_when_a_member_is_supplied() {
        let mut builder = required_context();
        builder
            .bind("LogConfig_FieldLogLevel", json!("ERROR"))
            .bind("OpenIDConnectConfig_Issuer", json!("https://issuer.example"));
        let request = CreateGraphqlApi.build_request(&builder.freeze()).unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["logConfig"], json!({"fieldLogLevel": "ERROR"}));
        assert_eq!(
            body["openIDConnectConfig"],
            json!({"issuer": "https://issuer.example"})
        );
        assert!(body.get("userPoolConfig").is_none());
        assert!(body.get("lambdaAuthorizerConfig").is_none());
    }

    #[test]
    fn lambda_ttl_alias_resolves() {
        assert_eq!(
            CREATE_GRAPHQL_API
                .resolve("LambdaAuthorizerConfig_AuthorizerResultTtlInSeconds")
                .map(|s| s.name),
            Some("LambdaAuthorizerConfig_AuthorizerResultTtlInSecond")
        );
    }

    #[test]
    fn graphql_api_response_parses() {
        let wire = json!({
            "graphqlApi": {
                "name": "orders-api",
                "apiId": "abc123",
                "uris": {"GRAPHQL": "https://abc123.appsync-api.us-east-1.amazonaws.com/graphql"},
                "xrayEnabled": false
            }
        });
        let response: CreateGraphqlApiResponse = serde_json::from_value(wire).unwrap();
        let api = response.graphql_api.unwrap();
        assert_eq!(api.api_id.as_deref(), Some("abc123"));
        assert!(api.additional.contains_key("xrayEnabled"));
    }
}
