//! Command tree and adapter dispatch.
//!
//! One subcommand per remote operation. Each handler translates its typed
//! flags into adapter arguments, builds the service client from the
//! resolved connection configuration, and runs a single adapter invocation.

use std::io::{self, BufRead, Write};

use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::{json, Value};

use cloudcmd_aws::appsync::{AppSyncClient, CreateGraphqlApi};
use cloudcmd_aws::cloudfront::{CloudFrontClient, DeleteStreamingDistribution};
use cloudcmd_aws::codeguru::{CodeGuruClient, ListScans};
use cloudcmd_aws::cognito::{CognitoClient, DescribeUserPool};
use cloudcmd_aws::location::{LocationClient, SearchPlaceIndexForSuggestions};
use cloudcmd_aws::messaging::{DeleteChannelMessage, MessagingClient, SendChannelMessage};
use cloudcmd_aws::osis::{CreatePipeline, OsisClient};
use cloudcmd_aws::roborunner::{CreateWorkerFleet, RoboRunnerClient};
use cloudcmd_aws::{AwsClient, ConnectionConfig};
use cloudcmd_core::{
    AlwaysProceed, Arguments, CommandAdapter, ConfirmGate, ConfirmImpact, InvokeError,
    InvokeResult, ServiceOperation,
};

#[derive(Debug, Parser)]
#[command(
    name = "cloudcmd",
    version,
    about = "AWS service operations from the command line"
)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Select expression controlling output: `*` for the whole response,
    /// a response field name, or `^Param` to echo an input value.
    #[arg(long, global = true)]
    pub select: Option<String>,

    /// Skip confirmation prompts for destructive operations.
    #[arg(long, global = true)]
    pub force: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// AWS region (falls back to AWS_REGION / AWS_DEFAULT_REGION).
    #[arg(long, global = true)]
    pub region: Option<String>,

    #[arg(long, global = true)]
    pub access_key_id: Option<String>,

    #[arg(long, global = true)]
    pub secret_access_key: Option<String>,

    #[arg(long, global = true)]
    pub session_token: Option<String>,

    /// Endpoint override for local stacks.
    #[arg(long, global = true)]
    pub endpoint_url: Option<String>,
}

impl ConnectionArgs {
    pub fn to_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            region: self.region.clone(),
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            session_token: self.session_token.clone(),
            endpoint_url: self.endpoint_url.clone(),
            retry: None,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send a message to a messaging channel.
    SendChannelMessage(SendChannelMessageArgs),
    /// Delete a channel message.
    RemoveChannelMessage(RemoveChannelMessageArgs),
    /// Query a place index for typeahead suggestions.
    SearchPlaceIndexSuggestions(SearchPlaceIndexSuggestionsArgs),
    /// Create an OpenSearch Ingestion pipeline.
    NewPipeline(NewPipelineArgs),
    /// Describe a Cognito user pool.
    GetUserPool(GetUserPoolArgs),
    /// List CodeGuru Security scans.
    GetScanList(GetScanListArgs),
    /// Create an AppSync GraphQL API.
    NewGraphqlApi(NewGraphqlApiArgs),
    /// Delete a CloudFront streaming distribution.
    RemoveStreamingDistribution(RemoveStreamingDistributionArgs),
    /// Create an IoT RoboRunner worker fleet.
    NewWorkerFleet(NewWorkerFleetArgs),
}

#[derive(Debug, Args)]
pub struct SendChannelMessageArgs {
    #[arg(long)]
    pub channel_arn: String,
    /// App instance user the call is made on behalf of.
    #[arg(long)]
    pub chime_bearer: String,
    #[arg(long)]
    pub content: String,
    /// PERSISTENT or NON_PERSISTENT.
    #[arg(long)]
    pub persistence: String,
    /// STANDARD or CONTROL.
    #[arg(long = "type")]
    pub message_type: String,
    #[arg(long)]
    pub metadata: Option<String>,
    #[arg(long)]
    pub client_request_token: Option<String>,
    /// Message attribute as name=value; repeatable.
    #[arg(long = "attribute", value_parser = parse_key_value)]
    pub attributes: Vec<(String, String)>,
    #[arg(long)]
    pub push_body: Option<String>,
    #[arg(long)]
    pub push_title: Option<String>,
    #[arg(long)]
    pub push_type: Option<String>,
}

#[derive(Debug, Args)]
pub struct RemoveChannelMessageArgs {
    #[arg(long)]
    pub channel_arn: String,
    #[arg(long)]
    pub message_id: String,
    #[arg(long)]
    pub chime_bearer: Option<String>,
}

#[derive(Debug, Args)]
pub struct SearchPlaceIndexSuggestionsArgs {
    #[arg(long)]
    pub index_name: String,
    #[arg(long)]
    pub text: String,
    /// Comma-separated longitude,latitude to bias results around.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub bias_position: Option<Vec<f64>>,
    /// Comma-separated west,south,east,north bounding box.
    #[arg(long, value_delimiter = ',', num_args = 4, allow_hyphen_values = true)]
    pub filter_bbox: Option<Vec<f64>>,
    /// ISO 3166 country code; repeatable.
    #[arg(long = "filter-country")]
    pub filter_countries: Vec<String>,
    #[arg(long)]
    pub language: Option<String>,
    #[arg(long, alias = "max-result")]
    pub max_results: Option<i32>,
}

#[derive(Debug, Args)]
pub struct NewPipelineArgs {
    #[arg(long)]
    pub pipeline_name: String,
    #[arg(long, alias = "min-unit")]
    pub min_units: i32,
    #[arg(long, alias = "max-unit")]
    pub max_units: i32,
    /// Data Prepper pipeline definition (YAML).
    #[arg(long)]
    pub pipeline_configuration_body: String,
    /// CloudWatch log group for pipeline logs.
    #[arg(long)]
    pub log_group: Option<String>,
    #[arg(long)]
    pub logging_enabled: Option<bool>,
    /// VPC subnet id; repeatable.
    #[arg(long = "subnet-id")]
    pub subnet_ids: Vec<String>,
    /// VPC security group id; repeatable.
    #[arg(long = "security-group-id")]
    pub security_group_ids: Vec<String>,
    /// Tag as key=value; repeatable.
    #[arg(long = "tag", value_parser = parse_key_value)]
    pub tags: Vec<(String, String)>,
}

#[derive(Debug, Args)]
pub struct GetUserPoolArgs {
    #[arg(long)]
    pub user_pool_id: String,
}

#[derive(Debug, Args)]
pub struct GetScanListArgs {
    #[arg(long, alias = "max-result")]
    pub max_results: Option<i32>,
    #[arg(long)]
    pub next_token: Option<String>,
}

#[derive(Debug, Args)]
pub struct NewGraphqlApiArgs {
    #[arg(long)]
    pub name: String,
    /// API_KEY, AWS_IAM, AMAZON_COGNITO_USER_POOLS, OPENID_CONNECT or AWS_LAMBDA.
    #[arg(long)]
    pub authentication_type: String,
    /// NONE, ERROR or ALL.
    #[arg(long)]
    pub field_log_level: Option<String>,
    #[arg(long)]
    pub cloud_watch_logs_role_arn: Option<String>,
    #[arg(long)]
    pub exclude_verbose_content: Option<bool>,
    #[arg(long)]
    pub user_pool_id: Option<String>,
    #[arg(long)]
    pub user_pool_region: Option<String>,
    /// ALLOW or DENY for unmatched user pool clients.
    #[arg(long)]
    pub default_action: Option<String>,
    #[arg(long)]
    pub app_id_client_regex: Option<String>,
    #[arg(long)]
    pub oidc_issuer: Option<String>,
    #[arg(long)]
    pub oidc_client_id: Option<String>,
    #[arg(long)]
    pub oidc_iat_ttl: Option<i64>,
    #[arg(long)]
    pub oidc_auth_ttl: Option<i64>,
    #[arg(long)]
    pub lambda_authorizer_uri: Option<String>,
    #[arg(long)]
    pub lambda_authorizer_ttl: Option<i32>,
    #[arg(long)]
    pub lambda_identity_validation_expression: Option<String>,
    /// Tag as key=value; repeatable.
    #[arg(long = "tag", value_parser = parse_key_value)]
    pub tags: Vec<(String, String)>,
    #[arg(long)]
    pub xray_enabled: Option<bool>,
    /// GLOBAL or PRIVATE.
    #[arg(long)]
    pub visibility: Option<String>,
    /// GRAPHQL or MERGED.
    #[arg(long)]
    pub api_type: Option<String>,
    #[arg(long)]
    pub merged_api_execution_role_arn: Option<String>,
    #[arg(long)]
    pub owner_contact: Option<String>,
}

#[derive(Debug, Args)]
pub struct RemoveStreamingDistributionArgs {
    #[arg(long)]
    pub id: String,
    /// ETag from the latest configuration read.
    #[arg(long)]
    pub if_match: Option<String>,
}

#[derive(Debug, Args)]
pub struct NewWorkerFleetArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub site: String,
    #[arg(long)]
    pub client_token: Option<String>,
    /// JSON document of fixed worker properties.
    #[arg(long, alias = "additional-fixed-property")]
    pub additional_fixed_properties: Option<String>,
}

/// Parse a `key=value` flag.
fn parse_key_value(input: &str) -> Result<(String, String), String> {
    input
        .split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{input}'"))
}

fn key_value_object(entries: &[(String, String)]) -> Option<Value> {
    if entries.is_empty() {
        return None;
    }
    let mut object = serde_json::Map::new();
    for (key, value) in entries {
        object.insert(key.clone(), json!(value));
    }
    Some(Value::Object(object))
}

fn string_list(values: &[String]) -> Option<Value> {
    if values.is_empty() {
        None
    } else {
        Some(json!(values))
    }
}

/// Prompts on stderr for high-impact operations; medium impact proceeds
/// without a prompt (pass `--force` to skip prompting entirely).
struct InteractiveGate;

impl ConfirmGate for InteractiveGate {
    fn should_proceed(&self, impact: ConfirmImpact, action: &str, target: &str) -> bool {
        if impact < ConfirmImpact::High {
            return true;
        }
        eprint!("Perform {action} on '{target}'? [y/N] ");
        let _ = io::stderr().flush();
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

fn configured<O: ServiceOperation>(
    adapter: CommandAdapter<O>,
    select: Option<&str>,
) -> InvokeResult<CommandAdapter<O>> {
    match select {
        Some(expression) => adapter.with_select_expression(expression),
        None => Ok(adapter),
    }
}

/// Run one invocation end to end and return the selected output.
pub async fn run(cli: Cli) -> InvokeResult<Option<Value>> {
    let config = cli.connection.to_config();
    config.validate().map_err(InvokeError::service)?;
    let credentials = config.resolve_credentials().map_err(InvokeError::service)?;
    let region = config.resolve_region();
    let client = AwsClient::new(
        credentials,
        region,
        config.retry.clone().unwrap_or_default(),
        config.endpoint_url.clone(),
    );

    let gate: Box<dyn ConfirmGate> = if cli.force {
        Box::new(AlwaysProceed)
    } else {
        Box::new(InteractiveGate)
    };
    let select = cli.select.as_deref();

    match cli.command {
        Command::SendChannelMessage(args) => {
            let adapter = configured(CommandAdapter::new(SendChannelMessage), select)?;
            let arguments = Arguments::new()
                .set("ChannelArn", json!(args.channel_arn))
                .set("ChimeBearer", json!(args.chime_bearer))
                .set("Content", json!(args.content))
                .set("Persistence", json!(args.persistence))
                .set("Type", json!(args.message_type))
                .set_opt("Metadata", args.metadata)
                .set_opt("ClientRequestToken", args.client_request_token)
                .set_opt("MessageAttribute", key_value_object(&args.attributes))
                .set_opt("PushNotification_Body", args.push_body)
                .set_opt("PushNotification_Title", args.push_title)
                .set_opt("PushNotification_Type", args.push_type);
            adapter
                .invoke(&MessagingClient::new(client), arguments, gate.as_ref())
                .await
        }
        Command::RemoveChannelMessage(args) => {
            let adapter = configured(CommandAdapter::new(DeleteChannelMessage), select)?;
            let arguments = Arguments::new()
                .set("ChannelArn", json!(args.channel_arn))
                .set("MessageId", json!(args.message_id))
                .set_opt("ChimeBearer", args.chime_bearer);
            adapter
                .invoke(&MessagingClient::new(client), arguments, gate.as_ref())
                .await
        }
        Command::SearchPlaceIndexSuggestions(args) => {
            let adapter = configured(CommandAdapter::new(SearchPlaceIndexForSuggestions), select)?;
            let arguments = Arguments::new()
                .set("IndexName", json!(args.index_name))
                .set("Text", json!(args.text))
                .set_opt("BiasPosition", args.bias_position)
                .set_opt("FilterBBox", args.filter_bbox)
                .set_opt("FilterCountry", string_list(&args.filter_countries))
                .set_opt("Language", args.language)
                .set_opt("MaxResult", args.max_results);
            adapter
                .invoke(&LocationClient::new(client), arguments, gate.as_ref())
                .await
        }
        Command::NewPipeline(args) => {
            let adapter = configured(CommandAdapter::new(CreatePipeline), select)?;
            let arguments = Arguments::new()
                .set("PipelineName", json!(args.pipeline_name))
                .set("MinUnit", json!(args.min_units))
                .set("MaxUnit", json!(args.max_units))
                .set(
                    "PipelineConfigurationBody",
                    json!(args.pipeline_configuration_body),
                )
                .set_opt("CloudWatchLogDestination_LogGroup", args.log_group)
                .set_opt(
                    "LogPublishingOptions_IsLoggingEnabled",
                    args.logging_enabled,
                )
                .set_opt("VpcOptions_SubnetId", string_list(&args.subnet_ids))
                .set_opt(
                    "VpcOptions_SecurityGroupId",
                    string_list(&args.security_group_ids),
                )
                .set_opt("Tag", key_value_object(&args.tags));
            adapter
                .invoke(&OsisClient::new(client), arguments, gate.as_ref())
                .await
        }
        Command::GetUserPool(args) => {
            let adapter = configured(CommandAdapter::new(DescribeUserPool), select)?;
            let arguments = Arguments::new().set("UserPoolId", json!(args.user_pool_id));
            adapter
                .invoke(&CognitoClient::new(client), arguments, gate.as_ref())
                .await
        }
        Command::GetScanList(args) => {
            let adapter = configured(CommandAdapter::new(ListScans), select)?;
            let arguments = Arguments::new()
                .set_opt("MaxResult", args.max_results)
                .set_opt("NextToken", args.next_token);
            adapter
                .invoke(&CodeGuruClient::new(client), arguments, gate.as_ref())
                .await
        }
        Command::NewGraphqlApi(args) => {
            let adapter = configured(CommandAdapter::new(CreateGraphqlApi), select)?;
            let arguments = Arguments::new()
                .set("Name", json!(args.name))
                .set("AuthenticationType", json!(args.authentication_type))
                .set_opt("LogConfig_FieldLogLevel", args.field_log_level)
                .set_opt(
                    "LogConfig_CloudWatchLogsRoleArn",
                    args.cloud_watch_logs_role_arn,
                )
                .set_opt(
                    "LogConfig_ExcludeVerboseContent",
                    args.exclude_verbose_content,
                )
                .set_opt("UserPoolConfig_UserPoolId", args.user_pool_id)
                .set_opt("UserPoolConfig_AwsRegion", args.user_pool_region)
                .set_opt("UserPoolConfig_DefaultAction", args.default_action)
                .set_opt("UserPoolConfig_AppIdClientRegex", args.app_id_client_regex)
                .set_opt("OpenIDConnectConfig_Issuer", args.oidc_issuer)
                .set_opt("OpenIDConnectConfig_ClientId", args.oidc_client_id)
                .set_opt("OpenIDConnectConfig_IatTTL", args.oidc_iat_ttl)
                .set_opt("OpenIDConnectConfig_AuthTTL", args.oidc_auth_ttl)
                .set_opt(
                    "LambdaAuthorizerConfig_AuthorizerUri",
                    args.lambda_authorizer_uri,
                )
                .set_opt(
                    "LambdaAuthorizerConfig_AuthorizerResultTtlInSecond",
                    args.lambda_authorizer_ttl,
                )
                .set_opt(
                    "LambdaAuthorizerConfig_IdentityValidationExpression",
                    args.lambda_identity_validation_expression,
                )
                .set_opt("Tag", key_value_object(&args.tags))
                .set_opt("XrayEnabled", args.xray_enabled)
                .set_opt("Visibility", args.visibility)
                .set_opt("ApiType", args.api_type)
                .set_opt(
                    "MergedApiExecutionRoleArn",
                    args.merged_api_execution_role_arn,
                )
                .set_opt("OwnerContact", args.owner_contact);
            adapter
                .invoke(&AppSyncClient::new(client), arguments, gate.as_ref())
                .await
        }
        Command::RemoveStreamingDistribution(args) => {
            let adapter = configured(CommandAdapter::new(DeleteStreamingDistribution), select)?;
            let arguments = Arguments::new()
                .set("Id", json!(args.id))
                .set_opt("IfMatch", args.if_match);
            adapter
                .invoke(&CloudFrontClient::new(client), arguments, gate.as_ref())
                .await
        }
        Command::NewWorkerFleet(args) => {
            let adapter = configured(CommandAdapter::new(CreateWorkerFleet), select)?;
            let arguments = Arguments::new()
                .set("Name", json!(args.name))
                .set("Site", json!(args.site))
                .set_opt("ClientToken", args.client_token)
                .set_opt(
                    "AdditionalFixedProperty",
                    args.additional_fixed_properties,
                );
            adapter
                .invoke(&RoboRunnerClient::new(client), arguments, gate.as_ref())
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_parsing() {
        assert_eq!(
            parse_key_value("team=infra"),
            Ok(("team".to_string(), "infra".to_string()))
        );
        assert_eq!(
            parse_key_value("k=a=b"),
            Ok(("k".to_string(), "a=b".to_string()))
        );
        assert!(parse_key_value("no-separator").is_err());
        assert!(parse_key_value("=value").is_err());
    }

    #[test]
    fn empty_collections_bind_nothing() {
        assert!(key_value_object(&[]).is_none());
        assert!(string_list(&[]).is_none());
        let entries = vec![("a".to_string(), "1".to_string())];
        assert_eq!(key_value_object(&entries), Some(json!({"a": "1"})));
    }
}
