//! OpenSearch Ingestion (OSIS) pipeline management.
//!
//! REST-JSON protocol, API version 2022-01-01. The create request carries
//! two optional groups — log publishing and VPC attachment — that are only
//! sent when at least one of their members was supplied; the log-publishing
//! group nests the CloudWatch destination one level further down.
//!
//! Reference: <https://docs.aws.amazon.com/opensearch-service/latest/APIReference/API_osis_CreatePipeline.html>

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

const SERVICE: &str = "osis";
const API_PREFIX: &str = "/2022-01-01/osis";

// ── Types ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudWatchLogDestination {
    #[serde(rename = "LogGroup")]
    pub log_group: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogPublishingOptions {
    #[serde(rename = "IsLoggingEnabled", skip_serializing_if = "Option::is_none")]
    pub is_logging_enabled: Option<bool>,
    #[serde(
        rename = "CloudWatchLogDestination",
        skip_serializing_if = "Option::is_none"
    )]
    pub cloud_watch_log_destination: Option<CloudWatchLogDestination>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VpcOptions {
    #[serde(rename = "SubnetIds", skip_serializing_if = "Option::is_none")]
    pub subnet_ids: Option<Vec<String>>,
    #[serde(rename = "SecurityGroupIds", skip_serializing_if = "Option::is_none")]
    pub security_group_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePipelineRequest {
    #[serde(rename = "PipelineName")]
    pub pipeline_name: String,
    #[serde(rename = "MinUnits")]
    pub min_units: i32,
    #[serde(rename = "MaxUnits")]
    pub max_units: i32,
    /// Data Prepper pipeline definition, YAML.
    #[serde(rename = "PipelineConfigurationBody")]
    pub pipeline_configuration_body: String,
    #[serde(rename = "LogPublishingOptions", skip_serializing_if = "Option::is_none")]
    pub log_publishing_options: Option<LogPublishingOptions>,
    #[serde(rename = "VpcOptions", skip_serializing_if = "Option::is_none")]
    pub vpc_options: Option<VpcOptions>,
    #[serde(rename = "Tags", skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

/// Pipeline description as returned by the service; fields this tool does
/// not interpret ride along untyped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    #[serde(rename = "PipelineName", skip_serializing_if = "Option::is_none")]
    pub pipeline_name: Option<String>,
    #[serde(rename = "PipelineArn", skip_serializing_if = "Option::is_none")]
    pub pipeline_arn: Option<String>,
    #[serde(rename = "MinUnits", skip_serializing_if = "Option::is_none")]
    pub min_units: Option<i32>,
    #[serde(rename = "MaxUnits", skip_serializing_if = "Option::is_none")]
    pub max_units: Option<i32>,
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "IngestEndpointUrls", skip_serializing_if = "Option::is_none")]
    pub ingest_endpoint_urls: Option<Vec<String>>,
    #[serde(flatten)]
    pub additional: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePipelineResponse {
    #[serde(rename = "Pipeline", skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<Pipeline>,
}

// ── Client ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OsisClient {
    client: AwsClient,
}

impl OsisClient {
    pub fn new(client: AwsClient) -> Self {
        Self { client }
    }

    pub fn endpoint(&self) -> String {
        self.client.endpoint(SERVICE)
    }

    pub async fn create_pipeline(
        &self,
        request: &CreatePipelineRequest,
    ) -> AwsResult<CreatePipelineResponse> {
        let path = format!("{API_PREFIX}/createPipeline");
        let body = serde_json::to_value(request)
            .map_err(|e| crate::error::AwsError::parse_error(SERVICE, 0, &e.to_string()))?;
        let response = self
            .client
            .rest_json_request(SERVICE, "POST", &path, Some(&body), BTreeMap::new())
            .await?;
        response.json(SERVICE)
    }
}

// ── Operation ───────────────────────────────────────────────────────────

pub static CREATE_PIPELINE: OperationDescriptor = OperationDescriptor {
    service: SERVICE,
    operation: "CreatePipeline",
    parameters: &[
        ParamSpec::new("PipelineName", ParamKind::String).required().positional(0),
        ParamSpec::new("MinUnit", ParamKind::Integer).required().aliased(&["MinUnits"]),
        ParamSpec::new("MaxUnit", ParamKind::Integer).required().aliased(&["MaxUnits"]),
        ParamSpec::new("PipelineConfigurationBody", ParamKind::String).required(),
        ParamSpec::new("LogPublishingOptions_IsLoggingEnabled", ParamKind::Boolean)
            .aliased(&["IsLoggingEnabled"])
            .grouped("LogPublishingOptions"),
        ParamSpec::new("CloudWatchLogDestination_LogGroup", ParamKind::String)
            .aliased(&["LogPublishingOptions_CloudWatchLogDestination_LogGroup", "LogGroup"])
            .grouped("LogPublishingOptions.CloudWatchLogDestination"),
        ParamSpec::new("VpcOptions_SubnetId", ParamKind::StringList)
            .aliased(&["VpcOptions_SubnetIds"])
            .grouped("VpcOptions"),
        ParamSpec::new("VpcOptions_SecurityGroupId", ParamKind::StringList)
            .aliased(&["VpcOptions_SecurityGroupIds"])
            .grouped("VpcOptions"),
        ParamSpec::new("Tag", ParamKind::StringMap).aliased(&["Tags"]),
    ],
    response_fields: &["Pipeline"],
    default_select: Some("Pipeline"),
    confirm_impact: ConfirmImpact::Medium,
};

pub struct CreatePipeline;

#[async_trait]
impl ServiceOperation for CreatePipeline {
    type Client = OsisClient;
    type Request = CreatePipelineRequest;
    type Response = CreatePipelineResponse;

    fn descriptor(&self) -> &'static OperationDescriptor {
        &CREATE_PIPELINE
    }

    fn build_request(&self, ctx: &BoundContext) -> InvokeResult<CreatePipelineRequest> {
        // Innermost group first: the CloudWatch destination exists only if
        // its single member was supplied.
        let cloud_watch_log_destination = ctx
            .string("CloudWatchLogDestination_LogGroup")?
            .map(|log_group| CloudWatchLogDestination { log_group });

        let is_logging_enabled = ctx.boolean("LogPublishingOptions_IsLoggingEnabled")?;
        let log_publishing_options =
            if is_logging_enabled.is_none() && cloud_watch_log_destination.is_none() {
                None
            } else {
                Some(LogPublishingOptions {
                    is_logging_enabled,
                    cloud_watch_log_destination,
                })
            };

        let subnet_ids = ctx.string_list("VpcOptions_SubnetId")?;
        let security_group_ids = ctx.string_list("VpcOptions_SecurityGroupId")?;
        let vpc_options = if subnet_ids.is_none() && security_group_ids.is_none() {
            None
        } else {
            Some(VpcOptions {
                subnet_ids,
                security_group_ids,
            })
        };

        let tags = ctx.string_map("Tag")?.map(|entries| {
            entries
                .into_iter()
                .map(|(key, value)| Tag { key, value })
                .collect()
        });

        Ok(CreatePipelineRequest {
            pipeline_name: ctx.require_string("PipelineName")?,
            min_units: ctx.require_integer("MinUnit")?,
            max_units: ctx.require_integer("MaxUnit")?,
            pipeline_configuration_body: ctx.require_string("PipelineConfigurationBody")?,
            log_publishing_options,
            vpc_options,
            tags,
        })
    }

    async fn call(
        &self,
        client: &OsisClient,
        request: CreatePipelineRequest,
    ) -> InvokeResult<CreatePipelineResponse> {
        client
            .create_pipeline(&request)
            .await
            .map_err(|e| e.with_operation("CreatePipeline").into_invoke(&client.endpoint()))
    }
}
