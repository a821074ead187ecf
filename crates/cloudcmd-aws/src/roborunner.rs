//! IoT RoboRunner worker fleet management.
//!
//! REST-JSON protocol (camelCase wire names) against
//! `iotroborunner.{region}`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cloudcmd_core::{
    BoundContext, ConfirmImpact, InvokeResult, OperationDescriptor, ParamKind, ParamSpec,
    ServiceOperation,
};

use crate::client::AwsClient;
use crate::error::AwsResult;

const SERVICE: &str = "iotroborunner";

// ── Types ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct CreateWorkerFleetRequest {
    #[serde(rename = "name")]
    pub name: String,
    /// ARN of the site the fleet belongs to.
    #[serde(rename = "site")]
    pub site: String,
    #[serde(rename = "clientToken", skip_serializing_if = "Option::is_none")]
    pub client_token: Option<String>,
    /// JSON document of fixed worker properties.
    #[serde(
        rename = "additionalFixedProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_fixed_properties: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkerFleetResponse {
    #[serde(rename = "arn", skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(rename = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

// ── Client ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RoboRunnerClient {
    client: AwsClient,
}

impl RoboRunnerClient {
    pub fn new(client: AwsClient) -> Self {
        Self { client }
    }

    pub fn endpoint(&self) -> String {
        self.client.endpoint(SERVICE)
    }

    pub async fn create_worker_fleet(
        &self,
        request: &CreateWorkerFleetRequest,
    ) -> AwsResult<CreateWorkerFleetResponse> {
        let body = serde_json::to_value(request)
            .map_err(|e| crate::error::AwsError::parse_error(SERVICE, 0, &e.to_string()))?;
        let response = self
            .client
            .rest_json_request(SERVICE, "POST", "/createWorkerFleet", Some(&body), BTreeMap::new())
            .await?;
        response.json(SERVICE)
    }
}

// ── Operation ───────────────────────────────────────────────────────────

pub static CREATE_WORKER_FLEET: OperationDescriptor = OperationDescriptor {
    service: SERVICE,
    operation: "CreateWorkerFleet",
    parameters: &[
        ParamSpec::new("Name", ParamKind::String).required().positional(0),
        ParamSpec::new("Site", ParamKind::String).required(),
        ParamSpec::new("ClientToken", ParamKind::String),
        ParamSpec::new("AdditionalFixedProperty", ParamKind::String)
            .aliased(&["AdditionalFixedProperties"]),
    ],
    response_fields: &["arn", "id", "createdAt", "updatedAt"],
    default_select: None,
    confirm_impact: ConfirmImpact::Medium,
};

pub struct CreateWorkerFleet;

#[async_trait]
impl ServiceOperation for CreateWorkerFleet {
    type Client = RoboRunnerClient;
    type Request = CreateWorkerFleetRequest;
    type Response = CreateWorkerFleetResponse;

    fn descriptor(&self) -> &'static OperationDescriptor {
        &CREATE_WORKER_FLEET
    }

    fn build_request(&self, ctx: &BoundContext) -> InvokeResult<CreateWorkerFleetRequest> {
        Ok(CreateWorkerFleetRequest {
            name: ctx.require_string("Name")?,
            site: ctx.require_string("Site")?,
            client_token: ctx.string("ClientToken")?,
            additional_fixed_properties: ctx.string("AdditionalFixedProperty")?,
        })
    }

    async fn call(
        &self,
        client: &RoboRunnerClient,
        request: CreateWorkerFleetRequest,
    ) -> InvokeResult<CreateWorkerFleetResponse> {
        client
            .create_worker_fleet(&request)
            .await
            .map_err(|e| e.with_operation("CreateWorkerFleet").into_invoke(&client.endpoint()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcmd_core::ContextBuilder;
    use serde_json::json;

    #[test]
    fn site_is_required_alongside_name() {
        let mut builder = ContextBuilder::new();
        builder.bind("Name", json!("Fleet-A"));
        let err = CREATE_WORKER_FLEET
            .validate_required(&builder.freeze())
            .unwrap_err();
        assert_eq!(err.to_string(), "required parameter 'Site' was not supplied");
    }

    #[test]
    fn request_uses_wire_names() {
        let mut builder = ContextBuilder::new();
        builder
            .bind("Name", json!("Fleet-A"))
            .bind("Site", json!("arn:aws:iotroborunner:us-east-1:123:site/s-1"))
            .bind("AdditionalFixedProperty", json!("{\"chargeLevel\":\"high\"}"));
        let request = CreateWorkerFleet.build_request(&builder.freeze()).unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["name"], json!("Fleet-A"));
        assert_eq!(
            body["additionalFixedProperties"],
            json!("{\"chargeLevel\":\"high\"}")
        );
        assert!(body.get("clientToken").is_none());
    }

    #[test]
    fn plural_alias_binds_to_singular_parameter() {
        assert_eq!(
            CREATE_WORKER_FLEET
                .resolve("AdditionalFixedProperties")
                .map(|s| s.name),
            Some("AdditionalFixedProperty")
        );
    }
}
