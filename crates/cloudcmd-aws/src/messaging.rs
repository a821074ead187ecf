//! Chime SDK Messaging channel operations.
//!
//! REST-JSON protocol against the messaging data plane
//! (`messaging-chime.{region}`). The caller acts on behalf of an app
//! instance user passed in the `x-amz-chime-bearer` header.
//!
//! Reference: <https://docs.aws.amazon.com/chime-sdk/latest/APIReference/>

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cloudcmd_core::{
    BoundContext, ConfirmImpact, InvokeResult, OperationDescriptor, ParamKind, ParamSpec,
    ServiceOperation,
};

use crate::client::AwsClient;
use crate::error::AwsResult;
use crate::signing::uri_encode;

const SERVICE: &str = "chime";

// ── Types ───────────────────────────────────────────────────────────────

/// Mobile push fan-out attached to a channel message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushNotificationConfiguration {
    #[serde(rename = "Body", skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(rename = "Title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub push_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageAttributeValue {
    #[serde(rename = "StringValues")]
    pub string_values: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendChannelMessageRequest {
    /// Path member, not part of the body.
    #[serde(skip)]
    pub channel_arn: String,
    /// Header member (`x-amz-chime-bearer`).
    #[serde(skip)]
    pub chime_bearer: String,
    #[serde(rename = "ClientRequestToken")]
    pub client_request_token: String,
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(rename = "Metadata", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    /// `PERSISTENT` or `NON_PERSISTENT`.
    #[serde(rename = "Persistence")]
    pub persistence: String,
    /// `STANDARD` or `CONTROL`.
    #[serde(rename = "Type")]
    pub message_type: String,
    #[serde(rename = "PushNotification", skip_serializing_if = "Option::is_none")]
    pub push_notification: Option<PushNotificationConfiguration>,
    #[serde(rename = "MessageAttributes", skip_serializing_if = "Option::is_none")]
    pub message_attributes: Option<BTreeMap<String, MessageAttributeValue>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessageStatus {
    #[serde(rename = "Value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "Detail", skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendChannelMessageResponse {
    #[serde(rename = "ChannelArn", skip_serializing_if = "Option::is_none")]
    pub channel_arn: Option<String>,
    #[serde(rename = "MessageId", skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<ChannelMessageStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteChannelMessageRequest {
    pub channel_arn: String,
    pub message_id: String,
    pub chime_bearer: Option<String>,
}

/// Void response; serializes to null so the default selection emits nothing.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DeleteChannelMessageResponse;

// ── Client ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MessagingClient {
    client: AwsClient,
}

impl MessagingClient {
    pub fn new(client: AwsClient) -> Self {
        Self { client }
    }

    pub fn endpoint(&self) -> String {
        self.client.endpoint(SERVICE)
    }

    pub async fn send_channel_message(
        &self,
        request: &SendChannelMessageRequest,
    ) -> AwsResult<SendChannelMessageResponse> {
        let path = format!("/channels/{}/messages", uri_encode(&request.channel_arn));
        let mut headers = BTreeMap::new();
        headers.insert(
            "x-amz-chime-bearer".to_string(),
            request.chime_bearer.clone(),
        );
        let body = serde_json::to_value(request)
            .map_err(|e| crate::error::AwsError::parse_error(SERVICE, 0, &e.to_string()))?;
        let response = self
            .client
            .rest_json_request(SERVICE, "POST", &path, Some(&body), headers)
            .await?;
        response.json(SERVICE)
    }

    pub async fn delete_channel_message(
        &self,
        request: &DeleteChannelMessageRequest,
    ) -> AwsResult<()> {
        let path = format!(
            "/channels/{}/messages/{}",
            uri_encode(&request.channel_arn),
            uri_encode(&request.message_id)
        );
        let mut headers = BTreeMap::new();
        if let Some(bearer) = &request.chime_bearer {
            headers.insert("x-amz-chime-bearer".to_string(), bearer.clone());
        }
        self.client
            .rest_json_request(SERVICE, "DELETE", &path, None, headers)
            .await?;
        Ok(())
    }
}

// ── Operations ──────────────────────────────────────────────────────────

pub static SEND_CHANNEL_MESSAGE: OperationDescriptor = OperationDescriptor {
    service: SERVICE,
    operation: "SendChannelMessage",
    parameters: &[
        ParamSpec::new("ChannelArn", ParamKind::String).required().positional(0),
        ParamSpec::new("ChimeBearer", ParamKind::String).required(),
        ParamSpec::new("Content", ParamKind::String).required(),
        ParamSpec::new("Persistence", ParamKind::String).required(),
        ParamSpec::new("Type", ParamKind::String).required(),
        ParamSpec::new("Metadata", ParamKind::String),
        ParamSpec::new("ClientRequestToken", ParamKind::String),
        ParamSpec::new("MessageAttribute", ParamKind::StringMap).aliased(&["MessageAttributes"]),
        ParamSpec::new("PushNotification_Body", ParamKind::String)
            .grouped("PushNotification"),
        ParamSpec::new("PushNotification_Title", ParamKind::String)
            .grouped("PushNotification"),
        ParamSpec::new("PushNotification_Type", ParamKind::String)
            .grouped("PushNotification"),
    ],
    response_fields: &["ChannelArn", "MessageId", "Status"],
    default_select: None,
    confirm_impact: ConfirmImpact::Medium,
};

pub struct SendChannelMessage;

#[async_trait]
impl ServiceOperation for SendChannelMessage {
    type Client = MessagingClient;
    type Request = SendChannelMessageRequest;
    type Response = SendChannelMessageResponse;

    fn descriptor(&self) -> &'static OperationDescriptor {
        &SEND_CHANNEL_MESSAGE
    }

    fn build_request(&self, ctx: &BoundContext) -> InvokeResult<SendChannelMessageRequest> {
        let push_notification = {
            let body = ctx.string("PushNotification_Body")?;
            let title = ctx.string("PushNotification_Title")?;
            let push_type = ctx.string("PushNotification_Type")?;
            if body.is_none() && title.is_none() && push_type.is_none() {
                None
            } else {
                Some(PushNotificationConfiguration {
                    body,
                    title,
                    push_type,
                })
            }
        };

        let message_attributes = ctx.string_map("MessageAttribute")?.map(|entries| {
            entries
                .into_iter()
                .map(|(name, value)| {
                    (
                        name,
                        MessageAttributeValue {
                            string_values: vec![value],
                        },
                    )
                })
                .collect()
        });

        Ok(SendChannelMessageRequest {
            channel_arn: ctx.require_string("ChannelArn")?,
            chime_bearer: ctx.require_string("ChimeBearer")?,
            // Idempotency token, generated when not supplied.
            client_request_token: ctx
                .string("ClientRequestToken")?
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            content: ctx.require_string("Content")?,
            metadata: ctx.string("Metadata")?,
            persistence: ctx.require_string("Persistence")?,
            message_type: ctx.require_string("Type")?,
            push_notification,
            message_attributes,
        })
    }

    async fn call(
        &self,
        client: &MessagingClient,
        request: SendChannelMessageRequest,
    ) -> InvokeResult<SendChannelMessageResponse> {
        client
            .send_channel_message(&request)
            .await
            .map_err(|e| e.with_operation("SendChannelMessage").into_invoke(&client.endpoint()))
    }
}

pub static DELETE_CHANNEL_MESSAGE: OperationDescriptor = OperationDescriptor {
    service: SERVICE,
    operation: "DeleteChannelMessage",
    parameters: &[
        ParamSpec::new("ChannelArn", ParamKind::String).required().positional(0),
        ParamSpec::new("MessageId", ParamKind::String).required(),
        ParamSpec::new("ChimeBearer", ParamKind::String),
    ],
    response_fields: &[],
    default_select: None,
    confirm_impact: ConfirmImpact::High,
};

pub struct DeleteChannelMessage;

#[async_trait]
impl ServiceOperation for DeleteChannelMessage {
    type Client = MessagingClient;
    type Request = DeleteChannelMessageRequest;
    type Response = DeleteChannelMessageResponse;

    fn descriptor(&self) -> &'static OperationDescriptor {
        &DELETE_CHANNEL_MESSAGE
    }

    fn build_request(&self, ctx: &BoundContext) -> InvokeResult<DeleteChannelMessageRequest> {
        Ok(DeleteChannelMessageRequest {
            channel_arn: ctx.require_string("ChannelArn")?,
            message_id: ctx.require_string("MessageId")?,
            chime_bearer: ctx.string("ChimeBearer")?,
        })
    }

    async fn call(
        &self,
        client: &MessagingClient,
        request: DeleteChannelMessageRequest,
    ) -> InvokeResult<DeleteChannelMessageResponse> {
        client
            .delete_channel_message(&request)
            .await
            .map_err(|e| {
                e.with_operation("DeleteChannelMessage")
                    .into_invoke(&client.endpoint())
            })?;
        Ok(DeleteChannelMessageResponse)
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
            .bind("ChannelArn", json!("arn:aws:chime:us-east-1:123:channel/abc"))
            .bind("ChimeBearer", json!("arn:aws:chime:us-east-1:123:app-instance-user/u1"))
            .bind("Content", json!("hello"))
            .bind("Persistence", json!("PERSISTENT"))
            .bind("Type", json!("STANDARD"));
        builder
    }

    #[test]
    fn push_group_absent_when_no_member_supplied() {
        let ctx = required_context().freeze();
        let request = SendChannelMessage.build_request(&ctx).unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("PushNotification").is_none());
        assert!(body.get("MessageAttributes").is_none());
        assert_eq!(body["Content"], json!("hello"));
    }

    #[test]
    fn push_group_contains_exactly_supplied_members() {
        let mut builder = required_context();
        builder.bind("PushNotification_Title", json!("ping"));
        let request = SendChannelMessage.build_request(&builder.freeze()).unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["PushNotification"], json!({"Title": "ping"}));
    }

    #[test]
    fn client_request_token_is_generated_when_absent() {
        let ctx = required_context().freeze();
        let request = SendChannelMessage.build_request(&ctx).unwrap();
        assert!(!request.client_request_token.is_empty());

        let mut builder = required_context();
        builder.bind("ClientRequestToken", json!("tok-1"));
        let request = SendChannelMessage.build_request(&builder.freeze()).unwrap();
        assert_eq!(request.client_request_token, "tok-1");
    }

    #[test]
    fn message_attributes_wrap_into_string_values() {
        let mut builder = required_context();
        builder.bind("MessageAttribute", json!({"priority": "high"}));
        let request = SendChannelMessage.build_request(&builder.freeze()).unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body["MessageAttributes"],
            json!({"priority": {"StringValues": ["high"]}})
        );
    }

    #[test]
    fn delete_descriptor_is_high_impact() {
        assert_eq!(DELETE_CHANNEL_MESSAGE.confirm_impact, ConfirmImpact::High);
        assert!(DELETE_CHANNEL_MESSAGE.resolve("MessageId").is_some());
    }

    #[test]
    fn path_members_stay_out_of_the_body() {
        let ctx = required_context().freeze();
        let request = SendChannelMessage.build_request(&ctx).unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("channel_arn").is_none());
        assert!(body.get("ChannelArn").is_none());
    }
}
