//! Amazon Location Service place-index search.
//!
//! REST-JSON protocol against `geo.{region}`. Suggestions are the
//! typeahead variant of place search: partial text in, ranked suggestion
//! strings out.

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

const SERVICE: &str = "geo";

// ── Types ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SearchPlaceIndexForSuggestionsRequest {
    /// Path member, not part of the body.
    #[serde(skip)]
    pub index_name: String,
    #[serde(rename = "Text")]
    pub text: String,
    /// `[longitude, latitude]` to bias results around.
    #[serde(rename = "BiasPosition", skip_serializing_if = "Option::is_none")]
    pub bias_position: Option<Vec<f64>>,
    /// `[west, south, east, north]` bounding box filter.
    #[serde(rename = "FilterBBox", skip_serializing_if = "Option::is_none")]
    pub filter_bbox: Option<Vec<f64>>,
    /// ISO 3166 country codes.
    #[serde(rename = "FilterCountries", skip_serializing_if = "Option::is_none")]
    pub filter_countries: Option<Vec<String>>,
    #[serde(rename = "Language", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(rename = "MaxResults", skip_serializing_if = "Option::is_none")]
    pub max_results: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchForSuggestionsResult {
    #[serde(rename = "Text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "PlaceId", skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPlaceIndexForSuggestionsSummary {
    #[serde(rename = "Text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "MaxResults", skip_serializing_if = "Option::is_none")]
    pub max_results: Option<i32>,
    #[serde(rename = "DataSource", skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(rename = "Language", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPlaceIndexForSuggestionsResponse {
    #[serde(rename = "Results", default)]
    pub results: Vec<SearchForSuggestionsResult>,
    #[serde(rename = "Summary", skip_serializing_if = "Option::is_none")]
    pub summary: Option<SearchPlaceIndexForSuggestionsSummary>,
}

// ── Client ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LocationClient {
    client: AwsClient,
}

impl LocationClient {
    pub fn new(client: AwsClient) -> Self {
        Self { client }
    }

    pub fn endpoint(&self) -> String {
        self.client.endpoint(SERVICE)
    }

    pub async fn search_place_index_for_suggestions(
        &self,
        request: &SearchPlaceIndexForSuggestionsRequest,
    ) -> AwsResult<SearchPlaceIndexForSuggestionsResponse> {
        let path = format!(
            "/places/v0/indexes/{}/search/suggestions",
            uri_encode(&request.index_name)
        );
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

pub static SEARCH_PLACE_INDEX_FOR_SUGGESTIONS: OperationDescriptor = OperationDescriptor {
    service: SERVICE,
    operation: "SearchPlaceIndexForSuggestions",
    parameters: &[
        ParamSpec::new("IndexName", ParamKind::String).required().positional(0),
        ParamSpec::new("Text", ParamKind::String).required(),
        ParamSpec::new("BiasPosition", ParamKind::DoubleList),
        ParamSpec::new("FilterBBox", ParamKind::DoubleList),
        ParamSpec::new("FilterCountry", ParamKind::StringList).aliased(&["FilterCountries"]),
        ParamSpec::new("Language", ParamKind::String),
        ParamSpec::new("MaxResult", ParamKind::Integer).aliased(&["MaxResults"]),
    ],
    response_fields: &["Results", "Summary"],
    default_select: Some("Results"),
    confirm_impact: ConfirmImpact::None,
};

pub struct SearchPlaceIndexForSuggestions;

#[async_trait]
impl ServiceOperation for SearchPlaceIndexForSuggestions {
    type Client = LocationClient;
    type Request = SearchPlaceIndexForSuggestionsRequest;
    type Response = SearchPlaceIndexForSuggestionsResponse;

    fn descriptor(&self) -> &'static OperationDescriptor {
        &SEARCH_PLACE_INDEX_FOR_SUGGESTIONS
    }

    fn build_request(
        &self,
        ctx: &BoundContext,
    ) -> InvokeResult<SearchPlaceIndexForSuggestionsRequest> {
        Ok(SearchPlaceIndexForSuggestionsRequest {
            index_name: ctx.require_string("IndexName")?,
            text: ctx.require_string("Text")?,
            bias_position: ctx.double_list("BiasPosition")?,
            filter_bbox: ctx.double_list("FilterBBox")?,
            filter_countries: ctx.string_list("FilterCountry")?,
            language: ctx.string("Language")?,
            max_results: ctx.integer("MaxResult")?,
        })
    }

    async fn call(
        &self,
        client: &LocationClient,
        request: SearchPlaceIndexForSuggestionsRequest,
    ) -> InvokeResult<SearchPlaceIndexForSuggestionsResponse> {
        client
            .search_place_index_for_suggestions(&request)
            .await
            .map_err(|e| {
                e.with_operation("SearchPlaceIndexForSuggestions")
                    .into_invoke(&client.endpoint())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcmd_core::ContextBuilder;
    use serde_json::json;

    #[test]
    fn optional_filters_are_omitted_not_defaulted() {
        let mut builder = ContextBuilder::new();
        builder
            .bind("IndexName", json!("places-index"))
            .bind("Text", json!("Mont"));
        let request = SearchPlaceIndexForSuggestions
            .build_request(&builder.freeze())
            .unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body, json!({"Text": "Mont"}));
    }

    #[test]
    fn alias_and_list_binding() {
        let mut builder = ContextBuilder::new();
        builder
            .bind("IndexName", json!("places-index"))
            .bind("Text", json!("Mont"))
            .bind("BiasPosition", json!([-73.98, 40.74]))
            .bind("FilterCountry", json!(["FRA", "CHE"]))
            .bind("MaxResult", json!(5));
        let request = SearchPlaceIndexForSuggestions
            .build_request(&builder.freeze())
            .unwrap();
        assert_eq!(request.bias_position, Some(vec![-73.98, 40.74]));
        assert_eq!(
            request.filter_countries,
            Some(vec!["FRA".to_string(), "CHE".to_string()])
        );
        assert_eq!(request.max_results, Some(5));
    }

    #[test]
    fn results_parse_from_wire_shape() {
        let wire = json!({
            "Results": [
                {"Text": "Montreal, QC, Canada", "PlaceId": "p-1"},
                {"Text": "Montpellier, France"}
            ],
            "Summary": {"Text": "Mont", "MaxResults": 5, "DataSource": "Esri"}
        });
        let response: SearchPlaceIndexForSuggestionsResponse =
            serde_json::from_value(wire).unwrap();
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[1].place_id, None);
    }
}
