use super::types::{
    CreateResponseRequest, InputItem, InputTokenCount, InputTokensRequest, ListInputItemsParams,
    ResponseDeleted, ResponseObject, RetrieveResponseParams,
};
use crate::streaming::EventStream;
use crate::transport::{QueryParams, Transport};
use crate::types::{ApiObject, ListPage};
use crate::utils::require_id;
use crate::Result;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

const RESPONSES_PATH: &str = "/v1/responses";

/// Responses resource.
#[derive(Clone)]
pub struct Responses {
    transport: Arc<dyn Transport>,
}

impl Responses {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Create a response and wait for the full object.
    pub async fn create(&self, request: &CreateResponseRequest) -> Result<ResponseObject> {
        let body = request.to_body()?;
        let value = self.transport.post_json(RESPONSES_PATH, body).await?;
        let response = ResponseObject::from_value(value)?;
        debug!(
            response_id = response.id.as_str(),
            status = response.status.as_str(),
            "response created"
        );
        Ok(response)
    }

    /// Create a response and stream its events. `stream` is always sent as `true`.
    pub async fn create_stream(&self, request: &CreateResponseRequest) -> Result<EventStream> {
        let mut body = request.to_body()?;
        if let Value::Object(map) = &mut body {
            map.insert("stream".to_string(), Value::Bool(true));
        }
        info!(model = request.model.as_deref().unwrap_or(""), "opening response stream");
        let bytes = self.transport.post_stream(RESPONSES_PATH, body).await?;
        Ok(EventStream::from_bytes(bytes))
    }

    /// Fetch a stored response.
    pub async fn retrieve(
        &self,
        response_id: &str,
        params: &RetrieveResponseParams,
    ) -> Result<ResponseObject> {
        let id = require_id("response_id", response_id)?;
        let mut query = QueryParams::new();
        for include in &params.include {
            query.push("include", include);
        }
        query
            .push_opt("include_obfuscation", params.include_obfuscation)
            .push_opt("starting_after", params.starting_after);
        let value = self
            .transport
            .get_json(&format!("{}/{}", RESPONSES_PATH, id), &query)
            .await?;
        ResponseObject::from_value(value)
    }

    /// Delete a stored response.
    pub async fn delete(&self, response_id: &str) -> Result<ResponseDeleted> {
        let id = require_id("response_id", response_id)?;
        let value = self
            .transport
            .delete(&format!("{}/{}", RESPONSES_PATH, id), &QueryParams::new())
            .await?;
        ResponseDeleted::from_value(value)
    }

    /// Cancel a background response.
    pub async fn cancel(&self, response_id: &str) -> Result<ResponseObject> {
        let id = require_id("response_id", response_id)?;
        let value = self
            .transport
            .post_json(&format!("{}/{}/cancel", RESPONSES_PATH, id), json!({}))
            .await?;
        ResponseObject::from_value(value)
    }

    /// One page of the input items a response was created from.
    pub async fn list_input_items(
        &self,
        response_id: &str,
        params: &ListInputItemsParams,
    ) -> Result<ListPage<InputItem>> {
        let id = require_id("response_id", response_id)?;
        let mut query = QueryParams::new();
        query.push_opt("after", params.after.as_deref());
        for include in &params.include {
            query.push("include", include);
        }
        query
            .push_opt("limit", params.limit)
            .push_opt("order", params.order.as_deref());
        let value = self
            .transport
            .get_json(&format!("{}/{}/input_items", RESPONSES_PATH, id), &query)
            .await?;
        ListPage::from_value(value)
    }

    /// Count input tokens for a hypothetical request without generating anything.
    pub async fn input_tokens(&self, request: &InputTokensRequest) -> Result<InputTokenCount> {
        let value = self
            .transport
            .post_json(&format!("{}/input_tokens", RESPONSES_PATH), request.to_body()?)
            .await?;
        InputTokenCount::from_value(value)
    }
}
