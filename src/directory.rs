//! Parameter directory client
//!
//! Typed wrapper over the persona interact walker operations. Every call
//! succeeds only on HTTP 200; payloads are validated into protocol structs
//! and a 200 with the wrong shape is reported as a backend error.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::protocol::{
    reports_payload, ActionObject, DeleteCollectionRequest, GetActionRequest,
    ImportParametersRequest, ListParametersRequest, Operation, ParameterPage, RecordPatch,
    UpdateActionRequest, UpdateParametersRequest,
};
use crate::transport::{Transport, TransportResponse};

/// Client for one backend; cheap to clone
#[derive(Clone)]
pub struct ParameterDirectory {
    transport: Arc<dyn Transport>,
}

impl ParameterDirectory {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch one page of parameters. `page` and `per_page` start at 1.
    pub async fn list(&self, agent_id: &str, page: u32, per_page: u32) -> Result<ParameterPage> {
        if page < 1 || per_page < 1 {
            return Err(Error::InvalidArgument(format!(
                "page and per_page must be at least 1 (got page={}, per_page={})",
                page, per_page
            )));
        }

        let request = ListParametersRequest {
            agent_id,
            page,
            per_page,
            reporting: true,
        };
        let response = self.send(Operation::ListParameters, &request).await?;
        let page: ParameterPage = decode_payload(Operation::ListParameters, response)?;

        debug!(
            agent_id,
            page = page.page,
            total_pages = page.total_pages,
            items = page.items.len(),
            "Parameter page loaded"
        );
        Ok(page)
    }

    /// Apply a sparse patch to one record
    pub async fn update(&self, agent_id: &str, record_id: &str, patch: &RecordPatch) -> Result<()> {
        let request = UpdateParametersRequest {
            agent_id,
            id: record_id,
            data: patch,
            reporting: true,
        };
        self.send(Operation::UpdateParameters, &request).await?;
        info!(agent_id, record_id, "Parameter updated");
        Ok(())
    }

    /// Send every record in a single import request
    pub async fn import_many(&self, agent_id: &str, records: &[Map<String, Value>]) -> Result<()> {
        let request = ImportParametersRequest {
            agent_id,
            data: records,
        };
        self.send(Operation::ImportParameters, &request).await?;
        info!(agent_id, count = records.len(), "Parameters imported");
        Ok(())
    }

    /// Delete every parameter (and derived embeddings) of the agent
    pub async fn purge_all(&self, agent_id: &str) -> Result<()> {
        self.send(Operation::DeleteCollection, &DeleteCollectionRequest { agent_id })
            .await?;
        warn!(agent_id, "Parameter collection purged");
        Ok(())
    }

    /// Fetch the persona configuration object of an action
    pub async fn get_action(&self, agent_id: &str, action_id: &str) -> Result<Map<String, Value>> {
        let response = self
            .send(Operation::GetAction, &GetActionRequest { agent_id, action_id })
            .await?;
        match reports_payload(response.body) {
            Value::Object(map) => Ok(map),
            other => Err(Error::backend_malformed(
                Operation::GetAction.name(),
                format!("expected an action object, got {}", json_kind(&other)),
            )),
        }
    }

    /// Re-submit the entire configuration object of an action.
    ///
    /// The save only counts when the backend echoes back the same action id.
    pub async fn update_action(
        &self,
        agent_id: &str,
        action_id: &str,
        action_data: &Map<String, Value>,
    ) -> Result<ActionObject> {
        let request = UpdateActionRequest {
            agent_id,
            action_id,
            action_data,
        };
        let response = self.send(Operation::UpdateAction, &request).await?;
        let action: ActionObject = decode_payload(Operation::UpdateAction, response)?;

        if action.id != action_id {
            return Err(Error::ActionMismatch {
                expected: action_id.to_string(),
                actual: action.id,
            });
        }

        info!(agent_id, action_id, "Action configuration saved");
        Ok(action)
    }

    /// Serialize, call, and require HTTP 200
    async fn send<R: Serialize>(&self, operation: Operation, request: &R) -> Result<TransportResponse> {
        let body = serde_json::to_value(request)?;
        let response = self.transport.call(operation, body).await?;

        if !response.is_ok() {
            warn!(operation = %operation, status = response.status, "Backend call failed");
            return Err(Error::backend_status(
                operation.name(),
                response.status,
                response.body_excerpt(),
            ));
        }

        Ok(response)
    }
}

fn decode_payload<T: DeserializeOwned>(operation: Operation, response: TransportResponse) -> Result<T> {
    serde_json::from_value(reports_payload(response.body))
        .map_err(|e| Error::backend_malformed(operation.name(), e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
