//! In-memory walker backend for unit tests
//!
//! Implements the six panel operations over a record list and one action
//! object, records every call, and can be told to fail an operation.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::protocol::{Operation, ParameterRecord, RecordPatch};

use super::{Transport, TransportResponse};

/// How an operation should fail
#[derive(Debug, Clone)]
pub enum Failure {
    Status(u16),
    Unreachable,
    /// 200 with the given body instead of the real payload
    Body(Value),
}

#[derive(Default)]
struct MockState {
    records: Vec<ParameterRecord>,
    action: Map<String, Value>,
    calls: Vec<(Operation, Value)>,
    failures: HashMap<Operation, Failure>,
    next_id: u32,
}

/// Cooperative in-memory backend
#[derive(Default)]
pub struct MockTransport {
    state: RwLock<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-seeded with `count` records `p1..pN`
    pub fn with_records(count: u32) -> Self {
        let mock = Self::new();
        {
            let mut state = mock.state.write();
            for n in 1..=count {
                state.records.push(ParameterRecord {
                    id: format!("p{}", n),
                    condition: format!("condition {}", n),
                    response: format!("response {}", n),
                    action: format!("action {}", n),
                    enabled: true,
                });
            }
            state.next_id = count;
        }
        mock
    }

    pub fn with_action(self, action: Value) -> Self {
        if let Value::Object(map) = action {
            self.state.write().action = map;
        }
        self
    }

    pub fn fail(&self, operation: Operation, failure: Failure) {
        self.state.write().failures.insert(operation, failure);
    }

    pub fn records(&self) -> Vec<ParameterRecord> {
        self.state.read().records.clone()
    }

    pub fn action(&self) -> Map<String, Value> {
        self.state.read().action.clone()
    }

    pub fn calls(&self) -> Vec<(Operation, Value)> {
        self.state.read().calls.clone()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.state
            .read()
            .calls
            .iter()
            .filter(|(op, _)| *op == operation)
            .count()
    }

    /// Pages requested by list_parameters calls, in order
    pub fn listed_pages(&self) -> Vec<u64> {
        self.state
            .read()
            .calls
            .iter()
            .filter(|(op, _)| *op == Operation::ListParameters)
            .filter_map(|(_, body)| body.get("page").and_then(Value::as_u64))
            .collect()
    }
}

fn ok(payload: Value) -> TransportResponse {
    TransportResponse {
        status: 200,
        body: json!({ "reports": [payload] }),
    }
}

fn bad_request(message: &str) -> TransportResponse {
    TransportResponse {
        status: 400,
        body: json!({ "error": message }),
    }
}

impl MockState {
    fn list(&self, body: &Value) -> TransportResponse {
        let page = body.get("page").and_then(Value::as_u64).unwrap_or(1).max(1) as usize;
        let per_page = body.get("per_page").and_then(Value::as_u64).unwrap_or(10).max(1) as usize;

        let total_pages = self.records.len().div_ceil(per_page).max(1);
        let page = page.min(total_pages);
        let items: Vec<&ParameterRecord> = self
            .records
            .iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .collect();

        ok(json!({
            "items": items,
            "page": page,
            "total_pages": total_pages,
            "has_previous": page > 1,
            "has_next": page < total_pages,
        }))
    }

    fn update(&mut self, body: &Value) -> TransportResponse {
        let Some(id) = body.get("id").and_then(Value::as_str) else {
            return bad_request("missing id");
        };
        let patch: RecordPatch = match body.get("data").cloned().map(serde_json::from_value) {
            Some(Ok(patch)) => patch,
            _ => return bad_request("invalid data"),
        };
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return TransportResponse {
                status: 404,
                body: json!({ "error": "parameter not found" }),
            };
        };

        if let Some(v) = patch.condition {
            record.condition = v;
        }
        if let Some(v) = patch.response {
            record.response = v;
        }
        if let Some(v) = patch.action {
            record.action = v;
        }
        if let Some(v) = patch.enabled {
            record.enabled = v;
        }
        ok(json!(true))
    }

    fn import(&mut self, body: &Value) -> TransportResponse {
        let Some(items) = body.get("data").and_then(Value::as_array) else {
            return bad_request("data must be a list");
        };
        for item in items {
            self.next_id += 1;
            let mut record = item.clone();
            if let Value::Object(ref mut map) = record {
                map.entry("id").or_insert_with(|| json!(format!("p{}", self.next_id)));
            }
            match serde_json::from_value::<ParameterRecord>(record) {
                Ok(r) => self.records.push(r),
                Err(_) => return bad_request("invalid parameter"),
            }
        }
        ok(json!(true))
    }

    fn update_action(&mut self, body: &Value) -> TransportResponse {
        let action_id = body.get("action_id").and_then(Value::as_str).unwrap_or_default().to_string();
        let Some(Value::Object(data)) = body.get("action_data") else {
            return bad_request("action_data must be an object");
        };
        self.action = data.clone();
        self.action.insert("id".into(), json!(action_id));
        ok(Value::Object(self.action.clone()))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, operation: Operation, body: Value) -> Result<TransportResponse> {
        let mut state = self.state.write();
        state.calls.push((operation, body.clone()));

        match state.failures.get(&operation).cloned() {
            Some(Failure::Unreachable) => {
                return Err(Error::transport(operation.name(), "connection refused"));
            }
            Some(Failure::Status(status)) => {
                return Ok(TransportResponse {
                    status,
                    body: json!({ "error": "injected failure" }),
                });
            }
            Some(Failure::Body(body)) => {
                return Ok(TransportResponse { status: 200, body });
            }
            None => {}
        }

        let response = match operation {
            Operation::ListParameters => state.list(&body),
            Operation::UpdateParameters => state.update(&body),
            Operation::ImportParameters => state.import(&body),
            Operation::DeleteCollection => {
                state.records.clear();
                ok(json!(true))
            }
            Operation::GetAction => ok(Value::Object(state.action.clone())),
            Operation::UpdateAction => state.update_action(&body),
        };
        Ok(response)
    }
}
