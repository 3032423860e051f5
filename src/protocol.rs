//! Wire schemas for the persona interact walker API
//!
//! Every backend call is `POST {base}/{endpoint}` with one of the request
//! bodies below. Responses are validated into typed structs at the boundary.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder shown for absent record text fields
pub const MISSING_FIELD: &str = "N/A";

/// Configuration key holding the channel → directive mapping
pub const CHANNEL_FORMAT_KEY: &str = "channel_format_directives";

// ─────────────────────────────────────────────────────────────────
// Operations
// ─────────────────────────────────────────────────────────────────

/// Backend operations consumed by the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListParameters,
    UpdateParameters,
    ImportParameters,
    DeleteCollection,
    GetAction,
    UpdateAction,
}

impl Operation {
    /// Endpoint path relative to the backend base URL
    pub fn endpoint(&self) -> &'static str {
        match self {
            Operation::ListParameters => "action/walker/persona_interact_action/list_parameters",
            Operation::UpdateParameters => "action/walker/persona_interact_action/update_parameters",
            Operation::ImportParameters => "action/walker/persona_interact_action/import_parameters",
            Operation::DeleteCollection => "action/walker/persona_interact_action/delete_collection",
            Operation::GetAction => "walker/get_action",
            Operation::UpdateAction => "walker/update_action",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::ListParameters => "list_parameters",
            Operation::UpdateParameters => "update_parameters",
            Operation::ImportParameters => "import_parameters",
            Operation::DeleteCollection => "delete_collection",
            Operation::GetAction => "get_action",
            Operation::UpdateAction => "update_action",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────

fn missing_field() -> String {
    MISSING_FIELD.to_string()
}

fn default_true() -> bool {
    true
}

fn default_page() -> u32 {
    1
}

/// A condition/response/action rule scoped to an agent's persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub id: String,

    #[serde(default = "missing_field")]
    pub condition: String,

    #[serde(default = "missing_field")]
    pub response: String,

    #[serde(default = "missing_field")]
    pub action: String,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Sparse update; `None` fields are left untouched by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl RecordPatch {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.condition.is_none()
            && self.response.is_none()
            && self.action.is_none()
            && self.enabled.is_none()
    }
}

/// Text fields as edited by the operator; `None` means "not touched"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    pub condition: Option<String>,
    pub response: Option<String>,
    pub action: Option<String>,
}

impl RecordDraft {
    /// Patch containing only the fields that differ from `record`
    pub fn diff(&self, record: &ParameterRecord) -> RecordPatch {
        fn changed(draft: &Option<String>, current: &str) -> Option<String> {
            draft.as_ref().filter(|v| v.as_str() != current).cloned()
        }

        RecordPatch {
            condition: changed(&self.condition, &record.condition),
            response: changed(&self.response, &record.response),
            action: changed(&self.action, &record.action),
            enabled: None,
        }
    }
}

/// One page of the parameter directory, as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterPage {
    #[serde(default)]
    pub items: Vec<ParameterRecord>,

    #[serde(default = "default_page")]
    pub page: u32,

    #[serde(default = "default_page")]
    pub total_pages: u32,

    #[serde(default)]
    pub has_previous: bool,

    #[serde(default)]
    pub has_next: bool,
}

impl ParameterPage {
    pub fn find(&self, id: &str) -> Option<&ParameterRecord> {
        self.items.iter().find(|r| r.id == id)
    }
}

// ─────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ListParametersRequest<'a> {
    pub agent_id: &'a str,
    pub page: u32,
    pub per_page: u32,
    pub reporting: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateParametersRequest<'a> {
    pub agent_id: &'a str,
    pub id: &'a str,
    pub data: &'a RecordPatch,
    pub reporting: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportParametersRequest<'a> {
    pub agent_id: &'a str,
    pub data: &'a [Map<String, Value>],
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteCollectionRequest<'a> {
    pub agent_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetActionRequest<'a> {
    pub agent_id: &'a str,
    pub action_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateActionRequest<'a> {
    pub agent_id: &'a str,
    pub action_id: &'a str,
    pub action_data: &'a Map<String, Value>,
}

// ─────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────

/// Action object returned by get_action / update_action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionObject {
    #[serde(default)]
    pub id: String,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Unwrap the walker `{"reports": [...]}` envelope.
///
/// Returns the first report when the envelope is present, `Null` when it is
/// present but empty, and the body itself otherwise.
pub fn reports_payload(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("reports") => match map.remove("reports") {
            Some(Value::Array(reports)) => reports.into_iter().next().unwrap_or(Value::Null),
            Some(other) => other,
            None => Value::Null,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_defaults() {
        let record: ParameterRecord = serde_json::from_value(json!({"id": "p1"})).unwrap();
        assert_eq!(record.condition, "N/A");
        assert_eq!(record.response, "N/A");
        assert_eq!(record.action, "N/A");
        assert!(record.enabled);
    }

    #[test]
    fn test_page_defaults() {
        let page: ParameterPage = serde_json::from_value(json!({})).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_previous);
        assert!(!page.has_next);
    }

    #[test]
    fn test_page_rejects_wrong_shape() {
        let result = serde_json::from_value::<ParameterPage>(json!({"items": "nope"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_is_sparse() {
        let value = serde_json::to_value(RecordPatch::enabled(false)).unwrap();
        assert_eq!(value, json!({"enabled": false}));
    }

    #[test]
    fn test_draft_diff_only_changed_fields() {
        let record = ParameterRecord {
            id: "p1".into(),
            condition: "user greets".into(),
            response: "say hello".into(),
            action: "none".into(),
            enabled: true,
        };
        let draft = RecordDraft {
            condition: Some("user greets".into()),
            response: Some("say hi".into()),
            action: None,
        };

        let patch = draft.diff(&record);
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"response": "say hi"}));

        let unchanged = RecordDraft {
            condition: Some("user greets".into()),
            ..Default::default()
        };
        assert!(unchanged.diff(&record).is_empty());
    }

    #[test]
    fn test_list_request_shape() {
        let req = ListParametersRequest {
            agent_id: "a1",
            page: 2,
            per_page: 10,
            reporting: true,
        };
        assert_eq!(
            serde_json::to_value(req).unwrap(),
            json!({"agent_id": "a1", "page": 2, "per_page": 10, "reporting": true})
        );
    }

    #[test]
    fn test_reports_payload() {
        assert_eq!(reports_payload(json!({"reports": [{"a": 1}, {"b": 2}]})), json!({"a": 1}));
        assert_eq!(reports_payload(json!({"reports": []})), Value::Null);
        assert_eq!(reports_payload(json!({"items": []})), json!({"items": []}));
    }

    #[test]
    fn test_action_object_keeps_fields() {
        let obj: ActionObject = serde_json::from_value(json!({
            "id": "act-1",
            "enabled": true,
            "channel_format_directives": {"whatsapp": "plain"}
        }))
        .unwrap();
        assert_eq!(obj.id, "act-1");
        assert!(obj.fields.contains_key(CHANNEL_FORMAT_KEY));
        assert!(!obj.fields.contains_key("id"));
    }

    #[test]
    fn test_operation_endpoints() {
        assert_eq!(
            Operation::DeleteCollection.endpoint(),
            "action/walker/persona_interact_action/delete_collection"
        );
        assert_eq!(Operation::UpdateAction.endpoint(), "walker/update_action");
        assert_eq!(Operation::ListParameters.to_string(), "list_parameters");
    }
}
