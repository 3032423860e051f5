//! Channel-format editor
//!
//! Holds the persona configuration object of one action. Directive edits and
//! other field changes are staged locally and committed by re-sending the
//! whole object through `update_action`.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::protocol::CHANNEL_FORMAT_KEY;

/// Staged persona configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelFormatEditor {
    config: Option<Map<String, Value>>,
    dirty: bool,
}

impl ChannelFormatEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_seeded(&self) -> bool {
        self.config.is_some()
    }

    /// Unsaved edits exist
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Seed from `get_action`. Only the first seed is kept so staged edits
    /// survive later loads; returns whether the object was adopted.
    pub fn seed(&mut self, config: Map<String, Value>) -> bool {
        if self.config.is_some() {
            return false;
        }
        self.config = Some(config);
        self.dirty = false;
        true
    }

    pub fn config(&self) -> Option<&Map<String, Value>> {
        self.config.as_ref()
    }

    /// Channels and their directive text, in configuration order
    pub fn channels(&self) -> Vec<(String, String)> {
        let Some(directives) = self.directives() else {
            return Vec::new();
        };
        directives
            .iter()
            .map(|(channel, directive)| {
                let text = match directive {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                (channel.clone(), text)
            })
            .collect()
    }

    /// Replace the directive of an existing channel
    pub fn edit_directive(&mut self, channel: &str, text: impl Into<String>) -> Result<()> {
        let directives = self
            .config
            .as_mut()
            .ok_or_else(not_loaded)?
            .get_mut(CHANNEL_FORMAT_KEY)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| Error::InvalidArgument("No channel formats available.".into()))?;

        let slot = directives
            .get_mut(channel)
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown channel: {}", channel)))?;
        *slot = Value::String(text.into());
        self.dirty = true;
        Ok(())
    }

    /// Stage any other top-level field of the configuration object
    pub fn set_field(&mut self, key: &str, value: Value) -> Result<()> {
        if key.is_empty() {
            return Err(Error::InvalidArgument("Field name must not be empty".into()));
        }
        if key == "id" {
            return Err(Error::InvalidArgument("The action id cannot be changed".into()));
        }
        if key == CHANNEL_FORMAT_KEY && !value.is_object() {
            return Err(Error::InvalidArgument(format!(
                "{} must be a mapping of channel to directive",
                CHANNEL_FORMAT_KEY
            )));
        }

        let config = self.config.as_mut().ok_or_else(not_loaded)?;
        config.insert(key.to_string(), value);
        self.dirty = true;
        Ok(())
    }

    /// The full object to send on commit
    pub fn snapshot(&self) -> Result<Map<String, Value>> {
        self.config.clone().ok_or_else(not_loaded)
    }

    /// Record a successful commit; staged content is now the saved content
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    fn directives(&self) -> Option<&Map<String, Value>> {
        self.config.as_ref()?.get(CHANNEL_FORMAT_KEY)?.as_object()
    }
}

fn not_loaded() -> Error {
    Error::InvalidArgument("Persona configuration has not been loaded".into())
}

/// `whatsapp_business` → `Whatsapp Business`
///
/// Underscores become spaces; a letter is uppercased when the character
/// before it is not a letter, so `web2chat` → `Web2Chat`.
pub fn snake_to_title(snake: &str) -> String {
    let mut title = String::with_capacity(snake.len());
    let mut after_letter = false;
    for c in snake.chars() {
        if c == '_' {
            title.push(' ');
            after_letter = false;
        } else if c.is_alphabetic() {
            if after_letter {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            title.push(c);
            after_letter = false;
        }
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> ChannelFormatEditor {
        let mut editor = ChannelFormatEditor::new();
        let config = json!({
            "id": "act-1",
            "enabled": true,
            "channel_format_directives": {
                "whatsapp": "Keep it short",
                "web_chat": "Use markdown"
            }
        });
        assert!(editor.seed(config.as_object().cloned().unwrap()));
        editor
    }

    #[test]
    fn test_snake_to_title() {
        assert_eq!(snake_to_title("whatsapp_business"), "Whatsapp Business");
        assert_eq!(snake_to_title("SMS"), "Sms");
        assert_eq!(snake_to_title("web"), "Web");
        assert_eq!(snake_to_title(""), "");
        assert_eq!(snake_to_title("web2chat"), "Web2Chat");
        assert_eq!(snake_to_title("web-chat"), "Web-Chat");
        assert_eq!(snake_to_title("line_v2"), "Line V2");
    }

    #[test]
    fn test_channels_in_order() {
        let channels = seeded().channels();
        assert_eq!(
            channels,
            vec![
                ("whatsapp".to_string(), "Keep it short".to_string()),
                ("web_chat".to_string(), "Use markdown".to_string()),
            ]
        );
    }

    #[test]
    fn test_backend_key_order_survives_commit() {
        let config: Map<String, Value> = serde_json::from_str(
            r#"{"id": "act-1", "channel_format_directives": {"whatsapp": "a", "email": "b", "sms": "c"}}"#,
        )
        .unwrap();
        let mut editor = ChannelFormatEditor::new();
        editor.seed(config);
        editor.edit_directive("email", "Formal").unwrap();

        let names: Vec<String> = editor.channels().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["whatsapp", "email", "sms"]);

        let sent = serde_json::to_string(&editor.snapshot().unwrap()).unwrap();
        assert_eq!(
            sent,
            r#"{"id":"act-1","channel_format_directives":{"whatsapp":"a","email":"Formal","sms":"c"}}"#
        );
    }

    #[test]
    fn test_seed_only_once() {
        let mut editor = seeded();
        editor.edit_directive("whatsapp", "Be brief").unwrap();

        assert!(!editor.seed(Map::new()));
        assert!(editor.is_dirty());
        assert_eq!(
            editor.snapshot().unwrap()["channel_format_directives"]["whatsapp"],
            json!("Be brief")
        );
    }

    #[test]
    fn test_edit_keeps_rest_of_object() {
        let mut editor = seeded();
        editor.edit_directive("web_chat", "Plain text only").unwrap();

        let snapshot = editor.snapshot().unwrap();
        assert_eq!(snapshot["id"], json!("act-1"));
        assert_eq!(snapshot["enabled"], json!(true));
        assert_eq!(
            snapshot["channel_format_directives"]["whatsapp"],
            json!("Keep it short")
        );
    }

    #[test]
    fn test_unknown_channel_rejected() {
        let mut editor = seeded();
        assert!(editor.edit_directive("telegram", "x").is_err());
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_unseeded_editor() {
        let mut editor = ChannelFormatEditor::new();
        assert!(editor.channels().is_empty());
        assert!(editor.snapshot().is_err());
        assert!(editor.edit_directive("whatsapp", "x").is_err());
    }

    #[test]
    fn test_set_field() {
        let mut editor = seeded();
        editor.set_field("description", json!("Support persona")).unwrap();
        assert_eq!(editor.snapshot().unwrap()["description"], json!("Support persona"));

        assert!(editor.set_field("id", json!("other")).is_err());
        assert!(editor.set_field(CHANNEL_FORMAT_KEY, json!("flat")).is_err());

        editor.mark_saved();
        assert!(!editor.is_dirty());
    }
}
