//! Wire types shared by the relay, the projector and the conversation
//!
//! `Message` mirrors the shape the planning agent accepts as `new_message`.
//! `AgentEvent` is the agent's own per-turn event record; only the fields this
//! crate consumes are modelled, everything else rides along untouched.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::ClientError;

/// Conversation role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One fragment of a message
///
/// Only `text` is interpreted. Other part kinds (function calls, inline data)
/// are kept in `extra` as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            extra: serde_json::Map::new(),
        }
    }

    /// Text of this part, empty for non-text parts
    pub fn as_text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    /// Create a user message with a single text part
    pub fn user(text: impl Into<String>) -> Self {
        debug!("Message::user: called");
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    /// Create a model message with a single text part
    pub fn model(text: impl Into<String>) -> Self {
        debug!("Message::model: called");
        Self {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenate the text of all parts in order
    pub fn text(&self) -> String {
        self.parts.iter().map(Part::as_text).collect()
    }
}

/// Content carried by an agent event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One event from the agent's `/run` response
///
/// The agent owns this schema. Unknown fields are kept in `extra` so an event
/// can be inspected or re-serialized without loss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<EventContent>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AgentEvent {
    /// Decode one event without failing
    ///
    /// Anything that does not look like an event object comes back author-less,
    /// which the projector drops.
    pub fn from_value(value: &serde_json::Value) -> Self {
        match serde_json::from_value::<AgentEvent>(value.clone()) {
            Ok(event) => event,
            Err(e) => {
                debug!(error = %e, "AgentEvent::from_value: malformed event, treating as opaque");
                Self::default()
            }
        }
    }

    /// Parts of this event's content, empty when absent
    pub fn parts(&self) -> &[Part] {
        self.content.as_ref().map(|c| c.parts.as_slice()).unwrap_or(&[])
    }
}

/// Decode a `/run` response body into events
///
/// The body must be a JSON array. Individual elements are decoded leniently.
pub fn decode_events(body: &serde_json::Value) -> Result<Vec<AgentEvent>, ClientError> {
    let items = body
        .as_array()
        .ok_or_else(|| ClientError::InvalidResponse("expected an array of agent events".to_string()))?;
    debug!(event_count = items.len(), "decode_events: decoding");
    Ok(items.iter().map(AgentEvent::from_value).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_message_serialize() {
        let msg = Message::user("Hello");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"role": "user", "parts": [{"text": "Hello"}]}));
    }

    #[test]
    fn test_message_text_concatenates_parts_in_order() {
        let msg = Message {
            role: Role::Model,
            parts: vec![Part::text("foo "), Part::text("bar")],
        };
        assert_eq!(msg.text(), "foo bar");
    }

    #[test]
    fn test_event_keeps_unknown_fields() {
        let raw = json!({
            "author": "planning_agent",
            "invocationId": "e-1",
            "content": {"parts": [{"text": "hi"}], "role": "model"},
            "timestamp": 1.5
        });
        let event = AgentEvent::from_value(&raw);
        assert_eq!(event.author.as_deref(), Some("planning_agent"));
        assert_eq!(event.parts(), &[Part::text("hi")]);
        assert_eq!(event.extra["invocationId"], "e-1");
        assert_eq!(event.extra["timestamp"], 1.5);
    }

    #[test]
    fn test_malformed_event_is_authorless() {
        let event = AgentEvent::from_value(&json!({"author": 42}));
        assert!(event.author.is_none());

        let event = AgentEvent::from_value(&json!("just a string"));
        assert!(event.author.is_none());
        assert!(event.parts().is_empty());
    }

    #[test]
    fn test_event_without_content_has_no_parts() {
        let event = AgentEvent::from_value(&json!({"author": "tool"}));
        assert!(event.parts().is_empty());
    }

    #[test]
    fn test_decode_events_requires_array() {
        assert!(decode_events(&json!({"detail": "nope"})).is_err());
        assert!(decode_events(&json!(null)).is_err());
        assert_eq!(decode_events(&json!([])).unwrap().len(), 0);
    }

    #[test]
    fn test_decode_events_preserves_order() {
        let body = json!([
            {"author": "a"},
            {"author": "b"},
            42,
            {"author": "c"}
        ]);
        let events = decode_events(&body).unwrap();
        let authors: Vec<Option<&str>> = events.iter().map(|e| e.author.as_deref()).collect();
        assert_eq!(authors, vec![Some("a"), Some("b"), None, Some("c")]);
    }
    #[test]
    fn test_non_text_part_is_kept() {
        let raw = json!({"function_call": {"name": "lookup", "args": {"city": "Lisbon"}}});
        let part: Part = serde_json::from_value(raw.clone()).unwrap();
        assert!(part.text.is_none());
        assert_eq!(part.as_text(), "");
        assert_eq!(serde_json::to_value(&part).unwrap(), raw);
    }

    #[test]
    fn test_text_part_extra_fields_round_trip() {
        let raw = json!({"text": "hi", "thought": true});
        let part: Part = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(part.as_text(), "hi");
        assert_eq!(part.extra["thought"], true);
        assert_eq!(serde_json::to_value(&part).unwrap(), raw);
    }
}
