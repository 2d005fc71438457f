//! Projection of agent events onto displayable replies
//!
//! A `/run` call answers with every event the agent produced during the turn:
//! tool invocations, state deltas and the assistant's own text. Only the last
//! kind belongs in the conversation.

use tracing::debug;

use crate::agent::{AgentEvent, Message, Role};

/// Keep the assistant's events that carry content, in order, as model messages
///
/// Parts are passed through as-is. Nothing here fails: no matches yields an
/// empty list.
pub fn project(events: &[AgentEvent], assistant: &str) -> Vec<Message> {
    debug!(event_count = events.len(), %assistant, "project: called");
    let messages: Vec<Message> = events
        .iter()
        .filter(|event| event.author.as_deref() == Some(assistant) && !event.parts().is_empty())
        .map(|event| Message {
            role: Role::Model,
            parts: event.parts().to_vec(),
        })
        .collect();
    debug!(kept = messages.len(), "project: done");
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{EventContent, Part, decode_events};
    use proptest::prelude::*;
    use serde_json::json;

    const ASSISTANT: &str = "planning_agent";

    fn event(author: &str, texts: &[&str]) -> AgentEvent {
        AgentEvent {
            author: Some(author.to_string()),
            content: Some(EventContent {
                parts: texts.iter().map(|t| Part::text(*t)).collect(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_project_empty() {
        assert!(project(&[], ASSISTANT).is_empty());
    }

    #[test]
    fn test_project_drops_other_authors() {
        let body = json!([
            {"author": "planning_agent", "content": {"parts": [{"text": "Hi there"}]}},
            {"author": "tool", "content": {"parts": [{"text": "ignored"}]}}
        ]);
        let events = decode_events(&body).unwrap();

        let messages = project(&events, ASSISTANT);

        assert_eq!(messages, vec![Message::model("Hi there")]);
    }

    #[test]
    fn test_project_drops_missing_and_empty_content() {
        let events = vec![
            AgentEvent {
                author: Some(ASSISTANT.to_string()),
                content: None,
                ..Default::default()
            },
            event(ASSISTANT, &[]),
            event(ASSISTANT, &["kept"]),
        ];

        let messages = project(&events, ASSISTANT);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text(), "kept");
    }

    #[test]
    fn test_project_keeps_non_text_parts() {
        let body = json!([
            {"author": "planning_agent", "content": {"parts": [
                {"function_call": {"name": "find_venues", "args": {"city": "Lisbon"}}}
            ]}}
        ]);
        let events = decode_events(&body).unwrap();

        let messages = project(&events, ASSISTANT);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text(), "");
        assert_eq!(
            serde_json::to_value(&messages[0].parts).unwrap(),
            json!([{"function_call": {"name": "find_venues", "args": {"city": "Lisbon"}}}])
        );
    }

    #[test]
    fn test_project_keeps_parts_untouched() {
        let events = vec![event(ASSISTANT, &["  leading", "", "trailing  "])];

        let messages = project(&events, ASSISTANT);

        assert_eq!(
            messages[0].parts,
            vec![Part::text("  leading"), Part::text(""), Part::text("trailing  ")]
        );
    }

    #[test]
    fn test_project_echo_round_trip() {
        let sent = Message::user("Plan the stage layout");
        let echoed = AgentEvent {
            author: Some(ASSISTANT.to_string()),
            content: Some(EventContent {
                parts: sent.parts.clone(),
            }),
            ..Default::default()
        };

        let messages = project(&[echoed], ASSISTANT);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Model);
        assert_eq!(messages[0].parts, sent.parts);
    }

    fn arb_event() -> impl Strategy<Value = AgentEvent> {
        let author = prop_oneof![
            Just(Some(ASSISTANT.to_string())),
            Just(Some("tool".to_string())),
            Just(None),
        ];
        let content = prop::option::of(prop::collection::vec("[a-z ]{0,8}", 0..3));
        (author, content).prop_map(|(author, texts)| AgentEvent {
            author,
            content: texts.map(|t| EventContent {
                parts: t.into_iter().map(Part::text).collect(),
            }),
            ..Default::default()
        })
    }

    proptest! {
        #[test]
        fn prop_project_is_ordered_filtered_subsequence(events in prop::collection::vec(arb_event(), 0..20)) {
            let messages = project(&events, ASSISTANT);

            let expected: Vec<Vec<Part>> = events
                .iter()
                .filter(|e| e.author.as_deref() == Some(ASSISTANT) && !e.parts().is_empty())
                .map(|e| e.parts().to_vec())
                .collect();
            let actual: Vec<Vec<Part>> = messages.iter().map(|m| m.parts.clone()).collect();

            prop_assert_eq!(actual, expected);
            prop_assert!(messages.iter().all(|m| m.role == Role::Model));
        }
    }
}
