//! Conversation history management
//!
//! Append-only record of one agent run. It is never shared between runs and
//! never trimmed; the whole history is re-sent on every backend request.

use std::collections::HashSet;

use crate::core::HistoryEntry;

/// History of one agent run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationHistory {
    entries: Vec<HistoryEntry>,
}

impl ConversationHistory {
    /// Start a history with the system prompt and an optional opening message
    pub fn new(system_prompt: impl Into<String>, message: Option<String>) -> Self {
        let mut entries = vec![HistoryEntry::system(system_prompt)];
        if let Some(message) = message {
            entries.push(HistoryEntry::user(message));
        }
        Self { entries }
    }

    /// Append an entry
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Record a tool call and its result as one adjacent pair
    pub fn push_tool_exchange(
        &mut self,
        item_id: Option<String>,
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
        output: impl Into<String>,
    ) {
        let call_id = call_id.into();
        self.entries.push(HistoryEntry::ToolCall {
            id: item_id,
            call_id: call_id.clone(),
            name: name.into(),
            arguments: arguments.into(),
        });
        self.entries.push(HistoryEntry::ToolResult {
            call_id,
            output: output.into(),
        });
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Consume into the entry list
    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.entries
    }

    /// Get entry count
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of tool calls recorded
    pub fn tool_calls(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, HistoryEntry::ToolCall { .. }))
            .count()
    }

    /// Call ids of tool calls that have no result yet
    pub fn unanswered_calls(&self) -> Vec<&str> {
        let answered: HashSet<&str> = self
            .entries
            .iter()
            .filter_map(|e| match e {
                HistoryEntry::ToolResult { call_id, .. } => Some(call_id.as_str()),
                _ => None,
            })
            .collect();

        self.entries
            .iter()
            .filter_map(|e| match e {
                HistoryEntry::ToolCall { call_id, .. } if !answered.contains(call_id.as_str()) => {
                    Some(call_id.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// Get the last assistant message
    pub fn last_assistant_message(&self) -> Option<&str> {
        self.entries.iter().rev().find_map(|e| match e {
            HistoryEntry::AssistantMessage { text } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeding() {
        let history = ConversationHistory::new("You are helpful", None);
        assert_eq!(history.entries(), [HistoryEntry::system("You are helpful")]);

        let history = ConversationHistory::new("s", Some("ping".into()));
        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[1], HistoryEntry::user("ping"));
    }

    #[test]
    fn test_tool_exchange_pairs() {
        let mut history = ConversationHistory::new("s", None);
        history.push_tool_exchange(None, "c1", "get_transcript", "{}", "\"text\"");
        history.push(HistoryEntry::ToolCall {
            id: Some("fc_2".into()),
            call_id: "c2".into(),
            name: "talk_to_user".into(),
            arguments: "{}".into(),
        });

        assert_eq!(history.tool_calls(), 2);
        assert_eq!(history.unanswered_calls(), vec!["c2"]);
        assert_eq!(history.entries()[2].call_id(), Some("c1"));
    }

    #[test]
    fn test_last_assistant_message() {
        let mut history = ConversationHistory::new("s", None);
        assert!(history.last_assistant_message().is_none());
        history.push(HistoryEntry::assistant("done"));
        assert_eq!(history.last_assistant_message(), Some("done"));
    }
}
