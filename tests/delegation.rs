//! Agent-to-agent delegation tests
//!
//! Agents are registered as tools of each other. A single scripted backend
//! plays every agent, keyed on the system prompt it is sent.

use std::sync::Arc;

use scribe::core::{HistoryEntry, OutputItem};
use scribe::llm::{ReasoningBackend, RetryPolicy, ScriptedBackend};
use scribe::{AgentDefinition, ConversationEngine, ToolRegistry};
use serde_json::Value;

fn system_prompt(history: &[HistoryEntry]) -> &str {
    match history.first() {
        Some(HistoryEntry::System { text }) => text,
        _ => "",
    }
}

fn user_message(history: &[HistoryEntry]) -> Option<&str> {
    history.iter().find_map(|e| match e {
        HistoryEntry::User { text } => Some(text.as_str()),
        _ => None,
    })
}

fn tool_outputs(history: &[HistoryEntry]) -> Vec<Value> {
    history
        .iter()
        .filter_map(|e| match e {
            HistoryEntry::ToolResult { output, .. } => serde_json::from_str(output).ok(),
            _ => None,
        })
        .collect()
}

fn engine(backend: ScriptedBackend, agents: Vec<AgentDefinition>) -> ConversationEngine {
    let mut registry = ToolRegistry::new();
    registry.register_agents(agents).unwrap();
    let backend: Arc<dyn ReasoningBackend> = Arc::new(backend);
    ConversationEngine::new(backend, Arc::new(registry)).with_retry_policy(RetryPolicy::none())
}

/// Answers with the first tool output it sees, otherwise calls `tool`
fn relay(tool: &'static str) -> impl Fn(&[HistoryEntry]) -> Vec<OutputItem> {
    move |history| match tool_outputs(history).first() {
        Some(output) => vec![OutputItem::message(output.to_string())],
        None => vec![OutputItem::function_call("call_1", tool, "{}")],
    }
}

#[tokio::test]
async fn test_delegation_returns_nested_answer_only() {
    let parent = AgentDefinition::new("parent", "parent prompt").with_tools(["child"]);
    let child = AgentDefinition::new("child", "child prompt");

    let backend = ScriptedBackend::from_fn(|req| match system_prompt(req.history) {
        "child prompt" => vec![OutputItem::message(format!(
            "pong to {}",
            user_message(req.history).unwrap_or("nobody")
        ))],
        _ => match tool_outputs(req.history).first() {
            Some(Value::String(reply)) => vec![OutputItem::message(format!("child said {}", reply))],
            _ => vec![OutputItem::function_call("p1", "child", r#"{"message": "ping"}"#)],
        },
    });
    let engine = engine(backend, vec![parent.clone(), child]);

    let outcome = engine.run_detailed(&parent, None).await.unwrap();
    assert_eq!(outcome.text, "child said pong to ping");

    // system, call, result, final message
    assert_eq!(outcome.history.len(), 4);
    assert_eq!(
        outcome.history[2],
        HistoryEntry::ToolResult {
            call_id: "p1".into(),
            output: "\"pong to ping\"".into(),
        }
    );
    assert!(!outcome.history.iter().any(|e| matches!(
        e,
        HistoryEntry::System { text } if text == "child prompt"
    )));
}

#[tokio::test]
async fn test_blank_delegation_message_sends_no_user_entry() {
    let parent = AgentDefinition::new("parent", "parent prompt").with_tools(["child"]);
    let child = AgentDefinition::new("child", "child prompt");

    let backend = ScriptedBackend::from_fn(|req| match system_prompt(req.history) {
        "child prompt" => {
            let saw_user = req
                .history
                .iter()
                .any(|e| matches!(e, HistoryEntry::User { .. }));
            vec![OutputItem::message(format!("user entry: {}", saw_user))]
        }
        _ => match tool_outputs(req.history).first() {
            Some(Value::String(reply)) => vec![OutputItem::message(reply.clone())],
            _ => vec![OutputItem::function_call("p1", "child", r#"{"message": "   "}"#)],
        },
    });
    let engine = engine(backend, vec![parent.clone(), child]);

    assert_eq!(engine.run(&parent, None).await.unwrap(), "user entry: false");
}

#[tokio::test]
async fn test_self_delegation_is_a_cycle() {
    let looper = AgentDefinition::new("looper", "loop prompt").with_tools(["looper"]);
    let answer = relay("looper");
    let backend = ScriptedBackend::from_fn(move |req| answer(req.history));
    let engine = engine(backend, vec![looper.clone()]);

    let text = engine.run(&looper, None).await.unwrap();
    let payload: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(payload["error"]["kind"], "delegation_cycle");
    assert_eq!(
        payload["error"]["message"],
        "Delegation cycle: looper -> looper"
    );
}

#[tokio::test]
async fn test_mutual_delegation_stops_at_the_repeat() {
    let alpha = AgentDefinition::new("alpha", "alpha prompt").with_tools(["beta"]);
    let beta = AgentDefinition::new("beta", "beta prompt").with_tools(["alpha"]);

    let via_beta = relay("beta");
    let via_alpha = relay("alpha");
    let backend = ScriptedBackend::from_fn(move |req| match system_prompt(req.history) {
        "alpha prompt" => via_beta(req.history),
        _ => via_alpha(req.history),
    });
    let engine = engine(backend, vec![alpha.clone(), beta]);

    // beta relays the cycle payload, alpha relays beta's text
    let text = engine.run(&alpha, None).await.unwrap();
    let inner: String = serde_json::from_str(&text).unwrap();
    let payload: Value = serde_json::from_str(&inner).unwrap();
    assert_eq!(payload["error"]["kind"], "delegation_cycle");
    assert!(payload["error"]["message"]
        .as_str()
        .unwrap()
        .ends_with("alpha -> beta -> alpha"));
}

#[tokio::test]
async fn test_nested_turn_limit_is_reported_to_parent() {
    let parent = AgentDefinition::new("parent", "parent prompt").with_tools(["thinker"]);
    let thinker = AgentDefinition::new("thinker", "think prompt");

    let backend = ScriptedBackend::from_fn(|req| match system_prompt(req.history) {
        "think prompt" => vec![OutputItem::Reasoning(serde_json::json!({
            "type": "reasoning",
            "summary": []
        }))],
        _ => match tool_outputs(req.history).first() {
            Some(output) => vec![OutputItem::message(
                output["error"]["kind"].as_str().unwrap_or("no error").to_string(),
            )],
            None => vec![OutputItem::function_call("p1", "thinker", "{}")],
        },
    });
    let engine = engine(backend, vec![parent.clone(), thinker]).with_max_turns(3);

    assert_eq!(engine.run(&parent, None).await.unwrap(), "turn_limit_exceeded");
}

#[tokio::test]
async fn test_malformed_delegation_arguments() {
    let parent = AgentDefinition::new("parent", "parent prompt").with_tools(["child"]);
    let child = AgentDefinition::new("child", "child prompt");

    let backend = ScriptedBackend::from_fn(|req| match system_prompt(req.history) {
        "child prompt" => vec![OutputItem::message("should not run")],
        _ => match tool_outputs(req.history).first() {
            Some(output) => vec![OutputItem::message(
                output["error"]["kind"].as_str().unwrap_or("no error").to_string(),
            )],
            None => vec![OutputItem::function_call("p1", "child", r#"{"message": 5}"#)],
        },
    });
    let engine = engine(backend, vec![parent.clone(), child]);

    assert_eq!(engine.run(&parent, None).await.unwrap(), "invalid_arguments");
}
