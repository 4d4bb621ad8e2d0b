//! Turn loop integration tests
//!
//! Drives the engine against the scripted backend and checks the history it
//! builds and the answers it returns.

use std::sync::Arc;
use std::time::Duration;

use scribe::core::{HistoryEntry, OutputItem};
use scribe::job::BackgroundJobHandle;
use scribe::llm::{ReasoningBackend, RetryPolicy, ScriptedBackend};
use scribe::tools::builtin::session;
use scribe::tools::tool::no_parameters;
use scribe::tools::FnTool;
use scribe::{AgentDefinition, ConversationEngine, ScribeError, ToolRegistry};
use serde_json::{json, Value};

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(2),
        multiplier: 2.0,
    }
}

fn engine(backend: Arc<ScriptedBackend>, registry: ToolRegistry) -> ConversationEngine {
    let backend: Arc<dyn ReasoningBackend> = backend;
    ConversationEngine::new(backend, Arc::new(registry)).with_retry_policy(RetryPolicy::none())
}

fn echo_tool() -> FnTool {
    FnTool::new(
        "echo",
        "Echo the text argument",
        json!({
            "type": "object",
            "properties": { "text": { "type": "string" } },
            "required": ["text"]
        }),
        |args| async move { Ok(args["text"].clone()) },
    )
}

/// Output of the most recent tool result, decoded
fn last_tool_output(history: &[HistoryEntry]) -> Option<Value> {
    history.iter().rev().find_map(|e| match e {
        HistoryEntry::ToolResult { output, .. } => serde_json::from_str(output).ok(),
        _ => None,
    })
}

#[tokio::test]
async fn test_message_first_returns_immediately() {
    let backend = Arc::new(ScriptedBackend::sequence(vec![vec![OutputItem::message(
        "nothing to do",
    )]]));
    let engine = engine(backend.clone(), ToolRegistry::new());

    let outcome = engine
        .run_detailed(&AgentDefinition::new("idle", "Answer."), Some("hi".into()))
        .await
        .unwrap();

    assert_eq!(outcome.text, "nothing to do");
    assert_eq!(outcome.turns, 1);
    assert!(outcome
        .history
        .iter()
        .all(|e| !matches!(e, HistoryEntry::ToolCall { .. } | HistoryEntry::ToolResult { .. })));
    assert_eq!(backend.request_count(), 1);
}

#[tokio::test]
async fn test_every_call_gets_one_result_in_order() {
    let backend = Arc::new(ScriptedBackend::sequence(vec![
        vec![
            OutputItem::function_call("c1", "echo", r#"{"text": "one"}"#),
            OutputItem::function_call("c2", "echo", r#"{"text": "two"}"#),
            OutputItem::function_call("c3", "echo", r#"{"text": "three"}"#),
        ],
        vec![OutputItem::message("echoed")],
    ]));
    let mut registry = ToolRegistry::new();
    registry.register(echo_tool()).unwrap();
    let engine = engine(backend.clone(), registry);

    let agent = AgentDefinition::new("echoer", "Echo things.").with_tools(["echo"]);
    engine.run(&agent, None).await.unwrap();

    let requests = backend.requests();
    let second = &requests[1];
    assert_eq!(second.tool_names, vec!["echo".to_string()]);

    let results: Vec<(&str, &str)> = second
        .history
        .iter()
        .filter_map(|e| match e {
            HistoryEntry::ToolResult { call_id, output } => Some((call_id.as_str(), output.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(
        results,
        [("c1", "\"one\""), ("c2", "\"two\""), ("c3", "\"three\"")]
    );

    for pair in second.history[1..].chunks(2) {
        assert!(matches!(pair[0], HistoryEntry::ToolCall { .. }));
        assert_eq!(pair[0].call_id(), pair[1].call_id());
    }
}

#[tokio::test]
async fn test_answer_built_from_background_job() {
    let job = BackgroundJobHandle::new("transcription");
    let mut registry = ToolRegistry::new();
    session::register(&mut registry).unwrap();
    registry.session().set_artifact("/recordings/standup.wav").unwrap();

    let waiter = job.clone();
    registry
        .register(FnTool::new(
            "run_job_tool",
            "Wait for the job",
            no_parameters(),
            move |_| {
                let job = waiter.clone();
                async move { Ok(Value::String(job.await_result().await?.to_string())) }
            },
        ))
        .unwrap();

    let backend = Arc::new(ScriptedBackend::from_fn(|req| {
        match last_tool_output(req.history) {
            Some(Value::String(value)) => vec![OutputItem::message(format!("done: {}", value))],
            _ => vec![OutputItem::function_call("c1", "run_job_tool", "{}")],
        }
    }));
    let engine = engine(backend, registry);

    job.start(|| async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok("42 words".to_string())
    })
    .unwrap();

    let agent = AgentDefinition::new("waiter", "Wait.").with_tools(["get_artifact_path", "run_job_tool"]);
    let text = engine.run(&agent, None).await.unwrap();
    assert_eq!(text, "done: 42 words");
}

#[tokio::test]
async fn test_failing_tool_does_not_abort_run() {
    let mut registry = ToolRegistry::new();
    registry
        .register(FnTool::new("flaky", "Always fails", no_parameters(), |_| async {
            Err(ScribeError::tool("disk full"))
        }))
        .unwrap();

    let backend = Arc::new(ScriptedBackend::from_fn(|req| {
        match last_tool_output(req.history) {
            Some(output) => vec![OutputItem::message(format!(
                "recovered from {}",
                output["error"]["kind"].as_str().unwrap_or("?")
            ))],
            None => vec![OutputItem::function_call("c1", "flaky", "{}")],
        }
    }));
    let engine = engine(backend, registry);

    let agent = AgentDefinition::new("brave", "Try.").with_tools(["flaky"]);
    let outcome = engine.run_detailed(&agent, None).await.unwrap();

    assert_eq!(outcome.text, "recovered from tool_execution_error");
    let payload = last_tool_output(&outcome.history).unwrap();
    assert_eq!(
        payload["error"]["message"],
        "Tool execution error: disk full"
    );
}

#[tokio::test]
async fn test_same_history_same_next_action() {
    let oracle = || {
        Arc::new(ScriptedBackend::from_fn(|req| {
            match last_tool_output(req.history) {
                Some(output) => vec![OutputItem::message(format!("final {}", output))],
                None => vec![OutputItem::function_call(
                    format!("call_{}", req.history.len()),
                    "echo",
                    r#"{"text": "same"}"#,
                )],
            }
        }))
    };
    let agent = AgentDefinition::new("det", "Be deterministic.").with_tools(["echo"]);

    let mut outcomes = Vec::new();
    for _ in 0..2 {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool()).unwrap();
        let engine = engine(oracle(), registry);
        outcomes.push(engine.run_detailed(&agent, Some("go".into())).await.unwrap());
    }

    assert_eq!(outcomes[0].text, outcomes[1].text);
    assert_eq!(outcomes[0].history, outcomes[1].history);
}

#[tokio::test]
async fn test_turn_limit_exceeded() {
    let backend = Arc::new(ScriptedBackend::from_fn(|_| {
        vec![OutputItem::function_call("again", "echo", r#"{"text": "loop"}"#)]
    }));
    let mut registry = ToolRegistry::new();
    registry.register(echo_tool()).unwrap();
    let engine = engine(backend.clone(), registry).with_max_turns(4);

    let agent = AgentDefinition::new("stuck", "Never stop.").with_tools(["echo"]);
    let err = engine.run(&agent, None).await.unwrap_err();

    assert!(matches!(err, ScribeError::TurnLimitExceeded { max_turns: 4, .. }));
    assert_eq!(backend.request_count(), 4);
}

#[tokio::test]
async fn test_backend_errors_retried_then_surfaced() {
    let backend = Arc::new(ScriptedBackend::sequence_with_errors(vec![
        Err(ScribeError::backend("503 Service Unavailable")),
        Ok(vec![OutputItem::message("back online")]),
    ]));
    let engine = engine(backend.clone(), ToolRegistry::new()).with_retry_policy(fast_retry(3));

    let agent = AgentDefinition::new("patient", "Wait.");
    assert_eq!(engine.run(&agent, None).await.unwrap(), "back online");
    assert_eq!(backend.request_count(), 2);

    let backend = Arc::new(ScriptedBackend::sequence_with_errors(vec![
        Err(ScribeError::backend("503")),
        Err(ScribeError::backend("503")),
        Ok(vec![OutputItem::message("too late")]),
    ]));
    let engine = crate::engine(backend.clone(), ToolRegistry::new()).with_retry_policy(fast_retry(2));

    let err = engine.run(&agent, None).await.unwrap_err();
    assert!(matches!(err, ScribeError::Backend(_)));
    assert_eq!(backend.request_count(), 2);
}

#[tokio::test]
async fn test_rejected_request_not_retried() {
    let backend = Arc::new(ScriptedBackend::sequence_with_errors(vec![
        Err(ScribeError::BackendRejected("401 Unauthorized".into())),
        Ok(vec![OutputItem::message("unreachable")]),
    ]));
    let engine = engine(backend.clone(), ToolRegistry::new()).with_retry_policy(fast_retry(5));

    let err = engine
        .run(&AgentDefinition::new("a", "s"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ScribeError::BackendRejected(_)));
    assert_eq!(backend.request_count(), 1);
}

#[tokio::test]
async fn test_unknown_agent_tool_fails_before_first_request() {
    let backend = Arc::new(ScriptedBackend::sequence(vec![]));
    let engine = engine(backend.clone(), ToolRegistry::new());

    let agent = AgentDefinition::new("lost", "s").with_tools(["missing"]);
    let err = engine.run(&agent, None).await.unwrap_err();

    assert!(matches!(err, ScribeError::UnknownTool(ref name) if name == "missing"));
    assert_eq!(backend.request_count(), 0);
}
