//! Scripted reasoning backend
//!
//! Deterministic oracle for tests, built with the `testing` feature. Either
//! replays a fixed list of responses or computes the next response from the
//! request.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::{HistoryEntry, OutputItem, Result, ScribeError};
use crate::llm::traits::{BackendRequest, BackendResponse, ReasoningBackend};

type Responder = dyn Fn(&BackendRequest<'_>) -> Result<Vec<OutputItem>> + Send + Sync;

enum Script {
    Sequence(Mutex<VecDeque<Result<Vec<OutputItem>>>>),
    Function(Box<Responder>),
}

/// What the backend saw on one request
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub model: String,
    pub history: Vec<HistoryEntry>,
    pub tool_names: Vec<String>,
}

/// Backend that answers from a script instead of a model
pub struct ScriptedBackend {
    script: Script,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedBackend {
    /// Answer successive requests with successive responses
    pub fn sequence(responses: Vec<Vec<OutputItem>>) -> Self {
        Self::with_script(Script::Sequence(Mutex::new(
            responses.into_iter().map(Ok).collect(),
        )))
    }

    /// Like [`sequence`](Self::sequence), but entries may be errors
    pub fn sequence_with_errors(responses: Vec<Result<Vec<OutputItem>>>) -> Self {
        Self::with_script(Script::Sequence(Mutex::new(responses.into())))
    }

    /// Compute each response from the request
    pub fn from_fn<F>(respond: F) -> Self
    where
        F: Fn(&BackendRequest<'_>) -> Vec<OutputItem> + Send + Sync + 'static,
    {
        Self::with_script(Script::Function(Box::new(move |request| {
            Ok(respond(request))
        })))
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn record(&self, request: &BackendRequest<'_>) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                model: request.model.to_string(),
                history: request.history.to_vec(),
                tool_names: request.tools.iter().map(|t| t.name.clone()).collect(),
            });
        }
    }
}

#[async_trait]
impl ReasoningBackend for ScriptedBackend {
    async fn respond(&self, request: BackendRequest<'_>) -> Result<BackendResponse> {
        self.record(&request);

        let items = match &self.script {
            Script::Sequence(queue) => queue
                .lock()
                .map_err(|_| ScribeError::backend("script lock poisoned"))?
                .pop_front()
                .unwrap_or_else(|| Err(ScribeError::backend("script exhausted")))?,
            Script::Function(respond) => respond(&request)?,
        };

        Ok(BackendResponse {
            items,
            usage: None,
            model: request.model.to_string(),
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
