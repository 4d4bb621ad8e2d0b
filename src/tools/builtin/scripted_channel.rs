//! User channel that replays canned replies

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::{Result, ScribeError};
use crate::tools::builtin::coordinator::UserChannel;

/// Channel that answers from a fixed list of replies
#[derive(Debug, Default)]
pub struct ScriptedChannel {
    replies: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedChannel {
    /// Answer successive questions with `replies`
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Messages shown so far
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl UserChannel for ScriptedChannel {
    async fn ask(&self, message: &str) -> Result<String> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(message.to_string());
        }

        self.replies
            .lock()
            .map_err(|_| ScribeError::tool("reply queue poisoned"))?
            .pop_front()
            .ok_or_else(|| ScribeError::tool("no scripted reply left"))
    }
}
