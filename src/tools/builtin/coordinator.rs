//! Coordinator tools: talking to the human in the loop

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::Result;
use crate::tools::context::ToolContext;
use crate::tools::tool::{parse_args, Tool};
use crate::tools::ToolRegistry;

/// Two-way channel to the user
#[async_trait]
pub trait UserChannel: Send + Sync {
    /// Show `message` and return the user's reply
    async fn ask(&self, message: &str) -> Result<String>;
}

#[derive(Deserialize)]
struct TalkArgs {
    message: String,
}

/// Send a message to the user and get the reply
pub struct TalkToUser {
    channel: Arc<dyn UserChannel>,
    parameters: Value,
}

impl TalkToUser {
    pub fn new(channel: Arc<dyn UserChannel>) -> Self {
        Self {
            channel,
            parameters: json!({
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "Message to show the user"
                    }
                },
                "required": ["message"]
            }),
        }
    }
}

#[async_trait]
impl Tool for TalkToUser {
    fn name(&self) -> &str {
        "talk_to_user"
    }

    fn description(&self) -> &str {
        "Send a message to the user and get the user's response. This is the only way to \
         communicate with the user."
    }

    fn parameters(&self) -> &Value {
        &self.parameters
    }

    async fn invoke(&self, args: Value, _ctx: &ToolContext<'_>) -> Result<Value> {
        let args: TalkArgs = parse_args(self.name(), args)?;
        let reply = self.channel.ask(&args.message).await?;
        Ok(Value::String(reply))
    }
}

/// Register the coordinator tools
pub fn register(registry: &mut ToolRegistry, channel: Arc<dyn UserChannel>) -> Result<()> {
    registry.register(TalkToUser::new(channel))
}
