//! Console user channel
//!
//! Shows agent messages on stdout and reads replies line by line from stdin.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tokio::sync::Mutex;

use crate::core::{Result, ScribeError};
use crate::tools::builtin::UserChannel;

/// Interactive channel on the process's terminal
pub struct ConsoleChannel {
    stdin: Mutex<BufReader<Stdin>>,
}

impl ConsoleChannel {
    /// Create a channel on stdin/stdout
    pub fn new() -> Self {
        Self {
            stdin: Mutex::new(BufReader::new(tokio::io::stdin())),
        }
    }
}

impl Default for ConsoleChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserChannel for ConsoleChannel {
    async fn ask(&self, message: &str) -> Result<String> {
        let mut stdin = self.stdin.lock().await;

        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("\nAI: {}\nUser: ", message).as_bytes())
            .await?;
        stdout.flush().await?;

        let mut line = String::new();
        if stdin.read_line(&mut line).await? == 0 {
            return Err(ScribeError::tool("user input closed"));
        }

        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
