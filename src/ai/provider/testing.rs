//! Canned provider for command tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{DeltaStream, LlmProvider, strip_thinking};
use crate::types::{Result, SgitError};

/// Replies are handed out in order; the last one repeats
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedProvider {
    replies: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl ScriptedProvider {
    pub fn replying(replies: &[&str]) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.iter().map(|r| r.to_string()).collect())),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn next_reply(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(SgitError::Api {
                status: 500,
                body: "upstream unavailable".to_string(),
            });
        }
        let mut replies = self.replies.lock().unwrap();
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        };
        Ok(reply.unwrap_or_default())
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.next_reply(prompt).map(|r| strip_thinking(&r))
    }

    async fn stream(&self, prompt: &str) -> Result<DeltaStream> {
        let reply = self.next_reply(prompt)?;
        // split on spaces, keeping them, to mimic several deltas
        let deltas: Vec<Result<String>> = reply
            .split_inclusive(' ')
            .map(|d| Ok(d.to_string()))
            .collect();
        Ok(Box::pin(futures::stream::iter(deltas)))
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }
}
