//! In-memory backend that records every request and replays canned replies.

use crate::{
    error::{Result, StudioError},
    gemini::backend::ModelBackend,
    models::{Candidate, GenerateContentRequest, GenerateContentResponse, ReplyPart},
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

enum Scripted {
    Reply(GenerateContentResponse),
    Fail(String),
}

pub struct ScriptedBackend {
    model: String,
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<GenerateContentRequest>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            model: "scripted-image-model".to_string(),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, response: GenerateContentResponse) -> Self {
        self.push(Scripted::Reply(response));
        self
    }

    /// Queues a one-candidate reply carrying `parts`.
    pub fn reply_parts(self, parts: Vec<ReplyPart>) -> Self {
        self.reply(GenerateContentResponse::with_candidates(vec![
            Candidate::with_parts(parts),
        ]))
    }

    /// Queues a transport failure.
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(Scripted::Fail(message.into()));
        self
    }

    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|requests| requests.len()).unwrap_or(0)
    }

    fn push(&self, step: Scripted) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(step);
        }
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        self.requests
            .lock()
            .map_err(|_| StudioError::Transport("request log poisoned".into()))?
            .push(request.clone());

        let step = self
            .script
            .lock()
            .map_err(|_| StudioError::Transport("script poisoned".into()))?
            .pop_front();

        match step {
            Some(Scripted::Reply(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(StudioError::Transport(message)),
            None => Err(StudioError::Transport("no scripted reply left".into())),
        }
    }
}
