//! Shared helpers for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use taskplanner::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError};
use taskplanner::pipeline::{Pipeline, StageContext, StageSettings};
use taskplanner::prompts::PromptLoader;

pub const TODO_TASKS: &str = r#"```json
[
  {"id": "task_1", "name": "Design UI", "description": "Sketch the todo screens", "category": "development", "estimated_complexity": "medium"}
]
```"#;

pub const TODO_TIMELINE: &str = r#"[
  {"id": "task_1", "name": "Design UI", "description": "Sketch the todo screens", "category": "development", "estimated_complexity": "medium",
   "estimated_duration_days": 3, "start_date": "2024-01-01", "end_date": "2024-01-03", "buffer_days": 0.5}
]"#;

pub const TODO_DEPENDENCIES: &str = r#"[
  {"id": "task_1", "name": "Design UI", "description": "Sketch the todo screens", "category": "development", "estimated_complexity": "medium",
   "estimated_duration_days": 3, "start_date": "2024-01-01", "end_date": "2024-01-03", "buffer_days": 0.5,
   "dependencies": [], "priority": "high", "can_parallel": []}
]"#;

/// Replies with scripted text in order, then fails
pub struct ScriptedClient {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        match self.replies.lock().unwrap().pop_front() {
            Some(text) => Ok(CompletionResponse::text(text)),
            None => Err(LlmError::ApiError {
                status: 503,
                message: "service unavailable".to_string(),
            }),
        }
    }
}

/// Panics on every call
pub struct PanickingClient;

#[async_trait]
impl LlmClient for PanickingClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        panic!("model backend crashed");
    }
}

pub fn pipeline(client: Arc<dyn LlmClient>) -> Pipeline {
    let settings = StageSettings {
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        max_tokens: 4096,
        temperature: Some(0.1),
    };
    Pipeline::new(StageContext::new(client, PromptLoader::embedded_only(), settings))
}
