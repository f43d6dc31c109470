//! Stage failure types

use thiserror::Error;

use crate::llm::LlmError;

/// Why a model-backed stage fell back
#[derive(Debug, Error)]
pub enum StageError {
    #[error("{0}")]
    Llm(#[from] LlmError),

    #[error("model returned an empty reply")]
    EmptyReply,

    #[error("reply is not a valid JSON task array: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidReply(String),

    #[error("prompt rendering failed: {0}")]
    Prompt(String),
}

/// Why the renderer replaced its output with an error marker
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("task {task_id} has invalid duration {value}")]
    InvalidDuration { task_id: String, value: f64 },

    #[error("formatting failed: {0}")]
    Format(#[from] std::fmt::Error),
}
