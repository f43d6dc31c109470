//! Extracting JSON task arrays from model replies

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::StageError;
use crate::domain::{DependencyEdge, Priority, Task, TimedTask, null_as_default};
use crate::llm::CompletionResponse;

/// One entry of an estimator reply
///
/// Only the id and the timeline fields are read. Echoed task fields are
/// ignored, the input's copy of them is authoritative.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineReply {
    pub id: String,
    pub estimated_duration_days: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub buffer_days: Option<f64>,
}

impl TimelineReply {
    /// Attach these estimates to `task`
    pub fn apply(self, task: &Task) -> TimedTask {
        TimedTask {
            task: task.clone(),
            estimated_duration_days: self.estimated_duration_days,
            start_date: self.start_date,
            end_date: self.end_date,
            buffer_days: self.buffer_days,
        }
    }

    /// Overlay these estimates on an already timed task, keeping its values
    /// where this reply has none
    pub fn revise(self, timed: &TimedTask) -> TimedTask {
        TimedTask {
            task: timed.task.clone(),
            estimated_duration_days: self.estimated_duration_days.or(timed.estimated_duration_days),
            start_date: self.start_date.or(timed.start_date),
            end_date: self.end_date.or(timed.end_date),
            buffer_days: self.buffer_days.or(timed.buffer_days),
        }
    }
}

/// One entry of a sequencer reply
#[derive(Debug, Clone, Deserialize)]
pub struct SequenceReply {
    #[serde(flatten)]
    pub timeline: TimelineReply,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<DependencyEdge>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub can_parallel: Vec<String>,
}

/// Strip a surrounding triple-backtick fence, with or without a `json` tag
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    let rest = rest.trim_end();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse a model reply as a JSON array of `T`
pub fn parse_array<T: DeserializeOwned>(response: &CompletionResponse) -> Result<Vec<T>, StageError> {
    let content = response.content.as_deref().ok_or(StageError::EmptyReply)?;
    let body = strip_code_fence(content);
    debug!(body_len = body.len(), "parse_array: called");
    if body.is_empty() {
        return Err(StageError::EmptyReply);
    }
    Ok(serde_json::from_str(body)?)
}
