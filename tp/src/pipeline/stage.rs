//! Shared plumbing for the model-backed stages

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{Agent, StageError};
use super::reply::parse_array;
use crate::domain::task_ids;
use crate::llm::{CompletionRequest, LlmClient, Message, StopReason};
use crate::prompts::{PromptContext, PromptLoader};

/// Per-invocation knobs for the model calls
#[derive(Debug, Clone)]
pub struct StageSettings {
    /// First day of the schedule given to the estimator
    pub start_date: NaiveDate,
    /// Max tokens requested per stage reply
    pub max_tokens: u32,
    /// Sampling temperature, client default when unset
    pub temperature: Option<f32>,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            start_date: chrono::Local::now().date_naive(),
            max_tokens: 4096,
            temperature: None,
        }
    }
}

/// Everything a model-backed stage needs to issue its one call
pub struct StageContext {
    llm: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    settings: StageSettings,
}

impl StageContext {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: PromptLoader, settings: StageSettings) -> Self {
        Self { llm, prompts, settings }
    }

    /// Render `template`, send it with `user_message`, and parse the reply
    /// as a JSON array
    pub(crate) async fn ask<T: DeserializeOwned>(
        &self,
        template: &str,
        project_statement: &str,
        user_message: String,
    ) -> Result<Vec<T>, StageError> {
        debug!(%template, user_message_len = user_message.len(), "StageContext::ask: called");
        let prompt_context = PromptContext::new(project_statement, self.settings.start_date);
        let system_prompt = self
            .prompts
            .render(template, &prompt_context)
            .map_err(|e| StageError::Prompt(e.to_string()))?;

        let request = CompletionRequest {
            system_prompt,
            messages: vec![Message::user(user_message)],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let response = self.llm.complete(request).await?;
        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "StageContext::ask: reply received"
        );
        if response.stop_reason == StopReason::MaxTokens {
            warn!(%template, "reply hit the token limit and may be truncated");
        }

        parse_array(&response)
    }
}

/// Check that a reply covers exactly the input ids, once each
pub(crate) fn ensure_same_ids<'a, 'b>(
    expected: impl IntoIterator<Item = &'a str>,
    actual: impl IntoIterator<Item = &'b str>,
) -> Result<(), StageError> {
    let expected: Vec<&str> = expected.into_iter().collect();
    let actual: Vec<&str> = actual.into_iter().collect();

    if expected.len() != actual.len() {
        return Err(StageError::InvalidReply(format!(
            "reply has {} tasks, expected {}",
            actual.len(),
            expected.len()
        )));
    }

    let expected_set = task_ids(expected.iter().copied());
    let actual_set: HashSet<&str> = actual.iter().copied().collect();
    if actual_set.len() != actual.len() {
        return Err(StageError::InvalidReply("reply repeats a task id".to_string()));
    }

    if expected_set != actual_set {
        let mut missing: Vec<&str> = expected_set.difference(&actual_set).copied().collect();
        let mut unexpected: Vec<&str> = actual_set.difference(&expected_set).copied().collect();
        missing.sort_unstable();
        unexpected.sort_unstable();
        return Err(StageError::InvalidReply(format!(
            "reply task ids do not match input (missing: {:?}, unexpected: {:?})",
            missing, unexpected
        )));
    }

    Ok(())
}

/// Shared warning for a stage that fell back
pub(crate) fn log_failure(agent: Agent, error: &StageError) {
    match error {
        StageError::Llm(e) if e.is_rate_limit() => {
            warn!(stage = %agent, error = %e, "stage hit provider rate limit, using fallback");
        }
        _ => warn!(stage = %agent, error = %error, "stage failed, using fallback"),
    }
}
