//! Pipeline driver - runs the four stages in order

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::stage::{StageContext, StageSettings};
use super::{Agent, PlanState, ProgressEvent, decompose, estimate, render, sequence};
use crate::config::Config;
use crate::llm::LlmClient;
use crate::prompts::PromptLoader;

/// A configured planning pipeline
///
/// Holds no per-invocation state, so one instance can serve many concurrent
/// requests.
pub struct Pipeline {
    ctx: StageContext,
}

impl Pipeline {
    pub fn new(ctx: StageContext) -> Self {
        Self { ctx }
    }

    /// Build a pipeline from configuration and an LLM client
    pub fn from_config(config: &Config, llm: Arc<dyn LlmClient>) -> Self {
        debug!(provider = %config.llm.provider, model = %config.llm.model, "Pipeline::from_config: called");
        let prompts = PromptLoader::new(config.planning.resolved_prompts_dir());
        let settings = StageSettings {
            start_date: config.planning.resolved_start_date(),
            max_tokens: config.llm.max_tokens,
            temperature: Some(config.llm.temperature),
        };
        Self::new(StageContext::new(llm, prompts, settings))
    }

    /// Generate a plan for a project statement
    pub async fn run(&self, project_statement: &str) -> PlanState {
        self.execute(project_statement, None).await
    }

    /// Generate a plan, reporting each stage as it starts
    ///
    /// A closed receiver does not stop the run.
    pub async fn run_with_progress(
        &self,
        project_statement: &str,
        progress: &mpsc::Sender<ProgressEvent>,
    ) -> PlanState {
        self.execute(project_statement, Some(progress)).await
    }

    async fn execute(&self, project_statement: &str, progress: Option<&mpsc::Sender<ProgressEvent>>) -> PlanState {
        info!(statement_len = project_statement.len(), "Starting plan generation");
        let initial = PlanState::new(project_statement);

        report(progress, Agent::Planner).await;
        let state = decompose(&self.ctx, &initial).await;

        report(progress, Agent::Timeline).await;
        let state = estimate(&self.ctx, &state).await;

        report(progress, Agent::Dependency).await;
        let state = sequence(&self.ctx, &state).await;

        report(progress, Agent::Formatter).await;
        let state = render(&state);

        if state.has_errors() {
            warn!(errors = state.errors.len(), "Plan generated with stage errors");
        } else {
            info!(tasks = state.dependency_tasks.len(), "Plan generated");
        }
        state
    }
}

async fn report(progress: Option<&mpsc::Sender<ProgressEvent>>, agent: Agent) {
    if let Some(tx) = progress
        && tx.send(ProgressEvent::running(agent)).await.is_err()
    {
        debug!(%agent, "progress receiver dropped");
    }
}
