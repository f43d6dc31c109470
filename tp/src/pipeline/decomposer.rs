//! Decomposer - project statement into atomic tasks

use std::collections::HashSet;

use tracing::info;

use super::stage::{StageContext, log_failure};
use super::{Agent, PlanState, StageError};
use crate::domain::Task;

/// Run the decomposition stage
///
/// Decomposition starts the plan, so it also starts a fresh error list. On
/// any failure the task list is empty and exactly one error is recorded;
/// later stages are expected to cope with no tasks.
pub async fn decompose(ctx: &StageContext, state: &PlanState) -> PlanState {
    info!(statement_len = state.project_statement.len(), "Decomposing project into tasks");

    match request_tasks(ctx, &state.project_statement).await {
        Ok(tasks) => {
            info!(task_count = tasks.len(), "Project decomposed into {} tasks", tasks.len());
            PlanState {
                tasks,
                current_agent: Some(Agent::Planner),
                errors: Vec::new(),
                ..state.clone()
            }
        }
        Err(e) => {
            log_failure(Agent::Planner, &e);
            PlanState {
                tasks: Vec::new(),
                current_agent: Some(Agent::Planner),
                errors: vec![Agent::Planner.error_entry(&e)],
                ..state.clone()
            }
        }
    }
}

async fn request_tasks(ctx: &StageContext, statement: &str) -> Result<Vec<Task>, StageError> {
    let tasks: Vec<Task> = ctx
        .ask("decompose", statement, format!("Break down this project: {}", statement))
        .await?;
    validate_tasks(&tasks)?;
    Ok(tasks)
}

/// A decomposition must be non-empty with unique, non-blank ids
pub fn validate_tasks(tasks: &[Task]) -> Result<(), StageError> {
    if tasks.is_empty() {
        return Err(StageError::InvalidReply("decomposition produced zero tasks".to_string()));
    }

    let mut seen = HashSet::new();
    for task in tasks {
        if task.id.trim().is_empty() {
            return Err(StageError::InvalidReply(format!("task '{}' has a blank id", task.name)));
        }
        if !seen.insert(task.id.as_str()) {
            return Err(StageError::InvalidReply(format!("duplicate task id '{}'", task.id)));
        }
    }

    Ok(())
}
