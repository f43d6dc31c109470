//! Estimator - attach durations and dates to tasks
//!
//! All date arithmetic is left to the model. Locally the reply is only
//! checked to cover the same task ids, and the decomposer's task fields are
//! kept as they were.

use std::collections::HashMap;

use tracing::{debug, info};

use super::reply::TimelineReply;
use super::stage::{StageContext, ensure_same_ids, log_failure};
use super::{Agent, PlanState, StageError};
use crate::domain::{Task, TimedTask};

/// Run the estimation stage
///
/// On failure the tasks are carried forward untimed and an error is appended.
pub async fn estimate(ctx: &StageContext, state: &PlanState) -> PlanState {
    info!(task_count = state.tasks.len(), "Assigning durations and deadlines");

    if state.tasks.is_empty() {
        debug!("estimate: no tasks, skipping model call");
        return PlanState {
            timeline_tasks: Vec::new(),
            current_agent: Some(Agent::Timeline),
            ..state.clone()
        };
    }

    match request_timeline(ctx, state).await {
        Ok(timeline_tasks) => PlanState {
            timeline_tasks,
            current_agent: Some(Agent::Timeline),
            ..state.clone()
        },
        Err(e) => {
            log_failure(Agent::Timeline, &e);
            PlanState {
                timeline_tasks: state.tasks.iter().cloned().map(TimedTask::untimed).collect(),
                current_agent: Some(Agent::Timeline),
                errors: state.errors_with(Agent::Timeline.error_entry(&e)),
                ..state.clone()
            }
        }
    }
}

async fn request_timeline(ctx: &StageContext, state: &PlanState) -> Result<Vec<TimedTask>, StageError> {
    let payload = serde_json::to_string_pretty(&state.tasks)?;
    let reply: Vec<TimelineReply> = ctx
        .ask(
            "estimate",
            &state.project_statement,
            format!("Add timeline information to these tasks: {}", payload),
        )
        .await?;
    merge_timeline(&state.tasks, reply)
}

/// Pair each input task with its estimate, in input order
fn merge_timeline(tasks: &[Task], reply: Vec<TimelineReply>) -> Result<Vec<TimedTask>, StageError> {
    ensure_same_ids(tasks.iter().map(|t| t.id.as_str()), reply.iter().map(|r| r.id.as_str()))?;

    let mut by_id: HashMap<String, TimelineReply> = reply.into_iter().map(|r| (r.id.clone(), r)).collect();

    tasks
        .iter()
        .map(|task| {
            let estimate = by_id
                .remove(&task.id)
                .ok_or_else(|| StageError::InvalidReply(format!("no estimate for task '{}'", task.id)))?;
            Ok(estimate.apply(task))
        })
        .collect()
}
