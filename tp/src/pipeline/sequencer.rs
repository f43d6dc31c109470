//! Sequencer - dependency edges, priorities and parallel sets
//!
//! Cycle detection is not attempted. References to task ids outside the
//! current plan, and self references, are dropped and reported as warnings.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use super::reply::SequenceReply;
use super::stage::{StageContext, ensure_same_ids, log_failure};
use super::{Agent, PlanState, StageError};
use crate::domain::{SequencedTask, TimedTask, task_ids};

/// Run the sequencing stage
///
/// On failure the timed tasks are carried forward without dependency
/// information and an error is appended.
pub async fn sequence(ctx: &StageContext, state: &PlanState) -> PlanState {
    info!(task_count = state.timeline_tasks.len(), "Analyzing task dependencies");

    if state.timeline_tasks.is_empty() {
        debug!("sequence: no tasks, skipping model call");
        return PlanState {
            dependency_tasks: Vec::new(),
            current_agent: Some(Agent::Dependency),
            ..state.clone()
        };
    }

    match request_dependencies(ctx, state).await {
        Ok((dependency_tasks, pruned)) => {
            let mut warnings = state.warnings.clone();
            warnings.extend(pruned);
            PlanState {
                dependency_tasks,
                current_agent: Some(Agent::Dependency),
                warnings,
                ..state.clone()
            }
        }
        Err(e) => {
            log_failure(Agent::Dependency, &e);
            PlanState {
                dependency_tasks: state
                    .timeline_tasks
                    .iter()
                    .cloned()
                    .map(SequencedTask::unsequenced)
                    .collect(),
                current_agent: Some(Agent::Dependency),
                errors: state.errors_with(Agent::Dependency.error_entry(&e)),
                ..state.clone()
            }
        }
    }
}

async fn request_dependencies(
    ctx: &StageContext,
    state: &PlanState,
) -> Result<(Vec<SequencedTask>, Vec<String>), StageError> {
    let payload = serde_json::to_string_pretty(&state.timeline_tasks)?;
    let reply: Vec<SequenceReply> = ctx
        .ask(
            "sequence",
            &state.project_statement,
            format!("Analyze dependencies for these tasks: {}", payload),
        )
        .await?;
    merge_dependencies(&state.timeline_tasks, reply)
}

/// Pair each timed task with its sequencing, in input order
///
/// Task fields come from the input. Timeline fields the model revised win,
/// those it left out keep the estimator's values.
fn merge_dependencies(
    timed: &[TimedTask],
    reply: Vec<SequenceReply>,
) -> Result<(Vec<SequencedTask>, Vec<String>), StageError> {
    ensure_same_ids(timed.iter().map(|t| t.id()), reply.iter().map(|r| r.timeline.id.as_str()))?;

    let known = task_ids(timed.iter().map(|t| t.id()));
    let mut by_id: HashMap<String, SequenceReply> =
        reply.into_iter().map(|r| (r.timeline.id.clone(), r)).collect();
    let mut tasks = Vec::with_capacity(timed.len());
    let mut warnings = Vec::new();

    for input in timed {
        let sequenced = by_id
            .remove(input.id())
            .ok_or_else(|| StageError::InvalidReply(format!("no sequencing for task '{}'", input.id())))?;

        let merged = SequencedTask {
            timed: sequenced.timeline.revise(input),
            dependencies: sequenced.dependencies,
            priority: sequenced.priority,
            can_parallel: sequenced.can_parallel,
        };

        let (pruned, task_warnings) = prune_references(merged, &known);
        tasks.push(pruned);
        warnings.extend(task_warnings);
    }

    Ok((tasks, warnings))
}

/// Drop dependency and parallel references that do not name another task in
/// the plan; parallel ids are also de-duplicated
pub fn prune_references(mut task: SequencedTask, known: &HashSet<&str>) -> (SequencedTask, Vec<String>) {
    let id = task.id().to_string();
    let mut warnings = Vec::new();

    task.dependencies.retain(|edge| {
        let keep = edge.depends_on != id && known.contains(edge.depends_on.as_str());
        if !keep {
            warn!(task = %id, depends_on = %edge.depends_on, "dropping invalid dependency");
            warnings.push(format!(
                "{}: task '{}' dependency on '{}' dropped (not another task in this plan)",
                Agent::Dependency.label(),
                id,
                edge.depends_on
            ));
        }
        keep
    });

    let mut seen = HashSet::new();
    task.can_parallel.retain(|other| {
        let valid = *other != id && known.contains(other.as_str());
        if !valid {
            warnings.push(format!(
                "{}: task '{}' parallel entry '{}' dropped (not another task in this plan)",
                Agent::Dependency.label(),
                id,
                other
            ));
        }
        valid && seen.insert(other.clone())
    });

    (task, warnings)
}
