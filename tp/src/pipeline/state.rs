//! The record threaded through the planning stages

use serde::{Deserialize, Serialize};

use super::renderer::RenderedPlan;
use crate::domain::{SequencedTask, Task, TimedTask};

/// Who is speaking in a progress event, and which stage last touched the state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Agent {
    System,
    Planner,
    Timeline,
    Dependency,
    Formatter,
}

impl Agent {
    /// The model-backed and rendering stages, in execution order
    pub const STAGES: [Agent; 4] = [Agent::Planner, Agent::Timeline, Agent::Dependency, Agent::Formatter];

    /// Prefix used for errors recorded by this stage
    pub fn label(&self) -> &'static str {
        match self {
            Agent::System => "System",
            Agent::Planner => "Planner Agent",
            Agent::Timeline => "Timeline Agent",
            Agent::Dependency => "Dependency Agent",
            Agent::Formatter => "Formatter Agent",
        }
    }

    /// Human-readable description of what the stage is doing
    pub fn activity(&self) -> &'static str {
        match self {
            Agent::System => "Initializing agents...",
            Agent::Planner => "Breaking down project into tasks...",
            Agent::Timeline => "Assigning durations and deadlines...",
            Agent::Dependency => "Analyzing task dependencies...",
            Agent::Formatter => "Converting to structured output formats...",
        }
    }

    /// Format a stage failure for the error list
    pub fn error_entry(&self, detail: impl std::fmt::Display) -> String {
        format!("{} Error: {}", self.label(), detail)
    }
}

impl std::fmt::Display for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Agent::System => "system",
            Agent::Planner => "planner",
            Agent::Timeline => "timeline",
            Agent::Dependency => "dependency",
            Agent::Formatter => "formatter",
        };
        f.write_str(name)
    }
}

/// Output of the formatter stage
///
/// The three views are one artifact: either all of them are present or the
/// whole output is a single error marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormattedOutput {
    Rendered(RenderedPlan),
    Failed { error: String },
}

impl FormattedOutput {
    pub fn rendered(&self) -> Option<&RenderedPlan> {
        match self {
            FormattedOutput::Rendered(plan) => Some(plan),
            FormattedOutput::Failed { .. } => None,
        }
    }
}

/// Accumulated state of one pipeline invocation
///
/// Stages never modify a state in place: each takes `&PlanState` and returns
/// a new value with its own fields filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanState {
    pub project_statement: String,
    pub tasks: Vec<Task>,
    pub timeline_tasks: Vec<TimedTask>,
    pub dependency_tasks: Vec<SequencedTask>,
    pub formatted_output: Option<FormattedOutput>,
    pub current_agent: Option<Agent>,
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl PlanState {
    /// Initial state for a project statement
    pub fn new(project_statement: impl Into<String>) -> Self {
        Self {
            project_statement: project_statement.into(),
            tasks: Vec::new(),
            timeline_tasks: Vec::new(),
            dependency_tasks: Vec::new(),
            formatted_output: None,
            current_agent: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Errors plus one more entry
    pub(crate) fn errors_with(&self, entry: String) -> Vec<String> {
        let mut errors = self.errors.clone();
        errors.push(entry);
        errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
