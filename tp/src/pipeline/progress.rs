//! Progress events reported while a plan is generated

use serde::{Deserialize, Serialize};

use super::{Agent, PlanState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Starting,
    Running,
    Completed,
    Error,
}

/// One step of plan generation, as streamed to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    pub agent: Agent,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<PlanState>>,
}

impl ProgressEvent {
    pub fn starting() -> Self {
        Self {
            status: ProgressStatus::Starting,
            agent: Agent::System,
            message: Agent::System.activity().to_string(),
            data: None,
        }
    }

    pub fn running(agent: Agent) -> Self {
        Self {
            status: ProgressStatus::Running,
            agent,
            message: agent.activity().to_string(),
            data: None,
        }
    }

    pub fn completed(state: PlanState) -> Self {
        Self {
            status: ProgressStatus::Completed,
            agent: Agent::System,
            message: "Plan generation completed!".to_string(),
            data: Some(Box::new(state)),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ProgressStatus::Error,
            agent: Agent::System,
            message: message.into(),
            data: None,
        }
    }
}
