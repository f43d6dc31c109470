//! Fixtures shared by the stage tests

use std::sync::Arc;

use chrono::NaiveDate;

use super::stage::{StageContext, StageSettings};
use crate::llm::client::mock::MockLlmClient;
use crate::prompts::PromptLoader;

pub const TASKS_JSON: &str = r#"[
    {"id": "task_1", "name": "Plan features", "description": "Write the feature list", "category": "planning", "estimated_complexity": "low"},
    {"id": "task_2", "name": "Build UI", "description": "Implement the screens", "category": "development", "estimated_complexity": "medium"},
    {"id": "task_3", "name": "Test app", "description": "Write end-to-end tests", "category": "testing", "estimated_complexity": "medium"}
]"#;

pub const TIMELINE_JSON: &str = r#"[
    {"id": "task_1", "name": "Plan features", "description": "Write the feature list", "category": "planning", "estimated_complexity": "low",
     "estimated_duration_days": 1.0, "start_date": "2025-01-06", "end_date": "2025-01-06", "buffer_days": 0.5},
    {"id": "task_2", "name": "Build UI", "description": "Implement the screens", "category": "development", "estimated_complexity": "medium",
     "estimated_duration_days": 3.5, "start_date": "2025-01-07", "end_date": "2025-01-10", "buffer_days": 1},
    {"id": "task_3", "name": "Test app", "description": "Write end-to-end tests", "category": "testing", "estimated_complexity": "medium",
     "estimated_duration_days": 2, "start_date": "2025-01-13", "end_date": "2025-01-14", "buffer_days": 0.5}
]"#;

pub const DEPENDENCY_JSON: &str = r#"[
    {"id": "task_1", "name": "Plan features", "description": "Write the feature list", "category": "planning", "estimated_complexity": "low",
     "estimated_duration_days": 1.0, "start_date": "2025-01-06", "end_date": "2025-01-06", "buffer_days": 0.5,
     "dependencies": [], "priority": "high", "can_parallel": []},
    {"id": "task_2", "name": "Build UI", "description": "Implement the screens", "category": "development", "estimated_complexity": "medium",
     "estimated_duration_days": 3.5, "start_date": "2025-01-07", "end_date": "2025-01-10", "buffer_days": 1,
     "dependencies": [{"depends_on": "task_1", "relationship": "finish_to_start", "description": "Needs the feature list"}],
     "priority": "high", "can_parallel": []},
    {"id": "task_3", "name": "Test app", "description": "Write end-to-end tests", "category": "testing", "estimated_complexity": "medium",
     "estimated_duration_days": 2, "start_date": "2025-01-08", "end_date": "2025-01-09", "buffer_days": 0.5,
     "dependencies": [{"depends_on": "task_1", "relationship": "start_to_start", "description": "Tests follow the plan"}],
     "priority": "medium", "can_parallel": ["task_2"]}
]"#;

/// A stage context backed by a scripted mock
pub fn context(replies: &[&str]) -> (StageContext, Arc<MockLlmClient>) {
    let mock = Arc::new(MockLlmClient::with_texts(replies));
    let settings = StageSettings {
        start_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
        max_tokens: 2048,
        temperature: Some(0.1),
    };
    let ctx = StageContext::new(mock.clone(), PromptLoader::embedded_only(), settings);
    (ctx, mock)
}
