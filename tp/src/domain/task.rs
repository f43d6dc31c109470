//! Task records produced by the planning stages

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::{Complexity, Priority};

/// Kind of work a task represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Category {
    Development,
    Testing,
    Documentation,
    Deployment,
    Planning,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Documentation => "documentation",
            Self::Deployment => "deployment",
            Self::Planning => "planning",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "testing" => Ok(Self::Testing),
            "documentation" => Ok(Self::Documentation),
            "deployment" => Ok(Self::Deployment),
            "planning" => Ok(Self::Planning),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl TryFrom<String> for Category {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// An atomic unit of work from the decomposer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(rename = "estimated_complexity", default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category: None,
            complexity: None,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = Some(complexity);
        self
    }
}

/// A task with timeline estimates attached
///
/// Every timeline field is optional: when estimation fails the task is carried
/// forward untimed rather than with invented numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedTask {
    #[serde(flatten)]
    pub task: Task,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration_days: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_days: Option<f64>,
}

impl TimedTask {
    /// Carry a task forward with no timeline information
    pub fn untimed(task: Task) -> Self {
        Self {
            task,
            estimated_duration_days: None,
            start_date: None,
            end_date: None,
            buffer_days: None,
        }
    }

    pub fn with_duration(mut self, days: f64) -> Self {
        self.estimated_duration_days = Some(days);
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn id(&self) -> &str {
        &self.task.id
    }
}

/// How a dependent task relates to its prerequisite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Relationship {
    /// Dependent cannot start until the prerequisite finishes
    FinishToStart,
    /// Dependent cannot start until the prerequisite starts
    StartToStart,
    Parallel,
}

impl std::str::FromStr for Relationship {
    type Err = String;

    /// Accepts `finish_to_start`, `Finish-To-Start` and similar spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "finish_to_start" => Ok(Self::FinishToStart),
            "start_to_start" => Ok(Self::StartToStart),
            "parallel" => Ok(Self::Parallel),
            _ => Err(format!("Unknown relationship: {}", s)),
        }
    }
}

impl TryFrom<String> for Relationship {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One incoming dependency of a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub depends_on: String,
    pub relationship: Relationship,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

impl DependencyEdge {
    pub fn finish_to_start(depends_on: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            depends_on: depends_on.into(),
            relationship: Relationship::FinishToStart,
            description: description.into(),
        }
    }
}

/// A timed task with dependency and priority annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencedTask {
    #[serde(flatten)]
    pub timed: TimedTask,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<DependencyEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub can_parallel: Vec<String>,
}

impl SequencedTask {
    /// Carry a timed task forward with no sequencing information
    pub fn unsequenced(timed: TimedTask) -> Self {
        Self {
            timed,
            dependencies: Vec::new(),
            priority: None,
            can_parallel: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_dependency(mut self, edge: DependencyEdge) -> Self {
        self.dependencies.push(edge);
        self
    }

    pub fn id(&self) -> &str {
        &self.timed.task.id
    }

    pub fn task(&self) -> &Task {
        &self.timed.task
    }
}

/// Read an explicit `null` as the type's default
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Collect the ids of a task collection
pub fn task_ids<'a, I>(ids: I) -> HashSet<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    ids.into_iter().collect()
}
