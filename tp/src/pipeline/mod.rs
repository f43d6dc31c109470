//! Planning pipeline
//!
//! Four stages run in a fixed order over a [`PlanState`]:
//!
//! 1. [`decompose`] - project statement to tasks (model call)
//! 2. [`estimate`] - durations and dates (model call)
//! 3. [`sequence`] - dependencies, priority, parallel sets (model call)
//! 4. [`render`] - Markdown, Mermaid gantt and summary (local)
//!
//! A stage never aborts the run. On failure it records one error entry and
//! hands a fallback value to the next stage.

mod decomposer;
mod error;
mod estimator;
mod progress;
mod renderer;
mod reply;
mod runner;
mod sequencer;
mod stage;
mod state;

#[cfg(test)]
mod testing;

pub use decomposer::{decompose, validate_tasks};
pub use error::{RenderError, StageError};
pub use estimator::estimate;
pub use progress::{ProgressEvent, ProgressStatus};
pub use renderer::{PlanSummary, RenderedPlan, markdown, mermaid_gantt, render, render_plan, summary};
pub use reply::{SequenceReply, TimelineReply, parse_array, strip_code_fence};
pub use runner::Pipeline;
pub use sequencer::{prune_references, sequence};
pub use stage::{StageContext, StageSettings};
pub use state::{Agent, FormattedOutput, PlanState};
