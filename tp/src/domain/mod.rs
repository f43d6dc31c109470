//! Domain types for project plans
//!
//! A plan grows in three layers, one per model-backed stage:
//! [`Task`] (decomposition), [`TimedTask`] (estimation) and
//! [`SequencedTask`] (sequencing). Each layer embeds the previous one and
//! flattens it on the wire, so the JSON shape of a later layer is a superset
//! of the earlier one.

mod level;
mod task;

pub use level::{Complexity, Priority};
pub use task::{Category, DependencyEdge, Relationship, SequencedTask, Task, TimedTask, null_as_default, task_ids};
