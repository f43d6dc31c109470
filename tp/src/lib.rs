//! TaskPlanner - LLM-driven project planning
//!
//! Turns a free-text project statement into a structured plan by running four
//! stages in sequence: decomposition into tasks, timeline estimation,
//! dependency analysis, and rendering into Markdown, a Mermaid gantt chart
//! and summary statistics.
//!
//! # Modules
//!
//! - [`pipeline`] - plan state, the four stages and the pipeline driver
//! - [`domain`] - task records and their enums
//! - [`llm`] - LLM client trait with OpenAI and Anthropic implementations
//! - [`prompts`] - stage prompt templates
//! - [`api`] - HTTP server with streamed plan generation
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod llm;
pub mod pipeline;
pub mod prompts;

pub use config::Config;
pub use domain::{Category, Complexity, DependencyEdge, Priority, Relationship, SequencedTask, Task, TimedTask};
pub use llm::{LlmClient, LlmError, create_client};
pub use pipeline::{Agent, FormattedOutput, Pipeline, PlanState, ProgressEvent, ProgressStatus};
