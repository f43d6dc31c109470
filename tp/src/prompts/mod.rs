//! Prompt templates for the model-backed planning stages

mod embedded;
mod loader;

pub use embedded::get_embedded;
pub use loader::{DurationGuideline, PromptContext, PromptLoader};
