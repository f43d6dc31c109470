//! Prompt Loader
//!
//! Loads prompt templates from an override directory or falls back to the
//! embedded defaults, then renders them with Handlebars.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;
use crate::domain::Complexity;

/// One line of the estimator's duration guidance
#[derive(Debug, Clone, Serialize)]
pub struct DurationGuideline {
    pub label: String,
    pub range: String,
}

impl DurationGuideline {
    fn for_complexity(complexity: Complexity) -> Self {
        let (min, max) = complexity.duration_range_days();
        let label = complexity.as_str();
        let mut chars = label.chars();
        let label = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        Self {
            label,
            range: format!("{}-{}", min, max),
        }
    }
}

/// Values substituted into the stage templates
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext {
    pub project_statement: String,
    pub start_date: String,
    pub duration_guidelines: Vec<DurationGuideline>,
}

impl PromptContext {
    pub fn new(project_statement: impl Into<String>, start_date: NaiveDate) -> Self {
        let project_statement = project_statement.into();
        debug!(statement_len = project_statement.len(), %start_date, "PromptContext::new: called");
        Self {
            project_statement,
            start_date: start_date.format("%Y-%m-%d").to_string(),
            duration_guidelines: [Complexity::Low, Complexity::Medium, Complexity::High]
                .into_iter()
                .map(DurationGuideline::for_complexity)
                .collect(),
        }
    }
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// Override directory (e.g., `.taskplanner/prompts/`)
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a new prompt loader that prefers templates in `override_dir`
    pub fn new(override_dir: impl AsRef<Path>) -> Self {
        let override_dir = override_dir.as_ref();
        let exists = override_dir.is_dir();
        debug!(?override_dir, %exists, "PromptLoader::new: called");

        Self {
            hbs: Self::engine(),
            override_dir: if exists { Some(override_dir.to_path_buf()) } else { None },
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            override_dir: None,
        }
    }

    /// Prompts are plain text, so HTML escaping is turned off
    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. Override: `<override_dir>/{name}.pmt`
    /// 2. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref dir) = self.override_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt override {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: using embedded");
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render(&self, template_name: &str, context: &PromptContext) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }
}
