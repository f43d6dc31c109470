//! Renderer - Markdown, Mermaid gantt and summary views of a plan
//!
//! Pure functions of the sequenced tasks; no model call is made. Any failure
//! replaces the whole output with a single error marker.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{Agent, FormattedOutput, PlanState, RenderError};
use crate::domain::{Category, Complexity, Priority, SequencedTask};

const GANTT_NAME_LIMIT: usize = 50;
const GANTT_DEFAULT_START: &str = "2024-01-01";
const GANTT_DEFAULT_SECTION: &str = "general";
const UNCATEGORIZED: &str = "uncategorized";

/// All views of a successfully rendered plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedPlan {
    pub json: Vec<SequencedTask>,
    pub markdown: String,
    pub mermaid_gantt: String,
    pub summary: PlanSummary,
}

/// Aggregate statistics over a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub project_statement: String,
    pub total_tasks: usize,
    pub estimated_duration_days: f64,
    pub category_distribution: BTreeMap<String, usize>,
    pub complexity_distribution: BTreeMap<String, usize>,
    pub priority_distribution: BTreeMap<String, usize>,
}

/// Run the rendering stage
pub fn render(state: &PlanState) -> PlanState {
    info!(task_count = state.dependency_tasks.len(), "Converting to structured output formats");

    match render_plan(&state.dependency_tasks, &state.project_statement) {
        Ok(plan) => PlanState {
            formatted_output: Some(FormattedOutput::Rendered(plan)),
            current_agent: Some(Agent::Formatter),
            ..state.clone()
        },
        Err(e) => {
            warn!(error = %e, "rendering failed");
            let entry = Agent::Formatter.error_entry(&e);
            PlanState {
                formatted_output: Some(FormattedOutput::Failed { error: entry.clone() }),
                current_agent: Some(Agent::Formatter),
                errors: state.errors_with(entry),
                ..state.clone()
            }
        }
    }
}

/// Build every view of the plan
pub fn render_plan(tasks: &[SequencedTask], project_statement: &str) -> Result<RenderedPlan, RenderError> {
    debug!(task_count = tasks.len(), "render_plan: called");
    check_durations(tasks)?;

    Ok(RenderedPlan {
        json: tasks.to_vec(),
        markdown: markdown(tasks)?,
        mermaid_gantt: mermaid_gantt(tasks)?,
        summary: summary(tasks, project_statement),
    })
}

fn check_durations(tasks: &[SequencedTask]) -> Result<(), RenderError> {
    for task in tasks {
        if let Some(value) = task.timed.estimated_duration_days
            && (!value.is_finite() || value < 0.0)
        {
            return Err(RenderError::InvalidDuration {
                task_id: task.id().to_string(),
                value,
            });
        }
    }
    Ok(())
}

/// Markdown document grouped by category
pub fn markdown(tasks: &[SequencedTask]) -> Result<String, RenderError> {
    let mut md = String::from("# Project Plan\n\n");
    writeln!(md, "Total Tasks: {}", tasks.len())?;
    writeln!(md, "Estimated Duration: {:.1} days\n", total_duration(tasks))?;

    for (category, group) in group_by_category(tasks, UNCATEGORIZED) {
        writeln!(md, "## {}\n", title_case(category))?;
        for task in group {
            let core = task.task();
            writeln!(md, "### {}", core.name)?;
            writeln!(md, "ID: {}", core.id)?;
            writeln!(md, "Description: {}", core.description)?;
            match task.timed.estimated_duration_days {
                Some(days) => writeln!(md, "**Duration:** {} days", format_days(days))?,
                None => writeln!(md, "**Duration:** N/A")?,
            }
            writeln!(md, "Complexity: {}", display_or_na(core.complexity))?;
            writeln!(md, "Priority: {}", display_or_na(task.priority))?;

            if !task.dependencies.is_empty() {
                writeln!(md, "Dependencies:")?;
                for dep in &task.dependencies {
                    writeln!(md, "- {}: {}", dep.depends_on, dep.description)?;
                }
            }
            md.push('\n');
        }
    }

    Ok(md)
}

/// Mermaid gantt chart with one section per category
pub fn mermaid_gantt(tasks: &[SequencedTask]) -> Result<String, RenderError> {
    let mut gantt = String::from("gantt\n    title Project Timeline\n    dateFormat YYYY-MM-DD\n\n");

    for (category, group) in group_by_category(tasks, GANTT_DEFAULT_SECTION) {
        writeln!(gantt, "    section {}", title_case(category))?;
        for task in group {
            let name: String = task.task().name.chars().take(GANTT_NAME_LIMIT).collect();
            let start = task
                .timed
                .start_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| GANTT_DEFAULT_START.to_string());
            let days = task.timed.estimated_duration_days.map(|d| d.floor() as u64).unwrap_or(1);
            writeln!(gantt, "    {} :{}, {}, {}d", name, task.id(), start, days)?;
        }
    }

    Ok(gantt)
}

/// Counts and totals over the plan
pub fn summary(tasks: &[SequencedTask], project_statement: &str) -> PlanSummary {
    let mut category_distribution = BTreeMap::new();
    let mut complexity_distribution = seeded_levels();
    let mut priority_distribution = seeded_levels();

    for task in tasks {
        let category = task.task().category.map(|c| c.as_str()).unwrap_or(UNCATEGORIZED);
        *category_distribution.entry(category.to_string()).or_insert(0) += 1;

        let complexity = task.task().complexity.unwrap_or(Complexity::Medium);
        *complexity_distribution.entry(complexity.to_string()).or_insert(0) += 1;

        let priority = task.priority.unwrap_or(Priority::Medium);
        *priority_distribution.entry(priority.to_string()).or_insert(0) += 1;
    }

    PlanSummary {
        project_statement: project_statement.to_string(),
        total_tasks: tasks.len(),
        estimated_duration_days: round_one_decimal(total_duration(tasks)),
        category_distribution,
        complexity_distribution,
        priority_distribution,
    }
}

fn seeded_levels() -> BTreeMap<String, usize> {
    ["low", "medium", "high"].into_iter().map(|l| (l.to_string(), 0)).collect()
}

fn total_duration(tasks: &[SequencedTask]) -> f64 {
    // fold from +0.0: an empty f64 sum is -0.0
    tasks
        .iter()
        .filter_map(|t| t.timed.estimated_duration_days)
        .fold(0.0, |acc, d| acc + d)
}

/// Round to one decimal place, ties to even (0.25 -> 0.2)
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Group tasks by category name, keeping first-appearance order
fn group_by_category<'a>(
    tasks: &'a [SequencedTask],
    missing: &'static str,
) -> Vec<(&'static str, Vec<&'a SequencedTask>)> {
    let mut groups: Vec<(&'static str, Vec<&SequencedTask>)> = Vec::new();
    for task in tasks {
        let name = task.task().category.as_ref().map(Category::as_str).unwrap_or(missing);
        match groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, group)) => group.push(task),
            None => groups.push((name, vec![task])),
        }
    }
    groups
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whole numbers keep one decimal place ("2.0"), others print as-is
fn format_days(days: f64) -> String {
    if days.fract() == 0.0 {
        format!("{:.1}", days)
    } else {
        days.to_string()
    }
}

fn display_or_na<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyEdge, Task, TimedTask};
    use crate::pipeline::testing::DEPENDENCY_JSON;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn todo_task() -> SequencedTask {
        let task = Task::new("task_1", "Design UI", "Sketch the screens")
            .with_category(Category::Development)
            .with_complexity(Complexity::Medium);
        let timed = TimedTask::untimed(task).with_duration(3.0).with_dates(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        );
        SequencedTask::unsequenced(timed).with_priority(Priority::High)
    }

    fn fixture() -> Vec<SequencedTask> {
        serde_json::from_str(DEPENDENCY_JSON).unwrap()
    }

    #[test]
    fn test_single_task_plan() {
        let plan = render_plan(&[todo_task()], "Build a todo app").unwrap();

        assert!(plan.markdown.starts_with("# Project Plan\n\nTotal Tasks: 1\nEstimated Duration: 3.0 days\n"));
        assert!(plan.markdown.contains("## Development\n\n### Design UI\nID: task_1\n"));
        assert!(plan.markdown.contains("**Duration:** 3.0 days"));
        assert!(plan.markdown.contains("Priority: high"));
        assert!(!plan.markdown.contains("Dependencies:"));

        assert!(plan.mermaid_gantt.contains("    section Development\n"));
        assert!(plan.mermaid_gantt.contains("    Design UI :task_1, 2024-01-01, 3d\n"));

        assert_eq!(plan.summary.total_tasks, 1);
        assert_eq!(plan.summary.estimated_duration_days, 3.0);
        assert_eq!(plan.summary.category_distribution["development"], 1);
        assert_eq!(plan.summary.priority_distribution["high"], 1);
        assert_eq!(plan.summary.priority_distribution["low"], 0);
        assert_eq!(plan.json.len(), 1);
    }

    #[test]
    fn test_empty_plan() {
        let plan = render_plan(&[], "Nothing").unwrap();
        assert!(plan.markdown.contains("Total Tasks: 0"));
        assert!(plan.markdown.contains("Estimated Duration: 0.0 days"));
        assert_eq!(plan.summary.total_tasks, 0);
        assert!(plan.summary.category_distribution.is_empty());
        assert_eq!(plan.summary.complexity_distribution.len(), 3);
        assert_eq!(plan.mermaid_gantt, "gantt\n    title Project Timeline\n    dateFormat YYYY-MM-DD\n\n");

        let summary = serde_json::to_value(&plan.summary).unwrap();
        assert_eq!(summary["estimated_duration_days"].to_string(), "0.0");
    }

    #[test]
    fn test_untimed_plan_totals_positive_zero() {
        let task = SequencedTask::unsequenced(TimedTask::untimed(Task::new("t", "n", "d")));
        let plan = render_plan(&[task], "x").unwrap();
        assert!(plan.markdown.contains("Estimated Duration: 0.0 days"));
        assert!(plan.summary.estimated_duration_days.is_sign_positive());
    }

    #[test]
    fn test_round_one_decimal_ties_to_even() {
        assert_eq!(round_one_decimal(0.25), 0.2);
        assert_eq!(round_one_decimal(0.75), 0.8);
        assert_eq!(round_one_decimal(3.14), 3.1);
        assert_eq!(round_one_decimal(0.0), 0.0);
    }

    #[test]
    fn test_categories_in_first_appearance_order() {
        let mut tasks = fixture();
        tasks.push(SequencedTask::unsequenced(TimedTask::untimed(
            Task::new("task_4", "More planning", "x").with_category(Category::Planning),
        )));
        let md = markdown(&tasks).unwrap();

        let planning = md.find("## Planning").unwrap();
        let development = md.find("## Development").unwrap();
        let testing = md.find("## Testing").unwrap();
        assert!(planning < development && development < testing);
        assert_eq!(md.matches("## Planning").count(), 1);
        assert!(md.contains("Dependencies:\n- task_1: Needs the feature list\n"));
    }

    #[test]
    fn test_gantt_defaults_and_truncation() {
        let long_name = "x".repeat(80);
        let task = SequencedTask::unsequenced(TimedTask::untimed(Task::new("task_9", long_name, "d")));
        let gantt = mermaid_gantt(&[task]).unwrap();

        assert!(gantt.contains("    section General\n"));
        assert!(gantt.contains(&format!("    {} :task_9, 2024-01-01, 1d\n", "x".repeat(50))));
    }

    #[test]
    fn test_gantt_floors_fractional_duration() {
        let gantt = mermaid_gantt(&fixture()).unwrap();
        assert!(gantt.contains("    Build UI :task_2, 2025-01-07, 3d\n"));
    }

    #[test]
    fn test_missing_fields_summary_defaults() {
        let task = SequencedTask::unsequenced(TimedTask::untimed(Task::new("t", "n", "d")));
        let summary = summary(&[task.clone()], "s");
        assert_eq!(summary.category_distribution["uncategorized"], 1);
        assert_eq!(summary.complexity_distribution["medium"], 1);
        assert_eq!(summary.priority_distribution["medium"], 1);

        let md = markdown(&[task]).unwrap();
        assert!(md.contains("## Uncategorized"));
        assert!(md.contains("**Duration:** N/A"));
        assert!(md.contains("Complexity: N/A"));
    }

    #[test]
    fn test_summary_rounds_total() {
        let tasks: Vec<SequencedTask> = [0.33, 0.33, 0.33]
            .iter()
            .enumerate()
            .map(|(i, d)| {
                SequencedTask::unsequenced(TimedTask::untimed(Task::new(format!("t{i}"), "n", "d")).with_duration(*d))
            })
            .collect();
        assert_eq!(summary(&tasks, "s").estimated_duration_days, 1.0);
    }

    #[test]
    fn test_invalid_duration_fails_whole_output() {
        let bad = SequencedTask::unsequenced(TimedTask::untimed(Task::new("bad", "n", "d")).with_duration(f64::NAN));
        let state = PlanState {
            dependency_tasks: vec![todo_task(), bad],
            errors: vec!["Timeline Agent Error: earlier".to_string()],
            ..PlanState::new("x")
        };
        let rendered = render(&state);

        match rendered.formatted_output {
            Some(FormattedOutput::Failed { ref error }) => {
                assert!(error.starts_with("Formatter Agent Error: task bad has invalid duration"));
                assert_eq!(rendered.errors.last(), Some(error));
            }
            other => panic!("expected failure marker, got {:?}", other),
        }
        assert_eq!(rendered.errors.len(), 2);
        assert_eq!(rendered.current_agent, Some(Agent::Formatter));
    }

    #[test]
    fn test_render_is_idempotent() {
        let state = PlanState {
            dependency_tasks: fixture(),
            ..PlanState::new("Build a todo app")
        };
        let first = render(&state);
        let second = render(&state);
        assert_eq!(first.formatted_output, second.formatted_output);
        assert_eq!(render(&first).formatted_output, first.formatted_output);
    }

    #[test]
    fn test_dependency_edge_without_description() {
        let task = todo_task().with_dependency(DependencyEdge::finish_to_start("task_0", ""));
        assert!(markdown(&[task]).unwrap().contains("- task_0: \n"));
    }

    fn arb_task() -> impl Strategy<Value = SequencedTask> {
        let category = prop_oneof![
            Just(None),
            Just(Some(Category::Development)),
            Just(Some(Category::Testing)),
            Just(Some(Category::Documentation)),
            Just(Some(Category::Deployment)),
            Just(Some(Category::Planning)),
        ];
        (
            "[a-z0-9_]{1,8}",
            ".{0,80}",
            category,
            proptest::option::of(0.0f64..30.0),
        )
            .prop_map(|(id, name, category, duration)| {
                let mut task = Task::new(id, name, "d");
                task.category = category;
                let mut timed = TimedTask::untimed(task);
                timed.estimated_duration_days = duration;
                SequencedTask::unsequenced(timed)
            })
    }

    proptest! {
        #[test]
        fn prop_distributions_cover_every_task(tasks in proptest::collection::vec(arb_task(), 0..20)) {
            let plan = render_plan(&tasks, "p").unwrap();
            let summary = &plan.summary;
            prop_assert_eq!(summary.total_tasks, tasks.len());
            prop_assert_eq!(summary.category_distribution.values().sum::<usize>(), tasks.len());
            prop_assert_eq!(summary.complexity_distribution.values().sum::<usize>(), tasks.len());
            prop_assert_eq!(summary.priority_distribution.values().sum::<usize>(), tasks.len());
        }
    }
}
