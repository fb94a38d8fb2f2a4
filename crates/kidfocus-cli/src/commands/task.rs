//! Task management commands.

use chrono::NaiveDate;
use clap::Subcommand;

use kidfocus_core::{Event, TaskPriority};

use crate::common;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task for the current child
    Add {
        /// Task text
        text: String,
        /// Category label
        #[arg(long, default_value = "Homework")]
        category: String,
        /// Priority: low, normal, or high
        #[arg(long, default_value = "normal")]
        priority: String,
        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,
    },
    /// List the current child's tasks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Only show incomplete tasks
        #[arg(long)]
        pending: bool,
    },
    /// Complete a task
    Complete {
        /// Task id
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task id
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TaskAction::Add {
            text,
            category,
            priority,
            deadline,
        } => {
            let mut app = common::open_app()?;
            let priority = match priority.as_str() {
                "low" => TaskPriority::Low,
                "high" => TaskPriority::High,
                _ => TaskPriority::Normal,
            };
            let deadline = deadline
                .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
                .transpose()?;
            let event = app.store.add_task(&text, &category, priority, deadline)?;
            if let Event::TaskAdded { task_id, text, .. } = event {
                println!("Task added: {text} ({task_id})");
            }
        }
        TaskAction::List { json, pending } => {
            let app = common::open_app()?;
            let Some(profile) = app.store.current_profile() else {
                println!("No child profile selected");
                return Ok(());
            };
            let tasks: Vec<_> = profile
                .tasks
                .iter()
                .filter(|t| !pending || !t.completed)
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks yet. Add your first task!");
            } else {
                for task in tasks {
                    let check = if task.completed { "x" } else { " " };
                    let deadline = task
                        .deadline
                        .map(|d| format!(" due {d}"))
                        .unwrap_or_default();
                    println!(
                        "[{check}] {}: {}{deadline} ({})",
                        task.category, task.text, task.id
                    );
                }
            }
        }
        TaskAction::Complete { id } => {
            let rt = common::runtime()?;
            rt.block_on(async {
                let mut app = common::open_app()?;
                app.init();
                match app.complete_task(&id)? {
                    Some(Event::TaskCompleted {
                        points_awarded,
                        reward_points,
                        ..
                    }) => {
                        println!("Task completed! +{points_awarded} points (total {reward_points})");
                    }
                    _ => println!("Task was already completed"),
                }
                common::drain_narration(&app).await;
                app.shutdown();
                Ok::<(), Box<dyn std::error::Error>>(())
            })?;
        }
        TaskAction::Delete { id, yes } => {
            let mut app = common::open_app()?;
            if !yes && !common::confirm("Delete this task?") {
                println!("Cancelled");
                return Ok(());
            }
            if let Event::TaskDeleted { text, .. } = app.store.delete_task(&id)? {
                println!("Task deleted: {text}");
            }
        }
    }
    Ok(())
}
