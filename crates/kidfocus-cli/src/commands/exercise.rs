//! Calming exercise commands.

use std::time::Duration;

use clap::Subcommand;

use kidfocus_core::{ExerciseKind, ExerciseState};

use crate::common;

#[derive(Subcommand)]
pub enum ExerciseAction {
    /// List available exercises
    List,
    /// Run an exercise in the foreground (Ctrl-C to stop)
    Start {
        /// Exercise name, e.g. breathing, body-scan, 54321-grounding
        name: String,
    },
}

fn parse_kind(name: &str) -> Option<ExerciseKind> {
    ExerciseKind::ALL
        .into_iter()
        .find(|kind| kind.to_string() == name)
}

pub fn run(action: ExerciseAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ExerciseAction::List => {
            for kind in ExerciseKind::ALL {
                let script = kidfocus_core::exercise::script_for(kind);
                let length = if script.looped {
                    "until stopped".to_string()
                } else {
                    let secs: u64 = script.steps.iter().map(|s| s.duration.as_secs()).sum();
                    format!("~{secs}s")
                };
                println!("{kind} ({length})");
            }
        }
        ExerciseAction::Start { name } => {
            let kind = parse_kind(&name)
                .ok_or_else(|| format!("Unknown exercise: {name} (see `exercise list`)"))?;
            let rt = common::runtime()?;
            rt.block_on(async {
                let app = common::open_app()?;
                app.init();
                app.exercises.start(kind);
                println!("Starting {kind} exercise");

                while app.exercises.state() != ExerciseState::Idle {
                    tokio::time::sleep(Duration::from_millis(250)).await;
                }
                common::drain_narration(&app).await;
                app.shutdown();
                Ok::<(), Box<dyn std::error::Error>>(())
            })?;
        }
    }
    Ok(())
}
