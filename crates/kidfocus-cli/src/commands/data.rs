//! Export, import, and storage maintenance commands.

use std::path::PathBuf;

use clap::Subcommand;

use crate::common;

#[derive(Subcommand)]
pub enum DataAction {
    /// Export all data (minus the parent PIN) as pretty JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Merge profiles and routines from an exported file
    Import {
        /// Path to the exported JSON
        path: PathBuf,
    },
    /// Prune old completed tasks and cap behavior logs
    Cleanup {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Delete ALL data
    Clear {
        /// Skip the confirmation prompts
        #[arg(long)]
        yes: bool,
    },
    /// Record that the terms notice was accepted
    AcceptTerms,
}

pub fn run(action: DataAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = common::open_app()?;

    match action {
        DataAction::Export { output } => {
            let exported = app.store.export_data()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &exported)?;
                    println!("Data exported to {}", path.display());
                }
                None => println!("{exported}"),
            }
        }
        DataAction::Import { path } => {
            let payload = std::fs::read_to_string(&path)?;
            let summary = app.store.import_data(&payload)?;
            println!(
                "Imported {} profiles and {} routines",
                summary.profiles_added, summary.routines_added
            );
        }
        DataAction::Cleanup { yes } => {
            let decision = app.store.cleanup_decision();
            if !decision.has_anything_to_prune() {
                println!("Nothing to clean up");
                return Ok(());
            }
            println!(
                "Cleanup would remove {} old completed tasks and trim {} behavior entries",
                decision.prunable_tasks, decision.prunable_behaviors
            );
            if !yes && !common::confirm("Clean up old data now?") {
                println!("Cancelled");
                return Ok(());
            }
            let summary = app.store.cleanup_and_retry()?;
            println!(
                "Old data cleaned up: {} tasks removed, {} behaviors trimmed",
                summary.tasks_removed, summary.behaviors_trimmed
            );
        }
        DataAction::Clear { yes } => {
            if !yes {
                if !common::confirm("Are you sure? This will delete ALL data and cannot be undone!")
                {
                    println!("Cancelled");
                    return Ok(());
                }
                if !common::confirm(
                    "Really delete everything? This includes all profiles, tasks, and progress!",
                ) {
                    println!("Cancelled");
                    return Ok(());
                }
            }
            app.store.clear_all()?;
            println!("All data cleared");
        }
        DataAction::AcceptTerms => {
            app.store.set_terms_accepted(true)?;
            println!("Terms accepted");
        }
    }
    Ok(())
}
