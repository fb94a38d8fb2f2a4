//! Positive behavior tracking commands.

use clap::Subcommand;

use kidfocus_core::Event;

use crate::common;

#[derive(Subcommand)]
pub enum BehaviorAction {
    /// Record a positive behavior for the current child
    Mark {
        /// Behavior name, e.g. "Sharing"
        behavior: String,
    },
    /// List recorded behaviors
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: BehaviorAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        BehaviorAction::Mark { behavior } => {
            let rt = common::runtime()?;
            rt.block_on(async {
                let mut app = common::open_app()?;
                app.init();
                let event = app.mark_behavior(&behavior)?;
                if let Event::BehaviorMarked {
                    behavior,
                    points_awarded,
                    reward_points,
                    ..
                } = event
                {
                    println!(
                        "Great {} behavior! +{points_awarded} points (total {reward_points})",
                        behavior.to_lowercase()
                    );
                }
                common::drain_narration(&app).await;
                app.shutdown();
                Ok::<(), Box<dyn std::error::Error>>(())
            })?;
        }
        BehaviorAction::List { json } => {
            let app = common::open_app()?;
            let Some(profile) = app.store.current_profile() else {
                println!("No child profile selected");
                return Ok(());
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&profile.behaviors)?);
            } else if profile.behaviors.is_empty() {
                println!("No positive behaviors recorded yet!");
            } else {
                for entry in &profile.behaviors {
                    println!(
                        "{} (+{}) at {}",
                        entry.behavior,
                        entry.points,
                        entry.time.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }
    }
    Ok(())
}
