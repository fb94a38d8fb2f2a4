//! Profile management commands.

use clap::Subcommand;

use kidfocus_core::{meltdown_patterns, Event, PatternReport};

use crate::common;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Create a new child profile
    Create {
        /// Child's name
        name: String,
        /// Child's age (3-18)
        age: u32,
    },
    /// List profiles
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Select the current profile by name or id
    Switch {
        name_or_id: String,
    },
    /// Deselect the current profile
    Deselect,
    /// Delete a profile
    Delete {
        name_or_id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show the current child's stats and regulation patterns
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reset the current child's tasks, behaviors, and points
    ResetStats {
        /// Skip the confirmation prompts
        #[arg(long)]
        yes: bool,
    },
    /// Manage meltdown warning signs
    Warning {
        #[command(subcommand)]
        action: WarningAction,
    },
}

#[derive(Subcommand)]
pub enum WarningAction {
    /// Add a warning sign
    Add { text: String },
    /// Remove a warning sign by index
    Remove { index: usize },
    /// List warning signs
    List,
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = common::open_app()?;

    match action {
        ProfileAction::Create { name, age } => {
            let event = app.store.create_profile(&name, age)?;
            if let Event::ProfileCreated { profile_id, name, .. } = event {
                println!("Profile created for {name} ({profile_id})");
            }
        }
        ProfileAction::List { json } => {
            let profiles = &app.store.document().profiles;
            if json {
                println!("{}", serde_json::to_string_pretty(profiles)?);
            } else if profiles.is_empty() {
                println!("No profiles created yet");
            } else {
                let current = app.store.document().current_profile.clone();
                for profile in profiles {
                    let marker = if current.as_deref() == Some(profile.id.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    println!(
                        "{marker} {} ({} years) - {} points [{}]",
                        profile.name, profile.age, profile.reward_points, profile.id
                    );
                }
            }
        }
        ProfileAction::Switch { name_or_id } => {
            let id = common::resolve_profile_id(&app, &name_or_id)
                .ok_or_else(|| format!("Profile not found: {name_or_id}"))?;
            if let Event::ProfileSwitched { name, .. } = app.store.switch_profile(Some(id.as_str()))? {
                println!("Switched to {}'s profile", name.unwrap_or_default());
            }
        }
        ProfileAction::Deselect => {
            app.store.switch_profile(None)?;
            println!("No profile selected");
        }
        ProfileAction::Delete { name_or_id, yes } => {
            let id = common::resolve_profile_id(&app, &name_or_id)
                .ok_or_else(|| format!("Profile not found: {name_or_id}"))?;
            if !yes
                && !common::confirm(&format!(
                    "Delete {name_or_id}'s profile? This cannot be undone."
                ))
            {
                println!("Cancelled");
                return Ok(());
            }
            if let Event::ProfileDeleted { name, .. } = app.store.delete_profile(&id)? {
                println!("Profile deleted: {name}");
            }
        }
        ProfileAction::Stats { json } => {
            let Some(stats) = app.store.child_stats() else {
                println!("No child profile selected");
                return Ok(());
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{} ({} years old)", stats.name, stats.age);
                println!("  Total points:   {}", stats.reward_points);
                println!(
                    "  Tasks done:     {}/{}",
                    stats.completed_tasks, stats.total_tasks
                );
                println!("  Good behaviors: {}", stats.total_behaviors);
            }
            if let Some(profile) = app.store.current_profile() {
                match meltdown_patterns(profile, chrono::Utc::now()) {
                    PatternReport::InsufficientData => {
                        println!("  Not enough data yet to identify regulation patterns");
                    }
                    PatternReport::Patterns(patterns) => {
                        println!("  Regulation patterns:");
                        println!("    SOS activations: {}", patterns.total_events);
                        println!("    Last 7 days:     {}", patterns.last_7_days);
                        println!(
                            "    Most common:     {} on {}s",
                            kidfocus_core::sos::format_hour(patterns.most_common_hour),
                            patterns.most_common_day
                        );
                        if let Some(secs) = patterns.average_duration_secs {
                            println!("    Avg calm-down:   {secs}s");
                        }
                        if let Some(strategy) = patterns.most_effective_strategy {
                            println!("    Best strategy:   {strategy}");
                        }
                    }
                }
            }
        }
        ProfileAction::ResetStats { yes } => {
            let Some(stats) = app.store.child_stats() else {
                println!("No child profile selected");
                return Ok(());
            };
            if !yes {
                let first = common::confirm(&format!(
                    "Reset all stats for {}? This clears tasks, behaviors, and points.",
                    stats.name
                ));
                if !first || !common::confirm(&format!("Last chance! Reset all progress for {}?", stats.name)) {
                    println!("Cancelled");
                    return Ok(());
                }
            }
            if let Event::StatsReset { name, .. } = app.store.reset_stats()? {
                println!("{name}'s stats have been reset to zero");
            }
        }
        ProfileAction::Warning { action } => match action {
            WarningAction::Add { text } => {
                app.store.add_warning_sign(&text)?;
                println!("Warning sign added");
            }
            WarningAction::Remove { index } => {
                app.store.remove_warning_sign(index)?;
                println!("Warning sign removed");
            }
            WarningAction::List => {
                let Some(profile) = app.store.current_profile() else {
                    println!("No child profile selected");
                    return Ok(());
                };
                if profile.warning_signs.is_empty() {
                    println!("No warning signs added yet");
                } else {
                    for (i, sign) in profile.warning_signs.iter().enumerate() {
                        println!("{i}: {sign}");
                    }
                }
            }
        },
    }
    Ok(())
}
