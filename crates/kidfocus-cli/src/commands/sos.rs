//! SOS crisis mode commands.

use clap::Subcommand;

use kidfocus_core::{meltdown_patterns, Event, PatternReport, SosActivity};

use crate::common;

#[derive(Subcommand)]
pub enum SosAction {
    /// Start a calming session; press Enter when the child feels better
    Activate {
        /// Calming activity: breathing, sound, or movement
        #[arg(long)]
        activity: Option<String>,
        /// Also notify a grown-up
        #[arg(long)]
        call_help: bool,
    },
    /// Show regulation patterns for the current child
    Patterns {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the recent SOS event log
    Log {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_activity(name: &str) -> Option<SosActivity> {
    match name {
        "breathing" => Some(SosActivity::Breathing),
        "sound" => Some(SosActivity::Sound),
        "movement" => Some(SosActivity::Movement),
        _ => None,
    }
}

pub fn run(action: SosAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SosAction::Activate {
            activity,
            call_help,
        } => {
            let activity = activity
                .map(|name| {
                    parse_activity(&name)
                        .ok_or_else(|| format!("Unknown activity: {name}"))
                })
                .transpose()?;

            let rt = common::runtime()?;
            let mut app = rt.block_on(async {
                let mut app = common::open_app()?;
                app.init();
                app.activate_sos()?;
                if let Some(activity) = activity {
                    app.start_sos_activity(activity);
                }
                if call_help {
                    app.call_for_help()?;
                }
                common::drain_narration(&app).await;
                Ok::<_, Box<dyn std::error::Error>>(app)
            })?;

            println!("Press Enter when you feel better...");
            let mut line = String::new();
            let _ = std::io::stdin().read_line(&mut line);

            rt.block_on(async {
                if let Some(Event::SosResolved { duration_secs, .. }) = app.resolve_sos()? {
                    println!("You did an amazing job calming down! ({duration_secs}s)");
                }
                common::drain_narration(&app).await;
                app.shutdown();
                Ok::<(), Box<dyn std::error::Error>>(())
            })?;
        }
        SosAction::Patterns { json } => {
            let app = common::open_app()?;
            let Some(profile) = app.store.current_profile() else {
                println!("No child profile selected");
                return Ok(());
            };
            let report = meltdown_patterns(profile, chrono::Utc::now());
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }
            match report {
                PatternReport::InsufficientData => {
                    println!("Not enough data yet to identify patterns");
                }
                PatternReport::Patterns(patterns) => {
                    println!("Total SOS activations: {}", patterns.total_events);
                    println!("Last 7 days:           {}", patterns.last_7_days);
                    println!(
                        "Most common time:      {}",
                        kidfocus_core::sos::format_hour(patterns.most_common_hour)
                    );
                    println!("Most common day:       {}", patterns.most_common_day);
                    if let Some(secs) = patterns.average_duration_secs {
                        println!("Average duration:      {secs}s");
                    }
                    if let Some(strategy) = patterns.most_effective_strategy {
                        println!("Most used strategy:    {strategy}");
                    }
                }
            }
        }
        SosAction::Log { json } => {
            let app = common::open_app()?;
            let Some(profile) = app.store.current_profile() else {
                println!("No child profile selected");
                return Ok(());
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&profile.meltdown_log)?);
            } else if profile.meltdown_log.is_empty() {
                println!("No SOS events recorded yet");
            } else {
                for event in profile.meltdown_log.iter().rev().take(20) {
                    let mut line = format!(
                        "{} {:?}",
                        event.timestamp.format("%Y-%m-%d %H:%M"),
                        event.kind
                    );
                    if let Some(secs) = event.duration_secs {
                        line.push_str(&format!(" ({secs}s)"));
                    }
                    if let Some(activity) = event.activity_used {
                        line.push_str(&format!(" via {activity}"));
                    }
                    println!("{line}");
                }
            }
        }
    }
    Ok(())
}
