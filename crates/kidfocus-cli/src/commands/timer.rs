//! Focus timer commands.

use std::io::Write;
use std::time::Duration;

use clap::Subcommand;

use kidfocus_core::{Event, TimerSettings, TimerTicker};
use kidfocus_core::store::TIMER_SETTINGS_KEY;
use kidfocus_core::timer::TICK_PERIOD;

use crate::common;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a countdown in the foreground (Ctrl-C to stop)
    Start {
        /// Minutes (1-120)
        minutes: u32,
    },
    /// Show the configured durations
    Status,
    /// Update timer settings
    Settings {
        /// Focus minutes (5-90)
        #[arg(long)]
        focus: Option<u32>,
        /// Short break minutes (2-30)
        #[arg(long)]
        short_break: Option<u32>,
        /// Long break minutes (5-60)
        #[arg(long)]
        long_break: Option<u32>,
        /// Auto-start breaks after focus
        #[arg(long)]
        auto_start_breaks: Option<bool>,
        /// Play start/completion tones
        #[arg(long)]
        sound: Option<bool>,
    },
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Start { minutes } => {
            let rt = common::runtime()?;
            rt.block_on(async {
                let app = common::open_app()?;
                app.init();
                app.start_timer(minutes)?;
                println!("Timer running: {minutes} minutes");

                let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
                let _ticker = TimerTicker::spawn(app.timer.clone(), tx, TICK_PERIOD);

                loop {
                    tokio::select! {
                        event = rx.recv() => {
                            if let Some(Event::TimerCompleted { .. }) = event {
                                println!();
                                println!("Timer finished! Great job staying focused!");
                                app.on_timer_complete();
                                common::drain_narration(&app).await;
                            }
                            break;
                        }
                        _ = tokio::time::sleep(Duration::from_secs(1)) => {
                            print!("\r{}  ", app.timer.lock().display());
                            let _ = std::io::stdout().flush();
                        }
                    }
                }
                app.shutdown();
                Ok::<(), Box<dyn std::error::Error>>(())
            })?;
        }
        TimerAction::Status => {
            let app = common::open_app()?;
            let timer = app.timer.lock();
            let settings = timer.settings();
            println!("Display: {}", timer.display());
            println!("Focus:       {} min", settings.focus_minutes);
            println!("Short break: {} min", settings.short_break_minutes);
            println!("Long break:  {} min", settings.long_break_minutes);
            println!("Auto-start breaks: {}", settings.auto_start_breaks);
            println!("Sound: {}", settings.sound_enabled);
        }
        TimerAction::Settings {
            focus,
            short_break,
            long_break,
            auto_start_breaks,
            sound,
        } => {
            let app = common::open_app()?;
            let mut settings: TimerSettings = app.store.load_settings_doc(TIMER_SETTINGS_KEY);
            if let Some(v) = focus {
                settings.focus_minutes = v;
            }
            if let Some(v) = short_break {
                settings.short_break_minutes = v;
            }
            if let Some(v) = long_break {
                settings.long_break_minutes = v;
            }
            if let Some(v) = auto_start_breaks {
                settings.auto_start_breaks = v;
            }
            if let Some(v) = sound {
                settings.sound_enabled = v;
            }
            app.save_timer_settings(settings)?;
            println!("Timer settings saved successfully!");
        }
    }
    Ok(())
}
