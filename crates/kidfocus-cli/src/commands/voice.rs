//! Voice narration commands.

use clap::Subcommand;

use kidfocus_core::{SpeakOptions, SpeechContext};

use crate::common;

#[derive(Subcommand)]
pub enum VoiceAction {
    /// Speak a test message
    Test {
        /// Message to speak
        #[arg(default_value = "Hi! I'm your helper voice. You're doing great today!")]
        text: String,
    },
    /// Show voice settings
    Show,
    /// Update voice settings
    Set {
        /// Speech rate (e.g. 0.9)
        #[arg(long)]
        speed: Option<f32>,
        /// Pitch (e.g. 1.0)
        #[arg(long)]
        pitch: Option<f32>,
        /// Volume (0.0-1.0)
        #[arg(long)]
        volume: Option<f32>,
        /// Enable or disable narration
        #[arg(long)]
        enabled: Option<bool>,
        /// Voice index from `voice list`
        #[arg(long)]
        voice: Option<usize>,
    },
    /// List available voices
    List,
}

pub fn run(action: VoiceAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        VoiceAction::Test { text } => {
            let rt = common::runtime()?;
            rt.block_on(async {
                let app = common::open_app()?;
                app.init();
                app.narration.speak(
                    &text,
                    SpeakOptions {
                        context: SpeechContext::General,
                        delay_ms: Some(0),
                        ..SpeakOptions::default()
                    },
                );
                common::drain_narration(&app).await;
                app.shutdown();
                Ok::<(), Box<dyn std::error::Error>>(())
            })?;
        }
        VoiceAction::Show => {
            let app = common::open_app()?;
            let settings = app.narration.settings();
            println!("Enabled: {}", settings.enabled);
            println!("Speed:   {}", settings.speed);
            println!("Pitch:   {}", settings.pitch);
            println!("Volume:  {}", settings.volume);
            match settings.selected_voice {
                Some(index) => println!("Voice:   #{index}"),
                None => println!("Voice:   engine default"),
            }
        }
        VoiceAction::Set {
            speed,
            pitch,
            volume,
            enabled,
            voice,
        } => {
            let app = common::open_app()?;
            app.narration.update_settings(|settings| {
                if let Some(v) = speed {
                    settings.speed = v;
                }
                if let Some(v) = pitch {
                    settings.pitch = v;
                }
                if let Some(v) = volume {
                    settings.volume = v;
                }
                if let Some(v) = enabled {
                    settings.enabled = v;
                }
                if let Some(v) = voice {
                    settings.selected_voice = Some(v);
                }
            });
            app.save_voice_settings()?;
            println!("Voice settings saved");
        }
        VoiceAction::List => {
            let app = common::open_app()?;
            app.narration.refresh_voices();
            let voices = app.narration.voices();
            if voices.is_empty() {
                println!("No voices available yet");
            } else {
                for (index, voice) in voices.iter().enumerate() {
                    let default = if voice.default { " [Default]" } else { "" };
                    println!("{index}: {} ({}){default}", voice.name, voice.lang);
                }
            }
        }
    }
    Ok(())
}
