use clap::{Parser, Subcommand};

mod commands;
mod common;
mod feedback;

#[derive(Parser)]
#[command(name = "kidfocus-cli", version, about = "Kidfocus CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Child profile management
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Positive behavior tracking
    Behavior {
        #[command(subcommand)]
        action: commands::behavior::BehaviorAction,
    },
    /// Focus timer
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Voice narration
    Voice {
        #[command(subcommand)]
        action: commands::voice::VoiceAction,
    },
    /// Calming exercises
    Exercise {
        #[command(subcommand)]
        action: commands::exercise::ExerciseAction,
    },
    /// SOS crisis mode
    Sos {
        #[command(subcommand)]
        action: commands::sos::SosAction,
    },
    /// Export, import, and cleanup
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
    /// Parent PIN
    Pin {
        #[command(subcommand)]
        action: commands::pin::PinAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Profile { action } => commands::profile::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Behavior { action } => commands::behavior::run(action),
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Voice { action } => commands::voice::run(action),
        Commands::Exercise { action } => commands::exercise::run(action),
        Commands::Sos { action } => commands::sos::run(action),
        Commands::Data { action } => commands::data::run(action),
        Commands::Pin { action } => commands::pin::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
