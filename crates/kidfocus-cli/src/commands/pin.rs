//! Parent PIN commands.

use clap::Subcommand;

use crate::common;

#[derive(Subcommand)]
pub enum PinAction {
    /// Change the parent PIN
    Change {
        /// Current PIN
        #[arg(long)]
        current: String,
        /// New 4-digit PIN
        #[arg(long)]
        new: String,
    },
    /// Check a PIN against the stored hash
    Verify {
        pin: String,
    },
}

pub fn run(action: PinAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = common::open_app()?;

    match action {
        PinAction::Change { current, new } => {
            app.store.change_pin(&current, &new)?;
            println!("PIN changed successfully");
        }
        PinAction::Verify { pin } => {
            if app.store.validate_pin(&pin) {
                println!("PIN is correct");
            } else {
                println!("PIN is incorrect");
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
