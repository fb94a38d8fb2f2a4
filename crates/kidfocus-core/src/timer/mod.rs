pub mod engine;
pub mod settings;
pub mod ticker;

pub use engine::{FocusTimer, TimerPhase};
pub use settings::TimerSettings;
pub use ticker::{SharedTimer, TimerTicker, TICK_PERIOD};
