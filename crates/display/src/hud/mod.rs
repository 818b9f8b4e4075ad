mod config;
mod panel;
mod state;
mod stats;

pub use config::{DisplayConfig, DisplayToggles, Labels, MAX_TYPING_SPEED_MS, MIN_TYPING_SPEED_MS};
pub use panel::panel_lines;
pub use state::{DisplaySnapshot, DisplayState};
pub use stats::{PlayerStats, WorldSample};
