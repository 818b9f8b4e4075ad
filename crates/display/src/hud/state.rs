use std::time::Instant;

use crate::latency::{LatencyHandle, LatencyReading};
use crate::typing::TypingAnimator;

use super::config::DisplayConfig;
use super::stats::{PlayerStats, WorldSample};

/// Values the renderer reads once per frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplaySnapshot {
    pub latency: LatencyReading,
    pub player_count: usize,
    pub experience_percent: u8,
    pub revealed_text: String,
}

/// Tick-thread side of the display: owns the typing animation and player
/// statistics and reads the probe's latency through a handle.
#[derive(Debug)]
pub struct DisplayState {
    config: DisplayConfig,
    typing: TypingAnimator,
    stats: PlayerStats,
    latency: LatencyHandle,
}

impl DisplayState {
    pub fn new(config: DisplayConfig, latency: LatencyHandle) -> Self {
        let mut state = Self {
            typing: TypingAnimator::new(config.reveal_policy),
            config: DisplayConfig::default(),
            stats: PlayerStats::default(),
            latency,
        };
        state.apply_config(config);
        state
    }

    /// Applies a (re)loaded configuration. Progress is only lost when the
    /// description or the typing toggle changes.
    pub fn apply_config(&mut self, config: DisplayConfig) {
        let config = config.sanitized();
        let animate = config.typing_effect && !config.description.is_empty();

        self.typing.set_policy(config.reveal_policy);
        self.typing
            .configure(animate, &config.description, config.typing_cadence());
        self.config = config;
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn on_tick(&mut self, now: Instant, world: Option<&WorldSample>) {
        self.stats.sample(world);
        self.typing.on_tick(now);
    }

    pub fn latency(&self) -> LatencyReading {
        self.latency.read()
    }

    pub fn revealed_text(&self) -> &str {
        self.typing.read()
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            latency: self.latency.read(),
            player_count: self.stats.player_count(),
            experience_percent: self.stats.experience_percent(),
            revealed_text: self.typing.read().to_string(),
        }
    }
}
