use std::time::Duration;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::latency::{NOT_APPLICABLE_MARKER, TIMED_OUT_MARKER};
use crate::typing::RevealPolicy;

pub const MIN_TYPING_SPEED_MS: u64 = 50;
pub const MAX_TYPING_SPEED_MS: u64 = 500;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DisplayToggles: u8 {
        const TITLE = 1 << 0;
        const EXPERIENCE = 1 << 1;
        const DESCRIPTION = 1 << 2;
    }
}

impl Default for DisplayToggles {
    fn default() -> Self {
        Self::TITLE | Self::DESCRIPTION
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub enabled: bool,
    pub toggles: DisplayToggles,
    pub typing_effect: bool,
    pub title: String,
    pub description: String,
    pub typing_speed_ms: u64,
    pub reveal_policy: RevealPolicy,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            toggles: DisplayToggles::default(),
            typing_effect: true,
            title: "服务器信息".to_string(),
            description: "欢迎来到服务器！".to_string(),
            typing_speed_ms: 100,
            reveal_policy: RevealPolicy::default(),
        }
    }
}

impl DisplayConfig {
    pub fn sanitized(mut self) -> Self {
        self.typing_speed_ms = self
            .typing_speed_ms
            .clamp(MIN_TYPING_SPEED_MS, MAX_TYPING_SPEED_MS);
        self
    }

    pub fn typing_cadence(&self) -> Duration {
        Duration::from_millis(
            self.typing_speed_ms
                .clamp(MIN_TYPING_SPEED_MS, MAX_TYPING_SPEED_MS),
        )
    }

    pub fn shows(&self, toggle: DisplayToggles) -> bool {
        self.toggles.contains(toggle)
    }
}

/// Localized strings used when turning a snapshot into panel text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub latency: String,
    pub players: String,
    pub experience: String,
    pub timed_out: String,
    pub not_applicable: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            latency: "延迟".to_string(),
            players: "玩家".to_string(),
            experience: "经验".to_string(),
            timed_out: TIMED_OUT_MARKER.to_string(),
            not_applicable: NOT_APPLICABLE_MARKER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DisplayConfig::default();
        assert!(config.enabled);
        assert!(config.typing_effect);
        assert!(config.shows(DisplayToggles::TITLE));
        assert!(config.shows(DisplayToggles::DESCRIPTION));
        assert!(!config.shows(DisplayToggles::EXPERIENCE));
        assert_eq!(config.typing_cadence(), Duration::from_millis(100));
    }

    #[test]
    fn test_typing_speed_clamped() {
        let fast = DisplayConfig {
            typing_speed_ms: 1,
            ..Default::default()
        };
        assert_eq!(fast.typing_cadence(), Duration::from_millis(50));
        assert_eq!(fast.sanitized().typing_speed_ms, 50);

        let slow = DisplayConfig {
            typing_speed_ms: 10_000,
            ..Default::default()
        };
        assert_eq!(slow.sanitized().typing_speed_ms, 500);
    }
}
