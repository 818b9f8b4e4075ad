use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

pub const DEFAULT_CYCLE_HOLD_MS: u64 = 5000;

/// What happens once the whole target has been revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RevealPolicy {
    Hold,
    Cycle { hold_ms: u64 },
}

impl Default for RevealPolicy {
    fn default() -> Self {
        Self::Cycle {
            hold_ms: DEFAULT_CYCLE_HOLD_MS,
        }
    }
}

/// Typewriter reveal of a target string, advanced by host ticks.
///
/// `revealed` is always the first `source_index` characters of `target`.
/// The first tick after a reset only records the tick time; each later tick
/// reveals at most one character once `cadence` has elapsed since the last
/// advance.
#[derive(Debug, Clone)]
pub struct TypingAnimator {
    enabled: bool,
    target: String,
    target_len: usize,
    cadence: Duration,
    policy: RevealPolicy,
    revealed: String,
    source_index: usize,
    last_advance: Option<Instant>,
}

impl Default for TypingAnimator {
    fn default() -> Self {
        Self::new(RevealPolicy::default())
    }
}

impl TypingAnimator {
    pub fn new(policy: RevealPolicy) -> Self {
        Self {
            enabled: false,
            target: String::new(),
            target_len: 0,
            cadence: Duration::from_millis(100),
            policy,
            revealed: String::new(),
            source_index: 0,
            last_advance: None,
        }
    }

    pub fn configure(&mut self, enabled: bool, target: &str, cadence: Duration) {
        let target_changed = self.target != target;
        let toggled = self.enabled != enabled;

        if target_changed {
            self.target = target.to_string();
            self.target_len = self.target.chars().count();
        }
        self.enabled = enabled;
        self.cadence = cadence;

        if target_changed || toggled {
            self.reset();
        }
    }

    pub fn set_policy(&mut self, policy: RevealPolicy) {
        self.policy = policy;
    }

    pub fn on_tick(&mut self, now: Instant) {
        if !self.enabled {
            return;
        }

        let Some(last) = self.last_advance else {
            self.last_advance = Some(now);
            return;
        };
        let elapsed = now.saturating_duration_since(last);

        if let Some(next) = self.target[self.revealed.len()..].chars().next() {
            if elapsed >= self.cadence {
                self.revealed.push(next);
                self.source_index += 1;
                self.last_advance = Some(now);
            }
            return;
        }

        if let RevealPolicy::Cycle { hold_ms } = self.policy {
            if self.target_len > 0 && elapsed >= Duration::from_millis(hold_ms) {
                self.revealed.clear();
                self.source_index = 0;
                self.last_advance = Some(now);
            }
        }
    }

    /// Text to show this frame. A disabled animator passes the target
    /// through untouched.
    pub fn read(&self) -> &str {
        if self.enabled {
            &self.revealed
        } else {
            &self.target
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn source_index(&self) -> usize {
        self.source_index
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    pub fn policy(&self) -> RevealPolicy {
        self.policy
    }

    pub fn is_fully_revealed(&self) -> bool {
        !self.enabled || self.source_index == self.target_len
    }

    fn reset(&mut self) {
        self.revealed.clear();
        self.source_index = 0;
        self.last_advance = None;
    }
}
