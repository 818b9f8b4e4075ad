mod animator;

pub use animator::{DEFAULT_CYCLE_HOLD_MS, RevealPolicy, TypingAnimator};
