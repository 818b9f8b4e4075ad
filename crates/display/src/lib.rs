pub mod hud;
pub mod latency;
pub mod typing;

pub use hud::{
    DisplayConfig, DisplaySnapshot, DisplayState, DisplayToggles, Labels, PlayerStats,
    WorldSample, panel_lines,
};
pub use latency::{
    ConnectionTarget, DEFAULT_GAME_PORT, HostSession, LatencyCell, LatencyHandle, LatencyProbe,
    LatencyReading, NOT_APPLICABLE_MARKER, ProbeConfig, ProbeError, Resolver, SessionError,
    SessionSource, SharedSession, TIMED_OUT_MARKER, TargetError, measure_latency,
    measure_latency_with, system_resolver,
};
pub use typing::{DEFAULT_CYCLE_HOLD_MS, RevealPolicy, TypingAnimator};
