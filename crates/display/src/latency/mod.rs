mod probe;
mod reading;
mod session;
mod target;

pub use probe::{
    LatencyProbe, ProbeConfig, ProbeError, Resolver, measure_latency, measure_latency_with,
    system_resolver,
};
pub use reading::{
    LatencyCell, LatencyHandle, LatencyReading, NOT_APPLICABLE_MARKER, TIMED_OUT_MARKER,
};
pub use session::{HostSession, SessionError, SessionSource, SharedSession};
pub use target::{ConnectionTarget, DEFAULT_GAME_PORT, TargetError};
