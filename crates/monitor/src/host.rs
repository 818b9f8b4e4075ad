use std::time::Instant;

use server_display::{
    DisplayConfig, DisplaySnapshot, DisplayState, HostSession, LatencyHandle, SessionSource,
    SharedSession, WorldSample,
};

/// Stand-in for the game client: owns the session slot the probe reads and
/// drives the display state once per tick with a fixed world.
pub struct SimulatedHost {
    session: SharedSession,
    display: DisplayState,
    players: usize,
    experience: Option<f32>,
}

impl SimulatedHost {
    pub fn new(
        session: SharedSession,
        config: DisplayConfig,
        latency: LatencyHandle,
        players: usize,
        experience: Option<f32>,
    ) -> Self {
        Self {
            session,
            display: DisplayState::new(config, latency),
            players,
            experience,
        }
    }

    pub fn config(&self) -> &DisplayConfig {
        self.display.config()
    }

    pub fn describe_session(&self) -> String {
        match self.session.current_session() {
            Ok(HostSession::Remote(address)) => format!("remote server {}", address),
            Ok(HostSession::Local) => "local world".to_string(),
            Ok(HostSession::Offline) => "no server".to_string(),
            Err(e) => format!("unknown session ({})", e),
        }
    }

    pub fn tick(&mut self, now: Instant) -> DisplaySnapshot {
        let world = self.world_sample();
        self.display.on_tick(now, world.as_ref());
        self.display.snapshot()
    }

    fn world_sample(&self) -> Option<WorldSample> {
        match self.session.current_session() {
            Ok(HostSession::Remote(_)) | Ok(HostSession::Local) => Some(WorldSample {
                player_count: self.players,
                experience_progress: self.experience,
            }),
            Ok(HostSession::Offline) | Err(_) => None,
        }
    }
}
