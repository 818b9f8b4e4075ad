use std::sync::{Arc, Mutex};

/// What the host is connected to at the moment of asking.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HostSession {
    /// Connected to a remote server, as the address string the host stores.
    Remote(String),
    /// Running an integrated local world.
    Local,
    #[default]
    Offline,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("host session state is unavailable: {0}")]
    Unavailable(String),
    #[error("host session state is poisoned")]
    Poisoned,
}

pub trait SessionSource: Send + Sync {
    fn current_session(&self) -> Result<HostSession, SessionError>;
}

impl<F> SessionSource for F
where
    F: Fn() -> Result<HostSession, SessionError> + Send + Sync,
{
    fn current_session(&self) -> Result<HostSession, SessionError> {
        self()
    }
}

/// Session slot the host updates from its own thread whenever it joins or
/// leaves a server.
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    inner: Arc<Mutex<HostSession>>,
}

impl SharedSession {
    pub fn new(session: HostSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn set(&self, session: HostSession) {
        match self.inner.lock() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }

    pub fn connect_remote(&self, address: impl Into<String>) {
        self.set(HostSession::Remote(address.into()));
    }

    pub fn disconnect(&self) {
        self.set(HostSession::Offline);
    }
}

impl SessionSource for SharedSession {
    fn current_session(&self) -> Result<HostSession, SessionError> {
        self.inner
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| SessionError::Poisoned)
    }
}
