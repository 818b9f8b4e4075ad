use std::io;
use std::net::{SocketAddr, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::reading::{LatencyCell, LatencyHandle, LatencyReading};
use super::session::{HostSession, SessionError, SessionSource};
use super::target::{ConnectionTarget, DEFAULT_GAME_PORT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub interval_ms: u64,
    pub timeout_ms: u64,
    pub default_port: u16,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            timeout_ms: 1000,
            default_port: DEFAULT_GAME_PORT,
        }
    }
}

impl ProbeConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to spawn latency probe thread: {0}")]
    Spawn(#[from] io::Error),
}

/// Turns a target into socket addresses. Each cycle runs it on a helper
/// thread so a stalled lookup cannot outlive the connect timeout.
pub type Resolver = Arc<dyn Fn(&ConnectionTarget) -> io::Result<Vec<SocketAddr>> + Send + Sync>;

pub fn system_resolver() -> Resolver {
    Arc::new(ConnectionTarget::resolve)
}

/// Resolves `target` and attempts a TCP connect to each address, all within
/// `timeout`. The measured value covers the successful connect only.
pub fn measure_latency(target: &ConnectionTarget, timeout: Duration) -> LatencyReading {
    measure_latency_with(target, timeout, &system_resolver())
}

pub fn measure_latency_with(
    target: &ConnectionTarget,
    timeout: Duration,
    resolver: &Resolver,
) -> LatencyReading {
    let deadline = Instant::now() + timeout;

    let addrs = match resolve_within(target, deadline, resolver) {
        Ok(addrs) => addrs,
        Err(e) => {
            log::debug!("Could not resolve {}: {}", target, e);
            return LatencyReading::TimedOut;
        }
    };

    for addr in addrs {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }

        let start = Instant::now();
        match TcpStream::connect_timeout(&addr, remaining) {
            Ok(_stream) => {
                let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                return LatencyReading::Measured(elapsed);
            }
            Err(e) => log::debug!("Connect to {} ({}) failed: {}", target, addr, e),
        }
    }

    LatencyReading::TimedOut
}

fn resolve_within(
    target: &ConnectionTarget,
    deadline: Instant,
    resolver: &Resolver,
) -> io::Result<Vec<SocketAddr>> {
    let (tx, rx) = mpsc::channel();
    let resolver = Arc::clone(resolver);
    let lookup = target.clone();

    // A lookup that misses the deadline is left to finish on its own; its
    // send fails once the receiver is gone.
    thread::Builder::new()
        .name("latency-resolve".to_string())
        .spawn(move || {
            let _ = tx.send(resolver(&lookup));
        })?;

    let remaining = deadline.saturating_duration_since(Instant::now());
    match rx.recv_timeout(remaining) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            "name resolution exceeded the probe timeout",
        )),
        Err(RecvTimeoutError::Disconnected) => Err(io::Error::other("resolver thread exited")),
    }
}

struct ProbeShared {
    config: ProbeConfig,
    source: Box<dyn SessionSource>,
    resolver: Resolver,
    cell: Arc<LatencyCell>,
    cycles: AtomicU64,
}

impl ProbeShared {
    fn run_cycle(&self) -> LatencyReading {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.probe_session()));

        let reading = match outcome {
            Ok(Ok(reading)) => reading,
            Ok(Err(e)) => {
                log::warn!("Latency probe could not read the host session: {}", e);
                LatencyReading::Unavailable
            }
            Err(_) => {
                log::error!("Latency probe cycle panicked, publishing unavailable");
                LatencyReading::Unavailable
            }
        };

        self.cell.store(reading);
        self.cycles.fetch_add(1, Ordering::SeqCst);
        log::debug!("Latency probe cycle published {:?}", reading);
        reading
    }

    fn probe_session(&self) -> Result<LatencyReading, SessionError> {
        let reading = match self.source.current_session()? {
            HostSession::Offline => LatencyReading::Unavailable,
            HostSession::Local => LatencyReading::LocalSession,
            HostSession::Remote(address) => {
                match ConnectionTarget::parse_with_default(&address, self.config.default_port) {
                    Ok(target) => {
                        measure_latency_with(&target, self.config.timeout(), &self.resolver)
                    }
                    Err(e) => {
                        log::debug!("Malformed server address {:?}: {}", address, e);
                        LatencyReading::TimedOut
                    }
                }
            }
        };
        Ok(reading)
    }
}

struct ProbeWorker {
    stop_tx: Sender<()>,
    thread: JoinHandle<()>,
}

/// Periodically measures connect latency to the host's current server on a
/// dedicated thread and publishes the result to a single-word cell.
pub struct LatencyProbe {
    shared: Arc<ProbeShared>,
    worker: Mutex<Option<ProbeWorker>>,
}

impl LatencyProbe {
    pub fn new<S>(config: ProbeConfig, source: S) -> Self
    where
        S: SessionSource + 'static,
    {
        Self {
            shared: Arc::new(ProbeShared {
                config,
                source: Box::new(source),
                resolver: system_resolver(),
                cell: Arc::new(LatencyCell::default()),
                cycles: AtomicU64::new(0),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Replaces the name lookup used by each cycle. Must be called before
    /// `start`.
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        if let Some(shared) = Arc::get_mut(&mut self.shared) {
            shared.resolver = resolver;
        } else {
            log::warn!("Latency probe already running, resolver not replaced");
        }
        self
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.shared.config
    }

    /// Starts the timer thread. The first cycle runs immediately. Returns
    /// `false` when the probe was already running.
    pub fn start(&self) -> Result<bool, ProbeError> {
        let mut worker = self.lock_worker();
        if worker.as_ref().is_some_and(|w| !w.thread.is_finished()) {
            log::debug!("Latency probe already running");
            return Ok(false);
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let shared = Arc::clone(&self.shared);
        let interval = self.shared.config.interval();

        let thread = thread::Builder::new()
            .name("latency-probe".to_string())
            .spawn(move || {
                let mut next_run = Instant::now();
                loop {
                    shared.run_cycle();

                    next_run += interval;
                    let now = Instant::now();
                    if next_run < now {
                        next_run = now;
                    }

                    match stop_rx.recv_timeout(next_run - now) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })?;

        log::info!(
            "Latency probe started (interval {}ms, timeout {}ms)",
            self.shared.config.interval_ms,
            self.shared.config.timeout_ms
        );
        *worker = Some(ProbeWorker { stop_tx, thread });
        Ok(true)
    }

    /// Stops the timer thread and waits for it to exit. No reading is
    /// published by the timer after this returns.
    pub fn stop(&self) {
        let worker = self.lock_worker().take();
        if let Some(worker) = worker {
            let _ = worker.stop_tx.send(());
            if worker.thread.join().is_err() {
                log::error!("Latency probe thread panicked");
            }
            log::info!("Latency probe stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock_worker()
            .as_ref()
            .is_some_and(|w| !w.thread.is_finished())
    }

    /// Runs one cycle on the calling thread and publishes its result.
    pub fn probe_once(&self) -> LatencyReading {
        self.shared.run_cycle()
    }

    pub fn read(&self) -> LatencyReading {
        self.shared.cell.load()
    }

    pub fn handle(&self) -> LatencyHandle {
        LatencyHandle::new(Arc::clone(&self.shared.cell))
    }

    pub fn cycles_completed(&self) -> u64 {
        self.shared.cycles.load(Ordering::SeqCst)
    }

    fn lock_worker(&self) -> MutexGuard<'_, Option<ProbeWorker>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for LatencyProbe {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn fixed(session: HostSession) -> impl Fn() -> Result<HostSession, SessionError> + Send + Sync {
        move || Ok(session.clone())
    }

    fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn test_offline_is_unavailable() {
        let probe = LatencyProbe::new(ProbeConfig::default(), fixed(HostSession::Offline));
        assert_eq!(probe.probe_once(), LatencyReading::Unavailable);
        assert_eq!(probe.read(), LatencyReading::Unavailable);
    }

    #[test]
    fn test_local_session() {
        let probe = LatencyProbe::new(ProbeConfig::default(), fixed(HostSession::Local));
        assert_eq!(probe.probe_once(), LatencyReading::LocalSession);
    }

    #[test]
    fn test_malformed_address_times_out() {
        let probe = LatencyProbe::new(
            ProbeConfig::default(),
            fixed(HostSession::Remote("localhost:notaport".to_string())),
        );
        assert_eq!(probe.probe_once(), LatencyReading::TimedOut);
    }

    #[test]
    fn test_refused_connection_times_out() {
        let port = closed_port();
        let reading = measure_latency(
            &ConnectionTarget::new("127.0.0.1", port),
            Duration::from_millis(500),
        );
        assert_eq!(reading, LatencyReading::TimedOut);
    }

    #[test]
    fn test_listening_socket_is_measured() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let reading = measure_latency(
            &ConnectionTarget::new("127.0.0.1", port),
            Duration::from_millis(1000),
        );
        assert!(reading.is_measured(), "got {:?}", reading);
    }

    #[test]
    fn test_stalled_lookup_is_bounded_by_timeout() {
        let slow: Resolver = Arc::new(|_: &ConnectionTarget| -> io::Result<Vec<SocketAddr>> {
            thread::sleep(Duration::from_secs(3));
            Ok(Vec::new())
        });
        let timeout = Duration::from_millis(200);

        let start = Instant::now();
        let reading = measure_latency_with(
            &ConnectionTarget::new("slow.example", 25565),
            timeout,
            &slow,
        );

        assert_eq!(reading, LatencyReading::TimedOut);
        assert!(start.elapsed() < timeout + Duration::from_millis(300));
    }

    #[test]
    fn test_cycle_with_stalled_lookup_is_bounded() {
        let slow: Resolver = Arc::new(|_: &ConnectionTarget| -> io::Result<Vec<SocketAddr>> {
            thread::sleep(Duration::from_secs(3));
            Ok(Vec::new())
        });
        let config = ProbeConfig {
            timeout_ms: 200,
            ..Default::default()
        };
        let pinger = LatencyProbe::new(
            config,
            fixed(HostSession::Remote("slow.example:25565".to_string())),
        )
        .with_resolver(slow);

        let start = Instant::now();
        assert_eq!(pinger.probe_once(), LatencyReading::TimedOut);
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_lookup_time_counts_against_budget_not_measurement() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let delayed = move |_: &ConnectionTarget| -> io::Result<Vec<SocketAddr>> {
            thread::sleep(Duration::from_millis(150));
            Ok(vec![addr])
        };
        let delayed: Resolver = Arc::new(delayed);

        let start = Instant::now();
        let reading = measure_latency_with(
            &ConnectionTarget::new("game.example", addr.port()),
            Duration::from_millis(1000),
            &delayed,
        );

        assert!(start.elapsed() >= Duration::from_millis(150));
        match reading {
            LatencyReading::Measured(ms) => assert!(ms <= 50, "loopback connect took {}ms", ms),
            other => panic!("Expected Measured, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_error_times_out() {
        let failing: Resolver = Arc::new(|_: &ConnectionTarget| -> io::Result<Vec<SocketAddr>> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such host"))
        });
        let reading = measure_latency_with(
            &ConnectionTarget::new("missing.invalid", 25565),
            Duration::from_millis(500),
            &failing,
        );
        assert_eq!(reading, LatencyReading::TimedOut);
    }

    #[test]
    fn test_stop_waits_at_most_one_timeout() {
        let slow: Resolver = Arc::new(|_: &ConnectionTarget| -> io::Result<Vec<SocketAddr>> {
            thread::sleep(Duration::from_secs(3));
            Ok(Vec::new())
        });
        let config = ProbeConfig {
            interval_ms: 20,
            timeout_ms: 200,
            ..Default::default()
        };
        let pinger = LatencyProbe::new(
            config,
            fixed(HostSession::Remote("slow.example:25565".to_string())),
        )
        .with_resolver(slow);

        pinger.start().unwrap();
        thread::sleep(Duration::from_millis(50));

        let start = Instant::now();
        pinger.stop();
        assert!(start.elapsed() < Duration::from_millis(500));
        assert!(!pinger.is_running());
    }

    #[test]
    fn test_session_error_degrades_to_unavailable() {
        let probe = LatencyProbe::new(
            ProbeConfig::default(),
            || -> Result<HostSession, SessionError> {
                Err(SessionError::Unavailable("no client instance".to_string()))
            },
        );
        probe.shared.cell.store(LatencyReading::Measured(20));
        assert_eq!(probe.probe_once(), LatencyReading::Unavailable);
    }

    #[test]
    fn test_panicking_source_degrades_to_unavailable() {
        let probe = LatencyProbe::new(
            ProbeConfig::default(),
            || -> Result<HostSession, SessionError> { panic!("host state torn down") },
        );
        assert_eq!(probe.probe_once(), LatencyReading::Unavailable);
        assert_eq!(probe.probe_once(), LatencyReading::Unavailable);
        assert_eq!(probe.cycles_completed(), 2);
    }

    #[test]
    fn test_stop_without_start() {
        let probe = LatencyProbe::new(ProbeConfig::default(), fixed(HostSession::Offline));
        probe.stop();
        assert!(!probe.is_running());
    }
}
