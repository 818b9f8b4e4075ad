mod host;

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use server_display::{
    DEFAULT_CYCLE_HOLD_MS, DisplayConfig, DisplayToggles, HostSession, Labels, LatencyProbe,
    ProbeConfig, RevealPolicy, SharedSession, panel_lines,
};

use host::SimulatedHost;

#[derive(Parser)]
#[command(name = "display-monitor")]
#[command(about = "Headless host for the server display panel")]
struct Args {
    #[arg(short, long, help = "Server address to probe (e.g., mc.example.org:25565)")]
    server: Option<String>,

    #[arg(long, conflicts_with = "server", help = "Pretend to run a local world")]
    local: bool,

    #[arg(long, default_value_t = 2000, help = "Probe interval in ms")]
    interval_ms: u64,

    #[arg(long, default_value_t = 1000, help = "Connect timeout in ms")]
    timeout_ms: u64,

    #[arg(short, long, default_value_t = 20, help = "Host ticks per second")]
    tick_rate: u32,

    #[arg(long, default_value_t = 100, help = "Typing speed in ms per character")]
    typing_speed: u64,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long, help = "Show the description without the typing effect")]
    no_typing: bool,

    #[arg(long, help = "Keep the revealed description instead of restarting it")]
    hold: bool,

    #[arg(long, help = "Show the experience line")]
    show_exp: bool,

    #[arg(long, default_value_t = 1)]
    players: usize,

    #[arg(long, help = "Local player experience progress (0.0-1.0)")]
    experience: Option<f32>,

    #[arg(long, default_value_t = 0, help = "Stop after this many seconds (0 runs forever)")]
    duration_secs: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let session = match (&args.server, args.local) {
        (Some(address), _) => HostSession::Remote(address.clone()),
        (None, true) => HostSession::Local,
        (None, false) => HostSession::Offline,
    };

    let mut toggles = DisplayToggles::default();
    toggles.set(DisplayToggles::EXPERIENCE, args.show_exp);

    let defaults = DisplayConfig::default();
    let config = DisplayConfig {
        toggles,
        typing_effect: !args.no_typing,
        title: args.title.clone().unwrap_or_else(|| defaults.title.clone()),
        description: args
            .description
            .clone()
            .unwrap_or_else(|| defaults.description.clone()),
        typing_speed_ms: args.typing_speed,
        reveal_policy: if args.hold {
            RevealPolicy::Hold
        } else {
            RevealPolicy::Cycle {
                hold_ms: DEFAULT_CYCLE_HOLD_MS,
            }
        },
        ..defaults
    };

    let probe_config = ProbeConfig {
        interval_ms: args.interval_ms,
        timeout_ms: args.timeout_ms,
        ..Default::default()
    };

    let session = SharedSession::new(session);
    let probe = LatencyProbe::new(probe_config, session.clone());
    let mut host = SimulatedHost::new(
        session,
        config,
        probe.handle(),
        args.players,
        args.experience,
    );

    probe.start().context("failed to start latency probe")?;
    log::info!("Monitoring {}", host.describe_session());

    run(&mut host, &args);

    probe.stop();
    log::info!("Monitor shutting down");
    Ok(())
}

fn run(host: &mut SimulatedHost, args: &Args) {
    let tick_duration = Duration::from_secs_f64(1.0 / args.tick_rate.max(1) as f64);
    let deadline = (args.duration_secs > 0)
        .then(|| Instant::now() + Duration::from_secs(args.duration_secs));
    let labels = Labels::default();
    let mut last_lines: Vec<String> = Vec::new();

    loop {
        let now = Instant::now();
        if deadline.is_some_and(|d| now >= d) {
            break;
        }

        let snapshot = host.tick(now);

        let lines = panel_lines(host.config(), &snapshot, &labels);
        if lines != last_lines {
            log::info!("{}", lines.join(" | "));
            last_lines = lines;
        }

        let elapsed = now.elapsed();
        if elapsed < tick_duration {
            thread::sleep(tick_duration - elapsed);
        }
    }
}
