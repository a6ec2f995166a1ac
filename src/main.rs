//! MeshNode host simulator: main entry point.
//!
//! Runs the real application core against [`SimBoard`], with console
//! commands on stdin standing in for buttons, the mesh stack and remote
//! peers.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  stdin thread ── parse_command ──▶ EVENT_QUEUE (static)        │
//! │                                        │                       │
//! │  ┌─────────────────────────────────────┼────────────────────┐  │
//! │  │  futures_lite::block_on             ▼                    │  │
//! │  │  ┌──────────────────────────────────────────────────┐    │  │
//! │  │  │  edge_executor::LocalExecutor                    │    │  │
//! │  │  │   ┌──────────────┐ ┌────────────┐ ┌────────────┐ │    │  │
//! │  │  │   │ EventLoop    │ │ stack task │ │ timer task │ │    │  │
//! │  │  │   │ (consumer)   │ │ (outbox)   │ │ async-io ⏱ │ │    │  │
//! │  │  │   └──────────────┘ └────────────┘ └────────────┘ │    │  │
//! │  │  └──────────────────────────────────────────────────┘    │  │
//! │  └──────────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::io::BufRead;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_io_mini::Timer;
use clap::Parser;
use edge_executor::LocalExecutor;
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use meshnode::adapters::log_sink::LogEventSink;
use meshnode::adapters::sim::{Outbox, SimBoard, SimQueue, TimerRequest, parse_command};
use meshnode::app::service::NodeService;
use meshnode::config::NodeConfig;
use meshnode::event_loop::EventLoop;
use meshnode::events::{Event, EventQueue};
use meshnode::timers::{TimerSlot, TimerToken};

static EVENT_QUEUE: SimQueue = EventQueue::new();
static STACK_EVENTS: Outbox<Event> = Outbox::new();
static TIMER_REQUESTS: Outbox<TimerRequest> = Outbox::new();

/// MeshNode simulator
///
/// Runs the node application against a simulated board.  Console commands
/// on stdin stand in for buttons, the mesh stack and remote peers.
#[derive(Parser, Debug)]
#[command(name = "meshnode-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON node configuration. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for random colours and sensor drift. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,
}

fn load_config(path: Option<&PathBuf>) -> Result<NodeConfig> {
    let Some(path) = path else {
        return Ok(NodeConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config =
        NodeConfig::from_json(&text).with_context(|| format!("parsing {}", path.display()))?;
    info!("Config loaded from {}", path.display());
    Ok(config)
}

// ── Stack task ────────────────────────────────────────────────

/// Moves events from the simulated stack into the queue, waiting for room.
async fn stack_task(queue: &'static SimQueue) {
    loop {
        STACK_EVENTS.wait().await;
        while let Some(event) = STACK_EVENTS.pop() {
            queue.post(event).await;
        }
    }
}

// ── Timer task ────────────────────────────────────────────────

enum TimerWake {
    Requested,
    Expired(TimerToken),
}

/// Single-shot timers for every slot, multiplexed on one reactor timer.
async fn timer_task(queue: &'static SimQueue) {
    let mut deadlines: [Option<(TimerToken, Instant)>; TimerSlot::COUNT] = [None; TimerSlot::COUNT];

    loop {
        while let Some(request) = TIMER_REQUESTS.pop() {
            match request {
                TimerRequest::Start(token, ms) => {
                    let at = Instant::now() + Duration::from_millis(u64::from(ms));
                    deadlines[token.slot.index()] = Some((token, at));
                }
                TimerRequest::Stop(slot) => deadlines[slot.index()] = None,
            }
        }

        let next = deadlines.iter().flatten().min_by_key(|(_, at)| *at).copied();
        let expiry = async {
            match next {
                Some((token, at)) => {
                    Timer::at(at).await;
                    TimerWake::Expired(token)
                }
                None => core::future::pending().await,
            }
        };
        let requested = async {
            TIMER_REQUESTS.wait().await;
            TimerWake::Requested
        };

        if let TimerWake::Expired(token) = futures_lite::future::or(requested, expiry).await {
            deadlines[token.slot.index()] = None;
            queue.post(Event::TimerExpired(token)).await;
        }
    }
}

// ── Console thread ────────────────────────────────────────────

fn spawn_console(queue: &'static SimQueue) -> Result<()> {
    std::thread::Builder::new()
        .name("console".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for (n, line) in stdin.lock().lines().enumerate() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line, n as u16) {
                    Some(event) => futures_lite::future::block_on(queue.post(event)),
                    None => warn!("unknown command: {}", line.trim()),
                }
            }
            info!("console closed");
        })
        .context("spawning console thread")?;
    Ok(())
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("MESHNODE_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    info!("╔══════════════════════════════════════╗");
    info!("║  MeshNode simulator v{}           ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    info!("Seed: {}", seed);

    let config = load_config(args.config.as_ref())?;
    let service = NodeService::new(config);
    let board = SimBoard::new(&STACK_EVENTS, &TIMER_REQUESTS, seed);
    let mut event_loop = EventLoop::new(&EVENT_QUEUE, service, board, LogEventSink::new());
    event_loop.start()?;

    spawn_console(&EVENT_QUEUE)?;

    let executor: LocalExecutor<'_, 8> = LocalExecutor::new();
    executor.spawn(timer_task(&EVENT_QUEUE)).detach();
    executor.spawn(stack_task(&EVENT_QUEUE)).detach();

    info!("System ready. Entering event loop.");
    futures_lite::future::block_on(executor.run(event_loop.run()));
    Ok(())
}
