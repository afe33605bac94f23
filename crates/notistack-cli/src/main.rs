//! notistack - interactive notification stack session
//!
//! This is the main entry point for the notistack binary.
//! It wires together all the components:
//! - Configuration loading
//! - Stack persistence (SQLite, or in memory)
//! - An emulated platform scheduler that delivers due notifications
//! - The notification facade, driven by line commands on stdin
//! - Lifecycle hooks: `pause` flushes, `resume` resets, shutdown pauses

mod command;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use command::{Command, HELP, parse_line};
use notistack_api::StackEntry;
use notistack_config::{load_config_or_default, parse_platform};
use notistack_core::{CoreEvent, NotificationFacade};
use notistack_host_api::NotificationScheduler;
use notistack_host_emulated::{EmulatedScheduler, for_platform};
use notistack_store::{KvStackPersistence, MemoryStore, SqliteStore, Store};
use notistack_util::{
    STORE_FILENAME, default_config_path, format_datetime_full, format_duration,
    is_mock_time_active,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// notistack - Local notification stack with lifecycle reconciliation
#[derive(Parser, Debug)]
#[command(name = "notistack")]
#[command(about = "Stage, flush and inspect local notifications against an emulated OS scheduler", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/notistack/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set NOTISTACK_DATA_DIR env var)
    #[arg(short, long, env = "NOTISTACK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Platform override: android or ios
    #[arg(short, long)]
    platform: Option<String>,

    /// Keep the stack in memory only
    #[arg(long)]
    ephemeral: bool,

    /// How often the emulated OS fires due notifications, in seconds
    #[arg(long, default_value_t = 1)]
    tick_secs: u64,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Interactive session state
struct Session {
    facade: NotificationFacade,
    store: Arc<dyn Store>,
    scheduler: Arc<dyn EmulatedScheduler>,
}

impl Session {
    fn new(args: &Args) -> Result<Self> {
        let mut config = load_config_or_default(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        if let Some(platform) = &args.platform {
            config.service.platform = parse_platform(platform)?;
        }
        if let Some(data_dir) = &args.data_dir {
            config.service.data_dir = data_dir.clone();
        }

        info!(
            config_path = %args.config.display(),
            platform = %config.service.platform,
            channel = %config.channel.id,
            "Configuration loaded"
        );

        let store: Arc<dyn Store> = if args.ephemeral {
            info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        } else {
            let data_dir = &config.service.data_dir;
            std::fs::create_dir_all(data_dir)
                .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

            let db_path = data_dir.join(STORE_FILENAME);
            let store = SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?;
            info!(db_path = %db_path.display(), "Store initialized");
            Arc::new(store)
        };

        let persistence = Arc::new(KvStackPersistence::new(
            store.clone(),
            config.service.store_key.clone(),
        ));
        let scheduler = for_platform(config.service.platform);
        let facade =
            NotificationFacade::for_config(&config, persistence, scheduler.clone().as_scheduler())
                .context("Failed to initialize notification facade")?;

        let session = Self {
            facade,
            store,
            scheduler,
        };
        session.check_health();
        Ok(session)
    }

    fn check_health(&self) {
        let store_healthy = self.store.is_healthy();
        let scheduler_healthy = self.scheduler.is_healthy();

        if store_healthy && scheduler_healthy {
            debug!("Store and scheduler healthy");
        } else {
            warn!(store_healthy, scheduler_healthy, "Health check failed");
        }
    }

    /// Run one command. Returns false when the session should end.
    fn handle(&mut self, command: Command, now: DateTime<Utc>) -> Result<bool> {
        match command {
            Command::Send {
                target,
                when,
                every,
                title,
                body,
            } => {
                let events =
                    self.facade
                        .send(title, body, when, target, every.is_some(), every, now)?;
                print_events(&events);
            }
            Command::Cancel(target) => {
                let cancelled = self.facade.cancel(target)?;
                println!(
                    "{} {}",
                    target.id(),
                    if cancelled { "cancelled" } else { "was not pending" }
                );
            }
            Command::Status(target) => {
                let scheduled = self.facade.is_scheduled(target)?;
                println!(
                    "{} {}",
                    target.id(),
                    if scheduled { "is scheduled" } else { "is not scheduled" }
                );
            }
            Command::CancelAll => print_events(&self.facade.cancel_all()?),
            Command::Pause => print_events(&self.facade.on_pause(now)?),
            Command::Resume => print_events(&self.facade.on_resume(now)?),
            Command::List => print_entries(&self.facade.pending(), now),
            Command::Deliver => self.deliver(now),
            Command::Health => {
                let status = |ok: bool| if ok { "ok" } else { "unhealthy" };
                println!(
                    "store: {}, scheduler: {}",
                    status(self.store.is_healthy()),
                    status(self.scheduler.is_healthy())
                );
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Let the emulated OS fire whatever is due
    fn deliver(&self, now: DateTime<Utc>) {
        for delivery in self.scheduler.deliver_due(now) {
            println!(
                "[{}] #{} {}: {}{}",
                format_datetime_full(&delivery.fired_at),
                delivery.id,
                delivery.title,
                delivery.body,
                if delivery.repeating { " (repeats)" } else { "" }
            );
        }
    }

    async fn run(mut self, tick: Duration) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;

        let mut tick_timer = tokio::time::interval(tick);

        info!(platform = %self.facade.platform(), "Session running, type 'help' for commands");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }

                _ = tick_timer.tick() => {
                    self.deliver(notistack_util::now());
                }

                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read stdin")? else {
                        debug!("stdin closed");
                        break;
                    };

                    match parse_line(&line) {
                        Ok(None) => {}
                        Ok(Some(command)) => match self.handle(command, notistack_util::now()) {
                            Ok(true) => {}
                            Ok(false) => break,
                            Err(e) => eprintln!("error: {e:#}"),
                        },
                        Err(e) => eprintln!("error: {e:#}"),
                    }
                }
            }
        }

        // Leaving the app is a transition to background
        info!("Shutting down notistack");
        match self.facade.on_pause(notistack_util::now()) {
            Ok(events) => print_events(&events),
            Err(e) => warn!(error = %e, "Failed to flush on shutdown"),
        }

        info!("Shutdown complete");
        Ok(())
    }
}

fn print_events(events: &[CoreEvent]) {
    for event in events {
        match event {
            CoreEvent::Staged {
                id,
                fire_time,
                repeating,
            } => println!(
                "staged #{id} for {}{}",
                format_datetime_full(fire_time),
                if *repeating { " (repeating)" } else { "" }
            ),
            CoreEvent::Scheduled {
                id,
                fire_time,
                repeating,
            } => println!(
                "scheduled #{id} for {}{}",
                format_datetime_full(fire_time),
                if *repeating { " (repeating)" } else { "" }
            ),
            CoreEvent::Evicted { id, reason } => println!("evicted #{id} ({reason})"),
            CoreEvent::Flushed(report) => {
                for evicted in &report.evicted {
                    print_events(std::slice::from_ref(evicted));
                }
                println!(
                    "flushed: {} one-shot, {} repeating, {} failed",
                    report.scheduled_absolute,
                    report.scheduled_repeating,
                    report.failed.len()
                );
                for failure in &report.failed {
                    println!("  #{}: {}", failure.id, failure.error);
                }
            }
            CoreEvent::Reset { staged } => println!("reset: OS schedule cleared, {staged} staged"),
            CoreEvent::CancelledAll => println!("all notifications cancelled"),
        }
    }
}

fn print_entries(entries: &[StackEntry], now: DateTime<Utc>) {
    if entries.is_empty() {
        println!("(no staged notifications)");
        return;
    }

    for entry in entries {
        let due = if entry.is_overdue(now) {
            "overdue".to_string()
        } else {
            let remaining = (entry.fire_time - now).to_std().unwrap_or_default();
            format!("in {}", format_duration(remaining))
        };
        let repeat = entry
            .effective_repeat()
            .map(|d| format!(", every {}", format_duration(d)))
            .unwrap_or_default();

        println!(
            "#{} [{}] {} ({}{}): {}",
            entry.id,
            entry.channel_id,
            format_datetime_full(&entry.fire_time),
            due,
            repeat,
            entry.title
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Logs go to stderr so command output stays readable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "notistack starting");
    if is_mock_time_active() {
        warn!("Mock time is active, fire times follow NOTISTACK_MOCK_TIME");
    }

    let session = Session::new(&args)?;
    session.run(Duration::from_secs(args.tick_secs.max(1))).await
}
