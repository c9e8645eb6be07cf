use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use helmwatch::{
    AlertState, HelmetMonitor, MonitorConfig, MonitorError, ScriptTransport, SensorStore,
    TcpTransport, Transport,
};

#[derive(Parser, Debug)]
#[command(name = "helmwatch")]
#[command(about = "Headless ingestion and alerting core for a CO safety helmet stream")]
struct Args {
    /// Connect to a TCP endpoint bridging the helmet's serial port (host:port)
    #[arg(short, long, conflicts_with_all = ["replay", "export"])]
    connect: Option<String>,

    /// Replay a captured line file instead of a live stream
    #[arg(short, long, conflicts_with = "export")]
    replay: Option<PathBuf>,

    /// Export the database to a CSV file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// SQLite database path
    #[arg(long, default_value = "helmet_data.db")]
    db: PathBuf,

    /// CO level above which the alert switches to warning
    #[arg(long, default_value = "600")]
    threshold: f64,

    /// Number of recent readings kept for display
    #[arg(long, default_value = "10")]
    window: usize,

    /// Tick period in seconds
    #[arg(long, default_value = "1")]
    period: u64,

    /// Stop after this many ticks (default: run until the stream ends)
    #[arg(long)]
    ticks: Option<u64>,

    /// Print the full snapshot as JSON after each tick
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Export mode is non-interactive: dump and exit.
    if let Some(ref export_path) = args.export {
        return export_database(&args.db, export_path);
    }

    let transport: Box<dyn Transport> = if let Some(ref addr) = args.connect {
        Box::new(TcpTransport::connect(addr).with_context(|| format!("cannot reach {addr}"))?)
    } else if let Some(ref path) = args.replay {
        Box::new(
            ScriptTransport::from_file(path)
                .with_context(|| format!("cannot replay {}", path.display()))?,
        )
    } else {
        anyhow::bail!("nothing to do: pass --connect, --replay, or --export (see --help)");
    };

    let store = SensorStore::open(&args.db)
        .with_context(|| format!("cannot open database {}", args.db.display()))?;

    let config = MonitorConfig {
        threshold: args.threshold,
        window_capacity: args.window,
        tick_period: Duration::from_secs(args.period),
    };

    let mut monitor = HelmetMonitor::new(transport, store, config);
    monitor.connect()?;
    monitor.start_streaming()?;

    run_loop(&mut monitor, &args)
}

/// Drive the core with a fixed-period tick until the stream ends or the
/// requested tick budget is spent.
fn run_loop(monitor: &mut HelmetMonitor, args: &Args) -> Result<()> {
    let mut last_alert = AlertState::Normal;
    let mut tick_count: u64 = 0;

    loop {
        let snapshot = match monitor.tick() {
            Ok(snapshot) => snapshot,
            Err(err @ MonitorError::Persistence(_)) => {
                // Durability is best-effort per reading; keep streaming.
                warn!("{err}");
                monitor.snapshot()
            }
            Err(err) => return Err(err.into()),
        };

        if snapshot.alert != last_alert {
            match snapshot.alert {
                AlertState::Warning => warn!("WARNING: high CO level"),
                AlertState::Normal => info!("CO level back to normal"),
            }
            last_alert = snapshot.alert;
        }

        if args.json {
            println!("{}", serde_json::to_string(&snapshot)?);
        } else if let Some(&(elapsed, co)) = snapshot.points.last() {
            let worn = match snapshot.worn {
                Some(true) => "worn",
                Some(false) => "not worn",
                None => "unknown",
            };
            debug!(
                "t={elapsed:.1}s co={co} [{}] helmet {worn} ({})",
                snapshot.alert.symbol(),
                snapshot.connection.label()
            );
        }

        tick_count += 1;
        if args.ticks.is_some_and(|max| tick_count >= max) {
            info!("tick budget spent after {tick_count} ticks");
            break;
        }
        if !monitor.transport_open() {
            info!("stream ended after {tick_count} ticks");
            break;
        }

        thread::sleep(monitor.config().tick_period);
    }

    match monitor.persisted_rows() {
        Ok(rows) => info!("{rows} readings persisted"),
        Err(err) => warn!("{err}"),
    }
    monitor.close();
    Ok(())
}

/// Dump every persisted reading to a CSV file.
fn export_database(db: &Path, out: &Path) -> Result<()> {
    let store =
        SensorStore::open(db).with_context(|| format!("cannot open database {}", db.display()))?;
    let rows = store.export_csv(out)?;
    info!("exported {rows} readings to {}", out.display());
    Ok(())
}
