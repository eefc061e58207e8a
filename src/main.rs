use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use app_status::config::{AppStatusConfig, LogFormat, LoggingConfig, TrackerConfig};
use app_status::connection::{Connection, RecordingTransport};
use app_status::pins::{PinPayload, PinValue};
use app_status::simulate::{run_simulation, SimulationPlan};
use app_status::tracker::{RunStatus, RunTracker};

#[derive(Parser)]
#[command(
    name = "app-status",
    about = "Relay test-run progress to a Blynk mobile dashboard",
    version,
    long_about = None
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Blynk device auth token
    #[arg(long, env = "BLYNK_AUTH", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Record pin writes locally instead of contacting the dashboard
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a test campaign with one run per total
    Simulate {
        /// Expected test count of each run, comma separated
        #[arg(long, value_delimiter = ',', default_values_t = vec![20u32, 15, 30, 10])]
        totals: Vec<u32>,

        /// Milliseconds between simulated results
        #[arg(long, default_value = "3000")]
        period_ms: u64,

        /// RNG seed for a reproducible campaign
        #[arg(long)]
        seed: Option<u64>,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Turn off the running LED of a run
    Stop {
        /// Run index
        #[arg(long)]
        run: usize,
    },

    /// Write raw values to virtual pins
    Push {
        /// Writes as PIN=VALUE, e.g. 0="Nightly" 5=255
        #[arg(required = true)]
        writes: Vec<String>,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn parse_write(raw: &str) -> Result<(u16, PinValue)> {
    let (pin, value) = raw
        .split_once('=')
        .with_context(|| format!("expected PIN=VALUE, got {:?}", raw))?;
    let pin: u16 = pin
        .trim()
        .trim_start_matches(['V', 'v'])
        .parse()
        .with_context(|| format!("invalid pin number in {:?}", raw))?;
    Ok((pin, PinValue::parse_loose(value)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The configured subscriber depends on the config itself, so config
    // loading logs through a scoped default one.
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || match &cli.config {
        Some(path) => AppStatusConfig::load(path),
        None => Ok(AppStatusConfig::load_or_default()),
    })?;
    init_tracing(&config.logging);

    let recorder = RecordingTransport::new();
    let connection = if cli.dry_run {
        tracing::info!("dry run: pin writes are recorded locally");
        Connection::with_transport(recorder.clone()).await?
    } else {
        let token = match cli.token.or_else(|| config.dashboard.auth_token.clone()) {
            Some(token) => token,
            None => bail!("no auth token: pass --token, set BLYNK_AUTH or dashboard.auth_token"),
        };
        Connection::open(&token, &config.dashboard)
            .await
            .context("failed to open dashboard connection")?
    };
    let connection = Arc::new(connection);

    match cli.command {
        Commands::Simulate {
            totals,
            period_ms,
            seed,
            json,
        } => {
            let tracker_config = TrackerConfig {
                run_slots: config.tracker.run_slots.max(totals.len()),
                ..config.tracker.clone()
            };
            let mut tracker = RunTracker::from_config(Arc::clone(&connection), &tracker_config)?;
            let plan = SimulationPlan {
                totals,
                period: Duration::from_millis(period_ms),
                seed,
            };
            tracing::info!(runs = plan.totals.len(), period_ms, "starting simulation");
            run_simulation(&mut tracker, &plan).await?;

            let records: Vec<_> = tracker.records().take(plan.totals.len()).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                println!("{:<5} | {:<12} | {:<20} | {:<9} | Outcome", "Run", "Name", "Started", "Progress");
                println!("{:-<5}-|-{:-<12}-|-{:-<20}-|-{:-<9}-|-{:-<14}", "", "", "", "", "");
                for (run, r) in records.iter().enumerate() {
                    println!(
                        "{:<5} | {:<12} | {:<20} | {:<9} | {}",
                        run,
                        r.name(),
                        r.started_at(),
                        r.progress_label(),
                        r.summary()
                    );
                }
            }
        }
        Commands::Stop { run } => {
            RunStatus::new(Arc::clone(&connection), run)?.stop().await?;
        }
        Commands::Push { writes } => {
            let payload = writes
                .iter()
                .map(|w| parse_write(w))
                .collect::<Result<PinPayload>>()?;
            connection.push(&payload).await?;
        }
    }

    if cli.dry_run {
        for (pin, value) in recorder.writes() {
            println!("V{} = {}", pin, value);
        }
    }

    Ok(())
}
