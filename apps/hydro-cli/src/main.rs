use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use hydro_controls::Zone;
use hydro_core::ensure_finite;
use hydro_link::{
    ApiClient, ApiConfig, Emitter, EventRecord, LivenessThresholds, NodeLivenessSnapshot,
    ReadingPayload, TelemetryRecord,
};
use hydro_sim::{NodeSession, ProcessOptions, SessionOptions, TickReport};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "hydro-cli")]
#[command(about = "Hydroflow CLI - pH node simulator and fleet status tool", long_about = None)]
struct Cli {
    /// API base of the hydroponics server, e.g. http://localhost:3000/api
    #[arg(long, env = "HYDROFLOW_API_BASE", global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulated pH node against the server
    Simulate {
        /// Node identifier to report as
        #[arg(long, default_value = "ph_3f0c00")]
        node_id: String,
        /// Target pH value
        #[arg(long, default_value_t = 6.5)]
        target: f64,
        /// Initial pH value of the simulated process
        #[arg(long, default_value_t = 7.2)]
        initial: f64,
        /// Minimum seconds between two accepted corrections
        #[arg(long, default_value_t = 10.0)]
        correction_interval: f64,
        /// Seconds between ticks
        #[arg(long, default_value_t = 2.0)]
        tick_period: f64,
        /// Smallest dose volume worth pumping, in ml
        #[arg(long, default_value_t = 0.1)]
        min_dose: f64,
        /// Largest dose volume per correction, in ml
        #[arg(long, default_value_t = 5.0)]
        max_dose: f64,
        /// Seed for the noise source (omit for entropy seeding)
        #[arg(long)]
        seed: Option<u64>,
        /// Stop after this many ticks (omit to run until interrupted)
        #[arg(long)]
        ticks: Option<u64>,
    },
    /// Classify fleet liveness from the node registry
    Status {
        /// Seconds below which a node counts as online
        #[arg(long, default_value_t = 20.0)]
        online_threshold: f64,
        /// Seconds at or beyond which a node counts as offline
        #[arg(long, default_value_t = 40.0)]
        offline_threshold: f64,
        /// Re-poll the registry every N seconds instead of exiting
        #[arg(long)]
        watch: Option<f64>,
    },
    /// Probe server reachability and exit
    Check,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let client = connect(cli.api_base.as_deref())?;

    match cli.command {
        Commands::Simulate {
            node_id,
            target,
            initial,
            correction_interval,
            tick_period,
            min_dose,
            max_dose,
            seed,
            ticks,
        } => {
            ensure_finite(target, "target").context("invalid --target")?;
            ensure_finite(initial, "initial").context("invalid --initial")?;
            nonnegative_period("--correction-interval", correction_interval)?;
            let opts = SessionOptions {
                node_id,
                process: ProcessOptions {
                    initial_value: initial,
                    target,
                    ..ProcessOptions::default()
                },
                correction_interval_s: correction_interval,
                tick_period_s: tick_period,
                min_dose_ml: min_dose,
                max_dose_ml: max_dose,
                ..SessionOptions::default()
            };
            cmd_simulate(client, opts, seed, ticks)
        }
        Commands::Status {
            online_threshold,
            offline_threshold,
            watch,
        } => {
            let thresholds = LivenessThresholds {
                online_s: online_threshold,
                offline_s: offline_threshold,
            };
            cmd_status(client, thresholds, watch)
        }
        Commands::Check => cmd_check(client),
    }
}

/// Build the API client. Absent connection parameters are fatal at startup.
fn connect(api_base: Option<&str>) -> anyhow::Result<ApiClient> {
    let base = api_base.context(
        "missing server address: pass --api-base or set HYDROFLOW_API_BASE",
    )?;
    ApiClient::new(&ApiConfig::new(base)).context("failed to build API client")
}

fn cmd_simulate(
    client: ApiClient,
    opts: SessionOptions,
    seed: Option<u64>,
    max_ticks: Option<u64>,
) -> anyhow::Result<()> {
    let emitter = Emitter::new(client);
    let mut session = match seed {
        Some(seed) => NodeSession::seeded(opts, seed)?,
        None => NodeSession::from_entropy(opts)?,
    };

    let shutdown = shutdown_flag()?;
    let tick_period = positive_period("--tick-period", session.options().tick_period_s)?;

    info!(
        node_id = %session.options().node_id,
        target = session.options().process.target,
        "starting simulated pH node"
    );

    while !shutdown.load(Ordering::Relaxed) {
        let report = session.tick();
        info!(
            tick = report.tick,
            ph = report.value,
            error = report.target - report.value,
            zone = ?report.zone,
            "tick"
        );

        emit_tick(&emitter, session.options(), &report);

        if max_ticks.is_some_and(|max| report.tick >= max) {
            break;
        }
        sleep_interruptible(tick_period, &shutdown);
    }

    info!("simulation stopped");
    Ok(())
}

/// Build and deliver the records one tick produces. All emission is
/// best-effort; the loop never stops because the sink is away.
fn emit_tick(emitter: &Emitter, opts: &SessionOptions, report: &TickReport) {
    emitter.emit_telemetry(&TelemetryRecord::new(
        &opts.node_id,
        ReadingPayload {
            ph: report.value,
            ph_target: report.target,
            ph_min: opts.alarm_band.min,
            ph_max: opts.alarm_band.max,
            temperature: report.aux.temperature_c,
            voltage: report.aux.voltage,
            uptime: report.aux.uptime_s,
            heap_free: report.aux.heap_free,
        },
    ));

    if let (Some(action), Some(gains)) = (&report.action, &report.gains) {
        info!(
            pump = action.direction.pump_id(),
            volume_ml = action.volume_ml,
            kp = gains.kp,
            "dose applied"
        );
        emitter.emit_event(&EventRecord::correction(
            &opts.node_id,
            report.value,
            report.target,
            action,
            gains,
            report.zone == Zone::Far,
        ));
    }

    if report.out_of_range {
        warn!(ph = report.value, "pH out of range");
        emitter.emit_event(&EventRecord::out_of_range(
            &opts.node_id,
            report.value,
            report.target,
            &opts.alarm_band,
        ));
    }
}

fn cmd_status(
    client: ApiClient,
    thresholds: LivenessThresholds,
    watch: Option<f64>,
) -> anyhow::Result<()> {
    let poll_period = watch
        .map(|secs| positive_period("--watch", secs))
        .transpose()?;
    let shutdown = shutdown_flag()?;
    loop {
        // A failed registry fetch aborts only this classification pass.
        match client.fetch_nodes() {
            Ok(nodes) => print_status(&nodes, &thresholds),
            Err(err) => {
                if watch.is_none() {
                    return Err(err).context("registry unavailable");
                }
                warn!(%err, "registry unavailable, skipping pass");
            }
        }

        let Some(period) = poll_period else {
            return Ok(());
        };
        sleep_interruptible(period, &shutdown);
        if shutdown.load(Ordering::Relaxed) {
            return Ok(());
        }
    }
}

fn print_status(nodes: &[hydro_link::NodeDescriptor], thresholds: &LivenessThresholds) {
    let now = Utc::now();
    let mut online = 0usize;
    let mut warning = 0usize;
    let mut offline = 0usize;

    for node in nodes {
        let snap = NodeLivenessSnapshot::new(&node.node_id, node.last_seen_at, now, thresholds);
        match snap.liveness {
            hydro_link::Liveness::Online => online += 1,
            hydro_link::Liveness::Warning => warning += 1,
            _ => offline += 1,
        }
        let age = match snap.elapsed_s {
            Some(s) => format!("{s:.1}s ago"),
            None => "never".to_owned(),
        };
        println!(
            "{:<10} {:<12} ({}) - {}",
            snap.liveness.label(),
            node.node_id,
            node.node_type,
            age
        );
    }
    println!(
        "total: {} online, {} warning, {} offline/never-seen",
        online, warning, offline
    );
}

fn cmd_check(client: ApiClient) -> anyhow::Result<()> {
    client.ping().context("server unreachable")?;
    println!("server reachable");
    Ok(())
}

/// A duration flag has to be a positive finite number of seconds before
/// it can become a `Duration`; anything else is rejected up front.
fn positive_period(flag: &str, secs: f64) -> anyhow::Result<Duration> {
    anyhow::ensure!(
        secs.is_finite() && secs > 0.0,
        "{flag} must be a positive number of seconds, got {secs}"
    );
    Ok(Duration::from_secs_f64(secs))
}

/// The correction interval may be zero (dose every tick) but never
/// negative or non-finite.
fn nonnegative_period(flag: &str, secs: f64) -> anyhow::Result<()> {
    anyhow::ensure!(
        secs.is_finite() && secs >= 0.0,
        "{flag} must be a non-negative number of seconds, got {secs}"
    );
    Ok(())
}

/// Ctrl-C sets this flag; the loops poll it so a tick sleep is cancelable.
fn shutdown_flag() -> anyhow::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    })
    .context("failed to install interrupt handler")?;
    Ok(flag)
}

/// Sleep in short slices so an interrupt cancels the wait promptly.
fn sleep_interruptible(total: Duration, shutdown: &AtomicBool) {
    const SLICE: Duration = Duration::from_millis(100);
    let mut remaining = total;
    while !remaining.is_zero() && !shutdown.load(Ordering::Relaxed) {
        let slice = remaining.min(SLICE);
        std::thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_flags_reject_nonsense_values() {
        assert!(positive_period("--tick-period", -1.0).is_err());
        assert!(positive_period("--tick-period", 0.0).is_err());
        assert!(positive_period("--watch", f64::NAN).is_err());
        assert!(positive_period("--watch", f64::INFINITY).is_err());

        assert!(nonnegative_period("--correction-interval", -0.5).is_err());
        assert!(nonnegative_period("--correction-interval", f64::NAN).is_err());
    }

    #[test]
    fn period_flags_accept_ordinary_values() {
        assert_eq!(
            positive_period("--tick-period", 2.0).unwrap(),
            Duration::from_secs(2)
        );
        assert!(nonnegative_period("--correction-interval", 0.0).is_ok());
        assert!(nonnegative_period("--correction-interval", 10.0).is_ok());
    }
}
