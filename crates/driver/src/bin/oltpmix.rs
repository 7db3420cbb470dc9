//! oltpmix CLI
//!
//! Drives a synthetic transaction mix through the full warmup/measurement
//! protocol and prints the resulting report. The synthetic workload stands
//! in for real database transactions; the engine it exercises is the same
//! one a real benchmark assembly plugs into.

use clap::{Parser, Subcommand};
use oltpmix_core::SeededRng;
use oltpmix_driver::workload::{SyntheticTx, TriggeringTx};
use oltpmix_driver::{report, DriverConfig, MixScheduler, SecondaryPool};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "oltpmix")]
#[command(about = "Pace-controlled transaction-mix benchmark driver")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the synthetic demonstration mix
    Run {
        /// Number of concurrent simulated clients
        #[arg(long, default_value = "8")]
        clients: usize,

        /// Target transactions per second (0 = unpaced)
        #[arg(long, default_value = "0")]
        tps: f64,

        /// Warmup duration (statistics discarded)
        #[arg(long, default_value = "5s")]
        warmup: humantime::Duration,

        /// Measurement duration (e.g. "30s", "5m")
        #[arg(short, long, default_value = "30s")]
        duration: humantime::Duration,

        /// Master random seed
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Emit the report as JSON instead of a console table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            clients,
            tps,
            warmup,
            duration,
            seed,
            json,
        } => {
            tracing_subscriber::fmt::init();

            let config = DriverConfig::new(clients)
                .with_seed(seed)
                .with_target_tps(tps)
                .with_db_info("synthetic (no database)");

            // Any setup failure here is fatal, before any statistics exist.
            let (scheduler, pool) = assemble_mix(config)?;

            println!("Warming up for {}...", warmup);
            scheduler.run_tx_mix(*warmup).await?;
            // Let warmup follow-ups finish before clearing, so none of them
            // record into the measured phase's aggregators.
            pool.drain(scheduler.config().secondary_grace).await;
            scheduler.clear_all_stats();

            println!("Measuring for {}...", duration);
            scheduler.run_tx_mix(*duration).await?;
            pool.shutdown(scheduler.config().secondary_grace).await;

            let summary = scheduler.build_summary(*duration);
            if json {
                println!("{}", report::to_json(&summary)?);
            } else {
                report::print(&summary);
            }
        }
    }

    Ok(())
}

/// Assemble the demonstration mix: three weighted types, a placeholder for
/// an asynchronously completed follow-up, and a periodic maintenance task.
fn assemble_mix(
    config: DriverConfig,
) -> Result<(MixScheduler, Arc<SecondaryPool>), Box<dyn std::error::Error>> {
    let seed = config.seed;
    // Generator streams live far past the worker streams.
    let gen_stream = |index: u64| SeededRng::new(SeededRng::jump_ahead(seed, u64::MAX - index));

    let mut scheduler = MixScheduler::new(config)?;

    scheduler.add_tx(
        Arc::new(
            SyntheticTx::new("account_lookup", gen_stream(0))
                .with_latency_ms(1, 8)
                .with_warning_rate(0.02),
        ),
        0.35,
    )?;
    scheduler.add_tx(
        Arc::new(
            SyntheticTx::new("order_update", gen_stream(1))
                .with_latency_ms(2, 15)
                .with_error_rate(0.01),
        ),
        0.25,
    )?;

    // trade_order asynchronously triggers trade_result on the secondary
    // pool; trade_result holds a placeholder slot so its share is reserved
    // and both paths write the same aggregator.
    let trade_result_share = 0.2;
    scheduler.add_placeholder("trade_result", trade_result_share)?;

    let pool = Arc::new(SecondaryPool::sized_for(
        scheduler.config().clients,
        trade_result_share,
        scheduler.config().secondary_damping,
    ));
    let follow_up: Arc<dyn oltpmix_driver::BenchTransaction> = Arc::new(
        SyntheticTx::new("trade_result_inner", gen_stream(2)).with_latency_ms(5, 25),
    );
    scheduler.add_tx(
        Arc::new(TriggeringTx::new(
            SyntheticTx::new("trade_order", gen_stream(3)).with_latency_ms(3, 20),
            Arc::clone(&pool),
            follow_up,
            scheduler.stats_for("trade_result")?,
        )),
        0.2,
    )?;

    scheduler.add_periodic(
        Arc::new(SyntheticTx::new("data_maintenance", gen_stream(4)).with_latency_ms(10, 40)),
        Duration::from_secs(2),
        Duration::from_secs(2),
    )?;

    Ok((scheduler, pool))
}
