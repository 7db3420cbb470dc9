//! End-to-end tests of the mix engine: weighted selection under real
//! concurrency, periodic firing, pacing, warmup isolation, fault isolation
//! and the dependent-transaction pattern.

use async_trait::async_trait;
use oltpmix_core::{SeededRng, TxOutput, TxStats};
use oltpmix_driver::workload::{SyntheticTx, TriggeringTx};
use oltpmix_driver::{BenchTransaction, DriverConfig, MixScheduler, SecondaryPool, TxError};
use std::sync::Arc;
use std::time::Duration;

fn fast_tx(name: &'static str, seed: u64) -> Arc<SyntheticTx> {
    Arc::new(SyntheticTx::new(name, SeededRng::new(seed)).with_latency_ms(0, 1))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mix_split_and_periodic_converge() {
    let mut scheduler = MixScheduler::new(DriverConfig::new(4).with_seed(1)).unwrap();
    scheduler.add_tx(fast_tx("light", 10), 0.3).unwrap();
    scheduler.add_tx(fast_tx("heavy", 11), 0.7).unwrap();
    scheduler
        .add_periodic(
            fast_tx("cleanup", 12),
            Duration::from_millis(200),
            Duration::from_millis(200),
        )
        .unwrap();

    scheduler.run_tx_mix(Duration::from_secs(2)).await.unwrap();

    let summary = scheduler.build_summary(Duration::from_secs(2));
    let light = summary.transactions.iter().find(|t| t.name == "light").unwrap();
    let heavy = summary.transactions.iter().find(|t| t.name == "heavy").unwrap();
    let cleanup = summary
        .transactions
        .iter()
        .find(|t| t.name == "cleanup")
        .unwrap();

    let total = (light.count + heavy.count) as f64;
    assert!(total > 100.0, "expected a busy unpaced run, got {}", total);
    let light_share = light.count as f64 / total;
    assert!(
        (light_share - 0.3).abs() < 0.05,
        "light share was {}",
        light_share
    );

    // ~10 fixed-rate ticks in 2s at 200ms; loose bounds for CI jitter.
    assert!(
        (5..=13).contains(&cleanup.count),
        "periodic fired {} times",
        cleanup.count
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pacing_bounds_throughput() {
    let mut paced = MixScheduler::new(
        DriverConfig::new(4).with_seed(2).with_target_tps(100.0),
    )
    .unwrap();
    paced.add_tx(fast_tx("paced", 20), 1.0).unwrap();
    paced.run_tx_mix(Duration::from_secs(2)).await.unwrap();
    let paced_count = paced.build_summary(Duration::from_secs(2)).total_count();

    // ~200 executions at 100 tps over 2s.
    assert!(
        (120..=280).contains(&paced_count),
        "paced count was {}",
        paced_count
    );

    let mut unpaced = MixScheduler::new(DriverConfig::new(4).with_seed(2)).unwrap();
    unpaced.add_tx(fast_tx("unpaced", 21), 1.0).unwrap();
    unpaced.run_tx_mix(Duration::from_secs(2)).await.unwrap();
    let unpaced_count = unpaced.build_summary(Duration::from_secs(2)).total_count();

    assert!(
        unpaced_count > 2 * paced_count,
        "unpaced ({}) should far exceed paced ({})",
        unpaced_count,
        paced_count
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn warmup_phase_is_discarded_by_explicit_clear() {
    let mut scheduler = MixScheduler::new(DriverConfig::new(2).with_seed(3)).unwrap();
    scheduler.add_tx(fast_tx("tx", 30), 1.0).unwrap();

    // Warmup phase.
    scheduler.run_tx_mix(Duration::from_millis(500)).await.unwrap();
    assert!(scheduler.build_summary(Duration::from_millis(500)).total_count() > 0);

    scheduler.clear_all_stats();
    let cleared = scheduler.stats_for("tx").unwrap().snapshot();
    assert_eq!(cleared.count, 0);
    assert_eq!(cleared.min_ts_ms, i64::MAX);
    assert_eq!(cleared.max_ts_ms, i64::MIN);
    let clear_wallclock = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64;

    // Measurement phase; the summary must reflect only these observations.
    scheduler.run_tx_mix(Duration::from_millis(500)).await.unwrap();
    let measured = scheduler.stats_for("tx").unwrap().snapshot();
    assert!(measured.count > 0);
    assert!(
        measured.min_ts_ms >= clear_wallclock - 50,
        "warmup observations leaked into the measured window"
    );
}

struct AlwaysFailing;

#[async_trait]
impl BenchTransaction for AlwaysFailing {
    fn name(&self) -> &str {
        "always_failing"
    }

    async fn execute(&self) -> Result<TxOutput, TxError> {
        Err(TxError::Connection("connection reset by peer".into()))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failing_transaction_does_not_halt_the_run() {
    let mut scheduler = MixScheduler::new(DriverConfig::new(2).with_seed(4)).unwrap();
    scheduler.add_tx(Arc::new(AlwaysFailing), 0.5).unwrap();
    scheduler.add_tx(fast_tx("healthy", 40), 0.5).unwrap();

    scheduler.run_tx_mix(Duration::from_millis(500)).await.unwrap();

    let failing = scheduler.stats_for("always_failing").unwrap().snapshot();
    let healthy = scheduler.stats_for("healthy").unwrap().snapshot();

    // Failures were isolated and counted; the healthy type kept executing.
    assert!(failing.errors > 0);
    assert_eq!(failing.count, 0);
    assert!(healthy.count > 0);
    assert_eq!(healthy.errors, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dependent_transaction_records_into_placeholder_aggregator() {
    let mut scheduler = MixScheduler::new(DriverConfig::new(4).with_seed(5)).unwrap();
    scheduler.add_placeholder("trade_result", 0.25).unwrap();

    let pool = Arc::new(SecondaryPool::sized_for(4, 0.25, 0.5));
    let follow_up: Arc<dyn BenchTransaction> = fast_tx("trade_result_inner", 50);
    let shared_stats: Arc<TxStats> = scheduler.stats_for("trade_result").unwrap();

    scheduler
        .add_tx(
            Arc::new(TriggeringTx::new(
                SyntheticTx::new("trade_order", SeededRng::new(51)).with_latency_ms(0, 1),
                Arc::clone(&pool),
                follow_up,
                Arc::clone(&shared_stats),
            )),
            0.75,
        )
        .unwrap();

    scheduler.run_tx_mix(Duration::from_secs(1)).await.unwrap();
    pool.shutdown(Duration::from_secs(10)).await;

    let summary = scheduler.build_summary(Duration::from_secs(1));
    let placeholder = summary
        .transactions
        .iter()
        .find(|t| t.name == "trade_result")
        .unwrap();
    let orders = summary
        .transactions
        .iter()
        .find(|t| t.name == "trade_order")
        .unwrap();

    // Every non-error trade_order spawned one async trade_result, and the
    // placeholder's aggregator saw all of them.
    assert!(orders.count > 0);
    assert!(placeholder.count > 0);
    assert_eq!(placeholder.count, orders.count - orders.errors);
}
