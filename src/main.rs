use std::time::Duration;

use anyhow::Context;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use rps_royale::config::{RunnerConfig, SimConfig};
use rps_royale::game::clock::{Clock, ManualClock, SystemClock};
use rps_royale::game::game_loop::{PhaseTransition, Simulation};
use rps_royale::game::performance::PerformanceMonitor;
use rps_royale::game::snapshot::SimSnapshot;
use rps_royale::metrics::Metrics;

/// Ticks between periodic status lines
const STATUS_INTERVAL_TICKS: u64 = 600;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("RPS Royale v{}", env!("CARGO_PKG_VERSION"));

    let config = SimConfig::load_or_default();
    config.validate().context("invalid simulation configuration")?;
    let runner = RunnerConfig::load_or_default();

    let seed = runner.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(
        seed,
        games = runner.games,
        realtime = runner.realtime,
        per_group = config.initial_per_group,
        "Configuration loaded"
    );
    let rng = SmallRng::seed_from_u64(seed);

    let metrics = Metrics::new();
    let mut driver = Driver::new(&runner, &metrics, config.tick_rate);

    let snapshot = if runner.realtime {
        run_realtime(config, rng, &mut driver).await?
    } else {
        run_headless(config, rng, &mut driver)?
    };

    info!(
        games = driver.games_done,
        status = %driver.monitor.status_message(),
        "Run finished"
    );
    if runner.metrics_json {
        let json = serde_json::to_string_pretty(&metrics.to_json()).context("failed to serialize metrics")?;
        println!("{}", json);
    } else {
        println!("{}", metrics.to_prometheus());
    }

    if runner.dump_snapshot {
        println!("{}", snapshot.to_json().context("failed to serialize snapshot")?);
    }

    Ok(())
}

/// Fast-forward: a manual clock advanced by exactly one tick per step
fn run_headless(config: SimConfig, rng: SmallRng, driver: &mut Driver<'_>) -> anyhow::Result<SimSnapshot> {
    let clock = ManualClock::new(0);
    let mut sim = Simulation::new(config, &clock, rng)?;
    let tick_ms = sim.config().tick_duration_ms();

    let mut total_ticks: u64 = 0;
    loop {
        total_ticks += 1;
        clock.set((total_ticks as f64 * tick_ms) as u64);
        if !driver.step(&mut sim) {
            break;
        }
    }

    Ok(sim.snapshot())
}

/// Wall-clock pacing at the configured tick rate until done or Ctrl+C
async fn run_realtime(config: SimConfig, rng: SmallRng, driver: &mut Driver<'_>) -> anyhow::Result<SimSnapshot> {
    let tick_duration = Duration::from_secs_f64(1.0 / config.tick_rate as f64);
    let mut sim = Simulation::new(config, SystemClock::new(), rng)?;

    let mut ticker = interval(tick_duration);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!("Simulation loop started at {} Hz", sim.config().tick_rate);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !driver.step(&mut sim) {
                    break;
                }
            }
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                }
                info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(sim.snapshot())
}

/// Per-tick bookkeeping shared by both pacing modes
struct Driver<'a> {
    metrics: &'a Metrics,
    monitor: PerformanceMonitor,
    games_wanted: u32,
    games_done: u32,
    max_ticks_per_game: u64,
    ticks_in_game: u64,
    over_budget: bool,
}

impl<'a> Driver<'a> {
    fn new(runner: &RunnerConfig, metrics: &'a Metrics, tick_rate: u32) -> Self {
        Self {
            metrics,
            monitor: PerformanceMonitor::new(tick_rate),
            games_wanted: runner.games,
            games_done: 0,
            max_ticks_per_game: runner.max_ticks_per_game,
            ticks_in_game: 0,
            over_budget: false,
        }
    }

    /// Run one tick. Returns false once enough games are done.
    fn step<C: Clock, R: Rng>(&mut self, sim: &mut Simulation<C, R>) -> bool {
        self.monitor.tick_start();
        let report = sim.tick();
        if let Some(elapsed) = self.monitor.tick_end(sim.state().agent_count()) {
            self.metrics.record_tick_time(elapsed);
        }

        let status = self.monitor.status();
        self.metrics.record_status(status);
        self.metrics
            .record_tick(&report, &sim.population(), sim.state().arena.radius);

        if status.is_over_budget() != self.over_budget {
            self.over_budget = status.is_over_budget();
            if self.over_budget {
                warn!("Tick budget exceeded: {}", self.monitor.status_message());
            } else {
                info!("Tick budget recovered: {}", self.monitor.status_message());
            }
        }

        if report.tick % STATUS_INTERVAL_TICKS == 0 {
            let population = sim.population();
            debug!(
                game = sim.game_number(),
                tick = report.tick,
                a = population.as_array()[0],
                b = population.as_array()[1],
                c = population.as_array()[2],
                radius = sim.state().arena.radius,
                "Status"
            );
        }

        self.ticks_in_game += 1;
        match report.transition {
            Some(PhaseTransition::Decided(_)) => {
                if let Some(result) = sim.last_result() {
                    self.metrics.record_result(result);
                    for standing in &result.standings {
                        info!(
                            rank = standing.rank,
                            group = ?standing.group,
                            count = standing.final_count,
                            net = standing.net_change,
                            "Standing"
                        );
                    }
                }
                return self.finish_game();
            }
            Some(PhaseTransition::Restarted { .. }) => {
                self.ticks_in_game = 0;
            }
            _ => {}
        }

        if sim.state().phase.is_playing() && self.ticks_in_game >= self.max_ticks_per_game {
            warn!(
                game = sim.game_number(),
                ticks = self.ticks_in_game,
                "Game hit the tick cap undecided, restarting"
            );
            sim.reset();
            self.ticks_in_game = 0;
            return self.finish_game();
        }

        true
    }

    fn finish_game(&mut self) -> bool {
        self.games_done += 1;
        self.games_done < self.games_wanted
    }
}
