//! Prometheus-style simulation metrics
//!
//! Counters are atomics so a realtime host can read them from another task
//! while the loop runs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::game::game_loop::TickReport;
use crate::game::match_result::MatchResult;
use crate::game::performance::PerformanceStatus;
use crate::game::population::PopulationCounts;
use crate::game::state::{Group, Outcome};

const TICK_HISTORY: usize = 1000;

#[derive(Debug)]
pub struct Metrics {
    // Population
    pub agents: [AtomicU64; 3],
    pub peak_population: AtomicU64,

    // Activity
    pub captures_total: AtomicU64,
    pub bonuses_collected_total: AtomicU64,
    pub agents_spawned_total: AtomicU64,
    pub disks_spawned_total: AtomicU64,

    // Games
    pub games_decided: AtomicU64,
    pub draws: AtomicU64,
    pub wins: [AtomicU64; 3],

    // Tick timing (microseconds)
    pub tick_time_us: AtomicU64,
    pub tick_time_p95_us: AtomicU64,
    pub tick_time_max_us: AtomicU64,
    pub tick_count: AtomicU64,

    // 0=Excellent .. 3=Critical
    pub performance_status: AtomicU64,
    pub arena_radius: AtomicU64,

    start_time: Instant,
    tick_history: RwLock<VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            agents: Default::default(),
            peak_population: AtomicU64::new(0),
            captures_total: AtomicU64::new(0),
            bonuses_collected_total: AtomicU64::new(0),
            agents_spawned_total: AtomicU64::new(0),
            disks_spawned_total: AtomicU64::new(0),
            games_decided: AtomicU64::new(0),
            draws: AtomicU64::new(0),
            wins: Default::default(),
            tick_time_us: AtomicU64::new(0),
            tick_time_p95_us: AtomicU64::new(0),
            tick_time_max_us: AtomicU64::new(0),
            tick_count: AtomicU64::new(0),
            performance_status: AtomicU64::new(0),
            arena_radius: AtomicU64::new(0),
            start_time: Instant::now(),
            tick_history: RwLock::new(VecDeque::with_capacity(TICK_HISTORY)),
        }
    }

    /// Fold one tick's report and the post-tick population into the counters
    pub fn record_tick(&self, report: &TickReport, population: &PopulationCounts, arena_radius: f32) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.captures_total
            .fetch_add(report.captures.len() as u64, Ordering::Relaxed);
        self.bonuses_collected_total
            .fetch_add(report.collections.len() as u64, Ordering::Relaxed);
        self.agents_spawned_total
            .fetch_add(report.collections.len() as u64, Ordering::Relaxed);
        self.disks_spawned_total
            .fetch_add(report.disks_spawned as u64, Ordering::Relaxed);

        for group in Group::ALL {
            self.agents[group.index()].store(population.get(group) as u64, Ordering::Relaxed);
        }
        self.peak_population
            .fetch_max(population.total() as u64, Ordering::Relaxed);
        self.arena_radius.store(arena_radius.round() as u64, Ordering::Relaxed);
    }

    /// Record a tick duration and update percentiles
    pub fn record_tick_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.tick_time_us.store(us, Ordering::Relaxed);

        let mut history = self.tick_history.write();
        history.push_back(us);
        while history.len() > TICK_HISTORY {
            history.pop_front();
        }

        if history.len() >= 10 {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();
            let p95_idx = (sorted.len() as f32 * 0.95) as usize;
            self.tick_time_p95_us
                .store(sorted[p95_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_max_us
                .store(sorted.last().copied().unwrap_or(0), Ordering::Relaxed);
        }
    }

    pub fn record_status(&self, status: PerformanceStatus) {
        let level = match status {
            PerformanceStatus::Excellent => 0,
            PerformanceStatus::Good => 1,
            PerformanceStatus::Warning => 2,
            PerformanceStatus::Critical => 3,
        };
        self.performance_status.store(level, Ordering::Relaxed);
    }

    pub fn record_result(&self, result: &MatchResult) {
        self.games_decided.fetch_add(1, Ordering::Relaxed);
        match result.outcome {
            Outcome::Winner(group) => {
                self.wins[group.index()].fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Draw => {
                self.draws.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Prometheus text exposition format
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        macro_rules! per_group {
            ($name:expr, $help:expr, $type:expr, $values:expr) => {
                output.push_str(&format!("# HELP {} {}\n# TYPE {} {}\n", $name, $help, $name, $type));
                for group in Group::ALL {
                    output.push_str(&format!(
                        "{}{{group=\"{:?}\"}} {}\n",
                        $name,
                        group,
                        $values[group.index()].load(Ordering::Relaxed)
                    ));
                }
            };
        }

        per_group!("rps_royale_agents", "Agents per group", "gauge", self.agents);
        metric!("rps_royale_peak_population", "Largest population seen", "gauge",
            self.peak_population.load(Ordering::Relaxed));

        metric!("rps_royale_captures_total", "Conversions by capture", "counter",
            self.captures_total.load(Ordering::Relaxed));
        metric!("rps_royale_bonuses_collected_total", "Bonus disks collected", "counter",
            self.bonuses_collected_total.load(Ordering::Relaxed));
        metric!("rps_royale_agents_spawned_total", "Agents spawned by bonuses", "counter",
            self.agents_spawned_total.load(Ordering::Relaxed));
        metric!("rps_royale_disks_spawned_total", "Bonus disks spawned", "counter",
            self.disks_spawned_total.load(Ordering::Relaxed));

        metric!("rps_royale_games_decided_total", "Games decided", "counter",
            self.games_decided.load(Ordering::Relaxed));
        metric!("rps_royale_draws_total", "Games ending with no agents left", "counter",
            self.draws.load(Ordering::Relaxed));
        per_group!("rps_royale_wins_total", "Games won per group", "counter", self.wins);

        metric!("rps_royale_tick_time_microseconds", "Last tick time in microseconds", "gauge",
            self.tick_time_us.load(Ordering::Relaxed));
        metric!("rps_royale_tick_time_p95_microseconds", "95th percentile tick time", "gauge",
            self.tick_time_p95_us.load(Ordering::Relaxed));
        metric!("rps_royale_tick_time_max_microseconds", "Maximum tick time", "gauge",
            self.tick_time_max_us.load(Ordering::Relaxed));
        metric!("rps_royale_tick_count", "Total ticks processed", "counter",
            self.tick_count.load(Ordering::Relaxed));
        metric!("rps_royale_performance_status", "Performance status (0=Excellent, 3=Critical)", "gauge",
            self.performance_status.load(Ordering::Relaxed));
        metric!("rps_royale_arena_radius", "Arena radius in world units", "gauge",
            self.arena_radius.load(Ordering::Relaxed));
        metric!("rps_royale_uptime_seconds", "Runner uptime in seconds", "counter",
            self.uptime_seconds());

        output
    }

    /// Same counters as a JSON document
    pub fn to_json(&self) -> serde_json::Value {
        let load = |v: &AtomicU64| v.load(Ordering::Relaxed);
        serde_json::json!({
            "population": {
                "a": load(&self.agents[0]),
                "b": load(&self.agents[1]),
                "c": load(&self.agents[2]),
                "peak": load(&self.peak_population),
            },
            "activity": {
                "captures": load(&self.captures_total),
                "bonuses_collected": load(&self.bonuses_collected_total),
                "agents_spawned": load(&self.agents_spawned_total),
                "disks_spawned": load(&self.disks_spawned_total),
            },
            "games": {
                "decided": load(&self.games_decided),
                "draws": load(&self.draws),
                "wins": [load(&self.wins[0]), load(&self.wins[1]), load(&self.wins[2])],
            },
            "performance": {
                "tick_time_us": load(&self.tick_time_us),
                "tick_time_p95_us": load(&self.tick_time_p95_us),
                "tick_time_max_us": load(&self.tick_time_max_us),
                "tick_count": load(&self.tick_count),
                "status": load(&self.performance_status),
            },
            "uptime_seconds": self.uptime_seconds(),
        })
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::systems::collision::CaptureEvent;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.tick_count.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.games_decided.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_tick() {
        let metrics = Metrics::new();
        let report = TickReport {
            tick: 1,
            captures: vec![CaptureEvent {
                captor: 0,
                captured: 1,
                from: Group::B,
                to: Group::A,
            }],
            disks_spawned: 8,
            ..TickReport::default()
        };
        metrics.record_tick(&report, &PopulationCounts::from_counts(5, 3, 2), 600.4);

        assert_eq!(metrics.tick_count.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.captures_total.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.disks_spawned_total.load(Ordering::Relaxed), 8);
        assert_eq!(metrics.agents[0].load(Ordering::Relaxed), 5);
        assert_eq!(metrics.peak_population.load(Ordering::Relaxed), 10);
        assert_eq!(metrics.arena_radius.load(Ordering::Relaxed), 600);
    }

    #[test]
    fn test_record_tick_time() {
        let metrics = Metrics::new();
        for i in 0..100 {
            metrics.record_tick_time(Duration::from_micros(100 + i * 10));
        }
        assert_eq!(metrics.tick_time_max_us.load(Ordering::Relaxed), 1090);
        assert!(metrics.tick_time_p95_us.load(Ordering::Relaxed) > 0);
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = Metrics::new();
        metrics.agents[1].store(42, Ordering::Relaxed);
        metrics.wins[2].store(3, Ordering::Relaxed);

        let output = metrics.to_prometheus();

        assert!(output.contains("rps_royale_agents{group=\"B\"} 42"));
        assert!(output.contains("rps_royale_wins_total{group=\"C\"} 3"));
        assert!(output.contains("# HELP rps_royale_captures_total"));
        assert!(output.contains("# TYPE rps_royale_tick_count counter"));
    }

    #[test]
    fn test_json_format() {
        let metrics = Metrics::new();
        metrics.draws.store(2, Ordering::Relaxed);
        let json = metrics.to_json();
        assert_eq!(json["games"]["draws"], 2);
        assert_eq!(json["population"]["peak"], 0);
    }
}
