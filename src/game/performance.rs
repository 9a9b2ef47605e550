//! Tick-budget monitoring
//!
//! Keeps a rolling window of tick durations and grades them against the
//! fixed-timestep budget (1/60 s by default).

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Samples kept in the rolling window (~2 seconds at 60 Hz)
const WINDOW: usize = 120;

/// Samples needed before the status moves off its initial value
const MIN_SAMPLES: usize = 10;

/// Share of the budget used, on average, over the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceStatus {
    /// Under 30% of the budget
    Excellent,
    /// Under 70%
    Good,
    /// Under 100%: close to missing ticks
    Warning,
    /// Ticks take longer than the budget
    Critical,
}

impl PerformanceStatus {
    pub fn is_over_budget(&self) -> bool {
        matches!(self, PerformanceStatus::Critical)
    }
}

pub struct PerformanceMonitor {
    tick_durations: VecDeque<Duration>,
    target_tick_duration: Duration,
    status: PerformanceStatus,
    tick_start: Option<Instant>,
    last_agent_count: usize,
}

impl PerformanceMonitor {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            tick_durations: VecDeque::with_capacity(WINDOW),
            target_tick_duration: Duration::from_secs_f64(1.0 / tick_rate.max(1) as f64),
            status: PerformanceStatus::Excellent,
            tick_start: None,
            last_agent_count: 0,
        }
    }

    pub fn tick_start(&mut self) {
        self.tick_start = Some(Instant::now());
    }

    /// Stop timing the current tick. Returns the measured duration.
    pub fn tick_end(&mut self, agent_count: usize) -> Option<Duration> {
        let start = self.tick_start.take()?;
        let duration = start.elapsed();
        self.record_tick(duration);
        self.last_agent_count = agent_count;
        Some(duration)
    }

    pub fn record_tick(&mut self, duration: Duration) {
        self.tick_durations.push_back(duration);
        while self.tick_durations.len() > WINDOW {
            self.tick_durations.pop_front();
        }
        self.update_status();
    }

    fn update_status(&mut self) {
        if self.tick_durations.len() < MIN_SAMPLES {
            return;
        }

        let ratio = self.budget_usage_percent() / 100.0;
        self.status = if ratio < 0.3 {
            PerformanceStatus::Excellent
        } else if ratio < 0.7 {
            PerformanceStatus::Good
        } else if ratio < 1.0 {
            PerformanceStatus::Warning
        } else {
            PerformanceStatus::Critical
        };
    }

    pub fn average_tick_duration(&self) -> Duration {
        if self.tick_durations.is_empty() {
            return Duration::ZERO;
        }
        let sum: Duration = self.tick_durations.iter().sum();
        sum / self.tick_durations.len() as u32
    }

    pub fn p95_tick_duration(&self) -> Duration {
        if self.tick_durations.is_empty() {
            return Duration::ZERO;
        }
        let mut sorted: Vec<_> = self.tick_durations.iter().copied().collect();
        sorted.sort();
        let idx = (sorted.len() as f32 * 0.95) as usize;
        sorted.get(idx.min(sorted.len() - 1)).copied().unwrap_or(Duration::ZERO)
    }

    pub fn status(&self) -> PerformanceStatus {
        self.status
    }

    /// Average tick duration as a percentage of the budget (0-100+)
    pub fn budget_usage_percent(&self) -> f32 {
        let avg = self.average_tick_duration();
        (avg.as_secs_f32() / self.target_tick_duration.as_secs_f32()) * 100.0
    }

    pub fn status_message(&self) -> String {
        format!(
            "{:?} - {:.1}% budget (avg {:?}, p95 {:?}), {} agents",
            self.status,
            self.budget_usage_percent(),
            self.average_tick_duration(),
            self.p95_tick_duration(),
            self.last_agent_count
        )
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(60)
    }
}
