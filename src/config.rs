use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::constants::{arena, bonus, collision, game, speed, strategy, targeting, world};
use crate::util::vec2::Vec2;

/// Configuration rejected by [`SimConfig::validate`] or while building the
/// speed sampler.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("world bounds must be positive and wider than two agent radii, got {width}x{height}")]
    InvalidWorld { width: f32, height: f32 },
    #[error("global speed bounds must satisfy 0 <= min < max, got {min}..{max}")]
    InvalidSpeedBounds { min: f32, max: f32 },
    #[error("speed range {range} must be positive, at most {max_spread} and fit inside {min}..{max}")]
    InvalidSpeedRange { range: f32, min: f32, max: f32, max_spread: f32 },
    #[error("poisson mean for group {group} must be positive and finite, got {mean}")]
    InvalidPoissonMean { group: char, mean: f64 },
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("bonus spawn thresholds must lie in (0, 1) and be strictly descending")]
    UnorderedThresholds,
    #[error("tick rate must be at least 1")]
    ZeroTickRate,
}

/// Population thresholds that switch agents into strategic mode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyConfig {
    pub critical_population: usize,
    pub critical_ratio: f32,
    pub predator_ratio: f32,
    pub ultra_protective_threshold: usize,
    pub dominance_ratio: f32,
    pub balance_gap: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            critical_population: strategy::CRITICAL_POPULATION,
            critical_ratio: strategy::CRITICAL_RATIO,
            predator_ratio: strategy::PREDATOR_RATIO,
            ultra_protective_threshold: strategy::ULTRA_PROTECTIVE_THRESHOLD,
            dominance_ratio: strategy::DOMINANCE_RATIO,
            balance_gap: strategy::BALANCE_GAP,
        }
    }
}

/// Radius ratio at which a batch of bonus disks appears
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SpawnThreshold {
    pub ratio: f32,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BonusConfig {
    pub multiplier: f32,
    pub duration_ms: u64,
    pub spawn_jitter: f32,
    /// Must be strictly descending by ratio
    pub thresholds: Vec<SpawnThreshold>,
}

impl Default for BonusConfig {
    fn default() -> Self {
        Self {
            multiplier: bonus::MULTIPLIER,
            duration_ms: bonus::DURATION_MS,
            spawn_jitter: bonus::SPAWN_JITTER,
            thresholds: arena::SPAWN_THRESHOLDS
                .iter()
                .map(|&(ratio, count)| SpawnThreshold { ratio, count })
                .collect(),
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    pub world_width: f32,
    pub world_height: f32,
    pub agent_radius: f32,
    pub bonus_radius: f32,
    pub initial_per_group: usize,
    pub global_min_speed: f32,
    pub global_max_speed: f32,
    pub min_speed_range: f32,
    /// Poisson means for groups A, B, C
    pub poisson_means: [f64; 3],
    pub eating_distance: f32,
    pub chase_threshold: f32,
    pub flee_threshold: f32,
    pub bonus_seek_distance: f32,
    pub initial_radius: f32,
    pub shrink_rate: f32,
    pub outside_force: f32,
    pub tick_rate: u32,
    pub restart_delay_ms: u64,
    pub strategy: StrategyConfig,
    pub bonus: BonusConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_width: world::WIDTH,
            world_height: world::HEIGHT,
            agent_radius: world::AGENT_RADIUS,
            bonus_radius: world::BONUS_RADIUS,
            initial_per_group: world::INITIAL_PER_GROUP,
            global_min_speed: speed::GLOBAL_MIN,
            global_max_speed: speed::GLOBAL_MAX,
            min_speed_range: speed::MIN_RANGE,
            poisson_means: speed::POISSON_MEANS,
            eating_distance: collision::EATING_DISTANCE,
            chase_threshold: targeting::CHASE_THRESHOLD,
            flee_threshold: targeting::FLEE_THRESHOLD,
            bonus_seek_distance: targeting::BONUS_SEEK_DISTANCE,
            initial_radius: arena::INITIAL_RADIUS,
            shrink_rate: arena::SHRINK_RATE,
            outside_force: arena::OUTSIDE_FORCE,
            tick_rate: game::TICK_RATE,
            restart_delay_ms: game::RESTART_DELAY_MS,
            strategy: StrategyConfig::default(),
            bonus: BonusConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load config from `SIM_*` environment variables on top of the defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        override_from_env("SIM_INITIAL_PER_GROUP", &mut config.initial_per_group, |v| *v <= 10_000);
        override_from_env("SIM_WORLD_WIDTH", &mut config.world_width, |v| v.is_finite() && *v > 0.0);
        override_from_env("SIM_WORLD_HEIGHT", &mut config.world_height, |v| v.is_finite() && *v > 0.0);
        override_from_env("SIM_INITIAL_RADIUS", &mut config.initial_radius, |v| v.is_finite() && *v > 0.0);
        override_from_env("SIM_SHRINK_RATE", &mut config.shrink_rate, |v| v.is_finite() && *v >= 0.0);
        override_from_env("SIM_RESTART_DELAY_MS", &mut config.restart_delay_ms, |_| true);

        config
    }

    /// Centre of the arena circle (centre of the world rectangle)
    pub fn arena_center(&self) -> Vec2 {
        Vec2::new(self.world_width / 2.0, self.world_height / 2.0)
    }

    /// Distance from the centre beyond which protective agents drift back in
    pub fn center_pull_distance(&self) -> f32 {
        self.world_width * arena::CENTER_PULL_FRACTION
    }

    /// Milliseconds per tick at the configured rate
    pub fn tick_duration_ms(&self) -> f64 {
        1000.0 / self.tick_rate.max(1) as f64
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Infinite or NaN bounds would reach rng ranges and the arena maths
        for (name, value) in [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("agent_radius", self.agent_radius),
            ("bonus_radius", self.bonus_radius),
            ("global_min_speed", self.global_min_speed),
            ("global_max_speed", self.global_max_speed),
            ("eating_distance", self.eating_distance),
            ("chase_threshold", self.chase_threshold),
            ("flee_threshold", self.flee_threshold),
            ("bonus_seek_distance", self.bonus_seek_distance),
            ("initial_radius", self.initial_radius),
            ("shrink_rate", self.shrink_rate),
            ("outside_force", self.outside_force),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
        }
        if self.world_width <= 2.0 * self.agent_radius || self.world_height <= 2.0 * self.agent_radius {
            return Err(ConfigError::InvalidWorld {
                width: self.world_width,
                height: self.world_height,
            });
        }
        if !(self.global_min_speed >= 0.0 && self.global_min_speed < self.global_max_speed) {
            return Err(ConfigError::InvalidSpeedBounds {
                min: self.global_min_speed,
                max: self.global_max_speed,
            });
        }
        if !(self.min_speed_range > 0.0
            && self.min_speed_range <= speed::MAX_SPREAD
            && self.global_min_speed + self.min_speed_range <= self.global_max_speed)
        {
            return Err(ConfigError::InvalidSpeedRange {
                range: self.min_speed_range,
                min: self.global_min_speed,
                max: self.global_max_speed,
                max_spread: speed::MAX_SPREAD,
            });
        }
        for (mean, group) in self.poisson_means.iter().zip(['A', 'B', 'C']) {
            if !(mean.is_finite() && *mean > 0.0) {
                return Err(ConfigError::InvalidPoissonMean { group, mean: *mean });
            }
        }
        for (name, value) in [
            ("eating_distance", self.eating_distance),
            ("chase_threshold", self.chase_threshold),
            ("flee_threshold", self.flee_threshold),
            ("initial_radius", self.initial_radius),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        let thresholds = &self.bonus.thresholds;
        let in_range = thresholds.iter().all(|t| t.ratio > 0.0 && t.ratio < 1.0);
        let descending = thresholds.windows(2).all(|w| w[0].ratio > w[1].ratio);
        if !in_range || !descending {
            return Err(ConfigError::UnorderedThresholds);
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        Ok(())
    }
}

/// Host runner configuration (not part of the simulation core)
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Fixed RNG seed; a random seed is drawn when absent
    pub seed: Option<u64>,
    /// Pace ticks against the wall clock instead of fast-forwarding
    pub realtime: bool,
    /// Number of decided games to run before exiting
    pub games: u32,
    /// Give up on a game after this many ticks
    pub max_ticks_per_game: u64,
    /// Print the final snapshot as JSON on exit
    pub dump_snapshot: bool,
    /// Print metrics as JSON instead of Prometheus text
    pub metrics_json: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            realtime: false,
            games: 1,
            max_ticks_per_game: 60 * 60 * 10,
            dump_snapshot: false,
            metrics_json: false,
        }
    }
}

impl RunnerConfig {
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(seed) = std::env::var("SIM_SEED") {
            match seed.parse::<u64>() {
                Ok(parsed) => config.seed = Some(parsed),
                Err(_) => tracing::warn!("Invalid SIM_SEED '{}', using a random seed", seed),
            }
        }
        override_from_env("SIM_REALTIME", &mut config.realtime, |_| true);
        override_from_env("SIM_GAMES", &mut config.games, |v| *v > 0);
        override_from_env("SIM_MAX_TICKS", &mut config.max_ticks_per_game, |v| *v > 0);
        override_from_env("SIM_DUMP_SNAPSHOT", &mut config.dump_snapshot, |_| true);
        override_from_env("SIM_METRICS_JSON", &mut config.metrics_json, |_| true);

        config
    }
}

/// Replace `slot` with the parsed value of env var `name` when it parses and
/// passes `accept`; otherwise warn and keep the current value.
fn override_from_env<T, F>(name: &str, slot: &mut T, accept: F)
where
    T: FromStr,
    F: Fn(&T) -> bool,
{
    let Ok(raw) = std::env::var(name) else {
        return;
    };
    match raw.parse::<T>() {
        Ok(parsed) if accept(&parsed) => *slot = parsed,
        Ok(_) => tracing::warn!("{} '{}' out of range, using default", name, raw),
        Err(_) => tracing::warn!("Invalid {} '{}', using default", name, raw),
    }
}
