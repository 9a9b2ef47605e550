//! Agent creation: per-group speed profiles and spawn positions.

use rand::Rng;
use rand_distr::{Distribution, Poisson};

use crate::config::{ConfigError, SimConfig};
use crate::game::constants::speed::{MAX_SPREAD, POISSON_SCALE};
use crate::game::state::{Agent, Group};
use crate::util::vec2::Vec2;

/// Draws speed bounds for new agents.
///
/// Max speed comes from a per-group Poisson draw scaled into the global range,
/// so groups differ in typical top speed while every agent keeps a usable
/// `[min, max]` window.
#[derive(Debug, Clone)]
pub struct SpeedProfile {
    global_min: f32,
    global_max: f32,
    min_range: f32,
    poisson: [Poisson<f64>; 3],
}

impl SpeedProfile {
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        let build = |index: usize, group: char| {
            let mean = config.poisson_means[index];
            Poisson::new(mean).map_err(|_| ConfigError::InvalidPoissonMean { group, mean })
        };
        Ok(Self {
            global_min: config.global_min_speed,
            global_max: config.global_max_speed,
            min_range: config.min_speed_range,
            poisson: [build(0, 'A')?, build(1, 'B')?, build(2, 'C')?],
        })
    }

    /// Returns `(min_speed, max_speed, speed)`
    pub fn sample<R: Rng + ?Sized>(&self, group: Group, rng: &mut R) -> (f32, f32, f32) {
        let draw: f64 = self.poisson[group.index()].sample(rng);
        let max_speed = ((draw / POISSON_SCALE) as f32)
            .max(self.global_min + self.min_range)
            .min(self.global_max);

        let low = self.global_min.max(max_speed - MAX_SPREAD);
        let high = max_speed - self.min_range;
        let min_speed = if high > low { rng.gen_range(low..=high) } else { low };

        let speed = rng.gen_range(min_speed..=max_speed);
        (min_speed, max_speed, speed)
    }

    /// Fresh agent of `group` at `position` with a random heading
    pub fn spawn_agent<R: Rng + ?Sized>(&self, position: Vec2, group: Group, rng: &mut R) -> Agent {
        let (min_speed, max_speed, speed) = self.sample(group, rng);
        let direction = rng.gen_range(0.0..std::f32::consts::TAU);
        Agent::new(position, group, min_speed, max_speed, speed, direction)
    }
}

/// Random position inside the world rectangle, one agent radius from the edge
pub fn random_world_position<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> Vec2 {
    let margin = config.agent_radius;
    Vec2::new(
        rng.gen_range(margin..=config.world_width - margin),
        rng.gen_range(margin..=config.world_height - margin),
    )
}

/// Clamp a position into the world rectangle (respecting the agent radius)
pub fn clamp_to_world(position: Vec2, config: &SimConfig) -> Vec2 {
    let margin = config.agent_radius;
    Vec2::new(
        position.x.clamp(margin, config.world_width - margin),
        position.y.clamp(margin, config.world_height - margin),
    )
}

/// Position within `+/- jitter` of `origin` on each axis, kept inside the world
pub fn jittered_position<R: Rng + ?Sized>(origin: Vec2, jitter: f32, config: &SimConfig, rng: &mut R) -> Vec2 {
    let offset = if jitter > 0.0 {
        Vec2::new(rng.gen_range(-jitter..=jitter), rng.gen_range(-jitter..=jitter))
    } else {
        Vec2::ZERO
    };
    clamp_to_world(origin + offset, config)
}

/// Starting population: `initial_per_group` agents of each group, A first
pub fn initial_population<R: Rng + ?Sized>(config: &SimConfig, profile: &SpeedProfile, rng: &mut R) -> Vec<Agent> {
    let mut agents = Vec::with_capacity(config.initial_per_group * Group::ALL.len());
    for group in Group::ALL {
        for _ in 0..config.initial_per_group {
            let position = random_world_position(config, rng);
            agents.push(profile.spawn_agent(position, group, rng));
        }
    }
    agents
}
