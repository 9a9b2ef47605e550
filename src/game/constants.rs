//! Default tuning values.
//!
//! Every value here is the default of a field in [`crate::config::SimConfig`]
//! unless noted otherwise; the behavioural multipliers used inside the systems
//! are fixed and live only here.

/// World rectangle and entity sizes
pub mod world {
    pub const WIDTH: f32 = 1080.0;
    pub const HEIGHT: f32 = 640.0;
    /// Visual radius of an agent, used as the reflection margin at the world edge
    pub const AGENT_RADIUS: f32 = 8.0;
    pub const BONUS_RADIUS: f32 = 6.0;
    /// Agents created per group at game start
    pub const INITIAL_PER_GROUP: usize = 90;
}

/// Speed bounds and the per-group Poisson speed profile
pub mod speed {
    pub const GLOBAL_MIN: f32 = 0.1;
    pub const GLOBAL_MAX: f32 = 1.2;
    /// Minimum gap between an agent's min and max speed
    pub const MIN_RANGE: f32 = 0.3;
    /// Widest allowed gap between an agent's min and max speed
    pub const MAX_SPREAD: f32 = 1.4;
    /// Poisson draws are divided by this to land in the speed range
    pub const POISSON_SCALE: f64 = 5.0;
    /// Poisson means for groups A, B, C
    pub const POISSON_MEANS: [f64; 3] = [1.2, 1.0, 0.8];
    /// Chance per tick that an agent's speed takes a random step
    pub const WALK_PROBABILITY: f32 = 0.05;
    /// Largest single random step of the speed walk
    pub const WALK_STEP: f32 = 0.1;
}

/// Target acquisition
pub mod targeting {
    /// Prey farther than this is ignored
    pub const CHASE_THRESHOLD: f32 = 300.0;
    /// Predators farther than this are ignored
    pub const FLEE_THRESHOLD: f32 = 150.0;
    /// Prey wins over a predator when `prey_dist < predator_dist * PREY_BIAS`
    pub const PREY_BIAS: f32 = 1.5;
    /// Chance per tick that an untargeted agent gets a wandering impulse
    pub const WANDER_PROBABILITY: f32 = 0.02;
    /// Wandering impulse magnitude as a fraction of the global max speed
    pub const WANDER_IMPULSE: f32 = 0.5;
    /// Bonus disks farther than this are not sought out
    pub const BONUS_SEEK_DISTANCE: f32 = 100.0;
}

/// Population thresholds and movement weights for strategic mode
pub mod strategy {
    /// Prey count below which hunting turns strategic
    pub const CRITICAL_POPULATION: usize = 15;
    /// Prey share of the population below which hunting turns strategic
    pub const CRITICAL_RATIO: f32 = 0.25;
    /// Predator share above which the agent turns strategic
    pub const PREDATOR_RATIO: f32 = 0.4;
    /// Any group below this count puts everyone into strategic mode
    pub const ULTRA_PROTECTIVE_THRESHOLD: usize = 8;
    /// Own share above which the agent holds back
    pub const DOMINANCE_RATIO: f32 = 0.5;
    /// Prey/predator count gap under which the balance counts as delicate
    pub const BALANCE_GAP: usize = 5;

    // Fixed movement weights (multiples of the agent's current speed)
    pub const AVOID_WEIGHT: f32 = 1.2;
    pub const CENTER_PULL_WEIGHT: f32 = 0.4;
    pub const HERD_WEIGHT: f32 = 0.8;
    /// Herding switches to circling inside `eating_distance * HERD_RANGE_FACTOR`
    pub const HERD_RANGE_FACTOR: f32 = 4.0;
    pub const IDLE_APPROACH_WEIGHT: f32 = 0.2;
    pub const CAUTIOUS_PURSUIT_WEIGHT: f32 = 0.4;
    pub const ORBIT_PROBABILITY: f32 = 0.3;
    pub const ORBIT_WEIGHT: f32 = 0.3;
    pub const PERTURB_PROBABILITY: f32 = 0.15;
    pub const PERTURB_WEIGHT: f32 = 0.3;
}

/// Motion integration
pub mod movement {
    /// Base wandering displacement as a fraction of speed
    pub const WANDER_FACTOR: f32 = 0.3;
    /// Speed multiplier when heading for a bonus disk
    pub const BONUS_SEEK_FACTOR: f32 = 1.5;
    pub const FLEE_MIN_FACTOR: f32 = 0.8;
    pub const FLEE_MAX_FACTOR: f32 = 1.2;
    /// Per-tick momentum decay
    pub const MOMENTUM_DECAY: f32 = 0.95;
    /// Momentum jitter per component as a fraction of speed
    pub const MOMENTUM_JITTER: f32 = 0.1;
    /// Extra noise applied on top of any strategic tick
    pub const STRATEGIC_NOISE_PROBABILITY: f32 = 0.15;
    pub const STRATEGIC_NOISE: f32 = 0.7;
    /// Standoff ticks before an escape burst becomes possible
    pub const STALEMATE_TICKS: u32 = 60;
    pub const STALEMATE_BURST_PROBABILITY: f32 = 0.1;
    /// Escape burst magnitude as a multiple of speed
    pub const STALEMATE_BURST: f32 = 2.0;
    /// Standoff detection radius as a fraction of the chase threshold
    pub const STALEMATE_RADIUS_FACTOR: f32 = 0.5;
}

/// Collision
pub mod collision {
    /// Capture happens strictly below this distance
    pub const EATING_DISTANCE: f32 = 12.0;
}

/// Shrinking arena
pub mod arena {
    pub const INITIAL_RADIUS: f32 = 650.0;
    /// Radius lost per tick
    pub const SHRINK_RATE: f32 = 0.4;
    /// Inward nudge for agents outside the circle
    pub const OUTSIDE_FORCE: f32 = 8.0;
    /// Radius ratios that trigger a bonus batch, with the batch size
    pub const SPAWN_THRESHOLDS: [(f32, usize); 4] = [(0.8, 8), (0.7, 10), (0.6, 8), (0.4, 8)];
    /// Strategic centre pull only kicks in beyond `world_width * CENTER_PULL_FRACTION`
    pub const CENTER_PULL_FRACTION: f32 = 0.25;
}

/// Bonus disks
pub mod bonus {
    pub const MULTIPLIER: f32 = 5.0;
    pub const DURATION_MS: u64 = 5000;
    /// Clones appear within +/- this many units of the collector
    pub const SPAWN_JITTER: f32 = 10.0;
}

/// Game loop timing
pub mod game {
    pub const TICK_RATE: u32 = 60;
    /// Delay between a decided game and the reset
    pub const RESTART_DELAY_MS: u64 = 5000;
}
