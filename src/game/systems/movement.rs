//! Movement integration system
//!
//! Combines wandering, target pursuit/escape, momentum and stalemate bursts
//! into one displacement per agent per tick, then reflects off the world edge.

use std::f32::consts::{PI, TAU};

use rand::Rng;

use crate::config::SimConfig;
use crate::game::constants::movement::*;
use crate::game::constants::speed::{WALK_PROBABILITY, WALK_STEP};
use crate::game::population::PopulationCounts;
use crate::game::state::{Agent, AgentBehavior, GameState, Group};
use crate::game::systems::strategy::{should_be_strategic, strategic_movement};
use crate::util::vec2::Vec2;

/// Position and group of every agent at the start of the pass
type NeighborView = Vec<(Vec2, Group)>;

/// Move every agent one tick. `counts` must describe the current agent set.
pub fn update<R: Rng + ?Sized>(state: &mut GameState, counts: &PopulationCounts, config: &SimConfig, rng: &mut R) {
    let neighbors: NeighborView = state.agents.iter().map(|a| (a.position, a.group)).collect();
    let bonus_targets: Vec<Option<Vec2>> = state
        .agents
        .iter()
        .map(|a| a.bonus_target.and_then(|id| state.get_disk(id)).map(|d| d.position))
        .collect();

    for (index, agent) in state.agents.iter_mut().enumerate() {
        step_agent(index, agent, &neighbors, bonus_targets[index], counts, config, rng);
    }
}

fn step_agent<R: Rng + ?Sized>(
    index: usize,
    agent: &mut Agent,
    neighbors: &NeighborView,
    bonus_target: Option<Vec2>,
    counts: &PopulationCounts,
    config: &SimConfig,
    rng: &mut R,
) {
    if rng.gen::<f32>() < WALK_PROBABILITY {
        agent.adjust_speed(rng.gen_range(-WALK_STEP..=WALK_STEP));
    }
    let speed = agent.speed;

    let wander = Vec2::from_angle(agent.direction) * (speed * WANDER_FACTOR);

    update_stalemate(index, agent, neighbors, config, rng);

    let strategic = should_be_strategic(agent.group, counts, &config.strategy);
    let mut target_move = target_displacement(agent, neighbors, bonus_target, strategic, counts, config, rng);
    // Strategic agents wobble whatever they are doing
    if strategic && rng.gen::<f32>() < STRATEGIC_NOISE_PROBABILITY {
        target_move += jitter(speed * STRATEGIC_NOISE, rng);
    }

    agent.momentum = agent.momentum * MOMENTUM_DECAY + jitter(speed * MOMENTUM_JITTER, rng);
    agent.position += wander + target_move + agent.momentum;

    if !agent.momentum.is_zero() {
        agent.facing = agent.momentum.angle();
    }

    reflect(agent, config);
}

/// Count standoff ticks and break long ones with a random burst.
///
/// A standoff is having exactly the two other groups close by and none of
/// one's own.
fn update_stalemate<R: Rng + ?Sized>(
    index: usize,
    agent: &mut Agent,
    neighbors: &NeighborView,
    config: &SimConfig,
    rng: &mut R,
) {
    let radius_sq = (config.chase_threshold * STALEMATE_RADIUS_FACTOR).powi(2);
    let mut present = [false; 3];
    for (other, &(position, group)) in neighbors.iter().enumerate() {
        if other != index && position.distance_sq_to(agent.position) < radius_sq {
            present[group.index()] = true;
        }
    }

    let nearby_groups = present.iter().filter(|&&p| p).count();
    if nearby_groups == 2 && !present[agent.group.index()] {
        agent.stalemate_timer += 1;
    } else {
        agent.stalemate_timer = agent.stalemate_timer.saturating_sub(1);
    }

    if agent.stalemate_timer > STALEMATE_TICKS && rng.gen::<f32>() < STALEMATE_BURST_PROBABILITY {
        let angle = rng.gen_range(0.0..TAU);
        agent.momentum += Vec2::from_angle(angle) * (agent.speed * STALEMATE_BURST);
        agent.stalemate_timer = 0;
        tracing::trace!(agent = index, "stalemate burst");
    }
}

/// Displacement toward a bonus, away from a predator, or toward prey.
/// Also sets the agent's behavior label.
fn target_displacement<R: Rng + ?Sized>(
    agent: &mut Agent,
    neighbors: &NeighborView,
    bonus_target: Option<Vec2>,
    strategic: bool,
    counts: &PopulationCounts,
    config: &SimConfig,
    rng: &mut R,
) -> Vec2 {
    let speed = agent.speed;

    if let Some(disk_position) = bonus_target {
        agent.behavior = AgentBehavior::SeekingBonus;
        return (disk_position - agent.position).normalize() * (speed * BONUS_SEEK_FACTOR);
    }

    let Some(&(target_pos, target_group)) = agent.target.and_then(|id| neighbors.get(id)) else {
        agent.behavior = AgentBehavior::Idle;
        return Vec2::ZERO;
    };

    let (heading, distance) = (target_pos - agent.position).normalize_with_length();

    if agent.fleeing {
        agent.behavior = AgentBehavior::Fleeing;
        let factor = rng.gen_range(FLEE_MIN_FACTOR..=FLEE_MAX_FACTOR);
        return -heading * (speed * factor);
    }

    if !agent.group.can_eat(target_group) {
        agent.behavior = AgentBehavior::Idle;
        return Vec2::ZERO;
    }

    if strategic {
        agent.behavior = AgentBehavior::Strategic;
        return strategic_movement(agent, target_pos - agent.position, distance, counts, config, rng);
    }

    if distance < config.chase_threshold {
        agent.behavior = AgentBehavior::Hunting;
        return heading * speed;
    }

    agent.behavior = AgentBehavior::Idle;
    Vec2::ZERO
}

/// Uniform noise in `[-spread, spread]` per component
fn jitter<R: Rng + ?Sized>(spread: f32, rng: &mut R) -> Vec2 {
    if spread <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(rng.gen_range(-spread..=spread), rng.gen_range(-spread..=spread))
}

/// Bounce off the world rectangle, offset by the agent radius
fn reflect(agent: &mut Agent, config: &SimConfig) {
    let r = config.agent_radius;
    let (max_x, max_y) = (config.world_width - r, config.world_height - r);

    if agent.position.x <= r || agent.position.x >= max_x {
        agent.direction = PI - agent.direction;
        agent.position.x = agent.position.x.clamp(r, max_x);
    }
    if agent.position.y <= r || agent.position.y >= max_y {
        agent.direction = -agent.direction;
        agent.position.y = agent.position.y.clamp(r, max_y);
    }
}
