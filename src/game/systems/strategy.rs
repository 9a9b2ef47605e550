//! Population-aware hunting policy.
//!
//! When the balance between groups gets fragile, hunters stop charging
//! straight at prey: they protect the last few prey, herd a dwindling group,
//! or pursue cautiously.

use rand::Rng;

use crate::config::{SimConfig, StrategyConfig};
use crate::game::constants::strategy::*;
use crate::game::population::PopulationCounts;
use crate::game::state::{Agent, Group};
use crate::util::vec2::Vec2;

/// Which strategic branch applies, chosen by the remaining prey count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategicStance {
    /// Very few prey left: back off and stay near the centre
    Protective,
    /// Prey is thinning: circle it instead of closing in
    Herding,
    /// Prey is healthy but the balance is not
    Cautious,
}

impl StrategicStance {
    pub fn for_prey_count(prey_count: usize, config: &StrategyConfig) -> Self {
        if prey_count < config.ultra_protective_threshold {
            StrategicStance::Protective
        } else if prey_count < config.critical_population {
            StrategicStance::Herding
        } else {
            StrategicStance::Cautious
        }
    }
}

/// Whether an agent of `group` should hunt strategically given the counts
pub fn should_be_strategic(group: Group, counts: &PopulationCounts, config: &StrategyConfig) -> bool {
    let (Some(prey_ratio), Some(predator_ratio), Some(own_ratio)) = (
        counts.ratio(group.prey()),
        counts.ratio(group.predator()),
        counts.ratio(group),
    ) else {
        return false;
    };

    let prey = counts.get(group.prey());
    let predator = counts.get(group.predator());

    prey < config.critical_population
        || prey_ratio < config.critical_ratio
        || predator_ratio > config.predator_ratio
        || counts.min() < config.ultra_protective_threshold
        || own_ratio > config.dominance_ratio
        || prey.abs_diff(predator) < config.balance_gap
}

/// Displacement for a strategic hunter.
///
/// `to_target` points from the agent to its prey and `distance` is its length.
pub fn strategic_movement<R: Rng + ?Sized>(
    agent: &Agent,
    to_target: Vec2,
    distance: f32,
    counts: &PopulationCounts,
    config: &SimConfig,
    rng: &mut R,
) -> Vec2 {
    let speed = agent.speed;
    let heading = if distance > 0.0 { to_target * (1.0 / distance) } else { Vec2::ZERO };
    let prey_count = counts.get(agent.group.prey());
    let mut movement = Vec2::ZERO;

    match StrategicStance::for_prey_count(prey_count, &config.strategy) {
        StrategicStance::Protective => {
            if distance > 0.0 && distance < config.chase_threshold {
                movement -= heading * (speed * AVOID_WEIGHT);
            }
            let to_center = config.arena_center() - agent.position;
            let (center_dir, center_dist) = to_center.normalize_with_length();
            if center_dist > config.center_pull_distance() {
                movement += center_dir * (speed * CENTER_PULL_WEIGHT);
            }
        }
        StrategicStance::Herding => {
            if distance > 0.0 && distance < config.eating_distance * HERD_RANGE_FACTOR {
                movement += heading.perpendicular() * (speed * HERD_WEIGHT);
            } else if distance > 0.0 && distance < config.chase_threshold {
                movement += heading * (speed * IDLE_APPROACH_WEIGHT);
            }
        }
        StrategicStance::Cautious => {
            if distance > 0.0 && distance < config.chase_threshold {
                movement += heading * (speed * CAUTIOUS_PURSUIT_WEIGHT);
                if rng.gen::<f32>() < ORBIT_PROBABILITY {
                    movement += heading.perpendicular() * (speed * ORBIT_WEIGHT);
                }
            }
        }
    }

    if rng.gen::<f32>() < PERTURB_PROBABILITY {
        let spread = speed * PERTURB_WEIGHT;
        if spread > 0.0 {
            movement += Vec2::new(rng.gen_range(-spread..=spread), rng.gen_range(-spread..=spread));
        }
    }

    movement
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn hunter(position: Vec2) -> Agent {
        Agent::new(position, Group::A, 0.2, 1.0, 1.0, 0.0)
    }

    #[test]
    fn test_balanced_population_is_not_strategic() {
        let config = StrategyConfig::default();
        // prey 30 of 100, predator 30, own 40, gap 0 -> balance gap triggers
        let tight = PopulationCounts::from_counts(40, 30, 30);
        assert!(should_be_strategic(Group::A, &tight, &config));

        // A=34, B=40 (prey), C=26 (predator): nothing fires
        let healthy = PopulationCounts::from_counts(34, 40, 26);
        assert!(!should_be_strategic(Group::A, &healthy, &config));
    }

    #[test]
    fn test_each_condition_triggers() {
        let config = StrategyConfig::default();
        // prey below critical population
        assert!(should_be_strategic(Group::A, &PopulationCounts::from_counts(20, 14, 30), &config));
        // predator share above 0.4
        assert!(should_be_strategic(Group::A, &PopulationCounts::from_counts(30, 30, 45), &config));
        // own share above 0.5
        assert!(should_be_strategic(Group::A, &PopulationCounts::from_counts(60, 30, 20), &config));
        // some group below 8 (here the agent's own)
        assert!(should_be_strategic(Group::A, &PopulationCounts::from_counts(5, 40, 30), &config));
    }

    #[test]
    fn test_empty_population_is_not_strategic() {
        let config = StrategyConfig::default();
        assert!(!should_be_strategic(Group::B, &PopulationCounts::default(), &config));
    }

    #[test]
    fn test_stance_by_prey_count() {
        let config = StrategyConfig::default();
        assert_eq!(StrategicStance::for_prey_count(3, &config), StrategicStance::Protective);
        assert_eq!(StrategicStance::for_prey_count(8, &config), StrategicStance::Herding);
        assert_eq!(StrategicStance::for_prey_count(14, &config), StrategicStance::Herding);
        assert_eq!(StrategicStance::for_prey_count(15, &config), StrategicStance::Cautious);
    }

    #[test]
    fn test_protective_moves_away_from_prey() {
        let config = SimConfig::default();
        let agent = hunter(config.arena_center());
        let counts = PopulationCounts::from_counts(50, 3, 40);
        let mut rng = SmallRng::seed_from_u64(1);

        let mut away = 0;
        for _ in 0..100 {
            let movement = strategic_movement(&agent, Vec2::new(50.0, 0.0), 50.0, &counts, &config, &mut rng);
            if movement.x < 0.0 {
                away += 1;
            }
        }
        // Only the rare perturbation can flip the sign
        assert!(away > 90);
    }

    #[test]
    fn test_protective_pulls_toward_center() {
        let config = SimConfig::default();
        // Far left of centre, prey out of range
        let agent = hunter(Vec2::new(20.0, config.arena_center().y));
        let counts = PopulationCounts::from_counts(50, 3, 40);
        let mut rng = SmallRng::seed_from_u64(2);

        let movement = strategic_movement(&agent, Vec2::new(0.0, 500.0), 500.0, &counts, &config, &mut rng);
        assert!(movement.x > 0.0);
    }

    #[test]
    fn test_herding_circles_close_prey() {
        let config = SimConfig::default();
        let agent = hunter(Vec2::new(500.0, 300.0));
        let counts = PopulationCounts::from_counts(50, 10, 40);
        let mut rng = SmallRng::seed_from_u64(3);

        let mut perpendicular = 0;
        for _ in 0..100 {
            let movement = strategic_movement(&agent, Vec2::new(20.0, 0.0), 20.0, &counts, &config, &mut rng);
            // heading (1, 0) -> perpendicular (0, 1) scaled by 0.8
            if (movement.y - HERD_WEIGHT).abs() < 1e-4 && movement.x.abs() < 1e-4 {
                perpendicular += 1;
            }
        }
        assert!(perpendicular > 70);
    }

    #[test]
    fn test_zero_distance_is_safe() {
        let config = SimConfig::default();
        let agent = hunter(config.arena_center());
        let mut rng = SmallRng::seed_from_u64(4);
        for counts in [
            PopulationCounts::from_counts(50, 3, 40),
            PopulationCounts::from_counts(50, 10, 40),
            PopulationCounts::from_counts(50, 40, 40),
        ] {
            let movement = strategic_movement(&agent, Vec2::ZERO, 0.0, &counts, &config, &mut rng);
            assert!(movement.x.is_finite() && movement.y.is_finite());
        }
    }
}
