use rand::Rng;

use crate::config::SimConfig;
use crate::game::constants::targeting::{PREY_BIAS, WANDER_IMPULSE, WANDER_PROBABILITY};
use crate::game::state::{Agent, AgentId, BonusDisk, DiskId, GameState};
use crate::util::vec2::Vec2;

/// Target chosen for one agent this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetDecision {
    pub target: Option<AgentId>,
    pub fleeing: bool,
    pub bonus_target: Option<DiskId>,
}

/// Nearest prey within chase range and nearest predator within flee range,
/// each as `(id, distance)`. Strict `<` keeps the first agent found on ties.
pub fn find_nearest(
    agents: &[Agent],
    index: AgentId,
    chase_threshold: f32,
    flee_threshold: f32,
) -> (Option<(AgentId, f32)>, Option<(AgentId, f32)>) {
    let me = &agents[index];
    let mut nearest_prey: Option<(AgentId, f32)> = None;
    let mut nearest_predator: Option<(AgentId, f32)> = None;

    for (other_id, other) in agents.iter().enumerate() {
        if other_id == index {
            continue;
        }

        let dist = me.position.distance_to(other.position);

        if me.group.can_eat(other.group) {
            if dist < chase_threshold && nearest_prey.map_or(true, |(_, d)| dist < d) {
                nearest_prey = Some((other_id, dist));
            }
        } else if other.group.can_eat(me.group)
            && dist < flee_threshold
            && nearest_predator.map_or(true, |(_, d)| dist < d)
        {
            nearest_predator = Some((other_id, dist));
        }
    }

    (nearest_prey, nearest_predator)
}

/// Hunting beats fleeing unless the predator is clearly closer.
/// Returns `(target, fleeing)`.
pub fn select_target(
    prey: Option<(AgentId, f32)>,
    predator: Option<(AgentId, f32)>,
) -> (Option<AgentId>, bool) {
    match (prey, predator) {
        (Some((prey_id, prey_dist)), Some((_, predator_dist))) if prey_dist < predator_dist * PREY_BIAS => {
            (Some(prey_id), false)
        }
        (Some((prey_id, _)), None) => (Some(prey_id), false),
        (_, Some((predator_id, _))) => (Some(predator_id), true),
        (None, None) => (None, false),
    }
}

/// Nearest disk within `seek_distance` of `position`
pub fn nearest_disk(disks: &[BonusDisk], position: Vec2, seek_distance: f32) -> Option<DiskId> {
    disks
        .iter()
        .map(|d| (d.id, d.position.distance_to(position)))
        .filter(|&(_, dist)| dist < seek_distance)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(id, _)| id)
}

/// Compute a decision for every agent from the positions at tick start
pub fn decide_all(state: &GameState, config: &SimConfig) -> Vec<TargetDecision> {
    (0..state.agents.len())
        .map(|index| {
            let (prey, predator) = find_nearest(&state.agents, index, config.chase_threshold, config.flee_threshold);
            let (target, fleeing) = select_target(prey, predator);
            let bonus_target = if fleeing {
                None
            } else {
                nearest_disk(&state.disks, state.agents[index].position, config.bonus_seek_distance)
            };
            TargetDecision {
                target,
                fleeing,
                bonus_target,
            }
        })
        .collect()
}

/// Assign targets to all agents. Untargeted agents occasionally get a random
/// wandering impulse in place of their momentum.
pub fn update<R: Rng + ?Sized>(state: &mut GameState, config: &SimConfig, rng: &mut R) {
    let decisions = decide_all(state, config);
    let wander_speed = config.global_max_speed * WANDER_IMPULSE;

    for (agent, decision) in state.agents.iter_mut().zip(decisions) {
        agent.target = decision.target;
        agent.fleeing = decision.fleeing;
        agent.bonus_target = decision.bonus_target;

        if decision.target.is_none() && rng.gen::<f32>() < WANDER_PROBABILITY {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            agent.momentum = Vec2::from_angle(angle) * wander_speed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Group;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn agent(x: f32, y: f32, group: Group) -> Agent {
        Agent::new(Vec2::new(x, y), group, 0.2, 0.8, 0.5, 0.0)
    }

    fn state_with(agents: Vec<Agent>) -> GameState {
        let mut state = GameState::new(&SimConfig::default());
        for a in agents {
            state.add_agent(a);
        }
        state
    }

    #[test]
    fn test_find_nearest_classifies() {
        let agents = vec![
            agent(100.0, 100.0, Group::A),
            agent(150.0, 100.0, Group::B), // prey at 50
            agent(100.0, 180.0, Group::C), // predator at 80
            agent(110.0, 100.0, Group::A), // same group, ignored
        ];
        let (prey, predator) = find_nearest(&agents, 0, 300.0, 150.0);
        assert_eq!(prey, Some((1, 50.0)));
        assert_eq!(predator, Some((2, 80.0)));
    }

    #[test]
    fn test_find_nearest_respects_thresholds() {
        let agents = vec![
            agent(0.0, 0.0, Group::A),
            agent(301.0, 0.0, Group::B),
            agent(0.0, 151.0, Group::C),
        ];
        let (prey, predator) = find_nearest(&agents, 0, 300.0, 150.0);
        assert!(prey.is_none());
        assert!(predator.is_none());
    }

    #[test]
    fn test_find_nearest_first_wins_ties() {
        let agents = vec![
            agent(0.0, 0.0, Group::B),
            agent(10.0, 0.0, Group::C),
            agent(-10.0, 0.0, Group::C),
        ];
        let (prey, _) = find_nearest(&agents, 0, 300.0, 150.0);
        assert_eq!(prey.map(|p| p.0), Some(1));
    }

    #[test]
    fn test_select_target_prefers_prey_within_bias() {
        // 140 < 100 * 1.5, hunt
        assert_eq!(select_target(Some((1, 140.0)), Some((2, 100.0))), (Some(1), false));
        // 150 is not < 150, flee
        assert_eq!(select_target(Some((1, 150.0)), Some((2, 100.0))), (Some(2), true));
    }

    #[test]
    fn test_select_target_single_options() {
        assert_eq!(select_target(Some((4, 10.0)), None), (Some(4), false));
        assert_eq!(select_target(None, Some((5, 10.0))), (Some(5), true));
        assert_eq!(select_target(None, None), (None, false));
    }

    #[test]
    fn test_update_assigns_targets() {
        let mut state = state_with(vec![
            agent(100.0, 100.0, Group::A),
            agent(120.0, 100.0, Group::B),
        ]);
        let mut rng = SmallRng::seed_from_u64(1);
        update(&mut state, &SimConfig::default(), &mut rng);

        assert_eq!(state.agents[0].target, Some(1));
        assert!(!state.agents[0].fleeing);
        assert_eq!(state.agents[1].target, Some(0));
        assert!(state.agents[1].fleeing);
    }

    #[test]
    fn test_fleeing_agents_ignore_bonus() {
        let mut state = state_with(vec![
            agent(100.0, 100.0, Group::A),
            agent(120.0, 100.0, Group::B),
        ]);
        state.add_disk(Vec2::new(110.0, 120.0), 6.0);
        let decisions = decide_all(&state, &SimConfig::default());

        assert!(decisions[0].bonus_target.is_some());
        assert!(decisions[1].fleeing);
        assert!(decisions[1].bonus_target.is_none());
    }

    #[test]
    fn test_nearest_disk_within_range() {
        let mut state = state_with(vec![]);
        let far = state.add_disk(Vec2::new(90.0, 0.0), 6.0);
        let near = state.add_disk(Vec2::new(30.0, 0.0), 6.0);
        state.add_disk(Vec2::new(500.0, 0.0), 6.0);

        assert_eq!(nearest_disk(&state.disks, Vec2::ZERO, 100.0), Some(near));
        assert_eq!(nearest_disk(&state.disks, Vec2::new(120.0, 0.0), 50.0), Some(far));
        assert_eq!(nearest_disk(&state.disks, Vec2::new(250.0, 300.0), 100.0), None);
    }

    #[test]
    fn test_lonely_agent_eventually_wanders() {
        let mut state = state_with(vec![agent(500.0, 300.0, Group::A)]);
        let mut rng = SmallRng::seed_from_u64(9);
        let config = SimConfig::default();

        let mut impulses = 0;
        for _ in 0..1000 {
            state.agents[0].momentum = Vec2::ZERO;
            update(&mut state, &config, &mut rng);
            if !state.agents[0].momentum.is_zero() {
                impulses += 1;
                let len = state.agents[0].momentum.length();
                assert!((len - config.global_max_speed * WANDER_IMPULSE).abs() < 1e-4);
            }
        }
        // 2% of 1000 ticks
        assert!(impulses > 5 && impulses < 50, "got {} impulses", impulses);
    }
}
