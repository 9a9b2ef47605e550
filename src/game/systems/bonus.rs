//! Bonus disk system
//! Spawns collectible disks inside the arena when it crosses a radius
//! threshold, and hands out multipliers and reinforcements on pickup

use rand::Rng;

use crate::config::SimConfig;
use crate::game::spawn::{jittered_position, SpeedProfile};
use crate::game::state::{Agent, AgentId, DiskId, GameState};
use crate::game::systems::arena::random_point_in_circle;

/// One pickup during a collection pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonusCollection {
    pub collector: AgentId,
    pub disk: DiskId,
    /// Id the reinforcement will have once staged spawns are committed
    pub spawned: AgentId,
}

/// Result of [`collect`]. `spawned` is staged, not yet in the registry.
#[derive(Debug, Default)]
pub struct BonusPass {
    pub collections: Vec<BonusCollection>,
    pub spawned: Vec<Agent>,
}

/// Place `count` disks uniformly inside the current arena circle
pub fn spawn_batch<R: Rng + ?Sized>(state: &mut GameState, count: usize, config: &SimConfig, rng: &mut R) -> Vec<DiskId> {
    let (center, radius) = (state.arena.center, state.arena.radius);
    let ids: Vec<DiskId> = (0..count)
        .map(|_| {
            let position = random_point_in_circle(center, radius, rng);
            state.add_disk(position, config.bonus_radius)
        })
        .collect();

    tracing::debug!(count, radius, active = state.disks.len(), "Spawned bonus batch");
    ids
}

/// Let agents pick up disks within eating distance.
///
/// Agents are visited in index order and disks in spawn order; the first agent
/// to reach a disk gets it, and one agent may take several disks in a pass.
/// Each pickup grants the multiplier and stages one same-group agent near the
/// collector.
pub fn collect<R: Rng + ?Sized>(
    state: &mut GameState,
    config: &SimConfig,
    profile: &SpeedProfile,
    now_ms: u64,
    rng: &mut R,
) -> BonusPass {
    let mut pass = BonusPass::default();
    if state.disks.is_empty() {
        return pass;
    }

    let reach_sq = config.eating_distance * config.eating_distance;
    let base_id = state.agents.len();
    let GameState { agents, disks, .. } = state;

    for (index, agent) in agents.iter_mut().enumerate() {
        if disks.is_empty() {
            break;
        }

        let mut d = 0;
        while d < disks.len() {
            if disks[d].position.distance_sq_to(agent.position) >= reach_sq {
                d += 1;
                continue;
            }

            let disk = disks.remove(d);
            agent.bonus.grant(config.bonus.multiplier, now_ms);
            if agent.bonus_target == Some(disk.id) {
                agent.bonus_target = None;
            }

            let position = jittered_position(agent.position, config.bonus.spawn_jitter, config, rng);
            let spawned_id = base_id + pass.spawned.len();
            pass.spawned.push(profile.spawn_agent(position, agent.group, rng));
            pass.collections.push(BonusCollection {
                collector: index,
                disk: disk.id,
                spawned: spawned_id,
            });

            tracing::debug!(agent = index, disk = disk.id, group = ?agent.group, "Bonus collected");
        }
    }

    pass
}

/// Reset expired multipliers. Returns how many expired.
pub fn expire(agents: &mut [Agent], now_ms: u64, duration_ms: u64) -> usize {
    agents
        .iter_mut()
        .map(|a| a.bonus.expire(now_ms, duration_ms))
        .filter(|&expired| expired)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Group;
    use crate::util::vec2::Vec2;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn setup() -> (GameState, SimConfig, SpeedProfile, SmallRng) {
        let config = SimConfig::default();
        let profile = SpeedProfile::new(&config).unwrap();
        (GameState::new(&config), config, profile, SmallRng::seed_from_u64(17))
    }

    fn agent(x: f32, y: f32, group: Group) -> Agent {
        Agent::new(Vec2::new(x, y), group, 0.2, 0.8, 0.5, 0.0)
    }

    #[test]
    fn test_spawn_batch_inside_arena() {
        let (mut state, config, _, mut rng) = setup();
        state.arena.radius = 200.0;
        let ids = spawn_batch(&mut state, 10, &config, &mut rng);

        assert_eq!(ids.len(), 10);
        assert_eq!(state.disks.len(), 10);
        for disk in &state.disks {
            assert!(disk.position.distance_to(state.arena.center) <= 200.0 + 1e-3);
            assert_eq!(disk.radius, config.bonus_radius);
        }
    }

    #[test]
    fn test_collect_grants_and_spawns() {
        let (mut state, config, profile, mut rng) = setup();
        state.add_agent(agent(300.0, 300.0, Group::B));
        let disk = state.add_disk(Vec2::new(305.0, 300.0), 6.0);
        state.agents[0].bonus_target = Some(disk);

        let pass = collect(&mut state, &config, &profile, 1234, &mut rng);

        assert!(state.disks.is_empty());
        assert_eq!(state.agents[0].bonus.multiplier, 5.0);
        assert_eq!(state.agents[0].bonus.granted_at_ms, 1234);
        assert_eq!(state.agents[0].bonus_target, None);
        assert_eq!(pass.collections, vec![BonusCollection { collector: 0, disk, spawned: 1 }]);
        assert_eq!(pass.spawned.len(), 1);

        let clone = &pass.spawned[0];
        assert_eq!(clone.group, Group::B);
        assert!(clone.position.distance_to(Vec2::new(300.0, 300.0)) <= 10.0 * 2f32.sqrt() + 1e-3);
        assert!(clone.speed_in_bounds());
        // staged only
        assert_eq!(state.agents.len(), 1);
    }

    #[test]
    fn test_first_agent_wins_disk() {
        let (mut state, config, profile, mut rng) = setup();
        state.add_agent(agent(300.0, 300.0, Group::A));
        state.add_agent(agent(302.0, 300.0, Group::C));
        state.add_disk(Vec2::new(301.0, 300.0), 6.0);

        let pass = collect(&mut state, &config, &profile, 0, &mut rng);
        assert_eq!(pass.collections.len(), 1);
        assert_eq!(pass.collections[0].collector, 0);
        assert!(!state.agents[1].bonus.is_active());
        assert_eq!(pass.spawned[0].group, Group::A);
    }

    #[test]
    fn test_one_agent_collects_several() {
        let (mut state, config, profile, mut rng) = setup();
        state.add_agent(agent(300.0, 300.0, Group::A));
        state.add_disk(Vec2::new(305.0, 300.0), 6.0);
        state.add_disk(Vec2::new(300.0, 305.0), 6.0);
        state.add_disk(Vec2::new(500.0, 300.0), 6.0);

        let pass = collect(&mut state, &config, &profile, 0, &mut rng);
        assert_eq!(pass.collections.len(), 2);
        assert_eq!(pass.spawned.len(), 2);
        assert_eq!(pass.collections[1].spawned, 2);
        assert_eq!(state.disks.len(), 1);
    }

    #[test]
    fn test_expire() {
        let mut agents = vec![agent(0.0, 0.0, Group::A), agent(0.0, 0.0, Group::B)];
        agents[0].bonus.grant(5.0, 1000);
        agents[1].bonus.grant(5.0, 3000);

        assert_eq!(expire(&mut agents, 5999, 5000), 0);
        assert_eq!(expire(&mut agents, 6000, 5000), 1);
        assert_eq!(agents[0].bonus.multiplier, 1.0);
        assert_eq!(agents[1].bonus.multiplier, 5.0);
        assert_eq!(expire(&mut agents, 8000, 5000), 1);
    }
}
