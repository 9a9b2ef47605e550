//! Game state definitions and structures
//!
//! Contains the agents, bonus disks, arena and match phase of one game.

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::util::vec2::Vec2;

/// Position of an agent in the registry.
///
/// Agents are never removed during a game (capture only relabels them), so an
/// id stays valid until the next reset.
pub type AgentId = usize;

/// Stable identifier for bonus disks (never reused within a game)
pub type DiskId = u64;

/// One of the three cyclic factions. A preys on B, B on C, C on A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    A,
    B,
    C,
}

/// Rendering hint for a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Scissors,
    Paper,
    Rock,
}

impl Group {
    pub const ALL: [Group; 3] = [Group::A, Group::B, Group::C];

    /// The group this one converts on contact
    pub fn prey(self) -> Group {
        match self {
            Group::A => Group::B,
            Group::B => Group::C,
            Group::C => Group::A,
        }
    }

    /// The group that converts this one on contact
    pub fn predator(self) -> Group {
        match self {
            Group::A => Group::C,
            Group::B => Group::A,
            Group::C => Group::B,
        }
    }

    #[inline]
    pub fn can_eat(self, other: Group) -> bool {
        self.prey() == other
    }

    pub fn index(self) -> usize {
        match self {
            Group::A => 0,
            Group::B => 1,
            Group::C => 2,
        }
    }

    pub fn shape(self) -> Shape {
        match self {
            Group::A => Shape::Scissors,
            Group::B => Shape::Paper,
            Group::C => Shape::Rock,
        }
    }
}

/// What an agent did with its last movement step (rendering hint)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentBehavior {
    Idle,
    Hunting,
    Fleeing,
    Strategic,
    SeekingBonus,
}

/// Temporary multiplier granted by a bonus disk
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BonusState {
    pub multiplier: f32,
    pub granted_at_ms: u64,
}

impl Default for BonusState {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            granted_at_ms: 0,
        }
    }
}

impl BonusState {
    pub fn is_active(&self) -> bool {
        self.multiplier > 1.0
    }

    pub fn grant(&mut self, multiplier: f32, now_ms: u64) {
        self.multiplier = multiplier;
        self.granted_at_ms = now_ms;
    }

    /// Drop back to 1x once `duration_ms` has elapsed. Returns true on expiry.
    pub fn expire(&mut self, now_ms: u64, duration_ms: u64) -> bool {
        if self.is_active() && now_ms.saturating_sub(self.granted_at_ms) >= duration_ms {
            self.multiplier = 1.0;
            return true;
        }
        false
    }
}

/// A mobile agent
///
/// Hot fields (touched every movement step) come first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub position: Vec2,
    pub momentum: Vec2,
    /// Current speed, always within `[min_speed, max_speed]`
    pub speed: f32,
    /// Wandering heading (radians)
    pub direction: f32,
    /// Orientation for rendering: momentum angle, or the last one seen
    pub facing: f32,
    pub group: Group,
    pub stalemate_timer: u32,

    // Per-tick decisions, recomputed by targeting
    pub target: Option<AgentId>,
    pub fleeing: bool,
    pub bonus_target: Option<DiskId>,
    pub behavior: AgentBehavior,

    // Fixed at creation
    pub min_speed: f32,
    pub max_speed: f32,

    pub bonus: BonusState,
}

impl Agent {
    /// Create an agent with explicit speed bounds. `speed` is clamped into them.
    /// Swapped bounds are put back in order.
    pub fn new(position: Vec2, group: Group, min_speed: f32, max_speed: f32, speed: f32, direction: f32) -> Self {
        let (min_speed, max_speed) = if min_speed <= max_speed {
            (min_speed, max_speed)
        } else {
            (max_speed, min_speed)
        };
        Self {
            position,
            momentum: Vec2::ZERO,
            speed: speed.max(min_speed).min(max_speed),
            direction,
            facing: 0.0,
            group,
            stalemate_timer: 0,
            target: None,
            fleeing: false,
            bonus_target: None,
            behavior: AgentBehavior::Idle,
            min_speed,
            max_speed,
            bonus: BonusState::default(),
        }
    }

    #[inline]
    pub fn distance_to(&self, other: &Agent) -> f32 {
        self.position.distance_to(other.position)
    }

    #[inline]
    pub fn can_eat(&self, other: &Agent) -> bool {
        self.group.can_eat(other.group)
    }

    /// Shift the current speed by `delta`, staying inside the personal range
    pub fn adjust_speed(&mut self, delta: f32) {
        self.speed = (self.speed + delta).clamp(self.min_speed, self.max_speed);
    }

    pub fn speed_in_bounds(&self) -> bool {
        self.min_speed <= self.speed && self.speed <= self.max_speed
    }
}

/// Collectible power-up
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BonusDisk {
    pub id: DiskId,
    pub position: Vec2,
    pub radius: f32,
}

/// Radius ratio that requests one bonus batch, fired at most once per game
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ArenaThreshold {
    pub ratio: f32,
    pub disk_count: usize,
    pub fired: bool,
}

/// Shrinking play circle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Arena {
    pub center: Vec2,
    pub initial_radius: f32,
    pub radius: f32,
    pub shrink_rate: f32,
    /// Ticks of shrinking so far; the radius is derived from it so repeated
    /// subtraction never drifts
    pub shrink_ticks: u64,
    /// Descending by ratio
    pub thresholds: Vec<ArenaThreshold>,
}

impl Arena {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            center: config.arena_center(),
            initial_radius: config.initial_radius,
            radius: config.initial_radius,
            shrink_rate: config.shrink_rate,
            shrink_ticks: 0,
            thresholds: config
                .bonus
                .thresholds
                .iter()
                .map(|t| ArenaThreshold {
                    ratio: t.ratio,
                    disk_count: t.count,
                    fired: false,
                })
                .collect(),
        }
    }

    /// Current radius as a fraction of the initial one
    pub fn ratio(&self) -> f32 {
        if self.initial_radius > 0.0 {
            self.radius / self.initial_radius
        } else {
            0.0
        }
    }
}

/// Result of a decided game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Winner(Group),
    Draw,
}

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Agents move, capture and collect
    Playing,
    /// Agents are frozen until the restart delay elapses
    Decided { outcome: Outcome, decided_at_ms: u64 },
    /// Reinitialization happens on the next tick
    Resetting { outcome: Outcome },
}

impl Default for MatchPhase {
    fn default() -> Self {
        Self::Playing
    }
}

impl MatchPhase {
    pub fn is_playing(&self) -> bool {
        matches!(self, MatchPhase::Playing)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            MatchPhase::Playing => None,
            MatchPhase::Decided { outcome, .. } | MatchPhase::Resetting { outcome } => Some(*outcome),
        }
    }
}

/// Complete state of one game
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    pub tick: u64,
    pub phase: MatchPhase,
    pub arena: Arena,
    pub agents: Vec<Agent>,
    pub disks: Vec<BonusDisk>,
    /// Clock time of the most recent capture (informational)
    pub last_capture_ms: u64,
    next_disk_id: DiskId,
}

impl GameState {
    /// Empty game with a fresh arena
    pub fn new(config: &SimConfig) -> Self {
        Self {
            tick: 0,
            phase: MatchPhase::Playing,
            arena: Arena::new(config),
            agents: Vec::new(),
            disks: Vec::new(),
            last_capture_ms: 0,
            next_disk_id: 0,
        }
    }

    /// Register an agent and return its id
    pub fn add_agent(&mut self, agent: Agent) -> AgentId {
        self.agents.push(agent);
        self.agents.len() - 1
    }

    /// Append agents staged during a tick; they take part from the next tick on
    pub fn commit_spawns(&mut self, spawned: Vec<Agent>) {
        self.agents.extend(spawned);
    }

    pub fn add_disk(&mut self, position: Vec2, radius: f32) -> DiskId {
        let id = self.next_disk_id;
        self.next_disk_id += 1;
        self.disks.push(BonusDisk { id, position, radius });
        id
    }

    pub fn get_disk(&self, id: DiskId) -> Option<&BonusDisk> {
        self.disks.iter().find(|d| d.id == id)
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predation_is_cyclic() {
        for g in Group::ALL {
            assert!(g.can_eat(g.prey()));
            assert!(g.predator().can_eat(g));
            assert!(!g.can_eat(g));
            assert!(!g.can_eat(g.predator()));
            assert_ne!(g.prey(), g.predator());
            assert_eq!(g.prey().prey(), g.predator());
        }
    }

    #[test]
    fn test_each_group_eats_exactly_one() {
        for g in Group::ALL {
            let eaten = Group::ALL.iter().filter(|&&o| g.can_eat(o)).count();
            let eaten_by = Group::ALL.iter().filter(|&&o| o.can_eat(g)).count();
            assert_eq!(eaten, 1);
            assert_eq!(eaten_by, 1);
        }
    }

    #[test]
    fn test_group_index_and_shape() {
        assert_eq!(Group::ALL.map(Group::index), [0, 1, 2]);
        assert_eq!(Group::A.shape(), Shape::Scissors);
        assert_eq!(Group::B.shape(), Shape::Paper);
        assert_eq!(Group::C.shape(), Shape::Rock);
    }

    #[test]
    fn test_agent_new_clamps_speed() {
        let agent = Agent::new(Vec2::ZERO, Group::A, 0.2, 0.8, 5.0, 0.0);
        assert_eq!(agent.speed, 0.8);
        assert!(agent.speed_in_bounds());
    }

    #[test]
    fn test_adjust_speed_stays_in_bounds() {
        let mut agent = Agent::new(Vec2::ZERO, Group::B, 0.2, 0.8, 0.5, 0.0);
        agent.adjust_speed(10.0);
        assert_eq!(agent.speed, 0.8);
        agent.adjust_speed(-10.0);
        assert_eq!(agent.speed, 0.2);
    }

    #[test]
    fn test_agent_queries() {
        let a = Agent::new(Vec2::new(0.0, 0.0), Group::A, 0.1, 0.5, 0.3, 0.0);
        let b = Agent::new(Vec2::new(3.0, 4.0), Group::B, 0.1, 0.5, 0.3, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-6);
        assert!(a.can_eat(&b));
        assert!(!b.can_eat(&a));
    }

    #[test]
    fn test_bonus_expiry() {
        let mut bonus = BonusState::default();
        assert!(!bonus.is_active());
        bonus.grant(5.0, 1000);
        assert!(bonus.is_active());
        assert!(!bonus.expire(5999, 5000));
        assert!(bonus.expire(6000, 5000));
        assert_eq!(bonus.multiplier, 1.0);
        assert!(!bonus.expire(7000, 5000));
    }

    #[test]
    fn test_agent_new_orders_swapped_bounds() {
        let agent = Agent::new(Vec2::ZERO, Group::A, 0.9, 0.4, 2.0, 0.0);
        assert_eq!(agent.min_speed, 0.4);
        assert_eq!(agent.max_speed, 0.9);
        assert_eq!(agent.speed, 0.9);
        assert!(agent.speed_in_bounds());
    }

    #[test]
    fn test_arena_new() {
        let arena = Arena::new(&SimConfig::default());
        assert_eq!(arena.radius, 650.0);
        assert_eq!(arena.ratio(), 1.0);
        assert_eq!(arena.thresholds.len(), 4);
        assert!(arena.thresholds.iter().all(|t| !t.fired));
    }

    #[test]
    fn test_disk_ids_are_unique() {
        let mut state = GameState::new(&SimConfig::default());
        let a = state.add_disk(Vec2::ZERO, 6.0);
        let b = state.add_disk(Vec2::ZERO, 6.0);
        assert_ne!(a, b);
        state.disks.retain(|d| d.id != a);
        let c = state.add_disk(Vec2::ZERO, 6.0);
        assert_ne!(c, a);
        assert!(state.get_disk(a).is_none());
        assert!(state.get_disk(c).is_some());
    }

    #[test]
    fn test_commit_spawns_appends() {
        let mut state = GameState::new(&SimConfig::default());
        let id = state.add_agent(Agent::new(Vec2::ZERO, Group::A, 0.1, 0.5, 0.3, 0.0));
        assert_eq!(id, 0);
        state.commit_spawns(vec![Agent::new(Vec2::ZERO, Group::C, 0.1, 0.5, 0.3, 0.0)]);
        assert_eq!(state.agent_count(), 2);
        assert_eq!(state.agents[1].group, Group::C);
    }

    #[test]
    fn test_match_phase_outcome() {
        assert_eq!(MatchPhase::default(), MatchPhase::Playing);
        assert!(MatchPhase::Playing.outcome().is_none());
        let decided = MatchPhase::Decided {
            outcome: Outcome::Winner(Group::C),
            decided_at_ms: 10,
        };
        assert_eq!(decided.outcome(), Some(Outcome::Winner(Group::C)));
        assert!(!decided.is_playing());
    }
}
