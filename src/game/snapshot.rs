//! Read-only per-tick view of the simulation for renderers and dumps.

use serde::{Deserialize, Serialize};

use crate::game::population::PopulationCounts;
use crate::game::state::{AgentBehavior, DiskId, GameState, Group, MatchPhase, Outcome, Shape};
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub position: Vec2,
    pub group: Group,
    pub shape: Shape,
    pub momentum: Vec2,
    /// Orientation for drawing (radians)
    pub facing: f32,
    pub speed: f32,
    pub behavior: AgentBehavior,
    pub bonus_multiplier: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaView {
    pub center: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiskView {
    pub id: DiskId,
    pub position: Vec2,
    pub radius: f32,
}

/// One row of the status table: a group, what it looks like, what it eats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStatus {
    pub group: Group,
    pub shape: Shape,
    pub prey: Group,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseKind {
    Playing,
    Decided,
    Resetting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseView {
    pub kind: PhaseKind,
    pub outcome: Option<Outcome>,
    /// Milliseconds until the reset starts (0 unless decided)
    pub remaining_ms: u64,
    /// Whole seconds shown in the countdown
    pub countdown_secs: u64,
}

impl PhaseView {
    pub fn new(phase: &MatchPhase, now_ms: u64, restart_delay_ms: u64) -> Self {
        match *phase {
            MatchPhase::Playing => Self {
                kind: PhaseKind::Playing,
                outcome: None,
                remaining_ms: 0,
                countdown_secs: 0,
            },
            MatchPhase::Decided { outcome, decided_at_ms } => {
                let elapsed = now_ms.saturating_sub(decided_at_ms);
                let remaining_ms = restart_delay_ms.saturating_sub(elapsed);
                Self {
                    kind: PhaseKind::Decided,
                    outcome: Some(outcome),
                    remaining_ms,
                    countdown_secs: remaining_ms / 1000,
                }
            }
            MatchPhase::Resetting { outcome } => Self {
                kind: PhaseKind::Resetting,
                outcome: Some(outcome),
                remaining_ms: 0,
                countdown_secs: 0,
            },
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub tick: u64,
    pub game_number: u64,
    pub agents: Vec<AgentView>,
    pub arena: ArenaView,
    pub disks: Vec<DiskView>,
    pub population: PopulationCounts,
    pub status: Vec<GroupStatus>,
    pub phase: PhaseView,
}

impl SimSnapshot {
    pub fn capture(state: &GameState, game_number: u64, now_ms: u64, restart_delay_ms: u64) -> Self {
        let population = PopulationCounts::from_agents(&state.agents);

        let agents = state
            .agents
            .iter()
            .map(|a| AgentView {
                position: a.position,
                group: a.group,
                shape: a.group.shape(),
                momentum: a.momentum,
                facing: a.facing,
                speed: a.speed,
                behavior: a.behavior,
                bonus_multiplier: a.bonus.multiplier,
            })
            .collect();

        let disks = state
            .disks
            .iter()
            .map(|d| DiskView {
                id: d.id,
                position: d.position,
                radius: d.radius,
            })
            .collect();

        let status = Group::ALL
            .into_iter()
            .map(|group| GroupStatus {
                group,
                shape: group.shape(),
                prey: group.prey(),
                count: population.get(group),
            })
            .collect();

        Self {
            tick: state.tick,
            game_number,
            agents,
            arena: ArenaView {
                center: state.arena.center,
                radius: state.arena.radius,
            },
            disks,
            population,
            status,
            phase: PhaseView::new(&state.phase, now_ms, restart_delay_ms),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
