//! Win detection and match results
//!
//! A game is decided when one group holds every agent, or when no agents are
//! left at all (a draw).

use serde::{Deserialize, Serialize};

use crate::game::population::PopulationCounts;
use crate::game::state::{GameState, Group, MatchPhase, Outcome};

/// Outcome implied by the counts, if the game is over
pub fn evaluate(counts: &PopulationCounts) -> Option<Outcome> {
    if counts.total() == 0 {
        return Some(Outcome::Draw);
    }
    counts.sole_group().map(Outcome::Winner)
}

/// Check if a game in progress should end
pub fn check_match_end(state: &GameState) -> Option<Outcome> {
    if state.phase != MatchPhase::Playing {
        return None;
    }
    evaluate(&PopulationCounts::from_agents(&state.agents))
}

/// Running totals for the game in progress
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub started_at_ms: u64,
    pub initial_population: PopulationCounts,
    pub captures: u64,
    pub bonuses_collected: u64,
    pub agents_spawned: u64,
}

/// One group's place in a finished game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStanding {
    pub group: Group,
    pub rank: u32,
    pub final_count: usize,
    /// Final minus initial count
    pub net_change: i64,
}

/// Summary of a decided game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub game_number: u64,
    pub outcome: Outcome,
    pub ticks: u64,
    pub duration_ms: u64,
    pub initial_population: PopulationCounts,
    pub final_population: PopulationCounts,
    pub standings: Vec<GroupStanding>,
    pub captures: u64,
    pub bonuses_collected: u64,
    pub agents_spawned: u64,
}

/// Build the result for a game decided at `decided_at_ms`
pub fn determine_result(
    state: &GameState,
    game_number: u64,
    outcome: Outcome,
    stats: &GameStats,
    decided_at_ms: u64,
) -> MatchResult {
    let final_population = PopulationCounts::from_agents(&state.agents);

    let mut standings: Vec<GroupStanding> = Group::ALL
        .into_iter()
        .map(|group| GroupStanding {
            group,
            rank: 0,
            final_count: final_population.get(group),
            net_change: final_population.get(group) as i64 - stats.initial_population.get(group) as i64,
        })
        .collect();

    // Most agents first; ties keep A, B, C order
    standings.sort_by(|a, b| b.final_count.cmp(&a.final_count));
    for (i, standing) in standings.iter_mut().enumerate() {
        standing.rank = (i + 1) as u32;
    }

    MatchResult {
        game_number,
        outcome,
        ticks: state.tick,
        duration_ms: decided_at_ms.saturating_sub(stats.started_at_ms),
        initial_population: stats.initial_population,
        final_population,
        standings,
        captures: stats.captures,
        bonuses_collected: stats.bonuses_collected,
        agents_spawned: stats.agents_spawned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::game::state::Agent;
    use crate::util::vec2::Vec2;

    fn state_with(groups: &[Group]) -> GameState {
        let mut state = GameState::new(&SimConfig::default());
        for &group in groups {
            state.add_agent(Agent::new(Vec2::new(100.0, 100.0), group, 0.1, 0.5, 0.3, 0.0));
        }
        state
    }

    #[test]
    fn test_evaluate_winner() {
        assert_eq!(
            evaluate(&PopulationCounts::from_counts(100, 0, 0)),
            Some(Outcome::Winner(Group::A))
        );
        assert_eq!(
            evaluate(&PopulationCounts::from_counts(0, 3, 0)),
            Some(Outcome::Winner(Group::B))
        );
    }

    #[test]
    fn test_evaluate_draw() {
        assert_eq!(evaluate(&PopulationCounts::from_counts(0, 0, 0)), Some(Outcome::Draw));
    }

    #[test]
    fn test_evaluate_undecided() {
        assert_eq!(evaluate(&PopulationCounts::from_counts(1, 0, 1)), None);
        assert_eq!(evaluate(&PopulationCounts::from_counts(5, 5, 5)), None);
    }

    #[test]
    fn test_check_match_end_not_playing() {
        let mut state = state_with(&[Group::C, Group::C]);
        assert_eq!(check_match_end(&state), Some(Outcome::Winner(Group::C)));

        state.phase = MatchPhase::Decided {
            outcome: Outcome::Winner(Group::C),
            decided_at_ms: 0,
        };
        assert!(check_match_end(&state).is_none());
    }

    #[test]
    fn test_determine_result() {
        let mut state = state_with(&[Group::B, Group::B, Group::B, Group::C]);
        state.tick = 900;
        let stats = GameStats {
            started_at_ms: 1000,
            initial_population: PopulationCounts::from_counts(2, 1, 1),
            captures: 3,
            bonuses_collected: 0,
            agents_spawned: 0,
        };

        let result = determine_result(&state, 4, Outcome::Winner(Group::B), &stats, 16_000);

        assert_eq!(result.game_number, 4);
        assert_eq!(result.ticks, 900);
        assert_eq!(result.duration_ms, 15_000);
        assert_eq!(result.final_population, PopulationCounts::from_counts(0, 3, 1));
        assert_eq!(result.standings[0].group, Group::B);
        assert_eq!(result.standings[0].rank, 1);
        assert_eq!(result.standings[0].net_change, 2);
        assert_eq!(result.standings[2].group, Group::A);
        assert_eq!(result.standings[2].net_change, -2);
    }
}
