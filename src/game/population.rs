//! Per-group population counts, derived from the live agent set.

use serde::{Deserialize, Serialize};

use crate::game::state::{Agent, Group};

/// Count of agents per group. Pure snapshot; recompute after any capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounts {
    counts: [usize; 3],
}

impl PopulationCounts {
    pub fn from_agents(agents: &[Agent]) -> Self {
        let mut counts = [0usize; 3];
        for agent in agents {
            counts[agent.group.index()] += 1;
        }
        Self { counts }
    }

    pub fn from_counts(a: usize, b: usize, c: usize) -> Self {
        Self { counts: [a, b, c] }
    }

    #[inline]
    pub fn get(&self, group: Group) -> usize {
        self.counts[group.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Share of the population in `group`, or `None` for an empty population
    pub fn ratio(&self, group: Group) -> Option<f32> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Some(self.get(group) as f32 / total as f32)
    }

    /// Smallest group count
    pub fn min(&self) -> usize {
        self.counts.iter().copied().min().unwrap_or(0)
    }

    /// The group holding every agent, if any (an empty population has none)
    pub fn sole_group(&self) -> Option<Group> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Group::ALL.into_iter().find(|&g| self.get(g) == total)
    }

    pub fn as_array(&self) -> [usize; 3] {
        self.counts
    }
}
