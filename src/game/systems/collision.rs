//! Capture resolution
//!
//! Contact between a predator and its prey relabels the prey into the
//! predator's group. Nobody is removed.

use crate::game::state::{Agent, AgentId, Group};

/// One conversion produced by [`resolve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureEvent {
    pub captor: AgentId,
    pub captured: AgentId,
    /// Group of the captured agent before conversion
    pub from: Group,
    /// Group it was converted into
    pub to: Group,
}

/// Check every unordered pair `(i, j)` with `i < j` in index order and convert
/// the prey of any pair closer than `eating_distance`.
///
/// A conversion is visible to the pairs checked after it, so one agent may be
/// converted and then convert others within the same pass.
pub fn resolve(agents: &mut [Agent], eating_distance: f32) -> Vec<CaptureEvent> {
    let mut events = Vec::new();
    let eat_sq = eating_distance * eating_distance;

    for i in 0..agents.len() {
        for j in (i + 1)..agents.len() {
            if agents[i].position.distance_sq_to(agents[j].position) >= eat_sq {
                continue;
            }

            let (gi, gj) = (agents[i].group, agents[j].group);
            let (captor, captured, from, to) = if gi.can_eat(gj) {
                (i, j, gj, gi)
            } else if gj.can_eat(gi) {
                (j, i, gi, gj)
            } else {
                continue;
            };

            agents[captured].group = to;
            agents[captured].target = None;
            agents[captured].fleeing = false;
            events.push(CaptureEvent {
                captor,
                captured,
                from,
                to,
            });
        }
    }

    if !events.is_empty() {
        tracing::trace!(captures = events.len(), "collision pass");
    }

    events
}
