//! Arena management system
//!
//! Shrinks the play circle, pushes stragglers back inside and reports the
//! radius thresholds that release bonus disks.

use rand::Rng;
use smallvec::SmallVec;

use crate::game::state::{Agent, Arena};
use crate::util::vec2::Vec2;

/// A radius threshold crossed this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdCrossing {
    pub ratio: f32,
    pub disk_count: usize,
}

/// Shrink the arena by one tick and return the thresholds newly crossed,
/// in descending ratio order.
pub fn shrink(arena: &mut Arena) -> SmallVec<[ThresholdCrossing; 4]> {
    arena.shrink_ticks = arena.shrink_ticks.saturating_add(1);
    arena.radius = (arena.initial_radius - arena.shrink_rate * arena.shrink_ticks as f32).max(0.0);

    let ratio = arena.ratio();
    let mut crossed: SmallVec<[ThresholdCrossing; 4]> = SmallVec::new();
    for threshold in arena.thresholds.iter_mut() {
        if !threshold.fired && ratio <= threshold.ratio {
            threshold.fired = true;
            crossed.push(ThresholdCrossing {
                ratio: threshold.ratio,
                disk_count: threshold.disk_count,
            });
        }
    }

    for crossing in &crossed {
        tracing::debug!(
            ratio = crossing.ratio,
            radius = arena.radius,
            disks = crossing.disk_count,
            "Arena threshold crossed"
        );
    }

    crossed
}

/// Nudge agents outside the circle toward the centre by `force`.
/// Returns how many were pushed.
pub fn push_inside(agents: &mut [Agent], arena: &Arena, force: f32) -> usize {
    let mut pushed = 0;
    for agent in agents.iter_mut() {
        let to_center = arena.center - agent.position;
        let (direction, distance) = to_center.normalize_with_length();
        if distance > arena.radius && distance > 0.0 {
            agent.position += direction * force;
            pushed += 1;
        }
    }
    pushed
}

/// Uniformly distributed point (by area) inside a circle
pub fn random_point_in_circle<R: Rng + ?Sized>(center: Vec2, radius: f32, rng: &mut R) -> Vec2 {
    if radius <= 0.0 {
        return center;
    }
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let r = radius * rng.gen::<f32>().sqrt();
    center + Vec2::from_angle(angle) * r
}
