//! Fixed-timestep simulation driver
//!
//! Owns the game state, the injected clock and RNG, and runs every system in
//! order once per tick. The host decides the pacing.

use rand::Rng;
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, SimConfig};
use crate::game::clock::Clock;
use crate::game::match_result::{check_match_end, determine_result, GameStats, MatchResult};
use crate::game::population::PopulationCounts;
use crate::game::snapshot::SimSnapshot;
use crate::game::spawn::{initial_population, SpeedProfile};
use crate::game::state::{GameState, MatchPhase, Outcome};
use crate::game::systems::arena::ThresholdCrossing;
use crate::game::systems::bonus::BonusCollection;
use crate::game::systems::collision::CaptureEvent;
use crate::game::systems::{arena, bonus, collision, movement, targeting};
use crate::util::vec2::Vec2;

/// Phase change that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTransition {
    /// A winner (or a draw) was found this tick
    Decided(Outcome),
    /// The restart delay elapsed; the next tick reinitializes
    Resetting,
    /// A fresh game started
    Restarted { game_number: u64 },
}

/// What happened during one tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub tick: u64,
    pub captures: Vec<CaptureEvent>,
    pub collections: Vec<BonusCollection>,
    pub thresholds: SmallVec<[ThresholdCrossing; 4]>,
    pub disks_spawned: usize,
    pub transition: Option<PhaseTransition>,
}

/// The simulation: one game at a time, restarted forever
pub struct Simulation<C: Clock, R: Rng> {
    config: SimConfig,
    profile: SpeedProfile,
    state: GameState,
    clock: C,
    rng: R,
    game_number: u64,
    stats: GameStats,
    last_result: Option<MatchResult>,
}

impl<C: Clock, R: Rng> Simulation<C, R> {
    /// Validate `config` and start the first game
    pub fn new(config: SimConfig, clock: C, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let profile = SpeedProfile::new(&config)?;
        let state = GameState::new(&config);

        let mut sim = Self {
            config,
            profile,
            state,
            clock,
            rng,
            game_number: 0,
            stats: GameStats::default(),
            last_result: None,
        };
        sim.start_game();
        Ok(sim)
    }

    /// Empty simulation (no agents) for callers that place agents by hand.
    /// Still counts as game 1.
    pub fn empty(config: SimConfig, clock: C, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let profile = SpeedProfile::new(&config)?;
        let state = GameState::new(&config);
        let started_at_ms = clock.now_ms();

        Ok(Self {
            config,
            profile,
            state,
            clock,
            rng,
            game_number: 1,
            stats: GameStats {
                started_at_ms,
                ..GameStats::default()
            },
            last_result: None,
        })
    }

    fn start_game(&mut self) {
        self.game_number += 1;
        self.state = GameState::new(&self.config);
        let agents = initial_population(&self.config, &self.profile, &mut self.rng);
        self.state.commit_spawns(agents);

        let initial_population = PopulationCounts::from_agents(&self.state.agents);
        self.stats = GameStats {
            started_at_ms: self.clock.now_ms(),
            initial_population,
            ..GameStats::default()
        };

        info!(
            game = self.game_number,
            agents = self.state.agent_count(),
            radius = self.state.arena.radius,
            "Game started"
        );
    }

    /// Discard the current game and start a new one
    pub fn reset(&mut self) {
        self.start_game();
    }

    /// Advance one tick
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now_ms();

        match self.state.phase {
            MatchPhase::Resetting { .. } => {
                self.reset();
                return TickReport {
                    tick: self.state.tick,
                    transition: Some(PhaseTransition::Restarted {
                        game_number: self.game_number,
                    }),
                    ..TickReport::default()
                };
            }
            MatchPhase::Decided { outcome, decided_at_ms }
                if now.saturating_sub(decided_at_ms) >= self.config.restart_delay_ms =>
            {
                self.state.phase = MatchPhase::Resetting { outcome };
                self.state.tick += 1;
                info!(game = self.game_number, "Restart delay elapsed, resetting");
                return TickReport {
                    tick: self.state.tick,
                    transition: Some(PhaseTransition::Resetting),
                    ..TickReport::default()
                };
            }
            _ => {}
        }

        self.state.tick += 1;
        let mut report = TickReport {
            tick: self.state.tick,
            ..TickReport::default()
        };

        // Arena (keeps shrinking after the game is decided)
        report.thresholds = arena::shrink(&mut self.state.arena);
        for crossing in &report.thresholds {
            let ids = bonus::spawn_batch(&mut self.state, crossing.disk_count, &self.config, &mut self.rng);
            report.disks_spawned += ids.len();
        }

        if !self.state.phase.is_playing() {
            return report;
        }

        let counts = PopulationCounts::from_agents(&self.state.agents);

        targeting::update(&mut self.state, &self.config, &mut self.rng);
        bonus::expire(&mut self.state.agents, now, self.config.bonus.duration_ms);
        movement::update(&mut self.state, &counts, &self.config, &mut self.rng);
        arena::push_inside(&mut self.state.agents, &self.state.arena, self.config.outside_force);

        report.captures = collision::resolve(&mut self.state.agents, self.config.eating_distance);
        if !report.captures.is_empty() {
            self.state.last_capture_ms = now;
            self.stats.captures += report.captures.len() as u64;
            debug!(tick = self.state.tick, captures = report.captures.len(), "Captures resolved");
        }

        let pass = bonus::collect(&mut self.state, &self.config, &self.profile, now, &mut self.rng);
        self.stats.bonuses_collected += pass.collections.len() as u64;
        self.stats.agents_spawned += pass.spawned.len() as u64;
        self.state.commit_spawns(pass.spawned);
        report.collections = pass.collections;

        sanitize_agents(&mut self.state);

        if let Some(outcome) = check_match_end(&self.state) {
            self.state.phase = MatchPhase::Decided {
                outcome,
                decided_at_ms: now,
            };
            let result = determine_result(&self.state, self.game_number, outcome, &self.stats, now);
            info!(
                game = self.game_number,
                outcome = ?outcome,
                ticks = result.ticks,
                captures = result.captures,
                "Game decided"
            );
            self.last_result = Some(result);
            report.transition = Some(PhaseTransition::Decided(outcome));
        }

        report
    }

    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot::capture(
            &self.state,
            self.game_number,
            self.clock.now_ms(),
            self.config.restart_delay_ms,
        )
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn game_number(&self) -> u64 {
        self.game_number
    }

    pub fn population(&self) -> PopulationCounts {
        PopulationCounts::from_agents(&self.state.agents)
    }

    /// Totals for the game in progress
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Result of the most recently decided game
    pub fn last_result(&self) -> Option<&MatchResult> {
        self.last_result.as_ref()
    }
}

/// Replace non-finite positions and momenta so one bad value cannot spread
fn sanitize_agents(state: &mut GameState) {
    let center = state.arena.center;
    for (index, agent) in state.agents.iter_mut().enumerate() {
        if !agent.position.x.is_finite() || !agent.position.y.is_finite() {
            warn!(agent = index, "Fixed non-finite position");
            agent.position = center;
        }
        if !agent.momentum.x.is_finite() || !agent.momentum.y.is_finite() {
            warn!(agent = index, "Fixed non-finite momentum");
            agent.momentum = Vec2::ZERO;
        }
    }
}
