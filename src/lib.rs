//! RPS Royale simulation library
//!
//! Three cyclic groups (A eats B, B eats C, C eats A) chase, flee and convert
//! each other inside a shrinking arena until one group holds every agent.
//!
//! The core is single-threaded and deterministic for a given RNG and clock:
//! [`game::game_loop::Simulation`] takes both as injected parameters.

pub mod config;
pub mod util;
pub mod game;
pub mod metrics;
