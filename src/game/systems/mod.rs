pub mod targeting;
pub mod strategy;
pub mod movement;
pub mod collision;
pub mod arena;
pub mod bonus;
