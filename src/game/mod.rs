pub mod constants;
pub mod state;
pub mod clock;
pub mod population;
pub mod spawn;
pub mod systems;
pub mod game_loop;
pub mod match_result;
pub mod snapshot;
pub mod performance;
