pub mod autopilot;
pub mod batch;
pub mod deck;
pub mod engine;

pub use autopilot::Autopilot;
pub use batch::{simulate_batch, BatchSummary};
pub use deck::{parse_deck_file, DeckError};
pub use engine::{run_game, run_game_with, GameResult, SimulationError};
