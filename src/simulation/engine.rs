use crate::card::{CardCatalog, CardDefinition, Side};
use crate::config::{ConfigError, GameConfig};
use crate::game::{ActionError, Awaiting, GameSession, OpponentStrategy, Winner};
use crate::rng::GameRng;
use crate::simulation::autopilot::Autopilot;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Action rejected: {0}")]
    Action(#[from] ActionError),
    #[error("Session awaited a player card in round {round} but none is locked")]
    NothingToPlay { round: u32 },
}

/// Summary of one finished game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub seed: u64,
    pub winner: Winner,
    pub rounds_played: u32,
    pub final_tower: i32,
    /// Ended by reaching a tower bound rather than the round cap
    pub instant_win: bool,
    pub player_rounds_won: u32,
    pub opponent_rounds_won: u32,
}

/// Play one whole game with the autopilot on the human side, fast-forwarding the clock
pub fn run_game(
    player_deck: &[Arc<CardDefinition>],
    opponent_deck: &[Arc<CardDefinition>],
    catalog: &CardCatalog,
    config: &GameConfig,
    seed: u64,
    verbose: bool,
) -> Result<GameResult, SimulationError> {
    run_game_with(
        player_deck,
        opponent_deck,
        catalog,
        config,
        OpponentStrategy::new(),
        seed,
        verbose,
    )
}

/// `run_game` with an explicit opponent strategy
pub fn run_game_with(
    player_deck: &[Arc<CardDefinition>],
    opponent_deck: &[Arc<CardDefinition>],
    catalog: &CardCatalog,
    config: &GameConfig,
    strategy: OpponentStrategy,
    seed: u64,
    verbose: bool,
) -> Result<GameResult, SimulationError> {
    let mut session = GameSession::new(
        config.clone(),
        catalog.registry().clone(),
        player_deck,
        opponent_deck,
        GameRng::new(Some(seed)),
    )?
    .with_strategy(strategy);
    let autopilot = Autopilot::new();

    if verbose {
        println!("=== Game Start (seed: {}) ===", seed);
        println!(
            "Player pool: {} cards, Bakunawa pool: {} cards",
            player_deck.len(),
            opponent_deck.len()
        );
    }

    loop {
        match session.awaiting() {
            Awaiting::Selection => {
                let picks = autopilot.select(
                    session.board(Side::Player).hand.cards(),
                    session.energy_budget(),
                );
                session.choose_offering(autopilot.choose_offering(picks.len()))?;
                for id in picks {
                    session.toggle_selection(id, true)?;
                }
                session.lock_in()?;
            }
            Awaiting::OrderChoice => session.choose_turn_order(autopilot.choose_turn_order())?,
            Awaiting::PlayerCard => {
                let card = autopilot
                    .next_card(&session.board(Side::Player).locked)
                    .ok_or(SimulationError::NothingToPlay {
                        round: session.round(),
                    })?;
                session.play_card(card)?;
            }
            Awaiting::Clock(remaining) => session.tick(remaining),
            Awaiting::Nothing => break,
        }

        let events = session.drain_events();
        if verbose {
            for event in events {
                println!("{}", event);
            }
        }
    }

    let winner = session.winner().unwrap_or(Winner::Draw);
    let score = session.score();
    Ok(GameResult {
        seed,
        winner,
        rounds_played: session.history().len() as u32,
        final_tower: score.tower(),
        instant_win: score.tower().abs() >= score.bound(),
        player_rounds_won: score.rounds_won(Side::Player),
        opponent_rounds_won: score.rounds_won(Side::Opponent),
    })
}
