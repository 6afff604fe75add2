use crate::card::{CardCatalog, CardDefinition};
use crate::config::GameConfig;
use crate::game::Winner;
use crate::simulation::engine::{run_game, GameResult, SimulationError};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Aggregate statistics over a batch of games
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub generated_at: String,
    pub base_seed: u64,
    pub games: usize,
    pub player_wins: usize,
    pub opponent_wins: usize,
    pub draws: usize,
    pub instant_wins: usize,
    /// Games that ended in a `SimulationError`
    pub failed: usize,
    pub player_win_rate: f64,
    pub average_rounds: f64,
    pub round_distribution: BTreeMap<u32, usize>,
}

impl BatchSummary {
    pub fn from_results(
        base_seed: u64,
        results: &[Result<GameResult, SimulationError>],
    ) -> Self {
        let finished: Vec<&GameResult> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let count = |winner: Winner| finished.iter().filter(|r| r.winner == winner).count();

        let mut round_distribution = BTreeMap::new();
        for result in &finished {
            *round_distribution.entry(result.rounds_played).or_insert(0) += 1;
        }

        let average_rounds = if finished.is_empty() {
            0.0
        } else {
            finished.iter().map(|r| r.rounds_played as f64).sum::<f64>() / finished.len() as f64
        };
        let player_wins = count(Winner::Player);

        BatchSummary {
            generated_at: chrono::Local::now().to_rfc3339(),
            base_seed,
            games: results.len(),
            player_wins,
            opponent_wins: count(Winner::Opponent),
            draws: count(Winner::Draw),
            instant_wins: finished.iter().filter(|r| r.instant_win).count(),
            failed: results.len() - finished.len(),
            player_win_rate: if results.is_empty() {
                0.0
            } else {
                player_wins as f64 / results.len() as f64
            },
            average_rounds,
            round_distribution,
        }
    }
}

/// Run `num_games` games in parallel with seeds `base_seed..base_seed + num_games`
pub fn simulate_batch(
    player_deck: &[Arc<CardDefinition>],
    opponent_deck: &[Arc<CardDefinition>],
    catalog: &CardCatalog,
    config: &GameConfig,
    num_games: usize,
    base_seed: u64,
    show_progress: bool,
) -> (Vec<Result<GameResult, SimulationError>>, BatchSummary) {
    let progress = if show_progress {
        let bar = ProgressBar::new(num_games as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg} [{elapsed}] {wide_bar:.cyan/blue} {pos:>7}/{len:7} {eta}")
        {
            bar.set_style(style);
        }
        bar.set_message("simulating");
        Some(bar)
    } else {
        None
    };

    let results: Vec<_> = (0..num_games)
        .into_par_iter()
        .map(|i| {
            let result = run_game(
                player_deck,
                opponent_deck,
                catalog,
                config,
                base_seed.wrapping_add(i as u64),
                false,
            );
            if let Some(bar) = &progress {
                bar.inc(1);
            }
            result
        })
        .collect();

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    let summary = BatchSummary::from_results(base_seed, &results);
    (results, summary)
}
