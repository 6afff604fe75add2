use crate::card::{CardInstance, Side};
use serde::{Deserialize, Serialize};

/// Final result of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    Player,
    Opponent,
    Draw,
}

impl From<Side> for Winner {
    fn from(side: Side) -> Self {
        match side {
            Side::Player => Winner::Player,
            Side::Opponent => Winner::Opponent,
        }
    }
}

/// Both sides' totals for the round as currently on the board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTotals {
    pub player: i32,
    pub opponent: i32,
}

impl RoundTotals {
    /// The side with the strictly higher total
    pub fn leader(&self) -> Option<Side> {
        match self.player.cmp(&self.opponent) {
            std::cmp::Ordering::Greater => Some(Side::Player),
            std::cmp::Ordering::Less => Some(Side::Opponent),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Sum each side's current attack, minus what the other side debuffs it by, floored at zero.
pub fn recompute_totals(
    player_battle: &[CardInstance],
    opponent_battle: &[CardInstance],
    player_debuff_to_opponent: i32,
    opponent_debuff_to_player: i32,
) -> RoundTotals {
    let sum = |cards: &[CardInstance]| cards.iter().map(|c| c.current_attack()).sum::<i32>();
    RoundTotals {
        player: (sum(player_battle) - opponent_debuff_to_player).max(0),
        opponent: (sum(opponent_battle) - player_debuff_to_opponent).max(0),
    }
}

/// What a round did to the tower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub totals: RoundTotals,
    pub round_winner: Option<Side>,
    pub tower_before: i32,
    pub tower_after: i32,
}

/// Tug-of-war score. Positive positions lean toward the opponent, negative toward the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreState {
    pub totals: RoundTotals,
    tower: i32,
    bound: i32,
    winner: Option<Winner>,
    rounds_won: [u32; 2],
}

impl ScoreState {
    pub fn new(bound: i32) -> Self {
        ScoreState {
            totals: RoundTotals::default(),
            tower: 0,
            bound: bound.max(1),
            winner: None,
            rounds_won: [0, 0],
        }
    }

    /// Start from an arbitrary tower position (clamped to the bound)
    pub fn with_tower(bound: i32, tower: i32) -> Self {
        let mut state = Self::new(bound);
        state.tower = tower.clamp(-state.bound, state.bound);
        state
    }

    pub fn tower(&self) -> i32 {
        self.tower
    }

    pub fn bound(&self) -> i32 {
        self.bound
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn rounds_won(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.rounds_won[0],
            Side::Opponent => self.rounds_won[1],
        }
    }

    /// Tower direction that favors a side
    pub fn direction(side: Side) -> i32 {
        match side {
            Side::Player => -1,
            Side::Opponent => 1,
        }
    }

    /// Move the tower one unit. A step that would land on 0 goes one unit further;
    /// the result is clamped to the bound.
    pub fn step_tower(&mut self, direction: i32) {
        let mut next = self.tower + direction.signum();
        if next == 0 && direction != 0 {
            next += direction.signum();
        }
        self.tower = next.clamp(-self.bound, self.bound);
    }

    /// Settle the round from the final totals. The only mutator of the tower.
    pub fn apply_round_outcome(&mut self, totals: RoundTotals) -> RoundOutcome {
        self.totals = totals;
        let tower_before = self.tower;
        let round_winner = totals.leader();
        if let Some(side) = round_winner {
            self.step_tower(Self::direction(side));
            match side {
                Side::Player => self.rounds_won[0] += 1,
                Side::Opponent => self.rounds_won[1] += 1,
            }
        }
        RoundOutcome {
            totals,
            round_winner,
            tower_before,
            tower_after: self.tower,
        }
    }

    /// Tower at either bound ends the game immediately
    pub fn check_instant_win(&mut self) -> Option<Winner> {
        if self.winner.is_some() {
            return self.winner;
        }
        if self.tower >= self.bound {
            self.winner = Some(Winner::Opponent);
        } else if self.tower <= -self.bound {
            self.winner = Some(Winner::Player);
        }
        self.winner
    }

    /// Decide the game on tower position once the round cap is passed
    pub fn resolve_by_position(&mut self) -> Winner {
        let winner = match self.tower.cmp(&0) {
            std::cmp::Ordering::Greater => Winner::Opponent,
            std::cmp::Ordering::Less => Winner::Player,
            std::cmp::Ordering::Equal => Winner::Draw,
        };
        self.winner = Some(winner);
        winner
    }
}
