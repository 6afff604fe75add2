use crate::game::state::TurnOrder;
use crate::rng::GameRng;

/// Faces on the turn-order die
pub const DIE_SIDES: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDecision {
    Decided(TurnOrder),
    /// The human won the roll and picks who starts
    PlayerChooses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderResolution {
    pub decision: OrderDecision,
    /// (player, opponent) faces, when the dice were rolled
    pub roll: Option<(u32, u32)>,
}

/// The side with more locked cards goes first. Equal counts go to a coin flip, or, with the
/// dice mini-game on, to a roll: the human choosing on a clear win, the opponent starting on a
/// clear loss, and a coin flip on matching faces.
pub fn determine_turn_order(
    player_locked: usize,
    opponent_locked: usize,
    dice_roll: bool,
    rng: &mut GameRng,
) -> OrderResolution {
    if player_locked != opponent_locked {
        let order = if player_locked > opponent_locked {
            TurnOrder::PlayerFirst
        } else {
            TurnOrder::OpponentFirst
        };
        return OrderResolution {
            decision: OrderDecision::Decided(order),
            roll: None,
        };
    }

    if !dice_roll {
        return OrderResolution {
            decision: OrderDecision::Decided(coin_order(rng)),
            roll: None,
        };
    }

    let player = rng.roll_die(DIE_SIDES);
    let opponent = rng.roll_die(DIE_SIDES);
    let decision = match player.cmp(&opponent) {
        std::cmp::Ordering::Greater => OrderDecision::PlayerChooses,
        std::cmp::Ordering::Less => OrderDecision::Decided(TurnOrder::OpponentFirst),
        std::cmp::Ordering::Equal => OrderDecision::Decided(coin_order(rng)),
    };
    OrderResolution {
        decision,
        roll: Some((player, opponent)),
    }
}

fn coin_order(rng: &mut GameRng) -> TurnOrder {
    if rng.coin_flip() {
        TurnOrder::PlayerFirst
    } else {
        TurnOrder::OpponentFirst
    }
}
