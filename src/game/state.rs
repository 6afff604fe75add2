use crate::card::{CardInstanceId, Offering};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Round phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Planning,
    LockIn,
    TurnOrderResolution,
    Battle,
    RoundResolution,
    Cleanup,
    GameOver,
}

impl Phase {
    /// The phase that normally follows; GameOver is terminal
    pub fn next(&self) -> Phase {
        match self {
            Phase::Planning => Phase::LockIn,
            Phase::LockIn => Phase::TurnOrderResolution,
            Phase::TurnOrderResolution => Phase::Battle,
            Phase::Battle => Phase::RoundResolution,
            Phase::RoundResolution => Phase::Cleanup,
            Phase::Cleanup => Phase::Planning,
            Phase::GameOver => Phase::GameOver,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnOrder {
    PlayerFirst,
    OpponentFirst,
}

/// Deferred work the session runs once its wait elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    /// Opponent answers the player's card
    OpponentRespond,
    /// Opponent plays an uncontested card
    OpponentSolo,
    /// Decide whose turn is next
    Advance,
    ResolveRound,
    Cleanup,
}

/// Sub-step inside a phase: either waiting on the clock or on the human
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Planning: waiting for toggles and lock-in
    AwaitSelection,
    /// Turn order: the human won the roll and picks
    AwaitOrderChoice,
    /// Battle: waiting for the human's card
    AwaitPlayerCard,
    Wait {
        remaining: Duration,
        then: StepAction,
    },
    Finished,
}

/// Per-round bookkeeping owned by the session
#[derive(Debug, Clone)]
pub struct RoundState {
    pub round: u32,
    pub max_rounds: u32,
    pub phase: Phase,
    pub step: Step,
    pub energy_budget: u32,
    pub turn_order: Option<TurnOrder>,
    pub pending_opponent_card: Option<CardInstanceId>,
    /// Player's toggled cards, in toggle order
    pub selected: Vec<CardInstanceId>,
    pub player_offering: Offering,
    pub opponent_offering: Offering,
    pub planning_timer: Option<Duration>,
    /// Cards that go back to hand at cleanup because their side lost
    pub retrieve_on_loss: Vec<CardInstanceId>,
}

impl RoundState {
    pub fn new(energy_budget: u32, max_rounds: u32) -> Self {
        RoundState {
            round: 1,
            max_rounds,
            phase: Phase::Planning,
            step: Step::AwaitSelection,
            energy_budget,
            turn_order: None,
            pending_opponent_card: None,
            selected: Vec::new(),
            player_offering: Offering::Blessing,
            opponent_offering: Offering::Blessing,
            planning_timer: None,
            retrieve_on_loss: Vec::new(),
        }
    }

    /// Clear everything that only lives for one round
    pub fn reset_for_round(&mut self) {
        self.turn_order = None;
        self.pending_opponent_card = None;
        self.selected.clear();
        self.player_offering = Offering::Blessing;
        self.opponent_offering = Offering::Blessing;
        self.retrieve_on_loss.clear();
        self.step = Step::AwaitSelection;
    }

    pub fn past_cap(&self) -> bool {
        self.round > self.max_rounds
    }
}
