//! The round/turn state machine.
//!
//! A `GameSession` owns both sides' piles, the round and score state, the effect
//! engine and the opponent strategy. It moves only in response to a human action
//! (`toggle_selection`, `lock_in`, `choose_turn_order`, `play_card`, ...) or to
//! `tick`, which feeds it elapsed time so timed sub-steps can run. Nothing else
//! mutates its state.

use crate::card::{
    AttackTrend, CardDefinition, CardInstance, CardInstanceId, CardType, EffectRegistry,
    EffectSignal, Location, Offering, Side,
};
use crate::config::{ConfigError, GameConfig};
use crate::game::opponent::OpponentStrategy;
use crate::game::resolution::{EffectEngine, ResolutionContext, SignalEvent};
use crate::game::score::{recompute_totals, RoundOutcome, RoundTotals, ScoreState, Winner};
use crate::game::state::{Phase, RoundState, Step, StepAction, TurnOrder};
use crate::game::turns::{determine_turn_order, OrderDecision};
use crate::game::zones::{InvariantViolation, SideBoard};
use crate::rng::GameRng;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// A human action the session refused. State is untouched when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("cannot {action} during {phase}")]
    WrongPhase { action: &'static str, phase: Phase },
    #[error("cannot {action} right now")]
    NotAwaiting { action: &'static str },
    #[error("select at least one card before locking in")]
    EmptySelection,
    #[error("selected cards cost {spent} energy but the budget is {budget}")]
    OverBudget { spent: u32, budget: u32 },
    #[error("card {0} is not available for that")]
    UnknownCard(CardInstanceId),
}

/// Notifications for the presentation layer, drained with `drain_events`
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PhaseChanged {
        round: u32,
        phase: Phase,
    },
    ActionRejected {
        reason: String,
    },
    SelectionChanged {
        energy_spent: u32,
        budget: u32,
    },
    LockedIn {
        side: Side,
        cards: Vec<CardInstanceId>,
        energy: u32,
    },
    TurnOrderDecided {
        order: TurnOrder,
        roll: Option<(u32, u32)>,
    },
    /// The opponent has a face-down card waiting for the player's next play
    CardPending {
        side: Side,
    },
    CardPlayed {
        side: Side,
        card: CardInstanceId,
        name: String,
        attack: i32,
        delta: i32,
    },
    BoardResolved {
        totals: RoundTotals,
    },
    OpponentRevealed {
        by: Side,
        cards: Vec<String>,
    },
    CardDiscarded {
        side: Side,
        card: CardInstanceId,
        name: String,
        label: String,
    },
    CardRetrieved {
        side: Side,
        card: CardInstanceId,
        name: String,
        label: String,
    },
    Reshuffled {
        side: Side,
        cards: usize,
    },
    RoundResult {
        round: u32,
        outcome: RoundOutcome,
    },
    GameOver {
        winner: Winner,
        tower: i32,
        rounds_played: u32,
    },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::PhaseChanged { round, phase } => write!(f, "[round {}] {}", round, phase),
            GameEvent::ActionRejected { reason } => write!(f, "  rejected: {}", reason),
            GameEvent::SelectionChanged {
                energy_spent,
                budget,
            } => write!(f, "  selection: {}/{} energy", energy_spent, budget),
            GameEvent::LockedIn {
                side,
                cards,
                energy,
            } => write!(f, "  {} locks {} card(s) for {} energy", side, cards.len(), energy),
            GameEvent::TurnOrderDecided { order, roll } => match roll {
                Some((p, o)) => write!(f, "  dice {} vs {}: {:?}", p, o, order),
                None => write!(f, "  turn order: {:?}", order),
            },
            GameEvent::CardPending { side } => write!(f, "  {} places a card face down", side),
            GameEvent::CardPlayed {
                side,
                name,
                attack,
                delta,
                ..
            } => {
                if *delta == 0 {
                    write!(f, "  {} plays {} ({})", side, name, attack)
                } else {
                    write!(f, "  {} plays {} ({}, {:+})", side, name, attack, delta)
                }
            }
            GameEvent::BoardResolved { totals } => {
                write!(f, "    board: {} vs {}", totals.player, totals.opponent)
            }
            GameEvent::OpponentRevealed { by, cards } => {
                write!(f, "  {} sees: {}", by, cards.join(", "))
            }
            GameEvent::CardDiscarded {
                side, name, label, ..
            }
            | GameEvent::CardRetrieved {
                side, name, label, ..
            } => write!(f, "  {} {}: {}", side, name, label),
            GameEvent::Reshuffled { side, cards } => {
                write!(f, "  {} reshuffles {} card(s) into hand", side, cards)
            }
            GameEvent::RoundResult { round, outcome } => {
                let winner = match outcome.round_winner {
                    Some(side) => side.to_string(),
                    None => "nobody".to_string(),
                };
                write!(
                    f,
                    "Round {}: {} vs {}, {} wins, tower {} -> {}",
                    round,
                    outcome.totals.player,
                    outcome.totals.opponent,
                    winner,
                    outcome.tower_before,
                    outcome.tower_after
                )
            }
            GameEvent::GameOver {
                winner,
                tower,
                rounds_played,
            } => write!(
                f,
                "=== Game over: {:?} after {} round(s), tower {} ===",
                winner, rounds_played, tower
            ),
        }
    }
}

/// What the session needs before it can move on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Awaiting {
    Selection,
    OrderChoice,
    PlayerCard,
    Clock(Duration),
    Nothing,
}

/// Display data for one card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: CardInstanceId,
    pub name: String,
    pub card_type: CardType,
    pub energy_cost: u32,
    pub base_attack: i32,
    pub current_attack: i32,
    pub trend: AttackTrend,
}

impl From<&CardInstance> for CardView {
    fn from(card: &CardInstance) -> Self {
        CardView {
            id: card.id(),
            name: card.name().to_string(),
            card_type: card.card_type(),
            energy_cost: card.energy_cost(),
            base_attack: card.base_attack(),
            current_attack: card.last_resolved_attack(),
            trend: card.trend(),
        }
    }
}

pub struct GameSession {
    config: GameConfig,
    state: RoundState,
    score: ScoreState,
    player: SideBoard,
    opponent: SideBoard,
    engine: EffectEngine,
    strategy: OpponentStrategy,
    rng: GameRng,
    events: Vec<GameEvent>,
    history: Vec<RoundOutcome>,
}

impl GameSession {
    /// Deal both decks and open round 1's planning phase
    pub fn new(
        config: GameConfig,
        registry: EffectRegistry,
        player_deck: &[Arc<CardDefinition>],
        opponent_deck: &[Arc<CardDefinition>],
        rng: GameRng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut next_id = 0u32;
        let mut deal = |deck: &[Arc<CardDefinition>], side: Side| -> Vec<CardInstance> {
            deck.iter()
                .map(|def| {
                    next_id += 1;
                    CardInstance::new(CardInstanceId(next_id), Arc::clone(def), side)
                })
                .collect()
        };
        let player = SideBoard::new(Side::Player, deal(player_deck, Side::Player));
        let opponent = SideBoard::new(Side::Opponent, deal(opponent_deck, Side::Opponent));

        let mut session = GameSession {
            state: RoundState::new(config.energy_budget, config.max_rounds),
            score: ScoreState::new(config.tower_bound),
            config,
            player,
            opponent,
            engine: EffectEngine::new(registry),
            strategy: OpponentStrategy::new(),
            rng,
            events: Vec::new(),
            history: Vec::new(),
        };
        session.begin_round();
        Ok(session)
    }

    /// Replace the opponent's strategy
    pub fn with_strategy(mut self, strategy: OpponentStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    // ---- queries ----

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn round(&self) -> u32 {
        self.state.round
    }

    pub fn round_state(&self) -> &RoundState {
        &self.state
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    pub fn totals(&self) -> RoundTotals {
        self.score.totals
    }

    pub fn tower(&self) -> i32 {
        self.score.tower()
    }

    pub fn winner(&self) -> Option<Winner> {
        self.score.winner()
    }

    pub fn is_over(&self) -> bool {
        self.state.phase == Phase::GameOver
    }

    pub fn history(&self) -> &[RoundOutcome] {
        &self.history
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn turn_order(&self) -> Option<TurnOrder> {
        self.state.turn_order
    }

    pub fn pending_opponent_card(&self) -> Option<CardInstanceId> {
        self.state.pending_opponent_card
    }

    pub fn energy_budget(&self) -> u32 {
        self.state.energy_budget
    }

    /// Energy of the player's current selection
    pub fn energy_spent(&self) -> u32 {
        self.state
            .selected
            .iter()
            .filter_map(|id| self.player.hand.get(*id))
            .map(|c| c.energy_cost())
            .sum()
    }

    pub fn selected(&self) -> &[CardInstanceId] {
        &self.state.selected
    }

    pub fn board(&self, side: Side) -> &SideBoard {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    pub fn pile_view(&self, side: Side, location: Location) -> Vec<CardView> {
        self.board(side)
            .pile(location)
            .cards()
            .iter()
            .map(CardView::from)
            .collect()
    }

    pub fn battle_view(&self, side: Side) -> Vec<CardView> {
        self.pile_view(side, Location::BattleZone)
    }

    pub fn planning_time_left(&self) -> Option<Duration> {
        if self.state.phase == Phase::Planning {
            self.state.planning_timer
        } else {
            None
        }
    }

    pub fn awaiting(&self) -> Awaiting {
        match self.state.step {
            Step::AwaitSelection => Awaiting::Selection,
            Step::AwaitOrderChoice => Awaiting::OrderChoice,
            Step::AwaitPlayerCard => Awaiting::PlayerCard,
            Step::Wait { remaining, .. } => Awaiting::Clock(remaining),
            Step::Finished => Awaiting::Nothing,
        }
    }

    /// Time until the clock next changes something, if anything is timed
    pub fn time_until_next_step(&self) -> Option<Duration> {
        match self.state.step {
            Step::Wait { remaining, .. } => Some(remaining),
            Step::AwaitSelection => self.state.planning_timer,
            _ => None,
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Both sides still hold exactly their own pools, each card tagged with its pile
    pub fn verify_invariants(&self) -> Result<(), InvariantViolation> {
        self.player.verify()?;
        self.opponent.verify()
    }

    // ---- human actions ----

    /// Add or remove a hand card from the planning selection. Budget is only checked at lock-in.
    pub fn toggle_selection(
        &mut self,
        card: CardInstanceId,
        selected: bool,
    ) -> Result<(), ActionError> {
        if self.state.phase != Phase::Planning {
            return self.reject(ActionError::WrongPhase {
                action: "select cards",
                phase: self.state.phase,
            });
        }
        if !self.player.hand.contains(card) {
            return self.reject(ActionError::UnknownCard(card));
        }

        if selected {
            if !self.state.selected.contains(&card) {
                self.state.selected.push(card);
            }
        } else {
            self.state.selected.retain(|id| *id != card);
        }
        self.events.push(GameEvent::SelectionChanged {
            energy_spent: self.energy_spent(),
            budget: self.state.energy_budget,
        });
        Ok(())
    }

    /// Pick this round's offering (Blessing by default)
    pub fn choose_offering(&mut self, offering: Offering) -> Result<(), ActionError> {
        if self.state.phase != Phase::Planning {
            return self.reject(ActionError::WrongPhase {
                action: "choose an offering",
                phase: self.state.phase,
            });
        }
        self.state.player_offering = offering;
        Ok(())
    }

    /// Commit the selection. On success the session runs through lock-in and turn order, and
    /// is in Battle unless the human gets to choose who starts. An empty selection is only
    /// accepted when no hand card fits the budget.
    pub fn lock_in(&mut self) -> Result<(), ActionError> {
        if self.state.phase != Phase::Planning {
            return self.reject(ActionError::WrongPhase {
                action: "lock in",
                phase: self.state.phase,
            });
        }
        if self.state.selected.is_empty() && self.has_affordable_card() {
            return self.reject(ActionError::EmptySelection);
        }
        let spent = self.energy_spent();
        if spent > self.state.energy_budget {
            return self.reject(ActionError::OverBudget {
                spent,
                budget: self.state.energy_budget,
            });
        }

        self.commit_lock_in(spent);
        Ok(())
    }

    /// Answer the turn-order choice won on the dice
    pub fn choose_turn_order(&mut self, order: TurnOrder) -> Result<(), ActionError> {
        if self.state.phase != Phase::TurnOrderResolution {
            return self.reject(ActionError::WrongPhase {
                action: "choose turn order",
                phase: self.state.phase,
            });
        }
        if self.state.step != Step::AwaitOrderChoice {
            return self.reject(ActionError::NotAwaiting {
                action: "choose turn order",
            });
        }
        self.start_battle(order, None);
        Ok(())
    }

    /// Play one of the player's locked cards
    pub fn play_card(&mut self, card: CardInstanceId) -> Result<(), ActionError> {
        if self.state.phase != Phase::Battle {
            return self.reject(ActionError::WrongPhase {
                action: "play a card",
                phase: self.state.phase,
            });
        }
        if self.state.step != Step::AwaitPlayerCard {
            return self.reject(ActionError::NotAwaiting {
                action: "play a card",
            });
        }
        if !self.player.locked.contains(card) {
            return self.reject(ActionError::UnknownCard(card));
        }

        let revealed = self.state.pending_opponent_card.take();
        if let Some(pending) = revealed {
            self.opponent
                .move_card(pending, Location::Locked, Location::BattleZone);
        }
        self.player
            .move_card(card, Location::Locked, Location::BattleZone);
        log::debug!("Round {}: player plays {}", self.state.round, card);

        self.refresh_board();
        if let Some(pending) = revealed {
            self.announce_play(Side::Opponent, pending);
        }
        self.announce_play(Side::Player, card);

        let opponent_answers = revealed.is_none()
            && self.state.turn_order == Some(TurnOrder::PlayerFirst)
            && !self.opponent.locked.is_empty();
        self.state.step = if opponent_answers {
            Step::Wait {
                remaining: self.config.pacing.opponent_response(),
                then: StepAction::OpponentRespond,
            }
        } else {
            Step::Wait {
                remaining: self.config.pacing.settle(),
                then: StepAction::Advance,
            }
        };
        Ok(())
    }

    // ---- clock ----

    /// Feed elapsed time. Runs every timed sub-step that comes due, and the planning timeout.
    pub fn tick(&mut self, elapsed: Duration) {
        if self.state.phase == Phase::GameOver {
            return;
        }

        let mut budget = elapsed;
        if self.state.phase == Phase::Planning {
            let Some(left) = self.state.planning_timer else {
                return;
            };
            if budget < left {
                self.state.planning_timer = Some(left - budget);
                return;
            }
            budget -= left;
            self.state.planning_timer = None;
            self.on_planning_timeout();
            if self.state.phase == Phase::Planning {
                return;
            }
        }

        while let Step::Wait { remaining, then } = self.state.step {
            if budget >= remaining {
                budget -= remaining;
                self.run_action(then);
            } else {
                self.state.step = Step::Wait {
                    remaining: remaining - budget,
                    then,
                };
                break;
            }
        }
    }

    /// Run timed sub-steps until the session needs the human (or the game ends)
    pub fn fast_forward(&mut self) {
        while matches!(self.state.step, Step::Wait { .. }) {
            match self.time_until_next_step() {
                Some(due) => self.tick(due),
                None => break,
            }
        }
    }

    // ---- internals ----

    fn reject(&mut self, error: ActionError) -> Result<(), ActionError> {
        log::warn!("Rejected: {}", error);
        self.events.push(GameEvent::ActionRejected {
            reason: error.to_string(),
        });
        Err(error)
    }

    fn set_phase(&mut self, phase: Phase) {
        self.state.phase = phase;
        log::debug!("Round {}: entering {}", self.state.round, phase);
        self.events.push(GameEvent::PhaseChanged {
            round: self.state.round,
            phase,
        });
        debug_assert!(
            self.verify_invariants().is_ok(),
            "pile invariant broken entering {}: {:?}",
            phase,
            self.verify_invariants()
        );
    }

    fn begin_round(&mut self) {
        self.engine.begin_round();
        self.state.reset_for_round();
        self.state.planning_timer = self.config.planning_timeout();
        self.score.totals = RoundTotals::default();
        self.set_phase(Phase::Planning);
    }

    fn on_planning_timeout(&mut self) {
        log::info!("Round {}: planning time is up, locking in", self.state.round);
        if self.lock_in().is_ok() {
            return;
        }
        if self.has_affordable_card() {
            self.state.planning_timer = self.config.planning_timeout();
        } else {
            self.state.selected.clear();
            self.commit_lock_in(0);
        }
    }

    fn has_affordable_card(&self) -> bool {
        self.player
            .hand
            .cards()
            .iter()
            .any(|c| c.energy_cost() <= self.state.energy_budget)
    }

    fn commit_lock_in(&mut self, spent: u32) {
        self.set_phase(Phase::LockIn);
        self.state.planning_timer = None;

        let selected = std::mem::take(&mut self.state.selected);
        for id in &selected {
            self.player.move_card(*id, Location::Hand, Location::Locked);
        }
        self.player.move_all(Location::Hand, Location::Reserve);

        let plan = self.strategy.select_locked_set(
            self.opponent.hand.cards(),
            self.state.energy_budget,
            &mut self.rng,
        );
        for id in &plan.locked {
            self.opponent.move_card(*id, Location::Hand, Location::Locked);
        }
        self.opponent.move_all(Location::Hand, Location::Reserve);
        self.state.opponent_offering = self.strategy.choose_offering(&mut self.rng);

        self.events.push(GameEvent::LockedIn {
            side: Side::Player,
            cards: selected,
            energy: spent,
        });
        self.events.push(GameEvent::LockedIn {
            side: Side::Opponent,
            cards: plan.locked,
            energy: plan.energy,
        });

        self.set_phase(Phase::TurnOrderResolution);
        let resolution = determine_turn_order(
            self.player.locked.len(),
            self.opponent.locked.len(),
            self.config.dice_roll_for_order,
            &mut self.rng,
        );
        match resolution.decision {
            OrderDecision::Decided(order) => self.start_battle(order, resolution.roll),
            OrderDecision::PlayerChooses => {
                log::debug!("Player won the roll {:?} and chooses order", resolution.roll);
                self.state.step = Step::AwaitOrderChoice;
            }
        }
    }

    fn start_battle(&mut self, order: TurnOrder, roll: Option<(u32, u32)>) {
        self.state.turn_order = Some(order);
        self.events.push(GameEvent::TurnOrderDecided { order, roll });
        self.set_phase(Phase::Battle);
        self.advance_turn();
    }

    /// Decide what happens next in battle from what each side has left
    fn advance_turn(&mut self) {
        let player_left = !self.player.locked.is_empty();
        let opponent_left = !self.opponent.locked.is_empty();

        self.state.step = match (player_left, opponent_left) {
            (true, true) => {
                if self.state.turn_order == Some(TurnOrder::OpponentFirst)
                    && self.state.pending_opponent_card.is_none()
                {
                    self.state.pending_opponent_card = self.opponent.locked.front().map(|c| c.id());
                    self.events.push(GameEvent::CardPending {
                        side: Side::Opponent,
                    });
                }
                Step::AwaitPlayerCard
            }
            (true, false) => Step::AwaitPlayerCard,
            (false, true) => Step::Wait {
                remaining: self.config.pacing.solo_play(),
                then: StepAction::OpponentSolo,
            },
            (false, false) => Step::Wait {
                remaining: self.config.pacing.end_round(),
                then: StepAction::ResolveRound,
            },
        };
    }

    fn run_action(&mut self, action: StepAction) {
        match action {
            StepAction::OpponentRespond | StepAction::OpponentSolo => {
                self.opponent_play();
                self.state.step = Step::Wait {
                    remaining: self.config.pacing.settle(),
                    then: StepAction::Advance,
                };
            }
            StepAction::Advance => self.advance_turn(),
            StepAction::ResolveRound => self.resolve_round(),
            StepAction::Cleanup => self.cleanup(),
        }
    }

    fn opponent_play(&mut self) {
        let Some(card) = self.strategy.next_card_to_play(&mut self.opponent.locked) else {
            return;
        };
        let id = card.id();
        log::debug!("Round {}: Bakunawa plays {}", self.state.round, card.name());
        self.opponent.battle.push(card);
        self.refresh_board();
        self.announce_play(Side::Opponent, id);
    }

    fn announce_play(&mut self, side: Side, id: CardInstanceId) {
        if let Some(card) = self.board(side).battle.get(id) {
            let event = GameEvent::CardPlayed {
                side,
                card: id,
                name: card.name().to_string(),
                attack: card.current_attack(),
                delta: card.current_attack() - card.base_attack(),
            };
            self.events.push(event);
        }
    }

    /// Re-resolve both battle zones from scratch and publish fresh totals
    fn refresh_board(&mut self) {
        let round = self.state.round;
        let player = self.engine.resolve_side(
            Side::Player,
            self.player.battle.cards_mut(),
            self.opponent.battle.cards(),
            ResolutionContext {
                round,
                offering: self.state.player_offering,
            },
        );
        let opponent = self.engine.resolve_side(
            Side::Opponent,
            self.opponent.battle.cards_mut(),
            self.player.battle.cards(),
            ResolutionContext {
                round,
                offering: self.state.opponent_offering,
            },
        );

        self.score.totals = recompute_totals(
            self.player.battle.cards(),
            self.opponent.battle.cards(),
            player.debuff_to_opponent,
            opponent.debuff_to_opponent,
        );
        self.events.push(GameEvent::BoardResolved {
            totals: self.score.totals,
        });

        for signal in player.signals.into_iter().chain(opponent.signals) {
            self.handle_signal(signal);
        }
    }

    fn handle_signal(&mut self, event: SignalEvent) {
        let target = event.side.other();
        match event.signal {
            EffectSignal::RevealOpponent => {
                let cards = self
                    .board(target)
                    .locked
                    .cards()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect();
                self.events.push(GameEvent::OpponentRevealed {
                    by: event.side,
                    cards,
                });
            }
            EffectSignal::DiscardOpponentReserve => {
                let source_name = self
                    .board(event.side)
                    .find(event.source)
                    .map(|c| c.name().to_string())
                    .unwrap_or_default();
                let board = match target {
                    Side::Player => &mut self.player,
                    Side::Opponent => &mut self.opponent,
                };
                if board.reserve.is_empty() {
                    log::debug!("{} has no reserve to discard from", target);
                    return;
                }
                let index = self.rng.random_range(board.reserve.len());
                let card = board.reserve.cards()[index].id();
                let name = board
                    .reserve
                    .get(card)
                    .map(|c| c.name().to_string())
                    .unwrap_or_default();
                board.move_card(card, Location::Reserve, Location::Discard);
                self.events.push(GameEvent::CardDiscarded {
                    side: target,
                    card,
                    name,
                    label: format!("Discarded by {}", source_name),
                });
            }
            EffectSignal::RetrieveOnLoss => {
                self.state.retrieve_on_loss.push(event.source);
            }
        }
    }

    fn resolve_round(&mut self) {
        self.set_phase(Phase::RoundResolution);
        let outcome = self.score.apply_round_outcome(self.score.totals);
        self.history.push(outcome);
        log::info!(
            "Round {}: player {} vs Bakunawa {}, tower {} -> {}",
            self.state.round,
            outcome.totals.player,
            outcome.totals.opponent,
            outcome.tower_before,
            outcome.tower_after
        );
        self.events.push(GameEvent::RoundResult {
            round: self.state.round,
            outcome,
        });

        let loser = outcome.round_winner.map(|w| w.other());
        let (player, opponent) = (&self.player, &self.opponent);
        self.state.retrieve_on_loss.retain(|id| {
            let owner = player
                .battle
                .get(*id)
                .or_else(|| opponent.battle.get(*id))
                .map(|c| c.owner());
            owner.is_some() && owner == loser
        });

        match self.score.check_instant_win() {
            Some(winner) => self.finish(winner),
            None => {
                self.state.step = Step::Wait {
                    remaining: self.config.pacing.cleanup(),
                    then: StepAction::Cleanup,
                };
            }
        }
    }

    fn cleanup(&mut self) {
        self.set_phase(Phase::Cleanup);
        let retrieved = std::mem::take(&mut self.state.retrieve_on_loss);
        let mut events = cleanup_side(&mut self.player, &mut self.rng, &retrieved);
        events.extend(cleanup_side(&mut self.opponent, &mut self.rng, &retrieved));
        self.events.extend(events);

        self.state.round += 1;
        if self.state.past_cap() {
            let winner = self.score.resolve_by_position();
            self.state.round = self.state.max_rounds;
            self.finish(winner);
        } else {
            self.begin_round();
        }
    }

    fn finish(&mut self, winner: Winner) {
        self.state.step = Step::Finished;
        self.state.pending_opponent_card = None;
        self.set_phase(Phase::GameOver);
        log::info!(
            "Game over after {} round(s): {:?} (tower {})",
            self.history.len(),
            winner,
            self.score.tower()
        );
        self.events.push(GameEvent::GameOver {
            winner,
            tower: self.score.tower(),
            rounds_played: self.history.len() as u32,
        });
    }
}

/// Battle zone to discard, then refill the hand from reserve (or the reshuffled discard
/// pile when the reserve is empty). Retrieved cards rejoin the hand last.
fn cleanup_side(
    board: &mut SideBoard,
    rng: &mut GameRng,
    retrieved: &[CardInstanceId],
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let side = board.side();
    board.move_all(Location::BattleZone, Location::Discard);

    if board.reserve.is_empty() {
        board.discard.shuffle(rng);
        let cards = board.discard.len();
        board.move_all(Location::Discard, Location::Hand);
        log::debug!("{} reserve empty, reshuffled {} discarded card(s)", side, cards);
        events.push(GameEvent::Reshuffled { side, cards });
    } else {
        board.move_all(Location::Reserve, Location::Hand);
    }

    for id in retrieved {
        let name = match board.discard.get(*id) {
            Some(card) => card.name().to_string(),
            None => continue,
        };
        board.move_card(*id, Location::Discard, Location::Hand);
        events.push(GameEvent::CardRetrieved {
            side,
            card: *id,
            name,
            label: "Returned to hand".to_string(),
        });
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardSubtype, EffectKind};
    use crate::game::opponent::Heuristic;

    fn def(id: &str, card_type: CardType, cost: u32, attack: i32, effect: Option<&str>) -> Arc<CardDefinition> {
        Arc::new(CardDefinition {
            id: id.to_string(),
            name: id.to_string(),
            card_type,
            subtype: CardSubtype::None,
            energy_cost: cost,
            base_attack: attack,
            effect_id: effect.map(str::to_string),
            description: String::new(),
            art: None,
        })
    }

    fn scenario_deck() -> Vec<Arc<CardDefinition>> {
        vec![
            def("c3a5", CardType::Attack, 3, 5, None),
            def("c4a3", CardType::Attack, 4, 3, None),
            def("c5a2", CardType::Attack, 5, 2, None),
            def("c2a1", CardType::Attack, 2, 1, None),
        ]
    }

    fn instant_config() -> GameConfig {
        GameConfig {
            planning_timeout_ms: None,
            pacing: crate::config::Pacing::instant(),
            ..GameConfig::default()
        }
    }

    fn session_with(config: GameConfig, player: &[Arc<CardDefinition>], opponent: &[Arc<CardDefinition>]) -> GameSession {
        GameSession::new(
            config,
            EffectRegistry::standard(),
            player,
            opponent,
            GameRng::new(Some(42)),
        )
        .expect("config should be valid")
        .with_strategy(OpponentStrategy::forced(Heuristic::CostDescending))
    }

    fn hand_id(session: &GameSession, name: &str) -> CardInstanceId {
        session
            .board(Side::Player)
            .hand
            .cards()
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.id())
            .expect("card should be in hand")
    }

    fn select(session: &mut GameSession, names: &[&str]) {
        for name in names {
            let id = hand_id(session, name);
            session.toggle_selection(id, true).expect("toggle should work");
        }
    }

    /// Play the player's locked cards in order until the round leaves battle
    fn play_out_round(session: &mut GameSession) {
        loop {
            session.fast_forward();
            if session.awaiting() != Awaiting::PlayerCard {
                break;
            }
            let next = session.board(Side::Player).locked.cards()[0].id();
            session.play_card(next).expect("play should work");
            session.verify_invariants().expect("invariants hold");
        }
    }

    #[test]
    fn test_lock_in_scenario_budget_ten() {
        let deck = scenario_deck();
        let mut session = session_with(instant_config(), &deck, &deck);
        select(&mut session, &["c3a5", "c4a3", "c2a1"]);
        assert_eq!(session.energy_spent(), 9);

        session.lock_in().expect("9 <= 10 should lock in");
        assert_eq!(session.phase(), Phase::Battle);
        assert_eq!(session.board(Side::Player).locked.len(), 3);
        assert_eq!(session.board(Side::Player).reserve.len(), 1);

        let opponent = session.board(Side::Opponent);
        let names: Vec<&str> = opponent.locked.cards().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["c5a2", "c4a3"]);
        assert_eq!(opponent.locked.total_cost(), 9);
        assert_eq!(opponent.reserve.len(), 2);
        session.verify_invariants().expect("invariants hold");
    }

    #[test]
    fn test_over_budget_lock_in_is_rejected_without_state_change() {
        let deck = scenario_deck();
        let mut session = session_with(instant_config(), &deck, &deck);
        select(&mut session, &["c3a5", "c4a3", "c5a2"]);
        session.drain_events();

        let err = session.lock_in().expect_err("12 > 10 must be rejected");
        assert_eq!(err, ActionError::OverBudget { spent: 12, budget: 10 });
        assert_eq!(session.phase(), Phase::Planning);
        assert_eq!(session.board(Side::Player).hand.len(), 4);
        assert_eq!(session.selected().len(), 3);
        assert!(matches!(
            session.drain_events().as_slice(),
            [GameEvent::ActionRejected { .. }]
        ));
    }

    #[test]
    fn test_empty_lock_in_rejected() {
        let deck = scenario_deck();
        let mut session = session_with(instant_config(), &deck, &deck);
        assert_eq!(session.lock_in(), Err(ActionError::EmptySelection));
        assert_eq!(session.phase(), Phase::Planning);
    }

    #[test]
    fn test_toggle_off_and_unknown_card() {
        let deck = scenario_deck();
        let mut session = session_with(instant_config(), &deck, &deck);
        let id = hand_id(&session, "c5a2");
        session.toggle_selection(id, true).expect("toggle on");
        session.toggle_selection(id, true).expect("toggle on twice");
        assert_eq!(session.selected(), &[id]);
        session.toggle_selection(id, false).expect("toggle off");
        assert!(session.selected().is_empty());
        assert_eq!(
            session.toggle_selection(CardInstanceId(999), true),
            Err(ActionError::UnknownCard(CardInstanceId(999)))
        );
    }

    #[test]
    fn test_actions_outside_their_phase_are_rejected() {
        let deck = scenario_deck();
        let mut session = session_with(instant_config(), &deck, &deck);
        let id = hand_id(&session, "c3a5");
        assert!(matches!(
            session.play_card(id),
            Err(ActionError::WrongPhase { phase: Phase::Planning, .. })
        ));
        assert!(session.choose_turn_order(TurnOrder::PlayerFirst).is_err());

        select(&mut session, &["c3a5"]);
        session.lock_in().expect("lock in");
        assert!(matches!(
            session.toggle_selection(id, false),
            Err(ActionError::WrongPhase { phase: Phase::Battle, .. })
        ));
        assert!(session.lock_in().is_err());
        assert!(session.choose_offering(Offering::Curse).is_err());
    }

    #[test]
    fn test_full_round_keeps_every_card() {
        let deck = scenario_deck();
        let mut session = session_with(instant_config(), &deck, &deck);
        select(&mut session, &["c3a5", "c4a3", "c2a1"]);
        session.lock_in().expect("lock in");
        assert_eq!(session.turn_order(), Some(TurnOrder::PlayerFirst));

        play_out_round(&mut session);
        assert_eq!(session.round(), 2);
        assert_eq!(session.phase(), Phase::Planning);
        assert_eq!(session.history().len(), 1);
        let outcome = session.history()[0];
        assert_eq!(outcome.totals.player, 9);
        assert_eq!(outcome.totals.opponent, 5);
        assert_eq!(session.tower(), -1);

        for side in [Side::Player, Side::Opponent] {
            let board = session.board(side);
            assert_eq!(board.hand.len() + board.discard.len(), 4);
            assert!(board.battle.is_empty() && board.locked.is_empty() && board.reserve.is_empty());
        }
        session.verify_invariants().expect("invariants hold");
    }

    #[test]
    fn test_reserve_becomes_hand_discard_stays() {
        let deck = scenario_deck();
        let mut session = session_with(instant_config(), &deck, &deck);
        select(&mut session, &["c3a5", "c4a3", "c2a1"]);
        session.lock_in().expect("lock in");
        play_out_round(&mut session);
        let player = session.board(Side::Player);
        let hand: Vec<&str> = player.hand.cards().iter().map(|c| c.name()).collect();
        assert_eq!(hand, vec!["c5a2"]);
        assert_eq!(player.discard.len(), 3);
    }

    #[test]
    fn test_empty_reserve_reshuffles_discard_into_hand() {
        let deck = vec![
            def("a", CardType::Attack, 2, 2, None),
            def("b", CardType::Attack, 2, 2, None),
        ];
        let mut session = session_with(instant_config(), &deck, &deck);
        select(&mut session, &["a", "b"]);
        session.lock_in().expect("lock in");
        play_out_round(&mut session);
        let events = session.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::Reshuffled { side: Side::Player, cards: 2 })));
        assert_eq!(session.board(Side::Player).hand.len(), 2);
        assert!(session.board(Side::Player).discard.is_empty());
    }

    #[test]
    fn test_opponent_first_precommits_pending_card() {
        let player = vec![def("p", CardType::Attack, 2, 1, None)];
        let opponent = vec![
            def("o1", CardType::Attack, 2, 2, None),
            def("o2", CardType::Attack, 2, 2, None),
        ];
        let mut session = session_with(instant_config(), &player, &opponent);
        select(&mut session, &["p"]);
        session.lock_in().expect("lock in");
        assert_eq!(session.turn_order(), Some(TurnOrder::OpponentFirst));

        let pending = session.pending_opponent_card().expect("opponent pre-commits");
        assert!(session.board(Side::Opponent).locked.contains(pending));
        assert!(session.board(Side::Opponent).battle.is_empty());

        let card = session.board(Side::Player).locked.cards()[0].id();
        session.play_card(card).expect("play");
        assert!(session.board(Side::Opponent).battle.contains(pending));
        assert!(session.board(Side::Player).battle.contains(card));
        assert_eq!(session.pending_opponent_card(), None);

        session.fast_forward();
        assert_eq!(session.round(), 2, "opponent solos its last card and the round ends");
        assert_eq!(session.history()[0].totals.opponent, 4);
        assert_eq!(session.tower(), 1);
    }

    #[test]
    fn test_player_free_turns_when_opponent_has_nothing() {
        let player = vec![
            def("p1", CardType::Attack, 1, 1, None),
            def("p2", CardType::Attack, 1, 1, None),
        ];
        let opponent = vec![def("big", CardType::Attack, 20, 9, None)];
        let mut session = session_with(instant_config(), &player, &opponent);
        select(&mut session, &["p1", "p2"]);
        session.lock_in().expect("lock in");
        assert!(session.board(Side::Opponent).locked.is_empty());

        play_out_round(&mut session);
        assert_eq!(session.history()[0].totals, RoundTotals { player: 2, opponent: 0 });
        assert_eq!(session.tower(), -1);
    }

    #[test]
    fn test_instant_win_ends_before_round_cap() {
        let player = vec![def("p", CardType::Attack, 1, 9, None)];
        let opponent = vec![def("o", CardType::Attack, 1, 1, None)];
        let config = GameConfig {
            tower_bound: 2,
            max_rounds: 10,
            ..instant_config()
        };
        let mut session = session_with(config, &player, &opponent);
        for _ in 0..2 {
            select(&mut session, &["p"]);
            session.lock_in().expect("lock in");
            play_out_round(&mut session);
        }
        assert_eq!(session.phase(), Phase::GameOver);
        assert_eq!(session.winner(), Some(Winner::Player));
        assert_eq!(session.tower(), -2);
        assert_eq!(session.history().len(), 2);
        assert!(session.lock_in().is_err());
    }

    #[test]
    fn test_opponent_instant_win_from_four_to_five() {
        let player = vec![def("p", CardType::Attack, 1, 1, None)];
        let opponent = vec![def("o", CardType::Attack, 1, 9, None)];
        let mut session = session_with(instant_config(), &player, &opponent);
        for _ in 0..4 {
            select(&mut session, &["p"]);
            session.lock_in().expect("lock in");
            play_out_round(&mut session);
        }
        assert_eq!(session.tower(), 4);
        assert_eq!(session.phase(), Phase::Planning);
        session.drain_events();

        select(&mut session, &["p"]);
        session.lock_in().expect("lock in");
        play_out_round(&mut session);
        assert_eq!(session.phase(), Phase::GameOver);
        assert_eq!(session.winner(), Some(Winner::Opponent));
        assert_eq!(session.tower(), 5);
        assert_eq!(session.history().len(), 5);
        assert!(session.drain_events().iter().any(|e| matches!(
            e,
            GameEvent::GameOver {
                winner: Winner::Opponent,
                tower: 5,
                ..
            }
        )));
    }

    #[test]
    fn test_round_cap_resolves_on_tower_sign() {
        let player = vec![def("p", CardType::Attack, 1, 1, None)];
        let opponent = vec![def("o", CardType::Attack, 1, 1, None)];
        let config = GameConfig {
            max_rounds: 2,
            ..instant_config()
        };
        let mut session = session_with(config, &player, &opponent);
        for _ in 0..2 {
            select(&mut session, &["p"]);
            session.lock_in().expect("lock in");
            play_out_round(&mut session);
        }
        assert_eq!(session.phase(), Phase::GameOver);
        assert_eq!(session.winner(), Some(Winner::Draw), "every round tied");
        assert_eq!(session.tower(), 0);
    }

    #[test]
    fn test_planning_timeout_auto_locks_selection() {
        let deck = scenario_deck();
        let config = GameConfig {
            planning_timeout_ms: Some(5_000),
            ..instant_config()
        };
        let mut session = session_with(config, &deck, &deck);
        select(&mut session, &["c3a5"]);
        session.tick(Duration::from_millis(4_000));
        assert_eq!(session.phase(), Phase::Planning);
        assert_eq!(session.planning_time_left(), Some(Duration::from_millis(1_000)));
        session.tick(Duration::from_millis(1_000));
        assert_eq!(session.phase(), Phase::Battle);
    }

    #[test]
    fn test_planning_timeout_with_bad_selection_restarts_timer() {
        let deck = scenario_deck();
        let config = GameConfig {
            planning_timeout_ms: Some(5_000),
            ..instant_config()
        };
        let mut session = session_with(config, &deck, &deck);
        session.tick(Duration::from_millis(6_000));
        assert_eq!(session.phase(), Phase::Planning);
        assert_eq!(session.planning_time_left(), Some(Duration::from_millis(5_000)));
    }

    #[test]
    fn test_unaffordable_hand_locks_in_nothing() {
        let player = vec![def("huge", CardType::Attack, 20, 9, None)];
        let opponent = vec![def("o", CardType::Attack, 1, 2, None)];
        let mut session = session_with(instant_config(), &player, &opponent);
        session.lock_in().expect("nothing fits the budget");
        assert!(session.board(Side::Player).locked.is_empty());
        assert_eq!(session.board(Side::Player).reserve.len(), 1);

        session.fast_forward();
        assert!(session
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::PhaseChanged { phase: Phase::RoundResolution, .. })));
        assert_eq!(session.history()[0].totals, RoundTotals { player: 0, opponent: 2 });
        assert_eq!(session.tower(), 1);
        assert_eq!(session.round(), 2);
        assert_eq!(session.phase(), Phase::Planning);
        session.verify_invariants().expect("invariants hold");
    }

    #[test]
    fn test_planning_timeout_with_unaffordable_hand_moves_on() {
        let player = vec![def("huge", CardType::Attack, 20, 9, None)];
        let opponent = vec![def("o", CardType::Attack, 1, 2, None)];
        let config = GameConfig {
            planning_timeout_ms: Some(1_000),
            ..instant_config()
        };
        let mut session = session_with(config, &player, &opponent);
        select(&mut session, &["huge"]);
        session.tick(Duration::from_millis(1_000));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.round(), 2);
        assert_eq!(session.phase(), Phase::Planning);
        assert!(session.selected().is_empty());
        assert_eq!(session.planning_time_left(), Some(Duration::from_millis(1_000)));
    }

    #[test]
    fn test_tick_past_timeout_carries_into_battle() {
        let player = vec![def("huge", CardType::Attack, 20, 9, None)];
        let opponent = vec![def("o", CardType::Attack, 1, 2, None)];
        let config = GameConfig {
            planning_timeout_ms: Some(1_000),
            ..GameConfig::default()
        };
        let mut session = session_with(config, &player, &opponent);
        session.tick(Duration::from_millis(1_999));
        assert_eq!(session.phase(), Phase::Battle);
        assert_eq!(session.awaiting(), Awaiting::Clock(Duration::from_millis(1)));
        assert!(session.board(Side::Opponent).battle.is_empty());

        session.tick(Duration::from_millis(1));
        assert_eq!(session.board(Side::Opponent).battle.len(), 1);
        assert_eq!(session.time_until_next_step(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_pacing_waits_for_clock() {
        let deck = scenario_deck();
        let config = GameConfig {
            planning_timeout_ms: None,
            ..GameConfig::default()
        };
        let mut session = session_with(config, &deck, &deck);
        select(&mut session, &["c3a5", "c4a3", "c2a1"]);
        session.lock_in().expect("lock in");
        let first = session.board(Side::Player).locked.cards()[0].id();
        session.play_card(first).expect("play");
        assert_eq!(session.awaiting(), Awaiting::Clock(Duration::from_millis(1000)));
        assert!(session.board(Side::Opponent).battle.is_empty());

        session.tick(Duration::from_millis(999));
        assert!(session.board(Side::Opponent).battle.is_empty());
        session.tick(Duration::from_millis(1));
        assert_eq!(session.board(Side::Opponent).battle.len(), 1);
        assert_eq!(session.awaiting(), Awaiting::Clock(Duration::from_millis(500)));
        session.tick(Duration::from_millis(500));
        assert_eq!(session.awaiting(), Awaiting::PlayerCard);
    }

    #[test]
    fn test_play_while_waiting_on_clock_is_rejected() {
        let deck = scenario_deck();
        let config = GameConfig {
            planning_timeout_ms: None,
            ..GameConfig::default()
        };
        let mut session = session_with(config, &deck, &deck);
        select(&mut session, &["c3a5", "c4a3"]);
        session.lock_in().expect("lock in");
        let locked = session.board(Side::Player).locked.ids();
        session.play_card(locked[0]).expect("play");
        assert_eq!(
            session.play_card(locked[1]),
            Err(ActionError::NotAwaiting { action: "play a card" })
        );
        assert_eq!(session.board(Side::Player).locked.len(), 1);
    }

    #[test]
    fn test_repeated_resolution_does_not_double_global_buff() {
        let player = vec![
            def("hunger", CardType::Support, 1, 1, Some("bak_hunger")),
            def("a", CardType::Attack, 1, 3, None),
            def("b", CardType::Attack, 1, 2, None),
        ];
        let opponent = vec![def("o", CardType::Attack, 1, 0, None)];
        let mut session = session_with(instant_config(), &player, &opponent);
        select(&mut session, &["hunger", "a", "b"]);
        session.lock_in().expect("lock in");
        play_out_round(&mut session);
        assert_eq!(session.history()[0].totals.player, 2 + 4 + 3);
    }

    #[test]
    fn test_agong_returns_to_hand_on_loss() {
        let player = vec![
            def("agong", CardType::Defense, 2, 1, Some("def_agong")),
            def("spare", CardType::Attack, 2, 1, None),
        ];
        let opponent = vec![def("o", CardType::Attack, 1, 9, None)];
        let mut session = session_with(instant_config(), &player, &opponent);
        select(&mut session, &["agong"]);
        session.lock_in().expect("lock in");
        play_out_round(&mut session);

        assert_eq!(session.history()[0].round_winner, Some(Side::Opponent));
        let events = session.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::CardRetrieved { side: Side::Player, .. })));
        let hand: Vec<&str> = session
            .board(Side::Player)
            .hand
            .cards()
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(hand, vec!["spare", "agong"]);
        session.verify_invariants().expect("invariants hold");
    }

    #[test]
    fn test_discard_signal_hits_opponent_reserve() {
        let mut registry = EffectRegistry::standard();
        registry.register(
            "discarder",
            vec![EffectKind::Signal {
                signal: EffectSignal::DiscardOpponentReserve,
            }],
        );
        let player = vec![
            def("p", CardType::Attack, 1, 1, None),
            def("kept", CardType::Attack, 1, 1, None),
        ];
        let opponent = vec![def("tide", CardType::Defense, 1, 1, Some("discarder"))];
        let mut session = GameSession::new(
            instant_config(),
            registry,
            &player,
            &opponent,
            GameRng::new(Some(1)),
        )
        .expect("valid config");
        select(&mut session, &["p"]);
        session.lock_in().expect("lock in");
        session.drain_events();
        play_out_round(&mut session);

        let events = session.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::CardDiscarded { side: Side::Player, name, .. } if name == "kept")));
        session.verify_invariants().expect("invariants hold");
    }

    #[test]
    fn test_reveal_signal_lists_locked_cards() {
        let player = vec![
            def("gabay", CardType::Support, 1, 0, Some("sup_gabayan")),
            def("p2", CardType::Attack, 1, 1, None),
        ];
        let opponent = vec![
            def("o1", CardType::Attack, 3, 1, None),
            def("o2", CardType::Attack, 2, 1, None),
        ];
        let mut session = session_with(instant_config(), &player, &opponent);
        select(&mut session, &["gabay", "p2"]);
        session.lock_in().expect("lock in");
        session.drain_events();
        let first = session.board(Side::Player).locked.cards()[0].id();
        session.play_card(first).expect("play");
        let events = session.drain_events();
        let revealed = events.iter().find_map(|e| match e {
            GameEvent::OpponentRevealed { by: Side::Player, cards } => Some(cards.clone()),
            _ => None,
        });
        assert!(revealed.is_some());
    }

    #[test]
    fn test_dice_win_lets_player_choose() {
        let deck = scenario_deck();
        let config = GameConfig {
            dice_roll_for_order: true,
            ..instant_config()
        };
        let mut seen_choice = false;
        for seed in 0..50 {
            let mut session = GameSession::new(
                config.clone(),
                EffectRegistry::standard(),
                &deck,
                &deck,
                GameRng::new(Some(seed)),
            )
            .expect("valid config")
            .with_strategy(OpponentStrategy::forced(Heuristic::CostDescending));
            select(&mut session, &["c5a2", "c4a3"]);
            session.lock_in().expect("lock in");
            if session.awaiting() == Awaiting::OrderChoice {
                seen_choice = true;
                assert_eq!(session.phase(), Phase::TurnOrderResolution);
                session
                    .choose_turn_order(TurnOrder::OpponentFirst)
                    .expect("choice accepted");
                assert_eq!(session.phase(), Phase::Battle);
                assert!(session.pending_opponent_card().is_some());
                break;
            }
        }
        assert!(seen_choice, "some seed should let the player win the roll");
    }

    #[test]
    fn test_battle_view_reports_trend() {
        let player = vec![
            def("elder", CardType::Support, 1, 1, Some("sup_elder")),
            def("a", CardType::Attack, 1, 2, None),
        ];
        let opponent = vec![def("o", CardType::Attack, 1, 0, None)];
        let mut session = session_with(instant_config(), &player, &opponent);
        select(&mut session, &["elder", "a"]);
        session.lock_in().expect("lock in");
        let elder = locked_id(&session, "elder");
        session.play_card(elder).expect("play");
        let view = session.battle_view(Side::Player);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].current_attack, 3);
        assert_eq!(view[0].trend, AttackTrend::Above);
    }

    fn locked_id(session: &GameSession, name: &str) -> CardInstanceId {
        session
            .board(Side::Player)
            .locked
            .cards()
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.id())
            .expect("card should be locked")
    }
}
