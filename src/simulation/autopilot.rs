use crate::card::{CardInstance, CardInstanceId, Offering};
use crate::game::opponent::strict_accumulation;
use crate::game::{Pile, TurnOrder};

/// Scripted stand-in for the human side in headless games
#[derive(Debug, Clone, Default)]
pub struct Autopilot;

impl Autopilot {
    pub fn new() -> Self {
        Autopilot
    }

    /// Best attack per energy first, filled with the same skip-and-continue rule the
    /// Bakunawa uses. Free cards always come first.
    pub fn select(&self, hand: &[CardInstance], budget: u32) -> Vec<CardInstanceId> {
        let mut ordered: Vec<&CardInstance> = hand.iter().collect();
        ordered.sort_by(|a, b| efficiency(b).total_cmp(&efficiency(a)));
        let (picked, _) = strict_accumulation(ordered, budget);
        picked
    }

    /// Blessing unless the hand has nothing to buff
    pub fn choose_offering(&self, selected: usize) -> Offering {
        if selected <= 1 {
            Offering::Curse
        } else {
            Offering::Blessing
        }
    }

    /// Winning the roll always means going first
    pub fn choose_turn_order(&self) -> TurnOrder {
        TurnOrder::PlayerFirst
    }

    /// Locked cards go out in lock order
    pub fn next_card(&self, locked: &Pile) -> Option<CardInstanceId> {
        locked.front().map(|c| c.id())
    }
}

fn efficiency(card: &CardInstance) -> f64 {
    match card.energy_cost() {
        0 => f64::INFINITY,
        cost => card.base_attack() as f64 / cost as f64,
    }
}
