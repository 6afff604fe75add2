use crate::card::{CardInstance, CardInstanceId, Offering};
use crate::game::zones::Pile;
use crate::rng::GameRng;
use serde::{Deserialize, Serialize};

/// Iteration orders the Bakunawa uses to fill its energy budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heuristic {
    /// Most expensive first ("tall")
    CostDescending,
    /// Cheapest first ("swarm")
    CostAscending,
    Random,
}

impl Heuristic {
    pub const ALL: [Heuristic; 3] = [
        Heuristic::CostDescending,
        Heuristic::CostAscending,
        Heuristic::Random,
    ];
}

/// Cards committed for a round and how they were picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockPlan {
    pub heuristic: Heuristic,
    /// In lock order; this is also play order
    pub locked: Vec<CardInstanceId>,
    pub energy: u32,
}

/// Walk the cards in order, taking each one that still fits. A card that does not fit is
/// skipped and never retried.
pub fn strict_accumulation<'a>(
    ordered: impl IntoIterator<Item = &'a CardInstance>,
    budget: u32,
) -> (Vec<CardInstanceId>, u32) {
    let mut spent = 0;
    let mut taken = Vec::new();
    for card in ordered {
        let cost = card.energy_cost();
        if spent + cost <= budget {
            taken.push(card.id());
            spent += cost;
        }
    }
    (taken, spent)
}

/// Scripted opponent: picks a fresh heuristic every round
#[derive(Debug, Clone, Default)]
pub struct OpponentStrategy {
    forced: Option<Heuristic>,
}

impl OpponentStrategy {
    pub fn new() -> Self {
        OpponentStrategy { forced: None }
    }

    /// Always use one heuristic
    pub fn forced(heuristic: Heuristic) -> Self {
        OpponentStrategy {
            forced: Some(heuristic),
        }
    }

    fn pick_heuristic(&self, rng: &mut GameRng) -> Heuristic {
        self.forced
            .unwrap_or_else(|| Heuristic::ALL[rng.random_range(Heuristic::ALL.len())])
    }

    /// Choose the locked subset for this round; never exceeds `budget`
    pub fn select_locked_set(
        &self,
        hand: &[CardInstance],
        budget: u32,
        rng: &mut GameRng,
    ) -> LockPlan {
        let heuristic = self.pick_heuristic(rng);
        let mut ordered: Vec<&CardInstance> = hand.iter().collect();
        match heuristic {
            Heuristic::CostDescending => {
                ordered.sort_by(|a, b| b.energy_cost().cmp(&a.energy_cost()))
            }
            Heuristic::CostAscending => {
                ordered.sort_by(|a, b| a.energy_cost().cmp(&b.energy_cost()))
            }
            Heuristic::Random => rng.shuffle(&mut ordered),
        }

        let (locked, energy) = strict_accumulation(ordered, budget);
        log::debug!(
            "Bakunawa locks {} card(s) for {} energy using {:?}",
            locked.len(),
            energy,
            heuristic
        );
        LockPlan {
            heuristic,
            locked,
            energy,
        }
    }

    /// Offering choice, uniformly at random
    pub fn choose_offering(&self, rng: &mut GameRng) -> Offering {
        if rng.coin_flip() {
            Offering::Blessing
        } else {
            Offering::Curse
        }
    }

    /// Next card in lock order; None once the locked pile is empty
    pub fn next_card_to_play(&self, locked: &mut Pile) -> Option<CardInstance> {
        locked.pop_front()
    }
}
