use crate::card::types::{CardInstance, CardSubtype, CardType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which cards a conditional effect looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum CardFilter {
    Type(CardType),
    Subtype(CardSubtype),
}

impl CardFilter {
    pub fn matches(&self, card: &CardInstance) -> bool {
        match self {
            CardFilter::Type(t) => card.card_type() == *t,
            CardFilter::Subtype(s) => card.subtype() == *s,
        }
    }
}

/// Out-of-band game-state requests raised by a card instead of an attack delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSignal {
    /// Show the opponent's still-locked cards
    RevealOpponent,
    /// Send one random card from the opponent's reserve pile to its discard pile
    DiscardOpponentReserve,
    /// Return this card to its owner's hand at cleanup if its side loses the round
    RetrieveOnLoss,
}

/// The buff-or-debuff choice offered by offering cards, made once per round per side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Offering {
    #[default]
    Blessing,
    Curse,
}

/// One numeric or signalling rule. An effect id maps to an ordered list of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectKind {
    /// +per_type for every distinct card type among own played cards
    DiversityBuff { per_type: i32 },
    /// Flat bonus when any own played card matches
    PresenceBuff { filter: CardFilter, bonus: i32 },
    /// +per_card for every own played card of the subtype
    SubtypeCountBuff { subtype: CardSubtype, per_card: i32 },
    /// Bonus only when this card sits at the given play index
    PositionalBuff { index: usize, bonus: i32 },
    /// +per_card for every own played card, once at least min_count are down
    CountScalingBuff {
        per_card: i32,
        #[serde(default)]
        min_count: usize,
    },
    /// Unconditional bonus to this card
    FlatBuff { bonus: i32 },
    /// Adds amount to every own played card, this one included
    GlobalBuffAll { amount: i32 },
    /// Adds amount to own cards played after this one, optionally only the next max_targets
    ForwardBuff {
        amount: i32,
        #[serde(default)]
        max_targets: Option<usize>,
    },
    /// +per_card for every card the opponent has played
    OpponentCountBuff { per_card: i32 },
    /// Bonus once the round number is past after_round
    RoundGatedBuff { after_round: u32, bonus: i32 },
    /// Adds flat + per_card * own played count to the debuff against the opponent
    SideDebuff {
        #[serde(default)]
        flat: i32,
        #[serde(default)]
        per_card: i32,
    },
    /// Resolves against the side's offering choice for the round
    Offering { buff_all: i32, debuff: i32 },
    /// No attack change; raises a signal for the session
    Signal { signal: EffectSignal },
}

/// Registry for looking up effect rules by effect id
#[derive(Debug, Clone)]
pub struct EffectRegistry {
    effects: HashMap<String, Vec<EffectKind>>,
}

impl EffectRegistry {
    /// Create a registry with no entries
    pub fn empty() -> Self {
        EffectRegistry {
            effects: HashMap::new(),
        }
    }

    /// Create a registry holding every standard effect
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register_standard_effects();
        registry
    }

    fn register_standard_effects(&mut self) {
        use EffectKind::*;

        // Attack cards
        self.register("atk_bayanihan", vec![DiversityBuff { per_type: 2 }]);
        self.register(
            "atk_mayari",
            vec![PresenceBuff {
                filter: CardFilter::Type(CardType::Support),
                bonus: 3,
            }],
        );
        self.register(
            "atk_sandugo",
            vec![SubtypeCountBuff {
                subtype: CardSubtype::Tribesmen,
                per_card: 1,
            }],
        );
        self.register("atk_datu", vec![PositionalBuff { index: 0, bonus: 2 }]);
        self.register("atk_matulis", vec![]);
        self.register("atk_bagani", vec![OpponentCountBuff { per_card: 1 }]);

        // Defense cards
        self.register("def_palayok", vec![SideDebuff { flat: 5, per_card: 0 }]);
        self.register(
            "def_agong",
            vec![
                SideDebuff { flat: 3, per_card: 0 },
                Signal {
                    signal: EffectSignal::RetrieveOnLoss,
                },
            ],
        );
        self.register("def_sigaw", vec![SideDebuff { flat: 0, per_card: 1 }]);
        self.register("def_kalasag", vec![SideDebuff { flat: 2, per_card: 0 }]);
        self.register("def_anito", vec![SideDebuff { flat: 2, per_card: 0 }]);

        // Support cards
        self.register(
            "sup_blessing",
            vec![CountScalingBuff {
                per_card: 2,
                min_count: 0,
            }],
        );
        self.register(
            "sup_alay",
            vec![Offering {
                buff_all: 4,
                debuff: 6,
            }],
        );
        self.register(
            "sup_kudyapi",
            vec![CountScalingBuff {
                per_card: 1,
                min_count: 3,
            }],
        );
        self.register(
            "sup_gabayan",
            vec![Signal {
                signal: EffectSignal::RevealOpponent,
            }],
        );
        self.register("sup_elder", vec![FlatBuff { bonus: 2 }]);
        self.register(
            "sup_babaylan",
            vec![ForwardBuff {
                amount: 2,
                max_targets: Some(2),
            }],
        );

        // Bakunawa's own cards
        self.register(
            "bak_eclipse",
            vec![RoundGatedBuff {
                after_round: 3,
                bonus: 4,
            }],
        );
        self.register(
            "bak_tide",
            vec![
                SideDebuff { flat: 1, per_card: 0 },
                Signal {
                    signal: EffectSignal::DiscardOpponentReserve,
                },
            ],
        );
        self.register("bak_hunger", vec![GlobalBuffAll { amount: 1 }]);
    }

    /// Register (or replace) the rules for an effect id
    pub fn register(&mut self, effect_id: &str, kinds: Vec<EffectKind>) {
        self.effects.insert(effect_id.to_string(), kinds);
    }

    /// Get the rules for an effect id
    pub fn get(&self, effect_id: &str) -> Option<&[EffectKind]> {
        self.effects.get(effect_id).map(|k| k.as_slice())
    }

    pub fn contains(&self, effect_id: &str) -> bool {
        self.effects.contains_key(effect_id)
    }

    /// Copy every entry of `other` over this registry
    pub fn merge(&mut self, other: HashMap<String, Vec<EffectKind>>) {
        self.effects.extend(other);
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
