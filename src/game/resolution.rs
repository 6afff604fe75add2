//! Effect resolution.
//!
//! Every call starts from printed attack and replays each played card's rules in
//! play order, so resolving the same board twice gives the same numbers. Signals
//! are the exception: a round-scoped ledger lets each source raise a signal once
//! per round no matter how often the board is resolved.

use crate::card::{
    CardInstance, CardInstanceId, EffectKind, EffectRegistry, EffectSignal, Offering, Side,
};
use std::collections::{BTreeSet, HashSet};

/// Round-level inputs some effects read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionContext {
    pub round: u32,
    pub offering: Offering,
}

/// A signal raised for the first time this round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalEvent {
    pub side: Side,
    pub source: CardInstanceId,
    pub signal: EffectSignal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardDelta {
    pub card: CardInstanceId,
    pub delta: i32,
}

/// Result of resolving one side's played cards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideResolution {
    /// current minus base attack, in play order
    pub per_card_delta: Vec<CardDelta>,
    pub debuff_to_opponent: i32,
    pub signals: Vec<SignalEvent>,
}

impl SideResolution {
    pub fn delta_of(&self, card: CardInstanceId) -> Option<i32> {
        self.per_card_delta
            .iter()
            .find(|d| d.card == card)
            .map(|d| d.delta)
    }
}

/// Interprets the effect registry against a board
pub struct EffectEngine {
    registry: EffectRegistry,
    consumed: HashSet<(CardInstanceId, EffectSignal)>,
}

impl EffectEngine {
    pub fn new(registry: EffectRegistry) -> Self {
        EffectEngine {
            registry,
            consumed: HashSet::new(),
        }
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    /// Forget which signals fired; called once at the start of every round
    pub fn begin_round(&mut self) {
        self.consumed.clear();
    }

    /// Recompute attack for `played` (in play order) against the opponent's played cards.
    /// Only cards in `played` are written.
    pub fn resolve_side(
        &mut self,
        side: Side,
        played: &mut [CardInstance],
        opponent: &[CardInstance],
        ctx: ResolutionContext,
    ) -> SideResolution {
        for card in played.iter_mut() {
            card.reset_attack();
        }

        let mut result = SideResolution::default();

        for i in 0..played.len() {
            let Some(effect_id) = played[i].effect_id().map(str::to_string) else {
                continue;
            };
            let Some(kinds) = self.registry.get(&effect_id).map(<[EffectKind]>::to_vec) else {
                log::warn!(
                    "{} plays {} with unknown effect '{}', treating as no effect",
                    side,
                    played[i].name(),
                    effect_id
                );
                continue;
            };

            for kind in &kinds {
                self.apply(side, i, kind, played, opponent, ctx, &mut result);
            }
        }

        for card in played.iter_mut() {
            card.publish_attack();
            result.per_card_delta.push(CardDelta {
                card: card.id(),
                delta: card.current_attack() - card.base_attack(),
            });
        }

        result
    }

    #[allow(clippy::too_many_arguments)]
    fn apply(
        &mut self,
        side: Side,
        i: usize,
        kind: &EffectKind,
        played: &mut [CardInstance],
        opponent: &[CardInstance],
        ctx: ResolutionContext,
        result: &mut SideResolution,
    ) {
        let count = played.len() as i32;
        match kind {
            EffectKind::DiversityBuff { per_type } => {
                let types: BTreeSet<_> = played.iter().map(|c| c.card_type()).collect();
                played[i].modify_attack(types.len() as i32 * per_type);
            }
            EffectKind::PresenceBuff { filter, bonus } => {
                if played.iter().any(|c| filter.matches(c)) {
                    played[i].modify_attack(*bonus);
                }
            }
            EffectKind::SubtypeCountBuff { subtype, per_card } => {
                let n = played.iter().filter(|c| c.subtype() == *subtype).count() as i32;
                played[i].modify_attack(n * per_card);
            }
            EffectKind::PositionalBuff { index, bonus } => {
                if i == *index {
                    played[i].modify_attack(*bonus);
                }
            }
            EffectKind::CountScalingBuff {
                per_card,
                min_count,
            } => {
                if played.len() >= *min_count {
                    played[i].modify_attack(count * per_card);
                }
            }
            EffectKind::FlatBuff { bonus } => played[i].modify_attack(*bonus),
            EffectKind::GlobalBuffAll { amount } => {
                for card in played.iter_mut() {
                    card.modify_attack(*amount);
                }
            }
            EffectKind::ForwardBuff {
                amount,
                max_targets,
            } => {
                let later = &mut played[i + 1..];
                let n = max_targets.unwrap_or(later.len()).min(later.len());
                for card in later[..n].iter_mut() {
                    card.modify_attack(*amount);
                }
            }
            EffectKind::OpponentCountBuff { per_card } => {
                played[i].modify_attack(opponent.len() as i32 * per_card);
            }
            EffectKind::RoundGatedBuff { after_round, bonus } => {
                if ctx.round > *after_round {
                    played[i].modify_attack(*bonus);
                }
            }
            EffectKind::SideDebuff { flat, per_card } => {
                result.debuff_to_opponent += flat + per_card * count;
            }
            EffectKind::Offering { buff_all, debuff } => match ctx.offering {
                Offering::Blessing => {
                    for card in played.iter_mut() {
                        card.modify_attack(*buff_all);
                    }
                }
                Offering::Curse => result.debuff_to_opponent += debuff,
            },
            EffectKind::Signal { signal } => {
                let source = played[i].id();
                if self.consumed.insert((source, *signal)) {
                    result.signals.push(SignalEvent {
                        side,
                        source,
                        signal: *signal,
                    });
                }
            }
        }
    }
}
