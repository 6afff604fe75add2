use crate::card::{CardInstance, CardInstanceId, Location, Side};
use crate::rng::GameRng;
use thiserror::Error;

/// Pile-transfer bugs: a card lost, duplicated, or mis-tagged
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("{side} card {card} is missing from every pile")]
    CardLost { side: Side, card: CardInstanceId },
    #[error("{side} card {card} appears in more than one place")]
    CardDuplicated { side: Side, card: CardInstanceId },
    #[error("{side} card {card} is not part of the side's pool")]
    ForeignCard { side: Side, card: CardInstanceId },
    #[error("{side} card {card} sits in {actual:?} but is tagged {tagged:?}")]
    LocationMismatch {
        side: Side,
        card: CardInstanceId,
        actual: Location,
        tagged: Location,
    },
}

/// An ordered pile of cards. Every card pushed in is re-tagged with the pile's location.
#[derive(Debug, Clone)]
pub struct Pile {
    location: Location,
    cards: Vec<CardInstance>,
}

impl Pile {
    pub fn new(location: Location) -> Self {
        Pile {
            location,
            cards: Vec::new(),
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn push(&mut self, mut card: CardInstance) {
        card.set_location(self.location);
        self.cards.push(card);
    }

    pub fn extend(&mut self, cards: impl IntoIterator<Item = CardInstance>) {
        for card in cards {
            self.push(card);
        }
    }

    /// Remove a card by identity
    pub fn remove(&mut self, id: CardInstanceId) -> Option<CardInstance> {
        let index = self.cards.iter().position(|c| c.id() == id)?;
        Some(self.cards.remove(index))
    }

    pub fn pop_front(&mut self) -> Option<CardInstance> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.cards.remove(0))
        }
    }

    pub fn front(&self) -> Option<&CardInstance> {
        self.cards.first()
    }

    /// Empty the pile, keeping order
    pub fn take_all(&mut self) -> Vec<CardInstance> {
        std::mem::take(&mut self.cards)
    }

    pub fn get(&self, id: CardInstanceId) -> Option<&CardInstance> {
        self.cards.iter().find(|c| c.id() == id)
    }

    pub fn contains(&self, id: CardInstanceId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn shuffle(&mut self, rng: &mut GameRng) {
        rng.shuffle(&mut self.cards);
    }

    pub fn total_cost(&self) -> u32 {
        self.cards.iter().map(|c| c.energy_cost()).sum()
    }

    pub fn cards(&self) -> &[CardInstance] {
        &self.cards
    }

    pub(crate) fn cards_mut(&mut self) -> &mut [CardInstance] {
        &mut self.cards
    }

    pub fn ids(&self) -> Vec<CardInstanceId> {
        self.cards.iter().map(|c| c.id()).collect()
    }
}

/// Everything one side owns: its five piles and the pool they must always add up to
#[derive(Debug, Clone)]
pub struct SideBoard {
    side: Side,
    pub hand: Pile,
    pub locked: Pile,
    pub reserve: Pile,
    pub discard: Pile,
    pub battle: Pile,
    pool: Vec<CardInstanceId>,
}

impl SideBoard {
    /// Deal the whole pool into the hand
    pub fn new(side: Side, cards: Vec<CardInstance>) -> Self {
        let mut pool: Vec<CardInstanceId> = cards.iter().map(|c| c.id()).collect();
        pool.sort();
        let mut hand = Pile::new(Location::Hand);
        hand.extend(cards);
        SideBoard {
            side,
            hand,
            locked: Pile::new(Location::Locked),
            reserve: Pile::new(Location::Reserve),
            discard: Pile::new(Location::Discard),
            battle: Pile::new(Location::BattleZone),
            pool,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn pile(&self, location: Location) -> &Pile {
        match location {
            Location::Hand => &self.hand,
            Location::Locked => &self.locked,
            Location::Reserve => &self.reserve,
            Location::Discard => &self.discard,
            Location::BattleZone => &self.battle,
        }
    }

    pub fn pile_mut(&mut self, location: Location) -> &mut Pile {
        match location {
            Location::Hand => &mut self.hand,
            Location::Locked => &mut self.locked,
            Location::Reserve => &mut self.reserve,
            Location::Discard => &mut self.discard,
            Location::BattleZone => &mut self.battle,
        }
    }

    /// Move a card between piles; returns false if it was not in `from`
    pub fn move_card(&mut self, id: CardInstanceId, from: Location, to: Location) -> bool {
        match self.pile_mut(from).remove(id) {
            Some(card) => {
                self.pile_mut(to).push(card);
                true
            }
            None => false,
        }
    }

    /// Move every card of one pile onto the end of another
    pub fn move_all(&mut self, from: Location, to: Location) {
        let cards = self.pile_mut(from).take_all();
        self.pile_mut(to).extend(cards);
    }

    /// Find which pile holds a card
    pub fn locate(&self, id: CardInstanceId) -> Option<Location> {
        ALL_LOCATIONS
            .iter()
            .copied()
            .find(|loc| self.pile(*loc).contains(id))
    }

    pub fn find(&self, id: CardInstanceId) -> Option<&CardInstance> {
        ALL_LOCATIONS.iter().find_map(|loc| self.pile(*loc).get(id))
    }

    /// The piles together hold exactly the pool, and every card's tag names its pile
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        let mut seen = Vec::with_capacity(self.pool.len());
        for location in ALL_LOCATIONS {
            for card in self.pile(location).cards() {
                if card.owner() != self.side {
                    return Err(InvariantViolation::ForeignCard {
                        side: self.side,
                        card: card.id(),
                    });
                }
                if card.location() != location {
                    return Err(InvariantViolation::LocationMismatch {
                        side: self.side,
                        card: card.id(),
                        actual: location,
                        tagged: card.location(),
                    });
                }
                seen.push(card.id());
            }
        }
        seen.sort();

        for pair in seen.windows(2) {
            if pair[0] == pair[1] {
                return Err(InvariantViolation::CardDuplicated {
                    side: self.side,
                    card: pair[0],
                });
            }
        }
        if let Some(card) = seen.iter().find(|id| self.pool.binary_search(id).is_err()) {
            return Err(InvariantViolation::ForeignCard {
                side: self.side,
                card: *card,
            });
        }
        if let Some(card) = self.pool.iter().find(|id| seen.binary_search(id).is_err()) {
            return Err(InvariantViolation::CardLost {
                side: self.side,
                card: *card,
            });
        }
        Ok(())
    }
}

pub const ALL_LOCATIONS: [Location; 5] = [
    Location::Hand,
    Location::Locked,
    Location::Reserve,
    Location::Discard,
    Location::BattleZone,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardDefinition, CardType};
    use std::sync::Arc;

    fn cards(n: u32) -> Vec<CardInstance> {
        let def = Arc::new(CardDefinition {
            id: "c".to_string(),
            name: "C".to_string(),
            card_type: CardType::Attack,
            subtype: Default::default(),
            energy_cost: 2,
            base_attack: 1,
            effect_id: None,
            description: String::new(),
            art: None,
        });
        (0..n)
            .map(|i| CardInstance::new(CardInstanceId(i), Arc::clone(&def), Side::Player))
            .collect()
    }

    #[test]
    fn test_new_board_deals_pool_into_hand() {
        let board = SideBoard::new(Side::Player, cards(4));
        assert_eq!(board.hand.len(), 4);
        assert!(board.hand.cards().iter().all(|c| c.location() == Location::Hand));
        assert_eq!(board.verify(), Ok(()));
    }

    #[test]
    fn test_move_card_retags_and_conserves() {
        let mut board = SideBoard::new(Side::Player, cards(4));
        assert!(board.move_card(CardInstanceId(2), Location::Hand, Location::Locked));
        assert_eq!(board.locate(CardInstanceId(2)), Some(Location::Locked));
        assert_eq!(
            board.find(CardInstanceId(2)).map(|c| c.location()),
            Some(Location::Locked)
        );
        assert!(!board.move_card(CardInstanceId(2), Location::Hand, Location::Discard));
        assert_eq!(board.verify(), Ok(()));
    }

    #[test]
    fn test_move_all_keeps_order() {
        let mut board = SideBoard::new(Side::Player, cards(3));
        board.move_all(Location::Hand, Location::Reserve);
        assert!(board.hand.is_empty());
        assert_eq!(
            board.reserve.ids(),
            vec![CardInstanceId(0), CardInstanceId(1), CardInstanceId(2)]
        );
        assert_eq!(board.verify(), Ok(()));
    }

    #[test]
    fn test_verify_detects_lost_card() {
        let mut board = SideBoard::new(Side::Player, cards(3));
        board.hand.remove(CardInstanceId(1));
        assert_eq!(
            board.verify(),
            Err(InvariantViolation::CardLost {
                side: Side::Player,
                card: CardInstanceId(1)
            })
        );
    }

    #[test]
    fn test_verify_detects_duplicate() {
        let mut board = SideBoard::new(Side::Player, cards(2));
        let copy = board.hand.cards()[0].clone();
        board.discard.push(copy);
        assert!(matches!(
            board.verify(),
            Err(InvariantViolation::CardDuplicated { .. })
        ));
    }

    #[test]
    fn test_verify_detects_location_mismatch() {
        let mut board = SideBoard::new(Side::Player, cards(2));
        board.hand.cards_mut()[0].set_location(Location::Discard);
        assert!(matches!(
            board.verify(),
            Err(InvariantViolation::LocationMismatch { .. })
        ));
    }

    #[test]
    fn test_verify_detects_card_owned_by_other_side() {
        let board = SideBoard::new(Side::Opponent, cards(2));
        assert_eq!(
            board.verify(),
            Err(InvariantViolation::ForeignCard {
                side: Side::Opponent,
                card: CardInstanceId(0)
            })
        );
    }

    #[test]
    fn test_pile_total_cost_and_pop_front() {
        let mut pile = Pile::new(Location::Locked);
        pile.extend(cards(3));
        assert_eq!(pile.total_cost(), 6);
        assert_eq!(pile.pop_front().map(|c| c.id()), Some(CardInstanceId(0)));
        assert_eq!(pile.len(), 2);
    }
}
