use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The three card colors of the duel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Attack,
    Defense,
    Support,
}

/// Card subtypes (tribal tags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSubtype {
    #[default]
    None,
    Tribesmen,
    Spirit,
    Serpent,
}

/// Which seat a card or action belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(&self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => write!(f, "Player"),
            Side::Opponent => write!(f, "Bakunawa"),
        }
    }
}

/// Immutable card definition, loaded once from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: String,
    pub name: String,
    pub card_type: CardType,
    #[serde(default)]
    pub subtype: CardSubtype,
    pub energy_cost: u32,
    pub base_attack: i32,
    #[serde(default)]
    pub effect_id: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub art: Option<String>,
}

/// Identity of one physical card for the lifetime of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardInstanceId(pub u32);

impl fmt::Display for CardInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a card currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Hand,
    Locked,
    Reserve,
    Discard,
    BattleZone,
}

/// How a card's current attack compares with its printed attack, for color-coding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackTrend {
    Equal,
    Above,
    Below,
}

/// A card in play. The definition is shared with the catalog; attack state is
/// only written by the effect resolver.
#[derive(Debug, Clone)]
pub struct CardInstance {
    id: CardInstanceId,
    definition: Arc<CardDefinition>,
    owner: Side,
    location: Location,
    current_attack: i32,
    last_resolved_attack: i32,
}

impl CardInstance {
    pub fn new(id: CardInstanceId, definition: Arc<CardDefinition>, owner: Side) -> Self {
        let base = definition.base_attack;
        CardInstance {
            id,
            definition,
            owner,
            location: Location::Hand,
            current_attack: base,
            last_resolved_attack: base,
        }
    }

    pub fn id(&self) -> CardInstanceId {
        self.id
    }

    pub fn definition(&self) -> &CardDefinition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn card_type(&self) -> CardType {
        self.definition.card_type
    }

    pub fn subtype(&self) -> CardSubtype {
        self.definition.subtype
    }

    pub fn energy_cost(&self) -> u32 {
        self.definition.energy_cost
    }

    pub fn base_attack(&self) -> i32 {
        self.definition.base_attack
    }

    pub fn effect_id(&self) -> Option<&str> {
        self.definition.effect_id.as_deref()
    }

    pub fn owner(&self) -> Side {
        self.owner
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn current_attack(&self) -> i32 {
        self.current_attack
    }

    /// Attack as of the last completed resolution pass
    pub fn last_resolved_attack(&self) -> i32 {
        self.last_resolved_attack
    }

    pub fn trend(&self) -> AttackTrend {
        match self.current_attack.cmp(&self.base_attack()) {
            std::cmp::Ordering::Equal => AttackTrend::Equal,
            std::cmp::Ordering::Greater => AttackTrend::Above,
            std::cmp::Ordering::Less => AttackTrend::Below,
        }
    }

    pub(crate) fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    pub(crate) fn reset_attack(&mut self) {
        self.current_attack = self.base_attack();
    }

    pub(crate) fn modify_attack(&mut self, delta: i32) {
        self.current_attack += delta;
    }

    pub(crate) fn publish_attack(&mut self) {
        self.last_resolved_attack = self.current_attack;
    }
}
