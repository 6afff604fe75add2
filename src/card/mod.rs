pub mod database;
pub mod effects;
pub mod types;

pub use database::{CardCatalog, CatalogError};
pub use effects::{CardFilter, EffectKind, EffectRegistry, EffectSignal, Offering};
pub use types::{
    AttackTrend, CardDefinition, CardInstance, CardInstanceId, CardSubtype, CardType, Location,
    Side,
};
