use crate::card::effects::{EffectKind, EffectRegistry};
use crate::card::types::CardDefinition;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// The catalog shipped with the game
const BUILTIN_CATALOG: &str = include_str!("../../cards.json");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Card not found: {0}")]
    CardNotFound(String),
    #[error("Duplicate card id: {0}")]
    DuplicateCard(String),
    #[error("Card {card} references unknown effect '{effect}'")]
    UnknownEffect { card: String, effect: String },
    #[error("Invalid card data: {0}")]
    InvalidCard(String),
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    effects: HashMap<String, Vec<EffectKind>>,
    cards: Vec<CardDefinition>,
}

/// Card catalog: immutable definitions plus the effect registry they point into
pub struct CardCatalog {
    cards: HashMap<String, Arc<CardDefinition>>,
    order: Vec<String>,
    registry: EffectRegistry,
}

impl CardCatalog {
    /// Load a catalog from a JSON file
    pub fn from_file(path: &str) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// The catalog compiled into the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    /// Parse a catalog. File effects are layered over the standard registry.
    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(content)?;

        let mut registry = EffectRegistry::standard();
        registry.merge(file.effects);

        let mut cards = HashMap::new();
        let mut order = Vec::with_capacity(file.cards.len());
        for card in file.cards {
            let id = card.id.clone();
            if cards.insert(id.clone(), Arc::new(card)).is_some() {
                return Err(CatalogError::DuplicateCard(id));
            }
            order.push(id);
        }

        Ok(CardCatalog {
            cards,
            order,
            registry,
        })
    }

    /// Get a card by id, falling back to a case-insensitive name match
    pub fn get_card(&self, key: &str) -> Result<Arc<CardDefinition>, CatalogError> {
        if let Some(card) = self.cards.get(key) {
            return Ok(Arc::clone(card));
        }
        self.cards
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(key))
            .cloned()
            .ok_or_else(|| CatalogError::CardNotFound(key.to_string()))
    }

    /// All definitions in file order
    pub fn cards(&self) -> Vec<Arc<CardDefinition>> {
        self.order
            .iter()
            .filter_map(|id| self.cards.get(id).cloned())
            .collect()
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    /// Check that the catalog is usable and every effect reference resolves
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.cards.is_empty() {
            return Err(CatalogError::InvalidCard("No cards loaded".to_string()));
        }
        for id in &self.order {
            let Some(card) = self.cards.get(id) else {
                continue;
            };
            if card.base_attack < 0 {
                return Err(CatalogError::InvalidCard(format!(
                    "{} has negative base attack",
                    card.id
                )));
            }
            if let Some(effect) = &card.effect_id {
                if !self.registry.contains(effect) {
                    return Err(CatalogError::UnknownEffect {
                        card: card.id.clone(),
                        effect: effect.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::types::CardType;

    #[test]
    fn test_load_cards() {
        let db = CardCatalog::from_file("cards.json").expect("Failed to load cards");
        assert!(db.card_count() > 0, "Should have loaded cards");
        db.validate().expect("shipped catalog should validate");
    }

    #[test]
    fn test_builtin_matches_file() {
        let file = CardCatalog::from_file("cards.json").expect("Failed to load cards");
        let builtin = CardCatalog::builtin().expect("builtin catalog should parse");
        assert_eq!(file.card_count(), builtin.card_count());
    }

    #[test]
    fn test_get_card_by_id_and_name() {
        let db = CardCatalog::builtin().expect("builtin catalog should parse");
        let by_id = db.get_card("atk_datu").expect("atk_datu should exist");
        let by_name = db.get_card(&by_id.name.to_uppercase()).expect("name lookup should work");
        assert_eq!(by_id.id, by_name.id);
        assert_eq!(by_id.card_type, CardType::Attack);
    }

    #[test]
    fn test_card_not_found() {
        let db = CardCatalog::builtin().expect("builtin catalog should parse");
        assert!(matches!(
            db.get_card("Nonexistent Card"),
            Err(CatalogError::CardNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{"cards": [
            {"id": "a", "name": "A", "card_type": "attack", "energy_cost": 1, "base_attack": 1},
            {"id": "a", "name": "B", "card_type": "attack", "energy_cost": 1, "base_attack": 1}
        ]}"#;
        assert!(matches!(
            CardCatalog::from_json_str(json),
            Err(CatalogError::DuplicateCard(_))
        ));
    }

    #[test]
    fn test_validate_reports_unknown_effect() {
        let json = r#"{"cards": [
            {"id": "a", "name": "A", "card_type": "attack", "energy_cost": 1, "base_attack": 1, "effect_id": "nope"}
        ]}"#;
        let db = CardCatalog::from_json_str(json).expect("catalog should parse");
        assert!(matches!(db.validate(), Err(CatalogError::UnknownEffect { .. })));
    }

    #[test]
    fn test_file_effects_extend_registry() {
        let json = r#"{
            "effects": {"custom": [{"kind": "flat_buff", "bonus": 9}]},
            "cards": [{"id": "a", "name": "A", "card_type": "support", "energy_cost": 1, "base_attack": 0, "effect_id": "custom"}]
        }"#;
        let db = CardCatalog::from_json_str(json).expect("catalog should parse");
        assert!(db.registry().contains("custom"));
        assert!(db.registry().contains("atk_datu"));
        db.validate().expect("custom effect should resolve");
    }
}
