use crate::card::{CardCatalog, CardDefinition, CatalogError};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid deck format at line {line}: {reason}")]
    InvalidFormat { line: usize, reason: String },
    #[error("Card catalog error: {0}")]
    CatalogError(#[from] CatalogError),
    #[error("Deck is empty")]
    Empty,
}

/// Parse a deck file and return the expanded card list
/// Format: "2 bak_fang" per line (id or card name), supports comments with # or //
pub fn parse_deck_file(
    path: &str,
    catalog: &CardCatalog,
) -> Result<Vec<Arc<CardDefinition>>, DeckError> {
    let content = std::fs::read_to_string(path)?;
    parse_deck_str(&content, catalog)
}

pub fn parse_deck_str(
    content: &str,
    catalog: &CardCatalog,
) -> Result<Vec<Arc<CardDefinition>>, DeckError> {
    let mut deck = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
            continue;
        }

        let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
        if parts.len() != 2 {
            return Err(DeckError::InvalidFormat {
                line: line_num + 1,
                reason: "Expected format: 'COUNT CARD_ID'".to_string(),
            });
        }

        let count_str = parts[0];
        let card_key = parts[1].trim();

        let count: usize = count_str.parse().map_err(|_| DeckError::InvalidFormat {
            line: line_num + 1,
            reason: format!("'{}' is not a valid number", count_str),
        })?;

        let card = catalog.get_card(card_key)?;
        for _ in 0..count {
            deck.push(Arc::clone(&card));
        }
    }

    if deck.is_empty() {
        return Err(DeckError::Empty);
    }
    Ok(deck)
}
