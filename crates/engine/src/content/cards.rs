use serde::{Deserialize, Serialize};
use tracing::{error, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardData {
    pub id: String,
    /// Asset key of the card face, resolved by whatever draws the board.
    pub sprite: String,
}

impl CardData {
    pub fn new(id: impl Into<String>, sprite: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sprite: sprite.into(),
        }
    }
}

/// Ordered card pool. Generation draws entries from the front.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardsHolder {
    cards: Vec<CardData>,
}

impl CardsHolder {
    pub fn new(cards: Vec<CardData>) -> Self {
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[CardData] {
        &self.cards
    }

    pub fn try_get_card(&self, id: &str) -> Option<&CardData> {
        self.cards.iter().find(|card| card.id == id)
    }

    /// Returns the first `count` cards, clamped to the pool size.
    pub fn get_few(&self, count: usize) -> Option<&[CardData]> {
        let mut count = count;
        if count > self.cards.len() {
            warn!(
                requested = count,
                available = self.cards.len(),
                "card_pool_too_small"
            );
            count = self.cards.len();
        }
        if count < 1 {
            error!("card_pool_empty");
            return None;
        }
        Some(&self.cards[..count])
    }
}
