use crate::content::CardData;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CardState {
    #[default]
    Closed,
    Open,
    Matched,
}

/// One face-down card on the board, placed at its grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    id: String,
    sprite: String,
    row: u32,
    column: u32,
    state: CardState,
}

impl Card {
    pub fn new(data: &CardData, row: u32, column: u32) -> Self {
        Self {
            id: data.id.clone(),
            sprite: data.sprite.clone(),
            row,
            column,
            state: CardState::Closed,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sprite(&self) -> &str {
        &self.sprite
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn state(&self) -> CardState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == CardState::Closed
    }

    pub fn is_matched(&self) -> bool {
        self.state == CardState::Matched
    }

    /// Opens a closed card. Open and matched cards ignore the click.
    pub fn open(&mut self) -> bool {
        if !self.is_closed() {
            return false;
        }
        self.state = CardState::Open;
        true
    }

    pub fn close(&mut self) {
        if self.state == CardState::Open {
            self.state = CardState::Closed;
        }
    }

    pub(crate) fn mark_matched(&mut self) {
        self.state = CardState::Matched;
    }
}
