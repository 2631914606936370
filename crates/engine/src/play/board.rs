use tracing::{debug, info, warn};

use crate::app::SoundCue;
use crate::content::CardsHolder;
use crate::levels::LevelData;

use super::card::{Card, CardState};

/// Cards instantiated from a level, in layout order: columns outer, rows
/// inner. Cells whose id is empty or unknown to the pool get no card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    level: u32,
    columns: u32,
    rows: u32,
    cards: Vec<Card>,
}

impl Board {
    pub fn from_level(level: &LevelData, holder: &CardsHolder) -> Self {
        let mut cards = Vec::with_capacity(level.grid().len());
        let mut skipped = 0usize;
        for column in 0..level.columns_count() {
            for row in 0..level.rows_count() {
                let Some(data) = level
                    .card_id(row, column)
                    .and_then(|id| holder.try_get_card(id))
                else {
                    skipped += 1;
                    continue;
                };
                cards.push(Card::new(data, row, column));
            }
        }
        if skipped > 0 {
            debug!(level_number = level.level(), skipped, "board_cells_without_card");
        }
        Self {
            level: level.level(),
            columns: level.columns_count(),
            rows: level.rows_count(),
            cards,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn card_at(&self, row: u32, column: u32) -> Option<usize> {
        self.cards
            .iter()
            .position(|card| card.row() == row && card.column() == column)
    }

    pub fn matched_count(&self) -> usize {
        self.cards.iter().filter(|card| card.is_matched()).count()
    }

    pub fn is_cleared(&self) -> bool {
        self.cards.iter().all(Card::is_matched)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// The card was open, matched, or not on the board.
    Ignored,
    Opened(usize),
    Matched(usize, usize),
    Mismatched(usize, usize),
    /// The final pair matched.
    Completed(usize, usize),
}

impl FlipOutcome {
    pub fn sound_cues(self) -> Vec<SoundCue> {
        match self {
            FlipOutcome::Ignored => Vec::new(),
            FlipOutcome::Opened(_) => vec![SoundCue::CardFlip],
            FlipOutcome::Matched(..) => vec![SoundCue::CardFlip, SoundCue::MatchCorrect],
            FlipOutcome::Mismatched(..) => vec![SoundCue::CardFlip, SoundCue::MatchIncorrect],
            FlipOutcome::Completed(..) => vec![
                SoundCue::CardFlip,
                SoundCue::MatchCorrect,
                SoundCue::LevelWin,
            ],
        }
    }
}

/// Pairs flips on a [`Board`]. A mismatched pair stays open until
/// [`MatchSession::close_mismatched`] runs or the next card is flipped.
#[derive(Debug, Clone)]
pub struct MatchSession {
    board: Board,
    first_open: Option<usize>,
    mismatched: Option<(usize, usize)>,
    moves: u32,
}

impl MatchSession {
    pub fn new(board: Board) -> Self {
        if board.len() % 2 != 0 {
            warn!(level_number = board.level(), cards = board.len(), "board_has_odd_card_count");
        }
        Self {
            board,
            first_open: None,
            mismatched: None,
            moves: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    /// Number of completed pair attempts.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn has_mismatch(&self) -> bool {
        self.mismatched.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.board.is_cleared()
    }

    pub fn flip(&mut self, index: usize) -> FlipOutcome {
        if self.is_complete() {
            return FlipOutcome::Ignored;
        }
        if self.board.cards.get(index).map(Card::state) != Some(CardState::Closed) {
            return FlipOutcome::Ignored;
        }
        self.close_mismatched();
        self.board.cards[index].open();

        let Some(first) = self.first_open.take() else {
            self.first_open = Some(index);
            return FlipOutcome::Opened(index);
        };

        self.moves += 1;
        if self.board.cards[first].id() != self.board.cards[index].id() {
            self.mismatched = Some((first, index));
            return FlipOutcome::Mismatched(first, index);
        }

        self.board.cards[first].mark_matched();
        self.board.cards[index].mark_matched();
        if self.is_complete() {
            info!(
                level_number = self.board.level(),
                moves = self.moves,
                "level_cleared"
            );
            return FlipOutcome::Completed(first, index);
        }
        FlipOutcome::Matched(first, index)
    }

    /// Closes the pending mismatched pair. Returns false when there was none.
    pub fn close_mismatched(&mut self) -> bool {
        let Some((first, second)) = self.mismatched.take() else {
            return false;
        };
        self.board.cards[first].close();
        self.board.cards[second].close();
        true
    }
}
