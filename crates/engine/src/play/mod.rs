//! The board the player flips cards on.

mod board;
mod card;

pub use board::{Board, FlipOutcome, MatchSession};
pub use card::{Card, CardState};
