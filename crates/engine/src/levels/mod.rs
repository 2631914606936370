mod dimensions;
mod grid;
mod level_data;
mod manager;

pub use dimensions::{difficulty_ratio, GridDimensions};
pub use grid::{CardsGrid, GridError};
pub use level_data::{cards_count_for, LevelData};
pub use manager::{LevelManager, FIRST_LEVEL, LEVEL_STORE_KEY};
