mod cards;
mod loader;
mod settings;

pub use cards::{CardData, CardsHolder};
pub use loader::{
    load_prepared_levels, load_procedural_settings, ContentLoadError, PreparedLevelFile,
};
pub use settings::{GridSettings, ProceduralLevelSettings, SettingsError, MIN_GRID_SIDE};
