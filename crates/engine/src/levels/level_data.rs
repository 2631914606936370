use rand::Rng;
use tracing::{error, info};

use crate::content::ProceduralLevelSettings;

use super::dimensions::{difficulty_ratio, lerp, round_to_u32, GridDimensions};
use super::grid::{CardsGrid, GridError};

/// Fewest distinct cards a generated level uses.
const MIN_CARD_TYPES: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelData {
    level: u32,
    grid: CardsGrid,
}

impl LevelData {
    pub fn new(level: u32, grid: CardsGrid) -> Self {
        Self { level, grid }
    }

    pub fn empty(level: u32, dimensions: GridDimensions) -> Self {
        Self::new(level, CardsGrid::new(dimensions))
    }

    /// Sizes the grid from the level's difficulty, fills it with pairs from
    /// the front of the card pool and shuffles it with `rng`.
    pub fn generate<R: Rng + ?Sized>(
        level: u32,
        settings: &ProceduralLevelSettings,
        rng: &mut R,
    ) -> Self {
        let difficulty = difficulty_ratio(level, settings.maximum_level);
        let dimensions = GridDimensions::for_difficulty(difficulty, &settings.grid_settings);
        let mut grid = CardsGrid::new(dimensions);

        let cards_count = cards_count_for(dimensions, difficulty);
        match settings.cards.get_few(cards_count) {
            Some(cards) => grid.update_grid(cards, rng),
            None => error!(level_number = level, "level_generated_without_cards"),
        }

        let level_data = Self::new(level, grid);
        info!(
            level_number = level,
            difficulty,
            columns = dimensions.columns,
            rows = dimensions.rows,
            card_types = level_data.cards_type_count(),
            "level_generated"
        );
        level_data
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.grid.dimensions()
    }

    pub fn columns_count(&self) -> u32 {
        self.grid.columns()
    }

    pub fn rows_count(&self) -> u32 {
        self.grid.rows()
    }

    pub fn grid(&self) -> &CardsGrid {
        &self.grid
    }

    pub fn card_id(&self, row: u32, column: u32) -> Option<&str> {
        self.grid.get(row, column)
    }

    pub fn set_card_id(
        &mut self,
        row: u32,
        column: u32,
        value: Option<String>,
    ) -> Result<(), GridError> {
        self.grid.set(row, column, value)
    }

    pub fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    /// Editor resize: a grid whose shape changes starts over empty.
    pub fn resize(&mut self, dimensions: GridDimensions) -> bool {
        self.grid.resize(dimensions)
    }

    pub fn cards_type_count(&self) -> usize {
        self.grid.card_types_count()
    }
}

/// Distinct cards for a grid: from two at the easiest level up to one per
/// pair at the hardest.
pub fn cards_count_for(dimensions: GridDimensions, difficulty: f32) -> usize {
    let pairs = dimensions.pair_count() as f32;
    round_to_u32(lerp(MIN_CARD_TYPES, pairs.max(MIN_CARD_TYPES), difficulty)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{CardData, CardsHolder, GridSettings};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn settings(pool_size: usize) -> ProceduralLevelSettings {
        ProceduralLevelSettings {
            maximum_level: 10,
            grid_settings: GridSettings {
                maximum_columns: 6,
                maximum_rows: 6,
                minimum_columns: 2,
                minimum_rows: 2,
            },
            cards: CardsHolder::new(
                (0..pool_size)
                    .map(|index| CardData::new(format!("card_{index}"), format!("cards/{index}")))
                    .collect(),
            ),
        }
    }

    #[test]
    fn cards_count_scales_from_two_to_all_pairs() {
        let dimensions = GridDimensions::new(6, 6);
        assert_eq!(cards_count_for(dimensions, 0.0), 2);
        assert_eq!(cards_count_for(dimensions, 1.0), 18);
        assert_eq!(cards_count_for(dimensions, 0.5), 10);
        assert_eq!(cards_count_for(GridDimensions::new(2, 2), 1.0), 2);
    }

    #[test]
    fn first_level_is_small_and_uses_two_card_types() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let level = LevelData::generate(1, &settings(20), &mut rng);
        // 2 + 4 * 0.1 = 2.4 -> 2 on both axes.
        assert_eq!(level.dimensions(), GridDimensions::new(2, 2));
        assert_eq!(level.cards_type_count(), 2);
        assert!(level.grid().is_paired());
    }

    #[test]
    fn generated_grids_are_full_and_paired_for_every_level() {
        let settings = settings(7);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for level in 1..=25 {
            let data = LevelData::generate(level, &settings, &mut rng);
            assert!(data.dimensions().has_even_area());
            assert!(data.grid().values().iter().all(Option::is_some));
            assert!(data.grid().is_paired(), "level {level} has an unpaired id");
            assert!(data.cards_type_count() <= 7);
        }
    }

    #[test]
    fn far_past_maximum_level_uses_maximum_grid_and_whole_pool() {
        let settings = settings(12);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let data = LevelData::generate(settings.maximum_level * 10, &settings, &mut rng);
        assert_eq!(data.columns_count(), 6);
        assert_eq!(data.rows_count(), 6);
        assert_eq!(data.cards_type_count(), settings.cards.len());
    }

    #[test]
    fn same_seed_generates_same_level() {
        let settings = settings(9);
        let first = LevelData::generate(6, &settings, &mut ChaCha8Rng::seed_from_u64(99));
        let second = LevelData::generate(6, &settings, &mut ChaCha8Rng::seed_from_u64(99));
        assert_eq!(first, second);
    }

    #[test]
    fn empty_pool_leaves_cells_empty() {
        let mut settings = settings(0);
        settings.cards = CardsHolder::default();
        let data = LevelData::generate(4, &settings, &mut ChaCha8Rng::seed_from_u64(0));
        assert_eq!(data.cards_type_count(), 0);
        assert_eq!(data.card_id(0, 0), None);
    }

    #[test]
    fn editor_mutation_and_resize() {
        let mut data = LevelData::empty(3, GridDimensions::new(2, 2));
        data.set_card_id(0, 1, Some("card_0".to_string()))
            .expect("in bounds");
        assert_eq!(data.card_id(0, 1), Some("card_0"));
        assert!(data.set_card_id(2, 0, None).is_err());

        assert!(data.resize(GridDimensions::new(4, 3)));
        assert_eq!(data.columns_count(), 4);
        assert_eq!(data.rows_count(), 3);
        assert_eq!(data.card_id(0, 1), None);
    }
}
