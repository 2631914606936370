use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::app::{Manager, ManagerError};
use crate::content::ProceduralLevelSettings;
use crate::storage::KeyValueStore;

use super::level_data::LevelData;

pub const LEVEL_STORE_KEY: &str = "Level";
pub const FIRST_LEVEL: u32 = 1;

/// Tracks the player's level and hands out level descriptors: authored
/// levels when one exists for the number, generated ones otherwise.
#[derive(Debug)]
pub struct LevelManager<S: KeyValueStore> {
    settings: ProceduralLevelSettings,
    prepared_levels: Vec<LevelData>,
    current_level: u32,
    store: S,
    rng: ChaCha8Rng,
}

impl<S: KeyValueStore> LevelManager<S> {
    pub fn new(
        settings: ProceduralLevelSettings,
        prepared_levels: Vec<LevelData>,
        store: S,
    ) -> Self {
        Self::with_rng(
            settings,
            prepared_levels,
            store,
            ChaCha8Rng::from_entropy(),
        )
    }

    pub fn with_rng(
        settings: ProceduralLevelSettings,
        prepared_levels: Vec<LevelData>,
        store: S,
        rng: ChaCha8Rng,
    ) -> Self {
        Self {
            settings,
            prepared_levels,
            current_level: FIRST_LEVEL,
            store,
            rng,
        }
    }

    pub fn settings(&self) -> &ProceduralLevelSettings {
        &self.settings
    }

    pub fn prepared_levels(&self) -> &[LevelData] {
        &self.prepared_levels
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn get_level(&mut self, level: u32) -> LevelData {
        if let Some(prepared) = self
            .prepared_levels
            .iter()
            .find(|prepared| prepared.level() == level)
        {
            info!(level_number = level, "prepared_level_selected");
            return prepared.clone();
        }
        LevelData::generate(level, &self.settings, &mut self.rng)
    }

    pub fn current_level_data(&mut self) -> LevelData {
        self.get_level(self.current_level)
    }

    /// Moves to the next level and persists it. A failed save is logged and
    /// the in-memory level still advances.
    pub fn advance_level(&mut self) -> u32 {
        self.current_level = self.current_level.saturating_add(1);
        self.store
            .set_int(LEVEL_STORE_KEY, store_value(self.current_level));
        if let Err(error) = self.store.save() {
            warn!(
                level_number = self.current_level,
                error = %error,
                "level_progress_save_failed"
            );
        }
        info!(level_number = self.current_level, "level_advanced");
        self.current_level
    }

    pub fn load_level(&mut self) {
        let Some(stored) = self.store.get_int(LEVEL_STORE_KEY) else {
            return;
        };
        if stored < FIRST_LEVEL as i32 {
            warn!(stored, "stored_level_out_of_range_using_first");
            self.current_level = FIRST_LEVEL;
            return;
        }
        self.current_level = stored as u32;
    }
}

fn store_value(level: u32) -> i32 {
    i32::try_from(level).unwrap_or(i32::MAX)
}

impl<S: KeyValueStore> Manager for LevelManager<S> {
    fn name(&self) -> &'static str {
        "levels"
    }

    fn launch(&mut self) -> Result<(), ManagerError> {
        self.load_level();
        info!(level_number = self.current_level, "level_progress_loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{CardData, CardsHolder, GridSettings};
    use crate::levels::{CardsGrid, GridDimensions};
    use crate::storage::{MemoryStore, StoreError};

    fn settings() -> ProceduralLevelSettings {
        ProceduralLevelSettings {
            maximum_level: 20,
            grid_settings: GridSettings {
                maximum_columns: 4,
                maximum_rows: 4,
                minimum_columns: 2,
                minimum_rows: 2,
            },
            cards: CardsHolder::new(
                ["apple", "pear", "plum", "fig", "kiwi", "lime"]
                    .iter()
                    .map(|id| CardData::new(*id, format!("cards/{id}")))
                    .collect(),
            ),
        }
    }

    fn manager(store: MemoryStore) -> LevelManager<MemoryStore> {
        LevelManager::with_rng(settings(), Vec::new(), store, ChaCha8Rng::seed_from_u64(1))
    }

    fn prepared_level(level: u32) -> LevelData {
        let grid = CardsGrid::from_rows(vec![
            vec![Some("fig".to_string()), Some("kiwi".to_string())],
            vec![Some("kiwi".to_string()), Some("fig".to_string())],
        ])
        .expect("grid");
        LevelData::new(level, grid)
    }

    #[test]
    fn starts_at_first_level_without_stored_progress() {
        let mut levels = manager(MemoryStore::new());
        levels.launch().expect("launch");
        assert_eq!(levels.current_level(), FIRST_LEVEL);
    }

    #[test]
    fn launch_restores_stored_progress() {
        let mut store = MemoryStore::new();
        store.set_int(LEVEL_STORE_KEY, 9);
        let mut levels = manager(store);
        levels.launch().expect("launch");
        assert_eq!(levels.current_level(), 9);
    }

    #[test]
    fn invalid_stored_level_falls_back_to_first() {
        let mut store = MemoryStore::new();
        store.set_int(LEVEL_STORE_KEY, -4);
        let mut levels = manager(store);
        levels.launch().expect("launch");
        assert_eq!(levels.current_level(), FIRST_LEVEL);
    }

    #[test]
    fn advance_level_increments_and_persists() {
        let mut levels = manager(MemoryStore::new());
        assert_eq!(levels.advance_level(), 2);
        assert_eq!(levels.advance_level(), 3);
        assert_eq!(levels.store().get_int(LEVEL_STORE_KEY), Some(3));
        assert_eq!(levels.store().save_count(), 2);
    }

    #[test]
    fn prepared_level_wins_over_generation() {
        let mut levels = LevelManager::with_rng(
            settings(),
            vec![prepared_level(3)],
            MemoryStore::new(),
            ChaCha8Rng::seed_from_u64(2),
        );
        let level = levels.get_level(3);
        assert_eq!(level, prepared_level(3));

        let generated = levels.get_level(4);
        assert_eq!(generated.level(), 4);
        assert!(generated.grid().is_paired());
    }

    #[test]
    fn current_level_data_follows_progress() {
        let mut levels = manager(MemoryStore::new());
        levels.advance_level();
        assert_eq!(levels.current_level_data().level(), 2);
    }

    #[test]
    fn level_far_past_maximum_clamps_to_maximum_grid() {
        let mut levels = manager(MemoryStore::new());
        let settings = levels.settings().clone();
        let data = levels.get_level(settings.maximum_level * 10);

        assert_eq!(data.columns_count(), settings.grid_settings.maximum_columns);
        assert_eq!(data.rows_count(), settings.grid_settings.maximum_rows);
        assert_eq!(data.cards_type_count(), settings.cards.len());
        assert_eq!(
            data.dimensions(),
            GridDimensions::new(
                settings.grid_settings.maximum_columns,
                settings.grid_settings.maximum_rows
            )
        );
    }

    struct FailingStore(MemoryStore);

    impl KeyValueStore for FailingStore {
        fn has_key(&self, key: &str) -> bool {
            self.0.has_key(key)
        }

        fn get_int(&self, key: &str) -> Option<i32> {
            self.0.get_int(key)
        }

        fn set_int(&mut self, key: &str, value: i32) {
            self.0.set_int(key, value);
        }

        fn get_float(&self, key: &str) -> Option<f32> {
            self.0.get_float(key)
        }

        fn set_float(&mut self, key: &str, value: f32) {
            self.0.set_float(key, value);
        }

        fn delete_key(&mut self, key: &str) {
            self.0.delete_key(key);
        }

        fn save(&mut self) -> Result<(), StoreError> {
            Err(StoreError::Write {
                path: "prefs.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[test]
    fn failed_save_still_advances_in_memory() {
        let mut levels = LevelManager::with_rng(
            settings(),
            Vec::new(),
            FailingStore(MemoryStore::new()),
            ChaCha8Rng::seed_from_u64(3),
        );
        assert_eq!(levels.advance_level(), 2);
        assert_eq!(levels.current_level(), 2);
        assert_eq!(levels.store().get_int(LEVEL_STORE_KEY), Some(2));
    }
}
