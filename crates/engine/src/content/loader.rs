use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::levels::{CardsGrid, GridError, LevelData};

use super::settings::{ProceduralLevelSettings, SettingsError};

#[derive(Debug, Error)]
pub enum ContentLoadError {
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}{}: {message}", at_json_path(.json_path))]
    Json {
        path: PathBuf,
        json_path: String,
        message: String,
    },
    #[error("invalid procedural settings in {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: SettingsError,
    },
    #[error("invalid prepared level {level} in {path}: {source}")]
    PreparedLevel {
        path: PathBuf,
        level: u32,
        #[source]
        source: GridError,
    },
    #[error("prepared level {level} is defined more than once in {path}")]
    DuplicatePreparedLevel { path: PathBuf, level: u32 },
    #[error("prepared level {level} in {path} has no cards")]
    EmptyPreparedLevel { path: PathBuf, level: u32 },
    #[error("prepared level {level} in {path} has card ids that appear an odd number of times")]
    UnpairedPreparedLevel { path: PathBuf, level: u32 },
    #[error("prepared level {level} in {path} uses card `{id}`, which is not in the card pool")]
    UnknownCard {
        path: PathBuf,
        level: u32,
        id: String,
    },
}

fn at_json_path(json_path: &str) -> String {
    if json_path.is_empty() || json_path == "." {
        String::new()
    } else {
        format!(" at {json_path}")
    }
}

/// On-disk shape of an authored level: rows of card ids, `null` for an
/// empty cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparedLevelFile {
    pub level: u32,
    pub cards: Vec<Vec<Option<String>>>,
}

impl PreparedLevelFile {
    pub fn from_level(level: &LevelData) -> Self {
        Self {
            level: level.level(),
            cards: level.grid().to_rows(),
        }
    }
}

pub fn load_procedural_settings(path: &Path) -> Result<ProceduralLevelSettings, ContentLoadError> {
    let settings: ProceduralLevelSettings = read_json(path)?;
    settings
        .validate()
        .map_err(|source| ContentLoadError::Settings {
            path: path.to_path_buf(),
            source,
        })?;
    info!(
        path = %path.display(),
        maximum_level = settings.maximum_level,
        card_pool_size = settings.cards.len(),
        "procedural_settings_loaded"
    );
    Ok(settings)
}

/// Loads authored levels. A missing file means there are none.
pub fn load_prepared_levels(
    path: &Path,
    settings: &ProceduralLevelSettings,
) -> Result<Vec<LevelData>, ContentLoadError> {
    if !path.exists() {
        info!(path = %path.display(), "prepared_levels_missing");
        return Ok(Vec::new());
    }

    let files: Vec<PreparedLevelFile> = read_json(path)?;
    let mut seen = HashSet::with_capacity(files.len());
    let mut levels = Vec::with_capacity(files.len());
    for file in files {
        if !seen.insert(file.level) {
            return Err(ContentLoadError::DuplicatePreparedLevel {
                path: path.to_path_buf(),
                level: file.level,
            });
        }
        let grid =
            CardsGrid::from_rows(file.cards).map_err(|source| ContentLoadError::PreparedLevel {
                path: path.to_path_buf(),
                level: file.level,
                source,
            })?;
        let level = LevelData::new(file.level, grid);
        check_prepared_level(path, &level, settings)?;
        levels.push(level);
    }

    info!(path = %path.display(), count = levels.len(), "prepared_levels_loaded");
    Ok(levels)
}

/// A prepared level must be clearable: at least one card, every id in the
/// pool, every id present an even number of times.
fn check_prepared_level(
    path: &Path,
    level: &LevelData,
    settings: &ProceduralLevelSettings,
) -> Result<(), ContentLoadError> {
    let counts = level.grid().id_counts();
    if counts.is_empty() {
        return Err(ContentLoadError::EmptyPreparedLevel {
            path: path.to_path_buf(),
            level: level.level(),
        });
    }
    if let Some(id) = counts
        .keys()
        .find(|id| settings.cards.try_get_card(id).is_none())
    {
        return Err(ContentLoadError::UnknownCard {
            path: path.to_path_buf(),
            level: level.level(),
            id: id.to_string(),
        });
    }
    if !level.grid().is_paired() {
        return Err(ContentLoadError::UnpairedPreparedLevel {
            path: path.to_path_buf(),
            level: level.level(),
        });
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ContentLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| ContentLoadError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mut deserializer = serde_json::Deserializer::from_str(&raw);
    serde_path_to_error::deserialize::<_, T>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        let source = error.into_inner();
        ContentLoadError::Json {
            path: path.to_path_buf(),
            json_path,
            message: source.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::GridDimensions;

    const SETTINGS_JSON: &str = r#"{
        "maximum_level": 10,
        "grid_settings": {
            "maximum_columns": 6,
            "maximum_rows": 6,
            "minimum_columns": 2,
            "minimum_rows": 2
        },
        "cards": [
            { "id": "apple", "sprite": "cards/apple" },
            { "id": "pear", "sprite": "cards/pear" }
        ]
    }"#;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).expect("write fixture");
        path
    }

    #[test]
    fn loads_valid_settings() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = write(temp.path(), "settings.json", SETTINGS_JSON);
        let settings = load_procedural_settings(&path).expect("settings");
        assert_eq!(settings.maximum_level, 10);
        assert_eq!(settings.cards.len(), 2);
        assert_eq!(
            settings.cards.try_get_card("pear").map(|card| card.sprite.as_str()),
            Some("cards/pear")
        );
    }

    #[test]
    fn json_errors_report_the_field_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let broken = SETTINGS_JSON.replace("\"maximum_rows\": 6", "\"maximum_rows\": \"six\"");
        let path = write(temp.path(), "settings.json", &broken);

        let error = load_procedural_settings(&path).expect_err("type error");
        match &error {
            ContentLoadError::Json { json_path, .. } => {
                assert_eq!(json_path, "grid_settings.maximum_rows");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(error.to_string().contains("at grid_settings.maximum_rows"));
    }

    #[test]
    fn invalid_settings_are_rejected_after_parsing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let broken = SETTINGS_JSON.replace("\"maximum_level\": 10", "\"maximum_level\": 0");
        let path = write(temp.path(), "settings.json", &broken);

        assert!(matches!(
            load_procedural_settings(&path),
            Err(ContentLoadError::Settings {
                source: SettingsError::ZeroMaximumLevel,
                ..
            })
        ));
    }

    #[test]
    fn missing_settings_file_is_a_read_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            load_procedural_settings(&temp.path().join("nope.json")),
            Err(ContentLoadError::ReadFile { .. })
        ));
    }

    #[test]
    fn prepared_levels_load_rows_into_grids() {
        let temp = tempfile::tempdir().expect("tempdir");
        let settings_path = write(temp.path(), "settings.json", SETTINGS_JSON);
        let settings = load_procedural_settings(&settings_path).expect("settings");
        let path = write(
            temp.path(),
            "prepared.json",
            r#"[
                { "level": 1, "cards": [["apple", "pear"], ["pear", "apple"]] },
                { "level": 2, "cards": [["apple", "apple", null], ["pear", "pear", null]] }
            ]"#,
        );

        let levels = load_prepared_levels(&path, &settings).expect("levels");
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].card_id(1, 0), Some("pear"));
        assert_eq!(levels[1].dimensions(), GridDimensions::new(3, 2));
        assert_eq!(levels[1].card_id(0, 2), None);
    }

    #[test]
    fn missing_prepared_levels_file_is_empty() {
        let temp = tempfile::tempdir().expect("tempdir");
        let settings_path = write(temp.path(), "settings.json", SETTINGS_JSON);
        let settings = load_procedural_settings(&settings_path).expect("settings");
        let levels =
            load_prepared_levels(&temp.path().join("prepared.json"), &settings).expect("levels");
        assert!(levels.is_empty());
    }

    #[test]
    fn prepared_levels_reject_duplicates_and_ragged_rows() {
        let temp = tempfile::tempdir().expect("tempdir");
        let settings_path = write(temp.path(), "settings.json", SETTINGS_JSON);
        let settings = load_procedural_settings(&settings_path).expect("settings");

        let duplicate = write(
            temp.path(),
            "duplicate.json",
            r#"[
                { "level": 1, "cards": [["apple", "apple"]] },
                { "level": 1, "cards": [["pear", "pear"]] }
            ]"#,
        );
        assert!(matches!(
            load_prepared_levels(&duplicate, &settings),
            Err(ContentLoadError::DuplicatePreparedLevel { level: 1, .. })
        ));

        let ragged = write(
            temp.path(),
            "ragged.json",
            r#"[{ "level": 4, "cards": [["apple", "apple"], ["pear"]] }]"#,
        );
        assert!(matches!(
            load_prepared_levels(&ragged, &settings),
            Err(ContentLoadError::PreparedLevel {
                level: 4,
                source: GridError::RaggedRow { row: 1, .. },
                ..
            })
        ));
    }

    #[test]
    fn prepared_levels_reject_unclearable_grids() {
        let temp = tempfile::tempdir().expect("tempdir");
        let settings_path = write(temp.path(), "settings.json", SETTINGS_JSON);
        let settings = load_procedural_settings(&settings_path).expect("settings");

        let unpaired = write(
            temp.path(),
            "unpaired.json",
            r#"[{ "level": 2, "cards": [["apple", "apple"], ["apple", null]] }]"#,
        );
        assert!(matches!(
            load_prepared_levels(&unpaired, &settings),
            Err(ContentLoadError::UnpairedPreparedLevel { level: 2, .. })
        ));

        let unknown = write(
            temp.path(),
            "unknown.json",
            r#"[{ "level": 3, "cards": [["plum", "plum"]] }]"#,
        );
        match load_prepared_levels(&unknown, &settings) {
            Err(ContentLoadError::UnknownCard { level, id, .. }) => {
                assert_eq!(level, 3);
                assert_eq!(id, "plum");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let empty = write(
            temp.path(),
            "empty.json",
            r#"[{ "level": 5, "cards": [[null, null]] }]"#,
        );
        assert!(matches!(
            load_prepared_levels(&empty, &settings),
            Err(ContentLoadError::EmptyPreparedLevel { level: 5, .. })
        ));
    }

    #[test]
    fn prepared_level_file_mirrors_grid_rows() {
        let grid = CardsGrid::from_rows(vec![vec![
            Some("apple".to_string()),
            Some("apple".to_string()),
        ]])
        .expect("grid");
        let file = PreparedLevelFile::from_level(&LevelData::new(7, grid));
        assert_eq!(file.level, 7);
        assert_eq!(
            file.cards,
            vec![vec![Some("apple".to_string()), Some("apple".to_string())]]
        );
    }
}
