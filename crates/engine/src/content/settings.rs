use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cards::CardsHolder;

/// Smallest grid side that still fits a pair.
pub const MIN_GRID_SIDE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSettings {
    pub maximum_columns: u32,
    pub maximum_rows: u32,
    pub minimum_columns: u32,
    pub minimum_rows: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            maximum_columns: 6,
            maximum_rows: 6,
            minimum_columns: 2,
            minimum_rows: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProceduralLevelSettings {
    pub maximum_level: u32,
    pub grid_settings: GridSettings,
    pub cards: CardsHolder,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("maximum_level must be greater than zero")]
    ZeroMaximumLevel,
    #[error("{axis} bounds must satisfy 2 <= minimum <= maximum (got {minimum}..={maximum})")]
    InvalidBounds {
        axis: &'static str,
        minimum: u32,
        maximum: u32,
    },
    #[error("grid bounds {columns}x{rows} only allow an odd card count")]
    NoEvenArea { columns: u32, rows: u32 },
    #[error("card pool is empty")]
    EmptyCardPool,
    #[error("card id '{0}' appears more than once in the card pool")]
    DuplicateCardId(String),
    #[error("card pool entry {index} has an empty id")]
    EmptyCardId { index: usize },
}

impl GridSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_axis("columns", self.minimum_columns, self.maximum_columns)?;
        check_axis("rows", self.minimum_rows, self.maximum_rows)?;

        let fixed_odd = |minimum: u32, maximum: u32| minimum == maximum && minimum % 2 == 1;
        if fixed_odd(self.minimum_columns, self.maximum_columns)
            && fixed_odd(self.minimum_rows, self.maximum_rows)
        {
            return Err(SettingsError::NoEvenArea {
                columns: self.minimum_columns,
                rows: self.minimum_rows,
            });
        }
        Ok(())
    }
}

fn check_axis(axis: &'static str, minimum: u32, maximum: u32) -> Result<(), SettingsError> {
    if minimum < MIN_GRID_SIDE || minimum > maximum {
        return Err(SettingsError::InvalidBounds {
            axis,
            minimum,
            maximum,
        });
    }
    Ok(())
}

impl ProceduralLevelSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.maximum_level == 0 {
            return Err(SettingsError::ZeroMaximumLevel);
        }
        self.grid_settings.validate()?;
        if self.cards.is_empty() {
            return Err(SettingsError::EmptyCardPool);
        }

        let mut seen = HashSet::with_capacity(self.cards.len());
        for (index, card) in self.cards.cards().iter().enumerate() {
            if card.id.is_empty() {
                return Err(SettingsError::EmptyCardId { index });
            }
            if !seen.insert(card.id.as_str()) {
                return Err(SettingsError::DuplicateCardId(card.id.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::CardData;

    fn settings_with(grid_settings: GridSettings) -> ProceduralLevelSettings {
        ProceduralLevelSettings {
            maximum_level: 10,
            grid_settings,
            cards: CardsHolder::new(vec![CardData::new("a", "a"), CardData::new("b", "b")]),
        }
    }

    #[test]
    fn default_grid_settings_are_valid() {
        assert_eq!(settings_with(GridSettings::default()).validate(), Ok(()));
    }

    #[test]
    fn minimum_below_two_is_rejected() {
        let grid = GridSettings {
            minimum_columns: 1,
            ..GridSettings::default()
        };
        assert!(matches!(
            settings_with(grid).validate(),
            Err(SettingsError::InvalidBounds {
                axis: "columns",
                ..
            })
        ));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let grid = GridSettings {
            minimum_rows: 8,
            maximum_rows: 4,
            ..GridSettings::default()
        };
        assert!(matches!(
            settings_with(grid).validate(),
            Err(SettingsError::InvalidBounds { axis: "rows", .. })
        ));
    }

    #[test]
    fn fixed_odd_grid_is_rejected() {
        let grid = GridSettings {
            minimum_columns: 3,
            maximum_columns: 3,
            minimum_rows: 5,
            maximum_rows: 5,
        };
        assert_eq!(
            settings_with(grid).validate(),
            Err(SettingsError::NoEvenArea {
                columns: 3,
                rows: 5
            })
        );
    }

    #[test]
    fn zero_maximum_level_is_rejected() {
        let mut settings = settings_with(GridSettings::default());
        settings.maximum_level = 0;
        assert_eq!(settings.validate(), Err(SettingsError::ZeroMaximumLevel));
    }

    #[test]
    fn duplicate_and_empty_card_ids_are_rejected() {
        let mut settings = settings_with(GridSettings::default());
        settings.cards = CardsHolder::new(vec![CardData::new("a", "x"), CardData::new("a", "y")]);
        assert_eq!(
            settings.validate(),
            Err(SettingsError::DuplicateCardId("a".to_string()))
        );

        settings.cards = CardsHolder::new(vec![CardData::new("", "x")]);
        assert_eq!(
            settings.validate(),
            Err(SettingsError::EmptyCardId { index: 0 })
        );

        settings.cards = CardsHolder::default();
        assert_eq!(settings.validate(), Err(SettingsError::EmptyCardPool));
    }
}
