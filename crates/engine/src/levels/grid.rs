use std::collections::BTreeMap;

use rand::Rng;
use thiserror::Error;

use crate::content::CardData;

use super::dimensions::GridDimensions;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell [{row},{column}] is outside the {rows}x{columns} grid")]
    OutOfBounds {
        row: u32,
        column: u32,
        rows: u32,
        columns: u32,
    },
    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("cell count mismatch: expected {expected}, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },
    #[error("grid has no rows")]
    NoRows,
}

/// Card ids laid out row-major: cell `(row, column)` lives at
/// `row * columns + column`. Empty cells hold `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardsGrid {
    dimensions: GridDimensions,
    values: Vec<Option<String>>,
}

impl CardsGrid {
    pub fn new(dimensions: GridDimensions) -> Self {
        Self {
            dimensions,
            values: vec![None; dimensions.area()],
        }
    }

    pub fn from_values(
        dimensions: GridDimensions,
        values: Vec<Option<String>>,
    ) -> Result<Self, GridError> {
        let expected = dimensions.area();
        if values.len() != expected {
            return Err(GridError::CellCountMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { dimensions, values })
    }

    pub fn from_rows(rows: Vec<Vec<Option<String>>>) -> Result<Self, GridError> {
        let expected = rows.first().map(Vec::len).ok_or(GridError::NoRows)?;
        let row_count = rows.len();
        let mut values = Vec::with_capacity(expected * row_count);
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != expected {
                return Err(GridError::RaggedRow {
                    row,
                    expected,
                    actual: cells.len(),
                });
            }
            values.extend(cells);
        }
        Ok(Self {
            dimensions: GridDimensions::new(expected as u32, row_count as u32),
            values,
        })
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    pub fn rows(&self) -> u32 {
        self.dimensions.rows
    }

    pub fn columns(&self) -> u32 {
        self.dimensions.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub fn index_of(&self, row: u32, column: u32) -> Option<usize> {
        if row >= self.dimensions.rows || column >= self.dimensions.columns {
            return None;
        }
        Some(row as usize * self.dimensions.columns as usize + column as usize)
    }

    /// Id at `(row, column)`; `None` for empty or out-of-bounds cells.
    pub fn get(&self, row: u32, column: u32) -> Option<&str> {
        self.index_of(row, column)
            .and_then(|index| self.values[index].as_deref())
    }

    pub fn set(&mut self, row: u32, column: u32, value: Option<String>) -> Result<(), GridError> {
        let index = self
            .index_of(row, column)
            .ok_or_else(|| self.out_of_bounds(row, column))?;
        self.values[index] = value;
        Ok(())
    }

    fn out_of_bounds(&self, row: u32, column: u32) -> GridError {
        GridError::OutOfBounds {
            row,
            column,
            rows: self.dimensions.rows,
            columns: self.dimensions.columns,
        }
    }

    pub fn to_rows(&self) -> Vec<Vec<Option<String>>> {
        let columns = self.dimensions.columns.max(1) as usize;
        self.values
            .chunks(columns)
            .map(<[Option<String>]>::to_vec)
            .collect()
    }

    /// Occurrences of each id, empty cells excluded.
    pub fn id_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for id in self.values.iter().flatten() {
            *counts.entry(id.as_str()).or_insert(0) += 1;
        }
        counts
    }

    pub fn card_types_count(&self) -> usize {
        self.id_counts().len()
    }

    /// True when every placed id occurs an even number of times.
    pub fn is_paired(&self) -> bool {
        self.id_counts().values().all(|count| count % 2 == 0)
    }

    /// Writes each card id into two consecutive cells, wrapping back to the
    /// first card when the list runs out. An empty list leaves the grid as is.
    pub fn assign_pairs(&mut self, cards: &[CardData]) {
        if cards.is_empty() {
            return;
        }
        for (index, cell) in self.values.iter_mut().enumerate() {
            let card = &cards[(index / 2) % cards.len()];
            *cell = Some(card.id.clone());
        }
    }

    /// Fisher-Yates over the flat cell list.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for i in (1..self.values.len()).rev() {
            let j = rng.gen_range(0..=i);
            self.values.swap(i, j);
        }
    }

    pub fn update_grid<R: Rng + ?Sized>(&mut self, cards: &[CardData], rng: &mut R) {
        self.assign_pairs(cards);
        self.shuffle(rng);
    }

    /// Clears every cell when the grid does not already have `dimensions`.
    pub fn resize(&mut self, dimensions: GridDimensions) -> bool {
        if self.dimensions == dimensions && self.values.len() == dimensions.area() {
            return false;
        }
        *self = Self::new(dimensions);
        true
    }
}
