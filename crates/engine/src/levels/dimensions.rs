use serde::{Deserialize, Serialize};

use crate::content::GridSettings;

/// Progress through the level curve, clamped to `[0, 1]`.
pub fn difficulty_ratio(level: u32, maximum_level: u32) -> f32 {
    if maximum_level == 0 {
        return 1.0;
    }
    (level as f32 / maximum_level as f32).clamp(0.0, 1.0)
}

pub(crate) fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Nearest integer with halves going to the even neighbour.
pub(crate) fn round_to_u32(value: f32) -> u32 {
    value.max(0.0).round_ties_even() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    pub columns: u32,
    pub rows: u32,
}

impl GridDimensions {
    pub fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    pub fn area(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    pub fn pair_count(&self) -> usize {
        self.area() / 2
    }

    pub fn has_even_area(&self) -> bool {
        self.area() % 2 == 0
    }

    pub fn for_level(level: u32, maximum_level: u32, settings: &GridSettings) -> Self {
        Self::for_difficulty(difficulty_ratio(level, maximum_level), settings)
    }

    pub fn for_difficulty(difficulty: f32, settings: &GridSettings) -> Self {
        let columns = round_to_u32(lerp(
            settings.minimum_columns as f32,
            settings.maximum_columns as f32,
            difficulty,
        ));
        let rows = round_to_u32(lerp(
            settings.minimum_rows as f32,
            settings.maximum_rows as f32,
            difficulty,
        ));
        repair_even_area(Self { columns, rows }, settings)
    }
}

/// Shrinks the larger side by one when the area is odd (rows on a tie).
/// Falls back to the other side, then to growing, so the result stays
/// inside the configured bounds.
fn repair_even_area(dimensions: GridDimensions, settings: &GridSettings) -> GridDimensions {
    if dimensions.has_even_area() {
        return dimensions;
    }

    let GridDimensions { columns, rows } = dimensions;
    let can_shrink_columns = columns > settings.minimum_columns;
    let can_shrink_rows = rows > settings.minimum_rows;

    let (preferred, fallback) = if columns > rows {
        (
            can_shrink_columns.then(|| GridDimensions::new(columns - 1, rows)),
            can_shrink_rows.then(|| GridDimensions::new(columns, rows - 1)),
        )
    } else {
        (
            can_shrink_rows.then(|| GridDimensions::new(columns, rows - 1)),
            can_shrink_columns.then(|| GridDimensions::new(columns - 1, rows)),
        )
    };
    if let Some(repaired) = preferred.or(fallback) {
        return repaired;
    }

    if columns < settings.maximum_columns {
        GridDimensions::new(columns + 1, rows)
    } else if rows < settings.maximum_rows {
        GridDimensions::new(columns, rows + 1)
    } else {
        // Only reachable with a fixed odd grid, which settings validation rejects.
        dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(min_cols: u32, max_cols: u32, min_rows: u32, max_rows: u32) -> GridSettings {
        GridSettings {
            maximum_columns: max_cols,
            maximum_rows: max_rows,
            minimum_columns: min_cols,
            minimum_rows: min_rows,
        }
    }

    #[test]
    fn difficulty_ratio_uses_real_division_and_clamps() {
        assert_eq!(difficulty_ratio(5, 10), 0.5);
        assert_eq!(difficulty_ratio(3, 4), 0.75);
        assert_eq!(difficulty_ratio(0, 10), 0.0);
        assert_eq!(difficulty_ratio(100, 10), 1.0);
    }

    #[test]
    fn halfway_level_interpolates_to_six_by_six() {
        let dimensions = GridDimensions::for_level(5, 10, &bounds(2, 10, 2, 10));
        assert_eq!(dimensions, GridDimensions::new(6, 6));
        assert_eq!(dimensions.area(), 36);
    }

    #[test]
    fn levels_past_the_maximum_clamp_to_maximum_bounds() {
        let dimensions = GridDimensions::for_level(100, 10, &bounds(2, 6, 2, 8));
        assert_eq!(dimensions, GridDimensions::new(6, 8));
    }

    #[test]
    fn odd_area_shrinks_the_larger_side() {
        // 2 + 4 * 0.75 = 5 columns, 2 + 2 * 0.75 = 3.5 -> 4 rows: even already.
        assert_eq!(
            GridDimensions::for_difficulty(0.75, &bounds(2, 6, 2, 4)),
            GridDimensions::new(5, 4)
        );
        // 5 columns x 3 rows is odd, columns are larger.
        assert_eq!(
            GridDimensions::for_difficulty(1.0, &bounds(2, 5, 2, 3)),
            GridDimensions::new(4, 3)
        );
    }

    #[test]
    fn odd_square_shrinks_rows() {
        assert_eq!(
            GridDimensions::for_difficulty(1.0, &bounds(2, 5, 2, 5)),
            GridDimensions::new(5, 4)
        );
    }

    #[test]
    fn repair_respects_minimum_bounds() {
        // 3x3 with rows pinned at their minimum shrinks columns instead.
        assert_eq!(
            GridDimensions::for_difficulty(1.0, &bounds(2, 3, 3, 3)),
            GridDimensions::new(2, 3)
        );
        // Both sides at their minimum: grow instead of shrinking.
        assert_eq!(
            GridDimensions::for_difficulty(0.0, &bounds(3, 4, 3, 3)),
            GridDimensions::new(4, 3)
        );
        assert_eq!(
            GridDimensions::for_difficulty(0.0, &bounds(3, 3, 3, 6)),
            GridDimensions::new(3, 4)
        );
    }

    #[test]
    fn rounding_sends_halves_to_even() {
        assert_eq!(round_to_u32(2.5), 2);
        assert_eq!(round_to_u32(3.5), 4);
        assert_eq!(round_to_u32(4.4), 4);
        assert_eq!(round_to_u32(4.6), 5);
    }

    #[test]
    fn every_level_yields_even_area_within_bounds() {
        let settings_list = [
            bounds(2, 10, 2, 10),
            bounds(2, 7, 3, 5),
            bounds(3, 9, 3, 9),
            bounds(2, 3, 2, 3),
        ];
        for settings in settings_list {
            for maximum_level in [1, 7, 10, 25] {
                for level in 0..=maximum_level * 2 {
                    let dimensions = GridDimensions::for_level(level, maximum_level, &settings);
                    assert!(
                        dimensions.has_even_area(),
                        "odd area for level {level}/{maximum_level}: {dimensions:?}"
                    );
                    assert!(
                        (settings.minimum_columns..=settings.maximum_columns)
                            .contains(&dimensions.columns),
                        "columns out of bounds: {dimensions:?} for {settings:?}"
                    );
                    assert!(
                        (settings.minimum_rows..=settings.maximum_rows).contains(&dimensions.rows),
                        "rows out of bounds: {dimensions:?} for {settings:?}"
                    );
                }
            }
        }
    }
}
