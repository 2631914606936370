use std::io::{self, Write};
use std::path::PathBuf;

use engine::{
    app_paths_for_root, cards_count_for, difficulty_ratio, load_prepared_levels,
    load_procedural_settings, resolve_app_paths, AppPaths, ContentLoadError, GridDimensions,
    LevelData, LevelManager, MemoryStore, PreparedLevelFile, ProceduralLevelSettings,
    StartupError, FIRST_LEVEL,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

pub const DEFAULT_SEED: u64 = 0;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Content(#[from] ContentLoadError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    #[error("failed to encode level {level} as JSON: {source}")]
    Encode {
        level: u32,
        #[source]
        source: serde_json::Error,
    },
    #[error("level must be at least 1, got {0}")]
    InvalidLevel(u32),
    #[error("invalid level range {from}..{to}")]
    InvalidRange { from: u32, to: u32 },
}

#[derive(Debug, Clone, Default)]
pub struct CommonOptions {
    pub root: Option<PathBuf>,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Generate { level: u32, json: bool },
    Sweep { from: u32, to: Option<u32> },
    Validate,
}

/// One line of a `sweep` table.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRow {
    pub level: u32,
    pub difficulty: f32,
    pub dimensions: GridDimensions,
    pub card_types: usize,
}

pub fn run<W: Write>(
    kind: CommandKind,
    opts: CommonOptions,
    stdout: &mut W,
) -> Result<(), CliError> {
    let paths = resolve_paths(&opts)?;
    let settings = load_procedural_settings(&paths.procedural_settings_path())?;
    let prepared_levels = load_prepared_levels(&paths.prepared_levels_path(), &settings)?;

    match kind {
        CommandKind::Generate { level, json } => {
            if level < FIRST_LEVEL {
                return Err(CliError::InvalidLevel(level));
            }
            let data = generate_level(settings, prepared_levels, level, opts.seed);
            if json {
                let encoded = serde_json::to_string_pretty(&PreparedLevelFile::from_level(&data))
                    .map_err(|source| CliError::Encode { level, source })?;
                writeln!(stdout, "{encoded}")?;
            } else {
                stdout.write_all(render_level(&data).as_bytes())?;
            }
            Ok(())
        }
        CommandKind::Sweep { from, to } => {
            let to = to.unwrap_or(settings.maximum_level);
            if from < FIRST_LEVEL || to < from {
                return Err(CliError::InvalidRange { from, to });
            }
            writeln!(stdout, "level  difficulty  grid   card_types")?;
            for row in sweep(&settings, from, to) {
                writeln!(
                    stdout,
                    "{:>5}  {:>10.3}  {:>2}x{:<2}  {:>10}",
                    row.level,
                    row.difficulty,
                    row.dimensions.columns,
                    row.dimensions.rows,
                    row.card_types
                )?;
            }
            Ok(())
        }
        CommandKind::Validate => {
            stdout.write_all(validation_report(&settings, &prepared_levels).as_bytes())?;
            Ok(())
        }
    }
}

fn resolve_paths(opts: &CommonOptions) -> Result<AppPaths, StartupError> {
    match &opts.root {
        Some(root) => app_paths_for_root(root.clone()),
        None => resolve_app_paths(),
    }
}

/// The level the game would hand out for `level`, shuffled with `seed`.
pub fn generate_level(
    settings: ProceduralLevelSettings,
    prepared_levels: Vec<LevelData>,
    level: u32,
    seed: u64,
) -> LevelData {
    let mut levels = LevelManager::with_rng(
        settings,
        prepared_levels,
        MemoryStore::new(),
        ChaCha8Rng::seed_from_u64(seed),
    );
    levels.get_level(level)
}

pub fn sweep(settings: &ProceduralLevelSettings, from: u32, to: u32) -> Vec<SweepRow> {
    (from..=to)
        .map(|level| {
            let difficulty = difficulty_ratio(level, settings.maximum_level);
            let dimensions = GridDimensions::for_difficulty(difficulty, &settings.grid_settings);
            let card_types = cards_count_for(dimensions, difficulty).min(settings.cards.len());
            SweepRow {
                level,
                difficulty,
                dimensions,
                card_types,
            }
        })
        .collect()
}

pub fn render_level(level: &LevelData) -> String {
    let width = level
        .grid()
        .values()
        .iter()
        .flatten()
        .map(String::len)
        .max()
        .unwrap_or(1);
    let mut text = format!(
        "level {} ({}x{}, {} card types)\n",
        level.level(),
        level.columns_count(),
        level.rows_count(),
        level.cards_type_count()
    );
    for row in 0..level.rows_count() {
        let cells = (0..level.columns_count())
            .map(|column| {
                let id = level.card_id(row, column).unwrap_or(".");
                format!("{id:<width$}")
            })
            .collect::<Vec<_>>();
        text.push_str(cells.join(" ").trim_end());
        text.push('\n');
    }
    text
}

pub fn validation_report(
    settings: &ProceduralLevelSettings,
    prepared_levels: &[LevelData],
) -> String {
    let grid = &settings.grid_settings;
    let mut lines = vec![
        format!("maximum level: {}", settings.maximum_level),
        format!(
            "grid bounds: {}x{} .. {}x{}",
            grid.minimum_columns, grid.minimum_rows, grid.maximum_columns, grid.maximum_rows
        ),
        format!("card pool: {} cards", settings.cards.len()),
    ];
    let most_pairs = GridDimensions::new(grid.maximum_columns, grid.maximum_rows).pair_count();
    if settings.cards.len() < most_pairs {
        lines.push(format!("note: largest grid holds {most_pairs} pairs, ids will repeat"));
    }
    lines.push(format!("prepared levels: {}", prepared_levels.len()));
    for level in prepared_levels {
        let mut issues = Vec::new();
        if !level.grid().is_paired() {
            issues.push("unpaired ids".to_string());
        }
        let unknown = level
            .grid()
            .id_counts()
            .into_keys()
            .filter(|id| settings.cards.try_get_card(id).is_none())
            .collect::<Vec<_>>();
        if !unknown.is_empty() {
            issues.push(format!("unknown ids: {}", unknown.join(", ")));
        }
        let status = if issues.is_empty() {
            "ok".to_string()
        } else {
            issues.join("; ")
        };
        lines.push(format!(
            "  level {} {}x{}: {status}",
            level.level(),
            level.columns_count(),
            level.rows_count()
        ));
    }
    lines.push("settings ok".to_string());
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
