use engine::{
    load_prepared_levels, load_procedural_settings, resolve_app_paths, AudioManager,
    ContentLoadError, JsonFileStore, LevelManager, StartupError, StoreError,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::context::GameContext;
use super::flow::GameFlow;

pub(crate) const SEED_ENV_VAR: &str = "MEMORY_PAIRS_SEED";

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Content(#[from] ContentLoadError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("MEMORY_PAIRS_SEED must be an unsigned integer, got '{value}'")]
    InvalidSeed { value: String },
}

pub(crate) struct AppWiring {
    pub(crate) flow: GameFlow<JsonFileStore>,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Memory Pairs Startup ===");

    let paths = resolve_app_paths()?;
    info!(root = %paths.root.display(), "app_paths_resolved");

    let settings = load_procedural_settings(&paths.procedural_settings_path())?;
    let prepared_levels = load_prepared_levels(&paths.prepared_levels_path(), &settings)?;
    let rng = match parse_seed(std::env::var(SEED_ENV_VAR).ok())? {
        Some(seed) => {
            info!(seed, "shuffle_seeded");
            ChaCha8Rng::seed_from_u64(seed)
        }
        None => ChaCha8Rng::from_entropy(),
    };

    let levels = LevelManager::with_rng(
        settings,
        prepared_levels,
        JsonFileStore::open(paths.progress_path())?,
        rng,
    );
    let audio = AudioManager::new(JsonFileStore::open(paths.audio_prefs_path())?);

    Ok(AppWiring {
        flow: GameFlow::new(GameContext::new(audio, levels)),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn parse_seed(raw: Option<String>) -> Result<Option<u64>, BootstrapError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| BootstrapError::InvalidSeed { value: raw.clone() })
}
