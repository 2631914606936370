use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;
pub mod levels;
pub mod play;
pub mod storage;

pub use app::{
    AudioCategorizer, AudioCategory, AudioManager, Core, InitializationResult,
    InitializationResultType, Manager, ManagerError, ManagerSet, MenuError, MenuEvent, MenuId,
    MenuStack, MenuType, SoundCue, VolumeChange, VolumeListener, VolumeListenerHandle,
    DEFAULT_VOLUME,
};
pub use content::{
    load_prepared_levels, load_procedural_settings, CardData, CardsHolder, ContentLoadError,
    GridSettings, PreparedLevelFile, ProceduralLevelSettings, SettingsError,
};
pub use levels::{
    cards_count_for, difficulty_ratio, CardsGrid, GridDimensions, GridError, LevelData,
    LevelManager, FIRST_LEVEL, LEVEL_STORE_KEY,
};
pub use play::{Board, Card, CardState, FlipOutcome, MatchSession};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};

pub const ROOT_ENV_VAR: &str = "MEMORY_PAIRS_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub base_content_dir: PathBuf,
    pub save_dir: PathBuf,
}

impl AppPaths {
    pub fn procedural_settings_path(&self) -> PathBuf {
        self.base_content_dir.join("procedural_settings.json")
    }

    pub fn prepared_levels_path(&self) -> PathBuf {
        self.base_content_dir.join("prepared_levels.json")
    }

    pub fn progress_path(&self) -> PathBuf {
        self.save_dir.join("progress.json")
    }

    pub fn audio_prefs_path(&self) -> PathBuf {
        self.save_dir.join("audio.json")
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create save directory at {path}: {source}")]
    CreateSaveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "MEMORY_PAIRS_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
PowerShell: $env:{env_var}=\"C:\\path\\to\\memory-pairs\"\n\
Bash/zsh: export {env_var}=\"/path/to/memory-pairs\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    app_paths_for_root(root)
}

pub fn app_paths_for_root(root: PathBuf) -> Result<AppPaths, StartupError> {
    let base_content_dir = root.join("assets").join("base");
    let save_dir = root.join("save");

    fs::create_dir_all(&save_dir).map_err(|source| StartupError::CreateSaveDir {
        path: save_dir.clone(),
        source,
    })?;

    Ok(AppPaths {
        root,
        base_content_dir,
        save_dir,
    })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let raw = PathBuf::from(value);
            let normalized = normalize_path(&raw);
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            for candidate in exe_dir.ancestors() {
                if is_repo_marker(candidate) {
                    return Ok(normalize_path(candidate));
                }
            }

            Err(StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_marker_requires_cargo_toml() {
        let cwd = env::current_dir().expect("cwd");
        assert!(!is_repo_marker(&cwd.join("definitely_not_a_marker")));
    }

    #[test]
    fn repo_marker_accepts_cargo_toml_with_assets() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("Cargo.toml"), "[workspace]\n").expect("cargo toml");
        assert!(!is_repo_marker(temp.path()));
        fs::create_dir_all(temp.path().join("assets")).expect("assets");
        assert!(is_repo_marker(temp.path()));
    }

    #[test]
    fn app_paths_for_root_creates_save_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = app_paths_for_root(temp.path().to_path_buf()).expect("paths");
        assert!(paths.save_dir.is_dir());
        assert_eq!(
            paths.procedural_settings_path(),
            temp.path()
                .join("assets")
                .join("base")
                .join("procedural_settings.json")
        );
        assert_eq!(
            paths.progress_path(),
            temp.path().join("save").join("progress.json")
        );
        assert_eq!(paths.audio_prefs_path(), temp.path().join("save").join("audio.json"));
    }
}
