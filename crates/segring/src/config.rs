use crate::state::{Progress, RingParameters};
use crate::store::ProgressStore;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use std::path::{Path, PathBuf};
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

/// How a newly added segment starts out.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum InitialProgress {
    #[default]
    #[strum(to_string = "zero", serialize = "empty", serialize = "0")]
    Zero,
    #[strum(to_string = "random", serialize = "rand")]
    Random,
}

impl InitialProgress {
    pub fn into_fn(self) -> impl Fn() -> Progress + Send + Sync + 'static {
        move || match self {
            Self::Zero => Progress::EMPTY,
            Self::Random => Progress::new(rand::random::<f64>()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct Config {
    /// Segments present when the store is created.
    #[serde(default)]
    pub initial_segments: usize,
    #[serde(default)]
    pub initial_progress: InitialProgress,
    #[serde(default)]
    pub ring: RingParameters,
}

impl Config {
    pub fn build_store(&self) -> ProgressStore {
        let store = ProgressStore::with_initializer(self.ring, self.initial_progress.into_fn());
        store.add_segments(self.initial_segments);
        store
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("com", "mstf", "segring").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&get_config_path()?)
}

/// Reads `path` if it exists, then applies `SEGRING_` environment overrides
/// (`SEGRING_RING__GAP_ANGLE=8`, `SEGRING_INITIAL_PROGRESS=random`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("SEGRING")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Re-reads one config file and reports ring parameters only when they change.
pub struct ConfigReloader {
    path: PathBuf,
    current: RingParameters,
}

impl ConfigReloader {
    pub fn new(path: PathBuf, current: RingParameters) -> Self {
        Self { path, current }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file still yields the parameters last reported.
    pub fn reload(&mut self) -> Result<Option<RingParameters>, ConfigError> {
        let ring = load_config_from(&self.path)?.ring;
        if ring == self.current {
            return Ok(None);
        }
        self.current = ring;
        Ok(Some(ring))
    }
}

pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config, using defaults: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    write_default_config_to(&path)?;
    Ok(path)
}

/// Writes the default config to `path` unless a file is already there.
pub fn write_default_config_to(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(path, DEFAULT_CONFIG)?;
    }
    Ok(())
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_file(contents: &str) -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs_err::write(&path, contents).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_initial_progress_deserialization() {
        let cases = vec![
            ("\"zero\"", InitialProgress::Zero),
            ("\"Zero\"", InitialProgress::Zero),
            ("\"EMPTY\"", InitialProgress::Zero),
            ("\"0\"", InitialProgress::Zero),
            ("\"random\"", InitialProgress::Random),
            ("\"Rand\"", InitialProgress::Random),
        ];

        for (json, expected) in cases {
            let deserialized: InitialProgress = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.toml");
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.initial_segments, 0);
        assert_eq!(config.initial_progress, InitialProgress::Zero);
        assert_eq!(config.ring, RingParameters::default());
    }

    #[test]
    fn test_partial_ring_table() {
        let (_temp_dir, path) = config_file(
            "initial_segments = 3\ninitial_progress = \"random\"\n\n[ring]\ngap_angle = 8.0\n",
        );
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.initial_segments, 3);
        assert_eq!(config.initial_progress, InitialProgress::Random);
        assert_eq!(config.ring.gap_angle, 8.0);
        assert_eq!(config.ring.avatar_size, 128.0);
    }

    #[test]
    fn test_default_config_matches_defaults() {
        let (_temp_dir, path) = config_file(DEFAULT_CONFIG);
        assert_eq!(load_config_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_write_default_config_keeps_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        write_default_config_to(&path).unwrap();
        assert_eq!(fs_err::read_to_string(&path).unwrap(), DEFAULT_CONFIG);

        fs_err::write(&path, "initial_segments = 2\n").unwrap();
        write_default_config_to(&path).unwrap();
        assert_eq!(load_config_from(&path).unwrap().initial_segments, 2);
    }

    #[test]
    fn test_reloader_reports_changed_parameters_once() {
        let (_temp_dir, path) = config_file("[ring]\ngap_angle = 12.0\n");
        let mut reloader = ConfigReloader::new(path.clone(), RingParameters::default());
        assert_eq!(reloader.reload().unwrap(), None);

        fs_err::write(&path, "[ring]\ngap_angle = 20.0\nstroke_width = 8.0\n").unwrap();
        let ring = reloader.reload().unwrap().unwrap();
        assert_eq!(ring.gap_angle, 20.0);
        assert_eq!(ring.stroke_width, 8.0);
        assert_eq!(reloader.reload().unwrap(), None);

        fs_err::remove_file(&path).unwrap();
        assert_eq!(reloader.reload().unwrap(), Some(RingParameters::default()));
    }

    #[test]
    fn test_reloader_keeps_parameters_on_bad_file() {
        let (_temp_dir, path) = config_file("[ring]\ngap_angle = 20.0\n");
        let mut reloader = ConfigReloader::new(path.clone(), RingParameters::default());
        assert!(reloader.reload().unwrap().is_some());

        fs_err::write(&path, "[ring]\ngap_angle = \"wide\"\n").unwrap();
        assert!(reloader.reload().is_err());

        fs_err::write(&path, "[ring]\ngap_angle = 20.0\n").unwrap();
        assert_eq!(reloader.reload().unwrap(), None);
    }

    #[test]
    fn test_build_store_seeds_segments() {
        let config = Config {
            initial_segments: 4,
            ..Config::default()
        };
        let state = config.build_store().snapshot();
        assert_eq!(state.segment_count(), 4);
        assert!(state.progress.iter().all(|p| *p == Progress::EMPTY));
    }
}
