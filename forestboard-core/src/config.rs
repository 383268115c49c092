//! Workspace configuration read from `forestboard.toml`.
//!
//! Every key is optional; a missing file means "all defaults". The values
//! below are the defaults, and the bundled `forestboard.toml` spells them out.
//!
//! ```toml
//! [data]
//! input  = "src/processed_data.csv"
//! output = "artifacts/model_results.json"
//!
//! [training]
//! test_ratio   = 0.2
//! seed         = 42
//! n_trees      = 100
//! # max_depth  = 12        # unset: unlimited depth
//! max_features = "all"     # or "sqrt"
//! stratify     = false
//! sample_limit = 10
//!
//! [server]
//! host      = "0.0.0.0"
//! port      = 5000
//! dashboard = "dashboard"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::document::DEFAULT_SAMPLE_LIMIT;

/// File picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "forestboard.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataSection,
    pub training: TrainingSection,
    pub server: ServerSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// CSV whose last column is the label.
    pub input: PathBuf,
    /// Where the results document is written and served from.
    pub output: PathBuf,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            input: PathBuf::from("src/processed_data.csv"),
            output: PathBuf::from("artifacts/model_results.json"),
        }
    }
}

/// How many features each tree in the forest may look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    #[default]
    All,
    Sqrt,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrainingSection {
    pub test_ratio: f64,
    pub seed: u64,
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub max_features: MaxFeatures,
    pub stratify: bool,
    /// Prediction pairs kept in the document and shown by the API.
    pub sample_limit: usize,
}

impl Default for TrainingSection {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            seed: 42,
            n_trees: 100,
            max_depth: None,
            max_features: MaxFeatures::All,
            stratify: false,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Directory of static dashboard files.
    pub dashboard: PathBuf,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            dashboard: PathBuf::from("dashboard"),
        }
    }
}

impl Config {
    /// Parse a config file. Any read or parse failure is an error.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit` if given, else `forestboard.toml` from the working
    /// directory when present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => Self::discover(Path::new(".")),
        }
    }

    /// Look for [`DEFAULT_CONFIG_FILE`] in `dir`; defaults if absent.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            log::debug!("using config {}", candidate.display());
            Self::from_file(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_matches_defaults() {
        let text = include_str!("../../forestboard.toml");
        let cfg: Config = toml::from_str(text).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.training.max_depth, None);
        assert_eq!(cfg.training.max_features, MaxFeatures::All);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.training.n_trees, 100);
        assert_eq!(cfg.training.seed, 42);
        assert_eq!(cfg.training.test_ratio, 0.2);
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.data.output, PathBuf::from("artifacts/model_results.json"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [training]
            n_trees = 25
            max_depth = 6
            max_features = "sqrt"

            [server]
            port = 8080
            "#,
        )
        .unwrap();
        assert_eq!(cfg.training.n_trees, 25);
        assert_eq!(cfg.training.max_depth, Some(6));
        assert_eq!(cfg.training.max_features, MaxFeatures::Sqrt);
        assert_eq!(cfg.training.seed, 42);
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.data, DataSection::default());
    }

    #[test]
    fn from_file_errors_on_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "not valid toml ][[[").unwrap();
        assert!(matches!(Config::from_file(&bad), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(Config::load(Some(&missing)), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn discover_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::discover(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn discover_reads_file_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[data]\ninput = \"data/train.csv\"\n",
        )
        .unwrap();
        let cfg = Config::discover(dir.path()).unwrap();
        assert_eq!(cfg.data.input, PathBuf::from("data/train.csv"));
    }

    #[test]
    fn unknown_max_features_is_rejected() {
        let parsed: Result<Config, _> = toml::from_str("[training]\nmax_features = \"log2\"\n");
        assert!(parsed.is_err());
    }
}
