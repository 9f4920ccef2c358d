use crate::fader::{FadeConfig, DEFAULT_STEP_DB, DEFAULT_STEP_DELAY_MS};
use crate::gain::{Gain, CEILING, FLOOR};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Steps {
    pub max_db: i32,
    pub min_db: i32,
    pub step_db: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    pub step_delay_ms: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub steps: Steps,
    pub fade: Fade,
}

#[derive(Error, Debug)]
pub struct ParseError {
    pub filename: String,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to parse {}: {}", self.filename, self.message)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    ParseError(ParseError),

    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),

    #[error(transparent)]
    IOError(#[from] io::Error),

    #[error(transparent)]
    AtomicIOError(#[from] atomicwrites::Error<io::Error>),

    #[error("no configuration directory available")]
    NoConfigDir,
}

pub static FILENAME: &str = "volume_fader.toml";

// <platform config dir>/volume_fader/volume_fader.toml
pub fn default_path() -> Result<PathBuf, Error> {
    match directories::ProjectDirs::from("", "", "volume_fader") {
        Some(dirs) => Ok(dirs.config_dir().join(FILENAME)),
        None => Err(Error::NoConfigDir),
    }
}

impl Config {
    pub fn new() -> Config {
        let steps = Steps {
            max_db: CEILING.db(),
            min_db: FLOOR.db(),
            step_db: DEFAULT_STEP_DB,
        };
        let fade = Fade {
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
        };
        Config { steps, fade }
    }

    // If no file is found, returns default config instead of error
    pub fn load(filename: &Path) -> Result<Config, Error> {
        let contents = match fs::read_to_string(filename) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!("{} not found, using defaults", filename.display());
                return Ok(Config::new());
            }
            Err(error) => return Err(Error::IOError(error)),
        };
        let config = match toml::from_str(&contents) {
            Ok(contents) => contents,
            Err(error) if error.line_col().is_some() => {
                return Err(Error::ParseError(ParseError {
                    filename: filename.display().to_string(),
                    message: format!("{}", error),
                }));
            }
            Err(error) => return Err(Error::TomlDeError(error)),
        };
        info!("Loaded config from {}", filename.display());
        Ok(config)
    }

    pub fn save(self, filename: &Path) -> Result<(), Error> {
        if let Some(dir) = filename.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let contents = toml::to_string(&self)?;
        let writer = atomicwrites::AtomicFile::new(filename, atomicwrites::AllowOverwrite);
        writer.write(|f| f.write_all(contents.as_bytes()))?;
        Ok(())
    }

    pub fn max(&self) -> Gain {
        Gain::new(self.steps.max_db)
    }

    pub fn min(&self) -> Gain {
        Gain::new(self.steps.min_db)
    }

    pub fn fade_config(&self) -> FadeConfig {
        FadeConfig::new(self.steps.step_db, self.fade.step_delay_ms).sanitized()
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join(FILENAME)).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(FILENAME);
        let mut config = Config::new();
        config.steps.step_db = 3;
        config.fade.step_delay_ms = 5;
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILENAME);
        fs::write(&path, "[steps\nmax_db = 0\n").unwrap();
        match Config::load(&path) {
            Err(Error::ParseError(error)) => {
                assert_eq!(error.filename, path.display().to_string())
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn out_of_range_values_are_bounded() {
        let config = Config {
            steps: Steps {
                max_db: 12,
                min_db: -200,
                step_db: 0,
            },
            fade: Fade { step_delay_ms: -3 },
        };
        assert_eq!(config.max(), CEILING);
        assert_eq!(config.min(), FLOOR);
        assert_eq!(config.fade_config(), FadeConfig::default());
    }

    #[test]
    fn reads_handwritten_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILENAME);
        fs::write(
            &path,
            "[steps]\nmax_db = -6\nmin_db = -60\nstep_db = 4\n\n[fade]\nstep_delay_ms = 50\n",
        )
        .unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.max().db(), -6);
        assert_eq!(config.min().db(), -60);
        assert_eq!(config.fade_config(), FadeConfig::new(4, 50));
    }
}
