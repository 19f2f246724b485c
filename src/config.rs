use crate::error::{Error, Result};
use crate::related::DEFAULT_TOP_N;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG: &str = ".relatr.toml";
pub const DEFAULT_CORPUS: &str = "dist/data/articles.json";

/// Settings read from `.relatr.toml`. CLI flags override these.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Corpus file to read and rewrite
    pub corpus: PathBuf,
    /// Related articles kept per article; zero or negative keeps none
    pub top_n: i64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            corpus: PathBuf::from(DEFAULT_CORPUS),
            top_n: DEFAULT_TOP_N as i64,
        }
    }
}

impl Config {
    /// Load a config file. A missing file is only tolerated at the default
    /// location, where it means "use defaults".
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound && path == Path::new(DEFAULT_CONFIG) => {
                debug!("no config file, using defaults");
                return Ok(Config::default());
            }
            Err(source) => {
                return Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Config = toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn corpus_path(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf).unwrap_or_else(|| self.corpus.clone())
    }

    /// Effective top-N; anything below zero means zero.
    pub fn top_n(&self, flag: Option<i64>) -> usize {
        usize::try_from(flag.unwrap_or(self.top_n)).unwrap_or(0)
    }
}
