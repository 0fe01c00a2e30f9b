use crate::error::{StoreError, StoreResult};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_RESULTS_PATH: &str = "Vote Results.csv";

/// How `submit` decides whether an id has already voted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupMode {
    /// Re-read every row of the file on each submission.
    Scan,
    /// Keep the set of ids in memory, loaded once when the store opens.
    #[default]
    Index,
}

impl FromStr for LookupMode {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scan" => Ok(LookupMode::Scan),
            "index" => Ok(LookupMode::Index),
            other => Err(StoreError::Config(format!("Unknown lookup mode: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub lookup: LookupMode,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lookup: LookupMode::default(),
        }
    }

    pub fn with_lookup(mut self, lookup: LookupMode) -> Self {
        self.lookup = lookup;
        self
    }

    // Reads VOTE_RESULTS_PATH and VOTE_LOOKUP; call dotenvy first if a .env file should apply
    pub fn from_env() -> StoreResult<Self> {
        let path = env::var("VOTE_RESULTS_PATH").unwrap_or_else(|_| DEFAULT_RESULTS_PATH.to_string());
        let lookup = match env::var("VOTE_LOOKUP") {
            Ok(value) => value.parse()?,
            Err(_) => LookupMode::default(),
        };
        Ok(Self::new(path).with_lookup(lookup))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_mode_parse() {
        assert_eq!("scan".parse::<LookupMode>().unwrap(), LookupMode::Scan);
        assert_eq!(" Index ".parse::<LookupMode>().unwrap(), LookupMode::Index);
        assert!(matches!("btree".parse::<LookupMode>(), Err(StoreError::Config(_))));
    }

    #[test]
    fn test_config_defaults() {
        let config = StoreConfig::new("votes.csv");
        assert_eq!(config.path, PathBuf::from("votes.csv"));
        assert_eq!(config.lookup, LookupMode::Index);
        assert_eq!(config.with_lookup(LookupMode::Scan).lookup, LookupMode::Scan);
    }
}
