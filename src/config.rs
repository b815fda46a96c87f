// ⚙️ Configuration - where the deck and match log live
//
// Precedence: command-line flag > environment variable > default.

use std::path::PathBuf;

pub const DEFAULT_DECK_FILE: &str = "deck.json";
pub const DEFAULT_MATCHUPS_FILE: &str = "matchups.json";
pub const DEFAULT_RECENT_COUNT: usize = 10;

pub const DECK_FILE_ENV: &str = "DECK_TRACKER_DECK_FILE";
pub const MATCHUPS_FILE_ENV: &str = "DECK_TRACKER_MATCHUPS_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub deck_file: PathBuf,
    pub matchups_file: PathBuf,

    /// History length used when the user leaves the count blank
    pub recent_default: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            deck_file: PathBuf::from(DEFAULT_DECK_FILE),
            matchups_file: PathBuf::from(DEFAULT_MATCHUPS_FILE),
            recent_default: DEFAULT_RECENT_COUNT,
        }
    }
}

impl Config {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns (blank values ignored)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = non_blank(DECK_FILE_ENV) {
            config.deck_file = PathBuf::from(path);
        }
        if let Some(path) = non_blank(MATCHUPS_FILE_ENV) {
            config.matchups_file = PathBuf::from(path);
        }
        config
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, deck: Option<PathBuf>, matchups: Option<PathBuf>) -> Self {
        if let Some(path) = deck {
            self.deck_file = path;
        }
        if let Some(path) = matchups {
            self.matchups_file = path;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.deck_file, PathBuf::from("deck.json"));
        assert_eq!(config.matchups_file, PathBuf::from("matchups.json"));
        assert_eq!(config.recent_default, 10);
    }

    #[test]
    fn test_env_overrides_defaults() {
        let env: HashMap<&str, &str> = [
            (DECK_FILE_ENV, "/tmp/my-deck.json"),
            (MATCHUPS_FILE_ENV, "  "),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.deck_file, PathBuf::from("/tmp/my-deck.json"));
        // Blank values are ignored
        assert_eq!(config.matchups_file, PathBuf::from("matchups.json"));
    }

    #[test]
    fn test_flags_override_env() {
        let config = Config::from_lookup(|key| {
            (key == DECK_FILE_ENV).then(|| "env-deck.json".to_string())
        })
        .with_overrides(Some(PathBuf::from("flag-deck.json")), None);

        assert_eq!(config.deck_file, PathBuf::from("flag-deck.json"));
        assert_eq!(config.matchups_file, PathBuf::from("matchups.json"));
    }
}
