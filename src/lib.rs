// Deck Tracker - Core Library
// Card collection + match log, used by the CLI menu, the TUI and tests

pub mod config;
pub mod deck;
pub mod decklist;
pub mod entities;
pub mod error;
pub mod logging;
pub mod matchups;
pub mod menu;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use deck::{CardUpdate, Deck, FilterQuery, SortBy};
pub use decklist::{
    export_decklist_text, import_decklist_text, parse_decklist_lines, ImportSummary,
};
pub use entities::{normalize_name, CardEntry, ManaCost, MatchRecord, MatchResult};
pub use error::{TrackerError, TrackerResult};
pub use matchups::{MatchupTracker, OpponentRow, Record};
pub use menu::{Menu, MenuExit};
pub use storage::{load_deck, load_matchups, save_deck, save_matchups};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
