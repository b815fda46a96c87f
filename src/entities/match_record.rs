// ⚔️ Match Record - one logged game result against an opponent
// Records are immutable once created; the tracker only ever appends.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Timestamp format for `played_at` (sortable as a string, second precision)
pub const PLAYED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time formatted for `played_at`
pub fn now_timestamp() -> String {
    Local::now().format(PLAYED_AT_FORMAT).to_string()
}

// ============================================================================
// MATCH RESULT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    #[serde(rename = "W")]
    Win,

    #[serde(rename = "L")]
    Loss,

    #[serde(rename = "D")]
    Draw,
}

impl MatchResult {
    /// Parse a result code; accepts surrounding whitespace and lowercase
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "W" => Some(MatchResult::Win),
            "L" => Some(MatchResult::Loss),
            "D" => Some(MatchResult::Draw),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            MatchResult::Win => "W",
            MatchResult::Loss => "L",
            MatchResult::Draw => "D",
        }
    }
}

// ============================================================================
// MATCH RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub opponent: String,
    pub result: MatchResult,
    pub played_at: String,
    pub notes: String,
}

impl MatchRecord {
    /// History line: "2024-05-01 20:15:00 | W | vs Azorius Control — mulled to 5"
    pub fn history_line(&self) -> String {
        let notes_part = if self.notes.is_empty() {
            String::new()
        } else {
            format!(" — {}", self.notes)
        };
        format!(
            "{} | {} | vs {}{}",
            self.played_at,
            self.result.code(),
            self.opponent,
            notes_part
        )
    }
}
