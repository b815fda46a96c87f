// 📈 Matchup Tracker - append-only log of match results
//
// Records stay in insertion (chronological) order; nothing reorders or
// deletes them. Draws count as half a win in every winrate.

use crate::entities::{normalize_name, now_timestamp, MatchRecord, MatchResult};
use crate::error::{TrackerError, TrackerResult};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

// ============================================================================
// RECORD (W-L-D)
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
}

impl Record {
    pub fn total(&self) -> usize {
        self.wins + self.losses + self.draws
    }

    /// (wins + draws / 2) / total * 100, or 0.0 with no games
    pub fn winrate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.wins as f64 + 0.5 * self.draws as f64) / total as f64 * 100.0
    }

    fn tally(&mut self, result: MatchResult) {
        match result {
            MatchResult::Win => self.wins += 1,
            MatchResult::Loss => self.losses += 1,
            MatchResult::Draw => self.draws += 1,
        }
    }
}

/// One row of the per-opponent winrate table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpponentRow {
    pub opponent: String,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub winrate: f64,
}

// ============================================================================
// MATCHUP TRACKER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MatchupTracker {
    matches: Vec<MatchRecord>,
}

impl MatchupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tracker from already-validated records (oldest first)
    pub fn from_records(matches: Vec<MatchRecord>) -> Self {
        MatchupTracker { matches }
    }

    /// Log a result ("W", "L" or "D", case-insensitive) stamped with the current time
    pub fn add_match(&mut self, opponent: &str, result: &str, notes: &str) -> TrackerResult<()> {
        let opponent = opponent.trim();

        let Some(result) = MatchResult::from_code(result) else {
            debug!(result = %result.trim(), "rejected match result code");
            return Err(TrackerError::invalid("Result must be W, L, or D."));
        };
        if opponent.is_empty() {
            return Err(TrackerError::invalid("Opponent cannot be blank."));
        }

        self.matches.push(MatchRecord {
            opponent: opponent.to_string(),
            result,
            played_at: now_timestamp(),
            notes: notes.trim().to_string(),
        });
        Ok(())
    }

    /// Every record, oldest first
    pub fn all_matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// The `n` most recent records (optionally only opponents containing
    /// `opponent_filter`), still in chronological order
    pub fn recent(&self, n: usize, opponent_filter: Option<&str>) -> Vec<&MatchRecord> {
        let needle = opponent_filter
            .filter(|f| !f.is_empty())
            .map(normalize_name);

        let matching: Vec<&MatchRecord> = self
            .matches
            .iter()
            .filter(|m| match &needle {
                Some(needle) => normalize_name(&m.opponent).contains(needle.as_str()),
                None => true,
            })
            .collect();

        let skip = matching.len().saturating_sub(n);
        matching.into_iter().skip(skip).collect()
    }

    pub fn overall_record(&self) -> Record {
        let mut record = Record::default();
        for m in &self.matches {
            record.tally(m.result);
        }
        record
    }

    pub fn winrate_overall(&self) -> f64 {
        self.overall_record().winrate()
    }

    /// W-L-D per opponent, grouped by normalized name.
    ///
    /// The displayed name is the first spelling seen for that opponent.
    /// Most games first; ties by display name, case-insensitive.
    pub fn record_by_opponent(&self) -> Vec<(String, Record)> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<(String, Record)> = Vec::new();

        for m in &self.matches {
            let key = normalize_name(&m.opponent);
            let slot = *index.entry(key).or_insert_with(|| {
                groups.push((m.opponent.clone(), Record::default()));
                groups.len() - 1
            });
            groups[slot].1.tally(m.result);
        }

        groups.sort_by(|a, b| {
            b.1.total()
                .cmp(&a.1.total())
                .then_with(|| a.0.to_lowercase().cmp(&b.0.to_lowercase()))
        });
        groups
    }

    pub fn winrate_by_opponent(&self) -> Vec<OpponentRow> {
        self.record_by_opponent()
            .into_iter()
            .map(|(opponent, record)| OpponentRow {
                opponent,
                wins: record.wins,
                losses: record.losses,
                draws: record.draws,
                winrate: record.winrate(),
            })
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
