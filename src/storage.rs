// 💾 Storage - JSON documents for the deck and the match log
//
// Two document shapes are accepted on load:
// - current: {"cards": [ ... ]} / {"matches": [ ... ]}
// - legacy:  a bare list [ ... ]
//
// Loading never fails: a missing file is an empty value, anything malformed
// degrades to empty with a warning. Saving reports errors to the caller.

use crate::deck::Deck;
use crate::entities::{now_timestamp, CardEntry, MatchRecord, MatchResult};
use crate::matchups::MatchupTracker;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

// ============================================================================
// DOCUMENT SHAPES
// ============================================================================

/// Deck document as read from disk
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CardDocument {
    Legacy(Vec<Value>),
    Wrapped {
        #[serde(default)]
        cards: Vec<Value>,
    },
}

impl CardDocument {
    fn into_items(self) -> Vec<Value> {
        match self {
            CardDocument::Legacy(items) => items,
            CardDocument::Wrapped { cards } => cards,
        }
    }
}

/// Match document as read from disk
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MatchDocument {
    Legacy(Vec<Value>),
    Wrapped {
        #[serde(default)]
        matches: Vec<Value>,
    },
}

impl MatchDocument {
    fn into_items(self) -> Vec<Value> {
        match self {
            MatchDocument::Legacy(items) => items,
            MatchDocument::Wrapped { matches } => matches,
        }
    }
}

#[derive(Serialize)]
struct CardDocumentOut<'a> {
    cards: Vec<&'a CardEntry>,
}

#[derive(Serialize)]
struct MatchDocumentOut<'a> {
    matches: &'a [MatchRecord],
}

// ============================================================================
// DECK
// ============================================================================

/// Parse a deck document; `None` when the shape is wrong
pub fn deck_from_json(content: &str) -> Option<Deck> {
    let document: CardDocument = match serde_json::from_str(content) {
        Ok(doc) => doc,
        Err(err) => {
            warn!(error = %err, "deck document is malformed, starting empty");
            return None;
        }
    };

    let mut deck = Deck::new();
    for item in document.into_items() {
        if let Value::Object(fields) = item {
            deck.insert_entry(card_from_fields(&fields));
        }
    }
    Some(deck)
}

pub fn deck_to_json(deck: &Deck) -> Result<String> {
    let document = CardDocumentOut {
        cards: deck.entries().collect(),
    };
    serde_json::to_string_pretty(&document).context("Failed to serialize deck")
}

/// Load a deck; missing or malformed files yield an empty deck
pub fn load_deck(path: &Path) -> Deck {
    let Some(content) = read_document(path) else {
        return Deck::new();
    };
    let deck = deck_from_json(&content).unwrap_or_default();
    info!(path = %path.display(), cards = deck.len(), size = deck.deck_size(), "loaded deck");
    deck
}

pub fn save_deck(deck: &Deck, path: &Path) -> Result<()> {
    let json = deck_to_json(deck)?;
    fs::write(path, json).with_context(|| format!("Failed to write deck file: {:?}", path))?;
    info!(path = %path.display(), cards = deck.len(), "saved deck");
    Ok(())
}

// ============================================================================
// MATCHUPS
// ============================================================================

/// Parse a match document; `None` when the shape is wrong
pub fn matchups_from_json(content: &str) -> Option<MatchupTracker> {
    let document: MatchDocument = match serde_json::from_str(content) {
        Ok(doc) => doc,
        Err(err) => {
            warn!(error = %err, "match document is malformed, starting empty");
            return None;
        }
    };

    let records = document
        .into_items()
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(fields) => Some(match_from_fields(&fields)),
            _ => None,
        })
        .collect();
    Some(MatchupTracker::from_records(records))
}

pub fn matchups_to_json(tracker: &MatchupTracker) -> Result<String> {
    let document = MatchDocumentOut {
        matches: tracker.all_matches(),
    };
    serde_json::to_string_pretty(&document).context("Failed to serialize matchups")
}

/// Load the match log; missing or malformed files yield an empty tracker
pub fn load_matchups(path: &Path) -> MatchupTracker {
    let Some(content) = read_document(path) else {
        return MatchupTracker::new();
    };
    let tracker = matchups_from_json(&content).unwrap_or_default();
    info!(path = %path.display(), matches = tracker.len(), "loaded matchups");
    tracker
}

pub fn save_matchups(tracker: &MatchupTracker, path: &Path) -> Result<()> {
    let json = matchups_to_json(tracker)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write matchups file: {:?}", path))?;
    info!(path = %path.display(), matches = tracker.len(), "saved matchups");
    Ok(())
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Read a whole document as UTF-8; `None` if missing or unreadable
fn read_document(path: &Path) -> Option<String> {
    if !path.exists() {
        debug!(path = %path.display(), "no saved document, starting empty");
        return None;
    }

    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot read document, starting empty");
            None
        }
    }
}

/// Lenient string field: trimmed, scalars stringified, missing/null → ""
fn string_field(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// Lenient quantity: integers, floats or numeric strings; default 1, never < 1
fn qty_field(fields: &Map<String, Value>) -> i64 {
    let qty = match fields.get("qty") {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    qty.unwrap_or(1).max(1)
}

fn card_from_fields(fields: &Map<String, Value>) -> CardEntry {
    CardEntry::new(
        &string_field(fields, "name"),
        &string_field(fields, "mana_cost"),
        &string_field(fields, "card_type"),
        qty_field(fields),
    )
}

fn match_from_fields(fields: &Map<String, Value>) -> MatchRecord {
    let result = MatchResult::from_code(&string_field(fields, "result")).unwrap_or(MatchResult::Loss);
    let mut played_at = string_field(fields, "played_at");
    if played_at.is_empty() {
        played_at = now_timestamp();
    }

    MatchRecord {
        opponent: string_field(fields, "opponent"),
        result,
        played_at,
        notes: string_field(fields, "notes"),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_deck_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deck.json");

        let mut deck = Deck::new();
        deck.add_card("Sol Ring", "1", "Artifact", 2).unwrap();
        deck.add_card("Fireball", "X1", "Sorcery", 1).unwrap();
        save_deck(&deck, &path).unwrap();

        let loaded = load_deck(&path);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("sol ring"), deck.get("sol ring"));
        assert_eq!(loaded.get("fireball").unwrap().mana_cost_raw, "X1");
    }

    #[test]
    fn test_saved_deck_document_shape() {
        let mut deck = Deck::new();
        deck.add_card("Sol Ring", "1", "Artifact", 2).unwrap();

        let json: Value = serde_json::from_str(&deck_to_json(&deck).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "cards": [
                    {"name": "Sol Ring", "mana_cost": "1", "card_type": "Artifact", "qty": 2}
                ]
            })
        );
    }

    #[test]
    fn test_load_legacy_bare_list_deck() {
        let deck = deck_from_json(
            r#"[{"name": "Sol Ring", "mana_cost": "1", "card_type": "Artifact", "qty": 3}]"#,
        )
        .unwrap();
        assert_eq!(deck.get("Sol Ring").unwrap().qty, 3);
    }

    #[test]
    fn test_load_deck_defaults_missing_and_invalid_fields() {
        let deck = deck_from_json(
            r#"{"cards": [
                {"name": " Island "},
                {"name": "Forest", "qty": 0},
                {"name": "Swamp", "qty": "4"},
                {"name": "Plains", "qty": "lots", "mana_cost": 2},
                "not a card",
                7
            ]}"#,
        )
        .unwrap();

        assert_eq!(deck.len(), 4);
        let island = deck.get("island").unwrap();
        assert_eq!(island.name, "Island");
        assert_eq!(island.mana_cost_raw, "");
        assert_eq!(island.card_type, "");
        assert_eq!(island.qty, 1);
        assert_eq!(deck.get("forest").unwrap().qty, 1);
        assert_eq!(deck.get("swamp").unwrap().qty, 4);

        let plains = deck.get("plains").unwrap();
        assert_eq!(plains.qty, 1);
        assert_eq!(plains.mana_cost_raw, "2");
    }

    #[test]
    fn test_load_deck_wrapped_without_cards_is_empty() {
        let deck = deck_from_json(r#"{"version": 2}"#).unwrap();
        assert!(deck.is_empty());
    }

    #[test]
    fn test_malformed_deck_documents_degrade_to_empty() {
        assert!(deck_from_json("{not json").is_none());
        assert!(deck_from_json("42").is_none());
        assert!(deck_from_json(r#""cards""#).is_none());
        assert!(deck_from_json(r#"{"cards": "Sol Ring"}"#).is_none());

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deck.json");
        fs::write(&path, "{\"cards\": 5}").unwrap();
        assert!(load_deck(&path).is_empty());

        // Invalid UTF-8
        fs::write(&path, [0xffu8, 0xfe, 0x00]).unwrap();
        assert!(load_deck(&path).is_empty());
    }

    #[test]
    fn test_load_missing_files_are_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_deck(&dir.path().join("nope.json")).is_empty());
        assert!(load_matchups(&dir.path().join("nope.json")).is_empty());
    }

    #[test]
    fn test_matchups_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("matchups.json");

        let mut tracker = MatchupTracker::new();
        tracker.add_match("Azorius Control", "W", "on the play").unwrap();
        tracker.add_match("Mono-Red Aggro", "D", "").unwrap();
        save_matchups(&tracker, &path).unwrap();

        let loaded = load_matchups(&path);
        assert_eq!(loaded.all_matches(), tracker.all_matches());
    }

    #[test]
    fn test_saved_matchups_document_shape() {
        let tracker = MatchupTracker::from_records(vec![MatchRecord {
            opponent: "Burn".to_string(),
            result: MatchResult::Draw,
            played_at: "2024-03-01 18:00:00".to_string(),
            notes: String::new(),
        }]);

        let json: Value = serde_json::from_str(&matchups_to_json(&tracker).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "matches": [
                    {"opponent": "Burn", "result": "D", "played_at": "2024-03-01 18:00:00", "notes": ""}
                ]
            })
        );
    }

    #[test]
    fn test_load_matchups_defaults_and_legacy_shape() {
        let tracker = matchups_from_json(
            r#"[
                {"opponent": "Burn", "result": "w", "played_at": "2024-01-01 10:00:00"},
                {"opponent": "Tron", "result": "?", "played_at": "2024-01-02 10:00:00", "notes": " ok "},
                {"opponent": "Zoo"}
            ]"#,
        )
        .unwrap();

        let matches = tracker.all_matches();
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].result, MatchResult::Win);
        assert_eq!(matches[1].result, MatchResult::Loss);
        assert_eq!(matches[1].notes, "ok");
        assert_eq!(matches[2].result, MatchResult::Loss);
        assert_eq!(matches[2].played_at.len(), 19);
        assert_eq!(matches[2].notes, "");
    }

    #[test]
    fn test_malformed_matchup_documents_degrade_to_empty() {
        assert!(matchups_from_json("[1, 2").is_none());
        assert!(matchups_from_json("true").is_none());
        assert!(matchups_from_json(r#"{"matches": {"opponent": "Burn"}}"#).is_none());
    }
}
