// 🃏 Card Entity - one tracked card with quantity, cost and type
//
// "Sol Ring", "sol ring" and "  SOL   RING " are the same card: identity is
// the normalized name (lowercase, whitespace collapsed, trimmed), while the
// display name keeps whatever spelling was last set.

use serde::{Deserialize, Serialize};

// ============================================================================
// NAME KEY
// ============================================================================

/// Canonical lookup key for a card or opponent name.
///
/// - Lowercase
/// - Collapse runs of whitespace to a single space
/// - Trim
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// MANA COST
// ============================================================================

/// Value of a run of ASCII digits, clamped to `i64::MAX`; `None` when empty
pub(crate) fn saturating_digits(digits: &str) -> Option<i64> {
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse::<i64>().unwrap_or(i64::MAX))
}

/// Parsed form of a free-text mana cost.
///
/// Examples:
/// - ""   → numeric None, no X, display ""
/// - "X"  → numeric None, X, display "X"
/// - "3"  → numeric 3, no X, display "3"
/// - "x 3" → numeric 3, X, display "X3"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManaCost {
    /// Integer part of the cost, if any digits were typed
    pub numeric: Option<i64>,

    /// True when the cost contains an X anywhere
    pub has_x: bool,

    /// Cleaned-up form for display
    pub display: String,
}

impl ManaCost {
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return ManaCost {
                numeric: None,
                has_x: false,
                display: String::new(),
            };
        }

        let upper = s.to_uppercase();
        if upper == "X" {
            return ManaCost {
                numeric: None,
                has_x: true,
                display: "X".to_string(),
            };
        }

        // Plain number keeps the digits exactly as typed
        if s.chars().all(|c| c.is_ascii_digit()) {
            return ManaCost {
                numeric: saturating_digits(s),
                has_x: false,
                display: s.to_string(),
            };
        }

        // Mixed input ("X3", "3X", "X 3", "2WU"): digits in order form the number
        let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();

        ManaCost {
            numeric: saturating_digits(&digits),
            has_x: upper.contains('X'),
            display: upper.replace(' ', ""),
        }
    }

    /// Bucket label used by cost statistics: "X", the number, or "?"
    pub fn bucket(&self) -> String {
        if self.has_x {
            "X".to_string()
        } else {
            match self.numeric {
                Some(n) => n.to_string(),
                None => "?".to_string(),
            }
        }
    }
}

// ============================================================================
// CARD ENTRY
// ============================================================================

/// One card in the deck.
///
/// Serialized field names match the saved deck document:
/// `{"name", "mana_cost", "card_type", "qty"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardEntry {
    /// Display name (spelling preserved as last set)
    pub name: String,

    /// Mana cost as the user typed it
    #[serde(rename = "mana_cost")]
    pub mana_cost_raw: String,

    /// Free-text card type / category
    pub card_type: String,

    /// Always >= 1 while the entry lives in a deck
    pub qty: i64,
}

impl CardEntry {
    pub fn new(name: &str, mana_cost: &str, card_type: &str, qty: i64) -> Self {
        CardEntry {
            name: name.trim().to_string(),
            mana_cost_raw: mana_cost.trim().to_string(),
            card_type: card_type.trim().to_string(),
            qty,
        }
    }

    /// Normalized name used as the deck key
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn cost(&self) -> ManaCost {
        ManaCost::parse(&self.mana_cost_raw)
    }

    pub fn has_x(&self) -> bool {
        self.cost().has_x
    }

    pub fn numeric_cost(&self) -> Option<i64> {
        self.cost().numeric
    }

    /// One-line summary, e.g. "2x Sol Ring (Artifact) - Cost: 1"
    pub fn pretty(&self) -> String {
        let qty_part = if self.qty > 1 {
            format!("{}x ", self.qty)
        } else {
            String::new()
        };
        let cost_part = if self.mana_cost_raw.is_empty() {
            "?"
        } else {
            &self.mana_cost_raw
        };
        let type_part = if self.card_type.is_empty() {
            "?"
        } else {
            &self.card_type
        };
        format!("{}{} ({}) - Cost: {}", qty_part, self.name, type_part, cost_part)
    }
}

// ============================================================================
// TESTS
// ============================================================================
