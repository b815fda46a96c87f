// 📚 Deck - deduplicated collection of cards
//
// Invariants enforced at every mutation:
// - at most one entry per normalized name
// - every stored entry has qty >= 1 (an entry reaching 0 is deleted)

use crate::entities::{normalize_name, CardEntry};
use crate::error::{TrackerError, TrackerResult};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use tracing::debug;

/// Label used for cards with a blank type in `type_counts`
pub const UNKNOWN_TYPE: &str = "Unknown";

/// Minimum similarity (0.0 - 1.0) for a name suggestion
pub const SUGGESTION_CUTOFF: f64 = 0.6;

// ============================================================================
// QUERY TYPES
// ============================================================================

/// Result ordering for `filter_entries`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Normalized name
    #[default]
    Name,

    /// Lowercased card type, then normalized name
    Type,

    /// Numeric costs ascending, then unknown costs, then X costs
    Cost,
}

impl FromStr for SortBy {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortBy::Name),
            "type" | "category" => Ok(SortBy::Type),
            "cost" => Ok(SortBy::Cost),
            other => Err(TrackerError::invalid(format!(
                "Unknown sort field '{}' (expected name, type or cost)",
                other
            ))),
        }
    }
}

/// Search predicates; every field that is set must match (AND).
///
/// If any of `cost_eq` / `cost_lte` / `cost_gte` is set, X-cost cards are
/// excluded entirely. X-cost cards are only found through `has_x`.
#[derive(Debug, Clone, Default)]
pub struct FilterQuery {
    pub name_contains: Option<String>,
    pub type_contains: Option<String>,
    pub cost_eq: Option<i64>,
    pub cost_lte: Option<i64>,
    pub cost_gte: Option<i64>,
    pub has_x: Option<bool>,
    pub sort_by: SortBy,
}

impl FilterQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sorted_by(sort_by: SortBy) -> Self {
        FilterQuery {
            sort_by,
            ..Self::default()
        }
    }

    fn uses_cost_filter(&self) -> bool {
        self.cost_eq.is_some() || self.cost_lte.is_some() || self.cost_gte.is_some()
    }
}

/// Partial update for `update_card`.
///
/// `None` leaves the field alone; `Some("")` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardUpdate {
    pub mana_cost: Option<String>,
    pub card_type: Option<String>,
}

impl CardUpdate {
    pub fn mana_cost(cost: impl Into<String>) -> Self {
        CardUpdate {
            mana_cost: Some(cost.into()),
            card_type: None,
        }
    }

    pub fn card_type(card_type: impl Into<String>) -> Self {
        CardUpdate {
            mana_cost: None,
            card_type: Some(card_type.into()),
        }
    }
}

// ============================================================================
// DECK
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Deck {
    /// normalized name -> entry
    cards: BTreeMap<String, CardEntry>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Core CRUD
    // ------------------------------------------------------------------------

    /// Add `qty` copies of a card.
    ///
    /// A card already present (same normalized name) only has its quantity
    /// increased; its stored name, cost and type are kept as they were.
    /// Quantities saturate at `i64::MAX`. A non-positive `qty` is a no-op;
    /// a blank name is rejected.
    pub fn add_card(
        &mut self,
        name: &str,
        mana_cost: &str,
        card_type: &str,
        qty: i64,
    ) -> TrackerResult<()> {
        if qty <= 0 {
            return Ok(());
        }

        let entry = CardEntry::new(name, mana_cost, card_type, qty);
        let key = entry.key();
        if key.is_empty() {
            return Err(TrackerError::invalid("Name cannot be blank."));
        }

        match self.cards.get_mut(&key) {
            Some(existing) => existing.qty = existing.qty.saturating_add(qty),
            None => {
                self.cards.insert(key, entry);
            }
        }
        Ok(())
    }

    /// Remove one copy; deletes the entry when it reaches 0
    pub fn remove_one(&mut self, name: &str) -> bool {
        let key = normalize_name(name);
        let Some(entry) = self.cards.get_mut(&key) else {
            return false;
        };

        entry.qty -= 1;
        if entry.qty <= 0 {
            self.cards.remove(&key);
        }
        true
    }

    /// Set an exact quantity; 0 or less deletes the entry
    pub fn set_quantity(&mut self, name: &str, qty: i64) -> bool {
        let key = normalize_name(name);
        if !self.cards.contains_key(&key) {
            return false;
        }

        if qty <= 0 {
            self.cards.remove(&key);
        } else if let Some(entry) = self.cards.get_mut(&key) {
            entry.qty = qty;
        }
        true
    }

    pub fn update_card(&mut self, name: &str, update: CardUpdate) -> bool {
        let Some(entry) = self.cards.get_mut(&normalize_name(name)) else {
            return false;
        };

        if let Some(cost) = update.mana_cost {
            entry.mana_cost_raw = cost.trim().to_string();
        }
        if let Some(card_type) = update.card_type {
            entry.card_type = card_type.trim().to_string();
        }
        true
    }

    /// Rename a card.
    ///
    /// If the new name collides with another card, the moved quantity is
    /// added to that card and the moved entry (with its cost/type) is dropped.
    pub fn rename_card(&mut self, old_name: &str, new_name: &str) -> bool {
        let Some(mut entry) = self.cards.remove(&normalize_name(old_name)) else {
            return false;
        };

        entry.name = new_name.trim().to_string();
        let new_key = entry.key();

        match self.cards.get_mut(&new_key) {
            Some(existing) => {
                debug!(
                    from = %old_name.trim(),
                    into = %existing.name,
                    qty = entry.qty,
                    "rename collided, merging quantities"
                );
                existing.qty = existing.qty.saturating_add(entry.qty);
            }
            None => {
                self.cards.insert(new_key, entry);
            }
        }
        true
    }

    pub fn get(&self, name: &str) -> Option<&CardEntry> {
        self.cards.get(&normalize_name(name))
    }

    /// All entries, in normalized-name order
    pub fn entries(&self) -> impl Iterator<Item = &CardEntry> {
        self.cards.values()
    }

    /// Number of distinct cards
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Total number of cards counting quantities (saturating)
    pub fn deck_size(&self) -> i64 {
        self.cards
            .values()
            .fold(0i64, |total, e| total.saturating_add(e.qty))
    }

    /// Store an entry exactly as given (used when loading a saved deck).
    ///
    /// Replaces any entry with the same key; entries with qty < 1 are
    /// clamped to 1.
    pub(crate) fn insert_entry(&mut self, mut entry: CardEntry) {
        if entry.qty < 1 {
            entry.qty = 1;
        }
        self.cards.insert(entry.key(), entry);
    }

    // ------------------------------------------------------------------------
    // Stats
    // ------------------------------------------------------------------------

    /// Quantity per card type, largest first (ties: type name, case-insensitive)
    pub fn type_counts(&self) -> Vec<(String, i64)> {
        let mut counts: HashMap<String, i64> = HashMap::new();

        for entry in self.cards.values() {
            let label = if entry.card_type.trim().is_empty() {
                UNKNOWN_TYPE.to_string()
            } else {
                entry.card_type.trim().to_string()
            };
            let count = counts.entry(label).or_insert(0);
            *count = count.saturating_add(entry.qty);
        }

        let mut result: Vec<(String, i64)> = counts.into_iter().collect();
        result.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.0.to_lowercase().cmp(&b.0.to_lowercase()))
                .then_with(|| a.0.cmp(&b.0))
        });
        result
    }

    /// Quantity per cost bucket: "X" first, "?" last, the rest by label
    pub fn cost_counts(&self) -> Vec<(String, i64)> {
        let mut counts: HashMap<String, i64> = HashMap::new();

        for entry in self.cards.values() {
            let count = counts.entry(entry.cost().bucket()).or_insert(0);
            *count = count.saturating_add(entry.qty);
        }

        let mut result: Vec<(String, i64)> = counts.into_iter().collect();
        result.sort_by(|a, b| bucket_sort_key(&a.0).cmp(&bucket_sort_key(&b.0)));
        result
    }

    // ------------------------------------------------------------------------
    // Search / Filter
    // ------------------------------------------------------------------------

    pub fn filter_entries(&self, query: &FilterQuery) -> Vec<&CardEntry> {
        let name_needle = query
            .name_contains
            .as_deref()
            .map(normalize_name)
            .filter(|s| !s.is_empty());
        let type_needle = query
            .type_contains
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let cost_filter_used = query.uses_cost_filter();

        let mut results: Vec<&CardEntry> = self
            .cards
            .values()
            .filter(|entry| {
                if let Some(needle) = &name_needle {
                    if !entry.key().contains(needle.as_str()) {
                        return false;
                    }
                }
                if let Some(needle) = &type_needle {
                    if !entry.card_type.to_lowercase().contains(needle.as_str()) {
                        return false;
                    }
                }

                let cost = entry.cost();
                if let Some(has_x) = query.has_x {
                    if cost.has_x != has_x {
                        return false;
                    }
                }

                // X-cost cards never match numeric cost filters
                if cost_filter_used && cost.has_x {
                    return false;
                }

                if let Some(eq) = query.cost_eq {
                    if cost.numeric != Some(eq) {
                        return false;
                    }
                }
                if let Some(lte) = query.cost_lte {
                    match cost.numeric {
                        Some(n) if n <= lte => {}
                        _ => return false,
                    }
                }
                if let Some(gte) = query.cost_gte {
                    match cost.numeric {
                        Some(n) if n >= gte => {}
                        _ => return false,
                    }
                }
                true
            })
            .collect();

        match query.sort_by {
            SortBy::Name => results.sort_by_cached_key(|e| e.key()),
            SortBy::Type => {
                results.sort_by_cached_key(|e| (e.card_type.to_lowercase(), e.key()))
            }
            SortBy::Cost => results.sort_by_cached_key(|e| cost_sort_key(e)),
        }

        results
    }

    // ------------------------------------------------------------------------
    // Typo suggestions
    // ------------------------------------------------------------------------

    /// Up to `limit` display names whose normalized name is close to `name`.
    ///
    /// Closest first; equal scores fall back to normalized-name order.
    pub fn suggest_names(&self, name: &str, limit: usize) -> Vec<String> {
        let target = normalize_name(name);

        let mut scored: Vec<(f64, &String)> = self
            .cards
            .keys()
            .map(|key| (strsim::normalized_levenshtein(&target, key), key))
            .filter(|(score, _)| *score >= SUGGESTION_CUTOFF)
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(b.1))
        });

        scored
            .into_iter()
            .take(limit)
            .filter_map(|(_, key)| self.cards.get(key).map(|e| e.name.clone()))
            .collect()
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// (is not X, is "?", label): "X" sorts first, "?" last
fn bucket_sort_key(bucket: &str) -> (bool, bool, &str) {
    (bucket != "X", bucket == "?", bucket)
}

/// (tier, numeric cost, key): numeric < unknown < X
fn cost_sort_key(entry: &CardEntry) -> (u8, i64, String) {
    let cost = entry.cost();
    if cost.has_x {
        return (2, 0, entry.key());
    }
    match cost.numeric {
        Some(n) => (0, n, entry.key()),
        None => (1, 0, entry.key()),
    }
}

// ============================================================================
// TESTS
// ============================================================================
