// 📝 Decklist Text - plain-text import/export
//
// Accepted lines:
//   "2 Sol Ring"    → 2 × Sol Ring
//   "2x Sol Ring"   → 2 × Sol Ring (x is case-insensitive)
//   "Sol Ring"      → 1 × Sol Ring
// Blank lines and comments ("#", "//") are skipped.

use crate::deck::{Deck, FilterQuery, SortBy};
use crate::entities::card::saturating_digits;
use serde::Serialize;
use tracing::{info, warn};

/// Card type given to imported cards (text carries no type information)
pub const IMPORTED_TYPE: &str = "Unknown";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Every input line, including blanks and comments
    pub lines_processed: usize,

    /// Lines that produced a card
    pub entries_added: usize,

    /// Sum of quantities added
    pub cards_added_total: i64,
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse decklist lines into (quantity, name) pairs
pub fn parse_decklist_lines<I, S>(lines: I) -> Vec<(i64, String)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut results = Vec::new();

    for raw in lines {
        let line = raw.as_ref().trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }

        match split_quantity(line) {
            Some((digits, name)) => {
                // Zero-quantity lines are dropped
                let qty = saturating_digits(digits).unwrap_or(0);
                if qty > 0 && !name.is_empty() {
                    results.push((qty, name.to_string()));
                }
            }
            None => results.push((1, line.to_string())),
        }
    }

    results
}

/// Split "<digits>[ws][x]<ws><name>" into (digits, name)
fn split_quantity(line: &str) -> Option<(&str, &str)> {
    let digits_end = line.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let (digits, rest) = line.split_at(digits_end);

    // "2x Sol Ring" / "2 x Sol Ring"
    let marker = rest.trim_start();
    if let Some(after_x) = marker.strip_prefix(['x', 'X']) {
        if after_x.starts_with(char::is_whitespace) {
            return Some((digits, after_x.trim()));
        }
    }

    // "2 Sol Ring"
    if rest.starts_with(char::is_whitespace) {
        return Some((digits, rest.trim()));
    }

    None
}

// ============================================================================
// IMPORT / EXPORT
// ============================================================================

/// Add every card in `text` to the deck (empty cost, type "Unknown")
pub fn import_decklist_text(deck: &mut Deck, text: &str) -> ImportSummary {
    let lines: Vec<&str> = text.lines().collect();
    let parsed = parse_decklist_lines(&lines);

    let mut summary = ImportSummary {
        lines_processed: lines.len(),
        ..ImportSummary::default()
    };
    for (qty, name) in parsed {
        if let Err(err) = deck.add_card(&name, "", IMPORTED_TYPE, qty) {
            warn!(line = %name, "skipping decklist entry: {}", err);
            continue;
        }
        summary.entries_added += 1;
        summary.cards_added_total = summary.cards_added_total.saturating_add(qty);
    }

    info!(
        lines = summary.lines_processed,
        entries = summary.entries_added,
        cards = summary.cards_added_total,
        "imported decklist text"
    );
    summary
}

/// One card per line sorted by name; singletons drop the "1 " unless `include_ones`
pub fn export_decklist_text(deck: &Deck, include_ones: bool) -> String {
    let entries = deck.filter_entries(&FilterQuery::sorted_by(SortBy::Name));

    let mut out = String::new();
    for entry in entries {
        if entry.qty == 1 && !include_ones {
            out.push_str(&entry.name);
        } else {
            out.push_str(&format!("{} {}", entry.qty, entry.name));
        }
        out.push('\n');
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supports_qty_x_and_singletons_and_ignores_comments() {
        let lines = [
            "2 Sol Ring",
            "3x Lightning Bolt",
            "Command Tower",
            "# this is a comment",
            "// another comment",
            "",
            "   4    Arcane Signet   ",
        ];

        assert_eq!(
            parse_decklist_lines(lines),
            vec![
                (2, "Sol Ring".to_string()),
                (3, "Lightning Bolt".to_string()),
                (1, "Command Tower".to_string()),
                (4, "Arcane Signet".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_quantity_edge_cases() {
        let lines = [
            "2 X Fireball",
            "2 xenagos",
            "0 Sol Ring",
            "3xSol Ring",
            "1000",
            "2 x",
        ];

        assert_eq!(
            parse_decklist_lines(lines),
            vec![
                (2, "Fireball".to_string()),
                (2, "xenagos".to_string()),
                (1, "3xSol Ring".to_string()),
                (1, "1000".to_string()),
                (2, "x".to_string()),
            ]
        );
    }

    #[test]
    fn test_import_accumulates_duplicates() {
        let mut deck = Deck::new();
        let text = "2 Sol Ring\nSol Ring\n3x Sol Ring\nCommand Tower";

        let summary = import_decklist_text(&mut deck, text);
        assert_eq!(summary.lines_processed, 4);
        assert_eq!(summary.entries_added, 4);
        assert_eq!(summary.cards_added_total, 2 + 1 + 3 + 1);

        let sol_ring = deck.get("Sol Ring").unwrap();
        assert_eq!(sol_ring.name, "Sol Ring");
        assert_eq!(sol_ring.qty, 6);

        let tower = deck.get("Command Tower").unwrap();
        assert_eq!(tower.qty, 1);
        assert_eq!(tower.card_type, "Unknown");
        assert_eq!(tower.mana_cost_raw, "");
    }

    #[test]
    fn test_import_huge_quantity_keeps_positive_count() {
        let mut deck = Deck::new();
        let summary = import_decklist_text(&mut deck, "9223372036854775807 Sol Ring\nSol Ring");

        assert_eq!(summary.entries_added, 2);
        assert_eq!(summary.cards_added_total, i64::MAX);
        assert_eq!(deck.get("Sol Ring").unwrap().qty, i64::MAX);
    }

    #[test]
    fn test_parse_clamps_oversized_quantity() {
        let lines = ["99999999999999999999 Sol Ring", "00 Island"];
        assert_eq!(
            parse_decklist_lines(lines),
            vec![(i64::MAX, "Sol Ring".to_string())]
        );
    }

    #[test]
    fn test_import_counts_skipped_lines() {
        let mut deck = Deck::new();
        let summary = import_decklist_text(&mut deck, "# Commander\n\nSol Ring\n");

        assert_eq!(summary.lines_processed, 3);
        assert_eq!(summary.entries_added, 1);
        assert_eq!(deck.deck_size(), 1);
    }

    #[test]
    fn test_export_formats_singletons_and_multiples() {
        let mut deck = Deck::new();
        deck.add_card("Sol Ring", "1", "Artifact", 2).unwrap();
        deck.add_card("Command Tower", "", "Land", 1).unwrap();

        assert_eq!(export_decklist_text(&deck, false), "Command Tower\n2 Sol Ring\n");
        assert_eq!(export_decklist_text(&deck, true), "1 Command Tower\n2 Sol Ring\n");
    }

    #[test]
    fn test_export_empty_deck() {
        assert_eq!(export_decklist_text(&Deck::new(), false), "");
    }

    #[test]
    fn test_export_then_import_rebuilds_quantities() {
        let mut deck = Deck::new();
        deck.add_card("Sol Ring", "1", "Artifact", 2).unwrap();
        deck.add_card("Command Tower", "", "Land", 1).unwrap();

        let mut rebuilt = Deck::new();
        import_decklist_text(&mut rebuilt, &export_decklist_text(&deck, false));
        assert_eq!(rebuilt.get("Sol Ring").unwrap().qty, 2);
        assert_eq!(rebuilt.get("Command Tower").unwrap().qty, 1);
    }
}
