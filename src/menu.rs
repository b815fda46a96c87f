// 🧭 Interactive Menu - numbered text menu over the deck and the match log
//
// Reads from any BufRead and writes to any Write so it can be scripted.
// The menu never touches files: it reports whether the user asked to save.

use crate::deck::{CardUpdate, Deck, FilterQuery, SortBy};
use crate::decklist::{export_decklist_text, import_decklist_text};
use crate::entities::{CardEntry, MatchRecord};
use crate::matchups::MatchupTracker;
use anyhow::Result;
use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::debug;

/// How many names to offer after a failed lookup
const SUGGESTION_LIMIT: usize = 3;

/// Why the menu loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuExit {
    /// "Save and exit" was chosen
    Save,

    /// Input ran out; nothing should be saved
    EndOfInput,
}

/// Raised by prompts when the input is exhausted
#[derive(Debug, Error)]
#[error("end of input")]
struct InputClosed;

enum Step {
    Continue,
    Exit(MenuExit),
}

pub struct Menu<'a, R, W> {
    deck: &'a mut Deck,
    tracker: &'a mut MatchupTracker,
    input: R,
    output: W,
    recent_default: usize,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(deck: &'a mut Deck, tracker: &'a mut MatchupTracker, input: R, output: W) -> Self {
        Menu {
            deck,
            tracker,
            input,
            output,
            recent_default: crate::config::DEFAULT_RECENT_COUNT,
        }
    }

    pub fn with_recent_default(mut self, recent_default: usize) -> Self {
        self.recent_default = recent_default.max(1);
        self
    }

    /// Run until the user saves or the input ends
    pub fn run(&mut self) -> Result<MenuExit> {
        loop {
            match self.step() {
                Ok(Step::Continue) => {}
                Ok(Step::Exit(exit)) => return Ok(exit),
                Err(err) if err.is::<InputClosed>() => {
                    debug!("menu input closed");
                    return Ok(MenuExit::EndOfInput);
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn step(&mut self) -> Result<Step> {
        self.print_options()?;
        let choice = self.ask("Choose an option: ")?;

        match choice.as_str() {
            "1" => self.add_card()?,
            "2" => self.view_deck()?,
            "3" => self.delete_card()?,
            "4" => self.deck_stats()?,
            "5" => self.edit_card()?,
            "6" => self.search()?,
            "7" => self.import_text()?,
            "8" => self.export_text()?,
            "9" => self.record_match()?,
            "10" => self.matchup_stats()?,
            "11" => self.match_history()?,
            "12" => return Ok(Step::Exit(MenuExit::Save)),
            _ => writeln!(self.output, "Invalid option. Try again.")?,
        }
        Ok(Step::Continue)
    }

    fn print_options(&mut self) -> Result<()> {
        let options = [
            "Add card",
            "View deck",
            "Delete card",
            "Stats",
            "Edit card",
            "Search / filter",
            "Import decklist text",
            "Export decklist text",
            "Record matchup result",
            "Matchup stats (overall + by opponent)",
            "Match history",
            "Save and exit",
        ];

        writeln!(self.output)?;
        for (i, label) in options.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, label)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Prompts
    // ------------------------------------------------------------------------

    /// Read one raw line (without the line ending)
    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(InputClosed.into());
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }

    /// Show a prompt and return the trimmed answer
    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        Ok(self.read_line()?.trim().to_string())
    }

    /// Ask until an integer is typed; blank returns `None` when allowed
    fn ask_int(&mut self, prompt: &str, allow_blank: bool) -> Result<Option<i64>> {
        loop {
            let answer = self.ask(prompt)?;
            if allow_blank && answer.is_empty() {
                return Ok(None);
            }
            if let Some(n) = parse_int(&answer) {
                return Ok(Some(n));
            }
            writeln!(self.output, "Please enter a valid integer.")?;
        }
    }

    fn ask_yes_no(&mut self, prompt: &str, default_no: bool) -> Result<bool> {
        let answer = self.ask(prompt)?.to_lowercase();
        if answer.is_empty() {
            return Ok(!default_no);
        }
        Ok(answer == "y" || answer == "yes")
    }

    fn report_not_found(&mut self, name: &str) -> Result<()> {
        let suggestions = self.deck.suggest_names(name, SUGGESTION_LIMIT);
        if suggestions.is_empty() {
            writeln!(self.output, "Card not found.")?;
        } else {
            writeln!(self.output, "Card not found. Did you mean:")?;
            for suggestion in suggestions {
                writeln!(self.output, " - {}", suggestion)?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Deck actions
    // ------------------------------------------------------------------------

    fn add_card(&mut self) -> Result<()> {
        let name = self.ask("Card name: ")?;
        let mana_cost = self.ask("Mana cost (number, X, or X+number like X3): ")?;
        let card_type = self.ask("Card type: ")?;
        let qty = self.ask_int("Quantity (default 1): ", true)?.unwrap_or(1);

        if name.is_empty() {
            writeln!(self.output, "Name cannot be blank.")?;
            return Ok(());
        }
        if qty <= 0 {
            writeln!(self.output, "Quantity must be >= 1.")?;
            return Ok(());
        }

        self.deck.add_card(&name, &mana_cost, &card_type, qty)?;
        writeln!(self.output, "Card added.")?;
        Ok(())
    }

    fn view_deck(&mut self) -> Result<()> {
        let entries = self.deck.filter_entries(&FilterQuery::sorted_by(SortBy::Name));
        write_deck(&mut self.output, &entries, self.deck.deck_size())
    }

    fn delete_card(&mut self) -> Result<()> {
        let name = self.ask("Enter card name to delete (removes 1): ")?;
        if self.deck.remove_one(&name) {
            writeln!(self.output, "Card removed (qty decremented).")?;
        } else {
            self.report_not_found(&name)?;
        }
        Ok(())
    }

    fn deck_stats(&mut self) -> Result<()> {
        writeln!(self.output, "\n--- Stats ---")?;
        writeln!(self.output, "Total cards (with quantities): {}", self.deck.deck_size())?;
        writeln!(self.output, "Unique cards: {}", self.deck.len())?;

        writeln!(self.output, "\nType counts:")?;
        for (card_type, count) in self.deck.type_counts() {
            writeln!(self.output, "  {}: {}", card_type, count)?;
        }

        writeln!(self.output, "\nCost buckets:")?;
        for (bucket, count) in self.deck.cost_counts() {
            writeln!(self.output, "  {}: {}", bucket, count)?;
        }
        Ok(())
    }

    fn edit_card(&mut self) -> Result<()> {
        let name = self.ask("Card name to edit: ")?;
        let Some((current_name, pretty)) = self
            .deck
            .get(&name)
            .map(|entry| (entry.name.clone(), entry.pretty()))
        else {
            return self.report_not_found(&name);
        };

        writeln!(self.output, "\nCurrent:")?;
        writeln!(self.output, "{}", pretty)?;
        writeln!(self.output, "\nEdit what?")?;
        writeln!(self.output, "1) Mana cost")?;
        writeln!(self.output, "2) Card type")?;
        writeln!(self.output, "3) Quantity (set exact)")?;
        writeln!(self.output, "4) Rename card")?;

        match self.ask("Choose: ")?.as_str() {
            "1" => {
                let cost = self.ask("New mana cost: ")?;
                self.deck.update_card(&current_name, CardUpdate::mana_cost(cost));
                writeln!(self.output, "Updated.")?;
            }
            "2" => {
                let card_type = self.ask("New card type: ")?;
                self.deck.update_card(&current_name, CardUpdate::card_type(card_type));
                writeln!(self.output, "Updated.")?;
            }
            "3" => {
                if let Some(qty) = self.ask_int("New quantity (0 removes): ", false)? {
                    self.deck.set_quantity(&current_name, qty);
                    writeln!(self.output, "Updated.")?;
                }
            }
            "4" => {
                let new_name = self.ask("New name: ")?;
                if new_name.is_empty() {
                    writeln!(self.output, "Name cannot be blank.")?;
                } else {
                    self.deck.rename_card(&current_name, &new_name);
                    writeln!(self.output, "Renamed.")?;
                }
            }
            _ => writeln!(self.output, "Invalid choice.")?,
        }
        Ok(())
    }

    fn search(&mut self) -> Result<()> {
        writeln!(self.output, "\n--- Search / Filter ---")?;
        let name_contains = self.ask("Name contains (blank for any): ")?;
        let type_contains = self.ask("Type contains (blank for any): ")?;

        let has_x = match self.ask("Has X cost? (y/n/blank for any): ")?.to_lowercase().as_str() {
            "y" | "yes" => Some(true),
            "n" | "no" => Some(false),
            _ => None,
        };

        let cost_eq = self.ask_int("Cost equals (blank for any): ", true)?;
        let cost_lte = self.ask_int("Cost <= (blank for any): ", true)?;
        let cost_gte = self.ask_int("Cost >= (blank for any): ", true)?;

        let sort_by = self
            .ask("Sort by (name/type/cost) [name]: ")?
            .parse::<SortBy>()
            .unwrap_or_default();

        let query = FilterQuery {
            name_contains: Some(name_contains).filter(|s| !s.is_empty()),
            type_contains: Some(type_contains).filter(|s| !s.is_empty()),
            cost_eq,
            cost_lte,
            cost_gte,
            has_x,
            sort_by,
        };

        let results = self.deck.filter_entries(&query);
        let total = results.iter().fold(0i64, |sum, e| sum.saturating_add(e.qty));
        write_deck(&mut self.output, &results, total)
    }

    fn import_text(&mut self) -> Result<()> {
        writeln!(self.output, "\nPaste decklist text. Enter a blank line to finish.")?;

        let mut lines = Vec::new();
        loop {
            let line = match self.read_line() {
                Ok(line) => line,
                Err(err) if err.is::<InputClosed>() => break,
                Err(err) => return Err(err),
            };
            if line.trim().is_empty() {
                break;
            }
            lines.push(line);
        }

        let summary = import_decklist_text(self.deck, &lines.join("\n"));
        writeln!(self.output, "\nImported.")?;
        writeln!(self.output, "Lines processed: {}", summary.lines_processed)?;
        writeln!(self.output, "Entries added: {}", summary.entries_added)?;
        writeln!(self.output, "Total cards added: {}", summary.cards_added_total)?;
        writeln!(
            self.output,
            "Note: imported cards use type 'Unknown' and empty cost; edit them later."
        )?;
        Ok(())
    }

    fn export_text(&mut self) -> Result<()> {
        let include_ones =
            self.ask_yes_no("Include '1 ' prefix on singletons? (y/n) [n]: ", true)?;
        let text = export_decklist_text(self.deck, include_ones);

        writeln!(self.output, "\n--- Exported Decklist ---")?;
        if text.trim().is_empty() {
            writeln!(self.output, "(empty)")?;
        } else {
            write!(self.output, "{}", text)?;
        }
        writeln!(self.output, "------------------------")?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Matchup actions
    // ------------------------------------------------------------------------

    fn record_match(&mut self) -> Result<()> {
        writeln!(self.output, "\n--- Record Matchup ---")?;
        let opponent = self.ask("Opponent archetype/deck (e.g. 'Azorius Control'): ")?;
        let result = self.ask("Result (W/L/D): ")?;
        let notes = self.ask("Notes (optional): ")?;

        match self.tracker.add_match(&opponent, &result, &notes) {
            Ok(()) => writeln!(self.output, "Match recorded.")?,
            Err(err) => writeln!(self.output, "Error: {}", err)?,
        }
        Ok(())
    }

    fn matchup_stats(&mut self) -> Result<()> {
        writeln!(self.output, "\n--- Matchup Stats ---")?;
        let record = self.tracker.overall_record();
        writeln!(
            self.output,
            "Overall: {}-{}-{} (Total: {})",
            record.wins,
            record.losses,
            record.draws,
            record.total()
        )?;
        writeln!(
            self.output,
            "Winrate (D = half-win): {:.1}%",
            self.tracker.winrate_overall()
        )?;

        let rows = self.tracker.winrate_by_opponent();
        if rows.is_empty() {
            writeln!(self.output, "\nBy opponent: (no matches yet)")?;
            return Ok(());
        }

        writeln!(self.output, "\nBy opponent:")?;
        for row in rows {
            writeln!(
                self.output,
                "  {}: {}-{}-{} | {:.1}% | {} matches",
                row.opponent,
                row.wins,
                row.losses,
                row.draws,
                row.winrate,
                row.wins + row.losses + row.draws
            )?;
        }
        Ok(())
    }

    fn match_history(&mut self) -> Result<()> {
        writeln!(self.output, "\n--- Match History ---")?;
        let filter = self.ask("Filter by opponent contains (blank for all): ")?;
        let prompt = format!("How many recent matches? (default {}): ", self.recent_default);
        let n = match self.ask_int(&prompt, true)? {
            Some(n) if n > 0 => n as usize,
            _ => self.recent_default,
        };

        let opponent_filter = Some(filter.as_str()).filter(|f| !f.is_empty());
        let matches = self.tracker.recent(n, opponent_filter);
        write_history(&mut self.output, &matches)
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Optional leading '-' followed by ASCII digits only
fn parse_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn write_deck<W: Write>(out: &mut W, entries: &[&CardEntry], deck_size: i64) -> Result<()> {
    writeln!(out, "\nDeck size: {}", deck_size)?;
    if entries.is_empty() {
        writeln!(out, "(empty)")?;
        return Ok(());
    }
    for entry in entries {
        writeln!(out, "{}", entry.pretty())?;
    }
    Ok(())
}

fn write_history<W: Write>(out: &mut W, matches: &[&MatchRecord]) -> Result<()> {
    if matches.is_empty() {
        writeln!(out, "(no matches yet)")?;
        return Ok(());
    }
    for m in matches {
        writeln!(out, "{}", m.history_line())?;
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Run the menu over scripted input; returns (exit, everything printed)
    fn run_script(
        deck: &mut Deck,
        tracker: &mut MatchupTracker,
        lines: &[&str],
    ) -> (MenuExit, String) {
        let mut script = lines.join("\n");
        script.push('\n');

        let mut output = Vec::new();
        let exit = Menu::new(deck, tracker, Cursor::new(script), &mut output)
            .run()
            .unwrap();
        (exit, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("-3"), Some(-3));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int("+4"), None);
        assert_eq!(parse_int("4.5"), None);
        assert_eq!(parse_int("three"), None);
    }

    #[test]
    fn test_save_and_exit() {
        let mut deck = Deck::new();
        let mut tracker = MatchupTracker::new();
        let (exit, output) = run_script(&mut deck, &mut tracker, &["12"]);

        assert_eq!(exit, MenuExit::Save);
        assert!(output.contains("12. Save and exit"));
    }

    #[test]
    fn test_end_of_input_does_not_save() {
        let mut deck = Deck::new();
        let mut tracker = MatchupTracker::new();
        let (exit, _) = run_script(&mut deck, &mut tracker, &["1", "Sol Ring"]);

        assert_eq!(exit, MenuExit::EndOfInput);
        assert!(deck.is_empty());
    }

    #[test]
    fn test_add_and_view_cards() {
        let mut deck = Deck::new();
        let mut tracker = MatchupTracker::new();
        let (_, output) = run_script(
            &mut deck,
            &mut tracker,
            &[
                "1", "Sol Ring", "1", "Artifact", "",
                "1", "sol ring", "1", "Artifact", "abc", "2",
                "2", "12",
            ],
        );

        assert_eq!(deck.get("Sol Ring").unwrap().qty, 3);
        assert!(output.contains("Please enter a valid integer."));
        assert!(output.contains("Deck size: 3"));
        assert!(output.contains("3x Sol Ring (Artifact) - Cost: 1"));
    }

    #[test]
    fn test_add_rejects_bad_quantity_and_blank_name() {
        let mut deck = Deck::new();
        let mut tracker = MatchupTracker::new();
        let (_, output) = run_script(
            &mut deck,
            &mut tracker,
            &["1", "Sol Ring", "1", "Artifact", "0", "1", "", "1", "Artifact", "", "12"],
        );

        assert!(deck.is_empty());
        assert!(output.contains("Quantity must be >= 1."));
        assert!(output.contains("Name cannot be blank."));
    }

    #[test]
    fn test_delete_suggests_close_names() {
        let mut deck = Deck::new();
        deck.add_card("Command Tower", "", "Land", 1).unwrap();
        let mut tracker = MatchupTracker::new();

        let (_, output) = run_script(&mut deck, &mut tracker, &["3", "comand towr", "12"]);
        assert!(output.contains("Card not found. Did you mean:"));
        assert!(output.contains(" - Command Tower"));
        assert_eq!(deck.get("Command Tower").unwrap().qty, 1);

        let (_, output) = run_script(&mut deck, &mut tracker, &["3", "command tower", "12"]);
        assert!(output.contains("Card removed (qty decremented)."));
        assert!(deck.is_empty());
    }

    #[test]
    fn test_edit_card_actions() {
        let mut deck = Deck::new();
        deck.add_card("Lightning Bolt", "1", "Instant", 1).unwrap();
        let mut tracker = MatchupTracker::new();

        let (_, output) = run_script(
            &mut deck,
            &mut tracker,
            &[
                "5", "lightning bolt", "1", "R",
                "5", "lightning bolt", "2", "Instant — Burn",
                "5", "lightning bolt", "3", "4",
                "5", "lightning bolt", "4", "",
                "5", "lightning bolt", "4", "Bolt",
                "12",
            ],
        );

        assert!(output.contains("Name cannot be blank."));
        assert!(output.contains("Renamed."));
        assert!(deck.get("Lightning Bolt").is_none());

        let bolt = deck.get("bolt").unwrap();
        assert_eq!(bolt.mana_cost_raw, "R");
        assert_eq!(bolt.card_type, "Instant — Burn");
        assert_eq!(bolt.qty, 4);
    }

    #[test]
    fn test_stats_output() {
        let mut deck = Deck::new();
        deck.add_card("Fireball", "X", "Sorcery", 1).unwrap();
        deck.add_card("Shock", "1", "Instant", 2).unwrap();
        let mut tracker = MatchupTracker::new();

        let (_, output) = run_script(&mut deck, &mut tracker, &["4", "12"]);
        assert!(output.contains("Total cards (with quantities): 3"));
        assert!(output.contains("Unique cards: 2"));
        assert!(output.contains("  Instant: 2"));
        assert!(output.contains("  X: 1"));
    }

    #[test]
    fn test_search_with_cost_filter() {
        let mut deck = Deck::new();
        deck.add_card("Fireball", "X1", "Sorcery", 1).unwrap();
        deck.add_card("Shock", "1", "Instant", 2).unwrap();
        deck.add_card("Mountain", "", "Land", 10).unwrap();
        let mut tracker = MatchupTracker::new();

        let (_, output) = run_script(
            &mut deck,
            &mut tracker,
            &["6", "", "", "", "1", "", "", "cost", "12"],
        );

        assert!(output.contains("Deck size: 2"));
        assert!(output.contains("2x Shock (Instant) - Cost: 1"));
        assert!(!output.contains("Fireball"));
    }

    #[test]
    fn test_import_and_export_text() {
        let mut deck = Deck::new();
        let mut tracker = MatchupTracker::new();

        let (_, output) = run_script(
            &mut deck,
            &mut tracker,
            &["7", "2 Sol Ring", "Sol Ring", "3x Sol Ring", "", "8", "y", "12"],
        );

        assert_eq!(deck.get("Sol Ring").unwrap().qty, 6);
        assert!(output.contains("Entries added: 3"));
        assert!(output.contains("Total cards added: 6"));
        assert!(output.contains("6 Sol Ring\n"));
    }

    #[test]
    fn test_record_match_and_stats() {
        let mut deck = Deck::new();
        let mut tracker = MatchupTracker::new();

        let (_, output) = run_script(
            &mut deck,
            &mut tracker,
            &[
                "9", "Azorius Control", "w", "",
                "9", "Azorius Control", "L", "",
                "9", "Mono-Red Aggro", "D", "close game",
                "9", "Mono-Red Aggro", "win", "",
                "10", "12",
            ],
        );

        assert_eq!(tracker.len(), 3);
        assert!(output.contains("Error: Result must be W, L, or D."));
        assert!(output.contains("Overall: 1-1-1 (Total: 3)"));
        assert!(output.contains("Winrate (D = half-win): 50.0%"));
        assert!(output.contains("  Azorius Control: 1-1-0 | 50.0% | 2 matches"));
    }

    #[test]
    fn test_match_history_filter_and_default_count() {
        let mut deck = Deck::new();
        let mut tracker = MatchupTracker::new();
        tracker.add_match("Azorius Control", "W", "").unwrap();
        tracker.add_match("Mono-Red Aggro", "L", "burned out").unwrap();

        let (_, output) = run_script(&mut deck, &mut tracker, &["11", "red", "-5", "12"]);
        assert!(output.contains("| L | vs Mono-Red Aggro — burned out"));
        assert!(!output.contains("vs Azorius Control"));
    }

    #[test]
    fn test_empty_views() {
        let mut deck = Deck::new();
        let mut tracker = MatchupTracker::new();

        let (_, output) = run_script(&mut deck, &mut tracker, &["2", "10", "11", "", "", "99", "12"]);
        assert!(output.contains("(empty)"));
        assert!(output.contains("By opponent: (no matches yet)"));
        assert!(output.contains("(no matches yet)"));
        assert!(output.contains("Invalid option. Try again."));
    }
}
