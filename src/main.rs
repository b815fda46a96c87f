// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use deck_tracker::{
    export_decklist_text, import_decklist_text, load_deck, load_matchups, logging, save_deck,
    save_matchups, Config, Deck, Menu, MenuExit, MatchupTracker,
};

#[derive(Parser, Debug)]
#[command(name = "deck-tracker", version, about = "Track a card collection and match results")]
struct Cli {
    /// Deck file (default: $DECK_TRACKER_DECK_FILE or deck.json)
    #[arg(long, global = true, value_name = "PATH")]
    deck: Option<PathBuf>,

    /// Match log file (default: $DECK_TRACKER_MATCHUPS_FILE or matchups.json)
    #[arg(long, global = true, value_name = "PATH")]
    matchups: Option<PathBuf>,

    /// Log more (repeat for more)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive menu (default)
    Menu,

    /// Add the cards of a decklist text file to the deck
    Import {
        /// Decklist text file ("2 Sol Ring", "3x Lightning Bolt", "Command Tower")
        file: PathBuf,
    },

    /// Print the deck as decklist text
    Export {
        /// Write "1 " in front of singletons too
        #[arg(long)]
        include_ones: bool,
    },

    /// Print deck and matchup statistics
    Stats,

    /// Full-screen read-only browser
    #[cfg(feature = "tui")]
    Tui,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::from_env().with_overrides(cli.deck, cli.matchups);

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => run_menu(&config),
        Commands::Import { file } => run_import(&config, &file),
        Commands::Export { include_ones } => {
            let deck = load_deck(&config.deck_file);
            print!("{}", export_decklist_text(&deck, include_ones));
            Ok(())
        }
        Commands::Stats => {
            let deck = load_deck(&config.deck_file);
            let tracker = load_matchups(&config.matchups_file);
            print_stats(&deck, &tracker);
            Ok(())
        }
        #[cfg(feature = "tui")]
        Commands::Tui => run_ui_mode(&config),
    }
}

fn run_menu(config: &Config) -> Result<()> {
    let mut deck = load_deck(&config.deck_file);
    let mut tracker = load_matchups(&config.matchups_file);

    let stdin = io::stdin();
    let exit = Menu::new(&mut deck, &mut tracker, stdin.lock(), io::stdout())
        .with_recent_default(config.recent_default)
        .run()?;

    if exit == MenuExit::Save {
        save_deck(&deck, &config.deck_file)?;
        save_matchups(&tracker, &config.matchups_file)?;
        println!("Saved deck + matchups. Goodbye!");
    }
    Ok(())
}

fn run_import(config: &Config, file: &Path) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read decklist file: {:?}", file))?;

    let mut deck = load_deck(&config.deck_file);
    let summary = import_decklist_text(&mut deck, &text);
    save_deck(&deck, &config.deck_file)?;

    println!("Lines processed: {}", summary.lines_processed);
    println!("Entries added: {}", summary.entries_added);
    println!("Total cards added: {}", summary.cards_added_total);
    Ok(())
}

fn print_stats(deck: &Deck, tracker: &MatchupTracker) {
    println!("Total cards (with quantities): {}", deck.deck_size());
    println!("Unique cards: {}", deck.len());

    println!("\nType counts:");
    for (card_type, count) in deck.type_counts() {
        println!("  {}: {}", card_type, count);
    }

    println!("\nCost buckets:");
    for (bucket, count) in deck.cost_counts() {
        println!("  {}: {}", bucket, count);
    }

    let record = tracker.overall_record();
    println!(
        "\nOverall: {}-{}-{} (Total: {})",
        record.wins,
        record.losses,
        record.draws,
        record.total()
    );
    println!("Winrate (D = half-win): {:.1}%", record.winrate());

    for row in tracker.winrate_by_opponent() {
        println!(
            "  {}: {}-{}-{} | {:.1}% | {} matches",
            row.opponent,
            row.wins,
            row.losses,
            row.draws,
            row.winrate,
            row.wins + row.losses + row.draws
        );
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    let deck = load_deck(&config.deck_file);
    let tracker = load_matchups(&config.matchups_file);

    let mut app = ui::App::new(&deck, &tracker);
    ui::run_ui(&mut app)
}
