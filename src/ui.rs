use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use deck_tracker::{CardEntry, Deck, FilterQuery, MatchRecord, MatchupTracker, OpponentRow, Record, SortBy};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

/// Rows of match history shown on the Matchups page
const HISTORY_ROWS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Deck,
    Stats,
    Matchups,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Deck => Page::Stats,
            Page::Stats => Page::Matchups,
            Page::Matchups => Page::Deck,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Deck => Page::Matchups,
            Page::Stats => Page::Deck,
            Page::Matchups => Page::Stats,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Deck => "Deck",
            Page::Stats => "Stats",
            Page::Matchups => "Matchups",
        }
    }
}

/// Snapshot of the deck and match log; the browser never mutates either
pub struct App {
    pub entries: Vec<CardEntry>,
    pub deck_size: i64,
    pub type_counts: Vec<(String, i64)>,
    pub cost_counts: Vec<(String, i64)>,
    pub record: Record,
    pub winrate: f64,
    pub opponents: Vec<OpponentRow>,
    pub history: Vec<MatchRecord>,
    pub state: TableState,
    pub current_page: Page,
}

impl App {
    pub fn new(deck: &Deck, tracker: &MatchupTracker) -> Self {
        let entries: Vec<CardEntry> = deck
            .filter_entries(&FilterQuery::sorted_by(SortBy::Name))
            .into_iter()
            .cloned()
            .collect();

        let mut state = TableState::default();
        if !entries.is_empty() {
            state.select(Some(0));
        }

        Self {
            entries,
            deck_size: deck.deck_size(),
            type_counts: deck.type_counts(),
            cost_counts: deck.cost_counts(),
            record: tracker.overall_record(),
            winrate: tracker.winrate_overall(),
            opponents: tracker.winrate_by_opponent(),
            history: tracker
                .recent(HISTORY_ROWS, None)
                .into_iter()
                .cloned()
                .collect(),
            state,
            current_page: Page::Deck,
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn next(&mut self) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 20).min(len - 1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => i.saturating_sub(20),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn first(&mut self) {
        if !self.entries.is_empty() {
            self.state.select(Some(0));
        }
    }

    pub fn last(&mut self) {
        if !self.entries.is_empty() {
            self.state.select(Some(self.entries.len() - 1));
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.first(),
                KeyCode::End => app.last(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Deck => render_deck(f, chunks[1], app),
        Page::Stats => render_stats(f, chunks[1], app),
        Page::Matchups => render_matchups(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn header_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Deck, Page::Stats, Page::Matchups];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Cards: {} ({} unique)", app.deck_size, app.entries.len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("W {}", app.record.wins),
        Style::default().fg(Color::Green),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("L {}", app.record.losses),
        Style::default().fg(Color::Red),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("D {}", app.record.draws),
        Style::default().fg(Color::Yellow),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_deck(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Qty", "Name", "Type", "Cost"]
        .iter()
        .map(|h| Cell::from(*h).style(header_style()));

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.entries.iter().map(|entry| {
        let cost = entry.cost();
        let color = if cost.has_x {
            Color::Magenta
        } else if cost.numeric.is_some() {
            Color::White
        } else {
            Color::DarkGray
        };
        let cost_text = if entry.mana_cost_raw.is_empty() {
            "?".to_string()
        } else {
            entry.mana_cost_raw.clone()
        };

        Row::new(vec![
            Cell::from(entry.qty.to_string()),
            Cell::from(truncate(&entry.name, 40)),
            Cell::from(truncate(&entry.card_type, 24)),
            Cell::from(cost_text).style(Style::default().fg(color)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(42),
            Constraint::Length(26),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Deck "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_stats(f: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    f.render_widget(count_table(" Type counts ", "Type", &app.type_counts), columns[0]);
    f.render_widget(count_table(" Cost buckets ", "Cost", &app.cost_counts), columns[1]);
}

fn count_table<'a>(title: &'a str, label: &'a str, counts: &'a [(String, i64)]) -> Table<'a> {
    let header = Row::new([label, "Count"].map(|h| Cell::from(h).style(header_style())))
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = counts.iter().map(|(name, count)| {
        Row::new(vec![Cell::from(name.as_str()), Cell::from(count.to_string())]).height(1)
    });

    Table::new(rows, [Constraint::Min(20), Constraint::Length(8)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
}

fn render_matchups(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let header = Row::new(
        ["Opponent", "W", "L", "D", "Winrate", "Games"].map(|h| Cell::from(h).style(header_style())),
    )
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows = app.opponents.iter().map(|row| {
        let color = if row.winrate >= 50.0 {
            Color::Green
        } else {
            Color::Red
        };
        Row::new(vec![
            Cell::from(truncate(&row.opponent, 30)),
            Cell::from(row.wins.to_string()),
            Cell::from(row.losses.to_string()),
            Cell::from(row.draws.to_string()),
            Cell::from(format!("{:.1}%", row.winrate)).style(Style::default().fg(color)),
            Cell::from((row.wins + row.losses + row.draws).to_string()),
        ])
        .height(1)
    });

    let title = format!(
        " By opponent - overall {}-{}-{} ({:.1}%) ",
        app.record.wins, app.record.losses, app.record.draws, app.winrate
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(32),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(9),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    );
    f.render_widget(table, chunks[0]);

    let history: Vec<Line> = if app.history.is_empty() {
        vec![Line::from("  (no matches yet)")]
    } else {
        app.history
            .iter()
            .map(|m| Line::from(format!("  {}", m.history_line())))
            .collect()
    };
    let history = Paragraph::new(history).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Recent matches "),
    );
    f.render_widget(history, chunks[1]);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.entries.len()),
        Style::default().fg(Color::Cyan),
    )];

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));
    status_spans.push(Span::styled("PgUp/PgDn", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Fast | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
