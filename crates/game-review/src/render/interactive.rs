//! Terminal replay of a reviewed game.
//!
//! Keys: ←/→ step through the moves, Home/End jump to either end, `f` flips
//! the board, `q` or Esc quits.

use std::io::{self, Write};

use chess_analysis::{commentary, GameAnalysis, MoveQuality};
use chess_core::Position;
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};

use super::{RenderError, ReportRenderer};

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// What a key press asks the replay to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayAction {
    Next,
    Previous,
    First,
    Last,
    Flip,
    Quit,
}

impl ReplayAction {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Right | KeyCode::Char('l') => Some(Self::Next),
            KeyCode::Left | KeyCode::Char('h') => Some(Self::Previous),
            KeyCode::Home => Some(Self::First),
            KeyCode::End => Some(Self::Last),
            KeyCode::Char('f') => Some(Self::Flip),
            KeyCode::Char('q') | KeyCode::Esc => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Replay cursor. `cursor` counts the plies already played: 0 is the
/// starting position, `plies` the final one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayState {
    cursor: usize,
    plies: usize,
    flipped: bool,
    quit: bool,
}

impl ReplayState {
    pub fn new(plies: usize) -> Self {
        Self {
            cursor: 0,
            plies,
            flipped: false,
            quit: false,
        }
    }

    pub fn apply(&mut self, action: ReplayAction) {
        match action {
            ReplayAction::Next => self.cursor = (self.cursor + 1).min(self.plies),
            ReplayAction::Previous => self.cursor = self.cursor.saturating_sub(1),
            ReplayAction::First => self.cursor = 0,
            ReplayAction::Last => self.cursor = self.plies,
            ReplayAction::Flip => self.flipped = !self.flipped,
            ReplayAction::Quit => self.quit = true,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Index of the move that led to the shown position.
    pub fn last_move(&self) -> Option<usize> {
        self.cursor.checked_sub(1)
    }
}

/// Piece placement of a position, indexed `[row][col]` with row 0 the 8th rank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardView {
    squares: [[Option<char>; 8]; 8],
}

impl BoardView {
    pub fn from_position(position: &Position) -> Self {
        let mut squares = [[None; 8]; 8];
        for (row, rank) in ('1'..='8').rev().enumerate() {
            for (col, file) in ('a'..='h').enumerate() {
                squares[row][col] = position
                    .piece_at(&format!("{}{}", file, rank))
                    .and_then(piece_symbol);
            }
        }
        Self { squares }
    }

    /// An unreadable FEN shows as an empty board.
    pub fn from_fen(fen: &str) -> Self {
        Position::from_fen(fen)
            .map(|position| Self::from_position(&position))
            .unwrap_or_default()
    }

    pub fn piece_at(&self, row: usize, col: usize) -> Option<char> {
        self.squares.get(row)?.get(col).copied().flatten()
    }

    pub fn piece_count(&self) -> usize {
        self.squares.iter().flatten().filter(|s| s.is_some()).count()
    }

    /// Board as styled lines with rank and file labels, White at the bottom
    /// unless `flipped`.
    pub fn lines(&self, flipped: bool) -> Vec<Line<'static>> {
        let order = |i: usize| if flipped { 7 - i } else { i };
        let mut lines = Vec::with_capacity(9);

        for display_row in 0..8 {
            let row = order(display_row);
            let mut spans = vec![Span::styled(
                format!("{} ", 8 - row),
                Style::default().fg(Color::Yellow),
            )];
            for display_col in 0..8 {
                let col = order(display_col);
                let light = (row + col) % 2 == 0;
                let bg = if light {
                    Color::Rgb(240, 217, 181)
                } else {
                    Color::Rgb(181, 136, 99)
                };
                let symbol = self.squares[row][col].unwrap_or(' ');
                spans.push(Span::styled(
                    format!(" {} ", symbol),
                    Style::default().fg(Color::Black).bg(bg),
                ));
            }
            lines.push(Line::from(spans));
        }

        let files: String = (0..8)
            .map(|i| format!(" {} ", (b'a' + order(i) as u8) as char))
            .collect();
        lines.push(Line::from(Span::styled(
            format!("  {}", files),
            Style::default().fg(Color::Yellow),
        )));
        lines
    }
}

const fn piece_symbol(piece: char) -> Option<char> {
    match piece {
        'K' => Some('\u{2654}'),
        'Q' => Some('\u{2655}'),
        'R' => Some('\u{2656}'),
        'B' => Some('\u{2657}'),
        'N' => Some('\u{2658}'),
        'P' => Some('\u{2659}'),
        'k' => Some('\u{265A}'),
        'q' => Some('\u{265B}'),
        'r' => Some('\u{265C}'),
        'b' => Some('\u{265D}'),
        'n' => Some('\u{265E}'),
        'p' => Some('\u{265F}'),
        _ => None,
    }
}

fn quality_color(quality: MoveQuality) -> Color {
    match quality {
        MoveQuality::Blunder => Color::Red,
        MoveQuality::Mistake => Color::LightRed,
        MoveQuality::Inaccuracy => Color::Yellow,
        MoveQuality::Good => Color::Gray,
        MoveQuality::Great => Color::Blue,
        MoveQuality::Excellent => Color::Green,
        MoveQuality::Best => Color::Cyan,
    }
}

/// FEN of the position after `cursor` plies.
fn fen_at(analysis: &GameAnalysis, cursor: usize) -> &str {
    match cursor.checked_sub(1) {
        Some(i) => analysis
            .moves
            .get(i)
            .map(|m| m.fen_after.as_str())
            .unwrap_or(START_FEN),
        None => match analysis.moves.first() {
            Some(m) => &m.fen_before,
            None if !analysis.headers.fen.is_empty() => &analysis.headers.fen,
            None => START_FEN,
        },
    }
}

/// Draw one frame of the replay.
pub fn draw(frame: &mut Frame, analysis: &GameAnalysis, state: &ReplayState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(11),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let title = Paragraph::new(analysis.headers.summary())
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title("Game Review"));
    frame.render_widget(title, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(30),
            Constraint::Length(30),
            Constraint::Min(20),
        ])
        .split(chunks[1]);

    let board = BoardView::from_fen(fen_at(analysis, state.cursor()));
    frame.render_widget(
        Paragraph::new(board.lines(state.is_flipped()))
            .block(Block::default().borders(Borders::ALL).title("Board")),
        body[0],
    );

    draw_move_list(frame, analysis, state, body[1]);
    draw_details(frame, analysis, state, body[2]);

    let help = Paragraph::new("←/→ step | Home/End jump | f flip | q quit")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);
}

fn draw_move_list(frame: &mut Frame, analysis: &GameAnalysis, state: &ReplayState, area: Rect) {
    let items: Vec<ListItem> = analysis
        .moves
        .iter()
        .map(|m| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<12}", format!("{}{}", m.notation(), m.quality.annotation()))),
                Span::styled(m.quality.label(), Style::default().fg(quality_color(m.quality))),
            ]))
        })
        .collect();

    let mut list_state = ListState::default().with_selected(state.last_move());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Moves"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_details(frame: &mut Frame, analysis: &GameAnalysis, state: &ReplayState, area: Rect) {
    let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::Yellow));

    let lines = match state.last_move().and_then(|i| analysis.moves.get(i)) {
        Some(m) => vec![
            Line::from(vec![label("Move: "), Span::raw(m.notation())]),
            Line::from(vec![
                label("Label: "),
                Span::styled(m.quality.label(), Style::default().fg(quality_color(m.quality))),
            ]),
            Line::from(vec![label("Eval: "), Span::raw(m.eval_after.to_string())]),
            Line::from(vec![
                label("Best: "),
                Span::raw(format!("{} ({})", m.best_san, m.best_eval)),
            ]),
            Line::from(""),
            Line::from(commentary::describe(m)),
        ],
        None => vec![
            Line::from("Starting position"),
            Line::from(format!("{} plies to review", analysis.moves.len())),
        ],
    };

    let details = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Analysis"));
    frame.render_widget(details, area);
}

fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    analysis: &GameAnalysis,
) -> Result<(), RenderError> {
    let mut state = ReplayState::new(analysis.moves.len());

    while !state.should_quit() {
        terminal.draw(|frame| draw(frame, analysis, &state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(action) = ReplayAction::from_key(key.code) {
                state.apply(action);
            }
        }
    }
    Ok(())
}

/// Full-screen replay on the controlling terminal.
#[derive(Debug, Default)]
pub struct InteractiveRenderer;

impl InteractiveRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ReportRenderer for InteractiveRenderer {
    fn render(&mut self, analysis: &GameAnalysis) -> Result<(), RenderError> {
        let _guard = TerminalGuard::enter(io::stdout())?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        run_loop(&mut terminal, analysis)
    }
}

/// Raw mode plus the alternate screen. Both are restored when the guard is
/// dropped, including while unwinding from a panic.
struct TerminalGuard<W: Write> {
    out: W,
}

impl<W: Write> TerminalGuard<W> {
    fn enter(out: W) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut guard = Self { out };
        execute!(guard.out, EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.out, LeaveAlternateScreen, Show);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_analysis::{Evaluation, MoveAnalysis};
    use chess_core::{Color as Side, GameHeaders};
    use ratatui::backend::TestBackend;

    #[test]
    fn key_bindings() {
        assert_eq!(ReplayAction::from_key(KeyCode::Right), Some(ReplayAction::Next));
        assert_eq!(ReplayAction::from_key(KeyCode::Left), Some(ReplayAction::Previous));
        assert_eq!(ReplayAction::from_key(KeyCode::Home), Some(ReplayAction::First));
        assert_eq!(ReplayAction::from_key(KeyCode::End), Some(ReplayAction::Last));
        assert_eq!(ReplayAction::from_key(KeyCode::Char('f')), Some(ReplayAction::Flip));
        assert_eq!(ReplayAction::from_key(KeyCode::Esc), Some(ReplayAction::Quit));
        assert_eq!(ReplayAction::from_key(KeyCode::Char('q')), Some(ReplayAction::Quit));
        assert_eq!(ReplayAction::from_key(KeyCode::Char('x')), None);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut state = ReplayState::new(3);
        state.apply(ReplayAction::Previous);
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.last_move(), None);

        state.apply(ReplayAction::Next);
        state.apply(ReplayAction::Next);
        assert_eq!(state.cursor(), 2);
        assert_eq!(state.last_move(), Some(1));

        state.apply(ReplayAction::Last);
        state.apply(ReplayAction::Next);
        assert_eq!(state.cursor(), 3);

        state.apply(ReplayAction::First);
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn flip_and_quit() {
        let mut state = ReplayState::new(0);
        assert!(!state.is_flipped());
        state.apply(ReplayAction::Flip);
        assert!(state.is_flipped());
        state.apply(ReplayAction::Flip);
        assert!(!state.is_flipped());

        assert!(!state.should_quit());
        state.apply(ReplayAction::Quit);
        assert!(state.should_quit());
    }

    #[test]
    fn board_follows_played_moves() {
        let position = Position::startpos().apply("g1f3").unwrap();
        let board = BoardView::from_position(&position);
        assert_eq!(board.piece_count(), 32);
        assert_eq!(board.piece_at(5, 5), Some('\u{2658}'));
        assert_eq!(board.piece_at(7, 6), None);
    }

    #[test]
    fn board_from_starting_fen() {
        let board = BoardView::from_fen(START_FEN);
        assert_eq!(board.piece_count(), 32);
        assert_eq!(board.piece_at(7, 4), Some('\u{2654}'));
        assert_eq!(board.piece_at(0, 4), Some('\u{265A}'));
        assert_eq!(board.piece_at(4, 4), None);
    }

    #[test]
    fn malformed_fen_is_tolerated() {
        assert_eq!(BoardView::from_fen("").piece_count(), 0);
        assert_eq!(BoardView::from_fen("xxx/8/8/8/8/8/8/8 w - - 0 1").piece_count(), 0);
        assert_eq!(BoardView::from_fen("KKKKKKKKKK/8 w - - 0 1").piece_count(), 0);
    }

    #[test]
    fn flipped_board_puts_black_at_the_bottom() {
        let board = BoardView::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        let text = |lines: Vec<Line<'static>>| -> Vec<String> {
            lines
                .iter()
                .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
                .collect()
        };

        let normal = text(board.lines(false));
        assert!(normal[0].starts_with("8 "));
        assert!(normal[7].contains('\u{2654}'));
        assert!(normal[8].trim_start().starts_with('a'));

        let flipped = text(board.lines(true));
        assert!(flipped[0].starts_with("1 "));
        assert!(flipped[7].contains('\u{265A}'));
        assert!(flipped[8].trim_start().starts_with('h'));
    }

    fn one_move_analysis() -> GameAnalysis {
        let after = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        let m = MoveAnalysis {
            ply: 0,
            move_number: 1,
            side: Side::White,
            san: "e4".to_string(),
            uci: "e2e4".to_string(),
            quality: MoveQuality::Best,
            eval_before: Evaluation::Centipawns(20),
            eval_after: Evaluation::Centipawns(35),
            delta: 15,
            cp_loss: 0,
            best_move: "e2e4".to_string(),
            best_san: "e4".to_string(),
            best_eval: Evaluation::Centipawns(35),
            fen_before: START_FEN.to_string(),
            fen_after: after.to_string(),
        };
        let headers = GameHeaders {
            white: "Alice".to_string(),
            black: "Bob".to_string(),
            ..Default::default()
        };
        GameAnalysis::new(headers, 16, vec![m])
    }

    #[test]
    fn fen_follows_cursor() {
        let analysis = one_move_analysis();
        assert_eq!(fen_at(&analysis, 0), START_FEN);
        assert!(fen_at(&analysis, 1).contains("4P3"));

        let empty = GameAnalysis::new(GameHeaders::default(), 16, Vec::new());
        assert_eq!(fen_at(&empty, 0), START_FEN);
    }

    fn screen(analysis: &GameAnalysis, state: &ReplayState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| draw(frame, analysis, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn draws_move_details() {
        let analysis = one_move_analysis();
        let mut state = ReplayState::new(1);

        let start = screen(&analysis, &state);
        assert!(start.contains("Alice vs Bob"));
        assert!(start.contains("Starting position"));

        state.apply(ReplayAction::Next);
        let after = screen(&analysis, &state);
        assert!(after.contains("1. e4"));
        assert!(after.contains("Best move (+0.35)."));
    }

    #[test]
    fn guard_restores_screen_on_drop() {
        let mut out = Vec::new();
        {
            let _guard = TerminalGuard { out: &mut out };
        }
        let written = String::from_utf8_lossy(&out);
        assert!(written.contains("\x1b[?1049l"));
        assert!(written.contains("\x1b[?25h"));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn action() -> impl Strategy<Value = ReplayAction> {
            prop_oneof![
                Just(ReplayAction::Next),
                Just(ReplayAction::Previous),
                Just(ReplayAction::First),
                Just(ReplayAction::Last),
                Just(ReplayAction::Flip),
            ]
        }

        proptest! {
            #[test]
            fn cursor_never_leaves_the_game(
                plies in 0usize..200,
                actions in proptest::collection::vec(action(), 0..100)
            ) {
                let mut state = ReplayState::new(plies);
                for action in actions {
                    state.apply(action);
                    prop_assert!(state.cursor() <= plies);
                    prop_assert_eq!(state.last_move().is_some(), state.cursor() > 0);
                }
            }
        }
    }
}
