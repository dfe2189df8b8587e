//! Terminal renderer using crossterm
//!
//! Draws the session to the console: the scrollback and prompt in shell
//! mode, the board and controls in game mode. Every frame is a full redraw
//! inside a synchronized update, which is cheap at this screen size.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use tracing::debug;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::{Color, ColorScheme};
use crate::core::game::{Cell, GameState};
use crate::core::session::{Mode, Session};
use crate::core::shell::LineKind;
use crate::ui::controls::{Control, GameLayout, FOOTER_HINT};

pub const GAME_TITLE: &str = "SNAKE.EXE";
pub const GAME_OVER_BANNER: &str = " GAME OVER ";

/// One screen row of the scrollback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    pub kind: LineKind,
    /// Leading bytes of `text` that are the echoed prompt
    pub prompt_len: usize,
    pub text: String,
}

/// Split `text` into rows no wider than `width` display columns
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if current_width + w > width && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(ch);
        current_width += w;
    }
    rows.push(current);
    rows
}

/// Rows visible in a `width × height` scrollback area, oldest first.
///
/// The bottom of the area shows the newest line unless the session is
/// scrolled back.
pub fn shell_rows(session: &Session, width: usize, height: usize) -> Vec<ViewRow> {
    let history = session.history();
    let end = history.len().saturating_sub(session.scroll_offset());
    let mut rows: Vec<ViewRow> = Vec::with_capacity(height);

    for line in history[..end].iter().rev() {
        if rows.len() >= height {
            break;
        }
        let (full, prompt_len) = if line.kind == LineKind::Command {
            let prefix = format!("{} ", session.prompt());
            (format!("{}{}", prefix, line.content), prefix.len())
        } else {
            (line.content.clone(), 0)
        };

        let mut remaining_prompt = prompt_len;
        let mut wrapped: Vec<ViewRow> = wrap(&full, width)
            .into_iter()
            .map(|text| {
                let p = remaining_prompt.min(text.len());
                remaining_prompt -= p;
                ViewRow { kind: line.kind, prompt_len: p, text }
            })
            .collect();
        while let Some(row) = wrapped.pop() {
            if rows.len() >= height {
                break;
            }
            rows.push(row);
        }
    }
    rows.reverse();
    rows
}

/// Tail of the input line that fits after the prompt
fn visible_input(input: &str, width: usize) -> &str {
    let mut start = input.len();
    let mut used = 0;
    for (idx, ch) in input.char_indices().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = idx;
    }
    &input[start..]
}

/// Terminal renderer
pub struct Renderer {
    /// Whether the terminal has been initialized
    initialized: bool,
    scheme: ColorScheme,
    /// Current terminal size
    size: (u16, u16),
}

impl Renderer {
    pub fn new(scheme: ColorScheme) -> Self {
        Self {
            initialized: false,
            scheme,
            size: (80, 24),
        }
    }

    /// Initialize the terminal for rendering
    pub fn init(&mut self) -> io::Result<()> {
        self.size = Self::size()?;
        terminal::enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            crossterm::event::EnableMouseCapture,
            DisableLineWrap,
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;
        stdout.flush()?;
        self.initialized = true;
        debug!(cols = self.size.0, rows = self.size.1, "Renderer initialized");
        Ok(())
    }

    /// Cleanup the terminal
    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;

        let mut stdout = io::stdout();
        let _ = execute!(stdout, ResetColor, SetAttribute(Attribute::Reset));
        let _ = execute!(stdout, Show);
        let _ = execute!(stdout, EnableLineWrap);
        let _ = execute!(stdout, crossterm::event::DisableMouseCapture);
        let _ = execute!(stdout, LeaveAlternateScreen);
        let _ = stdout.flush();

        // Disable raw mode - this is the most important part
        terminal::disable_raw_mode()?;
        debug!("Renderer cleaned up");
        Ok(())
    }

    pub fn set_size(&mut self, cols: u16, rows: u16) {
        self.size = (cols, rows);
    }

    /// Layout used for mouse hit-testing, only in game mode and only when
    /// the board is actually drawn
    pub fn game_layout(&self, session: &Session) -> Option<GameLayout> {
        let game = session.game()?;
        let layout = GameLayout::compute(self.size.0, self.size.1, game.grid_size());
        layout.fits.then_some(layout)
    }

    /// Render the session
    pub fn render(&mut self, session: &Session) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = io::BufWriter::with_capacity(65536, stdout.lock());

        // Begin synchronized update (reduces flicker)
        write!(out, "\x1b[?2026h")?;
        queue!(
            out,
            Hide,
            SetAttribute(Attribute::Reset),
            SetBackgroundColor(self.scheme.background.to_crossterm()),
            Clear(ClearType::All)
        )?;

        match (session.mode(), session.game()) {
            (Mode::Game, Some(game)) => self.render_game(&mut out, game)?,
            _ => self.render_shell(&mut out, session)?,
        }

        queue!(out, ResetColor)?;
        // End synchronized update
        write!(out, "\x1b[?2026l")?;
        out.flush()
    }

    fn render_shell<W: Write>(&self, out: &mut W, session: &Session) -> io::Result<()> {
        let (cols, rows) = self.size;
        let width = cols as usize;
        let area = rows.saturating_sub(2) as usize;
        let s = &self.scheme;

        for (i, row) in shell_rows(session, width, area).iter().enumerate() {
            queue!(out, MoveTo(0, i as u16))?;
            let (prompt, rest) = row.text.split_at(row.prompt_len);
            if !prompt.is_empty() {
                queue!(out, SetForegroundColor(s.accent_light.to_crossterm()), Print(prompt))?;
            }
            queue!(out, SetForegroundColor(s.line_color(row.kind).to_crossterm()), Print(rest))?;
        }

        if session.scroll_offset() > 0 {
            let indicator = format!("[↑ {} lines]", session.scroll_offset());
            let col = cols.saturating_sub(indicator.width() as u16);
            queue!(
                out,
                MoveTo(col, 0),
                SetAttribute(Attribute::Reverse),
                SetForegroundColor(s.accent_light.to_crossterm()),
                Print(&indicator),
                SetAttribute(Attribute::NoReverse)
            )?;
        }

        if rows >= 2 {
            queue!(
                out,
                MoveTo(0, rows - 2),
                SetForegroundColor(s.accent.to_crossterm()),
                SetAttribute(Attribute::Dim),
                Print("─".repeat(width)),
                SetAttribute(Attribute::NormalIntensity)
            )?;
        }

        let prompt = format!("{} ", session.prompt());
        let input = visible_input(session.input(), width.saturating_sub(prompt.width() + 1));
        let prompt_row = rows.saturating_sub(1);
        queue!(
            out,
            MoveTo(0, prompt_row),
            SetForegroundColor(s.accent_light.to_crossterm()),
            Print(&prompt),
            SetForegroundColor(s.command_fg.to_crossterm()),
            Print(input)
        )?;

        // The prompt always has focus
        let cursor_col = (prompt.width() + input.width()).min(width.saturating_sub(1)) as u16;
        queue!(out, MoveTo(cursor_col, prompt_row), Show)?;
        Ok(())
    }

    fn render_game<W: Write>(&self, out: &mut W, game: &GameState) -> io::Result<()> {
        let (cols, rows) = self.size;
        let layout = GameLayout::compute(cols, rows, game.grid_size());
        let s = &self.scheme;

        if !layout.fits {
            let msg = format!(
                "Terminal too small for the game (need {}x{}). ESC to exit.",
                layout.board_width,
                layout.board_height + 2
            );
            queue!(
                out,
                MoveTo(0, rows / 2),
                SetForegroundColor(s.error_fg.to_crossterm()),
                Print(msg)
            )?;
            return Ok(());
        }

        let right = layout.left + layout.board_width;

        // Header
        let score = format!("SCORE: {}", game.score());
        queue!(
            out,
            SetAttribute(Attribute::Bold),
            SetForegroundColor(s.accent.to_crossterm()),
            MoveTo(layout.left, layout.header_row),
            Print(GAME_TITLE),
            MoveTo(right.saturating_sub(score.width() as u16), layout.header_row),
            Print(&score),
            SetAttribute(Attribute::NormalIntensity)
        )?;

        // Board
        let n = game.grid_size() as usize;
        let inner = "─".repeat(n * 2);
        queue!(
            out,
            MoveTo(layout.left, layout.board_top),
            Print(format!("┌{}┐", inner)),
            MoveTo(layout.left, layout.board_top + layout.board_height - 1),
            Print(format!("└{}┘", inner))
        )?;

        let cells = game.cells();
        let pair_rows = (n + 1) / 2;
        for pair in 0..pair_rows {
            let row = layout.board_top + 1 + pair as u16;
            queue!(
                out,
                MoveTo(layout.left, row),
                SetForegroundColor(s.accent.to_crossterm()),
                SetBackgroundColor(s.background.to_crossterm()),
                Print("│")
            )?;
            for x in 0..n {
                let top = cells[2 * pair * n + x];
                let bottom = cells.get((2 * pair + 1) * n + x).copied();
                let bg = match bottom {
                    Some(cell) => self.cell_color(cell),
                    None => s.background,
                };
                queue!(
                    out,
                    SetForegroundColor(self.cell_color(top).to_crossterm()),
                    SetBackgroundColor(bg.to_crossterm()),
                    Print("▀▀")
                )?;
            }
            queue!(
                out,
                SetForegroundColor(s.accent.to_crossterm()),
                SetBackgroundColor(s.background.to_crossterm()),
                Print("│")
            )?;
        }

        if game.is_over() {
            let col = layout.left + (layout.board_width.saturating_sub(GAME_OVER_BANNER.len() as u16)) / 2;
            let row = layout.board_top + layout.board_height / 2;
            queue!(
                out,
                MoveTo(col, row),
                SetAttribute(Attribute::Bold),
                SetAttribute(Attribute::SlowBlink),
                SetForegroundColor(s.error_fg.to_crossterm()),
                Print(GAME_OVER_BANNER),
                SetAttribute(Attribute::Reset),
                SetBackgroundColor(s.background.to_crossterm())
            )?;
        }

        for button in &layout.buttons {
            let color = match button.control {
                Control::Exit => s.error_fg,
                Control::Pad(_) => s.accent,
            };
            queue!(
                out,
                MoveTo(button.col, button.row),
                SetForegroundColor(color.to_crossterm()),
                Print(button.label)
            )?;
        }

        if let Some(row) = layout.footer_row {
            let col = cols.saturating_sub(FOOTER_HINT.width() as u16) / 2;
            queue!(
                out,
                MoveTo(col, row),
                SetForegroundColor(s.accent_light.to_crossterm()),
                Print(FOOTER_HINT)
            )?;
        }
        Ok(())
    }

    fn cell_color(&self, cell: Cell) -> Color {
        match cell {
            Cell::Head => self.scheme.head,
            Cell::Body => self.scheme.accent,
            Cell::Food => self.scheme.food,
            Cell::Empty => self.scheme.grid_bg,
        }
    }

    /// Get terminal size
    pub fn size() -> io::Result<(u16, u16)> {
        terminal::size()
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Plain-text renderer for demo mode and tests
pub struct DebugRenderer;

impl DebugRenderer {
    /// Render the session as it would appear in a `cols × rows` terminal,
    /// one character per grid cell
    pub fn render(session: &Session, cols: u16, rows: u16) -> String {
        match (session.mode(), session.game()) {
            (Mode::Game, Some(game)) => Self::render_game(game),
            _ => Self::render_shell(session, cols, rows),
        }
    }

    fn render_shell(session: &Session, cols: u16, rows: u16) -> String {
        let width = cols as usize;
        let mut output = String::new();
        for row in shell_rows(session, width, rows.saturating_sub(2) as usize) {
            output.push_str(&row.text);
            output.push('\n');
        }
        output.push_str(&"─".repeat(width));
        output.push('\n');
        output.push_str(&format!("{} {}█\n", session.prompt(), session.input()));
        output
    }

    fn render_game(game: &GameState) -> String {
        let n = game.grid_size() as usize;
        let mut output = format!("{}  SCORE: {}\n", GAME_TITLE, game.score());
        output.push_str(&format!("+{}+\n", "-".repeat(n)));
        for (i, cell) in game.cells().iter().enumerate() {
            if i % n == 0 {
                output.push('|');
            }
            output.push(match cell {
                Cell::Head => '@',
                Cell::Body => 'o',
                Cell::Food => '*',
                Cell::Empty => '.',
            });
            if i % n == n - 1 {
                output.push_str("|\n");
            }
        }
        output.push_str(&format!("+{}+\n", "-".repeat(n)));
        if game.is_over() {
            output.push_str(GAME_OVER_BANNER.trim());
            output.push('\n');
        }
        output.push_str(FOOTER_HINT);
        output.push('\n');
        output
    }
}
