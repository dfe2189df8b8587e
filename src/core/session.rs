//! Session management
//!
//! A `Session` is the whole terminal: the shell scrollback, the pending
//! input line, and the snake game when one is running. All state changes go
//! through its methods, and every deferred action is a timer owned by the
//! session so leaving game mode can cancel it.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::game::{Direction, GameSettings, GameState, TickOutcome};
use super::rng::FoodSource;
use super::shell::{self, Line, Outcome};
use super::timer::{TimerId, TimerKind, Timers};

pub const DEFAULT_TICK: Duration = Duration::from_millis(200);
pub const DEFAULT_LAUNCH_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_GAME_OVER_DELAY: Duration = Duration::from_millis(1500);

/// Interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Shell,
    Game,
}

/// Input the session understands, already decoded from raw key/mouse events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionInput {
    Char(char),
    Backspace,
    Submit,
    Turn(Direction),
    /// Leave the game (Esc or the on-screen exit button)
    Exit,
    ScrollUp(usize),
    ScrollDown(usize),
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Prompt drawn before the input line and echoed commands
    pub prompt: String,
    /// Lines shown at startup
    pub banner: Vec<Line>,
    pub game: GameSettings,
    pub tick: Duration,
    pub launch_delay: Duration,
    pub game_over_delay: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            prompt: "C:\\Admin>".to_string(),
            banner: default_banner(),
            game: GameSettings::default(),
            tick: DEFAULT_TICK,
            launch_delay: DEFAULT_LAUNCH_DELAY,
            game_over_delay: DEFAULT_GAME_OVER_DELAY,
        }
    }
}

pub fn default_banner() -> Vec<Line> {
    vec![
        Line::output(format!("SHELLSNAKE [Version {}]", env!("CARGO_PKG_VERSION"))),
        Line::output("(c) shellsnake contributors. All rights reserved."),
        Line::info("Type 'help' to list commands. TIP: try 'snake'"),
    ]
}

/// Terminal session: shell plus embedded game
pub struct Session {
    settings: SessionSettings,
    mode: Mode,
    history: Vec<Line>,
    input: String,
    game: Option<GameState>,
    rng: Box<dyn FoodSource>,
    timers: Timers,
    launch_timer: Option<TimerId>,
    tick_timer: Option<TimerId>,
    teardown_timer: Option<TimerId>,
    /// Lines scrolled up from the bottom of the scrollback
    scroll_offset: usize,
}

impl Session {
    pub fn new(settings: SessionSettings, rng: Box<dyn FoodSource>) -> Self {
        let history = settings.banner.clone();
        Self {
            settings,
            mode: Mode::Shell,
            history,
            input: String::new(),
            game: None,
            rng,
            timers: Timers::new(),
            launch_timer: None,
            tick_timer: None,
            teardown_timer: None,
            scroll_offset: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn prompt(&self) -> &str {
        &self.settings.prompt
    }

    pub fn history(&self) -> &[Line] {
        &self.history
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// True while the game launch delay is running
    #[cfg(test)]
    pub fn is_launching(&self) -> bool {
        self.launch_timer.is_some()
    }

    /// Next moment `advance` has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Apply one input. Returns true if anything visible changed.
    pub fn handle(&mut self, input: SessionInput, now: Instant) -> bool {
        match input {
            SessionInput::Char(ch) => self.type_char(ch),
            SessionInput::Backspace => self.backspace(),
            SessionInput::Submit => self.submit(now),
            SessionInput::Turn(dir) => self.turn(dir),
            SessionInput::Exit => self.exit(),
            SessionInput::ScrollUp(n) => self.scroll_up(n),
            SessionInput::ScrollDown(n) => self.scroll_down(n),
        }
    }

    pub fn type_char(&mut self, ch: char) -> bool {
        if self.mode != Mode::Shell || ch.is_control() {
            return false;
        }
        self.input.push(ch);
        true
    }

    pub fn backspace(&mut self) -> bool {
        if self.mode != Mode::Shell {
            return false;
        }
        self.input.pop().is_some()
    }

    /// Evaluate the pending input line
    pub fn submit(&mut self, now: Instant) -> bool {
        if self.mode != Mode::Shell {
            return false;
        }
        let raw = std::mem::take(&mut self.input);
        self.push_line(Line::command(raw.as_str()));

        match shell::evaluate(&raw) {
            Outcome::Clear => {
                self.history.clear();
                self.scroll_offset = 0;
            }
            Outcome::LaunchGame => {
                self.push_line(Line::success(shell::GAME_INIT_MESSAGE));
                if let Some(old) = self.launch_timer.take() {
                    self.timers.cancel(old);
                }
                let id = self
                    .timers
                    .schedule_once(now, self.settings.launch_delay, TimerKind::LaunchGame);
                self.launch_timer = Some(id);
                info!(delay_ms = self.settings.launch_delay.as_millis() as u64, "Game launch scheduled");
            }
            Outcome::Reply(line) => self.push_line(line),
            Outcome::Nothing => {}
        }
        true
    }

    pub fn turn(&mut self, dir: Direction) -> bool {
        if self.mode != Mode::Game {
            return false;
        }
        match self.game.as_mut() {
            Some(game) => game.turn(dir),
            None => false,
        }
    }

    /// Leave the game right away
    pub fn exit(&mut self) -> bool {
        self.teardown()
    }

    pub fn scroll_up(&mut self, lines: usize) -> bool {
        if self.mode != Mode::Shell {
            return false;
        }
        let max = self.history.len().saturating_sub(1);
        let next = (self.scroll_offset + lines).min(max);
        let changed = next != self.scroll_offset;
        self.scroll_offset = next;
        changed
    }

    pub fn scroll_down(&mut self, lines: usize) -> bool {
        if self.mode != Mode::Shell {
            return false;
        }
        let next = self.scroll_offset.saturating_sub(lines);
        let changed = next != self.scroll_offset;
        self.scroll_offset = next;
        changed
    }

    /// Run every timer due at `now`. Returns true if anything changed.
    pub fn advance(&mut self, now: Instant) -> bool {
        let mut changed = false;
        while let Some(fired) = self.timers.pop_due(now) {
            changed = true;
            match fired.kind {
                TimerKind::LaunchGame => {
                    if self.launch_timer == Some(fired.id) {
                        self.launch_timer = None;
                    }
                    self.start_game(fired.deadline);
                }
                TimerKind::Tick => self.on_tick(fired.deadline),
                TimerKind::GameOverTeardown => {
                    if self.teardown_timer == Some(fired.id) {
                        self.teardown_timer = None;
                    }
                    self.teardown();
                }
            }
        }
        changed
    }

    fn start_game(&mut self, now: Instant) {
        if self.mode == Mode::Game {
            return;
        }
        let game = GameState::new(self.settings.game, self.rng.as_mut());
        info!(grid = game.grid_size(), food = ?game.food(), "Game started");
        self.game = Some(game);
        self.mode = Mode::Game;
        let id = self
            .timers
            .schedule_repeating(now, self.settings.tick, TimerKind::Tick);
        self.tick_timer = Some(id);
    }

    fn on_tick(&mut self, now: Instant) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        match game.tick(self.rng.as_mut()) {
            TickOutcome::Collided(collision) => {
                info!(?collision, score = game.score(), "Game over");
                if let Some(id) = self.tick_timer.take() {
                    self.timers.cancel(id);
                }
                // The game-over flag only goes up once, so this runs once per game
                if self.teardown_timer.is_none() {
                    let id = self.timers.schedule_once(
                        now,
                        self.settings.game_over_delay,
                        TimerKind::GameOverTeardown,
                    );
                    self.teardown_timer = Some(id);
                }
            }
            TickOutcome::Ate => debug!(score = game.score(), len = game.snake().len(), "Food eaten"),
            TickOutcome::Moved | TickOutcome::Stopped => {}
        }
    }

    /// Return to the shell and report the score.
    ///
    /// Stops the game timers first. Does nothing outside game mode, so a
    /// second call never appends a second report.
    pub fn teardown(&mut self) -> bool {
        if self.mode != Mode::Game {
            return false;
        }
        for id in [self.tick_timer.take(), self.teardown_timer.take()].into_iter().flatten() {
            self.timers.cancel(id);
        }
        let score = self.game.take().map(|g| g.score()).unwrap_or(0);
        self.mode = Mode::Shell;
        info!(score, "Returned to shell");
        self.push_line(Line::error("GAME OVER"));
        self.push_line(Line::success(format!("FINAL SCORE: {}", score)));
        true
    }

    /// Cancel every pending timer. Called when the program exits.
    pub fn shutdown(&mut self) {
        self.timers.cancel_all();
        self.launch_timer = None;
        self.tick_timer = None;
        self.teardown_timer = None;
        debug!("Session timers cancelled");
    }

    fn push_line(&mut self, line: Line) {
        self.history.push(line);
        self.scroll_offset = 0;
    }
}
