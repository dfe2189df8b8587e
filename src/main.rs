//! shellsnake - a retro fake shell with a built-in snake game
//!
//! shellsnake draws a small command prompt in the terminal. A handful of
//! informational commands print canned text, `clear` wipes the scrollback,
//! and `snake` boots a snake game on a 20×20 board inside the same screen.
//!
//! # Quick Start
//!
//! ```text
//! shellsnake                 # Start with ~/.shellsnake/config.toml
//! shellsnake -t retro        # Amber color scheme
//! shellsnake --seed 42       # Reproducible food placement
//! shellsnake --demo          # Print a scripted session, no TTY needed
//! ```
//!
//! # Keys
//!
//! | Key | Shell | Game |
//! |-----|-------|------|
//! | Enter | Run command | - |
//! | PageUp/PageDown | Scroll history | - |
//! | Arrow keys | - | Turn |
//! | Esc | - | Exit game |
//! | Ctrl+C / Ctrl+D | Quit | Quit |

mod config;
mod core;
mod ui;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::{ColorScheme, Config};
use crate::core::game::Direction;
use crate::core::rng::{FoodSource, XorShift};
use crate::core::session::{Session, SessionInput};
use crate::ui::{Action, DebugRenderer, KeyMapper, Renderer};

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the log filter
const LOG_ENV: &str = "SHELLSNAKE_LOG";

/// Longest the main loop waits for input before checking timers again
const MAX_POLL: Duration = Duration::from_millis(100);

#[derive(Error, Debug, PartialEq, Eq)]
enum ArgError {
    #[error("Unknown argument: {0}. Use -h for help.")]
    Unknown(String),

    #[error("Missing value for {0}")]
    MissingValue(&'static str),

    #[error("Invalid number for {flag}: {value}")]
    InvalidNumber { flag: &'static str, value: String },
}

/// Command line options
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    /// Color scheme override
    theme: Option<String>,
    /// Tick period override in milliseconds
    tick_ms: Option<u64>,
    /// Fixed PRNG seed
    seed: Option<u64>,
    /// Alternate config file
    config: Option<PathBuf>,
    /// Print a scripted session instead of running interactively
    demo: bool,
    help: bool,
    version: bool,
}

fn print_version() {
    eprintln!("shellsnake {}", VERSION);
}

fn print_help() {
    eprintln!("shellsnake {} - A retro fake shell with a built-in snake game", VERSION);
    eprintln!();
    eprintln!("Usage: shellsnake [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -t, --theme <NAME>    Color scheme ({})", ColorScheme::list().join(", "));
    eprintln!("      --tick <MS>       Game speed, milliseconds per step (default: 200)");
    eprintln!("      --seed <N>        Seed for food placement");
    eprintln!("  -c, --config <PATH>   Config file (default: ~/.shellsnake/config.toml)");
    eprintln!("      --demo            Print a scripted session and exit");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Shell commands: help, about, skills, projects, contact, clear, snake");
    eprintln!();
    eprintln!("Game keys:");
    eprintln!("  Arrow keys            Turn");
    eprintln!("  Esc                   Exit game");
    eprintln!();
    eprintln!("Quit: Ctrl+C or Ctrl+D");
    eprintln!("Log file: ~/.shellsnake/shellsnake.log (filter with {})", LOG_ENV);
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args, ArgError> {
    let mut parsed = Args::default();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => parsed.help = true,
            "-v" | "--version" => parsed.version = true,
            "-t" | "--theme" => {
                parsed.theme = Some(iter.next().ok_or(ArgError::MissingValue("--theme"))?);
            }
            "--tick" => {
                let value = iter.next().ok_or(ArgError::MissingValue("--tick"))?;
                parsed.tick_ms = Some(parse_number("--tick", value)?);
            }
            "--seed" => {
                let value = iter.next().ok_or(ArgError::MissingValue("--seed"))?;
                parsed.seed = Some(parse_number("--seed", value)?);
            }
            "-c" | "--config" => {
                let value = iter.next().ok_or(ArgError::MissingValue("--config"))?;
                parsed.config = Some(PathBuf::from(value));
            }
            "--demo" => parsed.demo = true,
            other => return Err(ArgError::Unknown(other.to_string())),
        }
    }

    Ok(parsed)
}

fn parse_number(flag: &'static str, value: String) -> Result<u64, ArgError> {
    value
        .parse()
        .map_err(|_| ArgError::InvalidNumber { flag, value })
}

/// Log to `~/.shellsnake/shellsnake.log`; stdout belongs to the UI
fn init_logging() {
    let log_path = config::app_dir()
        .map(|dir| dir.join("shellsnake.log"))
        .unwrap_or_else(|_| PathBuf::from("shellsnake.log"));

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };
    if args.help {
        print_help();
        return Ok(());
    }
    if args.version {
        print_version();
        return Ok(());
    }

    init_logging();
    info!("shellsnake {} starting...", VERSION);

    let mut config = Config::load(args.config.as_deref());
    if let Some(theme) = &args.theme {
        config.color_scheme = theme.clone();
    }
    if let Some(tick) = args.tick_ms {
        config.game.tick_ms = tick;
    }

    let rng: Box<dyn FoodSource> = match args.seed {
        Some(seed) => Box::new(XorShift::new(seed)),
        None => Box::new(XorShift::from_clock()),
    };
    let mut session = Session::new(config.session_settings(), rng);

    let result = if args.demo {
        run_demo(&mut session)
    } else {
        run_terminal(&mut session, config.get_color_scheme())
    };

    session.shutdown();
    if let Err(e) = &result {
        error!("Exited with error: {:#}", e);
    }
    info!("shellsnake exiting");
    result
}

/// Run interactively until the user quits
fn run_terminal(session: &mut Session, scheme: ColorScheme) -> anyhow::Result<()> {
    info!("Color scheme: {}", scheme.name);
    let mut renderer = Renderer::new(scheme);
    renderer.init()?;

    let result = run_main_loop(session, &mut renderer);

    // Cleanup runs even if the loop failed
    let _ = renderer.cleanup();
    result
}

/// Main event loop
fn run_main_loop(session: &mut Session, renderer: &mut Renderer) -> anyhow::Result<()> {
    renderer.render(session)?;

    loop {
        let now = Instant::now();
        let timeout = session
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
            .unwrap_or(MAX_POLL)
            .min(MAX_POLL);

        let mut dirty = false;
        if event::poll(timeout)? {
            let action = match event::read()? {
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    KeyMapper::map(&key_event, session.mode())
                }
                Event::Mouse(mouse_event) => {
                    let layout = renderer.game_layout(session);
                    KeyMapper::map_mouse(&mouse_event, session.mode(), layout.as_ref())
                }
                Event::Resize(cols, rows) => {
                    info!("Resize: {}x{}", cols, rows);
                    renderer.set_size(cols, rows);
                    dirty = true;
                    None
                }
                _ => None,
            };

            match action {
                Some(Action::Quit) => {
                    info!("Quit requested");
                    break;
                }
                Some(Action::Session(input)) => {
                    dirty |= session.handle(input, Instant::now());
                }
                None => {}
            }
        }

        dirty |= session.advance(Instant::now());
        if dirty {
            renderer.render(session)?;
        }
    }

    Ok(())
}

/// Scripted session printed as text, for terminals without raw mode
fn run_demo(session: &mut Session) -> anyhow::Result<()> {
    const COLS: u16 = 60;
    const ROWS: u16 = 16;

    println!("=== shellsnake Demo Mode ===\n");
    let t0 = Instant::now();
    let settings = session.settings().clone();

    for cmd in ["help", "whoami", "snake"] {
        for ch in cmd.chars() {
            session.handle(SessionInput::Char(ch), t0);
        }
        session.handle(SessionInput::Submit, t0);
    }
    println!("{}", DebugRenderer::render(session, COLS, ROWS));

    let mut now = t0 + settings.launch_delay;
    session.advance(now);
    for (step, turn) in [None, Some(Direction::Left), None, Some(Direction::Down)]
        .into_iter()
        .enumerate()
    {
        if let Some(dir) = turn {
            session.handle(SessionInput::Turn(dir), now);
        }
        now += settings.tick;
        session.advance(now);
        println!("--- tick {} ---", step + 1);
        println!("{}", DebugRenderer::render(session, COLS, ROWS));
    }

    session.handle(SessionInput::Exit, now);
    println!("{}", DebugRenderer::render(session, COLS, ROWS));
    println!("Demo complete. Run without --demo to play.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, ArgError> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_no_args() {
        assert_eq!(args(&[]), Ok(Args::default()));
    }

    #[test]
    fn test_all_options() {
        let parsed = args(&["-t", "ice", "--tick", "150", "--seed", "7", "-c", "my.toml", "--demo"]).unwrap();
        assert_eq!(parsed.theme.as_deref(), Some("ice"));
        assert_eq!(parsed.tick_ms, Some(150));
        assert_eq!(parsed.seed, Some(7));
        assert_eq!(parsed.config, Some(PathBuf::from("my.toml")));
        assert!(parsed.demo);
    }

    #[test]
    fn test_bad_args() {
        assert_eq!(args(&["--bogus"]), Err(ArgError::Unknown("--bogus".to_string())));
        assert_eq!(args(&["--tick"]), Err(ArgError::MissingValue("--tick")));
        assert_eq!(
            args(&["--seed", "abc"]),
            Err(ArgError::InvalidNumber { flag: "--seed", value: "abc".to_string() })
        );
    }

    #[test]
    fn test_demo_runs_headless() {
        let settings = Config::default().session_settings();
        let mut session = Session::new(settings, Box::new(XorShift::new(1)));
        run_demo(&mut session).unwrap();
        assert_eq!(session.mode(), crate::core::session::Mode::Shell);
        assert_eq!(session.history().last().map(|l| l.content.starts_with("FINAL SCORE")), Some(true));
    }
}
