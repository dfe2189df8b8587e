//! Configuration and color scheme management for shellsnake.
//!
//! This module provides:
//! - TOML configuration file loading from `~/.shellsnake/config.toml`
//! - Built-in color schemes (hacker, vaporwave, retro, ice)
//! - Conversion into the session settings used by the core
//!
//! # Configuration File
//!
//! ```toml
//! # Color scheme: hacker, vaporwave, retro, ice
//! color_scheme = "retro"
//!
//! [shell]
//! prompt = "C:\\Admin>"
//! banner = ["SHELLSNAKE [Version 0.1.0]"]
//! hint = "Type 'help' to list commands. TIP: try 'snake'"
//!
//! [game]
//! grid_size = 20
//! tick_ms = 200
//! launch_delay_ms = 1000
//! game_over_delay_ms = 1500
//! score_increment = 10
//! food_placement = "free-cell"   # or "anywhere"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::game::{FoodPlacement, GameSettings, DEFAULT_GRID_SIZE, DEFAULT_SCORE_INCREMENT};
use crate::core::session::{self, SessionSettings};
use crate::core::shell::{Line, LineKind};

/// Smallest and largest accepted grid edge
pub const GRID_SIZE_RANGE: (i32, i32) = (5, 40);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Color scheme name
    pub color_scheme: String,
    /// Shell appearance
    pub shell: ShellConfig,
    /// Snake rules and timing
    pub game: GameConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color_scheme: "hacker".to_string(),
            shell: ShellConfig::default(),
            game: GameConfig::default(),
        }
    }
}

/// Shell configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub prompt: String,
    /// Startup lines
    pub banner: Vec<String>,
    /// Highlighted line after the banner
    pub hint: Option<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        let defaults = session::default_banner();
        let (hint, banner): (Vec<_>, Vec<_>) =
            defaults.into_iter().partition(|l| l.kind == LineKind::Info);
        Self {
            prompt: SessionSettings::default().prompt,
            banner: banner.into_iter().map(|l| l.content).collect(),
            hint: hint.into_iter().next().map(|l| l.content),
        }
    }
}

/// Game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub grid_size: i32,
    pub tick_ms: u64,
    pub launch_delay_ms: u64,
    pub game_over_delay_ms: u64,
    pub score_increment: u32,
    pub food_placement: FoodPlacement,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            tick_ms: session::DEFAULT_TICK.as_millis() as u64,
            launch_delay_ms: session::DEFAULT_LAUNCH_DELAY.as_millis() as u64,
            game_over_delay_ms: session::DEFAULT_GAME_OVER_DELAY.as_millis() as u64,
            score_increment: DEFAULT_SCORE_INCREMENT,
            food_placement: FoodPlacement::default(),
        }
    }
}

impl Config {
    /// Load configuration, falling back to defaults on any problem
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Ok(p) => p,
                Err(e) => {
                    warn!("{}", e);
                    return Self::default();
                }
            },
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Read and parse one file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// `~/.shellsnake/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(app_dir()?.join("config.toml"))
    }

    /// Get the color scheme
    pub fn get_color_scheme(&self) -> ColorScheme {
        ColorScheme::by_name(&self.color_scheme)
    }

    /// Settings for a new session. Out-of-range values are clamped.
    pub fn session_settings(&self) -> SessionSettings {
        let mut banner: Vec<Line> = self.shell.banner.iter().map(Line::output).collect();
        if let Some(hint) = &self.shell.hint {
            banner.push(Line::info(hint.as_str()));
        }
        let (min, max) = GRID_SIZE_RANGE;
        SessionSettings {
            prompt: self.shell.prompt.clone(),
            banner,
            game: GameSettings {
                grid_size: self.game.grid_size.clamp(min, max),
                score_increment: self.game.score_increment,
                food_placement: self.game.food_placement,
            },
            tick: Duration::from_millis(self.game.tick_ms.max(10)),
            launch_delay: Duration::from_millis(self.game.launch_delay_ms),
            game_over_delay: Duration::from_millis(self.game.game_over_delay_ms),
        }
    }
}

/// Color definition (RGB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to crossterm Color
    pub fn to_crossterm(&self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

/// Color scheme definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorScheme {
    pub name: String,

    pub background: Color,
    /// Main accent: output text, borders, snake body
    pub accent: Color,
    /// Prompt and hints
    pub accent_light: Color,

    // Scrollback line colors
    pub command_fg: Color,
    pub error_fg: Color,
    pub success_fg: Color,

    // Game colors
    pub grid_bg: Color,
    pub head: Color,
    pub food: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::hacker()
    }
}

impl ColorScheme {
    /// Green phosphor
    pub fn hacker() -> Self {
        Self {
            name: "hacker".to_string(),
            background: Color::new(0, 0, 0),
            accent: Color::new(0, 255, 0),
            accent_light: Color::new(134, 239, 172),
            command_fg: Color::new(255, 255, 255),
            error_fg: Color::new(239, 68, 68),
            success_fg: Color::new(250, 204, 21),
            grid_bg: Color::new(5, 15, 5),
            head: Color::new(255, 255, 255),
            food: Color::new(239, 68, 68),
        }
    }

    /// Pink and cyan
    pub fn vaporwave() -> Self {
        Self {
            name: "vaporwave".to_string(),
            background: Color::new(20, 8, 32),
            accent: Color::new(255, 113, 206),
            accent_light: Color::new(1, 205, 254),
            command_fg: Color::new(255, 251, 150),
            error_fg: Color::new(255, 80, 80),
            success_fg: Color::new(5, 255, 161),
            grid_bg: Color::new(32, 12, 48),
            head: Color::new(1, 205, 254),
            food: Color::new(255, 251, 150),
        }
    }

    /// Amber monitor
    pub fn retro() -> Self {
        Self {
            name: "retro".to_string(),
            background: Color::new(16, 10, 0),
            accent: Color::new(255, 176, 0),
            accent_light: Color::new(255, 204, 102),
            command_fg: Color::new(255, 236, 200),
            error_fg: Color::new(255, 85, 0),
            success_fg: Color::new(255, 255, 170),
            grid_bg: Color::new(28, 18, 0),
            head: Color::new(255, 236, 200),
            food: Color::new(255, 85, 0),
        }
    }

    /// Cyan on navy
    pub fn ice() -> Self {
        Self {
            name: "ice".to_string(),
            background: Color::new(0, 10, 20),
            accent: Color::new(0, 255, 255),
            accent_light: Color::new(165, 243, 252),
            command_fg: Color::new(240, 253, 255),
            error_fg: Color::new(251, 113, 133),
            success_fg: Color::new(186, 230, 253),
            grid_bg: Color::new(4, 20, 36),
            head: Color::new(240, 253, 255),
            food: Color::new(251, 113, 133),
        }
    }

    /// Get scheme by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "vaporwave" => Self::vaporwave(),
            "retro" | "amber" => Self::retro(),
            "ice" => Self::ice(),
            _ => Self::hacker(),
        }
    }

    /// List available schemes
    pub fn list() -> Vec<&'static str> {
        vec!["hacker", "vaporwave", "retro", "ice"]
    }

    /// Foreground for a scrollback line
    pub fn line_color(&self, kind: LineKind) -> Color {
        match kind {
            LineKind::Error => self.error_fg,
            LineKind::Success => self.success_fg,
            LineKind::Command => self.command_fg,
            LineKind::Output | LineKind::Info => self.accent,
        }
    }
}

/// `~/.shellsnake`, created on demand
pub fn app_dir() -> Result<PathBuf, ConfigError> {
    let home = home_dir().ok_or(ConfigError::NoHomeDir)?;
    let dir = home.join(".shellsnake");
    if !dir.exists() {
        let _ = fs::create_dir_all(&dir);
    }
    Ok(dir)
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        let settings = config.session_settings();
        assert_eq!(settings.game, GameSettings::default());
        assert_eq!(settings.tick, session::DEFAULT_TICK);
        assert_eq!(settings.banner, session::default_banner());
        assert_eq!(config.get_color_scheme().name, "hacker");
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse(
            r#"
            color_scheme = "Retro"

            [game]
            tick_ms = 120
            food_placement = "anywhere"
            "#,
        )
        .unwrap();
        let settings = config.session_settings();
        assert_eq!(settings.tick, Duration::from_millis(120));
        assert_eq!(settings.game.food_placement, FoodPlacement::Anywhere);
        assert_eq!(settings.game.grid_size, DEFAULT_GRID_SIZE);
        assert_eq!(settings.launch_delay, session::DEFAULT_LAUNCH_DELAY);
        assert_eq!(config.get_color_scheme().name, "retro");
    }

    #[test]
    fn test_grid_size_clamped() {
        let mut config = Config::default();
        config.game.grid_size = 1;
        assert_eq!(config.session_settings().game.grid_size, GRID_SIZE_RANGE.0);
        config.game.grid_size = 500;
        assert_eq!(config.session_settings().game.grid_size, GRID_SIZE_RANGE.1);
    }

    #[test]
    fn test_banner_and_hint() {
        let config = Config::parse(
            r#"
            [shell]
            prompt = "$"
            banner = ["one", "two"]
            hint = "three"
            "#,
        )
        .unwrap();
        let settings = config.session_settings();
        assert_eq!(settings.prompt, "$");
        assert_eq!(
            settings.banner,
            vec![Line::output("one"), Line::output("two"), Line::info("three")]
        );
    }

    #[test]
    fn test_invalid_placement_rejected() {
        assert!(Config::parse("[game]\nfood_placement = \"sideways\"").is_err());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let back = Config::parse(&text).unwrap();
        assert_eq!(back.game.tick_ms, 200);
        assert_eq!(back.shell.prompt, "C:\\Admin>");
    }

    #[test]
    fn test_file_errors_fall_back_to_defaults() {
        let dir = std::env::temp_dir().join(format!("shellsnake-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let missing = dir.join("missing.toml");
        assert!(matches!(Config::from_file(&missing), Err(ConfigError::Read { .. })));

        let broken = dir.join("broken.toml");
        fs::write(&broken, "[game]\ntick_ms = \"fast\"").unwrap();
        assert!(matches!(Config::from_file(&broken), Err(ConfigError::Parse { .. })));
        assert_eq!(Config::load(Some(&broken)).game.tick_ms, 200);

        let good = dir.join("good.toml");
        fs::write(&good, "[game]\ntick_ms = 90").unwrap();
        assert_eq!(Config::load(Some(&good)).game.tick_ms, 90);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unknown_scheme_falls_back() {
        assert_eq!(ColorScheme::by_name("nope").name, "hacker");
        for name in ColorScheme::list() {
            assert_eq!(ColorScheme::by_name(name).name, name);
        }
    }
}
