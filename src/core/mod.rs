//! Core session logic, independent of the terminal.
//!
//! - **shell**: scrollback line records and the command table
//! - **game**: snake grid simulation
//! - **timer**: cancellable deadlines driven by the main loop
//! - **rng**: xorshift generator for food placement
//! - **session**: the session state machine tying the above together
//!
//! # Architecture
//!
//! ```text
//! Session
//! ├── Mode (Shell | Game)
//! ├── history: Vec<Line> + input line
//! ├── GameState (only in game mode)
//! └── Timers (launch delay, tick, game-over delay)
//! ```

pub mod game;
pub mod rng;
pub mod session;
pub mod shell;
pub mod timer;
