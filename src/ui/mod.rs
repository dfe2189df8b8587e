//! User interface rendering and input handling.
//!
//! - **renderer**: crossterm renderer plus a plain-text debug renderer
//! - **keymapper**: key and mouse events to session inputs
//! - **controls**: game screen layout and clickable on-screen buttons

pub mod controls;
pub mod keymapper;
pub mod renderer;

pub use keymapper::{Action, KeyMapper};
pub use renderer::{DebugRenderer, Renderer};
