//! Key mapping for session input
//!
//! Converts crossterm key and mouse events into session inputs. The same key
//! means different things in shell and game mode.

use bitflags::bitflags;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::core::game::Direction;
use crate::core::session::{Mode, SessionInput};
use crate::ui::controls::{Control, GameLayout};

/// Lines moved per PageUp/PageDown
pub const PAGE_LINES: usize = 10;
/// Lines moved per mouse wheel notch
pub const WHEEL_LINES: usize = 3;

bitflags! {
    /// Modifier keys
    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        let mut result = Modifiers::empty();
        if mods.contains(KeyModifiers::SHIFT) {
            result |= Modifiers::SHIFT;
        }
        if mods.contains(KeyModifiers::CONTROL) {
            result |= Modifiers::CTRL;
        }
        if mods.contains(KeyModifiers::ALT) {
            result |= Modifiers::ALT;
        }
        result
    }
}

/// What the main loop should do with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Session(SessionInput),
    /// Leave the program
    Quit,
}

/// Key mapper for converting events to actions
pub struct KeyMapper;

impl KeyMapper {
    /// Map a key press for the given mode
    pub fn map(event: &KeyEvent, mode: Mode) -> Option<Action> {
        let mods = Modifiers::from(event.modifiers);

        // Ctrl+C / Ctrl+D quit from anywhere
        if mods.contains(Modifiers::CTRL) {
            return match event.code {
                KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Char('d') | KeyCode::Char('D') => {
                    Some(Action::Quit)
                }
                _ => None,
            };
        }

        let input = match mode {
            Mode::Shell => Self::map_shell(event.code, mods)?,
            Mode::Game => Self::map_game(event.code)?,
        };
        Some(Action::Session(input))
    }

    fn map_shell(code: KeyCode, mods: Modifiers) -> Option<SessionInput> {
        match code {
            KeyCode::Char(ch) if !mods.contains(Modifiers::ALT) => Some(SessionInput::Char(ch)),
            KeyCode::Enter => Some(SessionInput::Submit),
            KeyCode::Backspace => Some(SessionInput::Backspace),
            KeyCode::PageUp => Some(SessionInput::ScrollUp(PAGE_LINES)),
            KeyCode::PageDown => Some(SessionInput::ScrollDown(PAGE_LINES)),
            KeyCode::Up if mods.contains(Modifiers::SHIFT) => Some(SessionInput::ScrollUp(1)),
            KeyCode::Down if mods.contains(Modifiers::SHIFT) => Some(SessionInput::ScrollDown(1)),
            _ => None,
        }
    }

    fn map_game(code: KeyCode) -> Option<SessionInput> {
        match code {
            KeyCode::Up => Some(SessionInput::Turn(Direction::Up)),
            KeyCode::Down => Some(SessionInput::Turn(Direction::Down)),
            KeyCode::Left => Some(SessionInput::Turn(Direction::Left)),
            KeyCode::Right => Some(SessionInput::Turn(Direction::Right)),
            KeyCode::Esc => Some(SessionInput::Exit),
            _ => None,
        }
    }

    /// Map a mouse event. Clicks only matter on the game buttons; the wheel
    /// scrolls the shell scrollback.
    pub fn map_mouse(event: &MouseEvent, mode: Mode, layout: Option<&GameLayout>) -> Option<Action> {
        let input = match (mode, event.kind) {
            (Mode::Shell, MouseEventKind::ScrollUp) => SessionInput::ScrollUp(WHEEL_LINES),
            (Mode::Shell, MouseEventKind::ScrollDown) => SessionInput::ScrollDown(WHEEL_LINES),
            (Mode::Game, MouseEventKind::Down(MouseButton::Left)) => {
                match layout?.hit(event.column, event.row)? {
                    Control::Pad(dir) => SessionInput::Turn(dir),
                    Control::Exit => SessionInput::Exit,
                }
            }
            _ => return None,
        };
        Some(Action::Session(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    fn session_action(input: SessionInput) -> Option<Action> {
        Some(Action::Session(input))
    }

    #[test]
    fn test_shell_keys() {
        let event = key_event(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event, Mode::Shell), session_action(SessionInput::Char('a')));

        let event = key_event(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(KeyMapper::map(&event, Mode::Shell), session_action(SessionInput::Char('A')));

        let event = key_event(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event, Mode::Shell), session_action(SessionInput::Submit));

        let event = key_event(KeyCode::PageUp, KeyModifiers::NONE);
        assert_eq!(
            KeyMapper::map(&event, Mode::Shell),
            session_action(SessionInput::ScrollUp(PAGE_LINES))
        );

        // Arrows do nothing at the prompt
        let event = key_event(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event, Mode::Shell), None);
    }

    #[test]
    fn test_game_keys() {
        let event = key_event(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(
            KeyMapper::map(&event, Mode::Game),
            session_action(SessionInput::Turn(Direction::Up))
        );

        let event = key_event(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event, Mode::Game), session_action(SessionInput::Exit));

        // Typing is ignored while playing
        let event = key_event(KeyCode::Char('w'), KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event, Mode::Game), None);
    }

    #[test]
    fn test_quit_keys() {
        for mode in [Mode::Shell, Mode::Game] {
            let event = key_event(KeyCode::Char('c'), KeyModifiers::CONTROL);
            assert_eq!(KeyMapper::map(&event, mode), Some(Action::Quit));
        }
        let event = key_event(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(KeyMapper::map(&event, Mode::Shell), None);
    }

    #[test]
    fn test_mouse_buttons() {
        let layout = GameLayout::compute(80, 24, 20);
        let exit = layout.buttons.last().unwrap().clone();
        let event = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: exit.col,
            row: exit.row,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            KeyMapper::map_mouse(&event, Mode::Game, Some(&layout)),
            session_action(SessionInput::Exit)
        );
        assert_eq!(KeyMapper::map_mouse(&event, Mode::Shell, Some(&layout)), None);

        let left = &layout.buttons[2];
        let event = MouseEvent { column: left.col + 1, row: left.row, ..event };
        assert_eq!(
            KeyMapper::map_mouse(&event, Mode::Game, Some(&layout)),
            session_action(SessionInput::Turn(Direction::Left))
        );
    }

    #[test]
    fn test_mouse_wheel() {
        let event = MouseEvent {
            kind: MouseEventKind::ScrollUp,
            column: 5,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            KeyMapper::map_mouse(&event, Mode::Shell, None),
            session_action(SessionInput::ScrollUp(WHEEL_LINES))
        );
        assert_eq!(KeyMapper::map_mouse(&event, Mode::Game, None), None);
    }
}
