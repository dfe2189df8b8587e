//! Game screen layout and the on-screen controls.
//!
//! The board is drawn with half-block characters: every terminal row holds
//! two grid rows and every grid column is two terminal columns wide, which
//! keeps cells roughly square. Below the board sits a row of clickable
//! buttons (direction pad and exit) for mouse-only use.

use unicode_width::UnicodeWidthStr;

use crate::core::game::Direction;

/// What a button does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Pad(Direction),
    Exit,
}

/// A clickable label on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: &'static str,
    pub control: Control,
    pub col: u16,
    pub row: u16,
    pub width: u16,
}

impl Button {
    pub fn contains(&self, col: u16, row: u16) -> bool {
        row == self.row && col >= self.col && col < self.col + self.width
    }
}

const PAD: [(&str, Direction); 4] = [
    ("[ ↑ ]", Direction::Up),
    ("[ ↓ ]", Direction::Down),
    ("[ ← ]", Direction::Left),
    ("[ → ]", Direction::Right),
];

pub const EXIT_LABEL: &str = "[ EXIT GAME ]";
pub const FOOTER_HINT: &str = "USE ARROW KEYS TO MOVE // ESC TO EXIT";

/// Screen positions for the game view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLayout {
    /// Column of the board's left border
    pub left: u16,
    /// Row of the SNAKE.EXE / SCORE header
    pub header_row: u16,
    /// Row of the board's top border
    pub board_top: u16,
    /// Board size including borders
    pub board_width: u16,
    pub board_height: u16,
    pub buttons: Vec<Button>,
    /// Row for the key hint, if there is room
    pub footer_row: Option<u16>,
    /// False when the terminal cannot hold the board
    pub fits: bool,
}

impl GameLayout {
    /// Center the game view in a `cols × rows` terminal
    pub fn compute(cols: u16, rows: u16, grid_size: i32) -> Self {
        let n = grid_size.max(1) as u16;
        let board_width = n * 2 + 2;
        let board_height = (n + 1) / 2 + 2;
        // header + board + buttons
        let needed = board_height + 2;
        let fits = cols >= board_width.max(Self::buttons_width()) && rows >= needed;

        let with_footer = rows > needed;
        let block = needed + u16::from(with_footer);
        let header_row = rows.saturating_sub(block) / 2;
        let board_top = header_row + 1;
        let left = cols.saturating_sub(board_width) / 2;
        let buttons_row = board_top + board_height;

        let mut buttons = Vec::with_capacity(PAD.len() + 1);
        let mut col = left;
        for (label, dir) in PAD {
            let width = label.width() as u16;
            buttons.push(Button { label, control: Control::Pad(dir), col, row: buttons_row, width });
            col += width + 1;
        }
        let exit_width = EXIT_LABEL.width() as u16;
        let exit_col = (left + board_width).saturating_sub(exit_width).max(col);
        buttons.push(Button {
            label: EXIT_LABEL,
            control: Control::Exit,
            col: exit_col,
            row: buttons_row,
            width: exit_width,
        });

        Self {
            left,
            header_row,
            board_top,
            board_width,
            board_height,
            buttons,
            footer_row: with_footer.then_some(buttons_row + 1),
            fits,
        }
    }

    /// Narrowest row of buttons
    fn buttons_width() -> u16 {
        let pad: usize = PAD.iter().map(|(l, _)| l.width() + 1).sum();
        (pad + EXIT_LABEL.width()) as u16
    }

    /// Control under a mouse click
    pub fn hit(&self, col: u16, row: u16) -> Option<Control> {
        self.buttons.iter().find(|b| b.contains(col, row)).map(|b| b.control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_fits_default_terminal() {
        let layout = GameLayout::compute(80, 24, 20);
        assert!(layout.fits);
        assert_eq!(layout.board_width, 42);
        assert_eq!(layout.board_height, 12);
        assert_eq!(layout.left, 19);
        assert!(layout.footer_row.is_some());
        assert!(layout.footer_row.unwrap() < 24);
    }

    #[test]
    fn test_layout_too_small() {
        let layout = GameLayout::compute(30, 10, 20);
        assert!(!layout.fits);
    }

    #[test]
    fn test_hit_buttons() {
        let layout = GameLayout::compute(80, 24, 20);
        let up = &layout.buttons[0];
        assert_eq!(layout.hit(up.col, up.row), Some(Control::Pad(Direction::Up)));
        assert_eq!(layout.hit(up.col + up.width - 1, up.row), Some(Control::Pad(Direction::Up)));
        assert_eq!(layout.hit(up.col + up.width, up.row), None);
        assert_eq!(layout.hit(up.col, up.row + 1), None);

        let exit = layout.buttons.last().unwrap();
        assert_eq!(exit.control, Control::Exit);
        assert_eq!(exit.col + exit.width, layout.left + layout.board_width);
        assert_eq!(layout.hit(exit.col + 2, exit.row), Some(Control::Exit));
    }

    #[test]
    fn test_buttons_do_not_overlap() {
        let layout = GameLayout::compute(80, 24, 5);
        for pair in layout.buttons.windows(2) {
            assert!(pair[0].col + pair[0].width <= pair[1].col);
        }
    }
}
