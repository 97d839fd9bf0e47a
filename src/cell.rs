// Copyright (c) 2026 rezky_nightky

/// One character slot of the screen buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub bold: bool,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        bold: false,
    };

    pub fn glyph(ch: char) -> Self {
        Self { ch, bold: false }
    }
}
