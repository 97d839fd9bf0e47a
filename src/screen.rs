// Copyright (c) 2026 rezky_nightky

use std::io::Result;

use crate::cell::Cell;
use crate::frame::Frame;
use crate::terminal::Terminal;

/// The drawing surface the simulation paints onto. Coordinates outside the
/// current size are ignored, never an error.
pub trait Screen {
    fn size(&self) -> (u16, u16);
    fn clear(&mut self);
    fn set_cell(&mut self, x: i32, y: i32, cell: Cell);
    fn flush(&mut self) -> Result<()>;

    /// Re-reads the backing size; returns the size now in effect.
    fn sync_size(&mut self) -> Result<(u16, u16)> {
        Ok(self.size())
    }

    fn put_str(&mut self, x: i32, y: i32, text: &str, bold: bool) {
        for (i, ch) in text.chars().enumerate() {
            let Ok(off) = i32::try_from(i) else {
                break;
            };
            self.set_cell(x.saturating_add(off), y, Cell { ch, bold });
        }
    }
}

fn to_frame_coords(x: i32, y: i32) -> Option<(u16, u16)> {
    Some((u16::try_from(x).ok()?, u16::try_from(y).ok()?))
}

/// A bare frame is a screen whose flush goes nowhere.
impl Screen for Frame {
    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        Frame::clear(self);
    }

    fn set_cell(&mut self, x: i32, y: i32, cell: Cell) {
        if let Some((x, y)) = to_frame_coords(x, y) {
            self.set(x, y, cell);
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.clear_dirty();
        Ok(())
    }
}

/// Frame buffer backed by the real terminal.
pub struct TerminalScreen {
    term: Terminal,
    frame: Frame,
}

impl TerminalScreen {
    pub fn new(term: Terminal) -> Result<Self> {
        let (w, h) = term.size()?;
        Ok(Self {
            term,
            frame: Frame::new(w, h),
        })
    }
}

impl Screen for TerminalScreen {
    fn size(&self) -> (u16, u16) {
        (self.frame.width, self.frame.height)
    }

    fn clear(&mut self) {
        self.frame.clear();
    }

    fn set_cell(&mut self, x: i32, y: i32, cell: Cell) {
        if let Some((x, y)) = to_frame_coords(x, y) {
            self.frame.set(x, y, cell);
        }
    }

    fn flush(&mut self) -> Result<()> {
        if self.frame.is_dirty_all() || !self.frame.dirty_indices().is_empty() {
            self.term.draw(&mut self.frame)?;
        }
        Ok(())
    }

    fn sync_size(&mut self) -> Result<(u16, u16)> {
        let (w, h) = self.term.size()?;
        self.frame.resize(w, h);
        Ok((w, h))
    }
}
