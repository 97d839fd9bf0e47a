// Copyright (c) 2026 rezky_nightky

use std::sync::atomic::{AtomicU16, Ordering};

/// A cell coordinate on the character grid. `x` is the column, `y` the row,
/// growing downwards. Signed so that neighbours of the edge columns can be
/// expressed and rejected by the bounds checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn below(self) -> Self {
        Self::new(self.x, self.y + 1)
    }

    pub const fn below_left(self) -> Self {
        Self::new(self.x - 1, self.y + 1)
    }

    pub const fn below_right(self) -> Self {
        Self::new(self.x + 1, self.y + 1)
    }

    pub fn in_bounds(self, width: u16, height: u16) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < i32::from(width) && self.y < i32::from(height)
    }
}

impl From<(u16, u16)> for Pos {
    fn from((x, y): (u16, u16)) -> Self {
        Self::new(i32::from(x), i32::from(y))
    }
}

/// Last known terminal size, written by the render driver and the input
/// loop, read by the physics and spawner threads.
#[derive(Debug, Default)]
pub struct GridSize {
    width: AtomicU16,
    height: AtomicU16,
}

impl GridSize {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: AtomicU16::new(width),
            height: AtomicU16::new(height),
        }
    }

    pub fn get(&self) -> (u16, u16) {
        (
            self.width.load(Ordering::Relaxed),
            self.height.load(Ordering::Relaxed),
        )
    }

    /// Returns true when the stored size changed.
    pub fn set(&self, width: u16, height: u16) -> bool {
        let old_w = self.width.swap(width, Ordering::Relaxed);
        let old_h = self.height.swap(height, Ordering::Relaxed);
        old_w != width || old_h != height
    }
}
