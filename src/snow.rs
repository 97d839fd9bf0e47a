// Copyright (c) 2026 rezky_nightky

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::Rng;

use crate::cell::Cell;
use crate::grid::Pos;
use crate::physics;
use crate::screen::Screen;

pub const FALLING_GLYPH: char = '*';
pub const SETTLED_GLYPH: char = '█';
pub const SETTLED_GLYPH_ASCII: char = '#';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flake {
    Falling,
    Settled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyphs {
    pub falling: char,
    pub settled: char,
}

impl Glyphs {
    pub fn new(ascii: bool) -> Self {
        Self {
            falling: FALLING_GLYPH,
            settled: if ascii {
                SETTLED_GLYPH_ASCII
            } else {
                SETTLED_GLYPH
            },
        }
    }

    pub fn for_flake(&self, flake: Flake) -> char {
        match flake {
            Flake::Falling => self.falling,
            Flake::Settled => self.settled,
        }
    }
}

impl Default for Glyphs {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Every flake on screen, keyed by position. All access goes through one
/// lock; nothing outside this type ever sees the map itself.
#[derive(Debug)]
pub struct Snow {
    flakes: Mutex<HashMap<Pos, Flake>>,
    glyphs: Glyphs,
}

impl Snow {
    pub fn new(glyphs: Glyphs) -> Self {
        Self {
            flakes: Mutex::new(HashMap::new()),
            glyphs,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Pos, Flake>> {
        // the map is replaced wholesale, so a panicked holder cannot have
        // left it half-written
        self.flakes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drops a falling flake at `pos`, replacing whatever was there.
    /// Coordinates outside the grid are accepted and pruned on the next
    /// `advance`.
    pub fn add(&self, pos: Pos) {
        self.lock().insert(pos, Flake::Falling);
    }

    /// Runs one physics tick over every flake and swaps in the result.
    pub fn advance<R: Rng>(&self, width: u16, height: u16, rng: &mut R) {
        let mut flakes = self.lock();
        let next = physics::step(&flakes, width, height, rng);
        *flakes = next;
    }

    /// Calls `paint` with every flake's position and glyph while the store is
    /// held steady.
    ///
    /// The store stays locked for the whole walk, so `paint` must not call
    /// back into this `Snow` (`add`, `advance`, `len`, another `snapshot`);
    /// the lock is not reentrant and doing so deadlocks.
    pub fn snapshot<F: FnMut(Pos, char)>(&self, mut paint: F) {
        let flakes = self.lock();
        for (&pos, &flake) in flakes.iter() {
            paint(pos, self.glyphs.for_flake(flake));
        }
    }

    pub fn paint<S: Screen + ?Sized>(&self, screen: &mut S) {
        self.snapshot(|pos, ch| screen.set_cell(pos.x, pos.y, Cell::glyph(ch)));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for Snow {
    fn default() -> Self {
        Self::new(Glyphs::default())
    }
}
