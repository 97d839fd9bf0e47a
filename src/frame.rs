// Copyright (c) 2026 rezky_nightky

use crate::cell::Cell;

/// In-memory screen buffer. Cells not written since the last `clear` read
/// back as blank; writes that change a cell are tracked so the terminal
/// writer only has to repaint what moved.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    gen: u32,
    cell_gen: Vec<u32>,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        let gen = 1u32;
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; len],
            gen,
            cell_gen: vec![gen; len],
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    /// Reallocates for a new size; the next draw repaints everything.
    pub fn resize(&mut self, width: u16, height: u16) {
        if width == self.width && height == self.height {
            return;
        }
        *self = Self::new(width, height);
    }

    /// Blanks every cell. Cells that were painted before and stay blank are
    /// marked dirty so the writer erases them.
    pub fn clear(&mut self) {
        if !self.dirty_all {
            for i in 0..self.cells.len() {
                if self.cell_gen[i] == self.gen
                    && self.cells[i] != Cell::BLANK
                    && !self.dirty_map[i]
                {
                    self.dirty_map[i] = true;
                    self.dirty.push(i);
                }
            }
        }
        self.gen = self.gen.wrapping_add(1);
        if self.gen == 0 {
            self.cell_gen.fill(0);
            self.gen = 1;
            self.dirty_all = true;
        }
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
            self.dirty.clear();
            return;
        }

        for &i in &self.dirty {
            if let Some(v) = self.dirty_map.get_mut(i) {
                *v = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[allow(dead_code)]
    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        self.index(x, y).map(|i| self.cell_at_index(i))
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        if self.cell_gen.get(i).copied() == Some(self.gen) {
            self.cells[i]
        } else {
            Cell::BLANK
        }
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let before_clear = if self.cell_gen[i] == self.gen.wrapping_sub(1) {
            self.cells[i]
        } else {
            Cell::BLANK
        };

        self.cells[i] = cell;
        self.cell_gen[i] = self.gen;

        // A cell repainted with what it held before the clear is unchanged
        // on the terminal; everything else needs a write.
        if !self.dirty_all && !self.dirty_map[i] && before_clear != cell {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }
}
