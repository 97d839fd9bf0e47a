// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture},
    style::{Attribute, Print, SetAttribute},
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// What the terminal currently shows, used to skip unchanged cells.
struct LastFrame {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl LastFrame {
    fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; width as usize * height as usize],
        }
    }
}

pub struct Terminal {
    stdout: Stdout,
    last: Option<LastFrame>,
    run_buf: String,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(EnableMouseCapture)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore(&mut out);
            return Err(e);
        }
        tracing::debug!("terminal entered raw mode with mouse capture");
        Ok(Self {
            stdout: out,
            last: None,
            run_buf: String::with_capacity(64),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let size_changed = self
            .last
            .as_ref()
            .map(|l| l.width != frame.width || l.height != frame.height)
            .unwrap_or(true);

        if size_changed || frame.is_dirty_all() {
            self.draw_full(frame)?;
        } else {
            self.draw_dirty(frame)?;
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn draw_full(&mut self, frame: &Frame) -> Result<()> {
        self.stdout
            .queue(terminal::Clear(terminal::ClearType::All))?;
        let last = self
            .last
            .insert(LastFrame::new(frame.width, frame.height));

        let mut cur_bold = false;
        for y in 0..frame.height {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let idx = y as usize * frame.width as usize + x as usize;
                let cell = frame.cell_at_index(idx);
                if cell.bold != cur_bold {
                    self.stdout.queue(bold_attr(cell.bold))?;
                    cur_bold = cell.bold;
                }
                self.stdout.queue(Print(cell.ch))?;
                last.cells[idx] = cell;
            }
        }
        Ok(())
    }

    /// Repaints only dirty cells, batching horizontal runs with the same
    /// attributes into a single print.
    fn draw_dirty(&mut self, frame: &Frame) -> Result<()> {
        let Some(last) = self.last.as_mut() else {
            return Ok(());
        };

        let width = frame.width as usize;
        let mut dirty = frame.dirty_indices().to_vec();
        dirty.sort_unstable();

        let mut cur_bold = false;
        let mut cur_pos: Option<usize> = None;
        let mut i = 0usize;
        while i < dirty.len() {
            let idx0 = dirty[i];
            let cell0 = frame.cell_at_index(idx0);
            if last.cells.get(idx0).copied() == Some(cell0) {
                i += 1;
                continue;
            }
            last.cells[idx0] = cell0;

            self.run_buf.clear();
            self.run_buf.push(cell0.ch);
            let mut end = idx0;
            let mut j = i + 1;
            while j < dirty.len() {
                let idx1 = dirty[j];
                // runs never wrap onto the next row
                if idx1 != end + 1 || idx1 % width == 0 {
                    break;
                }
                let cell1 = frame.cell_at_index(idx1);
                if last.cells.get(idx1).copied() == Some(cell1) || cell1.bold != cell0.bold {
                    break;
                }
                self.run_buf.push(cell1.ch);
                last.cells[idx1] = cell1;
                end = idx1;
                j += 1;
            }

            if cur_pos != Some(idx0) {
                let x = (idx0 % width) as u16;
                let y = (idx0 / width) as u16;
                self.stdout.queue(cursor::MoveTo(x, y))?;
            }
            if cell0.bold != cur_bold {
                self.stdout.queue(bold_attr(cell0.bold))?;
                cur_bold = cell0.bold;
            }
            self.stdout.queue(Print(self.run_buf.as_str()))?;
            cur_pos = if (end + 1) % width == 0 {
                None
            } else {
                Some(end + 1)
            };

            i = j;
        }
        Ok(())
    }
}

fn bold_attr(bold: bool) -> SetAttribute {
    SetAttribute(if bold {
        Attribute::Bold
    } else {
        Attribute::NormalIntensity
    })
}

fn restore(out: &mut Stdout) {
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore(&mut self.stdout);
        tracing::debug!("terminal restored");
    }
}

pub fn restore_terminal_best_effort() {
    restore(&mut stdout());
}
