// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// What is currently on screen, used to skip unchanged cells.
struct Shown {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Shown {
    fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::blank_with_bg(None); width as usize * height as usize],
        }
    }
}

#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
}

impl Pen {
    fn apply(&mut self, out: &mut Stdout, cell: &Cell) -> Result<()> {
        if cell.fg != self.fg {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = cell.fg;
        }
        if cell.bg != self.bg {
            out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            self.bg = cell.bg;
        }
        if cell.bold != self.bold {
            out.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            self.bold = cell.bold;
        }
        Ok(())
    }
}

pub struct Terminal {
    stdout: Stdout,
    shown: Option<Shown>,
    run_buf: String,
    row_dirty: Vec<Vec<usize>>,
    touched_rows: Vec<u16>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()
        })();
        if let Err(e) = init {
            restore_terminal_best_effort();
            return Err(e);
        }
        tracing::debug!("terminal initialized");
        Ok(Self {
            stdout: out,
            shown: None,
            run_buf: String::with_capacity(64),
            row_dirty: Vec::new(),
            touched_rows: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let resized = self
            .shown
            .as_ref()
            .map(|s| s.width != frame.width || s.height != frame.height)
            .unwrap_or(true);
        if resized {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.shown = Some(Shown::new(frame.width, frame.height));
        }

        let total = frame.width as usize * frame.height as usize;
        let dirty_is_large = total > 0 && frame.dirty_indices().len() >= total / 3;
        if resized || frame.is_dirty_all() || dirty_is_large {
            self.draw_full(frame)?;
        } else {
            self.draw_dirty(frame)?;
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn draw_full(&mut self, frame: &Frame) -> Result<()> {
        let Some(shown) = self.shown.as_mut() else {
            return Ok(());
        };
        let mut pen = Pen::default();
        for y in 0..frame.height {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let idx = y as usize * frame.width as usize + x as usize;
                let cell = frame.cell_at_index(idx);
                shown.cells[idx] = cell;
                if cell.is_wide_tail() {
                    continue;
                }
                pen.apply(&mut self.stdout, &cell)?;
                self.stdout.queue(Print(cell.ch))?;
                if let Some(mark) = cell.mark {
                    self.stdout.queue(Print(mark))?;
                }
            }
        }
        Ok(())
    }

    fn draw_dirty(&mut self, frame: &Frame) -> Result<()> {
        let Some(shown) = self.shown.as_mut() else {
            return Ok(());
        };
        let width = frame.width as usize;

        if self.row_dirty.len() != frame.height as usize {
            self.row_dirty = vec![Vec::new(); frame.height as usize];
        }
        self.touched_rows.clear();
        for &idx in frame.dirty_indices() {
            let y = idx / width;
            let Some(row) = self.row_dirty.get_mut(y) else {
                continue;
            };
            if row.is_empty() {
                self.touched_rows.push(y as u16);
            }
            row.push(idx);
        }
        self.touched_rows.sort_unstable();

        let mut pen = Pen::default();
        let mut cur_pos: Option<(u16, u16)> = None;

        for &y in &self.touched_rows {
            let row = &mut self.row_dirty[y as usize];
            row.sort_unstable();

            let mut i = 0usize;
            while i < row.len() {
                let idx0 = row[i];
                let cell0 = frame.cell_at_index(idx0);
                if shown.cells[idx0] == cell0 || cell0.is_wide_tail() {
                    shown.cells[idx0] = cell0;
                    cur_pos = None;
                    i += 1;
                    continue;
                }
                shown.cells[idx0] = cell0;

                self.run_buf.clear();
                self.run_buf.push(cell0.ch);
                self.run_buf.extend(cell0.mark);
                let mut run_cells: u16 = 1;
                let mut last_idx = idx0;
                let mut j = i + 1;
                while j < row.len() {
                    let idx1 = row[j];
                    if idx1 != last_idx + 1 {
                        break;
                    }
                    let cell1 = frame.cell_at_index(idx1);
                    if cell1.fg != cell0.fg || cell1.bg != cell0.bg || cell1.bold != cell0.bold {
                        break;
                    }
                    if !cell1.is_wide_tail() {
                        if shown.cells[idx1] == cell1 {
                            break;
                        }
                        self.run_buf.push(cell1.ch);
                        self.run_buf.extend(cell1.mark);
                    }
                    shown.cells[idx1] = cell1;
                    run_cells = run_cells.saturating_add(1);
                    last_idx = idx1;
                    j += 1;
                }

                let x0 = (idx0 % width) as u16;
                if cur_pos != Some((x0, y)) {
                    self.stdout.queue(cursor::MoveTo(x0, y))?;
                }
                pen.apply(&mut self.stdout, &cell0)?;
                self.stdout.queue(Print(self.run_buf.as_str()))?;

                let next_x = x0.saturating_add(run_cells);
                cur_pos = (next_x < frame.width).then_some((next_x, y));
                i = j;
            }
            row.clear();
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
        tracing::debug!("terminal restored");
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
