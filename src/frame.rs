// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::{char_width, is_combining, Cell, Style, WIDE_TAIL};

/// Off-screen cell buffer with dirty tracking. Clearing bumps a generation
/// counter instead of touching every cell.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    gen: u32,
    cell_gen: Vec<u32>,
    blank: Cell,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<Color>) -> Self {
        let len = width as usize * height as usize;
        let blank = Cell::blank_with_bg(bg);
        Self {
            width,
            height,
            cells: vec![blank; len],
            gen: 1,
            cell_gen: vec![1; len],
            blank,
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn clear_with_bg(&mut self, bg: Option<Color>) {
        self.blank = Cell::blank_with_bg(bg);
        self.gen = self.gen.wrapping_add(1);
        if self.gen == 0 {
            self.cell_gen.fill(0);
            self.gen = 1;
        }
        self.dirty_all = true;
        self.dirty.clear();
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
        } else {
            for &i in &self.dirty {
                self.dirty_map[i] = false;
            }
        }
        self.dirty.clear();
    }

    /// Blanks every cell through `set`, so only cells that held something
    /// end up dirty.
    pub fn erase(&mut self) {
        let blank = self.blank;
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                self.set(x, y, blank);
            }
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[cfg(test)]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cell_at_index(i))
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        if self.cell_gen.get(i).copied() == Some(self.gen) {
            self.cells[i]
        } else {
            self.blank
        }
    }

    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cell_at_index(i) == cell {
            return;
        }
        self.cells[i] = cell;
        self.cell_gen[i] = self.gen;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }

    /// Writes `text` starting at column `x`, clipping at both edges. Wide
    /// glyphs that do not fit entirely are dropped, and combining marks ride
    /// on the cell before them. Returns the width used.
    pub fn put_str(&mut self, x: i32, y: i32, text: &str, style: Style) -> i32 {
        let bg = self.blank.bg;
        let mut col = x;
        let mut base: Option<(i32, Cell)> = None;
        for ch in text.chars() {
            let w = char_width(ch) as i32;
            if w == 0 {
                if let Some((bx, cell)) = base.as_mut().filter(|_| is_combining(ch)) {
                    if cell.mark.is_none() {
                        cell.mark = Some(ch);
                        let cell = *cell;
                        self.set(*bx, y, cell);
                    }
                }
                continue;
            }
            base = None;
            if col >= self.width as i32 {
                break;
            }
            let fits = col >= 0 && col + w <= self.width as i32;
            if fits {
                let cell = Cell::styled(ch, style, bg);
                self.set(col, y, cell);
                base = Some((col, cell));
                if w == 2 {
                    self.set(col + 1, y, Cell::styled(WIDE_TAIL, style, bg));
                }
            }
            col += w;
        }
        col - x
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, ch: char, style: Style) {
        let bg = self.blank.bg;
        for row in y.max(0)..(y + h).min(self.height as i32) {
            for col in x.max(0)..(x + w).min(self.width as i32) {
                self.set(col, row, Cell::styled(ch, style, bg));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: Style = Style {
        fg: None,
        bold: false,
    };

    #[test]
    fn clear_with_bg_makes_cells_effectively_blank() {
        let mut f = Frame::new(2, 2, None);
        f.set(0, 0, Cell::styled('x', PLAIN, None));
        assert_eq!(f.get(0, 0).unwrap().ch, 'x');
        f.clear_with_bg(None);
        assert_eq!(f.get(0, 0).unwrap().ch, ' ');
    }

    #[test]
    fn set_tracks_dirty_cells_once() {
        let mut f = Frame::new(4, 2, None);
        f.clear_dirty();
        f.set(1, 1, Cell::styled('a', PLAIN, None));
        f.set(1, 1, Cell::styled('b', PLAIN, None));
        f.set(9, 9, Cell::styled('c', PLAIN, None));
        assert_eq!(f.dirty_indices(), &[5]);
    }

    #[test]
    fn erase_dirties_only_used_cells() {
        let mut f = Frame::new(3, 2, None);
        f.set(2, 1, Cell::styled('x', PLAIN, None));
        f.clear_dirty();
        f.erase();
        assert_eq!(f.dirty_indices(), &[5]);
        assert_eq!(f.get(2, 1).unwrap().ch, ' ');
    }

    #[test]
    fn put_str_clips_and_handles_wide_glyphs() {
        let mut f = Frame::new(6, 1, None);
        let used = f.put_str(-2, 0, "abc💖d", PLAIN);
        assert_eq!(used, 6);
        assert_eq!(f.get(0, 0).unwrap().ch, 'c');
        assert_eq!(f.get(1, 0).unwrap().ch, '💖');
        assert!(f.get(2, 0).unwrap().is_wide_tail());
        assert_eq!(f.get(3, 0).unwrap().ch, 'd');

        let mut f = Frame::new(3, 1, None);
        f.put_str(2, 0, "💖", PLAIN);
        assert_eq!(f.get(2, 0).unwrap().ch, ' ');
    }

    #[test]
    fn combining_marks_stay_on_their_base_cell() {
        let mut f = Frame::new(6, 1, None);
        let used = f.put_str(0, 0, "Chu\u{0301}c", PLAIN);
        assert_eq!(used, 4);
        let u = f.get(2, 0).unwrap();
        assert_eq!(u.ch, 'u');
        assert_eq!(u.mark, Some('\u{0301}'));
        assert_eq!(f.get(3, 0).unwrap().ch, 'c');
        assert_eq!(f.get(3, 0).unwrap().mark, None);

        let mut f = Frame::new(3, 1, None);
        f.put_str(-1, 0, "e\u{0302}x", PLAIN);
        assert_eq!(f.get(0, 0).unwrap().ch, 'x');
        assert_eq!(f.get(0, 0).unwrap().mark, None);
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut f = Frame::new(3, 3, None);
        f.fill_rect(-1, 1, 3, 5, '#', PLAIN);
        assert_eq!(f.get(0, 1).unwrap().ch, '#');
        assert_eq!(f.get(1, 2).unwrap().ch, '#');
        assert_eq!(f.get(2, 2).unwrap().ch, ' ');
        assert_eq!(f.get(0, 0).unwrap().ch, ' ');
    }
}
