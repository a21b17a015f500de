// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

/// Placeholder stored in the right half of a double-width glyph.
pub const WIDE_TAIL: char = '\0';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bold: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    /// Combining mark drawn over `ch`.
    pub mark: Option<char>,
}

impl Cell {
    pub fn blank_with_bg(bg: Option<Color>) -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg,
            bold: false,
            mark: None,
        }
    }

    pub fn styled(ch: char, style: Style, bg: Option<Color>) -> Self {
        Self {
            ch,
            fg: style.fg,
            bg,
            bold: style.bold,
            mark: None,
        }
    }

    pub fn is_wide_tail(&self) -> bool {
        self.ch == WIDE_TAIL
    }
}

pub fn is_combining(ch: char) -> bool {
    matches!(
        ch as u32,
        0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF | 0xFE20..=0xFE2F
    )
}

/// Terminal column width of `ch`: 0 for joiners and variation selectors,
/// 2 for emoji and East Asian wide blocks, 1 otherwise.
pub fn char_width(ch: char) -> u16 {
    match ch as u32 {
        0x200D | 0xFE00..=0xFE0F => 0,
        _ if is_combining(ch) => 0,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1F64F
        | 0x1F900..=0x1F9FF
        | 0x1FA70..=0x1FAFF => 2,
        _ => 1,
    }
}

pub fn str_width(s: &str) -> u16 {
    s.chars()
        .map(char_width)
        .fold(0u16, |acc, w| acc.saturating_add(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_cover_emoji_and_selectors() {
        assert_eq!(char_width('a'), 1);
        assert_eq!(char_width('♥'), 1);
        assert_eq!(char_width('💖'), 2);
        assert_eq!(char_width('\u{FE0F}'), 0);
        assert_eq!(str_width("I love you 💖"), 13);
        assert_eq!(str_width("❤️"), 1);
        assert_eq!(str_width("Yeu\u{0302}"), 3);
        assert!(is_combining('\u{0301}'));
        assert!(!is_combining('e'));
    }
}
