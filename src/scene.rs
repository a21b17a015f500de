// Copyright (c) 2026 rezky_nightky

//! Paints the engine's live set, plus the static decoration around it, onto
//! a terminal frame.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use heartfall::{FallingItem, Variant, Viewport};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::cell::{str_width, Style};
use crate::frame::Frame;
use crate::palette::{build_palette, ColorMode, Palette, Theme};

/// Engine units per terminal cell. Roughly the pixel size of a glyph, so the
/// engine's pixel-scale defaults read naturally on a terminal.
pub const UNIT_W: f32 = 8.0;
pub const UNIT_H: f32 = 16.0;

/// Image placeholder size in engine units before scaling by `size`.
const IMAGE_W: f32 = 100.0;
const IMAGE_H: f32 = 120.0;

const NARROW_HEARTS: [char; 5] = ['♥', '❥', '❣', '♡', '❤'];

/// Fixed decorative hearts: (x fraction, y fraction, glyph index, level).
const DECORATIONS: [(f32, f32, usize, f32); 6] = [
    (0.05, 0.08, 0, 0.6),
    (0.86, 0.22, 3, 0.5),
    (0.04, 0.78, 4, 0.7),
    (0.33, 0.42, 0, 0.4),
    (0.88, 0.66, 0, 0.6),
    (0.66, 0.52, 3, 0.5),
];

const SPARKLES: usize = 20;

pub fn viewport_for(cols: u16, rows: u16) -> Viewport {
    Viewport::new(cols as f32 * UNIT_W, rows as f32 * UNIT_H)
}

fn to_col(x: f32) -> i32 {
    (x / UNIT_W).round() as i32
}

fn to_row(y: f32) -> i32 {
    (y / UNIT_H).floor() as i32
}

#[derive(Clone, Copy, Debug)]
struct Sparkle {
    col: i32,
    row: i32,
    phase: f32,
}

#[derive(Clone, Debug, Default)]
pub struct Header {
    pub title: Option<String>,
    pub theme: Option<String>,
    pub audio: Option<String>,
}

pub struct Scene {
    pub palette: Palette,
    theme: Theme,
    color_mode: ColorMode,
    default_background: bool,
    emoji: bool,
    decorate: bool,
    header: Header,
    sparkles: Vec<Sparkle>,
    rng: StdRng,
    cols: u16,
    rows: u16,
}

impl Scene {
    pub fn new(
        theme: Theme,
        color_mode: ColorMode,
        default_background: bool,
        emoji: bool,
        decorate: bool,
        header: Header,
    ) -> Self {
        Self {
            palette: build_palette(theme, color_mode, default_background),
            theme,
            color_mode,
            default_background,
            emoji,
            decorate,
            header,
            sparkles: Vec::new(),
            rng: StdRng::seed_from_u64(0x4845_4152_54),
            cols: 0,
            rows: 0,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if self.header.theme.is_some() {
            self.header.theme = Some(theme.name().to_string());
        }
        self.palette = build_palette(theme, self.color_mode, self.default_background);
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.sparkles.clear();
        if cols == 0 || rows == 0 {
            return;
        }
        for _ in 0..SPARKLES {
            self.sparkles.push(Sparkle {
                col: self.rng.random_range(0..cols as i32),
                row: self.rng.random_range(0..rows as i32),
                phase: self.rng.random_range(0.0..std::f32::consts::TAU),
            });
        }
    }

    fn style(&self, level: f32, bold: bool) -> Style {
        Style {
            fg: if self.color_mode == ColorMode::Mono {
                None
            } else {
                self.palette.at(level)
            },
            bold,
        }
    }

    fn heart_glyph(&self, content: &str) -> String {
        if self.emoji {
            return content.to_string();
        }
        let seed = content.chars().fold(0u32, |a, c| a.wrapping_add(c as u32));
        NARROW_HEARTS[seed as usize % NARROW_HEARTS.len()].to_string()
    }

    pub fn draw(&self, frame: &mut Frame, items: &[FallingItem], now: Duration, paused: bool) {
        frame.erase();

        if self.decorate {
            self.draw_sparkles(frame, now);
            self.draw_decorations(frame);
        }

        for item in items {
            match item.variant {
                Variant::Heart => self.draw_heart(frame, item),
                Variant::Text => self.draw_text(frame, item),
                Variant::Image => self.draw_image(frame, item),
            }
        }

        self.draw_header(frame, paused);
    }

    fn draw_sparkles(&self, frame: &mut Frame, now: Duration) {
        let t = now.as_secs_f32();
        for s in &self.sparkles {
            let pulse = 0.5 + 0.5 * (t * 2.0 + s.phase).sin();
            let ch = if pulse > 0.6 { '·' } else { '.' };
            frame.put_str(s.col, s.row, &ch.to_string(), self.style(pulse * 0.4, false));
        }
    }

    fn draw_decorations(&self, frame: &mut Frame) {
        for &(fx, fy, glyph, level) in &DECORATIONS {
            let col = (fx * self.cols as f32) as i32;
            let row = (fy * self.rows as f32) as i32;
            let ch = NARROW_HEARTS[glyph % NARROW_HEARTS.len()];
            frame.put_str(col, row, &ch.to_string(), self.style(level, false));
        }
    }

    fn draw_heart(&self, frame: &mut Frame, item: &FallingItem) {
        // Terminals cannot rotate a glyph, so the spin shows as a shimmer.
        let shimmer = 0.8 + 0.2 * item.rotation.to_radians().cos();
        let glyph = self.heart_glyph(&item.content);
        frame.put_str(
            to_col(item.x),
            to_row(item.y),
            &glyph,
            self.style(shimmer, true),
        );
    }

    fn draw_text(&self, frame: &mut Frame, item: &FallingItem) {
        let col = to_col(item.x);
        let row = to_row(item.y);
        let width = str_width(&item.content) as i32;
        let halo = self.style(0.3, false);
        frame.put_str(col - 1, row, "·", halo);
        frame.put_str(col + width, row, "·", halo);
        frame.put_str(col, row, &item.content, self.style(0.9, true));
    }

    fn draw_image(&self, frame: &mut Frame, item: &FallingItem) {
        let w = ((IMAGE_W * item.size) / UNIT_W).round().max(4.0) as i32;
        let h = ((IMAGE_H * item.size) / UNIT_H).round().max(3.0) as i32;
        let x = to_col(item.x);
        let y = to_row(item.y);
        let border = self.style(0.6, false);

        frame.fill_rect(x + 1, y + 1, w - 2, h - 2, ' ', border);
        let inner = (w - 2).max(0) as usize;
        let rule: String = "─".repeat(inner);
        frame.put_str(x, y, &format!("┌{}┐", rule), border);
        frame.put_str(x, y + h - 1, &format!("└{}┘", rule), border);
        for row in y + 1..y + h - 1 {
            frame.put_str(x, row, "│", border);
            frame.put_str(x + w - 1, row, "│", border);
        }

        let label = image_label(&item.content, inner.saturating_sub(2));
        let lw = str_width(&label) as i32;
        let lx = x + (w - lw) / 2;
        frame.put_str(lx, y + h / 2, &label, self.style(0.85, false));
        frame.put_str(x + (w - 1) / 2, y + h / 2 - 1, "❤", self.style(0.7, false));
    }

    fn draw_header(&self, frame: &mut Frame, paused: bool) {
        let mut row = 0;
        if let Some(title) = self.header.title.as_deref() {
            frame.put_str(2, row, title, self.style(0.8, true));
            row += 1;
        }
        if let Some(theme) = self.header.theme.as_deref() {
            frame.put_str(2, row, &format!("Theme: {}", theme), self.style(0.55, false));
        }

        let mut right = Vec::new();
        if paused {
            right.push("[paused]".to_string());
        }
        if let Some(audio) = self.header.audio.as_deref() {
            right.push(format!("♪ {}", image_label(audio, 24)));
        }
        let text = right.join("  ");
        if !text.is_empty() {
            let x = frame.width as i32 - str_width(&text) as i32 - 2;
            frame.put_str(x, 0, &text, self.style(0.7, false));
        }
    }
}

/// Short display name for a URL or path, truncated to `max` characters.
pub fn image_label(reference: &str, max: usize) -> String {
    let trimmed = reference.trim_end_matches('/');
    let name = trimmed
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(trimmed);
    let name = name.split(['?', '#']).next().unwrap_or(name);
    if name.chars().count() <= max {
        return name.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = name.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Decides whether an image reference can be shown. Remote references are
/// assumed reachable; local paths must exist relative to `base`.
pub struct ImageCheck {
    base: PathBuf,
    cache: HashMap<Arc<str>, bool>,
}

impl ImageCheck {
    pub fn new(base: PathBuf) -> Self {
        Self {
            base,
            cache: HashMap::new(),
        }
    }

    pub fn available(&mut self, reference: &Arc<str>) -> bool {
        if let Some(&ok) = self.cache.get(reference) {
            return ok;
        }
        let ok = if reference.contains("://") || reference.starts_with("data:") {
            true
        } else {
            let path = Path::new(&**reference);
            if path.is_absolute() {
                path.exists()
            } else {
                self.base.join(path).exists()
            }
        };
        if !ok {
            tracing::debug!(reference = %reference, "image not found");
        }
        self.cache.insert(Arc::clone(reference), ok);
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_strip_paths_and_queries() {
        assert_eq!(image_label("https://cdn.example/a/b/photo.jpg?w=200", 20), "photo.jpg");
        assert_eq!(image_label("1.jpeg", 20), "1.jpeg");
        assert_eq!(image_label("very-long-file-name.png", 8), "very-lo…");
        assert_eq!(image_label("dir/", 8), "dir");
    }

    #[test]
    fn viewport_maps_cells_to_units() {
        let vp = viewport_for(80, 24);
        assert_eq!(vp.width, 640.0);
        assert_eq!(vp.height, 384.0);
        assert_eq!(to_row(-150.0), -10);
        assert_eq!(to_col(17.0), 2);
    }

    #[test]
    fn image_check_trusts_urls_and_checks_paths() {
        let mut check = ImageCheck::new(std::env::temp_dir());
        assert!(check.available(&Arc::from("https://img.example/x.png")));
        assert!(!check.available(&Arc::from("no-such-heartfall-image.jpeg")));
    }
}
