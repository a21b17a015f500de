// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Pink,
    Rose,
    Lavender,
    Gold,
    Ocean,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Pink,
        Theme::Rose,
        Theme::Lavender,
        Theme::Gold,
        Theme::Ocean,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Pink => "pink",
            Theme::Rose => "rose",
            Theme::Lavender => "lavender",
            Theme::Gold => "gold",
            Theme::Ocean => "ocean",
        }
    }

    pub fn next(self) -> Theme {
        let i = Self::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Dim-to-bright color stops.
    fn stops(self) -> &'static [(u8, u8, u8)] {
        match self {
            Theme::Pink => &[(40, 0, 20), (150, 40, 100), (255, 105, 180), (255, 200, 230)],
            Theme::Rose => &[(40, 0, 0), (160, 20, 50), (255, 60, 90), (255, 190, 200)],
            Theme::Lavender => &[(20, 0, 40), (110, 60, 170), (190, 140, 255), (240, 220, 255)],
            Theme::Gold => &[(30, 15, 0), (150, 90, 0), (255, 190, 40), (255, 240, 190)],
            Theme::Ocean => &[(0, 10, 30), (0, 80, 140), (60, 180, 255), (200, 240, 255)],
        }
    }
}

pub fn parse_theme(s: &str) -> Result<Theme, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "pink" | "love" | "default" => Ok(Theme::Pink),
        "rose" | "red" => Ok(Theme::Rose),
        "lavender" | "purple" => Ok(Theme::Lavender),
        "gold" | "yellow" => Ok(Theme::Gold),
        "ocean" | "blue" => Ok(Theme::Ocean),
        _ => Err(format!(
            "invalid theme: {} (allowed: pink, rose, lavender, gold, ocean)",
            s
        )),
    }
}

/// Colors for one theme, ordered dim to bright.
#[derive(Clone, Debug)]
pub struct Palette {
    pub ramp: Vec<Color>,
    pub bg: Option<Color>,
}

impl Palette {
    pub fn at(&self, level: f32) -> Option<Color> {
        if self.ramp.is_empty() {
            return None;
        }
        let last = self.ramp.len() - 1;
        let i = (level.clamp(0.0, 1.0) * last as f32).round() as usize;
        self.ramp.get(i.min(last)).copied()
    }
}

fn dist2(a: (u8, u8, u8), b: (u8, u8, u8)) -> i32 {
    let dr = a.0 as i32 - b.0 as i32;
    let dg = a.1 as i32 - b.1 as i32;
    let db = a.2 as i32 - b.2 as i32;
    dr * dr + dg * dg + db * db
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let level = |v: u8| ((v as u16 * 5 + 127) / 255) as u8;
    let (r6, g6, b6) = (level(r), level(g), level(b));
    let cube = (
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let (gray_idx, gray) = match avg {
        0..=7 => (16, (0, 0, 0)),
        239..=255 => (231, (255, 255, 255)),
        _ => {
            let step = (avg - 8) / 10;
            let v = 8 + 10 * step;
            (232 + step, (v, v, v))
        }
    };

    if dist2((r, g, b), gray) < dist2((r, g, b), cube) {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 12] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, rgb)| dist2((r, g, b), *rgb))
        .map(|(c, _)| *c)
        .unwrap_or(Color::White)
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t)
        .round()
        .clamp(0.0, 255.0) as u8
}

fn gradient(stops: &[(u8, u8, u8)], steps: usize) -> Vec<(u8, u8, u8)> {
    match (stops.len(), steps) {
        (0, _) | (_, 0) => return Vec::new(),
        (1, _) => return vec![stops[0]; steps],
        (_, 1) => return vec![stops[0]],
        _ => {}
    }

    let segs = stops.len() - 1;
    (0..steps)
        .map(|i| {
            let pos = i as f32 / (steps - 1) as f32 * segs as f32;
            let seg = (pos.floor() as usize).min(segs - 1);
            let t = pos - seg as f32;
            let (a, b) = (stops[seg], stops[seg + 1]);
            (lerp_u8(a.0, b.0, t), lerp_u8(a.1, b.1, t), lerp_u8(a.2, b.2, t))
        })
        .collect()
}

pub fn build_palette(theme: Theme, mode: ColorMode, default_background: bool) -> Palette {
    let bg = if default_background {
        None
    } else {
        Some(match mode {
            ColorMode::Color16 | ColorMode::Mono => Color::Black,
            ColorMode::TrueColor => Color::Rgb { r: 0, g: 0, b: 0 },
            ColorMode::Color256 => Color::AnsiValue(16),
        })
    };

    let rgb = gradient(theme.stops(), 8);
    let ramp = match mode {
        ColorMode::Mono => vec![Color::White],
        ColorMode::TrueColor => rgb.iter().map(|&(r, g, b)| Color::Rgb { r, g, b }).collect(),
        ColorMode::Color256 => rgb
            .iter()
            .map(|&(r, g, b)| Color::AnsiValue(rgb_to_ansi256(r, g, b)))
            .collect(),
        ColorMode::Color16 => {
            let mut v: Vec<Color> = rgb.iter().map(|&(r, g, b)| rgb_to_color16(r, g, b)).collect();
            v.dedup();
            v
        }
    };

    Palette { ramp, bg }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi256_maps_primaries_and_grays() {
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
        assert_eq!(rgb_to_ansi256(255, 255, 255), 231);
        assert_eq!(rgb_to_ansi256(255, 0, 0), 196);
        assert_eq!(rgb_to_ansi256(128, 128, 128), 244);
    }

    #[test]
    fn gradient_hits_both_ends() {
        let g = gradient(&[(0, 0, 0), (200, 100, 50)], 5);
        assert_eq!(g.len(), 5);
        assert_eq!(g[0], (0, 0, 0));
        assert_eq!(g[4], (200, 100, 50));
        assert_eq!(g[2], (100, 50, 25));
    }

    #[test]
    fn palette_levels_clamp() {
        let p = build_palette(Theme::Pink, ColorMode::TrueColor, false);
        assert_eq!(p.ramp.len(), 8);
        assert_eq!(p.at(-1.0), p.ramp.first().copied());
        assert_eq!(p.at(2.0), p.ramp.last().copied());
        assert!(p.bg.is_some());

        let mono = build_palette(Theme::Gold, ColorMode::Mono, true);
        assert_eq!(mono.at(0.3), Some(Color::White));
        assert!(mono.bg.is_none());
    }

    #[test]
    fn themes_parse_with_aliases() {
        assert_eq!(parse_theme("Purple"), Ok(Theme::Lavender));
        assert_eq!(parse_theme(" pink "), Ok(Theme::Pink));
        assert!(parse_theme("plaid").is_err());
        assert_eq!(Theme::Ocean.next(), Theme::Pink);
    }
}
