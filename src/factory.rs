// Copyright (c) 2026 rezky_nightky

//! Spawn policy: which variant comes next, what it shows and how it moves.

use std::ops::Range;
use std::sync::Arc;

use rand::Rng;

use crate::content::ContentConfig;
use crate::error::{ConfigError, Result};
use crate::item::{Variant, Viewport};

pub const DEFAULT_HEARTS: [&str; 5] = ["💖", "💕", "❤️", "💗", "💓"];

pub const DEFAULT_MESSAGES: [&str; 6] = [
    "You make my heart smile",
    "Love ya! 💖",
    "Thank you for being my sunshine",
    "Yêu em nhìuuuu ! 💖",
    "Chúc em luôn vui tươi",
    "I love you 💖",
];

pub const DEFAULT_IMAGES: [&str; 5] = ["1.jpeg", "2.jpeg", "3.jpeg", "4.jpeg", "5.jpeg"];

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnTuning {
    /// Rolls below this become text.
    pub text_threshold: f32,
    /// Rolls below this (and not text) become hearts; the rest are images.
    pub heart_threshold: f32,
    pub speed: Range<f32>,
    pub heart_spin: Range<f32>,
    pub image_size: Range<f32>,
    /// Horizontal footprint reserved for an item when picking `x`.
    pub item_width: f32,
    pub spawn_y: f32,
    pub hearts: Vec<String>,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            text_threshold: 0.73,
            heart_threshold: 0.86,
            speed: 2.0..5.0,
            heart_spin: -2.0..2.0,
            image_size: 0.9..1.7,
            item_width: 200.0,
            spawn_y: -150.0,
            hearts: DEFAULT_HEARTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn require_unit(name: &'static str, v: f32) -> Result<()> {
    if !v.is_finite() {
        return Err(ConfigError::NotFinite {
            name,
            value: v as f64,
        });
    }
    if !(0.0..=1.0).contains(&v) {
        return Err(ConfigError::OutOfRange {
            name,
            min: 0.0,
            max: 1.0,
            value: v as f64,
        });
    }
    Ok(())
}

fn require_range(name: &'static str, r: &Range<f32>) -> Result<()> {
    if !r.start.is_finite() || !r.end.is_finite() || r.start >= r.end {
        return Err(ConfigError::EmptyRange {
            name,
            low: r.start as f64,
            high: r.end as f64,
        });
    }
    Ok(())
}

impl SpawnTuning {
    pub fn validate(&self) -> Result<()> {
        require_unit("text threshold", self.text_threshold)?;
        require_unit("heart threshold", self.heart_threshold)?;
        if self.text_threshold > self.heart_threshold {
            return Err(ConfigError::ThresholdOrder {
                text: self.text_threshold as f64,
                heart: self.heart_threshold as f64,
            });
        }
        require_range("speed", &self.speed)?;
        if self.speed.start < 0.0 {
            return Err(ConfigError::OutOfRange {
                name: "speed",
                min: 0.0,
                max: f64::INFINITY,
                value: self.speed.start as f64,
            });
        }
        require_range("heart spin", &self.heart_spin)?;
        require_range("image size", &self.image_size)?;
        if !self.item_width.is_finite() || self.item_width < 0.0 {
            return Err(ConfigError::NotFinite {
                name: "item width",
                value: self.item_width as f64,
            });
        }
        if !self.spawn_y.is_finite() {
            return Err(ConfigError::NotFinite {
                name: "spawn y",
                value: self.spawn_y as f64,
            });
        }
        if !self.hearts.iter().any(|h| !h.trim().is_empty()) {
            return Err(ConfigError::NoHeartGlyphs);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Spawn {
    pub variant: Variant,
    pub content: Arc<str>,
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub rotation_speed: f32,
    pub size: f32,
}

fn shared_list<S: AsRef<str>>(list: &[S], fallback: &[&str]) -> Vec<Arc<str>> {
    let out: Vec<Arc<str>> = list
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .map(Arc::from)
        .collect();
    if out.is_empty() {
        fallback.iter().map(|&s| Arc::from(s)).collect()
    } else {
        out
    }
}

#[derive(Clone, Debug)]
pub struct ItemFactory {
    tuning: SpawnTuning,
    hearts: Vec<Arc<str>>,
    messages: Vec<Arc<str>>,
    images: Vec<Arc<str>>,
}

impl ItemFactory {
    pub fn new(tuning: SpawnTuning, content: &ContentConfig) -> Result<Self> {
        tuning.validate()?;
        let hearts = shared_list(&tuning.hearts, &DEFAULT_HEARTS);
        Ok(Self {
            hearts,
            messages: shared_list(&content.messages, &DEFAULT_MESSAGES),
            images: shared_list(&content.image_refs, &DEFAULT_IMAGES),
            tuning,
        })
    }

    /// Swaps the message and image lists, applying the same fallbacks as `new`.
    pub fn set_content(&mut self, content: &ContentConfig) {
        self.messages = shared_list(&content.messages, &DEFAULT_MESSAGES);
        self.images = shared_list(&content.image_refs, &DEFAULT_IMAGES);
    }

    pub fn tuning(&self) -> &SpawnTuning {
        &self.tuning
    }

    pub fn messages(&self) -> &[Arc<str>] {
        &self.messages
    }

    pub fn images(&self) -> &[Arc<str>] {
        &self.images
    }

    pub fn hearts(&self) -> &[Arc<str>] {
        &self.hearts
    }

    pub fn choose_variant(&self, roll: f32) -> Variant {
        if roll < self.tuning.text_threshold {
            Variant::Text
        } else if roll < self.tuning.heart_threshold {
            Variant::Heart
        } else {
            Variant::Image
        }
    }

    fn pick<R: Rng>(rng: &mut R, list: &[Arc<str>]) -> Arc<str> {
        let i = rng.random_range(0..list.len());
        Arc::clone(&list[i])
    }

    pub fn spawn<R: Rng>(&self, rng: &mut R, viewport: Viewport) -> Spawn {
        let t = &self.tuning;
        let variant = self.choose_variant(rng.random::<f32>());

        let content = match variant {
            Variant::Heart => Self::pick(rng, &self.hearts),
            Variant::Text => Self::pick(rng, &self.messages),
            Variant::Image => Self::pick(rng, &self.images),
        };

        let span = viewport.width - t.item_width;
        let x = if span > 0.0 {
            rng.random_range(0.0..span)
        } else {
            0.0
        };

        let speed = rng.random_range(t.speed.clone());
        let rotation_speed = match variant {
            Variant::Heart => rng.random_range(t.heart_spin.clone()),
            _ => 0.0,
        };
        let size = match variant {
            Variant::Image => rng.random_range(t.image_size.clone()),
            _ => 1.0,
        };

        Spawn {
            variant,
            content,
            x,
            y: t.spawn_y,
            speed,
            rotation_speed,
            size,
        }
    }
}
