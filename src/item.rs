// Copyright (c) 2026 rezky_nightky

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    Heart,
    Text,
    Image,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Heart, Variant::Text, Variant::Image];

    pub fn label(self) -> &'static str {
        match self {
            Variant::Heart => "heart",
            Variant::Text => "text",
            Variant::Image => "image",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A pooled record. Active while leased to the live set.
#[derive(Clone, Debug)]
pub struct FallingItem {
    pub id: u64,
    pub variant: Variant,
    pub content: Arc<str>,
    pub x: f32,
    pub y: f32,
    pub target_y: f32,
    pub speed: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub size: f32,
    pub last_frame: Duration,
    pub(crate) active: bool,
}

impl FallingItem {
    pub(crate) fn blank() -> Self {
        Self {
            id: 0,
            variant: Variant::Text,
            content: Arc::from(""),
            x: 0.0,
            y: 0.0,
            target_y: 0.0,
            speed: 0.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            size: 1.0,
            last_frame: Duration::ZERO,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_well_formed(&self) -> bool {
        self.active
            && !self.content.is_empty()
            && self.x.is_finite()
            && self.y.is_finite()
            && self.target_y.is_finite()
            && self.speed.is_finite()
            && self.speed >= 0.0
            && self.rotation.is_finite()
            && self.rotation_speed.is_finite()
            && self.size.is_finite()
    }

    pub fn view(&self) -> ItemView {
        ItemView {
            id: self.id,
            variant: self.variant,
            content: Arc::clone(&self.content),
            x: self.x,
            y: self.y,
            rotation: self.rotation,
            size: self.size,
        }
    }
}

/// Owned, render-ready copy of a live item.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemView {
    pub id: u64,
    pub variant: Variant,
    pub content: Arc<str>,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub size: f32,
}
