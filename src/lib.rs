// Copyright (c) 2026 rezky_nightky

//! Falling hearts, love notes and photos: a pooled, frame-rate independent
//! falling-item engine driven by an explicit `tick(now)`.

pub mod content;
pub mod engine;
pub mod error;
pub mod factory;
pub mod item;
pub mod motion;
pub mod pool;

pub use content::{ContentConfig, Project};
pub use engine::{Engine, EngineConfig, EngineStats};
pub use error::{ConfigError, ContentError};
pub use factory::{ItemFactory, Spawn, SpawnTuning};
pub use item::{FallingItem, ItemView, Variant, Viewport};
pub use motion::{FrameClock, MotionTuning};
pub use pool::ItemPool;
