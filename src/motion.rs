// Copyright (c) 2026 rezky_nightky

//! Per-frame integration and retirement.

use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::item::FallingItem;
use crate::pool::ItemPool;

pub const REFERENCE_FRAME: Duration = Duration::from_micros(16_670);

#[derive(Clone, Debug, PartialEq)]
pub struct MotionTuning {
    pub reference_frame: Duration,
    /// Fraction of the gap to the target closed per reference frame.
    pub damping: f32,
    pub retirement_margin: f32,
    /// Longest wall-clock gap integrated in one step. Zero (the default)
    /// integrates every gap in full.
    pub max_frame_delta: Duration,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            reference_frame: REFERENCE_FRAME,
            damping: 0.8,
            retirement_margin: 200.0,
            max_frame_delta: Duration::ZERO,
        }
    }
}

impl MotionTuning {
    pub fn validate(&self) -> Result<()> {
        if self.reference_frame.is_zero() {
            return Err(ConfigError::Zero("reference frame"));
        }
        if !self.damping.is_finite() {
            return Err(ConfigError::NotFinite {
                name: "damping",
                value: self.damping as f64,
            });
        }
        if self.damping <= 0.0 || self.damping > 1.0 {
            return Err(ConfigError::OutOfRange {
                name: "damping",
                min: 0.0,
                max: 1.0,
                value: self.damping as f64,
            });
        }
        if !self.retirement_margin.is_finite() || self.retirement_margin < 0.0 {
            return Err(ConfigError::OutOfRange {
                name: "retirement margin",
                min: 0.0,
                max: f64::INFINITY,
                value: self.retirement_margin as f64,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct FrameClock {
    last: Option<Duration>,
    reference_s: f32,
    max_delta: Duration,
}

impl FrameClock {
    pub fn new(tuning: &MotionTuning) -> Self {
        Self {
            last: None,
            reference_s: tuning.reference_frame.as_secs_f32(),
            max_delta: tuning.max_frame_delta,
        }
    }

    /// Forgets the previous frame; the next call to `advance` is a baseline.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn last(&self) -> Option<Duration> {
        self.last
    }

    /// Normalized delta since the previous frame. Zero for the first frame
    /// and for timestamps that go backwards.
    pub fn advance(&mut self, now: Duration) -> f32 {
        let Some(last) = self.last else {
            self.last = Some(now);
            return 0.0;
        };

        let mut dt = now.saturating_sub(last);
        if !self.max_delta.is_zero() {
            dt = dt.min(self.max_delta);
        }
        self.last = Some(last.max(now));
        dt.as_secs_f32() / self.reference_s
    }

    pub fn smooth_factor(&self, item: &FallingItem, now: Duration) -> f32 {
        let since = now.saturating_sub(item.last_frame).as_secs_f32();
        (since / self.reference_s).clamp(0.0, 1.0)
    }
}

pub fn step_item(item: &mut FallingItem, now: Duration, nd: f32, smooth: f32, damping: f32) {
    item.target_y += item.speed * nd;
    item.y += (item.target_y - item.y) * smooth * damping;
    item.rotation += item.rotation_speed * nd;
    item.last_frame = now;
}

pub fn is_retired(item: &FallingItem, viewport_height: f32, margin: f32) -> bool {
    item.y >= viewport_height + margin
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub advanced: usize,
    pub retired: usize,
    pub malformed: usize,
}

/// Advances every item in `live`, in order, and hands retired records back
/// to `pool` in the same pass. `scratch` must be empty; it keeps its
/// allocation between frames.
#[allow(clippy::too_many_arguments)]
pub fn advance_all(
    live: &mut Vec<FallingItem>,
    scratch: &mut Vec<FallingItem>,
    pool: &mut ItemPool,
    clock: &FrameClock,
    tuning: &MotionTuning,
    now: Duration,
    nd: f32,
    viewport_height: f32,
) -> StepReport {
    debug_assert!(scratch.is_empty());
    std::mem::swap(live, scratch);

    let mut report = StepReport::default();
    for mut item in scratch.drain(..) {
        debug_assert!(
            item.is_well_formed(),
            "malformed item reached the update loop: {:?}",
            item
        );
        if !item.is_well_formed() {
            tracing::warn!(id = item.id, "dropping malformed item");
            report.malformed += 1;
            pool.release(item);
            continue;
        }

        let smooth = clock.smooth_factor(&item, now);
        step_item(&mut item, now, nd, smooth, tuning.damping);
        report.advanced += 1;

        if is_retired(&item, viewport_height, tuning.retirement_margin) {
            report.retired += 1;
            pool.release(item);
        } else {
            live.push(item);
        }
    }
    report
}
