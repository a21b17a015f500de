// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::content::ContentConfig;
use crate::error::{ConfigError, Result};
use crate::factory::{ItemFactory, SpawnTuning};
use crate::item::{FallingItem, ItemView, Viewport};
use crate::motion::{advance_all, FrameClock, MotionTuning};
use crate::pool::ItemPool;

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub spawn_interval: Duration,
    pub max_live: usize,
    pub pool_capacity: usize,
    /// Records built up front when the engine is constructed.
    pub prewarm: usize,
    pub spawn: SpawnTuning,
    pub motion: MotionTuning,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            spawn_interval: Duration::from_millis(250),
            max_live: 50,
            pool_capacity: 100,
            prewarm: 50,
            spawn: SpawnTuning::default(),
            motion: MotionTuning::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.spawn_interval.is_zero() {
            return Err(ConfigError::Zero("spawn interval"));
        }
        if self.max_live == 0 {
            return Err(ConfigError::Zero("max live items"));
        }
        if self.pool_capacity == 0 {
            return Err(ConfigError::Zero("pool capacity"));
        }
        self.spawn.validate()?;
        self.motion.validate()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RunState {
    Stopped,
    Running,
    Paused,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub live: usize,
    pub reserve: usize,
    pub created: u64,
    pub dropped: u64,
    pub spawned: u64,
    pub retired: u64,
    pub discarded: u64,
}

/// Owns the live set, the pool and both periodic activities. The host calls
/// [`Engine::tick`] from whatever frame source it has.
pub struct Engine<R = StdRng> {
    config: EngineConfig,
    content: ContentConfig,
    factory: ItemFactory,
    pool: ItemPool,
    live: Vec<FallingItem>,
    scratch: Vec<FallingItem>,
    clock: FrameClock,
    rng: R,
    state: RunState,
    next_spawn: Option<Duration>,

    spawned: u64,
    retired: u64,
    discarded: u64,
}

impl Engine<StdRng> {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    pub fn seeded(config: EngineConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Engine<R> {
    pub fn with_rng(config: EngineConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let content = ContentConfig::default();
        let factory = ItemFactory::new(config.spawn.clone(), &content)?;
        let pool = ItemPool::with_prewarm(config.pool_capacity, config.prewarm);
        let clock = FrameClock::new(&config.motion);

        Ok(Self {
            live: Vec::with_capacity(config.max_live),
            scratch: Vec::with_capacity(config.max_live),
            config,
            content,
            factory,
            pool,
            clock,
            rng,
            state: RunState::Stopped,
            next_spawn: None,
            spawned: 0,
            retired: 0,
            discarded: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn content(&self) -> &ContentConfig {
        &self.content
    }

    pub fn factory(&self) -> &ItemFactory {
        &self.factory
    }

    pub fn is_running(&self) -> bool {
        self.state != RunState::Stopped
    }

    pub fn is_paused(&self) -> bool {
        self.state == RunState::Paused
    }

    /// Arms the spawn ticker and the frame driver. Restarts cleanly if the
    /// engine is already running.
    pub fn start(&mut self, content: ContentConfig) {
        if self.is_running() {
            self.stop();
        }
        self.factory.set_content(&content);
        self.content = content;
        self.clock.reset();
        self.next_spawn = None;
        self.state = RunState::Running;
        tracing::debug!(
            messages = self.factory.messages().len(),
            images = self.factory.images().len(),
            reserve = self.pool.reserve_len(),
            "engine started"
        );
    }

    pub fn stop(&mut self) {
        let drained = self.live.len();
        self.state = RunState::Stopped;
        self.next_spawn = None;
        self.clock.reset();
        self.pool.release_all(self.live.drain(..));
        tracing::debug!(drained, reserve = self.pool.reserve_len(), "engine stopped");
    }

    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Paused;
        }
    }

    /// Resumes without integrating the paused time: the next tick is a new
    /// baseline and the spawn ticker restarts its interval.
    pub fn resume(&mut self) {
        if self.state == RunState::Paused {
            self.state = RunState::Running;
            self.clock.reset();
            self.next_spawn = None;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            RunState::Running => self.pause(),
            RunState::Paused => self.resume(),
            RunState::Stopped => {}
        }
    }

    /// Changes the live-set limit. Lowering it below the current live count
    /// releases the oldest items at once.
    pub fn set_max_live(&mut self, max_live: usize) {
        self.config.max_live = max_live.max(1);
        let excess = self.live.len().saturating_sub(self.config.max_live);
        if excess > 0 {
            self.pool.release_all(self.live.drain(..excess));
            self.discarded += excess as u64;
            tracing::debug!(excess, max_live = self.config.max_live, "trimmed live set");
        }
    }

    /// Runs every spawn tick that came due by `now`, then one frame step.
    pub fn tick(&mut self, now: Duration, viewport: Viewport) {
        if self.state != RunState::Running {
            return;
        }

        let interval = self.config.spawn_interval;
        let mut due = *self.next_spawn.get_or_insert(now + interval);
        let mut fired = 0usize;
        while now >= due && fired < self.config.max_live {
            self.spawn_tick(now, viewport);
            due += interval;
            fired += 1;
        }
        if now >= due {
            due = now + interval;
        }
        self.next_spawn = Some(due);

        self.frame_tick(now, viewport);
    }

    /// One spawn attempt. Returns the new item's id, or `None` when the live
    /// set is full or the engine is not running.
    pub fn spawn_tick(&mut self, now: Duration, viewport: Viewport) -> Option<u64> {
        if self.state != RunState::Running || self.live.len() >= self.config.max_live {
            return None;
        }
        let spawn = self.factory.spawn(&mut self.rng, viewport);
        let item = self.pool.acquire(spawn, now);
        let id = item.id;
        self.live.push(item);
        self.spawned += 1;
        Some(id)
    }

    pub fn frame_tick(&mut self, now: Duration, viewport: Viewport) {
        if self.state != RunState::Running {
            return;
        }
        let nd = self.clock.advance(now);
        let report = advance_all(
            &mut self.live,
            &mut self.scratch,
            &mut self.pool,
            &self.clock,
            &self.config.motion,
            now,
            nd,
            viewport.height,
        );
        self.retired += report.retired as u64;
        self.discarded += report.malformed as u64;
        tracing::trace!(
            live = self.live.len(),
            retired = report.retired,
            nd,
            "frame"
        );
    }

    /// Removes one live item early, e.g. an image the presentation layer
    /// could not load.
    pub fn discard(&mut self, id: u64) -> bool {
        let Some(pos) = self.live.iter().position(|i| i.id == id) else {
            return false;
        };
        let item = self.live.remove(pos);
        self.pool.release(item);
        self.discarded += 1;
        true
    }

    pub fn live_items(&self) -> &[FallingItem] {
        &self.live
    }

    pub fn snapshot(&self) -> Vec<ItemView> {
        self.live.iter().map(FallingItem::view).collect()
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            live: self.live.len(),
            reserve: self.pool.reserve_len(),
            created: self.pool.created(),
            dropped: self.pool.dropped(),
            spawned: self.spawned,
            retired: self.retired,
            discarded: self.discarded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::DEFAULT_MESSAGES;
    use crate::item::Variant;

    const VP: Viewport = Viewport {
        width: 1280.0,
        height: 720.0,
    };

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn engine() -> Engine {
        Engine::seeded(EngineConfig::default(), 7).unwrap()
    }

    #[test]
    fn nothing_happens_before_start() {
        let mut e = engine();
        e.tick(ms(0), VP);
        e.tick(ms(1000), VP);
        assert_eq!(e.spawn_tick(ms(1000), VP), None);
        assert!(e.live_items().is_empty());
    }

    #[test]
    fn single_spawn_tick_appends_one_item() {
        let mut e = engine();
        e.start(ContentConfig::default());
        let id = e.spawn_tick(ms(0), VP).unwrap();

        let items = e.live_items();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.id, id);
        assert_eq!(item.y, -150.0);
        assert!(Variant::ALL.contains(&item.variant));
        assert!(item.x >= 0.0 && item.x < VP.width - 200.0);
    }

    #[test]
    fn spawn_ticker_fires_on_interval() {
        let mut e = engine();
        e.start(ContentConfig::default());
        e.tick(ms(0), VP);
        assert_eq!(e.live_items().len(), 0);
        e.tick(ms(249), VP);
        assert_eq!(e.live_items().len(), 0);
        e.tick(ms(250), VP);
        assert_eq!(e.live_items().len(), 1);
        e.tick(ms(1000), VP);
        assert_eq!(e.live_items().len(), 4);
    }

    #[test]
    fn live_count_never_exceeds_max() {
        let config = EngineConfig {
            max_live: 5,
            ..EngineConfig::default()
        };
        let mut e = Engine::seeded(config, 1).unwrap();
        e.start(ContentConfig::default());
        let tall = Viewport::new(1280.0, 100_000.0);
        for step in 0..400u64 {
            e.tick(ms(step * 16), tall);
            assert!(e.live_items().len() <= 5);
        }
        assert_eq!(e.live_items().len(), 5);
        assert_eq!(e.spawn_tick(ms(7000), tall), None);
    }

    #[test]
    fn retired_items_leave_live_set_and_refill_reserve() {
        let config = EngineConfig {
            prewarm: 0,
            ..EngineConfig::default()
        };
        let mut e = Engine::seeded(config, 5).unwrap();
        e.start(ContentConfig::default());
        let small = Viewport::new(640.0, 10.0);
        e.spawn_tick(ms(0), small);
        let id = e.live_items()[0].id;
        assert_eq!(e.stats().reserve, 0);

        let mut t = 0u64;
        while e.live_items().iter().any(|i| i.id == id) {
            t += 16;
            e.frame_tick(ms(t), small);
            assert!(t < 60_000, "item never retired");
        }
        assert_eq!(e.stats().reserve, 1);
        assert_eq!(e.stats().retired, 1);
        assert!(e.snapshot().iter().all(|v| v.id != id));
    }

    #[test]
    fn stop_drains_live_items_into_pool() {
        let config = EngineConfig {
            prewarm: 0,
            ..EngineConfig::default()
        };
        let mut e = Engine::seeded(config, 9).unwrap();
        e.start(ContentConfig::default());
        for i in 0..10 {
            e.spawn_tick(ms(i), VP);
        }
        e.frame_tick(ms(20), VP);
        assert_eq!(e.live_items().len(), 10);
        let before = e.stats().reserve;

        e.stop();
        assert!(e.live_items().is_empty());
        assert_eq!(e.stats().reserve, before + 10);
        assert!(!e.is_running());

        e.tick(ms(5000), VP);
        assert!(e.live_items().is_empty());
    }

    #[test]
    fn restart_behaves_like_first_start() {
        let mut e = engine();
        e.start(ContentConfig::default());
        e.tick(ms(0), VP);
        e.tick(ms(1000), VP);
        e.stop();

        e.start(ContentConfig::default());
        e.tick(ms(2000), VP);
        assert!(e.live_items().is_empty());
        e.tick(ms(2250), VP);
        assert_eq!(e.live_items().len(), 1);
        assert_eq!(e.live_items()[0].y, -150.0);
    }

    #[test]
    fn empty_content_uses_default_messages() {
        let mut e = engine();
        e.start(ContentConfig::new(Vec::new(), Vec::new()));
        let tall = Viewport::new(1280.0, 100_000.0);
        for i in 0..200 {
            e.spawn_tick(ms(i), tall);
            if e.live_items().len() == e.config().max_live {
                e.stop();
                e.start(ContentConfig::new(Vec::new(), Vec::new()));
            }
            for item in e.live_items() {
                assert!(!item.content.is_empty());
                if item.variant == Variant::Text {
                    assert!(DEFAULT_MESSAGES.contains(&&*item.content));
                }
            }
        }
    }

    #[test]
    fn pause_freezes_motion_and_spawning() {
        let mut e = engine();
        e.start(ContentConfig::default());
        e.tick(ms(0), VP);
        e.tick(ms(250), VP);
        e.tick(ms(300), VP);
        let y = e.live_items()[0].y;
        let target = e.live_items()[0].target_y;

        e.toggle_pause();
        assert!(e.is_paused());
        e.tick(ms(5000), VP);
        assert_eq!(e.live_items().len(), 1);
        assert_eq!(e.live_items()[0].y, y);

        // The first frame after resuming only closes the smoothing gap.
        e.toggle_pause();
        e.tick(ms(10_000), VP);
        assert_eq!(e.live_items().len(), 1);
        assert_eq!(e.live_items()[0].target_y, target);
        assert!(e.live_items()[0].y >= y);
        e.tick(ms(10_016), VP);
        assert!(e.live_items()[0].target_y > target);
    }

    #[test]
    fn discard_releases_one_item() {
        let mut e = engine();
        e.start(ContentConfig::default());
        let a = e.spawn_tick(ms(0), VP).unwrap();
        let b = e.spawn_tick(ms(0), VP).unwrap();
        let reserve = e.stats().reserve;

        assert!(e.discard(a));
        assert!(!e.discard(a));
        assert_eq!(e.live_items().len(), 1);
        assert_eq!(e.live_items()[0].id, b);
        assert_eq!(e.stats().reserve, reserve + 1);
        assert_eq!(e.stats().discarded, 1);
    }

    #[test]
    fn lowering_max_live_trims_oldest_items() {
        let mut e = engine();
        e.start(ContentConfig::default());
        for i in 0..50 {
            e.spawn_tick(ms(i), VP);
        }
        assert_eq!(e.live_items().len(), 50);
        let newest: Vec<u64> = e.live_items()[45..].iter().map(|i| i.id).collect();
        let reserve = e.stats().reserve;

        e.set_max_live(5);
        assert_eq!(e.live_items().len(), 5);
        assert_eq!(
            e.live_items().iter().map(|i| i.id).collect::<Vec<_>>(),
            newest
        );
        assert_eq!(e.stats().discarded, 45);
        assert_eq!(e.stats().reserve, (reserve + 45).min(e.config().pool_capacity));

        e.tick(ms(100), VP);
        e.tick(ms(400), VP);
        assert!(e.live_items().len() <= 5);

        e.set_max_live(0);
        assert_eq!(e.config().max_live, 1);
        assert_eq!(e.live_items().len(), 1);
    }

    #[test]
    fn snapshot_is_detached_from_later_frames() {
        let mut e = engine();
        e.start(ContentConfig::default());
        e.spawn_tick(ms(0), VP);
        e.frame_tick(ms(0), VP);
        let snap = e.snapshot();
        e.frame_tick(ms(100), VP);
        assert_eq!(snap[0].y, -150.0);
        assert!(e.live_items()[0].y > -150.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig {
            spawn_interval: Duration::ZERO,
            ..EngineConfig::default()
        };
        assert_eq!(
            Engine::seeded(config, 0).err(),
            Some(ConfigError::Zero("spawn interval"))
        );
        let config = EngineConfig {
            max_live: 0,
            ..EngineConfig::default()
        };
        assert!(Engine::seeded(config, 0).is_err());
    }
}
