// Copyright (c) 2026 rezky_nightky

use std::collections::HashSet;
use std::time::Duration;

use crate::factory::Spawn;
use crate::item::FallingItem;

/// Recycles item records. `capacity` bounds the reserve only; acquiring with
/// an empty reserve builds a fresh record instead of failing.
#[derive(Debug)]
pub struct ItemPool {
    reserve: Vec<FallingItem>,
    leased: HashSet<u64>,
    capacity: usize,
    next_id: u64,
    created: u64,
    dropped: u64,
}

impl ItemPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            reserve: Vec::with_capacity(capacity),
            leased: HashSet::new(),
            capacity,
            next_id: 1,
            created: 0,
            dropped: 0,
        }
    }

    pub fn with_prewarm(capacity: usize, prewarm: usize) -> Self {
        let mut pool = Self::new(capacity);
        pool.prewarm(prewarm);
        pool
    }

    /// Never fills beyond capacity.
    pub fn prewarm(&mut self, n: usize) {
        let target = n.min(self.capacity);
        while self.reserve.len() < target {
            self.reserve.push(FallingItem::blank());
            self.created += 1;
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn reserve_len(&self) -> usize {
        self.reserve.len()
    }

    pub fn leased_len(&self) -> usize {
        self.leased.len()
    }

    /// Records ever constructed, including pre-warmed ones.
    pub fn created(&self) -> u64 {
        self.created
    }

    /// Released records discarded because the reserve was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn acquire(&mut self, spawn: Spawn, now: Duration) -> FallingItem {
        let mut item = match self.reserve.pop() {
            Some(item) => item,
            None => {
                self.created += 1;
                FallingItem::blank()
            }
        };

        item.id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        self.leased.insert(item.id);

        item.variant = spawn.variant;
        item.content = spawn.content;
        item.x = spawn.x;
        item.y = spawn.y;
        item.target_y = spawn.y;
        item.speed = spawn.speed;
        item.rotation = 0.0;
        item.rotation_speed = spawn.rotation_speed;
        item.size = spawn.size;
        item.last_frame = now;
        item.active = true;
        item
    }

    /// Ends a lease. Records whose lease already ended (including clones of
    /// one) are ignored.
    pub fn release(&mut self, mut item: FallingItem) {
        if !item.active || !self.leased.remove(&item.id) {
            tracing::debug!(id = item.id, "ignoring release of a record that is not leased");
            return;
        }
        item.active = false;
        if self.reserve.len() < self.capacity {
            self.reserve.push(item);
        } else {
            self.dropped += 1;
        }
    }

    pub fn release_all<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = FallingItem>,
    {
        for item in items {
            self.release(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::item::Variant;

    fn spawn(variant: Variant) -> Spawn {
        Spawn {
            variant,
            content: Arc::from("hi"),
            x: 10.0,
            y: -150.0,
            speed: 3.0,
            rotation_speed: 0.0,
            size: 1.0,
        }
    }

    #[test]
    fn second_batch_is_served_from_reserve() {
        let mut pool = ItemPool::new(5);
        let first: Vec<_> = (0..5)
            .map(|_| pool.acquire(spawn(Variant::Text), Duration::ZERO))
            .collect();
        assert_eq!(pool.created(), 5);

        pool.release_all(first);
        assert_eq!(pool.reserve_len(), 5);

        let second: Vec<_> = (0..5)
            .map(|_| pool.acquire(spawn(Variant::Heart), Duration::ZERO))
            .collect();
        assert_eq!(pool.created(), 5);
        assert_eq!(pool.reserve_len(), 0);
        assert!(second.iter().all(|i| i.is_active()));
    }

    #[test]
    fn acquire_beyond_capacity_creates_records() {
        let mut pool = ItemPool::new(2);
        let items: Vec<_> = (0..4)
            .map(|_| pool.acquire(spawn(Variant::Text), Duration::ZERO))
            .collect();
        assert_eq!(pool.created(), 4);

        pool.release_all(items);
        assert_eq!(pool.reserve_len(), 2);
        assert_eq!(pool.dropped(), 2);
    }

    #[test]
    fn acquire_reinitializes_recycled_record() {
        let mut pool = ItemPool::new(1);
        let mut item = pool.acquire(spawn(Variant::Image), Duration::from_millis(5));
        let old_id = item.id;
        item.y = 900.0;
        item.target_y = 950.0;
        item.rotation = 44.0;
        pool.release(item);

        let item = pool.acquire(spawn(Variant::Text), Duration::from_millis(9));
        assert_ne!(item.id, old_id);
        assert_eq!(item.variant, Variant::Text);
        assert_eq!(item.y, -150.0);
        assert_eq!(item.target_y, -150.0);
        assert_eq!(item.rotation, 0.0);
        assert_eq!(item.last_frame, Duration::from_millis(9));
        assert!(item.is_well_formed());
    }

    #[test]
    fn ids_are_unique_across_leases() {
        let mut pool = ItemPool::new(3);
        let mut seen = HashSet::new();
        for _ in 0..20 {
            let item = pool.acquire(spawn(Variant::Text), Duration::ZERO);
            assert!(seen.insert(item.id));
            pool.release(item);
        }
    }

    #[test]
    fn releasing_the_same_lease_twice_is_ignored() {
        let mut pool = ItemPool::new(4);
        let item = pool.acquire(spawn(Variant::Text), Duration::ZERO);
        assert_eq!(pool.leased_len(), 1);

        pool.release(item.clone());
        pool.release(item);
        assert_eq!(pool.reserve_len(), 1);
        assert_eq!(pool.leased_len(), 0);

        let a = pool.acquire(spawn(Variant::Text), Duration::ZERO);
        let b = pool.acquire(spawn(Variant::Heart), Duration::ZERO);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn stale_copy_cannot_end_a_newer_lease() {
        let mut pool = ItemPool::new(4);
        let first = pool.acquire(spawn(Variant::Text), Duration::ZERO);
        let stale = first.clone();
        pool.release(first);

        let second = pool.acquire(spawn(Variant::Text), Duration::ZERO);
        pool.release(stale);
        assert_eq!(pool.reserve_len(), 0);
        assert_eq!(pool.leased_len(), 1);

        pool.release(second);
        assert_eq!(pool.reserve_len(), 1);
    }

    #[test]
    fn prewarm_is_capped_by_capacity() {
        let pool = ItemPool::with_prewarm(3, 10);
        assert_eq!(pool.reserve_len(), 3);
        assert_eq!(pool.created(), 3);
    }
}
