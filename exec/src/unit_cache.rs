//! Translation-unit cache.
//!
//! A coarse-locked map keyed by (entry pc, mode flags) shared between
//! virtual CPUs, plus a small per-CPU direct-mapped jump cache in
//! front of it. Units are handed out as `Arc`s: invalidation is
//! wholesale (mark + unmap), while units already dispatched keep
//! running on their own reference.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use dbt_backend::bytecode::Artifact;
use dbt_core::unit::TranslationUnit;

pub type CachedUnit = Arc<TranslationUnit<Artifact>>;

pub struct UnitCache {
    map: Mutex<HashMap<(u32, u32), CachedUnit>>,
}

impl UnitCache {
    pub fn new() -> UnitCache {
        UnitCache {
            map: Mutex::new(HashMap::new()),
        }
    }

    pub fn lookup(&self, pc: u32, flags: u32) -> Option<CachedUnit> {
        let map = self.map.lock().unwrap();
        map.get(&(pc, flags)).filter(|u| !u.is_invalid()).cloned()
    }

    /// Insert a freshly translated unit. A concurrent translator may
    /// have won the race; the existing entry wins so both CPUs agree.
    pub fn insert(&self, unit: CachedUnit) -> CachedUnit {
        let mut map = self.map.lock().unwrap();
        map.entry((unit.pc, unit.flags)).or_insert(unit).clone()
    }

    /// Invalidate every unit whose guest range overlaps [lo, hi).
    /// Idempotent; jump caches re-verify through the invalid mark.
    pub fn invalidate_range(&self, lo: u32, hi: u32) {
        let mut map = self.map.lock().unwrap();
        map.retain(|_, u| {
            let (start, end) = u.range();
            let hit = start < hi && lo < end;
            if hit {
                log::debug!(
                    "invalidating unit at {:#010x}+{} (write to [{:#010x}, {:#010x}))",
                    u.pc,
                    u.size,
                    lo,
                    hi
                );
                u.set_invalid();
            }
            !hit
        });
    }

    pub fn flush(&self) {
        let mut map = self.map.lock().unwrap();
        for u in map.values() {
            u.set_invalid();
        }
        map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for UnitCache {
    fn default() -> Self {
        UnitCache::new()
    }
}

const JUMP_CACHE_SIZE: usize = 1024;

/// Per-CPU direct-mapped lookup front of the shared cache.
pub struct JumpCache {
    entries: Vec<Option<CachedUnit>>,
}

impl JumpCache {
    pub fn new() -> JumpCache {
        JumpCache {
            entries: (0..JUMP_CACHE_SIZE).map(|_| None).collect(),
        }
    }

    fn index(pc: u32) -> usize {
        // Guest instructions are half-word aligned.
        (pc >> 1) as usize & (JUMP_CACHE_SIZE - 1)
    }

    pub fn lookup(&self, pc: u32, flags: u32) -> Option<CachedUnit> {
        self.entries[Self::index(pc)]
            .as_ref()
            .filter(|u| u.pc == pc && u.flags == flags && !u.is_invalid())
            .cloned()
    }

    pub fn insert(&mut self, unit: CachedUnit) {
        let i = Self::index(unit.pc);
        self.entries[i] = Some(unit);
    }

    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = None);
    }
}

impl Default for JumpCache {
    fn default() -> Self {
        JumpCache::new()
    }
}
