use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

use crate::util::stable_pair;

pub const SEED_HALF_EXTENT: f32 = 50.0;

/// Last computed layout position per node id. Entries are overwritten but
/// never evicted, so the cache only grows during a session.
#[derive(Clone, Debug, Default)]
pub struct PositionCache {
    positions: HashMap<String, Vec2>,
}

impl PositionCache {
    pub fn get(&self, id: &str) -> Option<Vec2> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn record(&mut self, id: &str, position: Vec2) {
        if let Some(slot) = self.positions.get_mut(id) {
            *slot = position;
        } else {
            self.positions.insert(id.to_owned(), position);
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn seed(&self, id: &str) -> (Vec2, bool) {
        match self.get(id) {
            Some(position) => (position, true),
            None => {
                let (x, y) = stable_pair(id);
                (vec2(x, y) * SEED_HALF_EXTENT, false)
            }
        }
    }

    pub fn is_mostly_cached<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> bool {
        let mut total = 0usize;
        let mut cached = 0usize;
        for id in ids {
            total += 1;
            if self.contains(id) {
                cached += 1;
            }
        }
        cached * 2 > total
    }
}
