//! Client-local candle cache.
//!
//! The collection is refreshed by a full reload at startup and mutated
//! incrementally: append on create, remove on delete. Concurrent edits by
//! other sessions are not merged live.

use dashmap::DashMap;

use crate::candle::Candle;

/// In-memory candle collection keyed by id.
#[derive(Debug, Default)]
pub struct CandleCollection {
    candles: DashMap<String, Candle>,
}

impl CandleCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of candles held.
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Whether a candle with the id is held.
    pub fn contains(&self, id: &str) -> bool {
        self.candles.contains_key(id)
    }

    /// Insert or replace a candle.
    pub fn insert(&self, candle: Candle) {
        self.candles.insert(candle.id.clone(), candle);
    }

    /// Remove a candle by id.
    pub fn remove(&self, id: &str) -> Option<Candle> {
        self.candles.remove(id).map(|(_, candle)| candle)
    }

    /// Get a candle by id.
    pub fn get(&self, id: &str) -> Option<Candle> {
        self.candles.get(id).map(|entry| entry.value().clone())
    }

    /// Replace the whole collection (full reload).
    pub fn replace_all(&self, candles: impl IntoIterator<Item = Candle>) {
        self.candles.clear();
        for candle in candles {
            self.insert(candle);
        }
    }

    /// Snapshot of all candles, in no particular order.
    pub fn snapshot(&self) -> Vec<Candle> {
        self.candles
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Count candles carrying exactly this emotion name.
    pub fn count_emotion(&self, emotion: &str) -> u64 {
        self.candles
            .iter()
            .filter(|entry| entry.value().emotion_name() == Some(emotion))
            .count() as u64
    }

    /// Candles owned by the given anonymous identity.
    pub fn owned_by(&self, user_id: &str) -> Vec<Candle> {
        self.candles
            .iter()
            .filter(|entry| entry.value().user_id.as_deref() == Some(user_id))
            .map(|entry| entry.value().clone())
            .collect()
    }
}
