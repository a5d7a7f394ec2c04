//! Per-ticker cache that lives for one calendar day.
//!
//! Entries are stamped with the day they were written. A read on any other day
//! misses, and the first write on a new day throws the previous day away, so a
//! value is never more than one day stale. Within a day the cache is append-only:
//! each ticker is written at most once unless the caller explicitly refreshes it.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Mutex;

use chrono::{Local, NaiveDate};
use tokio::sync::RwLock;

/// Source of "today" for cache invalidation.
pub trait Clock: Send + Sync + Debug {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date, or moved by hand. Useful for tests and replays.
#[derive(Debug)]
pub struct ManualClock {
    today: Mutex<NaiveDate>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    /// Moves the clock to `date`.
    pub fn set(&self, date: NaiveDate) {
        *self.today.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = date;
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[derive(Debug)]
struct Day<V> {
    date: NaiveDate,
    entries: HashMap<String, V>,
}

#[derive(Debug)]
pub(crate) struct DailyCache<V> {
    day: RwLock<Option<Day<V>>>,
}

impl<V: Clone> DailyCache<V> {
    pub(crate) fn new() -> Self {
        Self {
            day: RwLock::new(None),
        }
    }

    pub(crate) async fn get(&self, today: NaiveDate, key: &str) -> Option<V> {
        let guard = self.day.read().await;
        match guard.as_ref() {
            Some(day) if day.date == today => day.entries.get(key).cloned(),
            _ => None,
        }
    }

    /// Returns the cached subset of `keys` for `today`.
    pub(crate) async fn get_many<'k, I>(&self, today: NaiveDate, keys: I) -> HashMap<String, V>
    where
        I: IntoIterator<Item = &'k String>,
    {
        let guard = self.day.read().await;
        let Some(day) = guard.as_ref().filter(|d| d.date == today) else {
            return HashMap::new();
        };
        keys.into_iter()
            .filter_map(|k| day.entries.get(k).map(|v| (k.clone(), v.clone())))
            .collect()
    }

    /// Inserts `value` unless `key` already has an entry for `today`.
    pub(crate) async fn put(&self, today: NaiveDate, key: &str, value: V) {
        let mut guard = self.day.write().await;
        let day = Self::roll(&mut guard, today);
        day.entries.entry(key.to_string()).or_insert(value);
    }

    /// Inserts or replaces the entry for `key`.
    pub(crate) async fn overwrite(&self, today: NaiveDate, key: &str, value: V) {
        let mut guard = self.day.write().await;
        let day = Self::roll(&mut guard, today);
        day.entries.insert(key.to_string(), value);
    }

    #[cfg(test)]
    pub(crate) async fn len(&self, today: NaiveDate) -> usize {
        let guard = self.day.read().await;
        guard
            .as_ref()
            .filter(|d| d.date == today)
            .map_or(0, |d| d.entries.len())
    }

    fn roll(slot: &mut Option<Day<V>>, today: NaiveDate) -> &mut Day<V> {
        if slot.as_ref().is_some_and(|d| d.date != today) {
            *slot = None;
        }
        slot.get_or_insert_with(|| Day {
            date: today,
            entries: HashMap::new(),
        })
    }
}
