//! Per-model daily call quotas.
//!
//! Counters live in process memory and are bucketed by UTC date: the first
//! lookup on a new day resets a model's count to zero. They do not survive a
//! restart and are not shared between server instances.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

/// Models in priority order with their daily call limits.
pub const DEFAULT_MODELS: &[(&str, u32)] = &[
    ("gemini-3-flash-preview", 20),
    ("gemini-2.5-flash", 20),
    ("gemini-2.5-flash-lite", 20),
    ("gemma-3-27b-it", 14_400),
    ("gemma-3-12b-it", 14_400),
];

#[derive(Debug, Clone, Copy)]
struct DailyUsage {
    date: NaiveDate,
    count: u32,
}

#[derive(Debug)]
pub struct QuotaTracker {
    models: Vec<(String, u32)>,
    usage: Mutex<HashMap<String, DailyUsage>>,
}

impl Default for QuotaTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MODELS.iter().map(|(m, limit)| (m.to_string(), *limit)))
    }
}

impl QuotaTracker {
    pub fn new(models: impl IntoIterator<Item = (String, u32)>) -> Self {
        Self {
            models: models.into_iter().collect(),
            usage: Mutex::new(HashMap::new()),
        }
    }

    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|(m, _)| m.as_str())
    }

    pub fn limit(&self, model: &str) -> Option<u32> {
        self.models
            .iter()
            .find(|(m, _)| m == model)
            .map(|(_, limit)| *limit)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, DailyUsage>> {
        // Counters stay meaningful even if a holder panicked.
        self.usage.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn entry<'a>(
        usage: &'a mut HashMap<String, DailyUsage>,
        model: &str,
        today: NaiveDate,
    ) -> &'a mut DailyUsage {
        let entry = usage
            .entry(model.to_string())
            .or_insert(DailyUsage { date: today, count: 0 });
        if entry.date != today {
            *entry = DailyUsage { date: today, count: 0 };
        }
        entry
    }

    /// Calls recorded for `model` on `today`.
    pub fn usage(&self, model: &str, today: NaiveDate) -> u32 {
        let mut usage = self.lock();
        Self::entry(&mut usage, model, today).count
    }

    /// First model in priority order that is under its limit and not in
    /// `exclude`.
    pub fn pick(&self, today: NaiveDate, exclude: &[String]) -> Option<String> {
        let mut usage = self.lock();
        self.models
            .iter()
            .filter(|(model, _)| !exclude.iter().any(|e| e == model))
            .find(|(model, limit)| Self::entry(&mut usage, model, today).count < *limit)
            .map(|(model, _)| model.clone())
    }

    pub fn record_success(&self, model: &str, today: NaiveDate) {
        let mut usage = self.lock();
        Self::entry(&mut usage, model, today).count += 1;
    }

    /// Treat `model` as spent for the rest of `today`.
    pub fn mark_exhausted(&self, model: &str, today: NaiveDate) {
        let Some(limit) = self.limit(model) else {
            return;
        };
        let mut usage = self.lock();
        let entry = Self::entry(&mut usage, model, today);
        entry.count = entry.count.max(limit);
    }
}
