// Copyright (c) 2026 rezky_nightky

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::screen::Screen;

pub const DEFAULT_RETENTION: Duration = Duration::from_secs(10);

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Frames rendered per wall-clock second.
#[derive(Debug, Default)]
pub struct FpsCounter {
    log: Mutex<HashMap<i64, u32>>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, u32>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_frame(&self) {
        self.record_frame_at(unix_now());
    }

    pub fn record_frame_at(&self, second: i64) {
        let mut log = self.lock();
        let count = log.entry(second).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Average frames per second over the seconds that saw at least one
    /// frame. `None` until something is recorded.
    pub fn mean(&self) -> Option<f64> {
        let log = self.lock();
        if log.is_empty() {
            return None;
        }
        let total: f64 = log.values().map(|&c| f64::from(c)).sum();
        Some(total / log.len() as f64)
    }

    pub fn label(&self) -> Option<String> {
        self.mean().map(|fps| format!("[{:.2} FPS]", fps))
    }

    pub fn paint<S: Screen + ?Sized>(&self, screen: &mut S) {
        if let Some(text) = self.label() {
            screen.put_str(0, 0, &text, true);
        }
    }

    /// Counts the frame being rendered and draws the overlay.
    pub fn display<S: Screen + ?Sized>(&self, screen: &mut S) {
        self.record_frame();
        self.paint(screen);
    }

    pub fn purge(&self, ttl: Duration) -> usize {
        self.purge_at(unix_now(), ttl)
    }

    /// Rebuilds the log without seconds older than `now - ttl`. Returns the
    /// number of seconds still retained.
    pub fn purge_at(&self, now: i64, ttl: Duration) -> usize {
        let expiry = now.saturating_sub(ttl.as_secs() as i64);
        let mut log = self.lock();
        let fresh: HashMap<i64, u32> = log
            .iter()
            .filter(|&(&t, _)| t >= expiry)
            .map(|(&t, &c)| (t, c))
            .collect();
        *log = fresh;
        log.len()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
