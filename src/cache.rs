//! In-memory cache of analyzed tracks keyed by file path
//!
//! - Key: the path exactly as given (no canonicalisation)
//! - At most one computation per key, even under concurrent lookups
//! - No eviction or expiry; entries leave only via `invalidate` or `clear`
//! - Failed computations are not stored and leave no entry behind, so the
//!   next lookup retries
//! - Lock order: a slot may be held while taking the map lock, never the reverse

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::analysis::TrackAnalysis;
use crate::error::Result;

type Slot = Arc<Mutex<Option<Arc<TrackAnalysis>>>>;

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    pub total_lookups: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub computations: u64,
}

impl CacheMetrics {
    /// Get hit rate as percentage
    pub fn hit_rate(&self) -> f64 {
        if self.total_lookups == 0 {
            return 0.0;
        }
        (self.cache_hits as f64 / self.total_lookups as f64) * 100.0
    }
}

/// Thread-safe memo of `TrackAnalysis` results
#[derive(Debug, Default)]
pub struct TrackCache {
    slots: Mutex<HashMap<PathBuf, Slot>>,
    metrics: Mutex<CacheMetrics>,
}

impl TrackCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached analysis for `path`, computing it with `compute` on
    /// a miss. Concurrent callers for the same path wait on one computation.
    pub fn get_or_compute<F>(&self, path: &Path, compute: F) -> Result<Arc<TrackAnalysis>>
    where
        F: FnOnce(&Path) -> Result<TrackAnalysis>,
    {
        let slot = {
            let mut slots = lock(&self.slots);
            Arc::clone(slots.entry(path.to_path_buf()).or_default())
        };

        // held across the computation so other callers for this key block here
        let mut entry = lock(&slot);
        if let Some(cached) = entry.as_ref() {
            self.record(true, false);
            debug!(file = %path.display(), "Track cache hit");
            return Ok(Arc::clone(cached));
        }

        self.record(false, true);
        debug!(file = %path.display(), "Track cache miss");
        match compute(path) {
            Ok(analysis) => {
                let computed = Arc::new(analysis);
                *entry = Some(Arc::clone(&computed));
                // waiters on a slot dropped after a failure put it back
                lock(&self.slots)
                    .entry(path.to_path_buf())
                    .or_insert_with(|| Arc::clone(&slot));
                Ok(computed)
            }
            Err(e) => {
                let mut slots = lock(&self.slots);
                if slots.get(path).is_some_and(|current| Arc::ptr_eq(current, &slot)) {
                    slots.remove(path);
                }
                Err(e)
            }
        }
    }

    /// Cached analysis without computing
    pub fn get(&self, path: &Path) -> Option<Arc<TrackAnalysis>> {
        let slot = lock(&self.slots).get(path).cloned()?;
        let entry = lock(&slot);
        entry.clone()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    /// Drop one entry; returns whether a computed result was present
    pub fn invalidate(&self, path: &Path) -> bool {
        let Some(slot) = lock(&self.slots).remove(path) else {
            return false;
        };
        let was_computed = lock(&slot).is_some();
        was_computed
    }

    pub fn clear(&self) {
        let mut slots = lock(&self.slots);
        info!(entries = slots.len(), "Clearing track cache");
        slots.clear();
    }

    /// Number of computed entries
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = lock(&self.slots).values().cloned().collect();
        slots.iter().filter(|slot| lock(slot).is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn metrics(&self) -> CacheMetrics {
        *lock(&self.metrics)
    }

    fn record(&self, hit: bool, computed: bool) {
        let mut metrics = lock(&self.metrics);
        metrics.total_lookups += 1;
        if hit {
            metrics.cache_hits += 1;
        } else {
            metrics.cache_misses += 1;
        }
        if computed {
            metrics.computations += 1;
        }
    }
}

/// Lock, recovering the data from a poisoned mutex; every critical section
/// leaves the map or slot in a consistent state
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, TrackAnalysis};
    use crate::error::{ParseError, TrailError};
    use crate::models::{Track, TrackPoint};
    use chrono::{FixedOffset, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    fn sample_analysis() -> TrackAnalysis {
        let offset = FixedOffset::east_opt(0).unwrap();
        let points = (0..3)
            .map(|i| TrackPoint {
                latitude: 45.0 + i as f64 * 0.0001,
                longitude: 5.0,
                elevation: 300.0,
                timestamp: offset.timestamp_opt(1_714_557_600 + i * 5, 0).unwrap(),
            })
            .collect();
        let track = Track::new(None, points).unwrap();
        let analysis = analyze(&track, 60.0).unwrap();
        TrackAnalysis { track, analysis }
    }

    #[test]
    fn test_second_lookup_hits() {
        let cache = TrackCache::new();
        let path = Path::new("/tracks/a.gpx");

        let first = cache.get_or_compute(path, |_| Ok(sample_analysis())).unwrap();
        let second = cache
            .get_or_compute(path, |_| panic!("must not recompute"))
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        let metrics = cache.metrics();
        assert_eq!(metrics.cache_hits, 1);
        assert_eq!(metrics.cache_misses, 1);
        assert_eq!(metrics.hit_rate(), 50.0);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = TrackCache::new();
        let path = Path::new("/tracks/broken.gpx");

        let result = cache.get_or_compute(path, |p| {
            Err(TrailError::Parse(ParseError::FileNotFound {
                path: p.to_path_buf(),
            }))
        });
        assert!(result.is_err());
        assert!(!cache.contains(path));

        cache.get_or_compute(path, |_| Ok(sample_analysis())).unwrap();
        assert!(cache.contains(path));
        assert_eq!(cache.metrics().computations, 2);
    }

    #[test]
    fn test_failed_paths_leave_no_slot() {
        let cache = TrackCache::new();
        for name in ["a.gpx", "b.gpx", "c.gpx"] {
            let result = cache.get_or_compute(Path::new(name), |p| {
                Err(TrailError::Parse(ParseError::FileNotFound {
                    path: p.to_path_buf(),
                }))
            });
            assert!(result.is_err());
        }

        assert!(lock(&cache.slots).is_empty());
        assert!(cache.is_empty());
        assert_eq!(cache.metrics().cache_misses, 3);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = TrackCache::new();
        let a = Path::new("a.gpx");
        let b = Path::new("b.gpx");
        cache.get_or_compute(a, |_| Ok(sample_analysis())).unwrap();
        cache.get_or_compute(b, |_| Ok(sample_analysis())).unwrap();
        assert_eq!(cache.len(), 2);

        assert!(cache.invalidate(a));
        assert!(!cache.invalidate(a));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_lookups_compute_once() {
        let cache = Arc::new(TrackCache::new());
        let computations = Arc::new(AtomicUsize::new(0));
        let path = PathBuf::from("/tracks/shared.gpx");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let computations = Arc::clone(&computations);
                let path = path.clone();
                thread::spawn(move || {
                    cache
                        .get_or_compute(&path, |_| {
                            computations.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(20));
                            Ok(sample_analysis())
                        })
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(computations.load(Ordering::SeqCst), 1);
        assert_eq!(cache.metrics().total_lookups, 8);
    }
}
