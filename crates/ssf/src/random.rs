//! Standard-normal draw sources.
//!
//! A source hands out batches of N(0, 1) values. Sources are shared
//! between threads, so [`NormalSource::fill`] takes `&self` and each
//! implementation serialises its own state: one batch is drawn under one
//! lock, and batches from concurrent callers never interleave.
//!
//! [`SharedNormalSource::global`] is the process-wide source used by
//! default. It is created on first use with seed 0 and lives until the
//! process exits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};

/// Seed of the process-wide source.
pub const GLOBAL_SEED: u64 = 0;

/// Source of independent standard-normal draws.
pub trait NormalSource: Send + Sync {
    /// Overwrites every element of `out` with a fresh N(0, 1) draw.
    fn fill(&self, out: &mut [f64]);
}

/// Seeded pseudo-random source guarded by a mutex.
///
/// Output is a pure function of the seed and of the sequence of `fill`
/// calls, so a single-threaded caller gets bit-identical results across
/// runs.
#[derive(Debug)]
pub struct SharedNormalSource {
    rng: Mutex<StdRng>,
}

impl SharedNormalSource {
    /// Creates a source seeded with `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Returns the process-wide source.
    pub fn global() -> Arc<SharedNormalSource> {
        static GLOBAL: OnceLock<Arc<SharedNormalSource>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(SharedNormalSource::seeded(GLOBAL_SEED)))
            .clone()
    }
}

impl NormalSource for SharedNormalSource {
    fn fill(&self, out: &mut [f64]) {
        if out.is_empty() {
            return;
        }
        // A panic while holding the lock cannot leave the generator in a
        // torn state, so a poisoned lock is still usable.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        for v in out.iter_mut() {
            *v = StandardNormal.sample(&mut *rng);
        }
    }
}

/// Replays a recorded sequence of draws, cycling when exhausted.
///
/// Used to pin exact simulation outputs and to count how many draws a
/// computation consumes.
#[derive(Debug)]
pub struct ReplayNormalSource {
    values: Vec<f64>,
    cursor: AtomicUsize,
}

impl ReplayNormalSource {
    /// Creates a source replaying `values`. An empty recording yields
    /// zeros.
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Total number of values handed out so far.
    pub fn draws(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl NormalSource for ReplayNormalSource {
    fn fill(&self, out: &mut [f64]) {
        let start = self.cursor.fetch_add(out.len(), Ordering::SeqCst);
        let n = self.values.len();
        for (i, v) in out.iter_mut().enumerate() {
            *v = if n == 0 {
                0.0
            } else {
                self.values[(start + i) % n]
            };
        }
    }
}
