//! Common utilities used across the crate.
//!
//! Parallelism configuration plus a few small numeric helpers shared by the
//! training engine and the evaluation code.

use rayon::prelude::*;

// =============================================================================
// Parallelism Configuration
// =============================================================================

/// Whether parallel execution is allowed.
///
/// This is a simple flag passed through training and inference components.
/// When `Parallel`, components may use `rayon` parallel iterators; when
/// `Sequential`, they must iterate in order on the calling thread.
///
/// The thread pool itself is set up by [`run_with_threads`]. Components never
/// manage pools, they only respect this flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Parallelism {
    #[default]
    Sequential,
    Parallel,
}

impl Parallelism {
    /// Create from thread count semantics.
    ///
    /// - 0 = auto (parallel if the rayon pool has multiple threads)
    /// - 1 = sequential
    /// - >1 = parallel
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        if n_threads == 1 || (n_threads == 0 && rayon::current_num_threads() == 1) {
            Parallelism::Sequential
        } else {
            Parallelism::Parallel
        }
    }

    /// Returns `true` if parallel execution is allowed.
    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }

    /// Map over an indexed collection, preserving order in both modes.
    #[inline]
    pub fn maybe_par_map<T, B, I, F>(self, iter: I, f: F) -> Vec<B>
    where
        T: Send,
        B: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        <I as IntoParallelIterator>::Iter: IndexedParallelIterator,
        F: Fn(T) -> B + Sync + Send,
    {
        if self.is_parallel() {
            iter.into_par_iter().map(f).collect()
        } else {
            iter.into_iter().map(f).collect()
        }
    }

    /// Like [`maybe_par_map`](Self::maybe_par_map) with per-worker state.
    ///
    /// `init` runs once per rayon worker (parallel) or once total (sequential);
    /// the state is reused across items on the same worker. Output order matches
    /// input order.
    #[inline]
    pub fn maybe_par_map_init<T, B, I, INIT, S, F>(self, iter: I, init: INIT, f: F) -> Vec<B>
    where
        T: Send,
        B: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        <I as IntoParallelIterator>::Iter: IndexedParallelIterator,
        INIT: Fn() -> S + Sync + Send,
        F: Fn(&mut S, T) -> B + Sync + Send,
    {
        if self.is_parallel() {
            iter.into_par_iter().map_init(init, f).collect()
        } else {
            let mut state = init();
            iter.into_iter().map(|item| f(&mut state, item)).collect()
        }
    }
}

// =============================================================================
// Thread Pool Setup
// =============================================================================

/// Run a closure with the appropriate thread pool.
///
/// Thread count semantics:
/// - `0` = auto (use the global rayon pool)
/// - `1` = sequential (no thread pool)
/// - `n > 1` = use exactly `n` threads
///
/// Falls back to the global pool if a dedicated pool cannot be built.
pub fn run_with_threads<T: Send>(n_threads: usize, f: impl FnOnce(Parallelism) -> T + Send) -> T {
    let parallelism = Parallelism::from_threads(n_threads);

    match parallelism {
        Parallelism::Sequential => f(Parallelism::Sequential),
        Parallelism::Parallel if n_threads == 0 => f(Parallelism::Parallel),
        Parallelism::Parallel => {
            match rayon::ThreadPoolBuilder::new().num_threads(n_threads).build() {
                Ok(pool) => pool.install(|| f(Parallelism::Parallel)),
                Err(err) => {
                    log::warn!("could not build a {n_threads}-thread pool ({err}), using global pool");
                    f(Parallelism::Parallel)
                }
            }
        }
    }
}

// =============================================================================
// Numeric helpers
// =============================================================================

/// Logistic sigmoid.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Mean and population standard deviation, accumulated in f64.
///
/// Returns `(0.0, 0.0)` for an empty slice.
pub fn mean_std(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let mut n = 0usize;
    let mut mean = 0.0f64;
    let mut m2 = 0.0f64;
    // Welford
    for v in values {
        n += 1;
        let delta = v - mean;
        mean += delta / n as f64;
        m2 += delta * (v - mean);
    }
    if n == 0 {
        return (0.0, 0.0);
    }
    (mean, (m2 / n as f64).sqrt())
}
