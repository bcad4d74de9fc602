//! # Thread Utilities

use std::{num::NonZeroUsize, thread};

/// The search list of environment variables that Rayon uses to control parallelism.
#[cfg(feature = "rayon")]
const RAYON_VARS: &[&str] = &["RAYON_NUM_THREADS", "RAYON_RS_NUM_CPUS"];

/// Get the max parallelism available.
///
/// When `rayon` is enabled, will scan over `RAYON_VARS`.
pub fn est_max_parallelism() -> usize {
    #[cfg(feature = "rayon")]
    for name in RAYON_VARS {
        if let Some(x @ 1..) = std::env::var(name).ok().and_then(|s| s.parse::<usize>().ok()) {
            return x;
        }
    }

    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Resolve the E-step worker count.
///
/// ``min(requested || est_max_parallelism(), est_max_parallelism())``
pub fn resolve_num_threads(requested: Option<NonZeroUsize>) -> usize {
    let sys_max = est_max_parallelism();
    let requested = requested.map(|x| x.get()).unwrap_or(sys_max);
    core::cmp::min(requested, sys_max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_num_threads() {
        let sys_max = est_max_parallelism();
        assert!(sys_max >= 1);

        assert_eq!(resolve_num_threads(None), sys_max);
        assert_eq!(resolve_num_threads(NonZeroUsize::new(1)), 1);
        assert_eq!(
            resolve_num_threads(NonZeroUsize::new(sys_max + 8)),
            sys_max
        );
    }
}
