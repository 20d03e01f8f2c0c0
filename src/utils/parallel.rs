// Fri Oct 16 2026 - Alex

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Runs independent per-item work either on a dedicated rayon pool or
/// sequentially on the calling thread.
pub struct BatchExecutor {
    pool: Option<ThreadPool>,
}

impl BatchExecutor {
    pub fn new(thread_count: usize, parallel: bool) -> Self {
        let pool = if parallel && thread_count > 1 {
            match ThreadPoolBuilder::new()
                .num_threads(thread_count)
                .thread_name(|i| format!("dex-worker-{}", i))
                .build()
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    log::warn!("falling back to sequential execution: {}", e);
                    None
                }
            }
        } else {
            None
        };
        Self { pool }
    }

    pub fn sequential() -> Self {
        Self { pool: None }
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    pub fn thread_count(&self) -> usize {
        self.pool.as_ref().map(|p| p.current_num_threads()).unwrap_or(1)
    }

    /// Maps `f` over `items`, keeping input order in the output.
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Send + Sync,
    {
        match &self.pool {
            Some(pool) => pool.install(|| items.par_iter().map(&f).collect()),
            None => items.iter().map(f).collect(),
        }
    }

    pub fn for_each<T, F>(&self, items: &[T], f: F)
    where
        T: Sync,
        F: Fn(&T) + Send + Sync,
    {
        match &self.pool {
            Some(pool) => pool.install(|| items.par_iter().for_each(&f)),
            None => items.iter().for_each(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_map_preserves_order() {
        let items: Vec<u32> = (0..100).collect();
        for executor in [BatchExecutor::new(4, true), BatchExecutor::sequential()] {
            let doubled = executor.map(&items, |x| x * 2);
            assert_eq!(doubled, items.iter().map(|x| x * 2).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_for_each_visits_all() {
        let counter = AtomicUsize::new(0);
        let executor = BatchExecutor::new(2, true);
        executor.for_each(&[1, 2, 3, 4], |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_single_thread_is_sequential() {
        assert!(!BatchExecutor::new(1, true).is_parallel());
        assert!(!BatchExecutor::new(8, false).is_parallel());
    }
}
