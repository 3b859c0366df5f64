//! Reusable path buffers.
//!
//! Stages that need scratch paths every frame rent them from a `PathPool`
//! instead of allocating. A rented path comes back to the pool, cleared
//! but with its capacity intact, when the `PooledPath` guard is dropped,
//! on every exit path including early returns and unwinding.

use std::cell::{Cell, RefCell};
use std::ops::{Deref, DerefMut};

use crate::path_storage::Path;

/// Default number of idle paths a pool keeps.
pub const DEFAULT_MAX_RETAINED: usize = 16;

// ============================================================================
// PathPool
// ============================================================================

/// Single-threaded pool of idle `Path` buffers.
#[derive(Debug)]
pub struct PathPool {
    free: RefCell<Vec<Path>>,
    max_retained: usize,
    outstanding: Cell<usize>,
}

impl PathPool {
    pub fn new() -> Self {
        Self::with_max_retained(DEFAULT_MAX_RETAINED)
    }

    /// Pool keeping at most `max_retained` idle paths; extra returns are
    /// dropped.
    pub fn with_max_retained(max_retained: usize) -> Self {
        Self {
            free: RefCell::new(Vec::new()),
            max_retained,
            outstanding: Cell::new(0),
        }
    }

    /// An empty path, reused from the pool when one is idle.
    pub fn rent(&self) -> PooledPath<'_> {
        let path = match self.free.borrow_mut().pop() {
            Some(p) => p,
            None => {
                log::trace!("pool: allocating new path");
                Path::new()
            }
        };
        self.outstanding.set(self.outstanding.get() + 1);
        PooledPath {
            path,
            pool: self,
            detached: false,
        }
    }

    /// Idle paths ready to be rented.
    pub fn available(&self) -> usize {
        self.free.borrow().len()
    }

    /// Paths currently rented out.
    pub fn outstanding(&self) -> usize {
        self.outstanding.get()
    }

    pub fn max_retained(&self) -> usize {
        self.max_retained
    }

    fn give_back(&self, mut path: Path) {
        self.outstanding.set(self.outstanding.get().saturating_sub(1));
        path.clear();
        let mut free = self.free.borrow_mut();
        if free.len() < self.max_retained {
            free.push(path);
        }
    }

    fn forget(&self) {
        self.outstanding.set(self.outstanding.get().saturating_sub(1));
    }
}

impl Default for PathPool {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// PooledPath
// ============================================================================

/// A path rented from a `PathPool`. Dereferences to `Path`.
#[derive(Debug)]
pub struct PooledPath<'a> {
    path: Path,
    pool: &'a PathPool,
    detached: bool,
}

impl PooledPath<'_> {
    /// Keep the path and release it from the pool.
    pub fn into_inner(mut self) -> Path {
        self.detached = true;
        self.pool.forget();
        std::mem::take(&mut self.path)
    }
}

impl Deref for PooledPath<'_> {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.path
    }
}

impl DerefMut for PooledPath<'_> {
    fn deref_mut(&mut self) -> &mut Path {
        &mut self.path
    }
}

impl Drop for PooledPath<'_> {
    fn drop(&mut self) {
        if !self.detached {
            self.pool.give_back(std::mem::take(&mut self.path));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rent_and_return() {
        let pool = PathPool::new();
        assert_eq!(pool.available(), 0);
        {
            let mut p = pool.rent();
            p.move_to(1.0, 2.0);
            p.line_to(3.0, 4.0);
            assert_eq!(p.len(), 2);
            assert_eq!(pool.outstanding(), 1);
        }
        assert_eq!(pool.available(), 1);
        assert_eq!(pool.outstanding(), 0);

        let p = pool.rent();
        assert!(p.is_empty());
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_nested_rents_are_distinct() {
        let pool = PathPool::new();
        let mut a = pool.rent();
        let mut b = pool.rent();
        a.move_to(0.0, 0.0);
        b.move_to(5.0, 5.0);
        b.line_to(6.0, 6.0);
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 2);
        assert_eq!(pool.outstanding(), 2);
        drop(a);
        drop(b);
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn test_returned_on_early_exit() {
        fn build(pool: &PathPool, bail: bool) -> Option<usize> {
            let mut p = pool.rent();
            p.move_to(0.0, 0.0);
            if bail {
                return None;
            }
            p.line_to(1.0, 1.0);
            Some(p.len())
        }
        let pool = PathPool::new();
        assert_eq!(build(&pool, true), None);
        assert_eq!(build(&pool, false), Some(2));
        assert_eq!(pool.available(), 1);
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn test_returned_on_unwind() {
        let pool = PathPool::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut p = pool.rent();
            p.move_to(0.0, 0.0);
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(pool.available(), 1);
        assert!(pool.rent().is_empty());
    }

    #[test]
    fn test_max_retained() {
        let pool = PathPool::with_max_retained(1);
        let a = pool.rent();
        let b = pool.rent();
        drop(a);
        drop(b);
        assert_eq!(pool.available(), 1);
        assert_eq!(pool.max_retained(), 1);
    }

    #[test]
    fn test_into_inner_detaches() {
        let pool = PathPool::new();
        let mut p = pool.rent();
        p.move_to(7.0, 7.0);
        let owned = p.into_inner();
        assert_eq!(owned.len(), 1);
        assert_eq!(pool.available(), 0);
        assert_eq!(pool.outstanding(), 0);
    }
}
