//! Per-index memo tables.
//!
//! Two shapes are used. [`RecursiveCache`] holds a contiguous prefix
//! `[0, len)` and is filled bottom-up, so a recurrence at index `i` only ever
//! reads the entry at `i - 1` and never recurses through the call stack.
//! [`IndexMemo`] stores arbitrary indices for values without a recurrence.
//! [`Memoized`] puts an `IndexMemo` in front of any indicator.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::domain::bar_series::BarSeries;
use crate::domain::error::Result;
use crate::domain::indicator::{slot, Indicator, IndicatorRef};
use crate::domain::num::Num;

#[derive(Debug)]
pub struct RecursiveCache<T> {
    values: RefCell<Vec<T>>,
}

impl<T: Clone> RecursiveCache<T> {
    pub fn new() -> Self {
        Self {
            values: RefCell::new(Vec::new()),
        }
    }

    /// Returns the entry at `index`, first computing every missing entry
    /// below it in order. `step` receives the index and the previous entry
    /// (`None` at index 0).
    pub fn get_or_fill(
        &self,
        index: usize,
        mut step: impl FnMut(usize, Option<&T>) -> Result<T>,
    ) -> Result<T> {
        if let Some(value) = self.values.borrow().get(index) {
            return Ok(value.clone());
        }

        loop {
            let (next, prev) = {
                let values = self.values.borrow();
                (values.len(), values.last().cloned())
            };
            let value = step(next, prev.as_ref())?;
            self.values.borrow_mut().push(value.clone());
            if next == index {
                log::trace!("recurrence cache filled through index {index}");
                return Ok(value);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl<T: Clone> Default for RecursiveCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct IndexMemo<N> {
    values: RefCell<HashMap<isize, N>>,
}

impl<N: Copy> IndexMemo<N> {
    pub fn new() -> Self {
        Self {
            values: RefCell::new(HashMap::new()),
        }
    }

    pub fn get_or_insert_with(&self, index: isize, compute: impl FnOnce() -> Result<N>) -> Result<N> {
        if let Some(&value) = self.values.borrow().get(&index) {
            return Ok(value);
        }
        let value = compute()?;
        self.values.borrow_mut().insert(index, value);
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl<N: Copy> Default for IndexMemo<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Caches every value its inner indicator produces.
///
/// Operation nodes recompute their operands on every call; wrapping a deep
/// expression in `Memoized` turns repeated queries into lookups.
pub struct Memoized<N: Num> {
    inner: IndicatorRef<N>,
    memo: IndexMemo<N>,
}

impl<N: Num> Memoized<N> {
    pub fn new(inner: IndicatorRef<N>) -> Self {
        Self {
            inner,
            memo: IndexMemo::new(),
        }
    }

    pub fn cached_count(&self) -> usize {
        self.memo.len()
    }
}

impl<N: Num> Indicator<N> for Memoized<N> {
    fn value(&self, index: isize) -> Result<N> {
        slot(self.inner.series(), index)?;
        self.memo
            .get_or_insert_with(index, || self.inner.value(index))
    }

    fn series(&self) -> &Rc<BarSeries<N>> {
        self.inner.series()
    }

    fn unstable_bars(&self) -> usize {
        self.inner.unstable_bars()
    }
}

impl<N: Num> fmt::Display for Memoized<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Memoized({})", self.inner)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::domain::error::BarlensError;
    use crate::domain::indicator::test_support::series;

    /// Counts how often it is evaluated.
    struct Counting {
        series: Rc<BarSeries<f64>>,
        calls: Rc<Cell<usize>>,
    }

    impl Indicator<f64> for Counting {
        fn value(&self, index: isize) -> Result<f64> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.series.bar(index)?.close)
        }

        fn series(&self) -> &Rc<BarSeries<f64>> {
            &self.series
        }

        fn unstable_bars(&self) -> usize {
            2
        }
    }

    impl fmt::Display for Counting {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Counting")
        }
    }

    #[test]
    fn recursive_cache_fills_prefix_in_order() {
        let cache: RecursiveCache<usize> = RecursiveCache::new();
        let mut seen = Vec::new();
        let value = cache
            .get_or_fill(3, |i, prev| {
                seen.push(i);
                Ok(prev.copied().unwrap_or(0) + i)
            })
            .unwrap();
        assert_eq!(value, 0 + 1 + 2 + 3);
        assert_eq!(seen, vec![0, 1, 2, 3]);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn recursive_cache_hit_skips_step() {
        let cache: RecursiveCache<usize> = RecursiveCache::new();
        cache.get_or_fill(5, |i, _| Ok(i * 10)).unwrap();
        let value = cache
            .get_or_fill(2, |_, _| panic!("cached entry recomputed"))
            .unwrap();
        assert_eq!(value, 20);
    }

    #[test]
    fn recursive_cache_resumes_from_last_entry() {
        let cache: RecursiveCache<usize> = RecursiveCache::new();
        cache.get_or_fill(1, |i, _| Ok(i)).unwrap();
        let mut seen = Vec::new();
        cache
            .get_or_fill(3, |i, _| {
                seen.push(i);
                Ok(i)
            })
            .unwrap();
        assert_eq!(seen, vec![2, 3]);
    }

    #[test]
    fn recursive_cache_keeps_prefix_on_error() {
        let cache: RecursiveCache<usize> = RecursiveCache::new();
        let result = cache.get_or_fill(4, |i, _| {
            if i == 2 {
                Err(BarlensError::invalid("boom"))
            } else {
                Ok(i)
            }
        });
        assert!(result.is_err());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn recursive_cache_handles_long_prefix_without_recursion() {
        let cache: RecursiveCache<u64> = RecursiveCache::new();
        let value = cache
            .get_or_fill(200_000, |_, prev| Ok(prev.copied().unwrap_or(0) + 1))
            .unwrap();
        assert_eq!(value, 200_001);
    }

    #[test]
    fn memoized_evaluates_each_index_once() {
        let series = series(&[1.0, 2.0, 3.0]);
        let calls = Rc::new(Cell::new(0));
        let inner: IndicatorRef<f64> = Rc::new(Counting {
            series: series.clone(),
            calls: calls.clone(),
        });
        let memo = Memoized::new(inner);

        assert_eq!(memo.value(1).unwrap(), 2.0);
        assert_eq!(memo.value(1).unwrap(), 2.0);
        assert_eq!(memo.value(2).unwrap(), 3.0);
        assert_eq!(calls.get(), 2);
        assert_eq!(memo.cached_count(), 2);
        assert_eq!(memo.unstable_bars(), 2);
        assert_eq!(memo.to_string(), "Memoized(Counting)");
    }

    #[test]
    fn memoized_rejects_out_of_range_without_caching() {
        let series = series(&[1.0, 2.0]);
        let calls = Rc::new(Cell::new(0));
        let memo = Memoized::new(Rc::new(Counting {
            series,
            calls: calls.clone(),
        }));
        assert!(matches!(
            memo.value(5),
            Err(BarlensError::IndexOutOfRange { .. })
        ));
        assert_eq!(calls.get(), 0);
        assert!(memo.memo.is_empty());
    }
}
