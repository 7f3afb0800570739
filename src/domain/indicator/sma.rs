//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = sum(x[max(0, i-n+1)..=i]) / min(n, i+1)
//! The window sum is cached and advanced one index at a time:
//! S[i] = S[i-1] + x[i] - x[i-n].
//! Warmup: first (n-1) bars use a partial window.

use std::fmt;
use std::rc::Rc;

use crate::domain::bar_series::BarSeries;
use crate::domain::error::Result;
use crate::domain::indicator::cache::RecursiveCache;
use crate::domain::indicator::{check_window, slot, Indicator, IndicatorRef};
use crate::domain::num::Num;

pub struct SmaIndicator<N: Num> {
    source: IndicatorRef<N>,
    bar_count: usize,
    sums: RecursiveCache<N>,
}

impl<N: Num> SmaIndicator<N> {
    pub fn new(source: IndicatorRef<N>, bar_count: usize) -> Result<Self> {
        check_window("SMA", bar_count)?;
        Ok(Self {
            source,
            bar_count,
            sums: RecursiveCache::new(),
        })
    }

    pub fn bar_count(&self) -> usize {
        self.bar_count
    }
}

impl<N: Num> Indicator<N> for SmaIndicator<N> {
    fn value(&self, index: isize) -> Result<N> {
        let pos = slot(self.series(), index)?;
        let sum = self.sums.get_or_fill(pos, |i, prev| {
            let sample = self.source.value(i as isize)?;
            let Some(&prev) = prev else {
                return Ok(sample);
            };
            let sum = prev.plus(sample);
            if i >= self.bar_count {
                Ok(sum.minus(self.source.value((i - self.bar_count) as isize)?))
            } else {
                Ok(sum)
            }
        })?;
        let count = self.bar_count.min(pos + 1);
        Ok(sum.divided_by(N::from_usize(count)))
    }

    fn series(&self) -> &Rc<BarSeries<N>> {
        self.source.series()
    }

    fn unstable_bars(&self) -> usize {
        self.source.unstable_bars() + self.bar_count - 1
    }
}

impl<N: Num> fmt::Display for SmaIndicator<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SMA({}, {})", self.source, self.bar_count)
    }
}
