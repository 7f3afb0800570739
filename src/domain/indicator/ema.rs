//! Exponential Moving Average indicator.
//!
//! α = 2/(n+1), seeded with the first sample, then
//! EMA[i] = α·x[i] + (1-α)·EMA[i-1].
//! Warmup: first n bars are unstable.

use std::fmt;
use std::rc::Rc;

use crate::domain::bar_series::BarSeries;
use crate::domain::error::Result;
use crate::domain::indicator::cache::RecursiveCache;
use crate::domain::indicator::{check_window, slot, Indicator, IndicatorRef};
use crate::domain::num::Num;

pub struct EmaIndicator<N: Num> {
    source: IndicatorRef<N>,
    bar_count: usize,
    alpha: N,
    values: RecursiveCache<N>,
}

impl<N: Num> EmaIndicator<N> {
    pub fn new(source: IndicatorRef<N>, bar_count: usize) -> Result<Self> {
        check_window("EMA", bar_count)?;
        let alpha = N::from_usize(2).divided_by(N::from_usize(bar_count + 1));
        Ok(Self {
            source,
            bar_count,
            alpha,
            values: RecursiveCache::new(),
        })
    }

    pub fn alpha(&self) -> N {
        self.alpha
    }
}

impl<N: Num> Indicator<N> for EmaIndicator<N> {
    fn value(&self, index: isize) -> Result<N> {
        let pos = slot(self.series(), index)?;
        let keep = N::one().minus(self.alpha);
        self.values.get_or_fill(pos, |i, prev| {
            let sample = self.source.value(i as isize)?;
            Ok(match prev {
                None => sample,
                Some(&prev) => self.alpha.multiplied_by(sample).plus(keep.multiplied_by(prev)),
            })
        })
    }

    fn series(&self) -> &Rc<BarSeries<N>> {
        self.source.series()
    }

    fn unstable_bars(&self) -> usize {
        self.source.unstable_bars() + self.bar_count
    }
}

impl<N: Num> fmt::Display for EmaIndicator<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EMA({}, {})", self.source, self.bar_count)
    }
}
