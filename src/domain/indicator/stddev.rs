//! Standard Deviation indicator.
//!
//! Population standard deviation over the last n samples (fewer at the start).
//! STDDEV(n)[i] = sqrt(sum((x[j] - mean)^2 for j in window) / k), k = min(n, i+1)
//! Each window is evaluated in two passes over deviations from its first
//! sample, so a flat window gives exactly zero at any price level. Results
//! are memoized per index.
//! Warmup: first (n-1) bars use a partial window.

use std::fmt;
use std::rc::Rc;

use crate::domain::bar_series::BarSeries;
use crate::domain::error::Result;
use crate::domain::indicator::cache::IndexMemo;
use crate::domain::indicator::{check_window, slot, Indicator, IndicatorRef};
use crate::domain::num::Num;

pub struct StdDevIndicator<N: Num> {
    source: IndicatorRef<N>,
    bar_count: usize,
    memo: IndexMemo<N>,
}

impl<N: Num> StdDevIndicator<N> {
    pub fn new(source: IndicatorRef<N>, bar_count: usize) -> Result<Self> {
        check_window("STDDEV", bar_count)?;
        Ok(Self {
            source,
            bar_count,
            memo: IndexMemo::new(),
        })
    }

    fn window_deviation(&self, end: usize) -> Result<N> {
        let start = (end + 1).saturating_sub(self.bar_count);
        let pivot = self.source.value(start as isize)?;
        let shifted = (start..=end)
            .map(|i| Ok(self.source.value(i as isize)?.minus(pivot)))
            .collect::<Result<Vec<N>>>()?;

        let k = N::from_usize(shifted.len());
        let mean = shifted
            .iter()
            .fold(N::zero(), |acc, &d| acc.plus(d))
            .divided_by(k);
        let variance = shifted
            .iter()
            .fold(N::zero(), |acc, &d| {
                let diff = d.minus(mean);
                acc.plus(diff.multiplied_by(diff))
            })
            .divided_by(k);
        Ok(variance.sqrt())
    }
}

impl<N: Num> Indicator<N> for StdDevIndicator<N> {
    fn value(&self, index: isize) -> Result<N> {
        let pos = slot(self.series(), index)?;
        self.memo
            .get_or_insert_with(index, || self.window_deviation(pos))
    }

    fn series(&self) -> &Rc<BarSeries<N>> {
        self.source.series()
    }

    fn unstable_bars(&self) -> usize {
        self.source.unstable_bars() + self.bar_count - 1
    }
}

impl<N: Num> fmt::Display for StdDevIndicator<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "STDDEV({}, {})", self.source, self.bar_count)
    }
}
