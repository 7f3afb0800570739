//! Value of the source n bars back, clamped at index 0.

use std::fmt;
use std::rc::Rc;

use crate::domain::bar_series::BarSeries;
use crate::domain::error::Result;
use crate::domain::indicator::cache::IndexMemo;
use crate::domain::indicator::{check_window, slot, Indicator, IndicatorRef};
use crate::domain::num::Num;

pub struct PreviousValueIndicator<N: Num> {
    source: IndicatorRef<N>,
    bar_count: usize,
    memo: IndexMemo<N>,
}

impl<N: Num> PreviousValueIndicator<N> {
    pub fn new(source: IndicatorRef<N>, bar_count: usize) -> Result<Self> {
        check_window("PREVIOUS", bar_count)?;
        Ok(Self::unchecked(source, bar_count))
    }

    pub fn one_back(source: IndicatorRef<N>) -> Self {
        Self::unchecked(source, 1)
    }

    fn unchecked(source: IndicatorRef<N>, bar_count: usize) -> Self {
        Self {
            source,
            bar_count,
            memo: IndexMemo::new(),
        }
    }
}

impl<N: Num> Indicator<N> for PreviousValueIndicator<N> {
    fn value(&self, index: isize) -> Result<N> {
        let pos = slot(self.series(), index)?;
        let back = pos.saturating_sub(self.bar_count);
        self.memo
            .get_or_insert_with(index, || self.source.value(back as isize))
    }

    fn series(&self) -> &Rc<BarSeries<N>> {
        self.source.series()
    }

    fn unstable_bars(&self) -> usize {
        self.source.unstable_bars() + self.bar_count
    }
}

impl<N: Num> fmt::Display for PreviousValueIndicator<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PREVIOUS({}, {})", self.source, self.bar_count)
    }
}
