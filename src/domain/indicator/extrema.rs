//! Highest / lowest value over a trailing window.
//!
//! HIGHEST(n)[i] = max(x[max(0, i-n+1)..=i]), LOWEST mirrors it.
//! The previous extremum is reused unless the sample leaving the window was
//! the extremum itself, in which case the window is rescanned.
//! Warmup: first (n-1) bars use a partial window.

use std::fmt;
use std::rc::Rc;

use crate::domain::bar_series::BarSeries;
use crate::domain::error::Result;
use crate::domain::indicator::cache::RecursiveCache;
use crate::domain::indicator::{check_window, slot, Indicator, IndicatorRef};
use crate::domain::num::Num;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Highest,
    Lowest,
}

impl Extremum {
    fn pick<N: Num>(self, current: N, candidate: N) -> N {
        match self {
            Extremum::Highest => current.max(candidate),
            Extremum::Lowest => current.min(candidate),
        }
    }

    /// True when `value` is at least as extreme as `extremum`.
    fn reaches<N: Num>(self, value: N, extremum: N) -> bool {
        match self {
            Extremum::Highest => value >= extremum,
            Extremum::Lowest => value <= extremum,
        }
    }
}

pub struct ExtremumIndicator<N: Num> {
    source: IndicatorRef<N>,
    bar_count: usize,
    kind: Extremum,
    values: RecursiveCache<N>,
}

impl<N: Num> ExtremumIndicator<N> {
    pub fn highest(source: IndicatorRef<N>, bar_count: usize) -> Result<Self> {
        Self::new(source, bar_count, Extremum::Highest)
    }

    pub fn lowest(source: IndicatorRef<N>, bar_count: usize) -> Result<Self> {
        Self::new(source, bar_count, Extremum::Lowest)
    }

    pub fn new(source: IndicatorRef<N>, bar_count: usize, kind: Extremum) -> Result<Self> {
        check_window("HIGHEST/LOWEST", bar_count)?;
        Ok(Self {
            source,
            bar_count,
            kind,
            values: RecursiveCache::new(),
        })
    }

    pub fn kind(&self) -> Extremum {
        self.kind
    }

    fn scan(&self, end: usize) -> Result<N> {
        let start = (end + 1).saturating_sub(self.bar_count);
        let mut best = self.source.value(start as isize)?;
        for i in start + 1..=end {
            best = self.kind.pick(best, self.source.value(i as isize)?);
        }
        Ok(best)
    }
}

impl<N: Num> Indicator<N> for ExtremumIndicator<N> {
    fn value(&self, index: isize) -> Result<N> {
        let pos = slot(self.series(), index)?;
        self.values.get_or_fill(pos, |i, prev| {
            let sample = self.source.value(i as isize)?;
            let Some(&prev) = prev else {
                return Ok(sample);
            };
            if i >= self.bar_count {
                let leaving = self.source.value((i - self.bar_count) as isize)?;
                if self.kind.reaches(leaving, prev) {
                    return self.scan(i);
                }
            }
            Ok(self.kind.pick(prev, sample))
        })
    }

    fn series(&self) -> &Rc<BarSeries<N>> {
        self.source.series()
    }

    fn unstable_bars(&self) -> usize {
        self.source.unstable_bars() + self.bar_count - 1
    }
}

impl<N: Num> fmt::Display for ExtremumIndicator<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind {
            Extremum::Highest => "HIGHEST",
            Extremum::Lowest => "LOWEST",
        };
        write!(f, "{name}({}, {})", self.source, self.bar_count)
    }
}
