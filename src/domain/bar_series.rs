//! Fixed, time-indexed bar series.
//!
//! The absolute index of a bar is the number of whole time periods between the
//! series' base time and the bar's end time. Stored bars occupy the contiguous
//! window `[begin_index, end_index]`; indices in `[0, begin_index)` resolve to
//! the first stored bar so lookbacks can run before data begins, while indices
//! past `end_index` fail.

use std::rc::Rc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::bar::Bar;
use crate::domain::error::{BarlensError, Result};
use crate::domain::num::Num;

#[derive(Debug, Clone)]
pub struct BarSeries<N> {
    name: String,
    base_time: DateTime<Utc>,
    time_period: TimeDelta,
    bars: Vec<Rc<Bar<N>>>,
    begin_index: isize,
    num: N,
}

impl<N: Num> BarSeries<N> {
    /// Builds a series over shared bars.
    ///
    /// Fails with [`BarlensError::InvalidArgument`] when `bars` is empty, the
    /// first bar's period is not positive, the first bar ends before
    /// `base_time`, or any two consecutive bars are not exactly one period
    /// apart.
    pub fn new(
        name: impl Into<String>,
        base_time: DateTime<Utc>,
        bars: Vec<Rc<Bar<N>>>,
    ) -> Result<Self> {
        let name = name.into();
        let first = bars
            .first()
            .ok_or_else(|| BarlensError::invalid(format!("bar series `{name}` has no bars")))?;

        let time_period = first.time_period;
        if time_period <= TimeDelta::zero() {
            return Err(BarlensError::invalid(format!(
                "bar series `{name}` has non-positive time period {time_period}"
            )));
        }
        if first.end_time < base_time {
            return Err(BarlensError::invalid(format!(
                "first bar of `{name}` ends at {} before base time {base_time}",
                first.end_time
            )));
        }

        for pair in bars.windows(2) {
            let actual = pair[1].end_time - pair[0].end_time;
            if actual != time_period {
                return Err(BarlensError::invalid(format!(
                    "all bars must have the same time period: expected {time_period}, \
                     found {actual} before {}",
                    pair[1].end_time
                )));
            }
        }

        let begin_index = periods_between(base_time, first.end_time, time_period);
        let num = first.close;

        log::debug!(
            "built bar series `{name}`: {} bars, period {time_period}, begin index {begin_index}",
            bars.len()
        );

        Ok(Self {
            name,
            base_time,
            time_period,
            bars,
            begin_index,
            num,
        })
    }

    /// Same as [`BarSeries::new`] for bars not yet shared.
    pub fn from_bars(
        name: impl Into<String>,
        base_time: DateTime<Utc>,
        bars: Vec<Bar<N>>,
    ) -> Result<Self> {
        Self::new(name, base_time, bars.into_iter().map(Rc::new).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Numeric prototype: the first bar's close.
    pub fn num(&self) -> N {
        self.num
    }

    /// A literal in the same representation as [`BarSeries::num`].
    pub fn num_of(&self, value: f64) -> N {
        N::from_f64(value)
    }

    pub fn base_time(&self) -> DateTime<Utc> {
        self.base_time
    }

    pub fn time_period(&self) -> TimeDelta {
        self.time_period
    }

    pub fn bar(&self, index: isize) -> Result<&Rc<Bar<N>>> {
        if index < 0 {
            return Err(self.out_of_range(index));
        }
        let adjusted = index - self.begin_index;
        if adjusted < 0 {
            return Ok(&self.bars[0]);
        }
        self.bars
            .get(adjusted as usize)
            .ok_or_else(|| self.out_of_range(index))
    }

    fn out_of_range(&self, index: isize) -> BarlensError {
        BarlensError::IndexOutOfRange {
            series: self.name.clone(),
            size: self.bars.len(),
            index,
        }
    }

    /// Number of stored bars.
    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    /// Number of addressable absolute indices, `begin_index + bar_count`.
    /// Equals [`BarSeries::bar_count`] only when the series starts at its base time.
    pub fn index_count(&self) -> usize {
        self.begin_index as usize + self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Rc<Bar<N>>] {
        &self.bars
    }

    pub fn begin_index(&self) -> isize {
        self.begin_index
    }

    pub fn end_index(&self) -> isize {
        self.begin_index + self.bars.len() as isize - 1
    }

    /// Absolute index of the period containing `time`. O(1).
    pub fn index_of(&self, time: DateTime<Utc>) -> isize {
        periods_between(self.base_time, time, self.time_period)
    }

    /// This series never evicts bars.
    pub fn maximum_bar_count(&self) -> usize {
        usize::MAX
    }

    pub fn removed_bars_count(&self) -> usize {
        0
    }

    /// Bars in the half-open absolute range `[start, end)`, clamped to the
    /// stored window. The returned series is rebased so that its first bar
    /// sits at index 0.
    pub fn sub_series(&self, start: isize, end: isize) -> Result<BarSeries<N>> {
        if end <= start || start < 0 {
            return Err(BarlensError::invalid(format!(
                "invalid sub-series range [{start}, {end}) for `{}`",
                self.name
            )));
        }

        let start = start.max(self.begin_index);
        let end = end.min(self.end_index() + 1);
        if end <= start {
            return Err(BarlensError::invalid(format!(
                "sub-series range [{start}, {end}) lies outside `{}`",
                self.name
            )));
        }

        let from = (start - self.begin_index) as usize;
        let to = (end - self.begin_index) as usize;
        let base_time = i32::try_from(start)
            .ok()
            .and_then(|n| self.time_period.checked_mul(n))
            .and_then(|shift| self.base_time.checked_add_signed(shift))
            .ok_or_else(|| {
                BarlensError::invalid(format!("sub-series start {start} overflows the time axis"))
            })?;

        BarSeries::new(
            format!("{}_sub", self.name),
            base_time,
            self.bars[from..to].to_vec(),
        )
    }

    /// True when both series share base time and period, so equal indices
    /// denote the same instant.
    pub fn is_compatible(&self, other: &BarSeries<N>) -> bool {
        self.base_time == other.base_time && self.time_period == other.time_period
    }

    pub fn ensure_compatible(&self, other: &BarSeries<N>) -> Result<()> {
        if self.is_compatible(other) {
            Ok(())
        } else {
            Err(BarlensError::IncompatibleSeries {
                left: self.name.clone(),
                right: other.name.clone(),
            })
        }
    }

    pub fn add_bar(&mut self, _bar: Bar<N>, _replace: bool) -> Result<()> {
        Err(BarlensError::unsupported("add_bar"))
    }

    pub fn add_bar_at(&mut self, _time_period: TimeDelta, _end_time: DateTime<Utc>) -> Result<()> {
        Err(BarlensError::unsupported("add_bar_at"))
    }

    pub fn add_trade(&mut self, _volume: N, _price: N) -> Result<()> {
        Err(BarlensError::unsupported("add_trade"))
    }

    pub fn add_price(&mut self, _price: N) -> Result<()> {
        Err(BarlensError::unsupported("add_price"))
    }

    pub fn set_maximum_bar_count(&mut self, _maximum: usize) -> Result<()> {
        Err(BarlensError::unsupported("set_maximum_bar_count"))
    }
}

/// Whole periods from `from` to `to`, truncated toward zero.
fn periods_between(from: DateTime<Utc>, to: DateTime<Utc>, period: TimeDelta) -> isize {
    let periods = total_nanos(to - from) / total_nanos(period);
    isize::try_from(periods).unwrap_or(if periods < 0 { isize::MIN } else { isize::MAX })
}

fn total_nanos(delta: TimeDelta) -> i128 {
    delta.num_seconds() as i128 * 1_000_000_000 + delta.subsec_nanos() as i128
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> DateTime<Utc> {
        "2010-01-01T00:00:00Z".parse().unwrap()
    }

    fn period() -> TimeDelta {
        TimeDelta::minutes(5)
    }

    fn bar_at(n: i32, price: f64) -> Bar<f64> {
        Bar {
            end_time: base() + period() * n,
            time_period: period(),
            open: price,
            high: price,
            low: price,
            close: price,
            volume: price,
            amount: price,
        }
    }

    fn offset_series() -> BarSeries<f64> {
        BarSeries::from_bars(
            "Test Series",
            base(),
            vec![bar_at(1, 1.0), bar_at(2, 2.0), bar_at(3, 3.0)],
        )
        .unwrap()
    }

    #[test]
    fn begin_and_end_index_follow_base_time() {
        let series = offset_series();
        assert_eq!(series.begin_index(), 1);
        assert_eq!(series.end_index(), 3);
        assert_eq!(series.bar_count(), 3);
        assert_eq!(series.index_count(), 4);
    }

    #[test]
    fn bar_before_begin_clamps_to_first() {
        let series = offset_series();
        assert_eq!(series.bar(0).unwrap().close, 1.0);
        assert!(Rc::ptr_eq(series.bar(0).unwrap(), series.bar(1).unwrap()));
        assert_eq!(series.bar(2).unwrap().close, 2.0);
        assert_eq!(series.bar(3).unwrap().close, 3.0);
    }

    #[test]
    fn bar_past_end_fails() {
        let series = offset_series();
        let err = series.bar(4).unwrap_err();
        assert!(matches!(
            err,
            BarlensError::IndexOutOfRange { size: 3, index: 4, .. }
        ));
        assert!(err.to_string().contains("Test Series"));
    }

    #[test]
    fn negative_index_fails() {
        let series = offset_series();
        assert!(matches!(
            series.bar(-1),
            Err(BarlensError::IndexOutOfRange { index: -1, .. })
        ));
    }

    #[test]
    fn index_of_round_trips_end_times() {
        let series = offset_series();
        assert_eq!(series.index_of(base() + period()), 1);
        assert_eq!(series.index_of(base() + period() * 2), 2);
        assert_eq!(series.index_of(base() + period() * 3), 3);
    }

    #[test]
    fn index_of_truncates_within_period() {
        let series = offset_series();
        assert_eq!(series.index_of(base() + TimeDelta::minutes(12)), 2);
    }

    #[test]
    fn index_of_far_from_base() {
        let now: DateTime<Utc> = "2024-08-13T00:00:00Z".parse().unwrap();
        let bars: Vec<Bar<f64>> = (1..=4)
            .map(|n| {
                let mut bar = bar_at(0, n as f64);
                bar.end_time = now + period() * n;
                bar
            })
            .collect();
        let series = BarSeries::from_bars("Test Series", base(), bars).unwrap();

        let latest = now + period() * 4;
        let index = series.index_of(latest);
        assert_eq!(index, series.end_index());
        assert_eq!(series.bar(index).unwrap().close, 4.0);
    }

    #[test]
    fn non_uniform_period_rejected() {
        let result = BarSeries::from_bars("gappy", base(), vec![bar_at(1, 1.0), bar_at(3, 3.0)]);
        assert!(matches!(result, Err(BarlensError::InvalidArgument { .. })));
    }

    #[test]
    fn empty_series_rejected() {
        let result = BarSeries::<f64>::from_bars("empty", base(), vec![]);
        assert!(matches!(result, Err(BarlensError::InvalidArgument { .. })));
    }

    #[test]
    fn bar_before_base_time_rejected() {
        let result = BarSeries::from_bars("early", base(), vec![bar_at(-1, 1.0)]);
        assert!(matches!(result, Err(BarlensError::InvalidArgument { .. })));
    }

    #[test]
    fn prototype_is_first_close() {
        let series = offset_series();
        assert_eq!(series.num(), 1.0);
        assert_eq!(series.num_of(2.5), 2.5);
    }

    #[test]
    fn sub_series_slices_and_rebases() {
        let series = BarSeries::from_bars(
            "Test Series",
            base(),
            vec![bar_at(1, 1.0), bar_at(2, 2.0), bar_at(3, 3.0), bar_at(4, 4.0)],
        )
        .unwrap();

        let sub = series.sub_series(2, 4).unwrap();
        assert_eq!(sub.name(), "Test Series_sub");
        assert_eq!(sub.bar_count(), 2);
        assert_eq!(sub.begin_index(), 0);
        assert!(Rc::ptr_eq(sub.bar(0).unwrap(), series.bar(2).unwrap()));
        assert!(Rc::ptr_eq(sub.bar(1).unwrap(), series.bar(3).unwrap()));
    }

    #[test]
    fn sub_series_clamps_start_to_begin_index() {
        let series = BarSeries::from_bars(
            "Test Series",
            base(),
            vec![bar_at(1, 1.0), bar_at(2, 2.0), bar_at(3, 3.0), bar_at(4, 4.0)],
        )
        .unwrap();

        let sub = series.sub_series(0, 2).unwrap();
        assert_eq!(sub.bar_count(), 1);
        assert_eq!(sub.bar(0).unwrap().close, 1.0);

        let sub = series.sub_series(0, 4).unwrap();
        assert_eq!(sub.bar_count(), 3);
        assert_eq!(sub.bar(2).unwrap().close, 3.0);
    }

    #[test]
    fn sub_series_clamps_end_to_stored_window() {
        let series = BarSeries::from_bars(
            "Test Series",
            base(),
            vec![bar_at(1, 1.0), bar_at(2, 2.0), bar_at(3, 3.0), bar_at(4, 4.0)],
        )
        .unwrap();

        let sub = series.sub_series(2, 50).unwrap();
        assert_eq!(sub.bar_count(), 3);
        assert_eq!(sub.bar(0).unwrap().close, 2.0);
        assert_eq!(sub.bar(2).unwrap().close, 4.0);
    }

    #[test]
    fn sub_series_rejects_bad_ranges() {
        let series = offset_series();
        assert!(matches!(
            series.sub_series(2, 2),
            Err(BarlensError::InvalidArgument { .. })
        ));
        assert!(matches!(
            series.sub_series(3, 1),
            Err(BarlensError::InvalidArgument { .. })
        ));
        assert!(matches!(
            series.sub_series(-1, 2),
            Err(BarlensError::InvalidArgument { .. })
        ));
        assert!(matches!(
            series.sub_series(10, 20),
            Err(BarlensError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn sub_series_is_rebased_so_not_compatible_with_parent() {
        let series = offset_series();
        let sub = series.sub_series(2, 4).unwrap();
        assert!(!series.is_compatible(&sub));
        assert!(series.is_compatible(&series.clone()));
        assert!(matches!(
            series.ensure_compatible(&sub),
            Err(BarlensError::IncompatibleSeries { .. })
        ));
    }

    #[test]
    fn mutation_is_unsupported() {
        let mut series = offset_series();
        let bar = bar_at(4, 4.0);
        assert!(matches!(
            series.add_bar(bar, false),
            Err(BarlensError::Unsupported { operation: "add_bar" })
        ));
        assert!(matches!(
            series.add_bar_at(period(), base()),
            Err(BarlensError::Unsupported { operation: "add_bar_at" })
        ));
        assert!(matches!(
            series.add_trade(1.0, 1.0),
            Err(BarlensError::Unsupported { operation: "add_trade" })
        ));
        assert!(matches!(
            series.add_price(1.0),
            Err(BarlensError::Unsupported { operation: "add_price" })
        ));
        assert!(matches!(
            series.set_maximum_bar_count(10),
            Err(BarlensError::Unsupported {
                operation: "set_maximum_bar_count"
            })
        ));
        assert_eq!(series.bar_count(), 3);
        assert_eq!(series.maximum_bar_count(), usize::MAX);
        assert_eq!(series.removed_bars_count(), 0);
    }
}
