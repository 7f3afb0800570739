//! Base indicators: bar fields and constants.

use std::fmt;
use std::rc::Rc;

use crate::domain::bar::Bar;
use crate::domain::bar_series::BarSeries;
use crate::domain::error::Result;
use crate::domain::indicator::{slot, Indicator};
use crate::domain::num::Num;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarField {
    Open,
    High,
    Low,
    Close,
    Volume,
    Amount,
    Typical,
    /// Needs the previous close; [`BarField::read`] alone sees only one bar.
    TrueRange,
}

impl BarField {
    pub fn read<N: Num>(self, bar: &Bar<N>) -> N {
        match self {
            BarField::Open => bar.open,
            BarField::High => bar.high,
            BarField::Low => bar.low,
            BarField::Close => bar.close,
            BarField::Volume => bar.volume,
            BarField::Amount => bar.amount,
            BarField::Typical => bar.typical_price(),
            BarField::TrueRange => bar.true_range(bar.close),
        }
    }
}

impl fmt::Display for BarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BarField::Open => "OPEN",
            BarField::High => "HIGH",
            BarField::Low => "LOW",
            BarField::Close => "CLOSE",
            BarField::Volume => "VOLUME",
            BarField::Amount => "AMOUNT",
            BarField::Typical => "TYPICAL",
            BarField::TrueRange => "TR",
        };
        f.write_str(name)
    }
}

/// Reads one field of the bar at each index.
pub struct BarFieldIndicator<N> {
    series: Rc<BarSeries<N>>,
    field: BarField,
}

impl<N: Num> BarFieldIndicator<N> {
    pub fn new(series: Rc<BarSeries<N>>, field: BarField) -> Self {
        Self { series, field }
    }

    pub fn close_price(series: Rc<BarSeries<N>>) -> Self {
        Self::new(series, BarField::Close)
    }

    pub fn volume(series: Rc<BarSeries<N>>) -> Self {
        Self::new(series, BarField::Volume)
    }

    pub fn true_range(series: Rc<BarSeries<N>>) -> Self {
        Self::new(series, BarField::TrueRange)
    }

    pub fn field(&self) -> BarField {
        self.field
    }
}

impl<N: Num> Indicator<N> for BarFieldIndicator<N> {
    fn value(&self, index: isize) -> Result<N> {
        let bar = self.series.bar(index)?;
        if self.field == BarField::TrueRange && index > self.series.begin_index() {
            let prev_close = self.series.bar(index - 1)?.close;
            return Ok(bar.true_range(prev_close));
        }
        Ok(self.field.read(bar))
    }

    fn series(&self) -> &Rc<BarSeries<N>> {
        &self.series
    }

    fn unstable_bars(&self) -> usize {
        0
    }
}

impl<N> fmt::Display for BarFieldIndicator<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field)
    }
}

/// The same value at every index.
pub struct ConstantIndicator<N> {
    series: Rc<BarSeries<N>>,
    value: N,
}

impl<N: Num> ConstantIndicator<N> {
    pub fn new(series: Rc<BarSeries<N>>, value: N) -> Self {
        Self { series, value }
    }
}

impl<N: Num> Indicator<N> for ConstantIndicator<N> {
    fn value(&self, index: isize) -> Result<N> {
        slot(&self.series, index)?;
        Ok(self.value)
    }

    fn series(&self) -> &Rc<BarSeries<N>> {
        &self.series
    }

    fn unstable_bars(&self) -> usize {
        0
    }
}

impl<N: Num> fmt::Display for ConstantIndicator<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::BarlensError;
    use crate::domain::indicator::test_support::{series, series_with_offset};

    #[test]
    fn close_price_reads_close() {
        let series = series(&[10.0, 20.0, 30.0]);
        let close = BarFieldIndicator::close_price(series);
        assert_eq!(close.value(0).unwrap(), 10.0);
        assert_eq!(close.value(2).unwrap(), 30.0);
        assert_eq!(close.unstable_bars(), 0);
        assert_eq!(close.to_string(), "CLOSE");
    }

    #[test]
    fn volume_reads_volume() {
        let series = series(&[10.0, 20.0]);
        let volume = BarFieldIndicator::volume(series);
        assert_eq!(volume.value(1).unwrap(), 1000.0);
    }

    #[test]
    fn field_indicator_follows_series_clamping() {
        let series = series_with_offset(&[10.0, 20.0], 3);
        let close = BarFieldIndicator::close_price(series);
        assert_eq!(close.value(0).unwrap(), 10.0);
        assert_eq!(close.value(3).unwrap(), 10.0);
        assert_eq!(close.value(4).unwrap(), 20.0);
        assert!(matches!(
            close.value(5),
            Err(BarlensError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn typical_field() {
        let series = series(&[12.0]);
        let typical = BarFieldIndicator::new(series, BarField::Typical);
        assert!((typical.value(0).unwrap() - 12.0).abs() < 1e-12);
        assert_eq!(typical.field(), BarField::Typical);
    }

    #[test]
    fn true_range_uses_previous_close() {
        let base = crate::domain::indicator::test_support::base_time();
        let period = chrono::TimeDelta::days(1);
        let bar = |n: i32, high: f64, low: f64, close: f64| Bar {
            end_time: base + period * n,
            time_period: period,
            open: close,
            high,
            low,
            close,
            volume: 1.0,
            amount: close,
        };
        let series = Rc::new(
            BarSeries::from_bars(
                "TR",
                base,
                vec![
                    bar(1, 105.0, 95.0, 100.0),
                    bar(2, 120.0, 110.0, 115.0),
                    bar(3, 112.0, 100.0, 104.0),
                ],
            )
            .unwrap(),
        );
        let tr = BarFieldIndicator::true_range(series);

        // first stored bar and the padding before it have no predecessor
        assert_eq!(tr.value(0).unwrap(), 10.0);
        assert_eq!(tr.value(1).unwrap(), 10.0);
        // gap up: |120 - 100|
        assert_eq!(tr.value(2).unwrap(), 20.0);
        // gap down: |100 - 115|
        assert_eq!(tr.value(3).unwrap(), 15.0);
        assert_eq!(tr.to_string(), "TR");
    }

    #[test]
    fn constant_ignores_index_within_range() {
        let series = series_with_offset(&[1.0, 2.0], 2);
        let constant = ConstantIndicator::new(series, 2.5);
        assert_eq!(constant.value(0).unwrap(), 2.5);
        assert_eq!(constant.value(3).unwrap(), 2.5);
        assert_eq!(constant.to_string(), "2.5");
    }

    #[test]
    fn constant_out_of_range_fails() {
        let constant = ConstantIndicator::new(series(&[1.0]), 2.5);
        assert!(matches!(
            constant.value(1),
            Err(BarlensError::IndexOutOfRange { index: 1, .. })
        ));
        assert!(matches!(
            constant.value(-1),
            Err(BarlensError::IndexOutOfRange { index: -1, .. })
        ));
    }
}
