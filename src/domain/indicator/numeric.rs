//! Fluent decorator for numeric indicators.
//!
//! `plus`, `minus`, `sqrt` and friends build lightweight, uncached operation
//! nodes. `sma`, `ema`, `stddev`, `highest`, `lowest` and `previous` build
//! cached indicators with `self` as the source. `crossed_over`,
//! `is_greater_than` and friends build rules.
//!
//! Operands are anything convertible into an [`Operand`]: another indicator or
//! an `f64`/`i32` literal. Literals become constants on this indicator's
//! series; indicators must come from a compatible series.
//!
//! ```
//! # use std::rc::Rc;
//! # use chrono::{DateTime, TimeDelta, Utc};
//! # use barlens::domain::bar::Bar;
//! # use barlens::domain::bar_series::BarSeries;
//! # use barlens::domain::indicator::{Indicator, NumericIndicator};
//! # use barlens::domain::rule::Rule;
//! # fn main() -> barlens::domain::error::Result<()> {
//! # let base: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
//! # let bars = [1.0, 2.0, 3.0, 2.0, 5.0].iter().enumerate().map(|(i, &p)| Bar {
//! #     end_time: base + TimeDelta::days(i as i64),
//! #     time_period: TimeDelta::days(1),
//! #     open: p, high: p, low: p, close: p, volume: 1.0, amount: p,
//! # }).collect();
//! # let series = Rc::new(BarSeries::from_bars("demo", base, bars)?);
//! let close = NumericIndicator::close_price(&series);
//! let spread = close.minus(&close.sma(3)?)?.abs();
//! let signal = close.crossed_over(&close.ema(2)?)?;
//! assert!(spread.value(4)? > 0.0);
//! assert!(signal.is_satisfied(4)?);
//! # Ok(())
//! # }
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::domain::bar_series::BarSeries;
use crate::domain::error::{BarlensError, Result};
use crate::domain::indicator::cache::Memoized;
use crate::domain::indicator::ema::EmaIndicator;
use crate::domain::indicator::extrema::ExtremumIndicator;
use crate::domain::indicator::operation::{BinaryOp, BinaryOperation, UnaryOp, UnaryOperation};
use crate::domain::indicator::previous::PreviousValueIndicator;
use crate::domain::indicator::sma::SmaIndicator;
use crate::domain::indicator::stddev::StdDevIndicator;
use crate::domain::indicator::{Indicator, IndicatorRef};
use crate::domain::indicator_helpers::{BarFieldIndicator, ConstantIndicator};
use crate::domain::num::Num;
use crate::domain::rule::{CrossedDownRule, CrossedUpRule, OverRule, UnderRule};

/// Right-hand side of a composition.
pub enum Operand<N: Num> {
    Indicator(IndicatorRef<N>),
    Literal(f64),
}

impl<N: Num> Operand<N> {
    /// Turns the operand into an indicator on `series`, checking compatibility
    /// for indicator operands.
    pub fn resolve(self, series: &Rc<BarSeries<N>>) -> Result<IndicatorRef<N>> {
        match self {
            Operand::Indicator(indicator) => {
                series.ensure_compatible(indicator.series())?;
                Ok(indicator)
            }
            Operand::Literal(value) => Ok(Rc::new(ConstantIndicator::new(
                series.clone(),
                series.num_of(value),
            ))),
        }
    }
}

impl<N: Num> From<f64> for Operand<N> {
    fn from(value: f64) -> Self {
        Operand::Literal(value)
    }
}

impl<N: Num> From<i32> for Operand<N> {
    fn from(value: i32) -> Self {
        Operand::Literal(value as f64)
    }
}

impl<N: Num> From<IndicatorRef<N>> for Operand<N> {
    fn from(indicator: IndicatorRef<N>) -> Self {
        Operand::Indicator(indicator)
    }
}

impl<N: Num> From<&NumericIndicator<N>> for Operand<N> {
    fn from(indicator: &NumericIndicator<N>) -> Self {
        Operand::Indicator(indicator.delegate.clone())
    }
}

impl<N: Num> From<NumericIndicator<N>> for Operand<N> {
    fn from(indicator: NumericIndicator<N>) -> Self {
        Operand::Indicator(indicator.delegate)
    }
}

#[derive(Clone)]
pub struct NumericIndicator<N: Num> {
    delegate: IndicatorRef<N>,
}

impl<N: Num> NumericIndicator<N> {
    pub fn of(delegate: impl Indicator<N> + 'static) -> Self {
        Self {
            delegate: Rc::new(delegate),
        }
    }

    pub fn from_ref(delegate: IndicatorRef<N>) -> Self {
        Self { delegate }
    }

    pub fn close_price(series: &Rc<BarSeries<N>>) -> Self {
        Self::of(BarFieldIndicator::close_price(series.clone()))
    }

    pub fn volume(series: &Rc<BarSeries<N>>) -> Self {
        Self::of(BarFieldIndicator::volume(series.clone()))
    }

    /// True range of each bar; `true_range(series).sma(n)` is a simple ATR.
    pub fn true_range(series: &Rc<BarSeries<N>>) -> Self {
        Self::of(BarFieldIndicator::true_range(series.clone()))
    }

    pub fn delegate(&self) -> &IndicatorRef<N> {
        &self.delegate
    }

    fn binary(&self, op: BinaryOp, other: impl Into<Operand<N>>) -> Result<Self> {
        let right = other.into().resolve(self.series())?;
        Ok(Self::of(BinaryOperation::new(
            op,
            self.delegate.clone(),
            right,
        )))
    }

    /// `self + other`
    pub fn plus(&self, other: impl Into<Operand<N>>) -> Result<Self> {
        self.binary(BinaryOp::Sum, other)
    }

    /// `self - other`
    pub fn minus(&self, other: impl Into<Operand<N>>) -> Result<Self> {
        self.binary(BinaryOp::Difference, other)
    }

    /// `self * other`
    pub fn multiplied_by(&self, other: impl Into<Operand<N>>) -> Result<Self> {
        self.binary(BinaryOp::Product, other)
    }

    /// `self / other`
    pub fn divided_by(&self, other: impl Into<Operand<N>>) -> Result<Self> {
        self.binary(BinaryOp::Quotient, other)
    }

    /// The smaller of `self` and `other`; `self` on ties.
    pub fn min(&self, other: impl Into<Operand<N>>) -> Result<Self> {
        self.binary(BinaryOp::Min, other)
    }

    /// The greater of `self` and `other`; `self` on ties.
    pub fn max(&self, other: impl Into<Operand<N>>) -> Result<Self> {
        self.binary(BinaryOp::Max, other)
    }

    pub fn abs(&self) -> Self {
        Self::of(UnaryOperation::new(UnaryOp::Abs, self.delegate.clone()))
    }

    pub fn sqrt(&self) -> Self {
        Self::of(UnaryOperation::new(UnaryOp::Sqrt, self.delegate.clone()))
    }

    /// `self * self`, with the same node on both sides. Evaluates `self`
    /// twice per query.
    pub fn squared(&self) -> Self {
        Self::of(BinaryOperation::new(
            BinaryOp::Product,
            self.delegate.clone(),
            self.delegate.clone(),
        ))
    }

    pub fn sma(&self, bar_count: usize) -> Result<Self> {
        Ok(Self::of(SmaIndicator::new(self.delegate.clone(), bar_count)?))
    }

    pub fn ema(&self, bar_count: usize) -> Result<Self> {
        Ok(Self::of(EmaIndicator::new(self.delegate.clone(), bar_count)?))
    }

    pub fn stddev(&self, bar_count: usize) -> Result<Self> {
        Ok(Self::of(StdDevIndicator::new(
            self.delegate.clone(),
            bar_count,
        )?))
    }

    pub fn highest(&self, bar_count: usize) -> Result<Self> {
        Ok(Self::of(ExtremumIndicator::highest(
            self.delegate.clone(),
            bar_count,
        )?))
    }

    pub fn lowest(&self, bar_count: usize) -> Result<Self> {
        Ok(Self::of(ExtremumIndicator::lowest(
            self.delegate.clone(),
            bar_count,
        )?))
    }

    pub fn previous(&self, bar_count: usize) -> Result<Self> {
        Ok(Self::of(PreviousValueIndicator::new(
            self.delegate.clone(),
            bar_count,
        )?))
    }

    /// [`NumericIndicator::previous`] with one bar.
    pub fn previous_one(&self) -> Self {
        Self::of(PreviousValueIndicator::one_back(self.delegate.clone()))
    }

    /// Caches every value of this expression.
    pub fn memoized(&self) -> Self {
        Self::of(Memoized::new(self.delegate.clone()))
    }

    pub fn crossed_over(&self, other: impl Into<Operand<N>>) -> Result<CrossedUpRule<N>> {
        let other = other.into().resolve(self.series())?;
        Ok(CrossedUpRule::new(self.delegate.clone(), other))
    }

    pub fn crossed_under(&self, other: impl Into<Operand<N>>) -> Result<CrossedDownRule<N>> {
        let other = other.into().resolve(self.series())?;
        Ok(CrossedDownRule::new(self.delegate.clone(), other))
    }

    pub fn is_greater_than(&self, other: impl Into<Operand<N>>) -> Result<OverRule<N>> {
        let other = other.into().resolve(self.series())?;
        Ok(OverRule::new(self.delegate.clone(), other))
    }

    pub fn is_less_than(&self, other: impl Into<Operand<N>>) -> Result<UnderRule<N>> {
        let other = other.into().resolve(self.series())?;
        Ok(UnderRule::new(self.delegate.clone(), other))
    }

    /// Value at this indicator's series end index.
    pub fn latest_value(&self) -> Result<N> {
        self.value(self.series().end_index())
    }

    /// Orders two indicators by their values at their own series' end index.
    ///
    /// This answers "which one is higher right now"; it says nothing about the
    /// rest of either sequence. `None` when the values are not comparable.
    pub fn compare_latest(&self, other: &NumericIndicator<N>) -> Result<Option<Ordering>> {
        Ok(self.latest_value()?.partial_cmp(&other.latest_value()?))
    }

    /// Read-only indexed view over `0..series.index_count()`.
    pub fn values(&self) -> IndicatorValues<'_, N> {
        IndicatorValues { indicator: self }
    }
}

impl<N: Num> Indicator<N> for NumericIndicator<N> {
    fn value(&self, index: isize) -> Result<N> {
        self.delegate.value(index)
    }

    fn series(&self) -> &Rc<BarSeries<N>> {
        self.delegate.series()
    }

    fn unstable_bars(&self) -> usize {
        self.delegate.unstable_bars()
    }
}

impl<N: Num> fmt::Display for NumericIndicator<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.delegate, f)
    }
}

impl<N: Num> fmt::Debug for NumericIndicator<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericIndicator")
            .field("expression", &self.delegate.to_string())
            .field("series", &self.delegate.series().name())
            .finish()
    }
}

/// Indexed sequence view of an indicator.
///
/// Element `i` is the indicator's value at absolute index `i`, so the view
/// spans every addressable index, including `[0, begin_index)`.
/// The view cannot be modified; mutating calls return
/// [`BarlensError::Unsupported`].
pub struct IndicatorValues<'a, N: Num> {
    indicator: &'a NumericIndicator<N>,
}

impl<'a, N: Num> IndicatorValues<'a, N> {
    pub fn len(&self) -> usize {
        self.indicator.series().index_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Result<N> {
        let index = isize::try_from(index).map_err(|_| BarlensError::IndexOutOfRange {
            series: self.indicator.series().name().to_string(),
            size: self.indicator.series().bar_count(),
            index: isize::MAX,
        })?;
        self.indicator.value(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<N>> + 'a {
        let indicator = self.indicator;
        (0..self.len()).map(move |i| indicator.value(i as isize))
    }

    pub fn contains(&self, value: N) -> Result<bool> {
        for item in self.iter() {
            if item? == value {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn to_vec(&self) -> Result<Vec<N>> {
        self.iter().collect()
    }

    pub fn set(&mut self, _index: usize, _value: N) -> Result<N> {
        Err(BarlensError::unsupported("IndicatorValues::set"))
    }

    pub fn push(&mut self, _value: N) -> Result<()> {
        Err(BarlensError::unsupported("IndicatorValues::push"))
    }

    pub fn insert(&mut self, _index: usize, _value: N) -> Result<()> {
        Err(BarlensError::unsupported("IndicatorValues::insert"))
    }

    pub fn remove(&mut self, _index: usize) -> Result<N> {
        Err(BarlensError::unsupported("IndicatorValues::remove"))
    }

    pub fn clear(&mut self) -> Result<()> {
        Err(BarlensError::unsupported("IndicatorValues::clear"))
    }

    pub fn sort(&mut self) -> Result<()> {
        Err(BarlensError::unsupported("IndicatorValues::sort"))
    }
}
