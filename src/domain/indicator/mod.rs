//! Indicator capability and its implementations.
//!
//! - `Indicator`: index → value over a [`BarSeries`]
//! - `cache`: per-index memo tables (`RecursiveCache`, `IndexMemo`) and the
//!   opt-in `Memoized` wrapper
//! - `operation`: uncached arithmetic nodes
//! - `sma`, `ema`, `stddev`, `extrema`, `previous`: cached recurrence indicators
//! - `numeric`: the fluent `NumericIndicator` decorator
//!
//! Base indicators reading bar fields live in
//! [`indicator_helpers`](crate::domain::indicator_helpers).

pub mod cache;
pub mod ema;
pub mod extrema;
pub mod numeric;
pub mod operation;
pub mod previous;
pub mod sma;
pub mod stddev;

use std::fmt;
use std::rc::Rc;

use crate::domain::bar_series::BarSeries;
use crate::domain::error::{BarlensError, Result};
use crate::domain::num::Num;

pub use numeric::{IndicatorValues, NumericIndicator, Operand};

/// A value for every addressable index of a series.
///
/// Evaluation is pull-based: `value` may pull other indices of its sources.
/// For a fixed series the result for a given index never changes.
pub trait Indicator<N: Num>: fmt::Display {
    fn value(&self, index: isize) -> Result<N>;

    fn series(&self) -> &Rc<BarSeries<N>>;

    /// Leading indices whose values are not yet reliable.
    fn unstable_bars(&self) -> usize;
}

/// Shared handle to an indicator node.
pub type IndicatorRef<N> = Rc<dyn Indicator<N>>;

/// Rejects zero-length lookback windows.
pub(crate) fn check_window(name: &str, bar_count: usize) -> Result<()> {
    if bar_count == 0 {
        return Err(BarlensError::invalid(format!(
            "{name} needs a window of at least one bar"
        )));
    }
    Ok(())
}

/// Validates `index` against the series and converts it to a cache slot.
pub(crate) fn slot<N: Num>(series: &BarSeries<N>, index: isize) -> Result<usize> {
    series.bar(index)?;
    Ok(index as usize)
}
