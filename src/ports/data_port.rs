//! Bar ingestion port trait.

use crate::domain::bar::Bar;
use crate::domain::error::BarlensError;
use crate::domain::num::Num;

pub trait BarSource<N: Num> {
    /// Bars in ascending end-time order.
    fn load_bars(&self) -> Result<Vec<Bar<N>>, BarlensError>;
}
