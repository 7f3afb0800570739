//! OHLCV bar representation.

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::num::Num;

/// One candle covering `time_period` and ending at `end_time`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar<N> {
    pub end_time: DateTime<Utc>,
    pub time_period: TimeDelta,
    pub open: N,
    pub high: N,
    pub low: N,
    pub close: N,
    pub volume: N,
    pub amount: N,
}

impl<N: Num> Bar<N> {
    pub fn begin_time(&self) -> DateTime<Utc> {
        self.end_time - self.time_period
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> N {
        self.high
            .plus(self.low)
            .plus(self.close)
            .divided_by(N::from_usize(3))
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: N) -> N {
        let hl = self.high.minus(self.low);
        let hc = self.high.minus(prev_close).abs();
        let lc = self.low.minus(prev_close).abs();
        hl.max(hc).max(lc)
    }
}
