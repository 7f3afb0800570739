//! Uncached arithmetic nodes.
//!
//! Every call to `value` re-evaluates the operands; nothing is stored. Wrap a
//! node in [`Memoized`](super::cache::Memoized) when repeated queries matter.
//! Both node types report zero unstable bars regardless of their operands.

use std::fmt;
use std::rc::Rc;

use crate::domain::bar_series::BarSeries;
use crate::domain::error::Result;
use crate::domain::indicator::{Indicator, IndicatorRef};
use crate::domain::num::Num;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Sum,
    Difference,
    Product,
    Quotient,
    Min,
    Max,
}

impl BinaryOp {
    pub fn apply<N: Num>(self, left: N, right: N) -> N {
        match self {
            BinaryOp::Sum => left.plus(right),
            BinaryOp::Difference => left.minus(right),
            BinaryOp::Product => left.multiplied_by(right),
            BinaryOp::Quotient => left.divided_by(right),
            BinaryOp::Min => left.min(right),
            BinaryOp::Max => left.max(right),
        }
    }
}

pub struct BinaryOperation<N: Num> {
    op: BinaryOp,
    left: IndicatorRef<N>,
    right: IndicatorRef<N>,
}

impl<N: Num> BinaryOperation<N> {
    /// Callers are responsible for checking that both operands share a
    /// compatible series.
    pub fn new(op: BinaryOp, left: IndicatorRef<N>, right: IndicatorRef<N>) -> Self {
        Self { op, left, right }
    }

    pub fn op(&self) -> BinaryOp {
        self.op
    }

    pub fn operands(&self) -> (&IndicatorRef<N>, &IndicatorRef<N>) {
        (&self.left, &self.right)
    }
}

impl<N: Num> Indicator<N> for BinaryOperation<N> {
    fn value(&self, index: isize) -> Result<N> {
        let left = self.left.value(index)?;
        let right = self.right.value(index)?;
        Ok(self.op.apply(left, right))
    }

    fn series(&self) -> &Rc<BarSeries<N>> {
        self.left.series()
    }

    fn unstable_bars(&self) -> usize {
        0
    }
}

impl<N: Num> fmt::Display for BinaryOperation<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            BinaryOp::Sum => write!(f, "({} + {})", self.left, self.right),
            BinaryOp::Difference => write!(f, "({} - {})", self.left, self.right),
            BinaryOp::Product => write!(f, "({} * {})", self.left, self.right),
            BinaryOp::Quotient => write!(f, "({} / {})", self.left, self.right),
            BinaryOp::Min => write!(f, "MIN({}, {})", self.left, self.right),
            BinaryOp::Max => write!(f, "MAX({}, {})", self.left, self.right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Abs,
    Sqrt,
}

pub struct UnaryOperation<N: Num> {
    op: UnaryOp,
    operand: IndicatorRef<N>,
}

impl<N: Num> UnaryOperation<N> {
    pub fn new(op: UnaryOp, operand: IndicatorRef<N>) -> Self {
        Self { op, operand }
    }
}

impl<N: Num> Indicator<N> for UnaryOperation<N> {
    fn value(&self, index: isize) -> Result<N> {
        let value = self.operand.value(index)?;
        Ok(match self.op {
            UnaryOp::Abs => value.abs(),
            UnaryOp::Sqrt => value.sqrt(),
        })
    }

    fn series(&self) -> &Rc<BarSeries<N>> {
        self.operand.series()
    }

    fn unstable_bars(&self) -> usize {
        0
    }
}

impl<N: Num> fmt::Display for UnaryOperation<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            UnaryOp::Abs => write!(f, "ABS({})", self.operand),
            UnaryOp::Sqrt => write!(f, "SQRT({})", self.operand),
        }
    }
}
