//! Numeric capability consumed by bars and indicators.
//!
//! Indicators never do arithmetic on a concrete type; they go through [`Num`],
//! so a precision-preserving decimal can be slotted in without touching the
//! indicator graph. The crate ships implementations for `f64` and `f32`.

use std::fmt::{Debug, Display};

pub trait Num: Copy + PartialOrd + Debug + Display + 'static {
    fn zero() -> Self;
    fn one() -> Self;

    /// Builds a literal in this representation.
    fn from_f64(value: f64) -> Self;

    fn from_usize(value: usize) -> Self;

    fn plus(self, other: Self) -> Self;
    fn minus(self, other: Self) -> Self;
    fn multiplied_by(self, other: Self) -> Self;
    fn divided_by(self, other: Self) -> Self;

    fn sqrt(self) -> Self;
    fn abs(self) -> Self;

    /// Smaller of the two; `self` on ties.
    fn min(self, other: Self) -> Self {
        if other < self { other } else { self }
    }

    /// Greater of the two; `self` on ties.
    fn max(self, other: Self) -> Self {
        if other > self { other } else { self }
    }
}

macro_rules! impl_float_num {
    ($t:ty) => {
        impl Num for $t {
            fn zero() -> Self {
                0.0
            }

            fn one() -> Self {
                1.0
            }

            fn from_f64(value: f64) -> Self {
                value as $t
            }

            fn from_usize(value: usize) -> Self {
                value as $t
            }

            fn plus(self, other: Self) -> Self {
                self + other
            }

            fn minus(self, other: Self) -> Self {
                self - other
            }

            fn multiplied_by(self, other: Self) -> Self {
                self * other
            }

            fn divided_by(self, other: Self) -> Self {
                self / other
            }

            fn sqrt(self) -> Self {
                <$t>::sqrt(self)
            }

            fn abs(self) -> Self {
                <$t>::abs(self)
            }
        }
    };
}

impl_float_num!(f64);
impl_float_num!(f32);
