//! Trading rules: boolean predicates over a series index.
//!
//! - `CrossedUpRule` / `CrossedDownRule`: `left` crosses `right` at the index
//! - `OverRule` / `UnderRule`: strict pointwise comparison
//! - `AndRule` / `OrRule` / `NotRule`: combinators (short-circuiting)
//!
//! Rules hold shared indicator handles and no mutable state, so evaluating a
//! rule at the same index always gives the same answer.
//!
//! # Evaluation semantics
//!
//! - Crossings compare the index with the one before it and return `false` at
//!   index 0, which has no predecessor
//! - Out-of-range indices propagate the series error

use std::rc::Rc;

use crate::domain::error::Result;
use crate::domain::indicator::IndicatorRef;
use crate::domain::num::Num;

pub trait Rule {
    fn is_satisfied(&self, index: isize) -> Result<bool>;

    fn and<R: Rule + 'static>(self, other: R) -> AndRule
    where
        Self: Sized + 'static,
    {
        AndRule::new(Rc::new(self), Rc::new(other))
    }

    fn or<R: Rule + 'static>(self, other: R) -> OrRule
    where
        Self: Sized + 'static,
    {
        OrRule::new(Rc::new(self), Rc::new(other))
    }

    fn negate(self) -> NotRule
    where
        Self: Sized + 'static,
    {
        NotRule::new(Rc::new(self))
    }
}

pub type RuleRef = Rc<dyn Rule>;

/// `left[i-1] <= right[i-1]` and `left[i] > right[i]`.
pub struct CrossedUpRule<N: Num> {
    left: IndicatorRef<N>,
    right: IndicatorRef<N>,
}

impl<N: Num> CrossedUpRule<N> {
    pub fn new(left: IndicatorRef<N>, right: IndicatorRef<N>) -> Self {
        Self { left, right }
    }
}

impl<N: Num> Rule for CrossedUpRule<N> {
    fn is_satisfied(&self, index: isize) -> Result<bool> {
        let now = self.left.value(index)? > self.right.value(index)?;
        if index == 0 || !now {
            return Ok(false);
        }
        Ok(self.left.value(index - 1)? <= self.right.value(index - 1)?)
    }
}

/// `left[i-1] >= right[i-1]` and `left[i] < right[i]`.
pub struct CrossedDownRule<N: Num> {
    left: IndicatorRef<N>,
    right: IndicatorRef<N>,
}

impl<N: Num> CrossedDownRule<N> {
    pub fn new(left: IndicatorRef<N>, right: IndicatorRef<N>) -> Self {
        Self { left, right }
    }
}

impl<N: Num> Rule for CrossedDownRule<N> {
    fn is_satisfied(&self, index: isize) -> Result<bool> {
        let now = self.left.value(index)? < self.right.value(index)?;
        if index == 0 || !now {
            return Ok(false);
        }
        Ok(self.left.value(index - 1)? >= self.right.value(index - 1)?)
    }
}

/// `left[i] > right[i]`.
pub struct OverRule<N: Num> {
    left: IndicatorRef<N>,
    right: IndicatorRef<N>,
}

impl<N: Num> OverRule<N> {
    pub fn new(left: IndicatorRef<N>, right: IndicatorRef<N>) -> Self {
        Self { left, right }
    }
}

impl<N: Num> Rule for OverRule<N> {
    fn is_satisfied(&self, index: isize) -> Result<bool> {
        Ok(self.left.value(index)? > self.right.value(index)?)
    }
}

/// `left[i] < right[i]`.
pub struct UnderRule<N: Num> {
    left: IndicatorRef<N>,
    right: IndicatorRef<N>,
}

impl<N: Num> UnderRule<N> {
    pub fn new(left: IndicatorRef<N>, right: IndicatorRef<N>) -> Self {
        Self { left, right }
    }
}

impl<N: Num> Rule for UnderRule<N> {
    fn is_satisfied(&self, index: isize) -> Result<bool> {
        Ok(self.left.value(index)? < self.right.value(index)?)
    }
}

pub struct AndRule {
    left: RuleRef,
    right: RuleRef,
}

impl AndRule {
    pub fn new(left: RuleRef, right: RuleRef) -> Self {
        Self { left, right }
    }
}

impl Rule for AndRule {
    fn is_satisfied(&self, index: isize) -> Result<bool> {
        Ok(self.left.is_satisfied(index)? && self.right.is_satisfied(index)?)
    }
}

pub struct OrRule {
    left: RuleRef,
    right: RuleRef,
}

impl OrRule {
    pub fn new(left: RuleRef, right: RuleRef) -> Self {
        Self { left, right }
    }
}

impl Rule for OrRule {
    fn is_satisfied(&self, index: isize) -> Result<bool> {
        Ok(self.left.is_satisfied(index)? || self.right.is_satisfied(index)?)
    }
}

pub struct NotRule {
    rule: RuleRef,
}

impl NotRule {
    pub fn new(rule: RuleRef) -> Self {
        Self { rule }
    }
}

impl Rule for NotRule {
    fn is_satisfied(&self, index: isize) -> Result<bool> {
        Ok(!self.rule.is_satisfied(index)?)
    }
}
