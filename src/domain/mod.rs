//! Core domain types and logic.

pub mod num;
pub mod bar;
pub mod bar_series;
pub mod indicator;
pub mod indicator_helpers;
pub mod rule;
pub mod config_validation;
pub mod error;
