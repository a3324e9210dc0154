//! Imputation module for handling missing values.
//!
//! This module provides:
//! - Statistical fills (mean, median, mode, constant) for single columns
//! - The interactive resolver that picks a strategy for the selected columns

mod resolver;
mod statistical;

pub use resolver::{MissingValueResolver, NullStrategy};
pub use statistical::StatisticalImputer;
