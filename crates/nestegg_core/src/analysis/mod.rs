//! Post-projection analysis: single-pass folds over the monthly sequence.

mod solvency;

pub use solvency::{SolvencyAnalysis, SolvencyScan};
