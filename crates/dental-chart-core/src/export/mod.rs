//! Chart export for reports.

mod chart;

pub use chart::*;
