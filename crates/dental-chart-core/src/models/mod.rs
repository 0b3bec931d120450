//! Domain models for the tooth chart.

mod status;
mod tooth;

pub use status::*;
pub use tooth::*;
