//! Score types for representing solution quality
//!
//! Scores are used to compare solutions and guide the optimization process.
//! All score types are immutable, `Copy`, and carry an init score that
//! dominates every level in comparison.

#[macro_use]
mod macros;

mod bendable;
mod hard_medium_soft;
mod hard_soft_decimal;
mod hard_soft;
mod level;
mod simple;
mod traits;


pub use bendable::BendableScore;
pub use hard_medium_soft::HardMediumSoftScore;
pub use hard_soft::HardSoftScore;
pub use hard_soft_decimal::HardSoftDecimalScore;
pub use level::ScoreLevel;
pub use simple::SimpleScore;
pub use traits::{ParseableScore, Score, ScoreParseError};
