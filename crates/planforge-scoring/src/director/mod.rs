//! Score director implementations.
//!
//! The score director owns the working solution and calculates its score.
//!
//! # Score Director Types
//!
//! - [`SimpleScoreDirector`] - Full recalculation from a score function
//! - [`IncrementalScoreDirector`] - Delta updates through an
//!   [`IncrementalScoreCalculator`]
//! - [`RecordingScoreDirector`] - Undo tracking wrapper used for move evaluation

mod state;
mod factory;
mod incremental;
mod simple;
mod traits;

pub mod recording;

#[cfg(test)]
mod tests;

pub use factory::{IncrementalScoreDirectorFactory, ScoreDirectorFactory, SimpleScoreDirectorFactory};
pub use incremental::{IncrementalScoreCalculator, IncrementalScoreDirector};
pub use recording::RecordingScoreDirector;
pub use simple::SimpleScoreDirector;
pub use traits::{ScoreDirector, ScoreDirectorExt, UndoAction};
