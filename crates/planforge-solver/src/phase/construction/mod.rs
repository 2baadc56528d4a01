//! Construction heuristic phase
//!
//! Builds an initial solution by assigning values to uninitialized
//! planning variables one entity at a time.

mod forager;
mod phase;
mod placer;

pub use forager::ConstructionHeuristicForager;
pub use phase::ConstructionHeuristicPhase;
pub use placer::{EntityPlacer, Placement, PlacementMove, QueuedEntityPlacer};

#[cfg(test)]
mod tests;
