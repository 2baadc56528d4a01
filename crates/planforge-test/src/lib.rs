//! Shared test fixtures for PlanForge crates.
//!
//! Each fixture is a complete small planning problem: a solution type,
//! its code-built descriptor, a score function and helpers that wire a
//! score director around it.
//!
//! - [`nqueens`] - N-Queens with a simple conflict score
//! - [`task`] - Task assignment with a hard/soft incremental calculator and pinning
//! - [`routing`] - Chained vehicle routing with an anchor shadow variable
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! planforge-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```
//! use planforge_scoring::ScoreDirector;
//! use planforge_test::nqueens::nqueens_director;
//!
//! let mut director = nqueens_director(&[1, 3, 0, 2]);
//! assert_eq!(director.calculate_score().score(), 0);
//! ```

pub mod nqueens;
pub mod routing;
pub mod task;

pub use nqueens::{NQueensSolution, Queen};
pub use routing::{Customer, Vehicle, VehicleRoutingSolution};
pub use task::{Employee, Task, TaskAssignment};
