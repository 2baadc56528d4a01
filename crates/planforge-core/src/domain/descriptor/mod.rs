//! Runtime descriptors of a planning solution, built in code once per solution type.

mod entity;
mod solution;
mod variable;


pub use entity::EntityDescriptor;
pub use solution::SolutionDescriptor;
pub use variable::{VariableDescriptor, VariableType};
