//! Domain model for defining planning problems
//!
//! - `PlanningSolution`: The container for the complete problem and solution
//! - `PlanningEntity`: Things that can be planned/optimized
//! - `PlanningId`: Unique identification for working-object lookups
//! - Descriptors: the entity types and variables of a solution, built in code
//! - Value ranges, supplies and shadow variable listeners

mod descriptor;
mod lookup;
mod traits;
pub mod listener;
pub mod supply;
pub mod value_range;

pub use descriptor::{EntityDescriptor, SolutionDescriptor, VariableDescriptor, VariableType};
pub use listener::{
    NoShadowObserver, ShadowVariableContext, ShadowVariableObserver, VariableListener,
    VariableListenerSupport,
};
pub use lookup::{LookUpKey, LookUpStrategyType};
pub use supply::{
    AnchorTailDemand, AnchorTailSupply, ChainLink, Demand, DemandKey, SingletonInverseDemand,
    SingletonInverseSupply, Supply, SupplyManager,
};
pub use traits::{PlanningEntity, PlanningId, PlanningSolution};
pub use value_range::{
    BigIntegerValueRange, BooleanValueRange, CompositeCountableValueRange, CountableValueRange,
    DoubleValueRange, EmptyValueRange, IntValueRange, ListValueRange, LongValueRange,
    OriginalValueIter, RandomValueIter, TemporalUnit, TemporalValue, TemporalValueRange,
    ValueRange,
};
