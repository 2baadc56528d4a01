//! Value ranges for planning variables.
//!
//! A value range is the set of values a genuine variable may take. Countable
//! ranges can be enumerated in their original order and indexed; uncountable
//! ranges (a continuous double interval) only support sampling.
//!
//! Every range can produce a lazy, never-ending random iterator. For
//! countable ranges each draw picks a uniform index, so a seeded RNG yields a
//! reproducible sequence.

mod composite;
mod double;
mod list;
mod numeric;
mod temporal;


use std::fmt::Debug;

use rand::{Rng, RngCore};

pub use composite::CompositeCountableValueRange;
pub use double::DoubleValueRange;
pub use list::{BooleanValueRange, EmptyValueRange, ListValueRange};
pub use numeric::{BigIntegerValueRange, IntValueRange, LongValueRange};
pub use temporal::{TemporalUnit, TemporalValue, TemporalValueRange};

/// A set of admissible values for a planning variable.
///
/// The trait is object safe: the RNG is passed as `&mut dyn RngCore` so
/// ranges can be boxed inside composite ranges and selectors.
pub trait ValueRange<T>: Debug + Send + Sync {
    /// Returns true if the range can be enumerated.
    fn is_countable(&self) -> bool;

    /// Returns true if the range holds no value.
    fn is_empty(&self) -> bool;

    /// Returns true if the value belongs to the range.
    fn contains(&self, value: &T) -> bool;

    /// Draws one uniformly random value, or `None` for an empty range.
    fn sample(&self, rng: &mut dyn RngCore) -> Option<T>;

    /// Returns a never-ending iterator of random values.
    ///
    /// The iterator ends immediately on an empty range.
    fn random_iter<'a>(&'a self, rng: &'a mut dyn RngCore) -> RandomValueIter<'a, T>
    where
        Self: Sized,
    {
        RandomValueIter { range: self, rng }
    }
}

/// A value range whose elements can be counted and indexed.
pub trait CountableValueRange<T>: ValueRange<T> {
    /// Returns the number of values.
    fn size(&self) -> u64;

    /// Returns the value at `index` in original order.
    fn get(&self, index: u64) -> Option<T>;

    /// Returns a finite iterator in original order.
    ///
    /// Iteration is restartable only by requesting a new iterator.
    fn original_iter(&self) -> OriginalValueIter<'_, T>
    where
        Self: Sized,
    {
        OriginalValueIter::new(self)
    }
}

/// Samples a countable range by drawing a uniform index.
pub(crate) fn sample_countable<T, R>(range: &R, rng: &mut dyn RngCore) -> Option<T>
where
    R: CountableValueRange<T> + ?Sized,
{
    let size = range.size();
    if size == 0 {
        return None;
    }
    range.get(rng.random_range(0..size))
}

/// Original-order iterator over a countable range.
pub struct OriginalValueIter<'a, T> {
    range: &'a dyn CountableValueRange<T>,
    index: u64,
    size: u64,
}

impl<'a, T> OriginalValueIter<'a, T> {
    /// Creates an iterator over any countable range, boxed ones included.
    pub fn new(range: &'a dyn CountableValueRange<T>) -> Self {
        OriginalValueIter {
            range,
            index: 0,
            size: range.size(),
        }
    }
}

impl<T> Iterator for OriginalValueIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.index >= self.size {
            return None;
        }
        let value = self.range.get(self.index);
        self.index += 1;
        value
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.size - self.index).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

/// Never-ending random iterator over a range.
pub struct RandomValueIter<'a, T> {
    range: &'a dyn ValueRange<T>,
    rng: &'a mut dyn RngCore,
}

impl<'a, T> RandomValueIter<'a, T> {
    /// Creates a random iterator over any range, boxed ones included.
    pub fn new(range: &'a dyn ValueRange<T>, rng: &'a mut dyn RngCore) -> Self {
        RandomValueIter { range, rng }
    }
}

impl<T> Iterator for RandomValueIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.range.sample(self.rng)
    }
}
