//! Explicit value ranges: a list of values, booleans, and the empty range.

use std::fmt::{self, Debug};
use std::marker::PhantomData;

use rand::RngCore;

use super::{sample_countable, CountableValueRange, ValueRange};

/// A range over an explicit list of values, in list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListValueRange<T> {
    values: Vec<T>,
}

impl<T> ListValueRange<T> {
    pub fn new(values: Vec<T>) -> Self {
        ListValueRange { values }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T> FromIterator<T> for ListValueRange<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        ListValueRange::new(iter.into_iter().collect())
    }
}

impl<T> ValueRange<T> for ListValueRange<T>
where
    T: Clone + PartialEq + Debug + Send + Sync,
{
    fn is_countable(&self) -> bool {
        true
    }

    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn contains(&self, value: &T) -> bool {
        self.values.contains(value)
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Option<T> {
        sample_countable(self, rng)
    }
}

impl<T> CountableValueRange<T> for ListValueRange<T>
where
    T: Clone + PartialEq + Debug + Send + Sync,
{
    fn size(&self) -> u64 {
        self.values.len() as u64
    }

    fn get(&self, index: u64) -> Option<T> {
        self.values.get(usize::try_from(index).ok()?).cloned()
    }
}

/// The range `[false, true]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BooleanValueRange;

impl ValueRange<bool> for BooleanValueRange {
    fn is_countable(&self) -> bool {
        true
    }

    fn is_empty(&self) -> bool {
        false
    }

    fn contains(&self, _value: &bool) -> bool {
        true
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Option<bool> {
        sample_countable(self, rng)
    }
}

impl CountableValueRange<bool> for BooleanValueRange {
    fn size(&self) -> u64 {
        2
    }

    fn get(&self, index: u64) -> Option<bool> {
        match index {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }
}

/// A range without values.
pub struct EmptyValueRange<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> EmptyValueRange<T> {
    pub fn new() -> Self {
        EmptyValueRange {
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for EmptyValueRange<T> {
    fn clone(&self) -> Self {
        EmptyValueRange::new()
    }
}

impl<T> Debug for EmptyValueRange<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EmptyValueRange")
    }
}

impl<T> Default for EmptyValueRange<T> {
    fn default() -> Self {
        EmptyValueRange::new()
    }
}

impl<T> ValueRange<T> for EmptyValueRange<T> {
    fn is_countable(&self) -> bool {
        true
    }

    fn is_empty(&self) -> bool {
        true
    }

    fn contains(&self, _value: &T) -> bool {
        false
    }

    fn sample(&self, _rng: &mut dyn RngCore) -> Option<T> {
        None
    }
}

impl<T> CountableValueRange<T> for EmptyValueRange<T> {
    fn size(&self) -> u64 {
        0
    }

    fn get(&self, _index: u64) -> Option<T> {
        None
    }
}
