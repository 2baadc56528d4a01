//! Concatenation of countable child ranges.

use std::fmt::{self, Debug};

use rand::RngCore;

use super::{sample_countable, CountableValueRange, ValueRange};

/// A countable range made of child ranges, in child order.
///
/// Values present in more than one child are enumerated once per child.
pub struct CompositeCountableValueRange<T> {
    children: Vec<Box<dyn CountableValueRange<T>>>,
}

impl<T> CompositeCountableValueRange<T> {
    pub fn new(children: Vec<Box<dyn CountableValueRange<T>>>) -> Self {
        CompositeCountableValueRange { children }
    }

    pub fn children(&self) -> &[Box<dyn CountableValueRange<T>>] {
        &self.children
    }
}

impl<T> Debug for CompositeCountableValueRange<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeCountableValueRange")
            .field("children", &self.children)
            .finish()
    }
}

impl<T> ValueRange<T> for CompositeCountableValueRange<T> {
    fn is_countable(&self) -> bool {
        true
    }

    fn is_empty(&self) -> bool {
        self.children.iter().all(|c| c.is_empty())
    }

    fn contains(&self, value: &T) -> bool {
        self.children.iter().any(|c| c.contains(value))
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Option<T> {
        sample_countable(self, rng)
    }
}

impl<T> CountableValueRange<T> for CompositeCountableValueRange<T> {
    fn size(&self) -> u64 {
        self.children
            .iter()
            .fold(0u64, |total, c| total.saturating_add(c.size()))
    }

    fn get(&self, index: u64) -> Option<T> {
        let mut remaining = index;
        for child in &self.children {
            let size = child.size();
            if remaining < size {
                return child.get(remaining);
            }
            remaining -= size;
        }
        None
    }
}
