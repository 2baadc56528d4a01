//! Integer value ranges: `from` inclusive, `to` exclusive, stepping by `increment`.

use rand::RngCore;

use super::{sample_countable, CountableValueRange, ValueRange};
use crate::error::{PlanForgeError, Result};

/// Generates an integer range over `$int`, doing index arithmetic in `$wide`.
macro_rules! numeric_value_range {
    ($(#[$doc:meta])* $name:ident, $int:ty, $wide:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            from: $int,
            to: $int,
            increment: $int,
        }

        impl $name {
            /// Creates a range with increment 1.
            pub fn new(from: $int, to: $int) -> Result<Self> {
                Self::with_increment(from, to, 1)
            }

            /// Creates a range stepping by `increment`.
            ///
            /// Fails if `to < from`, `increment <= 0`, or the span is not a
            /// multiple of the increment.
            pub fn with_increment(from: $int, to: $int, increment: $int) -> Result<Self> {
                if to < from {
                    return Err(PlanForgeError::InvalidRange(format!(
                        "{}: from ({}) must be at most to ({})",
                        stringify!($name), from, to
                    )));
                }
                if increment <= 0 {
                    return Err(PlanForgeError::InvalidRange(format!(
                        "{}: increment ({}) must be positive",
                        stringify!($name), increment
                    )));
                }
                let span = (to as $wide).checked_sub(from as $wide).ok_or_else(|| {
                    PlanForgeError::InvalidRange(format!(
                        "{}: span from {} to {} overflows",
                        stringify!($name), from, to
                    ))
                })?;
                if span % increment as $wide != 0 {
                    return Err(PlanForgeError::InvalidRange(format!(
                        "{}: to ({}) - from ({}) must be a multiple of increment ({})",
                        stringify!($name), to, from, increment
                    )));
                }
                Ok($name { from, to, increment })
            }

            pub fn from(&self) -> $int {
                self.from
            }

            pub fn to(&self) -> $int {
                self.to
            }

            pub fn increment(&self) -> $int {
                self.increment
            }
        }

        impl ValueRange<$int> for $name {
            fn is_countable(&self) -> bool {
                true
            }

            fn is_empty(&self) -> bool {
                self.from == self.to
            }

            fn contains(&self, value: &$int) -> bool {
                *value >= self.from
                    && *value < self.to
                    && (*value as $wide - self.from as $wide) % self.increment as $wide == 0
            }

            fn sample(&self, rng: &mut dyn RngCore) -> Option<$int> {
                sample_countable(self, rng)
            }
        }

        impl CountableValueRange<$int> for $name {
            fn size(&self) -> u64 {
                let count = (self.to as $wide - self.from as $wide) / self.increment as $wide;
                u64::try_from(count).unwrap_or(u64::MAX)
            }

            fn get(&self, index: u64) -> Option<$int> {
                if index >= self.size() {
                    return None;
                }
                Some((self.from as $wide + index as $wide * self.increment as $wide) as $int)
            }
        }
    };
}

numeric_value_range!(
    /// A range of `i32` values.
    IntValueRange,
    i32,
    i64
);

numeric_value_range!(
    /// A range of `i64` values.
    ///
    /// ```
    /// use planforge_core::domain::{CountableValueRange, LongValueRange};
    ///
    /// let range = LongValueRange::with_increment(0, 10, 2).unwrap();
    /// assert_eq!(range.size(), 5);
    /// assert_eq!(range.original_iter().collect::<Vec<_>>(), vec![0, 2, 4, 6, 8]);
    /// ```
    LongValueRange,
    i64,
    i128
);

numeric_value_range!(
    /// A range of `i128` values for very large integer domains.
    ///
    /// The size saturates at `u64::MAX`.
    BigIntegerValueRange,
    i128,
    i128
);
