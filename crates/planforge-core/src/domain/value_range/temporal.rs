//! Date and date-time ranges stepping by a calendar or clock unit.

use std::fmt::{self, Debug};

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, TimeDelta};
use rand::RngCore;

use super::{sample_countable, CountableValueRange, ValueRange};
use crate::error::{PlanForgeError, Result};

/// The unit of a temporal range increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TemporalUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Months,
    Years,
}

impl TemporalUnit {
    /// Seconds per unit for fixed-length units; `None` for calendar units.
    fn fixed_seconds(self) -> Option<i64> {
        match self {
            TemporalUnit::Seconds => Some(1),
            TemporalUnit::Minutes => Some(60),
            TemporalUnit::Hours => Some(3_600),
            TemporalUnit::Days => Some(86_400),
            TemporalUnit::Months | TemporalUnit::Years => None,
        }
    }

    /// Months per unit for calendar units.
    fn months(self) -> Option<i64> {
        match self {
            TemporalUnit::Months => Some(1),
            TemporalUnit::Years => Some(12),
            _ => None,
        }
    }
}

impl fmt::Display for TemporalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TemporalUnit::Seconds => "seconds",
            TemporalUnit::Minutes => "minutes",
            TemporalUnit::Hours => "hours",
            TemporalUnit::Days => "days",
            TemporalUnit::Months => "months",
            TemporalUnit::Years => "years",
        };
        f.write_str(name)
    }
}

/// A chrono type a temporal range can step through.
pub trait TemporalValue: Copy + Ord + Debug + Send + Sync + 'static {
    /// Returns `self` moved forward by `amount` units, or `None` if the unit
    /// is not supported by this type or the result overflows.
    fn plus(self, amount: i64, unit: TemporalUnit) -> Option<Self>;

    /// Returns the number of whole units from `self` to `other` (floored),
    /// or `None` if the unit is not supported by this type.
    fn units_until(self, other: Self, unit: TemporalUnit) -> Option<i64>;
}

/// Whole calendar months from `from` to `to`, truncated toward zero.
fn whole_months_until<T: TemporalValue + Datelike>(from: T, to: T) -> Option<i64> {
    let from_months = from.year() as i64 * 12 + from.month0() as i64;
    let to_months = to.year() as i64 * 12 + to.month0() as i64;
    let mut months = to_months - from_months;
    // The last month only counts once its day (and time) has been reached.
    if months > 0 && from.plus(months, TemporalUnit::Months)? > to {
        months -= 1;
    } else if months < 0 && from.plus(months, TemporalUnit::Months)? < to {
        months += 1;
    }
    Some(months)
}

fn add_months<T>(
    value: T,
    months: i64,
    forward: impl Fn(T, Months) -> Option<T>,
    backward: impl Fn(T, Months) -> Option<T>,
) -> Option<T> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        forward(value, magnitude)
    } else {
        backward(value, magnitude)
    }
}

impl TemporalValue for NaiveDateTime {
    fn plus(self, amount: i64, unit: TemporalUnit) -> Option<Self> {
        if let Some(seconds) = unit.fixed_seconds() {
            let delta = TimeDelta::try_seconds(amount.checked_mul(seconds)?)?;
            return self.checked_add_signed(delta);
        }
        let months = amount.checked_mul(unit.months()?)?;
        add_months(
            self,
            months,
            NaiveDateTime::checked_add_months,
            NaiveDateTime::checked_sub_months,
        )
    }

    fn units_until(self, other: Self, unit: TemporalUnit) -> Option<i64> {
        if let Some(seconds) = unit.fixed_seconds() {
            return Some((other - self).num_seconds().div_euclid(seconds));
        }
        Some(whole_months_until(self, other)?.div_euclid(unit.months()?))
    }
}

impl TemporalValue for NaiveDate {
    fn plus(self, amount: i64, unit: TemporalUnit) -> Option<Self> {
        match unit {
            TemporalUnit::Days => {
                let days = Days::new(amount.unsigned_abs());
                if amount >= 0 {
                    self.checked_add_days(days)
                } else {
                    self.checked_sub_days(days)
                }
            }
            TemporalUnit::Months | TemporalUnit::Years => {
                let months = amount.checked_mul(unit.months()?)?;
                add_months(
                    self,
                    months,
                    NaiveDate::checked_add_months,
                    NaiveDate::checked_sub_months,
                )
            }
            _ => None,
        }
    }

    fn units_until(self, other: Self, unit: TemporalUnit) -> Option<i64> {
        match unit {
            TemporalUnit::Days => Some((other - self).num_days()),
            TemporalUnit::Months | TemporalUnit::Years => {
                Some(whole_months_until(self, other)?.div_euclid(unit.months()?))
            }
            _ => None,
        }
    }
}

/// A range of dates or date-times from `from` (inclusive) to `to` (exclusive)
/// stepping by `increment` units.
///
/// ```
/// use chrono::NaiveDate;
/// use planforge_core::domain::{CountableValueRange, TemporalUnit, TemporalValueRange};
///
/// let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let to = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let range = TemporalValueRange::new(from, to, 7, TemporalUnit::Days).unwrap();
/// assert_eq!(range.size(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalValueRange<T: TemporalValue> {
    from: T,
    to: T,
    increment: i64,
    unit: TemporalUnit,
    size: u64,
}

impl<T: TemporalValue> TemporalValueRange<T> {
    /// Creates a temporal range.
    ///
    /// Fails if `to < from`, `increment <= 0`, the unit does not apply to
    /// `T`, or `to` is not reachable from `from` in whole increments.
    pub fn new(from: T, to: T, increment: i64, unit: TemporalUnit) -> Result<Self> {
        if to < from {
            return Err(PlanForgeError::InvalidRange(format!(
                "TemporalValueRange: from ({:?}) must be at most to ({:?})",
                from, to
            )));
        }
        if increment <= 0 {
            return Err(PlanForgeError::InvalidRange(format!(
                "TemporalValueRange: increment ({}) must be positive",
                increment
            )));
        }
        let units = from.units_until(to, unit).ok_or_else(|| {
            PlanForgeError::InvalidRange(format!(
                "TemporalValueRange: unit {} is not supported for {:?}",
                unit, from
            ))
        })?;
        let aligned = units % increment == 0 && from.plus(units, unit) == Some(to);
        if !aligned {
            return Err(PlanForgeError::InvalidRange(format!(
                "TemporalValueRange: {:?} - {:?} must be a multiple of {} {}",
                to, from, increment, unit
            )));
        }
        Ok(TemporalValueRange {
            from,
            to,
            increment,
            unit,
            size: (units / increment) as u64,
        })
    }

    pub fn from(&self) -> T {
        self.from
    }

    pub fn to(&self) -> T {
        self.to
    }

    pub fn unit(&self) -> TemporalUnit {
        self.unit
    }
}

impl<T: TemporalValue> ValueRange<T> for TemporalValueRange<T> {
    fn is_countable(&self) -> bool {
        true
    }

    fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn contains(&self, value: &T) -> bool {
        if *value < self.from || *value >= self.to {
            return false;
        }
        match self.from.units_until(*value, self.unit) {
            Some(units) => {
                units % self.increment == 0 && self.from.plus(units, self.unit) == Some(*value)
            }
            None => false,
        }
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Option<T> {
        sample_countable(self, rng)
    }
}

impl<T: TemporalValue> CountableValueRange<T> for TemporalValueRange<T> {
    fn size(&self) -> u64 {
        self.size
    }

    fn get(&self, index: u64) -> Option<T> {
        if index >= self.size {
            return None;
        }
        let units = i64::try_from(index).ok()?.checked_mul(self.increment)?;
        self.from.plus(units, self.unit)
    }
}
