//! Working-object lookup keys and strategies.

use std::fmt;

/// A planning id in a form the score director can index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LookUpKey {
    Int(i64),
    Text(String),
}

impl fmt::Display for LookUpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookUpKey::Int(id) => write!(f, "{}", id),
            LookUpKey::Text(id) => write!(f, "{:?}", id),
        }
    }
}

macro_rules! lookup_key_from_int {
    ($($int:ty),+) => {
        $(
            impl From<$int> for LookUpKey {
                fn from(id: $int) -> Self {
                    LookUpKey::Int(id as i64)
                }
            }
        )+
    };
}

lookup_key_from_int!(i32, i64, u32, usize);

impl From<String> for LookUpKey {
    fn from(id: String) -> Self {
        LookUpKey::Text(id)
    }
}

impl From<&str> for LookUpKey {
    fn from(id: &str) -> Self {
        LookUpKey::Text(id.to_string())
    }
}

/// How the score director resolves external objects to working entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LookUpStrategyType {
    /// Look up by planning id; fail if the entity type declares none.
    #[default]
    PlanningIdOrFailFast,
    /// Look up by planning id; yield nothing if the entity type declares none.
    PlanningIdOrNone,
    /// Lookups are not supported.
    None,
}
