//! Declarative macros for reducing score type boilerplate.
//!
//! These macros generate the repetitive trait implementations that all
//! field-based score types share: ordering, arithmetic ops, multiply/divide,
//! and slash-separated parsing. Every generated impl threads the
//! `init_score` field through first.

/// Generates `Ord`, `PartialOrd`, `Add`, `Sub`, and `Neg` for a field-based score type.
///
/// The constructor must accept `init_score` followed by the fields in the order
/// they are listed. Ordering compares `init_score`, then each field in turn.
///
/// # Usage
/// ```ignore
/// impl_score_ops!(HardSoftScore { hard, soft } => of_uninitialized);
/// ```
macro_rules! impl_score_ops {
    ($type:ident { $($field:ident),+ } => $ctor:ident) => {
        impl Ord for $type {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.init_score
                    .cmp(&other.init_score)
                    $(.then_with(|| self.$field.cmp(&other.$field)))+
            }
        }

        impl PartialOrd for $type {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl std::ops::Add for $type {
            type Output = Self;

            fn add(self, other: Self) -> Self {
                $type::$ctor(self.init_score + other.init_score, $(self.$field + other.$field),+)
            }
        }

        impl std::ops::Sub for $type {
            type Output = Self;

            fn sub(self, other: Self) -> Self {
                $type::$ctor(self.init_score - other.init_score, $(self.$field - other.$field),+)
            }
        }

        impl std::ops::Neg for $type {
            type Output = Self;

            fn neg(self) -> Self {
                $type::$ctor(-self.init_score, $(-self.$field),+)
            }
        }
    };
}

/// Generates `multiply`, `divide`, and `abs` methods for the `Score` trait impl.
///
/// Intended to be used *inside* an `impl Score for Type { ... }` block.
/// Levels are rounded, the init score is floored.
macro_rules! impl_score_scale {
    ($type:ident { $($field:ident),+ } => $ctor:ident) => {
        fn multiply(&self, multiplicand: f64) -> Self {
            $type::$ctor(
                (self.init_score as f64 * multiplicand).floor() as i32,
                $( (self.$field as f64 * multiplicand).round() as i64 ),+
            )
        }

        fn divide(&self, divisor: f64) -> Self {
            $type::$ctor(
                (self.init_score as f64 / divisor).floor() as i32,
                $( (self.$field as f64 / divisor).round() as i64 ),+
            )
        }

        fn abs(&self) -> Self {
            $type::$ctor(self.init_score.abs(), $( self.$field.abs() ),+)
        }
    };
}

/// Generates `ParseableScore` for scores using the `"[Ninit/]Xsuffix/Ysuffix"` format.
///
/// Each field maps to a suffix label (e.g., `hard => "hard"`, `soft => "soft"`).
/// All level values are parsed as `i64`.
///
/// # Usage
/// ```ignore
/// impl_score_parse!(HardSoftScore { hard => "hard", soft => "soft" } => of_uninitialized);
/// ```
macro_rules! impl_score_parse {
    ($type:ident { $($field:ident => $suffix:literal),+ } => $ctor:ident) => {
        impl $crate::score::traits::ParseableScore for $type {
            fn parse(s: &str) -> Result<Self, $crate::score::traits::ScoreParseError> {
                let s = s.trim();
                let (init_score, body) =
                    $crate::score::traits::split_init_prefix(s, stringify!($type))?;
                let parts: Vec<&str> = body.split('/').collect();
                let suffixes: &[&str] = &[ $($suffix),+ ];
                let count = suffixes.len();

                if parts.len() != count {
                    return Err($crate::score::traits::ScoreParseError {
                        message: format!(
                            "Invalid {} format '{}': expected {} parts separated by '/'",
                            stringify!($type), s, count
                        ),
                    });
                }

                let mut _idx = 0usize;
                $(
                    let $field = {
                        let part = parts[_idx].trim();
                        let num_str = part.strip_suffix($suffix).ok_or_else(|| {
                            $crate::score::traits::ScoreParseError {
                                message: format!(
                                    "{} part '{}' must end with '{}'",
                                    stringify!($field), part, $suffix
                                ),
                            }
                        })?;
                        let val = num_str.parse::<i64>().map_err(|e| {
                            $crate::score::traits::ScoreParseError {
                                message: format!(
                                    "Invalid {} score '{}': {}",
                                    $suffix, num_str, e
                                ),
                            }
                        })?;
                        _idx += 1;
                        val
                    };
                )+

                Ok($type::$ctor(init_score, $($field),+))
            }

            fn to_string_repr(&self) -> String {
                self.to_string()
            }
        }
    };
}
