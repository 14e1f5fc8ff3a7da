//! Pre-evaluated literal constant values.
//!
//! The host front-end evaluates constant expressions; the analysis only
//! ever sees the finished values below. Values of different kinds are
//! never comparable: [`ConstValue::try_cmp`] returns `None` for a
//! cross-kind comparison and the caller turns that into a fatal error
//! rather than coercing.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;

use num_bigint::BigInt;
use smol_str::SmolStr;

#[derive(Clone, Debug)]
pub enum ConstValue {
    Bool(bool),
    Int(BigInt),
    Float(f64),
    Str(SmolStr),
    Char(char),
}

impl ConstValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConstValue::Bool(_) => "bool",
            ConstValue::Int(_) => "integer",
            ConstValue::Float(_) => "float",
            ConstValue::Str(_) => "string",
            ConstValue::Char(_) => "char",
        }
    }

    /// Ordering within a literal kind; `None` across kinds.
    ///
    /// Floats use [`f64::total_cmp`], so `None` always means a kind
    /// mismatch and never an incomparable value.
    pub fn try_cmp(&self, other: &ConstValue) -> Option<Ordering> {
        match (self, other) {
            (ConstValue::Bool(lhs), ConstValue::Bool(rhs)) => Some(lhs.cmp(rhs)),
            (ConstValue::Int(lhs), ConstValue::Int(rhs)) => Some(lhs.cmp(rhs)),
            (ConstValue::Float(lhs), ConstValue::Float(rhs)) => Some(lhs.total_cmp(rhs)),
            (ConstValue::Str(lhs), ConstValue::Str(rhs)) => Some(lhs.cmp(rhs)),
            (ConstValue::Char(lhs), ConstValue::Char(rhs)) => Some(lhs.cmp(rhs)),
            _ => None,
        }
    }
}

// Set identity for floats is bitwise so values can live in hash sets;
// ordering stays the business of `try_cmp`.
impl PartialEq for ConstValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConstValue::Bool(lhs), ConstValue::Bool(rhs)) => lhs == rhs,
            (ConstValue::Int(lhs), ConstValue::Int(rhs)) => lhs == rhs,
            (ConstValue::Float(lhs), ConstValue::Float(rhs)) => lhs.to_bits() == rhs.to_bits(),
            (ConstValue::Str(lhs), ConstValue::Str(rhs)) => lhs == rhs,
            (ConstValue::Char(lhs), ConstValue::Char(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

impl Eq for ConstValue {}

impl Hash for ConstValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            ConstValue::Bool(value) => value.hash(state),
            ConstValue::Int(value) => value.hash(state),
            ConstValue::Float(value) => value.to_bits().hash(state),
            ConstValue::Str(value) => value.hash(state),
            ConstValue::Char(value) => value.hash(state),
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Bool(value) => write!(f, "{value}"),
            ConstValue::Int(value) => write!(f, "{value}"),
            ConstValue::Float(value) => write!(f, "{value}"),
            ConstValue::Str(value) => write!(f, "\"{value}\""),
            ConstValue::Char(value) => write!(f, "'{value}'"),
        }
    }
}

impl From<bool> for ConstValue {
    fn from(value: bool) -> Self {
        ConstValue::Bool(value)
    }
}

impl From<i64> for ConstValue {
    fn from(value: i64) -> Self {
        ConstValue::Int(BigInt::from(value))
    }
}

impl From<BigInt> for ConstValue {
    fn from(value: BigInt) -> Self {
        ConstValue::Int(value)
    }
}

impl From<f64> for ConstValue {
    fn from(value: f64) -> Self {
        ConstValue::Float(value)
    }
}

impl From<char> for ConstValue {
    fn from(value: char) -> Self {
        ConstValue::Char(value)
    }
}

impl From<&str> for ConstValue {
    fn from(value: &str) -> Self {
        ConstValue::Str(SmolStr::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmp_within_kind() {
        assert_eq!(
            ConstValue::from(3i64).try_cmp(&ConstValue::from(5i64)),
            Some(Ordering::Less)
        );
        assert_eq!(
            ConstValue::from(false).try_cmp(&ConstValue::from(true)),
            Some(Ordering::Less)
        );
        assert_eq!(
            ConstValue::from('a').try_cmp(&ConstValue::from('a')),
            Some(Ordering::Equal)
        );
        assert_eq!(
            ConstValue::from("abc").try_cmp(&ConstValue::from("abd")),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn cmp_across_kinds_is_none() {
        assert_eq!(ConstValue::from(3i64).try_cmp(&ConstValue::from(true)), None);
        assert_eq!(ConstValue::from('a').try_cmp(&ConstValue::from("a")), None);
        assert_eq!(ConstValue::from(1.0).try_cmp(&ConstValue::from(1i64)), None);
    }

    #[test]
    fn nan_is_ordered_not_mismatched() {
        let nan = ConstValue::from(f64::NAN);
        assert!(nan.try_cmp(&ConstValue::from(0.0)).is_some());
        assert_eq!(nan, nan.clone());
    }
}
