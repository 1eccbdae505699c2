//! FILENAME: core/group-engine/src/value.rs
//! Group Value - The dynamic representation of field values and group keys.
//!
//! Every extracted field value is widened to a `GroupValue` so that records
//! with heterogeneous field types compose uniformly as group keys. The type:
//! - Has value equality and hashing (usable as a HashMap key)
//! - Has a total ordering (usable as a BTreeMap key)
//! - Serializes to the natural JSON scalar for its variant

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::error::{GroupError, GroupResult};

// ============================================================================
// ORDERED FLOAT
// ============================================================================

/// Wrapper around f64 that implements Eq, Ord and Hash for use as map keys.
/// NaN values are treated as equal to each other and sort after all numbers.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            // All NaN values hash to the same thing
            u64::MAX.hash(state);
        } else if self.0 == 0.0 {
            // -0.0 == 0.0, so both must hash alike
            0u64.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal),
        }
    }
}

impl OrderedFloat {
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

// ============================================================================
// GROUP VALUE
// ============================================================================

/// A field value or group key.
///
/// Variants never compare equal across each other: `Integer(1)` and
/// `Decimal(1)` land in different buckets. Ordering is by variant first
/// (declaration order), then by the natural ordering of the payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupValue {
    Empty,
    Boolean(bool),
    Integer(i64),
    Number(OrderedFloat),
    Decimal(Decimal),
    Text(String),
    DateTime(NaiveDateTime),
}

impl GroupValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, GroupValue::Empty)
    }

    /// Converts the value to a decimal for numeric interval bucketing.
    /// Empty converts to zero; booleans convert to one or zero.
    pub fn to_decimal(&self) -> GroupResult<Decimal> {
        match self {
            GroupValue::Empty => Ok(Decimal::ZERO),
            GroupValue::Boolean(b) => Ok(if *b { Decimal::ONE } else { Decimal::ZERO }),
            GroupValue::Integer(i) => Ok(Decimal::from(*i)),
            GroupValue::Number(n) => {
                Decimal::from_f64(n.0).ok_or_else(|| self.conversion_error("decimal"))
            }
            GroupValue::Decimal(d) => Ok(*d),
            GroupValue::Text(s) => {
                Decimal::from_str(s.trim()).map_err(|_| self.conversion_error("decimal"))
            }
            GroupValue::DateTime(_) => Err(self.conversion_error("decimal")),
        }
    }

    /// Converts the value to a date-time for calendar interval bucketing.
    /// Empty converts to the minimum date-time (0001-01-01 00:00:00).
    pub fn to_date_time(&self) -> GroupResult<NaiveDateTime> {
        match self {
            GroupValue::DateTime(dt) => Ok(*dt),
            GroupValue::Empty => {
                min_date_time().ok_or_else(|| self.conversion_error("date-time"))
            }
            GroupValue::Text(s) => {
                parse_date_time(s.trim()).ok_or_else(|| self.conversion_error("date-time"))
            }
            _ => Err(self.conversion_error("date-time")),
        }
    }

    fn conversion_error(&self, target: &'static str) -> GroupError {
        GroupError::Conversion {
            value: self.to_string(),
            target,
        }
    }
}

fn min_date_time() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1, 1, 1)?.and_hms_opt(0, 0, 0)
}

/// Parses the date-time text forms accepted for calendar bucketing.
/// Offsets are dropped and the wall-clock time is kept.
fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupValue::Empty => write!(f, "null"),
            GroupValue::Boolean(b) => write!(f, "{}", b),
            GroupValue::Integer(i) => write!(f, "{}", i),
            GroupValue::Number(n) => write!(f, "{}", n.0),
            GroupValue::Decimal(d) => write!(f, "{}", d.normalize()),
            GroupValue::Text(s) => write!(f, "\"{}\"", s),
            GroupValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

impl Serialize for GroupValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GroupValue::Empty => serializer.serialize_none(),
            GroupValue::Boolean(b) => serializer.serialize_bool(*b),
            GroupValue::Integer(i) => serializer.serialize_i64(*i),
            GroupValue::Number(n) => serializer.serialize_f64(n.0),
            GroupValue::Decimal(d) => {
                let d = d.normalize();
                // Whole buckets go out as integers so keys read as 0, 10, 20...
                match (d.scale(), d.to_i64()) {
                    (0, Some(i)) => serializer.serialize_i64(i),
                    _ => serializer.serialize_f64(d.to_f64().unwrap_or(f64::NAN)),
                }
            }
            GroupValue::Text(s) => serializer.serialize_str(s),
            GroupValue::DateTime(dt) => dt.serialize(serializer),
        }
    }
}

// ============================================================================
// WIDENING
// ============================================================================

/// Widens a concrete field type into a `GroupValue`.
pub trait ToGroupValue {
    fn to_group_value(&self) -> GroupValue;
}

macro_rules! widen_integer {
    ($($ty:ty),*) => {
        $(
            impl ToGroupValue for $ty {
                fn to_group_value(&self) -> GroupValue {
                    GroupValue::Integer(i64::from(*self))
                }
            }
        )*
    };
}

widen_integer!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! widen_wide_integer {
    ($($ty:ty),*) => {
        $(
            impl ToGroupValue for $ty {
                fn to_group_value(&self) -> GroupValue {
                    match i64::try_from(*self) {
                        Ok(i) => GroupValue::Integer(i),
                        Err(_) => GroupValue::Decimal(Decimal::from(*self)),
                    }
                }
            }
        )*
    };
}

widen_wide_integer!(u64, usize, isize);

impl ToGroupValue for f64 {
    fn to_group_value(&self) -> GroupValue {
        GroupValue::Number(OrderedFloat(*self))
    }
}

impl ToGroupValue for f32 {
    fn to_group_value(&self) -> GroupValue {
        GroupValue::Number(OrderedFloat(f64::from(*self)))
    }
}

impl ToGroupValue for bool {
    fn to_group_value(&self) -> GroupValue {
        GroupValue::Boolean(*self)
    }
}

impl ToGroupValue for str {
    fn to_group_value(&self) -> GroupValue {
        GroupValue::Text(self.to_string())
    }
}

impl ToGroupValue for String {
    fn to_group_value(&self) -> GroupValue {
        GroupValue::Text(self.clone())
    }
}

impl ToGroupValue for Decimal {
    fn to_group_value(&self) -> GroupValue {
        GroupValue::Decimal(*self)
    }
}

impl ToGroupValue for NaiveDateTime {
    fn to_group_value(&self) -> GroupValue {
        GroupValue::DateTime(*self)
    }
}

impl ToGroupValue for NaiveDate {
    fn to_group_value(&self) -> GroupValue {
        match self.and_hms_opt(0, 0, 0) {
            Some(dt) => GroupValue::DateTime(dt),
            None => GroupValue::Empty,
        }
    }
}

impl<Tz: TimeZone> ToGroupValue for DateTime<Tz> {
    fn to_group_value(&self) -> GroupValue {
        GroupValue::DateTime(self.naive_local())
    }
}

impl ToGroupValue for GroupValue {
    fn to_group_value(&self) -> GroupValue {
        self.clone()
    }
}

impl<T: ToGroupValue> ToGroupValue for Option<T> {
    fn to_group_value(&self) -> GroupValue {
        match self {
            Some(v) => v.to_group_value(),
            None => GroupValue::Empty,
        }
    }
}

impl<T: ToGroupValue + ?Sized> ToGroupValue for &T {
    fn to_group_value(&self) -> GroupValue {
        (**self).to_group_value()
    }
}

macro_rules! group_value_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for GroupValue {
                fn from(value: $ty) -> Self {
                    value.to_group_value()
                }
            }
        )*
    };
}

group_value_from!(i32, i64, u32, f64, bool, &str, String, Decimal, NaiveDateTime, NaiveDate);
