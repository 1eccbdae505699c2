//! FILENAME: core/group-engine/src/definition.rs
//! Group Definition - The serializable grouping request.
//!
//! These types DESCRIBE one grouping level. They arrive from the request
//! layer (usually deserialized from JSON query parameters) and are
//! immutable snapshots of what the grid asked for.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{GroupError, GroupResult};

// ============================================================================
// GROUP DESCRIPTOR
// ============================================================================

/// One grouping level: which field to group by and how to bucket it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDescriptor {
    /// Field path, possibly dotted ("customer.address.city").
    pub selector: String,

    /// Numeric width ("10", "0.5") or a calendar token ("month").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_interval: Option<String>,

    /// `Some(false)` on the innermost level asks for counts instead of rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_expanded: Option<bool>,
}

impl GroupDescriptor {
    pub fn new(selector: impl Into<String>) -> Self {
        GroupDescriptor {
            selector: selector.into(),
            group_interval: None,
            is_expanded: None,
        }
    }

    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.group_interval = Some(interval.into());
        self
    }

    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.is_expanded = Some(expanded);
        self
    }

    /// Whether rows are materialized for this level. Absent means expanded.
    pub fn expands_items(&self) -> bool {
        self.is_expanded.unwrap_or(true)
    }

    /// Parses the interval, if any. An empty string means no interval.
    pub fn interval(&self) -> GroupResult<Option<GroupInterval>> {
        match self.group_interval.as_deref() {
            None | Some("") => Ok(None),
            Some(text) => text.parse().map(Some),
        }
    }
}

// ============================================================================
// GROUP INTERVAL
// ============================================================================

/// A bucketing rule applied to a raw field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupInterval {
    /// Contiguous ranges of the given width; the key is the range's lower bound.
    Numeric(Decimal),
    /// A calendar component; the key is that component's integer value.
    Calendar(CalendarPart),
}

impl FromStr for GroupInterval {
    type Err = GroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let starts_with_digit = s.chars().next().map_or(false, |c| c.is_ascii_digit());
        if !starts_with_digit {
            return s.parse().map(GroupInterval::Calendar);
        }

        match Decimal::from_str(s) {
            Ok(width) if !width.is_zero() => Ok(GroupInterval::Numeric(width)),
            _ => Err(GroupError::UnsupportedInterval(s.to_string())),
        }
    }
}

impl fmt::Display for GroupInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupInterval::Numeric(width) => write!(f, "{}", width),
            GroupInterval::Calendar(part) => f.write_str(part.as_str()),
        }
    }
}

// ============================================================================
// CALENDAR PART
// ============================================================================

/// Calendar components available for date grouping.
///
/// These are components, not period boundaries: March 2020 and March 2021
/// share the `Month` key 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalendarPart {
    Year,
    Quarter,
    Month,
    Day,
    DayOfWeek,
    Hour,
    Minute,
    Second,
}

impl CalendarPart {
    pub const ALL: [CalendarPart; 8] = [
        CalendarPart::Year,
        CalendarPart::Quarter,
        CalendarPart::Month,
        CalendarPart::Day,
        CalendarPart::DayOfWeek,
        CalendarPart::Hour,
        CalendarPart::Minute,
        CalendarPart::Second,
    ];

    /// The request token for this part.
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarPart::Year => "year",
            CalendarPart::Quarter => "quarter",
            CalendarPart::Month => "month",
            CalendarPart::Day => "day",
            CalendarPart::DayOfWeek => "dayOfWeek",
            CalendarPart::Hour => "hour",
            CalendarPart::Minute => "minute",
            CalendarPart::Second => "second",
        }
    }

    /// Extracts the component. Quarter is 1-based, day of week is 0 for Sunday.
    pub fn extract(&self, date: &NaiveDateTime) -> i64 {
        match self {
            CalendarPart::Year => i64::from(date.year()),
            CalendarPart::Quarter => i64::from((date.month() + 2) / 3),
            CalendarPart::Month => i64::from(date.month()),
            CalendarPart::Day => i64::from(date.day()),
            CalendarPart::DayOfWeek => i64::from(date.weekday().num_days_from_sunday()),
            CalendarPart::Hour => i64::from(date.hour()),
            CalendarPart::Minute => i64::from(date.minute()),
            CalendarPart::Second => i64::from(date.second()),
        }
    }
}

impl FromStr for CalendarPart {
    type Err = GroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CalendarPart::ALL
            .into_iter()
            .find(|part| part.as_str() == s)
            .ok_or_else(|| GroupError::UnsupportedInterval(s.to_string()))
    }
}
