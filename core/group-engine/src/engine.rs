//! FILENAME: core/group-engine/src/engine.rs
//! Group Engine - Turns a record sequence into a nested group tree.
//!
//! Algorithm:
//! 1. Compile every descriptor into a level plan (accessor + parsed interval)
//!    before any record is read, so bad requests fail up front
//! 2. Partition the records on the first level's key, keeping buckets in
//!    first-seen order and records in input order within each bucket
//! 3. For every level but the last, regroup each bucket's records on the
//!    remaining levels
//! 4. On the last level, keep the records or, when the level is collapsed,
//!    only their count

use std::borrow::Borrow;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::accessor::{Accessor, AccessorCache, Record};
use crate::definition::{GroupDescriptor, GroupInterval};
use crate::error::{GroupError, GroupResult};
use crate::value::GroupValue;
use crate::view::{Group, GroupItems};

// ============================================================================
// LEVEL PLAN
// ============================================================================

/// A descriptor compiled against the record type.
struct LevelPlan<'d, T> {
    selector: &'d str,
    accessor: Accessor<T>,
    interval: Option<GroupInterval>,
    expands_items: bool,
}

impl<T: Record> LevelPlan<'_, T> {
    fn key_of(&self, record: &T) -> GroupResult<GroupValue> {
        let value = self.accessor.get(record);
        match &self.interval {
            None => Ok(value),
            Some(interval) => bucket_value(interval, &value),
        }
    }
}

/// Applies an interval rule to a raw field value.
///
/// Numeric widths give the lower bound of the value's range (`v - v % w`,
/// in decimal arithmetic). Calendar tokens give the integer component.
pub fn bucket_value(interval: &GroupInterval, value: &GroupValue) -> GroupResult<GroupValue> {
    match interval {
        GroupInterval::Numeric(width) => {
            let number = value.to_decimal()?;
            Ok(GroupValue::Decimal(number - number % *width))
        }
        GroupInterval::Calendar(part) => {
            let date = value.to_date_time()?;
            Ok(GroupValue::Integer(part.extract(&date)))
        }
    }
}

// ============================================================================
// PARTITION
// ============================================================================

/// One bucket while a level is being partitioned.
struct Bucket<R> {
    key: GroupValue,
    records: Vec<R>,
    count: usize,
}

/// Splits records into buckets by key, in first-seen order.
/// With `count_only`, records are counted and dropped.
fn partition_level<T, R, I>(
    records: I,
    level: &LevelPlan<'_, T>,
    count_only: bool,
) -> GroupResult<Vec<Bucket<R>>>
where
    T: Record,
    R: Borrow<T>,
    I: IntoIterator<Item = R>,
{
    let mut index: FxHashMap<GroupValue, usize> = FxHashMap::default();
    let mut buckets: Vec<Bucket<R>> = Vec::new();
    let mut seen = 0usize;

    for record in records {
        let key = level.key_of(record.borrow())?;
        seen += 1;

        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push(Bucket {
                    key,
                    records: Vec::new(),
                    count: 0,
                });
                buckets.len() - 1
            }
        };

        let bucket = &mut buckets[slot];
        bucket.count += 1;
        if !count_only {
            bucket.records.push(record);
        }
    }

    log::trace!(
        "grouped {} records by '{}' into {} buckets",
        seen,
        level.selector,
        buckets.len()
    );

    Ok(buckets)
}

/// Shapes innermost-level buckets into leaf groups.
fn into_leaf_groups<R>(buckets: Vec<Bucket<R>>, count_only: bool) -> Vec<Group<R>> {
    buckets
        .into_iter()
        .map(|bucket| {
            if count_only {
                Group {
                    key: bucket.key,
                    items: None,
                    count: Some(bucket.count),
                }
            } else {
                Group {
                    key: bucket.key,
                    items: Some(GroupItems::Records(bucket.records)),
                    count: None,
                }
            }
        })
        .collect()
}

/// Groups records on `levels[0]`, recursing into the remaining levels.
fn group_levels<T, R, I>(records: I, levels: &[LevelPlan<'_, T>]) -> GroupResult<Vec<Group<R>>>
where
    T: Record,
    R: Borrow<T>,
    I: IntoIterator<Item = R>,
{
    let (level, nested) = levels.split_first().ok_or_else(no_descriptors)?;
    let is_most_nested = nested.is_empty();
    let count_only = is_most_nested && !level.expands_items;

    let buckets = partition_level(records, level, count_only)?;

    if is_most_nested {
        return Ok(into_leaf_groups(buckets, count_only));
    }

    buckets
        .into_iter()
        .map(|bucket| -> GroupResult<Group<R>> {
            Ok(Group {
                key: bucket.key,
                items: Some(GroupItems::Groups(group_levels(bucket.records, nested)?)),
                count: None,
            })
        })
        .collect()
}

fn no_descriptors() -> GroupError {
    GroupError::InvalidArgument("at least one group descriptor is required".to_string())
}

// ============================================================================
// GROUP ENGINE
// ============================================================================

/// Grouping engine bound to one record type.
///
/// The engine owns the accessor cache for `T`, so keeping one engine around
/// amortizes path compilation across calls. It is `Sync` and may be shared
/// between threads.
pub struct GroupEngine<T> {
    accessors: AccessorCache<T>,
}

impl<T> Default for GroupEngine<T> {
    fn default() -> Self {
        GroupEngine {
            accessors: AccessorCache::default(),
        }
    }
}

impl<T> fmt::Debug for GroupEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupEngine")
            .field("accessors", &self.accessors)
            .finish()
    }
}

impl<T: Record> GroupEngine<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accessors(&self) -> &AccessorCache<T> {
        &self.accessors
    }

    /// Groups `records` by `descriptors`, outermost level first.
    ///
    /// Records may be owned or borrowed; the output holds whatever the
    /// iterator yields.
    pub fn group<R, I>(&self, records: I, descriptors: &[GroupDescriptor]) -> GroupResult<Vec<Group<R>>>
    where
        R: Borrow<T>,
        I: IntoIterator<Item = R>,
    {
        let levels = self.plan(descriptors)?;
        group_levels(records, &levels)
    }

    /// Partitions records on a single descriptor without recursing.
    ///
    /// Produces leaf-shaped groups; `is_innermost` together with the
    /// descriptor's expansion flag decides between records and counts.
    pub fn partition<R, I>(
        &self,
        records: I,
        descriptor: &GroupDescriptor,
        is_innermost: bool,
    ) -> GroupResult<Vec<Group<R>>>
    where
        R: Borrow<T>,
        I: IntoIterator<Item = R>,
    {
        let level = self.plan_level(descriptor)?;
        let count_only = is_innermost && !level.expands_items;
        let buckets = partition_level(records, &level, count_only)?;
        Ok(into_leaf_groups(buckets, count_only))
    }

    /// Computes the group key of one record for one descriptor.
    pub fn key_of(&self, record: &T, descriptor: &GroupDescriptor) -> GroupResult<GroupValue> {
        self.plan_level(descriptor)?.key_of(record)
    }

    fn plan<'d>(&self, descriptors: &'d [GroupDescriptor]) -> GroupResult<Vec<LevelPlan<'d, T>>> {
        if descriptors.is_empty() {
            return Err(no_descriptors());
        }

        descriptors
            .iter()
            .map(|descriptor| self.plan_level(descriptor))
            .collect()
    }

    fn plan_level<'d>(&self, descriptor: &'d GroupDescriptor) -> GroupResult<LevelPlan<'d, T>> {
        if descriptor.selector.is_empty() {
            return Err(GroupError::InvalidArgument(
                "group descriptor selector must not be empty".to_string(),
            ));
        }

        Ok(LevelPlan {
            selector: &descriptor.selector,
            accessor: self.accessors.resolve(&descriptor.selector)?,
            interval: descriptor.interval()?,
            expands_items: descriptor.expands_items(),
        })
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Groups records with a throwaway engine.
/// Prefer a long-lived `GroupEngine` when the same paths are queried repeatedly.
pub fn group_records<T, R, I>(records: I, descriptors: &[GroupDescriptor]) -> GroupResult<Vec<Group<R>>>
where
    T: Record,
    R: Borrow<T>,
    I: IntoIterator<Item = R>,
{
    GroupEngine::<T>::new().group(records, descriptors)
}
