//! FILENAME: tests/test_properties.rs
//! Property tests for partition shape and ordering.

use group_engine::{
    bucket_value, impl_record, Group, GroupDescriptor, GroupEngine, GroupInterval, GroupItems,
    GroupValue,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
struct Point {
    idx: usize,
    x: i32,
    y: i32,
    v: i64,
}

impl_record!(Point { idx, x, y, v });

fn points() -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec((0..5i32, 0..3i32, -60..60i64), 0..64).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(idx, (x, y, v))| Point { idx, x, y, v })
            .collect()
    })
}

fn descriptors() -> impl Strategy<Value = Vec<GroupDescriptor>> {
    let level = prop_oneof![
        Just(GroupDescriptor::new("x")),
        Just(GroupDescriptor::new("y")),
        Just(GroupDescriptor::new("v").with_interval("7")),
        Just(GroupDescriptor::new("v").with_interval("2.5")),
    ];
    (prop::collection::vec(level, 1..4), any::<Option<bool>>()).prop_map(|(mut levels, expanded)| {
        if let (Some(last), Some(expanded)) = (levels.last_mut(), expanded) {
            *last = last.clone().with_expanded(expanded);
        }
        levels
    })
}

/// Checks leaf/non-leaf shape and returns the record indices in tree order.
fn check_shape(groups: &[Group<&Point>], depth: usize, levels: &[GroupDescriptor], out: &mut Vec<usize>) -> usize {
    let innermost = depth + 1 == levels.len();
    let mut total = 0;

    for group in groups {
        if innermost {
            let collapsed = levels[depth].is_expanded == Some(false);
            match (&group.items, group.count) {
                (None, Some(count)) if collapsed => {
                    assert!(count > 0);
                    total += count;
                }
                (Some(GroupItems::Records(records)), None) if !collapsed => {
                    assert!(!records.is_empty());
                    out.extend(records.iter().map(|p| p.idx));
                    total += records.len();
                }
                other => panic!("bad leaf shape at depth {}: {:?}", depth, other),
            }
        } else {
            assert!(group.count.is_none());
            match &group.items {
                Some(GroupItems::Groups(children)) => {
                    total += check_shape(children, depth + 1, levels, out);
                }
                other => panic!("bad inner shape at depth {}: {:?}", depth, other),
            }
        }
    }

    total
}

proptest! {
    #[test]
    fn partition_is_complete_and_well_shaped(rows in points(), levels in descriptors()) {
        let engine = GroupEngine::<Point>::new();
        let groups = engine.group(&rows, &levels).unwrap();

        let mut order = Vec::new();
        let total = check_shape(&groups, 0, &levels, &mut order);
        prop_assert_eq!(total, rows.len());
    }

    #[test]
    fn buckets_follow_first_seen_order(rows in points()) {
        let engine = GroupEngine::<Point>::new();
        let groups = engine.group(&rows, &[GroupDescriptor::new("x")]).unwrap();

        let mut expected: Vec<GroupValue> = Vec::new();
        for row in &rows {
            let key = GroupValue::Integer(i64::from(row.x));
            if !expected.contains(&key) {
                expected.push(key);
            }
        }
        let actual: Vec<GroupValue> = groups.iter().map(|g| g.key.clone()).collect();
        prop_assert_eq!(actual, expected);

        for group in &groups {
            let indices: Vec<usize> = group.records().unwrap().iter().map(|p| p.idx).collect();
            prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn numeric_bucket_is_range_lower_bound(v in -10_000i64..10_000, width in 1i64..50) {
        let interval = GroupInterval::Numeric(Decimal::from(width));
        let key = bucket_value(&interval, &GroupValue::Integer(v)).unwrap();
        let again = bucket_value(&interval, &GroupValue::Integer(v)).unwrap();
        prop_assert_eq!(&key, &again);

        let expected = Decimal::from(v - v % width);
        prop_assert_eq!(key, GroupValue::Decimal(expected));
    }
}
