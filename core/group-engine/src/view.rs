//! FILENAME: core/group-engine/src/view.rs
//! Group View - The nested output tree handed to the serialization layer.
//!
//! Shapes:
//! - Non-leaf group: `items` holds child groups, `count` is unset
//! - Expanded leaf: `items` holds the raw records, `count` is unset
//! - Counted leaf: `items` is null, `count` holds the record count
//!
//! `count` is omitted from the serialized form when unset, so consumers can
//! tell a counted leaf from an expanded one.

use serde::Serialize;

use crate::value::GroupValue;

/// The contents of a group: raw records at an expanded leaf, nested groups otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GroupItems<R> {
    Records(Vec<R>),
    Groups(Vec<Group<R>>),
}

impl<R> GroupItems<R> {
    pub fn len(&self) -> usize {
        match self {
            GroupItems::Records(records) => records.len(),
            GroupItems::Groups(groups) => groups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One bucket of the output tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group<R> {
    pub key: GroupValue,
    pub items: Option<GroupItems<R>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<R> Group<R> {
    pub fn new(key: GroupValue) -> Self {
        Group {
            key,
            items: None,
            count: None,
        }
    }

    /// Whether this group sits on the innermost level.
    pub fn is_leaf(&self) -> bool {
        !matches!(self.items, Some(GroupItems::Groups(_)))
    }

    /// The raw records of an expanded leaf.
    pub fn records(&self) -> Option<&[R]> {
        match &self.items {
            Some(GroupItems::Records(records)) => Some(records),
            _ => None,
        }
    }

    /// The child groups of a non-leaf group.
    pub fn groups(&self) -> Option<&[Group<R>]> {
        match &self.items {
            Some(GroupItems::Groups(groups)) => Some(groups),
            _ => None,
        }
    }

    /// Number of source records under this group, at any depth.
    pub fn total_count(&self) -> usize {
        let nested = match &self.items {
            Some(GroupItems::Records(records)) => records.len(),
            Some(GroupItems::Groups(groups)) => groups.iter().map(Group::total_count).sum(),
            None => 0,
        };
        nested + self.count.unwrap_or(0)
    }
}
