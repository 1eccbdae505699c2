//! FILENAME: core/group-engine/src/lib.rs
//! Group-by engine for the data grid endpoint.
//!
//! Groups an in-memory sequence of records into nested buckets according to
//! a list of group descriptors (field path + optional interval), producing
//! the tree the grid's "group by" feature renders.
//!
//! Layers:
//! - `definition`: Serializable request types (what to group by)
//! - `accessor`: Cached late-bound field access (HOW we read fields)
//! - `value`: Dynamic field values and group keys
//! - `view`: Nested output tree (WHAT we return)
//! - `engine`: Partitioning and nesting (HOW we group)

pub mod accessor;
pub mod definition;
pub mod engine;
pub mod error;
pub mod value;
pub mod view;

pub use accessor::{Accessor, AccessorCache, Record};
pub use definition::{CalendarPart, GroupDescriptor, GroupInterval};
pub use engine::{bucket_value, group_records, GroupEngine};
pub use error::{GroupError, GroupResult};
pub use value::{GroupValue, OrderedFloat, ToGroupValue};
pub use view::{Group, GroupItems};
