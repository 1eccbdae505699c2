//! FILENAME: core/group-engine/src/accessor.rs
//! Field Accessors - Late-bound field access with memoized compilation.
//!
//! A record type describes its members once, at the type level, through the
//! `Record` trait. Resolving a dotted path (e.g. "customer.address.city")
//! walks that description without touching any instance, so an unknown
//! member fails before the first record is read. The resulting `Accessor`
//! is a composed closure that is compiled once per path and then reused
//! from the `AccessorCache` for every record and every later call.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{GroupError, GroupResult};
use crate::value::GroupValue;

// ============================================================================
// RECORD
// ============================================================================

/// A record type whose members can be addressed by name.
///
/// Implementations are usually generated with [`impl_record!`](crate::impl_record).
pub trait Record: Sized + 'static {
    /// Builds an accessor for the given path segments, or `None` if any
    /// segment does not name a readable member.
    fn compile_accessor(path: &[&str]) -> Option<Accessor<Self>>;
}

// ============================================================================
// ACCESSOR
// ============================================================================

/// A compiled extraction function for one field path of `T`.
pub struct Accessor<T> {
    getter: Arc<dyn Fn(&T) -> GroupValue + Send + Sync>,
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        Accessor {
            getter: Arc::clone(&self.getter),
        }
    }
}

impl<T> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Accessor")
    }
}

impl<T: 'static> Accessor<T> {
    pub fn new<F>(getter: F) -> Self
    where
        F: Fn(&T) -> GroupValue + Send + Sync + 'static,
    {
        Accessor {
            getter: Arc::new(getter),
        }
    }

    /// Extracts the field value from a record.
    pub fn get(&self, record: &T) -> GroupValue {
        (self.getter)(record)
    }

    /// Lifts this accessor onto a parent type that embeds `T`.
    pub fn through<P, F>(self, project: F) -> Accessor<P>
    where
        P: 'static,
        F: Fn(&P) -> &T + Send + Sync + 'static,
    {
        Accessor::new(move |parent: &P| self.get(project(parent)))
    }

    /// Lifts this accessor onto a parent type with an optional `T`.
    /// A missing member yields `GroupValue::Empty`.
    pub fn through_option<P, F>(self, project: F) -> Accessor<P>
    where
        P: 'static,
        F: Fn(&P) -> Option<&T> + Send + Sync + 'static,
    {
        Accessor::new(move |parent: &P| match project(parent) {
            Some(inner) => self.get(inner),
            None => GroupValue::Empty,
        })
    }
}

// ============================================================================
// ACCESSOR CACHE
// ============================================================================

/// Append-only cache of compiled accessors for one record type, keyed by path.
///
/// Reads take a shared lock. A miss compiles outside the lock and then
/// inserts under the write lock; if another thread inserted the same path
/// first, its accessor is kept and returned.
pub struct AccessorCache<T> {
    accessors: RwLock<FxHashMap<String, Accessor<T>>>,
}

impl<T> Default for AccessorCache<T> {
    fn default() -> Self {
        AccessorCache {
            accessors: RwLock::new(FxHashMap::default()),
        }
    }
}

impl<T> fmt::Debug for AccessorCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accessors = self.accessors.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("AccessorCache")
            .field("paths", &accessors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: Record> AccessorCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the accessor for `path`, compiling and caching it on first use.
    pub fn resolve(&self, path: &str) -> GroupResult<Accessor<T>> {
        {
            let accessors = self.accessors.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(accessor) = accessors.get(path) {
                return Ok(accessor.clone());
            }
        }

        let accessor = compile::<T>(path)?;
        log::debug!(
            "compiled accessor {}::{}",
            std::any::type_name::<T>(),
            path
        );

        let mut accessors = self.accessors.write().unwrap_or_else(PoisonError::into_inner);
        Ok(accessors
            .entry(path.to_string())
            .or_insert(accessor)
            .clone())
    }

    /// Number of distinct paths compiled so far.
    pub fn len(&self) -> usize {
        self.accessors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, path: &str) -> bool {
        self.accessors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }
}

fn compile<T: Record>(path: &str) -> GroupResult<Accessor<T>> {
    let segments: SmallVec<[&str; 4]> = path.split('.').collect();

    if segments.iter().any(|s| s.is_empty()) {
        return Err(resolution_error::<T>(path));
    }

    T::compile_accessor(&segments).ok_or_else(|| resolution_error::<T>(path))
}

fn resolution_error<T>(path: &str) -> GroupError {
    GroupError::FieldResolution {
        type_name: std::any::type_name::<T>(),
        path: path.to_string(),
    }
}

// ============================================================================
// RECORD MACRO
// ============================================================================

/// Implements [`Record`] for a struct by listing its groupable members.
///
/// - `field`: a scalar member; its type must implement `ToGroupValue`.
/// - `field => Type`: an embedded record; remaining path segments resolve on `Type`.
/// - `field => ?Type`: an `Option<Type>` member; a `None` yields an empty value.
///
/// ```
/// use group_engine::impl_record;
///
/// struct Address { city: String }
/// struct Customer { name: String, address: Option<Address> }
///
/// impl_record!(Address { city });
/// impl_record!(Customer { name, address => ?Address });
/// ```
#[macro_export]
macro_rules! impl_record {
    ($ty:ty { $($members:tt)* }) => {
        impl $crate::Record for $ty {
            fn compile_accessor(path: &[&str]) -> ::core::option::Option<$crate::Accessor<Self>> {
                let (head, rest) = path.split_first()?;
                $crate::__record_members!(head, rest; $($members)*);
                ::core::option::Option::None
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_members {
    ($head:ident, $rest:ident;) => {};
    ($head:ident, $rest:ident; $field:ident => ? $nested:ty $(, $($tail:tt)*)?) => {
        if *$head == stringify!($field) {
            return <$nested as $crate::Record>::compile_accessor($rest)
                .map(|inner| inner.through_option(|record: &Self| record.$field.as_ref()));
        }
        $crate::__record_members!($head, $rest; $($($tail)*)?);
    };
    ($head:ident, $rest:ident; $field:ident => $nested:ty $(, $($tail:tt)*)?) => {
        if *$head == stringify!($field) {
            return <$nested as $crate::Record>::compile_accessor($rest)
                .map(|inner| inner.through(|record: &Self| &record.$field));
        }
        $crate::__record_members!($head, $rest; $($($tail)*)?);
    };
    ($head:ident, $rest:ident; $field:ident $(, $($tail:tt)*)?) => {
        if *$head == stringify!($field) && $rest.is_empty() {
            return ::core::option::Option::Some($crate::Accessor::new(|record: &Self| {
                $crate::ToGroupValue::to_group_value(&record.$field)
            }));
        }
        $crate::__record_members!($head, $rest; $($($tail)*)?);
    };
}
