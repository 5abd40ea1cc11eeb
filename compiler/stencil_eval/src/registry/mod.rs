//! Accessor registry: uniform member and index access over every value.
//!
//! Script objects and arrays are handled directly. Host values carry the
//! `TypeId` of the wrapped Rust type; the registry resolves an [`Accessor`]
//! for that type once and caches it.
//!
//! Which strategy a host type uses is fixed by how it entered the script:
//! - [`Value::host`] for containers implementing [`HostType`]: maps
//!   (`HashMap`, `BTreeMap`, `IndexMap`), sequences (`Vec`, `VecDeque`) and
//!   fixed-length arrays (`[T; N]`, `Box<[T]>`)
//! - [`Value::reflect`] for structs implementing [`Reflect`]
//! - [`Value::opaque`] for values scripts may hold but not inspect
//!
//! Primitives have no members; accessing one is an error the interpreter
//! may downgrade to `null` under relaxed member access.

mod containers;
mod naming;
mod reflect;

use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock};

use bitflags::bitflags;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use stencil_diagnostic::ErrorCode;

use crate::value::{HostValue, Value};

pub use containers::{FixedSeq, HostMap, HostSeq, MemberKey};
pub use naming::{camel_case, identity, snake_case, NamingPolicy};
pub use reflect::{MemberDef, MemberTable, Reflect, ReflectAccessor};

bitflags! {
    /// Operations an accessor supports.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct Capabilities: u8 {
        /// has/get/set/enumerate by name
        const MEMBERS = 1 << 0;
        /// length and get/set by position
        const INDEXED = 1 << 1;
    }
}

/// How far past its current length one index write may grow a sequence.
///
/// The gap is filled with `null`s, so a larger jump is refused with
/// [`AccessError::GrowthLimit`] instead of allocating it.
pub const MAX_INDEX_GROWTH: usize = 1 << 16;

/// A failed member or index operation.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum AccessError {
    #[error("cannot read member `{name}` of {type_name}")]
    NoMembers {
        type_name: &'static str,
        name: String,
    },
    #[error("{type_name} has no member `{name}`")]
    UnknownMember {
        type_name: &'static str,
        name: String,
    },
    #[error("cannot index into {type_name}")]
    NotIndexable { type_name: &'static str },
    #[error("cannot index {type_name} with {index_type}")]
    InvalidIndex {
        type_name: &'static str,
        index_type: &'static str,
    },
    #[error("cannot write at negative index {index}")]
    NegativeIndex { index: i64 },
    #[error("index {index} is outside the fixed length {len}")]
    FixedLength { index: usize, len: usize },
    #[error("index {index} is too far past the end of a sequence of length {len}")]
    GrowthLimit { index: usize, len: usize },
    #[error("member `{name}` is read-only")]
    ReadOnly { name: String },
    #[error("expected {expected}, found {found}")]
    Conversion {
        expected: &'static str,
        found: &'static str,
    },
    #[error("host type `{type_name}` does not support {operation}")]
    HostIntegration {
        type_name: &'static str,
        operation: &'static str,
    },
}

impl AccessError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AccessError::NoMembers { .. } | AccessError::UnknownMember { .. } => ErrorCode::E6002,
            AccessError::NotIndexable { .. }
            | AccessError::InvalidIndex { .. }
            | AccessError::NegativeIndex { .. }
            | AccessError::FixedLength { .. }
            | AccessError::GrowthLimit { .. } => ErrorCode::E6003,
            AccessError::ReadOnly { .. } => ErrorCode::E6011,
            AccessError::Conversion { .. } => ErrorCode::E6013,
            AccessError::HostIntegration { .. } => ErrorCode::E6012,
        }
    }

    /// Lookup failures relaxed member access turns into `null`.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            AccessError::NoMembers { .. }
                | AccessError::UnknownMember { .. }
                | AccessError::NotIndexable { .. }
                | AccessError::InvalidIndex { .. }
        )
    }
}

/// Member and index operations for one host type.
///
/// `target` is always a value of the type the accessor was built for;
/// accessors downcast it and treat a mismatch as "absent".
pub trait Accessor: Send + Sync {
    fn capabilities(&self) -> Capabilities;

    fn member_names(&self, _target: &dyn Any) -> Vec<Arc<str>> {
        Vec::new()
    }

    fn has_member(&self, target: &dyn Any, name: &str) -> bool {
        self.get_member(target, name).is_some()
    }

    fn get_member(&self, _target: &dyn Any, _name: &str) -> Option<Value> {
        None
    }

    fn set_member(&self, _target: &mut dyn Any, name: &str, _value: Value) -> Result<(), AccessError> {
        Err(AccessError::ReadOnly {
            name: name.to_owned(),
        })
    }

    fn length(&self, _target: &dyn Any) -> usize {
        0
    }

    fn get_index(&self, _target: &dyn Any, _index: usize) -> Option<Value> {
        None
    }

    fn set_index(&self, _target: &mut dyn Any, index: usize, _value: Value) -> Result<(), AccessError> {
        Err(AccessError::FixedLength { index, len: 0 })
    }
}

/// Host containers that know which accessor serves them.
pub trait HostType: Any + Send + Sync + Sized {
    fn accessor(registry: &AccessorRegistry) -> Arc<dyn Accessor>;
}

/// Accessor with no capabilities, for [`Value::opaque`].
pub struct OpaqueAccessor;

impl OpaqueAccessor {
    pub fn build(_registry: &AccessorRegistry) -> Arc<dyn Accessor> {
        Arc::new(OpaqueAccessor)
    }
}

impl Accessor for OpaqueAccessor {
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }
}

/// Resolves and caches accessors per host type.
pub struct AccessorRegistry {
    cache: RwLock<FxHashMap<TypeId, Arc<dyn Accessor>>>,
    naming_policy: NamingPolicy,
    type_policies: RwLock<FxHashMap<TypeId, NamingPolicy>>,
}

impl Default for AccessorRegistry {
    fn default() -> Self {
        AccessorRegistry {
            cache: RwLock::new(FxHashMap::default()),
            naming_policy: snake_case,
            type_policies: RwLock::new(FxHashMap::default()),
        }
    }
}

impl AccessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used when render options name none.
    pub fn global() -> &'static AccessorRegistry {
        static GLOBAL: OnceLock<AccessorRegistry> = OnceLock::new();
        GLOBAL.get_or_init(AccessorRegistry::new)
    }

    /// Use `policy` for every reflected type without its own override.
    #[must_use]
    pub fn with_naming_policy(mut self, policy: NamingPolicy) -> Self {
        self.naming_policy = policy;
        self
    }

    /// Override the naming policy for one reflected type.
    ///
    /// Drops the type's cached accessor so the next access rebuilds it.
    pub fn set_type_policy<T: 'static>(&self, policy: NamingPolicy) {
        let type_id = TypeId::of::<T>();
        self.type_policies.write().insert(type_id, policy);
        self.cache.write().remove(&type_id);
    }

    pub fn naming_policy_for(&self, type_id: TypeId) -> NamingPolicy {
        self.type_policies
            .read()
            .get(&type_id)
            .copied()
            .unwrap_or(self.naming_policy)
    }

    /// The accessor for `host`'s type, built on first use.
    ///
    /// Two threads may build the same accessor concurrently; the first one
    /// stored wins and the other is dropped.
    pub fn resolve(&self, host: &HostValue) -> Arc<dyn Accessor> {
        if let Some(accessor) = self.cache.read().get(&host.type_id()) {
            return Arc::clone(accessor);
        }
        let built = (host.builder())(self);
        tracing::debug!(
            type_name = host.type_name(),
            capabilities = ?built.capabilities(),
            "built host accessor"
        );
        let mut cache = self.cache.write();
        Arc::clone(cache.entry(host.type_id()).or_insert(built))
    }

    fn host_capabilities(&self, host: &HostValue) -> (Arc<dyn Accessor>, Capabilities) {
        let accessor = self.resolve(host);
        let capabilities = accessor.capabilities();
        (accessor, capabilities)
    }

    /// Read `name` from `target`; `Ok(None)` when the member is absent.
    pub fn get_member(&self, target: &Value, name: &str) -> Result<Option<Value>, AccessError> {
        match target {
            Value::Object(object) => Ok(object.get(name)),
            Value::Array(array) => Ok(match name {
                "size" => Some(Value::from(array.len())),
                "first" => Some(array.get(0).unwrap_or_default()),
                "last" => Some(
                    array
                        .len()
                        .checked_sub(1)
                        .and_then(|last| array.get(last))
                        .unwrap_or_default(),
                ),
                _ => None,
            }),
            Value::String(text) if name == "size" => Ok(Some(Value::from(text.chars().count()))),
            Value::Range(range) if name == "size" => Ok(Some(Value::from(range.len()))),
            Value::Host(host) => {
                let (accessor, capabilities) = self.host_capabilities(host);
                let cell = host.read();
                if capabilities.contains(Capabilities::MEMBERS) {
                    Ok(accessor.get_member(&**cell, name))
                } else if capabilities.contains(Capabilities::INDEXED) {
                    Ok((name == "size").then(|| Value::from(accessor.length(&**cell))))
                } else {
                    Err(host_integration(host, "member access"))
                }
            }
            other => Err(AccessError::NoMembers {
                type_name: other.type_name(),
                name: name.to_owned(),
            }),
        }
    }

    pub fn has_member(&self, target: &Value, name: &str) -> bool {
        match target {
            Value::Object(object) => object.contains_key(name),
            Value::Host(host) => {
                let (accessor, capabilities) = self.host_capabilities(host);
                capabilities.contains(Capabilities::MEMBERS)
                    && accessor.has_member(&**host.read(), name)
            }
            _ => false,
        }
    }

    pub fn set_member(&self, target: &Value, name: &str, value: Value) -> Result<(), AccessError> {
        match target {
            Value::Object(object) => object.set(name, value),
            Value::Host(host) => {
                let (accessor, capabilities) = self.host_capabilities(host);
                if capabilities.contains(Capabilities::MEMBERS) {
                    accessor.set_member(&mut **host.write(), name, value)
                } else if capabilities.contains(Capabilities::INDEXED) && name == "size" {
                    Err(AccessError::ReadOnly {
                        name: name.to_owned(),
                    })
                } else {
                    Err(host_integration(host, "member assignment"))
                }
            }
            Value::Array(_) if name == "size" => Err(AccessError::ReadOnly {
                name: name.to_owned(),
            }),
            other => Err(AccessError::NoMembers {
                type_name: other.type_name(),
                name: name.to_owned(),
            }),
        }
    }

    /// Read `target[index]`. Out-of-range and negative positions read `null`.
    pub fn get_index(&self, target: &Value, index: &Value) -> Result<Value, AccessError> {
        match target {
            Value::Array(array) => Ok(position(target, index)?
                .and_then(|i| array.get(i))
                .unwrap_or_default()),
            Value::Range(range) => Ok(position(target, index)?
                .and_then(|i| range.get(i))
                .map_or(Value::Null, Value::Int)),
            Value::String(text) => Ok(position(target, index)?
                .and_then(|i| text.chars().nth(i))
                .map_or(Value::Null, |c| Value::from(c.to_string()))),
            Value::Object(object) => Ok(object.get(&key(target, index)?).unwrap_or_default()),
            Value::Host(host) => {
                let (accessor, capabilities) = self.host_capabilities(host);
                let cell = host.read();
                if capabilities.contains(Capabilities::INDEXED) && is_integer(index) {
                    Ok(position(target, index)?
                        .and_then(|i| accessor.get_index(&**cell, i))
                        .unwrap_or_default())
                } else if capabilities.contains(Capabilities::MEMBERS) {
                    Ok(accessor
                        .get_member(&**cell, &key(target, index)?)
                        .unwrap_or_default())
                } else if capabilities.contains(Capabilities::INDEXED) {
                    Err(invalid_index(target, index))
                } else {
                    Err(host_integration(host, "index access"))
                }
            }
            other => Err(AccessError::NotIndexable {
                type_name: other.type_name(),
            }),
        }
    }

    /// Write `target[index] = value`. Negative positions are rejected.
    pub fn set_index(&self, target: &Value, index: &Value, value: Value) -> Result<(), AccessError> {
        match target {
            Value::Array(array) => {
                let i = write_position(target, index)?;
                check_growth(i, array.len())?;
                array.set(i, value);
                Ok(())
            }
            Value::Object(object) => object.set(&key(target, index)?, value),
            Value::Host(host) => {
                let (accessor, capabilities) = self.host_capabilities(host);
                if capabilities.contains(Capabilities::INDEXED) && is_integer(index) {
                    let i = write_position(target, index)?;
                    let mut cell = host.write();
                    check_growth(i, accessor.length(&**cell))?;
                    accessor.set_index(&mut **cell, i, value)
                } else if capabilities.contains(Capabilities::MEMBERS) {
                    let name = key(target, index)?;
                    accessor.set_member(&mut **host.write(), &name, value)
                } else if capabilities.contains(Capabilities::INDEXED) {
                    Err(invalid_index(target, index))
                } else {
                    Err(host_integration(host, "index assignment"))
                }
            }
            other => Err(AccessError::NotIndexable {
                type_name: other.type_name(),
            }),
        }
    }

    /// Element or entry count, for values that have one.
    pub fn length(&self, target: &Value) -> Option<usize> {
        match target {
            Value::Array(array) => Some(array.len()),
            Value::Object(object) => Some(object.len()),
            Value::String(text) => Some(text.chars().count()),
            Value::Range(range) => Some(range.len()),
            Value::Host(host) => {
                let (accessor, capabilities) = self.host_capabilities(host);
                let cell = host.read();
                if capabilities.contains(Capabilities::INDEXED) {
                    Some(accessor.length(&**cell))
                } else if capabilities.contains(Capabilities::MEMBERS) {
                    Some(accessor.member_names(&**cell).len())
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Member names of objects and member-capable host values.
    pub fn member_names(&self, target: &Value) -> Option<Vec<Arc<str>>> {
        match target {
            Value::Object(object) => Some(object.keys()),
            Value::Host(host) => {
                let (accessor, capabilities) = self.host_capabilities(host);
                capabilities
                    .contains(Capabilities::MEMBERS)
                    .then(|| accessor.member_names(&**host.read()))
            }
            _ => None,
        }
    }

    /// Snapshot of a member-capable host value as `(name, value)` pairs.
    pub fn host_entries(&self, host: &HostValue) -> Option<Vec<(Arc<str>, Value)>> {
        let (accessor, capabilities) = self.host_capabilities(host);
        if !capabilities.contains(Capabilities::MEMBERS) {
            return None;
        }
        let cell = host.read();
        let entries = accessor
            .member_names(&**cell)
            .into_iter()
            .map(|name| {
                let value = accessor.get_member(&**cell, &name).unwrap_or_default();
                (name, value)
            })
            .collect();
        Some(entries)
    }

    /// Snapshot of an indexed host value's elements.
    pub fn host_items(&self, host: &HostValue) -> Option<Vec<Value>> {
        let (accessor, capabilities) = self.host_capabilities(host);
        if !capabilities.contains(Capabilities::INDEXED) {
            return None;
        }
        let cell = host.read();
        let len = accessor.length(&**cell);
        Some(
            (0..len)
                .map(|i| accessor.get_index(&**cell, i).unwrap_or_default())
                .collect(),
        )
    }
}

#[cold]
fn host_integration(host: &HostValue, operation: &'static str) -> AccessError {
    AccessError::HostIntegration {
        type_name: host.type_name(),
        operation,
    }
}

#[cold]
fn invalid_index(target: &Value, index: &Value) -> AccessError {
    AccessError::InvalidIndex {
        type_name: target.type_name(),
        index_type: index.type_name(),
    }
}

fn is_integer(index: &Value) -> bool {
    matches!(index, Value::Int(_) | Value::BigInt(_))
}

/// Read position; `None` for negative or unrepresentable indices.
fn position(target: &Value, index: &Value) -> Result<Option<usize>, AccessError> {
    match index {
        Value::Int(n) => Ok(usize::try_from(*n).ok()),
        Value::BigInt(n) => Ok(usize::try_from(*n).ok()),
        _ => Err(invalid_index(target, index)),
    }
}

fn write_position(target: &Value, index: &Value) -> Result<usize, AccessError> {
    match index {
        Value::Int(n) if *n < 0 => Err(AccessError::NegativeIndex { index: *n }),
        Value::Int(n) => usize::try_from(*n).map_err(|_| invalid_index(target, index)),
        _ => Err(invalid_index(target, index)),
    }
}

fn check_growth(index: usize, len: usize) -> Result<(), AccessError> {
    if index.saturating_sub(len) >= MAX_INDEX_GROWTH {
        return Err(AccessError::GrowthLimit { index, len });
    }
    Ok(())
}

/// Member name for `object[index]`.
fn key(target: &Value, index: &Value) -> Result<String, AccessError> {
    match index {
        Value::String(text) => Ok(text.to_string()),
        Value::Int(n) => Ok(n.to_string()),
        Value::BigInt(n) => Ok(n.to_string()),
        _ => Err(invalid_index(target, index)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]
mod tests;
