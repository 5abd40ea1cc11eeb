//! Member tables for host structs.
//!
//! A type implementing [`Reflect`] lists its members once:
//!
//! ```
//! use stencil_eval::{AccessError, FromValue, MemberTable, Reflect, ToValue};
//!
//! struct User {
//!     first_name: String,
//!     password: String,
//! }
//!
//! impl Reflect for User {
//!     fn describe(table: &mut MemberTable<Self>) {
//!         table
//!             .member("firstName", |u| u.first_name.to_value())
//!             .setter(|u, v| {
//!                 u.first_name = String::from_value(v)?;
//!                 Ok(())
//!             });
//!         table.member("password", |u| u.password.to_value()).ignore();
//!     }
//! }
//! ```
//!
//! The registry turns the table into an accessor the first time a value of
//! the type is touched, mapping host names through the naming policy
//! (`firstName` → `first_name` by default) unless a member is renamed.

use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::{AccessError, Accessor, AccessorRegistry, Capabilities};
use crate::value::Value;

pub type Getter<T> = fn(&T) -> Value;
pub type Setter<T> = fn(&mut T, Value) -> Result<(), AccessError>;

/// Host structs exposed to scripts member by member.
pub trait Reflect: Any + Send + Sync + Sized {
    fn describe(table: &mut MemberTable<Self>);
}

/// One member of a reflected type.
pub struct MemberDef<T> {
    host_name: &'static str,
    rename: Option<&'static str>,
    ignored: bool,
    getter: Getter<T>,
    setter: Option<Setter<T>>,
}

impl<T> MemberDef<T> {
    /// Make the member writable.
    pub fn setter(&mut self, setter: Setter<T>) -> &mut Self {
        self.setter = Some(setter);
        self
    }

    /// Expose the member under exactly this name, bypassing the naming policy.
    pub fn rename(&mut self, name: &'static str) -> &mut Self {
        self.rename = Some(name);
        self
    }

    /// Hide the member from scripts.
    pub fn ignore(&mut self) -> &mut Self {
        self.ignored = true;
        self
    }
}

pub struct MemberTable<T> {
    members: Vec<MemberDef<T>>,
}

impl<T> MemberTable<T> {
    fn new() -> Self {
        MemberTable {
            members: Vec::new(),
        }
    }

    /// Declare a readable member named `host_name`.
    pub fn member(&mut self, host_name: &'static str, getter: Getter<T>) -> &mut MemberDef<T> {
        self.members.push(MemberDef {
            host_name,
            rename: None,
            ignored: false,
            getter,
            setter: None,
        });
        let last = self.members.len() - 1;
        &mut self.members[last]
    }
}

struct ResolvedMember<T> {
    name: Arc<str>,
    getter: Getter<T>,
    setter: Option<Setter<T>>,
}

/// Accessor built from a [`Reflect`] member table.
pub struct ReflectAccessor<T> {
    members: Vec<ResolvedMember<T>>,
    by_name: FxHashMap<Arc<str>, usize>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Reflect> ReflectAccessor<T> {
    pub fn build(registry: &AccessorRegistry) -> Arc<dyn Accessor> {
        Arc::new(Self::new(registry))
    }

    fn new(registry: &AccessorRegistry) -> Self {
        let policy = registry.naming_policy_for(TypeId::of::<T>());
        let mut table = MemberTable::new();
        T::describe(&mut table);

        let mut members = Vec::with_capacity(table.members.len());
        let mut by_name = FxHashMap::default();
        for def in table.members.into_iter().filter(|def| !def.ignored) {
            let name: Arc<str> = match def.rename {
                Some(rename) => Arc::from(rename),
                None => Arc::from(policy(def.host_name)),
            };
            if by_name.contains_key(&name) {
                tracing::warn!(
                    member = %name,
                    host_name = def.host_name,
                    "reflected member name collides with an earlier member; keeping the first"
                );
                continue;
            }
            by_name.insert(Arc::clone(&name), members.len());
            members.push(ResolvedMember {
                name,
                getter: def.getter,
                setter: def.setter,
            });
        }

        ReflectAccessor {
            members,
            by_name,
            _marker: PhantomData,
        }
    }

    fn find(&self, name: &str) -> Option<&ResolvedMember<T>> {
        self.by_name.get(name).map(|&i| &self.members[i])
    }
}

impl<T: Reflect> Accessor for ReflectAccessor<T> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::MEMBERS
    }

    fn member_names(&self, _target: &dyn Any) -> Vec<Arc<str>> {
        self.members
            .iter()
            .map(|member| Arc::clone(&member.name))
            .collect()
    }

    fn has_member(&self, _target: &dyn Any, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    fn get_member(&self, target: &dyn Any, name: &str) -> Option<Value> {
        let value = target.downcast_ref::<T>()?;
        self.find(name).map(|member| (member.getter)(value))
    }

    fn set_member(&self, target: &mut dyn Any, name: &str, value: Value) -> Result<(), AccessError> {
        let type_name = std::any::type_name::<T>();
        let member = self.find(name).ok_or_else(|| AccessError::UnknownMember {
            type_name,
            name: name.to_owned(),
        })?;
        let setter = member.setter.ok_or_else(|| AccessError::ReadOnly {
            name: name.to_owned(),
        })?;
        let host = target
            .downcast_mut::<T>()
            .ok_or(AccessError::HostIntegration {
                type_name,
                operation: "member assignment",
            })?;
        setter(host, value)
    }
}
