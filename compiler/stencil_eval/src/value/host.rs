//! Host values: Rust data handed to templates by reference.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::registry::{Accessor, AccessorRegistry};

/// Builds the accessor for a host type on first use.
pub type AccessorBuilder = fn(&AccessorRegistry) -> Arc<dyn Accessor>;

pub(crate) type HostCell = Box<dyn Any + Send + Sync>;

/// A type-erased, shared host value.
///
/// The value is read and written only through the accessor the registry
/// resolves for its `TypeId`.
#[derive(Clone)]
pub struct HostValue {
    cell: Arc<RwLock<HostCell>>,
    type_id: TypeId,
    type_name: &'static str,
    build: AccessorBuilder,
}

impl HostValue {
    pub fn new<T: Any + Send + Sync>(value: T, build: AccessorBuilder) -> Self {
        HostValue {
            cell: Arc::new(RwLock::new(Box::new(value))),
            type_id: TypeId::of::<T>(),
            type_name: short_type_name(std::any::type_name::<T>()),
            build,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn builder(&self) -> AccessorBuilder {
        self.build
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, HostCell> {
        self.cell.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, HostCell> {
        self.cell.write()
    }

    /// Borrow the wrapped value as `T`, if that is its type.
    pub fn with_ref<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.cell.read();
        guard.downcast_ref::<T>().map(f)
    }

    /// Mutably borrow the wrapped value as `T`, if that is its type.
    pub fn with_mut<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.cell.write();
        guard.downcast_mut::<T>().map(f)
    }

    pub fn ptr_eq(&self, other: &HostValue) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<host {}>", self.type_name)
    }
}

/// `my_app::model::User` → `User`. Generic paths are kept whole.
fn short_type_name(full: &'static str) -> &'static str {
    if full.contains('<') {
        return full;
    }
    full.rsplit("::").next().unwrap_or(full)
}
