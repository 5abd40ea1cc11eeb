//! Accessors for host collections: maps, growable sequences and
//! fixed-length arrays.

use std::any::Any;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;

use super::{AccessError, Accessor, AccessorRegistry, Capabilities, HostType};
use crate::value::{FromValue, ToValue, Value};

/// Conversion between member names and a host map's key type.
pub trait MemberKey: Sized {
    /// `None` when `name` does not denote a key of this type.
    fn from_member(name: &str) -> Option<Self>;
    fn to_member(&self) -> Arc<str>;
}

impl MemberKey for String {
    fn from_member(name: &str) -> Option<Self> {
        Some(name.to_owned())
    }

    fn to_member(&self) -> Arc<str> {
        Arc::from(self.as_str())
    }
}

impl MemberKey for Arc<str> {
    fn from_member(name: &str) -> Option<Self> {
        Some(Arc::from(name))
    }

    fn to_member(&self) -> Arc<str> {
        Arc::clone(self)
    }
}

impl MemberKey for char {
    fn from_member(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let c = chars.next()?;
        chars.next().is_none().then_some(c)
    }

    fn to_member(&self) -> Arc<str> {
        Arc::from(self.to_string())
    }
}

macro_rules! impl_numeric_member_key {
    ($($ty:ty),*) => {$(
        impl MemberKey for $ty {
            fn from_member(name: &str) -> Option<Self> {
                name.parse().ok()
            }

            fn to_member(&self) -> Arc<str> {
                Arc::from(self.to_string())
            }
        }
    )*};
}

impl_numeric_member_key!(i32, i64, u32, u64, usize);

/// Map-shaped host containers.
pub trait HostMap: Any + Send + Sync {
    type Key: MemberKey;
    type Item: ToValue + FromValue;

    fn lookup(&self, key: &Self::Key) -> Option<&Self::Item>;
    fn store(&mut self, key: Self::Key, item: Self::Item);
    fn key_list(&self) -> Vec<Arc<str>>;
}

impl<K, V, S> HostMap for HashMap<K, V, S>
where
    K: MemberKey + Eq + Hash + Send + Sync + 'static,
    V: ToValue + FromValue + Send + Sync + 'static,
    S: BuildHasher + Send + Sync + 'static,
{
    type Key = K;
    type Item = V;

    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn store(&mut self, key: K, item: V) {
        self.insert(key, item);
    }

    fn key_list(&self) -> Vec<Arc<str>> {
        self.keys().map(MemberKey::to_member).collect()
    }
}

impl<K, V> HostMap for BTreeMap<K, V>
where
    K: MemberKey + Ord + Send + Sync + 'static,
    V: ToValue + FromValue + Send + Sync + 'static,
{
    type Key = K;
    type Item = V;

    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn store(&mut self, key: K, item: V) {
        self.insert(key, item);
    }

    fn key_list(&self) -> Vec<Arc<str>> {
        self.keys().map(MemberKey::to_member).collect()
    }
}

impl<K, V, S> HostMap for IndexMap<K, V, S>
where
    K: MemberKey + Eq + Hash + Send + Sync + 'static,
    V: ToValue + FromValue + Send + Sync + 'static,
    S: BuildHasher + Send + Sync + 'static,
{
    type Key = K;
    type Item = V;

    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn store(&mut self, key: K, item: V) {
        self.insert(key, item);
    }

    fn key_list(&self) -> Vec<Arc<str>> {
        self.keys().map(MemberKey::to_member).collect()
    }
}

/// Growable host sequences.
pub trait HostSeq: Any + Send + Sync {
    type Item: ToValue + FromValue;

    fn seq_len(&self) -> usize;
    fn seq_get(&self, index: usize) -> Option<&Self::Item>;
    fn seq_get_mut(&mut self, index: usize) -> Option<&mut Self::Item>;
    fn seq_push(&mut self, item: Self::Item);
}

impl<T: ToValue + FromValue + Send + Sync + 'static> HostSeq for Vec<T> {
    type Item = T;

    fn seq_len(&self) -> usize {
        self.len()
    }

    fn seq_get(&self, index: usize) -> Option<&T> {
        self.get(index)
    }

    fn seq_get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.get_mut(index)
    }

    fn seq_push(&mut self, item: T) {
        self.push(item);
    }
}

impl<T: ToValue + FromValue + Send + Sync + 'static> HostSeq for VecDeque<T> {
    type Item = T;

    fn seq_len(&self) -> usize {
        self.len()
    }

    fn seq_get(&self, index: usize) -> Option<&T> {
        self.get(index)
    }

    fn seq_get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.get_mut(index)
    }

    fn seq_push(&mut self, item: T) {
        self.push_back(item);
    }
}

/// Host arrays whose length cannot change.
pub trait FixedSeq: Any + Send + Sync {
    type Item: ToValue + FromValue;

    fn items(&self) -> &[Self::Item];
    fn items_mut(&mut self) -> &mut [Self::Item];
}

impl<T: ToValue + FromValue + Send + Sync + 'static, const N: usize> FixedSeq for [T; N] {
    type Item = T;

    fn items(&self) -> &[T] {
        self
    }

    fn items_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T: ToValue + FromValue + Send + Sync + 'static> FixedSeq for Box<[T]> {
    type Item = T;

    fn items(&self) -> &[T] {
        self
    }

    fn items_mut(&mut self) -> &mut [T] {
        self
    }
}

struct MapAccessor<M>(PhantomData<fn() -> M>);

impl<M: HostMap> Accessor for MapAccessor<M> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::MEMBERS
    }

    fn member_names(&self, target: &dyn Any) -> Vec<Arc<str>> {
        target
            .downcast_ref::<M>()
            .map(HostMap::key_list)
            .unwrap_or_default()
    }

    fn has_member(&self, target: &dyn Any, name: &str) -> bool {
        let Some(map) = target.downcast_ref::<M>() else {
            return false;
        };
        M::Key::from_member(name).is_some_and(|key| map.lookup(&key).is_some())
    }

    fn get_member(&self, target: &dyn Any, name: &str) -> Option<Value> {
        let map = target.downcast_ref::<M>()?;
        let key = M::Key::from_member(name)?;
        map.lookup(&key).map(ToValue::to_value)
    }

    fn set_member(&self, target: &mut dyn Any, name: &str, value: Value) -> Result<(), AccessError> {
        let type_name = std::any::type_name::<M>();
        let map = target
            .downcast_mut::<M>()
            .ok_or(AccessError::HostIntegration {
                type_name,
                operation: "member assignment",
            })?;
        let key = M::Key::from_member(name).ok_or_else(|| AccessError::UnknownMember {
            type_name,
            name: name.to_owned(),
        })?;
        map.store(key, M::Item::from_value(value)?);
        Ok(())
    }
}

struct SeqAccessor<S>(PhantomData<fn() -> S>);

impl<S: HostSeq> Accessor for SeqAccessor<S> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::INDEXED
    }

    fn length(&self, target: &dyn Any) -> usize {
        target.downcast_ref::<S>().map_or(0, HostSeq::seq_len)
    }

    fn get_index(&self, target: &dyn Any, index: usize) -> Option<Value> {
        target
            .downcast_ref::<S>()?
            .seq_get(index)
            .map(ToValue::to_value)
    }

    fn set_index(&self, target: &mut dyn Any, index: usize, value: Value) -> Result<(), AccessError> {
        let seq = target
            .downcast_mut::<S>()
            .ok_or(AccessError::HostIntegration {
                type_name: std::any::type_name::<S>(),
                operation: "index assignment",
            })?;
        let item = S::Item::from_value(value)?;
        if let Some(slot) = seq.seq_get_mut(index) {
            *slot = item;
            return Ok(());
        }
        while seq.seq_len() < index {
            seq.seq_push(S::Item::from_value(Value::Null)?);
        }
        seq.seq_push(item);
        Ok(())
    }
}

struct FixedAccessor<F>(PhantomData<fn() -> F>);

impl<F: FixedSeq> Accessor for FixedAccessor<F> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::INDEXED
    }

    fn length(&self, target: &dyn Any) -> usize {
        target.downcast_ref::<F>().map_or(0, |fixed| fixed.items().len())
    }

    fn get_index(&self, target: &dyn Any, index: usize) -> Option<Value> {
        target
            .downcast_ref::<F>()?
            .items()
            .get(index)
            .map(ToValue::to_value)
    }

    fn set_index(&self, target: &mut dyn Any, index: usize, value: Value) -> Result<(), AccessError> {
        let fixed = target
            .downcast_mut::<F>()
            .ok_or(AccessError::HostIntegration {
                type_name: std::any::type_name::<F>(),
                operation: "index assignment",
            })?;
        let items = fixed.items_mut();
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or(AccessError::FixedLength { index, len })?;
        *slot = F::Item::from_value(value)?;
        Ok(())
    }
}

fn map_accessor<M: HostMap>(_registry: &AccessorRegistry) -> Arc<dyn Accessor> {
    Arc::new(MapAccessor::<M>(PhantomData))
}

fn seq_accessor<S: HostSeq>(_registry: &AccessorRegistry) -> Arc<dyn Accessor> {
    Arc::new(SeqAccessor::<S>(PhantomData))
}

fn fixed_accessor<F: FixedSeq>(_registry: &AccessorRegistry) -> Arc<dyn Accessor> {
    Arc::new(FixedAccessor::<F>(PhantomData))
}

impl<K, V, S> HostType for HashMap<K, V, S>
where
    HashMap<K, V, S>: HostMap,
{
    fn accessor(registry: &AccessorRegistry) -> Arc<dyn Accessor> {
        map_accessor::<Self>(registry)
    }
}

impl<K, V> HostType for BTreeMap<K, V>
where
    BTreeMap<K, V>: HostMap,
{
    fn accessor(registry: &AccessorRegistry) -> Arc<dyn Accessor> {
        map_accessor::<Self>(registry)
    }
}

impl<K, V, S> HostType for IndexMap<K, V, S>
where
    IndexMap<K, V, S>: HostMap,
{
    fn accessor(registry: &AccessorRegistry) -> Arc<dyn Accessor> {
        map_accessor::<Self>(registry)
    }
}

impl<T> HostType for Vec<T>
where
    Vec<T>: HostSeq,
{
    fn accessor(registry: &AccessorRegistry) -> Arc<dyn Accessor> {
        seq_accessor::<Self>(registry)
    }
}

impl<T> HostType for VecDeque<T>
where
    VecDeque<T>: HostSeq,
{
    fn accessor(registry: &AccessorRegistry) -> Arc<dyn Accessor> {
        seq_accessor::<Self>(registry)
    }
}

impl<T, const N: usize> HostType for [T; N]
where
    [T; N]: FixedSeq,
{
    fn accessor(registry: &AccessorRegistry) -> Arc<dyn Accessor> {
        fixed_accessor::<Self>(registry)
    }
}

impl<T> HostType for Box<[T]>
where
    Box<[T]>: FixedSeq,
{
    fn accessor(registry: &AccessorRegistry) -> Arc<dyn Accessor> {
        fixed_accessor::<Self>(registry)
    }
}
