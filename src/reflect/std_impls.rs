//! [`Reflect`] for standard library types.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::Hash;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use super::{
    downcast_mut, downcast_ref, take, AnyValue, ArrayInfo, Capability, Collection, Dictionary,
    DictionaryKey, Enumerable, MapCapability, NullableInfo, ReadOnlyCollection,
    ReadOnlyDictionary, ReadOnlyList, Reflect, SeqCapability, Surrogate, TypeInfo, TypeRef,
};
use crate::binder::BindError;
use crate::config::ConfigSection;

macro_rules! default_scalars {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::scalar::<Self>().constructible::<Self>()
                }
            }
        )*
    };
}

default_scalars!(
    String, PathBuf, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
    f32, f64, Duration,
);

macro_rules! address_scalars {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::scalar::<Self>()
                }
            }
        )*
    };
}

address_scalars!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);

/// Handing out the raw subtree.
impl Reflect for ConfigSection {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>().constructible::<Self>()
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>()
            .constructible::<Self>()
            .with_nullable(NullableInfo {
                inner: TypeRef::of::<T>(),
                inner_is_scalar: T::type_info().is_scalar(),
                is_none: |value| value.downcast_ref::<Option<T>>().map_or(true, Option::is_none),
                inner_mut: |value| {
                    value
                        .downcast_mut::<Option<T>>()
                        .and_then(Option::as_mut)
                        .map(|inner| inner as &mut dyn Any)
                },
                wrap: |value| Ok(Box::new(Some(take::<T>(value)?)) as AnyValue),
            })
    }
}

/// Arrays are never grown in place: binding allocates a new slice.
impl<T: Reflect + Default + Clone> Reflect for Box<[T]> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>()
            .constructible::<Self>()
            .with_array(ArrayInfo {
                element: TypeRef::of::<T>(),
                rank: 1,
                empty: || Box::new(Box::<[T]>::default()) as AnyValue,
                extend: |existing, tail| {
                    let existing = downcast_ref::<Box<[T]>>(existing)?;
                    let mut items = Vec::with_capacity(existing.len() + tail.len());
                    items.extend_from_slice(existing);
                    for slot in tail {
                        let item = match slot {
                            Some(value) => take::<T>(value)?,
                            None => T::default(),
                        };
                        items.push(item);
                    }
                    Ok(Box::new(items.into_boxed_slice()) as AnyValue)
                },
            })
    }
}

fn add_to<C, T>() -> fn(&mut dyn Any, AnyValue) -> Result<(), BindError>
where
    C: Collection<T> + ?Sized + 'static,
    T: Reflect,
{
    |target, item| {
        let item = take::<T>(item)?;
        downcast_mut::<Box<C>>(target)
            .map(|boxed| boxed.add(item))
    }
}

fn push_to<C, T>() -> fn(&mut dyn Any, AnyValue) -> Result<(), BindError>
where
    C: Collection<T> + Any,
    T: Reflect,
{
    |target, item| {
        let item = take::<T>(item)?;
        Collection::add(downcast_mut::<C>(target)?, item);
        Ok(())
    }
}

fn sequence<C, T>(positional: bool, unique: bool) -> TypeInfo
where
    C: Collection<T> + Default + Any,
    T: Reflect,
{
    let mut seq = SeqCapability::new(TypeRef::of::<T>());
    if unique {
        seq = seq.unique();
    }

    let mut info = TypeInfo::of::<C>().constructible::<C>();
    if positional {
        info = info.with_capability(Capability::ReadOnlyList(seq));
    }
    info.with_capability(Capability::ReadOnlyCollection(seq))
        .with_capability(Capability::Collection(seq.with_add(push_to::<C, T>())))
        .with_capability(Capability::Enumerable(seq))
}

impl<T: Reflect> Reflect for Vec<T> {
    fn type_info() -> TypeInfo {
        sequence::<Self, T>(true, false)
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn type_info() -> TypeInfo {
        sequence::<Self, T>(true, false)
    }
}

impl<T: Reflect> Reflect for LinkedList<T> {
    fn type_info() -> TypeInfo {
        sequence::<Self, T>(false, false)
    }
}

impl<T: Reflect + Eq + Hash> Reflect for HashSet<T> {
    fn type_info() -> TypeInfo {
        sequence::<Self, T>(false, true)
    }
}

impl<T: Reflect + Ord> Reflect for BTreeSet<T> {
    fn type_info() -> TypeInfo {
        sequence::<Self, T>(false, true)
    }
}

fn insert_into<M, K, V>() -> fn(&mut dyn Any, AnyValue, AnyValue) -> Result<(), BindError>
where
    M: Dictionary<K, V> + Any,
    K: DictionaryKey,
    V: Reflect,
{
    |target, key, value| {
        let key = take::<K>(key)?;
        let value = take::<V>(value)?;
        Dictionary::insert(downcast_mut::<M>(target)?, key, value);
        Ok(())
    }
}

fn dictionary<M, K, V>() -> TypeInfo
where
    M: Dictionary<K, V> + Default + Any,
    K: DictionaryKey,
    V: Reflect,
{
    let map = MapCapability::new::<K>(TypeRef::of::<V>());
    TypeInfo::of::<M>()
        .constructible::<M>()
        .with_capability(Capability::Dictionary(map.with_insert(insert_into::<M, K, V>())))
        .with_capability(Capability::ReadOnlyDictionary(map))
}

impl<K: DictionaryKey + Eq + Hash, V: Reflect> Reflect for HashMap<K, V> {
    fn type_info() -> TypeInfo {
        dictionary::<Self, K, V>()
    }
}

impl<K: DictionaryKey + Ord, V: Reflect> Reflect for BTreeMap<K, V> {
    fn type_info() -> TypeInfo {
        dictionary::<Self, K, V>()
    }
}

// Abstract collection surfaces. None of them can be constructed; when one has
// to be created the binder fills the surrogate (`Vec<T>` or `HashMap<K, V>`)
// and adopts it.

fn list_surrogate<T: Reflect>(adopt: fn(AnyValue) -> Result<AnyValue, BindError>) -> SeqCapability {
    SeqCapability::new(TypeRef::of::<T>()).with_surrogate(Surrogate {
        ty: TypeRef::of::<Vec<T>>(),
        adopt,
    })
}

impl<T: Reflect> Reflect for Box<dyn Enumerable<T>> {
    fn type_info() -> TypeInfo {
        let seq = list_surrogate::<T>(|list| {
            let list: Box<dyn Enumerable<T>> = Box::new(take::<Vec<T>>(list)?);
            Ok(Box::new(list) as AnyValue)
        });
        TypeInfo::of::<Self>()
            .abstract_type()
            .with_capability(Capability::Enumerable(seq))
    }
}

impl<T: Reflect> Reflect for Box<dyn ReadOnlyCollection<T>> {
    fn type_info() -> TypeInfo {
        let seq = list_surrogate::<T>(|list| {
            let list: Box<dyn ReadOnlyCollection<T>> = Box::new(take::<Vec<T>>(list)?);
            Ok(Box::new(list) as AnyValue)
        });
        TypeInfo::of::<Self>()
            .abstract_type()
            .with_capability(Capability::ReadOnlyCollection(seq))
            .with_capability(Capability::Enumerable(seq))
    }
}

impl<T: Reflect> Reflect for Box<dyn ReadOnlyList<T>> {
    fn type_info() -> TypeInfo {
        let seq = list_surrogate::<T>(|list| {
            let list: Box<dyn ReadOnlyList<T>> = Box::new(take::<Vec<T>>(list)?);
            Ok(Box::new(list) as AnyValue)
        });
        TypeInfo::of::<Self>()
            .abstract_type()
            .with_capability(Capability::ReadOnlyList(seq))
            .with_capability(Capability::ReadOnlyCollection(seq))
            .with_capability(Capability::Enumerable(seq))
    }
}

impl<T: Reflect> Reflect for Box<dyn Collection<T>> {
    fn type_info() -> TypeInfo {
        let seq = list_surrogate::<T>(|list| {
            let list: Box<dyn Collection<T>> = Box::new(take::<Vec<T>>(list)?);
            Ok(Box::new(list) as AnyValue)
        });
        TypeInfo::of::<Self>()
            .abstract_type()
            .with_capability(Capability::Collection(seq.with_add(add_to::<dyn Collection<T>, T>())))
            .with_capability(Capability::ReadOnlyCollection(seq))
            .with_capability(Capability::Enumerable(seq))
    }
}

fn map_surrogate<K, V>(adopt: fn(AnyValue) -> Result<AnyValue, BindError>) -> MapCapability
where
    K: DictionaryKey + Eq + Hash,
    V: Reflect,
{
    MapCapability::new::<K>(TypeRef::of::<V>()).with_surrogate(Surrogate {
        ty: TypeRef::of::<HashMap<K, V>>(),
        adopt,
    })
}

impl<K: DictionaryKey + Eq + Hash, V: Reflect> Reflect for Box<dyn ReadOnlyDictionary<K, V>> {
    fn type_info() -> TypeInfo {
        let map = map_surrogate::<K, V>(|map| {
            let map: Box<dyn ReadOnlyDictionary<K, V>> = Box::new(take::<HashMap<K, V>>(map)?);
            Ok(Box::new(map) as AnyValue)
        });
        TypeInfo::of::<Self>()
            .abstract_type()
            .with_capability(Capability::ReadOnlyDictionary(map))
    }
}

impl<K: DictionaryKey + Eq + Hash, V: Reflect> Reflect for Box<dyn Dictionary<K, V>> {
    fn type_info() -> TypeInfo {
        let map = map_surrogate::<K, V>(|map| {
            let map: Box<dyn Dictionary<K, V>> = Box::new(take::<HashMap<K, V>>(map)?);
            Ok(Box::new(map) as AnyValue)
        });
        let insert: fn(&mut dyn Any, AnyValue, AnyValue) -> Result<(), BindError> =
            |target, key, value| {
                let key = take::<K>(key)?;
                let value = take::<V>(value)?;
                downcast_mut::<Box<dyn Dictionary<K, V>>>(target)?.insert(key, value);
                Ok(())
            };
        TypeInfo::of::<Self>()
            .abstract_type()
            .with_capability(Capability::Dictionary(map.with_insert(insert)))
            .with_capability(Capability::ReadOnlyDictionary(map))
    }
}
