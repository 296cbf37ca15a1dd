//! Collection capabilities.
//!
//! The traits here are the abstract collection surfaces a field can be
//! declared with (`Box<dyn ReadOnlyList<T>>`, `Box<dyn Dictionary<K, V>>`, ...).
//! The structs describe, inside a [`TypeInfo`](super::TypeInfo), which of those
//! surfaces a type exposes and how the binder reaches them.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::fmt;
use std::hash::Hash;

use super::{AnyValue, TypeRef};
use crate::binder::BindError;

/// Something that can be iterated.
pub trait Enumerable<T> {
    fn items(&self) -> Box<dyn Iterator<Item = &T> + '_>;
}

/// A collection with a known length.
pub trait ReadOnlyCollection<T>: Enumerable<T> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A collection with positional access.
pub trait ReadOnlyList<T>: ReadOnlyCollection<T> {
    fn get(&self, index: usize) -> Option<&T>;
}

/// A collection that can be appended to.
pub trait Collection<T>: ReadOnlyCollection<T> {
    fn add(&mut self, item: T);
}

pub trait ReadOnlyDictionary<K, V> {
    fn get(&self, key: &K) -> Option<&V>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A dictionary whose entries can be set; setting a present key overwrites it.
pub trait Dictionary<K, V>: ReadOnlyDictionary<K, V> {
    fn insert(&mut self, key: K, value: V);
}

macro_rules! impl_sequence {
    ($ty:ident < T $(: $bound:ident $(+ $more:ident)*)? >, $add:ident) => {
        impl<T $(: $bound $(+ $more)*)?> Enumerable<T> for $ty<T> {
            fn items(&self) -> Box<dyn Iterator<Item = &T> + '_> {
                Box::new(self.iter())
            }
        }

        impl<T $(: $bound $(+ $more)*)?> ReadOnlyCollection<T> for $ty<T> {
            fn len(&self) -> usize {
                $ty::len(self)
            }
        }

        impl<T $(: $bound $(+ $more)*)?> Collection<T> for $ty<T> {
            fn add(&mut self, item: T) {
                self.$add(item);
            }
        }
    };
}

impl_sequence!(Vec<T>, push);
impl_sequence!(VecDeque<T>, push_back);
impl_sequence!(LinkedList<T>, push_back);
impl_sequence!(HashSet<T: Eq + Hash>, insert);
impl_sequence!(BTreeSet<T: Ord>, insert);

impl<T> ReadOnlyList<T> for Vec<T> {
    fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }
}

impl<T> ReadOnlyList<T> for VecDeque<T> {
    fn get(&self, index: usize) -> Option<&T> {
        VecDeque::get(self, index)
    }
}

impl<K: Eq + Hash, V> ReadOnlyDictionary<K, V> for HashMap<K, V> {
    fn get(&self, key: &K) -> Option<&V> {
        HashMap::get(self, key)
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

impl<K: Eq + Hash, V> Dictionary<K, V> for HashMap<K, V> {
    fn insert(&mut self, key: K, value: V) {
        HashMap::insert(self, key, value);
    }
}

impl<K: Ord, V> ReadOnlyDictionary<K, V> for BTreeMap<K, V> {
    fn get(&self, key: &K) -> Option<&V> {
        BTreeMap::get(self, key)
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
}

impl<K: Ord, V> Dictionary<K, V> for BTreeMap<K, V> {
    fn insert(&mut self, key: K, value: V) {
        BTreeMap::insert(self, key, value);
    }
}

/// What kind of key a dictionary is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Keys are the section keys verbatim.
    String,
    /// Keys are parsed as enum variant names.
    Enum,
    /// Dictionaries with this key type are left unbound.
    Unsupported,
}

/// Types usable as dictionary keys during binding.
pub trait DictionaryKey: Sized + 'static {
    const KIND: KeyKind;

    /// Parses a section key; `None` when the key names no value of the type.
    fn from_key(key: &str) -> Option<Self>;
}

impl DictionaryKey for String {
    const KIND: KeyKind = KeyKind::String;

    fn from_key(key: &str) -> Option<Self> {
        Some(key.to_string())
    }
}

macro_rules! unsupported_keys {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DictionaryKey for $ty {
                const KIND: KeyKind = KeyKind::Unsupported;

                fn from_key(_key: &str) -> Option<Self> {
                    None
                }
            }
        )*
    };
}

unsupported_keys!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// A concrete type standing in for an abstract one when an instance has to
/// be created.
#[derive(Clone, Copy)]
pub struct Surrogate {
    pub ty: TypeRef,
    /// Turns the bound surrogate into a value of the abstract type.
    pub adopt: fn(AnyValue) -> Result<AnyValue, BindError>,
}

impl fmt::Debug for Surrogate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surrogate").field("ty", &self.ty).finish_non_exhaustive()
    }
}

/// A sequence surface.
#[derive(Clone, Copy)]
pub struct SeqCapability {
    pub element: TypeRef,
    /// Appends an element; absent on read-only surfaces.
    pub add: Option<fn(&mut dyn Any, AnyValue) -> Result<(), BindError>>,
    /// Appending ignores duplicates.
    pub unique: bool,
    pub surrogate: Option<Surrogate>,
}

impl SeqCapability {
    pub fn new(element: TypeRef) -> Self {
        Self {
            element,
            add: None,
            unique: false,
            surrogate: None,
        }
    }

    pub fn with_add(mut self, add: fn(&mut dyn Any, AnyValue) -> Result<(), BindError>) -> Self {
        self.add = Some(add);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_surrogate(mut self, surrogate: Surrogate) -> Self {
        self.surrogate = Some(surrogate);
        self
    }
}

impl fmt::Debug for SeqCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeqCapability")
            .field("element", &self.element)
            .field("mutable", &self.add.is_some())
            .field("unique", &self.unique)
            .field("surrogate", &self.surrogate)
            .finish()
    }
}

/// A dictionary surface.
#[derive(Clone, Copy)]
pub struct MapCapability {
    pub key_kind: KeyKind,
    pub key_type: &'static str,
    pub value: TypeRef,
    pub parse_key: fn(&str) -> Option<AnyValue>,
    /// Sets an entry; absent on read-only surfaces.
    pub insert: Option<fn(&mut dyn Any, AnyValue, AnyValue) -> Result<(), BindError>>,
    pub surrogate: Option<Surrogate>,
}

impl MapCapability {
    pub fn new<K: DictionaryKey>(value: TypeRef) -> Self {
        Self {
            key_kind: K::KIND,
            key_type: std::any::type_name::<K>(),
            value,
            parse_key: |key| K::from_key(key).map(|k| Box::new(k) as AnyValue),
            insert: None,
            surrogate: None,
        }
    }

    pub fn with_insert(
        mut self,
        insert: fn(&mut dyn Any, AnyValue, AnyValue) -> Result<(), BindError>,
    ) -> Self {
        self.insert = Some(insert);
        self
    }

    pub fn with_surrogate(mut self, surrogate: Surrogate) -> Self {
        self.surrogate = Some(surrogate);
        self
    }
}

impl fmt::Debug for MapCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapCapability")
            .field("key_kind", &self.key_kind)
            .field("key_type", &self.key_type)
            .field("value", &self.value)
            .field("mutable", &self.insert.is_some())
            .field("surrogate", &self.surrogate)
            .finish()
    }
}

/// One collection surface a type exposes.
#[derive(Debug, Clone, Copy)]
pub enum Capability {
    Dictionary(MapCapability),
    ReadOnlyDictionary(MapCapability),
    ReadOnlyList(SeqCapability),
    ReadOnlyCollection(SeqCapability),
    Collection(SeqCapability),
    Enumerable(SeqCapability),
}
