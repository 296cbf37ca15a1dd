//! Picking a binding strategy from a type descriptor.

use crate::reflect::{ArrayInfo, Capability, MapCapability, NullableInfo, SeqCapability, TypeInfo};

/// How values of a type are bound.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    /// Converted from a leaf's string value.
    Scalar,
    /// An optional scalar; an empty leaf leaves it untouched.
    NullableScalar(NullableInfo),
    /// An optional non-scalar, bound through its inner value.
    Nullable(NullableInfo),
    /// Rebuilt with the section's children appended.
    Array(ArrayInfo),
    /// Filled by appending one element per child.
    ListLike(SeqCapability),
    /// Like [`ListLike`](Shape::ListLike), appending ignores duplicates.
    SetLike(SeqCapability),
    /// Filled with one entry per child, keyed by the child's key.
    DictionaryLike(MapCapability),
    /// Bound member by member.
    PlainObject,
}

impl Shape {
    /// The concrete type to fill when an abstract type has to be created.
    pub fn surrogate(&self) -> Option<crate::reflect::Surrogate> {
        match self {
            Shape::ListLike(seq) | Shape::SetLike(seq) => seq.surrogate,
            Shape::DictionaryLike(map) => map.surrogate,
            _ => None,
        }
    }
}

/// Classifies `info`.
///
/// Scalars and nullable wrappers are recognised first. After that the
/// dictionary capabilities win over arrays, arrays over sequences, and among
/// sequences the strongest surface the type exposes (read-only list,
/// read-only collection, collection, enumerable) is the one reported. A
/// mutating operation found on any other surface of the same kind is carried
/// over, so a `Vec<T>` reported as a read-only list can still be appended to.
pub fn classify(info: &TypeInfo) -> Shape {
    if info.is_scalar() {
        return Shape::Scalar;
    }
    if let Some(nullable) = info.nullable {
        return if nullable.inner_is_scalar {
            Shape::NullableScalar(nullable)
        } else {
            Shape::Nullable(nullable)
        };
    }
    if let Some(map) = dictionary(info.capabilities()) {
        return Shape::DictionaryLike(map);
    }
    if let Some(array) = info.array {
        return Shape::Array(array);
    }
    if let Some(seq) = sequence(info.capabilities()) {
        return if seq.unique {
            Shape::SetLike(seq)
        } else {
            Shape::ListLike(seq)
        };
    }
    Shape::PlainObject
}

fn dictionary(capabilities: &[Capability]) -> Option<MapCapability> {
    let maps = || {
        capabilities.iter().filter_map(|capability| match capability {
            Capability::Dictionary(map) | Capability::ReadOnlyDictionary(map) => Some(*map),
            _ => None,
        })
    };

    let mut strongest = capabilities.iter().find_map(|capability| match capability {
        Capability::Dictionary(map) => Some(*map),
        _ => None,
    });
    if strongest.is_none() {
        strongest = maps().next();
    }

    let mut map = strongest?;
    if map.insert.is_none() {
        map.insert = maps().find_map(|other| other.insert);
    }
    if map.surrogate.is_none() {
        map.surrogate = maps().find_map(|other| other.surrogate);
    }
    Some(map)
}

fn rank(capability: &Capability) -> Option<(u8, SeqCapability)> {
    match capability {
        Capability::ReadOnlyList(seq) => Some((0, *seq)),
        Capability::ReadOnlyCollection(seq) => Some((1, *seq)),
        Capability::Collection(seq) => Some((2, *seq)),
        Capability::Enumerable(seq) => Some((3, *seq)),
        Capability::Dictionary(_) | Capability::ReadOnlyDictionary(_) => None,
    }
}

fn sequence(capabilities: &[Capability]) -> Option<SeqCapability> {
    let mut ranked: Vec<(u8, SeqCapability)> = capabilities.iter().filter_map(rank).collect();
    ranked.sort_by_key(|(rank, _)| *rank);

    let (_, mut seq) = *ranked.first()?;
    if seq.add.is_none() {
        seq.add = ranked.iter().find_map(|(_, other)| other.add);
    }
    if seq.surrogate.is_none() {
        seq.surrogate = ranked.iter().find_map(|(_, other)| other.surrogate);
    }
    seq.unique |= ranked.iter().any(|(_, other)| other.unique);
    Some(seq)
}
