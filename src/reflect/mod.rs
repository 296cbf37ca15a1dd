//! Runtime type descriptors that drive binding.
//!
//! Every bindable type implements [`Reflect`] and describes itself with a
//! [`TypeInfo`]: whether it converts from a string, how to construct it, which
//! collection capabilities it exposes and, for plain objects, its members.
//! Values travel through the binder type-erased as [`AnyValue`]; the function
//! pointers in the descriptor know how to put them back together.

mod capability;
mod enums;
mod object;
mod primitive;
mod std_impls;

use std::any::{Any, TypeId};
use std::fmt;

pub use capability::{
    Capability, Collection, DictionaryKey, Dictionary, Enumerable, KeyKind, MapCapability,
    ReadOnlyCollection, ReadOnlyDictionary, ReadOnlyList, SeqCapability, Surrogate,
};
pub(crate) use object::ConvertFn;
pub use object::{FieldInfo, ObjectBuilder, ObjectInfo, Visibility};
pub use primitive::{FromConfigStr, PrimitiveConverter};

use crate::binder::BindError;

/// A boxed value of some reflected type.
pub type AnyValue = Box<dyn Any>;

/// Types the binder can populate.
pub trait Reflect: 'static {
    /// Describes the type. Called at most once per type per bind call.
    fn type_info() -> TypeInfo;
}

/// A lazy, copyable handle to a reflected type.
///
/// Descriptors refer to element and member types through `TypeRef`s so that
/// recursive type graphs can be described without building them eagerly.
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
    info: fn() -> TypeInfo,
}

impl TypeRef {
    pub fn of<T: Reflect>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            info: T::type_info,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Builds the descriptor.
    pub fn info(&self) -> TypeInfo {
        (self.info)()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Converts a string into a boxed scalar.
pub type ParseFn = fn(&str, &PrimitiveConverter) -> Result<AnyValue, String>;

/// How an `Option<T>`-like wrapper exposes its inner value.
#[derive(Clone, Copy)]
pub struct NullableInfo {
    pub inner: TypeRef,
    /// Whether the inner type converts from a string.
    pub inner_is_scalar: bool,
    pub is_none: fn(&dyn Any) -> bool,
    pub inner_mut: fn(&mut dyn Any) -> Option<&mut dyn Any>,
    pub wrap: fn(AnyValue) -> Result<AnyValue, BindError>,
}

impl fmt::Debug for NullableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NullableInfo")
            .field("inner", &self.inner)
            .field("inner_is_scalar", &self.inner_is_scalar)
            .finish_non_exhaustive()
    }
}

/// How a fixed-length array is extended.
#[derive(Clone, Copy)]
pub struct ArrayInfo {
    pub element: TypeRef,
    pub rank: usize,
    pub empty: fn() -> AnyValue,
    /// Allocates a new array holding the existing elements followed by
    /// `tail`; `None` slots get the element's default value.
    pub extend: fn(&dyn Any, Vec<Option<AnyValue>>) -> Result<AnyValue, BindError>,
}

impl fmt::Debug for ArrayInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayInfo")
            .field("element", &self.element)
            .field("rank", &self.rank)
            .finish_non_exhaustive()
    }
}

/// Descriptor of a reflected type.
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    pub(crate) is_abstract: bool,
    pub(crate) construct: Option<fn() -> AnyValue>,
    pub(crate) assign: fn(&mut dyn Any, AnyValue) -> Result<(), BindError>,
    pub(crate) parse: Option<ParseFn>,
    pub(crate) nullable: Option<NullableInfo>,
    pub(crate) array: Option<ArrayInfo>,
    pub(crate) capabilities: Vec<Capability>,
    pub(crate) object: Option<ObjectInfo>,
}

impl TypeInfo {
    /// A concrete type with no construction, conversion or members yet.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            is_abstract: false,
            construct: None,
            assign: |slot, value| {
                *downcast_mut::<T>(slot)? = take::<T>(value)?;
                Ok(())
            },
            parse: None,
            nullable: None,
            array: None,
            capabilities: Vec::new(),
            object: None,
        }
    }

    /// A type that converts from a string.
    pub fn scalar<T: FromConfigStr + Any>() -> Self {
        Self::of::<T>().with_parse(|value, primitives| {
            primitives
                .convert::<T>(value)
                .map(|v| Box::new(v) as AnyValue)
        })
    }

    /// Uses `T::default()` as the no-argument constructor.
    pub fn constructible<T: Default + Any>(mut self) -> Self {
        debug_assert_eq!(self.id, TypeId::of::<T>());
        self.construct = Some(|| Box::new(T::default()) as AnyValue);
        self
    }

    /// Marks the type as an interface: it can be bound into but never created.
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self.construct = None;
        self
    }

    pub fn with_parse(mut self, parse: ParseFn) -> Self {
        self.parse = Some(parse);
        self
    }

    pub fn with_nullable(mut self, nullable: NullableInfo) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn with_array(mut self, array: ArrayInfo) -> Self {
        self.array = Some(array);
        self
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn with_object(mut self, object: ObjectInfo) -> Self {
        self.object = Some(object);
        self
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Converts from a string through the primitive converter.
    pub fn is_scalar(&self) -> bool {
        self.parse.is_some()
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn object(&self) -> Option<&ObjectInfo> {
        self.object.as_ref()
    }

    /// True when the value is an empty nullable wrapper.
    pub fn is_null(&self, value: &dyn Any) -> bool {
        self.nullable.is_some_and(|nullable| (nullable.is_none)(value))
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("abstract", &self.is_abstract)
            .field("constructible", &self.construct.is_some())
            .field("scalar", &self.parse.is_some())
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

pub fn downcast_ref<T: Any>(value: &dyn Any) -> Result<&T, BindError> {
    value.downcast_ref::<T>().ok_or_else(BindError::type_mismatch::<T>)
}

pub fn downcast_mut<T: Any>(value: &mut dyn Any) -> Result<&mut T, BindError> {
    value.downcast_mut::<T>().ok_or_else(BindError::type_mismatch::<T>)
}

/// Unboxes an erased value.
pub fn take<T: Any>(value: AnyValue) -> Result<T, BindError> {
    value
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| BindError::type_mismatch::<T>())
}
