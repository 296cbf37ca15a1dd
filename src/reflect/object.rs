//! Member descriptors for plain objects.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use super::{downcast_mut, AnyValue, Reflect, TypeInfo, TypeRef};
use crate::binder::BindError;
use crate::bridge::{FieldConverter, TokenReader};
use crate::reflect::PrimitiveConverter;

/// Who may use a member accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    NonPublic,
}

pub(crate) type Access =
    Box<dyn for<'a> Fn(&'a mut dyn Any) -> Result<&'a mut dyn Any, BindError>>;

pub(crate) type ConvertFn = Box<
    dyn Fn(&mut TokenReader, TypeRef, Option<&dyn Any>, &PrimitiveConverter) -> Result<Option<AnyValue>, BindError>,
>;

fn access<A>(f: A) -> Access
where
    A: for<'a> Fn(&'a mut dyn Any) -> Result<&'a mut dyn Any, BindError> + 'static,
{
    Box::new(f)
}

fn convert_with<C: FieldConverter>() -> ConvertFn {
    Box::new(
        |reader: &mut TokenReader,
         hint: TypeRef,
         existing: Option<&dyn Any>,
         primitives: &PrimitiveConverter|
         -> Result<Option<AnyValue>, BindError> {
            let existing = existing.and_then(|value| value.downcast_ref::<C::Value>());
            let value = C::default().read_value(reader, hint, existing, primitives)?;
            Ok(value.map(|v| Box::new(v) as AnyValue))
        },
    )
}

/// One member of an object.
pub struct FieldInfo {
    name: &'static str,
    ty: TypeRef,
    pub(crate) access: Access,
    pub(crate) getter: Option<Visibility>,
    pub(crate) setter: Option<Visibility>,
    pub(crate) indexed: bool,
    pub(crate) converter: Option<ConvertFn>,
}

impl FieldInfo {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The member's declared type.
    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    pub fn getter(&self) -> Option<Visibility> {
        self.getter
    }

    pub fn setter(&self) -> Option<Visibility> {
        self.setter
    }

    /// The member takes parameters (an indexer); binding never touches it.
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn has_converter(&self) -> bool {
        self.converter.is_some()
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("getter", &self.getter)
            .field("setter", &self.setter)
            .field("indexed", &self.indexed)
            .field("converter", &self.converter.is_some())
            .finish()
    }
}

/// The members of an object, declared ones first, then those of its base.
#[derive(Debug, Default)]
pub struct ObjectInfo {
    fields: Vec<FieldInfo>,
}

impl ObjectInfo {
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

/// Registers the members of `O`.
///
/// ```
/// use dragon_bind::reflect::{ObjectBuilder, Reflect, TypeInfo};
///
/// #[derive(Default)]
/// struct Server {
///     host: String,
///     port: u16,
/// }
///
/// impl Reflect for Server {
///     fn type_info() -> TypeInfo {
///         ObjectBuilder::<Self>::new()
///             .field("host", |s| &mut s.host)
///             .field("port", |s| &mut s.port)
///             .build_default()
///     }
/// }
/// ```
pub struct ObjectBuilder<O> {
    fields: Vec<FieldInfo>,
    base_fields: Vec<FieldInfo>,
    _owner: PhantomData<fn(O)>,
}

impl<O: Any> Default for ObjectBuilder<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Any> ObjectBuilder<O> {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            base_fields: Vec::new(),
            _owner: PhantomData,
        }
    }

    fn push<F: Reflect>(mut self, name: &'static str, project: fn(&mut O) -> &mut F) -> Self {
        self.fields.push(FieldInfo {
            name,
            ty: TypeRef::of::<F>(),
            access: access(move |value| {
                let owner = downcast_mut::<O>(value)?;
                Ok(project(owner) as &mut dyn Any)
            }),
            getter: Some(Visibility::Public),
            setter: Some(Visibility::Public),
            indexed: false,
            converter: None,
        });
        self
    }

    /// A publicly readable and writable member.
    pub fn field<F: Reflect>(self, name: &'static str, project: fn(&mut O) -> &mut F) -> Self {
        self.push(name, project)
    }

    /// A member that can be read but not replaced. Its contents may still be
    /// bound in place (a list gains elements, an object gets its members set).
    pub fn read_only<F: Reflect>(self, name: &'static str, project: fn(&mut O) -> &mut F) -> Self {
        self.push(name, project).setter(None)
    }

    /// A member bound by the converter `C` instead of by recursive binding.
    pub fn converted<C>(self, name: &'static str, project: fn(&mut O) -> &mut C::Value) -> Self
    where
        C: FieldConverter,
    {
        let mut builder = self.push(name, project);
        if let Some(field) = builder.fields.last_mut() {
            field.converter = Some(convert_with::<C>());
        }
        builder
    }

    /// Makes the last member's getter and setter non-public.
    pub fn non_public(mut self) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.getter = field.getter.map(|_| Visibility::NonPublic);
            field.setter = field.setter.map(|_| Visibility::NonPublic);
        }
        self
    }

    /// Makes only the last member's setter non-public.
    pub fn non_public_setter(self) -> Self {
        self.setter(Some(Visibility::NonPublic))
    }

    /// Makes the last member write-only.
    pub fn write_only(mut self) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.getter = None;
        }
        self
    }

    /// Marks the last member as an indexer.
    pub fn indexed(mut self) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.indexed = true;
        }
        self
    }

    fn setter(mut self, setter: Option<Visibility>) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.setter = setter;
        }
        self
    }

    /// Inherits the members of `B`, reached through `project`. They are listed
    /// after the members declared on `O`, in the order `B` declares them.
    pub fn base<B: Reflect>(mut self, project: fn(&mut O) -> &mut B) -> Self {
        let Some(base) = B::type_info().object else {
            return self;
        };
        for field in base.fields {
            let inner = field.access;
            self.base_fields.push(FieldInfo {
                access: access(move |value| {
                    let owner = downcast_mut::<O>(value)?;
                    inner(project(owner) as &mut dyn Any)
                }),
                ..field
            });
        }
        self
    }

    fn finish(self) -> ObjectInfo {
        let mut fields = self.fields;
        fields.extend(self.base_fields);
        ObjectInfo { fields }
    }

    /// Describes an object that can only be bound into, never created.
    pub fn build(self) -> TypeInfo {
        TypeInfo::of::<O>().with_object(self.finish())
    }

    /// Describes an object created with `O::default()` when missing.
    pub fn build_default(self) -> TypeInfo
    where
        O: Default,
    {
        TypeInfo::of::<O>()
            .constructible::<O>()
            .with_object(self.finish())
    }
}
