//! Per-member converters fed from a token stream.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use super::token::{Token, TokenReader};
use crate::binder::BindError;
use crate::reflect::{PrimitiveConverter, Reflect, TypeRef};

/// Reads a member's value from a token stream instead of letting the binder
/// recurse into its section.
///
/// `Default` is the converter's no-argument constructor: a fresh converter is
/// made for every member it is attached to.
pub trait FieldConverter: Default + 'static {
    type Value: Reflect;

    /// Reads the value at the cursor. `existing` is the member's current value;
    /// returning `Ok(None)` leaves it in place.
    fn read_value(
        &self,
        reader: &mut TokenReader,
        hint: TypeRef,
        existing: Option<&Self::Value>,
        primitives: &PrimitiveConverter,
    ) -> Result<Option<Self::Value>, BindError>;
}

/// Decodes the member with its `serde::Deserialize` implementation. A null
/// value (the member's section is missing) keeps the current value.
pub struct SerdeConverter<T>(PhantomData<fn() -> T>);

impl<T> Default for SerdeConverter<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T> fmt::Debug for SerdeConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SerdeConverter")
            .field(&std::any::type_name::<T>())
            .finish()
    }
}

impl<T: DeserializeOwned + Reflect> FieldConverter for SerdeConverter<T> {
    type Value = T;

    fn read_value(
        &self,
        reader: &mut TokenReader,
        _hint: TypeRef,
        _existing: Option<&T>,
        _primitives: &PrimitiveConverter,
    ) -> Result<Option<T>, BindError> {
        if matches!(reader.current(), Some(Token::Value(None))) {
            return Ok(None);
        }
        Ok(Some(reader.deserialize()?))
    }
}
