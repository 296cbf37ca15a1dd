//! `serde` access to the value under a [`TokenReader`] cursor.
//!
//! Scalars are strings in the token stream; numeric and boolean requests
//! parse them with the same rules binding uses.

use std::fmt::Display;

use serde::de::{self, DeserializeSeed, IntoDeserializer, MapAccess, SeqAccess, Visitor};
use thiserror::Error;

use super::token::{Token, TokenReader};
use crate::reflect::FromConfigStr;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TokenError {
    #[error("unexpected end of token stream")]
    Eof,

    #[error("expected {expected}, found {found}")]
    Unexpected { expected: &'static str, found: String },

    #[error("invalid {ty} value: {message}")]
    InvalidScalar { ty: &'static str, message: String },

    #[error("{0}")]
    Custom(String),
}

impl de::Error for TokenError {
    fn custom<T: Display>(msg: T) -> Self {
        TokenError::Custom(msg.to_string())
    }
}

fn describe(token: Option<&Token>) -> String {
    match token {
        None => "end of stream".to_string(),
        Some(Token::Value(Some(value))) => format!("scalar '{value}'"),
        Some(Token::Value(None)) => "null".to_string(),
        Some(token) => format!("{token:?}"),
    }
}

impl TokenReader {
    fn unexpected(&self, expected: &'static str) -> TokenError {
        match self.current() {
            None => TokenError::Eof,
            token => TokenError::Unexpected {
                expected,
                found: describe(token),
            },
        }
    }

    fn scalar(&self) -> Result<&str, TokenError> {
        match self.current() {
            Some(Token::Value(Some(value))) => Ok(value),
            _ => Err(self.unexpected("a scalar")),
        }
    }

    fn parse<T: FromConfigStr>(&self) -> Result<T, TokenError> {
        T::from_config_str(self.scalar()?).map_err(|message| TokenError::InvalidScalar {
            ty: std::any::type_name::<T>(),
            message,
        })
    }
}

macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, TokenError> {
                let value = self.parse::<$ty>()?;
                visitor.$visit(value)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for &mut TokenReader {
    type Error = TokenError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, TokenError> {
        match self.current() {
            Some(Token::StartObject) => visitor.visit_map(ObjectAccess { reader: self }),
            Some(Token::StartArray) => visitor.visit_seq(ArrayAccess { reader: self }),
            Some(Token::Value(Some(value))) => {
                let value = value.clone();
                visitor.visit_string(value)
            }
            Some(Token::Value(None)) => visitor.visit_unit(),
            _ => Err(self.unexpected("a value")),
        }
    }

    deserialize_parsed! {
        deserialize_bool => visit_bool(bool),
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_i128 => visit_i128(i128),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_u128 => visit_u128(u128),
        deserialize_f32 => visit_f32(f32),
        deserialize_f64 => visit_f64(f64),
        deserialize_char => visit_char(char),
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, TokenError> {
        match self.current() {
            Some(Token::Value(None)) => visitor.visit_none(),
            Some(Token::Value(Some(value))) if value.is_empty() => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, TokenError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, TokenError> {
        let variant = self.scalar()?.to_string();
        visitor.visit_enum(variant.into_deserializer())
    }

    serde::forward_to_deserialize_any! {
        str string bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

/// Properties of the object under the cursor. Ends with the cursor on the
/// object's closing token.
struct ObjectAccess<'r> {
    reader: &'r mut TokenReader,
}

impl<'de> MapAccess<'de> for ObjectAccess<'_> {
    type Error = TokenError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, TokenError> {
        if !self.reader.read() {
            return Err(TokenError::Eof);
        }
        match self.reader.current() {
            Some(Token::EndObject) => Ok(None),
            Some(Token::PropertyName(name)) => {
                let name = name.clone();
                seed.deserialize(name.into_deserializer()).map(Some)
            }
            _ => Err(self.reader.unexpected("a property name")),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, TokenError> {
        if !self.reader.read() {
            return Err(TokenError::Eof);
        }
        seed.deserialize(&mut *self.reader)
    }
}

/// Elements of the array under the cursor.
struct ArrayAccess<'r> {
    reader: &'r mut TokenReader,
}

impl<'de> SeqAccess<'de> for ArrayAccess<'_> {
    type Error = TokenError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, TokenError> {
        if !self.reader.read() {
            return Err(TokenError::Eof);
        }
        match self.reader.current() {
            Some(Token::EndArray) => Ok(None),
            _ => seed.deserialize(&mut *self.reader).map(Some),
        }
    }
}
