use thiserror::Error;

use crate::bridge::TokenError;

/// Errors that abort a bind call.
///
/// Failures of single array or collection elements never surface here; they
/// are recovered and listed in the [`BindReport`](super::BindReport).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BindError {
    #[error("cannot create an instance of '{ty}': abstract types need an existing value or a collection surrogate")]
    AbstractType { ty: &'static str },

    #[error("cannot create an instance of '{ty}': it has no parameterless constructor")]
    MissingConstructor { ty: &'static str },

    #[error("cannot create an instance of '{ty}': multi-dimensional arrays are not supported")]
    MultiDimensionalArray { ty: &'static str },

    #[error("'{key}' at '{path}' is not a variant of dictionary key type '{ty}'")]
    InvalidEnumKey {
        key: String,
        path: String,
        ty: &'static str,
    },

    #[error("failed to convert '{value}' at '{path}' to '{ty}': {message}")]
    Conversion {
        path: String,
        value: String,
        ty: &'static str,
        message: String,
    },

    #[error("value is not of the expected type '{ty}'")]
    TypeMismatch { ty: &'static str },

    #[error("field converter failed: {message}")]
    Converter { message: String },
}

impl BindError {
    pub fn type_mismatch<T: ?Sized>() -> Self {
        BindError::TypeMismatch {
            ty: std::any::type_name::<T>(),
        }
    }

    /// A failure reported by a [`FieldConverter`](crate::bridge::FieldConverter).
    pub fn converter(message: impl Into<String>) -> Self {
        BindError::Converter {
            message: message.into(),
        }
    }
}

impl From<TokenError> for BindError {
    fn from(error: TokenError) -> Self {
        BindError::converter(error.to_string())
    }
}
