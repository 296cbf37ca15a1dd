//! Replaying a configuration section as a token stream for field converters.
//!
//! Members annotated with a [`FieldConverter`] are not bound recursively.
//! Their section is rebuilt as a [`Document`], flattened into [`Token`]s and
//! handed to the converter through a [`TokenReader`].

mod converter;
mod de;
mod document;
mod token;

pub use converter::{FieldConverter, SerdeConverter};
pub use de::TokenError;
pub use document::{reconstruct, Document};
pub use token::{tokenize, Token, TokenReader};
