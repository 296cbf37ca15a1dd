//! Type-directed binding of layered configuration onto Rust values.
//!
//! [`Config`] loads TOML files and environment variables into a
//! [`ConfigSection`] tree; [`bind`] and [`Binder`] populate any type that
//! implements [`reflect::Reflect`] from such a tree. Members that need custom
//! decoding can attach a [`bridge::FieldConverter`].

pub mod binder;
pub mod bridge;
pub mod config;
mod error;
pub mod reflect;

pub use binder::{bind, bind_key, bind_with_options, BindError, BindReport, Binder, BinderOptions};
pub use config::{Config, ConfigError, ConfigSection};
pub use error::Error;
