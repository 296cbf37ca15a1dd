//! Binding configuration sections onto typed values.
//!
//! The binder walks a [`ConfigSection`] and the [`TypeInfo`](crate::reflect::TypeInfo)
//! of the target type side by side. The shape of the target, never the shape
//! of the tree, decides how each section is read: leaves convert to scalars,
//! children become dictionary entries, array slots, collection elements or
//! object members.
//!
//! ```
//! use dragon_bind::reflect::{ObjectBuilder, Reflect, TypeInfo};
//! use dragon_bind::ConfigSection;
//!
//! #[derive(Default)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! impl Reflect for Person {
//!     fn type_info() -> TypeInfo {
//!         ObjectBuilder::<Self>::new()
//!             .field("name", |p| &mut p.name)
//!             .field("age", |p| &mut p.age)
//!             .build_default()
//!     }
//! }
//!
//! let root = ConfigSection::from_entries([("name", "Ada"), ("age", "37")]);
//! let mut person = Person::default();
//! let report = dragon_bind::bind(&root, &mut person)?;
//! assert!(report.is_complete());
//! assert_eq!(person.name, "Ada");
//! assert_eq!(person.age, 37);
//! # Ok::<(), dragon_bind::BindError>(())
//! ```

mod context;
mod error;
mod options;
mod report;
mod shape;

pub use error::BindError;
pub use options::BinderOptions;
pub use report::{BindReport, SkippedElement};
pub use shape::{classify, Shape};

use std::any::Any;

use context::BindContext;

use crate::config::ConfigSection;
use crate::reflect::{take, PrimitiveConverter, Reflect, TypeRef};

/// Binds sections with fixed options and primitive converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Binder {
    options: BinderOptions,
    primitives: PrimitiveConverter,
}

impl Binder {
    pub fn new(options: BinderOptions) -> Self {
        Self {
            options,
            primitives: PrimitiveConverter::new(),
        }
    }

    pub fn options(&self) -> BinderOptions {
        self.options
    }

    /// Binds `section` onto `instance` in place.
    pub fn bind<T: Reflect>(
        &self,
        section: &ConfigSection,
        instance: &mut T,
    ) -> Result<BindReport, BindError> {
        let mut context = BindContext::new(self.options, &self.primitives);
        let target: &mut dyn Any = &mut *instance;
        let bound = context.bind_instance(TypeRef::of::<T>(), Some(target), section)?;
        if let Some(value) = bound {
            *instance = take::<T>(value)?;
        }
        Ok(context.into_report())
    }

    /// Binds the child section named `key` onto `instance`.
    pub fn bind_key<T: Reflect>(
        &self,
        section: &ConfigSection,
        key: &str,
        instance: &mut T,
    ) -> Result<BindReport, BindError> {
        self.bind(&section.section_ref(key), instance)
    }

    /// Binds `section` without an existing value.
    ///
    /// Returns `None` when the section yields nothing to bind. Abstract
    /// collection types are created through their surrogate.
    pub fn create<T: Reflect>(
        &self,
        section: &ConfigSection,
    ) -> Result<(Option<T>, BindReport), BindError> {
        let mut context = BindContext::new(self.options, &self.primitives);
        let value = context
            .bind_instance(TypeRef::of::<T>(), None, section)?
            .map(take::<T>)
            .transpose()?;
        Ok((value, context.into_report()))
    }
}

/// Binds `section` onto `instance` with default options.
pub fn bind<T: Reflect>(section: &ConfigSection, instance: &mut T) -> Result<BindReport, BindError> {
    Binder::default().bind(section, instance)
}

pub fn bind_with_options<T: Reflect>(
    section: &ConfigSection,
    instance: &mut T,
    options: BinderOptions,
) -> Result<BindReport, BindError> {
    Binder::new(options).bind(section, instance)
}

/// Binds the child section named `key` onto `instance` with default options.
pub fn bind_key<T: Reflect>(
    section: &ConfigSection,
    key: &str,
    instance: &mut T,
) -> Result<BindReport, BindError> {
    Binder::default().bind_key(section, key, instance)
}
