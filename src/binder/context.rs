//! The recursive binding algorithm.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, trace};

use super::shape::{classify, Shape};
use super::{BindError, BindReport, BinderOptions};
use crate::bridge::{reconstruct, Token, TokenReader};
use crate::config::ConfigSection;
use crate::reflect::{
    AnyValue, ArrayInfo, ConvertFn, FieldInfo, KeyKind, MapCapability, NullableInfo,
    PrimitiveConverter, SeqCapability, TypeInfo, TypeRef, Visibility,
};

/// A type descriptor together with its classification.
struct Descriptor {
    info: TypeInfo,
    shape: Shape,
}

/// State of one bind call.
pub(crate) struct BindContext<'p> {
    options: BinderOptions,
    primitives: &'p PrimitiveConverter,
    descriptors: HashMap<TypeId, Rc<Descriptor>>,
    report: BindReport,
}

impl<'p> BindContext<'p> {
    pub(crate) fn new(options: BinderOptions, primitives: &'p PrimitiveConverter) -> Self {
        Self {
            options,
            primitives,
            descriptors: HashMap::new(),
            report: BindReport::default(),
        }
    }

    pub(crate) fn into_report(self) -> BindReport {
        self.report
    }

    fn describe(&mut self, ty: TypeRef) -> Rc<Descriptor> {
        self.descriptors
            .entry(ty.id())
            .or_insert_with(|| {
                let info = ty.info();
                let shape = classify(&info);
                trace!("classified {} as {:?}", ty.name(), shape);
                Rc::new(Descriptor { info, shape })
            })
            .clone()
    }

    /// Binds `section` into a value of type `ty`.
    ///
    /// `existing` is the current value, if there is one. `Ok(Some(value))`
    /// replaces it; `Ok(None)` keeps it, possibly after binding into it in
    /// place.
    pub(crate) fn bind_instance(
        &mut self,
        ty: TypeRef,
        existing: Option<&mut dyn Any>,
        section: &ConfigSection,
    ) -> Result<Option<AnyValue>, BindError> {
        if ty.is::<ConfigSection>() {
            return Ok(Some(Box::new(section.clone())));
        }

        let descriptor = self.describe(ty);
        trace!("binding '{}' into {}", section.path(), ty.name());

        if let Some(value) = section.value() {
            match descriptor.shape {
                Shape::Scalar => return self.convert(&descriptor.info, value, section).map(Some),
                Shape::NullableScalar(nullable) => {
                    return self.convert_nullable(nullable, value, section);
                }
                _ => {}
            }
        }

        if !section.has_children() {
            return Ok(None);
        }

        let existing = existing.filter(|value| !descriptor.info.is_null(&**value));
        match existing {
            Some(target) => self.populate(&descriptor, target, section),
            None => self.create(&descriptor, section),
        }
    }

    fn convert(
        &self,
        info: &TypeInfo,
        value: &str,
        section: &ConfigSection,
    ) -> Result<AnyValue, BindError> {
        let parse = info.parse.ok_or(BindError::TypeMismatch { ty: info.name() })?;
        parse(value, self.primitives).map_err(|message| BindError::Conversion {
            path: section.path().to_string(),
            value: value.to_string(),
            ty: info.name(),
            message,
        })
    }

    fn convert_nullable(
        &mut self,
        nullable: NullableInfo,
        value: &str,
        section: &ConfigSection,
    ) -> Result<Option<AnyValue>, BindError> {
        if value.is_empty() {
            return Ok(None);
        }
        let inner = self.describe(nullable.inner);
        let converted = self.convert(&inner.info, value, section)?;
        (nullable.wrap)(converted).map(Some)
    }

    /// Makes a new value for `descriptor` and binds `section` into it.
    fn create(
        &mut self,
        descriptor: &Descriptor,
        section: &ConfigSection,
    ) -> Result<Option<AnyValue>, BindError> {
        match descriptor.shape {
            Shape::NullableScalar(_) => return Ok(None),
            Shape::Nullable(nullable) => {
                return match self.bind_instance(nullable.inner, None, section)? {
                    Some(inner) => (nullable.wrap)(inner).map(Some),
                    None => Ok(None),
                };
            }
            _ => {}
        }

        if descriptor.info.is_abstract() {
            let surrogate = descriptor.shape.surrogate().ok_or(BindError::AbstractType {
                ty: descriptor.info.name(),
            })?;
            trace!(
                "creating {} for abstract {}",
                surrogate.ty.name(),
                descriptor.info.name()
            );
            let bound = self.bind_instance(surrogate.ty, None, section)?;
            return bound.map(surrogate.adopt).transpose();
        }

        let mut instance = self.construct(&descriptor.info)?;
        let replaced = self.populate(descriptor, &mut *instance, section)?;
        Ok(Some(replaced.unwrap_or(instance)))
    }

    fn construct(&self, info: &TypeInfo) -> Result<AnyValue, BindError> {
        if let Some(array) = info.array {
            check_rank(info, array)?;
            return Ok((array.empty)());
        }
        let construct = info
            .construct
            .ok_or(BindError::MissingConstructor { ty: info.name() })?;
        Ok(construct())
    }

    /// Binds `section` into an existing, non-null value.
    fn populate(
        &mut self,
        descriptor: &Descriptor,
        target: &mut dyn Any,
        section: &ConfigSection,
    ) -> Result<Option<AnyValue>, BindError> {
        match descriptor.shape {
            Shape::Nullable(nullable) => {
                let Some(inner) = (nullable.inner_mut)(target) else {
                    return Ok(None);
                };
                match self.bind_instance(nullable.inner, Some(inner), section)? {
                    Some(value) => (nullable.wrap)(value).map(Some),
                    None => Ok(None),
                }
            }
            Shape::DictionaryLike(map) => {
                self.bind_dictionary(&descriptor.info, map, target, section)?;
                Ok(None)
            }
            Shape::Array(array) => {
                check_rank(&descriptor.info, array)?;
                self.bind_array(array, target, section).map(Some)
            }
            Shape::ListLike(seq) | Shape::SetLike(seq) if seq.add.is_some() => {
                self.bind_collection(seq, target, section)?;
                Ok(None)
            }
            _ => {
                self.bind_object(&descriptor.info, target, section)?;
                Ok(None)
            }
        }
    }

    fn bind_dictionary(
        &mut self,
        info: &TypeInfo,
        map: MapCapability,
        target: &mut dyn Any,
        section: &ConfigSection,
    ) -> Result<(), BindError> {
        if map.key_kind == KeyKind::Unsupported {
            debug!(
                "leaving '{}' unbound: {} keys are not supported",
                section.path(),
                map.key_type
            );
            return Ok(());
        }
        let Some(insert) = map.insert else {
            trace!("{} is read-only, binding members only", info.name());
            return self.bind_object(info, target, section);
        };

        for child in section.children() {
            let Some(value) = self.bind_instance(map.value, None, child)? else {
                continue;
            };
            let key = (map.parse_key)(child.key()).ok_or_else(|| BindError::InvalidEnumKey {
                key: child.key().to_string(),
                path: child.path().to_string(),
                ty: map.key_type,
            })?;
            insert(target, key, value)?;
        }
        Ok(())
    }

    fn bind_array(
        &mut self,
        array: ArrayInfo,
        existing: &dyn Any,
        section: &ConfigSection,
    ) -> Result<AnyValue, BindError> {
        let mut tail = Vec::with_capacity(section.children().len());
        for (index, child) in section.children().iter().enumerate() {
            match self.bind_instance(array.element, None, child) {
                Ok(value) => tail.push(value),
                Err(error) => {
                    debug!("left array element '{}' at its default: {}", child.path(), error);
                    self.report.record(child.path(), index, error);
                    tail.push(None);
                }
            }
        }
        (array.extend)(existing, tail)
    }

    fn bind_collection(
        &mut self,
        seq: SeqCapability,
        target: &mut dyn Any,
        section: &ConfigSection,
    ) -> Result<(), BindError> {
        let Some(add) = seq.add else {
            return Ok(());
        };
        for (index, child) in section.children().iter().enumerate() {
            let result = self
                .bind_instance(seq.element, None, child)
                .and_then(|item| item.map_or(Ok(()), |item| add(&mut *target, item)));
            if let Err(error) = result {
                debug!("skipped collection element '{}': {}", child.path(), error);
                self.report.record(child.path(), index, error);
            }
        }
        Ok(())
    }

    fn allowed(&self, visibility: Option<Visibility>) -> bool {
        match visibility {
            Some(Visibility::Public) => true,
            Some(Visibility::NonPublic) => self.options.bind_non_public_members,
            None => false,
        }
    }

    fn bind_object(
        &mut self,
        info: &TypeInfo,
        target: &mut dyn Any,
        section: &ConfigSection,
    ) -> Result<(), BindError> {
        let Some(object) = info.object() else {
            return Ok(());
        };
        for field in object.fields() {
            self.bind_field(field, &mut *target, section)?;
        }
        Ok(())
    }

    fn bind_field(
        &mut self,
        field: &FieldInfo,
        owner: &mut dyn Any,
        section: &ConfigSection,
    ) -> Result<(), BindError> {
        if field.is_indexed() || !self.allowed(field.getter()) {
            trace!("skipping member '{}'", field.name());
            return Ok(());
        }
        let writable = self.allowed(field.setter());

        let slot = (field.access)(owner)?;
        let descriptor = self.describe(field.ty());
        if !writable && descriptor.info.is_null(&*slot) {
            trace!("skipping unset read-only member '{}'", field.name());
            return Ok(());
        }

        let value = match &field.converter {
            Some(convert) => self.bind_converted(field, convert, &*slot, section)?,
            None => {
                let child = section.section_ref(field.name());
                self.bind_instance(field.ty(), Some(&mut *slot), &child)?
            }
        };

        if let Some(value) = value {
            if writable {
                (descriptor.info.assign)(slot, value)?;
            }
        }
        Ok(())
    }

    /// Hands the member's section to its converter as a token stream.
    fn bind_converted(
        &self,
        field: &FieldInfo,
        convert: &ConvertFn,
        existing: &dyn Any,
        section: &ConfigSection,
    ) -> Result<Option<AnyValue>, BindError> {
        let document = reconstruct(&section.section_ref(field.name()));
        let mut reader = TokenReader::from_document(&document);
        while reader.read() {
            let found = matches!(
                reader.current(),
                Some(Token::PropertyName(name)) if name.eq_ignore_ascii_case(field.name())
            );
            if found {
                reader.read();
                return convert(&mut reader, field.ty(), Some(existing), self.primitives);
            }
        }
        trace!("no property '{}' for converted member", field.name());
        Ok(None)
    }
}

fn check_rank(info: &TypeInfo, array: ArrayInfo) -> Result<(), BindError> {
    if array.rank > 1 {
        return Err(BindError::MultiDimensionalArray { ty: info.name() });
    }
    Ok(())
}
