//! Attribute coercion: raw directory values to and from field shapes.
//!
//! A field shape is one of: scalar text, scalar binary, ordered sequence,
//! sorted unique set, fixed array, or a custom container. Everything except
//! the two scalar shapes is multi-valued.
//!
//! Reading never clears a field: the engine only calls
//! [`AttributeField::assign`] with at least one value, so an attribute that
//! is absent from the entry leaves the field at whatever it held before.

use lpa_types::{AttributeValue, Octets};
use std::collections::BTreeSet;
use tracing::warn;

/// The container shape of a bound field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldShape {
    Text,
    Binary,
    Sequence,
    SortedSet,
    Array,
    Custom,
}

impl FieldShape {
    /// True unless the shape is exactly scalar text or scalar binary.
    pub fn is_multi_valued(&self) -> bool {
        !matches!(self, FieldShape::Text | FieldShape::Binary)
    }
}

/// One element of an attribute: converts a single raw value.
pub trait AttributeElement: Sized + Send + Sync + 'static {
    /// Scalar shape of a field holding exactly one element.
    const SCALAR: FieldShape;

    fn from_value(value: AttributeValue) -> Result<Self, String>;
    fn to_value(&self) -> AttributeValue;
}

impl AttributeElement for String {
    const SCALAR: FieldShape = FieldShape::Text;

    fn from_value(value: AttributeValue) -> Result<Self, String> {
        value
            .into_text()
            .map_err(|_| "binary value is not valid UTF-8 text".to_string())
    }

    fn to_value(&self) -> AttributeValue {
        AttributeValue::Text(self.clone())
    }
}

impl AttributeElement for Octets {
    const SCALAR: FieldShape = FieldShape::Binary;

    fn from_value(value: AttributeValue) -> Result<Self, String> {
        Ok(Octets::new(value.into_bytes()))
    }

    fn to_value(&self) -> AttributeValue {
        AttributeValue::Binary(self.as_slice().to_vec())
    }
}

/// A field type that can be bound to a named attribute.
pub trait AttributeField: Send + Sync + 'static {
    const SHAPE: FieldShape;

    /// Replaces the field's content with `values` (never empty).
    fn assign(&mut self, values: Vec<AttributeValue>) -> Result<(), String>;

    /// The values to write for this field; empty means "nothing to write".
    fn collect(&self) -> Vec<AttributeValue>;

    /// Resets the field after the attribute was removed from the directory.
    fn clear(&mut self);
}

fn convert_all<E: AttributeElement>(values: Vec<AttributeValue>) -> Result<Vec<E>, String> {
    values.into_iter().map(E::from_value).collect()
}

fn first_of(values: Vec<AttributeValue>) -> Option<AttributeValue> {
    if values.len() > 1 {
        warn!(
            "Scalar field received {} values, keeping the first",
            values.len()
        );
    }
    values.into_iter().next()
}

macro_rules! scalar_field {
    ($ty:ty) => {
        impl AttributeField for $ty {
            const SHAPE: FieldShape = <$ty as AttributeElement>::SCALAR;

            fn assign(&mut self, values: Vec<AttributeValue>) -> Result<(), String> {
                if let Some(value) = first_of(values) {
                    *self = <$ty as AttributeElement>::from_value(value)?;
                }
                Ok(())
            }

            fn collect(&self) -> Vec<AttributeValue> {
                if self.is_empty() {
                    Vec::new()
                } else {
                    vec![self.to_value()]
                }
            }

            fn clear(&mut self) {
                *self = <$ty>::default();
            }
        }
    };
}

scalar_field!(String);
scalar_field!(Octets);

impl<E: AttributeElement> AttributeField for Option<E> {
    const SHAPE: FieldShape = E::SCALAR;

    fn assign(&mut self, values: Vec<AttributeValue>) -> Result<(), String> {
        if let Some(value) = first_of(values) {
            *self = Some(E::from_value(value)?);
        }
        Ok(())
    }

    fn collect(&self) -> Vec<AttributeValue> {
        self.iter().map(E::to_value).collect()
    }

    fn clear(&mut self) {
        *self = None;
    }
}

impl<E: AttributeElement> AttributeField for Vec<E> {
    const SHAPE: FieldShape = FieldShape::Sequence;

    fn assign(&mut self, values: Vec<AttributeValue>) -> Result<(), String> {
        *self = convert_all(values)?;
        Ok(())
    }

    fn collect(&self) -> Vec<AttributeValue> {
        self.iter().map(E::to_value).collect()
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}

impl<E: AttributeElement + Ord> AttributeField for BTreeSet<E> {
    const SHAPE: FieldShape = FieldShape::SortedSet;

    fn assign(&mut self, values: Vec<AttributeValue>) -> Result<(), String> {
        *self = convert_all::<E>(values)?.into_iter().collect();
        Ok(())
    }

    fn collect(&self) -> Vec<AttributeValue> {
        self.iter().map(E::to_value).collect()
    }

    fn clear(&mut self) {
        BTreeSet::clear(self);
    }
}

impl<E: AttributeElement> AttributeField for Box<[E]> {
    const SHAPE: FieldShape = FieldShape::Array;

    fn assign(&mut self, values: Vec<AttributeValue>) -> Result<(), String> {
        *self = convert_all(values)?.into_boxed_slice();
        Ok(())
    }

    fn collect(&self) -> Vec<AttributeValue> {
        self.iter().map(E::to_value).collect()
    }

    fn clear(&mut self) {
        *self = Box::default();
    }
}
