//! Field access paths.
//!
//! A lens gives the mapping engine read and write access to one field of an
//! entity without the field being public. Entities build them with the
//! [`lens!`](crate::lens) macro inside their own module, so only the engine
//! and the entity itself ever write those fields.

use std::sync::Arc;

/// Borrowing access to a field `F` inside a `T`.
pub trait Lens<T, F>: Send + Sync {
    fn get<'a>(&self, target: &'a T) -> &'a F;
    fn get_mut<'a>(&self, target: &'a mut T) -> &'a mut F;
}

/// A lens made from a pair of plain accessor functions.
pub struct FieldLens<T, F> {
    get: fn(&T) -> &F,
    get_mut: fn(&mut T) -> &mut F,
}

impl<T, F> FieldLens<T, F> {
    #[must_use]
    pub const fn new(get: fn(&T) -> &F, get_mut: fn(&mut T) -> &mut F) -> Self {
        Self { get, get_mut }
    }
}

impl<T, F> Clone for FieldLens<T, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, F> Copy for FieldLens<T, F> {}

impl<T, F> Lens<T, F> for FieldLens<T, F> {
    fn get<'a>(&self, target: &'a T) -> &'a F {
        (self.get)(target)
    }

    fn get_mut<'a>(&self, target: &'a mut T) -> &'a mut F {
        (self.get_mut)(target)
    }
}

/// `outer` followed by `inner`: reaches a field of an embedded value.
pub struct ComposedLens<T, P, F> {
    outer: Arc<dyn Lens<T, P>>,
    inner: Arc<dyn Lens<P, F>>,
}

impl<T, P, F> ComposedLens<T, P, F> {
    pub fn new(outer: Arc<dyn Lens<T, P>>, inner: Arc<dyn Lens<P, F>>) -> Self {
        Self { outer, inner }
    }
}

impl<T, P: 'static, F> Lens<T, F> for ComposedLens<T, P, F> {
    fn get<'a>(&self, target: &'a T) -> &'a F {
        self.inner.get(self.outer.get(target))
    }

    fn get_mut<'a>(&self, target: &'a mut T) -> &'a mut F {
        self.inner.get_mut(self.outer.get_mut(target))
    }
}

/// Builds a [`FieldLens`] for a (possibly nested) field of a type.
///
/// ```ignore
/// d.attribute("o", lens!(Self, organization));
/// d.extends::<LdapEntry>(lens!(Self, entry));
/// ```
#[macro_export]
macro_rules! lens {
    ($owner:ty, $($field:ident).+) => {
        $crate::FieldLens::<$owner, _>::new(
            |target: &$owner| &target.$($field).+,
            |target: &mut $owner| &mut target.$($field).+,
        )
    };
}
