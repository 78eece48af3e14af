//! Aggregates: nested entities inside an entity.
//!
//! A local aggregate is mapped from the enclosing entry itself. A foreign
//! aggregate is mapped from other entries, whose DNs come from substituting
//! each value of a driving attribute into a DN template.

use crate::descriptor::{short_type_name, LdapEntity};
use crate::error::{MappingError, MappingResult};
use crate::lens::Lens;
use crate::manager::DirectoryManager;
use crate::walker::{self, LoadContext};
use lpa_types::{AttributeSet, Dn, Entry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// The container shape of an aggregate field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateShape {
    Single,
    Sequence,
    SortedSet,
    Array,
    /// Shaped by the enclosing entity through [`TypeHandler`].
    Custom,
}

impl AggregateShape {
    pub fn is_collection(&self) -> bool {
        !matches!(self, AggregateShape::Single)
    }
}

/// A field that holds resolved aggregates of type `A`.
pub trait AggregateField<A>: Send + Sync + 'static {
    const SHAPE: AggregateShape;

    /// A held aggregate without a DN is treated as absent when writing.
    /// Only containers that cannot express absence set this.
    const SKIPS_UNSET: bool = false;

    /// Stores the resolved aggregates (never empty).
    fn assign(&mut self, resolved: Vec<A>);

    /// The aggregates currently held, for writing.
    fn aggregates(&self) -> Vec<&A>;

    /// Visits each held aggregate mutably, stopping at the first error.
    fn try_for_each_mut(
        &mut self,
        f: &mut dyn FnMut(&mut A) -> MappingResult<()>,
    ) -> MappingResult<()>;

    fn clear(&mut self);
}

fn first_resolved<A>(resolved: Vec<A>) -> Option<A> {
    if resolved.len() > 1 {
        warn!(
            "Single aggregate field received {} entries, keeping the first",
            resolved.len()
        );
    }
    resolved.into_iter().next()
}

impl<A: LdapEntity> AggregateField<A> for A {
    const SHAPE: AggregateShape = AggregateShape::Single;
    const SKIPS_UNSET: bool = true;

    fn assign(&mut self, resolved: Vec<A>) {
        if let Some(first) = first_resolved(resolved) {
            *self = first;
        }
    }

    fn aggregates(&self) -> Vec<&A> {
        vec![self]
    }

    fn try_for_each_mut(
        &mut self,
        f: &mut dyn FnMut(&mut A) -> MappingResult<()>,
    ) -> MappingResult<()> {
        f(self)
    }

    fn clear(&mut self) {
        *self = A::default();
    }
}

impl<A: LdapEntity> AggregateField<A> for Option<A> {
    const SHAPE: AggregateShape = AggregateShape::Single;

    fn assign(&mut self, resolved: Vec<A>) {
        if let Some(first) = first_resolved(resolved) {
            *self = Some(first);
        }
    }

    fn aggregates(&self) -> Vec<&A> {
        self.iter().collect()
    }

    fn try_for_each_mut(
        &mut self,
        f: &mut dyn FnMut(&mut A) -> MappingResult<()>,
    ) -> MappingResult<()> {
        self.iter_mut().try_for_each(f)
    }

    fn clear(&mut self) {
        *self = None;
    }
}

impl<A: LdapEntity> AggregateField<A> for Vec<A> {
    const SHAPE: AggregateShape = AggregateShape::Sequence;

    fn assign(&mut self, resolved: Vec<A>) {
        *self = resolved;
    }

    fn aggregates(&self) -> Vec<&A> {
        self.iter().collect()
    }

    fn try_for_each_mut(
        &mut self,
        f: &mut dyn FnMut(&mut A) -> MappingResult<()>,
    ) -> MappingResult<()> {
        self.iter_mut().try_for_each(f)
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}

impl<A: LdapEntity + Ord> AggregateField<A> for BTreeSet<A> {
    const SHAPE: AggregateShape = AggregateShape::SortedSet;

    fn assign(&mut self, resolved: Vec<A>) {
        *self = resolved.into_iter().collect();
    }

    fn aggregates(&self) -> Vec<&A> {
        self.iter().collect()
    }

    /// Members may reorder after the visit, so the set is rebuilt.
    fn try_for_each_mut(
        &mut self,
        f: &mut dyn FnMut(&mut A) -> MappingResult<()>,
    ) -> MappingResult<()> {
        let mut members: Vec<A> = std::mem::take(self).into_iter().collect();
        let outcome = members.iter_mut().try_for_each(f);
        *self = members.into_iter().collect();
        outcome
    }

    fn clear(&mut self) {
        BTreeSet::clear(self);
    }
}

impl<A: LdapEntity> AggregateField<A> for Box<[A]> {
    const SHAPE: AggregateShape = AggregateShape::Array;

    fn assign(&mut self, resolved: Vec<A>) {
        *self = resolved.into_boxed_slice();
    }

    fn aggregates(&self) -> Vec<&A> {
        self.iter().collect()
    }

    fn try_for_each_mut(
        &mut self,
        f: &mut dyn FnMut(&mut A) -> MappingResult<()>,
    ) -> MappingResult<()> {
        self.iter_mut().try_for_each(f)
    }

    fn clear(&mut self) {
        *self = Box::default();
    }
}

/// Lets an entity shape resolved foreign aggregates into a container of its
/// own choosing, such as a map keyed by name, and flatten it back for writing.
pub trait TypeHandler<A, F> {
    fn shape(resolved: Vec<A>) -> F;
    fn flatten(field: &F) -> Vec<&A>;
}

// ── Local aggregates ───────────────────────────────────────────

pub(crate) trait LocalSlot<T>: Send + Sync {
    fn aggregate_type(&self) -> &'static str;
    fn load(&self, target: &mut T, entry: &Entry, ctx: &mut LoadContext<'_>) -> MappingResult<()>;
    fn collect(
        &self,
        target: &T,
        manager: &DirectoryManager,
        out: &mut AttributeSet,
    ) -> MappingResult<()>;

    /// Applies attribute values re-read after a flush of the enclosing entry.
    fn refresh(
        &self,
        target: &mut T,
        manager: &DirectoryManager,
        names: &[String],
        refreshed: &AttributeSet,
    ) -> MappingResult<()>;
}

pub(crate) struct LocalAggregateSlot<T, A, C> {
    lens: Arc<dyn Lens<T, C>>,
    _aggregate: std::marker::PhantomData<fn() -> A>,
}

impl<T, A, C> LocalAggregateSlot<T, A, C> {
    pub(crate) fn new(lens: Arc<dyn Lens<T, C>>) -> Self {
        Self {
            lens,
            _aggregate: std::marker::PhantomData,
        }
    }
}

impl<T: 'static, A: LdapEntity, C: AggregateField<A>> LocalSlot<T> for LocalAggregateSlot<T, A, C> {
    fn aggregate_type(&self) -> &'static str {
        short_type_name::<A>()
    }

    fn load(&self, target: &mut T, entry: &Entry, ctx: &mut LoadContext<'_>) -> MappingResult<()> {
        match ctx.load_entry::<A>(entry)? {
            Some(aggregate) => self.lens.get_mut(target).assign(vec![aggregate]),
            None => debug!(
                "Entry {} does not carry local aggregate {}",
                entry.dn,
                short_type_name::<A>()
            ),
        }
        Ok(())
    }

    fn collect(
        &self,
        target: &T,
        manager: &DirectoryManager,
        out: &mut AttributeSet,
    ) -> MappingResult<()> {
        for aggregate in self.lens.get(target).aggregates() {
            let (_, attributes) = walker::collect_entry(manager, aggregate)?;
            walker::merge_unique(out, attributes);
        }
        Ok(())
    }

    fn refresh(
        &self,
        target: &mut T,
        manager: &DirectoryManager,
        names: &[String],
        refreshed: &AttributeSet,
    ) -> MappingResult<()> {
        let descriptor = manager.descriptor::<A>()?;
        self.lens.get_mut(target).try_for_each_mut(&mut |aggregate| {
            // Never loaded from the entry.
            if descriptor.dn_of(aggregate).is_none() {
                return Ok(());
            }
            walker::refresh(manager, &descriptor, aggregate, names, refreshed)
        })
    }
}

pub(crate) struct LiftedLocalSlot<C, P> {
    pub(crate) parent: Arc<dyn Lens<C, P>>,
    pub(crate) inner: Arc<dyn LocalSlot<P>>,
}

impl<C: 'static, P: 'static> LocalSlot<C> for LiftedLocalSlot<C, P> {
    fn aggregate_type(&self) -> &'static str {
        self.inner.aggregate_type()
    }

    fn load(&self, target: &mut C, entry: &Entry, ctx: &mut LoadContext<'_>) -> MappingResult<()> {
        self.inner.load(self.parent.get_mut(target), entry, ctx)
    }

    fn collect(
        &self,
        target: &C,
        manager: &DirectoryManager,
        out: &mut AttributeSet,
    ) -> MappingResult<()> {
        self.inner.collect(self.parent.get(target), manager, out)
    }

    fn refresh(
        &self,
        target: &mut C,
        manager: &DirectoryManager,
        names: &[String],
        refreshed: &AttributeSet,
    ) -> MappingResult<()> {
        self.inner
            .refresh(self.parent.get_mut(target), manager, names, refreshed)
    }
}

// ── Foreign aggregates ─────────────────────────────────────────

pub(crate) trait ForeignSlot<T>: Send + Sync {
    fn aggregate_type(&self) -> &'static str;
    fn shape(&self) -> AggregateShape;

    /// Loads the entries at `dns` and stores whatever resolved.
    fn resolve(&self, target: &mut T, dns: Vec<Dn>, ctx: &mut LoadContext<'_>) -> MappingResult<()>;

    /// DNs of the aggregates currently held.
    fn referenced_dns(&self, target: &T, manager: &DirectoryManager) -> MappingResult<Vec<Dn>>;

    fn clear(&self, target: &mut T);
}

pub(crate) struct ForeignAggregateSlot<T, A, F> {
    lens: Arc<dyn Lens<T, F>>,
    shape: AggregateShape,
    assign: fn(&mut F, Vec<A>),
    members: for<'a> fn(&'a F) -> Vec<&'a A>,
    clear: fn(&mut F),
    skip_unset: bool,
}

impl<T, A, F> ForeignAggregateSlot<T, A, F> {
    pub(crate) fn new(
        lens: Arc<dyn Lens<T, F>>,
        shape: AggregateShape,
        assign: fn(&mut F, Vec<A>),
        members: for<'a> fn(&'a F) -> Vec<&'a A>,
        clear: fn(&mut F),
        skip_unset: bool,
    ) -> Self {
        Self {
            lens,
            shape,
            assign,
            members,
            clear,
            skip_unset,
        }
    }
}

impl<T: 'static, A: LdapEntity, F: Send + Sync + 'static> ForeignSlot<T>
    for ForeignAggregateSlot<T, A, F>
{
    fn aggregate_type(&self) -> &'static str {
        short_type_name::<A>()
    }

    fn shape(&self) -> AggregateShape {
        self.shape
    }

    fn resolve(
        &self,
        target: &mut T,
        mut dns: Vec<Dn>,
        ctx: &mut LoadContext<'_>,
    ) -> MappingResult<()> {
        if !self.shape.is_collection() && dns.len() > 1 {
            warn!(
                "Single {} aggregate referenced by {} values, resolving only {}",
                short_type_name::<A>(),
                dns.len(),
                dns[0]
            );
            dns.truncate(1);
        }

        let mut resolved = Vec::with_capacity(dns.len());
        for dn in &dns {
            match ctx.find::<A>(dn)? {
                Some(aggregate) => resolved.push(aggregate),
                None => debug!(
                    "Skipping unresolved {} reference {}",
                    short_type_name::<A>(),
                    dn
                ),
            }
        }

        if resolved.is_empty() {
            return Ok(());
        }
        (self.assign)(self.lens.get_mut(target), resolved);
        Ok(())
    }

    fn referenced_dns(&self, target: &T, manager: &DirectoryManager) -> MappingResult<Vec<Dn>> {
        let descriptor = manager.descriptor::<A>()?;
        let mut dns = Vec::new();
        for aggregate in (self.members)(self.lens.get(target)) {
            match descriptor.dn_of(aggregate) {
                Some(dn) => dns.push(dn),
                None if self.skip_unset => debug!(
                    "Skipping unset {} aggregate",
                    descriptor.type_name()
                ),
                None => {
                    return Err(MappingError::MissingDn {
                        type_name: descriptor.type_name(),
                    })
                }
            }
        }
        Ok(dns)
    }

    fn clear(&self, target: &mut T) {
        (self.clear)(self.lens.get_mut(target));
    }
}

pub(crate) struct LiftedForeignSlot<C, P> {
    pub(crate) parent: Arc<dyn Lens<C, P>>,
    pub(crate) inner: Arc<dyn ForeignSlot<P>>,
}

impl<C: 'static, P: 'static> ForeignSlot<C> for LiftedForeignSlot<C, P> {
    fn aggregate_type(&self) -> &'static str {
        self.inner.aggregate_type()
    }

    fn shape(&self) -> AggregateShape {
        self.inner.shape()
    }

    fn resolve(&self, target: &mut C, dns: Vec<Dn>, ctx: &mut LoadContext<'_>) -> MappingResult<()> {
        self.inner.resolve(self.parent.get_mut(target), dns, ctx)
    }

    fn referenced_dns(&self, target: &C, manager: &DirectoryManager) -> MappingResult<Vec<Dn>> {
        self.inner.referenced_dns(self.parent.get(target), manager)
    }

    fn clear(&self, target: &mut C) {
        self.inner.clear(self.parent.get_mut(target));
    }
}
