//! Entity descriptors.
//!
//! An entity type describes itself once through [`LdapEntity::describe`]:
//! which fields hold the DN, the manager handle, named attributes, the
//! wildcard attribute set and aggregates, plus the accessors the engine may
//! call. A parent type is embedded as a field and registered with
//! [`DescriptorBuilder::extends`]; its bindings become the earlier levels of
//! the child's descriptor, so the level list always runs root to leaf.
//!
//! Building checks the declaration and reports defects as
//! [`ConfigurationError`]s before any directory traffic happens.

use crate::aggregate::{
    AggregateField, AggregateShape, ForeignAggregateSlot, ForeignSlot, LiftedForeignSlot,
    LiftedLocalSlot, LocalAggregateSlot, LocalSlot, TypeHandler,
};
use crate::config::HierarchyPolicy;
use crate::error::ConfigurationError;
use crate::field::{AttributeField, FieldShape};
use crate::lens::{ComposedLens, Lens};
use crate::manager::DirectoryManager;
use crate::template::{DnReference, DnTemplate};
use lpa_types::{AttributeSet, AttributeValue, Dn, Entry};
use std::sync::Arc;

/// A type that can be loaded from and written to a directory entry.
pub trait LdapEntity: Default + Send + Sync + 'static {
    /// Registers the type's bindings, accessors and marker.
    fn describe(d: &mut DescriptorBuilder<Self>);
}

/// Last path segment of a type name, without module path.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

// ── Attribute slots ────────────────────────────────────────────

/// Type-erased access to one attribute-bound field.
pub(crate) trait AttributeSlot<T>: Send + Sync {
    fn shape(&self) -> FieldShape;
    fn assign(&self, target: &mut T, values: Vec<AttributeValue>) -> Result<(), String>;
    fn collect(&self, target: &T) -> Vec<AttributeValue>;
    fn clear(&self, target: &mut T);
}

struct TypedAttributeSlot<T, F> {
    lens: Arc<dyn Lens<T, F>>,
}

impl<T: 'static, F: AttributeField> AttributeSlot<T> for TypedAttributeSlot<T, F> {
    fn shape(&self) -> FieldShape {
        F::SHAPE
    }

    fn assign(&self, target: &mut T, values: Vec<AttributeValue>) -> Result<(), String> {
        self.lens.get_mut(target).assign(values)
    }

    fn collect(&self, target: &T) -> Vec<AttributeValue> {
        self.lens.get(target).collect()
    }

    fn clear(&self, target: &mut T) {
        self.lens.get_mut(target).clear();
    }
}

struct LiftedAttributeSlot<C, P> {
    parent: Arc<dyn Lens<C, P>>,
    inner: Arc<dyn AttributeSlot<P>>,
}

impl<C: 'static, P: 'static> AttributeSlot<C> for LiftedAttributeSlot<C, P> {
    fn shape(&self) -> FieldShape {
        self.inner.shape()
    }

    fn assign(&self, target: &mut C, values: Vec<AttributeValue>) -> Result<(), String> {
        self.inner.assign(self.parent.get_mut(target), values)
    }

    fn collect(&self, target: &C) -> Vec<AttributeValue> {
        self.inner.collect(self.parent.get(target))
    }

    fn clear(&self, target: &mut C) {
        self.inner.clear(self.parent.get_mut(target));
    }
}

// ── Bindings ───────────────────────────────────────────────────

/// What a field is bound to, as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingInfo {
    /// The entry's distinguished name.
    Dn,
    /// Receives the manager handle that loaded the entity.
    Manager,
    /// A named attribute.
    Attribute { name: String, shape: FieldShape },
    /// Every attribute of the entry (`*`).
    AllAttributes,
    /// A nested entity mapped from the same entry.
    LocalAggregate { aggregate_type: &'static str },
    /// Entities resolved from other entries through a DN template.
    ForeignAggregate {
        attribute: String,
        aggregate_type: &'static str,
        reference: DnReference,
        shape: AggregateShape,
    },
}

/// Name of the wildcard binding.
pub const ALL_ATTRIBUTES: &str = "*";

pub(crate) enum FieldOps<T> {
    Dn(Arc<dyn Lens<T, Dn>>),
    Manager(Arc<dyn Lens<T, Option<DirectoryManager>>>),
    Attribute {
        name: String,
        slot: Arc<dyn AttributeSlot<T>>,
    },
    AllAttributes(Arc<dyn Lens<T, AttributeSet>>),
    LocalAggregate(Arc<dyn LocalSlot<T>>),
    ForeignAggregate {
        attribute: String,
        reference: DnReference,
        slot: Arc<dyn ForeignSlot<T>>,
    },
}

impl<T: 'static> FieldOps<T> {
    /// Re-targets these operations at a child type that embeds `T`.
    fn lift<C: 'static>(&self, parent: &Arc<dyn Lens<C, T>>) -> FieldOps<C> {
        match self {
            FieldOps::Dn(lens) => {
                FieldOps::Dn(Arc::new(ComposedLens::new(parent.clone(), lens.clone())))
            }
            FieldOps::Manager(lens) => {
                FieldOps::Manager(Arc::new(ComposedLens::new(parent.clone(), lens.clone())))
            }
            FieldOps::Attribute { name, slot } => FieldOps::Attribute {
                name: name.clone(),
                slot: Arc::new(LiftedAttributeSlot {
                    parent: parent.clone(),
                    inner: slot.clone(),
                }),
            },
            FieldOps::AllAttributes(lens) => FieldOps::AllAttributes(Arc::new(
                ComposedLens::new(parent.clone(), lens.clone()),
            )),
            FieldOps::LocalAggregate(slot) => FieldOps::LocalAggregate(Arc::new(LiftedLocalSlot {
                parent: parent.clone(),
                inner: slot.clone(),
            })),
            FieldOps::ForeignAggregate {
                attribute,
                reference,
                slot,
            } => FieldOps::ForeignAggregate {
                attribute: attribute.clone(),
                reference: reference.clone(),
                slot: Arc::new(LiftedForeignSlot {
                    parent: parent.clone(),
                    inner: slot.clone(),
                }),
            },
        }
    }
}

/// One bound field of one level.
pub struct FieldBinding<T> {
    field: &'static str,
    pub(crate) ops: FieldOps<T>,
}

impl<T> FieldBinding<T> {
    /// Field name as registered.
    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn info(&self) -> BindingInfo {
        match &self.ops {
            FieldOps::Dn(_) => BindingInfo::Dn,
            FieldOps::Manager(_) => BindingInfo::Manager,
            FieldOps::Attribute { name, slot } => BindingInfo::Attribute {
                name: name.clone(),
                shape: slot.shape(),
            },
            FieldOps::AllAttributes(_) => BindingInfo::AllAttributes,
            FieldOps::LocalAggregate(slot) => BindingInfo::LocalAggregate {
                aggregate_type: slot.aggregate_type(),
            },
            FieldOps::ForeignAggregate {
                attribute,
                reference,
                slot,
            } => BindingInfo::ForeignAggregate {
                attribute: attribute.clone(),
                aggregate_type: slot.aggregate_type(),
                reference: reference.clone(),
                shape: slot.shape(),
            },
        }
    }
}

// ── Accessors ──────────────────────────────────────────────────

/// The callable behind an accessor.
pub enum AccessorKind<T> {
    Dn(Arc<dyn Fn(&T) -> Dn + Send + Sync>),
    Text(Arc<dyn Fn(&T) -> String + Send + Sync>),
}

impl<T> Clone for AccessorKind<T> {
    fn clone(&self) -> Self {
        match self {
            AccessorKind::Dn(f) => AccessorKind::Dn(f.clone()),
            AccessorKind::Text(f) => AccessorKind::Text(f.clone()),
        }
    }
}

/// A named zero-argument accessor the engine may call on an entity.
pub struct Accessor<T> {
    name: String,
    public: bool,
    kind: AccessorKind<T>,
}

impl<T: 'static> Accessor<T> {
    pub fn dn(name: impl Into<String>, f: impl Fn(&T) -> Dn + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            public: true,
            kind: AccessorKind::Dn(Arc::new(f)),
        }
    }

    pub fn text(name: impl Into<String>, f: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            public: true,
            kind: AccessorKind::Text(Arc::new(f)),
        }
    }

    /// Marks the accessor as not callable from outside the type.
    #[must_use]
    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn kind(&self) -> &AccessorKind<T> {
        &self.kind
    }

    /// Calls a text accessor.
    pub fn text_of(&self, target: &T) -> Option<String> {
        match &self.kind {
            AccessorKind::Text(f) => Some(f(target)),
            AccessorKind::Dn(_) => None,
        }
    }

    /// Calls a DN accessor.
    pub fn dn_of(&self, target: &T) -> Option<Dn> {
        match &self.kind {
            AccessorKind::Dn(f) => Some(f(target)),
            AccessorKind::Text(_) => None,
        }
    }

    fn lift<C: 'static>(&self, parent: &Arc<dyn Lens<C, T>>) -> Accessor<C> {
        let parent = parent.clone();
        let kind = match &self.kind {
            AccessorKind::Dn(f) => {
                let f = f.clone();
                AccessorKind::Dn(Arc::new(move |target: &C| f(parent.get(target))))
            }
            AccessorKind::Text(f) => {
                let f = f.clone();
                AccessorKind::Text(Arc::new(move |target: &C| f(parent.get(target))))
            }
        };
        Accessor {
            name: self.name.clone(),
            public: self.public,
            kind,
        }
    }
}

// ── Levels and descriptors ─────────────────────────────────────

/// The entity marker of one level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityMarker {
    pub required_object_classes: Vec<String>,
}

/// One type of the hierarchy, with its own bindings and accessors.
pub struct TypeLevel<T> {
    type_name: &'static str,
    marker: Option<EntityMarker>,
    fields: Vec<FieldBinding<T>>,
    accessors: Vec<Accessor<T>>,
}

impl<T: 'static> TypeLevel<T> {
    fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            marker: None,
            fields: Vec::new(),
            accessors: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn marker(&self) -> Option<&EntityMarker> {
        self.marker.as_ref()
    }

    pub fn fields(&self) -> &[FieldBinding<T>] {
        &self.fields
    }

    pub fn accessors(&self) -> &[Accessor<T>] {
        &self.accessors
    }

    fn lift<C: 'static>(&self, parent: &Arc<dyn Lens<C, T>>) -> TypeLevel<C> {
        TypeLevel {
            type_name: self.type_name,
            marker: self.marker.clone(),
            fields: self
                .fields
                .iter()
                .map(|binding| FieldBinding {
                    field: binding.field,
                    ops: binding.ops.lift(parent),
                })
                .collect(),
            accessors: self.accessors.iter().map(|a| a.lift(parent)).collect(),
        }
    }
}

/// The validated description of an entity type, levels root to leaf.
pub struct EntityDescriptor<T> {
    type_name: &'static str,
    levels: Vec<TypeLevel<T>>,
    policy: HierarchyPolicy,
}

impl<T: LdapEntity> EntityDescriptor<T> {
    /// Runs `T::describe` and validates the result.
    pub fn build() -> Result<Self, ConfigurationError> {
        let (levels, policy) = DescriptorBuilder::<T>::collect()?;
        let type_name = short_type_name::<T>();

        match policy {
            HierarchyPolicy::LeafOnly => {
                let leaf_marked = levels.last().is_some_and(|level| level.marker.is_some());
                if !leaf_marked {
                    return Err(ConfigurationError::NotAnEntity { type_name });
                }
            }
            HierarchyPolicy::EveryLevel => {
                if let Some(level) = levels.iter().find(|level| level.marker.is_none()) {
                    return Err(ConfigurationError::NotAnEntity {
                        type_name: level.type_name,
                    });
                }
            }
        }

        let has_dn = levels
            .iter()
            .flat_map(|level| level.fields.iter())
            .any(|binding| matches!(binding.ops, FieldOps::Dn(_)));
        if !has_dn {
            return Err(ConfigurationError::DnNotSet { type_name });
        }

        Ok(Self {
            type_name,
            levels,
            policy,
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn policy(&self) -> HierarchyPolicy {
        self.policy
    }

    pub fn levels(&self) -> &[TypeLevel<T>] {
        &self.levels
    }

    /// Every binding, root level first.
    pub fn bindings(&self) -> impl Iterator<Item = &FieldBinding<T>> {
        self.levels.iter().flat_map(|level| level.fields.iter())
    }

    /// Object classes written on bind: every marked level, root first,
    /// without case-insensitive duplicates.
    pub fn required_object_classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = Vec::new();
        for marker in self.levels.iter().filter_map(|level| level.marker.as_ref()) {
            for class in &marker.required_object_classes {
                if !classes.iter().any(|c| c.eq_ignore_ascii_case(class)) {
                    classes.push(class.clone());
                }
            }
        }
        classes
    }

    /// Whether `entry` carries the object classes this type requires.
    pub fn supports(&self, entry: &Entry, object_class_attribute: &str) -> bool {
        match self.policy {
            HierarchyPolicy::LeafOnly => self.levels.last().is_some_and(|level| {
                level.marker.as_ref().is_some_and(|marker| {
                    entry.has_object_classes(object_class_attribute, &marker.required_object_classes)
                })
            }),
            HierarchyPolicy::EveryLevel => self.levels.iter().all(|level| {
                level.marker.as_ref().is_some_and(|marker| {
                    entry.has_object_classes(object_class_attribute, &marker.required_object_classes)
                })
            }),
        }
    }

    /// Looks an accessor up by name, most-derived level first.
    pub fn accessor(&self, name: &str) -> Option<&Accessor<T>> {
        find_accessor(&self.levels, name)
    }

    /// The entity's DN, from the first DN binding; `None` while unset.
    pub fn dn_of(&self, entity: &T) -> Option<Dn> {
        self.bindings().find_map(|binding| match &binding.ops {
            FieldOps::Dn(lens) => {
                let dn = lens.get(entity);
                (!dn.is_root()).then(|| dn.clone())
            }
            _ => None,
        })
    }

    /// The attribute names bound by any level, in declaration order.
    pub fn attribute_names(&self) -> Vec<String> {
        self.bindings()
            .filter_map(|binding| match &binding.ops {
                FieldOps::Attribute { name, .. } => Some(name.clone()),
                FieldOps::ForeignAggregate { attribute, .. } => Some(attribute.clone()),
                _ => None,
            })
            .collect()
    }
}

fn find_accessor<'a, T>(levels: &'a [TypeLevel<T>], name: &str) -> Option<&'a Accessor<T>> {
    levels
        .iter()
        .rev()
        .flat_map(|level| level.accessors.iter())
        .find(|accessor| accessor.name == name)
}

/// `"get"` followed by the field name with its first letter upper-cased.
pub fn dn_accessor_name(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => format!("get{}{}", first.to_uppercase(), chars.as_str()),
        None => "get".to_string(),
    }
}

// ── Builder ────────────────────────────────────────────────────

/// Collects one type's declaration. Handed to [`LdapEntity::describe`].
pub struct DescriptorBuilder<T> {
    ancestors: Vec<TypeLevel<T>>,
    level: TypeLevel<T>,
    policy: HierarchyPolicy,
    extended: bool,
    errors: Vec<ConfigurationError>,
}

impl<T: LdapEntity> DescriptorBuilder<T> {
    fn new() -> Self {
        Self {
            ancestors: Vec::new(),
            level: TypeLevel::new(short_type_name::<T>()),
            policy: HierarchyPolicy::default(),
            extended: false,
            errors: Vec::new(),
        }
    }

    /// Runs `T::describe` and checks everything that does not depend on
    /// whether `T` is the most-derived type.
    fn collect() -> Result<(Vec<TypeLevel<T>>, HierarchyPolicy), ConfigurationError> {
        let mut builder = Self::new();
        T::describe(&mut builder);

        if let Some(err) = builder.errors.into_iter().next() {
            return Err(err);
        }

        let mut levels = builder.ancestors;
        levels.push(builder.level);
        validate_dn_accessors(&levels)?;
        validate_template_accessors(&levels)?;
        Ok((levels, builder.policy))
    }

    /// Declares `P` as the parent type, embedded at `lens`. At most one parent.
    pub fn extends<P: LdapEntity>(&mut self, lens: impl Lens<T, P> + 'static) -> &mut Self {
        if self.extended {
            self.errors.push(ConfigurationError::MultipleParents {
                type_name: self.level.type_name,
            });
            return self;
        }
        self.extended = true;

        match DescriptorBuilder::<P>::collect() {
            Ok((levels, _)) => {
                let parent: Arc<dyn Lens<T, P>> = Arc::new(lens);
                let lifted: Vec<TypeLevel<T>> =
                    levels.iter().map(|level| level.lift(&parent)).collect();
                self.ancestors = lifted;
            }
            Err(err) => self.errors.push(err),
        }
        self
    }

    /// Marks this type as an entity without required object classes.
    pub fn entity(&mut self) -> &mut Self {
        self.level.marker.get_or_insert_with(EntityMarker::default);
        self
    }

    /// Marks this type as an entity requiring `classes` on its entries.
    pub fn object_classes(&mut self, classes: &[&str]) -> &mut Self {
        let marker = self.level.marker.get_or_insert_with(EntityMarker::default);
        marker
            .required_object_classes
            .extend(classes.iter().map(|c| c.to_string()));
        self
    }

    /// Which levels must be marked. Only the most-derived type's choice counts.
    pub fn policy(&mut self, policy: HierarchyPolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    /// Binds the distinguished name. Requires a public DN accessor named
    /// `get` + the capitalised field name.
    pub fn dn(&mut self, field: &'static str, lens: impl Lens<T, Dn> + 'static) -> &mut Self {
        self.push(field, FieldOps::Dn(Arc::new(lens)))
    }

    /// Receives the loading manager.
    pub fn manager(
        &mut self,
        field: &'static str,
        lens: impl Lens<T, Option<DirectoryManager>> + 'static,
    ) -> &mut Self {
        self.push(field, FieldOps::Manager(Arc::new(lens)))
    }

    /// Binds `field` to the attribute `name`.
    pub fn attribute<F: AttributeField>(
        &mut self,
        field: &'static str,
        name: &str,
        lens: impl Lens<T, F> + 'static,
    ) -> &mut Self {
        if name == ALL_ATTRIBUTES {
            // Only an AttributeSet can take the wildcard.
            self.errors.push(ConfigurationError::UnsupportedShape {
                type_name: self.level.type_name,
                field,
            });
            return self;
        }
        let slot = TypedAttributeSlot {
            lens: Arc::new(lens),
        };
        self.push(
            field,
            FieldOps::Attribute {
                name: name.to_string(),
                slot: Arc::new(slot),
            },
        )
    }

    /// Binds `field` to every attribute of the entry (`*`).
    pub fn all_attributes(
        &mut self,
        field: &'static str,
        lens: impl Lens<T, AttributeSet> + 'static,
    ) -> &mut Self {
        self.push(field, FieldOps::AllAttributes(Arc::new(lens)))
    }

    /// Binds a nested entity of type `A` mapped from the same entry.
    pub fn local_aggregate<A: LdapEntity, C: AggregateField<A>>(
        &mut self,
        field: &'static str,
        lens: impl Lens<T, C> + 'static,
    ) -> &mut Self {
        let slot = LocalAggregateSlot::<T, A, C>::new(Arc::new(lens));
        self.push(field, FieldOps::LocalAggregate(Arc::new(slot)))
    }

    /// Binds entities of type `A` found at the DNs produced by substituting
    /// each value of `attribute` into the template named by `reference`.
    pub fn foreign_aggregate<A: LdapEntity, C: AggregateField<A>>(
        &mut self,
        field: &'static str,
        attribute: &str,
        reference: DnReference,
        lens: impl Lens<T, C> + 'static,
    ) -> &mut Self {
        let slot = ForeignAggregateSlot::<T, A, C>::new(
            Arc::new(lens),
            <C as AggregateField<A>>::SHAPE,
            <C as AggregateField<A>>::assign,
            <C as AggregateField<A>>::aggregates,
            <C as AggregateField<A>>::clear,
            <C as AggregateField<A>>::SKIPS_UNSET,
        );
        self.push_foreign(field, attribute, reference, Arc::new(slot))
    }

    /// Like [`foreign_aggregate`](Self::foreign_aggregate), but the entity
    /// shapes the resolved values into `F` itself through [`TypeHandler`].
    pub fn foreign_aggregate_shaped<A: LdapEntity, F: Send + Sync + 'static>(
        &mut self,
        field: &'static str,
        attribute: &str,
        reference: DnReference,
        lens: impl Lens<T, F> + 'static,
    ) -> &mut Self
    where
        T: TypeHandler<A, F>,
    {
        let slot = ForeignAggregateSlot::<T, A, F>::new(
            Arc::new(lens),
            AggregateShape::Custom,
            |target: &mut F, resolved: Vec<A>| *target = <T as TypeHandler<A, F>>::shape(resolved),
            <T as TypeHandler<A, F>>::flatten,
            |target: &mut F| *target = <T as TypeHandler<A, F>>::shape(Vec::new()),
            false,
        );
        self.push_foreign(field, attribute, reference, Arc::new(slot))
    }

    /// Registers an accessor.
    pub fn accessor(&mut self, accessor: Accessor<T>) -> &mut Self {
        self.level.accessors.push(accessor);
        self
    }

    /// Registers a public accessor returning a DN.
    pub fn accessor_dn(
        &mut self,
        name: &str,
        f: impl Fn(&T) -> Dn + Send + Sync + 'static,
    ) -> &mut Self {
        self.accessor(Accessor::dn(name, f))
    }

    /// Registers a public accessor returning text.
    pub fn accessor_text(
        &mut self,
        name: &str,
        f: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> &mut Self {
        self.accessor(Accessor::text(name, f))
    }

    fn push_foreign(
        &mut self,
        field: &'static str,
        attribute: &str,
        reference: DnReference,
        slot: Arc<dyn ForeignSlot<T>>,
    ) -> &mut Self {
        if let DnReference::Literal(template) = &reference {
            if let Err(err) = DnTemplate::parse(template) {
                self.errors.push(err);
                return self;
            }
        }
        self.push(
            field,
            FieldOps::ForeignAggregate {
                attribute: attribute.to_string(),
                reference,
                slot,
            },
        )
    }

    fn push(&mut self, field: &'static str, ops: FieldOps<T>) -> &mut Self {
        self.level.fields.push(FieldBinding { field, ops });
        self
    }
}

/// Each DN field needs a public DN accessor on its own level or an ancestor.
fn validate_dn_accessors<T: 'static>(levels: &[TypeLevel<T>]) -> Result<(), ConfigurationError> {
    for (index, level) in levels.iter().enumerate() {
        for binding in &level.fields {
            if !matches!(binding.ops, FieldOps::Dn(_)) {
                continue;
            }
            let accessor = dn_accessor_name(binding.field);
            let found = find_accessor(&levels[..=index], &accessor).ok_or_else(|| {
                ConfigurationError::MissingDnAccessor {
                    type_name: level.type_name,
                    field: binding.field,
                    accessor: accessor.clone(),
                }
            })?;
            if !found.public {
                return Err(ConfigurationError::DnAccessorNotPublic {
                    type_name: level.type_name,
                    accessor,
                });
            }
            if !matches!(found.kind, AccessorKind::Dn(_)) {
                return Err(ConfigurationError::DnAccessorWrongType {
                    type_name: level.type_name,
                    accessor,
                });
            }
        }
    }
    Ok(())
}

/// Each accessor-sourced template must name an existing text accessor.
fn validate_template_accessors<T: 'static>(
    levels: &[TypeLevel<T>],
) -> Result<(), ConfigurationError> {
    for level in levels {
        for binding in &level.fields {
            let FieldOps::ForeignAggregate {
                reference: DnReference::Accessor(name),
                ..
            } = &binding.ops
            else {
                continue;
            };
            match find_accessor(levels, name) {
                None => {
                    return Err(ConfigurationError::MissingTemplateAccessor {
                        type_name: level.type_name,
                        accessor: name.clone(),
                    });
                }
                Some(accessor) if !matches!(accessor.kind, AccessorKind::Text(_)) => {
                    return Err(ConfigurationError::TemplateAccessorWrongType {
                        type_name: level.type_name,
                        accessor: name.clone(),
                    });
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}
