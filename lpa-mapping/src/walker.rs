//! The hierarchy walker: entries to entities and back.
//!
//! Loading visits every level root to leaf and fills bound fields from the
//! entry. Fields whose attribute is absent keep their default. Writing walks
//! the same levels and collects the attribute set for a new or updated entry.

use crate::config::CyclePolicy;
use crate::descriptor::{short_type_name, AccessorKind, EntityDescriptor, FieldOps, LdapEntity};
use crate::error::{ConfigurationError, MappingError, MappingResult};
use crate::field::FieldShape;
use crate::manager::DirectoryManager;
use crate::template::{DnReference, DnTemplate};
use lpa_types::{AttributeSet, AttributeValue, Dn, Entry};
use std::any::TypeId;
use std::collections::HashSet;
use tracing::{debug, warn};

/// State carried through one load: the (type, DN) pairs currently being
/// resolved and the current nesting depth.
pub(crate) struct LoadContext<'m> {
    manager: &'m DirectoryManager,
    active: HashSet<(TypeId, String)>,
    depth: usize,
}

impl<'m> LoadContext<'m> {
    pub(crate) fn new(manager: &'m DirectoryManager) -> Self {
        Self {
            manager,
            active: HashSet::new(),
            depth: 0,
        }
    }

    /// Whether `A` at `dn` may be loaded now. `Ok(false)` means skip it.
    fn admit<A: LdapEntity>(&self, dn: &Dn) -> MappingResult<bool> {
        let config = self.manager.config();
        if self.active.contains(&(TypeId::of::<A>(), dn.normalized())) {
            return match config.cycle_policy {
                CyclePolicy::Fail => Err(MappingError::ReferenceCycle {
                    type_name: short_type_name::<A>(),
                    dn: dn.to_string(),
                }),
                CyclePolicy::Skip => {
                    warn!(
                        "Skipping {} at {}: already being resolved",
                        short_type_name::<A>(),
                        dn
                    );
                    Ok(false)
                }
            };
        }
        if self.depth >= config.max_resolution_depth {
            return Err(MappingError::ResolutionDepthExceeded {
                depth: config.max_resolution_depth,
                dn: dn.to_string(),
            });
        }
        Ok(true)
    }

    /// Looks `dn` up and loads it as an `A`.
    pub(crate) fn find<A: LdapEntity>(&mut self, dn: &Dn) -> MappingResult<Option<A>> {
        if !self.admit::<A>(dn)? {
            return Ok(None);
        }
        match self.manager.lookup(dn)? {
            Some(entry) => self.load_entry(&entry),
            None => {
                debug!("No entry at {}", dn);
                Ok(None)
            }
        }
    }

    /// Loads an already fetched entry as an `A`.
    pub(crate) fn load_entry<A: LdapEntity>(&mut self, entry: &Entry) -> MappingResult<Option<A>> {
        if !self.admit::<A>(&entry.dn)? {
            return Ok(None);
        }
        let key = (TypeId::of::<A>(), entry.dn.normalized());
        self.active.insert(key.clone());
        self.depth += 1;
        let result = load_into::<A>(self, entry);
        self.depth -= 1;
        self.active.remove(&key);
        result
    }
}

fn load_into<T: LdapEntity>(ctx: &mut LoadContext<'_>, entry: &Entry) -> MappingResult<Option<T>> {
    let manager = ctx.manager;
    let descriptor = manager.descriptor::<T>()?;
    if !descriptor.supports(entry, &manager.config().object_class_attribute) {
        debug!(
            "{} lacks the object classes of {}",
            entry.dn,
            descriptor.type_name()
        );
        return Ok(None);
    }

    let mut instance = T::default();
    for level in descriptor.levels() {
        debug!(
            "Mapping {} level {} from {}",
            descriptor.type_name(),
            level.type_name(),
            entry.dn
        );
        for binding in level.fields() {
            match &binding.ops {
                FieldOps::Dn(lens) => *lens.get_mut(&mut instance) = entry.dn.clone(),
                FieldOps::Manager(lens) => *lens.get_mut(&mut instance) = Some(manager.clone()),
                FieldOps::Attribute { name, slot } => {
                    let values = entry.values(name);
                    if values.is_empty() {
                        continue;
                    }
                    slot.assign(&mut instance, values.to_vec())
                        .map_err(|reason| MappingError::coercion(name, reason))?;
                }
                FieldOps::AllAttributes(lens) => {
                    *lens.get_mut(&mut instance) = entry.attributes.clone();
                }
                FieldOps::LocalAggregate(slot) => slot.load(&mut instance, entry, ctx)?,
                FieldOps::ForeignAggregate {
                    attribute,
                    reference,
                    slot,
                } => {
                    let values = entry.values(attribute);
                    if values.is_empty() {
                        continue;
                    }
                    let template = resolve_template(&descriptor, reference, &instance)?;
                    let dns = substitute_all(&template, attribute, values)?;
                    slot.resolve(&mut instance, dns, ctx)?;
                }
            }
        }
    }
    Ok(Some(instance))
}

fn substitute_all(
    template: &DnTemplate,
    attribute: &str,
    values: &[AttributeValue],
) -> MappingResult<Vec<Dn>> {
    values
        .iter()
        .map(|value| {
            let raw = value
                .as_text()
                .ok_or_else(|| MappingError::coercion(attribute, "binary value cannot name an entry"))?;
            template.substitute(raw)
        })
        .collect()
}

/// The template a foreign aggregate uses for this particular entity.
fn resolve_template<T: LdapEntity>(
    descriptor: &EntityDescriptor<T>,
    reference: &DnReference,
    entity: &T,
) -> MappingResult<DnTemplate> {
    let text = match reference {
        DnReference::Literal(text) => text.clone(),
        DnReference::Accessor(name) => {
            let accessor = descriptor.accessor(name).ok_or_else(|| {
                ConfigurationError::MissingTemplateAccessor {
                    type_name: descriptor.type_name(),
                    accessor: name.clone(),
                }
            })?;
            match accessor.kind() {
                AccessorKind::Text(f) => f(entity),
                AccessorKind::Dn(_) => {
                    return Err(ConfigurationError::TemplateAccessorWrongType {
                        type_name: descriptor.type_name(),
                        accessor: name.clone(),
                    }
                    .into());
                }
            }
        }
    };
    Ok(DnTemplate::parse(&text)?)
}

// ── Writing ────────────────────────────────────────────────────

/// Adds `value` under `name` unless an equal value (ignoring case) is there.
fn add_unique(out: &mut AttributeSet, name: &str, value: AttributeValue) {
    let present = out
        .get(name)
        .is_some_and(|attribute| attribute.contains(&value));
    if !present {
        out.add_value(name, value);
    }
}

/// Merges `other` into `out`, skipping duplicate values.
pub(crate) fn merge_unique(out: &mut AttributeSet, other: AttributeSet) {
    for attribute in other {
        let name = attribute.name().to_string();
        for value in attribute.into_values() {
            add_unique(out, &name, value);
        }
    }
}

/// Walks `entity` in write mode: its DN (if set) and every attribute to store.
pub(crate) fn collect_entry<T: LdapEntity>(
    manager: &DirectoryManager,
    entity: &T,
) -> MappingResult<(Option<Dn>, AttributeSet)> {
    let descriptor = manager.descriptor::<T>()?;
    let object_class = &manager.config().object_class_attribute;

    let mut out = AttributeSet::new();
    for class in descriptor.required_object_classes() {
        add_unique(&mut out, object_class, AttributeValue::Text(class));
    }

    let mut dn = None;
    for level in descriptor.levels() {
        for binding in level.fields() {
            match &binding.ops {
                FieldOps::Dn(lens) => {
                    let value = lens.get(entity);
                    if dn.is_none() && !value.is_root() {
                        dn = Some(value.clone());
                    }
                }
                FieldOps::Manager(_) | FieldOps::AllAttributes(_) => {}
                FieldOps::Attribute { name, slot } => {
                    if slot.shape() == FieldShape::Custom {
                        return Err(ConfigurationError::UnsupportedShape {
                            type_name: level.type_name(),
                            field: binding.field(),
                        }
                        .into());
                    }
                    for value in slot.collect(entity) {
                        add_unique(&mut out, name, value);
                    }
                }
                FieldOps::LocalAggregate(slot) => slot.collect(entity, manager, &mut out)?,
                FieldOps::ForeignAggregate {
                    attribute,
                    reference,
                    slot,
                } => {
                    let dns = slot.referenced_dns(entity, manager)?;
                    if dns.is_empty() {
                        continue;
                    }
                    let template = resolve_template(&descriptor, reference, entity)?;
                    for target in dns {
                        let raw = template.extract(&target).ok_or_else(|| {
                            MappingError::coercion(
                                attribute,
                                format!("{target} does not match template {template}"),
                            )
                        })?;
                        add_unique(&mut out, attribute, AttributeValue::Text(raw));
                    }
                }
            }
        }
    }
    Ok((dn, out))
}

/// Brings `entity` in line with attribute values re-read after a flush.
/// `names` are the attributes the flush touched; any of them missing from
/// `refreshed` was removed from the entry.
pub(crate) fn refresh<T: LdapEntity>(
    manager: &DirectoryManager,
    descriptor: &EntityDescriptor<T>,
    entity: &mut T,
    names: &[String],
    refreshed: &AttributeSet,
) -> MappingResult<()> {
    let touched = |name: &str| names.iter().any(|n| n.eq_ignore_ascii_case(name));

    for binding in descriptor.bindings() {
        match &binding.ops {
            FieldOps::Attribute { name, slot } if touched(name) => {
                let values = refreshed.values(name);
                if values.is_empty() {
                    slot.clear(entity);
                } else {
                    slot.assign(entity, values.to_vec())
                        .map_err(|reason| MappingError::coercion(name, reason))?;
                }
            }
            FieldOps::AllAttributes(lens) => {
                let set = lens.get_mut(entity);
                for name in names {
                    match refreshed.get(name) {
                        Some(attribute) => {
                            set.put(attribute.clone());
                        }
                        None => {
                            set.remove(name);
                        }
                    }
                }
            }
            FieldOps::ForeignAggregate {
                attribute,
                reference,
                slot,
            } if touched(attribute) => {
                slot.clear(entity);
                let values = refreshed.values(attribute);
                if values.is_empty() {
                    continue;
                }
                let template = resolve_template(descriptor, reference, entity)?;
                let dns = substitute_all(&template, attribute, values)?;
                let mut ctx = LoadContext::new(manager);
                slot.resolve(entity, dns, &mut ctx)?;
            }
            FieldOps::LocalAggregate(slot) => {
                slot.refresh(entity, manager, names, refreshed)?;
            }
            _ => {}
        }
    }
    debug!(
        "Refreshed {} attributes on {}",
        names.len(),
        descriptor.type_name()
    );
    Ok(())
}
