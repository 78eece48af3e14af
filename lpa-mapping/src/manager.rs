//! The directory manager: the handle every mapping call goes through.
//!
//! A manager owns a [`Directory`] connector, the mapper configuration and a
//! cache of built descriptors. It is cheap to clone; clones share all three.
//! Each operation opens its own session and closes it before returning.

use crate::batch::Modifiable;
use crate::config::MapperConfig;
use crate::descriptor::{short_type_name, EntityDescriptor, LdapEntity};
use crate::error::{MappingError, MappingResult};
use crate::walker::{self, LoadContext};
use lpa_directory::{Directory, DirectoryResult, DirectorySession, SearchRequest};
use lpa_types::{
    Attribute, AttributeSet, AttributeValue, Dn, Entry, Modification, ModificationOp,
};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Order of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchOrder {
    /// Whatever order the directory returned.
    #[default]
    Directory,
    /// Ascending by the first value of an attribute, compared without case.
    /// Entries without the attribute come last.
    SortedBy(String),
}

type DescriptorCache = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

struct Inner {
    directory: Arc<dyn Directory>,
    config: MapperConfig,
    descriptors: RwLock<DescriptorCache>,
}

/// Shared handle to a directory plus the mapping configuration.
#[derive(Clone)]
pub struct DirectoryManager {
    inner: Arc<Inner>,
}

impl DirectoryManager {
    pub fn new(directory: impl Directory + 'static) -> Self {
        Self::with_config(directory, MapperConfig::default())
    }

    pub fn with_config(directory: impl Directory + 'static, config: MapperConfig) -> Self {
        Self::from_shared(Arc::new(directory), config)
    }

    pub fn from_shared(directory: Arc<dyn Directory>, config: MapperConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                directory,
                config,
                descriptors: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.inner.config
    }

    pub fn directory(&self) -> &Arc<dyn Directory> {
        &self.inner.directory
    }

    /// The descriptor of `T`, built and validated on first use.
    pub fn descriptor<T: LdapEntity>(&self) -> MappingResult<Arc<EntityDescriptor<T>>> {
        let key = TypeId::of::<T>();
        let cached = self
            .inner
            .descriptors
            .read()
            .ok()
            .and_then(|cache| cache.get(&key).cloned());
        if let Some(found) = cached {
            if let Ok(descriptor) = found.downcast::<EntityDescriptor<T>>() {
                return Ok(descriptor);
            }
        }

        let descriptor = Arc::new(EntityDescriptor::<T>::build()?);
        debug!(
            "Built descriptor for {} with {} levels",
            descriptor.type_name(),
            descriptor.levels().len()
        );
        if let Ok(mut cache) = self.inner.descriptors.write() {
            cache.insert(key, descriptor.clone());
        }
        Ok(descriptor)
    }

    /// Whether `entry` carries the object classes `T` requires.
    pub fn supports<T: LdapEntity>(&self, entry: &Entry) -> MappingResult<bool> {
        Ok(self
            .descriptor::<T>()?
            .supports(entry, &self.inner.config.object_class_attribute))
    }

    /// Runs `op` in a fresh session. A failure to close is logged, never returned.
    fn with_session<R>(
        &self,
        op: impl FnOnce(&mut dyn DirectorySession) -> DirectoryResult<R>,
    ) -> MappingResult<R> {
        let mut session = self.inner.directory.open()?;
        let result = op(&mut *session);
        if let Err(e) = session.close() {
            warn!("Failed to close directory session: {}", e);
        }
        Ok(result?)
    }

    pub(crate) fn lookup(&self, dn: &Dn) -> MappingResult<Option<Entry>> {
        self.with_session(|session| session.lookup(dn, &[]))
    }

    // ── Reading ────────────────────────────────────────────────

    /// Loads the entry at `dn` as a `T`. `None` if there is no entry or it
    /// lacks `T`'s object classes.
    pub fn find<T: LdapEntity>(&self, dn: &Dn) -> MappingResult<Option<T>> {
        LoadContext::new(self).find::<T>(dn)
    }

    /// Like [`find`](Self::find), but absence is an error.
    pub fn get<T: LdapEntity>(&self, dn: &Dn) -> MappingResult<T> {
        let entry = self
            .lookup(dn)?
            .ok_or_else(|| MappingError::NotFound(dn.to_string()))?;
        LoadContext::new(self)
            .load_entry::<T>(&entry)?
            .ok_or_else(|| MappingError::UnsupportedEntry {
                dn: dn.to_string(),
                type_name: short_type_name::<T>(),
            })
    }

    /// Maps an entry that was fetched some other way.
    pub fn load<T: LdapEntity>(&self, entry: &Entry) -> MappingResult<Option<T>> {
        LoadContext::new(self).load_entry::<T>(entry)
    }

    /// Searches and maps every matching entry that carries `T`'s object
    /// classes; the rest are skipped.
    pub fn search<T: LdapEntity>(
        &self,
        request: &SearchRequest,
        order: SearchOrder,
    ) -> MappingResult<Vec<T>> {
        let mut request = request.clone();
        if !request.attributes.is_empty() {
            let mut extra = vec![self.inner.config.object_class_attribute.clone()];
            if let SearchOrder::SortedBy(key) = &order {
                extra.push(key.clone());
            }
            for name in extra {
                if !request.attributes.iter().any(|a| a.eq_ignore_ascii_case(&name)) {
                    request.attributes.push(name);
                }
            }
        }

        let mut entries = self.with_session(|session| session.search(&request))?;
        debug!(
            "Search under {} with {} returned {} entries",
            request.base,
            request.filter,
            entries.len()
        );

        if let SearchOrder::SortedBy(key) = &order {
            entries.sort_by_cached_key(|entry| {
                let value = entry.attributes.first_text(key).map(str::to_lowercase);
                (value.is_none(), value)
            });
        }

        let mut ctx = LoadContext::new(self);
        let mut results = Vec::with_capacity(entries.len());
        for entry in &entries {
            if let Some(entity) = ctx.load_entry::<T>(entry)? {
                results.push(entity);
            }
        }
        Ok(results)
    }

    /// Re-reads the named attributes of the entry at `dn`.
    pub fn fetch_attributes(&self, dn: &Dn, names: &[String]) -> MappingResult<AttributeSet> {
        if names.is_empty() {
            return Ok(AttributeSet::new());
        }
        let entry = self
            .with_session(|session| session.lookup(dn, names))?
            .ok_or_else(|| MappingError::NotFound(dn.to_string()))?;
        Ok(entry.attributes.select(names))
    }

    // ── Writing ────────────────────────────────────────────────

    /// Applies `modifications` to the entry at `dn` in one modify call.
    pub fn apply_modification(&self, dn: &Dn, modifications: &[Modification]) -> MappingResult<()> {
        self.with_session(|session| session.modify(dn, modifications))?;
        debug!("Applied {} modifications to {}", modifications.len(), dn);
        Ok(())
    }

    /// Creates a new entry from `entity`.
    pub fn bind<T: LdapEntity>(&self, entity: &T) -> MappingResult<Dn> {
        let (dn, attributes) = walker::collect_entry(self, entity)?;
        let dn = dn.ok_or(MappingError::MissingDn {
            type_name: short_type_name::<T>(),
        })?;
        let entry = Entry::with_attributes(dn.clone(), attributes);
        self.with_session(|session| session.add(&entry))?;
        info!("Bound {} at {}", short_type_name::<T>(), dn);
        Ok(dn)
    }

    /// Rewrites every bound attribute of an existing entry with one REPLACE each.
    /// Bound attributes whose fields are empty are replaced with no values,
    /// which removes them from the entry.
    pub fn update<T: LdapEntity>(&self, entity: &T) -> MappingResult<()> {
        let (dn, attributes) = walker::collect_entry(self, entity)?;
        let dn = dn.ok_or(MappingError::MissingDn {
            type_name: short_type_name::<T>(),
        })?;
        let descriptor = self.descriptor::<T>()?;
        let object_class = &self.inner.config.object_class_attribute;

        let mut cleared: Vec<String> = Vec::new();
        for name in descriptor.attribute_names() {
            if name.eq_ignore_ascii_case(object_class)
                || attributes.contains(&name)
                || cleared.iter().any(|c| c.eq_ignore_ascii_case(&name))
            {
                continue;
            }
            cleared.push(name);
        }

        let mut modifications: Vec<Modification> = attributes
            .into_iter()
            .filter(|attribute| !attribute.name().eq_ignore_ascii_case(object_class))
            .map(|attribute| Modification::new(ModificationOp::Replace, attribute))
            .collect();
        modifications.extend(
            cleared
                .into_iter()
                .map(|name| Modification::new(ModificationOp::Replace, Attribute::new(name))),
        );
        if modifications.is_empty() {
            debug!("Nothing to update on {}", dn);
            return Ok(());
        }
        self.apply_modification(&dn, &modifications)?;
        info!("Updated {} at {}", short_type_name::<T>(), dn);
        Ok(())
    }

    /// Deletes the entry at `dn`.
    pub fn unbind(&self, dn: &Dn) -> MappingResult<()> {
        self.with_session(|session| session.delete(dn))?;
        info!("Unbound {}", dn);
        Ok(())
    }

    // ── Batches ────────────────────────────────────────────────

    /// Sends the entity's pending modifications in one modify call, then
    /// refreshes the touched fields from the directory.
    pub fn flush<T: Modifiable>(&self, entity: &mut T) -> MappingResult<()> {
        // The batch is consumed whatever the outcome.
        let mut log = std::mem::take(entity.modifications());
        let names = log.attribute_names();
        let descriptor = self.descriptor::<T>()?;
        let dn = descriptor.dn_of(entity).ok_or(MappingError::MissingDn {
            type_name: descriptor.type_name(),
        })?;
        let refreshed = log.flush(self, &dn)?;
        walker::refresh(self, &descriptor, entity, &names, &refreshed)
    }

    /// Flushes if anything is pending.
    pub fn save<T: Modifiable>(&self, entity: &mut T) -> MappingResult<()> {
        if entity.modifications().is_empty() {
            return Ok(());
        }
        self.flush(entity)
    }

    /// Queues one operation and flushes immediately.
    pub fn set_now<T: Modifiable>(
        &self,
        entity: &mut T,
        op: ModificationOp,
        attribute: &str,
        value: impl Into<AttributeValue>,
    ) -> MappingResult<()> {
        entity.modifications().add_operation(op, attribute, value)?;
        self.flush(entity)
    }
}

impl fmt::Debug for DirectoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryManager")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl PartialEq for DirectoryManager {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
