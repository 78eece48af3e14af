//! Batched attribute modifications.
//!
//! An entity queues changes in a [`ModificationLog`] and sends them in one
//! modify call. Each attribute carries a single kind of operation per batch;
//! queuing a different kind for the same attribute is rejected. The log is
//! emptied as soon as a flush starts, whether or not the directory accepts it.

use crate::descriptor::LdapEntity;
use crate::error::{MappingError, MappingResult};
use crate::manager::DirectoryManager;
use lpa_types::{Attribute, AttributeSet, AttributeValue, Dn, Modification, ModificationOp};
use tracing::info;

/// Pending modifications, one per attribute, in first-queued order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModificationLog {
    pending: Vec<Modification>,
}

impl ModificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn pending(&self) -> &[Modification] {
        &self.pending
    }

    /// Names of the attributes with pending changes.
    pub fn attribute_names(&self) -> Vec<String> {
        self.pending.iter().map(|m| m.name().to_string()).collect()
    }

    fn position(&self, attribute: &str) -> Option<usize> {
        self.pending
            .iter()
            .position(|m| m.name().eq_ignore_ascii_case(attribute))
    }

    fn check(&self, index: usize, op: ModificationOp) -> MappingResult<()> {
        let existing = &self.pending[index];
        if existing.op != op {
            return Err(MappingError::BatchConsistency {
                attribute: existing.name().to_string(),
                pending: existing.op,
                requested: op,
            });
        }
        Ok(())
    }

    /// Queues `value` under `op` for `attribute`.
    pub fn add_operation(
        &mut self,
        op: ModificationOp,
        attribute: &str,
        value: impl Into<AttributeValue>,
    ) -> MappingResult<()> {
        let value = value.into();
        match self.position(attribute) {
            Some(index) => {
                self.check(index, op)?;
                let values = &mut self.pending[index].attribute;
                if !values.contains(&value) {
                    values.push(value);
                }
            }
            None => self.pending.push(Modification::new(
                op,
                Attribute::with_values(attribute, [value]),
            )),
        }
        Ok(())
    }

    /// Queues removal of the whole attribute.
    pub fn remove_attribute(&mut self, attribute: &str) -> MappingResult<()> {
        match self.position(attribute) {
            Some(index) => {
                self.check(index, ModificationOp::Remove)?;
                let name = self.pending[index].name().to_string();
                self.pending[index].attribute = Attribute::new(name);
            }
            None => self
                .pending
                .push(Modification::new(ModificationOp::Remove, Attribute::new(attribute))),
        }
        Ok(())
    }

    /// Drops everything pending.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Sends the pending changes to the entry at `dn` in one modify call and
    /// re-reads the touched attributes.
    pub fn flush(&mut self, manager: &DirectoryManager, dn: &Dn) -> MappingResult<AttributeSet> {
        if self.pending.is_empty() {
            return Err(MappingError::EmptyBatch);
        }
        let modifications = std::mem::take(&mut self.pending);
        let names: Vec<String> = modifications.iter().map(|m| m.name().to_string()).collect();

        info!(
            "Flushing {} pending modifications to {}",
            modifications.len(),
            dn
        );
        manager.apply_modification(dn, &modifications)?;
        manager.fetch_attributes(dn, &names)
    }
}

/// An entity that queues modifications.
///
/// The provided methods use the manager the entity was loaded with; entities
/// without a manager binding get [`MappingError::NoManager`].
pub trait Modifiable: LdapEntity {
    fn modifications(&mut self) -> &mut ModificationLog;

    fn manager(&self) -> Option<DirectoryManager> {
        None
    }

    fn add_operation(
        &mut self,
        op: ModificationOp,
        attribute: &str,
        value: impl Into<AttributeValue>,
    ) -> MappingResult<()> {
        self.modifications().add_operation(op, attribute, value)
    }

    fn flush(&mut self) -> MappingResult<()> {
        let manager = self.manager().ok_or(MappingError::NoManager)?;
        manager.flush(self)
    }

    fn save(&mut self) -> MappingResult<()> {
        let manager = self.manager().ok_or(MappingError::NoManager)?;
        manager.save(self)
    }

    fn set_now(
        &mut self,
        op: ModificationOp,
        attribute: &str,
        value: impl Into<AttributeValue>,
    ) -> MappingResult<()> {
        let manager = self.manager().ok_or(MappingError::NoManager)?;
        manager.set_now(self, op, attribute, value)
    }
}
