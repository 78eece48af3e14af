//! A directory held entirely in memory.
//!
//! Used for fixtures and tests. Besides the [`Directory`] behaviour it records
//! every modify request it receives and can be told to fail the next modify
//! or session close, so callers can observe exactly what the mapping engine
//! sent and how it reacts to failures.

use crate::directory::{Directory, DirectorySession, SearchRequest};
use crate::error::{DirectoryError, DirectoryResult};
use crate::filter::Filter;
use crate::ldif::parse_ldif;
use lpa_types::{AttributeSet, Dn, Entry, Modification, ModificationOp};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// LDAP result codes used for the errors this directory reports.
const NO_SUCH_ATTRIBUTE: u32 = 16;
const ATTRIBUTE_OR_VALUE_EXISTS: u32 = 20;
const NOT_ALLOWED_ON_NON_LEAF: u32 = 66;

/// One modify request as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedModify {
    pub dn: Dn,
    pub modifications: Vec<Modification>,
}

#[derive(Default)]
struct State {
    entries: BTreeMap<Dn, Entry>,
    modifies: Vec<RecordedModify>,
    fail_next_modify: Option<(u32, String)>,
    fail_next_close: bool,
    opened: usize,
    closed: usize,
}

/// Shared, cloneable in-memory directory. Clones see the same entries.
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<Mutex<State>>,
}

fn lock(state: &Mutex<State>) -> DirectoryResult<MutexGuard<'_, State>> {
    state.lock().map_err(|_| DirectoryError::Closed)
}

fn project(entry: &Entry, attributes: &[String]) -> Entry {
    if attributes.is_empty() || attributes.iter().any(|a| a == "*") {
        return entry.clone();
    }
    Entry::with_attributes(entry.dn.clone(), entry.attributes.select(attributes))
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory from LDIF text.
    pub fn from_ldif(text: &str) -> DirectoryResult<Self> {
        let directory = Self::new();
        directory.load_ldif(text)?;
        Ok(directory)
    }

    /// Adds (or replaces) every record in `text`. Returns the record count.
    pub fn load_ldif(&self, text: &str) -> DirectoryResult<usize> {
        let entries = parse_ldif(text)?;
        let count = entries.len();
        let mut state = lock(&self.state)?;
        for entry in entries {
            state.entries.insert(entry.dn.clone(), entry);
        }
        debug!("Loaded {} LDIF records", count);
        Ok(count)
    }

    /// Reads an LDIF file; see [`InMemoryDirectory::load_ldif`].
    pub fn load_ldif_file(&self, path: &Path) -> DirectoryResult<usize> {
        let text = std::fs::read_to_string(path)?;
        self.load_ldif(&text)
    }

    /// Inserts or replaces an entry without any checks.
    pub fn insert(&self, entry: Entry) -> DirectoryResult<()> {
        lock(&self.state)?.entries.insert(entry.dn.clone(), entry);
        Ok(())
    }

    /// A copy of the stored entry, if present.
    pub fn entry(&self, dn: &Dn) -> Option<Entry> {
        lock(&self.state).ok()?.entries.get(dn).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every modify request received so far, oldest first.
    pub fn recorded_modifications(&self) -> Vec<RecordedModify> {
        lock(&self.state)
            .map(|s| s.modifies.clone())
            .unwrap_or_default()
    }

    pub fn clear_recorded(&self) {
        if let Ok(mut state) = lock(&self.state) {
            state.modifies.clear();
        }
    }

    /// Makes the next modify fail with the given result code.
    pub fn fail_next_modify(&self, code: u32, message: impl Into<String>) {
        if let Ok(mut state) = lock(&self.state) {
            state.fail_next_modify = Some((code, message.into()));
        }
    }

    /// Makes the next session close report an error.
    pub fn fail_next_close(&self) {
        if let Ok(mut state) = lock(&self.state) {
            state.fail_next_close = true;
        }
    }

    pub fn sessions_opened(&self) -> usize {
        lock(&self.state).map(|s| s.opened).unwrap_or(0)
    }

    pub fn sessions_closed(&self) -> usize {
        lock(&self.state).map(|s| s.closed).unwrap_or(0)
    }
}

impl std::fmt::Debug for InMemoryDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDirectory")
            .field("entries", &self.len())
            .finish()
    }
}

impl Directory for InMemoryDirectory {
    fn open(&self) -> DirectoryResult<Box<dyn DirectorySession>> {
        lock(&self.state)?.opened += 1;
        Ok(Box::new(InMemorySession {
            state: Arc::clone(&self.state),
        }))
    }
}

struct InMemorySession {
    state: Arc<Mutex<State>>,
}

fn apply(attributes: &mut AttributeSet, modification: &Modification) -> DirectoryResult<()> {
    let name = modification.name();
    let values = modification.attribute.values();
    match modification.op {
        ModificationOp::Add => {
            for value in values {
                if attributes.get(name).is_some_and(|a| a.contains(value)) {
                    return Err(DirectoryError::Protocol {
                        code: ATTRIBUTE_OR_VALUE_EXISTS,
                        message: format!("{name} already has value {value}"),
                    });
                }
                attributes.add_value(name, value.clone());
            }
        }
        ModificationOp::Replace => {
            attributes.remove(name);
            if !values.is_empty() {
                attributes.put(modification.attribute.clone());
            }
        }
        ModificationOp::Remove if values.is_empty() => {
            if attributes.remove(name).is_none() {
                return Err(DirectoryError::Protocol {
                    code: NO_SUCH_ATTRIBUTE,
                    message: format!("no attribute {name}"),
                });
            }
        }
        ModificationOp::Remove => {
            for value in values {
                if !attributes.remove_value(name, value) {
                    return Err(DirectoryError::Protocol {
                        code: NO_SUCH_ATTRIBUTE,
                        message: format!("{name} has no value {value}"),
                    });
                }
            }
        }
    }
    Ok(())
}

impl DirectorySession for InMemorySession {
    fn lookup(&mut self, dn: &Dn, attributes: &[String]) -> DirectoryResult<Option<Entry>> {
        let state = lock(&self.state)?;
        Ok(state.entries.get(dn).map(|e| project(e, attributes)))
    }

    fn search(&mut self, request: &SearchRequest) -> DirectoryResult<Vec<Entry>> {
        let filter = Filter::parse(&request.filter)?;
        let state = lock(&self.state)?;
        if !request.base.is_root() && !state.entries.contains_key(&request.base) {
            return Err(DirectoryError::NoSuchEntry(request.base.to_string()));
        }
        let found: Vec<Entry> = state
            .entries
            .values()
            .filter(|e| request.scope.contains(&request.base, &e.dn))
            .filter(|e| filter.matches(e))
            .map(|e| project(e, &request.attributes))
            .collect();
        debug!(
            "Search {} under {} matched {} entries",
            request.filter,
            request.base,
            found.len()
        );
        Ok(found)
    }

    fn modify(&mut self, dn: &Dn, modifications: &[Modification]) -> DirectoryResult<()> {
        let mut state = lock(&self.state)?;
        state.modifies.push(RecordedModify {
            dn: dn.clone(),
            modifications: modifications.to_vec(),
        });
        if let Some((code, message)) = state.fail_next_modify.take() {
            return Err(DirectoryError::Protocol { code, message });
        }

        let entry = state
            .entries
            .get(dn)
            .ok_or_else(|| DirectoryError::NoSuchEntry(dn.to_string()))?;
        let mut attributes = entry.attributes.clone();
        for modification in modifications {
            apply(&mut attributes, modification)?;
        }
        if let Some(entry) = state.entries.get_mut(dn) {
            entry.attributes = attributes;
        }
        Ok(())
    }

    fn add(&mut self, entry: &Entry) -> DirectoryResult<()> {
        let mut state = lock(&self.state)?;
        if state.entries.contains_key(&entry.dn) {
            return Err(DirectoryError::EntryExists(entry.dn.to_string()));
        }
        state.entries.insert(entry.dn.clone(), entry.clone());
        Ok(())
    }

    fn delete(&mut self, dn: &Dn) -> DirectoryResult<()> {
        let mut state = lock(&self.state)?;
        if !state.entries.contains_key(dn) {
            return Err(DirectoryError::NoSuchEntry(dn.to_string()));
        }
        if state.entries.keys().any(|k| k.is_child_of(dn)) {
            return Err(DirectoryError::Protocol {
                code: NOT_ALLOWED_ON_NON_LEAF,
                message: format!("{dn} has children"),
            });
        }
        state.entries.remove(dn);
        Ok(())
    }

    fn close(self: Box<Self>) -> DirectoryResult<()> {
        let mut state = lock(&self.state)?;
        state.closed += 1;
        if state.fail_next_close {
            state.fail_next_close = false;
            return Err(DirectoryError::Connection("close failed".to_string()));
        }
        Ok(())
    }
}
