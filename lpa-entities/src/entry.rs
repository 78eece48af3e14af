//! The base entry type every other entity extends.

use lpa_mapping::{
    lens, DescriptorBuilder, DirectoryManager, LdapEntity, Modifiable, ModificationLog,
};
use lpa_types::{AttributeSet, AttributeValue, Dn};
use std::cmp::Ordering;

/// A directory entry with its DN, common name, object classes and every raw
/// attribute. Also carries the manager it was loaded with and the pending
/// modification batch.
#[derive(Debug, Default, Clone)]
pub struct LdapEntry {
    dn: Dn,
    cn: String,
    object_classes: Vec<String>,
    attributes: AttributeSet,
    manager: Option<DirectoryManager>,
    pending: ModificationLog,
}

impl LdapEntity for LdapEntry {
    fn describe(d: &mut DescriptorBuilder<Self>) {
        d.entity()
            .manager("manager", lens!(Self, manager))
            .all_attributes("attributes", lens!(Self, attributes))
            .dn("dn", lens!(Self, dn))
            .attribute("cn", "cn", lens!(Self, cn))
            .attribute("object_classes", "objectClass", lens!(Self, object_classes))
            .accessor_dn("getDn", |entry: &Self| entry.dn.clone());
    }
}

impl Modifiable for LdapEntry {
    fn modifications(&mut self) -> &mut ModificationLog {
        &mut self.pending
    }

    fn manager(&self) -> Option<DirectoryManager> {
        self.manager.clone()
    }
}

impl LdapEntry {
    /// A new, unsaved entry at `dn`.
    pub fn new(dn: Dn) -> Self {
        Self {
            dn,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_cn(mut self, cn: impl Into<String>) -> Self {
        self.cn = cn.into();
        self
    }

    #[must_use]
    pub fn with_object_classes<S: Into<String>>(mut self, classes: impl IntoIterator<Item = S>) -> Self {
        self.object_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn dn(&self) -> &Dn {
        &self.dn
    }

    /// Common name; empty when the entry has none.
    pub fn cn(&self) -> &str {
        &self.cn
    }

    pub fn object_classes(&self) -> &[String] {
        &self.object_classes
    }

    pub fn is_object_class(&self, class: &str) -> bool {
        self.object_classes
            .iter()
            .any(|c| c.eq_ignore_ascii_case(class))
    }

    /// Every attribute as loaded, kept current by flushes.
    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// First value of `attribute` as text.
    pub fn string_value(&self, attribute: &str) -> Option<&str> {
        self.attributes.first_text(attribute)
    }

    pub fn attribute_values(&self, attribute: &str) -> &[AttributeValue] {
        self.attributes.values(attribute)
    }

    pub fn directory_manager(&self) -> Option<&DirectoryManager> {
        self.manager.as_ref()
    }

    pub fn pending(&self) -> &ModificationLog {
        &self.pending
    }
}

impl PartialEq for LdapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.dn == other.dn && self.cn == other.cn && self.object_classes == other.object_classes
    }
}

impl Eq for LdapEntry {}

impl PartialOrd for LdapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LdapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dn
            .cmp(&other.dn)
            .then_with(|| self.cn.cmp(&other.cn))
            .then_with(|| self.object_classes.cmp(&other.object_classes))
    }
}
