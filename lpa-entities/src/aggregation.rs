use crate::entry::LdapEntry;
use crate::labeled_uri::LabeledUri;
use crate::organization::Organization;
use lpa_mapping::{
    lens, DescriptorBuilder, DirectoryManager, LdapEntity, Modifiable, ModificationLog,
};
use lpa_types::Dn;

/// An organization entry viewed as a plain entry plus an embedded
/// [`Organization`] mapped from the same attributes, and its web link.
#[derive(Debug, Default, Clone)]
pub struct OrganizationWithUri {
    entry: LdapEntry,
    organization: Organization,
    labeled_uri: Option<LabeledUri>,
}

impl LdapEntity for OrganizationWithUri {
    fn describe(d: &mut DescriptorBuilder<Self>) {
        d.extends::<LdapEntry>(lens!(Self, entry))
            .object_classes(&["organization"])
            .local_aggregate::<Organization, _>("organization", lens!(Self, organization))
            .attribute("labeled_uri", "labeledURI", lens!(Self, labeled_uri));
    }
}

impl Modifiable for OrganizationWithUri {
    fn modifications(&mut self) -> &mut ModificationLog {
        self.entry.modifications()
    }

    fn manager(&self) -> Option<DirectoryManager> {
        Modifiable::manager(&self.entry)
    }
}

impl OrganizationWithUri {
    pub fn new(organization: Organization, labeled_uri: Option<LabeledUri>) -> Self {
        let entry = LdapEntry::new(organization.dn().clone())
            .with_cn(organization.entry().cn().to_string());
        Self {
            entry,
            organization,
            labeled_uri,
        }
    }

    pub fn entry(&self) -> &LdapEntry {
        &self.entry
    }

    pub fn dn(&self) -> &Dn {
        self.entry.dn()
    }

    pub fn organization(&self) -> &Organization {
        &self.organization
    }

    pub fn labeled_uri(&self) -> Option<&LabeledUri> {
        self.labeled_uri.as_ref()
    }
}
