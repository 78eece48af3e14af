use crate::entry::LdapEntry;
use lpa_mapping::{
    lens, DescriptorBuilder, DirectoryManager, LdapEntity, MappingResult, Modifiable,
    ModificationLog,
};
use lpa_types::{Dn, ModificationOp};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// A group entry: member DNs plus the categories it belongs to.
#[derive(Debug, Default, Clone)]
pub struct Group {
    entry: LdapEntry,
    members: BTreeSet<String>,
    unique_members: BTreeSet<String>,
    business_categories: BTreeSet<String>,
}

impl LdapEntity for Group {
    fn describe(d: &mut DescriptorBuilder<Self>) {
        d.extends::<LdapEntry>(lens!(Self, entry))
            .entity()
            .attribute("members", "member", lens!(Self, members))
            .attribute("unique_members", "uniqueMember", lens!(Self, unique_members))
            .attribute(
                "business_categories",
                "businessCategory",
                lens!(Self, business_categories),
            );
    }
}

impl Modifiable for Group {
    fn modifications(&mut self) -> &mut ModificationLog {
        self.entry.modifications()
    }

    fn manager(&self) -> Option<DirectoryManager> {
        Modifiable::manager(&self.entry)
    }
}

impl Group {
    pub fn new(dn: Dn, cn: impl Into<String>) -> Self {
        Self {
            entry: LdapEntry::new(dn).with_cn(cn),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_members<S: Into<String>>(mut self, members: impl IntoIterator<Item = S>) -> Self {
        self.members = members.into_iter().map(Into::into).collect();
        self
    }

    pub fn entry(&self) -> &LdapEntry {
        &self.entry
    }

    pub fn dn(&self) -> &Dn {
        self.entry.dn()
    }

    pub fn cn(&self) -> &str {
        self.entry.cn()
    }

    /// Values of `member`, as DN strings.
    pub fn members(&self) -> &BTreeSet<String> {
        &self.members
    }

    pub fn unique_members(&self) -> &BTreeSet<String> {
        &self.unique_members
    }

    pub fn business_categories(&self) -> &BTreeSet<String> {
        &self.business_categories
    }

    /// Loads every member entry and keys it by the first value of `key`.
    ///
    /// Members that are missing, have an unparsable DN or lack the key
    /// attribute are left out.
    pub fn member_entries(
        &self,
        manager: &DirectoryManager,
        key: &str,
    ) -> MappingResult<BTreeMap<String, LdapEntry>> {
        let mut entries = BTreeMap::new();
        for member in &self.members {
            let Ok(dn) = Dn::parse(member) else {
                debug!(group = %self.dn(), member = %member, "Skipping member with invalid DN");
                continue;
            };
            let Some(entry) = manager.find::<LdapEntry>(&dn)? else {
                debug!(group = %self.dn(), member = %member, "Member entry not found");
                continue;
            };
            match entry.string_value(key) {
                Some(value) => {
                    entries.insert(value.to_string(), entry);
                }
                None => debug!(member = %member, key, "Member has no key attribute"),
            }
        }
        Ok(entries)
    }

    /// Queues adding `member` to the group; takes effect on the next flush.
    pub fn add_member(&mut self, member: &LdapEntry) -> MappingResult<()> {
        self.add_operation(ModificationOp::Add, "member", member.dn().to_string())
    }

    /// Queues removing `member` from the group.
    pub fn remove_member(&mut self, member: &LdapEntry) -> MappingResult<()> {
        self.add_operation(ModificationOp::Remove, "member", member.dn().to_string())
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.entry == other.entry && self.members == other.members
    }
}

impl Eq for Group {}

impl PartialOrd for Group {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Group {
    fn cmp(&self, other: &Self) -> Ordering {
        self.entry
            .cmp(&other.entry)
            .then_with(|| self.members.cmp(&other.members))
    }
}
