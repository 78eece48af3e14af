//! Shared entities and fixtures for mapping tests.

#![allow(dead_code)]

use lpa_directory::InMemoryDirectory;
use lpa_mapping::{
    lens, CyclePolicy, DescriptorBuilder, DirectoryManager, DnReference, LdapEntity,
    MapperConfig, Modifiable, ModificationLog,
};
use lpa_types::{AttributeSet, Dn, Octets};
use std::collections::BTreeSet;

pub const FIXTURE: &str = "\
dn: dc=example,dc=com
objectClass: top
objectClass: dcObject
dc: example

dn: ou=bus-categories,dc=example,dc=com
objectClass: organizationalUnit
ou: bus-categories

dn: cn=Manufacturing,ou=bus-categories,dc=example,dc=com
objectClass: groupOfUniqueNames
cn: Manufacturing

dn: cn=Hair Salons,ou=bus-categories,dc=example,dc=com
objectClass: groupOfUniqueNames
cn: Hair Salons

dn: ou=businesses,dc=example,dc=com
objectClass: organizationalUnit
ou: businesses

dn: o=Pulp Mill.,ou=businesses,dc=example,dc=com
objectClass: top
objectClass: organization
o: Pulp Mill.
cn: Pulp Mill.
businessCategory: Manufacturing
telephoneNumber: 555-0100
l: Prince George

dn: o=Hair Styles By Jane,ou=businesses,dc=example,dc=com
objectClass: top
objectClass: organization
o: Hair Styles By Jane
businessCategory: Hair Salons
businessCategory: Barbers
l: Calgary

dn: o=Acme Widgets,ou=businesses,dc=example,dc=com
objectClass: top
objectClass: organization
objectClass: tntbusiness
o: Acme Widgets
businessContact: Wile E.
l: Arizona

dn: ou=people,dc=example,dc=com
objectClass: organizationalUnit
ou: people

dn: uid=jdoe,ou=people,dc=example,dc=com
objectClass: top
objectClass: person
objectClass: organizationalPerson
objectClass: inetOrgPerson
uid: jdoe
cn: Jane Doe
sn: Doe
mail: jane@example.com
mail: jdoe@example.com
jpegPhoto:: /9j/4AAQ

dn: ou=peers,dc=example,dc=com
objectClass: organizationalUnit
ou: peers

dn: cn=alpha,ou=peers,dc=example,dc=com
objectClass: peer
cn: alpha
seeAlso: beta

dn: cn=beta,ou=peers,dc=example,dc=com
objectClass: peer
cn: beta
seeAlso: alpha

dn: cn=one,ou=peers,dc=example,dc=com
objectClass: peer
cn: one
seeAlso: two

dn: cn=two,ou=peers,dc=example,dc=com
objectClass: peer
cn: two
seeAlso: three

dn: cn=three,ou=peers,dc=example,dc=com
objectClass: peer
cn: three
";

pub const CATEGORY_TEMPLATE: &str = "cn=?,ou=bus-categories,dc=example,dc=com";

/// Installs a test-writer subscriber once; `RUST_LOG` controls the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn directory() -> InMemoryDirectory {
    init_tracing();
    InMemoryDirectory::from_ldif(FIXTURE).unwrap()
}

/// A manager over a fresh fixture directory, plus the directory for inspection.
pub fn manager() -> (DirectoryManager, InMemoryDirectory) {
    manager_with(MapperConfig::default())
}

pub fn manager_with(config: MapperConfig) -> (DirectoryManager, InMemoryDirectory) {
    let directory = directory();
    (
        DirectoryManager::with_config(directory.clone(), config),
        directory,
    )
}

pub fn skipping_cycles() -> MapperConfig {
    MapperConfig::default().with_cycle_policy(CyclePolicy::Skip)
}

pub fn dn(text: &str) -> Dn {
    Dn::parse(text).unwrap()
}

// ── Entities ─────────────────────────────────────────────────────

/// Root of the test hierarchy.
#[derive(Debug, Default)]
pub struct Node {
    pub dn: Dn,
    pub cn: String,
    pub object_classes: Vec<String>,
    pub all: AttributeSet,
    pub manager: Option<DirectoryManager>,
    pub pending: ModificationLog,
}

impl LdapEntity for Node {
    fn describe(d: &mut DescriptorBuilder<Self>) {
        d.object_classes(&["top"])
            .dn("dn", lens!(Self, dn))
            .attribute("cn", "cn", lens!(Self, cn))
            .attribute("object_classes", "objectClass", lens!(Self, object_classes))
            .all_attributes("all", lens!(Self, all))
            .manager("manager", lens!(Self, manager))
            .accessor_dn("getDn", |node: &Self| node.dn.clone());
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Category {
    pub dn: Dn,
    pub cn: String,
}

impl LdapEntity for Category {
    fn describe(d: &mut DescriptorBuilder<Self>) {
        d.object_classes(&["groupOfUniqueNames"])
            .dn("dn", lens!(Self, dn))
            .attribute("cn", "cn", lens!(Self, cn))
            .accessor_dn("getDn", |c: &Self| c.dn.clone());
    }
}

#[derive(Debug, Default)]
pub struct Org {
    pub node: Node,
    pub o: String,
    pub telephone_number: Option<String>,
    pub locality: String,
    pub categories: Vec<Category>,
}

impl LdapEntity for Org {
    fn describe(d: &mut DescriptorBuilder<Self>) {
        d.extends::<Node>(lens!(Self, node))
            .object_classes(&["organization"])
            .attribute("o", "o", lens!(Self, o))
            .attribute("telephone_number", "telephoneNumber", lens!(Self, telephone_number))
            .attribute("locality", "l", lens!(Self, locality))
            .foreign_aggregate::<Category, _>(
                "categories",
                "businessCategory",
                DnReference::literal(CATEGORY_TEMPLATE),
                lens!(Self, categories),
            );
    }
}

impl Modifiable for Org {
    fn modifications(&mut self) -> &mut ModificationLog {
        &mut self.node.pending
    }

    fn manager(&self) -> Option<DirectoryManager> {
        self.node.manager.clone()
    }
}

/// Requires an object class none of the plain organizations carry.
#[derive(Debug, Default)]
pub struct Business {
    pub org: Org,
    pub contact: String,
}

impl LdapEntity for Business {
    fn describe(d: &mut DescriptorBuilder<Self>) {
        d.extends::<Org>(lens!(Self, org))
            .object_classes(&["tntbusiness"])
            .attribute("contact", "businessContact", lens!(Self, contact));
    }
}

#[derive(Debug, Default)]
pub struct Person {
    pub dn: Dn,
    pub cn: String,
    pub uid: String,
    pub mail: BTreeSet<String>,
    pub photos: Vec<Octets>,
    pub nickname: Option<String>,
}

impl LdapEntity for Person {
    fn describe(d: &mut DescriptorBuilder<Self>) {
        d.object_classes(&["inetOrgPerson", "organizationalPerson", "person"])
            .dn("dn", lens!(Self, dn))
            .attribute("cn", "cn", lens!(Self, cn))
            .attribute("uid", "uid", lens!(Self, uid))
            .attribute("mail", "mail", lens!(Self, mail))
            .attribute("photos", "jpegPhoto", lens!(Self, photos))
            .attribute("nickname", "displayName", lens!(Self, nickname))
            .accessor_dn("getDn", |p: &Self| p.dn.clone());
    }
}

/// Peers point at each other through `seeAlso`.
#[derive(Debug, Default)]
pub struct Peer {
    pub dn: Dn,
    pub cn: String,
    pub peers: Vec<Peer>,
}

impl LdapEntity for Peer {
    fn describe(d: &mut DescriptorBuilder<Self>) {
        d.object_classes(&["peer"])
            .dn("dn", lens!(Self, dn))
            .attribute("cn", "cn", lens!(Self, cn))
            .foreign_aggregate::<Peer, _>(
                "peers",
                "seeAlso",
                DnReference::accessor("peerTemplate"),
                lens!(Self, peers),
            )
            .accessor_dn("getDn", |p: &Self| p.dn.clone())
            .accessor_text("peerTemplate", |_: &Self| {
                "cn=?,ou=peers,dc=example,dc=com".to_string()
            });
    }
}

/// Contact details mapped from the enclosing entry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Contact {
    pub dn: Dn,
    pub telephone_number: String,
    pub locality: String,
}

impl LdapEntity for Contact {
    fn describe(d: &mut DescriptorBuilder<Self>) {
        d.entity()
            .dn("dn", lens!(Self, dn))
            .attribute("telephone_number", "telephoneNumber", lens!(Self, telephone_number))
            .attribute("locality", "l", lens!(Self, locality))
            .accessor_dn("getDn", |c: &Self| c.dn.clone());
    }
}

#[derive(Debug, Default)]
pub struct OrgWithContact {
    pub dn: Dn,
    pub o: String,
    pub contact: Contact,
}

impl LdapEntity for OrgWithContact {
    fn describe(d: &mut DescriptorBuilder<Self>) {
        d.object_classes(&["organization"])
            .dn("dn", lens!(Self, dn))
            .attribute("o", "o", lens!(Self, o))
            .local_aggregate::<Contact, _>("contact", lens!(Self, contact))
            .accessor_dn("getDn", |o: &Self| o.dn.clone());
    }
}
