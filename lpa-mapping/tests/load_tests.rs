mod common;

use common::{
    dn, manager, manager_with, skipping_cycles, Business, Category, Node, Org, OrgWithContact,
    Peer, Person,
};
use lpa_directory::{SearchRequest, SearchScope};
use lpa_mapping::{MapperConfig, MappingError, SearchOrder};
use lpa_types::{AttributeValue, Octets};
use pretty_assertions::assert_eq;

const PULP_MILL: &str = "o=Pulp Mill.,ou=businesses,dc=example,dc=com";
const HAIR: &str = "o=Hair Styles By Jane,ou=businesses,dc=example,dc=com";
const ACME: &str = "o=Acme Widgets,ou=businesses,dc=example,dc=com";
const JDOE: &str = "uid=jdoe,ou=people,dc=example,dc=com";

// ── Find ─────────────────────────────────────────────────────────

#[test]
fn find_maps_every_level() {
    let (manager, _) = manager();
    let org: Org = manager.find(&dn(PULP_MILL)).unwrap().unwrap();

    assert_eq!(org.node.dn, dn(PULP_MILL));
    assert_eq!(org.node.cn, "Pulp Mill.");
    assert_eq!(org.node.object_classes, vec!["top", "organization"]);
    assert_eq!(org.o, "Pulp Mill.");
    assert_eq!(org.telephone_number.as_deref(), Some("555-0100"));
    assert_eq!(org.locality, "Prince George");
}

#[test]
fn absent_attributes_keep_defaults() {
    let (manager, _) = manager();
    let org: Org = manager.find(&dn(HAIR)).unwrap().unwrap();
    assert_eq!(org.node.cn, "");
    assert_eq!(org.telephone_number, None);
}

#[test]
fn wildcard_receives_every_attribute() {
    let (manager, _) = manager();
    let org: Org = manager.find(&dn(PULP_MILL)).unwrap().unwrap();
    let names: Vec<&str> = org.node.all.names().collect();
    assert_eq!(
        names,
        vec!["businessCategory", "cn", "l", "o", "objectClass", "telephoneNumber"]
    );
    assert_eq!(org.node.all.first_text("L"), Some("Prince George"));
}

#[test]
fn manager_handle_is_injected() {
    let (manager, _) = manager();
    let org: Org = manager.find(&dn(PULP_MILL)).unwrap().unwrap();
    assert_eq!(org.node.manager.as_ref(), Some(&manager));
}

#[test]
fn missing_entry_is_none() {
    let (manager, _) = manager();
    let found: Option<Org> = manager
        .find(&dn("o=Nowhere,ou=businesses,dc=example,dc=com"))
        .unwrap();
    assert!(found.is_none());
}

#[test]
fn entry_without_required_class_is_none() {
    let (manager, _) = manager();
    let found: Option<Business> = manager.find(&dn(PULP_MILL)).unwrap();
    assert!(found.is_none());

    let acme: Business = manager.find(&dn(ACME)).unwrap().unwrap();
    assert_eq!(acme.contact, "Wile E.");
    assert_eq!(acme.org.o, "Acme Widgets");
    assert_eq!(acme.org.node.dn, dn(ACME));
}

#[test]
fn multi_valued_and_binary_fields() {
    let (manager, _) = manager();
    let person: Person = manager.find(&dn(JDOE)).unwrap().unwrap();
    assert_eq!(
        person.mail.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["jane@example.com", "jdoe@example.com"]
    );
    assert_eq!(
        person.photos,
        vec![Octets::from(vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10])]
    );
    assert_eq!(person.nickname, None);
}

#[test]
fn scalar_field_keeps_first_of_many_values() {
    let (manager, directory) = manager();
    directory
        .insert(
            lpa_types::Entry::new(dn("uid=twin,ou=people,dc=example,dc=com"))
                .with("objectClass", ["inetOrgPerson", "organizationalPerson", "person"])
                .with("cn", ["First", "Second"]),
        )
        .unwrap();
    let person: Person = manager
        .find(&dn("uid=twin,ou=people,dc=example,dc=com"))
        .unwrap()
        .unwrap();
    assert_eq!(person.cn, "First");
}

#[test]
fn binary_value_in_text_field_is_a_coercion_error() {
    let (manager, directory) = manager();
    directory
        .insert(
            lpa_types::Entry::new(dn("uid=raw,ou=people,dc=example,dc=com"))
                .with("objectClass", ["inetOrgPerson", "organizationalPerson", "person"])
                .with("uid", [AttributeValue::Binary(vec![0xff, 0xfe])]),
        )
        .unwrap();
    let err = manager
        .find::<Person>(&dn("uid=raw,ou=people,dc=example,dc=com"))
        .unwrap_err();
    assert!(matches!(err, MappingError::Coercion { attribute, .. } if attribute == "uid"));
}

// ── Get ──────────────────────────────────────────────────────────

#[test]
fn get_reports_absence_as_errors() {
    let (manager, _) = manager();
    let err = manager
        .get::<Org>(&dn("o=Nowhere,dc=example,dc=com"))
        .unwrap_err();
    assert!(matches!(err, MappingError::NotFound(_)));

    let err = manager.get::<Business>(&dn(PULP_MILL)).unwrap_err();
    assert!(matches!(
        err,
        MappingError::UnsupportedEntry { type_name: "Business", .. }
    ));

    assert_eq!(manager.get::<Org>(&dn(PULP_MILL)).unwrap().o, "Pulp Mill.");
}

// ── Foreign aggregates ───────────────────────────────────────────

#[test]
fn categories_resolve_through_template() {
    let (manager, _) = manager();
    let org: Org = manager.find(&dn(PULP_MILL)).unwrap().unwrap();
    assert_eq!(
        org.categories,
        vec![Category {
            dn: dn("cn=Manufacturing,ou=bus-categories,dc=example,dc=com"),
            cn: "Manufacturing".into(),
        }]
    );
}

#[test]
fn unresolved_references_are_skipped() {
    let (manager, _) = manager();
    let org: Org = manager.find(&dn(HAIR)).unwrap().unwrap();
    let names: Vec<&str> = org.categories.iter().map(|c| c.cn.as_str()).collect();
    assert_eq!(names, vec!["Hair Salons"]);
}

#[test]
fn template_from_accessor_resolves_chain() {
    let (manager, _) = manager_with(MapperConfig::default().with_max_resolution_depth(3));
    let one: Peer = manager
        .find(&dn("cn=one,ou=peers,dc=example,dc=com"))
        .unwrap()
        .unwrap();
    assert_eq!(one.peers.len(), 1);
    assert_eq!(one.peers[0].cn, "two");
    assert_eq!(one.peers[0].peers[0].cn, "three");
    assert!(one.peers[0].peers[0].peers.is_empty());
}

#[test]
fn resolution_depth_is_limited() {
    let (manager, _) = manager_with(MapperConfig::default().with_max_resolution_depth(2));
    let err = manager
        .find::<Peer>(&dn("cn=one,ou=peers,dc=example,dc=com"))
        .unwrap_err();
    assert!(matches!(
        err,
        MappingError::ResolutionDepthExceeded { depth: 2, .. }
    ));
}

#[test]
fn reference_cycle_fails_by_default() {
    let (manager, _) = manager();
    let err = manager
        .find::<Peer>(&dn("cn=alpha,ou=peers,dc=example,dc=com"))
        .unwrap_err();
    assert!(matches!(
        err,
        MappingError::ReferenceCycle { type_name: "Peer", .. }
    ));
}

#[test]
fn reference_cycle_can_be_skipped() {
    let (manager, _) = manager_with(skipping_cycles());
    let alpha: Peer = manager
        .find(&dn("cn=alpha,ou=peers,dc=example,dc=com"))
        .unwrap()
        .unwrap();
    assert_eq!(alpha.peers.len(), 1);
    assert_eq!(alpha.peers[0].cn, "beta");
    assert!(alpha.peers[0].peers.is_empty());
}

// ── Local aggregates ─────────────────────────────────────────────

#[test]
fn local_aggregate_reads_the_same_entry() {
    let (manager, _) = manager();
    let org: OrgWithContact = manager.find(&dn(PULP_MILL)).unwrap().unwrap();
    assert_eq!(org.o, "Pulp Mill.");
    assert_eq!(org.contact.dn, dn(PULP_MILL));
    assert_eq!(org.contact.telephone_number, "555-0100");
    assert_eq!(org.contact.locality, "Prince George");
}

// ── Search ───────────────────────────────────────────────────────

#[test]
fn search_skips_entries_of_other_types() {
    let (manager, _) = manager();
    let request = SearchRequest::new(dn("dc=example,dc=com"), "(o=*)");
    let orgs: Vec<Org> = manager.search(&request, SearchOrder::Directory).unwrap();
    assert_eq!(orgs.len(), 3);

    let businesses: Vec<Business> = manager.search(&request, SearchOrder::Directory).unwrap();
    assert_eq!(businesses.len(), 1);
}

#[test]
fn search_sorts_by_key_with_missing_last() {
    let (manager, _) = manager();
    let request = SearchRequest::new(dn("ou=businesses,dc=example,dc=com"), "objectClass=organization")
        .scope(SearchScope::OneLevel);
    let orgs: Vec<Org> = manager
        .search(&request, SearchOrder::SortedBy("cn".into()))
        .unwrap();
    let names: Vec<&str> = orgs.iter().map(|o| o.o.as_str()).collect();
    assert_eq!(names[0], "Pulp Mill.");
    assert_eq!(orgs.len(), 3);

    let by_locality: Vec<Org> = manager
        .search(&request, SearchOrder::SortedBy("l".into()))
        .unwrap();
    let localities: Vec<&str> = by_locality.iter().map(|o| o.locality.as_str()).collect();
    assert_eq!(localities, vec!["Arizona", "Calgary", "Prince George"]);
}

#[test]
fn projected_search_still_sees_object_classes() {
    let (manager, _) = manager();
    let request = SearchRequest::new(dn("ou=businesses,dc=example,dc=com"), "(o=*)")
        .attributes(["o"]);
    let orgs: Vec<Org> = manager
        .search(&request, SearchOrder::SortedBy("o".into()))
        .unwrap();
    let names: Vec<&str> = orgs.iter().map(|o| o.o.as_str()).collect();
    assert_eq!(names, vec!["Acme Widgets", "Hair Styles By Jane", "Pulp Mill."]);
    assert_eq!(orgs[2].locality, "");
}

#[test]
fn search_under_missing_base_is_a_directory_error() {
    let (manager, _) = manager();
    let request = SearchRequest::new(dn("ou=nowhere,dc=example,dc=com"), "(o=*)");
    let err = manager
        .search::<Node>(&request, SearchOrder::Directory)
        .unwrap_err();
    assert!(matches!(err, MappingError::Directory(_)));
}

#[test]
fn load_maps_a_prefetched_entry() {
    let (manager, directory) = manager();
    let entry = directory.entry(&dn(JDOE)).unwrap();
    let person: Person = manager.load(&entry).unwrap().unwrap();
    assert_eq!(person.uid, "jdoe");
    assert!(manager.supports::<Person>(&entry).unwrap());
    assert!(!manager.supports::<Org>(&entry).unwrap());
}
