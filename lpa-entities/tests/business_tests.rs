mod common;

use common::{dn, manager, ACME, PULP_MILL};
use lpa_directory::SearchRequest;
use lpa_entities::{Business, LabeledUri, Organization};
use lpa_mapping::{MappingError, Modifiable, SearchOrder};
use lpa_types::{AttributeValue, ModificationOp};
use pretty_assertions::assert_eq;

#[test]
fn plain_organization_is_not_a_business() {
    let (manager, _) = manager();
    let found: Option<Business> = manager.find(&dn(PULP_MILL)).unwrap();
    assert!(found.is_none());

    let err = manager.get::<Business>(&dn(PULP_MILL)).unwrap_err();
    assert!(matches!(
        err,
        MappingError::UnsupportedEntry { type_name: "Business", .. }
    ));

    // The same entry still loads as its parent type.
    let org: Option<Organization> = manager.find(&dn(PULP_MILL)).unwrap();
    assert!(org.is_some());
}

#[test]
fn business_maps_every_level() {
    let (manager, _) = manager();
    let acme: Business = manager.get(&dn(ACME)).unwrap();

    assert_eq!(acme.dn(), &dn(ACME));
    assert_eq!(acme.organization().o(), Some("Acme Widgets"));
    assert_eq!(acme.organization().locality(), Some("Arizona"));
    assert_eq!(
        acme.organization().business_category_names(),
        vec!["Manufacturing", "Retail"]
    );
    assert_eq!(acme.business_contact(), Some("Wile E. Coyote"));
    assert_eq!(acme.mail(), Some("sales@acme.example.com"));
    assert_eq!(acme.mail_addresses().len(), 2);
    assert_eq!(
        acme.labeled_uri(),
        Some(&LabeledUri::new("http://acme.example.com/", Some("Acme Online".into())))
    );
    assert_eq!(acme.link_label(), Some("Acme Online"));
}

#[test]
fn search_finds_only_businesses() {
    let (manager, _) = manager();
    let request = SearchRequest::new(dn("dc=example,dc=com"), "(o=*)");
    let businesses: Vec<Business> = manager.search(&request, SearchOrder::Directory).unwrap();
    assert_eq!(businesses.len(), 1);
    assert_eq!(businesses[0].organization().o(), Some("Acme Widgets"));
}

#[test]
fn adding_mail_is_flushed_and_refreshed() {
    let (manager, directory) = manager();
    let mut acme: Business = manager.get(&dn(ACME)).unwrap();

    acme.set_mail("info@acme.example.com", ModificationOp::Add)
        .unwrap();
    acme.set_business_contact("Road Runner", ModificationOp::Replace)
        .unwrap();
    acme.save().unwrap();

    assert_eq!(acme.mail_addresses().len(), 3);
    assert_eq!(acme.business_contact(), Some("Road Runner"));

    let stored = directory.entry(&dn(ACME)).unwrap();
    assert_eq!(
        stored.values("mail"),
        &[
            AttributeValue::from("sales@acme.example.com"),
            AttributeValue::from("support@acme.example.com"),
            AttributeValue::from("info@acme.example.com"),
        ]
    );
    assert_eq!(stored.values("businessContact"), &[AttributeValue::from("Road Runner")]);
}

#[test]
fn parent_setters_share_the_batch() {
    let (manager, directory) = manager();
    let mut acme: Business = manager.get(&dn(ACME)).unwrap();

    acme.organization_mut()
        .set_locality("Tucson", ModificationOp::Replace)
        .unwrap();
    acme.set_mail("support@acme.example.com", ModificationOp::Remove)
        .unwrap();
    assert_eq!(acme.modifications().len(), 2);

    acme.flush().unwrap();
    assert_eq!(directory.recorded_modifications().len(), 1);
    assert_eq!(acme.organization().locality(), Some("Tucson"));
    assert_eq!(acme.mail_addresses(), &["sales@acme.example.com".to_string()]);
}

#[test]
fn link_label_falls_back_to_the_name() {
    let mut business = Business::new(dn("o=Road Runner Inc.,ou=businesses,dc=example,dc=com"), "Road Runner Inc.");
    assert_eq!(business.link_label(), None);

    let uri: LabeledUri = "http://roadrunner.example.com/".parse().unwrap();
    business.set_labeled_uri(uri, ModificationOp::Add).unwrap();
    assert_eq!(business.link_label(), Some("Road Runner Inc."));
}

#[test]
fn bound_business_carries_both_classes() {
    let (manager, directory) = manager();
    let target = dn("o=Road Runner Inc.,ou=businesses,dc=example,dc=com");
    let mut business = Business::new(target.clone(), "Road Runner Inc.");
    business
        .set_labeled_uri(
            LabeledUri::new("http://roadrunner.example.com/", Some("Beep".into())),
            ModificationOp::Add,
        )
        .unwrap();
    business.set_mail("beep@example.com", ModificationOp::Add).unwrap();
    manager.bind(&business).unwrap();

    let stored = directory.entry(&target).unwrap();
    assert!(stored.has_object_classes("objectClass", &["organization", "tntbusiness"]));
    assert_eq!(
        stored.values("labeledURI"),
        &[AttributeValue::from("http://roadrunner.example.com/ Beep")]
    );

    let loaded: Business = manager.get(&target).unwrap();
    assert_eq!(loaded.mail(), Some("beep@example.com"));
}
