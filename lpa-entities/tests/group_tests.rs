mod common;

use common::{dn, manager, ACME, HAIR, MANUFACTURING, PULP_MILL, RETAIL};
use lpa_entities::{Group, LdapEntry};
use lpa_mapping::{MappingError, Modifiable};
use lpa_types::ModificationOp;
use pretty_assertions::assert_eq;

#[test]
fn members_are_loaded_as_dn_strings() {
    let (manager, _) = manager();
    let group: Group = manager.get(&dn(MANUFACTURING)).unwrap();

    assert_eq!(group.cn(), "Manufacturing");
    assert_eq!(
        group.members().iter().map(String::as_str).collect::<Vec<_>>(),
        vec![ACME, PULP_MILL]
    );
    assert!(group.unique_members().is_empty());
    assert!(group.entry().is_object_class("groupOfNames"));
}

#[test]
fn member_entries_are_keyed_by_attribute() {
    let (manager, _) = manager();
    let group: Group = manager.get(&dn(MANUFACTURING)).unwrap();

    let by_name = group.member_entries(&manager, "o").unwrap();
    assert_eq!(
        by_name.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["Acme Widgets", "Pulp Mill."]
    );
    assert_eq!(by_name["Pulp Mill."].dn(), &dn(PULP_MILL));
}

#[test]
fn missing_members_are_left_out() {
    let (manager, _) = manager();
    let group: Group = manager.get(&dn(RETAIL)).unwrap();
    assert_eq!(group.members().len(), 2);

    let entries = group.member_entries(&manager, "cn").unwrap();
    assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["Acme Widgets"]);
}

#[test]
fn add_member_is_sent_on_flush() {
    let (manager, directory) = manager();
    let mut group: Group = manager.get(&dn(MANUFACTURING)).unwrap();
    let salon: LdapEntry = manager.get(&dn(HAIR)).unwrap();

    group.add_member(&salon).unwrap();
    assert_eq!(group.members().len(), 2, "nothing changes before the flush");
    group.flush().unwrap();

    assert_eq!(group.members().len(), 3);
    assert!(group.members().contains(HAIR));

    let recorded = directory.recorded_modifications();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].dn, dn(MANUFACTURING));
    assert_eq!(recorded[0].modifications[0].op, ModificationOp::Add);
    assert_eq!(recorded[0].modifications[0].name(), "member");
}

#[test]
fn remove_member_is_sent_on_flush() {
    let (manager, _) = manager();
    let mut group: Group = manager.get(&dn(MANUFACTURING)).unwrap();
    let mill: LdapEntry = manager.get(&dn(PULP_MILL)).unwrap();

    group.remove_member(&mill).unwrap();
    group.flush().unwrap();

    assert_eq!(
        group.members().iter().map(String::as_str).collect::<Vec<_>>(),
        vec![ACME]
    );
}

#[test]
fn add_and_remove_cannot_share_a_batch() {
    let (manager, _) = manager();
    let mut group: Group = manager.get(&dn(MANUFACTURING)).unwrap();
    let mill: LdapEntry = manager.get(&dn(PULP_MILL)).unwrap();
    let salon: LdapEntry = manager.get(&dn(HAIR)).unwrap();

    group.add_member(&salon).unwrap();
    let err = group.remove_member(&mill).unwrap_err();
    assert!(matches!(
        err,
        MappingError::BatchConsistency {
            pending: ModificationOp::Add,
            requested: ModificationOp::Remove,
            ..
        }
    ));
}

#[test]
fn groups_order_by_dn() {
    let (manager, _) = manager();
    let retail: Group = manager.get(&dn(RETAIL)).unwrap();
    let manufacturing: Group = manager.get(&dn(MANUFACTURING)).unwrap();

    let mut groups = vec![retail.clone(), manufacturing.clone()];
    groups.sort();
    assert_eq!(groups[0].cn(), "Manufacturing");
    assert_eq!(manufacturing, manager.get::<Group>(&dn(MANUFACTURING)).unwrap());
    assert_ne!(retail, manufacturing);
}
