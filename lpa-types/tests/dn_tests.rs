use lpa_types::{escape_value, unescape_value, Dn, Error, Rdn};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::HashSet;

// ── Escaping ─────────────────────────────────────────────────────

#[test]
fn escape_plain_value_is_unchanged() {
    assert_eq!(escape_value("Hair Salons"), "Hair Salons");
}

#[test]
fn escape_specials_get_backslash() {
    assert_eq!(escape_value("Doe, John"), "Doe\\, John");
    assert_eq!(escape_value("a+b=c"), "a\\+b\\=c");
    assert_eq!(escape_value("<x>;\"y\"\\"), "\\<x\\>\\;\\\"y\\\"\\\\");
}

#[test]
fn escape_leading_hash_and_edge_spaces() {
    assert_eq!(escape_value("#1"), "\\#1");
    assert_eq!(escape_value("a#1"), "a#1");
    assert_eq!(escape_value(" padded "), "\\ padded\\ ");
}

#[test]
fn escape_nul_uses_hex_form() {
    assert_eq!(escape_value("a\0b"), "a\\00b");
}

#[test]
fn unescape_accepts_hex_pairs() {
    assert_eq!(unescape_value("Doe\\2C John").unwrap(), "Doe, John");
    assert_eq!(unescape_value("caf\\C3\\A9").unwrap(), "café");
}

#[test]
fn unescape_rejects_dangling_backslash() {
    assert!(matches!(
        unescape_value("abc\\"),
        Err(Error::InvalidEscape(_))
    ));
}

#[test]
fn unescape_rejects_unknown_escape() {
    assert!(unescape_value("a\\qb").is_err());
}

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parse_simple_dn() {
    let dn = Dn::parse("cn=Hair Salons,ou=bus-categories,dc=example,dc=com").unwrap();
    assert_eq!(dn.len(), 4);
    assert_eq!(dn.rdn().unwrap().attr_type(), "cn");
    assert_eq!(dn.rdn().unwrap().value(), "Hair Salons");
    assert_eq!(
        dn.to_string(),
        "cn=Hair Salons,ou=bus-categories,dc=example,dc=com"
    );
}

#[test]
fn parse_escaped_comma_stays_in_value() {
    let dn = Dn::parse("cn=Doe\\, John,dc=example,dc=com").unwrap();
    assert_eq!(dn.len(), 3);
    assert_eq!(dn.rdn().unwrap().value(), "Doe, John");
    assert_eq!(dn.to_string(), "cn=Doe\\, John,dc=example,dc=com");
}

#[test]
fn parse_tolerates_spaces_around_separators() {
    let dn = Dn::parse("cn = Bob , dc=example").unwrap();
    assert_eq!(dn.rdn().unwrap().attr_type(), "cn");
    assert_eq!(dn.rdn().unwrap().value(), "Bob");
    assert_eq!(dn.to_string(), "cn=Bob,dc=example");
}

#[test]
fn parse_keeps_escaped_trailing_space() {
    let dn = Dn::parse("cn=Bob\\ ,dc=example").unwrap();
    assert_eq!(dn.rdn().unwrap().value(), "Bob ");
}

#[test]
fn parse_multi_valued_rdn() {
    let dn = Dn::parse("cn=Bob+uid=bob,dc=example").unwrap();
    let rdn = dn.rdn().unwrap();
    assert_eq!(rdn.avas().len(), 2);
    assert_eq!(rdn.avas()[1].attr_type(), "uid");
    assert_eq!(rdn.to_string(), "cn=Bob+uid=bob");
}

#[test]
fn parse_empty_is_root() {
    let dn = Dn::parse("").unwrap();
    assert!(dn.is_root());
    assert_eq!(dn, Dn::root());
    assert_eq!(dn.to_string(), "");
}

#[test]
fn parse_rejects_component_without_equals() {
    let err = Dn::parse("cn=Bob,example").unwrap_err();
    assert!(matches!(err, Error::InvalidDn { .. }));
}

#[test]
fn parse_rejects_bad_attribute_type() {
    assert!(Dn::parse("c n=Bob").is_err());
    assert!(Dn::parse("=Bob").is_err());
}

// ── Equality & hierarchy ─────────────────────────────────────────

#[test]
fn equality_ignores_case_and_spacing() {
    let a = Dn::parse("CN=Hair Salons, OU=Bus-Categories,DC=Example,DC=com").unwrap();
    let b = Dn::parse("cn=hair salons,ou=bus-categories,dc=example,dc=com").unwrap();
    assert_eq!(a, b);

    let mut set = HashSet::new();
    set.insert(a);
    assert!(set.contains(&b));
}

#[test]
fn multi_valued_rdn_equality_ignores_order() {
    let a = Dn::parse("cn=Bob+uid=bob,dc=example").unwrap();
    let b = Dn::parse("uid=bob+cn=Bob,dc=example").unwrap();
    assert_eq!(a, b);
}

#[test]
fn parent_and_child() {
    let base = Dn::parse("ou=bus-categories,dc=example,dc=com").unwrap();
    let child = base.child(Rdn::new("cn", "Hair Salons"));
    assert_eq!(
        child.to_string(),
        "cn=Hair Salons,ou=bus-categories,dc=example,dc=com"
    );
    assert_eq!(child.parent().unwrap(), base);
    assert!(child.is_child_of(&base));
    assert!(child.is_descendant_of(&base));
    assert!(child.is_descendant_of(&child));
    assert!(!base.is_descendant_of(&child));
    assert!(Dn::root().parent().is_none());
}

#[test]
fn descendant_of_root() {
    let dn = Dn::parse("dc=example,dc=com").unwrap();
    assert!(dn.is_descendant_of(&Dn::root()));
    assert!(!dn.is_child_of(&Dn::root()));
}

#[test]
fn child_value_is_escaped_when_printed() {
    let dn = Dn::parse("dc=example").unwrap().child(Rdn::new("cn", "A, B"));
    assert_eq!(dn.to_string(), "cn=A\\, B,dc=example");
    assert_eq!(Dn::parse(&dn.to_string()).unwrap(), dn);
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn dn_serializes_as_string() {
    let dn = Dn::parse("cn=Bob,dc=example").unwrap();
    let json = serde_json::to_string(&dn).unwrap();
    assert_eq!(json, "\"cn=Bob,dc=example\"");
    let back: Dn = serde_json::from_str(&json).unwrap();
    assert_eq!(back, dn);
}

#[test]
fn dn_deserialize_rejects_garbage() {
    let result: Result<Dn, _> = serde_json::from_str("\"not a dn\"");
    assert!(result.is_err());
}

// ── Properties ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn escaped_value_survives_dn_parse(value in "[ -~éü]{0,40}") {
        let text = format!("cn={},dc=example", escape_value(&value));
        let dn = Dn::parse(&text).unwrap();
        prop_assert_eq!(dn.len(), 2);
        prop_assert_eq!(dn.rdn().unwrap().value(), value.as_str());
    }

    #[test]
    fn unescape_reverses_escape(value in "\\PC{0,40}") {
        prop_assert_eq!(unescape_value(&escape_value(&value)).unwrap(), value);
    }

    #[test]
    fn display_then_parse_is_identity(values in prop::collection::vec("[a-zA-Z0-9 ,+=#]{1,12}", 1..5)) {
        let dn = Dn::from_rdns(values.iter().map(|v| Rdn::new("ou", v.as_str())).collect());
        let reparsed = Dn::parse(&dn.to_string()).unwrap();
        prop_assert_eq!(reparsed, dn);
    }
}
