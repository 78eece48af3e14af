use lpa_directory::{escape_filter_value, Filter};
use lpa_types::{Dn, Entry};
use pretty_assertions::assert_eq;

fn business() -> Entry {
    Entry::new(Dn::parse("o=Hair Styles By Jane,ou=businesses,dc=example,dc=com").unwrap())
        .with("objectClass", ["top", "organization"])
        .with("o", ["Hair Styles By Jane"])
        .with("businessCategory", ["Hair Salons"])
        .with("employeeCount", ["12"])
}

fn matches(filter: &str) -> bool {
    Filter::parse(filter).unwrap().matches(&business())
}

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parse_equality() {
    assert_eq!(
        Filter::parse("(cn=Bob)").unwrap(),
        Filter::equal("cn", "Bob")
    );
}

#[test]
fn outer_parentheses_are_optional() {
    assert_eq!(
        Filter::parse("o=*Hair*").unwrap(),
        Filter::parse("(o=*Hair*)").unwrap()
    );
}

#[test]
fn parse_presence_and_substring() {
    assert_eq!(
        Filter::parse("(mail=*)").unwrap(),
        Filter::Present { attr: "mail".into() }
    );
    assert_eq!(
        Filter::parse("(cn=ab*cd*ef)").unwrap(),
        Filter::Substring {
            attr: "cn".into(),
            initial: Some("ab".into()),
            any: vec!["cd".into()],
            last: Some("ef".into()),
        }
    );
}

#[test]
fn parse_nested_boolean() {
    let filter = Filter::parse("(&(objectClass=organization)(|(l=Calgary)(!(l=Edmonton))))").unwrap();
    match filter {
        Filter::And(parts) => {
            assert_eq!(parts.len(), 2);
            assert!(matches!(&parts[1], Filter::Or(inner) if inner.len() == 2));
        }
        other => panic!("expected And, got {other:?}"),
    }
}

#[test]
fn parse_hex_escapes() {
    assert_eq!(
        Filter::parse("(cn=a\\2ab\\28c\\29)").unwrap(),
        Filter::equal("cn", "a*b(c)")
    );
}

#[test]
fn parse_errors() {
    for bad in ["", "(cn=a", "(&)", "(cn)", "(cn=a)(x=y)", "(cn=\\zz)", "(=a)"] {
        assert!(Filter::parse(bad).is_err(), "{bad:?} should not parse");
    }
}

// ── Evaluation ───────────────────────────────────────────────────

#[test]
fn equality_ignores_case() {
    assert!(matches("(o=hair styles by jane)"));
    assert!(!matches("(o=Hair Styles)"));
}

#[test]
fn substring_matching() {
    assert!(matches("o=*Hair*"));
    assert!(matches("(o=hair*)"));
    assert!(matches("(o=*jane)"));
    assert!(matches("(o=H*S*J*)"));
    assert!(!matches("(o=*Barber*)"));
    assert!(!matches("(o=Styles*)"));
}

#[test]
fn presence_matching() {
    assert!(matches("(businessCategory=*)"));
    assert!(!matches("(telephoneNumber=*)"));
}

#[test]
fn boolean_combinations() {
    assert!(matches("(&(objectClass=organization)(businessCategory=Hair Salons))"));
    assert!(!matches("(&(objectClass=organization)(businessCategory=Manufacturing))"));
    assert!(matches("(|(businessCategory=Manufacturing)(businessCategory=Hair Salons))"));
    assert!(matches("(!(objectClass=person))"));
}

#[test]
fn ordering_compares_numbers_numerically() {
    assert!(matches("(employeeCount>=9)"));
    assert!(matches("(employeeCount<=12)"));
    assert!(!matches("(employeeCount>=100)"));
}

#[test]
fn approx_ignores_whitespace() {
    assert!(matches("(o~=hairstyles byjane)"));
}

// ── Rendering ────────────────────────────────────────────────────

#[test]
fn display_reparses_to_same_filter() {
    let text = "(&(objectClass=organization)(o=*Hair*)(!(l=a\\2ab)))";
    let filter = Filter::parse(text).unwrap();
    assert_eq!(filter.to_string(), text);
    assert_eq!(Filter::parse(&filter.to_string()).unwrap(), filter);
}

#[test]
fn escape_filter_value_escapes_specials() {
    assert_eq!(escape_filter_value("a*(b)\\"), "a\\2a\\28b\\29\\5c");
}
