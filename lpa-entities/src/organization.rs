use crate::entry::LdapEntry;
use crate::group::Group;
use lpa_mapping::{
    lens, DescriptorBuilder, DirectoryManager, DnReference, LdapEntity, MappingResult,
    Modifiable, ModificationLog, TypeHandler,
};
use lpa_types::{Dn, ModificationOp};
use std::collections::BTreeMap;

/// Where business category groups live. `?` is replaced by each
/// `businessCategory` value.
pub const BUSINESS_CATEGORY_TEMPLATE: &str = "cn=?,ou=bus-categories,dc=example,dc=com";

/// An `organization` entry with its postal details and the business category
/// groups it is filed under, keyed by category name.
#[derive(Debug, Default, Clone)]
pub struct Organization {
    entry: LdapEntry,
    o: Option<String>,
    telephone_number: Option<String>,
    facsimile_telephone_number: Option<String>,
    street: Option<String>,
    post_office_box: Option<String>,
    postal_address: Option<String>,
    postal_code: Option<String>,
    locality: Option<String>,
    business_categories: BTreeMap<String, Group>,
}

impl LdapEntity for Organization {
    fn describe(d: &mut DescriptorBuilder<Self>) {
        d.extends::<LdapEntry>(lens!(Self, entry))
            .object_classes(&["organization"])
            .attribute("o", "o", lens!(Self, o))
            .attribute("telephone_number", "telephoneNumber", lens!(Self, telephone_number))
            .attribute(
                "facsimile_telephone_number",
                "facsimileTelephoneNumber",
                lens!(Self, facsimile_telephone_number),
            )
            .attribute("street", "street", lens!(Self, street))
            .attribute("post_office_box", "postOfficeBox", lens!(Self, post_office_box))
            .attribute("postal_address", "postalAddress", lens!(Self, postal_address))
            .attribute("postal_code", "postalCode", lens!(Self, postal_code))
            .attribute("locality", "l", lens!(Self, locality))
            .foreign_aggregate_shaped::<Group, _>(
                "business_categories",
                "businessCategory",
                DnReference::accessor("getCategoryDn"),
                lens!(Self, business_categories),
            )
            .accessor_text("getCategoryDn", |_: &Self| {
                BUSINESS_CATEGORY_TEMPLATE.to_string()
            });
    }
}

impl TypeHandler<Group, BTreeMap<String, Group>> for Organization {
    fn shape(resolved: Vec<Group>) -> BTreeMap<String, Group> {
        resolved
            .into_iter()
            .map(|group| (group.cn().to_string(), group))
            .collect()
    }

    fn flatten(field: &BTreeMap<String, Group>) -> Vec<&Group> {
        field.values().collect()
    }
}

impl Modifiable for Organization {
    fn modifications(&mut self) -> &mut ModificationLog {
        self.entry.modifications()
    }

    fn manager(&self) -> Option<DirectoryManager> {
        Modifiable::manager(&self.entry)
    }
}

/// Queues `op` for `attribute` and mirrors it on the local field.
fn apply_to_field(
    log: &mut ModificationLog,
    field: &mut Option<String>,
    attribute: &str,
    value: &str,
    op: ModificationOp,
) -> MappingResult<()> {
    log.add_operation(op, attribute, value)?;
    *field = match op {
        ModificationOp::Remove => None,
        ModificationOp::Add | ModificationOp::Replace => Some(value.to_string()),
    };
    Ok(())
}

macro_rules! text_property {
    ($get:ident, $set:ident, $field:ident, $attr:literal) => {
        pub fn $get(&self) -> Option<&str> {
            self.$field.as_deref()
        }

        #[doc = concat!("Queues `op` on `", $attr, "` and updates the local value.")]
        pub fn $set(&mut self, value: &str, op: ModificationOp) -> MappingResult<()> {
            apply_to_field(self.entry.modifications(), &mut self.$field, $attr, value, op)
        }
    };
}

impl Organization {
    pub fn new(dn: Dn, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            entry: LdapEntry::new(dn).with_cn(name.clone()),
            o: Some(name),
            ..Default::default()
        }
    }

    pub fn entry(&self) -> &LdapEntry {
        &self.entry
    }

    pub fn dn(&self) -> &Dn {
        self.entry.dn()
    }

    text_property!(o, set_o, o, "o");
    text_property!(telephone_number, set_telephone_number, telephone_number, "telephoneNumber");
    text_property!(
        facsimile_telephone_number,
        set_facsimile_telephone_number,
        facsimile_telephone_number,
        "facsimileTelephoneNumber"
    );
    text_property!(street, set_street, street, "street");
    text_property!(post_office_box, set_post_office_box, post_office_box, "postOfficeBox");
    text_property!(postal_address, set_postal_address, postal_address, "postalAddress");
    text_property!(postal_code, set_postal_code, postal_code, "postalCode");
    text_property!(locality, set_locality, locality, "l");

    /// Category groups by name.
    pub fn business_categories(&self) -> &BTreeMap<String, Group> {
        &self.business_categories
    }

    pub fn business_category_names(&self) -> Vec<&str> {
        self.business_categories.keys().map(String::as_str).collect()
    }

    /// Queues replacing every `businessCategory` value with `categories`.
    /// The groups are re-resolved when the batch is flushed.
    pub fn set_business_categories(&mut self, categories: &[&str]) -> MappingResult<()> {
        let log = self.entry.modifications();
        if categories.is_empty() {
            return log.remove_attribute("businessCategory");
        }
        for category in categories {
            log.add_operation(ModificationOp::Replace, "businessCategory", *category)?;
        }
        Ok(())
    }

    /// Files the organization under an already loaded category group.
    pub fn insert_business_category(&mut self, group: Group) {
        self.business_categories
            .insert(group.cn().to_string(), group);
    }
}
