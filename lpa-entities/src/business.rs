use crate::labeled_uri::LabeledUri;
use crate::organization::Organization;
use lpa_mapping::{
    lens, DescriptorBuilder, DirectoryManager, LdapEntity, MappingResult, Modifiable,
    ModificationLog,
};
use lpa_types::{Dn, ModificationOp};

/// An organization that also carries the `tntbusiness` class: a contact
/// person, mail addresses and a web link.
#[derive(Debug, Default, Clone)]
pub struct Business {
    organization: Organization,
    business_contact: Option<String>,
    mail: Vec<String>,
    labeled_uri: Option<LabeledUri>,
}

impl LdapEntity for Business {
    fn describe(d: &mut DescriptorBuilder<Self>) {
        d.extends::<Organization>(lens!(Self, organization))
            .object_classes(&["tntbusiness"])
            .attribute("business_contact", "businessContact", lens!(Self, business_contact))
            .attribute("mail", "mail", lens!(Self, mail))
            .attribute("labeled_uri", "labeledURI", lens!(Self, labeled_uri));
    }
}

impl Modifiable for Business {
    fn modifications(&mut self) -> &mut ModificationLog {
        self.organization.modifications()
    }

    fn manager(&self) -> Option<DirectoryManager> {
        Modifiable::manager(&self.organization)
    }
}

impl Business {
    pub fn new(dn: Dn, name: impl Into<String>) -> Self {
        Self {
            organization: Organization::new(dn, name),
            ..Default::default()
        }
    }

    pub fn organization(&self) -> &Organization {
        &self.organization
    }

    pub fn organization_mut(&mut self) -> &mut Organization {
        &mut self.organization
    }

    pub fn dn(&self) -> &Dn {
        self.organization.dn()
    }

    pub fn business_contact(&self) -> Option<&str> {
        self.business_contact.as_deref()
    }

    /// The first mail address.
    pub fn mail(&self) -> Option<&str> {
        self.mail.first().map(String::as_str)
    }

    pub fn mail_addresses(&self) -> &[String] {
        &self.mail
    }

    pub fn labeled_uri(&self) -> Option<&LabeledUri> {
        self.labeled_uri.as_ref()
    }

    /// Link text for the web link: its label, else the organization name.
    pub fn link_label(&self) -> Option<&str> {
        let uri = self.labeled_uri.as_ref()?;
        Some(uri.label_or(self.organization.o().unwrap_or(&uri.uri)))
    }

    pub fn set_business_contact(&mut self, contact: &str, op: ModificationOp) -> MappingResult<()> {
        self.add_operation(op, "businessContact", contact)?;
        self.business_contact = match op {
            ModificationOp::Remove => None,
            ModificationOp::Add | ModificationOp::Replace => Some(contact.to_string()),
        };
        Ok(())
    }

    /// Queues `op` for one mail address.
    pub fn set_mail(&mut self, mail: &str, op: ModificationOp) -> MappingResult<()> {
        self.add_operation(op, "mail", mail)?;
        match op {
            ModificationOp::Add => {
                if !self.mail.iter().any(|m| m == mail) {
                    self.mail.push(mail.to_string());
                }
            }
            ModificationOp::Replace => self.mail = vec![mail.to_string()],
            ModificationOp::Remove => self.mail.retain(|m| m != mail),
        }
        Ok(())
    }

    pub fn set_labeled_uri(&mut self, uri: LabeledUri, op: ModificationOp) -> MappingResult<()> {
        self.add_operation(op, "labeledURI", uri.to_string())?;
        self.labeled_uri = match op {
            ModificationOp::Remove => None,
            ModificationOp::Add | ModificationOp::Replace => Some(uri),
        };
        Ok(())
    }
}
