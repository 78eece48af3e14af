use lpa_mapping::{
    lens, DescriptorBuilder, DirectoryManager, LdapEntity, Modifiable, ModificationLog,
};
use lpa_types::{Dn, Octets};

/// An `inetOrgPerson` entry.
#[derive(Debug, Default, Clone)]
pub struct Person {
    dn: Dn,
    cn: String,
    sn: String,
    given_name: Option<String>,
    uid: Option<String>,
    display_name: Option<String>,
    mail: Vec<String>,
    telephone_number: Option<String>,
    jpeg_photo: Vec<Octets>,
    manager: Option<DirectoryManager>,
    pending: ModificationLog,
}

impl LdapEntity for Person {
    fn describe(d: &mut DescriptorBuilder<Self>) {
        d.object_classes(&["inetOrgPerson", "organizationalPerson", "person"])
            .manager("manager", lens!(Self, manager))
            .dn("dn", lens!(Self, dn))
            .attribute("cn", "cn", lens!(Self, cn))
            .attribute("sn", "sn", lens!(Self, sn))
            .attribute("given_name", "givenName", lens!(Self, given_name))
            .attribute("uid", "uid", lens!(Self, uid))
            .attribute("display_name", "displayName", lens!(Self, display_name))
            .attribute("mail", "mail", lens!(Self, mail))
            .attribute("telephone_number", "telephoneNumber", lens!(Self, telephone_number))
            .attribute("jpeg_photo", "jpegPhoto", lens!(Self, jpeg_photo))
            .accessor_dn("getDn", |person: &Self| person.dn.clone());
    }
}

impl Modifiable for Person {
    fn modifications(&mut self) -> &mut ModificationLog {
        &mut self.pending
    }

    fn manager(&self) -> Option<DirectoryManager> {
        self.manager.clone()
    }
}

impl Person {
    /// A new person; `cn` and `sn` are mandatory for the object class.
    pub fn new(dn: Dn, cn: impl Into<String>, sn: impl Into<String>) -> Self {
        Self {
            dn,
            cn: cn.into(),
            sn: sn.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_mail(mut self, mail: impl Into<String>) -> Self {
        self.mail.push(mail.into());
        self
    }

    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn dn(&self) -> &Dn {
        &self.dn
    }

    pub fn cn(&self) -> &str {
        &self.cn
    }

    pub fn sn(&self) -> &str {
        &self.sn
    }

    pub fn given_name(&self) -> Option<&str> {
        self.given_name.as_deref()
    }

    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    /// Display name, falling back to the common name.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.cn)
    }

    pub fn mail(&self) -> &[String] {
        &self.mail
    }

    pub fn telephone_number(&self) -> Option<&str> {
        self.telephone_number.as_deref()
    }

    pub fn jpeg_photo(&self) -> &[Octets] {
        &self.jpeg_photo
    }
}
