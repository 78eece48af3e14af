//! Blocking LDAP connector backed by `ldap3`.

use crate::config::DirectoryConfig;
use crate::directory::{Directory, DirectorySession, SearchRequest, SearchScope};
use crate::error::{DirectoryError, DirectoryResult};
use ldap3::{LdapConn, LdapConnSettings, LdapError, LdapResult, Mod, Scope, SearchEntry, SearchResult};
use lpa_types::{AttributeSet, AttributeValue, Dn, Entry, Modification, ModificationOp};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

const SUCCESS: u32 = 0;
const NO_SUCH_OBJECT: u32 = 32;
const INVALID_CREDENTIALS: u32 = 49;
const ENTRY_ALREADY_EXISTS: u32 = 68;

/// Opens one authenticated `ldap3` connection per session.
#[derive(Debug, Clone)]
pub struct LdapDirectory {
    config: DirectoryConfig,
}

impl LdapDirectory {
    pub fn new(config: DirectoryConfig) -> DirectoryResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }
}

fn connection_error(context: &str, err: LdapError) -> DirectoryError {
    DirectoryError::Connection(format!("{context}: {err}"))
}

fn check(result: LdapResult, dn: &str) -> DirectoryResult<()> {
    match result.rc {
        SUCCESS => Ok(()),
        NO_SUCH_OBJECT => Err(DirectoryError::NoSuchEntry(dn.to_string())),
        ENTRY_ALREADY_EXISTS => Err(DirectoryError::EntryExists(dn.to_string())),
        code => Err(DirectoryError::Protocol {
            code,
            message: result.text,
        }),
    }
}

impl Directory for LdapDirectory {
    fn open(&self) -> DirectoryResult<Box<dyn DirectorySession>> {
        let url = self.config.url();
        debug!("Connecting to LDAP server {}", url);

        let settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(self.config.connect_timeout_secs))
            .set_starttls(self.config.use_starttls);
        let mut conn = LdapConn::with_settings(settings, &url)
            .map_err(|e| connection_error(&format!("failed to connect to {url}"), e))?;

        if let Some(bind_dn) = &self.config.bind_dn {
            let password = self.config.bind_password.as_deref().unwrap_or("");
            let result = conn
                .simple_bind(bind_dn, password)
                .map_err(|e| connection_error(&format!("bind failed for {bind_dn}"), e))?;
            match result.rc {
                SUCCESS => {}
                INVALID_CREDENTIALS => {
                    return Err(DirectoryError::Connection(format!(
                        "invalid credentials for {bind_dn}"
                    )));
                }
                code => {
                    return Err(DirectoryError::Protocol {
                        code,
                        message: result.text,
                    });
                }
            }
        }
        Ok(Box::new(LdapSession { conn }))
    }
}

struct LdapSession {
    conn: LdapConn,
}

fn to_entry(raw: SearchEntry) -> DirectoryResult<Entry> {
    let mut attributes = AttributeSet::new();
    for (name, values) in raw.attrs {
        for value in values {
            attributes.add_value(&name, value);
        }
    }
    for (name, values) in raw.bin_attrs {
        for value in values {
            attributes.add_value(&name, AttributeValue::Binary(value));
        }
    }
    Ok(Entry::with_attributes(Dn::parse(&raw.dn)?, attributes))
}

fn requested(attributes: &[String]) -> Vec<&str> {
    if attributes.is_empty() {
        vec!["*"]
    } else {
        attributes.iter().map(String::as_str).collect()
    }
}

fn value_set(values: &[AttributeValue]) -> HashSet<Vec<u8>> {
    values.iter().map(|v| v.as_bytes().to_vec()).collect()
}

impl LdapSession {
    fn run_search(
        &mut self,
        base: &str,
        scope: Scope,
        filter: &str,
        attributes: &[String],
    ) -> DirectoryResult<Option<Vec<Entry>>> {
        let SearchResult(raw, result) = self
            .conn
            .search(base, scope, filter, requested(attributes))
            .map_err(|e| connection_error("search failed", e))?;
        if result.rc == NO_SUCH_OBJECT {
            return Ok(None);
        }
        check(result, base)?;
        raw.into_iter()
            .map(|r| to_entry(SearchEntry::construct(r)))
            .collect::<DirectoryResult<Vec<_>>>()
            .map(Some)
    }
}

impl DirectorySession for LdapSession {
    fn lookup(&mut self, dn: &Dn, attributes: &[String]) -> DirectoryResult<Option<Entry>> {
        let found = self.run_search(&dn.to_string(), Scope::Base, "(objectClass=*)", attributes)?;
        Ok(found.and_then(|entries| entries.into_iter().next()))
    }

    fn search(&mut self, request: &SearchRequest) -> DirectoryResult<Vec<Entry>> {
        let scope = match request.scope {
            SearchScope::Base => Scope::Base,
            SearchScope::OneLevel => Scope::OneLevel,
            SearchScope::Subtree => Scope::Subtree,
        };
        let base = request.base.to_string();
        // An unparenthesised filter is accepted locally; the server needs the parentheses.
        let filter = if request.filter.trim_start().starts_with('(') {
            request.filter.clone()
        } else {
            format!("({})", request.filter.trim())
        };
        self.run_search(&base, scope, &filter, &request.attributes)?
            .ok_or(DirectoryError::NoSuchEntry(base))
    }

    fn modify(&mut self, dn: &Dn, modifications: &[Modification]) -> DirectoryResult<()> {
        let mods: Vec<Mod<Vec<u8>>> = modifications
            .iter()
            .map(|m| {
                let name = m.name().as_bytes().to_vec();
                let values = value_set(m.attribute.values());
                match m.op {
                    ModificationOp::Add => Mod::Add(name, values),
                    ModificationOp::Replace => Mod::Replace(name, values),
                    ModificationOp::Remove => Mod::Delete(name, values),
                }
            })
            .collect();
        let dn = dn.to_string();
        let result = self
            .conn
            .modify(&dn, mods)
            .map_err(|e| connection_error("modify failed", e))?;
        check(result, &dn)
    }

    fn add(&mut self, entry: &Entry) -> DirectoryResult<()> {
        let attrs: Vec<(Vec<u8>, HashSet<Vec<u8>>)> = entry
            .attributes
            .iter()
            .map(|a| (a.name().as_bytes().to_vec(), value_set(a.values())))
            .collect();
        let dn = entry.dn.to_string();
        let result = self
            .conn
            .add(&dn, attrs)
            .map_err(|e| connection_error("add failed", e))?;
        check(result, &dn)
    }

    fn delete(&mut self, dn: &Dn) -> DirectoryResult<()> {
        let dn = dn.to_string();
        let result = self
            .conn
            .delete(&dn)
            .map_err(|e| connection_error("delete failed", e))?;
        check(result, &dn)
    }

    fn close(mut self: Box<Self>) -> DirectoryResult<()> {
        self.conn
            .unbind()
            .map_err(|e| connection_error("unbind failed", e))
    }
}
