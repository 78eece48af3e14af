//! Error types for the mapping engine.

use lpa_directory::DirectoryError;
use lpa_types::ModificationOp;
use thiserror::Error;

/// Result type for mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;

/// A defect in how an entity type is declared. Fixing it means changing code,
/// not data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The most-derived type (or, under `EveryLevel`, an ancestor) lacks the entity marker.
    #[error("{type_name} is not marked as an LDAP entity")]
    NotAnEntity { type_name: &'static str },

    /// A DN field has no matching accessor.
    #[error("{type_name}: DN field `{field}` requires a public accessor `{accessor}`")]
    MissingDnAccessor {
        type_name: &'static str,
        field: &'static str,
        accessor: String,
    },

    #[error("{type_name}: DN accessor `{accessor}` must be public")]
    DnAccessorNotPublic {
        type_name: &'static str,
        accessor: String,
    },

    #[error("{type_name}: DN accessor `{accessor}` must return a distinguished name")]
    DnAccessorWrongType {
        type_name: &'static str,
        accessor: String,
    },

    /// A DN template without exactly one placeholder, or one that cannot form a DN.
    #[error("invalid DN template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("{type_name}: template accessor `{accessor}` does not exist")]
    MissingTemplateAccessor {
        type_name: &'static str,
        accessor: String,
    },

    #[error("{type_name}: template accessor `{accessor}` must return text")]
    TemplateAccessorWrongType {
        type_name: &'static str,
        accessor: String,
    },

    /// No level of the hierarchy declares a DN field.
    #[error("{type_name}: no level of the hierarchy sets the distinguished name")]
    DnNotSet { type_name: &'static str },

    #[error("{type_name} extends more than one parent type")]
    MultipleParents { type_name: &'static str },

    /// A field shape the engine cannot read or write for this binding.
    #[error("{type_name}: field `{field}` has a shape that cannot be written to a repeatable attribute")]
    UnsupportedShape {
        type_name: &'static str,
        field: &'static str,
    },
}

/// Errors that can occur while mapping entities.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// An attribute already has a pending operation of a different kind.
    #[error("attribute {attribute} already has a pending {pending} operation, cannot queue {requested}")]
    BatchConsistency {
        attribute: String,
        pending: ModificationOp,
        requested: ModificationOp,
    },

    /// `flush` was called with nothing pending.
    #[error("no pending modifications to flush")]
    EmptyBatch,

    /// A raw value could not be converted to or from a field.
    #[error("cannot convert attribute {attribute}: {reason}")]
    Coercion { attribute: String, reason: String },

    /// The entity has no distinguished name to write to.
    #[error("{type_name} has no distinguished name")]
    MissingDn { type_name: &'static str },

    /// The entry exists but is not of the requested kind.
    #[error("{dn} is not a {type_name}")]
    UnsupportedEntry { dn: String, type_name: &'static str },

    /// Entry not found.
    #[error("entry not found: {0}")]
    NotFound(String),

    /// A reference chain led back to an entry already being resolved.
    #[error("reference cycle: {type_name} at {dn} is already being resolved")]
    ReferenceCycle { type_name: &'static str, dn: String },

    #[error("aggregate resolution deeper than {depth} levels at {dn}")]
    ResolutionDepthExceeded { depth: usize, dn: String },

    /// The entity was not loaded through a manager and none was supplied.
    #[error("entity has no directory manager")]
    NoManager,

    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("invalid distinguished name: {0}")]
    InvalidDn(#[from] lpa_types::Error),
}

impl MappingError {
    pub(crate) fn coercion(attribute: &str, reason: impl Into<String>) -> Self {
        MappingError::Coercion {
            attribute: attribute.to_string(),
            reason: reason.into(),
        }
    }
}
