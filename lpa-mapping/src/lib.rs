//! Entity mapping engine for LPA.
//!
//! Binds typed entities to directory entries and back:
//! - [`LdapEntity`] types describe their bindings once through a
//!   [`DescriptorBuilder`]; parents are embedded and declared with `extends`
//! - [`DirectoryManager`] finds, searches, binds, updates and unbinds entities
//! - local and foreign aggregates nest entities inside entities; foreign ones
//!   are resolved through a [`DnTemplate`]
//! - a [`ModificationLog`] batches attribute changes into one modify call
//!
//! ```ignore
//! impl LdapEntity for Organization {
//!     fn describe(d: &mut DescriptorBuilder<Self>) {
//!         d.extends::<LdapEntry>(lens!(Self, entry))
//!             .object_classes(&["organization"])
//!             .attribute("telephone_number", "telephoneNumber", lens!(Self, telephone_number));
//!     }
//! }
//! ```

mod aggregate;
mod batch;
mod config;
mod descriptor;
mod error;
mod field;
mod lens;
mod manager;
mod template;
mod walker;

pub use aggregate::{AggregateField, AggregateShape, TypeHandler};
pub use batch::{Modifiable, ModificationLog};
pub use config::{CyclePolicy, HierarchyPolicy, MapperConfig};
pub use descriptor::{
    dn_accessor_name, Accessor, AccessorKind, BindingInfo, DescriptorBuilder, EntityDescriptor,
    EntityMarker, FieldBinding, LdapEntity, TypeLevel, ALL_ATTRIBUTES,
};
pub use error::{ConfigurationError, MappingError, MappingResult};
pub use field::{AttributeElement, AttributeField, FieldShape};
pub use lens::{ComposedLens, FieldLens, Lens};
pub use manager::{DirectoryManager, SearchOrder};
pub use template::{DnReference, DnTemplate, PLACEHOLDER};
