//! Ready-made entity types for common directory object classes.
//!
//! Every type here is an ordinary [`LdapEntity`](lpa_mapping::LdapEntity):
//! load them with [`DirectoryManager::find`](lpa_mapping::DirectoryManager::find),
//! queue changes through [`Modifiable`](lpa_mapping::Modifiable), and embed
//! them in your own types with `extends`.
//!
//! | type | object classes |
//! |------|----------------|
//! | [`LdapEntry`] | any |
//! | [`Group`] | any, with `member`/`uniqueMember` |
//! | [`Organization`] | `organization` |
//! | [`Business`] | `organization` + `tntbusiness` |
//! | [`Person`] | `inetOrgPerson` |

mod aggregation;
mod business;
mod entry;
mod group;
mod labeled_uri;
mod organization;
mod person;

pub use aggregation::OrganizationWithUri;
pub use business::Business;
pub use entry::LdapEntry;
pub use group::Group;
pub use labeled_uri::{LabeledUri, LabeledUriError};
pub use organization::{Organization, BUSINESS_CATEGORY_TEMPLATE};
pub use person::Person;
