//! Contacts: the recipient model and the directory seam over the host CRM.

mod contact;
mod directory;

pub mod errors;

pub use contact::{Contact, DeliveryTarget, MailFormat, SkipReason};
pub use directory::{ContactDirectory, RelationshipDirection};

/// Identifier of a contact record
pub type ContactId = i64;

/// Identifier of an email location type (home, work, billing, ...)
pub type LocationTypeId = i64;

/// Identifier of a relationship type
pub type RelationshipTypeId = i64;

/// Identifier of a case record
pub type CaseId = i64;

/// Identifier of a contribution record
pub type ContributionId = i64;
