//! Error types for directory lookups

use thiserror::Error;

use crate::domain::contacts::ContactId;

/// Errors that can occur when reading from the contact directory
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// No contact exists with the given id
    #[error("Contact {0} not found")]
    ContactNotFound(ContactId),

    /// A linked entity used for token context could not be found
    #[error("{entity} {id} not found")]
    EntityNotFound {
        /// The entity kind (case, contribution, activity)
        entity: &'static str,

        /// The entity identifier
        id: i64,
    },

    /// Unknown error
    #[error(transparent)]
    UnknownError(#[from] anyhow::Error),
}
