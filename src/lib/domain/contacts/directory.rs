//! Directory seam over the host CRM's contact and entity lookups.

use std::collections::HashMap;

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

use crate::domain::{
    activities::ActivityId,
    contacts::{
        errors::DirectoryError, CaseId, Contact, ContactId, ContributionId, LocationTypeId,
        RelationshipTypeId,
    },
};

/// Which side of a relationship the related contact sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationshipDirection {
    /// The trigger contact is "a", deliver to "b"
    AToB,

    /// The trigger contact is "b", deliver to "a"
    BToA,
}

impl RelationshipDirection {
    /// Parse the stored option label (`a_b` / `b_a`).
    pub fn from_option(option: &str) -> Option<Self> {
        match option {
            "a_b" => Some(Self::AToB),
            "b_a" => Some(Self::BToA),
            _ => None,
        }
    }

    /// The stored option label.
    pub fn as_option(&self) -> &'static str {
        match self {
            Self::AToB => "a_b",
            Self::BToA => "b_a",
        }
    }
}

/// Read-only lookups against the contact directory and its linked entities.
#[async_trait]
pub trait ContactDirectory: Send + Sync + 'static {
    /// Resolve a contact, choosing the email for `location_type` when given
    /// and the primary email otherwise.
    async fn contact_by_id(
        &self,
        id: ContactId,
        location_type: Option<LocationTypeId>,
    ) -> Result<Contact, DirectoryError>;

    /// Contacts related to `primary` through an active relationship of the
    /// given type, read in the given direction.
    async fn related_contacts(
        &self,
        primary: ContactId,
        relationship_type: RelationshipTypeId,
        direction: RelationshipDirection,
    ) -> Result<Vec<ContactId>, DirectoryError>;

    /// Flat attribute map for a case, used as case token context.
    async fn case_attributes(
        &self,
        id: CaseId,
    ) -> Result<HashMap<String, String>, DirectoryError>;

    /// Flat attribute map for a contribution, used as contribution token
    /// context.
    async fn contribution_attributes(
        &self,
        id: ContributionId,
    ) -> Result<HashMap<String, String>, DirectoryError>;

    /// Flat attribute map for an activity, used as activity token context.
    async fn activity_attributes(
        &self,
        id: ActivityId,
    ) -> Result<HashMap<String, String>, DirectoryError>;
}

#[cfg(test)]
mock! {
    pub ContactDirectory {}

    #[async_trait]
    impl ContactDirectory for ContactDirectory {
        async fn contact_by_id(
            &self,
            id: ContactId,
            location_type: Option<LocationTypeId>,
        ) -> Result<Contact, DirectoryError>;

        async fn related_contacts(
            &self,
            primary: ContactId,
            relationship_type: RelationshipTypeId,
            direction: RelationshipDirection,
        ) -> Result<Vec<ContactId>, DirectoryError>;

        async fn case_attributes(
            &self,
            id: CaseId,
        ) -> Result<HashMap<String, String>, DirectoryError>;

        async fn contribution_attributes(
            &self,
            id: ContributionId,
        ) -> Result<HashMap<String, String>, DirectoryError>;

        async fn activity_attributes(
            &self,
            id: ActivityId,
        ) -> Result<HashMap<String, String>, DirectoryError>;
    }
}
