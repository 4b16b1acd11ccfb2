//! Error types for activity recording

use thiserror::Error;

/// Errors that can occur when writing audit activities.
///
/// A failed audit write after a successful send is fatal to the whole
/// request; a sent-but-unrecorded email must not happen silently.
#[derive(Debug, Error)]
pub enum RecordActivityError {
    /// The activity row could not be written
    #[error("Could not record the email activity")]
    WriteFailed(#[source] anyhow::Error),

    /// The case link could not be written
    #[error("Could not file the email activity on case {case_id}")]
    CaseLinkFailed {
        /// The case the activity should have been filed on
        case_id: i64,

        /// The underlying failure
        #[source]
        source: anyhow::Error,
    },
}
