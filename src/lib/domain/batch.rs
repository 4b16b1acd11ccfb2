//! Batch email sending: the request model and the orchestrating service.

mod outcome;
mod request;
mod service;

pub mod errors;

pub use outcome::{SendOutcome, SendReport};
pub use request::{sender_identity, SendEmailRequest, SenderIdentity};
pub use service::{BatchOptions, EmailBatchService, EmailBatchServiceImpl};
