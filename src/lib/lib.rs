#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Mailroom: templated batch-email delivery with mail-merge tokens and audit
//! activity records.

pub mod domain;
pub mod infrastructure;
