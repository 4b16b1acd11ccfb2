//! Email addresses module.

mod email_address;

pub use email_address::{parse_address_list, EmailAddress, EmailAddressError};
