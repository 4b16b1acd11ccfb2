//! Outbound mail: address value objects and the transport seam.

pub mod email_addresses;
pub mod mailer;
