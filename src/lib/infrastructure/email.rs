//! Email transport adapters.

pub mod smtp;
