//! HTTP and HTTPS server implementations.

pub mod http;
pub mod https;
