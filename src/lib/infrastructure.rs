//! Infrastructure layer: Postgres, SMTP and HTTP adapters.

pub mod db;
pub mod email;
pub mod http;
