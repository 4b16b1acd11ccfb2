//! Email sending handlers

pub mod send;
