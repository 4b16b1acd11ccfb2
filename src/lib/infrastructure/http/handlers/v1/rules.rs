//! Rule action handlers

pub mod configure;
pub mod execute;
pub mod fetch;
