//! Base types and error handling.
//!
//! - [`cookieerror`]: configuration, record, persistence and parse errors.

pub mod cookieerror;
