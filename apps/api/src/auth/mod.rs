//! Accounts, credentials, and identity resolution.

pub mod handlers;
pub mod identity;
pub mod password;
pub mod principal;
pub mod token;
