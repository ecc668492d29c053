//! Command implementations

pub mod validate;
pub mod verify;
pub mod version;
