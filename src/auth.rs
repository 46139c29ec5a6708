//! Caller credentials and the redacting secret wrapper they carry.

pub mod credentials;
pub mod secret;

pub use credentials::*;
pub use secret::*;
