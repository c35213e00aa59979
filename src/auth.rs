//! Credential material, TLS client identity, and token payload models.

pub mod credential;
pub mod identity;
pub mod secret;
pub mod token;

pub use credential::*;
pub use identity::*;
pub use secret::*;
pub use token::*;
