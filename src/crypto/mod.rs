//! Secret handling for vault-pdf-export
//!
//! Zeroizing containers for passwords and generation of the per-document
//! owner secret.

pub mod secret;
pub mod secure_memory;

pub use secret::generate_owner_secret;
pub use secure_memory::SecureString;
