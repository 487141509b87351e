//! Forge API credential retrieval.
//!
//! Credentials come from a pair of environment variables, or failing that
//! from the `.netrc` entry for the configured host.

pub mod netrc;
pub mod resolve;

pub use resolve::{resolve_credentials, resolve_credentials_with, CredentialSource, Credentials};
