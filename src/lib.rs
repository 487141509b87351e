//! Publish annotated release tags through a forge's Git data API.
//!
//! ```no_run
//! # async fn run() -> Result<(), forgetag::TagError> {
//! let config = forgetag::Config::default();
//! let creator = forgetag::TagCreator::from_config(&config)?;
//! let url = creator.create_tag("acme/widgets", "a1b2c3d", "v1.0.0").await?;
//! println!("{url}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod forge;
pub mod tag;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use credentials::Credentials;
pub use error::{ApiStep, TagError};
pub use tag::{TagCreator, TagRequest};
