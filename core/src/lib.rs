//! Core components for signing AWS requests.
//!
//! This crate provides the foundational types and traits shared by the
//! aws4 signer. It keeps everything that is not specific to the SigV4
//! protocol itself out of the signer crate.
//!
//! ## Overview
//!
//! - **Context**: A container that holds the environment implementation used to source credentials
//! - **Traits**: Abstract interfaces for credential loading (`ProvideCredential`) and validation (`SigningCredential`)
//! - **Error**: The error type returned at the edges of the signer
//!
//! ## Example
//!
//! ```
//! use aws4_core::{Context, ProvideCredential, Result, SigningCredential};
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     key: String,
//!     secret: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.key.is_empty() && !self.secret.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyLoader;
//!
//! impl ProvideCredential for MyLoader {
//!     type Credential = MyCredential;
//!
//!     fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(Some(MyCredential {
//!             key: "my-access-key".to_string(),
//!             secret: "my-secret-key".to_string(),
//!         }))
//!     }
//! }
//!
//! let ctx = Context::new();
//! let cred = MyLoader.provide_credential(&ctx).unwrap().unwrap();
//! assert!(cred.is_valid());
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::Context;
pub use context::Env;
pub use context::NoopEnv;
pub use context::OsEnv;
pub use context::StaticEnv;

mod error;
pub use error::{Error, ErrorKind, Result};

mod api;
pub use api::{ProvideCredential, SigningCredential};
