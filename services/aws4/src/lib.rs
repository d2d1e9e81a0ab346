//! AWS Signature Version 4 request signer.
//!
//! This crate computes the `Authorization` header, or the presigned query
//! string, for a request to an AWS service. It never sends anything: the
//! signed request is handed back for some other component to deliver.
//!
//! ## Overview
//!
//! - Service and region are inferred from the hostname when not given, and the
//!   hostname is synthesized from them when missing.
//! - S3 keeps paths as given while every other service gets dot segments and
//!   duplicate slashes normalized before signing.
//! - Derived signing keys are kept in a bounded LRU cache shared by the process.
//!
//! ## Quick Start
//!
//! ```
//! use aws4::{Credential, RequestSigner, SigningRequest};
//!
//! let req = SigningRequest::new()
//!     .with_service("sqs")
//!     .with_region("us-west-2")
//!     .with_path("/?Action=ListQueues");
//!
//! let signer = RequestSigner::new(req, Credential::new("access_key_id", "secret_access_key"));
//! assert_eq!(signer.request().hostname.as_deref(), Some("sqs.us-west-2.amazonaws.com"));
//!
//! let signed = signer.sign();
//! let auth = signed.headers.get("Authorization").unwrap();
//! assert!(auth.contains("/us-west-2/sqs/aws4_request, SignedHeaders=host;x-amz-date, "));
//! ```
//!
//! ## Credential Sources
//!
//! Credentials are either passed in directly or loaded through a
//! [`ProvideCredential`](aws4_core::ProvideCredential) implementation:
//!
//! - [`StaticCredentialProvider`]: fixed keys
//! - [`ConfigCredentialProvider`]: keys held by a [`Config`]
//! - [`EnvCredentialProvider`]: `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`
//!   and `AWS_SESSION_TOKEN` read through the [`Context`](aws4_core::Context)
//!
//! ```bash
//! export AWS_ACCESS_KEY_ID=your-access-key-id
//! export AWS_SECRET_ACCESS_KEY=your-secret-access-key
//! export AWS_SESSION_TOKEN=your-session-token  # Optional
//! ```

mod constants;

mod lru;
pub use lru::LruCache;

mod key_cache;
pub use key_cache::generate_signing_key;
pub use key_cache::SigningKeyCache;

mod headers;
pub use headers::Headers;

mod endpoint;
pub use endpoint::{Endpoint, ServiceKind, UriPolicy};

mod canonical;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod request;
pub use request::SigningRequest;

mod sign_request;
pub use sign_request::{sign, RequestSigner};
