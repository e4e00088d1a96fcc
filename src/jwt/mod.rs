//! JWT tokens as an alternative to opaque database-backed tokens.
//!
//! Enable with the `jwt` feature flag and hand a [`JwtTokenProvider`] to the
//! login gate in place of a stored-token repository.
//!
//! ```rust,ignore
//! use portcullis::actions::LoginGate;
//! use portcullis::jwt::{JwtConfig, JwtService, JwtTokenProvider};
//!
//! let service = JwtService::new(JwtConfig::new(secret)?.with_issuer("portcullis"));
//! let gate = LoginGate::new(verifier, JwtTokenProvider::new(service), store);
//! ```

mod claims;
mod config;
mod provider;
mod service;

pub use claims::JwtClaims;
pub use config::{JwtConfig, MIN_SECRET_LENGTH};
pub use provider::JwtTokenProvider;
pub use service::JwtService;
