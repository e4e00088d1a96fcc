//! Repository traits and data types.
//!
//! Implement these traits to plug in your own storage backend.
//!
//! # Traits
//!
//! | Trait | Description |
//! |-------|-------------|
//! | [`AttemptStore`] | Failed-login counters, keyed by identifier |
//! | [`UserRepository`] | Credential lookup |
//! | [`TokenRepository`] | Token issuance and lookup |
//!
//! # Mock Implementations
//!
//! Enable the `mocks` feature for in-memory implementations useful for testing:
//!
//! - [`MockAttemptStore`]
//! - [`MockUserRepository`]
//! - [`MockTokenRepository`]

mod attempt;
mod token;
mod user;

#[cfg(any(test, feature = "mocks"))]
mod attempt_mock;
#[cfg(any(test, feature = "mocks"))]
mod token_mock;
#[cfg(any(test, feature = "mocks"))]
mod user_mock;

pub use attempt::AttemptRecord;
pub use attempt::AttemptStore;
pub use token::AccessToken;
pub use token::TokenRepository;
pub use user::AuthUser;
pub use user::UserRepository;

#[cfg(any(test, feature = "mocks"))]
pub use attempt_mock::MockAttemptStore;
#[cfg(any(test, feature = "mocks"))]
pub use token_mock::MockTokenRepository;
#[cfg(any(test, feature = "mocks"))]
pub use user_mock::MockUserRepository;
