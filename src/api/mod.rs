//! HTTP surface for the login gate.

mod types;

pub use types::*;

pub mod axum;
