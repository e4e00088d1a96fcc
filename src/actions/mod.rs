pub mod login;

pub use login::{LoginGate, LoginResponse};
