mod error;
mod handlers;
mod routes;

pub use error::AppError;
pub use routes::{login_routes, AppState};
