mod policy;
mod store;
mod tracker;

pub use policy::AttemptPolicy;
pub use store::InMemoryAttemptStore;
pub use tracker::{AttemptState, AttemptTracker};
