mod migrate;
mod schedule;
mod server;

pub use migrate::{migrate, reset, run_migrations};
pub use schedule::schedule;
pub use server::serve;
