pub mod cli;
pub mod clock;
pub mod config;
pub mod db;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod session;
pub mod template;

pub use clock::Clock;
pub use config::Config;
pub use routes::{AppState, router};
