pub mod config;
pub mod identity;
pub mod response;
pub mod routes;
pub mod state;

mod handlers;

pub use config::{AppConfig, ConfigError};
pub use routes::routes;
pub use state::AppState;
