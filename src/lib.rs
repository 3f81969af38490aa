pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod utils;
pub mod worker;

pub use http::AuthenticatedClient;
pub use state::AppState;
