pub mod redirect;
pub mod service;

pub use redirect::{LogRedirect, LoginRedirect};
pub use service::AuthService;
