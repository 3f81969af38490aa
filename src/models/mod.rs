pub mod airline;
pub mod chapter;
pub mod contact;
pub mod content;
pub mod section;
pub mod session;
pub mod user;
