pub mod auth;
pub mod credentials;
pub mod report;
pub mod session;
pub mod token;
