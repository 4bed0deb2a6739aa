//! Request handlers.

pub mod auth;
pub mod protected;
pub mod session;
