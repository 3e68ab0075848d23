pub mod auth;
pub mod comics;
