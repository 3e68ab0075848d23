pub mod account;
pub mod comic;
pub mod error;
