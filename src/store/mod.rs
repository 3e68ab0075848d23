pub mod account_store;
pub mod comic_store;
