pub mod ads;
pub mod auth;
pub mod bidding;
pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod query;
pub mod store;
