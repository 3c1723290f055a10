//! HTTP request handlers.

pub mod account_handler;

pub use account_handler::account_routes;
