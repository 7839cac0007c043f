pub mod applications;
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod opportunities;
pub mod store;
pub mod utils;

pub use db::create_pool;
