pub mod app;
pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod folders;
pub mod nutrition;
pub mod plans;
pub mod progress;
pub mod seed;
pub mod state;
pub mod store;
pub mod users;
