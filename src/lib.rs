pub mod api;
pub mod auth;
pub mod cases;
pub mod cli;
pub mod config;
pub mod documents;
pub mod error;
pub mod nav;
pub mod types;
