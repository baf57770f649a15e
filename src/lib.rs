pub mod config;
pub mod environment;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod tools;
