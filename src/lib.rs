pub mod analytics;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
