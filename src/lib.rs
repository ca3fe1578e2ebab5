pub mod analysis;
pub mod analysis_error;
pub mod api;
pub mod app;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;
