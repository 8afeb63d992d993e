// src/lib.rs
pub mod analyzer;
pub mod api;
pub mod banner;
pub mod config;
pub mod errors;
pub mod image;
pub mod providers;
pub mod rate_limit;
