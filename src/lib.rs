// Core modules
pub mod ai;
pub mod api;
pub mod cli;
pub mod config;
pub mod languages;
pub mod review;
pub mod server;
pub mod tui;
