pub mod ai;
pub mod app;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod keywords;
pub mod pipeline;
pub mod server;
