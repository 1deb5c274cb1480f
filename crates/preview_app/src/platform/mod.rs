pub mod app;
pub mod buffer;
pub mod config;
pub mod logging;
pub mod terminal;
