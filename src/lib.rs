pub mod amplitude;
pub mod app;
pub mod audio;
pub mod config;
pub mod driver;
pub mod logging;
pub mod render;
pub mod terminal;
pub mod visual;
