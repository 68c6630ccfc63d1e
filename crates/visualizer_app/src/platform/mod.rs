mod app;
pub mod cli;
mod config;
mod history;
mod intake;
mod render;

pub use app::run_app;
