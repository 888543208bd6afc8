pub mod app;
pub mod commands;
pub mod form;
pub mod input;
pub mod render;

pub use app::{Cli, Commands};
