// Command-line front end

mod app;
mod commands;
mod menu;
pub mod render;

pub use app::{with_spinner, CliApp};
pub use commands::{run_command, Cli, Command};
pub use menu::run_menu;
