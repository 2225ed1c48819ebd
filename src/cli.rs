//! CLI domain: parse, route, help, output, retry and presentation only.
//! No generation logic; a single route table dispatches to the pipeline.

mod help;
mod output;
mod parse;
mod presentation;
mod retry;
mod route;

pub use help::command_name;
pub use output::{exit_code, map_error, CommandError};
pub use parse::{Cli, Commands, ConfigCommands, OutputFormat};
pub use retry::RetryPolicy;
pub use route::RunContext;
