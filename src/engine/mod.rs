//! Engine: CLI surface, container format, source reading, progress and small helpers.

pub mod arg_parser;
pub mod cli;
pub mod container;
pub mod progress;
pub mod source;
pub mod tools;

pub use arg_parser::{Cli, Commands, ExtractArgs, PackArgs, ParseArgs};
pub use cli::handle_run;
pub use container::{ContainerReader, ContainerWriter};
pub use source::{SourceBytes, read_source};
pub use tools::{cancel_requested, path_to_key};
