pub mod callstack;
pub mod classify;
pub mod commands;
pub mod convert;
pub mod error;
pub mod model;
pub mod simulate;
pub mod snapshot;
pub mod writer;

pub use callstack::format_callstack;
pub use convert::convert;
pub use error::ConvertError;

pub mod cmd {
    pub use super::commands::Cli;
}
