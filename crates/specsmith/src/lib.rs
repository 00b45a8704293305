//! specsmith command-line library.
//!
//! The command implementations live here so they can be unit tested; the
//! `specsmith` binary only parses arguments and dispatches.

pub mod commands;
pub mod io;

pub use io::CliError;
