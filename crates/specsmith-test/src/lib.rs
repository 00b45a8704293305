//! Test harnesses for specsmith.
//!
//! The `cli` module drives the built `specsmith` binary against the shared
//! fixtures in `tests/fixtures`.

#[cfg(test)]
pub mod cli;
