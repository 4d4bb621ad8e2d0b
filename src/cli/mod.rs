//! CLI module - command-line interface
//!
//! Terminal-facing pieces used by the `scribe` binary.

pub mod console;

pub use console::ConsoleChannel;
