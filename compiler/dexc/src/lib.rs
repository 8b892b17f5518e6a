//! Dex compiler driver.
//!
//! Ties the phases together for the `dexc` binary: parse a module, resolve
//! it with compile-time evaluation through the interpreter, report
//! diagnostics, and hand resolved expressions to a [`backend::CodeGen`].

pub mod backend;
pub mod commands;
mod error;
pub mod logging;
mod mixin;
pub mod options;
pub mod session;

pub use error::CliError;
pub use mixin::ParserMixin;
pub use options::{parse_options, Options};
pub use session::Session;
