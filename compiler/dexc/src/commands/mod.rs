//! Command handlers for the `dexc` binary.
//!
//! Each handler reads its file, runs a [`Session`], prints diagnostics to
//! stderr and exits with status 1 when compilation failed.

mod check;
mod eval;
mod explain;
mod lower;
mod print;

pub use check::check_file;
pub use eval::eval_expression;
pub use explain::explain_error;
pub use lower::{lower_file, render_lowered};
pub use print::{print_file, render_module};

use crate::{Options, Session};

/// Read `path`, or print why it cannot be read and exit.
pub(crate) fn read_file(path: &str) -> String {
    match Session::read(path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

/// Print the session's diagnostics; exit if any of them is an error.
pub(crate) fn report_or_exit(session: &Session, options: &Options) {
    let mut emitter = session.stderr_emitter(options);
    session.report(&mut emitter);
    if session.has_errors() {
        std::process::exit(1);
    }
}
