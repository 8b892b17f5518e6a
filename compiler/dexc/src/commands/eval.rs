//! The `eval` command: evaluate an expression at compile time in the scope
//! of a module.

use super::{read_file, report_or_exit};
use crate::{Options, Session};

pub fn eval_expression(path: &str, expression: &str, options: &Options) {
    let source = read_file(path);
    let session = Session::evaluate(path, &source, expression, options);
    report_or_exit(&session, options);

    if let Some(value) = session.result {
        println!("{}", session.program.expr_to_string(value));
    }
}
