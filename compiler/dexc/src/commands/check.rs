//! The `check` command: resolve a file and report diagnostics.

use dex_ir::Item;

use super::{read_file, report_or_exit};
use crate::{Options, Session};

pub fn check_file(path: &str, options: &Options) {
    let source = read_file(path);
    let session = Session::compile(path, &source, options);
    report_or_exit(&session, options);

    let (mut functions, mut globals) = (0, 0);
    for item in &session.program.items {
        match item {
            Item::Func(_) => functions += 1,
            Item::Var(_) => globals += 1,
            Item::Agg(_) | Item::StaticAssert(_) | Item::Alias { .. } => {}
        }
    }
    println!("OK: {path} ({functions} functions, {globals} variables)");
}
