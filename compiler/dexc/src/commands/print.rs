//! The `print` command: show a module after resolution.

use std::fmt::Write;

use dex_ir::{Item, Program};

use super::{read_file, report_or_exit};
use crate::{Options, Session};

pub fn print_file(path: &str, options: &Options) {
    let source = read_file(path);
    let session = Session::compile(path, &source, options);
    report_or_exit(&session, options);
    print!("{}", render_module(&session.program));
}

/// Globals and functions in source order, with every compile-time value
/// already substituted.
pub fn render_module(program: &Program) -> String {
    let mut out = String::new();
    for item in &program.items {
        match *item {
            Item::Var(var) => {
                let decl = program.decls.var(var);
                let keyword = if decl.is_manifest() { "enum " } else { "" };
                let _ = write!(out, "{keyword}{} {}", program.type_name(decl.ty), program.text(decl.name));
                if decl.init.is_valid() {
                    let _ = write!(out, " = {}", program.expr_to_string(decl.init));
                }
                out.push_str(";\n");
            }
            Item::Func(func) => {
                out.push_str(&program.func_to_string(func));
                out.push('\n');
            }
            Item::Agg(_) | Item::StaticAssert(_) | Item::Alias { .. } => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::render_module;
    use crate::{Options, Session};

    #[test]
    fn manifest_constants_show_their_values() {
        let session = Session::compile(
            "m.d",
            "int cube(int x) { return x * x * x; }
             enum big = cube(3);",
            &Options::default(),
        );
        assert!(!session.has_errors(), "{:#?}", session.diagnostics);
        let text = render_module(&session.program);
        assert!(text.contains("big = 27;"), "{text}");
        assert!(text.contains("cube"), "{text}");
    }
}
