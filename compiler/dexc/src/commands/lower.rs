//! The `lower` command: run the text backend over a module.

use std::fmt::Write;

use super::{read_file, report_or_exit};
use crate::backend::{lower_module, Lowered, TextBackend};
use crate::{Options, Session};

pub fn lower_file(path: &str, options: &Options) {
    let source = read_file(path);
    let mut session = Session::compile(path, &source, options);
    report_or_exit(&session, options);
    let mut backend = TextBackend::new(options.ctfe);
    let lowered = lower_module(&mut session.program, &mut backend);
    print!("{}", render_lowered(&lowered));
}

pub fn render_lowered(lowered: &Lowered<TextBackend>) -> String {
    let mut out = String::new();
    for data in &lowered.globals {
        let _ = writeln!(out, ".data {}: {} = {}", data.symbol, data.ty, data.value);
    }
    for (name, fragments) in &lowered.functions {
        let _ = writeln!(out, "{name}:");
        for fragment in fragments {
            let _ = writeln!(out, "    {fragment}");
        }
    }
    out
}
