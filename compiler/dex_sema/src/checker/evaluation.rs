//! Hand-off to the compile-time evaluator.

use std::ops::ControlFlow;

use dex_fold::is_literal_tree;
use dex_diagnostic::ErrorGuaranteed;
use dex_ir::{apply, apply_stmt, ExprId, ExprKind, FuncId, Program, VarId};
use rustc_hash::FxHashSet;

use super::Resolver;

impl Resolver<'_> {
    /// Reduce a resolved expression to a literal tree.
    pub(crate) fn evaluate(&mut self, expr: ExprId) -> Result<ExprId, ErrorGuaranteed> {
        let span = self.program.arena.span(expr);
        if matches!(self.program.arena.kind(expr), ExprKind::Error)
            || self.program.types.is_error(self.program.arena.ty(expr))
        {
            return Err(self.error_guarantee(span));
        }
        if is_literal_tree(self.program, expr) {
            return Ok(expr);
        }
        self.prepare_for_evaluation(expr);

        let before = self.diags.error_count();
        let result = self.evaluator.evaluate(self.program, expr, self.diags);
        self.errors += self.diags.error_count().saturating_sub(before);
        result
    }

    /// Resolve every function body and global the evaluator may reach from
    /// `expr`, transitively.
    fn prepare_for_evaluation(&mut self, expr: ExprId) {
        let mut reach = Reachable::default();
        let _ = apply(self.program, expr, &mut |p: &Program, id| reach.collect(p, id));

        let mut seen: FxHashSet<FuncId> = FxHashSet::default();
        while let Some(func) = reach.funcs.pop() {
            if !seen.insert(func) {
                continue;
            }
            self.resolve_function(func);
            let decl = self.program.decls.func(func);
            if decl.body.is_valid() {
                let _ = apply_stmt(self.program, decl.body, &mut |p: &Program, id| reach.collect(p, id));
            }
            for &param in &decl.params {
                let init = self.program.decls.var(param).init;
                if init.is_valid() {
                    let _ = apply(self.program, init, &mut |p: &Program, id| reach.collect(p, id));
                }
            }
        }
        for var in reach.globals {
            self.resolve_global(var);
        }
    }
}

#[derive(Default)]
struct Reachable {
    funcs: Vec<FuncId>,
    globals: Vec<VarId>,
}

impl Reachable {
    fn collect(&mut self, program: &Program, id: ExprId) -> ControlFlow<()> {
        match program.arena.kind(id) {
            ExprKind::Func { func, .. } | ExprKind::DotFunc { func, .. } | ExprKind::FuncLiteral(func) => {
                self.funcs.push(func);
            }
            ExprKind::Var(var) | ExprKind::SymOff { var, .. } if program.decls.var(var).is_global() => {
                self.globals.push(var);
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }
}
