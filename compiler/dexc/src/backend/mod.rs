//! The code-generation boundary.
//!
//! Resolved expressions leave the front end through [`CodeGen`]. A backend
//! returns its own fragment and static-data types; the driver only stores
//! them and never looks inside.

mod text;

pub use text::{StaticData, TextBackend};

use dex_ir::{ExprId, FuncId, Item, Program, StmtKind, VarId};

/// A code generator for resolved expressions.
pub trait CodeGen {
    /// Code computing an expression at run time.
    type Fragment;
    /// A compile-time-constant initializer.
    type StaticData;

    fn emit_expression(&mut self, program: &mut Program, expr: ExprId) -> Self::Fragment;

    /// The initial value of the global `var`.
    fn emit_static_init(&mut self, program: &mut Program, var: VarId) -> Self::StaticData;
}

/// What a backend produced for one module.
pub struct Lowered<C: CodeGen> {
    pub globals: Vec<C::StaticData>,
    /// Top-level expressions of each function body, in source order.
    pub functions: Vec<(String, Vec<C::Fragment>)>,
}

/// Hand every global initializer and every expression statement of the
/// module's functions to `backend`.
///
/// Manifest constants have no storage and are skipped.
pub fn lower_module<C: CodeGen>(program: &mut Program, backend: &mut C) -> Lowered<C> {
    let mut lowered = Lowered {
        globals: Vec::new(),
        functions: Vec::new(),
    };
    let items = program.items.clone();
    for item in items {
        match item {
            Item::Var(var) => {
                if !program.decls.var(var).is_manifest() {
                    lowered.globals.push(backend.emit_static_init(program, var));
                }
            }
            Item::Func(func) => {
                let exprs = body_expressions(program, func);
                if exprs.is_empty() {
                    continue;
                }
                let name = program.func_path(func);
                let fragments = exprs
                    .into_iter()
                    .map(|expr| backend.emit_expression(program, expr))
                    .collect();
                lowered.functions.push((name, fragments));
            }
            Item::Agg(_) | Item::StaticAssert(_) | Item::Alias { .. } => {}
        }
    }
    tracing::debug!(
        globals = lowered.globals.len(),
        functions = lowered.functions.len(),
        "module lowered"
    );
    lowered
}

/// Expression statements, local initializers and return values directly
/// inside the body of `func`.
fn body_expressions(program: &Program, func: FuncId) -> Vec<ExprId> {
    let body = program.decls.func(func).body;
    if !body.is_valid() {
        return Vec::new();
    }
    let stmts = match program.arena.stmt(body).kind {
        StmtKind::Block(range) => program.arena.stmt_list(range).to_vec(),
        _ => vec![body],
    };
    stmts
        .into_iter()
        .filter_map(|stmt| match program.arena.stmt(stmt).kind {
            StmtKind::Expr(expr) | StmtKind::Return(expr) => Some(expr),
            StmtKind::Decl(var) => Some(program.decls.var(var).init),
            _ => None,
        })
        .filter(|expr| expr.is_valid())
        .collect()
}
