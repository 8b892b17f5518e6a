//! Source text for expressions and statements.
//!
//! Output re-parses to the same tree: operands are parenthesized by
//! precedence, integer literals carry their type's suffix, floating
//! literals always contain a `.` or an exponent, and values with no
//! literal syntax (`int.min`, narrow integers, NaN) are spelled through
//! casts or type properties.

use std::fmt::Write;

use crate::decl::{FuncAttrs, FuncId, VarId};
use crate::expr::{ExprId, ExprKind, IsRelation, IsSpec};
use crate::operators::{AssignOp, BinaryOp};
use crate::stmt::{StmtId, StmtKind};
use crate::scalar::FloatKind;
use crate::ty::{IntKind, TypeId, TypeKind};
use crate::Program;

const PREC_COMMA: u8 = 0;
const PREC_ASSIGN: u8 = 1;
const PREC_COND: u8 = 2;
const PREC_OROR: u8 = 3;
const PREC_UNARY: u8 = 12;
const PREC_POSTFIX: u8 = 14;
const PREC_PRIMARY: u8 = 15;

struct Printer<'p> {
    program: &'p Program,
    out: String,
    indent: usize,
}

impl Printer<'_> {
    fn text(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn ty(&mut self, ty: TypeId) {
        let text = self.program.type_name(ty);
        self.out.push_str(&text);
    }

    fn var_name(&mut self, var: VarId) {
        let name = self.program.text(self.program.decls.var(var).name);
        self.out.push_str(name);
    }

    fn func_name(&mut self, func: FuncId) {
        let name = self.program.text(self.program.decls.func(func).name);
        self.out.push_str(name);
    }

    /// Binding strength of the printed form of `id`.
    fn precedence(&self, id: ExprId) -> u8 {
        let expr = self.program.arena.expr(id);
        if expr.parens {
            return PREC_PRIMARY;
        }
        match expr.kind {
            ExprKind::Comma { .. } | ExprKind::Declaration(_) => PREC_COMMA,
            ExprKind::Assign { .. } => PREC_ASSIGN,
            ExprKind::Cond { .. } => PREC_COND,
            ExprKind::Binary { op, .. } => op.precedence(),
            ExprKind::Int(v) => {
                let ty = expr.ty.unwrap_or(TypeId::INT);
                match self.program.types.base_kind(ty) {
                    TypeKind::Int(k) if k.is_signed() && (v as i64) < 0 && !is_int_min(*k, v) => PREC_UNARY,
                    TypeKind::Int(IntKind::Int | IntKind::Long | IntKind::Uint | IntKind::Ulong)
                    | TypeKind::Bool => PREC_PRIMARY,
                    TypeKind::Int(IntKind::Char) if printable_char(v) => PREC_PRIMARY,
                    _ => PREC_UNARY,
                }
            }
            ExprKind::Real(bits) => {
                let f = f64::from_bits(bits);
                if f.is_sign_negative() && !f.is_nan() {
                    PREC_UNARY
                } else if f.is_finite() {
                    PREC_PRIMARY
                } else {
                    PREC_POSTFIX
                }
            }
            ExprKind::AddrOf(_)
            | ExprKind::Deref(_)
            | ExprKind::Unary { .. }
            | ExprKind::PreIncDec { .. }
            | ExprKind::BoolCast(_)
            | ExprKind::Cast { .. }
            | ExprKind::Vector { .. }
            | ExprKind::Delete(_)
            | ExprKind::New { .. }
            | ExprKind::NewAnonClass { .. }
            | ExprKind::SymOff { .. } => PREC_UNARY,
            ExprKind::Slice { .. }
            | ExprKind::ArrayLength(_)
            | ExprKind::MultiIndex { .. }
            | ExprKind::Call { .. }
            | ExprKind::Index { .. }
            | ExprKind::DotId { .. }
            | ExprKind::DotVar { .. }
            | ExprKind::DotFunc { .. }
            | ExprKind::DotTemplate { .. }
            | ExprKind::Dot { .. }
            | ExprKind::PostIncDec { .. }
            | ExprKind::Remove { .. } => PREC_POSTFIX,
            _ => PREC_PRIMARY,
        }
    }

    /// Print `id`, parenthesized if it binds looser than `min`.
    fn operand(&mut self, id: ExprId, min: u8) {
        if self.precedence(id) < min {
            self.text("(");
            self.expr_inner(id);
            self.text(")");
        } else {
            self.expr_inner(id);
        }
    }

    /// Base of a postfix form. Numeric literals are wrapped so `1.length`
    /// does not lex as a float.
    fn postfix_base(&mut self, id: ExprId) {
        if self.program.arena.kind(id).is_scalar_literal() {
            self.text("(");
            self.expr_inner(id);
            self.text(")");
        } else {
            self.operand(id, PREC_POSTFIX);
        }
    }

    /// Prefix operator applied to `operand`; a space or parentheses keep
    /// `- -x` from lexing as `--x`.
    fn prefix(&mut self, symbol: &str, operand: ExprId) {
        self.text(symbol);
        let start = self.out.len();
        self.operand(operand, PREC_UNARY);
        let glued = symbol
            .chars()
            .last()
            .is_some_and(|c| self.out[start..].starts_with(c) && matches!(c, '-' | '+' | '&' | '*'));
        if glued {
            self.out.insert(start, ' ');
        }
    }

    fn list(&mut self, ids: &[ExprId]) {
        for (i, &e) in ids.iter().enumerate() {
            if i > 0 {
                self.text(", ");
            }
            self.operand(e, PREC_ASSIGN);
        }
    }

    fn expr(&mut self, id: ExprId) {
        if self.program.arena.expr(id).parens {
            self.text("(");
            self.expr_inner(id);
            self.text(")");
        } else {
            self.expr_inner(id);
        }
    }

    fn expr_inner(&mut self, id: ExprId) {
        if !id.is_valid() {
            self.text("__error");
            return;
        }
        let program = self.program;
        let arena = &program.arena;
        let ty = arena.expr(id).ty;
        match arena.kind(id) {
            ExprKind::Error => self.text("__error"),
            ExprKind::Int(v) => self.int(v, ty.unwrap_or(TypeId::INT)),
            ExprKind::Real(bits) => self.real(f64::from_bits(bits), ty.unwrap_or(TypeId::DOUBLE)),
            ExprKind::Complex { re, im } => {
                let ty = ty.unwrap_or(TypeId::CDOUBLE);
                let wrap = !matches!(program.types.base_kind(ty), TypeKind::Complex(FloatKind::Double));
                if wrap {
                    self.text("cast(");
                    self.ty(ty);
                    self.text(")");
                }
                self.text("(");
                self.real(f64::from_bits(re), TypeId::DOUBLE);
                self.text(" + ");
                let im = f64::from_bits(im);
                if im.is_finite() {
                    self.real(im, TypeId::DOUBLE);
                    self.text("i");
                } else {
                    self.real(im, TypeId::DOUBLE);
                    self.text(" * 1.0i");
                }
                self.text(")");
            }
            ExprKind::String { value, width, committed } => {
                self.string(program.text(value));
                if committed {
                    self.out.push(width.postfix());
                }
            }
            ExprKind::Null => self.text("null"),
            ExprKind::ArrayLiteral(elems) => {
                self.text("[");
                self.list(arena.list(elems));
                self.text("]");
            }
            ExprKind::AssocArrayLiteral { keys, values } => {
                self.text("[");
                for (i, (&k, &v)) in arena.list(keys).iter().zip(arena.list(values)).enumerate() {
                    if i > 0 {
                        self.text(", ");
                    }
                    self.operand(k, PREC_ASSIGN);
                    self.text(": ");
                    self.operand(v, PREC_ASSIGN);
                }
                self.text("]");
            }
            ExprKind::StructLiteral { agg, elements, .. } => {
                let decl = program.decls.agg(agg);
                self.text(program.text(decl.name));
                self.text("(");
                for (i, (&e, &field)) in arena.list(elements).iter().zip(&decl.fields).enumerate() {
                    if i > 0 {
                        self.text(", ");
                    }
                    if e.is_valid() {
                        self.operand(e, PREC_ASSIGN);
                    } else {
                        self.ty(program.decls.var(field).ty);
                        self.text(".init");
                    }
                }
                self.text(")");
            }
            ExprKind::Tuple { prelude, elements } => {
                if prelude.is_valid() {
                    self.text("(");
                    self.expr(prelude);
                    self.text(", ");
                }
                self.text("tuple(");
                self.list(arena.list(elements));
                self.text(")");
                if prelude.is_valid() {
                    self.text(")");
                }
            }
            ExprKind::Ident(name) => self.text(program.text(name)),
            ExprKind::Dollar => self.text("$"),
            ExprKind::Var(var) => self.var_name(var),
            ExprKind::Func { func, .. } => self.func_name(func),
            ExprKind::This => self.text("this"),
            ExprKind::Super => self.text("super"),
            ExprKind::SymOff { var, offset } => {
                if offset == 0 {
                    self.text("&");
                    self.var_name(var);
                } else {
                    self.text("cast(");
                    self.ty(ty.unwrap_or(TypeId::ERROR));
                    self.text(")(cast(ubyte*)&");
                    self.var_name(var);
                    let _ = write!(self.out, " + {offset}UL)");
                }
            }
            ExprKind::OverloadSet(set) => match program.decls.overloads(set).first() {
                Some(&func) => self.func_name(func),
                None => self.text("__error"),
            },
            ExprKind::FuncLiteral(func) => self.func_literal(func),
            ExprKind::TypeExpr(t) => self.ty(t),
            ExprKind::ScopeExpr(name) => self.text(program.text(name)),
            ExprKind::TemplateExpr(t) => self.text(program.text(program.decls.template(t).name)),
            ExprKind::AddrOf(e) => self.prefix("&", e),
            ExprKind::Deref(e) => self.prefix("*", e),
            ExprKind::Unary { op, operand } => self.prefix(op.as_symbol(), operand),
            ExprKind::PreIncDec { op, operand } => self.prefix(op.as_symbol(), operand),
            ExprKind::BoolCast(e) => {
                self.text("cast(bool) ");
                self.operand(e, PREC_UNARY);
            }
            ExprKind::Cast { operand, to } | ExprKind::Vector { operand, to } => {
                self.text("cast(");
                self.ty(to);
                self.text(") ");
                self.operand(operand, PREC_UNARY);
            }
            ExprKind::Slice { base, lower, upper } => {
                self.postfix_base(base);
                self.text("[");
                if lower.is_valid() {
                    self.expr(lower);
                    self.text(" .. ");
                    self.expr(upper);
                }
                self.text("]");
            }
            ExprKind::ArrayLength(e) => {
                self.postfix_base(e);
                self.text(".length");
            }
            ExprKind::MultiIndex { base, indices } => {
                self.postfix_base(base);
                self.text("[");
                self.list(arena.list(indices));
                self.text("]");
            }
            ExprKind::Call { callee, args } => {
                self.postfix_base(callee);
                self.text("(");
                self.list(arena.list(args));
                self.text(")");
            }
            ExprKind::Delete(e) => {
                self.text("delete ");
                self.operand(e, PREC_UNARY);
            }
            ExprKind::Mixin(e) => {
                self.text("mixin(");
                self.expr(e);
                self.text(")");
            }
            ExprKind::Import(e) => {
                self.text("import(");
                self.expr(e);
                self.text(")");
            }
            ExprKind::Assert { cond, msg } => {
                self.text("assert(");
                self.operand(cond, PREC_ASSIGN);
                if msg.is_valid() {
                    self.text(", ");
                    self.operand(msg, PREC_ASSIGN);
                }
                self.text(")");
            }
            ExprKind::DotId { base, member } => {
                self.postfix_base(base);
                self.text(".");
                self.text(program.text(member));
            }
            ExprKind::DotVar { base, var } => {
                self.postfix_base(base);
                self.text(".");
                self.var_name(var);
            }
            ExprKind::DotFunc { base, func } => {
                if base.is_valid() {
                    self.postfix_base(base);
                    self.text(".");
                }
                self.func_name(func);
            }
            ExprKind::DotTemplate { base, template } => {
                self.postfix_base(base);
                self.text(".");
                self.text(program.text(program.decls.template(template).name));
            }
            ExprKind::New { ty: new_ty, args } => {
                self.text("new ");
                self.ty(new_ty);
                self.text("(");
                self.list(arena.list(args));
                self.text(")");
            }
            ExprKind::NewAnonClass { agg, args } => {
                self.text("new class(");
                self.list(arena.list(args));
                self.text(") ");
                self.text(program.text(program.decls.agg(agg).name));
            }
            ExprKind::Binary { op, left, right } => {
                let p = op.precedence();
                let (lmin, rmin) = if op == BinaryOp::Pow { (p + 1, p) } else { (p, p + 1) };
                self.binary_operand(op, left, lmin);
                self.text(" ");
                self.text(op.as_symbol());
                self.text(" ");
                self.binary_operand(op, right, rmin);
            }
            ExprKind::Comma { left, right } => {
                self.operand(left, PREC_COMMA);
                self.text(", ");
                self.operand(right, PREC_ASSIGN);
            }
            ExprKind::Dot { left, right } => {
                self.postfix_base(left);
                self.text(".");
                self.operand(right, PREC_POSTFIX);
            }
            ExprKind::Index { base, index } => {
                self.postfix_base(base);
                self.text("[");
                self.expr(index);
                self.text("]");
            }
            ExprKind::Cond {
                cond,
                then_expr,
                else_expr,
            } => {
                self.operand(cond, PREC_OROR);
                self.text(" ? ");
                self.operand(then_expr, PREC_ASSIGN);
                self.text(" : ");
                self.operand(else_expr, PREC_COND);
            }
            ExprKind::Assign { op, target, value } => {
                self.operand(target, PREC_COND + 1);
                self.text(" ");
                self.text(if op == AssignOp::Construct { "=" } else { op.as_symbol() });
                self.text(" ");
                self.operand(value, PREC_ASSIGN);
            }
            ExprKind::PostIncDec { op, operand } => {
                self.postfix_base(operand);
                self.text(op.as_symbol());
            }
            ExprKind::Remove { aa, key } => {
                self.postfix_base(aa);
                self.text(".remove(");
                self.operand(key, PREC_ASSIGN);
                self.text(")");
            }
            ExprKind::DefaultInit(kind) => self.text(kind.as_keyword()),
            ExprKind::Typeid(e) => {
                self.text("typeid(");
                self.expr(e);
                self.text(")");
            }
            ExprKind::Traits { name, args } => {
                self.text("__traits(");
                self.text(program.text(name));
                for &a in arena.list(args) {
                    self.text(", ");
                    self.operand(a, PREC_ASSIGN);
                }
                self.text(")");
            }
            ExprKind::IsType {
                target,
                id: capture,
                relation,
                spec,
                params,
            } => {
                self.text("is(");
                self.ty(target);
                if !capture.is_empty() {
                    self.text(" ");
                    self.text(program.text(capture));
                }
                match relation {
                    IsRelation::Exists => {}
                    IsRelation::Converts => self.text(" : "),
                    IsRelation::Equals => self.text(" == "),
                }
                match spec {
                    IsSpec::None => {}
                    IsSpec::Type(t) => self.ty(t),
                    IsSpec::Struct => self.text("struct"),
                    IsSpec::Class => self.text("class"),
                    IsSpec::Function => self.text("function"),
                    IsSpec::Pointer => self.text("*"),
                }
                for &p in arena.list(params) {
                    self.text(", ");
                    self.expr(p);
                }
                self.text(")");
            }
            ExprKind::Declaration(var) => self.var_decl(var),
            ExprKind::Halt => self.text("assert(0)"),
        }
    }

    /// Comparisons nested under bitwise operators need parentheses in D.
    fn binary_operand(&mut self, parent: BinaryOp, id: ExprId, min: u8) {
        let child_is_compare = matches!(
            self.program.arena.kind(id),
            ExprKind::Binary { op, .. } if op.precedence() == 8
        ) && !self.program.arena.expr(id).parens;
        if child_is_compare && (parent.is_bitwise() || parent.precedence() == 8) {
            self.text("(");
            self.expr_inner(id);
            self.text(")");
        } else {
            self.operand(id, min);
        }
    }

    fn int(&mut self, v: u64, ty: TypeId) {
        let kind = self.program.types.base_kind(ty).clone();
        match kind {
            TypeKind::Bool => self.text(if v != 0 { "true" } else { "false" }),
            TypeKind::Int(IntKind::Int) => {
                let v = v as i64;
                if v == i64::from(i32::MIN) {
                    self.text("(-2147483647 - 1)");
                } else {
                    let _ = write!(self.out, "{v}");
                }
            }
            TypeKind::Int(IntKind::Long) => {
                let v = v as i64;
                if v == i64::MIN {
                    self.text("(-9223372036854775807L - 1)");
                } else {
                    let _ = write!(self.out, "{v}L");
                }
            }
            TypeKind::Int(IntKind::Uint) => {
                let _ = write!(self.out, "{v}u");
            }
            TypeKind::Int(IntKind::Ulong) => {
                let _ = write!(self.out, "{v}UL");
            }
            TypeKind::Int(IntKind::Char) if printable_char(v) => {
                let c = char::from(v as u8);
                match c {
                    '\'' => self.text("'\\''"),
                    '\\' => self.text("'\\\\'"),
                    _ => {
                        let _ = write!(self.out, "'{c}'");
                    }
                }
            }
            TypeKind::Int(k) => {
                self.text("cast(");
                self.ty(ty);
                self.text(") ");
                if k.is_signed() {
                    let _ = write!(self.out, "{}", v as i64);
                } else {
                    let _ = write!(self.out, "{v}");
                }
            }
            _ => {
                self.text("cast(");
                self.ty(ty);
                let _ = write!(self.out, ") {v}UL");
            }
        }
    }

    fn real(&mut self, f: f64, ty: TypeId) {
        let (suffix, type_name) = match self.program.types.base_kind(ty) {
            TypeKind::Float(FloatKind::Float) => ("f", "float"),
            TypeKind::Float(FloatKind::Real) => ("L", "real"),
            _ => ("", "double"),
        };
        if f.is_nan() {
            let _ = write!(self.out, "{type_name}.nan");
        } else if f.is_infinite() {
            let sign = if f < 0.0 { "-" } else { "" };
            let _ = write!(self.out, "{sign}{type_name}.infinity");
        } else if suffix == "f" {
            let _ = write!(self.out, "{:?}f", f as f32);
        } else {
            let _ = write!(self.out, "{f:?}{suffix}");
        }
    }

    fn string(&mut self, s: &str) {
        self.out.push('"');
        for c in s.chars() {
            match c {
                '"' => self.text("\\\""),
                '\\' => self.text("\\\\"),
                '\n' => self.text("\\n"),
                '\t' => self.text("\\t"),
                '\r' => self.text("\\r"),
                '\0' => self.text("\\0"),
                c if (c as u32) < 0x20 || c as u32 == 0x7F => {
                    let _ = write!(self.out, "\\x{:02X}", c as u32);
                }
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }

    fn var_decl(&mut self, var: VarId) {
        let decl = self.program.decls.var(var);
        if decl.is_manifest() {
            self.text("enum ");
        }
        self.ty(decl.ty);
        self.text(" ");
        self.var_name(var);
        if decl.init.is_valid() {
            self.text(" = ");
            self.operand(decl.init, PREC_ASSIGN);
        }
    }

    fn params(&mut self, func: FuncId) {
        let decl = self.program.decls.func(func);
        self.text("(");
        for (i, &p) in decl.params.iter().enumerate() {
            if i > 0 {
                self.text(", ");
            }
            if self.program.decls.var(p).is_ref() {
                self.text("ref ");
            }
            self.var_decl(p);
        }
        self.text(")");
    }

    fn func_literal(&mut self, func: FuncId) {
        let decl = self.program.decls.func(func);
        self.text("function ");
        self.ty(decl.ret);
        self.params(func);
        self.text(" ");
        self.stmt(decl.body);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    fn stmt(&mut self, id: StmtId) {
        if !id.is_valid() {
            self.text(";");
            return;
        }
        let program = self.program;
        match program.arena.stmt(id).kind {
            StmtKind::Empty => self.text(";"),
            StmtKind::Expr(e) => {
                self.expr(e);
                self.text(";");
            }
            StmtKind::Decl(var) => {
                self.var_decl(var);
                self.text(";");
            }
            StmtKind::Block(list) => {
                self.text("{");
                self.indent += 1;
                for &s in program.arena.stmt_list(list) {
                    self.newline();
                    self.stmt(s);
                }
                self.indent -= 1;
                self.newline();
                self.text("}");
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            }
            | StmtKind::StaticIf {
                cond,
                then_branch,
                else_branch,
            } => {
                if matches!(program.arena.stmt(id).kind, StmtKind::StaticIf { .. }) {
                    self.text("static ");
                }
                self.text("if (");
                self.expr(cond);
                self.text(") ");
                self.stmt(then_branch);
                if else_branch.is_valid() {
                    self.text(" else ");
                    self.stmt(else_branch);
                }
            }
            StmtKind::While { cond, body } => {
                self.text("while (");
                self.expr(cond);
                self.text(") ");
                self.stmt(body);
            }
            StmtKind::DoWhile { body, cond } => {
                self.text("do ");
                self.stmt(body);
                self.text(" while (");
                self.expr(cond);
                self.text(");");
            }
            StmtKind::For { init, cond, step, body } => {
                self.text("for (");
                if init.is_valid() {
                    self.stmt(init);
                } else {
                    self.text(";");
                }
                if cond.is_valid() {
                    self.text(" ");
                    self.expr(cond);
                }
                self.text(";");
                if step.is_valid() {
                    self.text(" ");
                    self.expr(step);
                }
                self.text(") ");
                self.stmt(body);
            }
            StmtKind::Foreach {
                key,
                value,
                aggregate,
                body,
            } => {
                self.text("foreach (");
                if key.is_valid() {
                    self.var_name(key);
                    self.text(", ");
                }
                self.var_name(value);
                self.text("; ");
                self.expr(aggregate);
                self.text(") ");
                self.stmt(body);
            }
            StmtKind::ForeachRange {
                var,
                lower,
                upper,
                body,
            } => {
                self.text("foreach (");
                self.var_name(var);
                self.text("; ");
                self.expr(lower);
                self.text(" .. ");
                self.expr(upper);
                self.text(") ");
                self.stmt(body);
            }
            StmtKind::Break(label) | StmtKind::Continue(label) => {
                let keyword = if matches!(program.arena.stmt(id).kind, StmtKind::Break(_)) {
                    "break"
                } else {
                    "continue"
                };
                self.text(keyword);
                if !label.is_empty() {
                    self.text(" ");
                    self.text(program.text(label));
                }
                self.text(";");
            }
            StmtKind::Goto(label) => {
                self.text("goto ");
                self.text(program.text(label));
                self.text(";");
            }
            StmtKind::Labeled { label, body } => {
                self.text(program.text(label));
                self.text(": ");
                self.stmt(body);
            }
            StmtKind::Return(e) => {
                self.text("return");
                if e.is_valid() {
                    self.text(" ");
                    self.expr(e);
                }
                self.text(";");
            }
            StmtKind::Throw(e) => {
                self.text("throw ");
                self.expr(e);
                self.text(";");
            }
            StmtKind::Switch { cond, cases } => {
                self.text("switch (");
                self.expr(cond);
                self.text(") {");
                for case in program.arena.cases(cases) {
                    self.newline();
                    if case.is_default {
                        self.text("default:");
                    } else {
                        self.text("case ");
                        self.list(program.arena.list(case.values));
                        self.text(":");
                    }
                    self.indent += 1;
                    for &s in program.arena.stmt_list(case.body) {
                        self.newline();
                        self.stmt(s);
                    }
                    self.indent -= 1;
                }
                self.newline();
                self.text("}");
            }
            StmtKind::StaticAssert { cond, msg } => {
                self.text("static assert(");
                self.expr(cond);
                if msg.is_valid() {
                    self.text(", ");
                    self.expr(msg);
                }
                self.text(");");
            }
        }
    }
}

fn is_int_min(kind: IntKind, v: u64) -> bool {
    match kind {
        IntKind::Int => v as i64 == i64::from(i32::MIN),
        IntKind::Long => v as i64 == i64::MIN,
        _ => false,
    }
}

fn printable_char(v: u64) -> bool {
    (0x20..0x7F).contains(&v)
}

impl Program {
    /// Source text of expression `id`.
    pub fn expr_to_string(&self, id: ExprId) -> String {
        let mut printer = Printer {
            program: self,
            out: String::new(),
            indent: 0,
        };
        printer.expr(id);
        printer.out
    }

    pub fn stmt_to_string(&self, id: StmtId) -> String {
        let mut printer = Printer {
            program: self,
            out: String::new(),
            indent: 0,
        };
        printer.stmt(id);
        printer.out
    }

    /// Full declaration of `func`, including attributes and body.
    pub fn func_to_string(&self, func: FuncId) -> String {
        let mut printer = Printer {
            program: self,
            out: String::new(),
            indent: 0,
        };
        let decl = self.decls.func(func);
        for (flag, word) in [
            (FuncAttrs::PURE, "pure "),
            (FuncAttrs::NOTHROW, "nothrow "),
            (FuncAttrs::SAFE, "@safe "),
            (FuncAttrs::TRUSTED, "@trusted "),
            (FuncAttrs::SYSTEM, "@system "),
            (FuncAttrs::DEPRECATED, "deprecated "),
            (FuncAttrs::REF_RETURN, "ref "),
        ] {
            if decl.attrs.contains(flag) {
                printer.text(word);
            }
        }
        if decl.is_ctor() {
            printer.text("this");
        } else {
            printer.ty(decl.ret);
            printer.text(" ");
            printer.func_name(func);
        }
        printer.params(func);
        if decl.has_body() {
            printer.text(" ");
            printer.stmt(decl.body);
        } else {
            printer.text(";");
        }
        printer.out
    }
}

#[cfg(test)]
mod tests;
