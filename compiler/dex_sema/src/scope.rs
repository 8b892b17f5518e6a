//! Lexical scopes over the module table.
//!
//! A [`ScopeChain`] is the innermost-first list of frames the resolver is
//! currently inside. Lookups walk it from the top, then fall back to the
//! module's globals. Every function body gets a fresh chain, so a function
//! literal never sees the locals of the function it is written in.

use dex_ir::{AggId, FuncId, Name, Program, Symbol, VarId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FrameKind {
    /// Parameters of the function being resolved.
    Function(FuncId),
    Block,
    /// Members of the aggregate a member function belongs to.
    Aggregate(AggId),
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    names: FxHashMap<Name, Symbol>,
}

/// A single thing a name can be bound to.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Binding {
    Symbol(Symbol),
    /// Field of the enclosing aggregate, accessed through `this`.
    Field(VarId),
    /// Method of the enclosing aggregate, called through `this`.
    Method(FuncId),
}

/// Result of a lookup: zero, one or several candidates.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Candidates {
    None,
    One(Binding),
    /// Several functions share the name; overload resolution picks one.
    /// `member` is set for methods of the enclosing aggregate.
    Many { funcs: SmallVec<[FuncId; 4]>, member: bool },
}

#[derive(Debug, Default)]
pub struct ScopeChain {
    frames: Vec<Frame>,
}

impl ScopeChain {
    pub fn new() -> Self {
        ScopeChain { frames: Vec::new() }
    }

    pub fn push(&mut self, kind: FrameKind) {
        self.frames.push(Frame {
            kind,
            names: FxHashMap::default(),
        });
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Bind `name` in the innermost frame. Shadowing a name declared
    /// anywhere in the same function is an error and returns the binding
    /// already in place.
    pub fn declare(&mut self, name: Name, sym: Symbol) -> Result<(), Symbol> {
        for frame in self.frames.iter().rev() {
            if let Some(&existing) = frame.names.get(&name) {
                return Err(existing);
            }
            if matches!(frame.kind, FrameKind::Function(_)) {
                break;
            }
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.names.insert(name, sym);
        }
        Ok(())
    }

    /// Innermost enclosing aggregate whose members are in scope.
    pub fn aggregate(&self) -> Option<AggId> {
        self.frames.iter().rev().find_map(|f| match f.kind {
            FrameKind::Aggregate(agg) => Some(agg),
            FrameKind::Function(_) | FrameKind::Block => None,
        })
    }

    pub fn lookup(&self, program: &Program, name: Name) -> Candidates {
        for frame in self.frames.iter().rev() {
            match frame.kind {
                FrameKind::Aggregate(agg) => {
                    if let Some(field) = program.decls.find_field(agg, name) {
                        return Candidates::One(Binding::Field(field));
                    }
                    let methods = program.decls.find_methods(agg, name);
                    match methods.as_slice() {
                        [] => {}
                        [one] => return Candidates::One(Binding::Method(*one)),
                        _ => {
                            return Candidates::Many {
                                funcs: methods.into_iter().collect(),
                                member: true,
                            }
                        }
                    }
                }
                FrameKind::Function(_) | FrameKind::Block => {
                    if let Some(&sym) = frame.names.get(&name) {
                        return Candidates::One(Binding::Symbol(sym));
                    }
                }
            }
        }
        match program.globals.get(&name) {
            None => Candidates::None,
            Some(&Symbol::Overloads(set)) => Candidates::Many {
                funcs: program.decls.overloads(set).iter().copied().collect(),
                member: false,
            },
            Some(&sym) => Candidates::One(Binding::Symbol(sym)),
        }
    }

    /// Names bound in the chain, innermost first.
    pub fn visible_names<'a>(&'a self, program: &'a Program) -> impl Iterator<Item = Name> + 'a {
        self.frames.iter().rev().flat_map(move |frame| {
            let members: Vec<Name> = match frame.kind {
                FrameKind::Aggregate(agg) => {
                    let decl = program.decls.agg(agg);
                    decl.fields
                        .iter()
                        .map(|&f| program.decls.var(f).name)
                        .chain(decl.methods.iter().map(|&f| program.decls.func(f).name))
                        .collect()
                }
                FrameKind::Function(_) | FrameKind::Block => Vec::new(),
            };
            frame.names.keys().copied().chain(members)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_ir::{Owner, Span, StorageClass, TypeId, VarDecl};
    use pretty_assertions::assert_eq;

    fn var(program: &mut Program, name: &str) -> (Name, VarId) {
        let name = program.intern(name);
        let id = program.decls.add_var(VarDecl {
            name,
            ty: TypeId::INT,
            init: dex_ir::ExprId::INVALID,
            storage: StorageClass::empty(),
            owner: Owner::Module,
            span: Span::DUMMY,
        });
        (name, id)
    }

    #[test]
    fn inner_frames_shadow_globals() {
        let mut program = Program::new("m", "m.d", "");
        let (x, global) = var(&mut program, "x");
        let _ = program.declare_global(x, Symbol::Var(global));
        let (_, local) = var(&mut program, "x");

        let mut scope = ScopeChain::new();
        scope.push(FrameKind::Block);
        assert_eq!(
            scope.lookup(&program, x),
            Candidates::One(Binding::Symbol(Symbol::Var(global)))
        );
        assert_eq!(scope.declare(x, Symbol::Var(local)), Ok(()));
        assert_eq!(scope.lookup(&program, x), Candidates::One(Binding::Symbol(Symbol::Var(local))));
        scope.pop();
        assert_eq!(
            scope.lookup(&program, x),
            Candidates::One(Binding::Symbol(Symbol::Var(global)))
        );
    }

    #[test]
    fn redeclaring_within_a_function_is_rejected() {
        let mut program = Program::new("m", "m.d", "");
        let (x, a) = var(&mut program, "x");
        let (_, b) = var(&mut program, "x");
        let mut scope = ScopeChain::new();
        scope.push(FrameKind::Function(FuncId::new(0)));
        scope.push(FrameKind::Block);
        assert_eq!(scope.declare(x, Symbol::Var(a)), Ok(()));
        scope.push(FrameKind::Block);
        assert_eq!(scope.declare(x, Symbol::Var(b)), Err(Symbol::Var(a)));
    }

    #[test]
    fn unknown_names_have_no_candidates() {
        let program = Program::new("m", "m.d", "");
        let scope = ScopeChain::new();
        assert_eq!(scope.lookup(&program, program.intern("nope")), Candidates::None);
    }
}
