//! Interpreter storage and call frames.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use dex_ir::{FuncId, Span, VarId};
use rustc_hash::FxHashMap;

use crate::value::Place;

/// Shared, mutable interpreter storage.
///
/// Array elements, struct fields, associative array entries and variable
/// slots all live in a `Storage`. Cloning one clones the handle, so two
/// values holding the same storage see each other's writes; that is how
/// slices alias their array and pointers alias their target.
///
/// Single-threaded: one evaluation owns its storage and drops it when it
/// returns.
#[repr(transparent)]
pub struct Storage<T>(Rc<RefCell<T>>);

impl<T> Storage<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        Storage(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Whether both handles refer to the same storage.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the storage, for visited sets.
    #[inline]
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl<T> Clone for Storage<T> {
    #[inline]
    fn clone(&self) -> Self {
        Storage(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Storage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(value) => f.debug_tuple("Storage").field(&*value).finish(),
            Err(_) => f.write_str("Storage(<borrowed>)"),
        }
    }
}

/// One interpreted call.
///
/// Declarations have unique ids, so a single map per call covers every
/// block of the body: an inner declaration never collides with an outer
/// one, and re-executing a declaration rebinds it to fresh storage.
#[derive(Debug)]
pub(crate) struct Frame {
    /// `None` for the top-level expression.
    pub func: Option<FuncId>,
    pub call_span: Span,
    /// Receiver of a member function or constructor.
    pub this: Option<Place>,
    /// The function returns by `ref`.
    pub ref_return: bool,
    bindings: FxHashMap<VarId, Place>,
}

impl Frame {
    pub fn root(span: Span) -> Self {
        Frame {
            func: None,
            call_span: span,
            this: None,
            ref_return: false,
            bindings: FxHashMap::default(),
        }
    }

    pub fn call(func: FuncId, call_span: Span, this: Option<Place>, ref_return: bool) -> Self {
        Frame {
            func: Some(func),
            call_span,
            this,
            ref_return,
            bindings: FxHashMap::default(),
        }
    }

    pub fn bind(&mut self, var: VarId, place: Place) {
        self.bindings.insert(var, place);
    }

    pub fn lookup(&self, var: VarId) -> Option<&Place> {
        self.bindings.get(&var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_storage() {
        let a = Storage::new(vec![1, 2, 3]);
        let b = a.clone();
        b.borrow_mut()[0] = 10;
        assert_eq!(a.borrow()[0], 10);
        assert!(a.ptr_eq(&b));
        assert_eq!(a.id(), b.id());
        assert!(!a.ptr_eq(&Storage::new(vec![10, 2, 3])));
    }
}
