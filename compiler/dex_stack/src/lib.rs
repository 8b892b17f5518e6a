//! Stack growth for the recursive passes of the expression subsystem.
//!
//! Resolution, folding and compile-time evaluation all recurse over the
//! expression tree, and the interpreter additionally recurses once per
//! interpreted call. Expression nesting depth and CTFE call depth are both
//! user-controlled, so every recursive entry point wraps its body in
//! [`ensure_sufficient_stack`].
//!
//! # Platform Support
//!
//! - **Native targets**: grows the stack on demand through `stacker`.
//! - **WASM targets**: plain call, the runtime owns the stack.

/// Remaining stack below which a new segment is allocated (128KB).
///
/// The interpreter's frames are larger than a parser's, hence a slightly
/// wider red zone.
const RED_ZONE: usize = 128 * 1024;

/// Size of each freshly allocated stack segment (2MB).
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// ```text
/// fn interpret(&mut self, id: ExprId) -> CtfeResult<Value> {
///     ensure_sufficient_stack(|| self.interpret_inner(id))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version: call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Nested binary tree depth, the shape a left-leaning `a + b + c + ...` chain has.
    fn nested_sum(depth: u32) -> u64 {
        ensure_sufficient_stack(|| {
            if depth == 0 {
                1
            } else {
                nested_sum(depth - 1) + 1
            }
        })
    }

    #[test]
    fn test_shallow_nesting() {
        assert_eq!(nested_sum(16), 17);
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        assert_eq!(nested_sum(200_000), 200_001);
    }

    #[test]
    fn test_passes_results_through() {
        let result: Result<u8, String> = ensure_sufficient_stack(|| Err("cannot interpret".into()));
        assert_eq!(result, Err("cannot interpret".to_string()));
    }
}
