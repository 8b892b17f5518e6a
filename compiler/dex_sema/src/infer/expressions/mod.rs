//! Expression forms other than calls.
//!
//! - `literals`: literal nodes and their types
//! - `identifiers`: names, `$`, `this` and pre-bound symbol references
//! - `access`: indexing, slicing and `.member`
//! - `operators`: unary, binary, conditional and assignment operators,
//!   including user-defined operator rewriting
//! - `meta`: `__FILE__` and friends, `typeid`, `__traits`, `is(...)`,
//!   `mixin`, `import` and `assert`

mod access;
mod identifiers;
mod literals;
mod meta;
mod operators;

pub(crate) use access::{resolve_dot_id, resolve_index, resolve_multi_index, resolve_remove, resolve_slice};
pub(crate) use identifiers::{implicit_this, resolve_dollar, resolve_ident, resolve_symbol, undefined};
pub(crate) use literals::resolve_literal;
pub(crate) use meta::{
    resolve_assert, resolve_default_init, resolve_import, resolve_is_type, resolve_mixin, resolve_traits,
    resolve_typeid,
};
pub(crate) use operators::{
    resolve_addr_of, resolve_assign, resolve_binary, resolve_cast, resolve_cond, resolve_delete, resolve_deref,
    resolve_post_inc_dec, resolve_pre_inc_dec, resolve_unary,
};
