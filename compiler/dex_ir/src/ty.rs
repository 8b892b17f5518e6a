//! Interned types and the conversion queries the expression passes consume.
//!
//! Every type is interned once in [`TypePool`] and referred to by [`TypeId`].
//! The builtin scalar and string types have fixed ids (`TypeId::INT`,
//! `TypeId::STRING`, ...) so passes can name them without a pool lookup.
//!
//! # Qualifiers
//!
//! `const` and `immutable` wrap the type they qualify. Qualifiers are
//! transitive: the element type of `const(int[])` is `const(int)`, which
//! [`TypePool::elem`] applies on the way out.

use std::fmt::Write;

use rustc_hash::FxHashMap;

use crate::decl::{AggId, AggKind};
use crate::scalar::{FloatKind, NumKind};
use crate::{Name, StringInterner};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    pub const ERROR: TypeId = TypeId(0);
    pub const VOID: TypeId = TypeId(1);
    pub const BOOL: TypeId = TypeId(2);
    pub const BYTE: TypeId = TypeId(3);
    pub const UBYTE: TypeId = TypeId(4);
    pub const SHORT: TypeId = TypeId(5);
    pub const USHORT: TypeId = TypeId(6);
    pub const INT: TypeId = TypeId(7);
    pub const UINT: TypeId = TypeId(8);
    pub const LONG: TypeId = TypeId(9);
    pub const ULONG: TypeId = TypeId(10);
    pub const CHAR: TypeId = TypeId(11);
    pub const WCHAR: TypeId = TypeId(12);
    pub const DCHAR: TypeId = TypeId(13);
    pub const FLOAT: TypeId = TypeId(14);
    pub const DOUBLE: TypeId = TypeId(15);
    pub const REAL: TypeId = TypeId(16);
    pub const CFLOAT: TypeId = TypeId(17);
    pub const CDOUBLE: TypeId = TypeId(18);
    pub const CREAL: TypeId = TypeId(19);
    pub const NULL: TypeId = TypeId(20);
    pub const TYPEINFO: TypeId = TypeId(21);
    pub const IMMUTABLE_CHAR: TypeId = TypeId(22);
    /// `immutable(char)[]`
    pub const STRING: TypeId = TypeId(23);
    pub const IMMUTABLE_WCHAR: TypeId = TypeId(24);
    /// `immutable(wchar)[]`
    pub const WSTRING: TypeId = TypeId(25);
    pub const IMMUTABLE_DCHAR: TypeId = TypeId(26);
    /// `immutable(dchar)[]`
    pub const DSTRING: TypeId = TypeId(27);

    pub const SIZE_T: TypeId = TypeId::ULONG;
    pub const PTRDIFF_T: TypeId = TypeId::LONG;

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IntKind {
    Byte,
    Ubyte,
    Short,
    Ushort,
    Int,
    Uint,
    Long,
    Ulong,
    Char,
    Wchar,
    Dchar,
}

impl IntKind {
    pub const fn bits(self) -> u8 {
        match self {
            IntKind::Byte | IntKind::Ubyte | IntKind::Char => 8,
            IntKind::Short | IntKind::Ushort | IntKind::Wchar => 16,
            IntKind::Int | IntKind::Uint | IntKind::Dchar => 32,
            IntKind::Long | IntKind::Ulong => 64,
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, IntKind::Byte | IntKind::Short | IntKind::Int | IntKind::Long)
    }

    pub const fn is_char(self) -> bool {
        matches!(self, IntKind::Char | IntKind::Wchar | IntKind::Dchar)
    }

    pub const fn name(self) -> &'static str {
        match self {
            IntKind::Byte => "byte",
            IntKind::Ubyte => "ubyte",
            IntKind::Short => "short",
            IntKind::Ushort => "ushort",
            IntKind::Int => "int",
            IntKind::Uint => "uint",
            IntKind::Long => "long",
            IntKind::Ulong => "ulong",
            IntKind::Char => "char",
            IntKind::Wchar => "wchar",
            IntKind::Dchar => "dchar",
        }
    }

    const fn mangle(self) -> char {
        match self {
            IntKind::Byte => 'g',
            IntKind::Ubyte => 'h',
            IntKind::Short => 's',
            IntKind::Ushort => 't',
            IntKind::Int => 'i',
            IntKind::Uint => 'k',
            IntKind::Long => 'l',
            IntKind::Ulong => 'm',
            IntKind::Char => 'a',
            IntKind::Wchar => 'u',
            IntKind::Dchar => 'w',
        }
    }

    pub const fn num_kind(self) -> NumKind {
        NumKind::Int {
            bits: self.bits(),
            signed: self.is_signed(),
        }
    }
}

/// Code unit width of a string or character type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CharWidth {
    One,
    Two,
    Four,
}

impl CharWidth {
    pub const fn bytes(self) -> u8 {
        match self {
            CharWidth::One => 1,
            CharWidth::Two => 2,
            CharWidth::Four => 4,
        }
    }

    /// String literal postfix (`c`, `w`, `d`).
    pub const fn postfix(self) -> char {
        match self {
            CharWidth::One => 'c',
            CharWidth::Two => 'w',
            CharWidth::Four => 'd',
        }
    }

    pub const fn char_type(self) -> TypeId {
        match self {
            CharWidth::One => TypeId::CHAR,
            CharWidth::Two => TypeId::WCHAR,
            CharWidth::Four => TypeId::DCHAR,
        }
    }

    pub const fn string_type(self) -> TypeId {
        match self {
            CharWidth::One => TypeId::STRING,
            CharWidth::Two => TypeId::WSTRING,
            CharWidth::Four => TypeId::DSTRING,
        }
    }

    /// Encode `text` into code units of this width.
    pub fn encode(self, text: &str) -> Vec<u32> {
        match self {
            CharWidth::One => text.bytes().map(u32::from).collect(),
            CharWidth::Two => text.encode_utf16().map(u32::from).collect(),
            CharWidth::Four => text.chars().map(u32::from).collect(),
        }
    }

    /// Decode code units back into text; `None` for invalid sequences.
    pub fn decode(self, units: &[u32]) -> Option<String> {
        match self {
            CharWidth::One => {
                let bytes: Option<Vec<u8>> = units.iter().map(|&u| u8::try_from(u).ok()).collect();
                String::from_utf8(bytes?).ok()
            }
            CharWidth::Two => {
                let wide: Option<Vec<u16>> = units.iter().map(|&u| u16::try_from(u).ok()).collect();
                String::from_utf16(&wide?).ok()
            }
            CharWidth::Four => units.iter().map(|&u| char::from_u32(u)).collect(),
        }
    }
}

/// Structural description of a type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Error,
    Void,
    Bool,
    Int(IntKind),
    Float(FloatKind),
    Complex(FloatKind),
    /// Type of the `null` literal before it converts to a reference type.
    Null,
    TypeInfo,
    Pointer(TypeId),
    /// Dynamic array `T[]`.
    Slice(TypeId),
    /// Static array `T[N]`.
    Array { elem: TypeId, len: u64 },
    AssocArray { key: TypeId, value: TypeId },
    Aggregate { kind: AggKind, agg: AggId, name: Name },
    Function { params: Box<[TypeId]>, ret: TypeId },
    Tuple(Box<[TypeId]>),
    Const(TypeId),
    Immutable(TypeId),
    /// A named type the resolver has not bound yet.
    Ident(Name),
    /// `T[N]` with an identifier `N`: a static array when `N` names a
    /// constant, an associative array when it names a type.
    IdentIndexed { elem: TypeId, index: Name },
}

/// Quality of an implicit conversion, totally ordered.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum MatchLevel {
    NoMatch,
    Convert,
    Const,
    Exact,
}

/// Type qualifier at the head of a type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Qualifier {
    Mutable,
    Const,
    Immutable,
}

impl Qualifier {
    /// Whether a view with `self` may be seen through `to`.
    fn converts_to(self, to: Qualifier) -> bool {
        self == to || to == Qualifier::Const
    }
}

/// Interned type storage.
#[derive(Clone, Debug)]
pub struct TypePool {
    kinds: Vec<TypeKind>,
    map: FxHashMap<TypeKind, TypeId>,
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

impl TypePool {
    pub fn new() -> Self {
        let mut pool = TypePool {
            kinds: Vec::new(),
            map: FxHashMap::default(),
        };
        let builtins = [
            TypeKind::Error,
            TypeKind::Void,
            TypeKind::Bool,
            TypeKind::Int(IntKind::Byte),
            TypeKind::Int(IntKind::Ubyte),
            TypeKind::Int(IntKind::Short),
            TypeKind::Int(IntKind::Ushort),
            TypeKind::Int(IntKind::Int),
            TypeKind::Int(IntKind::Uint),
            TypeKind::Int(IntKind::Long),
            TypeKind::Int(IntKind::Ulong),
            TypeKind::Int(IntKind::Char),
            TypeKind::Int(IntKind::Wchar),
            TypeKind::Int(IntKind::Dchar),
            TypeKind::Float(FloatKind::Float),
            TypeKind::Float(FloatKind::Double),
            TypeKind::Float(FloatKind::Real),
            TypeKind::Complex(FloatKind::Float),
            TypeKind::Complex(FloatKind::Double),
            TypeKind::Complex(FloatKind::Real),
            TypeKind::Null,
            TypeKind::TypeInfo,
            TypeKind::Immutable(TypeId::CHAR),
            TypeKind::Slice(TypeId::IMMUTABLE_CHAR),
            TypeKind::Immutable(TypeId::WCHAR),
            TypeKind::Slice(TypeId::IMMUTABLE_WCHAR),
            TypeKind::Immutable(TypeId::DCHAR),
            TypeKind::Slice(TypeId::IMMUTABLE_DCHAR),
        ];
        for kind in builtins {
            pool.intern(kind);
        }
        debug_assert_eq!(pool.kind(TypeId::DSTRING), &TypeKind::Slice(TypeId::IMMUTABLE_DCHAR));
        pool
    }

    pub fn intern(&mut self, kind: TypeKind) -> TypeId {
        if let Some(&id) = self.map.get(&kind) {
            return id;
        }
        let id = TypeId(
            u32::try_from(self.kinds.len())
                .unwrap_or_else(|_| panic!("type pool exceeded {} entries", u32::MAX)),
        );
        self.kinds.push(kind.clone());
        self.map.insert(kind, id);
        id
    }

    #[inline]
    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.kinds[id.index()]
    }

    pub fn pointer(&mut self, to: TypeId) -> TypeId {
        self.intern(TypeKind::Pointer(to))
    }

    pub fn slice(&mut self, elem: TypeId) -> TypeId {
        self.intern(TypeKind::Slice(elem))
    }

    pub fn array(&mut self, elem: TypeId, len: u64) -> TypeId {
        self.intern(TypeKind::Array { elem, len })
    }

    pub fn assoc_array(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.intern(TypeKind::AssocArray { key, value })
    }

    pub fn function(&mut self, params: Vec<TypeId>, ret: TypeId) -> TypeId {
        self.intern(TypeKind::Function {
            params: params.into_boxed_slice(),
            ret,
        })
    }

    pub fn tuple(&mut self, elems: Vec<TypeId>) -> TypeId {
        self.intern(TypeKind::Tuple(elems.into_boxed_slice()))
    }

    /// `const(t)`; idempotent, and `immutable` already implies it.
    pub fn const_of(&mut self, t: TypeId) -> TypeId {
        match self.qualifier(t) {
            Qualifier::Mutable => {
                let base = self.strip(t);
                self.intern(TypeKind::Const(base))
            }
            Qualifier::Const | Qualifier::Immutable => t,
        }
    }

    pub fn immutable_of(&mut self, t: TypeId) -> TypeId {
        match self.qualifier(t) {
            Qualifier::Immutable => t,
            Qualifier::Mutable | Qualifier::Const => {
                let base = self.strip(t);
                self.intern(TypeKind::Immutable(base))
            }
        }
    }

    /// Re-apply `qual` to `t`.
    pub fn qualify(&mut self, t: TypeId, qual: Qualifier) -> TypeId {
        match qual {
            Qualifier::Mutable => t,
            Qualifier::Const => self.const_of(t),
            Qualifier::Immutable => self.immutable_of(t),
        }
    }

    /// `t` without head qualifiers.
    pub fn strip(&self, t: TypeId) -> TypeId {
        match self.kind(t) {
            TypeKind::Const(inner) | TypeKind::Immutable(inner) => self.strip(*inner),
            _ => t,
        }
    }

    pub fn qualifier(&self, t: TypeId) -> Qualifier {
        match self.kind(t) {
            TypeKind::Const(_) => Qualifier::Const,
            TypeKind::Immutable(_) => Qualifier::Immutable,
            _ => Qualifier::Mutable,
        }
    }

    /// Head kind with qualifiers stripped.
    pub fn base_kind(&self, t: TypeId) -> &TypeKind {
        self.kind(self.strip(t))
    }

    /// Element of a pointer, slice or static array, with the container's
    /// qualifier propagated.
    pub fn elem(&mut self, t: TypeId) -> Option<TypeId> {
        let qual = self.qualifier(t);
        let elem = match self.base_kind(t) {
            TypeKind::Pointer(e) | TypeKind::Slice(e) | TypeKind::Array { elem: e, .. } => *e,
            _ => return None,
        };
        Some(self.qualify(elem, qual))
    }

    /// Element type without qualifier propagation (no interning).
    pub fn elem_raw(&self, t: TypeId) -> Option<TypeId> {
        match self.base_kind(t) {
            TypeKind::Pointer(e) | TypeKind::Slice(e) | TypeKind::Array { elem: e, .. } => Some(*e),
            _ => None,
        }
    }

    pub fn num_kind(&self, t: TypeId) -> Option<NumKind> {
        match self.base_kind(t) {
            TypeKind::Bool => Some(NumKind::Bool),
            TypeKind::Int(k) => Some(k.num_kind()),
            TypeKind::Float(fk) => Some(NumKind::Float(*fk)),
            TypeKind::Complex(fk) => Some(NumKind::Complex(*fk)),
            _ => None,
        }
    }

    pub fn is_error(&self, t: TypeId) -> bool {
        matches!(self.base_kind(t), TypeKind::Error)
    }

    pub fn is_void(&self, t: TypeId) -> bool {
        matches!(self.base_kind(t), TypeKind::Void)
    }

    pub fn is_bool(&self, t: TypeId) -> bool {
        matches!(self.base_kind(t), TypeKind::Bool)
    }

    pub fn is_integral(&self, t: TypeId) -> bool {
        matches!(self.base_kind(t), TypeKind::Int(_) | TypeKind::Bool)
    }

    pub fn is_floating(&self, t: TypeId) -> bool {
        matches!(self.base_kind(t), TypeKind::Float(_))
    }

    pub fn is_complex(&self, t: TypeId) -> bool {
        matches!(self.base_kind(t), TypeKind::Complex(_))
    }

    pub fn is_scalar(&self, t: TypeId) -> bool {
        self.num_kind(t).is_some()
    }

    pub fn is_unsigned(&self, t: TypeId) -> bool {
        matches!(self.base_kind(t), TypeKind::Int(k) if !k.is_signed())
    }

    pub fn is_char(&self, t: TypeId) -> bool {
        matches!(self.base_kind(t), TypeKind::Int(k) if k.is_char())
    }

    pub fn is_pointer(&self, t: TypeId) -> bool {
        matches!(self.base_kind(t), TypeKind::Pointer(_))
    }

    pub fn is_slice(&self, t: TypeId) -> bool {
        matches!(self.base_kind(t), TypeKind::Slice(_))
    }

    pub fn is_static_array(&self, t: TypeId) -> bool {
        matches!(self.base_kind(t), TypeKind::Array { .. })
    }

    /// Dynamic or static array.
    pub fn is_array(&self, t: TypeId) -> bool {
        self.is_slice(t) || self.is_static_array(t)
    }

    pub fn is_assoc_array(&self, t: TypeId) -> bool {
        matches!(self.base_kind(t), TypeKind::AssocArray { .. })
    }

    pub fn is_function(&self, t: TypeId) -> bool {
        matches!(self.base_kind(t), TypeKind::Function { .. })
    }

    pub fn static_len(&self, t: TypeId) -> Option<u64> {
        match self.base_kind(t) {
            TypeKind::Array { len, .. } => Some(*len),
            _ => None,
        }
    }

    /// Code unit width when `t` is an array of characters.
    pub fn string_width(&self, t: TypeId) -> Option<CharWidth> {
        let elem = self.elem_raw(t)?;
        if self.is_pointer(t) {
            return None;
        }
        match self.base_kind(elem) {
            TypeKind::Int(IntKind::Char) => Some(CharWidth::One),
            TypeKind::Int(IntKind::Wchar) => Some(CharWidth::Two),
            TypeKind::Int(IntKind::Dchar) => Some(CharWidth::Four),
            _ => None,
        }
    }

    pub fn aggregate(&self, t: TypeId) -> Option<(AggKind, AggId)> {
        match self.base_kind(t) {
            TypeKind::Aggregate { kind, agg, .. } => Some((*kind, *agg)),
            _ => None,
        }
    }

    pub fn is_struct(&self, t: TypeId) -> bool {
        matches!(self.aggregate(t), Some((AggKind::Struct, _)))
    }

    pub fn is_class(&self, t: TypeId) -> bool {
        matches!(self.aggregate(t), Some((AggKind::Class, _)))
    }

    /// Values of `t` refer to storage they do not own.
    pub fn is_reference(&self, t: TypeId) -> bool {
        match self.base_kind(t) {
            TypeKind::Pointer(_)
            | TypeKind::Slice(_)
            | TypeKind::AssocArray { .. }
            | TypeKind::Null
            | TypeKind::Function { .. } => true,
            TypeKind::Aggregate { kind, .. } => *kind == AggKind::Class,
            _ => false,
        }
    }

    /// Whether a copy of a `t` value can reach mutable state of the original.
    /// Struct fields are not inspected here; the resolver handles aggregates.
    pub fn has_indirections(&self, t: TypeId) -> bool {
        match self.base_kind(t) {
            TypeKind::Array { elem, .. } => self.has_indirections(*elem),
            TypeKind::Tuple(elems) => elems.iter().any(|&e| self.has_indirections(e)),
            _ => self.is_reference(t),
        }
    }

    /// Integral promotion: small integers and characters widen to `int`.
    pub fn promote(&self, t: TypeId) -> TypeId {
        match self.base_kind(t) {
            TypeKind::Bool
            | TypeKind::Int(
                IntKind::Byte | IntKind::Ubyte | IntKind::Short | IntKind::Ushort | IntKind::Char | IntKind::Wchar,
            ) => TypeId::INT,
            TypeKind::Int(IntKind::Dchar) => TypeId::UINT,
            _ => self.strip(t),
        }
    }

    /// Usual arithmetic conversions for two scalar operands.
    pub fn arithmetic_common(&self, a: TypeId, b: TypeId) -> Option<TypeId> {
        let (ka, kb) = (self.num_kind(a)?, self.num_kind(b)?);
        let float_rank = |k: NumKind| match k {
            NumKind::Float(fk) | NumKind::Complex(fk) => Some(fk),
            NumKind::Bool | NumKind::Int { .. } => None,
        };
        let is_complex = matches!(ka, NumKind::Complex(_)) || matches!(kb, NumKind::Complex(_));
        match (float_rank(ka), float_rank(kb)) {
            (None, None) => {}
            (fa, fb) => {
                let fk = fa.max(fb).unwrap_or(FloatKind::Double);
                return Some(match (is_complex, fk) {
                    (false, FloatKind::Float) => TypeId::FLOAT,
                    (false, FloatKind::Double) => TypeId::DOUBLE,
                    (false, FloatKind::Real) => TypeId::REAL,
                    (true, FloatKind::Float) => TypeId::CFLOAT,
                    (true, FloatKind::Double) => TypeId::CDOUBLE,
                    (true, FloatKind::Real) => TypeId::CREAL,
                });
            }
        }
        let (pa, pb) = (self.promote(a), self.promote(b));
        let (ia, ib) = match (self.kind(pa), self.kind(pb)) {
            (TypeKind::Int(x), TypeKind::Int(y)) => (*x, *y),
            _ => return None,
        };
        Some(match ia.bits().cmp(&ib.bits()) {
            std::cmp::Ordering::Greater => pa,
            std::cmp::Ordering::Less => pb,
            std::cmp::Ordering::Equal if !ia.is_signed() => pa,
            std::cmp::Ordering::Equal => pb,
        })
    }

    /// Rank an implicit conversion of a value of type `from` to `to`.
    pub fn implicit_conv_to(&self, from: TypeId, to: TypeId) -> MatchLevel {
        if from == to || self.is_error(from) || self.is_error(to) {
            return MatchLevel::Exact;
        }
        let (fs, ts) = (self.strip(from), self.strip(to));
        if fs == ts {
            if !self.has_indirections(fs) && !self.is_struct(fs) {
                return MatchLevel::Const;
            }
            return if self.qualifier(from).converts_to(self.qualifier(to)) {
                MatchLevel::Const
            } else {
                MatchLevel::NoMatch
            };
        }
        match (self.kind(fs), self.kind(ts)) {
            (
                TypeKind::Null,
                TypeKind::Pointer(_) | TypeKind::Slice(_) | TypeKind::AssocArray { .. } | TypeKind::Function { .. },
            ) => MatchLevel::Convert,
            (TypeKind::Null, TypeKind::Aggregate { kind: AggKind::Class, .. }) => MatchLevel::Convert,
            (TypeKind::Pointer(a), TypeKind::Pointer(b)) => {
                if self.strip(*b) == TypeId::VOID {
                    MatchLevel::Convert
                } else {
                    self.pointee_conv(self.transitive(from, *a), self.transitive(to, *b))
                }
            }
            (TypeKind::Slice(a), TypeKind::Slice(b)) => {
                self.pointee_conv(self.transitive(from, *a), self.transitive(to, *b))
            }
            (TypeKind::Array { elem: a, .. }, TypeKind::Slice(b)) => {
                match self.pointee_conv(self.transitive(from, *a), self.transitive(to, *b)) {
                    MatchLevel::NoMatch => MatchLevel::NoMatch,
                    _ => MatchLevel::Convert,
                }
            }
            (TypeKind::Array { elem: a, len: n }, TypeKind::Array { elem: b, len: m }) if n == m => {
                match self.implicit_conv_to(*a, *b) {
                    MatchLevel::Exact | MatchLevel::Const => MatchLevel::Const,
                    _ => MatchLevel::NoMatch,
                }
            }
            _ => self.scalar_conv(fs, ts),
        }
    }

    /// Qualifier of a pointee as seen through its (possibly qualified) container.
    fn transitive(&self, container: TypeId, elem: TypeId) -> (TypeId, Qualifier) {
        let outer = self.qualifier(container);
        let inner = self.qualifier(elem);
        let qual = match (outer, inner) {
            (Qualifier::Immutable, _) | (_, Qualifier::Immutable) => Qualifier::Immutable,
            (Qualifier::Const, _) | (_, Qualifier::Const) => Qualifier::Const,
            _ => Qualifier::Mutable,
        };
        (self.strip(elem), qual)
    }

    fn pointee_conv(&self, (a, qa): (TypeId, Qualifier), (b, qb): (TypeId, Qualifier)) -> MatchLevel {
        if a != b || !qa.converts_to(qb) {
            return MatchLevel::NoMatch;
        }
        if qa == qb {
            MatchLevel::Exact
        } else {
            MatchLevel::Const
        }
    }

    fn scalar_conv(&self, from: TypeId, to: TypeId) -> MatchLevel {
        let (Some(kf), Some(kt)) = (self.num_kind(from), self.num_kind(to)) else {
            return MatchLevel::NoMatch;
        };
        match (kf, kt) {
            (NumKind::Bool | NumKind::Int { .. }, NumKind::Bool) => MatchLevel::NoMatch,
            (NumKind::Bool, NumKind::Int { .. }) => MatchLevel::Convert,
            (NumKind::Int { bits: fb, .. }, NumKind::Int { bits: tb, .. }) => {
                if tb >= fb {
                    MatchLevel::Convert
                } else {
                    MatchLevel::NoMatch
                }
            }
            (NumKind::Bool | NumKind::Int { .. }, NumKind::Float(_) | NumKind::Complex(_))
            | (NumKind::Float(_), NumKind::Float(_) | NumKind::Complex(_))
            | (NumKind::Complex(_), NumKind::Complex(_)) => MatchLevel::Convert,
            (NumKind::Float(_) | NumKind::Complex(_), _) => MatchLevel::NoMatch,
        }
    }

    /// Whether an explicit `cast(to)` from `from` is allowed.
    pub fn cast_allowed(&self, from: TypeId, to: TypeId) -> bool {
        if self.implicit_conv_to(from, to) != MatchLevel::NoMatch {
            return true;
        }
        let (fs, ts) = (self.strip(from), self.strip(to));
        if fs == ts {
            return true;
        }
        match (self.kind(fs), self.kind(ts)) {
            (_, TypeKind::Void) => true,
            (a, b) if self.is_scalar(fs) && self.is_scalar(ts) => {
                !matches!((a, b), (TypeKind::Complex(_), TypeKind::Int(_) | TypeKind::Bool))
            }
            (TypeKind::Pointer(_), TypeKind::Pointer(_))
            | (TypeKind::Slice(_), TypeKind::Slice(_))
            | (TypeKind::Array { .. }, TypeKind::Slice(_))
            | (TypeKind::Aggregate { kind: AggKind::Class, .. }, TypeKind::Aggregate { kind: AggKind::Class, .. }) => true,
            (TypeKind::Pointer(_), TypeKind::Int(k)) | (TypeKind::Int(k), TypeKind::Pointer(_)) => k.bits() == 64,
            _ => false,
        }
    }

    /// Common type two branches of `?:` or two sides of a comparison convert to.
    pub fn common_type(&self, a: TypeId, b: TypeId) -> Option<TypeId> {
        if a == b {
            return Some(a);
        }
        if let Some(t) = self.arithmetic_common(a, b) {
            return Some(t);
        }
        let ab = self.implicit_conv_to(a, b);
        let ba = self.implicit_conv_to(b, a);
        match (ab, ba) {
            (MatchLevel::NoMatch, MatchLevel::NoMatch) => None,
            (x, y) if x >= y => Some(b),
            _ => Some(a),
        }
    }

    /// Size in bytes; aggregates report `None` and are sized by the caller.
    pub fn size_of(&self, t: TypeId) -> Option<u64> {
        Some(match self.base_kind(t) {
            TypeKind::Error => 0,
            TypeKind::Void | TypeKind::Bool => 1,
            TypeKind::Int(k) => u64::from(k.bits() / 8),
            TypeKind::Float(FloatKind::Float) => 4,
            TypeKind::Float(FloatKind::Double) | TypeKind::Complex(FloatKind::Float) => 8,
            TypeKind::Float(FloatKind::Real) | TypeKind::Complex(FloatKind::Double) => 16,
            TypeKind::Complex(FloatKind::Real) => 32,
            TypeKind::Null
            | TypeKind::TypeInfo
            | TypeKind::Pointer(_)
            | TypeKind::AssocArray { .. }
            | TypeKind::Function { .. } => 8,
            TypeKind::Slice(_) => 16,
            TypeKind::Array { elem, len } => self.size_of(*elem)? * len,
            TypeKind::Aggregate { kind: AggKind::Class, .. } => 8,
            TypeKind::Tuple(elems) => {
                let mut total = 0;
                for &e in elems.iter() {
                    total += self.size_of(e)?;
                }
                total
            }
            TypeKind::Aggregate { .. }
            | TypeKind::Const(_)
            | TypeKind::Immutable(_)
            | TypeKind::Ident(_)
            | TypeKind::IdentIndexed { .. } => return None,
        })
    }

    /// Human-readable D spelling.
    pub fn display(&self, t: TypeId, interner: &StringInterner) -> String {
        let mut out = String::new();
        self.write_display(t, interner, &mut out);
        out
    }

    fn write_display(&self, t: TypeId, interner: &StringInterner, out: &mut String) {
        match self.kind(t) {
            TypeKind::Error => out.push_str("__error"),
            TypeKind::Void => out.push_str("void"),
            TypeKind::Bool => out.push_str("bool"),
            TypeKind::Int(k) => out.push_str(k.name()),
            TypeKind::Float(FloatKind::Float) => out.push_str("float"),
            TypeKind::Float(FloatKind::Double) => out.push_str("double"),
            TypeKind::Float(FloatKind::Real) => out.push_str("real"),
            TypeKind::Complex(FloatKind::Float) => out.push_str("cfloat"),
            TypeKind::Complex(FloatKind::Double) => out.push_str("cdouble"),
            TypeKind::Complex(FloatKind::Real) => out.push_str("creal"),
            TypeKind::Null => out.push_str("typeof(null)"),
            TypeKind::TypeInfo => out.push_str("TypeInfo"),
            TypeKind::Pointer(e) => {
                self.write_display(*e, interner, out);
                out.push('*');
            }
            TypeKind::Slice(e) => {
                if *e == TypeId::IMMUTABLE_CHAR {
                    out.push_str("string");
                    return;
                }
                if *e == TypeId::IMMUTABLE_WCHAR {
                    out.push_str("wstring");
                    return;
                }
                if *e == TypeId::IMMUTABLE_DCHAR {
                    out.push_str("dstring");
                    return;
                }
                self.write_display(*e, interner, out);
                out.push_str("[]");
            }
            TypeKind::Array { elem, len } => {
                self.write_display(*elem, interner, out);
                let _ = write!(out, "[{len}]");
            }
            TypeKind::AssocArray { key, value } => {
                self.write_display(*value, interner, out);
                out.push('[');
                self.write_display(*key, interner, out);
                out.push(']');
            }
            TypeKind::Aggregate { name, .. } | TypeKind::Ident(name) => out.push_str(interner.lookup(*name)),
            TypeKind::Function { params, ret } => {
                self.write_display(*ret, interner, out);
                out.push_str(" function(");
                for (i, &p) in params.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_display(p, interner, out);
                }
                out.push(')');
            }
            TypeKind::Tuple(elems) => {
                out.push_str("(");
                for (i, &e) in elems.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_display(e, interner, out);
                }
                out.push(')');
            }
            TypeKind::Const(inner) => {
                out.push_str("const(");
                self.write_display(*inner, interner, out);
                out.push(')');
            }
            TypeKind::Immutable(inner) => {
                out.push_str("immutable(");
                self.write_display(*inner, interner, out);
                out.push(')');
            }
            TypeKind::IdentIndexed { elem, index } => {
                self.write_display(*elem, interner, out);
                let _ = write!(out, "[{}]", interner.lookup(*index));
            }
        }
    }

    /// Append the ABI mangling of `t`. Stable across runs: it depends only on
    /// type structure and names.
    pub fn mangle(&self, t: TypeId, interner: &StringInterner, out: &mut String) {
        match self.kind(t) {
            TypeKind::Error | TypeKind::Ident(_) | TypeKind::IdentIndexed { .. } => out.push('?'),
            TypeKind::Void => out.push('v'),
            TypeKind::Bool => out.push('b'),
            TypeKind::Int(k) => out.push(k.mangle()),
            TypeKind::Float(FloatKind::Float) => out.push('f'),
            TypeKind::Float(FloatKind::Double) => out.push('d'),
            TypeKind::Float(FloatKind::Real) => out.push('e'),
            TypeKind::Complex(FloatKind::Float) => out.push('q'),
            TypeKind::Complex(FloatKind::Double) => out.push('r'),
            TypeKind::Complex(FloatKind::Real) => out.push('c'),
            TypeKind::Null => out.push('n'),
            TypeKind::TypeInfo => out.push_str("C6object8TypeInfo"),
            TypeKind::Pointer(e) => {
                out.push('P');
                self.mangle(*e, interner, out);
            }
            TypeKind::Slice(e) => {
                out.push('A');
                self.mangle(*e, interner, out);
            }
            TypeKind::Array { elem, len } => {
                let _ = write!(out, "G{len}");
                self.mangle(*elem, interner, out);
            }
            TypeKind::AssocArray { key, value } => {
                out.push('H');
                self.mangle(*key, interner, out);
                self.mangle(*value, interner, out);
            }
            TypeKind::Aggregate { kind, name, .. } => {
                let text = interner.lookup(*name);
                let tag = match kind {
                    AggKind::Struct => 'S',
                    AggKind::Class => 'C',
                };
                let _ = write!(out, "{tag}{}{text}", text.len());
            }
            TypeKind::Function { params, ret } => {
                out.push('F');
                for &p in params.iter() {
                    self.mangle(p, interner, out);
                }
                out.push('Z');
                self.mangle(*ret, interner, out);
            }
            TypeKind::Tuple(elems) => {
                out.push('B');
                let _ = write!(out, "{}", elems.len());
                for &e in elems.iter() {
                    self.mangle(e, interner, out);
                }
            }
            TypeKind::Const(inner) => {
                out.push('x');
                self.mangle(*inner, interner, out);
            }
            TypeKind::Immutable(inner) => {
                out.push('y');
                self.mangle(*inner, interner, out);
            }
        }
    }
}

#[cfg(test)]
mod tests;
