//! Scalar arithmetic shared by the constant folder and the interpreter.
//!
//! Both passes reduce operators on integral, floating and complex values
//! through this module, so a folded `a op b` and an interpreted `a op b`
//! cannot disagree.
//!
//! # Representation
//!
//! Integral values travel as `u64` normalized to their width: signed kinds
//! are sign-extended, unsigned kinds zero-extended. Fixed-width integer
//! arithmetic wraps. Floating values travel as `f64`; `float` results are
//! rounded through `f32` after every operation.

use crate::operators::{BinaryOp, UnaryOp};

/// Numeric domain of a type, as far as arithmetic is concerned.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NumKind {
    Bool,
    Int { bits: u8, signed: bool },
    Float(FloatKind),
    Complex(FloatKind),
}

/// Precision of a floating or complex type.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum FloatKind {
    Float,
    Double,
    Real,
}

impl FloatKind {
    /// Round `v` to this precision.
    #[inline]
    pub fn round(self, v: f64) -> f64 {
        match self {
            FloatKind::Float => f64::from(v as f32),
            FloatKind::Double | FloatKind::Real => v,
        }
    }
}

/// An untyped scalar; its [`NumKind`] travels alongside.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Scalar {
    Int(u64),
    Float(f64),
    Complex(f64, f64),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScalarError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("shift by {amount} is outside the range 0..{bits}")]
    ShiftOutOfRange { amount: i64, bits: u8 },
    #[error("cannot raise {base} to the negative power {exponent}")]
    NegativeExponent { base: i64, exponent: i64 },
    #[error("operator `{op}` is not defined for {kind} operands")]
    Unsupported { op: &'static str, kind: &'static str },
}

impl NumKind {
    pub const fn describe(self) -> &'static str {
        match self {
            NumKind::Bool => "bool",
            NumKind::Int { .. } => "integral",
            NumKind::Float(_) => "floating point",
            NumKind::Complex(_) => "complex",
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, NumKind::Int { signed: true, .. })
    }

    /// Truncate and re-extend `v` to this kind's width.
    pub const fn normalize(self, v: u64) -> u64 {
        match self {
            NumKind::Bool => v & 1,
            NumKind::Int { bits, signed } => {
                if bits >= 64 {
                    return v;
                }
                let mask = (1u64 << bits) - 1;
                let x = v & mask;
                if signed && (x >> (bits - 1)) & 1 == 1 {
                    x | !mask
                } else {
                    x
                }
            }
            NumKind::Float(_) | NumKind::Complex(_) => v,
        }
    }

    fn int_bits(self) -> u8 {
        match self {
            NumKind::Bool => 1,
            NumKind::Int { bits, .. } => bits,
            NumKind::Float(_) | NumKind::Complex(_) => 64,
        }
    }

    /// Smallest and largest value of an integral kind, as normalized bits.
    pub fn int_min_max(self) -> Option<(u64, u64)> {
        match self {
            NumKind::Bool => Some((0, 1)),
            NumKind::Int { bits, signed: false } => {
                Some((0, if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 }))
            }
            NumKind::Int { bits, signed: true } => {
                let max = (1u64 << (bits - 1)) - 1;
                Some((self.normalize(max + 1), max))
            }
            NumKind::Float(_) | NumKind::Complex(_) => None,
        }
    }

    /// Whether the normalized integral `v` of kind `from` is representable in `self`.
    pub fn int_fits(self, v: u64, from: NumKind) -> bool {
        let wide = if from.is_signed() {
            i128::from(v as i64)
        } else {
            i128::from(v)
        };
        match self.int_min_max() {
            Some((min, max)) => {
                let (min, max) = if self.is_signed() {
                    (i128::from(min as i64), i128::from(max as i64))
                } else {
                    (i128::from(min), i128::from(max))
                };
                (min..=max).contains(&wide)
            }
            None => true,
        }
    }
}

impl Scalar {
    /// Truth value as used by conditions and `cast(bool)`.
    pub fn is_true(self) -> bool {
        match self {
            Scalar::Int(v) => v != 0,
            Scalar::Float(f) => f != 0.0,
            Scalar::Complex(re, im) => re != 0.0 || im != 0.0,
        }
    }

    fn as_float(self, kind: NumKind) -> f64 {
        match self {
            Scalar::Int(v) if kind.is_signed() => v as i64 as f64,
            Scalar::Int(v) => v as f64,
            Scalar::Float(f) | Scalar::Complex(f, _) => f,
        }
    }

    fn as_complex(self, kind: NumKind) -> (f64, f64) {
        match self {
            Scalar::Complex(re, im) => (re, im),
            other => (other.as_float(kind), 0.0),
        }
    }

    fn as_bits(self) -> u64 {
        match self {
            Scalar::Int(v) => v,
            Scalar::Float(f) | Scalar::Complex(f, _) => f as i64 as u64,
        }
    }
}

fn unsupported(op: BinaryOp, kind: NumKind) -> ScalarError {
    ScalarError::Unsupported {
        op: op.as_symbol(),
        kind: kind.describe(),
    }
}

/// Apply an arithmetic, bitwise or shift operator. Both operands must
/// already be converted to `kind`.
pub fn binary(op: BinaryOp, kind: NumKind, lhs: Scalar, rhs: Scalar) -> Result<Scalar, ScalarError> {
    match kind {
        NumKind::Bool | NumKind::Int { .. } => int_binary(op, kind, lhs.as_bits(), rhs.as_bits()),
        NumKind::Float(fk) => float_binary(op, kind, fk, lhs.as_float(kind), rhs.as_float(kind)),
        NumKind::Complex(fk) => complex_binary(op, kind, fk, lhs.as_complex(kind), rhs.as_complex(kind)),
    }
}

fn int_binary(op: BinaryOp, kind: NumKind, a: u64, b: u64) -> Result<Scalar, ScalarError> {
    let signed = kind.is_signed();
    let bits = kind.int_bits();
    let raw = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div | BinaryOp::Mod => {
            if b == 0 {
                return Err(ScalarError::DivisionByZero);
            }
            match (op, signed) {
                (BinaryOp::Div, true) => (a as i64).wrapping_div(b as i64) as u64,
                (BinaryOp::Div, false) => a / b,
                (_, true) => (a as i64).wrapping_rem(b as i64) as u64,
                (_, false) => a % b,
            }
        }
        BinaryOp::Pow => int_pow(a, b, signed)?,
        BinaryOp::And => a & b,
        BinaryOp::Or => a | b,
        BinaryOp::Xor => a ^ b,
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::Ushr => {
            let amount = if signed { b as i64 } else { i64::try_from(b).unwrap_or(i64::MAX) };
            if amount < 0 || amount >= i64::from(bits) {
                return Err(ScalarError::ShiftOutOfRange { amount, bits });
            }
            let amount = amount as u32;
            match op {
                BinaryOp::Shl => a << amount,
                BinaryOp::Shr if signed => ((a as i64) >> amount) as u64,
                BinaryOp::Shr => a >> amount,
                _ => {
                    let unsigned = NumKind::Int { bits, signed: false }.normalize(a);
                    unsigned >> amount
                }
            }
        }
        _ => return Err(unsupported(op, kind)),
    };
    Ok(Scalar::Int(kind.normalize(raw)))
}

fn int_pow(base: u64, exponent: u64, signed: bool) -> Result<u64, ScalarError> {
    if signed && (exponent as i64) < 0 {
        return match base as i64 {
            1 => Ok(1),
            -1 => Ok(if exponent & 1 == 0 { 1 } else { u64::MAX }),
            0 => Err(ScalarError::DivisionByZero),
            b => Err(ScalarError::NegativeExponent {
                base: b,
                exponent: exponent as i64,
            }),
        };
    }
    let mut result: u64 = 1;
    let mut b = base;
    let mut e = exponent;
    while e > 0 {
        if e & 1 == 1 {
            result = result.wrapping_mul(b);
        }
        b = b.wrapping_mul(b);
        e >>= 1;
    }
    Ok(result)
}

fn float_binary(op: BinaryOp, kind: NumKind, fk: FloatKind, a: f64, b: f64) -> Result<Scalar, ScalarError> {
    let v = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Mod => a % b,
        BinaryOp::Pow => a.powf(b),
        _ => return Err(unsupported(op, kind)),
    };
    Ok(Scalar::Float(fk.round(v)))
}

fn complex_binary(
    op: BinaryOp,
    kind: NumKind,
    fk: FloatKind,
    (ar, ai): (f64, f64),
    (br, bi): (f64, f64),
) -> Result<Scalar, ScalarError> {
    let (re, im) = match op {
        BinaryOp::Add => (ar + br, ai + bi),
        BinaryOp::Sub => (ar - br, ai - bi),
        BinaryOp::Mul => (ar * br - ai * bi, ar * bi + ai * br),
        BinaryOp::Div => {
            let denom = br * br + bi * bi;
            ((ar * br + ai * bi) / denom, (ai * br - ar * bi) / denom)
        }
        _ => return Err(unsupported(op, kind)),
    };
    Ok(Scalar::Complex(fk.round(re), fk.round(im)))
}

/// Apply a relational, equality or identity operator to operands of `kind`.
pub fn compare(op: BinaryOp, kind: NumKind, lhs: Scalar, rhs: Scalar) -> Result<bool, ScalarError> {
    match kind {
        NumKind::Bool | NumKind::Int { .. } => {
            let (a, b) = (lhs.as_bits(), rhs.as_bits());
            let ord = if kind.is_signed() {
                (a as i64).cmp(&(b as i64))
            } else {
                a.cmp(&b)
            };
            Ok(match op {
                BinaryOp::Lt => ord.is_lt(),
                BinaryOp::Le => ord.is_le(),
                BinaryOp::Gt => ord.is_gt(),
                BinaryOp::Ge => ord.is_ge(),
                BinaryOp::Eq | BinaryOp::Is => ord.is_eq(),
                BinaryOp::Ne | BinaryOp::NotIs => ord.is_ne(),
                _ => return Err(unsupported(op, kind)),
            })
        }
        NumKind::Float(_) => {
            let (a, b) = (lhs.as_float(kind), rhs.as_float(kind));
            Ok(match op {
                BinaryOp::Lt => a < b,
                BinaryOp::Le => a <= b,
                BinaryOp::Gt => a > b,
                BinaryOp::Ge => a >= b,
                BinaryOp::Eq => a == b,
                BinaryOp::Ne => a != b,
                BinaryOp::Is => a.to_bits() == b.to_bits(),
                BinaryOp::NotIs => a.to_bits() != b.to_bits(),
                _ => return Err(unsupported(op, kind)),
            })
        }
        NumKind::Complex(_) => {
            let (a, b) = (lhs.as_complex(kind), rhs.as_complex(kind));
            Ok(match op {
                BinaryOp::Eq => a == b,
                BinaryOp::Ne => a != b,
                BinaryOp::Is => a.0.to_bits() == b.0.to_bits() && a.1.to_bits() == b.1.to_bits(),
                BinaryOp::NotIs => a.0.to_bits() != b.0.to_bits() || a.1.to_bits() != b.1.to_bits(),
                _ => return Err(unsupported(op, kind)),
            })
        }
    }
}

/// Apply a prefix operator. `!` yields a `bool` scalar (0 or 1).
pub fn unary(op: UnaryOp, kind: NumKind, v: Scalar) -> Result<Scalar, ScalarError> {
    Ok(match (op, v) {
        (UnaryOp::UAdd, v) => v,
        (UnaryOp::Not, v) => Scalar::Int(u64::from(!v.is_true())),
        (UnaryOp::Neg, Scalar::Int(x)) => Scalar::Int(kind.normalize(x.wrapping_neg())),
        (UnaryOp::Neg, Scalar::Float(f)) => Scalar::Float(-f),
        (UnaryOp::Neg, Scalar::Complex(re, im)) => Scalar::Complex(-re, -im),
        (UnaryOp::Com, Scalar::Int(x)) => Scalar::Int(kind.normalize(!x)),
        (UnaryOp::Com, _) => {
            return Err(ScalarError::Unsupported {
                op: "~",
                kind: kind.describe(),
            })
        }
    })
}

/// Convert `v` from one numeric kind to another.
pub fn cast(v: Scalar, from: NumKind, to: NumKind) -> Scalar {
    match to {
        NumKind::Bool => Scalar::Int(u64::from(v.is_true())),
        NumKind::Int { signed, .. } => {
            let bits = match v {
                Scalar::Int(x) => x,
                Scalar::Float(f) | Scalar::Complex(f, _) => {
                    if signed {
                        f as i64 as u64
                    } else if f < 0.0 {
                        f as i64 as u64
                    } else {
                        f as u64
                    }
                }
            };
            Scalar::Int(to.normalize(bits))
        }
        NumKind::Float(fk) => Scalar::Float(fk.round(v.as_float(from))),
        NumKind::Complex(fk) => {
            let (re, im) = v.as_complex(from);
            Scalar::Complex(fk.round(re), fk.round(im))
        }
    }
}

#[cfg(test)]
mod tests;
