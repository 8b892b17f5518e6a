//! Turning interpreter values back into literal trees.

use dex_ir::scalar;
use dex_ir::{ExprId, ExprKind, Program, Span, TypeId, TypeKind};

use super::Value;

/// A value with no literal form, such as a pointer or a class instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Unrepresentable(pub &'static str);

impl Value {
    /// Build a literal of type `ty` holding this value.
    ///
    /// Every node is new; nothing in the result is shared with the tree
    /// the value was computed from.
    pub(crate) fn to_literal(&self, program: &mut Program, ty: TypeId, span: Span) -> Result<ExprId, Unrepresentable> {
        match self {
            Value::Scalar { value, ty: from } => {
                let value = match (program.types.num_kind(*from), program.types.num_kind(ty)) {
                    (Some(from), Some(to)) if from != to => scalar::cast(*value, from, to),
                    _ => *value,
                };
                Ok(program.scalar_lit(value, ty, span))
            }
            Value::Null(_) => Ok(program.null_lit(ty, span)),
            Value::Array(array) => {
                if program.types.is_slice(ty) {
                    if let Some(width) = program.types.string_width(ty) {
                        if let Some(text) = self.code_units().and_then(|units| width.decode(&units)) {
                            return Ok(program.string_lit(&text, width, true, ty, span));
                        }
                    }
                }
                let elem_ty = program.types.elem_raw(ty);
                let mut elems = Vec::with_capacity(array.len);
                for elem in array.elements() {
                    let elem_ty = elem_ty.unwrap_or_else(|| elem.ty());
                    elems.push(elem.to_literal(program, elem_ty, span)?);
                }
                let range = program.arena.alloc_list(elems);
                Ok(program.arena.alloc_typed(ExprKind::ArrayLiteral(range), span, ty))
            }
            Value::Assoc(aa) => {
                let (key_ty, value_ty) = match program.types.base_kind(ty) {
                    TypeKind::AssocArray { key, value } => (Some(*key), Some(*value)),
                    _ => (None, None),
                };
                let entries = aa.entries.borrow().clone();
                let mut keys = Vec::with_capacity(entries.len());
                let mut values = Vec::with_capacity(entries.len());
                for (key, value) in &entries {
                    keys.push(key.to_literal(program, key_ty.unwrap_or_else(|| key.ty()), span)?);
                    values.push(value.to_literal(program, value_ty.unwrap_or_else(|| value.ty()), span)?);
                }
                let keys = program.arena.alloc_list(keys);
                let values = program.arena.alloc_list(values);
                Ok(program
                    .arena
                    .alloc_typed(ExprKind::AssocArrayLiteral { keys, values }, span, ty))
            }
            Value::Struct(s) => {
                if program.types.is_class(s.ty) {
                    return Err(Unrepresentable("a class instance"));
                }
                let field_decls = program.decls.agg(s.agg).fields.clone();
                let fields = s.fields.borrow().clone();
                let mut elems = Vec::with_capacity(fields.len());
                for (value, field) in fields.iter().zip(field_decls) {
                    let field_ty = program.decls.var(field).ty;
                    elems.push(value.to_literal(program, field_ty, span)?);
                }
                let elements = program.arena.alloc_list(elems);
                Ok(program.arena.alloc_typed(
                    ExprKind::StructLiteral { agg: s.agg, elements },
                    span,
                    ty,
                ))
            }
            Value::Tuple { elements, .. } => {
                let elem_tys = match program.types.base_kind(ty) {
                    TypeKind::Tuple(tys) => tys.to_vec(),
                    _ => Vec::new(),
                };
                let mut elems = Vec::with_capacity(elements.len());
                for (i, elem) in elements.iter().enumerate() {
                    let elem_ty = elem_tys.get(i).copied().unwrap_or_else(|| elem.ty());
                    elems.push(elem.to_literal(program, elem_ty, span)?);
                }
                let elements = program.arena.alloc_list(elems);
                Ok(program.arena.alloc_typed(
                    ExprKind::Tuple {
                        prelude: ExprId::INVALID,
                        elements,
                    },
                    span,
                    ty,
                ))
            }
            Value::Func { func, .. } => Ok(program.arena.alloc_typed(
                ExprKind::Func {
                    func: *func,
                    has_overloads: false,
                },
                span,
                ty,
            )),
            Value::Pointer { .. } => Err(Unrepresentable("a pointer")),
            Value::TypeInfo(_) => Err(Unrepresentable("a type info reference")),
            Value::Void => Err(Unrepresentable("a void value")),
        }
    }
}

#[cfg(test)]
mod tests {
    use dex_ir::CharWidth;

    use super::*;
    use crate::value::ArrayValue;

    #[test]
    fn strings_come_back_as_string_literals() {
        let mut program = Program::new("t", "t.d", "");
        let units = CharWidth::One
            .encode("hey")
            .into_iter()
            .map(|u| Value::int(u64::from(u), TypeId::IMMUTABLE_CHAR))
            .collect();
        let value = Value::Array(ArrayValue::fresh(units, TypeId::STRING));
        let lit = value.to_literal(&mut program, TypeId::STRING, Span::DUMMY);
        let lit = lit.unwrap_or(ExprId::INVALID);
        assert_eq!(program.string_of(lit), Some(("hey", CharWidth::One)));
    }

    #[test]
    fn scalars_are_converted_to_the_requested_type() {
        let mut program = Program::new("t", "t.d", "");
        let lit = Value::int(3, TypeId::INT)
            .to_literal(&mut program, TypeId::DOUBLE, Span::DUMMY)
            .unwrap_or(ExprId::INVALID);
        assert_eq!(program.arena.kind(lit), ExprKind::Real(3.0f64.to_bits()));
    }

    #[test]
    fn pointers_have_no_literal_form() {
        let mut program = Program::new("t", "t.d", "");
        let target = Value::int(1, TypeId::INT).temporary();
        let ptr = Value::Pointer {
            target,
            ty: TypeId::ERROR,
        };
        assert_eq!(
            ptr.to_literal(&mut program, TypeId::ERROR, Span::DUMMY),
            Err(Unrepresentable("a pointer"))
        );
    }
}
