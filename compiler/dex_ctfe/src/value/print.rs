//! Source-like rendering of values for diagnostics.

use std::fmt::Write;

use dex_ir::{NumKind, Program, Scalar, TypeId};
use rustc_hash::FxHashSet;

use super::{Place, Value};

impl Value {
    /// Render the value the way it would be written in source.
    ///
    /// Class instances and pointers can form cycles; a storage seen twice
    /// on the current path prints as `<cycle>`.
    pub fn display(&self, program: &Program) -> String {
        let mut out = String::new();
        let mut visiting = FxHashSet::default();
        write_value(&mut out, self, program, &mut visiting);
        out
    }

    /// Text of a string value, `None` for anything else.
    pub fn text(&self, program: &Program) -> Option<String> {
        let width = program.types.string_width(self.ty())?;
        width.decode(&self.code_units()?)
    }
}

fn write_value(out: &mut String, value: &Value, program: &Program, visiting: &mut FxHashSet<usize>) {
    match value {
        Value::Void => out.push_str("void"),
        Value::Scalar { value, ty } => write_scalar(out, *value, *ty, program),
        Value::Null(_) => out.push_str("null"),
        Value::Array(array) => {
            if let Some(text) = value.text(program) {
                let _ = write!(out, "{text:?}");
                return;
            }
            if !visiting.insert(array.data.id()) {
                out.push_str("<cycle>");
                return;
            }
            write_list(out, &array.elements(), program, visiting);
            visiting.remove(&array.data.id());
        }
        Value::Assoc(aa) => {
            if !visiting.insert(aa.entries.id()) {
                out.push_str("<cycle>");
                return;
            }
            out.push('[');
            for (i, (key, value)) in aa.entries.borrow().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, key, program, visiting);
                out.push_str(": ");
                write_value(out, value, program, visiting);
            }
            out.push(']');
            visiting.remove(&aa.entries.id());
        }
        Value::Struct(s) => {
            if !visiting.insert(s.fields.id()) {
                out.push_str("<cycle>");
                return;
            }
            out.push_str(program.text(program.decls.agg(s.agg).name));
            out.push('(');
            for (i, field) in s.fields.borrow().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, field, program, visiting);
            }
            out.push(')');
            visiting.remove(&s.fields.id());
        }
        Value::Pointer { target, .. } => {
            let id = place_id(target);
            if !visiting.insert(id) {
                out.push_str("<cycle>");
                return;
            }
            out.push('&');
            match target.read() {
                Some(pointee) => write_value(out, &pointee, program, visiting),
                None => out.push_str("<dangling>"),
            }
            visiting.remove(&id);
        }
        Value::Func { func, .. } => {
            out.push('&');
            out.push_str(&program.func_path(*func));
        }
        Value::Tuple { elements, .. } => {
            out.push_str("tuple");
            out.push('(');
            for (i, elem) in elements.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, elem, program, visiting);
            }
            out.push(')');
        }
        Value::TypeInfo(ty) => {
            let _ = write!(out, "typeid({})", program.type_name(*ty));
        }
    }
}

fn write_list(out: &mut String, elems: &[Value], program: &Program, visiting: &mut FxHashSet<usize>) {
    out.push('[');
    for (i, elem) in elems.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_value(out, elem, program, visiting);
    }
    out.push(']');
}

fn write_scalar(out: &mut String, value: Scalar, ty: TypeId, program: &Program) {
    let kind = program.types.num_kind(ty);
    let _ = match (value, kind) {
        (Scalar::Int(v), Some(NumKind::Bool)) => write!(out, "{}", v != 0),
        (Scalar::Int(v), _) if program.types.is_char(ty) => match u32::try_from(v).ok().and_then(char::from_u32) {
            Some(c) => write!(out, "{c:?}"),
            None => write!(out, "'\\U{v:08x}'"),
        },
        (Scalar::Int(v), Some(k)) if k.is_signed() => write!(out, "{}", v as i64),
        (Scalar::Int(v), _) => write!(out, "{v}"),
        (Scalar::Float(f), _) => write!(out, "{f}"),
        (Scalar::Complex(re, im), _) => write!(out, "{re}+{im}i"),
    };
}

fn place_id(place: &Place) -> usize {
    match place {
        Place::Slot(slot) => slot.id(),
        Place::Element { data, index } => data.id().wrapping_add(*index),
        Place::Field { fields, index } => fields.id().wrapping_add(*index),
        Place::Entry { entries, .. } => entries.id(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ArrayValue;

    #[test]
    fn scalars_print_by_type() {
        let program = Program::new("t", "t.d", "");
        assert_eq!(Value::int((-3i64) as u64, TypeId::INT).display(&program), "-3");
        assert_eq!(Value::bool(true).display(&program), "true");
        assert_eq!(Value::int(u64::from(b'x'), TypeId::CHAR).display(&program), "'x'");
    }

    #[test]
    fn arrays_print_as_lists() {
        let program = Program::new("t", "t.d", "");
        let elems = vec![Value::int(1, TypeId::INT), Value::int(2, TypeId::INT)];
        let array = Value::Array(ArrayValue::fresh(elems, TypeId::ERROR));
        assert_eq!(array.display(&program), "[1, 2]");
    }

    #[test]
    fn self_referencing_pointers_terminate() {
        let program = Program::new("t", "t.d", "");
        let slot = crate::Storage::new(Value::Void);
        let ptr = Value::Pointer {
            target: Place::Slot(slot.clone()),
            ty: TypeId::ERROR,
        };
        *slot.borrow_mut() = ptr.clone();
        assert_eq!(ptr.display(&program), "&<cycle>");
    }
}
