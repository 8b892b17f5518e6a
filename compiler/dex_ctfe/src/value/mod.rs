//! Interpreter values.
//!
//! Values are built fresh by the interpreter and never point back into the
//! expression arena. Aggregates keep their contents in [`Storage`]; cloning
//! a `Value` is shallow, so a clone observes later writes. Value semantics
//! (struct and static array assignment) are applied explicitly with
//! [`Value::copied`] wherever the language copies.

mod literal;
mod print;

use dex_ir::{AggId, FuncId, Scalar, TypeId, TypePool};

use crate::environment::Storage;

pub(crate) use literal::Unrepresentable;

#[derive(Clone, Debug)]
pub enum Value {
    /// Result of a `void` call or statement.
    Void,
    /// Integral, character, boolean, floating or complex value.
    Scalar { value: Scalar, ty: TypeId },
    /// Null pointer, class reference, slice or associative array.
    Null(TypeId),
    /// A window onto array storage; strings are arrays of code units.
    Array(ArrayValue),
    Assoc(AssocValue),
    /// Struct value or class instance, told apart by `ty`.
    Struct(StructValue),
    Pointer { target: Place, ty: TypeId },
    Func { func: FuncId, ty: TypeId },
    Tuple { elements: Vec<Value>, ty: TypeId },
    TypeInfo(TypeId),
}

#[derive(Clone, Debug)]
pub struct ArrayValue {
    pub data: Storage<Vec<Value>>,
    pub start: usize,
    pub len: usize,
    pub ty: TypeId,
}

/// Entries in insertion order; keys compare with [`Value::same_value`].
#[derive(Clone, Debug)]
pub struct AssocValue {
    pub entries: Storage<Vec<(Value, Value)>>,
    pub ty: TypeId,
}

#[derive(Clone, Debug)]
pub struct StructValue {
    pub agg: AggId,
    /// One value per field of `agg`, in declaration order.
    pub fields: Storage<Vec<Value>>,
    pub ty: TypeId,
}

/// Something that can be read and written.
#[derive(Clone, Debug)]
pub enum Place {
    /// A variable, a heap cell or a materialized temporary.
    Slot(Storage<Value>),
    Element { data: Storage<Vec<Value>>, index: usize },
    Field { fields: Storage<Vec<Value>>, index: usize },
    /// `aa[key]`; writing inserts.
    Entry {
        entries: Storage<Vec<(Value, Value)>>,
        key: Box<Value>,
    },
}

impl Value {
    pub fn int(bits: u64, ty: TypeId) -> Self {
        Value::Scalar {
            value: Scalar::Int(bits),
            ty,
        }
    }

    pub fn bool(b: bool) -> Self {
        Value::int(u64::from(b), TypeId::BOOL)
    }

    pub fn size(len: usize) -> Self {
        Value::int(len as u64, TypeId::SIZE_T)
    }

    pub fn temporary(self) -> Place {
        Place::Slot(Storage::new(self))
    }

    /// Static type the value was created with.
    pub fn ty(&self) -> TypeId {
        match self {
            Value::Void => TypeId::VOID,
            Value::Scalar { ty, .. }
            | Value::Null(ty)
            | Value::Pointer { ty, .. }
            | Value::Func { ty, .. }
            | Value::Tuple { ty, .. } => *ty,
            Value::Array(a) => a.ty,
            Value::Assoc(aa) => aa.ty,
            Value::Struct(s) => s.ty,
            Value::TypeInfo(_) => TypeId::TYPEINFO,
        }
    }

    /// Truth value of a condition.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Scalar { value, .. } => value.is_true(),
            Value::Void | Value::Null(_) => false,
            Value::Array(_)
            | Value::Assoc(_)
            | Value::Struct(_)
            | Value::Pointer { .. }
            | Value::Func { .. }
            | Value::Tuple { .. }
            | Value::TypeInfo(_) => true,
        }
    }

    /// The copy made when the value is assigned or passed by value: struct
    /// values and static arrays get fresh storage, recursively; references
    /// (slices, pointers, class instances, associative arrays) are shared.
    #[must_use]
    pub fn copied(&self, types: &TypePool) -> Value {
        match self {
            Value::Array(a) if types.is_static_array(a.ty) => {
                let elems = a.elements().iter().map(|e| e.copied(types)).collect();
                Value::Array(ArrayValue::fresh(elems, a.ty))
            }
            Value::Struct(s) if !types.is_class(s.ty) => {
                let fields = s.fields.borrow().iter().map(|f| f.copied(types)).collect();
                Value::Struct(StructValue::fresh(s.agg, fields, s.ty))
            }
            Value::Tuple { elements, ty } => Value::Tuple {
                elements: elements.iter().map(|e| e.copied(types)).collect(),
                ty: *ty,
            },
            other => other.clone(),
        }
    }

    /// Structural equality as `==` sees it: arrays and structs element by
    /// element, class instances and pointers by identity, `null` equal to
    /// an empty array.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) => true,
            (Value::Scalar { value: a, .. }, Value::Scalar { value: b, .. }) => a == b,
            (Value::Null(_), Value::Null(_)) => true,
            (Value::Null(_), Value::Array(a)) | (Value::Array(a), Value::Null(_)) => a.len == 0,
            (Value::Null(_), Value::Assoc(aa)) | (Value::Assoc(aa), Value::Null(_)) => aa.entries.borrow().is_empty(),
            (Value::Array(a), Value::Array(b)) => {
                a.len == b.len && a.elements().iter().zip(b.elements().iter()).all(|(x, y)| x.same_value(y))
            }
            (Value::Assoc(a), Value::Assoc(b)) => {
                if a.entries.ptr_eq(&b.entries) {
                    return true;
                }
                let (a, b) = (a.entries.borrow(), b.entries.borrow());
                a.len() == b.len()
                    && a.iter().all(|(k, v)| {
                        b.iter()
                            .find(|(bk, _)| bk.same_value(k))
                            .is_some_and(|(_, bv)| bv.same_value(v))
                    })
            }
            (Value::Struct(a), Value::Struct(b)) => {
                if a.fields.ptr_eq(&b.fields) {
                    return true;
                }
                a.agg == b.agg && {
                    let (a, b) = (a.fields.borrow(), b.fields.borrow());
                    a.iter().zip(b.iter()).all(|(x, y)| x.same_value(y))
                }
            }
            (Value::Pointer { target: a, .. }, Value::Pointer { target: b, .. }) => a.same(b),
            (Value::Func { func: a, .. }, Value::Func { func: b, .. }) => a == b,
            (Value::Tuple { elements: a, .. }, Value::Tuple { elements: b, .. }) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_value(y))
            }
            (Value::TypeInfo(a), Value::TypeInfo(b)) => a == b,
            _ => false,
        }
    }

    /// Identity as `is` sees it: same storage for references, equality
    /// for everything else.
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => {
                (a.data.ptr_eq(&b.data) && a.start == b.start && a.len == b.len) || (a.len == 0 && b.len == 0)
            }
            (Value::Struct(a), Value::Struct(b)) => a.fields.ptr_eq(&b.fields),
            (Value::Assoc(a), Value::Assoc(b)) => a.entries.ptr_eq(&b.entries),
            (Value::Null(_), Value::Null(_)) => true,
            (Value::Null(_), Value::Array(a)) | (Value::Array(a), Value::Null(_)) => a.len == 0,
            (Value::Null(_), _) | (_, Value::Null(_)) => false,
            _ => self.same_value(other),
        }
    }

    /// Code units of a string value, `None` for anything else.
    pub fn code_units(&self) -> Option<Vec<u32>> {
        match self {
            Value::Array(a) => a
                .elements()
                .iter()
                .map(|e| match e {
                    Value::Scalar {
                        value: Scalar::Int(unit),
                        ..
                    } => u32::try_from(*unit).ok(),
                    _ => None,
                })
                .collect(),
            Value::Null(_) => Some(Vec::new()),
            _ => None,
        }
    }
}

impl ArrayValue {
    /// An array over new storage holding exactly `elems`.
    pub fn fresh(elems: Vec<Value>, ty: TypeId) -> Self {
        let len = elems.len();
        ArrayValue {
            data: Storage::new(elems),
            start: 0,
            len,
            ty,
        }
    }

    /// The elements in the window, cloned out of the storage.
    pub fn elements(&self) -> Vec<Value> {
        let data = self.data.borrow();
        let end = (self.start + self.len).min(data.len());
        data.get(self.start..end).map(<[Value]>::to_vec).unwrap_or_default()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        if index >= self.len {
            return None;
        }
        self.data.borrow().get(self.start + index).cloned()
    }

    pub fn element_place(&self, index: usize) -> Place {
        Place::Element {
            data: self.data.clone(),
            index: self.start + index,
        }
    }
}

impl AssocValue {
    pub fn empty(ty: TypeId) -> Self {
        AssocValue {
            entries: Storage::new(Vec::new()),
            ty,
        }
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.entries
            .borrow()
            .iter()
            .find(|(k, _)| k.same_value(key))
            .map(|(_, v)| v.clone())
    }

    pub fn insert(&self, key: Value, value: Value) {
        let mut entries = self.entries.borrow_mut();
        match entries.iter_mut().find(|(k, _)| k.same_value(&key)) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
    }

    pub fn remove(&self, key: &Value) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|(k, _)| k.same_value(key)) {
            Some(pos) => {
                entries.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl StructValue {
    pub fn fresh(agg: AggId, fields: Vec<Value>, ty: TypeId) -> Self {
        StructValue {
            agg,
            fields: Storage::new(fields),
            ty,
        }
    }

    pub fn field_place(&self, index: usize) -> Place {
        Place::Field {
            fields: self.fields.clone(),
            index,
        }
    }
}

impl Place {
    /// Current value; `None` past the end of array storage or for a
    /// missing associative array key.
    pub fn read(&self) -> Option<Value> {
        match self {
            Place::Slot(slot) => Some(slot.borrow().clone()),
            Place::Element { data, index } => data.borrow().get(*index).cloned(),
            Place::Field { fields, index } => fields.borrow().get(*index).cloned(),
            Place::Entry { entries, key } => entries
                .borrow()
                .iter()
                .find(|(k, _)| k.same_value(key))
                .map(|(_, v)| v.clone()),
        }
    }

    /// Store `value`; `false` when the place lies outside its storage.
    pub fn write(&self, value: Value) -> bool {
        match self {
            Place::Slot(slot) => {
                *slot.borrow_mut() = value;
                true
            }
            Place::Element { data: storage, index } | Place::Field { fields: storage, index } => {
                match storage.borrow_mut().get_mut(*index) {
                    Some(slot) => {
                        *slot = value;
                        true
                    }
                    None => false,
                }
            }
            Place::Entry { entries, key } => {
                let mut entries = entries.borrow_mut();
                match entries.iter_mut().find(|(k, _)| k.same_value(key)) {
                    Some(entry) => entry.1 = value,
                    None => entries.push(((**key).clone(), value)),
                }
                true
            }
        }
    }

    /// Whether both places denote the same location.
    pub fn same(&self, other: &Place) -> bool {
        match (self, other) {
            (Place::Slot(a), Place::Slot(b)) => a.ptr_eq(b),
            (Place::Element { data: a, index: i }, Place::Element { data: b, index: j })
            | (Place::Field { fields: a, index: i }, Place::Field { fields: b, index: j }) => a.ptr_eq(b) && i == j,
            (Place::Entry { entries: a, key: k }, Place::Entry { entries: b, key: l }) => {
                a.ptr_eq(b) && k.same_value(l)
            }
            _ => false,
        }
    }

    /// Length of the array storage an element place points into.
    pub fn storage_len(&self) -> Option<usize> {
        match self {
            Place::Element { data, .. } => Some(data.borrow().len()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[u64]) -> Value {
        let elems = values.iter().map(|&v| Value::int(v, TypeId::INT)).collect();
        Value::Array(ArrayValue::fresh(elems, TypeId::ERROR))
    }

    #[test]
    fn arrays_compare_by_elements() {
        assert!(ints(&[1, 2]).same_value(&ints(&[1, 2])));
        assert!(!ints(&[1, 2]).same_value(&ints(&[1, 3])));
        assert!(ints(&[]).same_value(&Value::Null(TypeId::NULL)));
        assert!(!ints(&[1, 2]).identical(&ints(&[1, 2])));
    }

    #[test]
    fn copies_of_static_arrays_do_not_alias() {
        let mut types = TypePool::new();
        let ty = types.array(TypeId::INT, 2);
        let original = Value::Array(ArrayValue::fresh(vec![Value::int(1, TypeId::INT); 2], ty));
        let copy = original.copied(&types);
        let Value::Array(copy) = copy else {
            panic!("expected an array");
        };
        copy.element_place(0).write(Value::int(9, TypeId::INT));
        let Value::Array(original) = original else {
            panic!("expected an array");
        };
        assert!(original.get(0).is_some_and(|v| v.same_value(&Value::int(1, TypeId::INT))));
    }

    #[test]
    fn slices_share_storage() {
        let mut types = TypePool::new();
        let ty = types.slice(TypeId::INT);
        let Value::Array(array) = ints(&[1, 2, 3]) else {
            panic!("expected an array");
        };
        let slice = Value::Array(ArrayValue {
            ty,
            ..array.clone()
        });
        let Value::Array(shared) = slice.copied(&types) else {
            panic!("expected an array");
        };
        shared.element_place(1).write(Value::int(7, TypeId::INT));
        assert!(array.get(1).is_some_and(|v| v.same_value(&Value::int(7, TypeId::INT))));
    }

    #[test]
    fn entries_insert_on_write() {
        let aa = AssocValue::empty(TypeId::ERROR);
        let place = Place::Entry {
            entries: aa.entries.clone(),
            key: Box::new(Value::int(3, TypeId::INT)),
        };
        assert!(place.read().is_none());
        assert!(place.write(Value::int(30, TypeId::INT)));
        assert_eq!(aa.len(), 1);
        assert!(aa.remove(&Value::int(3, TypeId::INT)));
        assert!(aa.is_empty());
    }
}
