//! Type introspection for mock targets.
//!
//! [`Mockable`] describes a type's shape lazily through [`TypeInfo`] and
//! gives the materializer mutable access to tagged fields and sequence
//! elements. Structs get it from `#[derive(Mockable)]`; primitives,
//! `String`, `Vec`, `Option` and `Box` are covered here.

use std::any::{TypeId, type_name};
use std::collections::{BTreeMap, HashMap};

use crate::value::{AssignError, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
    Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatWidth {
    F32,
    F64,
}

/// Structural shape of a type. Nested types are described through function
/// pointers so recursive types stay finite.
#[derive(Clone, Copy)]
pub enum Shape {
    Bool,
    Int(IntWidth),
    Uint(IntWidth),
    Float(FloatWidth),
    String,
    Slice(fn() -> TypeInfo),
    Pointer(fn() -> TypeInfo),
    Struct(fn() -> Vec<FieldInfo>),
    Unsupported(&'static str),
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Bool => f.write_str("Bool"),
            Shape::Int(width) => f.debug_tuple("Int").field(width).finish(),
            Shape::Uint(width) => f.debug_tuple("Uint").field(width).finish(),
            Shape::Float(width) => f.debug_tuple("Float").field(width).finish(),
            Shape::String => f.write_str("String"),
            Shape::Slice(element) => f.debug_tuple("Slice").field(&element().name).finish(),
            Shape::Pointer(pointee) => f.debug_tuple("Pointer").field(&pointee().name).finish(),
            Shape::Struct(_) => f.write_str("Struct"),
            Shape::Unsupported(kind) => f.debug_tuple("Unsupported").field(kind).finish(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
    pub shape: Shape,
}

impl TypeInfo {
    pub fn of<T: 'static>(shape: Shape) -> Self {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
            shape,
        }
    }

    /// Follows pointer layers down to the pointee. The flag reports whether
    /// any layer was stripped.
    pub fn strip_pointers(self) -> (TypeInfo, bool) {
        let mut info = self;
        let mut is_ptr = false;
        while let Shape::Pointer(pointee) = info.shape {
            info = pointee();
            is_ptr = true;
        }
        (info, is_ptr)
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.shape, Shape::Struct(_))
    }
}

/// A tagged field of a struct.
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo {
    /// Declaration position, used to reach the field at generation time.
    pub index: usize,
    pub name: &'static str,
    /// `(marker, raw tag)` pairs attached to the field.
    pub tags: &'static [(&'static str, &'static str)],
    pub ty: fn() -> TypeInfo,
}

impl FieldInfo {
    pub fn tag(&self, marker: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(name, _)| *name == marker)
            .map(|(_, raw)| *raw)
    }
}

/// A type the mocker can fill.
pub trait Mockable: 'static {
    fn type_info() -> TypeInfo
    where
        Self: Sized;

    fn assign(&mut self, value: Value) -> Result<(), AssignError>;

    /// Tagged field at declaration position `index`.
    fn field_mut(&mut self, _index: usize) -> Option<&mut dyn Mockable> {
        None
    }

    fn element_count(&self) -> usize {
        0
    }

    fn element_mut(&mut self, _index: usize) -> Option<&mut dyn Mockable> {
        None
    }

    /// True for an empty pointer that has nothing to descend into.
    fn is_vacant(&self) -> bool {
        false
    }
}

fn mismatch<T>(value: &Value) -> AssignError {
    AssignError::mismatch(type_name::<T>(), value)
}

macro_rules! impl_integer {
    ($($ty:ty => $shape:expr),* $(,)?) => {$(
        impl Mockable for $ty {
            fn type_info() -> TypeInfo {
                TypeInfo::of::<Self>($shape)
            }

            fn assign(&mut self, value: Value) -> Result<(), AssignError> {
                *self = match value {
                    Value::Zero => 0,
                    Value::Int(raw) => <$ty>::try_from(raw).map_err(|_| AssignError::OutOfRange {
                        value: raw,
                        target: type_name::<$ty>(),
                    })?,
                    other => other.downcast::<$ty>().map_err(|other| mismatch::<$ty>(&other))?,
                };
                Ok(())
            }
        }
    )*};
}

impl_integer!(
    i8 => Shape::Int(IntWidth::W8),
    i16 => Shape::Int(IntWidth::W16),
    i32 => Shape::Int(IntWidth::W32),
    i64 => Shape::Int(IntWidth::W64),
    isize => Shape::Int(IntWidth::Size),
    u8 => Shape::Uint(IntWidth::W8),
    u16 => Shape::Uint(IntWidth::W16),
    u32 => Shape::Uint(IntWidth::W32),
    u64 => Shape::Uint(IntWidth::W64),
    usize => Shape::Uint(IntWidth::Size),
);

macro_rules! impl_float {
    ($($ty:ty => $shape:expr),* $(,)?) => {$(
        impl Mockable for $ty {
            fn type_info() -> TypeInfo {
                TypeInfo::of::<Self>($shape)
            }

            fn assign(&mut self, value: Value) -> Result<(), AssignError> {
                *self = match value {
                    Value::Zero => 0.0,
                    Value::Float(raw) => raw as $ty,
                    Value::Int(raw) => raw as $ty,
                    other => other.downcast::<$ty>().map_err(|other| mismatch::<$ty>(&other))?,
                };
                Ok(())
            }
        }
    )*};
}

impl_float!(f32 => Shape::Float(FloatWidth::F32), f64 => Shape::Float(FloatWidth::F64));

impl Mockable for bool {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Shape::Bool)
    }

    fn assign(&mut self, value: Value) -> Result<(), AssignError> {
        *self = match value {
            Value::Zero => false,
            Value::Bool(raw) => raw,
            other => other.downcast::<bool>().map_err(|other| mismatch::<bool>(&other))?,
        };
        Ok(())
    }
}

impl Mockable for String {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Shape::String)
    }

    fn assign(&mut self, value: Value) -> Result<(), AssignError> {
        *self = match value {
            Value::Zero => String::new(),
            Value::Text(raw) => raw,
            other => other.downcast::<String>().map_err(|other| mismatch::<String>(&other))?,
        };
        Ok(())
    }
}

impl<T: Mockable + Default> Mockable for Vec<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Shape::Slice(T::type_info))
    }

    fn assign(&mut self, value: Value) -> Result<(), AssignError> {
        match value {
            Value::Zero => self.clear(),
            Value::Length(len) => {
                self.clear();
                self.try_reserve_exact(len).map_err(|_| AssignError::Capacity {
                    len,
                    target: type_name::<Self>(),
                })?;
                self.resize_with(len, T::default);
            }
            Value::List(values) => {
                let mut items = Vec::with_capacity(values.len());
                for value in values {
                    let mut item = T::default();
                    item.assign(value)?;
                    items.push(item);
                }
                *self = items;
            }
            other => *self = other.downcast::<Self>().map_err(|other| mismatch::<Self>(&other))?,
        }
        Ok(())
    }

    fn element_count(&self) -> usize {
        self.len()
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Mockable> {
        self.get_mut(index).map(|item| item as &mut dyn Mockable)
    }
}

impl<T: Mockable + Default> Mockable for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Shape::Pointer(T::type_info))
    }

    fn assign(&mut self, value: Value) -> Result<(), AssignError> {
        let value = match value.downcast::<Self>() {
            Ok(value) => {
                *self = value;
                return Ok(());
            }
            Err(value) => value,
        };
        let mut inner = T::default();
        if !matches!(value, Value::Allocate) {
            inner.assign(value)?;
        }
        *self = Some(inner);
        Ok(())
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Mockable> {
        self.as_mut()?.field_mut(index)
    }

    fn element_count(&self) -> usize {
        self.as_ref().map_or(0, |inner| inner.element_count())
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Mockable> {
        self.as_mut()?.element_mut(index)
    }

    fn is_vacant(&self) -> bool {
        self.is_none()
    }
}

impl<T: Mockable + Default> Mockable for Box<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Shape::Pointer(T::type_info))
    }

    fn assign(&mut self, value: Value) -> Result<(), AssignError> {
        match value.downcast::<Self>() {
            Ok(value) => *self = value,
            Err(Value::Allocate) => **self = T::default(),
            Err(value) => {
                let mut inner = T::default();
                inner.assign(value)?;
                **self = inner;
            }
        }
        Ok(())
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Mockable> {
        (**self).field_mut(index)
    }

    fn element_count(&self) -> usize {
        (**self).element_count()
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Mockable> {
        (**self).element_mut(index)
    }

    fn is_vacant(&self) -> bool {
        (**self).is_vacant()
    }
}

fn assign_opaque<T: 'static>(target: &mut T, value: Value) -> Result<(), AssignError> {
    *target = value.downcast::<T>().map_err(|other| mismatch::<T>(&other))?;
    Ok(())
}

impl<T: 'static, const N: usize> Mockable for [T; N] {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Shape::Unsupported("array"))
    }

    fn assign(&mut self, value: Value) -> Result<(), AssignError> {
        assign_opaque(self, value)
    }
}

impl<K: 'static, V: 'static, S: 'static> Mockable for HashMap<K, V, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Shape::Unsupported("map"))
    }

    fn assign(&mut self, value: Value) -> Result<(), AssignError> {
        assign_opaque(self, value)
    }
}

impl<K: 'static, V: 'static> Mockable for BTreeMap<K, V> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Shape::Unsupported("map"))
    }

    fn assign(&mut self, value: Value) -> Result<(), AssignError> {
        assign_opaque(self, value)
    }
}

impl Mockable for char {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Shape::Unsupported("char"))
    }

    fn assign(&mut self, value: Value) -> Result<(), AssignError> {
        assign_opaque(self, value)
    }
}

impl Mockable for () {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Shape::Unsupported("unit"))
    }

    fn assign(&mut self, value: Value) -> Result<(), AssignError> {
        assign_opaque(self, value)
    }
}

impl<A: 'static, B: 'static> Mockable for (A, B) {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Shape::Unsupported("tuple"))
    }

    fn assign(&mut self, value: Value) -> Result<(), AssignError> {
        assign_opaque(self, value)
    }
}
