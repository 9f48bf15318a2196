//! The typed value carrier shared by inputs and outputs.
//!
//! The source library this engine is modeled on carries values as
//! runtime-typed boxes with attached parameter specs. That introspection
//! machinery collapses here into a small tagged union plus a matching
//! [`TypeTag`] used purely for declaring inputs/outputs and computing
//! their defaults.

use std::sync::Arc;

/// A value carried by an input or an output slot.
///
/// Equality and cloning are both cheap: strings and enum type names are
/// reference-counted, everything else is `Copy`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    /// An enum value: the type name (shared with the declaring [`TypeTag`])
    /// plus the zero-based ordinal of the active variant.
    Enum { type_name: Arc<str>, ordinal: u32 },
    Float(f64),
    String(Arc<str>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_enum_ordinal(&self) -> Option<u32> {
        match self {
            Value::Enum { ordinal, .. } => Some(*ordinal),
            _ => None,
        }
    }

    /// A short, stable label for error messages. Doesn't round-trip enough
    /// to reconstruct a [`TypeTag`] (an enum's variant list isn't
    /// recoverable from a single value) — callers needing that keep the
    /// `TypeTag` from declaration time instead.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Enum { .. } => "enum",
            Value::Float(_) => "float",
            Value::String(_) => "string",
        }
    }
}

/// The declared type of an input or output slot.
///
/// Distinct from [`Value`] because a declaration needs to know the full
/// enum variant set (to synthesize default conditions) while a value only
/// ever carries the active one.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeTag {
    Bool,
    Int,
    /// `variants[i]` is the label `create_default_condition` uses for
    /// ordinal `i` ("synthesizes labels from the input type — one
    /// label per enum member").
    Enum {
        type_name: Arc<str>,
        variants: Arc<[Arc<str>]>,
    },
    Float,
    String,
}

impl TypeTag {
    pub fn new_enum(type_name: impl Into<Arc<str>>, variants: impl IntoIterator<Item = impl Into<Arc<str>>>) -> Self {
        TypeTag::Enum {
            type_name: type_name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Enum { .. } => "enum",
            TypeTag::Float => "float",
            TypeTag::String => "string",
        }
    }

    /// The type's default value: bool=false, int=0, enum=ordinal 0,
    /// float=0.0, string="".
    pub fn default_value(&self) -> Value {
        match self {
            TypeTag::Bool => Value::Bool(false),
            TypeTag::Int => Value::Int(0),
            TypeTag::Enum { type_name, .. } => Value::Enum {
                type_name: type_name.clone(),
                ordinal: 0,
            },
            TypeTag::Float => Value::Float(0.0),
            TypeTag::String => Value::String(Arc::from("")),
        }
    }

    /// Whether `value` was constructed from this declaration (same shape,
    /// and for enums the same type name). Used to reject mismatched
    /// `set_output`/`set_input` calls at the boundary.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeTag::Bool, Value::Bool(_)) => true,
            (TypeTag::Int, Value::Int(_)) => true,
            (TypeTag::Float, Value::Float(_)) => true,
            (TypeTag::String, Value::String(_)) => true,
            (TypeTag::Enum { type_name, .. }, Value::Enum { type_name: vt, .. }) => {
                type_name == vt
            }
            _ => false,
        }
    }

    /// Whether two declarations describe the same shape (same enum type
    /// name for enums, matching variant for everything else). Used to
    /// reject a `map_output` binding an output to an input of a different
    /// declared type.
    pub fn compatible(&self, other: &TypeTag) -> bool {
        match (self, other) {
            (TypeTag::Bool, TypeTag::Bool) => true,
            (TypeTag::Int, TypeTag::Int) => true,
            (TypeTag::Float, TypeTag::Float) => true,
            (TypeTag::String, TypeTag::String) => true,
            (TypeTag::Enum { type_name: a, .. }, TypeTag::Enum { type_name: b, .. }) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_the_zero_value_per_kind() {
        assert_eq!(TypeTag::Bool.default_value(), Value::Bool(false));
        assert_eq!(TypeTag::Int.default_value(), Value::Int(0));
        assert_eq!(TypeTag::Float.default_value(), Value::Float(0.0));
        assert_eq!(TypeTag::String.default_value(), Value::String(Arc::from("")));
        let e = TypeTag::new_enum("color", ["red", "green", "blue"]);
        assert_eq!(
            e.default_value(),
            Value::Enum {
                type_name: Arc::from("color"),
                ordinal: 0
            }
        );
    }

    #[test]
    fn accepts_checks_enum_type_name() {
        let a = TypeTag::new_enum("color", ["red", "green"]);
        let b = TypeTag::new_enum("shape", ["circle", "square"]);
        let v = Value::Enum {
            type_name: Arc::from("color"),
            ordinal: 1,
        };
        assert!(a.accepts(&v));
        assert!(!b.accepts(&v));
        assert!(!TypeTag::Bool.accepts(&v));
    }
}
