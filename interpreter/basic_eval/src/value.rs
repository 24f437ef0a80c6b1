//! Runtime values.
//!
//! A single tagged sum: integers and floats inline, strings and function
//! bodies behind the cheap-clone [`Heap`] handle, arrays behind a shared
//! mutable cell. Operations that require a particular kind match
//! exhaustively and report the mismatch instead of casting.

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use basic_diagnostic::DiagResult;
use basic_ir::Name;

use crate::array::ArrayValue;
use crate::environment::LocalScope;

/// Immutable shared heap allocation.
///
/// The interpreter is single-threaded, so `Rc` does the job; construction
/// goes through [`Value`] factory methods or [`Heap::new`].
pub struct Heap<T: ?Sized>(Rc<T>);

impl<T> Heap<T> {
    /// Allocate a value on the heap.
    #[inline]
    pub fn new(value: T) -> Self {
        Heap(Rc::new(value))
    }
}

impl<T: ?Sized> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Rc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<T: ?Sized + PartialEq> PartialEq for Heap<T> {
    fn eq(&self, other: &Self) -> bool {
        *self.0 == *other.0
    }
}

/// A user function registered by `DEF`: parameter names plus a body
/// expression evaluated in a fresh frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FuncData {
    pub name: Name,
    pub params: Vec<Name>,
    pub body: basic_ir::Expr,
}

/// A built-in function: plain function pointer plus its registered name.
pub type NativeFn = fn(&[Value]) -> DiagResult<Value>;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// Double-precision float.
    Float(f64),
    /// Immutable string.
    Str(Heap<String>),
    /// DIMed array; shared so every holder sees element writes.
    Array(LocalScope<ArrayValue>),
    /// User function from `DEF`.
    Func(Heap<FuncData>),
    /// Built-in function.
    Native(NativeFn, &'static str),
    /// The absent value; uninitialized array cells read as `Nil`.
    Nil,
}

impl Value {
    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    /// Create an array value from declared extents.
    #[inline]
    pub fn array(array: ArrayValue) -> Self {
        Value::Array(LocalScope::new(array))
    }

    /// Create a user-function value.
    #[inline]
    pub fn func(data: FuncData) -> Self {
        Value::Func(Heap::new(data))
    }

    /// Type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Func(_) => "function",
            Value::Native(_, _) => "native function",
            Value::Nil => "nil",
        }
    }

    /// True for the numeric zero values.
    ///
    /// This is the "boolean false" the compound-statement stop rule keys
    /// on; every other value (including strings and `Nil`) is not zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Int(n) => *n == 0,
            Value::Float(f) => *f == 0.0,
            _ => false,
        }
    }

    /// The integer payload, if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Render for PRINT: numbers in their default decimal form, strings
    /// raw, `Nil` as nothing.
    pub fn display_value(&self) -> String {
        match self {
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.to_string(),
            Value::Array(arr) => {
                let dims: Vec<_> = arr
                    .borrow()
                    .extents()
                    .iter()
                    .map(|e| e.saturating_sub(1).to_string())
                    .collect();
                format!("DIM({})", dims.join(","))
            }
            Value::Func(_) => "<function>".to_string(),
            Value::Native(_, name) => format!("<native {name}>"),
            Value::Nil => String::new(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(v) => write!(f, "Float({v})"),
            Value::Str(s) => write!(f, "Str({:?})", &**s),
            Value::Array(arr) => write!(f, "Array(len {})", arr.borrow().len()),
            Value::Func(data) => write!(f, "Func({:?})", data.name),
            Value::Native(_, name) => write!(f, "Native({name})"),
            Value::Nil => write!(f, "Nil"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => *a.borrow() == *b.borrow(),
            (Value::Func(a), Value::Func(b)) => a == b,
            (Value::Native(f, _), Value::Native(g, _)) => std::ptr::fn_addr_eq(*f, *g),
            (Value::Nil, Value::Nil) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn zero_detection_covers_both_numeric_kinds() {
        assert!(Value::Int(0).is_zero());
        assert!(Value::Float(0.0).is_zero());
        assert!(!Value::Int(1).is_zero());
        assert!(!Value::Float(0.5).is_zero());
        assert!(!Value::string("").is_zero());
        assert!(!Value::Nil.is_zero());
    }

    #[test]
    fn display_forms() {
        assert_eq!(Value::Int(42).display_value(), "42");
        assert_eq!(Value::Float(0.5).display_value(), "0.5");
        // Rust's default float Display drops a trailing `.0`.
        assert_eq!(Value::Float(2.0).display_value(), "2");
        assert_eq!(Value::string("HI").display_value(), "HI");
        assert_eq!(Value::Nil.display_value(), "");
    }

    #[test]
    fn heap_strings_compare_by_content() {
        assert_eq!(Value::string("A"), Value::string("A"));
        assert_ne!(Value::string("A"), Value::string("B"));
        assert_ne!(Value::string("1"), Value::Int(1));
    }

    #[test]
    fn array_display_shows_declared_sizes() {
        let v = Value::array(ArrayValue::new(&[2, 2]));
        assert_eq!(v.display_value(), "DIM(2,2)");
    }
}
