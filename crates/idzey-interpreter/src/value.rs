//! Runtime values for the Idzey interpreter.
//!
//! The type tag drives every operation: arithmetic, loose comparison and
//! equality, truthiness, stringification, and element/property access all
//! live here so that the evaluator stays a thin dispatcher.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use idzey_syntax::ast::Block;
use idzey_syntax::error::Result;

use crate::env::Environment;
use crate::interpreter::Interpreter;

/// Indexed assignment silently ignores indices above this bound.
pub const MAX_ELEMENT_INDEX: i64 = 1000;

/// Host callback backing a native function value.
pub type NativeCallback = dyn Fn(&mut Interpreter, &[Value]) -> Result<Value>;

/// A function declared in the source. The body is cloned out of the
/// parser's tree at binding time; the closure is the environment active at
/// the declaration site.
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<Block>,
    pub closure: Rc<RefCell<Environment>>,
}

#[derive(Clone)]
pub enum Value {
    Null,
    Int(i64),
    Double(f64),
    Str(String),
    Bool(bool),
    Array(Vec<Value>),
    Function(Rc<Function>),
    Native(Rc<NativeCallback>),
}

impl Value {
    /// Tag a numeric result: exactly-integral values become `Int`.
    pub fn from_number(n: f64) -> Value {
        if n == n as i64 as f64 {
            Value::Int(n as i64)
        } else {
            Value::Double(n)
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Double(_))
    }

    /// Truthiness: null, false, zero, empty string, and empty array are
    /// false; everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Int(n) => *n != 0,
            Value::Double(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Array(items) => !items.is_empty(),
            Value::Function(_) | Value::Native(_) => true,
        }
    }

    /// Numeric coercion. Strings parse as an integer when the whole string
    /// is one, then as a double, then fall back to 0. Arrays coerce to
    /// their length.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Int(n) => *n as f64,
            Value::Double(n) => *n,
            Value::Str(s) => {
                if let Ok(n) = s.parse::<i64>() {
                    n as f64
                } else {
                    s.parse::<f64>().unwrap_or(0.0)
                }
            }
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Null => 0.0,
            Value::Array(items) => items.len() as f64,
            Value::Function(_) | Value::Native(_) => 0.0,
        }
    }

    pub fn add(&self, other: &Value) -> Value {
        if let (Value::Int(a), Value::Int(b)) = (self, other) {
            return Value::Int(a + b);
        }
        if self.is_numeric() && other.is_numeric() {
            return Value::from_number(self.as_number() + other.as_number());
        }
        if matches!(self, Value::Str(_)) || matches!(other, Value::Str(_)) {
            return Value::Str(format!("{}{}", self, other));
        }
        if let (Value::Array(a), Value::Array(b)) = (self, other) {
            let mut items = a.clone();
            items.extend(b.iter().cloned());
            return Value::Array(items);
        }
        if self.is_numeric() || other.is_numeric() {
            return Value::from_number(self.as_number() + other.as_number());
        }
        Value::Str(format!("{}{}", self, other))
    }

    pub fn sub(&self, other: &Value) -> Value {
        if let (Value::Int(a), Value::Int(b)) = (self, other) {
            return Value::Int(a - b);
        }
        Value::from_number(self.as_number() - other.as_number())
    }

    pub fn mul(&self, other: &Value) -> Value {
        if let (Value::Int(a), Value::Int(b)) = (self, other) {
            return Value::Int(a * b);
        }
        Value::from_number(self.as_number() * other.as_number())
    }

    /// Division by zero yields 0; exact integer division stays integer.
    pub fn div(&self, other: &Value) -> Value {
        let divisor = other.as_number();
        if divisor == 0.0 {
            return Value::Int(0);
        }
        if let (Value::Int(a), Value::Int(b)) = (self, other) {
            if a % b == 0 {
                return Value::Int(a / b);
            }
        }
        Value::from_number(self.as_number() / divisor)
    }

    pub fn rem(&self, other: &Value) -> Value {
        let divisor = other.as_number();
        if divisor == 0.0 {
            return Value::Int(0);
        }
        if let (Value::Int(a), Value::Int(b)) = (self, other) {
            return Value::Int(a % b);
        }
        Value::from_number(self.as_number() % divisor)
    }

    /// Loose equality with cross-type coercion: numbers compare by value,
    /// number-vs-string coerces numerically, booleans compare by
    /// truthiness, arrays by their stringified form.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            _ if self.is_numeric() && other.is_numeric() => self.as_number() == other.as_number(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ if (self.is_numeric() || other.is_numeric())
                && (matches!(self, Value::Str(_)) || matches!(other, Value::Str(_))) =>
            {
                self.as_number() == other.as_number()
            }
            _ if matches!(self, Value::Bool(_)) || matches!(other, Value::Bool(_)) => {
                self.is_truthy() == other.is_truthy()
            }
            _ if matches!(self, Value::Array(_)) || matches!(other, Value::Array(_)) => {
                self.to_string() == other.to_string()
            }
            _ => false,
        }
    }

    pub fn lt(&self, other: &Value) -> bool {
        if self.is_numeric() && other.is_numeric() {
            return self.as_number() < other.as_number();
        }
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a < b,
            // arrays order by size
            (Value::Array(a), Value::Array(b)) => a.len() < b.len(),
            _ => {
                if (self.is_numeric() || other.is_numeric())
                    && (matches!(self, Value::Str(_)) || matches!(other, Value::Str(_)))
                {
                    self.as_number() < other.as_number()
                } else if matches!(self, Value::Bool(_)) || matches!(other, Value::Bool(_)) {
                    self.as_number() < other.as_number()
                } else {
                    self.to_string() < other.to_string()
                }
            }
        }
    }

    pub fn le(&self, other: &Value) -> bool {
        if self.is_numeric() && other.is_numeric() {
            return self.as_number() <= other.as_number();
        }
        self.lt(other) || self.loose_eq(other)
    }

    pub fn gt(&self, other: &Value) -> bool {
        if self.is_numeric() && other.is_numeric() {
            return self.as_number() > other.as_number();
        }
        !self.le(other)
    }

    pub fn ge(&self, other: &Value) -> bool {
        if self.is_numeric() && other.is_numeric() {
            return self.as_number() >= other.as_number();
        }
        !self.lt(other)
    }

    /// Indexed read. Out-of-range and negative indices yield null; a
    /// non-array behaves as a singleton at index 0; strings additionally
    /// yield single-character strings for in-range positive indices.
    pub fn get_element(&self, index: i64) -> Value {
        match self {
            Value::Array(items) => {
                if index < 0 || index as usize >= items.len() {
                    Value::Null
                } else {
                    items[index as usize].clone()
                }
            }
            Value::Str(s) => {
                if index == 0 {
                    self.clone()
                } else if index > 0 {
                    s.chars()
                        .nth(index as usize)
                        .map(|c| Value::Str(c.to_string()))
                        .unwrap_or(Value::Null)
                } else {
                    Value::Null
                }
            }
            _ => {
                if index == 0 {
                    self.clone()
                } else {
                    Value::Null
                }
            }
        }
    }

    /// Indexed write. A non-array target is promoted to an array seeded
    /// with the prior value. Negative indices and indices above
    /// [`MAX_ELEMENT_INDEX`] are ignored; gaps grow null-filled.
    pub fn set_element(&mut self, index: i64, value: Value) {
        if !matches!(self, Value::Array(_)) {
            let prior = std::mem::replace(self, Value::Array(Vec::new()));
            if let Value::Array(items) = self {
                items.push(prior);
            }
        }

        if index < 0 || index > MAX_ELEMENT_INDEX {
            return;
        }

        if let Value::Array(items) = self {
            let index = index as usize;
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            items[index] = value;
        }
    }

    /// Only `length` is defined: array length, string length, or 1 for
    /// scalars. Everything else is null.
    pub fn get_property(&self, name: &str) -> Value {
        if name == "length" {
            return match self {
                Value::Array(items) => Value::Int(items.len() as i64),
                Value::Str(s) => Value::Int(s.chars().count() as i64),
                _ => Value::Int(1),
            };
        }
        Value::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Double(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Function(function) => write!(f, "<function {}>", function.name),
            Value::Native(_) => write!(f, "<native function>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Int(n) => write!(f, "Int({})", n),
            Value::Double(n) => write!(f, "Double({})", n),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Value::Function(function) => write!(f, "Function({})", function.name),
            Value::Native(_) => write!(f, "Native"),
        }
    }
}

/// Structural equality for tests and host code; distinct function values
/// never compare equal. Runtime `==` uses [`Value::loose_eq`] instead.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}
