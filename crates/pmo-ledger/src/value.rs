//! Call arguments and observed state values.
//!
//! Contracts are opaque state machines reachable only through calls, so a
//! single exact-equality value model covers both directions: arguments
//! encoded into a call and values read back from accessors.

use crate::address::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value passed to, or observed from, a contract.
///
/// Equality is exact; snapshot comparison relies on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    /// An account or contract address.
    Address(Address),
    /// An unsigned integer (amounts, fees, timestamps, counters).
    Uint(u128),
    /// A boolean flag.
    Bool(bool),
    /// A string (names, symbols).
    Str(String),
    /// An ordered list of values (e.g. a fee configuration tuple).
    List(Vec<Value>),
}

impl Value {
    /// The contained address, if this is an address value.
    #[inline]
    #[must_use]
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Value::Address(a) => Some(*a),
            _ => None,
        }
    }

    /// The contained integer, if this is a uint value.
    #[inline]
    #[must_use]
    pub fn as_uint(&self) -> Option<u128> {
        match self {
            Value::Uint(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Address(a) => write!(f, "{a}"),
            Value::Uint(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<Address> for Value {
    fn from(value: Address) -> Self {
        Value::Address(value)
    }
}

impl From<u128> for Value {
    fn from(value: u128) -> Self {
        Value::Uint(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Uint(u128::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

/// One encoded call: a method name plus its ordered argument list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallData {
    /// Method name on the target's declared interface.
    pub method: String,
    /// Ordered arguments.
    pub args: Vec<Value>,
}

impl CallData {
    /// Create call data for a method with arguments.
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }

    /// Create call data for a zero-argument read-only accessor.
    #[inline]
    #[must_use]
    pub fn view(method: impl Into<String>) -> Self {
        Self::new(method, Vec::new())
    }
}

impl fmt::Display for CallData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.method)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_accessors() {
        let addr = Address::from_bytes([7u8; 20]);
        assert_eq!(Value::Address(addr).as_address(), Some(addr));
        assert_eq!(Value::Uint(42).as_uint(), Some(42));
        assert_eq!(Value::Uint(42).as_address(), None);
        assert_eq!(Value::Bool(true).as_uint(), None);
    }

    #[test]
    fn value_display_nests_lists() {
        let v = Value::List(vec![Value::Uint(2_000), Value::Uint(0), Value::Uint(10)]);
        assert_eq!(v.to_string(), "[2000, 0, 10]");
    }

    #[test]
    fn calldata_display_reads_like_a_call() {
        let call = CallData::new(
            "setStrategy",
            vec![Value::Address(Address::from_bytes([1u8; 20]))],
        );
        assert_eq!(
            call.to_string(),
            "setStrategy(0x0101010101010101010101010101010101010101)"
        );
    }

    #[test]
    fn view_call_has_no_args() {
        let call = CallData::view("governance");
        assert!(call.args.is_empty());
        assert_eq!(call.to_string(), "governance()");
    }
}
