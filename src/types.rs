//! Shared element bounds and value types.
//!
//! States, actions, atomic propositions and locations are opaque to the engine:
//! anything that can be cloned, compared, hashed and debug-printed will do.
//! Variable valuations used by program graphs are ordered maps so that they can
//! themselves serve as (parts of) states.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Debug};
use std::hash::Hash;

/// Bound shared by every state, action, proposition and location type.
pub trait Element: Clone + Eq + Hash + Debug {}

impl<T> Element for T where T: Clone + Eq + Hash + Debug {}

/// A set of atomic propositions, as read by an automaton transition.
///
/// Ordered, so that it is hashable and can key a transition map.
pub type Label<P> = BTreeSet<P>;

/// A value stored in a program variable.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Value {
    Int(i64),
    Bool(bool),
}

impl Value {
    /// Returns the integer payload, if this is an integer.
    pub fn as_int(self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(i),
            Value::Bool(_) => None,
        }
    }

    /// Returns the boolean payload, if this is a boolean.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(b),
            Value::Int(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Assignment of values to program variables.
pub type Valuation = BTreeMap<String, Value>;

/// Renders one `variable = value` atomic proposition.
pub fn valuation_proposition(var: &str, value: &Value) -> String {
    format!("{} = {}", var, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(3).as_int(), Some(3));
        assert_eq!(Value::Int(3).as_bool(), None);
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Bool(true).as_int(), None);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(valuation_proposition("x", &Value::Int(1)), "x = 1");
    }

    #[test]
    fn test_valuation_is_ordered() {
        let mut v = Valuation::new();
        v.insert("y".to_string(), Value::Int(2));
        v.insert("x".to_string(), Value::Int(1));
        let keys: Vec<_> = v.keys().cloned().collect();
        assert_eq!(keys, vec!["x", "y"]);
    }
}
