//! Name bindings
//!
//! One flat namespace maps token bytes to values. Native operators and the
//! small library defined on top of them share it with user assignments,
//! so any of them can be rebound.

use std::collections::HashMap;

use super::builtins::BUILTINS;
use super::value::Value;

/// Names defined in terms of other names
const LIBRARY: &[(&str, &str)] = &[
    ("puts", "print n print"),
    ("p", "`puts"),
    ("and", "1$if"),
    ("or", "1$\\if"),
    ("xor", "\\!!{!}*"),
];

/// Flat name-to-value table
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    bindings: HashMap<Vec<u8>, Value>,
}

impl Bindings {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Native operators plus the library prelude
    pub fn standard() -> Self {
        let mut env = Self::new();
        for builtin in BUILTINS {
            env.define(builtin.name, Value::Builtin(*builtin));
        }
        env.define("n", Value::str("\n"));
        for (name, body) in LIBRARY {
            env.define(*name, Value::block(*body));
        }
        env
    }

    /// Bind `name`, replacing any previous value
    pub fn define(&mut self, name: impl AsRef<[u8]>, value: Value) {
        self.bindings.insert(name.as_ref().to_vec(), value);
    }

    pub fn get(&self, name: impl AsRef<[u8]>) -> Option<&Value> {
        self.bindings.get(name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bound names in byte order, for display
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<&Vec<u8>> = self.bindings.keys().collect();
        names.sort_unstable();
        names
            .into_iter()
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_get() {
        let mut env = Bindings::new();
        env.define("x", Value::from(42));
        assert_eq!(env.get("x"), Some(&Value::from(42)));
        assert!(env.get("y").is_none());
    }

    #[test]
    fn test_define_overwrites() {
        let mut env = Bindings::new();
        env.define("x", Value::from(1));
        env.define("x", Value::str("one"));
        assert_eq!(env.get("x"), Some(&Value::str("one")));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_standard_has_operators_and_library() {
        let env = Bindings::standard();
        for name in ["+", "~", "$", "[", "]", "if", "while", "zip", "base", "print"] {
            assert!(matches!(env.get(name), Some(Value::Builtin(_))), "{name}");
        }
        assert_eq!(env.get("n"), Some(&Value::str("\n")));
        assert_eq!(env.get("puts"), Some(&Value::block("print n print")));
        assert!(env.get("xor").is_some());
    }

    #[test]
    fn test_names_sorted() {
        let mut env = Bindings::new();
        env.define("b", Value::from(1));
        env.define("a", Value::from(2));
        assert_eq!(env.names(), vec!["a", "b"]);
        assert!(!env.is_empty());
    }

    #[test]
    fn test_non_utf8_names() {
        let mut env = Bindings::new();
        env.define([0xffu8], Value::from(9));
        assert_eq!(env.get([0xffu8]), Some(&Value::from(9)));
        assert!(env.get("\u{ff}").is_none());
    }
}
