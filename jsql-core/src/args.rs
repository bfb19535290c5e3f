use crate::{AsValue, Value};
use std::collections::{HashMap, hash_map};

/// Argument mapping supplied to each invocation of a prepared query.
///
/// Names that are not present resolve to `Value::Null` when the positional
/// parameters are built, they are never an error.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Args(HashMap<String, Value>);

impl Args {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn insert(&mut self, name: impl Into<String>, value: impl AsValue) -> Option<Value> {
        self.0.insert(name.into(), value.as_value())
    }
    /// Builder variant of [`Args::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl AsValue) -> Self {
        self.insert(name, value);
        self
    }
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn iter(&self) -> hash_map::Iter<'_, String, Value> {
        self.0.iter()
    }
    /// Positional parameters for `names`, in order, with `Value::Null` for the missing ones.
    pub fn positional(&self, names: &[String]) -> Vec<Value> {
        names
            .iter()
            .map(|name| self.0.get(name).cloned().unwrap_or_default())
            .collect()
    }
}

impl<K: Into<String>, V: AsValue> FromIterator<(K, V)> for Args {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut result = Args::new();
        result.extend(iter);
        result
    }
}

impl<K: Into<String>, V: AsValue> Extend<(K, V)> for Args {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for Args {
    type Item = (String, Value);
    type IntoIter = hash_map::IntoIter<String, Value>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Args {
    type Item = (&'a String, &'a Value);
    type IntoIter = hash_map::Iter<'a, String, Value>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Args {
    fn from(value: serde_json::Map<String, serde_json::Value>) -> Self {
        value.into_iter().collect()
    }
}

/// Builds [`Args`] from `name => value` pairs.
///
/// ```rust
/// let args = jsql_core::args! { "first" => 3, "pat" => "%eve%" };
/// assert_eq!(args.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => { $crate::Args::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut args = $crate::Args::new();
        $(args.insert($name, $value);)+
        args
    }};
}
