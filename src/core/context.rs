use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key/value state attached to a job execution or a step execution.
///
/// The job execution context is shared by every step of one job run, while a
/// step execution context lives and dies with its step. Values are stored as
/// JSON so any serializable value can be kept.
///
/// # Examples
///
/// ```
/// use spring_batch_tutorial::core::context::ExecutionContext;
///
/// let mut context = ExecutionContext::new();
/// context.put_string("jobKey", "job execution context");
/// context.put_long("count", 3);
///
/// assert_eq!(context.get_string("jobKey"), Some("job execution context"));
/// assert_eq!(context.get_string_or("stepKey", "emptyStepKey"), "emptyStepKey");
/// assert_eq!(context.get_long("count"), Some(3));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    entries: BTreeMap<String, Value>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores any JSON-convertible value, replacing a previous value under the same key.
    pub fn put(&mut self, key: &str, value: impl Into<Value>) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub fn put_string(&mut self, key: &str, value: &str) {
        self.put(key, value);
    }

    pub fn put_long(&mut self, key: &str, value: i64) {
        self.put(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns the value under `key` if it is a string.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn get_string_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_string(key).unwrap_or(default)
    }

    /// Returns the value under `key` if it is an integer.
    pub fn get_long(&self, key: &str) -> Option<i64> {
        self.entries.get(key).and_then(Value::as_i64)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ExecutionContext;

    #[test]
    fn typed_getters_ignore_values_of_another_type() {
        let mut context = ExecutionContext::new();
        context.put_string("key", "value");
        context.put_long("number", 7);

        assert_eq!(context.get_long("key"), None);
        assert_eq!(context.get_string("number"), None);
        assert_eq!(context.get_string_or("number", "fallback"), "fallback");
    }

    #[test]
    fn put_overwrites_and_remove_deletes() {
        let mut context = ExecutionContext::new();
        assert!(context.is_empty());

        context.put("key", json!({"nested": true}));
        context.put_string("key", "replaced");

        assert_eq!(context.len(), 1);
        assert_eq!(context.get_string("key"), Some("replaced"));

        assert_eq!(context.remove("key"), Some(json!("replaced")));
        assert!(!context.contains_key("key"));
    }
}
