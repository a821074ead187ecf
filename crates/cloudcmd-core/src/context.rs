//! Per-invocation parameter binding.
//!
//! A [`ContextBuilder`] is populated while binding arguments (and may be
//! adjusted by pre/post hooks), then frozen into an immutable
//! [`BoundContext`]. Both are created fresh for every invocation and
//! discarded afterwards; nothing is shared across invocations.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{InvokeError, InvokeResult};

/// Mutable name→value map populated during binding.
#[derive(Debug, Default)]
pub struct ContextBuilder {
    values: BTreeMap<String, Value>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn unbind(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Snapshot into the immutable per-invocation context.
    pub fn freeze(self) -> BoundContext {
        BoundContext {
            values: self.values,
        }
    }
}

/// Immutable snapshot of the supplied values for one invocation.
#[derive(Debug, Clone)]
pub struct BoundContext {
    values: BTreeMap<String, Value>,
}

impl BoundContext {
    /// Whether the parameter was supplied at all (a bound null counts).
    pub fn was_bound(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    fn present(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|value| !value.is_null())
    }

    fn mismatch(name: &str, expected: &'static str) -> InvokeError {
        InvokeError::InvalidParameter {
            name: name.to_string(),
            expected,
        }
    }

    pub fn string(&self, name: &str) -> InvokeResult<Option<String>> {
        match self.present(name) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(|s| Some(s.to_string()))
                .ok_or_else(|| Self::mismatch(name, "string")),
        }
    }

    /// Required-parameter accessor; binding is validated up front, so this
    /// failing means the caller skipped [`OperationDescriptor::validate_required`].
    ///
    /// [`OperationDescriptor::validate_required`]: crate::descriptor::OperationDescriptor::validate_required
    pub fn require_string(&self, name: &str) -> InvokeResult<String> {
        self.string(name)?.ok_or_else(|| InvokeError::MissingParameter {
            name: name.to_string(),
        })
    }

    pub fn integer(&self, name: &str) -> InvokeResult<Option<i32>> {
        match self.present(name) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| Self::mismatch(name, "32-bit integer")),
        }
    }

    pub fn require_integer(&self, name: &str) -> InvokeResult<i32> {
        self.integer(name)?.ok_or_else(|| InvokeError::MissingParameter {
            name: name.to_string(),
        })
    }

    pub fn long(&self, name: &str) -> InvokeResult<Option<i64>> {
        match self.present(name) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| Self::mismatch(name, "64-bit integer")),
        }
    }

    pub fn boolean(&self, name: &str) -> InvokeResult<Option<bool>> {
        match self.present(name) {
            None => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| Self::mismatch(name, "boolean")),
        }
    }

    pub fn double(&self, name: &str) -> InvokeResult<Option<f64>> {
        match self.present(name) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| Self::mismatch(name, "floating-point")),
        }
    }

    pub fn string_list(&self, name: &str) -> InvokeResult<Option<Vec<String>>> {
        match self.present(name) {
            None => Ok(None),
            Some(value) => {
                let items = value
                    .as_array()
                    .ok_or_else(|| Self::mismatch(name, "list of strings"))?;
                items
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .map(|s| s.to_string())
                            .ok_or_else(|| Self::mismatch(name, "list of strings"))
                    })
                    .collect::<InvokeResult<Vec<_>>>()
                    .map(Some)
            }
        }
    }

    pub fn double_list(&self, name: &str) -> InvokeResult<Option<Vec<f64>>> {
        match self.present(name) {
            None => Ok(None),
            Some(value) => {
                let items = value
                    .as_array()
                    .ok_or_else(|| Self::mismatch(name, "list of numbers"))?;
                items
                    .iter()
                    .map(|item| {
                        item.as_f64()
                            .ok_or_else(|| Self::mismatch(name, "list of numbers"))
                    })
                    .collect::<InvokeResult<Vec<_>>>()
                    .map(Some)
            }
        }
    }

    pub fn string_map(&self, name: &str) -> InvokeResult<Option<BTreeMap<String, String>>> {
        match self.present(name) {
            None => Ok(None),
            Some(value) => {
                let entries = value
                    .as_object()
                    .ok_or_else(|| Self::mismatch(name, "map of string to string"))?;
                entries
                    .iter()
                    .map(|(key, item)| {
                        item.as_str()
                            .map(|s| (key.clone(), s.to_string()))
                            .ok_or_else(|| Self::mismatch(name, "map of string to string"))
                    })
                    .collect::<InvokeResult<BTreeMap<_, _>>>()
                    .map(Some)
            }
        }
    }
}
