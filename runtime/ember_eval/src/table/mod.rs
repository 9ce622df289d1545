//! Script tables.
//!
//! A table is an unordered `Value -> Value` map stored in the table pool.
//! Scripts only ever hold a [`TableHandle`]; the table itself sits behind a
//! `RwLock` so readers on different threads do not serialize on the pool.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::errors::{invalid_key, EvalResult};
use crate::pool::{Handle, IdentifierPool};
use crate::value::Value;

/// Pool of all live tables.
pub type TableCache = IdentifierPool<RwLock<Table>>;

/// Reference-counted handle to a pooled table.
pub type TableHandle = Handle<RwLock<Table>>;

/// Unordered associative container. Keys are unique; nil is never a key.
#[derive(Debug, Default)]
pub struct Table {
    entries: FxHashMap<Value, Value>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. A nil key is rejected and the table is left
    /// unchanged.
    pub fn set(&mut self, key: Value, value: Value) -> EvalResult<()> {
        if key.is_nil() {
            tracing::warn!("rejected table write with nil key");
            return Err(invalid_key());
        }
        self.entries.insert(key, value);
        Ok(())
    }

    /// Look up a key. Missing keys read as nil, so absence and an explicit
    /// nil value are indistinguishable.
    pub fn get(&self, key: &Value) -> EvalResult {
        if key.is_nil() {
            tracing::warn!("rejected table read with nil key");
            return Err(invalid_key());
        }
        Ok(self.entries.get(key).cloned().unwrap_or_default())
    }

    /// Look up a string key.
    pub fn field(&self, name: &str) -> Value {
        self.entries
            .get(&Value::string(name))
            .cloned()
            .unwrap_or_default()
    }

    /// Insert under a string key.
    pub fn set_field(&mut self, name: &str, value: Value) {
        self.entries.insert(Value::string(name), value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter()
    }
}

impl FromIterator<(Value, Value)> for Table {
    /// Pairs with a nil key are skipped.
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        Table {
            entries: iter.into_iter().filter(|(k, _)| !k.is_nil()).collect(),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
