//! Scripting runtime object model.
//!
//! Tables and arrays are shared, identity-bearing handles: two script
//! values holding the same table see the same slots. Entity tables
//! (actors, rooms, objects) are owned by the world and handed out as
//! clones of the same `TableRef`.
//!
//! RULE: Script failures never cross this boundary as errors.
//! Calls report success as a `bool` and the caller carries on.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub type TableRef = Rc<RefCell<ScriptTable>>;
pub type ArrayRef = Rc<RefCell<Vec<ScriptValue>>>;

/// Create an empty table.
pub fn new_table() -> TableRef {
    Rc::new(RefCell::new(ScriptTable::default()))
}

/// Create an array from its elements.
pub fn new_array(items: Vec<ScriptValue>) -> ArrayRef {
    Rc::new(RefCell::new(items))
}

#[derive(Debug, Clone, Default)]
pub enum ScriptValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(ArrayRef),
    Table(TableRef),
}

impl ScriptValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScriptValue::Null)
    }

    /// Integer view; bools read as 0/1, floats are truncated.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ScriptValue::Integer(i) => Some(*i),
            ScriptValue::Bool(b)    => Some(i64::from(*b)),
            ScriptValue::Float(f)   => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableRef> {
        match self {
            ScriptValue::Table(t) => Some(t),
            _ => None,
        }
    }
}

/// Scalars compare by value, tables and arrays by identity.
impl PartialEq for ScriptValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScriptValue::Null, ScriptValue::Null)             => true,
            (ScriptValue::Bool(a), ScriptValue::Bool(b))       => a == b,
            (ScriptValue::Integer(a), ScriptValue::Integer(b)) => a == b,
            (ScriptValue::Float(a), ScriptValue::Float(b))     => a == b,
            (ScriptValue::String(a), ScriptValue::String(b))   => a == b,
            (ScriptValue::Array(a), ScriptValue::Array(b))     => Rc::ptr_eq(a, b),
            (ScriptValue::Table(a), ScriptValue::Table(b))     => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool>     for ScriptValue { fn from(v: bool)     -> Self { ScriptValue::Bool(v) } }
impl From<i64>      for ScriptValue { fn from(v: i64)      -> Self { ScriptValue::Integer(v) } }
impl From<i32>      for ScriptValue { fn from(v: i32)      -> Self { ScriptValue::Integer(i64::from(v)) } }
impl From<f64>      for ScriptValue { fn from(v: f64)      -> Self { ScriptValue::Float(v) } }
impl From<&str>     for ScriptValue { fn from(v: &str)     -> Self { ScriptValue::String(v.to_string()) } }
impl From<String>   for ScriptValue { fn from(v: String)   -> Self { ScriptValue::String(v) } }
impl From<TableRef> for ScriptValue { fn from(v: TableRef) -> Self { ScriptValue::Table(v) } }
impl From<ArrayRef> for ScriptValue { fn from(v: ArrayRef) -> Self { ScriptValue::Array(v) } }

/// A string-keyed script table.
#[derive(Debug, Default)]
pub struct ScriptTable {
    slots: BTreeMap<String, ScriptValue>,
}

impl ScriptTable {
    /// Slot value, `Null` when absent.
    pub fn get(&self, key: &str) -> ScriptValue {
        self.slots.get(key).cloned().unwrap_or_default()
    }

    pub fn raw_exists(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Create or overwrite a slot.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ScriptValue>) {
        self.slots.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<ScriptValue> {
        self.slots.remove(key)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.slots.get(key).and_then(ScriptValue::as_int)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.slots.get(key).and_then(ScriptValue::as_str)
    }

    /// Enumerate key/value pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ScriptValue)> {
        self.slots.iter()
    }
}

/// Calls into the scripting runtime.
pub trait ScriptHost {
    /// Call a global function. Returns false when it is not defined or fails.
    fn call(&mut self, function: &str, args: &[ScriptValue]) -> bool;

    /// Call `method` on `this` if the table defines it.
    fn call_method(&mut self, this: &TableRef, method: &str, args: &[ScriptValue]) -> bool;
}

/// Host with no script functions defined.
#[derive(Debug, Default)]
pub struct NullHost;

impl ScriptHost for NullHost {
    fn call(&mut self, _function: &str, _args: &[ScriptValue]) -> bool { false }

    fn call_method(&mut self, _this: &TableRef, _method: &str, _args: &[ScriptValue]) -> bool {
        false
    }
}

/// Host that records every call, used by tooling and tests.
/// Method calls are recorded as `"<identity>.<method>"`.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub calls: Vec<String>,
}

impl ScriptHost for RecordingHost {
    fn call(&mut self, function: &str, _args: &[ScriptValue]) -> bool {
        self.calls.push(function.to_string());
        true
    }

    fn call_method(&mut self, this: &TableRef, method: &str, _args: &[ScriptValue]) -> bool {
        let table = this.borrow();
        let identity = crate::bridge::IDENTITY_KEYS
            .iter()
            .find_map(|key| table.get_str(key))
            .unwrap_or("?")
            .to_string();
        self.calls.push(format!("{identity}.{method}"));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_shared_by_handle() {
        let t = new_table();
        let alias = ScriptValue::Table(t.clone());
        t.borrow_mut().set("score", 3);
        assert_eq!(alias.as_table().expect("table").borrow().get_int("score"), Some(3));
        assert_eq!(alias, ScriptValue::Table(t));
        assert_ne!(alias, ScriptValue::Table(new_table()));
    }

    #[test]
    fn missing_slot_reads_as_null() {
        let t = new_table();
        assert!(t.borrow().get("nothing").is_null());
        assert!(!t.borrow().raw_exists("nothing"));
    }
}
