//! The tagged value tree: the universal value model of a savegame.
//!
//! RULE: Reads never fail. A missing key or a variant mismatch degrades
//! to the type's default (`Null`, 0, 0.0, ""), so optional-field reads
//! stay terse on both the save and the load side.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Index;

/// Key-unique mapping used by `TaggedValue::Hash`.
pub type HashValue = BTreeMap<String, TaggedValue>;

static NULL: TaggedValue = TaggedValue::Null;
static EMPTY_HASH: HashValue = BTreeMap::new();

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaggedValue {
    #[default]
    Null,
    Integer(i64),
    Double(f64),
    String(String),
    Array(Vec<TaggedValue>),
    Hash(HashValue),
}

impl TaggedValue {
    /// An empty `Hash`.
    pub fn hash() -> Self {
        TaggedValue::Hash(HashValue::new())
    }

    /// An empty `Array`.
    pub fn array() -> Self {
        TaggedValue::Array(Vec::new())
    }

    // ── Predicates ─────────────────────────────────────────────

    pub fn is_null(&self)    -> bool { matches!(self, TaggedValue::Null) }
    pub fn is_integer(&self) -> bool { matches!(self, TaggedValue::Integer(_)) }
    pub fn is_double(&self)  -> bool { matches!(self, TaggedValue::Double(_)) }
    pub fn is_string(&self)  -> bool { matches!(self, TaggedValue::String(_)) }
    pub fn is_array(&self)   -> bool { matches!(self, TaggedValue::Array(_)) }
    pub fn is_hash(&self)    -> bool { matches!(self, TaggedValue::Hash(_)) }

    /// Stable variant name, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            TaggedValue::Null       => "null",
            TaggedValue::Integer(_) => "integer",
            TaggedValue::Double(_)  => "double",
            TaggedValue::String(_)  => "string",
            TaggedValue::Array(_)   => "array",
            TaggedValue::Hash(_)    => "hash",
        }
    }

    // ── Accessors with fallback ────────────────────────────────

    /// Integer value; a Double is truncated, anything else is 0.
    pub fn get_int(&self) -> i64 {
        match self {
            TaggedValue::Integer(i) => *i,
            TaggedValue::Double(d)  => *d as i64,
            _ => 0,
        }
    }

    /// Double value; an Integer is widened, anything else is 0.0.
    pub fn get_double(&self) -> f64 {
        match self {
            TaggedValue::Double(d)  => *d,
            TaggedValue::Integer(i) => *i as f64,
            _ => 0.0,
        }
    }

    /// String value, or "" when this is not a String.
    pub fn get_string(&self) -> &str {
        match self {
            TaggedValue::String(s) => s,
            _ => "",
        }
    }

    /// Field of a Hash. Absent keys and non-Hash values yield `Null`.
    pub fn get(&self, key: &str) -> &TaggedValue {
        match self {
            TaggedValue::Hash(h) => h.get(key).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    /// True when this is a Hash holding `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        match self {
            TaggedValue::Hash(h) => h.contains_key(key),
            _ => false,
        }
    }

    /// Elements of an Array, empty for any other variant.
    pub fn as_array(&self) -> &[TaggedValue] {
        match self {
            TaggedValue::Array(a) => a,
            _ => &[],
        }
    }

    /// Entries of a Hash, empty for any other variant.
    pub fn as_hash(&self) -> &HashValue {
        match self {
            TaggedValue::Hash(h) => h,
            _ => &EMPTY_HASH,
        }
    }

    pub fn as_hash_mut(&mut self) -> Option<&mut HashValue> {
        match self {
            TaggedValue::Hash(h) => Some(h),
            _ => None,
        }
    }

    /// Insert into a Hash. Ignored (returns false) for any other variant.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TaggedValue>) -> bool {
        match self {
            TaggedValue::Hash(h) => {
                h.insert(key.into(), value.into());
                true
            }
            _ => false,
        }
    }
}

impl Index<&str> for TaggedValue {
    type Output = TaggedValue;

    fn index(&self, key: &str) -> &TaggedValue {
        self.get(key)
    }
}

impl Index<usize> for TaggedValue {
    type Output = TaggedValue;

    fn index(&self, index: usize) -> &TaggedValue {
        self.as_array().get(index).unwrap_or(&NULL)
    }
}

// ── Constructors ───────────────────────────────────────────────

impl From<i64>    for TaggedValue { fn from(v: i64)    -> Self { TaggedValue::Integer(v) } }
impl From<i32>    for TaggedValue { fn from(v: i32)    -> Self { TaggedValue::Integer(i64::from(v)) } }
impl From<u32>    for TaggedValue { fn from(v: u32)    -> Self { TaggedValue::Integer(i64::from(v)) } }
impl From<bool>   for TaggedValue { fn from(v: bool)   -> Self { TaggedValue::Integer(i64::from(v)) } }
impl From<f64>    for TaggedValue { fn from(v: f64)    -> Self { TaggedValue::Double(v) } }
impl From<f32>    for TaggedValue { fn from(v: f32)    -> Self { TaggedValue::Double(f64::from(v)) } }
impl From<&str>   for TaggedValue { fn from(v: &str)   -> Self { TaggedValue::String(v.to_string()) } }
impl From<String> for TaggedValue { fn from(v: String) -> Self { TaggedValue::String(v) } }

impl From<Vec<TaggedValue>> for TaggedValue {
    fn from(v: Vec<TaggedValue>) -> Self { TaggedValue::Array(v) }
}

impl From<HashValue> for TaggedValue {
    fn from(v: HashValue) -> Self { TaggedValue::Hash(v) }
}

impl<T: Into<TaggedValue>> From<Option<T>> for TaggedValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(TaggedValue::Null)
    }
}

impl FromIterator<TaggedValue> for TaggedValue {
    fn from_iter<I: IntoIterator<Item = TaggedValue>>(iter: I) -> Self {
        TaggedValue::Array(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, TaggedValue)> for TaggedValue {
    fn from_iter<I: IntoIterator<Item = (K, TaggedValue)>>(iter: I) -> Self {
        TaggedValue::Hash(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
