// ============================================================================
// spark-elements - Value Model
// Dynamically typed values held in data bags and component properties
// ============================================================================
//
// Arrays and objects are shared handles: cloning a Value clones the handle,
// so a child component that resolved `data.user` from its parent sees every
// later write the parent makes to that user object. Identity is what the
// watcher registry compares for these types.
// ============================================================================

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::reactivity::equality::safe_equals_f64;

// =============================================================================
// VALUE
// =============================================================================

/// A value reachable through a binding path.
///
/// "Not found" is never a `Value`; APIs return `Option<Value>` and use `None`
/// for it.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(Array),
    Object(Object),
}

impl Value {
    /// Whether the value counts as "present" for bindings and inputs.
    ///
    /// `null`, `false`, `0`, `NaN` and `""` are falsy. Arrays and objects are
    /// always truthy, even when empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Strict equality: primitives by value, arrays and objects by identity.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => safe_equals_f64(a, b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Look up a property by key, including inherited object properties.
    ///
    /// Only arrays and objects have properties; every other value yields `None`.
    pub fn property(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(obj) => obj.get(key),
            Value::Array(arr) => arr.property(key),
            _ => None,
        }
    }

    /// Coerce to the text written into markup.
    pub fn to_text(&self) -> String {
        let mut seen = HashSet::new();
        self.write_text(&mut seen)
    }

    fn write_text(&self, seen: &mut HashSet<*const ()>) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number_to_text(*n),
            Value::String(s) => s.to_string(),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Array(arr) => {
                // Self-containing arrays print empty where they recur
                if !seen.insert(arr.as_ptr()) {
                    return String::new();
                }
                let text = arr
                    .to_vec()
                    .iter()
                    .map(|item| match item {
                        Value::Null => String::new(),
                        other => other.write_text(seen),
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                seen.remove(&arr.as_ptr());
                text
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Export to JSON. Cycles are cut and exported as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        let mut seen = HashSet::new();
        self.write_json(&mut seen)
    }

    fn write_json(&self, seen: &mut HashSet<*const ()>) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => {
                serde_json::Value::from(*n as i64)
            }
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::Array(arr) => {
                if !seen.insert(arr.as_ptr()) {
                    return serde_json::Value::Null;
                }
                let items = arr.to_vec().iter().map(|v| v.write_json(seen)).collect();
                seen.remove(&arr.as_ptr());
                serde_json::Value::Array(items)
            }
            Value::Object(obj) => {
                if !seen.insert(obj.as_ptr()) {
                    return serde_json::Value::Null;
                }
                let mut map = serde_json::Map::new();
                for (key, value) in obj.entries() {
                    map.insert(key, value.write_json(seen));
                }
                seen.remove(&obj.as_ptr());
                serde_json::Value::Object(map)
            }
        }
    }
}

/// Number formatting matching what markup consumers expect: plain decimals
/// inside `[1e-6, 1e21)`, exponent form (`1e+21`, `1.5e-7`) outside it.
fn number_to_text(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if (1e-6..1e21).contains(&n.abs()) {
        format!("{n}")
    } else {
        let text = format!("{n:e}");
        match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => text,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(arr) => arr.fmt(f),
            Value::Object(obj) => obj.fmt(f),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

impl From<Array> for Value {
    fn from(arr: Array) -> Self {
        Value::Array(arr)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Array::from(items))
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect::<Vec<_>>().into())
            }
            serde_json::Value::Object(map) => {
                let obj = Object::new();
                for (key, value) in map {
                    obj.insert(key, Value::from(value));
                }
                Value::Object(obj)
            }
        }
    }
}

// =============================================================================
// OBJECT
// =============================================================================

struct ObjectInner {
    props: RefCell<BTreeMap<String, Value>>,
    prototype: Option<Object>,
}

/// A shared, mutable string-keyed object with an optional prototype.
///
/// The prototype is fixed at construction, so prototype chains cannot form
/// cycles.
#[derive(Clone)]
pub struct Object {
    inner: Rc<ObjectInner>,
}

impl Object {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ObjectInner {
                props: RefCell::new(BTreeMap::new()),
                prototype: None,
            }),
        }
    }

    /// Create an object that inherits properties from `prototype`.
    pub fn with_prototype(prototype: Object) -> Self {
        Self {
            inner: Rc::new(ObjectInner {
                props: RefCell::new(BTreeMap::new()),
                prototype: Some(prototype),
            }),
        }
    }

    pub fn prototype(&self) -> Option<&Object> {
        self.inner.prototype.as_ref()
    }

    /// Own-or-inherited property lookup.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut current = Some(self);
        while let Some(obj) = current {
            if let Some(value) = obj.inner.props.borrow().get(key) {
                return Some(value.clone());
            }
            current = obj.inner.prototype.as_ref();
        }
        None
    }

    /// Own property lookup only.
    pub fn get_own(&self, key: &str) -> Option<Value> {
        self.inner.props.borrow().get(key).cloned()
    }

    /// Whether `key` is an own or inherited property.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set an own property, returning the previous own value.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner.props.borrow_mut().insert(key.into(), value.into())
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.props.borrow_mut().remove(key)
    }

    /// Own property names, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.inner.props.borrow().keys().cloned().collect()
    }

    /// Snapshot of own properties.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.inner
            .props
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.props.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.props.borrow().is_empty()
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn as_ptr(&self) -> *const () {
        Rc::as_ptr(&self.inner) as *const ()
    }

    /// Address of the shared storage, stable while any handle is alive.
    pub(crate) fn identity(&self) -> usize {
        self.as_ptr() as usize
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Object {
    // Shallow on purpose: objects may contain themselves
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("keys", &self.keys())
            .field("inherits", &self.inner.prototype.is_some())
            .finish()
    }
}

// =============================================================================
// ARRAY
// =============================================================================

/// A shared, mutable list of values.
#[derive(Clone)]
pub struct Array {
    inner: Rc<RefCell<Vec<Value>>>,
}

impl Array {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.inner.borrow().get(index).cloned()
    }

    /// Replace the item at `index`. Returns false if out of bounds.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> bool {
        match self.inner.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn push(&self, value: impl Into<Value>) {
        self.inner.borrow_mut().push(value.into());
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.inner.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// `length` and canonical decimal indices are the only array properties.
    fn property(&self, key: &str) -> Option<Value> {
        if key == "length" {
            return Some(Value::from(self.len()));
        }
        // "01" and "+1" are not indices
        if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
            return None;
        }
        if !key.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        key.parse::<usize>().ok().and_then(|index| self.get(index))
    }

    fn as_ptr(&self) -> *const () {
        Rc::as_ptr(&self.inner) as *const ()
    }

    pub(crate) fn identity(&self) -> usize {
        self.as_ptr() as usize
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Value>> for Array {
    fn from(items: Vec<Value>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(items)),
        }
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array").field("len", &self.len()).finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_follows_markup_rules() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());

        assert!(Value::Number(-1.0).is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::Object(Object::new()).is_truthy());
        assert!(Value::Array(Array::new()).is_truthy());
    }

    #[test]
    fn objects_compare_by_identity() {
        let a = Object::new();
        let b = Object::new();

        assert_eq!(Value::from(a.clone()), Value::from(a.clone()));
        assert_ne!(Value::from(a), Value::from(b));
        assert_eq!(Value::from("hi"), Value::from("hi".to_string()));
        assert_ne!(Value::Null, Value::Bool(false));
    }

    #[test]
    fn shared_object_writes_are_visible_through_clones() {
        let user = Object::new();
        let handle = Value::from(user.clone());

        user.insert("name", "Ada");

        assert_eq!(handle.property("name"), Some(Value::from("Ada")));
    }

    #[test]
    fn prototype_properties_are_inherited() {
        let base = Object::new();
        base.insert("greeting", "hello");
        let child = Object::with_prototype(base.clone());
        child.insert("name", "Bob");

        assert_eq!(child.get("greeting"), Some(Value::from("hello")));
        assert!(child.get_own("greeting").is_none());
        assert!(child.has("name"));

        // Own properties shadow inherited ones
        child.insert("greeting", "hi");
        assert_eq!(child.get("greeting"), Some(Value::from("hi")));
        assert_eq!(base.get("greeting"), Some(Value::from("hello")));
    }

    #[test]
    fn array_properties() {
        let arr = Value::from(json!(["a", "b"]));

        assert_eq!(arr.property("0"), Some(Value::from("a")));
        assert_eq!(arr.property("length"), Some(Value::from(2)));
        assert_eq!(arr.property("2"), None);
        assert_eq!(arr.property("01"), None);
        assert_eq!(arr.property("-1"), None);
        assert_eq!(Value::from("abc").property("length"), None);
    }

    #[test]
    fn text_coercion() {
        assert_eq!(Value::Number(5.0).to_text(), "5");
        assert_eq!(Value::Number(1.5).to_text(), "1.5");
        assert_eq!(Value::Number(-0.0).to_text(), "0");
        assert_eq!(Value::Number(f64::INFINITY).to_text(), "Infinity");
        assert_eq!(Value::Number(1e20).to_text(), "100000000000000000000");
        assert_eq!(Value::Number(0.000001).to_text(), "0.000001");
        assert_eq!(Value::Bool(true).to_text(), "true");
        assert_eq!(Value::Null.to_text(), "null");
        assert_eq!(Value::from(json!([1, null, "x"])).to_text(), "1,,x");
        assert_eq!(Value::from(json!({"a": 1})).to_text(), "[object Object]");
    }

    #[test]
    fn self_containing_values_do_not_recurse_forever() {
        let arr = Array::new();
        arr.push(1);
        arr.push(Value::from(arr.clone()));
        assert_eq!(Value::from(arr.clone()).to_text(), "1,");

        let obj = Object::new();
        obj.insert("me", obj.clone());
        assert_eq!(Value::from(obj).to_json(), json!({"me": null}));
    }

    #[test]
    fn json_round_trip_keeps_structure() {
        let source = json!({"user": {"name": "Ada", "tags": ["x", "y"]}, "count": 3});
        let value = Value::from(source.clone());

        assert_eq!(value.to_json(), source);
    }

    #[test]
    fn large_and_tiny_numbers_use_exponent_form() {
        assert_eq!(Value::Number(1e21).to_text(), "1e+21");
        assert_eq!(Value::Number(-2.5e30).to_text(), "-2.5e+30");
        assert_eq!(Value::Number(1e-7).to_text(), "1e-7");
        assert_eq!(Value::Number(1.5e-7).to_text(), "1.5e-7");
    }
}
