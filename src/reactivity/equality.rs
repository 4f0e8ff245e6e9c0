// ============================================================================
// spark-elements - Equality Functions
// Change detection for watched binding values
// ============================================================================

use std::collections::HashSet;

use crate::core::value::Value;

/// Equality used by a watch entry to decide whether a value changed.
///
/// Both sides are "maybe found": `None` means the path did not resolve.
pub type WatchEqualsFn = fn(&Option<Value>, &Option<Value>) -> bool;

// =============================================================================
// NUMBER EQUALITY
// =============================================================================

/// Safe not-equal check for f64.
/// Handles NaN correctly: NaN == NaN returns true (unlike IEEE 754), so a
/// watched NaN does not notify on every tick.
///
/// # Example
/// ```
/// use spark_elements::reactivity::equality::safe_not_equal_f64;
///
/// assert!(safe_not_equal_f64(&1.0, &2.0));
/// assert!(!safe_not_equal_f64(&1.0, &1.0));
/// assert!(!safe_not_equal_f64(&f64::NAN, &f64::NAN));
/// assert!(safe_not_equal_f64(&f64::NAN, &1.0));
/// ```
pub fn safe_not_equal_f64(a: &f64, b: &f64) -> bool {
    if a.is_nan() {
        return !b.is_nan();
    }
    a != b
}

/// Safe equality for f64 values.
pub fn safe_equals_f64(a: &f64, b: &f64) -> bool {
    !safe_not_equal_f64(a, b)
}

// =============================================================================
// WATCH EQUALITY
// =============================================================================

/// Default watch equality: strict, identity for arrays and objects.
///
/// Mutating a watched object in place does not count as a change; replacing
/// it with another object does.
///
/// # Example
/// ```
/// use spark_elements::reactivity::equality::strict_equals;
/// use spark_elements::{Object, Value};
///
/// let user = Object::new();
/// let same = Some(Value::from(user.clone()));
/// assert!(strict_equals(&same, &Some(Value::from(user))));
/// assert!(!strict_equals(&same, &Some(Value::from(Object::new()))));
/// assert!(!strict_equals(&None, &Some(Value::Null)));
/// ```
pub fn strict_equals(a: &Option<Value>, b: &Option<Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.strict_equals(b),
        _ => false,
    }
}

/// Strict equality without the NaN exception: a NaN never equals itself, so
/// a watch on a NaN value notifies on every tick.
///
/// ```
/// use spark_elements::reactivity::equality::{nan_unequal_equals, strict_equals};
/// use spark_elements::Value;
///
/// let nan = Some(Value::Number(f64::NAN));
/// assert!(strict_equals(&nan, &nan));
/// assert!(!nan_unequal_equals(&nan, &nan));
/// assert!(nan_unequal_equals(&Some(Value::from(1)), &Some(Value::from(1))));
/// ```
pub fn nan_unequal_equals(a: &Option<Value>, b: &Option<Value>) -> bool {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x == y,
        _ => strict_equals(a, b),
    }
}

/// Structural equality, comparing arrays and objects by their contents.
///
/// Inherited properties do not take part; only own properties are compared.
/// Cycles are handled by assuming a pair already under comparison is equal.
pub fn deep_equals(a: &Option<Value>, b: &Option<Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => deep_equals_value(a, b, &mut HashSet::new()),
        _ => false,
    }
}

fn deep_equals_value(a: &Value, b: &Value, visiting: &mut HashSet<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Array(x), Value::Array(y)) => {
            let key = (x.identity(), y.identity());
            if key.0 == key.1 || !visiting.insert(key) {
                return true;
            }
            let (xs, ys) = (x.to_vec(), y.to_vec());
            let equal = xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys.iter())
                    .all(|(l, r)| deep_equals_value(l, r, visiting));
            visiting.remove(&key);
            equal
        }
        (Value::Object(x), Value::Object(y)) => {
            let key = (x.identity(), y.identity());
            if key.0 == key.1 || !visiting.insert(key) {
                return true;
            }
            let (xs, ys) = (x.entries(), y.entries());
            let equal = xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys.iter())
                    .all(|((lk, lv), (rk, rv))| lk == rk && deep_equals_value(lv, rv, visiting));
            visiting.remove(&key);
            equal
        }
        _ => a.strict_equals(b),
    }
}

/// Never equal: the watch callback fires on every tick.
pub fn never_equals(_a: &Option<Value>, _b: &Option<Value>) -> bool {
    false
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Object;
    use serde_json::json;

    #[test]
    fn test_safe_equals_f64() {
        assert!(safe_equals_f64(&1.0, &1.0));
        assert!(!safe_equals_f64(&1.0, &2.0));
        assert!(safe_equals_f64(&-0.0, &0.0));
        assert!(safe_equals_f64(&f64::NAN, &f64::NAN));
        assert!(!safe_equals_f64(&f64::NAN, &1.0));
        assert!(!safe_equals_f64(&f64::INFINITY, &f64::NEG_INFINITY));
    }

    #[test]
    fn test_strict_equals_missing_vs_null() {
        assert!(strict_equals(&None, &None));
        assert!(!strict_equals(&Some(Value::Null), &None));
        assert!(strict_equals(
            &Some(Value::from("a")),
            &Some(Value::from("a"))
        ));
    }

    #[test]
    fn test_deep_equals_compares_contents() {
        let a = Some(Value::from(json!({"user": {"tags": [1, 2]}})));
        let b = Some(Value::from(json!({"user": {"tags": [1, 2]}})));
        let c = Some(Value::from(json!({"user": {"tags": [1, 3]}})));

        assert!(!strict_equals(&a, &b));
        assert!(deep_equals(&a, &b));
        assert!(!deep_equals(&a, &c));
    }

    #[test]
    fn test_deep_equals_handles_cycles() {
        let a = Object::new();
        a.insert("me", a.clone());
        let b = Object::new();
        b.insert("me", b.clone());

        assert!(deep_equals(&Some(Value::from(a)), &Some(Value::from(b))));
    }

    #[test]
    fn test_never_equals() {
        assert!(!never_equals(&None, &None));
        assert!(!never_equals(&Some(Value::from(1)), &Some(Value::from(1))));
    }

    #[test]
    fn test_nan_unequal_equals() {
        let nan = Some(Value::Number(f64::NAN));
        assert!(!nan_unequal_equals(&nan, &nan));
        assert!(nan_unequal_equals(&None, &None));
        assert!(!nan_unequal_equals(&nan, &None));
        assert!(nan_unequal_equals(&Some(Value::from("a")), &Some(Value::from("a"))));
    }
}
