// ============================================================================
// spark-elements - Ergonomic Macros
// ============================================================================

/// Helper macro to clone variables into a move closure.
///
/// This reduces the boilerplate of manually cloning `Rc`, `Object` or
/// `Element` handles before moving them into a watch callback.
///
/// # Usage
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use spark_elements::{cloned, Object, WatcherRegistry};
///
/// let data = Object::new();
/// let calls = Rc::new(Cell::new(0));
/// let registry = WatcherRegistry::new();
///
/// registry.watch("n", &data, cloned!(calls => move |_, _| calls.set(calls.get() + 1)));
///
/// data.insert("n", 1);
/// registry.check(&data);
/// assert_eq!(calls.get(), 1);
/// ```
#[macro_export]
macro_rules! cloned {
    ($($n:ident),+ => $e:expr) => {
        {
            $( let $n = $n.clone(); )+
            $e
        }
    };
}

/// Watch a component path with automatic variable capturing.
///
/// Wraps `element.watch(path, cloned!(... => move |old, new| ...))`.
///
/// # Usage
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use spark_elements::{watch, Element, ManualScheduler, Node, Value};
///
/// let el = Element::new(Node::element("x-counter"), Rc::new(ManualScheduler::new()));
/// let log = Rc::new(RefCell::new(Vec::new()));
///
/// // Clean syntax: list captures => |old, new| body
/// watch!(el, "data.count", log => |_old, new| log.borrow_mut().push(new));
///
/// el.data().insert("count", 1);
/// el.check_watchers();
/// assert_eq!(*log.borrow(), vec![Some(Value::from(1))]);
/// ```
#[macro_export]
macro_rules! watch {
    // Case 1: With captures
    ($element:expr, $path:expr, $($deps:ident),+ => |$old:pat_param, $new:pat_param| $body:expr) => {
        $element.watch($path, $crate::cloned!($($deps),+ => move |$old, $new| $body))
    };
    // Case 2: No captures (any callback expression)
    ($element:expr, $path:expr, $callback:expr) => {
        $element.watch($path, $callback)
    };
}
