// ============================================================================
// spark-elements - Watcher Registry
// Path watches re-checked on every poll tick
// ============================================================================
//
// Entries live in an ordered slot vector and the slot index is their
// identity. Destroying an entry leaves a tombstone (None) in its slot;
// slots are never compacted and indices never reused, so a destroyer can
// never remove somebody else's watch.
//
// Callbacks run with no registry borrow held. They may watch, destroy,
// clear or tick again (nested ticks are ignored).
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{trace, warn};

use crate::core::error::{ElementError, Result};
use crate::core::types::ResolveBinding;
use crate::core::value::Value;
use crate::reactivity::equality::{strict_equals, WatchEqualsFn};

/// Change callback: `(old, new)`. `None` means the path did not resolve.
pub type WatchFn = Box<dyn FnMut(Option<Value>, Option<Value>)>;

// =============================================================================
// WATCH ENTRY
// =============================================================================

struct WatchEntry {
    path: String,
    callback: Rc<RefCell<WatchFn>>,
    /// Last value the registry observed; only the registry writes it
    current: Option<Value>,
    equals: WatchEqualsFn,
}

struct RegistryInner {
    slots: RefCell<Vec<Option<WatchEntry>>>,
    checking: Cell<bool>,
}

// =============================================================================
// WATCHER REGISTRY
// =============================================================================

/// Ordered set of path watches owned by one component.
///
/// # Example
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use spark_elements::{Object, Value, WatcherRegistry};
///
/// let data = Object::new();
/// data.insert("count", 1);
///
/// let registry = WatcherRegistry::new();
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let seen_cb = seen.clone();
/// registry.watch("count", &data, move |old, new| {
///     seen_cb.borrow_mut().push((old, new));
/// });
///
/// data.insert("count", 2);
/// assert_eq!(registry.check(&data), 1);
/// assert_eq!(registry.check(&data), 0);
/// assert_eq!(
///     seen.borrow()[0],
///     (Some(Value::from(1)), Some(Value::from(2)))
/// );
/// ```
#[derive(Clone)]
pub struct WatcherRegistry {
    inner: Rc<RegistryInner>,
}

impl WatcherRegistry {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                slots: RefCell::new(Vec::new()),
                checking: Cell::new(false),
            }),
        }
    }

    /// Watch `path`, using strict equality to detect changes.
    ///
    /// The baseline is resolved through `source` immediately, so the
    /// callback only fires for changes after this call.
    pub fn watch<F>(&self, path: &str, source: &dyn ResolveBinding, callback: F) -> Destroyer
    where
        F: FnMut(Option<Value>, Option<Value>) + 'static,
    {
        self.watch_with_equals(path, source, strict_equals, callback)
    }

    /// Watch `path` with a custom change test.
    pub fn watch_with_equals<F>(
        &self,
        path: &str,
        source: &dyn ResolveBinding,
        equals: WatchEqualsFn,
        callback: F,
    ) -> Destroyer
    where
        F: FnMut(Option<Value>, Option<Value>) + 'static,
    {
        let entry = WatchEntry {
            path: path.to_string(),
            callback: Rc::new(RefCell::new(Box::new(callback))),
            current: source.binding_value(path),
            equals,
        };

        match self.register(entry) {
            Ok(destroyer) => destroyer,
            Err(err) => {
                warn!(%err, "watch registration failed");
                Destroyer::noop()
            }
        }
    }

    fn register(&self, entry: WatchEntry) -> Result<Destroyer> {
        let mut slots = self
            .inner
            .slots
            .try_borrow_mut()
            .map_err(|_| ElementError::WatchRegistration {
                path: entry.path.clone(),
            })?;

        let index = slots.len();
        trace!(path = entry.path.as_str(), index, "watch registered");
        slots.push(Some(entry));

        Ok(Destroyer {
            registry: Rc::downgrade(&self.inner),
            slot: Cell::new(Some(index)),
        })
    }

    /// One tick: re-resolve every live entry that existed when the tick
    /// started and notify the ones whose value changed.
    ///
    /// The stored value is updated before its callback runs. A check started
    /// from inside a callback returns 0 without doing anything.
    ///
    /// Returns the number of callbacks invoked.
    pub fn check(&self, source: &dyn ResolveBinding) -> usize {
        if self.inner.checking.replace(true) {
            trace!("nested watcher check ignored");
            return 0;
        }
        let _guard = CheckingGuard(&self.inner.checking);

        let count = self.inner.slots.borrow().len();
        let mut notified = 0;

        for index in 0..count {
            let Some((path, current, equals)) = self.snapshot(index) else {
                continue;
            };

            let next = source.binding_value(&path);
            if equals(&current, &next) {
                continue;
            }

            // Store first: the callback may re-enter the registry
            let callback = {
                let mut slots = self.inner.slots.borrow_mut();
                match slots.get_mut(index).and_then(Option::as_mut) {
                    Some(entry) => {
                        entry.current = next.clone();
                        entry.callback.clone()
                    }
                    None => continue,
                }
            };

            trace!(path = path.as_str(), index, "watched value changed");
            (&mut *callback.borrow_mut())(current, next);
            notified += 1;
        }

        notified
    }

    fn snapshot(&self, index: usize) -> Option<(String, Option<Value>, WatchEqualsFn)> {
        let slots = self.inner.slots.borrow();
        let entry = slots.get(index)?.as_ref()?;
        Some((entry.path.clone(), entry.current.clone(), entry.equals))
    }

    /// Destroy every live entry. Outstanding destroyers become no-ops.
    pub fn clear_all(&self) {
        let removed: Vec<WatchEntry> = self
            .inner
            .slots
            .borrow_mut()
            .iter_mut()
            .filter_map(Option::take)
            .collect();

        if !removed.is_empty() {
            trace!(count = removed.len(), "watchers cleared");
        }
        // Callbacks drop here, after the borrow is released
        drop(removed);
    }

    /// Number of live entries.
    pub fn active_count(&self) -> usize {
        self.inner
            .slots
            .borrow()
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    /// Number of slots ever allocated, tombstones included.
    pub fn len(&self) -> usize {
        self.inner.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Paths of the live entries, in slot order.
    pub fn paths(&self) -> Vec<String> {
        self.inner
            .slots
            .borrow()
            .iter()
            .flatten()
            .map(|entry| entry.path.clone())
            .collect()
    }
}

impl Default for WatcherRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WatcherRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherRegistry")
            .field("slots", &self.len())
            .field("active", &self.active_count())
            .finish()
    }
}

struct CheckingGuard<'a>(&'a Cell<bool>);

impl Drop for CheckingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

// =============================================================================
// DESTROYER
// =============================================================================

/// Removes one watch entry.
///
/// Dropping a destroyer does not remove the watch; call [`Destroyer::destroy`]
/// or clear the registry.
pub struct Destroyer {
    registry: Weak<RegistryInner>,
    slot: Cell<Option<usize>>,
}

impl Destroyer {
    /// A destroyer bound to nothing.
    pub fn noop() -> Self {
        Self {
            registry: Weak::new(),
            slot: Cell::new(None),
        }
    }

    /// Tombstone the entry. Idempotent; other entries keep their slots.
    pub fn destroy(&self) {
        let Some(index) = self.slot.take() else {
            return;
        };
        let Some(registry) = self.registry.upgrade() else {
            return;
        };

        let removed = match registry.slots.try_borrow_mut() {
            Ok(mut slots) => slots.get_mut(index).and_then(Option::take),
            Err(_) => {
                warn!(index, "watch entry busy; destroy skipped");
                self.slot.set(Some(index));
                return;
            }
        };

        if removed.is_some() {
            trace!(index, "watch destroyed");
        }
        drop(removed);
    }

    /// True while the entry this destroyer is bound to is live.
    pub fn is_active(&self) -> bool {
        let (Some(index), Some(registry)) = (self.slot.get(), self.registry.upgrade()) else {
            return false;
        };
        matches!(registry.slots.borrow().get(index), Some(Some(_)))
    }
}

impl fmt::Debug for Destroyer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Destroyer")
            .field("slot", &self.slot.get())
            .field("active", &self.is_active())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
