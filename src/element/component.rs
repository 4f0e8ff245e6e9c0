// ============================================================================
// spark-elements - Template Element
// The component: data bag, bindings, watchers and the poll loop
// ============================================================================
//
// An Element wraps a host node. Construction attaches a shadow root and
// links the host to this component so nested components can resolve their
// inputs through it. The link is weak: whoever holds the Element keeps the
// component alive.
//
// Lifecycle entry points for a platform adapter:
// - activate()            first time: inputs, render, bindings; then poll
// - deactivate()          clear watches, stop polling
// - on_external_change()  immediate watcher check
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::ControlFlow;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::binding::apply::{apply_bindings, AppliedBindings};
use crate::binding::inputs;
use crate::binding::path::resolve;
use crate::core::config::ElementConfig;
use crate::core::constants::DATA_PROPERTY;
use crate::core::error::{ElementError, Result};
use crate::core::types::ResolveBinding;
use crate::core::value::{Object, Value};
use crate::dom::node::Node;
use crate::element::ancestry::{find_binding_source, BindingSource};
use crate::element::lifecycle::Lifecycle;
use crate::reactivity::equality::WatchEqualsFn;
use crate::reactivity::scheduling::{PollLoop, Scheduler};
use crate::reactivity::watchers::{Destroyer, WatcherRegistry};

// =============================================================================
// ELEMENT INNER
// =============================================================================

struct ElementInner {
    host: Node,
    shadow_root: Option<Node>,

    /// Public property root; paths resolve against it
    properties: Object,

    /// The data bag, also reachable as `properties.data`
    data: Object,

    watchers: WatcherRegistry,
    poll: RefCell<Option<PollLoop>>,
    state: Cell<Lifecycle>,

    config: ElementConfig,
    scheduler: Rc<dyn Scheduler>,

    /// Weak reference to self (set after Rc creation)
    self_weak: RefCell<Weak<ElementInner>>,
}

impl ResolveBinding for ElementInner {
    fn binding_value(&self, path: &str) -> Option<Value> {
        resolve(path, &Value::Object(self.properties.clone()))
    }
}

impl ElementInner {
    fn check_watchers(&self) -> usize {
        self.watchers.check(self)
    }

    fn start_polling(&self) {
        let weak = self.self_weak.borrow().clone();
        let poll = PollLoop::start(self.scheduler.clone(), self.config.poll_interval(), move || {
            match weak.upgrade() {
                Some(inner) => {
                    inner.check_watchers();
                    ControlFlow::Continue(())
                }
                None => ControlFlow::Break(()),
            }
        });

        // Replacing an old loop drops (and so cancels) it
        let previous = self.poll.borrow_mut().replace(poll);
        drop(previous);
    }

    fn stop_polling(&self) {
        let poll = self.poll.borrow_mut().take();
        if let Some(poll) = poll {
            poll.stop();
        }
    }

    fn render(&self) -> Result<AppliedBindings> {
        let shadow = self
            .shadow_root
            .as_ref()
            .ok_or(ElementError::MissingShadowRoot)?;
        let id = self.host.tag_name().to_lowercase();
        let content = self
            .host
            .template_content(&id)
            .ok_or(ElementError::MissingTemplate { id })?;

        let applied = apply_bindings(&content, self, &self.config.bind_attribute);
        shadow.append_child(&content);
        Ok(applied)
    }
}

// =============================================================================
// ELEMENT
// =============================================================================

/// A template-backed component attached to a host node.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use std::time::Duration;
/// use serde_json::json;
/// use spark_elements::{Element, ManualScheduler, Node};
///
/// let doc = Node::document_with_view(json!({ "user": { "name": "Ada" } }));
/// let template = doc.create_element("template").with_attribute("id", "user-card");
/// template.append_child(&doc.create_element("span").with_attribute("bind", "data.name"));
/// doc.append_child(&template);
///
/// let host = doc.create_element("user-card").with_attribute("data-name", "user.name");
/// doc.append_child(&host);
///
/// let scheduler = Rc::new(ManualScheduler::new());
/// let card = Element::new(host, scheduler.clone());
/// card.activate();
///
/// let shadow = card.shadow_root().unwrap();
/// assert_eq!(shadow.to_markup(), "<span bind=\"data.name\">Ada</span>");
///
/// card.deactivate();
/// assert_eq!(scheduler.pending_count(), 0);
/// ```
#[derive(Clone)]
pub struct Element {
    inner: Rc<ElementInner>,
}

impl Element {
    /// Create a component on `host` with the default configuration.
    pub fn new(host: Node, scheduler: Rc<dyn Scheduler>) -> Self {
        Self::build(host, scheduler, ElementConfig::default())
    }

    /// Create a component with a custom configuration, validating it first.
    pub fn with_config(
        host: Node,
        scheduler: Rc<dyn Scheduler>,
        config: ElementConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(host, scheduler, config))
    }

    fn build(host: Node, scheduler: Rc<dyn Scheduler>, config: ElementConfig) -> Self {
        let shadow_root = host.attach_shadow();
        if shadow_root.is_none() {
            debug!(tag = host.tag_name(), "{}", ElementError::MissingShadowRoot);
        }

        let data = Object::new();
        let properties = Object::new();
        properties.insert(DATA_PROPERTY, data.clone());

        let inner = Rc::new(ElementInner {
            host,
            shadow_root,
            properties,
            data,
            watchers: WatcherRegistry::new(),
            poll: RefCell::new(None),
            state: Cell::new(Lifecycle::Constructed),
            config,
            scheduler,
            self_weak: RefCell::new(Weak::new()),
        });

        // Store weak self-reference
        *inner.self_weak.borrow_mut() = Rc::downgrade(&inner);

        let weak = Rc::downgrade(&inner);
        let capability: Weak<dyn ResolveBinding> = weak;
        inner.host.set_binding_capability(capability);

        Self { inner }
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Connect the component.
    ///
    /// The first activation resolves inputs, renders the template into the
    /// shadow root and applies bindings. Every activation (re)starts
    /// polling. Activating an active component does nothing.
    pub fn activate(&self) {
        let state = self.inner.state.get();
        if !state.can_transition_to(Lifecycle::Active) {
            return;
        }

        if state == Lifecycle::Constructed {
            let stored = self.resolve_inputs();
            match self.inner.render() {
                Ok(applied) => debug!(
                    tag = self.inner.host.tag_name(),
                    inputs = stored,
                    text = applied.text,
                    attributes = applied.attributes,
                    "component rendered"
                ),
                Err(err) => debug!(tag = self.inner.host.tag_name(), %err, "render skipped"),
            }
        }

        self.inner.state.set(Lifecycle::Active);
        self.inner.start_polling();
        trace!(tag = self.inner.host.tag_name(), "component active");
    }

    /// Disconnect the component: destroy every watch and stop polling.
    pub fn deactivate(&self) {
        if !self.inner.state.get().can_transition_to(Lifecycle::Inactive) {
            return;
        }

        self.inner.watchers.clear_all();
        self.inner.stop_polling();
        self.inner.state.set(Lifecycle::Inactive);
        debug!(tag = self.inner.host.tag_name(), "component deactivated");
    }

    /// Host attributes changed: check watchers now, without waiting for the
    /// next tick. Returns the number of notifications.
    pub fn on_external_change(&self) -> usize {
        if !self.inner.state.get().is_active() {
            return 0;
        }
        self.inner.check_watchers()
    }

    pub fn state(&self) -> Lifecycle {
        self.inner.state.get()
    }

    /// True while a poll loop is scheduled.
    pub fn is_polling(&self) -> bool {
        self.inner
            .poll
            .borrow()
            .as_ref()
            .is_some_and(PollLoop::is_running)
    }

    // =========================================================================
    // DATA
    // =========================================================================

    /// The data bag. Writes are observed by watchers at the next check.
    pub fn data(&self) -> Object {
        self.inner.data.clone()
    }

    /// The property root paths resolve against; `data` lives here.
    pub fn properties(&self) -> Object {
        self.inner.properties.clone()
    }

    /// Resolve `path` against this component's properties.
    pub fn binding_value(&self, path: &str) -> Option<Value> {
        self.inner.binding_value(path)
    }

    /// Resolve prefixed host attributes into the data bag through the
    /// nearest ancestor component or the global root.
    pub fn resolve_inputs(&self) -> usize {
        let source = self.binding_source();
        let attributes = self.inner.host.attributes();
        inputs::resolve_inputs(
            &attributes,
            &self.inner.config.data_prefix,
            &source,
            &self.inner.data,
        )
    }

    /// Where this component's inputs resolve.
    pub fn binding_source(&self) -> BindingSource {
        find_binding_source(&self.inner.host, self.inner.config.fallback)
    }

    /// Re-run the binding pass over `root`, or the shadow root when `None`.
    pub fn update_bindings(&self, root: Option<&Node>) -> AppliedBindings {
        let root = match root {
            Some(root) => root.clone(),
            None => match &self.inner.shadow_root {
                Some(shadow) => shadow.clone(),
                None => return AppliedBindings::default(),
            },
        };
        apply_bindings(&root, &*self.inner, &self.inner.config.bind_attribute)
    }

    // =========================================================================
    // WATCHERS
    // =========================================================================

    /// Watch a path on this component. `callback(old, new)` runs when a
    /// check sees the resolved value change identity.
    pub fn watch<F>(&self, path: &str, callback: F) -> Destroyer
    where
        F: FnMut(Option<Value>, Option<Value>) + 'static,
    {
        self.inner.watchers.watch(path, &*self.inner, callback)
    }

    pub fn watch_with_equals<F>(&self, path: &str, equals: WatchEqualsFn, callback: F) -> Destroyer
    where
        F: FnMut(Option<Value>, Option<Value>) + 'static,
    {
        self.inner
            .watchers
            .watch_with_equals(path, &*self.inner, equals, callback)
    }

    pub fn clear_watches(&self) {
        self.inner.watchers.clear_all();
    }

    /// Run one watcher tick now. Returns the number of notifications.
    pub fn check_watchers(&self) -> usize {
        self.inner.check_watchers()
    }

    pub fn watchers(&self) -> &WatcherRegistry {
        &self.inner.watchers
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn host(&self) -> Node {
        self.inner.host.clone()
    }

    pub fn shadow_root(&self) -> Option<Node> {
        self.inner.shadow_root.clone()
    }

    pub fn config(&self) -> &ElementConfig {
        &self.inner.config
    }

    /// Id of the template this component renders.
    pub fn template_id(&self) -> String {
        self.inner.host.tag_name().to_lowercase()
    }

    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl ResolveBinding for Element {
    fn binding_value(&self, path: &str) -> Option<Value> {
        self.inner.binding_value(path)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.inner.host.tag_name())
            .field("state", &self.inner.state.get())
            .field("watchers", &self.inner.watchers)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
