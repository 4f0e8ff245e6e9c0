// ============================================================================
// spark-elements - Reactivity Module
// Change detection: equality, watch registry and poll scheduling
// ============================================================================

pub mod equality;
pub mod scheduling;
pub mod watchers;

pub use equality::{deep_equals, nan_unequal_equals, never_equals, strict_equals, WatchEqualsFn};
pub use scheduling::{ManualScheduler, PollLoop, Scheduler, Task, TaskId};
pub use watchers::{Destroyer, WatchFn, WatcherRegistry};
