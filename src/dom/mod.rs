// ============================================================================
// spark-elements - DOM Module
// The markup capability and an in-memory tree implementing it
// ============================================================================

pub mod markup;
pub mod node;

pub use markup::MarkupNode;
pub use node::{Node, NodeKind};
