use thiserror::Error;

use crate::{
    node::{Node, Shape},
    tree::NodeId,
    validator::{Bounds, Context},
};

/// Everything that can go wrong while producing, validating, transforming or
/// consuming a stream.
///
/// All errors are fail-fast: the operation that raised one should be
/// abandoned and retried from scratch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("structural violation: {node} is not allowed in {context}")]
    Structural { node: Node, context: Context },
    #[error("cardinality violation: {context} holds {count} children, expected {bounds}")]
    Cardinality {
        context: Context,
        count: usize,
        bounds: Bounds,
        /// The event that overflowed the bounds, or `None` when the
        /// context closed short.
        node: Option<Node>,
    },
    #[error("value violation: {node} cannot appear directly in {context}")]
    Value { node: Node, context: Context },
    #[error("premature termination: stream ended in {context} with {open} contexts open")]
    PrematureTermination { context: Context, open: usize },
    #[error("tree contract violation: {0}")]
    TreeContract(#[from] TreeError),
    #[error("stream is closed")]
    Closed,
}

/// A tree operation that would produce an impossible shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {0} does not belong to this tree")]
    UnknownNode(NodeId),
    #[error("a {parent} cannot hold a {child} child")]
    InvalidChild { parent: Shape, child: Shape },
    #[error("property already holds a value")]
    PropertyValueAlreadySet,
    #[error("document already holds its content")]
    DocumentContentAlreadySet,
    #[error("adopting node {0} would make it its own ancestor")]
    Cycle(NodeId),
    #[error("index {index} is out of bounds for {len} children")]
    OutOfBounds { index: usize, len: usize },
    #[error("a {0} node does not carry that payload")]
    WrongPayload(Shape),
    #[error("expected a property, found a {0}")]
    NotAProperty(Shape),
    #[error("node {0} is still attached to a parent")]
    StillAttached(NodeId),
    #[error("end event with no open container")]
    UnbalancedEnd,
}
