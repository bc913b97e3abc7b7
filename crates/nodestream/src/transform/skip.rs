use crate::node::Node;

/// Discards exactly one complete subtree.
///
/// Once [activated](Skip::activate), [`skip`](Skip::skip) reports `true`
/// for every event until the one that brings the nesting depth back to zero,
/// inclusive. A lone value right after activation is a whole subtree on its
/// own. An `End` arriving at depth zero belongs to the enclosing container,
/// so it is let through and ends the skip.
///
/// # Examples
///
/// ```
/// use nodestream::{Node, transform::Skip};
///
/// let mut skip = Skip::new();
/// skip.activate();
/// assert!(skip.skip(&Node::object_start()));
/// assert!(skip.skip(&Node::object_end()));
/// assert!(!skip.is_active());
/// assert!(!skip.skip(&Node::value(1)));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Skip {
    active: bool,
    depth: usize,
}

impl Skip {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts swallowing with the next event.
    pub fn activate(&mut self) {
        self.active = true;
        self.depth = 0;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether `node` should be dropped.
    pub fn skip(&mut self, node: &Node) -> bool {
        if !self.active {
            return false;
        }
        match node {
            Node::Start { .. } => {
                self.depth += 1;
            }
            Node::End { .. } => {
                if self.depth == 0 {
                    self.active = false;
                    return false;
                }
                self.depth -= 1;
                self.active = self.depth > 0;
            }
            Node::Value { .. } => {
                self.active = self.depth > 0;
            }
        }
        trace!(depth = self.depth, active = self.active, "skipped event");
        true
    }
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use super::*;

    fn run(skip: &mut Skip, activate_at: usize, events: &[Node]) -> Vec<Node> {
        let mut kept = Vec::new();
        for (i, node) in events.iter().enumerate() {
            if i == activate_at {
                skip.activate();
            }
            if !skip.skip(node) {
                kept.push(node.clone());
            }
        }
        kept
    }

    #[test]
    fn drops_exactly_one_subtree() {
        let events = vec![
            Node::collection_start(),
            Node::value("before"),
            Node::object_start(),
            Node::property_start("a"),
            Node::collection_start(),
            Node::value(1),
            Node::value(2),
            Node::collection_end(),
            Node::property_end(),
            Node::object_end(),
            Node::value("after"),
            Node::collection_end(),
        ];
        let mut skip = Skip::new();
        let kept = run(&mut skip, 2, &events);
        assert_eq!(
            kept,
            vec![
                Node::collection_start(),
                Node::value("before"),
                Node::value("after"),
                Node::collection_end(),
            ]
        );
        assert!(!skip.is_active());
    }

    #[test]
    fn lone_value_is_a_subtree() {
        let events = vec![Node::value(1), Node::value(2)];
        let mut skip = Skip::new();
        assert_eq!(run(&mut skip, 0, &events), vec![Node::value(2)]);
    }

    #[test]
    fn end_at_depth_zero_is_kept() {
        let events = vec![Node::collection_end(), Node::value(2)];
        let mut skip = Skip::new();
        assert_eq!(run(&mut skip, 0, &events), events);
        assert!(!skip.is_active());
    }

    #[test]
    fn inactive_skip_swallows_nothing() {
        let mut skip = Skip::new();
        assert!(!skip.skip(&Node::object_start()));
        assert!(!skip.skip(&Node::object_end()));
    }
}
