//! Flattens a [`Tree`] into an event stream.

use alloc::vec::Vec;

use crate::{
    error::{Error, TreeError},
    io::Reader,
    node::{Container, Node, Shape},
    settings::Settings,
    tree::{Model, NodeId, NodeRef, Tree},
};

struct Frame<'t> {
    container: Container,
    children: &'t [NodeId],
    next: usize,
}

/// A lazy pre/post-order walk over a tree.
///
/// Each `Start` is emitted before the node's children and the matching `End`
/// after them; value leaves become a single `Value` event. The walk uses an
/// explicit frame stack, so nesting depth is bounded only by memory.
///
/// A reader is single-use. Build a fresh one for each traversal.
///
/// # Examples
///
/// ```
/// use nodestream::{Model, Node, Tree};
///
/// let mut tree = Tree::new();
/// let list = tree.create(Model::collection());
/// let one = tree.create(Model::value(1));
/// tree.add_child(list, one)?;
/// tree.set_root(list)?;
///
/// let events: Vec<Node> = tree.reader().collect();
/// assert_eq!(
///     events,
///     [Node::collection_start(), Node::value(1), Node::collection_end()]
/// );
/// # Ok::<(), nodestream::TreeError>(())
/// ```
pub struct TreeReader<'t> {
    tree: &'t Tree,
    start: Option<NodeId>,
    started: bool,
    stack: Vec<Frame<'t>>,
    current: Option<Node>,
    settings: Settings,
}

impl<'t> TreeReader<'t> {
    /// Walks the published root of `tree`.
    #[must_use]
    pub fn new(tree: &'t Tree) -> Self {
        Self::with_settings(tree, Settings::new())
    }

    #[must_use]
    pub fn with_settings(tree: &'t Tree, settings: Settings) -> Self {
        TreeReader {
            tree,
            start: tree.root(),
            started: false,
            stack: Vec::new(),
            current: None,
            settings,
        }
    }

    /// Walks the subtree below `node` instead of the root.
    #[must_use]
    pub fn subtree(node: NodeRef<'t>, settings: Settings) -> Self {
        TreeReader {
            start: Some(node.id()),
            ..Self::with_settings(node.tree(), settings)
        }
    }

    fn node(&self, id: NodeId) -> Result<NodeRef<'t>, Error> {
        Ok(self.tree.get(id).ok_or(TreeError::UnknownNode(id))?)
    }

    /// Emits the event for entering `id` and schedules its children.
    fn enter(&mut self, id: NodeId) -> Result<Node, Error> {
        let node = self.node(id)?;
        let (container, name) = match node.model() {
            Model::Value(value) => return Ok(Node::value(value.clone())),
            Model::Document { name } => (Container::Document, name.clone()),
            Model::Object { name } => (Container::Object, name.clone()),
            Model::Collection { name } => (Container::Collection, name.clone()),
            Model::Property { name } => (Container::Property, Some(name.clone())),
        };
        self.stack.push(Frame {
            container,
            children: self.tree.children(id)?,
            next: 0,
        });
        Ok(Node::start(container, name))
    }

    /// Resolves the first node to visit. A fragment reader skips the
    /// document wrapper and starts at its content.
    fn first(&self) -> Result<Option<NodeId>, Error> {
        let Some(start) = self.start else {
            return Ok(None);
        };
        let node = self.node(start)?;
        if self.settings.is_fragment() && node.shape() == Shape::Document {
            trace!(%start, "unwrapping document fragment");
            return Ok(node.first_child().map(|c| c.id()));
        }
        Ok(Some(start))
    }
}

impl Reader for TreeReader<'_> {
    fn current(&self) -> Option<&Node> {
        self.current.as_ref()
    }

    fn read(&mut self) -> Result<bool, Error> {
        let next = if self.started {
            match self.stack.last_mut() {
                Some(frame) => {
                    let children = frame.children;
                    if let Some(&child) = children.get(frame.next) {
                        frame.next += 1;
                        Some(self.enter(child)?)
                    } else {
                        let container = frame.container;
                        self.stack.pop();
                        Some(Node::end(container))
                    }
                }
                None => None,
            }
        } else {
            self.started = true;
            match self.first()? {
                Some(id) => Some(self.enter(id)?),
                None => None,
            }
        };
        self.current = next;
        Ok(self.current.is_some())
    }

    fn close(&mut self) {
        self.started = true;
        self.stack.clear();
        self.current = None;
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl Iterator for TreeReader<'_> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        match self.read() {
            Ok(true) => self.current.clone(),
            Ok(false) => None,
            Err(_err) => {
                debug!(%_err, "tree walk aborted");
                self.close();
                None
            }
        }
    }
}

impl Tree {
    /// A fresh reader over the published root.
    #[must_use]
    pub fn reader(&self) -> TreeReader<'_> {
        TreeReader::new(self)
    }
}
