//! Builds a [`Tree`] from an event stream.
//!
//! The writer keeps an accumulator of finished children for the innermost
//! open container, a stack of accumulators for the containers around it, and
//! a parallel stack of the open nodes themselves. Closing a container takes
//! its accumulator as the node's children, restores the outer accumulator
//! and appends the finished node to it. When nothing is left open, the node
//! is published as the root.
//!
//! Without validation the writer trusts its input: mismatched `End`
//! categories close whatever is open. Shape rules of the tree itself are
//! still enforced and surface as [`Error::TreeContract`].

use alloc::{string::String, vec::Vec};
use core::mem;

use crate::{
    error::{Error, TreeError},
    io::Writer,
    node::{Container, Node},
    scalar::Scalar,
    settings::Settings,
    tree::{Model, NodeId, Tree},
    validator::Context,
};

/// A [`Writer`] that materializes the stream it receives.
///
/// # Examples
///
/// ```
/// use nodestream::{Node, TreeWriter, Writer};
///
/// let mut writer = TreeWriter::new();
/// writer.write_all([
///     Node::object_start(),
///     Node::property_start("name"),
///     Node::value("Ada"),
///     Node::property_end(),
///     Node::object_end(),
/// ])?;
/// let tree = writer.finish()?;
/// let name = tree.root_node().and_then(|r| r.property("name")).unwrap();
/// assert_eq!(name.value().and_then(|v| v.scalar()), Some(&"Ada".into()));
/// # Ok::<(), nodestream::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct TreeWriter {
    tree: Tree,
    current: Vec<NodeId>,
    outer: Vec<Vec<NodeId>>,
    open: Vec<(NodeId, Container)>,
    /// A top-level document start was dropped because of the fragment
    /// setting; its end must be dropped too. Holds the dropped name.
    unwrapped: Option<Option<String>>,
    complete: bool,
    settings: Settings,
}

impl TreeWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        TreeWriter {
            settings,
            ..Self::default()
        }
    }

    /// The tree built so far. Its root is only set once the outermost
    /// container closed.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Number of containers still open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Hands over the finished tree.
    ///
    /// Fails with [`Error::PrematureTermination`] if a container is still
    /// open or nothing was ever closed.
    pub fn finish(self) -> Result<Tree, Error> {
        if let Some(&(_, container)) = self.open.last() {
            return Err(Error::PrematureTermination {
                context: Context::Open(container),
                open: self.open.len(),
            });
        }
        if self.tree.root().is_none() {
            return Err(Error::PrematureTermination {
                context: Context::Root,
                open: 0,
            });
        }
        Ok(self.tree)
    }

    fn start(&mut self, container: Container, name: Option<String>) {
        if container == Container::Document
            && self.open.is_empty()
            && self.settings.is_fragment()
        {
            trace!("skipping document wrapper");
            self.unwrapped = Some(name);
            return;
        }
        let model = match container {
            Container::Document => Model::Document { name },
            Container::Object => Model::Object { name },
            Container::Collection => Model::Collection { name },
            Container::Property => Model::Property {
                name: name.unwrap_or_default(),
            },
        };
        let id = self.tree.create(model);
        self.outer.push(mem::take(&mut self.current));
        self.open.push((id, container));
        trace!(%id, %container, depth = self.open.len(), "opened node");
    }

    fn end(&mut self, container: Container) -> Result<(), Error> {
        let Some((id, opened)) = self.open.pop() else {
            if container == Container::Document {
                if let Some(name) = self.unwrapped.take() {
                    return self.close_wrapper(name);
                }
            }
            debug!(%container, "end with nothing open");
            return Err(TreeError::UnbalancedEnd.into());
        };
        if opened != container {
            debug!(%opened, %container, "end category does not match open node");
        }
        let children = mem::replace(&mut self.current, self.outer.pop().unwrap_or_default());
        self.attach(id, opened, children)?;
        if self.open.is_empty() {
            self.publish(id)
        } else {
            self.current.push(id);
            Ok(())
        }
    }

    fn attach(
        &mut self,
        id: NodeId,
        container: Container,
        children: Vec<NodeId>,
    ) -> Result<(), Error> {
        if container == Container::Property && children.is_empty() {
            let null = self.tree.create(Model::Value(Scalar::Null));
            self.tree.add_child(id, null)?;
            trace!(%id, "synthesized null property value");
            return Ok(());
        }
        if let Err(err) = self.tree.insert_children(id, 0, children) {
            debug!(%id, %err, "cannot attach children");
            return Err(err.into());
        }
        Ok(())
    }

    /// An unwrapped document that carried no content still stands for a
    /// complete stream, so it becomes an empty document root.
    fn close_wrapper(&mut self, name: Option<String>) -> Result<(), Error> {
        if self.tree.root().is_some() {
            return Ok(());
        }
        trace!("empty fragment kept as document");
        let id = self.tree.create(Model::Document { name });
        self.publish(id)
    }

    /// Publishes a finished top-level node. A later top-level node replaces
    /// an earlier one.
    fn publish(&mut self, id: NodeId) -> Result<(), Error> {
        if let Some(previous) = self.tree.take_root() {
            debug!(%previous, "replacing earlier top-level node");
            self.tree.release(previous)?;
        }
        self.tree.set_root(id)?;
        trace!(%id, "published root");
        Ok(())
    }
}

impl Writer for TreeWriter {
    fn write(&mut self, node: Node) -> Result<(), Error> {
        if self.complete {
            return Err(Error::Closed);
        }
        let result = match node {
            Node::Start { container, name } => {
                self.start(container, name);
                Ok(())
            }
            Node::End { container } => self.end(container),
            Node::Value { value } => {
                let id = self.tree.create(Model::Value(value));
                if self.open.is_empty() {
                    self.publish(id)
                } else {
                    self.current.push(id);
                    Ok(())
                }
            }
        };
        #[cfg(any(test, feature = "fuzzing"))]
        assert_eq!(
            self.outer.len(),
            self.open.len(),
            "accumulator stack out of step with open nodes"
        );
        result
    }

    fn write_complete(&mut self) -> Result<(), Error> {
        if !self.complete {
            self.complete = true;
            trace!(open = self.open.len(), "write complete");
        }
        Ok(())
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl Tree {
    /// Builds a tree from a complete event sequence without grammar checks.
    pub fn from_events<I>(events: I) -> Result<Tree, Error>
    where
        I: IntoIterator<Item = Node>,
    {
        let mut writer = TreeWriter::new();
        writer.write_all(events)?;
        writer.write_complete()?;
        writer.finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use super::*;
    use crate::node::Shape;

    #[test]
    fn empty_property_gets_null_value() {
        let tree = Tree::from_events([Node::property_start("x"), Node::property_end()]).unwrap();
        let root = tree.root_node().unwrap();
        assert_eq!(root.shape(), Shape::Property);
        assert_eq!(root.name(), Some("x"));
        assert_eq!(root.value().and_then(|v| v.scalar()), Some(&Scalar::Null));
    }

    #[test]
    fn second_property_value_breaks_the_tree_contract() {
        let err = Tree::from_events([
            Node::property_start("x"),
            Node::value(1),
            Node::value(2),
            Node::property_end(),
        ])
        .unwrap_err();
        assert_eq!(err, Error::TreeContract(TreeError::PropertyValueAlreadySet));
    }

    #[test]
    fn value_in_object_breaks_the_tree_contract() {
        let err = Tree::from_events([Node::object_start(), Node::value(1), Node::object_end()])
            .unwrap_err();
        assert_eq!(
            err,
            Error::TreeContract(TreeError::InvalidChild {
                parent: Shape::Object,
                child: Shape::Value,
            })
        );
    }

    #[test]
    fn document_with_two_children_breaks_the_tree_contract() {
        let err = Tree::from_events([
            Node::document_start(),
            Node::object_start(),
            Node::object_end(),
            Node::collection_start(),
            Node::collection_end(),
            Node::document_end(),
        ])
        .unwrap_err();
        assert_eq!(err, Error::TreeContract(TreeError::DocumentContentAlreadySet));
    }

    #[test]
    fn root_appears_only_after_outermost_end() {
        let mut writer = TreeWriter::new();
        writer.write(Node::collection_start()).unwrap();
        writer.write(Node::collection_start()).unwrap();
        writer.write(Node::collection_end()).unwrap();
        assert!(writer.tree().root().is_none());
        assert_eq!(writer.depth(), 1);
        writer.write(Node::collection_end()).unwrap();
        assert!(writer.tree().root().is_some());
    }

    #[test]
    fn incomplete_stream_yields_no_tree() {
        let mut writer = TreeWriter::new();
        writer.write(Node::object_start()).unwrap();
        writer.write_complete().unwrap();
        assert_eq!(
            writer.finish(),
            Err(Error::PrematureTermination {
                context: Context::Open(Container::Object),
                open: 1,
            })
        );
        assert!(matches!(
            TreeWriter::new().finish(),
            Err(Error::PrematureTermination { open: 0, .. })
        ));
    }

    #[test]
    fn unbalanced_end_is_rejected() {
        let mut writer = TreeWriter::new();
        assert_eq!(
            writer.write(Node::object_end()),
            Err(Error::TreeContract(TreeError::UnbalancedEnd))
        );
    }

    #[test]
    fn fragment_skips_document_wrapper() {
        let settings = Settings::new();
        settings.set_fragment(true);
        let mut writer = TreeWriter::with_settings(settings);
        writer
            .write_all(vec![
                Node::document_start(),
                Node::collection_start(),
                Node::value(true),
                Node::collection_end(),
                Node::document_end(),
            ])
            .unwrap();
        let tree = writer.finish().unwrap();
        let root = tree.root_node().unwrap();
        assert_eq!(root.shape(), Shape::Collection);
        assert_eq!(root.child_count(), 1);
    }

    #[test]
    fn empty_fragment_document_becomes_an_empty_root() {
        let settings = Settings::new();
        settings.set_fragment(true);
        let mut writer = TreeWriter::with_settings(settings).validating();
        writer
            .write_all([Node::document_start(), Node::document_end()])
            .unwrap();
        writer.write_complete().unwrap();
        let tree = writer.into_inner().finish().unwrap();
        let root = tree.root_node().unwrap();
        assert_eq!(root.shape(), Shape::Document);
        assert_eq!(root.child_count(), 0);
        let plain = Tree::from_events([Node::document_start(), Node::document_end()]).unwrap();
        assert_eq!(tree, plain);
    }

    #[test]
    fn collection_may_hold_properties() {
        let events = vec![
            Node::collection_start(),
            Node::property_start("x"),
            Node::value(1),
            Node::property_end(),
            Node::value("loose"),
            Node::collection_end(),
        ];
        let tree = Tree::from_events(events.clone()).unwrap();
        let root = tree.root_node().unwrap();
        let shapes: Vec<Shape> = root.children().map(|c| c.shape()).collect();
        assert_eq!(shapes, [Shape::Property, Shape::Value]);
        let value = root.property("x").and_then(|p| p.value()).unwrap();
        assert_eq!(value.scalar(), Some(&Scalar::Integer(1)));

        let replayed: Vec<Node> = tree.reader().collect();
        assert_eq!(replayed, events);
    }

    #[test]
    fn write_complete_is_idempotent() {
        let mut writer = TreeWriter::new();
        writer.write(Node::object_start()).unwrap();
        writer.write(Node::object_end()).unwrap();
        writer.write_complete().unwrap();
        writer.write_complete().unwrap();
        assert_eq!(writer.write(Node::value(1)), Err(Error::Closed));
        assert!(writer.finish().is_ok());
    }
}
