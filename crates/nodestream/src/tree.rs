//! In-memory document trees.
//!
//! A [`Tree`] is an arena of nodes addressed by [`NodeId`]. Every node owns
//! an ordered list of children and keeps a non-owning back-reference to its
//! parent, which lets us walk upwards without reference cycles. A node lives
//! in exactly one place: adopting it into a new parent first detaches it from
//! the old one.
//!
//! # Example
//!
//! ```
//! use nodestream::{Model, Tree};
//!
//! let mut tree = Tree::new();
//! let object = tree.create(Model::object());
//! let name = tree.create(Model::property("name"));
//! let ada = tree.create(Model::value("Ada"));
//! tree.add_child(name, ada)?;
//! tree.add_child(object, name)?;
//! tree.set_root(object)?;
//!
//! let root = tree.root_node().unwrap();
//! let value = root.property("name").and_then(|p| p.value()).unwrap();
//! assert_eq!(value.scalar().and_then(|s| s.as_str()), Some("Ada"));
//! assert_eq!(value.ancestors().count(), 2);
//! # Ok::<(), nodestream::TreeError>(())
//! ```

use alloc::{string::String, vec, vec::Vec};
use core::{
    fmt,
    ops::{Bound, RangeBounds},
};

use crate::{error::TreeError, node::Shape, scalar::Scalar};

/// Index of a node inside its [`Tree`].
///
/// Ids of released nodes may be handed out again by later calls to
/// [`Tree::create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[allow(clippy::cast_possible_truncation)]
    fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The variant and payload of a tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    /// The whole document; holds at most one object or collection.
    Document { name: Option<String> },
    /// An ordered sequence of properties.
    Object { name: Option<String> },
    /// An ordered sequence of any nodes except documents.
    Collection { name: Option<String> },
    /// A named slot holding exactly one value.
    Property { name: String },
    /// A scalar leaf.
    Value(Scalar),
}

impl Model {
    #[must_use]
    pub fn document() -> Self {
        Model::Document { name: None }
    }

    #[must_use]
    pub fn object() -> Self {
        Model::Object { name: None }
    }

    #[must_use]
    pub fn collection() -> Self {
        Model::Collection { name: None }
    }

    #[must_use]
    pub fn property(name: impl Into<String>) -> Self {
        Model::Property { name: name.into() }
    }

    #[must_use]
    pub fn value(value: impl Into<Scalar>) -> Self {
        Model::Value(value.into())
    }

    #[must_use]
    pub fn shape(&self) -> Shape {
        match self {
            Model::Document { .. } => Shape::Document,
            Model::Object { .. } => Shape::Object,
            Model::Collection { .. } => Shape::Collection,
            Model::Property { .. } => Shape::Property,
            Model::Value(_) => Shape::Value,
        }
    }

    /// The name payload of a container node.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Model::Document { name } | Model::Object { name } | Model::Collection { name } => {
                name.as_deref()
            }
            Model::Property { name } => Some(name),
            Model::Value(_) => None,
        }
    }

    /// The scalar payload of a value leaf.
    #[must_use]
    pub fn scalar(&self) -> Option<&Scalar> {
        if let Model::Value(v) = self {
            Some(v)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    model: Model,
}

/// An arena-backed document tree.
///
/// Nodes are created detached, then wired together with
/// [`add_child`](Tree::add_child) and friends. A tree may hold several
/// detached subtrees at once; the one published with
/// [`set_root`](Tree::set_root) is the document.
///
/// Two trees compare equal when their roots are deep-equal: same shape,
/// payload and child order at every level. Node ids play no part.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    slots: Vec<Option<Slot>>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    live: usize,
}

impl Tree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a detached node.
    pub fn create(&mut self, model: Model) -> NodeId {
        let slot = Slot {
            parent: None,
            children: Vec::new(),
            model,
        };
        self.live += 1;
        if let Some(id) = self.free.pop() {
            self.slots[id.index()] = Some(slot);
            id
        } else {
            let id = NodeId::new(self.slots.len());
            self.slots.push(Some(slot));
            id
        }
    }

    /// Number of live nodes, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[must_use]
    pub fn root_node(&self) -> Option<NodeRef<'_>> {
        self.root.map(|id| NodeRef { tree: self, id })
    }

    /// Publishes a detached node as the document root.
    pub fn set_root(&mut self, id: NodeId) -> Result<(), TreeError> {
        if self.slot(id)?.parent.is_some() {
            return Err(TreeError::StillAttached(id));
        }
        self.root = Some(id);
        Ok(())
    }

    /// Unpublishes the root without releasing it.
    pub fn take_root(&mut self) -> Option<NodeId> {
        self.root.take()
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.slots
            .get(id.index())
            .and_then(Option::as_ref)
            .map(|_| NodeRef { tree: self, id })
    }

    pub fn model(&self, id: NodeId) -> Result<&Model, TreeError> {
        Ok(&self.slot(id)?.model)
    }

    /// Renames a container node. Properties always keep a name, so `None`
    /// is ignored for them.
    pub fn set_name(&mut self, id: NodeId, name: Option<String>) -> Result<(), TreeError> {
        match &mut self.slot_mut(id)?.model {
            Model::Document { name: slot }
            | Model::Object { name: slot }
            | Model::Collection { name: slot } => *slot = name,
            Model::Property { name: slot } => {
                if let Some(name) = name {
                    *slot = name;
                }
            }
            Model::Value(_) => return Err(TreeError::WrongPayload(Shape::Value)),
        }
        Ok(())
    }

    /// Replaces the scalar of a value leaf and returns the old one.
    pub fn set_scalar(&mut self, id: NodeId, scalar: Scalar) -> Result<Scalar, TreeError> {
        match &mut self.slot_mut(id)?.model {
            Model::Value(slot) => Ok(core::mem::replace(slot, scalar)),
            other => Err(TreeError::WrongPayload(other.shape())),
        }
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, TreeError> {
        Ok(self.slot(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], TreeError> {
        Ok(&self.slot(id)?.children)
    }

    /// Appends `child` to `parent`, detaching it from its previous owner.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let len = self.slot(parent)?.children.len();
        self.insert_child(parent, len, child)
    }

    /// Inserts `child` at `index` among `parent`'s children.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), TreeError> {
        self.check_adopt(parent, child)?;
        let mut index = index;
        let len = self.slot(parent)?.children.len();
        if index > len {
            return Err(TreeError::OutOfBounds { index, len });
        }
        if let Some(old_parent) = self.slot(child)?.parent {
            let pos = self.detach(child)?;
            if old_parent == parent && pos < index {
                index -= 1;
            }
        }
        self.adopt(parent, index, child);
        Ok(())
    }

    /// Inserts several children starting at `index`, preserving their order.
    ///
    /// Every child is checked before any of them moves, so a rejected batch
    /// leaves the tree untouched.
    pub fn insert_children<I>(
        &mut self,
        parent: NodeId,
        index: usize,
        children: I,
    ) -> Result<(), TreeError>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let children: Vec<NodeId> = children.into_iter().collect();
        let len = self.slot(parent)?.children.len();
        if index > len {
            return Err(TreeError::OutOfBounds { index, len });
        }
        let shape = self.slot(parent)?.model.shape();
        if matches!(shape, Shape::Document | Shape::Property) && children.len() > 1 {
            return Err(match shape {
                Shape::Document => TreeError::DocumentContentAlreadySet,
                _ => TreeError::PropertyValueAlreadySet,
            });
        }
        for &child in &children {
            self.check_adopt(parent, child)?;
        }
        let mut at = index;
        for child in children {
            self.insert_child(parent, at, child)?;
            at = self.slot(parent)?.children.len().min(at + 1);
        }
        Ok(())
    }

    /// Detaches and returns the child at `index`.
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> Result<NodeId, TreeError> {
        let slot = self.slot_mut(parent)?;
        let len = slot.children.len();
        if index >= len {
            return Err(TreeError::OutOfBounds { index, len });
        }
        let child = slot.children.remove(index);
        self.slot_mut(child)?.parent = None;
        trace!(%parent, %child, index, "detached child");
        Ok(child)
    }

    /// Detaches and returns the children in `range`, in order.
    pub fn remove_range<R>(&mut self, parent: NodeId, range: R) -> Result<Vec<NodeId>, TreeError>
    where
        R: RangeBounds<usize>,
    {
        let len = self.slot(parent)?.children.len();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s + 1,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e + 1,
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        };
        if start > end || end > len {
            return Err(TreeError::OutOfBounds {
                index: end.max(start),
                len,
            });
        }
        let removed: Vec<NodeId> = self.slot_mut(parent)?.children.drain(start..end).collect();
        for &child in &removed {
            self.slot_mut(child)?.parent = None;
        }
        Ok(removed)
    }

    /// Detaches `child` from its parent, if any, and returns its former
    /// position.
    pub fn detach(&mut self, child: NodeId) -> Result<usize, TreeError> {
        let Some(parent) = self.slot(child)?.parent else {
            return Ok(0);
        };
        let siblings = &mut self.slot_mut(parent)?.children;
        let pos = siblings
            .iter()
            .position(|&id| id == child)
            .ok_or(TreeError::UnknownNode(child))?;
        siblings.remove(pos);
        self.slot_mut(child)?.parent = None;
        Ok(pos)
    }

    /// The value held by a property.
    pub fn value_of(&self, property: NodeId) -> Result<Option<NodeId>, TreeError> {
        let slot = self.slot(property)?;
        match slot.model.shape() {
            Shape::Property => Ok(slot.children.first().copied()),
            other => Err(TreeError::NotAProperty(other)),
        }
    }

    /// Sets a property's value, replacing any existing one. The replaced
    /// value is handed back detached.
    pub fn set_value(
        &mut self,
        property: NodeId,
        value: NodeId,
    ) -> Result<Option<NodeId>, TreeError> {
        let previous = self.value_of(property)?;
        if previous == Some(value) {
            return Ok(None);
        }
        self.check_shape(property, value)?;
        self.check_cycle(property, value)?;
        if previous.is_some() {
            self.remove_child(property, 0)?;
            trace!(%property, "replaced property value");
        }
        self.add_child(property, value)?;
        Ok(previous)
    }

    /// Frees a detached subtree.
    pub fn release(&mut self, id: NodeId) -> Result<(), TreeError> {
        if self.slot(id)?.parent.is_some() {
            return Err(TreeError::StillAttached(id));
        }
        if self.root == Some(id) {
            self.root = None;
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(slot) = self.slots[next.index()].take() {
                stack.extend(slot.children);
                self.free.push(next);
                self.live -= 1;
            }
        }
        Ok(())
    }

    /// Deep structural equality between a subtree of `self` and a subtree of
    /// `other`.
    #[must_use]
    pub fn subtree_eq(&self, a: NodeId, other: &Tree, b: NodeId) -> bool {
        let mut stack = vec![(a, b)];
        while let Some((a, b)) = stack.pop() {
            let (Ok(left), Ok(right)) = (self.slot(a), other.slot(b)) else {
                return false;
            };
            if left.model != right.model || left.children.len() != right.children.len() {
                return false;
            }
            stack.extend(left.children.iter().copied().zip(right.children.iter().copied()));
        }
        true
    }

    fn check_adopt(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_shape(parent, child)?;
        let parent_slot = self.slot(parent)?;
        let already_ours = self.slot(child)?.parent == Some(parent);
        match parent_slot.model.shape() {
            Shape::Document if !parent_slot.children.is_empty() && !already_ours => {
                return Err(TreeError::DocumentContentAlreadySet);
            }
            Shape::Property if !parent_slot.children.is_empty() && !already_ours => {
                return Err(TreeError::PropertyValueAlreadySet);
            }
            _ => {}
        }
        self.check_cycle(parent, child)
    }

    fn check_shape(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let parent_shape = self.slot(parent)?.model.shape();
        let child_shape = self.slot(child)?.model.shape();
        let allowed = match parent_shape {
            Shape::Document => matches!(child_shape, Shape::Object | Shape::Collection),
            Shape::Object => child_shape == Shape::Property,
            Shape::Collection => child_shape != Shape::Document,
            Shape::Property => matches!(
                child_shape,
                Shape::Object | Shape::Collection | Shape::Value
            ),
            Shape::Value => false,
        };
        if allowed {
            Ok(())
        } else {
            Err(TreeError::InvalidChild {
                parent: parent_shape,
                child: child_shape,
            })
        }
    }

    fn check_cycle(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(TreeError::Cycle(child));
            }
            cursor = self.slot(id)?.parent;
        }
        Ok(())
    }

    fn adopt(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if self.root == Some(child) {
            self.root = None;
        }
        if let Some(Some(slot)) = self.slots.get_mut(child.index()) {
            slot.parent = Some(parent);
        }
        if let Some(Some(slot)) = self.slots.get_mut(parent.index()) {
            slot.children.insert(index, child);
        }
    }

    fn slot(&self, id: NodeId) -> Result<&Slot, TreeError> {
        self.slots
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(TreeError::UnknownNode(id))
    }

    fn slot_mut(&mut self, id: NodeId) -> Result<&mut Slot, TreeError> {
        self.slots
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(TreeError::UnknownNode(id))
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        match (self.root, other.root) {
            (Some(a), Some(b)) => self.subtree_eq(a, other, b),
            (None, None) => true,
            _ => false,
        }
    }
}

// ============================================================================
// NodeRef (navigation handle)
// ============================================================================

/// A borrowed handle for navigating a [`Tree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn tree(&self) -> &'t Tree {
        self.tree
    }

    fn slot(&self) -> &'t Slot {
        // A `NodeRef` is only handed out for live slots and borrows the tree
        // immutably, so the slot cannot be released underneath it.
        match self.tree.slots.get(self.id.index()) {
            Some(Some(slot)) => slot,
            _ => unreachable!("NodeRef outlived its node"),
        }
    }

    #[must_use]
    pub fn model(&self) -> &'t Model {
        &self.slot().model
    }

    #[must_use]
    pub fn shape(&self) -> Shape {
        self.model().shape()
    }

    #[must_use]
    pub fn name(&self) -> Option<&'t str> {
        self.model().name()
    }

    #[must_use]
    pub fn scalar(&self) -> Option<&'t Scalar> {
        self.model().scalar()
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'t>> {
        let tree = self.tree;
        self.slot().parent.map(|id| NodeRef { tree, id })
    }

    /// Child nodes in order. Each call starts a fresh iteration.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'t>> + 't {
        let tree = self.tree;
        self.slot().children.iter().map(move |&id| NodeRef { tree, id })
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.slot().children.len()
    }

    #[must_use]
    pub fn first_child(&self) -> Option<NodeRef<'t>> {
        self.children().next()
    }

    #[must_use]
    pub fn next_sibling(&self) -> Option<NodeRef<'t>> {
        let parent = self.parent()?;
        let siblings = &parent.slot().children;
        let pos = siblings.iter().position(|&id| id == self.id)?;
        siblings.get(pos + 1).map(|&id| NodeRef {
            tree: self.tree,
            id,
        })
    }

    #[must_use]
    pub fn prev_sibling(&self) -> Option<NodeRef<'t>> {
        let parent = self.parent()?;
        let siblings = &parent.slot().children;
        let pos = siblings.iter().position(|&id| id == self.id)?;
        pos.checked_sub(1).map(|p| NodeRef {
            tree: self.tree,
            id: siblings[p],
        })
    }

    /// Walks the back-references up to the root, nearest first.
    pub fn ancestors(&self) -> Ancestors<'t> {
        Ancestors {
            next: self.parent(),
        }
    }

    /// Every node below this one, depth-first in pre-order.
    pub fn descendants(&self) -> Descendants<'t> {
        let mut stack: Vec<NodeRef<'t>> = self.children().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// Children that are properties.
    pub fn properties(&self) -> impl Iterator<Item = NodeRef<'t>> + 't {
        self.children().filter(|c| c.shape() == Shape::Property)
    }

    /// Children that are value leaves.
    pub fn values(&self) -> impl Iterator<Item = NodeRef<'t>> + 't {
        self.children().filter(|c| c.shape() == Shape::Value)
    }

    /// The first property child with the given name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<NodeRef<'t>> {
        self.properties().find(|p| p.name() == Some(name))
    }

    /// The value held by a property node.
    #[must_use]
    pub fn value(&self) -> Option<NodeRef<'t>> {
        if self.shape() == Shape::Property {
            self.first_child()
        } else {
            None
        }
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("model", self.model())
            .finish()
    }
}

pub struct Ancestors<'t> {
    next: Option<NodeRef<'t>>,
}

impl<'t> Iterator for Ancestors<'t> {
    type Item = NodeRef<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

pub struct Descendants<'t> {
    stack: Vec<NodeRef<'t>>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = NodeRef<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let len = self.stack.len();
        self.stack.extend(node.children());
        self.stack[len..].reverse();
        Some(node)
    }
}
