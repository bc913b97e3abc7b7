//! Structural events exchanged between producers, transforms and consumers.
//!
//! A document is flattened into a sequence of [`Node`]s. Containers
//! (documents, objects, collections and properties) open with a `Start` and
//! close with a matching `End`; values are atomic and never carry a phase.
//!
//! # Examples
//!
//! ```
//! use nodestream::{Node, Phase, Shape};
//!
//! let events = vec![
//!     Node::object_start(),
//!     Node::property_start("name"),
//!     Node::value("Ada"),
//!     Node::property_end(),
//!     Node::object_end(),
//! ];
//!
//! assert_eq!(events[1].to_string(), "PropertyStart 'name'");
//! assert!(events[4].is(Shape::Object, Some(Phase::End)));
//! assert_eq!(events.iter().filter(|n| n.phase() == Some(Phase::End)).count(), 2);
//! ```
use alloc::string::String;
use core::fmt;

use crate::scalar::Scalar;

/// The raw structural kind of an event or tree node.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shape {
    Document,
    Object,
    Collection,
    Property,
    Value,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shape::Document => "Document",
            Shape::Object => "Object",
            Shape::Collection => "Collection",
            Shape::Property => "Property",
            Shape::Value => "Value",
        })
    }
}

/// The shapes that open and close, i.e. every [`Shape`] except `Value`.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Container {
    Document,
    Object,
    Collection,
    Property,
}

impl From<Container> for Shape {
    fn from(c: Container) -> Self {
        match c {
            Container::Document => Shape::Document,
            Container::Object => Shape::Object,
            Container::Collection => Shape::Collection,
            Container::Property => Shape::Property,
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Shape::from(*self).fmt(f)
    }
}

/// Whether a container event opens or closes its shape.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Start,
    End,
}

/// One step of a flattened document.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[cfg_attr(any(test, feature = "serde"), serde(tag = "kind"))]
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Opens a container. The name is required for properties and optional
    /// for the other shapes.
    Start {
        container: Container,
        #[cfg_attr(
            any(test, feature = "serde"),
            serde(default, skip_serializing_if = "Option::is_none")
        )]
        name: Option<String>,
    },
    /// Closes the innermost open container of the same shape.
    End { container: Container },
    /// An atomic scalar.
    Value { value: Scalar },
}

impl Node {
    /// Opens a container of the given shape.
    #[must_use]
    pub fn start(container: Container, name: Option<String>) -> Self {
        Node::Start { container, name }
    }

    /// Closes a container of the given shape.
    #[must_use]
    pub fn end(container: Container) -> Self {
        Node::End { container }
    }

    #[must_use]
    pub fn document_start() -> Self {
        Self::start(Container::Document, None)
    }

    #[must_use]
    pub fn document_end() -> Self {
        Self::end(Container::Document)
    }

    #[must_use]
    pub fn object_start() -> Self {
        Self::start(Container::Object, None)
    }

    #[must_use]
    pub fn object_end() -> Self {
        Self::end(Container::Object)
    }

    #[must_use]
    pub fn collection_start() -> Self {
        Self::start(Container::Collection, None)
    }

    #[must_use]
    pub fn collection_end() -> Self {
        Self::end(Container::Collection)
    }

    #[must_use]
    pub fn property_start(name: impl Into<String>) -> Self {
        Node::Start {
            container: Container::Property,
            name: Some(name.into()),
        }
    }

    #[must_use]
    pub fn property_end() -> Self {
        Self::end(Container::Property)
    }

    #[must_use]
    pub fn value(value: impl Into<Scalar>) -> Self {
        Node::Value {
            value: value.into(),
        }
    }

    /// The raw category of this event, independent of its phase.
    #[must_use]
    pub fn shape(&self) -> Shape {
        match self {
            Node::Start { container, .. } | Node::End { container } => (*container).into(),
            Node::Value { .. } => Shape::Value,
        }
    }

    /// The phase of a container event; `None` for values.
    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Node::Start { .. } => Some(Phase::Start),
            Node::End { .. } => Some(Phase::End),
            Node::Value { .. } => None,
        }
    }

    /// Tests both axes at once, e.g. "is this an `ObjectEnd`".
    #[must_use]
    pub fn is(&self, shape: Shape, phase: Option<Phase>) -> bool {
        self.shape() == shape && self.phase() == phase
    }

    #[must_use]
    pub fn is_start(&self) -> bool {
        matches!(self, Node::Start { .. })
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Node::End { .. })
    }

    #[must_use]
    pub fn is_value(&self) -> bool {
        matches!(self, Node::Value { .. })
    }

    /// The name carried by a `Start` event.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        if let Node::Start { name, .. } = self {
            name.as_deref()
        } else {
            None
        }
    }

    /// The scalar carried by a `Value` event.
    #[must_use]
    pub fn scalar(&self) -> Option<&Scalar> {
        if let Node::Value { value } = self {
            Some(value)
        } else {
            None
        }
    }
}

/// Renders `category 'payload'`, e.g. `PropertyStart 'name'` or `ObjectEnd`.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Start { container, name } => {
                write!(f, "{container}Start")?;
                if let Some(name) = name {
                    write!(f, " '{name}'")?;
                }
                Ok(())
            }
            Node::End { container } => write!(f, "{container}End"),
            Node::Value { value } => write!(f, "Value '{value}'"),
        }
    }
}
