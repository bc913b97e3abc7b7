//! Document trees and the structural event streams they flatten into.
//!
//! A document is either a [`Tree`] of five node shapes (document, object,
//! collection, property and value) or a stream of [`Node`] events that
//! open and close those shapes. [`TreeReader`] turns a tree into a stream,
//! [`TreeWriter`] turns a stream back into a tree, and any [`Reader`] or
//! [`Writer`] can be made to check the stream grammar with `.validating()`
//! or rewritten on the fly with `.transformed(..)`.
//!
//! ```
//! use nodestream::{Node, Tree, TreeWriter, Writer, pump};
//!
//! let events = [
//!     Node::object_start(),
//!     Node::property_start("name"),
//!     Node::value("Ada"),
//!     Node::property_end(),
//!     Node::object_end(),
//! ];
//! let tree = Tree::from_events(events.clone())?;
//!
//! let mut writer = TreeWriter::new().validating();
//! pump(&mut tree.reader(), &mut writer)?;
//! assert_eq!(writer.into_inner().finish()?, tree);
//! # Ok::<(), nodestream::Error>(())
//! ```

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod tracing_macros;

mod error;
mod io;
mod node;
mod scalar;
mod settings;
mod text_case;
mod tree;
mod tree_reader;
mod tree_writer;
mod validator;

pub mod transform;

#[cfg(test)]
mod tests;

pub use error::{Error, TreeError};
pub use io::{EventCollector, EventReader, Events, Reader, Writer, pump};
pub use node::{Container, Node, Phase, Shape};
pub use scalar::Scalar;
pub use settings::Settings;
pub use text_case::{TextCase, UnknownTextCase};
pub use transform::{Transform, TransformReader, TransformWriter};
pub use tree::{Ancestors, Descendants, Model, NodeId, NodeRef, Tree};
pub use tree_reader::TreeReader;
pub use tree_writer::TreeWriter;
pub use validator::{Bounds, Context, ValidatingReader, ValidatingWriter, Validator};
