//! Event-to-events rewriting stages.
//!
//! A [`Transform`] turns each inbound event into zero or more outbound ones
//! and may emit trailing events once upstream is exhausted. Transforms are
//! stacked onto a [`Reader`] with [`TransformReader`] (pull) or onto a
//! [`Writer`] with [`TransformWriter`] (push). Either way events leave in
//! the order the transform produced them; nothing is reordered across
//! inputs.
//!
//! # Examples
//!
//! ```
//! use nodestream::{EventReader, Node, Reader, Scalar, transform};
//!
//! let drop_nulls = transform::from_fn(|node: Node, out: &mut Vec<Node>| {
//!     if node.scalar().is_none_or(|s| !s.is_null()) {
//!         out.push(node);
//!     }
//!     Ok(())
//! });
//! let events = EventReader::new([
//!     Node::collection_start(),
//!     Node::value(Scalar::Null),
//!     Node::value(1),
//!     Node::collection_end(),
//! ]);
//! let kept: Vec<Node> = events
//!     .transformed(drop_nulls)
//!     .into_events()
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(kept.len(), 3);
//! # Ok::<(), nodestream::Error>(())
//! ```

use alloc::{collections::VecDeque, vec::Vec};

use crate::{
    error::Error,
    io::{Reader, Writer},
    node::Node,
    settings::Settings,
};

mod filter;
mod rename;
mod skip;

pub use filter::PropertyFilter;
pub use rename::RenameNames;
pub use skip::Skip;

/// A stream rewriting stage.
pub trait Transform {
    /// Appends the events that replace `node` to `out`.
    fn transform(&mut self, node: Node, out: &mut Vec<Node>) -> Result<(), Error>;

    /// Called once after the last inbound event. May append trailing events.
    fn complete(&mut self, out: &mut Vec<Node>) -> Result<(), Error> {
        let _ = out;
        Ok(())
    }

    /// Receives the settings of the stream this transform is stacked on.
    fn attach(&mut self, settings: &Settings) {
        let _ = settings;
    }

    /// Feeds every output of `self` through `next`.
    fn then<U>(self, next: U) -> Chain<Self, U>
    where
        Self: Sized,
        U: Transform,
    {
        Chain {
            first: self,
            second: next,
            buffer: Vec::new(),
        }
    }
}

impl<T: Transform + ?Sized> Transform for &mut T {
    fn transform(&mut self, node: Node, out: &mut Vec<Node>) -> Result<(), Error> {
        (**self).transform(node, out)
    }

    fn complete(&mut self, out: &mut Vec<Node>) -> Result<(), Error> {
        (**self).complete(out)
    }

    fn attach(&mut self, settings: &Settings) {
        (**self).attach(settings);
    }
}

/// Two transforms run back to back. See [`Transform::then`].
#[derive(Debug, Clone)]
pub struct Chain<A, B> {
    first: A,
    second: B,
    buffer: Vec<Node>,
}

impl<A: Transform, B: Transform> Transform for Chain<A, B> {
    fn transform(&mut self, node: Node, out: &mut Vec<Node>) -> Result<(), Error> {
        self.first.transform(node, &mut self.buffer)?;
        for node in self.buffer.drain(..) {
            self.second.transform(node, out)?;
        }
        Ok(())
    }

    fn complete(&mut self, out: &mut Vec<Node>) -> Result<(), Error> {
        self.first.complete(&mut self.buffer)?;
        for node in self.buffer.drain(..) {
            self.second.transform(node, out)?;
        }
        self.second.complete(out)
    }

    fn attach(&mut self, settings: &Settings) {
        self.first.attach(settings);
        self.second.attach(settings);
    }
}

/// A transform backed by a closure. See [`from_fn`].
#[derive(Debug, Clone)]
pub struct FromFn<F>(F);

/// Wraps `f` as a [`Transform`] with no trailing output.
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: FnMut(Node, &mut Vec<Node>) -> Result<(), Error>,
{
    FromFn(f)
}

impl<F> Transform for FromFn<F>
where
    F: FnMut(Node, &mut Vec<Node>) -> Result<(), Error>,
{
    fn transform(&mut self, node: Node, out: &mut Vec<Node>) -> Result<(), Error> {
        (self.0)(node, out)
    }
}

/// Pull-side decorator: each upstream event is fed through the transform
/// and its outputs are handed out one by one before the next pull.
pub struct TransformReader<R, T> {
    inner: R,
    transform: T,
    pending: VecDeque<Node>,
    scratch: Vec<Node>,
    current: Option<Node>,
    exhausted: bool,
}

impl<R: Reader, T: Transform> TransformReader<R, T> {
    pub fn new(inner: R, mut transform: T) -> Self {
        transform.attach(inner.settings());
        TransformReader {
            inner,
            transform,
            pending: VecDeque::new(),
            scratch: Vec::new(),
            current: None,
            exhausted: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Reader, T: Transform> Reader for TransformReader<R, T> {
    fn current(&self) -> Option<&Node> {
        self.current.as_ref()
    }

    fn read(&mut self) -> Result<bool, Error> {
        loop {
            if let Some(node) = self.pending.pop_front() {
                self.current = Some(node);
                return Ok(true);
            }
            if self.exhausted {
                self.current = None;
                return Ok(false);
            }
            if self.inner.read()? {
                if let Some(node) = self.inner.current().cloned() {
                    self.transform.transform(node, &mut self.scratch)?;
                }
            } else {
                self.exhausted = true;
                self.transform.complete(&mut self.scratch)?;
                trace!(trailing = self.scratch.len(), "transform completed");
            }
            self.pending.extend(self.scratch.drain(..));
        }
    }

    fn close(&mut self) {
        self.exhausted = true;
        self.pending.clear();
        self.current = None;
        self.inner.close();
    }

    fn settings(&self) -> &Settings {
        self.inner.settings()
    }
}

/// Push-side decorator: each inbound event is fanned through the transform
/// and every output is forwarded immediately.
pub struct TransformWriter<W, T> {
    inner: W,
    transform: T,
    scratch: Vec<Node>,
    completed: bool,
}

impl<W: Writer, T: Transform> TransformWriter<W, T> {
    pub fn new(inner: W, mut transform: T) -> Self {
        transform.attach(inner.settings());
        TransformWriter {
            inner,
            transform,
            scratch: Vec::new(),
            completed: false,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn forward(&mut self) -> Result<(), Error> {
        for node in self.scratch.drain(..) {
            self.inner.write(node)?;
        }
        Ok(())
    }
}

impl<W: Writer, T: Transform> Writer for TransformWriter<W, T> {
    fn write(&mut self, node: Node) -> Result<(), Error> {
        if self.completed {
            return Err(Error::Closed);
        }
        self.transform.transform(node, &mut self.scratch)?;
        self.forward()
    }

    fn write_complete(&mut self) -> Result<(), Error> {
        if !self.completed {
            self.completed = true;
            self.transform.complete(&mut self.scratch)?;
            trace!(trailing = self.scratch.len(), "transform completed");
            self.forward()?;
        }
        self.inner.write_complete()
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.inner.flush()
    }

    fn settings(&self) -> &Settings {
        self.inner.settings()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{
        string::{String, ToString},
        vec,
    };

    use super::*;
    use crate::io::{EventCollector, EventReader};

    /// Duplicates values and appends a summary value on completion.
    #[derive(Default)]
    struct Echo {
        seen: i64,
        completions: usize,
    }

    impl Transform for Echo {
        fn transform(&mut self, node: Node, out: &mut Vec<Node>) -> Result<(), Error> {
            if node.is_value() {
                self.seen += 1;
                out.push(node.clone());
            }
            out.push(node);
            Ok(())
        }

        fn complete(&mut self, out: &mut Vec<Node>) -> Result<(), Error> {
            self.completions += 1;
            out.push(Node::value(self.seen));
            Ok(())
        }
    }

    fn input() -> Vec<Node> {
        vec![
            Node::collection_start(),
            Node::value("a"),
            Node::value("b"),
            Node::collection_end(),
        ]
    }

    fn expected() -> Vec<Node> {
        vec![
            Node::collection_start(),
            Node::value("a"),
            Node::value("a"),
            Node::value("b"),
            Node::value("b"),
            Node::collection_end(),
            Node::value(2),
        ]
    }

    #[test]
    fn reader_exposes_outputs_in_order_then_trailing() {
        let mut echo = Echo::default();
        let mut reader = EventReader::new(input()).transformed(&mut echo);
        let mut seen = Vec::new();
        while reader.read().unwrap() {
            seen.push(reader.current().unwrap().clone());
        }
        assert!(!reader.read().unwrap());
        drop(reader);
        assert_eq!(seen, expected());
        assert_eq!(echo.completions, 1);
    }

    #[test]
    fn writer_forwards_outputs_then_completion() {
        let mut echo = Echo::default();
        let mut writer = EventCollector::new().transformed(&mut echo);
        writer.write_all(input()).unwrap();
        assert!(!writer.get_ref().is_complete());
        writer.write_complete().unwrap();
        writer.write_complete().unwrap();
        assert!(writer.get_ref().is_complete());
        let events = writer.into_inner().into_events();
        assert_eq!(events, expected());
        assert_eq!(echo.completions, 1);
    }

    #[test]
    fn chain_runs_in_order() {
        let upper = from_fn(|node: Node, out: &mut Vec<Node>| {
            out.push(match node {
                Node::Value { value } => Node::value(value.to_string().to_uppercase()),
                other => other,
            });
            Ok(())
        });
        let tagged = from_fn(|node: Node, out: &mut Vec<Node>| {
            if let Some(s) = node.scalar().and_then(|s| s.as_str()) {
                out.push(Node::value(String::from(s) + "!"));
            } else {
                out.push(node);
            }
            Ok(())
        });
        let mut collector = EventCollector::new().transformed(upper.then(tagged));
        collector.write_all(input()).unwrap();
        collector.close().unwrap();
        let events = collector.into_inner().into_events();
        assert_eq!(events[1], Node::value("A!"));
        assert_eq!(events[2], Node::value("B!"));
    }

    #[test]
    fn errors_stop_the_stream() {
        let failing = from_fn(|node: Node, out: &mut Vec<Node>| {
            if node.is_value() {
                return Err(Error::Closed);
            }
            out.push(node);
            Ok(())
        });
        let mut reader = EventReader::new(input()).transformed(failing);
        assert_eq!(reader.read(), Ok(true));
        assert_eq!(reader.read(), Err(Error::Closed));
    }
}
