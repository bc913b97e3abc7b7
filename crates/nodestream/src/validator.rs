//! Grammar checking for event streams.
//!
//! The [`Validator`] is a push-down automaton: one [`Context`] per open
//! container plus a synthetic root, each counting the children it has
//! accepted. A fixed rule table says which events may come next in a
//! context, how many children it must end up with, and whether closing it
//! requires a value.
//!
//! Readers and writers opt in with [`Reader::validating`] and
//! [`Writer::validating`]; without it no grammar checking happens at all.

use alloc::vec::Vec;
use core::fmt;

use crate::{
    error::Error,
    io::{Reader, Writer},
    node::{Container, Node, Phase, Shape},
    settings::Settings,
};

/// The grammar state an event is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// Before anything has opened, and after the top-level node closed.
    Root,
    /// Inside an open container.
    Open(Container),
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Root => f.write_str("Root"),
            Context::Open(container) => container.fmt(f),
        }
    }
}

/// An inclusive child-count range. `max: None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: usize,
    pub max: Option<usize>,
}

impl Bounds {
    const fn exactly(n: usize) -> Self {
        Bounds {
            min: n,
            max: Some(n),
        }
    }

    const fn between(min: usize, max: usize) -> Self {
        Bounds {
            min,
            max: Some(max),
        }
    }

    const fn at_least(min: usize) -> Self {
        Bounds { min, max: None }
    }

    #[must_use]
    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "exactly {max}"),
            Some(max) => write!(f, "between {} and {max}", self.min),
            None => write!(f, "at least {}", self.min),
        }
    }
}

struct Rule {
    allowed: &'static [(Shape, Option<Phase>)],
    bounds: Bounds,
    value_required: bool,
}

const START: Option<Phase> = Some(Phase::Start);
const END: Option<Phase> = Some(Phase::End);

static ROOT: Rule = Rule {
    allowed: &[
        (Shape::Document, START),
        (Shape::Object, START),
        (Shape::Collection, START),
    ],
    bounds: Bounds::exactly(1),
    value_required: false,
};

static DOCUMENT: Rule = Rule {
    allowed: &[
        (Shape::Document, END),
        (Shape::Object, START),
        (Shape::Collection, START),
    ],
    bounds: Bounds::between(0, 1),
    value_required: false,
};

static OBJECT: Rule = Rule {
    allowed: &[(Shape::Object, END), (Shape::Property, START)],
    bounds: Bounds::at_least(0),
    value_required: false,
};

static COLLECTION: Rule = Rule {
    allowed: &[
        (Shape::Collection, END),
        (Shape::Collection, START),
        (Shape::Object, START),
        (Shape::Value, None),
    ],
    bounds: Bounds::at_least(0),
    value_required: false,
};

static PROPERTY: Rule = Rule {
    allowed: &[
        (Shape::Property, END),
        (Shape::Object, START),
        (Shape::Collection, START),
        (Shape::Value, None),
    ],
    bounds: Bounds::exactly(1),
    value_required: true,
};

impl Rule {
    fn of(context: Context) -> &'static Rule {
        match context {
            Context::Root => &ROOT,
            Context::Open(Container::Document) => &DOCUMENT,
            Context::Open(Container::Object) => &OBJECT,
            Context::Open(Container::Collection) => &COLLECTION,
            Context::Open(Container::Property) => &PROPERTY,
        }
    }

    fn allows(&self, node: &Node) -> bool {
        let key = (node.shape(), node.phase());
        self.allowed.contains(&key)
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    context: Context,
    count: usize,
}

/// Checks a stream one event at a time.
///
/// # Examples
///
/// ```
/// use nodestream::{Error, Node, Validator};
///
/// let mut validator = Validator::new();
/// validator.accept(&Node::object_start())?;
/// assert!(matches!(
///     validator.accept(&Node::value(1)),
///     Err(Error::Structural { .. })
/// ));
/// # Ok::<(), Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    stack: Vec<Frame>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Validator {
            stack: alloc::vec![Frame {
                context: Context::Root,
                count: 0,
            }],
        }
    }

    /// The innermost open context.
    #[must_use]
    pub fn context(&self) -> Context {
        self.stack.last().map_or(Context::Root, |f| f.context)
    }

    /// Number of containers currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    /// Checks `node` against the innermost context and advances.
    pub fn accept(&mut self, node: &Node) -> Result<(), Error> {
        let context = self.context();
        let rule = Rule::of(context);
        if !rule.allows(node) {
            let err = if node.is_value()
                && matches!(
                    context,
                    Context::Root | Context::Open(Container::Document)
                ) {
                Error::Value {
                    node: node.clone(),
                    context,
                }
            } else {
                Error::Structural {
                    node: node.clone(),
                    context,
                }
            };
            debug!(%err, "rejected event");
            return Err(err);
        }

        match node {
            Node::End { .. } => {
                let count = self.stack.last().map_or(0, |f| f.count);
                if !rule.bounds.contains(count) || (rule.value_required && count == 0) {
                    let err = Error::Cardinality {
                        context,
                        count,
                        bounds: rule.bounds,
                        node: None,
                    };
                    debug!(%err, "context closed out of bounds");
                    return Err(err);
                }
                self.stack.pop();
                trace!(%context, depth = self.depth(), "closed context");
            }
            Node::Start { container, .. } => {
                self.count_child(node)?;
                self.stack.push(Frame {
                    context: Context::Open(*container),
                    count: 0,
                });
                trace!(%container, depth = self.depth(), "opened context");
            }
            Node::Value { .. } => self.count_child(node)?,
        }
        Ok(())
    }

    /// Checks that the stream ended with exactly one closed top-level node.
    pub fn finalize(&self) -> Result<(), Error> {
        if self.depth() > 0 {
            let err = Error::PrematureTermination {
                context: self.context(),
                open: self.depth(),
            };
            debug!(%err, "stream ended early");
            return Err(err);
        }
        let count = self.stack.first().map_or(0, |f| f.count);
        if !ROOT.bounds.contains(count) {
            let err = Error::PrematureTermination {
                context: Context::Root,
                open: 0,
            };
            debug!(%err, count, "stream ended without a document");
            return Err(err);
        }
        Ok(())
    }

    fn count_child(&mut self, node: &Node) -> Result<(), Error> {
        let Some(frame) = self.stack.last_mut() else {
            return Ok(());
        };
        frame.count += 1;
        let bounds = Rule::of(frame.context).bounds;
        if bounds.max.is_some_and(|max| frame.count > max) {
            let err = Error::Cardinality {
                context: frame.context,
                count: frame.count,
                bounds,
                node: Some(node.clone()),
            };
            debug!(%err, "too many children");
            return Err(err);
        }
        Ok(())
    }
}

/// A [`Reader`] that checks every event it yields.
///
/// The stream is finalized when the inner reader is exhausted.
pub struct ValidatingReader<R> {
    inner: R,
    validator: Validator,
    finalized: bool,
}

impl<R: Reader> ValidatingReader<R> {
    pub fn new(inner: R) -> Self {
        ValidatingReader {
            inner,
            validator: Validator::new(),
            finalized: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Reader> Reader for ValidatingReader<R> {
    fn current(&self) -> Option<&Node> {
        self.inner.current()
    }

    fn read(&mut self) -> Result<bool, Error> {
        if self.inner.read()? {
            if let Some(node) = self.inner.current() {
                self.validator.accept(node)?;
            }
            return Ok(true);
        }
        if !self.finalized {
            self.finalized = true;
            self.validator.finalize()?;
        }
        Ok(false)
    }

    /// Closing early gives up on the final grammar check.
    fn close(&mut self) {
        self.finalized = true;
        self.inner.close();
    }

    fn settings(&self) -> &Settings {
        self.inner.settings()
    }
}

/// A [`Writer`] that checks every event before forwarding it.
///
/// The stream is finalized on the first
/// [`write_complete`](Writer::write_complete).
pub struct ValidatingWriter<W> {
    inner: W,
    validator: Validator,
    finalized: bool,
}

impl<W: Writer> ValidatingWriter<W> {
    pub fn new(inner: W) -> Self {
        ValidatingWriter {
            inner,
            validator: Validator::new(),
            finalized: false,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Writer> Writer for ValidatingWriter<W> {
    fn write(&mut self, node: Node) -> Result<(), Error> {
        if self.finalized {
            return Err(Error::Closed);
        }
        self.validator.accept(&node)?;
        self.inner.write(node)
    }

    fn write_complete(&mut self) -> Result<(), Error> {
        if !self.finalized {
            self.finalized = true;
            self.validator.finalize()?;
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
