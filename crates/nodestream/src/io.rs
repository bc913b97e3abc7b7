//! The pull (`Reader`) and push (`Writer`) contracts every producer and
//! consumer of events implements, plus in-memory implementations.
//!
//! Format codecs plug in here: a parser is a `Reader` yielding events, a
//! serializer is a `Writer` accepting them. Both expose the [`Settings`]
//! they run under so decorators stacked on top share the same ambient
//! configuration.

use alloc::{collections::VecDeque, vec::Vec};

use crate::{
    error::Error,
    node::Node,
    settings::Settings,
    transform::{Transform, TransformReader, TransformWriter},
    validator::{ValidatingReader, ValidatingWriter},
};

/// A pull-based producer of events.
pub trait Reader {
    /// The event produced by the last successful [`read`](Reader::read).
    fn current(&self) -> Option<&Node>;

    /// Advances one event. Returns `Ok(false)` once the stream is
    /// exhausted.
    fn read(&mut self) -> Result<bool, Error>;

    /// Stops producing and releases held resources. Closing early is always
    /// legal.
    fn close(&mut self) {}

    /// The settings this reader runs under.
    fn settings(&self) -> &Settings;

    /// Checks every event against the document grammar as it is read.
    fn validating(self) -> ValidatingReader<Self>
    where
        Self: Sized,
    {
        ValidatingReader::new(self)
    }

    /// Passes every event through `transform` before exposing it.
    fn transformed<T: Transform>(self, transform: T) -> TransformReader<Self, T>
    where
        Self: Sized,
    {
        TransformReader::new(self, transform)
    }

    /// Adapts the reader into an iterator of owned events.
    fn into_events(self) -> Events<Self>
    where
        Self: Sized,
    {
        Events {
            reader: self,
            done: false,
        }
    }
}

/// A push-based consumer of events.
pub trait Writer {
    fn write(&mut self, node: Node) -> Result<(), Error>;

    /// Signals that no more events follow. A second call does nothing.
    fn write_complete(&mut self) -> Result<(), Error>;

    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Completes, flushes and releases the writer.
    fn close(&mut self) -> Result<(), Error> {
        self.write_complete()?;
        self.flush()
    }

    /// The settings this writer runs under.
    fn settings(&self) -> &Settings;

    fn write_all<I>(&mut self, nodes: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Node>,
        Self: Sized,
    {
        for node in nodes {
            self.write(node)?;
        }
        Ok(())
    }

    /// Checks every event against the document grammar before forwarding
    /// it.
    fn validating(self) -> ValidatingWriter<Self>
    where
        Self: Sized,
    {
        ValidatingWriter::new(self)
    }

    /// Fans every event through `transform` before forwarding it.
    fn transformed<T: Transform>(self, transform: T) -> TransformWriter<Self, T>
    where
        Self: Sized,
    {
        TransformWriter::new(self, transform)
    }
}

/// Drains `reader` into `writer` and signals completion. Returns the number
/// of events moved.
pub fn pump<R, W>(reader: &mut R, writer: &mut W) -> Result<usize, Error>
where
    R: Reader + ?Sized,
    W: Writer + ?Sized,
{
    let mut moved = 0;
    while reader.read()? {
        if let Some(node) = reader.current() {
            writer.write(node.clone())?;
            moved += 1;
        }
    }
    writer.write_complete()?;
    trace!(moved, "pumped stream");
    Ok(moved)
}

/// Iterator over a [`Reader`]'s events. Stops after the first error.
pub struct Events<R> {
    reader: R,
    done: bool,
}

impl<R> Events<R> {
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Reader> Iterator for Events<R> {
    type Item = Result<Node, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read() {
            Ok(true) => self.reader.current().cloned().map(Ok),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// A [`Reader`] replaying a list of events.
#[derive(Debug, Clone)]
pub struct EventReader {
    pending: VecDeque<Node>,
    current: Option<Node>,
    settings: Settings,
}

impl EventReader {
    pub fn new<I>(events: I) -> Self
    where
        I: IntoIterator<Item = Node>,
    {
        Self::with_settings(events, Settings::new())
    }

    pub fn with_settings<I>(events: I, settings: Settings) -> Self
    where
        I: IntoIterator<Item = Node>,
    {
        Self {
            pending: events.into_iter().collect(),
            current: None,
            settings,
        }
    }
}

impl Reader for EventReader {
    fn current(&self) -> Option<&Node> {
        self.current.as_ref()
    }

    fn read(&mut self) -> Result<bool, Error> {
        self.current = self.pending.pop_front();
        Ok(self.current.is_some())
    }

    fn close(&mut self) {
        self.pending.clear();
        self.current = None;
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// A [`Writer`] that records every event it receives.
#[derive(Debug, Clone, Default)]
pub struct EventCollector {
    events: Vec<Node>,
    complete: bool,
    settings: Settings,
}

impl EventCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn events(&self) -> &[Node] {
        &self.events
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    #[must_use]
    pub fn into_events(self) -> Vec<Node> {
        self.events
    }
}

impl Writer for EventCollector {
    fn write(&mut self, node: Node) -> Result<(), Error> {
        if self.complete {
            return Err(Error::Closed);
        }
        self.events.push(node);
        Ok(())
    }

    fn write_complete(&mut self) -> Result<(), Error> {
        self.complete = true;
        Ok(())
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }
}
