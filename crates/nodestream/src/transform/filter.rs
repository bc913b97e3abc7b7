use alloc::vec::Vec;

use super::{Skip, Transform};
use crate::{
    error::Error,
    node::{Container, Node},
};

/// Drops whole properties whose names fail a predicate.
///
/// The property's start, its value subtree and its end all disappear; the
/// surrounding object stays well formed.
///
/// # Examples
///
/// ```
/// use nodestream::{EventCollector, Node, Writer, transform::PropertyFilter};
///
/// let mut writer = EventCollector::new()
///     .transformed(PropertyFilter::new(|name: &str| !name.starts_with('_')));
/// writer.write_all([
///     Node::object_start(),
///     Node::property_start("_secret"),
///     Node::value(42),
///     Node::property_end(),
///     Node::object_end(),
/// ])?;
/// assert_eq!(writer.get_ref().events(), [Node::object_start(), Node::object_end()]);
/// # Ok::<(), nodestream::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct PropertyFilter<P> {
    keep: P,
    skip: Skip,
}

impl<P> PropertyFilter<P>
where
    P: FnMut(&str) -> bool,
{
    pub fn new(keep: P) -> Self {
        PropertyFilter {
            keep,
            skip: Skip::new(),
        }
    }
}

impl<P> Transform for PropertyFilter<P>
where
    P: FnMut(&str) -> bool,
{
    fn transform(&mut self, node: Node, out: &mut Vec<Node>) -> Result<(), Error> {
        if self.skip.skip(&node) {
            return Ok(());
        }
        if let Node::Start {
            container: Container::Property,
            name,
        } = &node
        {
            let name = name.as_deref().unwrap_or_default();
            if !(self.keep)(name) {
                debug!(name, "dropping property");
                self.skip.activate();
                self.skip.skip(&node);
                return Ok(());
            }
        }
        out.push(node);
        Ok(())
    }
}
