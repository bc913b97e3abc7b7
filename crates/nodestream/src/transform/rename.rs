use alloc::vec::Vec;

use super::Transform;
use crate::{error::Error, node::Node, settings::Settings, text_case::TextCase};

/// Rewrites the names carried by `Start` events into a naming convention.
///
/// Built with [`RenameNames::from_settings`], the convention is taken from
/// the `textCase` setting of the stream it is stacked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameNames {
    case: TextCase,
    from_settings: bool,
}

impl RenameNames {
    #[must_use]
    pub fn new(case: TextCase) -> Self {
        RenameNames {
            case,
            from_settings: false,
        }
    }

    #[must_use]
    pub fn from_settings() -> Self {
        RenameNames {
            case: TextCase::Unchanged,
            from_settings: true,
        }
    }

    #[must_use]
    pub fn case(&self) -> TextCase {
        self.case
    }
}

impl Transform for RenameNames {
    fn transform(&mut self, node: Node, out: &mut Vec<Node>) -> Result<(), Error> {
        out.push(match node {
            Node::Start {
                container,
                name: Some(name),
            } if self.case != TextCase::Unchanged => Node::Start {
                container,
                name: Some(self.case.apply(&name)),
            },
            other => other,
        });
        Ok(())
    }

    fn attach(&mut self, settings: &Settings) {
        if self.from_settings {
            self.case = settings.text_case();
            trace!(case = %self.case, "resolved text case");
        }
    }
}
