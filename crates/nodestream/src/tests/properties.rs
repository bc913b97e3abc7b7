use alloc::vec::Vec;

use quickcheck::QuickCheck;

use super::arbitrary::{LegalTree, LooseTree};
use crate::{
    Model, Node, Reader, Settings, Shape, Tree, TreeReader, TreeWriter, Writer, pump,
    transform::Skip,
};

fn tests() -> u64 {
    #[cfg(not(miri))]
    let tests = if cfg!(feature = "test-fast") {
        100
    } else if is_ci::cached() {
        10_000
    } else {
        1_000
    };
    #[cfg(miri)]
    let tests = 10;
    tests
}

/// Property: flattening a tree and rebuilding it without grammar checks
/// gives a deep-equal tree, including collections that hold properties.
#[test]
fn roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(tree: LooseTree) -> bool {
        let tree = tree.0;
        let rebuilt = Tree::from_events(tree.reader()).unwrap();
        rebuilt == tree
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(LooseTree) -> bool);
}

/// Property: the stream of any legal tree passes the grammar check on both
/// the pull and the push side.
#[test]
fn validator_accepts_flattened_trees_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(tree: LegalTree) -> bool {
        let tree = tree.0;
        let pulled: Result<Vec<Node>, _> = tree.reader().validating().into_events().collect();

        let mut writer = TreeWriter::new().validating();
        let pushed = pump(&mut tree.reader(), &mut writer)
            .and_then(|_| writer.into_inner().finish());

        pulled.is_ok() && pushed.is_ok_and(|rebuilt| rebuilt == tree)
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(LegalTree) -> bool);
}

/// Property: skipping right before one item of a collection drops exactly
/// that item's events and leaves its siblings alone.
#[test]
fn skip_drops_one_item_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(tree: LegalTree, pick: usize) -> bool {
        let tree = tree.0;
        let Some(root) = tree.root_node() else {
            return true;
        };
        if root.shape() != Shape::Collection || root.child_count() == 0 {
            return true;
        }
        let pick = pick % root.child_count();
        let items: Vec<Vec<Node>> = root
            .children()
            .map(|child| TreeReader::subtree(child, Settings::new()).collect())
            .collect();

        let events: Vec<Node> = tree.reader().collect();
        let first = 1 + items[..pick].iter().map(Vec::len).sum::<usize>();

        let mut skip = Skip::new();
        let mut kept = Vec::new();
        for (i, node) in events.iter().enumerate() {
            if i == first {
                skip.activate();
            }
            if !skip.skip(node) {
                kept.push(node.clone());
            }
        }

        let mut expected = events[..first].to_vec();
        expected.extend_from_slice(&events[first + items[pick].len()..]);
        kept == expected && !skip.is_active()
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(LegalTree, usize) -> bool);
}

/// Property: a fragment reader over a document-wrapped tree yields the same
/// stream as a plain reader over the unwrapped content.
#[test]
fn fragment_reader_unwraps_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(tree: LegalTree) -> bool {
        let mut tree = tree.0;
        let Some(root) = tree.root() else {
            return true;
        };
        let mut plain: Vec<Node> = tree.reader().collect();
        if tree.model(root).map(Model::shape) == Ok(Shape::Document) {
            // A fragment reader drops the wrapper pair.
            plain = plain[1..plain.len() - 1].to_vec();
        } else {
            tree.take_root();
            let document = tree.create(Model::document());
            tree.add_child(document, root).unwrap();
            tree.set_root(document).unwrap();
        }

        let settings = Settings::new();
        settings.set_fragment(true);
        let unwrapped: Vec<Node> = TreeReader::with_settings(&tree, settings).collect();
        unwrapped == plain
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(LegalTree) -> bool);
}
