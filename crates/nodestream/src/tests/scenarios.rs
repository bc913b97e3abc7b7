use alloc::{vec, vec::Vec};

use rstest::rstest;

use crate::{
    Container, Context, Error, EventCollector, EventReader, Model, Node, Reader, Scalar, Settings,
    TextCase, Tree, TreeError, TreeWriter, Writer, pump,
    transform::{PropertyFilter, RenameNames, Transform},
};

fn ada_tree() -> Tree {
    let mut tree = Tree::new();
    let object = tree.create(Model::object());
    let name = tree.create(Model::property("name"));
    let ada = tree.create(Model::value("Ada"));
    tree.add_child(name, ada).unwrap();
    tree.add_child(object, name).unwrap();

    let tags = tree.create(Model::property("tags"));
    let list = tree.create(Model::collection());
    let math = tree.create(Model::value("math"));
    let physics = tree.create(Model::value("physics"));
    tree.insert_children(list, 0, [math, physics]).unwrap();
    tree.set_value(tags, list).unwrap();
    tree.add_child(object, tags).unwrap();
    tree.set_root(object).unwrap();
    tree
}

fn ada_events() -> Vec<Node> {
    vec![
        Node::object_start(),
        Node::property_start("name"),
        Node::value("Ada"),
        Node::property_end(),
        Node::property_start("tags"),
        Node::collection_start(),
        Node::value("math"),
        Node::value("physics"),
        Node::collection_end(),
        Node::property_end(),
        Node::object_end(),
    ]
}

#[test]
fn ada_flattens_to_the_expected_stream() {
    let tree = ada_tree();
    let events: Vec<Node> = tree.reader().collect();
    assert_eq!(events, ada_events());
}

#[test]
fn ada_stream_rebuilds_the_same_tree() {
    let mut writer = TreeWriter::new().validating();
    pump(&mut EventReader::new(ada_events()), &mut writer).unwrap();
    let rebuilt = writer.into_inner().finish().unwrap();
    assert_eq!(rebuilt, ada_tree());

    let tags = rebuilt
        .root_node()
        .and_then(|root| root.property("tags"))
        .and_then(|tags| tags.value())
        .unwrap();
    let names: Vec<&str> = tags
        .values()
        .filter_map(|v| v.scalar().and_then(Scalar::as_str))
        .collect();
    assert_eq!(names, ["math", "physics"]);
}

#[test]
fn value_inside_object_is_rejected_by_a_validating_writer() {
    let mut writer = TreeWriter::new().validating();
    writer.write(Node::object_start()).unwrap();
    let err = writer.write(Node::value(1)).unwrap_err();
    assert_eq!(
        err,
        Error::Structural {
            node: Node::value(1),
            context: Context::Open(Container::Object),
        }
    );
}

#[test]
fn value_inside_object_is_rejected_by_a_validating_reader() {
    let mut reader =
        EventReader::new([Node::object_start(), Node::value(1), Node::object_end()]).validating();
    assert_eq!(reader.read(), Ok(true));
    assert!(matches!(reader.read(), Err(Error::Structural { .. })));
}

#[test]
fn empty_property_yields_null_value() {
    let tree = Tree::from_events([Node::property_start("x"), Node::property_end()]).unwrap();
    let value = tree.root_node().and_then(|p| p.value()).unwrap();
    assert_eq!(value.scalar(), Some(&Scalar::Null));
}

#[rstest]
#[case::validating(true)]
#[case::trusting(false)]
fn two_property_values_fail(#[case] validating: bool) {
    let events = [
        Node::object_start(),
        Node::property_start("x"),
        Node::value(1),
        Node::value(2),
        Node::property_end(),
        Node::object_end(),
    ];
    let mut reader = EventReader::new(events);
    let result = if validating {
        pump(&mut reader, &mut TreeWriter::new().validating())
    } else {
        pump(&mut reader, &mut TreeWriter::new())
    };
    let err = result.unwrap_err();
    if validating {
        assert!(matches!(err, Error::Cardinality { count: 2, .. }));
    } else {
        assert_eq!(err, Error::TreeContract(TreeError::PropertyValueAlreadySet));
    }
}

#[test]
fn validating_reader_reports_truncated_streams_at_exhaustion() {
    let mut reader = EventReader::new([Node::collection_start(), Node::value(1)]).validating();
    assert_eq!(reader.read(), Ok(true));
    assert_eq!(reader.read(), Ok(true));
    assert_eq!(
        reader.read(),
        Err(Error::PrematureTermination {
            context: Context::Open(Container::Collection),
            open: 1,
        })
    );
    assert_eq!(reader.read(), Ok(false));
}

#[test]
fn validating_writer_checks_on_first_completion_only() {
    let mut writer = EventCollector::new().validating();
    writer.write(Node::object_start()).unwrap();
    assert!(matches!(
        writer.write_complete(),
        Err(Error::PrematureTermination { open: 1, .. })
    ));
    assert_eq!(writer.write_complete(), Ok(()));
    assert!(writer.get_ref().is_complete());
}

#[test]
fn transforms_share_the_stream_settings() {
    let settings = Settings::new();
    let scope = settings.create_scope();
    scope.set_text_case(TextCase::Pascal);

    let mut writer = TreeWriter::with_settings(scope)
        .validating()
        .transformed(RenameNames::from_settings().then(PropertyFilter::new(|n: &str| n != "Tags")));
    pump(&mut EventReader::new(ada_events()), &mut writer).unwrap();
    let tree = writer.into_inner().into_inner().finish().unwrap();

    let root = tree.root_node().unwrap();
    let names: Vec<_> = root.properties().filter_map(|p| p.name()).collect();
    assert_eq!(names, ["Name"]);
    assert_eq!(settings.text_case(), TextCase::Unchanged);
}

#[test]
fn trailing_output_reaches_the_tree_before_completion() {
    /// Wraps the whole stream in an outer collection.
    #[derive(Default)]
    struct Wrap {
        opened: bool,
    }

    impl Transform for Wrap {
        fn transform(&mut self, node: Node, out: &mut Vec<Node>) -> Result<(), Error> {
            if !self.opened {
                self.opened = true;
                out.push(Node::collection_start());
            }
            out.push(node);
            Ok(())
        }

        fn complete(&mut self, out: &mut Vec<Node>) -> Result<(), Error> {
            if self.opened {
                out.push(Node::collection_end());
            }
            Ok(())
        }
    }

    let mut writer = TreeWriter::new().transformed(Wrap::default());
    writer
        .write_all([Node::collection_start(), Node::value(1), Node::collection_end()])
        .unwrap();
    assert!(writer.get_ref().tree().root().is_none());
    writer.write_complete().unwrap();
    let tree = writer.into_inner().finish().unwrap();
    let root = tree.root_node().unwrap();
    assert_eq!(root.child_count(), 1);
    assert_eq!(root.first_child().unwrap().child_count(), 1);
}

#[test]
fn closing_early_skips_final_validation() {
    let tree = ada_tree();
    let mut reader = tree.reader().validating();
    assert_eq!(reader.read(), Ok(true));
    reader.close();
    assert_eq!(reader.read(), Ok(false));
}
