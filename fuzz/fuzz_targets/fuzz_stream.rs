#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nodestream::{
    Container, Error, EventReader, Node, Reader, Scalar, Settings, Tree, TreeWriter, Writer, pump,
};

#[derive(Debug, Arbitrary)]
enum Shape {
    Document,
    Object,
    Collection,
    Property,
}

impl From<Shape> for Container {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Document => Container::Document,
            Shape::Object => Container::Object,
            Shape::Collection => Container::Collection,
            Shape::Property => Container::Property,
        }
    }
}

#[derive(Debug, Arbitrary)]
enum Event {
    Start(Shape, Option<String>),
    End(Shape),
    Null,
    Boolean(bool),
    Integer(i64),
    Text(String),
    Bytes(Vec<u8>),
}

impl From<Event> for Node {
    fn from(event: Event) -> Self {
        match event {
            Event::Start(shape, name) => Node::start(shape.into(), name),
            Event::End(shape) => Node::end(shape.into()),
            Event::Null => Node::value(Scalar::Null),
            Event::Boolean(b) => Node::value(b),
            Event::Integer(i) => Node::value(i),
            Event::Text(s) => Node::value(s),
            Event::Bytes(b) => Node::value(b),
        }
    }
}

#[derive(Debug, Arbitrary)]
struct Input {
    fragment: bool,
    events: Vec<Event>,
}

fn build(events: &[Node], settings: &Settings, validating: bool) -> Result<Tree, Error> {
    let mut reader = EventReader::with_settings(events.to_vec(), settings.clone());
    if validating {
        let mut writer = TreeWriter::with_settings(settings.clone()).validating();
        pump(&mut reader, &mut writer)?;
        writer.into_inner().finish()
    } else {
        let mut writer = TreeWriter::with_settings(settings.clone());
        pump(&mut reader, &mut writer)?;
        writer.finish()
    }
}

fn check(input: Input) {
    let settings = Settings::new();
    settings.set_fragment(input.fragment);
    let events: Vec<Node> = input.events.into_iter().map(Node::from).collect();

    // Trusting mode may fail, but must never panic.
    let _ = build(&events, &settings, false);

    let Ok(tree) = build(&events, &settings, true) else {
        return;
    };

    // Whatever the validator let through flattens back into a valid stream
    // that rebuilds the same tree.
    let replay: Vec<Node> = tree
        .reader()
        .validating()
        .into_events()
        .collect::<Result<_, _>>()
        .expect("flattened tree failed validation");
    let rebuilt = Tree::from_events(replay).expect("flattened tree failed to rebuild");
    assert_eq!(rebuilt, tree);
}

fuzz_target!(|input: Input| check(input));
