#![allow(missing_docs)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use loupe::{Inspect, InspectError, Inspector, MAX_NESTING, format};

#[derive(Inspect)]
struct Point {
    y: i32,
    x: i32,
}

#[derive(Inspect)]
struct Line {
    start: Point,
    end: Point,
}

#[derive(Inspect)]
struct Polygon {
    name: String,
    lines: Vec<Line>,
}

fn square() -> Polygon {
    let corner = |x, y| Point { x, y };
    Polygon {
        name: "square".into(),
        lines: vec![
            Line { start: corner(0, 0), end: corner(1, 0) },
            Line { start: corner(1, 0), end: corner(1, 1) },
        ],
    }
}

#[test]
fn members_sorted_by_name() {
    assert_eq!(format(&Point { x: 1, y: 2 }), "Point { x: 1, y: 2 }");
}

#[test]
fn depth_limits_nesting() {
    let inspector = Inspector::default();
    assert_eq!(inspector.format_with_depth(&square(), 0), "Polygon");
    assert_eq!(
        inspector.format_with_depth(&square(), 1),
        "Polygon { lines: Vec<Line>, name: square }"
    );
    assert_eq!(
        inspector.format_with_depth(&square(), 2),
        "Polygon { lines: [Line, Line], name: square }"
    );
    assert_eq!(
        inspector.format(&square()),
        "Polygon { lines: [Line { end: Point, start: Point }, Line { end: Point, start: Point }], name: square }"
    );
}

#[test]
fn unbounded_depth_renders_everything() {
    assert_eq!(
        Inspector::default().format_with_depth(&square(), -1),
        "Polygon { lines: [Line { end: Point { x: 1, y: 0 }, start: Point { x: 0, y: 0 } }, \
         Line { end: Point { x: 1, y: 1 }, start: Point { x: 1, y: 0 } }], name: square }"
    );
}

#[derive(Inspect)]
struct Link {
    value: u8,
    next: Option<Box<Link>>,
}

impl Drop for Link {
    // Unlinks iteratively so dropping a long chain stays off the stack.
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut link) = next {
            next = link.next.take();
        }
    }
}

fn chain(len: u32) -> Link {
    let mut head = Link {
        value: 0,
        next: None,
    };
    for i in 1..len {
        head = Link {
            value: (i % 200) as u8,
            next: Some(Box::new(head)),
        };
    }
    head
}

#[test]
fn unbounded_depth_stops_at_the_nesting_ceiling() {
    let deep = chain(10_000);
    let text = Inspector::default().format_with_depth(&deep, -1);
    assert_eq!(text.matches("Link {").count(), MAX_NESTING);
    assert!(text.contains("next: Link, value:"));
}

#[test]
fn entries_sorted_then_capped() {
    let map: HashMap<String, u32> = (0..10).map(|i| (format!("k{i}"), i)).collect();
    let inspector = Inspector::builder().max_elements(3).build();
    assert_eq!(inspector.format(&map), "{k0: 0, k1: 1, k2: 2, …7 more}");
}

#[test]
fn elements_capped_with_count() {
    let items: Vec<u16> = (0..5).collect();
    let inspector = Inspector::builder().max_elements(2).build();
    assert_eq!(inspector.format(&items), "[0, 1, …3 more]");
    assert_eq!(format(&items), "[0, 1, 2, 3, 4]");
}

#[test]
fn tuples_and_named_tuples() {
    #[derive(Inspect)]
    struct Pair(u8, &'static str);

    assert_eq!(format(&(1, 2)), "(1, 2)");
    assert_eq!(format(&Pair(1, "a")), "Pair(1, a)");
}

fn unreadable(_: &u8) -> loupe::Result<u8> {
    Err(InspectError::invalid_operation("sensor offline"))
}

fn unplugged(_: &u8) -> loupe::Result<u8> {
    Err(InspectError::unsupported_platform("no bus on this target"))
}

fn exploding(_: &u8) -> loupe::Result<u8> {
    Err(InspectError::failed("boom"))
}

#[derive(Inspect)]
struct Device {
    #[inspect(with = "unreadable")]
    a: u8,
    #[inspect(with = "unplugged")]
    b: u8,
    #[inspect(with = "exploding")]
    c: u8,
    d: u8,
}

#[test]
fn member_failures_render_markers() {
    let device = Device { a: 0, b: 0, c: 0, d: 4 };
    assert_eq!(
        format(&device),
        "Device { a: <invalid operation>, b: <unsupported platform>, c: <error: boom>, d: 4 }"
    );
}

#[test]
fn cycles_terminate_at_unbounded_depth() {
    let list: Rc<RefCell<Vec<Box<dyn Inspect>>>> = Rc::new(RefCell::new(vec![Box::new(1)]));
    list.borrow_mut().push(Box::new(Rc::clone(&list)));

    let text = Inspector::default().format_with_depth(&list, -1);
    assert_eq!(text, "[1, …]");

    list.borrow_mut().clear();
}

#[test]
fn siblings_sharing_a_value_both_render() {
    let shared = Rc::new(vec![7u8]);
    let pair = vec![Rc::clone(&shared), Rc::clone(&shared)];
    assert_eq!(format(&pair), "[[7], [7]]");
}

#[derive(Inspect)]
#[inspect(display)]
struct Version {
    major: u8,
    minor: u8,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}

#[test]
fn custom_text_short_circuits_members() {
    let v = Version { major: 1, minor: 4 };
    assert_eq!(format(&v), "v1.4");
    assert_eq!(loupe::stringify(&vec![v]), "[v1.4]");
}

#[test]
fn scalars_format_directly() {
    assert_eq!(format(&std::time::Duration::from_secs(90)), "1m30s");
    assert_eq!(format(&std::time::Duration::from_millis(1_500)), "1.5s");
    assert_eq!(format(&true), "true");
    assert_eq!(format(&None::<u8>), "null");
    assert_eq!(
        Inspector::builder().use_quotes(true).build().format(&"tab\there"),
        "\"tab\\there\""
    );
}
