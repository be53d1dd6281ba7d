#![allow(missing_docs)]

use std::fmt;

use loupe::{Inspect, format, stringify};

#[derive(Inspect)]
#[inspect(rename = "Player")]
struct PlayerState {
    #[inspect(rename = "hp")]
    health: u32,
    name: String,
    #[inspect(skip)]
    #[allow(dead_code)]
    session_token: String,
    #[deprecated]
    #[allow(dead_code)]
    legacy_score: u32,
}

#[test]
#[allow(deprecated)]
fn test_macro_ergonomics() {
    let player = PlayerState {
        health: 90,
        name: "ayla".into(),
        session_token: "secret".into(),
        legacy_score: 3,
    };
    assert_eq!(stringify(&player), "Player { hp: 90, name: ayla }");
    assert_eq!(format(&player), "Player { hp: 90, name: ayla }");
}

#[derive(Inspect, Clone, Copy)]
#[allow(dead_code)]
enum Color {
    Red = 1,
    Green = 2,
    Blue = 4,
}

#[derive(Inspect, Clone, Copy)]
#[inspect(flags)]
#[allow(dead_code)]
enum Access {
    None = 0,
    Read = 1,
    Write = 2,
    Exec = 4,
}

#[derive(Inspect)]
#[inspect(flags = "Access")]
struct Permissions(u8);

#[derive(Inspect)]
#[inspect(flags = "Access")]
struct Mask(i8);

#[derive(Inspect, Clone, Copy)]
#[inspect(display)]
enum Level {
    Low,
    High,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Low => "low",
            Level::High => "HIGH",
        })
    }
}

#[test]
fn signed_flags_use_the_integer_width() {
    assert_eq!(
        stringify(&Mask(-1)),
        "Mask(0xFF) = Read | Write | Exec | 0xF8"
    );
    assert_eq!(stringify(&Mask(5)), "Mask(0x5) = Read | Exec");
}

#[test]
fn display_enums_render_their_text() {
    assert_eq!(stringify(&Level::High), "HIGH");
    assert_eq!(format(&vec![Level::Low, Level::High]), "[low, HIGH]");
}

#[test]
fn fieldless_enums_render_as_enumerations() {
    assert_eq!(stringify(&Color::Green), "Color(2) = Green");
    assert_eq!(stringify(&Access::Write), "Access(0x2) = Write");
    assert_eq!(stringify(&Access::None), "Access(0x0) = None");
    assert_eq!(stringify(&Permissions(3)), "Permissions(0x3) = Read | Write");
    assert_eq!(stringify(&Permissions(0x11)), "Permissions(0x11) = Read | 0x10");
}

#[derive(Inspect)]
#[allow(dead_code)]
enum Shape {
    Circle { radius: f64 },
    Rect(u32, u32),
    Empty,
    #[inspect(rename = "Tri")]
    Triangle { c: u8, a: u8, b: u8 },
}

#[test]
fn data_enums_get_one_layout_per_variant() {
    assert_eq!(stringify(&Shape::Circle { radius: 1.5 }), "Shape::Circle { radius: 1.5 }");
    assert_eq!(stringify(&Shape::Rect(3, 4)), "Shape::Rect(3, 4)");
    assert_eq!(stringify(&Shape::Empty), "Shape::Empty");
    assert_eq!(
        format(&Shape::Triangle { c: 3, a: 1, b: 2 }),
        "Shape::Tri { a: 1, b: 2, c: 3 }"
    );
}

#[derive(Inspect)]
struct Tagged<T> {
    tag: &'static str,
    value: T,
}

#[test]
fn generic_structs_bound_their_parameters() {
    let tagged = Tagged {
        tag: "ids",
        value: vec![1u8, 2],
    };
    assert_eq!(stringify(&tagged), "Tagged { tag: ids, value: [1, 2] }");
    let nested = Tagged {
        tag: "outer",
        value: Tagged { tag: "inner", value: 'x' },
    };
    assert_eq!(
        stringify(&nested),
        "Tagged { tag: outer, value: Tagged { tag: inner, value: x } }"
    );
}

#[derive(Inspect)]
struct Unit;

#[derive(Inspect)]
struct Wrapper(Vec<u8>);

#[test]
fn unit_and_tuple_structs() {
    assert_eq!(stringify(&Unit), "Unit");
    assert_eq!(format(&Wrapper(vec![9])), "Wrapper([9])");
}
