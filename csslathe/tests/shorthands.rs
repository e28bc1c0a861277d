use csslathe::nodes::{BlockList, RuleContainer};
use csslathe::{parse, Document, Settings};

fn parsed(text: &str) -> Document {
    return parse(text, Settings::create()).unwrap();
}

/// Expands and recreates, returning the rendering and the longhand count in between.
fn round_trip(text: &str) -> (String, usize) {
    let mut doc = parsed(text);
    doc.expand_shorthands();
    let longhands = doc.all_declaration_blocks()[0].rules(None).len();
    doc.create_shorthands();
    return (doc.render().unwrap(), longhands);
}

#[test]
fn dimensions_round_trip() {
    assert_eq!(round_trip("a {margin: 1px;}"), ("a {margin: 1px;}".to_owned(), 4));
    assert_eq!(round_trip("a {padding: 1px 2px;}"), ("a {padding: 1px 2px;}".to_owned(), 4));
    assert_eq!(round_trip("a {margin: 1px 2px 3px;}"), ("a {margin: 1px 2px 3px;}".to_owned(), 4));
    assert_eq!(round_trip("a {margin: 1px 2px 3px 4px;}"), ("a {margin: 1px 2px 3px 4px;}".to_owned(), 4));
    assert_eq!(
        round_trip("a {border-color: red blue !important;}"),
        ("a {border-color: red blue !important;}".to_owned(), 4)
    );
}

#[test]
fn border_round_trip() {
    assert_eq!(round_trip("a {border: 2px solid #f0f;}"), ("a {border: 2px solid #f0f;}".to_owned(), 12));
}

#[test]
fn font_round_trip() {
    assert_eq!(
        round_trip("a {font: italic 500 14px/1.618 \"Trebuchet MS\", Georgia, serif;}"),
        ("a {font: italic 500 14px/1.618 \"Trebuchet MS\",Georgia,serif;}".to_owned(), 6)
    );
    assert_eq!(round_trip("a {font: 12px serif;}"), ("a {font: 12px serif;}".to_owned(), 6));
}

#[test]
fn background_and_list_style_fill_defaults() {
    assert_eq!(
        round_trip("a {background: #ccc url(\"x.png\") no-repeat left top;}"),
        ("a {background: #ccc url(\"x.png\") no-repeat left top scroll;}".to_owned(), 5)
    );
    assert_eq!(
        round_trip("ul {list-style: square;}"),
        ("ul {list-style: square outside none;}".to_owned(), 3)
    );
}

#[test]
fn shorthands_inside_media_blocks() {
    let mut doc = parsed("@media print { .a {margin: 0 1px;} }");
    doc.expand_shorthands();
    assert_eq!(
        doc.render().unwrap(),
        "@media print {.a {margin-top: 0;margin-right: 1px;margin-bottom: 0;margin-left: 1px;}}"
    );
    doc.create_shorthands();
    assert_eq!(doc.render().unwrap(), "@media print {.a {margin: 0 1px;}}");
}

#[test]
fn later_declarations_win() {
    let mut doc = parsed("a {margin: 1px;margin: 2px;}");
    doc.expand_shorthands();
    assert_eq!(
        doc.render().unwrap(),
        "a {margin-top: 2px;margin-right: 2px;margin-bottom: 2px;margin-left: 2px;}"
    );
}
