//! Synthetic stylesheets for the benchmarks.

use std::fmt::Write;

const PROPERTIES: &[(&str, &str)] = &[
    ("margin", "0 auto 1.5em"),
    ("padding", "2px 6px 3px 4px"),
    ("border", "1px solid #c0c0c0"),
    ("font", "italic bold 12px/1.5 \"Helvetica Neue\", Arial, sans-serif"),
    ("background", "#fff url(\"img/bg.png\") no-repeat left top"),
    ("color", "rgba(0, 0, 0, .8)"),
    ("width", "calc(100% - 2 * 12px)"),
    ("-webkit-transition", "opacity .3s ease-in-out"),
];

/// `blocks` declaration blocks, with a `@media` block and a comment every tenth.
pub fn stylesheet(blocks: usize) -> String {
    let mut css = String::from("@charset \"utf-8\";\n@import url(\"base.css\") screen;\n");
    for i in 0..blocks {
        if i % 10 == 0 {
            let _ = writeln!(css, "/* section {i} */");
            let _ = writeln!(css, "@media screen and (max-width: {}px) {{ .m{i} {{ display: none; }} }}", 600 + i);
        }
        let _ = write!(css, "#nav-{i} > li.item-{i}:hover a, .card-{i}::before {{");
        for (name, value) in PROPERTIES.iter().cycle().skip(i % PROPERTIES.len()).take(4) {
            let _ = write!(css, " {name}: {value};");
        }
        css.push_str(" }\n");
    }
    return css;
}
