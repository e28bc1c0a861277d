//! Expanding shorthand declarations into longhands and collapsing complete
//! longhand sets back into shorthands.

use tracing::trace;

use super::rule::Rule;
use super::rule_set::{DeclarationBlock, RuleContainer};
use crate::value::{RuleValueList, Size, Value};

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];
const DIMENSION_PROPERTIES: &[&str] = &["margin", "padding", "border-color", "border-style", "border-width"];
const BORDER_PROPERTIES: &[&str] = &["border", "border-left", "border-right", "border-top", "border-bottom"];
const BORDER_SIZES: &[&str] = &["thin", "medium", "thick"];
const FONT_PROPERTIES: &[&str] = &[
    "font-style",
    "font-variant",
    "font-weight",
    "font-size",
    "line-height",
    "font-family",
];
const BACKGROUND_PROPERTIES: &[&str] = &[
    "background-color",
    "background-image",
    "background-repeat",
    "background-position",
    "background-attachment",
];
const LIST_STYLE_PROPERTIES: &[&str] = &["list-style-type", "list-style-position", "list-style-image"];
const LIST_STYLE_TYPES: &[&str] = &[
    "none",
    "disc",
    "circle",
    "square",
    "decimal-leading-zero",
    "decimal",
    "lower-roman",
    "upper-roman",
    "lower-greek",
    "lower-alpha",
    "lower-latin",
    "upper-alpha",
    "upper-latin",
    "hebrew",
    "armenian",
    "georgian",
    "cjk-ideographic",
    "hiragana",
    "hira-gana-iroha",
    "katakana-iroha",
    "katakana",
];

/// `margin` + `top` is `margin-top`, `border-color` + `top` is `border-top-color`.
fn side_property(property: &str, side: &str) -> String {
    return match property.strip_prefix("border-") {
        Some(aspect) => format!("border-{side}-{aspect}"),
        None => format!("{property}-{side}"),
    };
}

fn is_any_keyword(value: &Value, keywords: &[&str]) -> bool {
    return keywords.iter().any(|k| value.is_keyword(k));
}

/// The top level components of a rule's value.
fn values_of(rule: &Rule) -> Vec<Value> {
    return rule
        .value()
        .map(|v| v.components().into_iter().cloned().collect())
        .unwrap_or_default();
}

fn space_list(mut values: Vec<Value>, line_no: usize) -> Value {
    if values.len() == 1 {
        return values.remove(0);
    }
    return Value::List(RuleValueList::new(' ', values, line_no));
}

/// A rule standing in for part of `origin`, keeping its line and importance.
fn longhand(name: &str, value: Value, origin: &Rule) -> Rule {
    return Rule::new(name, origin.line_no())
        .with_value(value)
        .with_important(origin.is_important());
}

/// `Some(flag)` when every rule has the same importance.
fn shared_importance(rules: &[Rule]) -> Option<bool> {
    let first = rules.first()?.is_important();
    if rules.iter().all(|r| r.is_important() == first) {
        return Some(first);
    }
    return None;
}

impl DeclarationBlock {
    /// The last rule named `name`, which is the one that applies.
    fn effective_rule(&self, name: &str) -> Option<Rule> {
        return self.rules(Some(name)).last().map(|rule| (*rule).clone());
    }

    /// Replaces `border`, the box dimensions, `font`, `background` and
    /// `list-style` with their longhands, appended at the end.
    pub fn expand_shorthands(&mut self) {
        self.expand_border_shorthand();
        self.expand_dimensions_shorthand();
        self.expand_font_shorthand();
        self.expand_background_shorthand();
        self.expand_list_style_shorthand();
    }

    /// Collapses complete, equally important longhand sets into shorthands.
    pub fn create_shorthands(&mut self) {
        self.create_background_shorthand();
        self.create_dimensions_shorthand();
        self.create_border_shorthand();
        self.create_font_shorthand();
        self.create_list_style_shorthand();
    }

    pub fn expand_border_shorthand(&mut self) {
        for property in BORDER_PROPERTIES {
            let Some(rule) = self.effective_rule(property) else {
                continue;
            };
            for value in values_of(&rule) {
                let aspect = match &value {
                    Value::Size(_) => "width",
                    Value::Color(_) => "color",
                    other if is_any_keyword(other, BORDER_SIZES) => "width",
                    _ => "style",
                };
                self.add_rule(longhand(&format!("{property}-{aspect}"), value, &rule), None);
            }
            self.remove_rules(property);
        }
    }

    /// One to four values map to top, right, bottom and left the usual way.
    pub fn expand_dimensions_shorthand(&mut self) {
        for property in DIMENSION_PROPERTIES {
            let Some(rule) = self.effective_rule(property) else {
                continue;
            };
            let values = values_of(&rule);
            let sides = match values.as_slice() {
                [all] => [all, all, all, all],
                [vertical, horizontal] => [vertical, horizontal, vertical, horizontal],
                [top, horizontal, bottom] => [top, horizontal, bottom, horizontal],
                [top, right, bottom, left] => [top, right, bottom, left],
                _ => {
                    trace!(property, count = values.len(), "not expanding dimensions");
                    continue;
                }
            };
            for (side, value) in SIDES.iter().zip(sides) {
                self.add_rule(longhand(&side_property(property, side), value.clone(), &rule), None);
            }
            self.remove_rules(property);
        }
    }

    /// Omitted parts of `font` reset to `normal`.
    pub fn expand_font_shorthand(&mut self) {
        let Some(rule) = self.effective_rule("font") else {
            return;
        };
        let line = rule.line_no();
        let mut style = Value::keyword("normal", line);
        let mut variant = Value::keyword("normal", line);
        let mut weight = Value::keyword("normal", line);
        let mut size = Value::keyword("normal", line);
        let mut line_height = Value::keyword("normal", line);
        let mut family = None;

        for value in values_of(&rule) {
            if is_any_keyword(&value, &["normal", "inherit"]) {
                continue;
            }
            if is_any_keyword(&value, &["italic", "oblique"]) {
                style = value;
            } else if value.is_keyword("small-caps") {
                variant = value;
            } else if is_any_keyword(&value, &["bold", "bolder", "lighter"]) || is_font_weight_number(&value) {
                weight = value;
            } else if let Some([font_size, height]) = slash_pair(&value) {
                size = font_size;
                line_height = height;
            } else if value.as_size().is_some_and(|s| s.unit().is_some()) {
                size = value;
            } else {
                family = Some(value);
            }
        }

        let mut longhands = vec![
            ("font-style", style),
            ("font-variant", variant),
            ("font-weight", weight),
            ("font-size", size),
            ("line-height", line_height),
        ];
        if let Some(family) = family {
            longhands.push(("font-family", family));
        }
        for (name, value) in longhands {
            self.add_rule(longhand(name, value, &rule), None);
        }
        self.remove_rules("font");
    }

    /// Omitted parts of `background` take their initial values.
    pub fn expand_background_shorthand(&mut self) {
        let Some(rule) = self.effective_rule("background") else {
            return;
        };
        let line = rule.line_no();
        let values = values_of(&rule);
        if values.len() == 1 && values[0].is_keyword("inherit") {
            for name in ["background-color", "background-image", "background-repeat", "background-attachment", "background-position"] {
                self.add_rule(longhand(name, Value::keyword("inherit", line), &rule), None);
            }
            self.remove_rules("background");
            return;
        }

        let mut color = Value::keyword("transparent", line);
        let mut image = Value::keyword("none", line);
        let mut repeat = Value::keyword("repeat", line);
        let mut attachment = Value::keyword("scroll", line);
        let mut position = Vec::new();
        for value in values {
            if matches!(value, Value::Url(_)) {
                image = value;
            } else if matches!(value, Value::Color(_)) {
                color = value;
            } else if is_any_keyword(&value, &["scroll", "fixed"]) {
                attachment = value;
            } else if is_any_keyword(&value, &["repeat", "no-repeat", "repeat-x", "repeat-y"]) {
                repeat = value;
            } else if matches!(value, Value::Size(_))
                || is_any_keyword(&value, &["left", "center", "right", "top", "bottom"])
            {
                position.push(value);
            }
        }
        if position.is_empty() {
            let origin = || Value::Size(Size::new(0.0, Some("%"), false, line));
            position = vec![origin(), origin()];
        }

        let longhands = [
            ("background-color", color),
            ("background-image", image),
            ("background-repeat", repeat),
            ("background-attachment", attachment),
            ("background-position", space_list(position, line)),
        ];
        for (name, value) in longhands {
            self.add_rule(longhand(name, value, &rule), None);
        }
        self.remove_rules("background");
    }

    pub fn expand_list_style_shorthand(&mut self) {
        let Some(rule) = self.effective_rule("list-style") else {
            return;
        };
        let line = rule.line_no();
        let values = values_of(&rule);
        if values.len() == 1 && values[0].is_keyword("inherit") {
            for name in LIST_STYLE_PROPERTIES {
                self.add_rule(longhand(name, Value::keyword("inherit", line), &rule), None);
            }
            self.remove_rules("list-style");
            return;
        }

        let mut list_type = Value::keyword("disc", line);
        let mut position = Value::keyword("outside", line);
        let mut image = Value::keyword("none", line);
        for value in values {
            if matches!(value, Value::Url(_)) {
                image = value;
            } else if is_any_keyword(&value, LIST_STYLE_TYPES) {
                list_type = value;
            } else if is_any_keyword(&value, &["inside", "outside"]) {
                position = value;
            }
        }
        let longhands = [
            ("list-style-type", list_type),
            ("list-style-position", position),
            ("list-style-image", image),
        ];
        for (name, value) in longhands {
            self.add_rule(longhand(name, value, &rule), None);
        }
        self.remove_rules("list-style");
    }

    /// Joins the values of whichever `properties` are present, in that order.
    fn create_shorthand_properties(&mut self, properties: &[&str], shorthand: &str) {
        let present: Vec<Rule> = properties.iter().filter_map(|p| self.effective_rule(p)).collect();
        let Some(important) = shared_importance(&present) else {
            return;
        };
        let line = present.last().map_or(0, Rule::line_no);
        let values: Vec<Value> = present.iter().flat_map(values_of).collect();
        if values.is_empty() {
            return;
        }
        for property in properties {
            self.remove_rules(property);
        }
        let rule = Rule::new(shorthand, line)
            .with_value(space_list(values, line))
            .with_important(important);
        self.add_rule(rule, None);
    }

    pub fn create_background_shorthand(&mut self) {
        self.create_shorthand_properties(BACKGROUND_PROPERTIES, "background");
    }

    pub fn create_list_style_shorthand(&mut self) {
        self.create_shorthand_properties(LIST_STYLE_PROPERTIES, "list-style");
    }

    /// Per-side values such as `border-color: red blue` have no `border` form.
    pub fn create_border_shorthand(&mut self) {
        const PROPERTIES: &[&str] = &["border-width", "border-style", "border-color"];
        let per_side = PROPERTIES
            .iter()
            .filter_map(|p| self.effective_rule(p))
            .any(|rule| values_of(&rule).len() > 1);
        if per_side {
            return;
        }
        self.create_shorthand_properties(PROPERTIES, "border");
    }

    /// Needs all four sides; writes the shortest equivalent form.
    pub fn create_dimensions_shorthand(&mut self) {
        for property in DIMENSION_PROPERTIES {
            let sides: Vec<Rule> = SIDES
                .iter()
                .filter_map(|side| self.effective_rule(&side_property(property, side)))
                .collect();
            if sides.len() != 4 {
                continue;
            }
            let Some(important) = shared_importance(&sides) else {
                trace!(property, "sides differ in importance");
                continue;
            };
            let Some(values) = sides.iter().map(|r| r.value().cloned()).collect::<Option<Vec<Value>>>() else {
                continue;
            };
            let texts: Vec<String> = values.iter().map(Value::to_string).collect();
            let (top, right, bottom, left) = (&texts[0], &texts[1], &texts[2], &texts[3]);
            let keep: &[usize] = if left != right {
                &[0, 1, 2, 3]
            } else if top != bottom {
                &[0, 3, 2]
            } else if top != left {
                &[0, 3]
            } else {
                &[0]
            };
            let line = sides[0].line_no();
            let chosen: Vec<Value> = keep.iter().map(|i| values[*i].clone()).collect();
            for side in SIDES {
                self.remove_rules(&side_property(property, side));
            }
            let rule = Rule::new(*property, line)
                .with_value(space_list(chosen, line))
                .with_important(important);
            self.add_rule(rule, None);
        }
    }

    /// Needs `font-size` and `font-family`. `normal` parts are left out.
    pub fn create_font_shorthand(&mut self) {
        let (Some(size), Some(family)) = (self.effective_rule("font-size"), self.effective_rule("font-family")) else {
            return;
        };
        let present: Vec<Rule> = FONT_PROPERTIES.iter().filter_map(|p| self.effective_rule(p)).collect();
        let Some(important) = shared_importance(&present) else {
            return;
        };
        let (Some(font_size), Some(font_family)) = (values_of(&size).into_iter().next(), family.value().cloned())
        else {
            return;
        };
        let line = size.line_no();
        let first_value = |name: &str| -> Option<Value> {
            return self
                .effective_rule(name)
                .and_then(|r| values_of(&r).into_iter().next())
                .filter(|v| !v.is_keyword("normal"));
        };

        let mut values: Vec<Value> = ["font-style", "font-variant", "font-weight"]
            .iter()
            .filter_map(|name| first_value(name))
            .collect();
        match first_value("line-height") {
            Some(height) => values.push(Value::List(RuleValueList::new('/', vec![font_size, height], line))),
            None => values.push(font_size),
        }
        values.push(font_family);

        for property in FONT_PROPERTIES {
            self.remove_rules(property);
        }
        let rule = Rule::new("font", line)
            .with_value(space_list(values, line))
            .with_important(important);
        self.add_rule(rule, None);
    }
}

/// Numeric weights, `100` to `900` in steps of a hundred.
fn is_font_weight_number(value: &Value) -> bool {
    return value.as_size().is_some_and(|s| {
        let n = s.as_f64();
        s.unit().is_none() && (100.0..=900.0).contains(&n) && n % 100.0 == 0.0
    });
}

/// The two sides of a `size/line-height` pair.
fn slash_pair(value: &Value) -> Option<[Value; 2]> {
    let list = value.as_list().filter(|l| l.separator() == '/')?;
    return match list.components() {
        [first, second] => Some([first.clone(), second.clone()]),
        _ => None,
    };
}
