use smol_str::SmolStr;

pub const ABSOLUTE_SIZE_UNITS: &[&str] = &[
    "px", "pt", "pc", "cm", "mm", "mozmm", "in", "vh", "dvh", "svh", "lvh", "vw", "vmin", "vmax",
    "rem",
];
pub const RELATIVE_SIZE_UNITS: &[&str] = &["%", "em", "ex", "ch", "fr"];
pub const NON_SIZE_UNITS: &[&str] = &[
    "deg", "grad", "rad", "s", "ms", "turn", "Hz", "kHz", "dpi", "dpcm", "dppx", "x",
];

/// A number with an optional unit.
///
/// The magnitude is kept as canonical decimal text so arbitrarily large or
/// precise numbers survive a round trip untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Size {
    magnitude: String,
    unit: Option<SmolStr>,
    is_color_component: bool,
    line_no: usize,
}

impl Size {
    pub fn new(magnitude: f64, unit: Option<&str>, is_color_component: bool, line_no: usize) -> Self {
        return Self {
            magnitude: format_number(magnitude),
            unit: unit.map(SmolStr::new),
            is_color_component,
            line_no,
        };
    }

    /// `text` is a decimal literal such as `-0.60`, `1e3` or `+5`.
    pub fn from_text(text: &str, unit: Option<&str>, is_color_component: bool, line_no: usize) -> Self {
        return Self {
            magnitude: canonical_magnitude(text),
            unit: unit.map(SmolStr::new),
            is_color_component,
            line_no,
        };
    }

    pub fn magnitude(&self) -> &str {
        return &self.magnitude;
    }

    pub fn as_f64(&self) -> f64 {
        return self.magnitude.parse().unwrap_or(0.0);
    }

    pub fn set_size(&mut self, magnitude: f64) {
        self.magnitude = format_number(magnitude);
    }

    pub fn unit(&self) -> Option<&str> {
        return self.unit.as_deref();
    }

    pub fn set_unit(&mut self, unit: Option<&str>) {
        self.unit = unit.map(SmolStr::new);
    }

    pub fn is_color_component(&self) -> bool {
        return self.is_color_component;
    }

    /// Lengths and percentages, but not angles, times, frequencies or color channels.
    pub fn is_size(&self) -> bool {
        if self.unit().is_some_and(|u| NON_SIZE_UNITS.contains(&u)) {
            return false;
        }
        return !self.is_color_component;
    }

    pub fn is_relative(&self) -> bool {
        match self.unit() {
            Some(u) => RELATIVE_SIZE_UNITS.contains(&u),
            None => self.as_f64() != 0.0,
        }
    }

    pub fn line_no(&self) -> usize {
        return self.line_no;
    }

    pub fn render(&self) -> String {
        let mut result = self.magnitude.clone();
        if let Some(unit) = &self.unit {
            result.push_str(unit);
        }
        return result;
    }

    /// The longest known unit `text` starts with, in its canonical spelling.
    pub fn unit_prefix(text: &str) -> Option<&'static str> {
        return ABSOLUTE_SIZE_UNITS
            .iter()
            .chain(RELATIVE_SIZE_UNITS)
            .chain(NON_SIZE_UNITS)
            .filter(|unit| {
                text.get(..unit.len())
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case(unit))
            })
            .max_by_key(|unit| unit.len())
            .copied();
    }
}

/// Strips leading integer zeros and trailing fractional zeros,
/// `0.5` becomes `.5`.
pub(crate) fn canonical_magnitude(text: &str) -> String {
    if text.contains(['e', 'E']) {
        return match text.parse::<f64>() {
            Ok(value) if value.is_finite() => format_number(value),
            // out of f64 range
            _ => text.to_owned(),
        };
    }
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (int, frac) = digits.split_once('.').unwrap_or((digits, ""));
    let int = int.trim_start_matches('0');
    let frac = frac.trim_end_matches('0');
    if int.is_empty() && frac.is_empty() {
        return "0".to_owned();
    }
    let mut result = String::new();
    if negative {
        result.push('-');
    }
    result.push_str(int);
    if !frac.is_empty() {
        result.push('.');
        result.push_str(frac);
    }
    return result;
}

/// Rounds to 14 significant digits and canonicalizes the text.
pub(crate) fn format_number(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".to_owned();
    }
    let exponent = value.abs().log10().floor() as i32;
    let decimals = (13 - exponent).max(0) as usize;
    return canonical_magnitude(&format!("{value:.decimals$}"));
}

#[cfg(test)]
mod test_size {
    use super::*;

    #[test]
    fn canonical() {
        assert_eq!(canonical_magnitude("10"), "10");
        assert_eq!(canonical_magnitude("0.6"), ".6");
        assert_eq!(canonical_magnitude("-0.60"), "-.6");
        assert_eq!(canonical_magnitude("+5"), "5");
        assert_eq!(canonical_magnitude("007.50"), "7.5");
        assert_eq!(canonical_magnitude("0"), "0");
        assert_eq!(canonical_magnitude("0.0"), "0");
        assert_eq!(canonical_magnitude("1e3"), "1000");
        assert_eq!(canonical_magnitude("1e400"), "1e400");
        assert_eq!(canonical_magnitude("-2E+999"), "-2E+999");
        assert_eq!(canonical_magnitude("1e-400"), "0");
        assert_eq!(
            canonical_magnitude("10000000000000000000000"),
            "10000000000000000000000"
        );
    }

    #[test]
    fn floats() {
        assert_eq!(format_number(1.2 * 3.0), "3.6");
        assert_eq!(format_number(0.3), ".3");
        assert_eq!(format_number(-0.6), "-.6");
        assert_eq!(format_number(230.0), "230");
        assert_eq!(format_number(68.0 / 255.0), ".26666666666667");
        assert_eq!(format_number(1e22), "10000000000000000000000");
    }

    #[test]
    fn units() {
        assert_eq!(Size::unit_prefix("px;"), Some("px"));
        assert_eq!(Size::unit_prefix("MOZMM"), Some("mozmm"));
        assert_eq!(Size::unit_prefix("mm"), Some("mm"));
        assert_eq!(Size::unit_prefix("ms"), Some("ms"));
        assert_eq!(Size::unit_prefix("khz"), Some("kHz"));
        assert_eq!(Size::unit_prefix("% "), Some("%"));
        assert_eq!(Size::unit_prefix("vmin"), Some("vmin"));
        assert_eq!(Size::unit_prefix("foo"), None);
        assert_eq!(Size::unit_prefix("x,"), Some("x"));
        assert_eq!(Size::unit_prefix("DPPX"), Some("dppx"));
        assert_eq!(Size::unit_prefix("ex"), Some("ex"));
    }

    #[test]
    fn classification() {
        let px = Size::from_text("10", Some("px"), false, 1);
        assert!(px.is_size());
        assert!(!px.is_relative());
        assert_eq!(px.render(), "10px");

        let em = Size::from_text("1.2", Some("em"), false, 1);
        assert!(em.is_relative());

        let deg = Size::from_text("45", Some("deg"), false, 1);
        assert!(!deg.is_size());
        let resolution = Size::from_text("2", Some("dppx"), false, 1);
        assert!(!resolution.is_size());

        let channel = Size::new(255.0, None, true, 1);
        assert!(!channel.is_size());
        assert!(channel.is_relative());

        let zero = Size::from_text("0", None, false, 1);
        assert!(!zero.is_relative());
    }

    #[test]
    fn rescale() {
        let mut size = Size::from_text("1.2", Some("em"), false, 4);
        size.set_size(size.as_f64() * 3.0);
        assert_eq!(size.render(), "3.6em");
        size.set_unit(None);
        assert_eq!(size.render(), "3.6");
        assert_eq!(size.line_no(), 4);
    }
}
