use itertools::Itertools;

use super::size::Size;
use crate::render::Printer;

/// An `rgb`/`rgba`/`hsl`/`hsla` color. The description is spelled by the
/// channel names in order, hex notation produces `rgb` or `rgba`.
#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    channels: Vec<(char, Size)>,
    line_no: usize,
}

impl Color {
    pub fn new(channels: Vec<(char, Size)>, line_no: usize) -> Self {
        return Self { channels, line_no };
    }

    /// `hex` without the `#`, 3, 4, 6 or 8 hex digits.
    pub fn from_hex(hex: &str, line_no: usize) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let expanded: String = match hex.len() {
            3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => hex.to_owned(),
            _ => return None,
        };
        let pair = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).unwrap_or(0);
        let mut channels = vec![
            ('r', Size::new(pair(0) as f64, None, true, line_no)),
            ('g', Size::new(pair(2) as f64, None, true, line_no)),
            ('b', Size::new(pair(4) as f64, None, true, line_no)),
        ];
        if expanded.len() == 8 {
            let alpha = (pair(6) as f64 / 255.0 * 100.0).round() / 100.0;
            channels.push(('a', Size::new(alpha, None, true, line_no)));
        }
        return Some(Self::new(channels, line_no));
    }

    pub fn color_description(&self) -> String {
        return self.channels.iter().map(|(name, _)| name).collect();
    }

    pub fn channels(&self) -> &[(char, Size)] {
        return &self.channels;
    }

    pub fn channel(&self, name: char) -> Option<&Size> {
        return self.channels.iter().find(|(n, _)| *n == name).map(|(_, s)| s);
    }

    pub fn channel_mut(&mut self, name: char) -> Option<&mut Size> {
        return self
            .channels
            .iter_mut()
            .find(|(n, _)| *n == name)
            .map(|(_, s)| s);
    }

    pub fn set_channels(&mut self, channels: Vec<(char, Size)>) {
        self.channels = channels;
    }

    pub fn line_no(&self) -> usize {
        return self.line_no;
    }

    /// `rgb` colors with plain 0-255 channels as `#rrggbb`, shortened when possible.
    fn hex_notation(&self) -> Option<String> {
        if self.color_description() != "rgb" {
            return None;
        }
        let mut bytes = Vec::with_capacity(3);
        for (_, size) in &self.channels {
            let value = size.as_f64();
            if size.unit().is_some() || value.fract() != 0.0 || !(0.0..=255.0).contains(&value) {
                return None;
            }
            bytes.push(value as u8);
        }
        let hex = bytes.iter().map(|b| format!("{b:02x}")).join("");
        let h = hex.as_bytes();
        if h[0] == h[1] && h[2] == h[3] && h[4] == h[5] {
            return Some(format!("#{}{}{}", h[0] as char, h[2] as char, h[4] as char));
        }
        return Some(format!("#{hex}"));
    }

    pub fn render(&self, printer: &Printer) -> String {
        if printer.format.rgb_hash_notation {
            if let Some(hex) = self.hex_notation() {
                return hex;
            }
        }
        let separator = format!(",{}", printer.space_after_list_argument_separator(','));
        let channels = self.channels.iter().map(|(_, size)| size.render()).join(&separator);
        return format!("{}({})", self.color_description(), channels);
    }
}

#[cfg(test)]
mod test_color {
    use super::*;
    use crate::render::OutputFormat;

    fn render(color: &Color) -> String {
        return color.render(&OutputFormat::default().printer());
    }

    #[test]
    fn hex_forms() {
        let color = Color::from_hex("0a64e6", 1).unwrap();
        assert_eq!(color.color_description(), "rgb");
        assert_eq!(color.channel('r').unwrap().as_f64(), 10.0);
        assert_eq!(color.channel('g').unwrap().as_f64(), 100.0);
        assert_eq!(color.channel('b').unwrap().as_f64(), 230.0);
        assert!(color.channel('a').is_none());
        assert_eq!(render(&color), "#0a64e6");

        assert_eq!(render(&Color::from_hex("f0f", 1).unwrap()), "#f0f");
        assert_eq!(render(&Color::from_hex("222222", 1).unwrap()), "#222");
        assert_eq!(render(&Color::from_hex("1234", 1).unwrap()), "rgba(17,34,51,.27)");
        assert_eq!(render(&Color::from_hex("11223344", 1).unwrap()), "rgba(17,34,51,.27)");
        assert!(Color::from_hex("12345", 1).is_none());
        assert!(Color::from_hex("ggg", 1).is_none());
    }

    #[test]
    fn functional_forms() {
        let hsl = Color::new(
            vec![
                ('h', Size::from_text("202", None, true, 1)),
                ('s', Size::from_text("100", Some("%"), true, 1)),
                ('l', Size::from_text("49", Some("%"), true, 1)),
            ],
            1,
        );
        assert_eq!(render(&hsl), "hsl(202,100%,49%)");

        let percent_rgb = Color::new(
            vec![
                ('r', Size::from_text("10", Some("%"), true, 1)),
                ('g', Size::from_text("0", None, true, 1)),
                ('b', Size::from_text("0", None, true, 1)),
            ],
            1,
        );
        assert_eq!(render(&percent_rgb), "rgb(10%,0,0)");

        let mut format = OutputFormat::default();
        format.rgb_hash_notation = false;
        let red = Color::from_hex("f00", 1).unwrap();
        assert_eq!(red.render(&format.printer()), "rgb(255,0,0)");
        assert_eq!(red.render(&OutputFormat::pretty().printer()), "#f00");
    }
}
