use serde::Deserialize;

/// Parser configuration, fixed for the lifetime of one parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Treat every non-ASCII character from U+00A0 upward as an identifier character.
    /// Without it only characters above U+00A1 qualify.
    pub multibyte_support: bool,
    /// Recover from malformed input instead of failing.
    pub lenient_parsing: bool,
}

impl Default for Settings {
    fn default() -> Self {
        return Self {
            multibyte_support: true,
            lenient_parsing: true,
        };
    }
}

impl Settings {
    pub fn create() -> Self {
        return Self::default();
    }

    pub fn with_multibyte_support(mut self, multibyte_support: bool) -> Self {
        self.multibyte_support = multibyte_support;
        return self;
    }

    pub fn with_lenient_parsing(mut self, lenient_parsing: bool) -> Self {
        self.lenient_parsing = lenient_parsing;
        return self;
    }

    pub fn be_strict(self) -> Self {
        return self.with_lenient_parsing(false);
    }

    pub fn is_strict(&self) -> bool {
        return !self.lenient_parsing;
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let settings = serde_json::from_str(json)?;
        return Ok(settings);
    }
}
