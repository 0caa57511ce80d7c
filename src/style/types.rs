//! Display attribute types applied to a line.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Name of a single display attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttrName {
    Color,
    FontWeight,
    TextDecoration,
}

impl fmt::Display for AttrName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color => write!(f, "color"),
            Self::FontWeight => write!(f, "font-weight"),
            Self::TextDecoration => write!(f, "text-decoration"),
        }
    }
}

/// A 24-bit foreground color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` hex color. Case-insensitive, the leading `#` is required.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    None,
    LineThrough,
}

/// Value of a display attribute. Each variant belongs to exactly one [`AttrName`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrValue {
    Color(Rgb),
    FontWeight(FontWeight),
    TextDecoration(TextDecoration),
}

impl AttrValue {
    pub const fn name(&self) -> AttrName {
        match self {
            Self::Color(_) => AttrName::Color,
            Self::FontWeight(_) => AttrName::FontWeight,
            Self::TextDecoration(_) => AttrName::TextDecoration,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color(rgb) => write!(f, "{rgb}"),
            Self::FontWeight(FontWeight::Normal) => write!(f, "normal"),
            Self::FontWeight(FontWeight::Bold) => write!(f, "bold"),
            Self::TextDecoration(TextDecoration::None) => write!(f, "none"),
            Self::TextDecoration(TextDecoration::LineThrough) => write!(f, "line-through"),
        }
    }
}

/// Set of display attributes keyed by name.
///
/// Iteration order is the [`AttrName`] order, independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    values: BTreeMap<AttrName, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Attributes::set`].
    #[must_use]
    pub fn with(mut self, value: AttrValue) -> Self {
        self.set(value);
        self
    }

    /// Set a value, replacing any previous value for the same attribute.
    pub fn set(&mut self, value: AttrValue) {
        self.values.insert(value.name(), value);
    }

    pub fn get(&self, name: AttrName) -> Option<AttrValue> {
        self.values.get(&name).copied()
    }

    pub fn color(&self) -> Option<Rgb> {
        match self.get(AttrName::Color) {
            Some(AttrValue::Color(rgb)) => Some(rgb),
            _ => None,
        }
    }

    pub fn font_weight(&self) -> Option<FontWeight> {
        match self.get(AttrName::FontWeight) {
            Some(AttrValue::FontWeight(weight)) => Some(weight),
            _ => None,
        }
    }

    pub fn text_decoration(&self) -> Option<TextDecoration> {
        match self.get(AttrName::TextDecoration) {
            Some(AttrValue::TextDecoration(decoration)) => Some(decoration),
            _ => None,
        }
    }

    /// Overwrite the keys `other` defines; keys it lacks keep their current value.
    pub fn merge(&mut self, other: &Self) {
        self.values
            .extend(other.values.iter().map(|(name, value)| (*name, *value)));
    }

    pub fn iter(&self) -> impl Iterator<Item = AttrValue> + '_ {
        self.values.values().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for value in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: {value}", value.name())?;
        }
        Ok(())
    }
}
