//! Line attributes → terminal styles.

use crossterm::style::{Attribute, Color, ContentStyle};

use crate::style::{Attributes, FontWeight, Rgb, TextDecoration};

/// Terminal style for a line's display attributes.
pub fn content_style(attributes: &Attributes, truecolor: bool) -> ContentStyle {
    let mut style = ContentStyle::new();
    if let Some(rgb) = attributes.color() {
        style.foreground_color = Some(fg_color(rgb, truecolor));
    }
    if attributes.font_weight() == Some(FontWeight::Bold) {
        style.attributes.set(Attribute::Bold);
    }
    if attributes.text_decoration() == Some(TextDecoration::LineThrough) {
        style.attributes.set(Attribute::CrossedOut);
    }
    style
}

fn fg_color(rgb: Rgb, truecolor: bool) -> Color {
    if truecolor {
        Color::Rgb {
            r: rgb.r,
            g: rgb.g,
            b: rgb.b,
        }
    } else {
        Color::AnsiValue(rgb_to_xterm_256(rgb.r, rgb.g, rgb.b))
    }
}

/// Whether the terminal advertises 24-bit color.
pub fn supports_truecolor() -> bool {
    if let Ok(force) = std::env::var("KEYLINE_TRUECOLOR") {
        let value = force.to_ascii_lowercase();
        return matches!(value.as_str(), "1" | "true" | "yes" | "on");
    }
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    if let Some(ct) = colorterm {
        let lower = ct.to_ascii_lowercase();
        if lower.contains("truecolor") || lower.contains("24bit") {
            return true;
        }
    }
    term.is_some_and(|t| {
        let lower = t.to_ascii_lowercase();
        lower.contains("direct") || lower.contains("truecolor")
    })
}

fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    // Result is always 0-5, fits in u8
    #[allow(clippy::cast_possible_truncation)]
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    16 + (36 * to_cube(r)) + (6 * to_cube(g)) + to_cube(b)
}
