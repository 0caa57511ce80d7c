//! Terminal output of styled lines.
//!
//! - [`style`]: mapping display attributes to terminal styles

pub mod style;

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Print, PrintStyledContent, StyledContent};

use crate::editor::Line;

/// How lines are written to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Plain text, no escape sequences.
    Off,
    /// 256-color palette approximation.
    Palette,
    TrueColor,
}

impl ColorMode {
    /// Pick a mode from the environment unless color is disabled.
    pub fn detect(no_color: bool) -> Self {
        if no_color {
            Self::Off
        } else if style::supports_truecolor() {
            Self::TrueColor
        } else {
            Self::Palette
        }
    }
}

/// Write each line followed by a newline, styled per its attributes.
///
/// # Errors
/// Returns any error from the underlying writer.
pub fn render_lines<'a, W, I>(out: &mut W, lines: I, mode: ColorMode) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Line>,
{
    for line in lines {
        match mode {
            ColorMode::Off => queue!(out, Print(line.text()))?,
            ColorMode::Palette | ColorMode::TrueColor => {
                let style =
                    style::content_style(line.attributes(), mode == ColorMode::TrueColor);
                queue!(out, PrintStyledContent(StyledContent::new(style, line.text())))?;
            }
        }
        queue!(out, Print("\n"))?;
    }
    out.flush()
}
