//! Cell styling used by line content and the render sync.

/// A terminal color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// The terminal default.
    Default,
    /// Black.
    Black,
    /// Red.
    Red,
    /// Green.
    Green,
    /// Yellow.
    Yellow,
    /// Blue.
    Blue,
    /// Magenta.
    Magenta,
    /// Cyan.
    Cyan,
    /// White.
    White,
    /// Grey.
    Grey,
    /// Dark grey.
    DarkGrey,
    /// A 24-bit color.
    Rgb {
        /// Red channel.
        r: u8,
        /// Green channel.
        g: u8,
        /// Blue channel.
        b: u8,
    },
    /// An ANSI palette index.
    AnsiValue(u8),
}

/// Text attributes applied to a cell.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttrSet {
    /// Bold text.
    pub bold: bool,
    /// Dimmed text.
    pub dim: bool,
    /// Italic text.
    pub italic: bool,
    /// Underlined text.
    pub underline: bool,
    /// Foreground/background swapped.
    pub reverse: bool,
}

/// A complete cell style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    /// Foreground color.
    pub fg: Color,
    /// Background color.
    pub bg: Color,
    /// Attributes.
    pub attrs: AttrSet,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fg: Color::Default,
            bg: Color::Default,
            attrs: AttrSet::default(),
        }
    }
}

impl Style {
    /// This style with the reverse attribute set, used for line highlights.
    pub fn reversed(mut self) -> Self {
        self.attrs.reverse = true;
        self
    }
}
