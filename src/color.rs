use core::fmt;

/// Red/black tag carried by every node of the index.
///
/// Query results report it so callers can observe the balancing state.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    /// Returns the single-character tag: `'R'` or `'B'`.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_tree::Color;
    ///
    /// assert_eq!(Color::Red.tag(), 'R');
    /// assert_eq!(Color::Black.tag(), 'B');
    /// ```
    #[must_use]
    pub const fn tag(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Black => 'B',
        }
    }

    #[must_use]
    pub const fn is_red(self) -> bool {
        matches!(self, Color::Red)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
