use std::fmt;

use convert_case::{Case, Casing};

/// A component name used in traces and debug dumps.
///
/// Names are snake_case ASCII; anything else is munged on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name(Box<str>);

/// Return true if the character is valid in a component name.
fn valid_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
}

impl Name {
    /// Munge an arbitrary string into a valid name.
    pub fn convert(raw: &str) -> Self {
        let snake = raw.to_case(Case::Snake);
        let filtered: String = snake.chars().filter(|c| valid_char(*c)).collect();
        if filtered.is_empty() {
            Self("component".into())
        } else {
            Self(filtered.into())
        }
    }

    /// Derive a name from a type, using its unqualified type name.
    pub fn of<T: ?Sized>() -> Self {
        let full = std::any::type_name::<T>();
        let short = full.rsplit("::").next().unwrap_or(full);
        // Strip generic arguments; `List<Item>` names as `list`.
        let short = short.split('<').next().unwrap_or(short);
        Self::convert(short)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}
