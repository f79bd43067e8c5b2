//! Component content: an in-memory line buffer or a pull-based provider.

use crate::core::{
    feature::{self, Feature, FeatureGroup},
    line::Line,
};

/// A pull-based line provider, queried lazily for the visible window
/// instead of storing lines on the component.
///
/// The base method is mandatory; everything else is an optional capability.
/// Capabilities are resolved once, when the provider is attached, and the
/// matching features are enabled on the component: a reported length makes
/// it scrollable, per-line focusability makes it line-focusable, and edit
/// acceptance makes it editable.
pub trait Liner: Send {
    /// Produce the content of line `idx`. Returns false when `idx` is past
    /// the end of the content.
    fn line(&self, idx: usize, line: &mut Line) -> bool;

    /// Total number of lines, when the provider can report it.
    fn len(&self) -> Option<usize> {
        None
    }

    /// Whether line `idx` may take line focus. `None` means the provider
    /// has no focusability capability.
    fn focusable(&self, _idx: usize) -> Option<bool> {
        None
    }

    /// Whether the provider accepts edits at all.
    fn accepts_edits(&self) -> bool {
        false
    }

    /// Apply a rune insertion at a line/cell position. Returns true when
    /// the provider accepted the edit.
    fn insert(&mut self, _line: usize, _cell: usize, _rune: char) -> bool {
        false
    }
}

/// Capabilities resolved from a provider at attach time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SourceCaps {
    /// The provider reports a total length.
    pub scrollable: bool,
    /// The provider reports per-line focusability.
    pub line_focusable: bool,
    /// The provider accepts edits.
    pub editable: bool,
}

impl SourceCaps {
    /// Probe a provider's optional capabilities.
    pub(crate) fn resolve(liner: &dyn Liner) -> Self {
        Self {
            scrollable: liner.len().is_some(),
            line_focusable: liner.focusable(0).is_some(),
            editable: liner.accepts_edits(),
        }
    }

    /// The features these capabilities switch on.
    pub(crate) fn features(&self) -> FeatureGroup {
        let mut g = FeatureGroup::EMPTY;
        if self.scrollable {
            g = g.union(feature::SCROLLABLE);
        }
        if self.line_focusable {
            g = g.union(feature::LINE_SELECTABLE);
        }
        if self.editable {
            g = g.union(feature::CELL_FOCUSABLE).with(Feature::Editable);
        }
        g
    }
}

/// Where a component's lines come from.
pub(crate) enum Content {
    /// Directly written in-memory lines.
    Buffer(Vec<Line>),
    /// A pull-based provider plus its resolved capabilities.
    Source {
        /// The provider.
        liner: Box<dyn Liner>,
        /// Capabilities resolved at attach time.
        caps: SourceCaps,
    },
}

impl Content {
    /// Number of content lines. A provider without a length capability
    /// reports zero; such content can still be displayed but not scrolled.
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Buffer(lines) => lines.len(),
            Self::Source { liner, .. } => liner.len().unwrap_or(0),
        }
    }

    /// Materialize the line at `idx`, if it exists.
    pub(crate) fn line(&self, idx: usize) -> Option<Line> {
        match self {
            Self::Buffer(lines) => lines.get(idx).cloned(),
            Self::Source { liner, .. } => {
                let mut line = Line::default();
                if liner.line(idx, &mut line) {
                    Some(line)
                } else {
                    None
                }
            }
        }
    }

    /// Whether line focus may land on `idx`.
    pub(crate) fn focusable(&self, idx: usize) -> bool {
        match self {
            Self::Buffer(lines) => lines
                .get(idx)
                .map(|l| !l.flags().not_focusable)
                .unwrap_or(false),
            Self::Source { liner, .. } => {
                if idx >= liner.len().unwrap_or(0) {
                    return false;
                }
                liner.focusable(idx).unwrap_or(true)
            }
        }
    }

    /// Direct access to the in-memory buffer. `None` for provider-backed
    /// content.
    pub(crate) fn buffer_mut(&mut self) -> Option<&mut Vec<Line>> {
        match self {
            Self::Buffer(lines) => Some(lines),
            Self::Source { .. } => None,
        }
    }

    /// Apply a rune insertion. Returns true when the content accepted it.
    pub(crate) fn insert(&mut self, line: usize, cell: usize, rune: char) -> bool {
        match self {
            Self::Buffer(lines) => {
                if let Some(l) = lines.get_mut(line) {
                    l.insert_rune(cell, rune);
                    true
                } else {
                    false
                }
            }
            Self::Source { liner, caps } => caps.editable && liner.insert(line, cell, rune),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Numbers(usize);

    impl Liner for Numbers {
        fn line(&self, idx: usize, line: &mut Line) -> bool {
            if idx < self.0 {
                line.set_text(format!("line {idx}"));
                true
            } else {
                false
            }
        }

        fn len(&self) -> Option<usize> {
            Some(self.0)
        }

        fn focusable(&self, idx: usize) -> Option<bool> {
            Some(idx % 2 == 0)
        }
    }

    #[test]
    fn caps_resolution() {
        let caps = SourceCaps::resolve(&Numbers(4));
        assert!(caps.scrollable);
        assert!(caps.line_focusable);
        assert!(!caps.editable);
        let fs = caps.features();
        assert!(fs.contains(Feature::DownScrollable));
        assert!(fs.contains(Feature::NextLineFocusable));
        assert!(!fs.contains(Feature::Editable));
    }

    #[test]
    fn source_content_is_pulled_lazily() {
        let c = Content::Source {
            liner: Box::new(Numbers(2)),
            caps: SourceCaps::resolve(&Numbers(2)),
        };
        assert_eq!(c.len(), 2);
        assert_eq!(c.line(1).unwrap().text(), "line 1");
        assert!(c.line(2).is_none());
        assert!(c.focusable(0));
        assert!(!c.focusable(1));
        assert!(!c.focusable(7));
    }

    #[test]
    fn buffer_edits() {
        let mut c = Content::Buffer(vec![Line::new("ab")]);
        assert!(c.insert(0, 1, 'x'));
        assert_eq!(c.line(0).unwrap().text(), "axb");
        assert!(!c.insert(3, 0, 'x'));
    }
}
