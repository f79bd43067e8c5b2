//! Named default input behaviors.
//!
//! An elementary [`Feature`] is a single bindable behavior. Compound
//! behaviors like "scrollable" are [`FeatureGroup`]s — explicit sets of
//! elementary features. Whether something can be bound directly is a
//! type-level distinction: binding operations accept a `Feature`, while
//! enable/disable operations accept anything convertible to a group.

use std::fmt;

/// An elementary input-driven behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Shut the application down.
    Quit,
    /// Scroll the component's content up by one page.
    UpScrollable,
    /// Scroll the component's content down by one page.
    DownScrollable,
    /// Move line focus to the previous focusable line.
    PrevLineFocusable,
    /// Move line focus to the next focusable line.
    NextLineFocusable,
    /// Report the focused line as selected.
    LineSelectable,
    /// Reset line focus to unfocused.
    LineUnfocusable,
    /// Move the cell cursor left.
    PrevCellFocusable,
    /// Move the cell cursor right.
    NextCellFocusable,
    /// Move the cell cursor to the first cell.
    FirstCellFocusable,
    /// Move the cell cursor to the last cell.
    LastCellFocusable,
    /// Claim keyboard focus on a bound button press.
    Focusable,
    /// Accept rune insertion at the cell cursor.
    Editable,
}

/// All elementary features, in declaration order.
pub const ALL: [Feature; 13] = [
    Feature::Quit,
    Feature::UpScrollable,
    Feature::DownScrollable,
    Feature::PrevLineFocusable,
    Feature::NextLineFocusable,
    Feature::LineSelectable,
    Feature::LineUnfocusable,
    Feature::PrevCellFocusable,
    Feature::NextCellFocusable,
    Feature::FirstCellFocusable,
    Feature::LastCellFocusable,
    Feature::Focusable,
    Feature::Editable,
];

impl Feature {
    /// The bit backing this feature in a group.
    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A set of elementary features.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureGroup {
    /// Membership bits, indexed by feature discriminant.
    bits: u16,
}

impl FeatureGroup {
    /// The empty group.
    pub const EMPTY: Self = Self { bits: 0 };

    /// This group with `f` added.
    pub const fn with(self, f: Feature) -> Self {
        Self {
            bits: self.bits | f.bit(),
        }
    }

    /// True if the group contains `f`.
    pub fn contains(self, f: Feature) -> bool {
        self.bits & f.bit() != 0
    }

    /// True if no feature is a member.
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Add a feature in place.
    pub fn insert(&mut self, f: Feature) {
        self.bits |= f.bit();
    }

    /// Remove a feature in place.
    pub fn remove(&mut self, f: Feature) {
        self.bits &= !f.bit();
    }

    /// The union with another group.
    pub fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Iterate over member features.
    pub fn iter(self) -> impl Iterator<Item = Feature> {
        ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl From<Feature> for FeatureGroup {
    fn from(f: Feature) -> Self {
        Self::EMPTY.with(f)
    }
}

/// Both page-scroll directions.
pub const SCROLLABLE: FeatureGroup = FeatureGroup::EMPTY
    .with(Feature::UpScrollable)
    .with(Feature::DownScrollable);

/// Line focus movement in both directions.
pub const LINE_FOCUSABLE: FeatureGroup = FeatureGroup::EMPTY
    .with(Feature::PrevLineFocusable)
    .with(Feature::NextLineFocusable);

/// The four cell cursor movements.
pub const CELL_FOCUSABLE: FeatureGroup = FeatureGroup::EMPTY
    .with(Feature::PrevCellFocusable)
    .with(Feature::NextCellFocusable)
    .with(Feature::FirstCellFocusable)
    .with(Feature::LastCellFocusable);

/// Line focus plus selection and unfocus.
pub const LINE_SELECTABLE: FeatureGroup = LINE_FOCUSABLE
    .with(Feature::LineSelectable)
    .with(Feature::LineUnfocusable);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_membership() {
        assert!(SCROLLABLE.contains(Feature::UpScrollable));
        assert!(SCROLLABLE.contains(Feature::DownScrollable));
        assert!(!SCROLLABLE.contains(Feature::Quit));
        assert_eq!(SCROLLABLE.iter().count(), 2);
    }

    #[test]
    fn insert_and_remove() {
        let mut g = FeatureGroup::EMPTY;
        g.insert(Feature::Editable);
        assert!(g.contains(Feature::Editable));
        g.remove(Feature::Editable);
        assert!(g.is_empty());
    }

    #[test]
    fn compound_groups_compose() {
        let g = SCROLLABLE.union(CELL_FOCUSABLE);
        assert_eq!(g.iter().count(), 6);
        assert!(LINE_SELECTABLE.contains(Feature::LineSelectable));
    }
}
