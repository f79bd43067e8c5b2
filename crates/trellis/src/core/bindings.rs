//! Input binding tables mapping keys, runes, and buttons to features.
//!
//! A shared immutable default table is referenced by every component; the
//! first mutation through a component's [`FeatureSet`] clones it, so no
//! component can ever alter the defaults another component sees.

use std::{collections::HashMap, sync::Arc};

use crate::core::{
    event::{
        key::{self, Key, KeyCode},
        mouse::Button,
    },
    feature::{Feature, FeatureGroup},
};

/// An input position in one of the three binding tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    /// A key table entry.
    K(Key),
    /// A rune table entry. Modified characters route through the key table,
    /// so runes are keyed by the bare character.
    R(char),
    /// A button table entry.
    B(Button, key::Mods),
}

/// Quit bindings that survive every deletion.
const RESERVED_QUIT: [Key; 2] = [
    Key {
        mods: key::Ctrl,
        code: KeyCode::Char('c'),
    },
    Key {
        mods: key::Ctrl,
        code: KeyCode::Char('d'),
    },
];

/// The standard default bindings, one feature per input.
const DEFAULTS: [(Input, Feature); 16] = [
    (Input::K(RESERVED_QUIT[0]), Feature::Quit),
    (Input::K(RESERVED_QUIT[1]), Feature::Quit),
    (Input::R('q'), Feature::Quit),
    (
        Input::K(Key {
            mods: key::Empty,
            code: KeyCode::PageUp,
        }),
        Feature::UpScrollable,
    ),
    (Input::B(Button::WheelUp, key::Empty), Feature::UpScrollable),
    (
        Input::K(Key {
            mods: key::Empty,
            code: KeyCode::PageDown,
        }),
        Feature::DownScrollable,
    ),
    (
        Input::B(Button::WheelDown, key::Empty),
        Feature::DownScrollable,
    ),
    (
        Input::K(Key {
            mods: key::Empty,
            code: KeyCode::Up,
        }),
        Feature::PrevLineFocusable,
    ),
    (
        Input::K(Key {
            mods: key::Empty,
            code: KeyCode::Down,
        }),
        Feature::NextLineFocusable,
    ),
    (
        Input::K(Key {
            mods: key::Empty,
            code: KeyCode::Enter,
        }),
        Feature::LineSelectable,
    ),
    (
        Input::K(Key {
            mods: key::Empty,
            code: KeyCode::Esc,
        }),
        Feature::LineUnfocusable,
    ),
    (
        Input::K(Key {
            mods: key::Empty,
            code: KeyCode::Left,
        }),
        Feature::PrevCellFocusable,
    ),
    (
        Input::K(Key {
            mods: key::Empty,
            code: KeyCode::Right,
        }),
        Feature::NextCellFocusable,
    ),
    (
        Input::K(Key {
            mods: key::Empty,
            code: KeyCode::Home,
        }),
        Feature::FirstCellFocusable,
    ),
    (
        Input::K(Key {
            mods: key::Empty,
            code: KeyCode::End,
        }),
        Feature::LastCellFocusable,
    ),
    (Input::B(Button::Left, key::Empty), Feature::Focusable),
];

/// The three lookup tables. Each input maps to at most one feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureBindings {
    /// Key bindings, keyed by normalized keystroke.
    keys: HashMap<Key, Feature>,
    /// Rune bindings.
    runes: HashMap<char, Feature>,
    /// Button bindings.
    buttons: HashMap<(Button, key::Mods), Feature>,
}

impl FeatureBindings {
    /// An empty table.
    fn empty() -> Self {
        Self {
            keys: HashMap::new(),
            runes: HashMap::new(),
            buttons: HashMap::new(),
        }
    }

    /// The standard default table.
    pub fn standard() -> Self {
        let mut b = Self::empty();
        for (input, f) in DEFAULTS {
            b.insert(input, f);
        }
        b
    }

    /// The kiosk variant: the standard table without any quit bindings.
    pub fn kiosk() -> Self {
        let mut b = Self::empty();
        for (input, f) in DEFAULTS {
            if f != Feature::Quit {
                b.insert(input, f);
            }
        }
        b
    }

    /// Insert a binding, displacing whatever was bound to the input.
    fn insert(&mut self, input: Input, f: Feature) {
        match input {
            Input::K(k) => {
                self.keys.insert(k.normalize(), f);
            }
            Input::R(r) => {
                self.runes.insert(r, f);
            }
            Input::B(b, m) => {
                self.buttons.insert((b, m), f);
            }
        }
    }

    /// Remove every binding of `f`. Reserved quit bindings are kept.
    fn remove_feature(&mut self, f: Feature) {
        self.keys
            .retain(|k, bound| *bound != f || (f == Feature::Quit && RESERVED_QUIT.contains(k)));
        self.runes.retain(|_, bound| *bound != f);
        self.buttons.retain(|_, bound| *bound != f);
    }

    /// Install the default bindings of `f`, skipping taken inputs.
    fn install_defaults(&mut self, f: Feature) {
        for (input, def) in DEFAULTS {
            if def != f {
                continue;
            }
            let taken = match input {
                Input::K(k) => self.keys.contains_key(&k.normalize()),
                Input::R(r) => self.runes.contains_key(&r),
                Input::B(b, m) => self.buttons.contains_key(&(b, m)),
            };
            if !taken {
                self.insert(input, f);
            }
        }
    }

    /// Look up the feature bound to a key.
    fn of_key(&self, k: Key) -> Option<Feature> {
        self.keys.get(&k.normalize()).copied()
    }

    /// Look up the feature bound to a rune.
    fn of_rune(&self, r: char) -> Option<Feature> {
        self.runes.get(&r).copied()
    }

    /// Look up the feature bound to a button press.
    fn of_button(&self, b: Button, mods: key::Mods) -> Option<Feature> {
        self.buttons.get(&(b, mods)).copied()
    }
}

/// A component's view of the binding tables plus its enabled features.
///
/// The table reference starts out shared with the configuration's default;
/// any mutation clones it first.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    /// Binding tables, clone-on-write.
    bindings: Arc<FeatureBindings>,
    /// Features currently enabled on the component.
    enabled: FeatureGroup,
    /// Whether descendants inherit this set during dispatch lookups.
    recursive: bool,
}

impl FeatureSet {
    /// Construct a set sharing `bindings` with the given enabled features.
    pub(crate) fn new(bindings: Arc<FeatureBindings>, enabled: FeatureGroup) -> Self {
        Self {
            bindings,
            enabled,
            recursive: false,
        }
    }

    /// Enable features, installing their default bindings where the inputs
    /// are not already taken.
    pub fn add(&mut self, features: impl Into<FeatureGroup>) {
        for f in features.into().iter() {
            if !self.enabled.contains(f) {
                Arc::make_mut(&mut self.bindings).install_defaults(f);
                self.enabled.insert(f);
            }
        }
    }

    /// Replace the enabled features wholesale.
    pub fn set(&mut self, features: impl Into<FeatureGroup>) {
        let target = features.into();
        for f in self.enabled.iter() {
            if !target.contains(f) {
                self.delete(f);
            }
        }
        self.add(target);
    }

    /// Disable features and remove their bindings. The two reserved quit
    /// bindings can never be removed; deleting `Quit` only strips
    /// rune-based and user-added quit bindings.
    pub fn delete(&mut self, features: impl Into<FeatureGroup>) {
        for f in features.into().iter() {
            Arc::make_mut(&mut self.bindings).remove_feature(f);
            if f != Feature::Quit {
                self.enabled.remove(f);
            }
        }
    }

    /// True if the feature is enabled.
    pub fn has(&self, f: Feature) -> bool {
        self.enabled.contains(f)
    }

    /// All enabled features.
    pub fn all(&self) -> FeatureGroup {
        self.enabled
    }

    /// Whether descendants inherit this set.
    pub fn recursive(&self) -> bool {
        self.recursive
    }

    /// Mark this set as inherited by all descendant components.
    pub fn set_recursive(&mut self, recursive: bool) {
        self.recursive = recursive;
    }

    /// Atomically replace the key bindings of a single elementary feature.
    pub fn set_keys_of(&mut self, f: Feature, keys: &[Key]) {
        let b = Arc::make_mut(&mut self.bindings);
        b.keys
            .retain(|k, bound| *bound != f || (f == Feature::Quit && RESERVED_QUIT.contains(k)));
        for k in keys {
            if k.code == KeyCode::Null {
                continue;
            }
            b.keys.insert(k.normalize(), f);
        }
        self.enabled.insert(f);
    }

    /// Atomically replace the rune bindings of a single elementary feature.
    pub fn set_runes_of(&mut self, f: Feature, runes: &[char]) {
        let b = Arc::make_mut(&mut self.bindings);
        b.runes.retain(|_, bound| *bound != f);
        for r in runes {
            if *r == '\0' {
                continue;
            }
            b.runes.insert(*r, f);
        }
        self.enabled.insert(f);
    }

    /// Atomically replace the button bindings of a single elementary feature.
    pub fn set_buttons_of(&mut self, f: Feature, buttons: &[(Button, key::Mods)]) {
        let b = Arc::make_mut(&mut self.bindings);
        b.buttons.retain(|_, bound| *bound != f);
        for (btn, mods) in buttons {
            b.buttons.insert((*btn, *mods), f);
        }
        self.enabled.insert(f);
    }

    /// The keys bound to a feature.
    pub fn keys_of(&self, f: Feature) -> Vec<Key> {
        self.bindings
            .keys
            .iter()
            .filter(|(_, bound)| **bound == f)
            .map(|(k, _)| *k)
            .collect()
    }

    /// The runes bound to a feature.
    pub fn runes_of(&self, f: Feature) -> Vec<char> {
        self.bindings
            .runes
            .iter()
            .filter(|(_, bound)| **bound == f)
            .map(|(r, _)| *r)
            .collect()
    }

    /// The button bindings of a feature.
    pub fn buttons_of(&self, f: Feature) -> Vec<(Button, key::Mods)> {
        self.bindings
            .buttons
            .iter()
            .filter(|(_, bound)| **bound == f)
            .map(|(b, _)| *b)
            .collect()
    }

    /// The enabled feature bound to a key, if any. Reserved quit bindings
    /// resolve regardless of the enabled set.
    pub fn of_key(&self, k: Key) -> Option<Feature> {
        let f = self.bindings.of_key(k)?;
        if self.enabled.contains(f) || (f == Feature::Quit && RESERVED_QUIT.contains(&k.normalize()))
        {
            Some(f)
        } else {
            None
        }
    }

    /// The enabled feature bound to a rune, if any.
    pub fn of_rune(&self, r: char) -> Option<Feature> {
        self.bindings
            .of_rune(r)
            .filter(|f| self.enabled.contains(*f))
    }

    /// The enabled feature bound to a button press, if any.
    pub fn of_button(&self, b: Button, mods: key::Mods) -> Option<Feature> {
        self.bindings
            .of_button(b, mods)
            .filter(|f| self.enabled.contains(*f))
    }
}
