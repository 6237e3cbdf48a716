//! Open/closed membership shared by disclosure widgets.
//!
//! An [`OpenSet`] records which items are currently open under one of two
//! exclusivity policies. [`Accordion`](crate::accordion::Accordion) renders
//! on top of it; any other widget that shows and hides content per item can
//! do the same.

use std::fmt;

/// Identifier of one logical item (a panel, a tab, a section).
///
/// Supplied once per item and shared by its trigger and its content, so the
/// two never need to be matched by naming convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Exclusivity policy of an [`OpenSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisclosureMode {
    /// At most one item is open; opening another replaces it.
    #[default]
    Single,
    /// Any number of items may be open independently.
    Multiple,
}

/// Open/closed indicator consumers read off a disclosure or overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataState {
    Open,
    Closed,
}

impl DataState {
    pub fn from_open(open: bool) -> Self {
        if open {
            DataState::Open
        } else {
            DataState::Closed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataState::Open => "open",
            DataState::Closed => "closed",
        }
    }
}

impl fmt::Display for DataState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of currently open items.
///
/// Mutated only through [`toggle`](OpenSet::toggle). In
/// [`Single`](DisclosureMode::Single) mode the set never holds more than one
/// id. Ids are kept in the order they were opened.
#[derive(Debug, Clone, Default)]
pub struct OpenSet {
    mode: DisclosureMode,
    open: Vec<ItemId>,
}

impl OpenSet {
    /// An empty set with the given policy.
    pub fn new(mode: DisclosureMode) -> Self {
        Self {
            mode,
            open: Vec::new(),
        }
    }

    /// A set pre-populated with `initial`.
    ///
    /// Duplicates collapse. In single mode only the first id is kept.
    pub fn with_initial(mode: DisclosureMode, initial: impl IntoIterator<Item = ItemId>) -> Self {
        let mut set = Self::new(mode);
        for id in initial {
            if set.open.contains(&id) {
                continue;
            }
            set.open.push(id);
            if mode == DisclosureMode::Single {
                break;
            }
        }
        set
    }

    /// Flip the membership of `id`.
    ///
    /// Returns the ids whose membership changed, which is the set of items
    /// that need re-rendering. In single mode opening `id` also closes the
    /// previously open item, so up to two ids are returned.
    pub fn toggle(&mut self, id: &ItemId) -> Vec<ItemId> {
        if let Some(pos) = self.open.iter().position(|open| open == id) {
            self.open.remove(pos);
            return vec![id.clone()];
        }

        let mut changed = Vec::with_capacity(2);
        if self.mode == DisclosureMode::Single {
            changed.append(&mut self.open);
        }
        self.open.push(id.clone());
        changed.push(id.clone());
        changed
    }

    /// Whether `id` is open. Unknown ids are closed.
    pub fn is_open(&self, id: &ItemId) -> bool {
        self.open.contains(id)
    }

    pub fn data_state(&self, id: &ItemId) -> DataState {
        DataState::from_open(self.is_open(id))
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Open ids in the order they were opened.
    pub fn open_ids(&self) -> &[ItemId] {
        &self.open
    }

    pub fn mode(&self) -> DisclosureMode {
        self.mode
    }

    /// Close everything. Returns the ids that were open.
    pub fn clear(&mut self) -> Vec<ItemId> {
        std::mem::take(&mut self.open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(s: &str) -> ItemId {
        ItemId::new(s)
    }

    #[test]
    fn single_mode_replaces_open_item() {
        let mut set = OpenSet::new(DisclosureMode::Single);
        assert_eq!(set.toggle(&id("a")), vec![id("a")]);
        assert_eq!(set.toggle(&id("b")), vec![id("a"), id("b")]);
        assert!(!set.is_open(&id("a")));
        assert!(set.is_open(&id("b")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn single_mode_toggling_sole_item_empties() {
        let mut set = OpenSet::new(DisclosureMode::Single);
        set.toggle(&id("a"));
        assert_eq!(set.toggle(&id("a")), vec![id("a")]);
        assert!(set.is_empty());
    }

    #[test]
    fn multiple_mode_is_independent() {
        let mut set = OpenSet::new(DisclosureMode::Multiple);
        set.toggle(&id("a"));
        set.toggle(&id("b"));
        assert_eq!(set.open_ids(), &[id("a"), id("b")]);
        assert_eq!(set.toggle(&id("a")), vec![id("a")]);
        assert_eq!(set.open_ids(), &[id("b")]);
    }

    #[test]
    fn unknown_id_is_closed() {
        let set = OpenSet::new(DisclosureMode::Multiple);
        assert!(!set.is_open(&id("missing")));
        assert_eq!(set.data_state(&id("missing")), DataState::Closed);
    }

    #[test]
    fn single_mode_initial_keeps_first() {
        let set = OpenSet::with_initial(DisclosureMode::Single, [id("b"), id("a"), id("c")]);
        assert_eq!(set.open_ids(), &[id("b")]);
    }

    #[test]
    fn multiple_mode_initial_collapses_duplicates() {
        let set = OpenSet::with_initial(DisclosureMode::Multiple, [id("a"), id("b"), id("a")]);
        assert_eq!(set.open_ids(), &[id("a"), id("b")]);
    }

    #[test]
    fn clear_returns_previous_members() {
        let mut set = OpenSet::with_initial(DisclosureMode::Multiple, [id("a"), id("b")]);
        assert_eq!(set.clear(), vec![id("a"), id("b")]);
        assert!(set.is_empty());
    }

    #[test]
    fn data_state_strings() {
        assert_eq!(DataState::Open.to_string(), "open");
        assert_eq!(DataState::from_open(false).as_str(), "closed");
    }

    fn ids() -> impl Strategy<Value = Vec<ItemId>> {
        prop::collection::vec(
            prop::sample::select(vec!["a", "b", "c", "d", "e"]).prop_map(ItemId::from),
            0..64,
        )
    }

    proptest! {
        #[test]
        fn single_mode_never_exceeds_one(seq in ids()) {
            let mut set = OpenSet::new(DisclosureMode::Single);
            for id in &seq {
                set.toggle(id);
                prop_assert!(set.len() <= 1);
            }
        }

        #[test]
        fn multiple_mode_double_toggle_restores(
            prefix in ids(),
            target in prop::sample::select(vec!["a", "b", "c", "d", "e"]),
        ) {
            let mut set = OpenSet::new(DisclosureMode::Multiple);
            for id in &prefix {
                set.toggle(id);
            }
            let target = ItemId::from(target);
            let before = set.is_open(&target);
            let others: Vec<ItemId> = set
                .open_ids()
                .iter()
                .filter(|id| **id != target)
                .cloned()
                .collect();

            set.toggle(&target);
            set.toggle(&target);

            prop_assert_eq!(set.is_open(&target), before);
            for other in &others {
                prop_assert!(set.is_open(other));
            }
        }

        #[test]
        fn toggle_reports_exactly_the_changed_ids(seq in ids(), mode in prop::bool::ANY) {
            let mode = if mode { DisclosureMode::Single } else { DisclosureMode::Multiple };
            let mut set = OpenSet::new(mode);
            for id in &seq {
                let before: Vec<ItemId> = set.open_ids().to_vec();
                let changed = set.toggle(id);
                for c in &changed {
                    prop_assert_ne!(before.contains(c), set.is_open(c));
                }
                for b in &before {
                    if !changed.contains(b) {
                        prop_assert!(set.is_open(b));
                    }
                }
            }
        }
    }
}
