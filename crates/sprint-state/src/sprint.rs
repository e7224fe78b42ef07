//! Sprint window and sprint metadata column state

use crate::ordered_set::OrderedSet;
use serde::{Deserialize, Serialize};

/// Sprint window bounds
///
/// `first` may be negative to include that many future sprints before
/// sprint 0. `current` is the first non-future sprint of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SprintWindow {
    /// First sprint offset (negative: future sprints)
    pub first: i64,
    /// Current sprint offset
    pub current: i64,
    /// Last sprint offset
    pub last: i64,
}

impl SprintWindow {
    /// Create window from explicit bounds
    #[inline]
    #[must_use]
    pub fn new(first: i64, current: i64, last: i64) -> Self {
        Self {
            first,
            current,
            last,
        }
    }

    /// Default window for a sprint limit
    #[inline]
    #[must_use]
    pub fn for_limit(limit: i64) -> Self {
        Self::new(0, 0, limit)
    }

    /// Bounds as link values: `[first, current, last]`
    #[must_use]
    pub fn values(self) -> [i64; 3] {
        [self.first, self.current, self.last]
    }
}

/// Sprint range and filtering state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintsState {
    /// Number of recent sprints served per project
    pub limit: i64,
    /// First sprint offset
    pub first: i64,
    /// Current sprint offset
    pub current: i64,
    /// Last sprint offset
    pub last: i64,
    /// Only show closed sprints
    pub closed_only: bool,
    /// Include sprints older than `limit`
    pub show_old: bool,
    /// Upstream reports whether sprints are closed
    pub has_closed: bool,
    /// Upstream serves old sprints
    pub has_old: bool,
}

impl SprintsState {
    /// Create state with the default window for `limit`
    #[must_use]
    pub fn new(limit: i64) -> Self {
        Self {
            limit,
            first: 0,
            current: 0,
            last: limit,
            closed_only: false,
            show_old: false,
            has_closed: true,
            has_old: false,
        }
    }

    /// Current window
    #[inline]
    #[must_use]
    pub fn window(&self) -> SprintWindow {
        SprintWindow::new(self.first, self.current, self.last)
    }

    /// Default window
    #[inline]
    #[must_use]
    pub fn default_window(&self) -> SprintWindow {
        SprintWindow::for_limit(self.limit)
    }

    /// Replace the window bounds
    pub fn set_window(&mut self, window: SprintWindow) {
        self.first = window.first;
        self.current = window.current;
        self.last = window.last;
    }

    /// Only show closed sprints, if upstream reports closed state
    ///
    /// Returns the flag now in effect.
    pub fn set_closed_only(&mut self, closed: bool) -> bool {
        self.closed_only = closed && self.has_closed;
        self.closed_only
    }

    /// Include old sprints, if upstream serves them
    ///
    /// Returns the flag now in effect.
    pub fn set_show_old(&mut self, show: bool) -> bool {
        self.show_old = show && self.has_old;
        self.show_old
    }

    /// Number of sprint entries kept when old sprints are hidden
    ///
    /// A zero `current` offset means the window starts at sprint 0 and the
    /// bound falls back to `last`.
    #[must_use]
    pub fn recent_bound(&self) -> usize {
        let bound = if self.current > 0 {
            self.current
        } else {
            self.last
        };
        usize::try_from(bound).unwrap_or(0)
    }
}

/// Key resolving to the main sprint label column
pub const MAIN_META_KEY: &str = "main";

/// Sprint metadata column state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintMetaState {
    /// Known column names; the first is the fallback main column
    pub known: Vec<String>,
    /// Selected columns, in display order
    pub selected: OrderedSet<String>,
    /// Columns with numeric values
    pub numeric: OrderedSet<String>,
    /// Selection at startup
    pub initial: OrderedSet<String>,
    /// Selection was changed by a navigation
    pub changed: bool,
}

impl SprintMetaState {
    /// Create state with an initial selection
    #[must_use]
    pub fn new(known: Vec<String>, selected: OrderedSet<String>, numeric: OrderedSet<String>) -> Self {
        let known_set: OrderedSet<String> = known.iter().cloned().collect();
        let selected = selected.intersect(&known_set);
        Self {
            numeric: numeric.intersect(&known_set),
            known,
            initial: selected.clone(),
            selected,
            changed: false,
        }
    }

    /// Known columns as a set
    #[must_use]
    pub fn known_set(&self) -> OrderedSet<String> {
        self.known.iter().cloned().collect()
    }

    /// Resolve a column key
    ///
    /// `"main"` resolves to the first selected column, or the first known
    /// column when nothing is selected. Other keys pass through unchanged.
    #[must_use]
    pub fn column<'a>(&'a self, key: &'a str) -> Option<&'a str> {
        if key == MAIN_META_KEY {
            self.selected
                .first()
                .or_else(|| self.known.first())
                .map(String::as_str)
        } else {
            Some(key)
        }
    }

    /// Replace the selection when it differs, dropping unknown columns
    ///
    /// Returns whether the selection changed.
    pub fn select(&mut self, columns: &OrderedSet<String>) -> bool {
        let selected = columns.intersect(&self.known_set());
        if selected == self.selected {
            return false;
        }
        self.selected = selected;
        self.changed = true;
        true
    }

    /// Whether the selection differs from the startup selection
    #[inline]
    #[must_use]
    pub fn differs_from_initial(&self) -> bool {
        self.selected != self.initial
    }

    /// Whether a column holds numbers
    #[inline]
    #[must_use]
    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric.has(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> SprintMetaState {
        SprintMetaState::new(
            vec!["sprint_name".into(), "sprint_num".into(), "start_date".into()],
            OrderedSet::new(),
            OrderedSet::from(&["sprint_num", "sprint_id"][..]),
        )
    }

    #[test]
    fn default_window_matches_limit() {
        let sprints = SprintsState::new(5);
        assert_eq!(sprints.window(), SprintWindow::new(0, 0, 5));
        assert_eq!(sprints.window(), sprints.default_window());
    }

    #[test]
    fn recent_bound_uses_current_or_last() {
        let mut sprints = SprintsState::new(6);
        assert_eq!(sprints.recent_bound(), 6);
        sprints.current = 1;
        assert_eq!(sprints.recent_bound(), 1);
        sprints.set_window(SprintWindow::new(0, 0, -4));
        assert_eq!(sprints.recent_bound(), 0);
    }

    #[test]
    fn flags_require_upstream_support() {
        let mut sprints = SprintsState::new(5);
        assert!(!sprints.set_show_old(true));
        assert!(sprints.set_closed_only(true));

        sprints.has_old = true;
        sprints.has_closed = false;
        assert!(sprints.set_show_old(true));
        assert!(!sprints.set_closed_only(true));
        assert!(!sprints.closed_only);
    }

    #[test]
    fn main_column_falls_back_to_first_known() {
        let mut meta = meta();
        assert_eq!(meta.column("main"), Some("sprint_name"));
        meta.select(&OrderedSet::from(&["start_date"][..]));
        assert_eq!(meta.column("main"), Some("start_date"));
        assert_eq!(meta.column("sprint_num"), Some("sprint_num"));
    }

    #[test]
    fn select_reports_change_only_when_different() {
        let mut meta = meta();
        assert!(!meta.select(&OrderedSet::from(&["bogus"][..])));
        assert!(!meta.changed);

        assert!(meta.select(&OrderedSet::from(&["sprint_num", "sprint_name"][..])));
        assert!(meta.changed);
        assert!(meta.differs_from_initial());
        assert!(meta.is_numeric("sprint_num"));
        assert!(!meta.is_numeric("sprint_id"));
    }
}
