//! Feature catalog and feature selection
//!
//! A feature is a named per-sprint metric. The selection keeps three
//! sub-sets next to the ordered `selected` set:
//! - `team` / `project`: which sub-source a feature's value is drawn from
//! - `visible`: which selected features are actually drawn

use crate::ordered_set::OrderedSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Formula of a derived feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    /// Formula over attribute names, e.g. `done_points / total_points`
    pub expression: String,
    /// Attribute names referenced by the formula
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl Expression {
    /// Create expression
    #[must_use]
    pub fn new(expression: impl Into<String>, attributes: &[&str]) -> Self {
        Self {
            expression: expression.into(),
            attributes: attributes.iter().map(|name| (*name).to_string()).collect(),
        }
    }
}

/// Where a selected feature's value is sourced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSource {
    /// Whatever the project itself reports
    Visible,
    /// Team-level value
    Team,
    /// Project-level value
    Project,
}

/// A feature selection with its sub-source partition
///
/// Used both as the state's current selection and as a pending selection
/// patch when building links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSelection {
    /// Selected features, in display order
    pub selected: OrderedSet<String>,
    /// Features drawn from the team-level source
    #[serde(default)]
    pub team: OrderedSet<String>,
    /// Features drawn from the project-level source
    #[serde(default)]
    pub project: OrderedSet<String>,
}

impl FeatureSelection {
    /// Selection without any sub-source tags
    #[must_use]
    pub fn plain(selected: OrderedSet<String>) -> Self {
        Self {
            selected,
            team: OrderedSet::new(),
            project: OrderedSet::new(),
        }
    }

    /// Sourcing tag of a feature within this selection
    ///
    /// A feature tagged as both team and project falls back to visible.
    #[must_use]
    pub fn source(&self, feature: &str) -> FeatureSource {
        match (self.team.has(feature), self.project.has(feature)) {
            (true, false) => FeatureSource::Team,
            (false, true) => FeatureSource::Project,
            _ => FeatureSource::Visible,
        }
    }
}

/// Feature selection state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturesState {
    /// All known features
    pub known: OrderedSet<String>,
    /// Features selected on a fresh start
    pub default: OrderedSet<String>,
    /// Non-data columns (never part of a selection)
    pub meta: OrderedSet<String>,
    /// Derived feature formulas
    pub expressions: IndexMap<String, Expression>,
    /// Features with metric targets
    pub metrics: OrderedSet<String>,
    /// Selected features, in display order
    pub selected: OrderedSet<String>,
    /// Selected features drawn from the team-level source
    pub team: OrderedSet<String>,
    /// Selected features drawn from the project-level source
    pub project: OrderedSet<String>,
    /// Selected features that are drawn
    pub visible: OrderedSet<String>,
    /// Team/project partition differs from the untagged default
    pub changed: bool,
}

impl FeaturesState {
    /// Create state with the default selection
    #[must_use]
    pub fn new(
        known: OrderedSet<String>,
        default: OrderedSet<String>,
        meta: OrderedSet<String>,
        expressions: IndexMap<String, Expression>,
        metrics: OrderedSet<String>,
    ) -> Self {
        let selected = default.subtract(&meta).intersect(&known);
        Self {
            known,
            default,
            meta,
            expressions,
            metrics,
            visible: selected.clone(),
            selected,
            team: OrderedSet::new(),
            project: OrderedSet::new(),
            changed: false,
        }
    }

    /// Features that can be part of a selection
    #[must_use]
    pub fn selectable(&self) -> OrderedSet<String> {
        self.known.subtract(&self.meta)
    }

    /// Default selection without meta or unknown features
    #[must_use]
    pub fn default_selection(&self) -> OrderedSet<String> {
        self.default.subtract(&self.meta).intersect(&self.known)
    }

    /// Current selection with its partition
    #[must_use]
    pub fn current_selection(&self) -> FeatureSelection {
        FeatureSelection {
            selected: self.selected.clone(),
            team: self.team.clone(),
            project: self.project.clone(),
        }
    }

    /// Sourcing tag of a selected feature
    #[must_use]
    pub fn source(&self, feature: &str) -> FeatureSource {
        self.current_selection().source(feature)
    }

    /// Formula of a derived feature
    #[must_use]
    pub fn expression(&self, feature: &str) -> Option<&Expression> {
        self.expressions.get(feature)
    }

    /// Replace the selection
    ///
    /// Unknown and meta features are dropped; the order of `next.selected`
    /// becomes the display order. When every previously selected feature was
    /// visible, the new selection is entirely visible. Otherwise the
    /// added/removed deltas are applied to the visible set so that hidden
    /// features stay hidden.
    pub fn apply_selection(&mut self, next: &FeatureSelection) {
        let selected = next.selected.intersect(&self.selectable());
        let previous = std::mem::replace(&mut self.selected, selected);

        if self.visible.same_members(&previous) {
            self.visible = self.selected.clone();
        } else {
            let added = self.selected.subtract(&previous);
            let removed = previous.subtract(&self.selected);
            let visible = self.visible.subtract(&removed).union(&added);
            self.visible = self.selected.intersect(&visible);
        }

        self.team = next.team.intersect(&self.selected);
        self.project = next.project.intersect(&self.selected);
        self.changed = !self.team.is_empty() || !self.project.is_empty();
    }

    /// Set which selected features are drawn
    pub fn set_visible(&mut self, visible: &OrderedSet<String>) {
        self.visible = self.selected.intersect(visible);
    }

    /// Selected features plus every attribute their expressions reference
    #[must_use]
    pub fn with_expression_attributes(&self, features: &OrderedSet<String>) -> OrderedSet<String> {
        let attributes: OrderedSet<String> = features
            .iter()
            .filter_map(|feature| self.expressions.get(feature))
            .flat_map(|expression| expression.attributes.iter().cloned())
            .collect();
        features.union(&attributes.intersect(&self.known))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[&str]) -> OrderedSet<String> {
        OrderedSet::from(values)
    }

    fn state() -> FeaturesState {
        let mut expressions = IndexMap::new();
        expressions.insert(
            "velocity".to_string(),
            Expression::new("done_points / sprint_days", &["done_points", "sprint_days"]),
        );
        FeaturesState::new(
            set(&["sprint_name", "done_points", "sprint_days", "velocity", "bugs"]),
            set(&["sprint_name", "done_points", "velocity"]),
            set(&["sprint_name"]),
            expressions,
            set(&["velocity"]),
        )
    }

    #[test]
    fn new_selects_default_without_meta() {
        let state = state();
        assert_eq!(state.selected.to_vec(), vec!["done_points", "velocity"]);
        assert_eq!(state.visible, state.selected);
        assert!(!state.changed);
    }

    #[test]
    fn default_selection_skips_unknown_features() {
        let state = FeaturesState::new(
            set(&["sprint_name", "done_points"]),
            set(&["sprint_name", "retired", "done_points"]),
            set(&["sprint_name"]),
            IndexMap::new(),
            OrderedSet::new(),
        );
        assert_eq!(state.default_selection().to_vec(), vec!["done_points"]);
        assert_eq!(state.default_selection(), state.selected);
    }

    #[test]
    fn apply_selection_resets_visible_when_all_were_visible() {
        let mut state = state();
        state.apply_selection(&FeatureSelection::plain(set(&["bugs", "done_points"])));
        assert_eq!(state.selected.to_vec(), vec!["bugs", "done_points"]);
        assert_eq!(state.visible.to_vec(), vec!["bugs", "done_points"]);
    }

    #[test]
    fn apply_selection_keeps_hidden_features_hidden() {
        let mut state = state();
        state.set_visible(&set(&["done_points"]));

        state.apply_selection(&FeatureSelection::plain(set(&["done_points", "velocity", "bugs"])));
        // velocity stays hidden, bugs is new and therefore visible
        assert_eq!(state.visible.to_vec(), vec!["done_points", "bugs"]);

        state.apply_selection(&FeatureSelection::plain(set(&["velocity", "bugs"])));
        assert_eq!(state.visible.to_vec(), vec!["bugs"]);
    }

    #[test]
    fn apply_selection_drops_unknown_and_meta() {
        let mut state = state();
        state.apply_selection(&FeatureSelection::plain(set(&["sprint_name", "nope", "bugs"])));
        assert_eq!(state.selected.to_vec(), vec!["bugs"]);
    }

    #[test]
    fn apply_selection_records_partition() {
        let mut state = state();
        state.apply_selection(&FeatureSelection {
            selected: set(&["bugs", "velocity"]),
            team: set(&["bugs", "missing"]),
            project: OrderedSet::new(),
        });
        assert_eq!(state.team.to_vec(), vec!["bugs"]);
        assert_eq!(state.source("bugs"), FeatureSource::Team);
        assert_eq!(state.source("velocity"), FeatureSource::Visible);
        assert!(state.changed);

        state.apply_selection(&FeatureSelection::plain(set(&["bugs"])));
        assert!(!state.changed);
    }

    #[test]
    fn tagged_both_ways_is_visible_sourced() {
        let selection = FeatureSelection {
            selected: set(&["a"]),
            team: set(&["a"]),
            project: set(&["a"]),
        };
        assert_eq!(selection.source("a"), FeatureSource::Visible);
    }

    #[test]
    fn expression_attributes_are_pulled_in() {
        let state = state();
        let expanded = state.with_expression_attributes(&set(&["velocity", "bugs"]));
        assert_eq!(
            expanded.to_vec(),
            vec!["velocity", "bugs", "done_points", "sprint_days"]
        );
    }
}
