//! Dashboard state aggregate
//!
//! Constructed once from the startup [`Catalog`] and then mutated in place
//! by navigations. Never persisted except through links.

use crate::catalog::Catalog;
use crate::feature::FeaturesState;
use crate::format::FormatterState;
use crate::ordered_set::OrderedSet;
use crate::project::{ProjectGroup, ProjectsState};
use crate::sprint::{SprintMetaState, SprintWindow, SprintsState};
use serde::Serialize;

/// Sprint metadata columns holding numbers
pub const NUMERIC_META_COLUMNS: [&str; 2] = ["sprint_num", "sprint_id"];

/// Complete selection state of the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    /// Project selection
    pub projects: ProjectsState,
    /// Feature selection
    pub features: FeaturesState,
    /// Sprint window and filters
    pub sprints: SprintsState,
    /// Sprint metadata columns
    pub sprint_meta: SprintMetaState,
    /// Presentation format
    pub formatter: FormatterState,
    /// Visible UI toggles
    pub config: OrderedSet<String>,
}

impl State {
    /// Assemble state from its parts
    #[must_use]
    pub fn new(
        projects: ProjectsState,
        features: FeaturesState,
        sprints: SprintsState,
        sprint_meta: SprintMetaState,
        formatter: FormatterState,
    ) -> Self {
        Self {
            projects,
            features,
            sprints,
            sprint_meta,
            formatter,
            config: OrderedSet::new(),
        }
    }

    /// Construct the startup state from catalog metadata
    ///
    /// Selects the recent core projects and the default features, with the
    /// default sprint window and the first built-in format.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut projects = ProjectsState::new(catalog.projects.clone());
        let recent: OrderedSet<String> = projects.group(ProjectGroup::Recent).into();
        projects.select(&recent);

        let features = FeaturesState::new(
            catalog.features.all.clone().into(),
            catalog.features.default.clone().into(),
            catalog.features.meta.clone().into(),
            catalog.features.expressions.clone(),
            catalog.features.metrics.clone().into(),
        );

        let mut sprints = SprintsState::new(catalog.sprints.limit);
        sprints.has_closed = catalog.sprints.closed;
        sprints.has_old = catalog.sprints.old;

        let sprint_meta = SprintMetaState::new(
            catalog.features.meta.clone(),
            OrderedSet::new(),
            OrderedSet::from(&NUMERIC_META_COLUMNS[..]),
        );

        tracing::debug!(
            "Startup state: {} projects, {} features, sprint limit {}",
            projects.known.len(),
            features.known.len(),
            sprints.limit
        );

        Self::new(
            projects,
            features,
            sprints,
            sprint_meta,
            FormatterState::builtin(),
        )
    }

    /// Serializable snapshot of the selection
    #[must_use]
    pub fn summary(&self) -> StateSummary {
        StateSummary {
            projects: self.projects.selected.clone(),
            visible_projects: self.projects.visible.clone(),
            features: self.features.selected.clone(),
            team_features: self.features.team.clone(),
            project_features: self.features.project.clone(),
            visible_features: self.features.visible.clone(),
            sprint_meta: self.sprint_meta.selected.clone(),
            format: self.formatter.selected.clone(),
            window: self.sprints.window(),
            closed_only: self.sprints.closed_only,
            show_old: self.sprints.show_old,
            config: self.config.clone(),
        }
    }
}

/// Snapshot of the link-relevant parts of [`State`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSummary {
    /// Selected projects
    pub projects: OrderedSet<String>,
    /// Drawn projects
    pub visible_projects: OrderedSet<String>,
    /// Selected features
    pub features: OrderedSet<String>,
    /// Team-sourced features
    pub team_features: OrderedSet<String>,
    /// Project-sourced features
    pub project_features: OrderedSet<String>,
    /// Drawn features
    pub visible_features: OrderedSet<String>,
    /// Selected sprint metadata columns
    pub sprint_meta: OrderedSet<String>,
    /// Selected format
    pub format: String,
    /// Sprint window
    pub window: SprintWindow,
    /// Closed sprints only
    pub closed_only: bool,
    /// Old sprints included
    pub show_old: bool,
    /// Visible UI toggles
    pub config: OrderedSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FeatureCatalog, SprintCatalog};
    use crate::project::Project;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn catalog() -> Catalog {
        Catalog {
            projects: vec![
                Project::new("alpha").recent().core(),
                Project::new("beta").recent(),
                Project::new("gamma").recent().core(),
            ],
            features: FeatureCatalog {
                all: vec!["sprint_name".into(), "sprint_num".into(), "points".into()],
                default: vec!["sprint_name".into(), "points".into()],
                meta: vec!["sprint_name".into(), "sprint_num".into()],
                ..FeatureCatalog::default()
            },
            sprints: SprintCatalog {
                limit: 8,
                closed: true,
                old: true,
            },
            dictionaries: HashMap::new(),
            categories: serde_json::Value::Null,
            value_icons: serde_json::Value::Null,
            sources: serde_json::Value::Null,
        }
    }

    #[test]
    fn from_catalog_selects_defaults() {
        let state = State::from_catalog(&catalog());
        assert_eq!(state.projects.selected.to_vec(), vec!["alpha", "gamma"]);
        assert_eq!(state.features.selected.to_vec(), vec!["points"]);
        assert_eq!(state.sprints.window(), SprintWindow::new(0, 0, 8));
        assert!(state.sprints.has_old);
        assert_eq!(state.sprint_meta.known, vec!["sprint_name", "sprint_num"]);
        assert_eq!(state.sprint_meta.numeric.to_vec(), vec!["sprint_num"]);
        assert_eq!(state.formatter.selected, "table");
        assert!(state.config.is_empty());
    }

    #[test]
    fn summary_serializes() {
        let state = State::from_catalog(&catalog());
        let json = serde_json::to_value(state.summary()).unwrap();
        assert_eq!(json["projects"], serde_json::json!(["alpha", "gamma"]));
        assert_eq!(json["window"]["last"], 8);
        assert_eq!(json["format"], "table");
    }
}
