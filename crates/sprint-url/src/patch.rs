//! Pending selection changes for link building
//!
//! A [`SelectionPatch`] carries target values for some keys. Any key present
//! in a patch is always emitted, even when its value equals the default, so
//! that re-clicking a control produces a stable link.

use crate::key::UrlKey;
use sprint_state::{FeatureSelection, OrderedSet, SprintWindow};

/// Target values overriding the current state when encoding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionPatch {
    /// Selected projects
    pub project: Option<OrderedSet<String>>,
    /// Feature selection with sourcing partition
    pub feature: Option<FeatureSelection>,
    /// Sprint metadata columns
    pub meta: Option<OrderedSet<String>>,
    /// Format name
    pub format: Option<String>,
    /// Sprint window
    pub count: Option<SprintWindow>,
    /// Closed sprints only
    pub closed: Option<bool>,
    /// Include old sprints
    pub old: Option<bool>,
    /// Visible UI toggles
    pub config: Option<OrderedSet<String>>,
}

impl SelectionPatch {
    /// Empty patch (encode the state as is)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With selected projects
    #[must_use]
    pub fn with_projects(mut self, projects: OrderedSet<String>) -> Self {
        self.project = Some(projects);
        self
    }

    /// With a feature selection
    #[must_use]
    pub fn with_features(mut self, features: FeatureSelection) -> Self {
        self.feature = Some(features);
        self
    }

    /// With plain selected features (no sourcing tags)
    #[must_use]
    pub fn with_selected_features(self, features: OrderedSet<String>) -> Self {
        self.with_features(FeatureSelection::plain(features))
    }

    /// With sprint metadata columns
    #[must_use]
    pub fn with_meta(mut self, columns: OrderedSet<String>) -> Self {
        self.meta = Some(columns);
        self
    }

    /// With format name
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// With sprint window
    #[must_use]
    pub fn with_count(mut self, window: SprintWindow) -> Self {
        self.count = Some(window);
        self
    }

    /// With closed-only flag
    #[must_use]
    pub fn with_closed(mut self, closed: bool) -> Self {
        self.closed = Some(closed);
        self
    }

    /// With old-sprints flag
    #[must_use]
    pub fn with_old(mut self, old: bool) -> Self {
        self.old = Some(old);
        self
    }

    /// With visible UI toggles
    #[must_use]
    pub fn with_config(mut self, toggles: OrderedSet<String>) -> Self {
        self.config = Some(toggles);
        self
    }

    /// Whether the patch overrides a key
    #[must_use]
    pub fn contains(&self, key: UrlKey) -> bool {
        match key {
            UrlKey::Project => self.project.is_some(),
            UrlKey::Feature => self.feature.is_some(),
            UrlKey::Meta => self.meta.is_some(),
            UrlKey::Format => self.format.is_some(),
            UrlKey::Count => self.count.is_some(),
            UrlKey::Closed => self.closed.is_some(),
            UrlKey::Old => self.old.is_some(),
            UrlKey::Config => self.config.is_some(),
        }
    }

    /// Whether the patch overrides nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [UrlKey::Project]
            .into_iter()
            .chain(UrlKey::OPTIONAL)
            .all(|key| !self.contains(key))
    }
}
