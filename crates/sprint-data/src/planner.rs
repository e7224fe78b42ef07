//! Request planning
//!
//! Decides which per-project resources a navigation needs. The plan is a
//! `(project, key)` grid in project-major order; responses are chunked back
//! per project in the same order.

use serde::{Serialize, Serializer};
use sprint_state::{OrderedSet, RequestConfig, State};
use std::fmt::{self, Display, Formatter};

/// Directory holding every resource, relative to the data root
pub const DATA_DIR: &str = "data";

/// Per-project resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    /// Recent sprints with the default features (`default.json`)
    Default,
    /// Recent sprints with one non-default feature
    Feature(String),
    /// Sprints older than the limit
    Old,
    /// Details of old sprints
    DetailsOld,
    /// Details of recent sprints
    Details,
    /// Details of one non-default feature
    FeatureDetails(String),
    /// Upstream source identifiers
    SourceIds,
    /// Targets of features with metrics
    MetricTargets,
    /// Links to upstream sources
    Links,
    /// Upstream source metadata
    Sources,
}

impl ResourceKey {
    /// Key as written in a plan (`""` for the default resource)
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Default => String::new(),
            Self::Feature(feature) => feature.clone(),
            Self::Old => "old".to_string(),
            Self::DetailsOld => "details.old".to_string(),
            Self::Details => "details".to_string(),
            Self::FeatureDetails(feature) => format!("details.{feature}"),
            Self::SourceIds => "source_ids".to_string(),
            Self::MetricTargets => "metric_targets".to_string(),
            Self::Links => "links".to_string(),
            Self::Sources => "sources".to_string(),
        }
    }

    /// File name stem under the project directory
    #[must_use]
    pub fn file_stem(&self) -> String {
        match self {
            Self::Default => "default".to_string(),
            other => other.key(),
        }
    }

    /// Whether the resource holds a list of sprint records
    #[inline]
    #[must_use]
    pub fn is_sprint_list(&self) -> bool {
        matches!(self, Self::Default | Self::Feature(_) | Self::Old)
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl Serialize for ResourceKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key())
    }
}

/// One fetch of a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestDescriptor {
    /// Project the resource belongs to
    pub project: String,
    /// Resource key
    pub key: ResourceKey,
    /// Path relative to the data root
    pub path: String,
}

/// Resources needed by a navigation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestPlan {
    /// Projects, in selection order
    pub projects: Vec<String>,
    /// Resource keys fetched for every project
    pub keys: Vec<ResourceKey>,
    /// Fetches, project-major
    pub requests: Vec<RequestDescriptor>,
    /// Selected features including attributes pulled in by formulas
    pub features: OrderedSet<String>,
    /// Whether metric targets are fetched
    pub has_metrics: bool,
}

impl RequestPlan {
    /// Number of fetches
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether the plan fetches nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Path of a project resource relative to the data root
#[must_use]
pub fn resource_path(project: &str, key: &ResourceKey) -> String {
    format!("{DATA_DIR}/{project}/{}.json", key.file_stem())
}

/// Plan the fetches for the current selection and a format's needs
#[must_use]
pub fn plan_requests(state: &State, config: RequestConfig) -> RequestPlan {
    let features = &state.features;
    let selected = if config.expressions {
        features.with_expression_attributes(&features.selected)
    } else {
        features.selected.clone()
    };
    let has_metrics = config.metrics && !selected.intersect(&features.metrics).is_empty();

    // Default resources already carry the default features and meta columns
    let extra = selected.subtract(&features.default.union(&features.meta));
    let show_old = state.sprints.show_old;

    let mut keys = vec![ResourceKey::Default];
    keys.extend(extra.iter().cloned().map(ResourceKey::Feature));
    if show_old {
        keys.push(ResourceKey::Old);
    }
    if config.details {
        if show_old {
            keys.push(ResourceKey::DetailsOld);
        }
        keys.push(ResourceKey::Details);
        keys.extend(extra.iter().cloned().map(ResourceKey::FeatureDetails));
    }
    if config.sources {
        keys.push(ResourceKey::SourceIds);
    }
    if has_metrics {
        keys.push(ResourceKey::MetricTargets);
    }
    if config.links {
        keys.push(ResourceKey::Links);
    }
    if config.sources {
        keys.push(ResourceKey::Sources);
    }

    let projects = state.projects.selected.to_vec();
    let requests: Vec<RequestDescriptor> = projects
        .iter()
        .flat_map(|project| {
            keys.iter().map(move |key| RequestDescriptor {
                project: project.clone(),
                key: key.clone(),
                path: resource_path(project, key),
            })
        })
        .collect();

    tracing::info!(
        "Planned {} requests: {} projects x {} resources",
        requests.len(),
        projects.len(),
        keys.len()
    );
    tracing::debug!("Resource keys: {:?}", keys.iter().map(ResourceKey::key).collect::<Vec<_>>());

    RequestPlan {
        projects,
        keys,
        requests,
        features: selected,
        has_metrics,
    }
}
