//! Per-project assembly and shaping
//!
//! Responses of a plan are chunked back per project and merged into one
//! [`ProjectData`]: sprint records (newest first) plus keyed resources.
//! [`shape_project`] then runs the pipeline for the active format.

use crate::error::ShapeError;
use crate::pipeline::{
    filter_sprints, get_assignment, order_sprints, sprints_to_features, FeatureDescriptor,
    FeatureSeries, SeriesConfig,
};
use crate::planner::{RequestPlan, ResourceKey};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use sprint_state::{Formatter, Locales, State};

/// Merged resources of one project
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectData {
    /// Project name
    pub project: String,
    /// Sprint records, most recent first; old sprints follow recent ones
    pub sprints: Vec<Value>,
    /// Sprint details, recent and old, with per-feature details merged in
    pub details: Map<String, Value>,
    /// Targets per feature
    pub metric_targets: Map<String, Value>,
    /// Links to upstream sources
    pub links: Map<String, Value>,
    /// Upstream source identifiers
    pub source_ids: Map<String, Value>,
    /// Upstream source metadata
    pub sources: Map<String, Value>,
}

/// Chunk plan responses per project and merge them
///
/// `responses` holds the `data` member of every response, in plan order.
///
/// # Errors
/// - `ShapeError::ResponseCount` if the responses do not match the plan
/// - `ShapeError::NotSprintList` if a sprint resource is not a list
pub fn assemble_projects(
    plan: &RequestPlan,
    responses: Vec<Value>,
) -> Result<Vec<ProjectData>, ShapeError> {
    if responses.len() != plan.requests.len() {
        return Err(ShapeError::ResponseCount {
            expected: plan.requests.len(),
            actual: responses.len(),
        });
    }

    let mut responses = responses.into_iter();
    let mut projects = Vec::with_capacity(plan.projects.len());
    for project in &plan.projects {
        let mut data = ProjectData {
            project: project.clone(),
            ..ProjectData::default()
        };
        let mut old = Vec::new();

        for key in &plan.keys {
            let Some(response) = responses.next() else {
                break;
            };
            match key {
                ResourceKey::Default => data.sprints = sprint_list(project, key, response)?,
                ResourceKey::Feature(_) => {
                    merge_by_index(&mut data.sprints, sprint_list(project, key, response)?);
                }
                ResourceKey::Old => old = sprint_list(project, key, response)?,
                ResourceKey::Details | ResourceKey::DetailsOld | ResourceKey::FeatureDetails(_) => {
                    merge_into(&mut data.details, response);
                }
                ResourceKey::SourceIds => merge_into(&mut data.source_ids, response),
                ResourceKey::MetricTargets => merge_into(&mut data.metric_targets, response),
                ResourceKey::Links => merge_into(&mut data.links, response),
                ResourceKey::Sources => merge_into(&mut data.sources, response),
            }
        }

        data.sprints.extend(old);
        tracing::debug!(
            "Assembled {}: {} sprints, {} detail entries",
            project,
            data.sprints.len(),
            data.details.len()
        );
        projects.push(data);
    }
    Ok(projects)
}

/// Shaped data of one project for the active format
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectReport {
    /// Project name
    pub project: String,
    /// Name shown to the viewer
    pub display_name: String,
    /// Whether the project is drawn
    pub visible: bool,
    /// Selected sprint metadata columns (the main column if none), with
    /// per-sprint values
    pub sprint_meta: IndexMap<String, Vec<Value>>,
    /// Sprint metadata columns holding numbers
    pub numeric_meta: Vec<String>,
    /// One series per selected feature
    pub series: Vec<FeatureSeries>,
    /// Human-readable formulas of selected derived features
    pub assignments: IndexMap<String, String>,
    /// Links to upstream sources
    pub links: Map<String, Value>,
}

/// Run the pipeline over one project's data
///
/// # Errors
/// Returns `ShapeError` if the series cannot be built.
pub fn shape_project(
    state: &State,
    formatter: &dyn Formatter,
    data: &ProjectData,
    locales: &Locales,
    placeholder: &str,
) -> Result<ProjectReport, ShapeError> {
    let records = filter_sprints(&state.sprints, data.sprints.clone());
    let records = order_sprints(records, formatter.sprint_order());

    let features = &state.features;
    let descriptors: Vec<FeatureDescriptor> =
        features.selected.iter().cloned().map(FeatureDescriptor::from).collect();
    let series = sprints_to_features(
        &records,
        &descriptors,
        Some(&features.visible),
        SeriesConfig::for_formatter(formatter),
        Some(&data.metric_targets),
    )?;

    let assignments = features
        .selected
        .iter()
        .filter_map(|feature| {
            get_assignment(feature, features, locales, placeholder, None, None)
                .map(|assignment| (feature.clone(), assignment))
        })
        .collect();

    let columns: Vec<String> = if state.sprint_meta.selected.is_empty() {
        state
            .sprint_meta
            .column(sprint_state::MAIN_META_KEY)
            .map(str::to_string)
            .into_iter()
            .collect()
    } else {
        state.sprint_meta.selected.to_vec()
    };
    let numeric_meta = columns
        .iter()
        .filter(|column| state.sprint_meta.is_numeric(column))
        .cloned()
        .collect();
    let sprint_meta = columns
        .into_iter()
        .map(|column| {
            let values = records
                .iter()
                .map(|record| record.get(&column).cloned().unwrap_or(Value::Null))
                .collect();
            (column, values)
        })
        .collect();

    let project = state.projects.project(&data.project);
    Ok(ProjectReport {
        project: data.project.clone(),
        display_name: project.map_or_else(|| data.project.clone(), |p| p.display_name().to_string()),
        visible: state.projects.visible.has(data.project.as_str()),
        sprint_meta,
        numeric_meta,
        series,
        assignments,
        links: data.links.clone(),
    })
}

fn sprint_list(project: &str, key: &ResourceKey, response: Value) -> Result<Vec<Value>, ShapeError> {
    match response {
        Value::Array(records) => Ok(records),
        _ => Err(ShapeError::NotSprintList {
            project: project.to_string(),
            key: key.key(),
        }),
    }
}

/// Merge per-sprint members of `extra` into the record at the same index
fn merge_by_index(records: &mut [Value], extra: Vec<Value>) {
    for (record, extra) in records.iter_mut().zip(extra) {
        if let (Value::Object(record), Value::Object(extra)) = (record, extra) {
            record.extend(extra);
        }
    }
}

/// Deep-merge an object response into a keyed map; non-objects are ignored
fn merge_into(target: &mut Map<String, Value>, response: Value) {
    if let Value::Object(source) = response {
        merge_objects(target, source);
    }
}

fn merge_objects(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match value {
            Value::Object(incoming) => {
                if let Some(Value::Object(existing)) = target.get_mut(&key) {
                    merge_objects(existing, incoming);
                } else {
                    target.insert(key, Value::Object(incoming));
                }
            }
            other => {
                target.insert(key, other);
            }
        }
    }
}
