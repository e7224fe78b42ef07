//! Testing utilities for the sprint report workspace
//!
//! Shared catalog, state and sprint record fixtures.

#![allow(missing_docs)]

use serde_json::{json, Value};
use sprint_state::{
    Catalog, CatalogDocument, Expression, FeatureCatalog, Project, SprintCatalog, State,
    TeamMarker,
};
use std::collections::HashMap;

pub const SPRINT_LIMIT: i64 = 5;

pub fn projects() -> Vec<Project> {
    vec![
        Project::new("alpha").recent().core(),
        Project::new("beta").recent().core(),
        Project::new("gamma").core(),
        Project::new("support-x").recent(),
        Project::new("team-a")
            .recent()
            .with_team(TeamMarker::Id(1))
            .with_project_names(&["alpha", "beta"]),
        Project::new("hidden")
            .recent()
            .with_team(TeamMarker::Id(TeamMarker::INVISIBLE)),
    ]
}

pub fn features() -> FeatureCatalog {
    let mut features = FeatureCatalog {
        all: strings(&[
            "sprint_name",
            "sprint_num",
            "start_date",
            "done_points",
            "total_points",
            "velocity",
            "bugs",
            "backlog_points",
        ]),
        default: strings(&["sprint_name", "done_points", "velocity"]),
        meta: strings(&["sprint_name", "sprint_num", "start_date"]),
        metrics: strings(&["velocity", "bugs"]),
        ..FeatureCatalog::default()
    };
    features.expressions.insert(
        "velocity".to_string(),
        Expression::new(
            "done_points / total_points",
            &["done_points", "total_points"],
        ),
    );
    features
}

pub fn catalog() -> Catalog {
    Catalog {
        projects: projects(),
        features: features(),
        sprints: SprintCatalog {
            limit: SPRINT_LIMIT,
            closed: true,
            old: true,
        },
        dictionaries: HashMap::new(),
        categories: Value::Null,
        value_icons: Value::Null,
        sources: Value::Null,
    }
}

/// Startup state: projects `alpha`, `beta`; features `done_points`, `velocity`
pub fn state() -> State {
    State::from_catalog(&catalog())
}

/// Catalog documents as served under the data root
pub fn catalog_documents() -> HashMap<CatalogDocument, Value> {
    let mut documents = HashMap::new();
    documents.insert(
        CatalogDocument::Projects,
        serde_json::to_value(projects()).unwrap_or(Value::Null),
    );
    documents.insert(
        CatalogDocument::Features,
        serde_json::to_value(features()).unwrap_or(Value::Null),
    );
    documents.insert(
        CatalogDocument::Sprints,
        json!({"limit": SPRINT_LIMIT, "closed": true, "old": true}),
    );
    documents.insert(
        CatalogDocument::ShortUnits,
        json!({
            "done_points": {"en": "done", "nl": "klaar"},
            "total_points": {"en": "total"}
        }),
    );
    documents.insert(
        CatalogDocument::Descriptions,
        json!({"velocity": {"en": "Velocity"}}),
    );
    documents.insert(CatalogDocument::LongDescriptions, json!({}));
    documents.insert(CatalogDocument::Categories, json!([]));
    documents.insert(CatalogDocument::ValueIcons, json!({}));
    documents.insert(CatalogDocument::Sources, json!({}));
    documents
}

/// Sprint records, most recent first
///
/// Sprint `i` (0-based from the most recent) has `done_points = 10 + i`,
/// `total_points = 20` and is closed unless it is the most recent one.
pub fn sprint_records(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "sprint_name": format!("Sprint {}", count - i),
                "sprint_num": count - i,
                "start_date": format!("2024-01-{:02}", count - i),
                "sprint_is_closed": i != 0,
                "done_points": 10 + i,
                "total_points": 20,
            })
        })
        .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}
