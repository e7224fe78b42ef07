//! Fragment encoding
//!
//! Produces `#project_<p1>&<p2>|key_<v1>&<v2>|...`. The project segment is
//! always present and always first. Every other segment is emitted only when
//! its effective value differs from the key's default, or when the patch
//! overrides the key.

use crate::key::{
    UrlKey, KEY_SEPARATOR, PROJECT_PREFIX, SEGMENT_SEPARATOR, TEAM_PREFIX, VALUE_SEPARATOR,
};
use crate::patch::SelectionPatch;
use sprint_state::{FeatureSelection, FeatureSource, State};

/// Encode state with pending changes into a fragment (including `#`)
#[must_use]
pub fn encode(state: &State, patch: &SelectionPatch) -> String {
    let projects = patch
        .project
        .as_ref()
        .unwrap_or(&state.projects.selected)
        .to_vec();

    let mut segments = vec![segment(UrlKey::Project, &projects)];

    for key in UrlKey::OPTIONAL {
        let (value, default) = effective_value(state, patch, key);
        if patch.contains(key) || value != default {
            segments.push(segment(key, &value));
        }
    }

    let separator = SEGMENT_SEPARATOR.to_string();
    format!("#{}", segments.join(&separator))
}

/// Feature values with sourcing prefixes, in selection order
///
/// A feature tagged team-only becomes `team~<name>`, project-only becomes
/// `project~<name>`; anything else stays bare.
#[must_use]
pub fn feature_tokens(selection: &FeatureSelection) -> Vec<String> {
    selection
        .selected
        .iter()
        .map(|feature| match selection.source(feature) {
            FeatureSource::Team => format!("{TEAM_PREFIX}{feature}"),
            FeatureSource::Project => format!("{PROJECT_PREFIX}{feature}"),
            FeatureSource::Visible => feature.clone(),
        })
        .collect()
}

/// Effective and default values of an optional key
fn effective_value(state: &State, patch: &SelectionPatch, key: UrlKey) -> (Vec<String>, Vec<String>) {
    match key {
        UrlKey::Feature => {
            let current = state.features.current_selection();
            let selection = patch.feature.as_ref().unwrap_or(&current);
            let effective = FeatureSelection {
                selected: selection.selected.subtract(&state.features.meta),
                team: selection.team.clone(),
                project: selection.project.clone(),
            };
            (
                feature_tokens(&effective),
                state.features.default_selection().to_vec(),
            )
        }
        UrlKey::Meta => {
            let selected = patch.meta.as_ref().unwrap_or(&state.sprint_meta.selected);
            // Default is the startup selection, not a fixed list
            (selected.to_vec(), state.sprint_meta.initial.to_vec())
        }
        UrlKey::Format => {
            let format = patch.format.as_ref().unwrap_or(&state.formatter.selected);
            (
                vec![format.clone()],
                vec![state.formatter.default_name().to_string()],
            )
        }
        UrlKey::Count => {
            let window = patch.count.unwrap_or_else(|| state.sprints.window());
            (
                numbers(window.values()),
                numbers(state.sprints.default_window().values()),
            )
        }
        UrlKey::Closed => {
            let closed = patch.closed.unwrap_or(state.sprints.closed_only);
            (vec![flag(closed)], vec![flag(false)])
        }
        UrlKey::Old => {
            let old = patch.old.unwrap_or(state.sprints.show_old);
            (vec![flag(old)], vec![flag(false)])
        }
        UrlKey::Config => {
            let toggles = patch.config.as_ref().unwrap_or(&state.config);
            (toggles.to_vec(), Vec::new())
        }
        UrlKey::Project => {
            let projects = patch.project.as_ref().unwrap_or(&state.projects.selected);
            (projects.to_vec(), Vec::new())
        }
    }
}

fn segment(key: UrlKey, values: &[String]) -> String {
    let separator = VALUE_SEPARATOR.to_string();
    format!("{}{}{}", key.name(), KEY_SEPARATOR, values.join(&separator))
}

fn numbers(values: [i64; 3]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}
