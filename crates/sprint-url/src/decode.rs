//! Navigation: applying a fragment to the state
//!
//! One hook per recognized key, dispatched by `match`. Hooks never fail:
//! unknown tokens are dropped and malformed values are rejected while the
//! prior state is kept. Everything skipped is listed in the returned
//! [`NavigationReport`].
//!
//! Recognized keys missing from the fragment are reset to their defaults,
//! so navigating back to a default-only link restores the default view.

use crate::error::DecodeError;
use crate::fragment::{Fragment, Segment};
use crate::key::{UrlKey, PROJECT_PREFIX, TEAM_PREFIX};
use serde::Serialize;
use sprint_state::{FeatureSelection, OrderedSet, SprintWindow, State};

/// What a navigation applied and what it skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavigationReport {
    /// Keys that were not recognized
    pub ignored_keys: Vec<String>,
    /// Project tokens not matching a known project
    pub dropped_projects: Vec<String>,
    /// Feature tokens not matching a selectable feature
    pub dropped_features: Vec<String>,
    /// Sprint metadata tokens not matching a known column
    pub dropped_meta: Vec<String>,
    /// Values rejected with the prior state kept
    pub rejected: Vec<DecodeError>,
    /// Keys whose segment was applied, in fragment order
    pub applied: Vec<UrlKey>,
}

impl NavigationReport {
    /// Whether nothing was skipped
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.ignored_keys.is_empty()
            && self.dropped_projects.is_empty()
            && self.dropped_features.is_empty()
            && self.dropped_meta.is_empty()
            && self.rejected.is_empty()
    }
}

/// Parse a fragment and apply it to the state
///
/// An empty fragment leaves the state untouched.
pub fn decode(state: &mut State, fragment: &str) -> NavigationReport {
    match Fragment::parse(fragment) {
        Ok(parsed) => navigate(state, &parsed),
        Err(error) => {
            tracing::debug!("Not navigating: {}", error);
            NavigationReport {
                rejected: vec![error],
                ..NavigationReport::default()
            }
        }
    }
}

/// Apply a parsed fragment to the state
pub fn navigate(state: &mut State, fragment: &Fragment) -> NavigationReport {
    let mut report = NavigationReport {
        ignored_keys: fragment.ignored.clone(),
        ..NavigationReport::default()
    };
    for key in &report.ignored_keys {
        tracing::warn!("Ignoring unknown fragment key: {}", key);
    }

    select_projects(state, &fragment.projects, &mut report);

    for segment in &fragment.segments {
        tracing::debug!("Applying segment {}: {:?}", segment.key, segment.values);
        apply_segment(state, segment, &mut report);
        report.applied.push(segment.key);
    }

    for key in UrlKey::OPTIONAL {
        if !fragment.contains(key) {
            reset_to_default(state, key);
        }
    }

    for error in &report.rejected {
        tracing::warn!("Rejected fragment value: {}", error);
    }
    report
}

fn apply_segment(state: &mut State, segment: &Segment, report: &mut NavigationReport) {
    let values = &segment.values;
    match segment.key {
        UrlKey::Project => {}
        UrlKey::Feature => select_features(state, values, report),
        UrlKey::Meta => select_meta(state, values, report),
        UrlKey::Format => select_format(state, values, report),
        UrlKey::Count => match parse_window(values) {
            Ok(window) => state.sprints.set_window(window),
            Err(error) => report.rejected.push(error),
        },
        UrlKey::Closed => {
            let closed = flag_value(values);
            if state.sprints.set_closed_only(closed) != closed {
                report.rejected.push(DecodeError::Unavailable(UrlKey::Closed));
            }
        }
        UrlKey::Old => {
            let old = flag_value(values);
            if state.sprints.set_show_old(old) != old {
                report.rejected.push(DecodeError::Unavailable(UrlKey::Old));
            }
        }
        UrlKey::Config => state.config = values.iter().cloned().collect(),
    }
}

fn reset_to_default(state: &mut State, key: UrlKey) {
    match key {
        UrlKey::Project => {}
        UrlKey::Feature => {
            let default = state.features.default_selection();
            state.features.apply_selection(&FeatureSelection::plain(default));
        }
        UrlKey::Meta => {
            let initial = state.sprint_meta.initial.clone();
            state.sprint_meta.select(&initial);
        }
        UrlKey::Format => {
            if state.formatter.reset() {
                tracing::debug!("Format reset to {}", state.formatter.selected);
            }
        }
        UrlKey::Count => {
            let window = state.sprints.default_window();
            state.sprints.set_window(window);
        }
        UrlKey::Closed => state.sprints.closed_only = false,
        UrlKey::Old => state.sprints.show_old = false,
        UrlKey::Config => state.config = OrderedSet::new(),
    }
}

/// Flag segments are on only for `1`
fn flag_value(values: &[String]) -> bool {
    values.first().is_some_and(|value| value == "1")
}

/// Expand group tokens, deduplicate and keep known projects
fn select_projects(state: &mut State, tokens: &[String], report: &mut NavigationReport) {
    let requested: OrderedSet<String> = tokens
        .iter()
        .flat_map(|token| state.projects.resolve_token(token))
        .collect();
    let dropped = requested.subtract(&state.projects.known_set());
    report.dropped_projects.extend(dropped);
    state.projects.select(&requested);
}

/// Feature selection from link tokens, stripping sourcing prefixes
///
/// `team~<name>` and `project~<name>` tag the feature; the order of the
/// tokens becomes the selection order.
#[must_use]
pub fn feature_selection(tokens: &[String]) -> FeatureSelection {
    let mut selected = Vec::with_capacity(tokens.len());
    let mut team = Vec::new();
    let mut project = Vec::new();

    for token in tokens {
        if let Some(name) = token.strip_prefix(TEAM_PREFIX) {
            team.push(name.to_string());
            selected.push(name.to_string());
        } else if let Some(name) = token.strip_prefix(PROJECT_PREFIX) {
            project.push(name.to_string());
            selected.push(name.to_string());
        } else {
            selected.push(token.clone());
        }
    }

    FeatureSelection {
        selected: selected.into(),
        team: team.into(),
        project: project.into(),
    }
}

fn select_features(state: &mut State, tokens: &[String], report: &mut NavigationReport) {
    let next = feature_selection(tokens);
    let dropped = next.selected.subtract(&state.features.selectable());
    report.dropped_features.extend(dropped);
    state.features.apply_selection(&next);
}

fn select_meta(state: &mut State, tokens: &[String], report: &mut NavigationReport) {
    let requested: OrderedSet<String> = tokens.iter().cloned().collect();
    let dropped = requested.subtract(&state.sprint_meta.known_set());
    report.dropped_meta.extend(dropped);
    state.sprint_meta.select(&requested);
}

fn select_format(state: &mut State, tokens: &[String], report: &mut NavigationReport) {
    let Some(name) = tokens.first() else {
        report.rejected.push(DecodeError::MissingValue(UrlKey::Format));
        return;
    };
    match state.formatter.select(name) {
        Ok(true) => tracing::debug!("Format changed to {}", name),
        Ok(false) => {}
        Err(error) => {
            tracing::debug!("Format not selected: {}", error);
            report.rejected.push(DecodeError::UnknownFormat(name.clone()));
        }
    }
}

/// Sprint window from one, two or three values
///
/// - `n`: `(0, 0, n)`
/// - `first, last`: `(first, max(0, first), last)`
/// - `first, current, last`: taken as is; extra values are ignored
///
/// # Errors
/// Rejects the whole segment when a value is not an integer or when there
/// are no values at all.
pub fn parse_window(values: &[String]) -> Result<SprintWindow, DecodeError> {
    let numbers = values
        .iter()
        .map(|value| parse_bound(value))
        .collect::<Result<Vec<_>, _>>()?;

    match numbers.as_slice() {
        [] => Err(DecodeError::MissingValue(UrlKey::Count)),
        [last] => Ok(SprintWindow::for_limit(*last)),
        [first, last] => Ok(SprintWindow::new(*first, (*first).max(0), *last)),
        [first, current, last, ..] => Ok(SprintWindow::new(*first, *current, *last)),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn parse_bound(value: &str) -> Result<i64, DecodeError> {
    if let Ok(number) = value.parse::<i64>() {
        return Ok(number);
    }
    match value.parse::<f64>() {
        // Integral values written in float notation, e.g. `5.0`
        Ok(number) if number.is_finite() && number.fract() == 0.0 && number.abs() < 9.0e15 => {
            Ok(number as i64)
        }
        _ => Err(DecodeError::InvalidCount(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sprint_test_utils::state;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[test]
    fn project_groups_expand_in_catalog_order() {
        let mut state = state();
        let report = decode(&mut state, "#project_~support&alpha&alpha");
        assert_eq!(
            state.projects.selected.to_vec(),
            vec!["support-x", "team-a", "hidden", "alpha"]
        );
        assert!(report.is_clean());
    }

    #[test]
    fn invisible_projects_are_selected_but_not_visible() {
        let mut state = state();
        decode(&mut state, "#project_hidden&team-a");
        assert_eq!(state.projects.selected.to_vec(), vec!["hidden", "team-a"]);
        assert_eq!(state.projects.visible.to_vec(), vec!["team-a"]);
    }

    #[test]
    fn unknown_projects_are_reported() {
        let mut state = state();
        let report = decode(&mut state, "#project_alpha&nope");
        assert_eq!(state.projects.selected.to_vec(), vec!["alpha"]);
        assert_eq!(report.dropped_projects, vec!["nope"]);
    }

    #[test]
    fn feature_hook_records_partition() {
        let mut state = state();
        let report = decode(&mut state, "#project_alpha|feature_project~bugs&team~done_points&velocity");
        assert_eq!(
            state.features.selected.to_vec(),
            vec!["bugs", "done_points", "velocity"]
        );
        assert_eq!(state.features.team.to_vec(), vec!["done_points"]);
        assert_eq!(state.features.project.to_vec(), vec!["bugs"]);
        assert!(state.features.changed);
        assert_eq!(report.applied, vec![UrlKey::Feature]);
    }

    #[test]
    fn meta_features_are_never_selected() {
        let mut state = state();
        let report = decode(&mut state, "#project_alpha|feature_sprint_num&bugs");
        assert_eq!(state.features.selected.to_vec(), vec!["bugs"]);
        assert_eq!(report.dropped_features, vec!["sprint_num"]);
    }

    #[test]
    fn meta_hook_sets_changed() {
        let mut state = state();
        let report = decode(&mut state, "#project_alpha|meta_start_date&bogus&sprint_num");
        assert_eq!(
            state.sprint_meta.selected.to_vec(),
            vec!["start_date", "sprint_num"]
        );
        assert!(state.sprint_meta.changed);
        assert_eq!(report.dropped_meta, vec!["bogus"]);
    }

    #[test]
    fn format_hook_rejects_unknown_names() {
        let mut state = state();
        decode(&mut state, "#project_alpha|format_line");
        assert_eq!(state.formatter.selected, "line");

        let report = decode(&mut state, "#project_alpha|format_pie");
        assert_eq!(state.formatter.selected, "line");
        assert_eq!(
            report.rejected,
            vec![DecodeError::UnknownFormat("pie".to_string())]
        );
    }

    #[test]
    fn invalid_count_keeps_prior_window() {
        let mut state = state();
        decode(&mut state, "#project_alpha|count_2&8");
        let report = decode(&mut state, "#project_alpha|count_2&x");
        assert_eq!(state.sprints.window(), SprintWindow::new(2, 2, 8));
        assert_eq!(
            report.rejected,
            vec![DecodeError::InvalidCount("x".to_string())]
        );
    }

    #[test]
    fn window_arity() {
        assert_eq!(parse_window(&strings(&["5"])), Ok(SprintWindow::new(0, 0, 5)));
        assert_eq!(parse_window(&strings(&["2", "8"])), Ok(SprintWindow::new(2, 2, 8)));
        assert_eq!(parse_window(&strings(&["-3", "8"])), Ok(SprintWindow::new(-3, 0, 8)));
        assert_eq!(
            parse_window(&strings(&["-3", "0", "10"])),
            Ok(SprintWindow::new(-3, 0, 10))
        );
        assert_eq!(parse_window(&strings(&["4.0"])), Ok(SprintWindow::new(0, 0, 4)));
        assert_eq!(
            parse_window(&[]),
            Err(DecodeError::MissingValue(UrlKey::Count))
        );
        assert_eq!(
            parse_window(&strings(&["1.5"])),
            Err(DecodeError::InvalidCount("1.5".to_string()))
        );
    }

    #[test]
    fn closed_and_config_hooks() {
        let mut state = state();
        decode(&mut state, "#project_alpha|closed_1|config_options&export");
        assert!(state.sprints.closed_only);
        assert_eq!(state.config.to_vec(), vec!["options", "export"]);

        decode(&mut state, "#project_alpha|closed_0");
        assert!(!state.sprints.closed_only);
        assert!(state.config.is_empty());
    }

    #[test]
    fn old_hook_needs_old_sprint_data() {
        let mut state = state();
        let report = decode(&mut state, "#project_alpha|old_1");
        assert!(state.sprints.show_old);
        assert!(report.is_clean());

        decode(&mut state, "#project_alpha");
        assert!(!state.sprints.show_old);

        state.sprints.has_old = false;
        let report = decode(&mut state, "#project_alpha|old_1");
        assert!(!state.sprints.show_old);
        assert_eq!(report.rejected, vec![DecodeError::Unavailable(UrlKey::Old)]);
    }

    #[test]
    fn closed_hook_needs_closed_state() {
        let mut state = state();
        state.sprints.has_closed = false;
        let report = decode(&mut state, "#project_alpha|closed_1");
        assert!(!state.sprints.closed_only);
        assert_eq!(report.rejected, vec![DecodeError::Unavailable(UrlKey::Closed)]);
    }

    #[test]
    fn absent_keys_reset_to_defaults() {
        let mut state = state();
        decode(
            &mut state,
            "#project_alpha|feature_bugs|meta_sprint_num|format_bar|count_1|closed_1|old_1",
        );
        decode(&mut state, "#project_beta");

        assert_eq!(state.projects.selected.to_vec(), vec!["beta"]);
        assert_eq!(state.features.selected.to_vec(), vec!["done_points", "velocity"]);
        assert!(state.sprint_meta.selected.is_empty());
        assert_eq!(state.formatter.selected, "table");
        assert_eq!(state.sprints.window(), state.sprints.default_window());
        assert!(!state.sprints.closed_only);
        assert!(!state.sprints.show_old);
    }

    #[test]
    fn empty_fragment_is_a_no_op() {
        let mut state = state();
        decode(&mut state, "#project_gamma|closed_1");
        let before = state.clone();

        let report = decode(&mut state, "#");
        assert_eq!(state, before);
        assert_eq!(report.rejected, vec![DecodeError::EmptyFragment]);
    }
}
