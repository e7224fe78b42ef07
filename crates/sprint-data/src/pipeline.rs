//! Sprint data shaping
//!
//! Turns per-sprint records into per-feature series ready for a format:
//! - [`filter_sprints`]: closed-only and old-sprint filtering
//! - [`unwrap_feature`]: summary values reduced to their maximum
//! - [`sprints_to_features`]: one series per feature, with stacking baselines
//! - [`get_assignment`]: human-readable formulas of derived features
//!
//! Records are JSON objects, one per sprint, keyed by feature name.

use crate::error::ShapeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sprint_state::{
    Formatter, FeaturesState, Locales, OrderedSet, SprintMetaState, SprintOrder, SprintsState,
};

/// One sprint's values, keyed by feature name
pub type SprintRecord = Map<String, Value>;

/// Record member telling whether a sprint is closed
pub const CLOSED_FIELD: &str = "sprint_is_closed";

/// Record member holding a sprint's start date
pub const START_DATE_FIELD: &str = "start_date";

/// Missing value marker used upstream
pub const NOT_AVAILABLE: &str = "NA";

/// Attribute dictionaries tried, in order, for formula labels
pub const LABEL_NAMESPACES: [&str; 2] = ["short_units", "descriptions"];

/// Keep closed sprints if requested, then drop old sprints unless shown
///
/// Order is preserved. When old sprints are hidden, only the first
/// [`SprintsState::recent_bound`] entries remain.
#[must_use]
pub fn filter_sprints(sprints: &SprintsState, records: Vec<Value>) -> Vec<Value> {
    let mut records: Vec<Value> = if sprints.closed_only {
        records
            .into_iter()
            .filter(|record| record.get(CLOSED_FIELD).is_some_and(is_truthy))
            .collect()
    } else {
        records
    };

    if !sprints.show_old {
        records.truncate(sprints.recent_bound());
    }
    records
}

/// Put newest-first records in the order a format expects
#[must_use]
pub fn order_sprints(mut records: Vec<Value>, order: SprintOrder) -> Vec<Value> {
    if order == SprintOrder::Ascending {
        records.reverse();
    }
    records
}

/// Reduce summary values: objects become their `max`, `"NA"` becomes null
#[must_use]
pub fn unwrap_feature(values: &[Value]) -> Vec<Value> {
    values
        .iter()
        .map(|value| match value {
            Value::Object(summary) => summary.get("max").cloned().unwrap_or(Value::Null),
            Value::String(text) if text == NOT_AVAILABLE => Value::Null,
            other => other.clone(),
        })
        .collect()
}

/// Feature entry of a series request
///
/// Serialized as either `"name"` or `["name", index]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureDescriptor {
    /// Independently drawn feature
    Plain(String),
    /// Feature drawn on top of the entry at the given index
    Stacked(String, usize),
}

impl FeatureDescriptor {
    /// Feature name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Plain(name) | Self::Stacked(name, _) => name,
        }
    }
}

impl From<&str> for FeatureDescriptor {
    fn from(name: &str) -> Self {
        Self::Plain(name.to_string())
    }
}

impl From<String> for FeatureDescriptor {
    fn from(name: String) -> Self {
        Self::Plain(name)
    }
}

/// Series shaping options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeriesConfig {
    /// Apply [`unwrap_feature`] to every series
    pub unwrap: bool,
}

impl SeriesConfig {
    /// Options a format asks for
    #[must_use]
    pub fn for_formatter(formatter: &dyn Formatter) -> Self {
        Self {
            unwrap: formatter.unwrap_values(),
        }
    }
}

/// Per-feature series handed to a format
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSeries {
    /// Feature name
    pub feature_key: String,
    /// Color slot: count of independently drawn visible series before this one
    pub visible_index: usize,
    /// Series this one is drawn with (itself unless stacked)
    pub visible_key: String,
    /// Per-sprint baseline for stacked series
    pub stack: Option<Vec<f64>>,
    /// Targets for this feature
    pub metric_targets: Option<Value>,
    /// Per-sprint start dates
    pub start_date: Vec<Value>,
    /// Per-sprint values
    pub sprints: Vec<Value>,
}

/// Expand sprint records into one series per requested feature
///
/// Stacked entries take the index and key of the entry they stack onto and
/// get a baseline of that entry's values plus its own baseline. Without a
/// `visible` set every feature counts as visible.
///
/// # Errors
/// Returns [`ShapeError::InvalidStack`] when a stacked entry refers to
/// itself or to a later or missing entry.
pub fn sprints_to_features(
    records: &[Value],
    features: &[FeatureDescriptor],
    visible: Option<&OrderedSet<String>>,
    config: SeriesConfig,
    metric_targets: Option<&Map<String, Value>>,
) -> Result<Vec<FeatureSeries>, ShapeError> {
    let start_date: Vec<Value> = records
        .iter()
        .map(|record| record.get(START_DATE_FIELD).cloned().unwrap_or(Value::Null))
        .collect();

    let mut series: Vec<FeatureSeries> = Vec::with_capacity(features.len());
    let mut visible_count = 0;

    for (position, descriptor) in features.iter().enumerate() {
        let name = descriptor.name();
        let raw: Vec<Value> = records
            .iter()
            .map(|record| record.get(name).cloned().unwrap_or(Value::Null))
            .collect();
        let values = if config.unwrap { unwrap_feature(&raw) } else { raw };

        let (visible_index, visible_key, stack) = match descriptor {
            FeatureDescriptor::Plain(_) => {
                let index = visible_count;
                if visible.map_or(true, |visible| visible.has(name)) {
                    visible_count += 1;
                }
                (index, name.to_string(), None)
            }
            FeatureDescriptor::Stacked(_, onto) => {
                let base = series
                    .get(*onto)
                    .filter(|_| *onto < position)
                    .ok_or_else(|| ShapeError::InvalidStack {
                        feature: name.to_string(),
                        onto: *onto,
                    })?;
                (
                    base.visible_index,
                    base.feature_key.clone(),
                    Some(baseline(base)),
                )
            }
        };

        series.push(FeatureSeries {
            feature_key: name.to_string(),
            visible_index,
            visible_key,
            stack,
            metric_targets: metric_targets.and_then(|targets| targets.get(name).cloned()),
            start_date: start_date.clone(),
            sprints: values,
        });
    }

    Ok(series)
}

/// Values of a layer on top of its own baseline
fn baseline(layer: &FeatureSeries) -> Vec<f64> {
    layer
        .sprints
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let below = layer
                .stack
                .as_ref()
                .and_then(|stack| stack.get(index))
                .copied()
                .unwrap_or(0.0);
            numeric(value) + below
        })
        .collect()
}

/// Human-readable formula of a derived feature
///
/// Each attribute of the formula is replaced by its value from `values`
/// (formatted through `formatter` when it has a unit notation) or, without
/// a value, by its localized short label. Labels fall back through
/// [`LABEL_NAMESPACES`] and then to `placeholder`. Only whole identifiers
/// are replaced. Returns `None` for features without a formula.
#[must_use]
pub fn get_assignment(
    feature: &str,
    features: &FeaturesState,
    locales: &Locales,
    placeholder: &str,
    values: Option<&SprintRecord>,
    formatter: Option<&dyn Formatter>,
) -> Option<String> {
    let expression = features.expression(feature)?;

    let label = |attribute: &str| {
        LABEL_NAMESPACES
            .iter()
            .find_map(|namespace| locales.attribute(namespace, attribute))
            .unwrap_or_else(|| placeholder.to_string())
    };
    let value = |attribute: &str| {
        let value = values?.get(attribute).filter(|value| !value.is_null())?;
        Some(
            formatter
                .and_then(|formatter| formatter.format_unit(attribute, value))
                .unwrap_or_else(|| plain(value)),
        )
    };

    Some(substitute(&expression.expression, |token| {
        expression
            .attributes
            .iter()
            .any(|attribute| attribute == token)
            .then(|| value(token).unwrap_or_else(|| label(token)))
    }))
}

/// Resolve a sprint metadata column key (`"main"` or a column name)
#[must_use]
pub fn get_sprint_meta<'a>(sprint_meta: &'a SprintMetaState, key: &'a str) -> Option<&'a str> {
    sprint_meta.column(key)
}

/// Replace whole identifier tokens of `text`
fn substitute(text: &str, mut replace: impl FnMut(&str) -> Option<String>) -> String {
    let mut output = String::with_capacity(text.len());
    let mut token = String::new();

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            token.push(ch);
            continue;
        }
        flush(&mut output, &mut token, &mut replace);
        output.push(ch);
    }
    flush(&mut output, &mut token, &mut replace);
    output
}

fn flush(output: &mut String, token: &mut String, replace: &mut impl FnMut(&str) -> Option<String>) {
    if token.is_empty() {
        return;
    }
    match replace(token) {
        Some(replacement) => output.push_str(&replacement),
        None => output.push_str(token),
    }
    token.clear();
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Numeric value of a sprint value; summaries count as their maximum
fn numeric(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::Object(summary) => summary.get("max").map_or(0.0, numeric),
        _ => 0.0,
    }
}

/// JavaScript-style truthiness of a record member
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sprint_state::{LocalizedDict, TableFormatter};
    use sprint_test_utils::state;

    fn records(values: &[Value]) -> Vec<Value> {
        values.to_vec()
    }

    #[test]
    fn closed_only_keeps_order() {
        let mut sprints = SprintsState::new(5);
        sprints.closed_only = true;
        sprints.show_old = true;

        let kept = filter_sprints(
            &sprints,
            records(&[
                json!({"sprint_is_closed": true, "n": 1}),
                json!({"sprint_is_closed": false, "n": 2}),
                json!({"sprint_is_closed": true, "n": 3}),
            ]),
        );
        assert_eq!(
            kept,
            vec![
                json!({"sprint_is_closed": true, "n": 1}),
                json!({"sprint_is_closed": true, "n": 3}),
            ]
        );
    }

    #[test]
    fn hidden_old_sprints_are_truncated_to_current() {
        let mut sprints = SprintsState::new(5);
        sprints.current = 1;

        let input = records(&[
            json!({"sprint_is_closed": true}),
            json!({"sprint_is_closed": false}),
            json!({"sprint_is_closed": true}),
        ]);
        assert_eq!(filter_sprints(&sprints, input.clone()), vec![input[0].clone()]);

        sprints.closed_only = true;
        assert_eq!(filter_sprints(&sprints, input.clone()), vec![input[0].clone()]);
    }

    #[test]
    fn default_window_keeps_limit_sprints() {
        let sprints = SprintsState::new(2);
        let input = records(&[json!({}), json!({}), json!({})]);
        assert_eq!(filter_sprints(&sprints, input).len(), 2);
    }

    #[test]
    fn closed_flag_truthiness() {
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&Value::Null));
    }

    #[test]
    fn unwrap_reduces_summaries() {
        assert_eq!(
            unwrap_feature(&[json!({"max": 5}), json!("NA"), Value::Null, json!(3)]),
            vec![json!(5), Value::Null, Value::Null, json!(3)]
        );
    }

    #[test]
    fn ordering_reverses_for_ascending() {
        let input = records(&[json!(3), json!(2), json!(1)]);
        assert_eq!(
            order_sprints(input.clone(), SprintOrder::Ascending),
            vec![json!(1), json!(2), json!(3)]
        );
        assert_eq!(order_sprints(input.clone(), SprintOrder::Descending), input);
    }

    #[test]
    fn stacked_entry_gets_base_values_as_baseline() {
        let input = records(&[
            json!({"x": 1, "y": 4, "start_date": "a"}),
            json!({"x": 2, "y": 5, "start_date": "b"}),
            json!({"x": 3, "y": 6, "start_date": "c"}),
        ]);
        let series = sprints_to_features(
            &input,
            &["x".into(), FeatureDescriptor::Stacked("y".into(), 0)],
            None,
            SeriesConfig::default(),
            None,
        )
        .unwrap();

        assert_eq!(series[0].stack, None);
        assert_eq!(series[1].stack, Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(series[1].visible_key, "x");
        assert_eq!(series[1].visible_index, series[0].visible_index);
        assert_eq!(series[1].sprints, vec![json!(4), json!(5), json!(6)]);
        assert_eq!(series[1].start_date, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn stacking_is_cumulative() {
        let input = records(&[json!({"x": 1, "y": 4, "z": 0}), json!({"x": 2, "y": 5, "z": 0})]);
        let series = sprints_to_features(
            &input,
            &[
                "x".into(),
                FeatureDescriptor::Stacked("y".into(), 0),
                FeatureDescriptor::Stacked("z".into(), 1),
            ],
            None,
            SeriesConfig::default(),
            None,
        )
        .unwrap();
        assert_eq!(series[2].stack, Some(vec![5.0, 7.0]));
        assert_eq!(series[2].visible_key, "y");
    }

    #[test]
    fn forward_stack_reference_is_rejected() {
        let result = sprints_to_features(
            &[],
            &[FeatureDescriptor::Stacked("y".into(), 0)],
            None,
            SeriesConfig::default(),
            None,
        );
        assert_eq!(
            result,
            Err(ShapeError::InvalidStack {
                feature: "y".to_string(),
                onto: 0
            })
        );
    }

    #[test]
    fn visible_index_counts_only_visible_plain_series() {
        let input = records(&[json!({"a": 1, "b": 2, "c": 3})]);
        let visible = OrderedSet::from(&["a", "c"][..]);
        let series = sprints_to_features(
            &input,
            &["a".into(), "b".into(), "c".into()],
            Some(&visible),
            SeriesConfig::default(),
            None,
        )
        .unwrap();
        let indices: Vec<usize> = series.iter().map(|entry| entry.visible_index).collect();
        assert_eq!(indices, vec![0, 1, 1]);
    }

    #[test]
    fn series_carry_targets_and_unwrapped_values() {
        let input = records(&[json!({"bugs": {"max": 7, "min": 1}}), json!({"bugs": "NA"})]);
        let targets = json!({"bugs": [{"target": 5}]});
        let series = sprints_to_features(
            &input,
            &["bugs".into()],
            None,
            SeriesConfig { unwrap: true },
            targets.as_object(),
        )
        .unwrap();
        assert_eq!(series[0].sprints, vec![json!(7), Value::Null]);
        assert_eq!(series[0].metric_targets, Some(json!([{"target": 5}])));
        assert_eq!(series[0].start_date, vec![Value::Null, Value::Null]);
    }

    #[test]
    fn descriptors_deserialize_from_both_forms() {
        let descriptors: Vec<FeatureDescriptor> =
            serde_json::from_value(json!(["x", ["y", 0]])).unwrap();
        assert_eq!(
            descriptors,
            vec![
                FeatureDescriptor::Plain("x".into()),
                FeatureDescriptor::Stacked("y".into(), 0)
            ]
        );
    }

    fn locales() -> Locales {
        let mut units = LocalizedDict::new();
        units.insert(
            "done_points".to_string(),
            [("en".to_string(), "done".to_string())].into_iter().collect(),
        );
        Locales::new("en", "en").with_attributes("short_units", units)
    }

    #[test]
    fn assignment_uses_labels_and_placeholder() {
        let state = state();
        assert_eq!(
            get_assignment("velocity", &state.features, &locales(), "?", None, None),
            Some("done / ?".to_string())
        );
        assert_eq!(
            get_assignment("bugs", &state.features, &locales(), "?", None, None),
            None
        );
    }

    fn dict(entries: &[(&str, &str, &str)]) -> LocalizedDict {
        let mut dict = LocalizedDict::new();
        for (key, language, text) in entries {
            dict.entry((*key).to_string())
                .or_default()
                .insert((*language).to_string(), (*text).to_string());
        }
        dict
    }

    #[test]
    fn assignment_falls_back_to_descriptions() {
        let state = state();
        let locales = locales().with_attributes(
            "descriptions",
            dict(&[("total_points", "en", "Total points")]),
        );
        assert_eq!(
            get_assignment("velocity", &state.features, &locales, "?", None, None),
            Some("done / Total points".to_string())
        );
    }

    #[test]
    fn assignment_prefers_short_units_over_descriptions() {
        let state = state();
        let locales = Locales::new("nl", "en")
            .with_attributes(
                "short_units",
                dict(&[("done_points", "nl", "klaar"), ("total_points", "en", "total")]),
            )
            .with_attributes(
                "descriptions",
                dict(&[
                    ("done_points", "nl", "Afgeronde punten"),
                    ("total_points", "nl", "Totaal aantal punten"),
                ]),
            );
        // Language fallback within short_units comes before descriptions
        assert_eq!(
            get_assignment("velocity", &state.features, &locales, "?", None, None),
            Some("klaar / total".to_string())
        );
    }

    #[test]
    fn assignment_substitutes_formatted_values() {
        let state = state();
        let values = json!({"done_points": 12, "total_points": 20.5});
        assert_eq!(
            get_assignment(
                "velocity",
                &state.features,
                &locales(),
                "?",
                values.as_object(),
                Some(&TableFormatter),
            ),
            Some("12 / 20.50".to_string())
        );
        assert_eq!(
            get_assignment("velocity", &state.features, &locales(), "?", values.as_object(), None),
            Some("12 / 20.5".to_string())
        );
    }

    #[test]
    fn substitution_matches_whole_identifiers_only() {
        let replaced = substitute("points + done_points*2 - points_total", |token| {
            (token == "points").then(|| "P".to_string())
        });
        assert_eq!(replaced, "P + done_points*2 - points_total");
    }

    #[test]
    fn main_sprint_meta_column() {
        let state = state();
        assert_eq!(get_sprint_meta(&state.sprint_meta, "main"), Some("sprint_name"));
        assert_eq!(get_sprint_meta(&state.sprint_meta, "start_date"), Some("start_date"));
    }
}
