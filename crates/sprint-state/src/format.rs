//! Presentation formats and their data needs
//!
//! Drawing is done elsewhere; here each format only declares which auxiliary
//! resources it needs and how it wants sprint data shaped.

use crate::error::{StateError, StateResult};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter as FmtFormatter};
use std::str::FromStr;

/// Auxiliary resources a format needs per project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Pull in attributes referenced by derived features
    pub expressions: bool,
    /// Metric targets for features with targets
    pub metrics: bool,
    /// Per-sprint details
    pub details: bool,
    /// Links to upstream sources
    pub links: bool,
    /// Source metadata
    pub sources: bool,
}

/// Order in which sprints are handed to a format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SprintOrder {
    /// Oldest first
    Ascending,
    /// Most recent first
    Descending,
}

/// Built-in presentation formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    /// Table of sprints and features
    Table,
    /// Line chart
    Line,
    /// Stacked bar chart
    Bar,
    /// Stacked area chart
    Area,
    /// Scatter plot of two features
    Scatter,
    /// Sankey diagram of sprint details
    Sankey,
}

impl FormatKind {
    /// All built-in kinds; the first is the default format
    pub const ALL: [Self; 6] = [
        Self::Table,
        Self::Line,
        Self::Bar,
        Self::Area,
        Self::Scatter,
        Self::Sankey,
    ];

    /// Name used in links
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Line => "line",
            Self::Bar => "bar",
            Self::Area => "area",
            Self::Scatter => "scatter",
            Self::Sankey => "sankey",
        }
    }

    /// Icon shown in the format picker
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Line => "chart-line",
            Self::Bar => "chart-bar",
            Self::Area => "chart-area",
            Self::Scatter => "braille",
            Self::Sankey => "stream",
        }
    }
}

impl Display for FormatKind {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormatKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Presentation strategy consuming shaped sprint data
pub trait Formatter: Send + Sync + fmt::Debug {
    /// Kind of this formatter
    fn kind(&self) -> FormatKind;

    /// Auxiliary resources this format needs
    fn request_config(&self) -> RequestConfig;

    /// Sprint order expected by this format
    fn sprint_order(&self) -> SprintOrder {
        SprintOrder::Ascending
    }

    /// Whether summary values (`{max, ...}`) are reduced to their maximum
    fn unwrap_values(&self) -> bool {
        true
    }

    /// Format a value with its unit, if this format has a unit notation
    fn format_unit(&self, _attribute: &str, _value: &serde_json::Value) -> Option<String> {
        None
    }
}

/// Table format
#[derive(Debug, Clone, Copy, Default)]
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn kind(&self) -> FormatKind {
        FormatKind::Table
    }

    fn request_config(&self) -> RequestConfig {
        RequestConfig {
            expressions: true,
            metrics: true,
            details: true,
            links: true,
            sources: true,
        }
    }

    fn sprint_order(&self) -> SprintOrder {
        SprintOrder::Descending
    }

    fn unwrap_values(&self) -> bool {
        false
    }

    fn format_unit(&self, _attribute: &str, value: &serde_json::Value) -> Option<String> {
        match value {
            serde_json::Value::Number(number) => number.as_f64().map(|n| {
                if n.fract() == 0.0 {
                    format!("{n:.0}")
                } else {
                    format!("{n:.2}")
                }
            }),
            serde_json::Value::String(text) => Some(text.clone()),
            _ => None,
        }
    }
}

/// Chart formats (line, bar, area, scatter, sankey)
#[derive(Debug, Clone, Copy)]
pub struct ChartFormatter {
    kind: FormatKind,
}

impl ChartFormatter {
    /// Create chart formatter of a kind
    #[inline]
    #[must_use]
    pub fn new(kind: FormatKind) -> Self {
        Self { kind }
    }
}

impl Formatter for ChartFormatter {
    fn kind(&self) -> FormatKind {
        self.kind
    }

    fn request_config(&self) -> RequestConfig {
        match self.kind {
            FormatKind::Line | FormatKind::Bar => RequestConfig {
                metrics: true,
                ..RequestConfig::default()
            },
            FormatKind::Sankey => RequestConfig {
                details: true,
                ..RequestConfig::default()
            },
            FormatKind::Table | FormatKind::Area | FormatKind::Scatter => {
                RequestConfig::default()
            }
        }
    }
}

/// Construct the built-in formatter of a kind
#[must_use]
pub fn builtin_formatter(kind: FormatKind) -> Box<dyn Formatter> {
    match kind {
        FormatKind::Table => Box::new(TableFormatter),
        other => Box::new(ChartFormatter::new(other)),
    }
}

/// Format picker entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatterSpec {
    /// Name used in links
    pub name: String,
    /// Kind constructed for this entry
    pub kind: FormatKind,
    /// Icon shown in the picker
    pub icon: String,
}

impl From<FormatKind> for FormatterSpec {
    fn from(kind: FormatKind) -> Self {
        Self {
            name: kind.name().to_string(),
            kind,
            icon: kind.icon().to_string(),
        }
    }
}

/// Format selection state
///
/// The formatter instance is constructed lazily from `selected` and cached
/// until the selection changes.
#[derive(Debug)]
pub struct FormatterState {
    /// Known formats; the first is the default
    pub known: Vec<FormatterSpec>,
    /// Selected format name
    pub selected: String,
    current: Option<Box<dyn Formatter>>,
}

impl FormatterState {
    /// Create state selecting the first known format
    ///
    /// Returns `None` when `known` is empty.
    #[must_use]
    pub fn new(known: Vec<FormatterSpec>) -> Option<Self> {
        let selected = known.first()?.name.clone();
        Some(Self {
            known,
            selected,
            current: None,
        })
    }

    /// State with every built-in format
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            known: FormatKind::ALL.into_iter().map(FormatterSpec::from).collect(),
            selected: FormatKind::Table.name().to_string(),
            current: None,
        }
    }

    /// Name of the default format
    #[must_use]
    pub fn default_name(&self) -> &str {
        self.known.first().map_or("", |spec| spec.name.as_str())
    }

    /// Look up a known format
    #[must_use]
    pub fn spec(&self, name: &str) -> Option<&FormatterSpec> {
        self.known.iter().find(|spec| spec.name == name)
    }

    /// Select a format by name
    ///
    /// Returns `Ok(true)` when the selection changed, invalidating the
    /// cached formatter.
    ///
    /// # Errors
    /// Returns `StateError::UnknownFormatter` if `name` is not a known format.
    pub fn select(&mut self, name: &str) -> StateResult<bool> {
        if self.spec(name).is_none() {
            return Err(StateError::UnknownFormatter(name.to_string()));
        }
        if self.selected == name {
            return Ok(false);
        }
        self.selected = name.to_string();
        self.current = None;
        Ok(true)
    }

    /// Select the default format
    ///
    /// Returns whether the selection changed.
    pub fn reset(&mut self) -> bool {
        let Some(default) = self.known.first() else {
            return false;
        };
        if self.selected == default.name {
            return false;
        }
        self.selected = default.name.clone();
        self.current = None;
        true
    }

    /// Whether a formatter instance has been constructed
    #[inline]
    #[must_use]
    pub fn is_constructed(&self) -> bool {
        self.current.is_some()
    }

    /// Formatter for the selected format, constructing it on first use
    pub fn current(&mut self) -> &dyn Formatter {
        let kind = self
            .spec(&self.selected)
            .map_or(FormatKind::Table, |spec| spec.kind);
        &**self.current.get_or_insert_with(|| builtin_formatter(kind))
    }
}

impl Clone for FormatterState {
    fn clone(&self) -> Self {
        // Instances are cheap to rebuild
        Self {
            known: self.known.clone(),
            selected: self.selected.clone(),
            current: None,
        }
    }
}

impl PartialEq for FormatterState {
    fn eq(&self, other: &Self) -> bool {
        self.known == other.known && self.selected == other.selected
    }
}
