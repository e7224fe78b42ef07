//! Startup metadata documents
//!
//! The dashboard is seeded once from a set of JSON documents under the data
//! root. [`Catalog`] is their typed form.

use crate::error::CatalogError;
use crate::feature::Expression;
use crate::locale::{Locales, LocalizedDict};
use crate::project::Project;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Startup metadata document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogDocument {
    /// `projects_meta.json`
    Projects,
    /// `features.json`
    Features,
    /// `categories.json`
    Categories,
    /// `descriptions.json`
    Descriptions,
    /// `long_descriptions.json`
    LongDescriptions,
    /// `short_units.json`
    ShortUnits,
    /// `value_icons.json`
    ValueIcons,
    /// `sources.json`
    Sources,
    /// `sprints.json`
    Sprints,
}

impl CatalogDocument {
    /// Every startup document
    pub const ALL: [Self; 9] = [
        Self::Projects,
        Self::Features,
        Self::Categories,
        Self::Descriptions,
        Self::LongDescriptions,
        Self::ShortUnits,
        Self::ValueIcons,
        Self::Sources,
        Self::Sprints,
    ];

    /// File name relative to the data root
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Projects => "projects_meta.json",
            Self::Features => "features.json",
            Self::Categories => "categories.json",
            Self::Descriptions => "descriptions.json",
            Self::LongDescriptions => "long_descriptions.json",
            Self::ShortUnits => "short_units.json",
            Self::ValueIcons => "value_icons.json",
            Self::Sources => "sources.json",
            Self::Sprints => "sprints.json",
        }
    }

    /// Attribute namespace the document is exposed under in [`Locales`]
    #[must_use]
    pub fn namespace(self) -> &'static str {
        self.file_name().trim_end_matches(".json")
    }
}

/// Contents of `features.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCatalog {
    /// Every known feature
    pub all: Vec<String>,
    /// Features selected on a fresh start
    #[serde(default)]
    pub default: Vec<String>,
    /// Non-data columns
    #[serde(default)]
    pub meta: Vec<String>,
    /// Derived feature formulas
    #[serde(default)]
    pub expressions: IndexMap<String, Expression>,
    /// Features with metric targets
    #[serde(default)]
    pub metrics: Vec<String>,
}

/// Contents of `sprints.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintCatalog {
    /// Number of recent sprints served per project
    pub limit: i64,
    /// Upstream reports whether sprints are closed
    #[serde(default = "default_true")]
    pub closed: bool,
    /// Upstream serves old sprints
    #[serde(default)]
    pub old: bool,
}

fn default_true() -> bool {
    true
}

/// Typed startup metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    /// Project metadata
    pub projects: Vec<Project>,
    /// Feature lists and formulas
    pub features: FeatureCatalog,
    /// Sprint limits
    pub sprints: SprintCatalog,
    /// Localized label dictionaries by namespace
    pub dictionaries: HashMap<String, LocalizedDict>,
    /// Feature categories
    pub categories: Value,
    /// Icons for feature values
    pub value_icons: Value,
    /// Upstream source metadata
    pub sources: Value,
}

impl Catalog {
    /// Build catalog from fetched documents
    ///
    /// Missing optional documents (everything except projects, features and
    /// sprints) are treated as empty.
    ///
    /// # Errors
    /// - `CatalogError::InvalidDocument` if a document has the wrong shape
    /// - `CatalogError::InvalidSprintLimit` if the sprint limit is negative
    pub fn from_documents(documents: &HashMap<CatalogDocument, Value>) -> Result<Self, CatalogError> {
        let projects = required(documents, CatalogDocument::Projects)?;
        let features = required(documents, CatalogDocument::Features)?;
        let sprints: SprintCatalog = required(documents, CatalogDocument::Sprints)?;
        if sprints.limit < 0 {
            return Err(CatalogError::InvalidSprintLimit(sprints.limit));
        }

        let mut dictionaries = HashMap::new();
        for document in [
            CatalogDocument::Descriptions,
            CatalogDocument::LongDescriptions,
            CatalogDocument::ShortUnits,
        ] {
            let dict: LocalizedDict = optional(documents, document)?;
            dictionaries.insert(document.namespace().to_string(), dict);
        }

        let raw = |document: CatalogDocument| documents.get(&document).cloned().unwrap_or(Value::Null);

        Ok(Self {
            projects,
            features,
            sprints,
            dictionaries,
            categories: raw(CatalogDocument::Categories),
            value_icons: raw(CatalogDocument::ValueIcons),
            sources: raw(CatalogDocument::Sources),
        })
    }

    /// Locales for a language, exposing the label dictionaries
    #[must_use]
    pub fn locales(&self, language: &str, fallback_language: &str) -> Locales {
        self.dictionaries
            .iter()
            .fold(Locales::new(language, fallback_language), |locales, (namespace, dict)| {
                locales.with_attributes(namespace.clone(), dict.clone())
            })
    }
}

fn required<T: DeserializeOwned>(
    documents: &HashMap<CatalogDocument, Value>,
    document: CatalogDocument,
) -> Result<T, CatalogError> {
    let value = documents.get(&document).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value)
        .map_err(|e| CatalogError::invalid_document(document.file_name(), e))
}

fn optional<T: DeserializeOwned + Default>(
    documents: &HashMap<CatalogDocument, Value>,
    document: CatalogDocument,
) -> Result<T, CatalogError> {
    match documents.get(&document) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| CatalogError::invalid_document(document.file_name(), e)),
    }
}
