//! Sprint Report State
//!
//! The in-memory selection model of the sprint report dashboard.
//!
//! # Core Concepts
//!
//! - [`OrderedSet`]: insertion-ordered set backing every selection
//! - [`ProjectsState`]: selected/visible projects and symbolic groups
//! - [`FeaturesState`]: ordered feature selection with team/project sourcing
//! - [`SprintsState`] / [`SprintMetaState`]: sprint window and label columns
//! - [`FormatterState`]: presentation format with a lazily built [`Formatter`]
//! - [`State`]: the aggregate, seeded from a [`Catalog`]
//!
//! # Example
//!
//! ```rust,ignore
//! use sprint_state::{Catalog, State};
//!
//! let catalog = Catalog::from_documents(&documents)?;
//! let mut state = State::from_catalog(&catalog);
//!
//! let formatter = state.formatter.current();
//! println!("needs details: {}", formatter.request_config().details);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod catalog;
pub mod error;
pub mod feature;
pub mod format;
pub mod locale;
pub mod ordered_set;
pub mod project;
pub mod sprint;
pub mod state;

// Re-exports for convenience
pub use catalog::{Catalog, CatalogDocument, FeatureCatalog, SprintCatalog};
pub use error::{CatalogError, StateError, StateResult};
pub use feature::{Expression, FeatureSelection, FeatureSource, FeaturesState};
pub use format::{
    builtin_formatter, ChartFormatter, FormatKind, Formatter, FormatterSpec, FormatterState,
    RequestConfig, SprintOrder, TableFormatter,
};
pub use locale::{Locales, LocalizedDict};
pub use ordered_set::OrderedSet;
pub use project::{Project, ProjectGroup, ProjectsState, TeamMarker};
pub use sprint::{SprintMetaState, SprintWindow, SprintsState, MAIN_META_KEY};
pub use state::{State, StateSummary, NUMERIC_META_COLUMNS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the state model
    pub use crate::{
        Catalog, FeatureSelection, FormatKind, Formatter, Locales, OrderedSet, RequestConfig,
        SprintWindow, State,
    };
}
