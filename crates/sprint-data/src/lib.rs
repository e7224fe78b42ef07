//! Sprint Report Data
//!
//! Everything between a decoded state and a format's input.
//!
//! # Flow
//!
//! 1. [`plan_requests`]: which `data/<project>/<key>.json` resources to fetch
//! 2. [`Navigator`]: fetch the whole plan concurrently, discard stale batches
//! 3. [`assemble_projects`]: merge responses per project
//! 4. [`shape_project`]: filter, order and expand sprints into series
//!
//! # Example
//!
//! ```rust,ignore
//! use sprint_data::{plan_requests, shape_project, FileFetcher, Navigator};
//!
//! let formatter = state.formatter.current();
//! let plan = plan_requests(&state, formatter.request_config());
//! let navigator = Navigator::new(Arc::new(FileFetcher::new("site")));
//! for project in navigator.navigate(&plan).await? {
//!     let report = shape_project(&state, formatter, &project, &locales, "?")?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod assemble;
pub mod catalog;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod pipeline;
pub mod planner;

// Re-exports for convenience
pub use assemble::{assemble_projects, shape_project, ProjectData, ProjectReport};
pub use catalog::{catalog_path, load_catalog};
pub use error::{FetchError, RequestError, RequestResult, ShapeError};
pub use fetch::{FileFetcher, HttpFetcher, MemoryFetcher, ResourceFetcher};
pub use loader::{payload, Navigator, DATA_FIELD};
pub use pipeline::{
    filter_sprints, get_assignment, get_sprint_meta, order_sprints, sprints_to_features,
    unwrap_feature, FeatureDescriptor, FeatureSeries, SeriesConfig, SprintRecord,
};
pub use planner::{
    plan_requests, resource_path, RequestDescriptor, RequestPlan, ResourceKey, DATA_DIR,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
