//! Batch loading with navigation generations
//!
//! Every navigation takes a generation number before its fetches start. All
//! fetches of a batch run concurrently and are joined before anything is
//! shaped; one failure fails the batch. A batch that resolves after a newer
//! navigation began is discarded as stale.

use crate::assemble::{assemble_projects, ProjectData};
use crate::error::{FetchError, RequestError, RequestResult};
use crate::fetch::ResourceFetcher;
use crate::planner::RequestPlan;
use futures::future::try_join_all;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Member of a per-project resource holding its payload
pub const DATA_FIELD: &str = "data";

/// Loads request plans, discarding stale batches
pub struct Navigator {
    fetcher: Arc<dyn ResourceFetcher>,
    generation: AtomicU64,
}

impl Navigator {
    /// Create navigator over a fetcher
    #[must_use]
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self {
            fetcher,
            generation: AtomicU64::new(0),
        }
    }

    /// Start a navigation, returning its generation
    ///
    /// Call after the state was updated and before planning, so that the
    /// batch reflects the state it was planned from.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Generation of the newest navigation
    #[must_use]
    pub fn latest(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start a navigation and load its plan
    ///
    /// # Errors
    /// See [`Navigator::load`].
    pub async fn navigate(&self, plan: &RequestPlan) -> RequestResult<Vec<ProjectData>> {
        let generation = self.begin();
        self.load(generation, plan).await
    }

    /// Fetch every resource of a plan and assemble it per project
    ///
    /// # Errors
    /// - `RequestError::Stale` if a newer navigation began meanwhile (also
    ///   when the batch failed)
    /// - `RequestError::Fetch` if any fetch failed
    /// - `RequestError::Shape` if the responses cannot be assembled
    pub async fn load(&self, generation: u64, plan: &RequestPlan) -> RequestResult<Vec<ProjectData>> {
        tracing::info!(
            "Loading batch {}: {} requests for {} projects",
            generation,
            plan.len(),
            plan.projects.len()
        );
        let responses = self.fetch_all(plan).await;

        let latest = self.latest();
        if latest != generation {
            tracing::warn!("Discarding stale batch {} (latest is {})", generation, latest);
            return Err(RequestError::Stale { generation, latest });
        }

        let projects = assemble_projects(plan, responses?)?;
        tracing::info!("Loaded batch {}", generation);
        Ok(projects)
    }

    async fn fetch_all(&self, plan: &RequestPlan) -> Result<Vec<Value>, FetchError> {
        try_join_all(plan.requests.iter().map(|request| async move {
            let document = self.fetcher.fetch(&request.path).await?;
            payload(&request.path, document)
        }))
        .await
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("generation", &self.latest())
            .finish_non_exhaustive()
    }
}

/// `data` member of a per-project resource
///
/// # Errors
/// Returns `FetchError::MissingData` if the document has no `data` member.
pub fn payload(path: &str, document: Value) -> Result<Value, FetchError> {
    let data = match document {
        Value::Object(mut members) => members.remove(DATA_FIELD),
        _ => None,
    };
    data.ok_or_else(|| FetchError::MissingData {
        path: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;
    use crate::planner::plan_requests;
    use serde_json::json;
    use sprint_state::{OrderedSet, RequestConfig};
    use sprint_test_utils::{sprint_records, state};

    fn plan() -> RequestPlan {
        let mut state = state();
        state.projects.select(&OrderedSet::from(&["alpha"][..]));
        plan_requests(&state, RequestConfig::default())
    }

    fn fetcher() -> Arc<dyn ResourceFetcher> {
        Arc::new(
            MemoryFetcher::new()
                .with_document("data/alpha/default.json", json!({"data": sprint_records(3)})),
        )
    }

    #[tokio::test]
    async fn navigate_loads_current_batch() {
        let navigator = Navigator::new(fetcher());
        let projects = navigator.navigate(&plan()).await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].sprints.len(), 3);
        assert_eq!(navigator.latest(), 1);
    }

    #[tokio::test]
    async fn overtaken_batch_is_stale() {
        let navigator = Navigator::new(fetcher());
        let first = navigator.begin();
        let second = navigator.begin();

        let error = navigator.load(first, &plan()).await.unwrap_err();
        assert!(matches!(
            error,
            RequestError::Stale {
                generation: 1,
                latest: 2
            }
        ));
        assert!(navigator.load(second, &plan()).await.is_ok());
    }

    #[tokio::test]
    async fn one_failed_fetch_fails_the_batch() {
        let navigator = Navigator::new(Arc::new(MemoryFetcher::new()));
        let error = navigator.navigate(&plan()).await.unwrap_err();
        assert!(matches!(error, RequestError::Fetch(FetchError::Io { .. })));
    }

    #[test]
    fn payload_requires_data_member() {
        assert_eq!(payload("p", json!({"data": [1]})).unwrap(), json!([1]));
        assert!(matches!(
            payload("p", json!({"rows": []})),
            Err(FetchError::MissingData { .. })
        ));
    }
}
