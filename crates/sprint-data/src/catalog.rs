//! Startup catalog loading

use crate::error::FetchError;
use crate::fetch::ResourceFetcher;
use crate::planner::DATA_DIR;
use futures::future::try_join_all;
use sprint_state::{Catalog, CatalogDocument};
use std::collections::HashMap;

/// Path of a startup document relative to the data root
#[must_use]
pub fn catalog_path(document: CatalogDocument) -> String {
    format!("{DATA_DIR}/{}", document.file_name())
}

/// Fetch every startup document concurrently and build the catalog
///
/// # Errors
/// - `FetchError` of the first document that could not be fetched
/// - `FetchError::Catalog` if the documents do not form a catalog
pub async fn load_catalog(fetcher: &dyn ResourceFetcher) -> Result<Catalog, FetchError> {
    let documents = try_join_all(CatalogDocument::ALL.into_iter().map(|document| async move {
        let value = fetcher.fetch(&catalog_path(document)).await?;
        Ok::<_, FetchError>((document, value))
    }))
    .await?;

    let documents: HashMap<_, _> = documents.into_iter().collect();
    let catalog = Catalog::from_documents(&documents)?;
    tracing::info!(
        "Loaded catalog: {} projects, {} features",
        catalog.projects.len(),
        catalog.features.all.len()
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;
    use sprint_test_utils::catalog_documents;

    fn fetcher() -> MemoryFetcher {
        catalog_documents()
            .into_iter()
            .fold(MemoryFetcher::new(), |fetcher, (document, value)| {
                fetcher.with_document(catalog_path(document), value)
            })
    }

    #[tokio::test]
    async fn loads_every_document() {
        let catalog = load_catalog(&fetcher()).await.unwrap();
        assert_eq!(catalog.projects.len(), 6);
        assert_eq!(catalog.sprints.limit, sprint_test_utils::SPRINT_LIMIT);
        assert_eq!(
            catalog.locales("nl", "en").attribute("short_units", "total_points"),
            Some("total".to_string())
        );
    }

    #[tokio::test]
    async fn missing_document_fails_the_load() {
        let mut documents = catalog_documents();
        documents.remove(&CatalogDocument::ValueIcons);
        let fetcher = documents
            .into_iter()
            .fold(MemoryFetcher::new(), |fetcher, (document, value)| {
                fetcher.with_document(catalog_path(document), value)
            });

        let error = load_catalog(&fetcher).await.unwrap_err();
        assert_eq!(error.path(), Some("data/value_icons.json"));
    }

    #[tokio::test]
    async fn invalid_document_is_a_catalog_error() {
        let fetcher = fetcher().with_document(
            catalog_path(CatalogDocument::Sprints),
            serde_json::json!({"limit": -1}),
        );
        assert!(matches!(
            load_catalog(&fetcher).await,
            Err(FetchError::Catalog(_))
        ));
    }
}
