use async_trait::async_trait;
use catalog::{
    CatalogClient, CatalogError, CatalogItem, DiscoverQuery, InMemoryCatalog, ItemId, MovieDetail,
};
use retriever::RecommendationRetriever;
use std::collections::HashSet;
use std::sync::Arc;

fn drama(id: ItemId, rank: u32, rating: f32) -> CatalogItem {
    CatalogItem {
        id,
        title: format!("Drama {}", id),
        popularity_rank: rank,
        rating,
        poster_ref: Some(format!("/{}.jpg", id)),
        genre_ids: vec![18],
        release_date: None,
        overview: String::new(),
    }
}

fn drama_catalog() -> Arc<InMemoryCatalog> {
    let mut catalog = InMemoryCatalog::new();
    catalog.insert_item(drama(27205, 1, 9.5));
    for id in 1..=14 {
        catalog.insert_item(drama(id, id + 1, 5.0 + id as f32 * 0.2));
    }
    Arc::new(catalog)
}

#[tokio::test]
async fn test_excluded_item_never_returned() {
    let retriever = RecommendationRetriever::new(drama_catalog());
    let excluded: HashSet<ItemId> = [27205].into_iter().collect();

    for _ in 0..25 {
        let items = retriever
            .retrieve(&["drama".to_string()], &excluded, 3)
            .await;
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|item| item.id != 27205));
    }
}

#[tokio::test]
async fn test_repeated_calls_share_one_pool() {
    let retriever = RecommendationRetriever::new(drama_catalog()).with_pool_size(5);
    // Five best-rated dramas: 27205 (9.5) then 14, 13, 12, 11
    let pool: HashSet<ItemId> = [27205, 14, 13, 12, 11].into_iter().collect();

    let mut seen = HashSet::new();
    for _ in 0..40 {
        let items = retriever
            .retrieve(&["drama".to_string()], &HashSet::new(), 3)
            .await;
        for item in items {
            assert!(pool.contains(&item.id), "{} is outside the pool", item.id);
            seen.insert(item.id);
        }
    }
    assert!(seen.len() > 3, "Shuffling should surface more than one fixed trio");
}

struct UnreachableCatalog;

#[async_trait]
impl CatalogClient for UnreachableCatalog {
    async fn discover(&self, _: &DiscoverQuery) -> catalog::Result<Vec<CatalogItem>> {
        Err(CatalogError::Unavailable("connection refused".into()))
    }
    async fn search_title(&self, _: &str) -> catalog::Result<Vec<CatalogItem>> {
        Err(CatalogError::Unavailable("connection refused".into()))
    }
    async fn detail(&self, _: ItemId) -> catalog::Result<Option<MovieDetail>> {
        Err(CatalogError::Unavailable("connection refused".into()))
    }
    async fn trending(&self) -> catalog::Result<Vec<CatalogItem>> {
        Err(CatalogError::Unavailable("connection refused".into()))
    }
    async fn upcoming(&self) -> catalog::Result<Vec<CatalogItem>> {
        Err(CatalogError::Unavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn test_unreachable_catalog_yields_empty_results() {
    let retriever = RecommendationRetriever::new(Arc::new(UnreachableCatalog));
    let items = retriever
        .retrieve(&["drama".to_string()], &HashSet::new(), 3)
        .await;
    assert!(items.is_empty());
    assert!(retriever.find_title("Inception").await.is_none());
}
