//! Ranking and randomized pool selection.

use catalog::{CatalogItem, ItemId};
use rand::Rng;
use rand::seq::SliceRandom;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Drop excluded items and sort the rest by rating, highest first.
///
/// Ties keep the catalog's popularity order (the sort is stable).
pub fn rank_candidates(items: Vec<CatalogItem>, excluded: &HashSet<ItemId>) -> Vec<CatalogItem> {
    let mut ranked: Vec<CatalogItem> = items
        .into_iter()
        .filter(|item| !excluded.contains(&item.id))
        .collect();
    ranked.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal));
    ranked
}

/// Take the top `pool_size` of `ranked`, shuffle them, return `limit`.
///
/// Two calls over the same ranked list draw from the same pool; only the
/// order (and so the chosen subset) varies.
pub fn select_from_pool<R: Rng + ?Sized>(
    mut ranked: Vec<CatalogItem>,
    pool_size: usize,
    limit: usize,
    rng: &mut R,
) -> Vec<CatalogItem> {
    ranked.truncate(pool_size.max(limit));
    ranked.shuffle(rng);
    ranked.truncate(limit);
    ranked
}
