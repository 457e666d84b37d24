//! Streaming platform extraction from watch-provider data.

use crate::types::{Platform, RegionProviders, image_url};
use std::collections::{HashMap, HashSet};

/// Primary region for availability; `FALLBACK_REGION` is used when it is absent
pub const PRIMARY_REGION: &str = "KR";
pub const FALLBACK_REGION: &str = "US";

/// List the platforms a title can be watched on.
///
/// ## Algorithm
/// 1. Pick the primary region's providers, or the fallback region's
/// 2. Walk subscription, then purchase, then rental offers
/// 3. Skip providers without a logo, and any provider already seen by id
///    or by case-insensitive name
pub fn available_platforms(watch_providers: &HashMap<String, RegionProviders>) -> Vec<Platform> {
    let Some(region) = watch_providers
        .get(PRIMARY_REGION)
        .or_else(|| watch_providers.get(FALLBACK_REGION))
    else {
        return Vec::new();
    };

    let mut seen_ids = HashSet::new();
    let mut seen_names = HashSet::new();
    let mut platforms = Vec::new();

    let offers = region
        .flatrate
        .iter()
        .chain(region.buy.iter())
        .chain(region.rent.iter());

    for provider in offers {
        let Some(logo) = provider.logo_path.as_deref() else {
            continue;
        };
        let normalized = provider.provider_name.trim().to_lowercase();
        if seen_ids.contains(&provider.provider_id) || seen_names.contains(&normalized) {
            continue;
        }
        seen_ids.insert(provider.provider_id);
        seen_names.insert(normalized);
        platforms.push(Platform {
            name: provider.provider_name.clone(),
            logo_path: image_url("original", logo),
        });
    }

    platforms
}
