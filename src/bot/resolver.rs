//! Media resolver: catalogue → external search → bundled fallback,
//! with recency-avoidance on the final pick.

use tracing::{debug, warn};

use crate::bot::assets;
use crate::bot::catalog::ActionCatalog;
use crate::bot::recent::RecentMedia;

/// Results requested from the search collaborator.
pub const SEARCH_LIMIT: usize = 12;
/// Keyword appended to the action name in search queries.
pub const SEARCH_THEME: &str = "anime";

/// One search result, with dimensions when the backend reports them.
#[derive(Debug, Clone)]
pub struct GifCandidate {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// External GIF search collaborator. Best-effort: errors degrade to
/// the fallback tiers, they never surface to the user.
pub trait GifSearch: Send + Sync {
    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<GifCandidate>, String>> + Send;
}

/// Resolve a media URL for `action` in `chat_id`.
///
/// The catalogue is the primary source. When it is empty, exactly one
/// search call is attempted and its results are merged back in and
/// persisted. The bundled asset lists back everything up. The final
/// pick avoids recently shown URLs until the whole candidate list is
/// recent, then rotates rather than starving.
pub async fn resolve<G: GifSearch>(
    catalog: &mut ActionCatalog,
    recent: &mut RecentMedia,
    search: Option<&G>,
    chat_id: i64,
    action: &str,
) -> Option<String> {
    if catalog.urls(action).is_empty()
        && let Some(search) = search
    {
        let query = format!("{action} {SEARCH_THEME}");
        match search.search(&query, SEARCH_LIMIT).await {
            Ok(results) => {
                let urls = rank_candidates(results);
                if !urls.is_empty() {
                    debug!("Search filled '{}' with {} urls", action, urls.len());
                    catalog.merge_urls(action, urls);
                    if let Err(e) = catalog.save() {
                        warn!("Failed to persist catalogue: {e}");
                    }
                }
            }
            Err(e) => {
                warn!("GIF search failed for '{query}': {e}");
            }
        }
    }

    let catalog_urls = catalog.urls(action);
    let candidates: Vec<&str> = if !catalog_urls.is_empty() {
        catalog_urls.iter().map(String::as_str).collect()
    } else {
        let bundled = assets::fallback_urls(action);
        if !bundled.is_empty() {
            bundled.to_vec()
        } else {
            assets::GENERIC_FALLBACK.to_vec()
        }
    };

    let chosen = pick(&candidates, recent, chat_id)?.to_string();
    recent.push(chat_id, &chosen);
    Some(chosen)
}

/// Order search results preferring near-square media (minimize
/// |width−height|, ties keep result order), dropping duplicates.
pub fn rank_candidates(results: Vec<GifCandidate>) -> Vec<String> {
    let mut ranked = results;
    ranked.sort_by_key(|c| match (c.width, c.height) {
        (Some(w), Some(h)) => w.abs_diff(h),
        // No dimensional metadata sorts last.
        _ => u32::MAX,
    });

    let mut urls: Vec<String> = Vec::new();
    for candidate in ranked {
        if !candidate.url.is_empty() && !urls.contains(&candidate.url) {
            urls.push(candidate.url);
        }
    }
    urls
}

/// First candidate not recently shown, or the first overall when all
/// are recent.
fn pick<'a>(candidates: &[&'a str], recent: &RecentMedia, chat_id: i64) -> Option<&'a str> {
    candidates
        .iter()
        .find(|url| !recent.contains(chat_id, url))
        .or_else(|| candidates.first())
        .copied()
}
