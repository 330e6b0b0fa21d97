//! Tenor v2 search client.

use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::bot::resolver::{GifCandidate, GifSearch};

const TENOR_SEARCH_URL: &str = "https://tenor.googleapis.com/v2/search";

/// Format keys tried in order of preference.
const FORMAT_PREFERENCE: &[&str] = &["gif", "mediumgif", "tinygif", "nanogif"];

pub struct TenorClient {
    api_key: String,
    client: reqwest::Client,
}

#[derive(Deserialize, Debug)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize, Debug)]
struct SearchResult {
    #[serde(default)]
    media_formats: HashMap<String, MediaFormat>,
}

#[derive(Deserialize, Debug)]
struct MediaFormat {
    url: String,
    /// `[width, height]` when Tenor reports it.
    #[serde(default)]
    dims: Vec<u32>,
}

impl TenorClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self { api_key, client }
    }
}

impl GifSearch for TenorClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<GifCandidate>, String> {
        debug!("Tenor search: {query}");

        let url = format!(
            "{TENOR_SEARCH_URL}?q={}&key={}&limit={limit}&media_filter=minimal",
            urlencoding::encode(query),
            urlencoding::encode(&self.api_key),
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("HTTP error: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Tenor error {status}"));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {e}"))?;

        let candidates: Vec<GifCandidate> = parsed
            .results
            .into_iter()
            .filter_map(|result| {
                let format = FORMAT_PREFERENCE
                    .iter()
                    .find_map(|key| result.media_formats.get(*key))?;
                let (width, height) = match format.dims.as_slice() {
                    [w, h, ..] => (Some(*w), Some(*h)),
                    _ => (None, None),
                };
                Some(GifCandidate { url: format.url.clone(), width, height })
            })
            .collect();

        debug!("Tenor returned {} candidate(s)", candidates.len());
        Ok(candidates)
    }
}
