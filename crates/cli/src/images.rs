//! Stock-photo lookup backed by the Pexels search API.

use deck_core::ImageSource;
use serde::Deserialize;
use std::time::Duration;

const SEARCH_ENDPOINT: &str = "https://api.pexels.com/v1/search";

/// Per-request timeout for both the search and the download.
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSources,
}

#[derive(Debug, Deserialize)]
struct PhotoSources {
    large: Option<String>,
    medium: Option<String>,
}

impl SearchResponse {
    fn first_url(self) -> Option<String> {
        self.photos
            .into_iter()
            .next()
            .and_then(|p| p.src.large.or(p.src.medium))
    }
}

/// Image source that searches Pexels and downloads the first landscape hit.
pub struct PexelsImages {
    http: reqwest::blocking::Client,
    api_key: String,
}

impl PexelsImages {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let http = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
        })
    }

    fn search(&self, query: &str) -> reqwest::Result<Option<String>> {
        let response: SearchResponse = self
            .http
            .get(SEARCH_ENDPOINT)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .query(&[("query", query), ("per_page", "1"), ("orientation", "landscape")])
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response.first_url())
    }

    fn download(&self, url: &str) -> reqwest::Result<Vec<u8>> {
        let bytes = self.http.get(url).send()?.error_for_status()?.bytes()?;
        Ok(bytes.to_vec())
    }
}

impl ImageSource for PexelsImages {
    fn fetch_image(&self, query: &str) -> Option<Vec<u8>> {
        let url = match self.search(query) {
            Ok(Some(url)) => url,
            Ok(None) => {
                log::info!("No photo found for '{}'", query);
                return None;
            }
            Err(e) => {
                log::warn!("Photo search for '{}' failed: {}", query, e);
                return None;
            }
        };

        match self.download(&url) {
            Ok(bytes) if !bytes.is_empty() => Some(bytes),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Photo download from {} failed: {}", url, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_url_prefers_large() {
        let body = r#"{"photos":[{"src":{"large":"https://l","medium":"https://m"}},{"src":{"large":"https://x"}}]}"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.first_url().as_deref(), Some("https://l"));
    }

    #[test]
    fn test_first_url_empty_results() {
        let parsed: SearchResponse = serde_json::from_str(r#"{"total_results":0}"#).unwrap();
        assert_eq!(parsed.first_url(), None);
    }
}
