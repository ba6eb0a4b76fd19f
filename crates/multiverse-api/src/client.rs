//! HTTP client for the API.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::filters::{CharacterFilters, EpisodeFilters};
use crate::model::{Character, Episode, ErrorBody, OneOrMany, Page};

/// Base URL of the public API.
pub const DEFAULT_BASE_URL: &str = "https://rickandmortyapi.com/api";

/// Client for the character and episode endpoints.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http_client: Client,
}

impl ApiClient {
    /// Creates a client for the public API.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in URL; the `Result` mirrors [`ApiClient::with_base_url`].
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client against another deployment of the API.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        // Joining relative paths keeps the last segment only with a trailing slash.
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
        Ok(Self {
            base_url,
            http_client: Client::new(),
        })
    }

    /// The base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches one page of characters matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when nothing matches the filters, or another
    /// error if the request or decoding fails.
    pub async fn characters(
        &self,
        filters: &CharacterFilters,
        page: u32,
    ) -> Result<Page<Character>> {
        let mut query = filters.query_pairs();
        query.push(("page", page.to_string()));
        self.get_json("character", &query).await
    }

    /// Fetches one page of episodes matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when nothing matches the filters, or another
    /// error if the request or decoding fails.
    pub async fn episodes(&self, filters: &EpisodeFilters, page: u32) -> Result<Page<Episode>> {
        let mut query = filters.query_pairs();
        query.push(("page", page.to_string()));
        self.get_json("episode", &query).await
    }

    /// Fetches a single character.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id.
    pub async fn character(&self, id: i64) -> Result<Character> {
        self.get_json(&format!("character/{id}"), &[]).await
    }

    /// Fetches a single episode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id.
    pub async fn episode(&self, id: i64) -> Result<Episode> {
        self.get_json(&format!("episode/{id}"), &[]).await
    }

    /// Fetches several characters in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or decoding fails.
    pub async fn characters_by_ids(&self, ids: &[i64]) -> Result<Vec<Character>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let body: OneOrMany<Character> = self
            .get_json(&format!("character/{}", join_ids(ids)), &[])
            .await?;
        Ok(body.into())
    }

    /// Fetches several episodes in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or decoding fails.
    pub async fn episodes_by_ids(&self, ids: &[i64]) -> Result<Vec<Episode>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let body: OneOrMany<Episode> = self
            .get_json(&format!("episode/{}", join_ids(ids)), &[])
            .await?;
        Ok(body.into())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T> {
        let url = self.base_url.join(path)?;
        debug!(%url, ?query, "GET");

        let response = self.http_client.get(url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map_or_else(|_| status.to_string(), |body| body.error);
            return Err(status_error(status, message));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn status_error(status: StatusCode, message: String) -> Error {
    if status == StatusCode::NOT_FOUND {
        Error::NotFound(message)
    } else {
        Error::Status {
            status: status.as_u16(),
            message,
        }
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_keeps_path_segment() {
        let client = ApiClient::with_base_url("https://example.com/api").unwrap();
        assert_eq!(
            client.base_url().join("character").unwrap().as_str(),
            "https://example.com/api/character"
        );

        let client = ApiClient::with_base_url("https://example.com/api/").unwrap();
        assert_eq!(client.base_url().as_str(), "https://example.com/api/");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::with_base_url("not a url"),
            Err(Error::Url(_))
        ));
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(status_error(StatusCode::NOT_FOUND, "There is nothing here".into()).is_not_found());
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom".into()),
            Error::Status { status: 500, .. }
        ));
    }

    #[test]
    fn test_join_ids() {
        assert_eq!(join_ids(&[1, 2, 3]), "1,2,3");
        assert_eq!(join_ids(&[42]), "42");
    }

    #[tokio::test]
    async fn test_empty_id_list_skips_request() {
        // Unroutable base: any request would fail.
        let client = ApiClient::with_base_url("http://127.0.0.1:9").unwrap();
        assert!(client.characters_by_ids(&[]).await.unwrap().is_empty());
        assert!(client.episodes_by_ids(&[]).await.unwrap().is_empty());
    }
}
