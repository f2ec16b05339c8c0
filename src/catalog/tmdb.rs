//! TMDB-compatible catalog client.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::movie::{Movie, MovieDetails, MoviePage};
use super::MovieCatalog;
use crate::config::CatalogSettings;
use crate::error::{FetchError, Result};

/// Catalog client authenticating with a bearer token.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Create a client from an existing [`reqwest::Client`].
    ///
    /// `base_url` is the API root without a trailing slash, e.g.
    /// `https://api.themoviedb.org/3`.
    pub fn new(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_settings(settings: &CatalogSettings) -> anyhow::Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .context("no movie API key configured")?;
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self::new(http, &settings.base_url, api_key))
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
    }

    async fn send_json<D: DeserializeOwned>(request: RequestBuilder) -> Result<D> {
        let response = request.send().await?;
        let status = response.status();
        debug!(url = %response.url(), %status, "catalog response");
        if !status.is_success() {
            return Err(FetchError::from_status(status));
        }
        Ok(response.json::<D>().await?)
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    fn name(&self) -> &str {
        "TMDB"
    }

    async fn search_or_list_movies(&self, query: &str) -> Result<Vec<Movie>> {
        let query = query.trim();
        let request = if query.is_empty() {
            self.get("/discover/movie")
                .query(&[("sort_by", "popularity.desc")])
        } else {
            self.get(&format!("/search/movie?query={}", urlencoding::encode(query)))
        };
        let page: MoviePage = Self::send_json(request).await?;
        Ok(page.results)
    }

    async fn movie_details(&self, movie_id: i64) -> Result<MovieDetails> {
        let result = Self::send_json(self.get(&format!("/movie/{movie_id}"))).await;
        if let Err(err) = &result {
            error!(movie_id, error = %err, "failed to fetch movie details");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fetch::{FetchController, Operation};
    use crate::test_support::{MockResponse, MockServer};

    const PAGE: &str = r#"{
        "page": 1,
        "results": [
            {"id": 268, "title": "Batman", "poster_path": "/cij4.jpg", "release_date": "1989-06-23", "popularity": 40.1},
            {"id": 272, "title": "Batman Begins", "poster_path": null}
        ],
        "total_pages": 1,
        "total_results": 2
    }"#;

    fn client(server: &MockServer) -> TmdbClient {
        TmdbClient::new(Client::new(), format!("{}/3/", server.base_url()), "secret-token")
    }

    #[tokio::test]
    async fn empty_query_lists_popular_movies() {
        let server = MockServer::start().await;
        server.enqueue(MockResponse::json(PAGE)).await;

        let movies = client(&server).search_or_list_movies("").await.unwrap();
        assert_eq!(movies.len(), 2);

        let req = &server.requests().await[0];
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/3/discover/movie");
        assert_eq!(req.query.as_deref(), Some("sort_by=popularity.desc"));
    }

    #[tokio::test]
    async fn blank_query_is_treated_as_empty() {
        let server = MockServer::start().await;
        client(&server).search_or_list_movies("   ").await.ok();
        assert_eq!(server.requests().await[0].path, "/3/discover/movie");
    }

    #[tokio::test]
    async fn query_issues_search_request() {
        let server = MockServer::start().await;
        server.enqueue(MockResponse::json(PAGE)).await;

        let movies = client(&server).search_or_list_movies("batman").await.unwrap();
        assert_eq!(movies[0].id, 268);
        assert_eq!(movies[0].title, "Batman");
        assert_eq!(movies[1].poster_path, None);

        let req = &server.requests().await[0];
        assert_eq!(req.path, "/3/search/movie");
        assert_eq!(req.query.as_deref(), Some("query=batman"));
    }

    #[tokio::test]
    async fn query_is_url_encoded() {
        let server = MockServer::start().await;
        client(&server)
            .search_or_list_movies("amélie & co")
            .await
            .ok();

        let query = server.requests().await[0].query.clone().unwrap();
        assert_eq!(query, "query=am%C3%A9lie%20%26%20co");
    }

    #[tokio::test]
    async fn requests_carry_bearer_token() {
        let server = MockServer::start().await;
        client(&server).search_or_list_movies("x").await.ok();

        let req = &server.requests().await[0];
        assert_eq!(req.header("authorization"), Some("Bearer secret-token"));
        assert_eq!(req.header("accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn not_found_becomes_http_error() {
        let server = MockServer::start().await;
        server.enqueue(MockResponse::status(404)).await;

        let err = client(&server).search_or_list_movies("x").await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Http {
                status: 404,
                status_text: "Not Found".into()
            }
        );
    }

    #[tokio::test]
    async fn malformed_body_becomes_decode_error() {
        let server = MockServer::start().await;
        server.enqueue(MockResponse::json(r#"{"page": 1}"#)).await;

        let err = client(&server).search_or_list_movies("").await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn details_hit_movie_endpoint() {
        let server = MockServer::start().await;
        server
            .enqueue(MockResponse::json(
                r#"{"id": 550, "title": "Fight Club", "runtime": 139, "budget": 63000000}"#,
            ))
            .await;

        let details = client(&server).movie_details(550).await.unwrap();
        assert_eq!(details.title, "Fight Club");
        assert_eq!(details.budget, 63_000_000);
        assert_eq!(server.requests().await[0].path, "/3/movie/550");
    }

    #[tokio::test]
    async fn details_failure_is_returned() {
        let server = MockServer::start().await;
        server.enqueue(MockResponse::status(401)).await;

        let err = client(&server).movie_details(1).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let client = TmdbClient::new(Client::new(), format!("http://{addr}"), "k");
        let err = client.search_or_list_movies("").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn controller_surfaces_catalog_404() {
        let server = MockServer::start().await;
        server.enqueue(MockResponse::status(404)).await;

        let catalog: Arc<dyn MovieCatalog> = Arc::new(client(&server));
        let op = Operation::new("popular", move || {
            let catalog = Arc::clone(&catalog);
            async move { catalog.search_or_list_movies("").await }
        });
        let controller = FetchController::new(op, false);

        assert!(controller.start().await.is_err());
        let state = controller.snapshot();
        let err = state.error.unwrap();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("404"));
        assert!(state.data.is_none());
        assert!(!state.loading);
    }

    #[test]
    fn from_settings_requires_api_key() {
        let settings = CatalogSettings {
            api_key: None,
            ..CatalogSettings::default()
        };
        assert!(TmdbClient::from_settings(&settings).is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = TmdbClient::new(Client::new(), "https://api.example.com/3/", "k");
        assert_eq!(client.base_url, "https://api.example.com/3");
    }
}
