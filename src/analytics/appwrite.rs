//! Search counts persisted in an Appwrite TablesDB table.
//!
//! Three REST calls are used, all under
//! `{endpoint}/tablesdb/{database}/tables/{table}/rows`:
//!
//! * `GET` with `queries[]` filters to look rows up,
//! * `POST` with `{rowId, data}` to create a row,
//! * `PATCH /{rowId}/count/increment` with `{value}` to bump a counter.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};
use uuid::Uuid;

use super::{SearchLog, SearchRecord};
use crate::catalog::Movie;
use crate::error::{FetchError, Result};

/// Connection details for the hosted table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppwriteConfig {
    /// API root, e.g. `https://cloud.appwrite.io/v1`.
    pub endpoint: String,
    pub project_id: String,
    /// Platform identifier registered with the project, if any.
    pub platform: Option<String>,
    /// Server API key; client platforms authenticate without one.
    pub api_key: Option<String>,
    pub database_id: String,
    pub table_id: String,
}

/// Row filter, serialized to the JSON query strings the API expects.
#[derive(Debug, Clone, PartialEq)]
enum Query<'a> {
    Equal(&'a str, &'a str),
    Limit(usize),
    OrderDesc(&'a str),
}

impl Query<'_> {
    fn encode(&self) -> String {
        let value = match self {
            Query::Equal(attribute, value) => {
                json!({ "method": "equal", "attribute": attribute, "values": [value] })
            }
            Query::Limit(n) => json!({ "method": "limit", "values": [n] }),
            Query::OrderDesc(attribute) => json!({ "method": "orderDesc", "attribute": attribute }),
        };
        value.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct RowList {
    total: u64,
    rows: Vec<SearchRecord>,
}

const COUNT_COLUMN: &str = "count";
const SEARCH_TERM_COLUMN: &str = "searchTerm";

pub struct AppwriteSearchLog {
    http: Client,
    config: AppwriteConfig,
}

impl AppwriteSearchLog {
    pub fn new(http: Client, mut config: AppwriteConfig) -> Self {
        config.endpoint = config.endpoint.trim_end_matches('/').to_string();
        Self { http, config }
    }

    pub fn from_config(config: AppwriteConfig, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self::new(http, config))
    }

    fn rows_url(&self) -> String {
        format!(
            "{}/tablesdb/{}/tables/{}/rows",
            self.config.endpoint, self.config.database_id, self.config.table_id
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request.header("X-Appwrite-Project", &self.config.project_id);
        if let Some(platform) = &self.config.platform {
            request = request.header("X-Appwrite-Platform", platform);
        }
        if let Some(key) = &self.config.api_key {
            request = request.header("X-Appwrite-Key", key);
        }
        request
    }

    async fn send(request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!(url = %response.url(), %status, "table response");
        if !status.is_success() {
            return Err(FetchError::from_status(status));
        }
        Ok(response)
    }

    async fn list_rows(&self, queries: &[Query<'_>]) -> Result<RowList> {
        let params: Vec<(&str, String)> = queries.iter().map(|q| ("queries[]", q.encode())).collect();
        let request = self.authorize(self.http.get(self.rows_url()).query(&params));
        Ok(Self::send(request).await?.json().await?)
    }

    async fn create_row(&self, record: &SearchRecord) -> Result<()> {
        let mut data = record.clone();
        data.id.clear();
        let body = json!({ "rowId": record.id, "data": data });
        let request = self.authorize(self.http.post(self.rows_url()).json(&body));
        Self::send(request).await?;
        Ok(())
    }

    async fn increment(&self, row_id: &str, column: &str, value: i64) -> Result<()> {
        let url = format!("{}/{}/{}/increment", self.rows_url(), row_id, column);
        let request = self.authorize(self.http.patch(url).json(&json!({ "value": value })));
        Self::send(request).await?;
        Ok(())
    }

    async fn upsert_count(&self, query: &str, movie: &Movie) -> Result<()> {
        let found = self
            .list_rows(&[Query::Equal(SEARCH_TERM_COLUMN, query)])
            .await?;

        match found.rows.first() {
            Some(existing) if found.total > 0 => {
                debug!(query, row = %existing.id, "incrementing search count");
                self.increment(&existing.id, COUNT_COLUMN, 1).await
            }
            _ => {
                let record =
                    SearchRecord::first_sight(Uuid::new_v4().simple().to_string(), query, movie);
                debug!(query, row = %record.id, "creating search record");
                self.create_row(&record).await
            }
        }
    }
}

#[async_trait]
impl SearchLog for AppwriteSearchLog {
    fn name(&self) -> &str {
        "appwrite"
    }

    async fn record_search(&self, query: &str, movie: &Movie) -> Result<()> {
        let result = self.upsert_count(query, movie).await;
        if let Err(err) = &result {
            error!(query, error = %err, "failed to record search");
        }
        result
    }

    async fn top_trending(&self, limit: usize) -> Result<Vec<SearchRecord>> {
        let result = self
            .list_rows(&[Query::Limit(limit), Query::OrderDesc(COUNT_COLUMN)])
            .await;
        match result {
            Ok(list) => {
                let mut rows = list.rows;
                rows.truncate(limit);
                Ok(rows)
            }
            Err(err) => {
                error!(error = %err, "failed to fetch trending searches");
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for AppwriteSearchLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppwriteSearchLog")
            .field("endpoint", &self.config.endpoint)
            .field("project_id", &self.config.project_id)
            .field("table_id", &self.config.table_id)
            .finish()
    }
}
