use serde::{Deserialize, Serialize};

use crate::catalog::Movie;

/// One row of the search-count table.
///
/// Field names on the wire follow the table's column names.  The row id is
/// assigned when the record is created and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    #[serde(rename = "$id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    pub movie_id: i64,
    #[serde(default)]
    pub poster_url: String,
    pub count: i64,
    #[serde(default)]
    pub title: String,
}

impl SearchRecord {
    /// A first-sight record for `query`, describing `movie`.
    pub fn first_sight(id: impl Into<String>, query: &str, movie: &Movie) -> Self {
        Self {
            id: id.into(),
            search_term: query.to_string(),
            movie_id: movie.id,
            poster_url: movie.poster_url().unwrap_or_default(),
            count: 1,
            title: movie.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_row() {
        let row = r#"{
            "$id": "abc123",
            "$createdAt": "2025-01-01T00:00:00.000+00:00",
            "$tableId": "metrics",
            "searchTerm": "batman",
            "movie_id": 268,
            "poster_url": "https://image.tmdb.org/t/p/w500/cij4.jpg",
            "count": 3,
            "title": "Batman"
        }"#;
        let record: SearchRecord = serde_json::from_str(row).unwrap();
        assert_eq!(record.id, "abc123");
        assert_eq!(record.search_term, "batman");
        assert_eq!(record.count, 3);
    }

    #[test]
    fn new_row_data_omits_empty_id() {
        let movie: Movie =
            serde_json::from_str(r#"{"id": 268, "title": "Batman", "poster_path": "/cij4.jpg"}"#)
                .unwrap();
        let record = SearchRecord::first_sight("", "batman", &movie);
        let value = serde_json::to_value(&record).unwrap();

        assert!(value.get("$id").is_none());
        assert_eq!(value["searchTerm"], "batman");
        assert_eq!(value["movie_id"], 268);
        assert_eq!(value["count"], 1);
        assert_eq!(
            value["poster_url"],
            "https://image.tmdb.org/t/p/w500/cij4.jpg"
        );
    }
}
