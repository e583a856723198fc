//! Data access through the backend's table API
//!
//! Every table operation is a passthrough HTTP call against the hosted
//! PostgREST endpoint; uniqueness, durability and row-level security are the
//! backend's job. The builders cover exactly the predicates the application
//! uses: equality, case-insensitive substring, inclusive range bounds and
//! ordering.

mod query;

use reqwest::Client;
use serde::Serialize;

pub use query::{DeleteBuilder, InsertBuilder, RpcBuilder, SelectBuilder, UpdateBuilder};

/// Client for operations on a single table or view
pub struct TableClient {
    /// The base URL for the backend project
    url: String,

    /// The public API key
    key: String,

    /// The table or view name
    table: String,

    /// Bearer token of the calling session, if any
    token: Option<String>,

    /// HTTP client
    client: Client,
}

impl TableClient {
    /// Create a new TableClient
    pub(crate) fn new(url: &str, key: &str, table: &str, client: Client) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            table: table.to_string(),
            token: None,
            client,
        }
    }

    /// Attach the calling session's access token so the backend evaluates
    /// its row-level policies against that user.
    pub fn with_auth(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Get the base URL for REST API requests
    fn rest_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url, self.table)
    }

    /// Select specific columns from the table
    pub fn select(&self, columns: &str) -> SelectBuilder {
        SelectBuilder::new(
            self.rest_url(),
            self.key.clone(),
            self.token.clone(),
            columns,
            self.client.clone(),
        )
    }

    /// Insert rows into the table
    pub fn insert<T: Serialize>(&self, values: T) -> InsertBuilder<T> {
        InsertBuilder::new(
            self.rest_url(),
            self.key.clone(),
            self.token.clone(),
            values,
            self.client.clone(),
        )
    }

    /// Update rows in the table
    pub fn update<T: Serialize>(&self, values: T) -> UpdateBuilder<T> {
        UpdateBuilder::new(
            self.rest_url(),
            self.key.clone(),
            self.token.clone(),
            values,
            self.client.clone(),
        )
    }

    /// Delete rows from the table
    pub fn delete(&self) -> DeleteBuilder {
        DeleteBuilder::new(
            self.rest_url(),
            self.key.clone(),
            self.token.clone(),
            self.client.clone(),
        )
    }
}

/// Create a builder for a stored-procedure call under `/rest/v1/rpc`.
pub(crate) fn rpc<T: Serialize>(
    url: &str,
    key: &str,
    function: &str,
    params: T,
    client: Client,
) -> RpcBuilder<T> {
    let url = format!("{}/rest/v1/rpc/{}", url, function);
    RpcBuilder::new(url, key.to_string(), params, client)
}
